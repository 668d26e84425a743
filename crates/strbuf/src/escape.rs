//! JSON string escaping and URL percent-encoding.
//!
//! The JSON encoder is lenient: it decodes well-formed UTF-8 sequences into
//! `\uXXXX` escapes (surrogate pairs above U+FFFF) and copies any byte it
//! cannot decode through unchanged. It never reports malformed input.

use crate::{Error, StringBuffer};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Longest output a single input character can produce: a surrogate pair.
const MAX_ESCAPE_LEN: usize = 12;

impl StringBuffer {
    /// Appends `src` escaped for use inside a JSON string literal.
    ///
    /// Quotes, backslashes and control characters are escaped, `/` only when
    /// `escape_slash` is set, and every decodable multi-byte UTF-8 sequence
    /// becomes one `\uXXXX` escape or a surrogate pair. Bytes that do not
    /// start a valid sequence are copied as-is.
    ///
    /// Scanning stops at the first NUL byte, which is written as `\u0000`.
    ///
    /// ```rust
    /// let mut buffer = strbuf::StringBuffer::new();
    /// buffer.append_json_escaped("a/\"é\"".as_bytes(), true)?;
    /// assert_eq!(buffer.as_bytes(), br#"a\/\"\u00E9\""#);
    /// # Ok::<(), strbuf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow; nothing is
    /// appended in that case.
    pub fn append_json_escaped(&mut self, src: &[u8], escape_slash: bool) -> Result<(), Error> {
        self.atomically(|buffer| buffer.put_json_escaped(src, escape_slash))
    }

    fn put_json_escaped(&mut self, src: &[u8], escape_slash: bool) -> Result<(), Error> {
        let mut rest = src;

        while let Some((&byte, tail)) = rest.split_first() {
            rest = tail;
            self.reserve(MAX_ESCAPE_LEN)?;

            match byte {
                0 => {
                    self.put_unicode_escape(0);
                    break;
                }
                b'/' if escape_slash => self.put_slice(b"\\/"),
                b'\\' | b'"' => self.put_slice(&[b'\\', byte]),
                0x08 => self.put_slice(b"\\b"),
                0x0C => self.put_slice(b"\\f"),
                b'\n' => self.put_slice(b"\\n"),
                b'\r' => self.put_slice(b"\\r"),
                b'\t' => self.put_slice(b"\\t"),
                0x01..=0x1F => self.put_unicode_escape(u16::from(byte)),
                0x20..=0x7F => self.put(byte),
                _ => match decode_sequence(byte, rest) {
                    Some((code_point, consumed)) => {
                        rest = &rest[consumed..];
                        self.put_code_point_escape(code_point);
                    }
                    None => self.put(byte),
                },
            }
        }

        self.terminate();
        Ok(())
    }

    /// Writes one escape for code points up to U+FFFF and a surrogate pair
    /// above. The choice follows the value, not the sequence length, so an
    /// overlong encoding is escaped as the code point it spells; an overlong
    /// NUL becomes `\u0000` without ending the scan.
    fn put_code_point_escape(&mut self, code_point: u32) {
        match u16::try_from(code_point) {
            Ok(unit) => self.put_unicode_escape(unit),
            Err(_) => {
                let n = code_point - 0x1_0000;
                // n < 0x20_0000, so both halves stay below 0xE000
                self.put_unicode_escape(surrogate((n >> 10) + 0xD800));
                self.put_unicode_escape(surrogate((n & 0x3FF) + 0xDC00));
            }
        }
    }

    fn put_unicode_escape(&mut self, unit: u16) {
        self.put_slice(b"\\u");
        self.put_hex4(unit);
    }

    fn put_hex4(&mut self, unit: u16) {
        for shift in [12, 8, 4, 0] {
            self.put(HEX_DIGITS[usize::from((unit >> shift) & 0xF)]);
        }
    }

    /// Appends `src` percent-encoded.
    ///
    /// ASCII alphanumerics and `-`, `_`, `.`, `~` are kept; every other byte
    /// becomes `%XX` with uppercase hex digits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow; nothing is
    /// appended in that case.
    pub fn append_url_encoded(&mut self, src: &[u8]) -> Result<(), Error> {
        let worst_case = src.len().checked_mul(3).ok_or(Error::OutOfMemory)?;
        self.reserve(worst_case)?;

        for &byte in src {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
                self.put(byte);
            } else {
                self.put(b'%');
                self.put(HEX_DIGITS[usize::from(byte >> 4)]);
                self.put(HEX_DIGITS[usize::from(byte & 0xF)]);
            }
        }

        self.terminate();
        Ok(())
    }
}

#[inline]
fn surrogate(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Payload bits of the continuation byte at `index`, if there is one.
#[inline]
fn continuation(rest: &[u8], index: usize) -> Option<u32> {
    rest.get(index)
        .filter(|byte| **byte & 0xC0 == 0x80)
        .map(|byte| u32::from(byte & 0x3F))
}

/// Decodes the multi-byte sequence led by `lead`, whose continuation bytes
/// start at `rest[0]`. Returns the code point and the number of
/// continuation bytes used.
///
/// Lead bytes of 5- and 6-byte sequences and stray continuation bytes are
/// not decoded.
fn decode_sequence(lead: u8, rest: &[u8]) -> Option<(u32, usize)> {
    let lead_bits = u32::from(lead);
    match lead {
        0xC0..=0xDF => {
            let c1 = continuation(rest, 0)?;
            Some((((lead_bits & 0x1F) << 6) | c1, 1))
        }
        0xE0..=0xEF => {
            let c1 = continuation(rest, 0)?;
            let c2 = continuation(rest, 1)?;
            Some((((lead_bits & 0x0F) << 12) | (c1 << 6) | c2, 2))
        }
        0xF0..=0xF7 => {
            let c1 = continuation(rest, 0)?;
            let c2 = continuation(rest, 1)?;
            let c3 = continuation(rest, 2)?;
            Some((
                ((lead_bits & 0x07) << 18) | (c1 << 12) | (c2 << 6) | c3,
                3,
            ))
        }
        _ => None,
    }
}
