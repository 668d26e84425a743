use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use quickcheck::{QuickCheck, TestResult};

use crate::StringBuffer;

fn test_count() -> u64 {
    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;
    tests
}

fn json_literal(src: &str, escape_slash: bool) -> Vec<u8> {
    let mut buffer = StringBuffer::new();
    buffer.append_byte(b'"').unwrap();
    buffer.append_json_escaped(src.as_bytes(), escape_slash).unwrap();
    buffer.append_byte(b'"').unwrap();
    buffer.into_vec()
}

/// Property: the escaped form of any UTF-8 string is a JSON string literal
/// that decodes to the input, cut after the first NUL.
#[test]
fn json_escape_decodes_to_input_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(src: String, escape_slash: bool) -> bool {
        let literal = json_literal(&src, escape_slash);
        if literal.iter().any(|b| !b.is_ascii() || *b < 0x20) {
            return false;
        }

        let expected = match src.find('\0') {
            Some(pos) => src[..=pos].to_string(),
            None => src,
        };
        serde_json::from_slice::<String>(&literal).ok() == Some(expected)
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(String, bool) -> bool);
}

/// Property: printable ASCII without quotes or backslashes is copied as-is.
#[test]
fn json_escape_keeps_plain_ascii_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(src: Vec<u8>) -> TestResult {
        let plain: Vec<u8> = src
            .into_iter()
            .map(|b| 0x20 + b % 0x5F)
            .filter(|b| *b != b'"' && *b != b'\\')
            .collect();

        let mut buffer = StringBuffer::new();
        buffer.append_json_escaped(&plain, false).unwrap();
        TestResult::from_bool(buffer.as_bytes() == plain.as_slice())
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Vec<u8>) -> TestResult);
}

fn percent_decode(encoded: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(encoded.len());
    let mut rest = encoded;
    while let Some((&b, tail)) = rest.split_first() {
        if b == b'%' {
            let hex = tail.get(..2)?;
            if hex.iter().any(u8::is_ascii_lowercase) {
                return None;
            }
            let text = core::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(text, 16).ok()?);
            rest = &tail[2..];
        } else if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b);
            rest = tail;
        } else {
            return None;
        }
    }
    Some(out)
}

/// Property: percent-encoding only emits unreserved bytes and uppercase
/// escapes, and decodes back to the input.
#[test]
fn url_encoding_round_trips_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(src: Vec<u8>) -> bool {
        let mut buffer = StringBuffer::with_capacity(0);
        buffer.append_url_encoded(&src).unwrap();
        percent_decode(buffer.as_bytes()) == Some(src)
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Vec<u8>) -> bool);
}
