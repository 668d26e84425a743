//! Decimal, octal and hexadecimal integer appenders.
//!
//! Each appender reserves the worst-case width for its type first and then
//! formats straight into the buffer, so the formatting step itself cannot
//! fail.

use core::fmt::{self, Write};

use crate::{Error, StringBuffer};

const DIGITS: &[u8; 10] = b"0123456789";

#[inline]
fn digit(value: u32) -> u8 {
    DIGITS[(value % 10) as usize]
}

macro_rules! decimal_appenders {
    ($($(#[$doc:meta])* $name:ident($ty:ty) reserves $budget:literal;)*) => {$(
        $(#[$doc])*
        ///
        /// # Errors
        ///
        /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
        pub fn $name(&mut self, value: $ty) -> Result<(), Error> {
            self.append_formatted($budget, format_args!("{value}"))
        }
    )*};
}

impl StringBuffer {
    decimal_appenders! {
        /// Appends a signed 8-bit integer in decimal.
        append_i8(i8) reserves 4;
        /// Appends an unsigned 8-bit integer in decimal.
        append_u8(u8) reserves 3;
        /// Appends a signed 16-bit integer in decimal.
        append_i16(i16) reserves 6;
        /// Appends an unsigned 16-bit integer in decimal.
        append_u16(u16) reserves 5;
        /// Appends a signed 32-bit integer in decimal.
        append_i32(i32) reserves 11;
        /// Appends an unsigned 32-bit integer in decimal.
        append_u32(u32) reserves 10;
        /// Appends a signed 64-bit integer in decimal.
        append_i64(i64) reserves 20;
        /// Appends an unsigned 64-bit integer in decimal.
        append_u64(u64) reserves 21;
    }

    /// Appends a `usize` in decimal through the 32- or 64-bit appender that
    /// matches the pointer width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    #[cfg(target_pointer_width = "64")]
    pub fn append_usize(&mut self, value: usize) -> Result<(), Error> {
        self.append_u64(value as u64)
    }

    /// Appends a `usize` in decimal through the 32- or 64-bit appender that
    /// matches the pointer width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    #[cfg(not(target_pointer_width = "64"))]
    #[allow(clippy::cast_possible_truncation)]
    pub fn append_usize(&mut self, value: usize) -> Result<(), Error> {
        self.append_u32(value as u32)
    }

    /// Appends an unsigned 32-bit integer in octal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_octal_u32(&mut self, value: u32) -> Result<(), Error> {
        self.append_formatted(11, format_args!("{value:o}"))
    }

    /// Appends an unsigned 64-bit integer in octal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_octal_u64(&mut self, value: u64) -> Result<(), Error> {
        self.append_formatted(22, format_args!("{value:o}"))
    }

    /// Appends an unsigned 32-bit integer in hexadecimal, uppercase digits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_hex_u32(&mut self, value: u32) -> Result<(), Error> {
        self.append_formatted(8, format_args!("{value:X}"))
    }

    /// Appends an unsigned 64-bit integer in hexadecimal, uppercase digits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_hex_u64(&mut self, value: u64) -> Result<(), Error> {
        self.append_formatted(16, format_args!("{value:X}"))
    }

    /// Appends the last two decimal digits of `value`, zero padded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_integer2(&mut self, value: u32) -> Result<(), Error> {
        self.reserve(2)?;
        self.put_integer2(value);
        self.terminate();
        Ok(())
    }

    /// Appends the last three decimal digits of `value`, zero padded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_integer3(&mut self, value: u32) -> Result<(), Error> {
        self.reserve(3)?;
        self.put(digit(value / 100));
        self.put_integer2(value);
        self.terminate();
        Ok(())
    }

    /// Appends the last four decimal digits of `value`, zero padded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_integer4(&mut self, value: u32) -> Result<(), Error> {
        self.reserve(4)?;
        self.put(digit(value / 1000));
        self.put(digit(value / 100));
        self.put_integer2(value);
        self.terminate();
        Ok(())
    }

    /// Appends a duration in seconds as `hh:mm:ss`. Hours wrap at 100.
    ///
    /// ```rust
    /// let mut buffer = strbuf::StringBuffer::new();
    /// buffer.append_time(3 * 3600 + 25 * 60 + 7)?;
    /// assert_eq!(buffer.as_bytes(), b"03:25:07");
    /// # Ok::<(), strbuf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_time(&mut self, seconds: u32) -> Result<(), Error> {
        self.reserve(8)?;
        self.put_integer2(seconds / 3600);
        self.put(b':');
        self.put_integer2((seconds / 60) % 60);
        self.put(b':');
        self.put_integer2(seconds % 60);
        self.terminate();
        Ok(())
    }

    /// Appends a signed 32-bit integer followed by `;`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_csv_i32(&mut self, value: i32) -> Result<(), Error> {
        self.append_csv(|buffer| buffer.append_i32(value))
    }

    /// Appends an unsigned 32-bit integer followed by `;`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_csv_u32(&mut self, value: u32) -> Result<(), Error> {
        self.append_csv(|buffer| buffer.append_u32(value))
    }

    /// Appends a signed 64-bit integer followed by `;`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_csv_i64(&mut self, value: i64) -> Result<(), Error> {
        self.append_csv(|buffer| buffer.append_i64(value))
    }

    /// Appends an unsigned 64-bit integer followed by `;`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_csv_u64(&mut self, value: u64) -> Result<(), Error> {
        self.append_csv(|buffer| buffer.append_u64(value))
    }

    /// Appends a double, formatted like [`StringBuffer::append_double`],
    /// followed by `;`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_csv_f64(&mut self, value: f64) -> Result<(), Error> {
        self.append_csv(|buffer| buffer.append_double(value))
    }

    fn append_csv<F>(&mut self, field: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.atomically(|buffer| {
            field(buffer)?;
            buffer.append_byte(b';')
        })
    }

    fn append_formatted(&mut self, budget: usize, args: fmt::Arguments<'_>) -> Result<(), Error> {
        self.reserve(budget)?;
        // the budget covers the widest rendering, so no write below can fail
        self.write_fmt(args).map_err(|fmt::Error| Error::OutOfMemory)
    }

    #[inline]
    pub(crate) fn put_integer2(&mut self, value: u32) {
        self.put(digit(value / 10));
        self.put(digit(value));
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};

    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    use crate::StringBuffer;

    fn render(f: impl FnOnce(&mut StringBuffer)) -> String {
        let mut buffer = StringBuffer::with_capacity(0);
        f(&mut buffer);
        assert_eq!(buffer.as_bytes_with_nul().last(), Some(&0));
        buffer.to_str().unwrap().to_string()
    }

    #[test]
    fn extremes() {
        assert_eq!(render(|b| b.append_i32(i32::MIN).unwrap()), "-2147483648");
        assert_eq!(render(|b| b.append_i64(i64::MIN).unwrap()), "-9223372036854775808");
        assert_eq!(render(|b| b.append_u64(u64::MAX).unwrap()), "18446744073709551615");
        assert_eq!(render(|b| b.append_i8(i8::MIN).unwrap()), "-128");
        assert_eq!(render(|b| b.append_u8(u8::MAX).unwrap()), "255");
        assert_eq!(render(|b| b.append_i16(i16::MIN).unwrap()), "-32768");
        assert_eq!(render(|b| b.append_u16(u16::MAX).unwrap()), "65535");
        assert_eq!(render(|b| b.append_u32(0).unwrap()), "0");
        assert_eq!(render(|b| b.append_usize(usize::MAX).unwrap()), usize::MAX.to_string());
    }

    #[test]
    fn radixes_use_uppercase() {
        assert_eq!(render(|b| b.append_hex_u32(0xDEAD_BEEF).unwrap()), "DEADBEEF");
        assert_eq!(render(|b| b.append_hex_u64(u64::MAX).unwrap()), "FFFFFFFFFFFFFFFF");
        assert_eq!(render(|b| b.append_hex_u32(0).unwrap()), "0");
        assert_eq!(render(|b| b.append_octal_u32(u32::MAX).unwrap()), "37777777777");
        assert_eq!(
            render(|b| b.append_octal_u64(u64::MAX).unwrap()),
            "1777777777777777777777"
        );
        assert_eq!(render(|b| b.append_octal_u64(8).unwrap()), "10");
    }

    #[rstest]
    #[case(0, "00", "000", "0000")]
    #[case(7, "07", "007", "0007")]
    #[case(42, "42", "042", "0042")]
    #[case(123, "23", "123", "0123")]
    #[case(98_765, "65", "765", "8765")]
    fn fixed_width(
        #[case] value: u32,
        #[case] two: &str,
        #[case] three: &str,
        #[case] four: &str,
    ) {
        assert_eq!(render(|b| b.append_integer2(value).unwrap()), two);
        assert_eq!(render(|b| b.append_integer3(value).unwrap()), three);
        assert_eq!(render(|b| b.append_integer4(value).unwrap()), four);
    }

    #[rstest]
    #[case(0, "00:00:00")]
    #[case(59, "00:00:59")]
    #[case(3_600, "01:00:00")]
    #[case(86_399, "23:59:59")]
    #[case(360_000, "00:00:00")]
    fn time(#[case] seconds: u32, #[case] expected: &str) {
        assert_eq!(render(|b| b.append_time(seconds).unwrap()), expected);
    }

    #[test]
    fn csv_fields() {
        let out = render(|b| {
            b.append_csv_i32(-1).unwrap();
            b.append_csv_u32(2).unwrap();
            b.append_csv_i64(-3).unwrap();
            b.append_csv_u64(4).unwrap();
            b.append_csv_f64(2.5).unwrap();
        });
        assert_eq!(out, "-1;2;-3;4;2.5;");
    }

    #[quickcheck]
    fn i64_round_trips(value: i64) -> bool {
        render(|b| b.append_i64(value).unwrap()).parse::<i64>() == Ok(value)
    }

    #[quickcheck]
    fn i32_round_trips(value: i32) -> bool {
        render(|b| b.append_i32(value).unwrap()).parse::<i32>() == Ok(value)
    }

    #[quickcheck]
    fn u64_round_trips(value: u64) -> bool {
        render(|b| b.append_u64(value).unwrap()).parse::<u64>() == Ok(value)
    }

    #[quickcheck]
    fn hex_round_trips(value: u64) -> bool {
        let text = render(|b| b.append_hex_u64(value).unwrap());
        !text.bytes().any(|c| c.is_ascii_lowercase())
            && u64::from_str_radix(&text, 16) == Ok(value)
    }

    #[quickcheck]
    fn octal_round_trips(value: u32) -> bool {
        let text = render(|b| b.append_octal_u32(value).unwrap());
        u32::from_str_radix(&text, 8) == Ok(value)
    }
}
