//! Locale-independent rendering of `f64`.
//!
//! This is a fixed-precision heuristic, not a shortest round-trip algorithm.
//! Small integers and values with at most four decimals print exactly;
//! everything else prints about sixteen significant digits. Output is stable
//! byte for byte, which existing consumers rely on, so the thresholds below
//! must not be tuned.

#![allow(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use crate::{Error, StringBuffer};

/// Scale applied to the normalized mantissa before printing its digits.
const SIGNIFICAND_SCALE: f64 = 10_000_000_000_000_000.0;

/// Largest magnitude whose four-decimal scaling still fits in a `u32`.
const FOUR_DECIMALS_LIMIT: f64 = 429_496.0;

/// Bound on normalization steps. Only a zero fraction runs into it.
const MAX_SCALE_STEPS: usize = 400;

impl StringBuffer {
    /// Appends `value` in a compact decimal form.
    ///
    /// - `NaN`, `inf` and `-inf` for the non-finite values;
    /// - integers that fit a `u32` without a decimal point;
    /// - values with up to four decimals below 429496 exactly, trailing zeros
    ///   trimmed;
    /// - everything else with about sixteen significant digits.
    ///
    /// ```rust
    /// let mut buffer = strbuf::StringBuffer::new();
    /// for value in [-1.5, 100.0, 0.25, f64::NAN] {
    ///     buffer.append_double(value)?;
    ///     buffer.append_byte(b' ')?;
    /// }
    /// assert_eq!(buffer.as_bytes(), b"-1.5 100 0.25 NaN ");
    /// # Ok::<(), strbuf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow; nothing is
    /// appended in that case.
    pub fn append_double(&mut self, value: f64) -> Result<(), Error> {
        self.atomically(|buffer| buffer.put_double(value))
    }

    fn put_double(&mut self, mut value: f64) -> Result<(), Error> {
        if value.is_nan() {
            return self.append_bytes(b"NaN");
        }
        if value == f64::INFINITY {
            return self.append_bytes(b"inf");
        }
        if value == f64::NEG_INFINITY {
            return self.append_bytes(b"-inf");
        }

        if value < 0.0 {
            self.append_byte(b'-')?;
            value = -value;
        } else if value == 0.0 {
            return self.append_byte(b'0');
        }

        let integral = value as u32;
        if f64::from(integral) == value {
            return self.append_u32(integral);
        }

        if value < FOUR_DECIMALS_LIMIT {
            let scaled = value * 10_000.0;
            let small = scaled as u32;
            if f64::from(small) == scaled {
                self.append_u32(small / 10_000)?;
                return self.append_four_decimals(small % 10_000);
            }
        }

        if value > SIGNIFICAND_SCALE {
            let mut shifted = 0;
            while value > SIGNIFICAND_SCALE {
                value /= 10.0;
                shifted += 1;
            }
            self.append_u64(value as u64)?;
            return self.append_zeros(shifted);
        }

        if value < 1.0 {
            let Some(steps) = normalize(&mut value) else {
                return self.append_byte(b'0');
            };
            self.append_bytes(b"0.")?;
            self.append_zeros(steps - 1)?;
            return self.append_u64((value * SIGNIFICAND_SCALE) as u64);
        }

        let integral = value as u64;
        let mut fraction = value - integral as f64;
        self.append_u64(integral)?;

        let Some(steps) = normalize(&mut fraction) else {
            return Ok(());
        };
        self.append_byte(b'.')?;
        self.append_zeros(steps - 1)?;
        self.append_u64((fraction * SIGNIFICAND_SCALE) as u64)
    }

    /// Writes `.` and the decimals of `fraction` (1..=9999) as four digits
    /// with the trailing zeros dropped.
    fn append_four_decimals(&mut self, fraction: u32) -> Result<(), Error> {
        if fraction == 0 {
            return Ok(());
        }

        let digits = [
            (fraction / 1000) % 10,
            (fraction / 100) % 10,
            (fraction / 10) % 10,
            fraction % 10,
        ];
        let last = digits.iter().rposition(|d| *d != 0).unwrap_or(0);

        self.reserve(1 + last + 1)?;
        self.put(b'.');
        for d in &digits[..=last] {
            self.put(b'0' + *d as u8);
        }
        self.terminate();
        Ok(())
    }

    fn append_zeros(&mut self, count: usize) -> Result<(), Error> {
        self.reserve(count)?;
        for _ in 0..count {
            self.put(b'0');
        }
        self.terminate();
        Ok(())
    }
}

/// Multiplies `value` by ten until it reaches 1.0 and returns the number of
/// steps taken, or `None` once more than [`MAX_SCALE_STEPS`] were needed.
fn normalize(value: &mut f64) -> Option<usize> {
    let mut steps = 0;
    while *value < 1.0 {
        *value *= 10.0;
        steps += 1;
        if steps > MAX_SCALE_STEPS {
            return None;
        }
    }
    Some(steps)
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};

    use rstest::rstest;

    use crate::StringBuffer;

    fn render(value: f64) -> String {
        let mut buffer = StringBuffer::with_capacity(0);
        buffer.append_double(value).unwrap();
        assert_eq!(buffer.as_bytes_with_nul().last(), Some(&0));
        buffer.to_str().unwrap().to_string()
    }

    #[rstest]
    #[case(0.0, "0")]
    #[case(-0.0, "0")]
    #[case(-1.5, "-1.5")]
    #[case(100.0, "100")]
    #[case(f64::NAN, "NaN")]
    #[case(f64::INFINITY, "inf")]
    #[case(f64::NEG_INFINITY, "-inf")]
    #[case(4_294_967_295.0, "4294967295")]
    #[case(-7.0, "-7")]
    fn fixed_points(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(render(value), expected);
    }

    #[rstest]
    #[case(0.5, "0.5")]
    #[case(0.25, "0.25")]
    #[case(3.5, "3.5")]
    #[case(3.0625, "3.0625")]
    #[case(12.125, "12.125")]
    #[case(-0.75, "-0.75")]
    #[case(429_495.5, "429495.5")]
    fn four_decimals_are_trimmed(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(render(value), expected);
    }

    #[test]
    fn above_four_decimals_limit_uses_general_path() {
        // 429496.5 is exact in binary but too large for the u32 scaling
        assert_eq!(render(429_496.5), "429496.50000000000000000");
        assert_eq!(render(1_234_567.25), "1234567.25000000000000000");
    }

    #[rstest]
    #[case(1e17, "100000000000000000")]
    #[case(1e20, "100000000000000000000")]
    #[case(-1e17, "-100000000000000000")]
    fn very_large_values_pad_with_zeros(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(render(value), expected);
    }

    #[test]
    fn extreme_magnitudes_keep_sixteen_digits() {
        for (value, sign) in [(f64::MAX, ""), (f64::MIN, "-")] {
            let out = render(value);
            let digits = out.strip_prefix(sign).unwrap();
            assert_eq!(digits.len(), 309, "{out}");
            assert!(digits.starts_with("1797693134862316"), "{out}");
            assert!(digits[16..].bytes().all(|b| b == b'0'), "{out}");
            // the padded text rounds past the largest finite double
            assert!(out.parse::<f64>().unwrap().is_infinite());
        }
    }

    #[test]
    fn large_integers_drop_empty_fraction() {
        // no fractional part: normalization gives up and only the integer
        // part is written
        assert_eq!(render(5e9), "5000000000");
        assert_eq!(render(1e16), "10000000000000000");
    }

    #[test]
    fn very_small_values_use_leading_zeros() {
        // 2^-17 and its scaled forms are exact in binary
        let value = 1.0 / 131_072.0;
        assert_eq!(render(value), "0.0000076293945312500000");
        assert_eq!(render(-value), "-0.0000076293945312500000");
    }

    #[test]
    fn subnormals_keep_every_leading_zero() {
        let out = render(5e-324);
        assert!(out.starts_with("0.000"), "{out}");
        assert!(out.len() > 320, "{out}");
        assert_eq!(out.matches('.').count(), 1);
    }
}
