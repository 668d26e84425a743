//! A growable, always NUL-terminated byte buffer with in-place encoders.
//!
//! [`StringBuffer`] owns a contiguous block of bytes and appends text to it
//! without intermediate allocations: raw bytes, JSON-escaped strings,
//! percent-encoded strings, integers in several radixes and a compact,
//! locale-independent rendering of `f64`.
//!
//! ```rust
//! use strbuf::StringBuffer;
//!
//! let mut buffer = StringBuffer::new();
//! buffer.append_str("key=")?;
//! buffer.append_url_encoded(b"a value/with spaces")?;
//! buffer.append_str("&n=")?;
//! buffer.append_i32(42)?;
//! assert_eq!(buffer.as_bytes(), b"key=a%20value%2Fwith%20spaces&n=42");
//! # Ok::<(), strbuf::Error>(())
//! ```

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod buffer;
#[cfg(feature = "deflate")]
mod deflate;
mod error;
mod escape;
mod float;
mod integer;
mod options;
#[cfg(feature = "serde")]
mod ser;

#[cfg(test)]
mod tests;

pub use buffer::StringBuffer;
#[cfg(feature = "deflate")]
pub use deflate::DeflateError;
pub use error::Error;
pub use options::{BufferOptions, DeflateOptions};
