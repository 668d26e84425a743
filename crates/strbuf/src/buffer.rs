//! Storage, growth and the raw append primitives of [`StringBuffer`].
//!
//! Storage layout
//! - `data` is a `Vec<u8>` whose length *is* the allocated capacity. Every
//!   byte of it is initialized, so the tail behind the write position can be
//!   zero-filled and the terminator slot is always addressable.
//! - `length` is the write position. While storage exists,
//!   `length + 1 <= data.len()` and `data[length] == 0` once a public
//!   operation returns.
//! - A buffer without storage (after [`StringBuffer::steal`] or
//!   [`StringBuffer::annihilate`]) has `data.len() == 0` and `length == 0`;
//!   the next append allocates again.
//!
//! The encoders (`escape`, `integer`, `float`) live in sibling modules and
//! write through the crate-private `put*` helpers after reserving.

use alloc::vec::Vec;
use core::{fmt, ops::Range};

use bstr::BStr;
use log::{trace, warn};
use zeroize::Zeroize;

use crate::{BufferOptions, Error};

/// A growable byte buffer that is always NUL-terminated.
///
/// Appends never write past the reserved capacity and never leave a partial
/// result behind: if growing the storage fails, the call returns
/// [`Error::OutOfMemory`] and the written bytes are exactly what they were
/// before the call.
///
/// Equality compares the written bytes only; capacity and the contents of
/// the unused tail are ignored.
#[derive(Clone)]
pub struct StringBuffer {
    data: Vec<u8>,
    length: usize,
}

impl StringBuffer {
    /// Creates a buffer with the default initial reserve of 120 bytes.
    ///
    /// # Panics
    ///
    /// Panics if the initial allocation fails, like [`Vec::with_capacity`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(BufferOptions::default())
    }

    /// Creates a buffer configured by `options`.
    ///
    /// # Panics
    ///
    /// Panics if the initial allocation fails.
    #[must_use]
    pub fn with_options(options: BufferOptions) -> Self {
        Self::with_capacity(options.initial_capacity)
    }

    /// Creates a buffer with room for `capacity` bytes plus the terminator.
    ///
    /// # Panics
    ///
    /// Panics if `capacity + 1` overflows or the allocation fails.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let Some(total) = capacity.checked_add(1) else {
            panic!("string buffer capacity overflow: {capacity} bytes");
        };
        Self {
            data: alloc::vec![0; total],
            length: 0,
        }
    }

    /// Fallible variant of [`StringBuffer::with_capacity`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the storage cannot be allocated.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        let total = capacity.checked_add(1).ok_or(Error::OutOfMemory)?;
        let mut data = Vec::new();
        data.try_reserve_exact(total)?;
        data.resize(total, 0);
        Ok(Self { data, length: 0 })
    }

    /// Number of bytes written.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether nothing has been written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of bytes allocated, terminator slot included. Zero when the
    /// buffer owns no storage.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The written bytes, without the terminator.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.length]
    }

    /// The written bytes followed by the NUL terminator.
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        if self.data.is_empty() {
            b"\0"
        } else {
            &self.data[..=self.length]
        }
    }

    /// Pointer range spanning the written bytes: the start of the buffer and
    /// the current write position.
    #[must_use]
    pub fn as_ptr_range(&self) -> Range<*const u8> {
        self.as_bytes().as_ptr_range()
    }

    /// The last written byte, if any.
    #[must_use]
    pub fn last_byte(&self) -> Option<u8> {
        self.as_bytes().last().copied()
    }

    /// The written bytes as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns the decoding error if the content is not valid UTF-8.
    pub fn to_str(&self) -> Result<&str, core::str::Utf8Error> {
        core::str::from_utf8(self.as_bytes())
    }

    /// Makes sure `size` more bytes can be appended without reallocating.
    ///
    /// When the bytes do not fit, the usable capacity grows to
    /// `floor(1.2 * (usable + size))`. Content and write position are kept
    /// and everything from the write position to the end of the new storage
    /// is zero-filled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the allocation fails; the buffer is
    /// unchanged in that case.
    pub fn reserve(&mut self, size: usize) -> Result<(), Error> {
        if size == 0 || size <= self.usable() - self.length {
            return Ok(());
        }
        self.grow(size)
    }

    #[cold]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn grow(&mut self, size: usize) -> Result<(), Error> {
        let old_capacity = self.data.len();
        let result = self
            .usable()
            .checked_add(size)
            .and_then(|wanted| {
                // the float product saturates; never hand out less than asked
                let scaled = (1.2 * wanted as f64) as usize;
                scaled.max(wanted).checked_add(1)
            })
            .ok_or(Error::OutOfMemory)
            .and_then(|new_capacity| {
                self.data
                    .try_reserve_exact(new_capacity - old_capacity)
                    .map(|()| new_capacity)
                    .map_err(Error::from)
            });

        let new_capacity = match result {
            Ok(new_capacity) => new_capacity,
            Err(err) => {
                warn!("string buffer cannot grow by {size} bytes from {old_capacity}: {err}");
                return Err(err);
            }
        };

        self.data.resize(new_capacity, 0);
        self.data[self.length..].fill(0);
        trace!("string buffer grew from {old_capacity} to {new_capacity} bytes");
        Ok(())
    }

    /// Appends one byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.reserve(1)?;
        self.put(byte);
        self.terminate();
        Ok(())
    }

    /// Appends the UTF-8 encoding of `c`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_char(&mut self, c: char) -> Result<(), Error> {
        let mut utf8 = [0; 4];
        self.append_bytes(c.encode_utf8(&mut utf8).as_bytes())
    }

    /// Appends `bytes` verbatim. Embedded NULs are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.reserve(bytes.len())?;
        self.put_slice(bytes);
        self.terminate();
        Ok(())
    }

    /// Appends a string slice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    #[inline]
    pub fn append_str(&mut self, s: &str) -> Result<(), Error> {
        self.append_bytes(s.as_bytes())
    }

    /// Appends the written bytes of `other`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    #[inline]
    pub fn append_buffer(&mut self, other: &StringBuffer) -> Result<(), Error> {
        self.append_bytes(other.as_bytes())
    }

    /// Replaces the content with `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow; the old
    /// content is kept in that case.
    pub fn replace_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.len() > self.length {
            self.reserve(bytes.len() - self.length)?;
        }
        self.length = 0;
        self.put_slice(bytes);
        self.terminate();
        Ok(())
    }

    /// Replaces the content with the written bytes of `other`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow.
    #[inline]
    pub fn replace_buffer(&mut self, other: &StringBuffer) -> Result<(), Error> {
        self.replace_bytes(other.as_bytes())
    }

    /// Rewinds to empty and scrubs the whole storage.
    pub fn clear(&mut self) {
        self.length = 0;
        self.data[..].zeroize();
    }

    /// Rewinds to empty without scrubbing; only the terminator is written.
    pub fn reset(&mut self) {
        self.length = 0;
        self.terminate();
    }

    /// Removes `count` bytes from the front and scrubs the vacated tail.
    pub fn erase_front(&mut self, count: usize) {
        if count >= self.length {
            self.clear();
        } else if count > 0 {
            self.data.copy_within(count..self.length, 0);
            self.length -= count;
            self.data[self.length..].zeroize();
        }
    }

    /// Removes `count` bytes from the front without scrubbing the tail.
    pub fn move_front(&mut self, count: usize) {
        if count >= self.length {
            self.reset();
        } else if count > 0 {
            self.data.copy_within(count..self.length, 0);
            self.length -= count;
            self.terminate();
        }
    }

    /// Exchanges storage and content with `other`.
    #[inline]
    pub fn swap(&mut self, other: &mut StringBuffer) {
        core::mem::swap(self, other);
    }

    /// Takes the written bytes out, leaving the buffer empty and without
    /// storage.
    #[must_use = "the stolen bytes are dropped otherwise"]
    pub fn steal(&mut self) -> Vec<u8> {
        let mut data = core::mem::take(&mut self.data);
        data.truncate(self.length);
        self.length = 0;
        data
    }

    /// Consumes the buffer and returns the written bytes.
    #[must_use]
    pub fn into_vec(mut self) -> Vec<u8> {
        self.steal()
    }

    /// Scrubs the whole storage and releases it.
    pub fn annihilate(&mut self) {
        let mut data = core::mem::take(&mut self.data);
        data.zeroize();
        self.length = 0;
    }

    /// Runs `f` and rolls the write position back if it fails, so multi-step
    /// appends have the same all-or-nothing behavior as single ones.
    pub(crate) fn atomically<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        let start = self.length;
        let result = f(self);
        if result.is_err() {
            self.length = start;
            self.terminate();
        }
        result
    }

    #[inline]
    fn usable(&self) -> usize {
        self.data.len().saturating_sub(1)
    }

    /// Writes one byte at the write position. The caller must have reserved.
    #[inline]
    pub(crate) fn put(&mut self, byte: u8) {
        self.data[self.length] = byte;
        self.length += 1;
    }

    /// Writes `bytes` at the write position. The caller must have reserved.
    #[inline]
    pub(crate) fn put_slice(&mut self, bytes: &[u8]) {
        let end = self.length + bytes.len();
        self.data[self.length..end].copy_from_slice(bytes);
        self.length = end;
    }

    #[inline]
    pub(crate) fn terminate(&mut self) {
        if let Some(slot) = self.data.get_mut(self.length) {
            *slot = 0;
        }
    }
}

impl Default for StringBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringBuffer")
            .field("data", &BStr::new(self.as_bytes()))
            .field("len", &self.length)
            .field("capacity", &self.data.len())
            .finish()
    }
}

impl PartialEq for StringBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for StringBuffer {}

impl AsRef<[u8]> for StringBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<StringBuffer> for Vec<u8> {
    fn from(buffer: StringBuffer) -> Self {
        buffer.into_vec()
    }
}

impl fmt::Write for StringBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_str(s).map_err(|_| fmt::Error)
    }
}

#[cfg(feature = "std")]
impl std::io::Write for StringBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.append_bytes(buf)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::OutOfMemory, err))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
