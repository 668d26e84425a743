/// Construction options for a [`StringBuffer`](crate::StringBuffer).
///
/// # Examples
///
/// ```rust
/// use strbuf::{BufferOptions, StringBuffer};
///
/// let buffer = StringBuffer::with_options(BufferOptions {
///     initial_capacity: 4096,
/// });
/// assert!(buffer.capacity() > 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferOptions {
    /// Number of usable bytes reserved up front, not counting the slot for
    /// the trailing NUL.
    ///
    /// # Default
    ///
    /// `120`
    pub initial_capacity: usize,
}

impl BufferOptions {
    /// Initial reserve used by [`StringBuffer::new`](crate::StringBuffer::new).
    pub const DEFAULT_INITIAL_CAPACITY: usize = 120;
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
        }
    }
}

/// Options for [`StringBuffer::deflate`](crate::StringBuffer::deflate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeflateOptions {
    /// Compression level from `0` (store) to `9` (best).
    ///
    /// # Default
    ///
    /// `6`
    pub level: u32,

    /// Size of the chunks fed to the compressor and of the scratch block its
    /// output is collected in. A value of zero is treated as one.
    ///
    /// # Default
    ///
    /// `16384`
    pub chunk_size: usize,
}

impl Default for DeflateOptions {
    fn default() -> Self {
        Self {
            level: 6,
            chunk_size: 16 * 1024,
        }
    }
}
