//! In-place zlib compression of a [`StringBuffer`].

use alloc::vec::Vec;

use flate2::{Compress, Compression, FlushCompress, Status};
use log::debug;
use thiserror::Error;

use crate::{DeflateOptions, Error, StringBuffer};

/// Failure of [`StringBuffer::deflate`]. The buffer is unchanged.
#[derive(Error, Debug)]
pub enum DeflateError {
    /// The compressed output or the scratch block could not be allocated.
    #[error(transparent)]
    Buffer(#[from] Error),
    /// The compressor rejected the stream.
    #[error("deflate stream error: {0}")]
    Compress(#[from] flate2::CompressError),
    /// The compressor stopped making progress before the end of the stream.
    #[error("deflate stream stalled after {consumed} of {total} bytes")]
    Stalled {
        /// Input bytes consumed so far.
        consumed: usize,
        /// Input bytes in the buffer.
        total: usize,
    },
}

impl StringBuffer {
    /// Replaces the content with its zlib-wrapped DEFLATE compression.
    ///
    /// The content is fed to the compressor in `options.chunk_size` pieces
    /// and the output is collected in a second buffer, which is swapped in
    /// once the stream is finished.
    ///
    /// # Errors
    ///
    /// Returns [`DeflateError`] if allocation or compression fails; the
    /// original content is kept in that case.
    pub fn deflate(&mut self, options: DeflateOptions) -> Result<(), DeflateError> {
        let chunk_size = options.chunk_size.max(1);
        let mut compressed = StringBuffer::try_with_capacity(self.len() / 2 + 64)?;
        let mut scratch = Vec::new();
        scratch.try_reserve_exact(chunk_size).map_err(Error::from)?;
        scratch.resize(chunk_size, 0);

        let mut stream = Compress::new(Compression::new(options.level.min(9)), true);
        let input = self.as_bytes();
        let mut offset = 0;

        loop {
            let end = input.len().min(offset + chunk_size);
            let flush = if end == input.len() {
                FlushCompress::Finish
            } else {
                FlushCompress::None
            };

            let (in_before, out_before) = (stream.total_in(), stream.total_out());
            let status = stream.compress(&input[offset..end], &mut scratch, flush)?;
            let consumed = counter_delta(stream.total_in(), in_before);
            let produced = counter_delta(stream.total_out(), out_before);

            compressed.append_bytes(&scratch[..produced])?;
            offset += consumed;

            match status {
                Status::StreamEnd => break,
                Status::BufError if consumed == 0 && produced == 0 => {
                    return Err(DeflateError::Stalled {
                        consumed: offset,
                        total: input.len(),
                    });
                }
                Status::Ok | Status::BufError => {}
            }
        }

        debug!(
            "deflated string buffer from {} to {} bytes",
            self.len(),
            compressed.len()
        );
        self.swap(&mut compressed);
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn counter_delta(after: u64, before: u64) -> usize {
    (after - before) as usize
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use alloc::vec::Vec;
    use flate2::read::ZlibDecoder;

    use crate::{DeflateOptions, StringBuffer};

    fn inflate(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ZlibDecoder::new(bytes).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn deflate_round_trips() {
        let mut buffer = StringBuffer::new();
        for i in 0..2_000 {
            buffer.append_str("row ").unwrap();
            buffer.append_i32(i).unwrap();
            buffer.append_byte(b'\n').unwrap();
        }
        let original = buffer.as_bytes().to_vec();

        buffer.deflate(DeflateOptions::default()).unwrap();
        assert!(buffer.len() < original.len());
        assert_eq!(buffer.as_bytes_with_nul().last(), Some(&0));
        assert_eq!(inflate(buffer.as_bytes()), original);
    }

    #[test]
    fn tiny_chunks_produce_the_same_stream_content() {
        let mut buffer = StringBuffer::new();
        buffer.append_str("abcabcabcabcabcabc, and then something else").unwrap();
        let original = buffer.as_bytes().to_vec();

        buffer
            .deflate(DeflateOptions {
                chunk_size: 3,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(inflate(buffer.as_bytes()), original);
    }

    #[test]
    fn empty_buffer_deflates_to_valid_stream() {
        let mut buffer = StringBuffer::new();
        buffer
            .deflate(DeflateOptions {
                level: 0,
                chunk_size: 0,
            })
            .unwrap();
        assert!(!buffer.is_empty());
        assert!(inflate(buffer.as_bytes()).is_empty());
    }
}
