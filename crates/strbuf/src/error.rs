use thiserror::Error;

/// Failure of a [`StringBuffer`](crate::StringBuffer) operation.
///
/// Growing the storage is the only thing that can fail. The buffer is left
/// exactly as it was before the failing call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The allocator could not provide the requested capacity.
    #[error("out of memory")]
    OutOfMemory,
}

impl From<alloc::collections::TryReserveError> for Error {
    fn from(_: alloc::collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}
