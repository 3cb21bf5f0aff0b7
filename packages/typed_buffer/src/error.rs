use thiserror::Error;

/// Errors that can occur when constructing or using a [`TypedBuffer`][crate::TypedBuffer].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A requested capacity was zero, or a source byte sequence was empty, at
    /// construction or reassignment time.
    #[error("buffer capacity must be greater than zero")]
    InvalidSize,

    /// An encode operation would advance the cursor past the buffer's fixed
    /// capacity. Nothing is written and the cursor does not move.
    #[error(
        "writing {requested} bytes at cursor {cursor} exceeds the buffer capacity of {capacity}"
    )]
    CapacityExceeded {
        /// Number of bytes the failed write required.
        requested: usize,

        /// Cursor position at the time of the failed write.
        cursor: usize,

        /// Fixed capacity of the buffer.
        capacity: usize,
    },

    /// A decode operation would read past the buffer's capacity. Nothing is
    /// read and the cursor does not move.
    #[error(
        "reading {requested} bytes at cursor {cursor} exceeds the buffer capacity of {capacity}"
    )]
    OutOfBounds {
        /// Number of bytes the failed read required.
        requested: usize,

        /// Cursor position at the time of the failed read.
        cursor: usize,

        /// Fixed capacity of the buffer.
        capacity: usize,
    },

    /// A persistence helper could not open, read or write the target file.
    #[error("file operation failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// A specialized `Result` type for typed buffer operations, returning the
/// crate's [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn capacity_exceeded_reports_the_offending_write() {
        let error = Error::CapacityExceeded {
            requested: 8,
            cursor: 60,
            capacity: 64,
        };

        let message = error.to_string();
        assert!(message.contains('8'));
        assert!(message.contains("60"));
        assert!(message.contains("64"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = Error::from(io);

        assert!(matches!(error, Error::Io { .. }));
    }
}
