use std::fs;
use std::path::Path;

use crate::{Result, TypedBuffer};

/// Writes the written region of `buffer` (exactly `cursor` bytes) to a binary
/// file at `path`, overwriting any existing file.
///
/// # Errors
///
/// Returns [`Error::Io`][crate::Error::Io] if the file cannot be created or
/// fully written.
///
/// # Example
///
/// ```
/// use typed_buffer::TypedBuffer;
///
/// let directory = tempfile::tempdir()?;
/// let path = directory.path().join("record.bin");
///
/// let mut buffer = TypedBuffer::with_capacity(16)?;
/// buffer.put(7_u32)?;
/// typed_buffer::write_to_file(&buffer, &path)?;
///
/// let mut loaded = TypedBuffer::default();
/// typed_buffer::read_from_file(&mut loaded, &path)?;
/// assert_eq!(loaded.get::<u32>()?, 7);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_to_file(buffer: &TypedBuffer, path: impl AsRef<Path>) -> Result<()> {
    fs::write(path, buffer.written())?;

    Ok(())
}

/// Reads the entire file at `path` and assigns `buffer` from its contents:
/// capacity becomes the file size and the cursor resets to zero.
///
/// # Errors
///
/// Returns [`Error::Io`][crate::Error::Io] if the file cannot be opened or
/// read, or [`Error::InvalidSize`][crate::Error::InvalidSize] if the file is
/// empty.
pub fn read_from_file(buffer: &mut TypedBuffer, path: impl AsRef<Path>) -> Result<()> {
    let contents = fs::read(path)?;

    buffer.assign(&contents)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn round_trip_through_a_file() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("buffer.bin");

        let mut buffer = TypedBuffer::with_capacity(64).unwrap();
        buffer.put(42_u32).unwrap();
        buffer.put_string(b"persisted").unwrap();

        write_to_file(&buffer, &path).unwrap();

        let mut loaded = TypedBuffer::default();
        read_from_file(&mut loaded, &path).unwrap();

        // Only the written region is persisted, not the unwritten tail.
        assert_eq!(loaded.capacity(), buffer.cursor());
        assert_eq!(loaded.get::<u32>().unwrap(), 42);
        assert_eq!(loaded.get_string().unwrap(), b"persisted");
    }

    #[test]
    fn write_overwrites_an_existing_file() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("buffer.bin");

        let mut long = TypedBuffer::with_capacity(16).unwrap();
        long.put(u64::MAX).unwrap();
        write_to_file(&long, &path).unwrap();

        let mut short = TypedBuffer::with_capacity(16).unwrap();
        short.put(5_u16).unwrap();
        write_to_file(&short, &path).unwrap();

        let mut loaded = TypedBuffer::default();
        read_from_file(&mut loaded, &path).unwrap();
        assert_eq!(loaded.capacity(), 2);
        assert_eq!(loaded.get::<u16>().unwrap(), 5);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("does-not-exist.bin");

        let mut buffer = TypedBuffer::default();
        let result = read_from_file(&mut buffer, &path);

        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn empty_file_is_an_invalid_size_error() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("empty.bin");
        std::fs::write(&path, []).unwrap();

        let mut buffer = TypedBuffer::default();
        let result = read_from_file(&mut buffer, &path);

        assert!(matches!(result, Err(Error::InvalidSize)));
    }
}
