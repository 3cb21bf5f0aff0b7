use std::iter::Copied;
use std::slice::Iter;

use crate::{Error, Result, Scalar};

/// Width of the length prefix written before every string payload.
const LENGTH_PREFIX_WIDTH: usize = size_of::<u64>();

/// A fixed-capacity byte buffer with a single cursor that only moves forward.
///
/// The buffer owns a contiguous, zero-initialized byte region whose length is
/// fixed at construction (the *capacity*) and a cursor marking the single
/// write/read position. Typed `put`/`get` operations serialize values into
/// consecutive bytes and deserialize them back in the same order; the buffer
/// is append/consume-only and is not randomly addressable through its public
/// API.
///
/// Encoding past the capacity fails with [`Error::CapacityExceeded`]; the
/// buffer never silently truncates or reallocates on a write. Growing is only
/// possible through the explicit [`reserve()`][Self::reserve] call.
///
/// # Example
///
/// ```
/// use typed_buffer::TypedBuffer;
///
/// let mut buffer = TypedBuffer::with_capacity(16)?;
/// buffer.put(7_u16)?;
/// buffer.put(-1_i64)?;
///
/// let mut reader = TypedBuffer::from_bytes(buffer.written())?;
/// assert_eq!(reader.get::<u16>()?, 7);
/// assert_eq!(reader.get::<i64>()?, -1);
/// # Ok::<(), typed_buffer::Error>(())
/// ```
///
/// # Thread safety
///
/// The buffer is thread-mobile ([`Send`]) and can be transferred between
/// threads, but it performs no internal synchronization and is meant to be
/// used from one thread of execution at a time.
#[derive(Clone, Debug, Default)]
pub struct TypedBuffer {
    /// Backing storage. Its length is the capacity of the buffer; bytes at
    /// and beyond `cursor` are zero until written.
    bytes: Vec<u8>,

    /// The single write/read position, `0 <= cursor <= bytes.len()`. Only
    /// ever advances; [`cleanup()`][Self::cleanup] and
    /// [`assign()`][Self::assign] reset it to zero along with the storage.
    cursor: usize,
}

impl TypedBuffer {
    /// Creates a buffer with `capacity` zero-initialized bytes reserved and
    /// the cursor at zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSize`] if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidSize);
        }

        Ok(Self {
            bytes: vec![0; capacity],
            cursor: 0,
        })
    }

    /// Creates a buffer whose capacity equals the source length, with the
    /// source contents copied in and the cursor at zero.
    ///
    /// This is the decode-side constructor: feed it bytes previously produced
    /// by a sequence of `put` calls and read them back in the same order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSize`] if `source` is empty.
    pub fn from_bytes(source: &[u8]) -> Result<Self> {
        if source.is_empty() {
            return Err(Error::InvalidSize);
        }

        Ok(Self {
            bytes: source.to_vec(),
            cursor: 0,
        })
    }

    /// Grows the underlying storage to at least `capacity` bytes,
    /// zero-filling the new tail.
    ///
    /// Already-written data and the cursor are unchanged. A `capacity` at or
    /// below the current capacity is a no-op; the buffer never shrinks.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.bytes.len() {
            self.bytes.resize(capacity, 0);
        }
    }

    /// Replaces the buffer contents with a copy of `source`, setting the
    /// capacity to the source length and resetting the cursor to zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSize`] if `source` is empty. The buffer is
    /// unchanged in that case.
    pub fn assign(&mut self, source: &[u8]) -> Result<()> {
        if source.is_empty() {
            return Err(Error::InvalidSize);
        }

        self.bytes.clear();
        self.bytes.extend_from_slice(source);
        self.cursor = 0;

        Ok(())
    }

    /// Advances the cursor by `n` bytes without writing, to account for bytes
    /// written into the storage by an external party. A zero `n` is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the advance would move the cursor past the capacity; the
    /// cursor can never point outside the buffer.
    pub fn skip(&mut self, n: usize) {
        if n == 0 {
            return;
        }

        let target = self
            .cursor
            .checked_add(n)
            .filter(|target| *target <= self.bytes.len())
            .unwrap_or_else(|| {
                panic!(
                    "skip({n}) at cursor {} would exceed the buffer capacity of {}",
                    self.cursor,
                    self.bytes.len()
                )
            });

        self.cursor = target;
    }

    /// Appends the native-endian bytes of `value` at the cursor and advances
    /// the cursor by the value's width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if the write would cross the
    /// capacity. Nothing is written and the cursor does not move.
    ///
    /// # Example
    ///
    /// ```
    /// use typed_buffer::TypedBuffer;
    ///
    /// let mut buffer = TypedBuffer::with_capacity(8)?;
    /// buffer.put(0x1234_u16)?;
    /// assert_eq!(buffer.cursor(), 2);
    /// # Ok::<(), typed_buffer::Error>(())
    /// ```
    pub fn put<T: Scalar>(&mut self, value: T) -> Result<()> {
        let end = self.writable_end(T::WIDTH)?;

        let target = self
            .bytes
            .get_mut(self.cursor..end)
            .expect("range was verified by the capacity check above");
        value.write_bytes(target);

        self.cursor = end;

        Ok(())
    }

    /// Appends an 8-byte length prefix followed by the raw bytes of `value`,
    /// advancing the cursor past both.
    ///
    /// The content is treated as opaque bytes; it is not required to be
    /// valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if the combined prefix and payload
    /// would cross the capacity. Nothing is written (not even the prefix) and
    /// the cursor does not move.
    pub fn put_string(&mut self, value: &[u8]) -> Result<()> {
        let total = LENGTH_PREFIX_WIDTH
            .checked_add(value.len())
            .ok_or(Error::CapacityExceeded {
                requested: usize::MAX,
                cursor: self.cursor,
                capacity: self.bytes.len(),
            })?;
        let end = self.writable_end(total)?;

        // Cannot overflow: end was bounds-checked above and the prefix is the
        // first part of the total.
        let payload_start = self.cursor.wrapping_add(LENGTH_PREFIX_WIDTH);

        let length = u64::try_from(value.len())
            .expect("byte slice lengths fit in u64 on all supported platforms");

        self.bytes
            .get_mut(self.cursor..payload_start)
            .expect("prefix range was verified by the capacity check above")
            .copy_from_slice(&length.to_ne_bytes());
        self.bytes
            .get_mut(payload_start..end)
            .expect("payload range was verified by the capacity check above")
            .copy_from_slice(value);

        self.cursor = end;

        Ok(())
    }

    /// Reads a value of type `T` at the cursor and advances the cursor by the
    /// value's width.
    ///
    /// On an empty buffer (zero capacity) this returns
    /// [`T::SENTINEL`][Scalar::SENTINEL] instead of failing; see the crate
    /// documentation for the sentinel-on-empty contract.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the buffer is non-empty but has
    /// fewer bytes remaining than the value requires. Nothing is read and the
    /// cursor does not move.
    pub fn get<T: Scalar>(&mut self) -> Result<T> {
        if self.bytes.is_empty() {
            return Ok(T::SENTINEL);
        }

        let end = self.readable_end(self.cursor, T::WIDTH)?;

        let source = self
            .bytes
            .get(self.cursor..end)
            .expect("range was verified by the bounds check above");
        let value = T::read_bytes(source);

        self.cursor = end;

        Ok(value)
    }

    /// Reads an 8-byte length prefix and then that many bytes, returning them
    /// as an owned byte string and advancing the cursor past both.
    ///
    /// On an empty buffer (zero capacity) this returns an empty vector
    /// instead of failing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if either the prefix or the payload
    /// would read past the capacity. Nothing is read and the cursor does not
    /// move.
    pub fn get_string(&mut self) -> Result<Vec<u8>> {
        let Some((start, end)) = self.advance_over_string()? else {
            return Ok(Vec::new());
        };

        Ok(self
            .bytes
            .get(start..end)
            .expect("range was verified by advance_over_string")
            .to_vec())
    }

    /// Reads an 8-byte length prefix and then that many bytes, returning them
    /// as a borrow of the buffer's own storage and advancing the cursor past
    /// both.
    ///
    /// On an empty buffer (zero capacity) this returns an empty slice instead
    /// of failing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if either the prefix or the payload
    /// would read past the capacity. Nothing is read and the cursor does not
    /// move.
    pub fn get_string_view(&mut self) -> Result<&[u8]> {
        let Some((start, end)) = self.advance_over_string()? else {
            return Ok(&[]);
        };

        Ok(self
            .bytes
            .get(start..end)
            .expect("range was verified by advance_over_string"))
    }

    /// Whether `n` more bytes fit between the cursor and the capacity.
    #[must_use]
    pub fn is_enough(&self, n: usize) -> bool {
        self.cursor
            .checked_add(n)
            .is_some_and(|end| end <= self.bytes.len())
    }

    /// Whether the buffer has non-empty storage.
    ///
    /// `false` only for a default-constructed or [`cleanup()`][Self::cleanup]
    /// buffer; such buffers serve sentinel values from every getter.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.bytes.is_empty()
    }

    /// Releases the storage, resetting capacity and cursor to zero.
    ///
    /// After cleanup the buffer behaves like a default-constructed one:
    /// getters return sentinels and every put fails.
    pub fn cleanup(&mut self) {
        self.bytes = Vec::new();
        self.cursor = 0;
    }

    /// The fixed capacity of the buffer in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// The current write/read position.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The written region of the buffer: every byte from the start up to the
    /// cursor.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        self.bytes
            .get(..self.cursor)
            .expect("cursor never exceeds the storage length")
    }

    /// Iterates over the written region as bytes.
    ///
    /// The iterator is finite and restartable: each call starts a fresh pass
    /// over `[0, cursor)` rather than consuming the buffer.
    #[must_use]
    pub fn iter(&self) -> Copied<Iter<'_, u8>> {
        self.written().iter().copied()
    }

    /// The exclusive end of a write of `requested` bytes at the cursor, if it
    /// fits the capacity.
    fn writable_end(&self, requested: usize) -> Result<usize> {
        self.cursor
            .checked_add(requested)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(Error::CapacityExceeded {
                requested,
                cursor: self.cursor,
                capacity: self.bytes.len(),
            })
    }

    /// The exclusive end of a read of `requested` bytes at `start`, if it
    /// stays within the capacity.
    fn readable_end(&self, start: usize, requested: usize) -> Result<usize> {
        start
            .checked_add(requested)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(Error::OutOfBounds {
                requested,
                cursor: self.cursor,
                capacity: self.bytes.len(),
            })
    }

    /// Decodes the length prefix at the cursor and advances the cursor past
    /// the prefix and payload, returning the payload byte range.
    ///
    /// Returns `None` for the empty-buffer sentinel case. The cursor moves
    /// only when the whole string (prefix and payload) is in bounds.
    fn advance_over_string(&mut self) -> Result<Option<(usize, usize)>> {
        if self.bytes.is_empty() {
            return Ok(None);
        }

        let payload_start = self.readable_end(self.cursor, LENGTH_PREFIX_WIDTH)?;

        let prefix = self
            .bytes
            .get(self.cursor..payload_start)
            .expect("range was verified by the bounds check above");
        let raw_length = u64::read_bytes(prefix);

        // A length beyond the address space cannot fit in any buffer either;
        // saturate and let the bounds check below reject it.
        let length = usize::try_from(raw_length).unwrap_or(usize::MAX);

        let payload_end = self.readable_end(payload_start, length)?;

        self.cursor = payload_end;

        Ok(Some((payload_start, payload_end)))
    }
}

impl<'b> IntoIterator for &'b TypedBuffer {
    type Item = u8;
    type IntoIter = Copied<Iter<'b, u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(
    clippy::arithmetic_side_effects,
    clippy::float_cmp,
    reason = "test code doesn't need the same rigor as production code"
)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test() {
        let mut buffer = TypedBuffer::with_capacity(64).unwrap();

        buffer.put(42_u32).unwrap();
        buffer.put(true).unwrap();
        buffer.put_string(b"hi").unwrap();

        assert_eq!(buffer.cursor(), 4 + 1 + 8 + 2);

        let mut reader = TypedBuffer::from_bytes(buffer.written()).unwrap();
        assert_eq!(reader.get::<u32>().unwrap(), 42);
        assert!(reader.get::<bool>().unwrap());
        assert_eq!(reader.get_string().unwrap(), b"hi");
        assert_eq!(reader.cursor(), 15);
    }

    #[test]
    fn scalar_round_trip_every_type() {
        let mut buffer = TypedBuffer::with_capacity(128).unwrap();

        buffer.put(-8_i8).unwrap();
        buffer.put(200_u8).unwrap();
        buffer.put(-16_000_i16).unwrap();
        buffer.put(60_000_u16).unwrap();
        buffer.put(i32::MIN).unwrap();
        buffer.put(u32::MAX).unwrap();
        buffer.put(i64::MAX).unwrap();
        buffer.put(u64::MAX).unwrap();
        buffer.put(false).unwrap();
        buffer.put(1.25_f32).unwrap();
        buffer.put(-9.75_f64).unwrap();

        let mut reader = TypedBuffer::from_bytes(buffer.written()).unwrap();
        assert_eq!(reader.get::<i8>().unwrap(), -8);
        assert_eq!(reader.get::<u8>().unwrap(), 200);
        assert_eq!(reader.get::<i16>().unwrap(), -16_000);
        assert_eq!(reader.get::<u16>().unwrap(), 60_000);
        assert_eq!(reader.get::<i32>().unwrap(), i32::MIN);
        assert_eq!(reader.get::<u32>().unwrap(), u32::MAX);
        assert_eq!(reader.get::<i64>().unwrap(), i64::MAX);
        assert_eq!(reader.get::<u64>().unwrap(), u64::MAX);
        assert!(!reader.get::<bool>().unwrap());
        assert_eq!(reader.get::<f32>().unwrap(), 1.25);
        assert_eq!(reader.get::<f64>().unwrap(), -9.75);
    }

    #[test]
    fn string_round_trip_various_lengths() {
        for length in [0_usize, 1, 4096] {
            let payload = vec![0xA5_u8; length];

            let mut buffer = TypedBuffer::with_capacity(length + LENGTH_PREFIX_WIDTH).unwrap();
            buffer.put_string(&payload).unwrap();

            let mut reader = TypedBuffer::from_bytes(buffer.written()).unwrap();
            let decoded = reader.get_string().unwrap();

            assert_eq!(decoded.len(), length);
            assert_eq!(decoded, payload);
        }
    }

    #[test]
    fn string_view_borrows_the_same_bytes() {
        let mut buffer = TypedBuffer::with_capacity(32).unwrap();
        buffer.put_string(b"not utf8: \xFF\xFE").unwrap();

        let mut reader = TypedBuffer::from_bytes(buffer.written()).unwrap();
        let view = reader.get_string_view().unwrap();

        assert_eq!(view, b"not utf8: \xFF\xFE");
    }

    #[test]
    fn construction_rejects_zero_capacity() {
        assert!(matches!(
            TypedBuffer::with_capacity(0),
            Err(Error::InvalidSize)
        ));
        assert!(matches!(
            TypedBuffer::from_bytes(&[]),
            Err(Error::InvalidSize)
        ));
    }

    #[test]
    fn capacity_is_enforced_exactly_at_the_crossing_put() {
        let mut buffer = TypedBuffer::with_capacity(10).unwrap();

        buffer.put(1_u32).unwrap();
        buffer.put(2_u32).unwrap();

        // Two bytes remain; a u32 does not fit.
        let result = buffer.put(3_u32);
        assert!(matches!(
            result,
            Err(Error::CapacityExceeded {
                requested: 4,
                cursor: 8,
                capacity: 10,
            })
        ));

        // The failed put did not advance the cursor.
        assert_eq!(buffer.cursor(), 8);

        // A value that does fit still succeeds afterwards.
        buffer.put(9_u16).unwrap();
        assert_eq!(buffer.cursor(), 10);
    }

    #[test]
    fn put_string_counts_the_prefix_against_capacity() {
        // Room for the payload alone but not for prefix + payload.
        let mut buffer = TypedBuffer::with_capacity(10).unwrap();

        let result = buffer.put_string(b"hello");
        assert!(matches!(result, Err(Error::CapacityExceeded { .. })));
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn empty_buffer_serves_sentinels() {
        let mut buffer = TypedBuffer::default();

        assert!(!buffer.is_valid());
        assert_eq!(buffer.get::<i8>().unwrap(), -1);
        assert_eq!(buffer.get::<i16>().unwrap(), -1);
        assert_eq!(buffer.get::<i32>().unwrap(), -1);
        assert_eq!(buffer.get::<i64>().unwrap(), -1);
        assert_eq!(buffer.get::<u8>().unwrap(), u8::MAX);
        assert_eq!(buffer.get::<u16>().unwrap(), u16::MAX);
        assert_eq!(buffer.get::<u32>().unwrap(), u32::MAX);
        assert_eq!(buffer.get::<u64>().unwrap(), u64::MAX);
        assert!(!buffer.get::<bool>().unwrap());
        assert_eq!(buffer.get::<f32>().unwrap(), 0.0);
        assert_eq!(buffer.get::<f64>().unwrap(), 0.0);
        assert_eq!(buffer.get_string().unwrap(), Vec::<u8>::new());
        assert_eq!(buffer.get_string_view().unwrap(), &[] as &[u8]);

        // Sentinel reads never advance the cursor.
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn underfilled_buffer_read_is_out_of_bounds() {
        // Two real bytes; a u32 read must fail rather than read past the end.
        let mut reader = TypedBuffer::from_bytes(&[1, 2]).unwrap();

        let result = reader.get::<u32>();
        assert!(matches!(
            result,
            Err(Error::OutOfBounds {
                requested: 4,
                cursor: 0,
                capacity: 2,
            })
        ));
        assert_eq!(reader.cursor(), 0);
    }

    #[test]
    fn string_with_lying_length_prefix_is_out_of_bounds() {
        let mut buffer = TypedBuffer::with_capacity(16).unwrap();
        buffer.put(1_000_u64).unwrap(); // Reads back as a length prefix of 1000.

        let mut reader = TypedBuffer::from_bytes(buffer.written()).unwrap();
        let result = reader.get_string();

        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
        assert_eq!(reader.cursor(), 0);
    }

    #[test]
    fn skip_accounts_for_external_writes() {
        let mut buffer = TypedBuffer::with_capacity(16).unwrap();

        buffer.skip(0);
        assert_eq!(buffer.cursor(), 0);

        buffer.skip(10);
        assert_eq!(buffer.cursor(), 10);

        buffer.put(1_u32).unwrap();
        assert_eq!(buffer.cursor(), 14);
    }

    #[test]
    #[should_panic]
    fn skip_past_capacity_panics() {
        let mut buffer = TypedBuffer::with_capacity(4).unwrap();
        buffer.skip(5);
    }

    #[test]
    fn reserve_grows_without_disturbing_written_data() {
        let mut buffer = TypedBuffer::with_capacity(4).unwrap();
        buffer.put(0xDEAD_BEEF_u32).unwrap();

        assert!(matches!(
            buffer.put(1_u8),
            Err(Error::CapacityExceeded { .. })
        ));

        buffer.reserve(16);
        assert_eq!(buffer.capacity(), 16);
        buffer.put(1_u8).unwrap();

        let mut reader = TypedBuffer::from_bytes(buffer.written()).unwrap();
        assert_eq!(reader.get::<u32>().unwrap(), 0xDEAD_BEEF);
        assert_eq!(reader.get::<u8>().unwrap(), 1);

        // Shrinking is a no-op.
        buffer.reserve(2);
        assert_eq!(buffer.capacity(), 16);
    }

    #[test]
    fn assign_replaces_contents_and_resets_cursor() {
        let mut buffer = TypedBuffer::with_capacity(8).unwrap();
        buffer.put(1_u64).unwrap();

        buffer.assign(&[9, 9, 9]).unwrap();
        assert_eq!(buffer.capacity(), 3);
        assert_eq!(buffer.cursor(), 0);
        assert_eq!(buffer.get::<u8>().unwrap(), 9);

        assert!(matches!(buffer.assign(&[]), Err(Error::InvalidSize)));
        // The failed assign left the buffer untouched.
        assert_eq!(buffer.capacity(), 3);
    }

    #[test]
    fn is_enough_matches_put_outcomes() {
        let mut buffer = TypedBuffer::with_capacity(6).unwrap();
        buffer.put(0_u32).unwrap();

        assert!(buffer.is_enough(2));
        assert!(!buffer.is_enough(3));
        assert!(!buffer.is_enough(usize::MAX));
    }

    #[test]
    fn cleanup_releases_storage() {
        let mut buffer = TypedBuffer::with_capacity(8).unwrap();
        buffer.put(5_u32).unwrap();

        buffer.cleanup();

        assert!(!buffer.is_valid());
        assert_eq!(buffer.capacity(), 0);
        assert_eq!(buffer.cursor(), 0);
        assert_eq!(buffer.get::<i32>().unwrap(), -1);
    }

    #[test]
    fn iteration_covers_the_written_region_and_restarts() {
        let mut buffer = TypedBuffer::with_capacity(8).unwrap();
        buffer.put(0x01020304_u32).unwrap();

        let first: Vec<u8> = buffer.iter().collect();
        let second: Vec<u8> = (&buffer).into_iter().collect();

        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
        assert_eq!(first, buffer.written());
    }

    #[test]
    fn written_region_excludes_unwritten_tail() {
        let mut buffer = TypedBuffer::with_capacity(32).unwrap();
        buffer.put(1_u16).unwrap();

        assert_eq!(buffer.written().len(), 2);
        assert_eq!(buffer.capacity(), 32);
    }
}
