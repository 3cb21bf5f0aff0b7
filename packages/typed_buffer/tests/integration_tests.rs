//! Integration tests exercising the public `typed_buffer` API end to end:
//! mixed-type records, growth, persistence and the empty-buffer contract.
#![allow(
    clippy::float_cmp,
    reason = "round-trip tests compare bit-identical floats"
)]

use typed_buffer::{Error, TypedBuffer};

/// Encodes one "sensor report" record the way a caller with an implicit
/// schema would.
fn encode_report(buffer: &mut TypedBuffer) -> Result<(), Error> {
    buffer.put(0x5EED_u16)?; // Station id.
    buffer.put(-40_i8)?; // Temperature.
    buffer.put(101_325_u32)?; // Pressure.
    buffer.put(true)?; // Heater on.
    buffer.put_string(b"north ridge")?; // Location label.
    buffer.put(21.125_f64)?; // Battery voltage.

    Ok(())
}

#[test]
fn mixed_record_round_trips_through_bytes() {
    let mut buffer = TypedBuffer::with_capacity(256).unwrap();
    encode_report(&mut buffer).unwrap();

    // 2 + 1 + 4 + 1 + (8 + 11) + 8 bytes, in write order.
    assert_eq!(buffer.cursor(), 35);

    let mut reader = TypedBuffer::from_bytes(buffer.written()).unwrap();
    assert_eq!(reader.get::<u16>().unwrap(), 0x5EED);
    assert_eq!(reader.get::<i8>().unwrap(), -40);
    assert_eq!(reader.get::<u32>().unwrap(), 101_325);
    assert!(reader.get::<bool>().unwrap());
    assert_eq!(reader.get_string_view().unwrap(), b"north ridge");
    assert_eq!(reader.get::<f64>().unwrap(), 21.125);

    assert_eq!(reader.cursor(), 35);
}

#[test]
fn record_round_trips_through_a_file() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("report.bin");

    let mut buffer = TypedBuffer::with_capacity(256).unwrap();
    encode_report(&mut buffer).unwrap();
    typed_buffer::write_to_file(&buffer, &path).unwrap();

    let mut loaded = TypedBuffer::default();
    typed_buffer::read_from_file(&mut loaded, &path).unwrap();

    assert_eq!(loaded.capacity(), buffer.cursor());
    assert_eq!(loaded.written(), &[] as &[u8]);

    assert_eq!(loaded.get::<u16>().unwrap(), 0x5EED);
    assert_eq!(loaded.get::<i8>().unwrap(), -40);
    assert_eq!(loaded.get::<u32>().unwrap(), 101_325);
    assert!(loaded.get::<bool>().unwrap());
    assert_eq!(loaded.get_string().unwrap(), b"north ridge");
    assert_eq!(loaded.get::<f64>().unwrap(), 21.125);
}

#[test]
fn reserve_allows_continuing_a_full_buffer() {
    let mut buffer = TypedBuffer::with_capacity(8).unwrap();
    buffer.put(u64::MAX).unwrap();

    assert!(matches!(
        buffer.put(1_u8),
        Err(Error::CapacityExceeded { .. })
    ));

    buffer.reserve(64);
    encode_report(&mut buffer).unwrap();

    let mut reader = TypedBuffer::from_bytes(buffer.written()).unwrap();
    assert_eq!(reader.get::<u64>().unwrap(), u64::MAX);
    assert_eq!(reader.get::<u16>().unwrap(), 0x5EED);
}

#[test]
fn cleaned_up_buffer_behaves_like_an_empty_one() {
    let mut buffer = TypedBuffer::with_capacity(64).unwrap();
    encode_report(&mut buffer).unwrap();

    buffer.cleanup();

    assert!(!buffer.is_valid());
    assert_eq!(buffer.get::<u32>().unwrap(), u32::MAX);
    assert_eq!(buffer.get_string().unwrap(), Vec::<u8>::new());
    assert!(matches!(
        buffer.put(1_u8),
        Err(Error::CapacityExceeded { .. })
    ));
}

#[test]
fn iteration_yields_the_persisted_bytes() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("iterated.bin");

    let mut buffer = TypedBuffer::with_capacity(64).unwrap();
    encode_report(&mut buffer).unwrap();
    typed_buffer::write_to_file(&buffer, &path).unwrap();

    let on_disk = std::fs::read(&path).unwrap();
    let iterated: Vec<u8> = buffer.iter().collect();

    assert_eq!(iterated, on_disk);
}
