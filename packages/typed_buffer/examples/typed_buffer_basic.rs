//! Basic example demonstrating the `typed_buffer` encode/decode cycle.
//!
//! A record is written field by field, then read back in the same order with
//! the same types. The wire format carries no type information; the matching
//! call order on both sides is the schema.
//!
//! Run with: `cargo run --example typed_buffer_basic`.

use typed_buffer::{Error, TypedBuffer};

fn main() -> Result<(), Error> {
    let mut buffer = TypedBuffer::with_capacity(128)?;

    // Encode a small record: an id, a flag and a name.
    buffer.put(42_u32)?;
    buffer.put(true)?;
    buffer.put_string(b"meaning of life")?;

    println!("encoded {} bytes into a {} byte buffer", buffer.cursor(), buffer.capacity());

    // Decode from the written bytes, mirroring the write order exactly.
    let mut reader = TypedBuffer::from_bytes(buffer.written())?;

    let id = reader.get::<u32>()?;
    let flag = reader.get::<bool>()?;
    let name = reader.get_string()?;

    println!("id:   {id}");
    println!("flag: {flag}");
    println!("name: {}", String::from_utf8_lossy(&name));

    assert_eq!(reader.cursor(), buffer.cursor());
    println!("reader consumed the full written region");

    Ok(())
}
