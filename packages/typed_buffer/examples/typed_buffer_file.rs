//! Example demonstrating buffer persistence to and from a binary file.
//!
//! Run with: `cargo run --example typed_buffer_file`.

use typed_buffer::TypedBuffer;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let directory = tempfile::tempdir()?;
    let path = directory.path().join("settings.bin");

    // Write a buffer out. Only the written region reaches the disk.
    let mut buffer = TypedBuffer::with_capacity(256)?;
    buffer.put(3_u16)?; // Retry count.
    buffer.put(1.5_f64)?; // Backoff factor.
    buffer.put_string(b"https://example.com")?;
    typed_buffer::write_to_file(&buffer, &path)?;

    println!(
        "persisted {} of {} bytes to {}",
        buffer.cursor(),
        buffer.capacity(),
        path.display()
    );

    // Load it back. The loaded capacity equals the file size.
    let mut loaded = TypedBuffer::default();
    typed_buffer::read_from_file(&mut loaded, &path)?;

    println!("retries: {}", loaded.get::<u16>()?);
    println!("backoff: {}", loaded.get::<f64>()?);
    println!(
        "endpoint: {}",
        String::from_utf8_lossy(&loaded.get_string()?)
    );

    Ok(())
}
