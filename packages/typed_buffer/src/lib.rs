#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A fixed-capacity byte buffer with a single advancing cursor, encoding and
//! decoding a closed set of primitive value types under explicit bounds checks.
//!
//! This crate provides [`TypedBuffer`], an owned contiguous byte region with a
//! write/read position that only moves forward. Values are appended with
//! [`put()`][TypedBuffer::put] and [`put_string()`][TypedBuffer::put_string]
//! and read back with [`get()`][TypedBuffer::get],
//! [`get_string()`][TypedBuffer::get_string] and
//! [`get_string_view()`][TypedBuffer::get_string_view], in the exact order and
//! with the exact types they were written. The wire format carries no type
//! tags or self-description; the caller supplies the schema implicitly through
//! call order. This trades flexibility for a compact format and a trivially
//! predictable layout.
//!
//! This is part of the [Keel project](https://github.com/keel-rs/keel) that
//! provides low-level building blocks for binary data handling and manual
//! memory management in Rust.
//!
//! # Wire format
//!
//! * Fixed-width scalars are written as their raw bytes in the **native byte
//!   order of the platform**, with their natural width (1/2/4/8 bytes). No
//!   cross-platform canonical form is guaranteed; a buffer written on a
//!   little-endian machine is not portable to a big-endian one.
//! * Strings are written as an 8-byte unsigned length followed by that many
//!   bytes of raw content. The content is not required to be UTF-8.
//! * No header, magic number or version tag is ever written.
//!
//! The set of encodable types is closed: the [`Scalar`] trait is sealed and
//! implemented for exactly `i8`, `u8`, `i16`, `u16`, `i32`, `u32`, `i64`,
//! `u64`, `bool`, `f32` and `f64`, each identified by a [`ValueTag`]. Strings
//! and borrowed string views round out the set.
//!
//! # Example
//!
//! ```
//! use typed_buffer::TypedBuffer;
//!
//! let mut buffer = TypedBuffer::with_capacity(64)?;
//!
//! buffer.put(42_u32)?;
//! buffer.put(true)?;
//! buffer.put_string(b"hi")?;
//!
//! // 4 bytes + 1 byte + (8-byte length prefix + 2 bytes).
//! assert_eq!(buffer.cursor(), 15);
//!
//! // Reading starts from a fresh cursor, in the same order and with the
//! // same types as the writes.
//! let mut reader = TypedBuffer::from_bytes(buffer.written())?;
//! assert_eq!(reader.get::<u32>()?, 42);
//! assert!(reader.get::<bool>()?);
//! assert_eq!(reader.get_string()?, b"hi");
//! # Ok::<(), typed_buffer::Error>(())
//! ```
//!
//! # Persistence
//!
//! [`write_to_file()`] and [`read_from_file()`] are thin wrappers that move a
//! buffer's written region to and from a binary file, byte for byte. They add
//! no framing of their own; a file is exactly the bytes the cursor had passed
//! over at write time.
//!
//! # Empty-buffer sentinels
//!
//! Reads from a buffer with zero capacity do not fail; they return documented
//! sentinel values instead (`-1` for signed integers, the all-ones value for
//! unsigned integers, `0.0` for floats, `false` for `bool`, an empty string
//! for the string getters). This allows "check capacity first" usage patterns.
//! Reads from a *non-empty* buffer that has fewer bytes remaining than the
//! value requires fail with [`Error::OutOfBounds`]; the buffer never reads
//! past its end.
//!
//! # Thread safety
//!
//! [`TypedBuffer`] is an ordinary owned value with no global state. It is
//! thread-mobile ([`Send`]) but performs no internal synchronization; each
//! instance is meant to be used from one thread of execution at a time.

mod buffer;
mod error;
mod file;
mod value;

pub use buffer::*;
pub use error::*;
pub use file::*;
pub use value::*;
