#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A block-splitting, block-coalescing allocator over a single fixed-size
//! contiguous memory arena.
//!
//! This crate provides [`ByteArena`], an explicit owning allocator object
//! carved from one contiguous byte region reserved at construction time.
//! Blocks are handed out by [`allocate()`][ByteArena::allocate] using a
//! first-fit search over a singly linked list of block headers, split when the
//! chosen block is comfortably larger than the request, and merged back with
//! their address-adjacent neighbors when returned via
//! [`release()`][ByteArena::release].
//!
//! The arena never grows: when no free block is large enough, `allocate()`
//! returns `None` and the caller must cope. This makes the allocator suitable
//! for bounding the memory use of a subsystem ahead of time.
//!
//! Each arena is an independent value owned by its creator - there is no
//! process-wide state, so tests and subsystems can each hold their own arena
//! without interfering with one another.
//!
//! This is part of the [Keel project](https://github.com/keel-rs/keel) that
//! provides low-level building blocks for binary data handling and manual
//! memory management in Rust.
//!
//! # Example
//!
//! ```
//! use byte_arena::ByteArena;
//! use new_zealand::nz;
//!
//! let mut arena = ByteArena::new(nz!(4096));
//!
//! let block = arena.allocate(100).expect("fresh arena has room");
//!
//! // Every handed-out block is 8-byte aligned and at least as large
//! // as the request.
//! assert_eq!(block.cast::<u8>().addr().get() % 8, 0);
//! assert!(block.len() >= 100);
//!
//! // Returning the block makes the space reusable.
//! // SAFETY: The handle came from this arena and is released only once.
//! unsafe {
//!     arena.release(block.cast::<u8>());
//! }
//! ```
//!
//! # Thread safety
//!
//! A [`ByteArena`] is thread-mobile ([`Send`]) and can be transferred between
//! threads, but it performs no internal synchronization; allocation and
//! release must happen on one thread of execution at a time. For concurrent
//! use, wrap the arena in a lock or give each thread its own arena.

mod arena;

pub use arena::*;
