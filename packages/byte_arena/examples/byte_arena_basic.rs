//! Basic example demonstrating the `byte_arena` allocate/release cycle.
//!
//! A small arena is carved into blocks, written through, and coalesced back
//! into one piece as blocks are returned.
//!
//! Run with: `cargo run --example byte_arena_basic`.

use byte_arena::ByteArena;
use new_zealand::nz;

fn main() {
    let mut arena = ByteArena::new(nz!(65536));
    println!("arena of {} bytes reserved", arena.capacity());

    // Carve out three blocks.
    let greeting = arena.allocate(64).expect("fresh arena has room");
    let numbers = arena.allocate(256).expect("fresh arena has room");
    let scratch = arena.allocate(1024).expect("fresh arena has room");

    println!(
        "three blocks of {}, {} and {} usable bytes handed out",
        greeting.len(),
        numbers.len(),
        scratch.len()
    );

    // The blocks are ordinary writable memory.
    // SAFETY: The pointers come from live allocations of sufficient size.
    unsafe {
        let target = greeting.cast::<u8>();
        for (index, byte) in b"hello from the arena".iter().enumerate() {
            target.add(index).write(*byte);
        }
    }

    // Return everything. Address-adjacent free blocks merge back together.
    // SAFETY: Each handle came from this arena and is released exactly once.
    unsafe {
        arena.release(greeting.cast::<u8>());
        arena.release(numbers.cast::<u8>());
        arena.release(scratch.cast::<u8>());
    }

    // The whole usable arena is available as one piece again.
    let everything = arena
        .allocate(arena.usable_capacity())
        .expect("all blocks were returned and coalesced");
    println!(
        "after release, a single {} byte allocation succeeds",
        everything.len()
    );

    // SAFETY: Released exactly once, came from this arena.
    unsafe {
        arena.release(everything.cast::<u8>());
    }
}
