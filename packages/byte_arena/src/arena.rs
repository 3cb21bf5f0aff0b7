use std::alloc::{Layout, alloc, dealloc};
use std::num::NonZero;
use std::ptr::NonNull;

use new_zealand::nz;

/// Alignment of every block payload handed out by the arena, in bytes.
/// Requested sizes are rounded up to a multiple of this.
pub const ALIGNMENT: usize = 8;

/// Arena capacity used by [`ByteArena::default()`]: 1 MiB.
pub const DEFAULT_ARENA_CAPACITY: usize = 1024 * 1024;

/// Stride occupied by a block header, rounded up to [`ALIGNMENT`] so the
/// payload that follows a header is itself aligned.
const HEADER_SIZE: usize = size_of::<BlockHeader>().next_multiple_of(ALIGNMENT);

/// The smallest backing region that can hold one block: a header plus one
/// alignment unit of payload.
const MIN_ARENA_CAPACITY: usize = HEADER_SIZE + ALIGNMENT;

/// Metadata preceding every block in the arena: the usable payload size, the
/// free/allocated status and a link to the next header in address order.
///
/// The headers thread through the arena as a singly linked list that covers
/// every byte of the region; each block's payload directly follows its
/// header.
#[repr(C)]
#[derive(Debug)]
struct BlockHeader {
    /// Usable payload size of this block in bytes. Always a multiple of
    /// [`ALIGNMENT`].
    size: usize,

    /// Whether the block is available for allocation.
    is_free: bool,

    /// The next header in increasing address order, `None` for the last
    /// block of the arena.
    next: Option<NonNull<BlockHeader>>,
}

/// A fixed-size memory arena handing out blocks via first-fit search over a
/// linked list of block headers.
///
/// The arena reserves its backing region at construction and never grows.
/// [`allocate()`][Self::allocate] splits a larger free block when the
/// leftover is big enough to stand alone; [`release()`][Self::release] merges
/// address-adjacent free blocks so the space can be handed out again in
/// larger pieces. When no free block fits, `allocate()` returns `None` -
/// exhaustion is an expected outcome, not an error.
///
/// # Out of band access
///
/// The arena does not create or keep references to block payloads, so it is
/// valid to read and write the handed-out regions through the returned
/// pointers even while the arena is borrowed for further allocations.
/// Only the block headers, which the payload pointers never overlap, are
/// touched by the arena itself.
///
/// # Example
///
/// ```
/// use byte_arena::ByteArena;
///
/// // One arena per subsystem; this one uses the default 1 MiB capacity.
/// let mut arena = ByteArena::default();
///
/// let first = arena.allocate(100).expect("fresh arena has room");
/// let second = arena.allocate(100).expect("fresh arena has room");
///
/// // SAFETY: The handle came from this arena and is released only once.
/// unsafe {
///     arena.release(first.cast::<u8>());
/// }
///
/// // First-fit: the freed block at the start of the arena is reused.
/// let third = arena.allocate(100).expect("a block was just released");
/// assert_eq!(third.cast::<u8>(), first.cast::<u8>());
/// # unsafe { arena.release(second.cast::<u8>()); }
/// # unsafe { arena.release(third.cast::<u8>()); }
/// ```
///
/// # Thread safety
///
/// The arena is thread-mobile ([`Send`]) but not thread-safe; all calls must
/// come from one thread of execution at a time.
#[derive(Debug)]
pub struct ByteArena {
    /// Start of the backing region. The first block header lives here once
    /// the free list has been initialized.
    base: NonNull<u8>,

    /// Allocation layout of the backing region; its size is the arena
    /// capacity.
    layout: Layout,

    /// First block header in address order. `None` until the one-time lazy
    /// initialization performed by the first `allocate()` call.
    head: Option<NonNull<BlockHeader>>,
}

impl ByteArena {
    /// Reserves a new arena of `capacity` bytes, rounded up to
    /// [`ALIGNMENT`].
    ///
    /// The backing region is reserved immediately; the free list over it is
    /// built lazily by the first [`allocate()`][Self::allocate] call.
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity cannot hold at least one block header
    /// plus one alignment unit of payload.
    #[must_use]
    pub fn new(capacity: NonZero<usize>) -> Self {
        let capacity = capacity
            .get()
            .checked_next_multiple_of(ALIGNMENT)
            .expect("arena capacity rounding cannot overflow for any realistic capacity");

        assert!(
            capacity >= MIN_ARENA_CAPACITY,
            "ByteArena capacity must be at least {MIN_ARENA_CAPACITY} bytes to hold one block"
        );

        let layout = Layout::from_size_align(capacity, ALIGNMENT)
            .expect("capacity was validated above and ALIGNMENT is a power of two");

        // SAFETY: The layout has non-zero size, guaranteed by the capacity
        // assertion above.
        let base = NonNull::new(unsafe { alloc(layout) }).expect(
            "we do not intend to handle allocation failure as a real possibility - OOM results in panic",
        );

        Self {
            base,
            layout,
            head: None,
        }
    }

    /// Total size of the arena in bytes, including block headers.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.layout.size()
    }

    /// The largest payload a single allocation can ever receive: the
    /// capacity minus one block header.
    #[must_use]
    pub fn usable_capacity(&self) -> usize {
        // Cannot underflow: new() requires capacity >= MIN_ARENA_CAPACITY.
        self.layout.size().wrapping_sub(HEADER_SIZE)
    }

    /// Hands out a writable region of at least `size` bytes (rounded up to
    /// [`ALIGNMENT`]), or `None` if `size` is zero or no free block is large
    /// enough.
    ///
    /// The arena never grows past its fixed capacity, so exhaustion is
    /// signaled by the absent value rather than an error. The first call
    /// performs the one-time free list initialization.
    ///
    /// The search is first-fit: block headers are scanned from the arena
    /// start in address order and the first free block with sufficient size
    /// wins. A block noticeably larger than the request - by more than one
    /// header plus one alignment unit - is split, and the remainder stays
    /// free; otherwise the whole block is handed out and the returned slice
    /// is larger than requested.
    pub fn allocate(&mut self, size: usize) -> Option<NonNull<[u8]>> {
        if size == 0 {
            return None;
        }

        let size = size.checked_next_multiple_of(ALIGNMENT)?;

        self.ensure_initialized();

        let mut current = self.head;
        while let Some(block_ptr) = current {
            // SAFETY: Every pointer threaded through the block list was
            // written by ensure_initialized(), a split below or a merge in
            // coalesce(), all of which stay within the owned arena region.
            let block = unsafe { &mut *block_ptr.as_ptr() };

            if block.is_free && block.size >= size {
                // Cannot overflow: size is at most this block's size, which
                // is bounded by the arena capacity.
                let split_threshold = size.wrapping_add(HEADER_SIZE).wrapping_add(ALIGNMENT);

                if block.size >= split_threshold {
                    // Carve the leftover into a new trailing free block.
                    // SAFETY: The remainder header lands inside this block's
                    // span, which lies inside the arena.
                    let remainder_ptr = unsafe { block_ptr.byte_add(HEADER_SIZE.wrapping_add(size)) };

                    // Cannot underflow: block.size >= size + HEADER_SIZE per
                    // the split check above.
                    let remainder_size = block.size.wrapping_sub(size).wrapping_sub(HEADER_SIZE);

                    // SAFETY: remainder_ptr points at aligned spare bytes of
                    // a block we own; no other header overlaps them.
                    unsafe {
                        remainder_ptr.write(BlockHeader {
                            size: remainder_size,
                            is_free: true,
                            next: block.next,
                        });
                    }

                    block.size = size;
                    block.next = Some(remainder_ptr);
                }

                block.is_free = false;
                let payload_size = block.size;

                // SAFETY: The payload directly follows the header and stays
                // within the arena; HEADER_SIZE is a multiple of ALIGNMENT,
                // keeping the payload aligned.
                let payload = unsafe { block_ptr.cast::<u8>().byte_add(HEADER_SIZE) };

                #[cfg(debug_assertions)]
                self.integrity_check();

                return Some(NonNull::slice_from_raw_parts(payload, payload_size));
            }

            current = block.next;
        }

        None
    }

    /// Returns a block to the free pool and merges address-adjacent free
    /// blocks.
    ///
    /// After marking the block free, one coalescing pass walks the block
    /// list in address order and merges every adjacent pair of free blocks.
    /// The pass stays on a block after absorbing its neighbor, so a run of
    /// three or more adjacent free blocks collapses into one within the
    /// single pass. Allocated blocks are never merged.
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    ///
    /// - `handle` was returned by [`allocate()`][Self::allocate] on this
    ///   same arena (the element pointer of the returned slice);
    /// - the block has not been released before.
    ///
    /// The arena performs no bookkeeping to detect violations; a double
    /// release or a foreign handle corrupts the block list.
    pub unsafe fn release(&mut self, handle: NonNull<u8>) {
        // SAFETY: allocate() places every payload exactly HEADER_SIZE bytes
        // after its block header; the caller guarantees handle is such a
        // payload pointer.
        let block_ptr = unsafe { handle.byte_sub(HEADER_SIZE) }.cast::<BlockHeader>();

        // SAFETY: Per the caller contract this is a live header of this
        // arena, and we hold the exclusive arena reference.
        unsafe {
            (*block_ptr.as_ptr()).is_free = true;
        }

        self.coalesce();

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    /// Builds the free list on first use: zero-fills the region and writes a
    /// single free block spanning the whole usable arena. Idempotent.
    fn ensure_initialized(&mut self) {
        if self.head.is_some() {
            return;
        }

        // SAFETY: base points at layout.size() bytes owned exclusively by
        // this arena.
        unsafe {
            self.base.write_bytes(0, self.layout.size());
        }

        let head = self.base.cast::<BlockHeader>();

        // Cannot underflow: new() requires capacity >= MIN_ARENA_CAPACITY.
        let usable = self.layout.size().wrapping_sub(HEADER_SIZE);

        // SAFETY: The arena base is ALIGNMENT-aligned and large enough for a
        // header, guaranteed by the layout built in new().
        unsafe {
            head.write(BlockHeader {
                size: usable,
                is_free: true,
                next: None,
            });
        }

        self.head = Some(head);
    }

    /// One pass over the block list, merging every address-adjacent pair of
    /// free blocks.
    fn coalesce(&mut self) {
        let mut current = self.head;

        while let Some(block_ptr) = current {
            // SAFETY: List pointers are maintained by allocate() and
            // coalesce() itself and always refer to headers in this arena.
            let block = unsafe { &mut *block_ptr.as_ptr() };

            if block.is_free {
                if let Some(next_ptr) = block.next {
                    // SAFETY: next always points at the following header in
                    // address order, within the arena.
                    let next = unsafe { &*next_ptr.as_ptr() };

                    if next.is_free {
                        // Absorb the neighbor, header and all. Cannot
                        // overflow: both blocks live inside one arena.
                        block.size = block.size.wrapping_add(HEADER_SIZE).wrapping_add(next.size);
                        block.next = next.next;

                        // Stay on this block so a longer run of free
                        // neighbors keeps merging into it.
                        continue;
                    }
                }
            }

            current = block.next;
        }
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    /// Walks the block list and asserts that it covers the entire arena in
    /// address order with aligned, properly sized blocks.
    ///
    /// This method is only available in debug builds and is used for testing
    /// and validation.
    #[allow(
        clippy::arithmetic_side_effects,
        reason = "integrity check arithmetic is bounded by the arena size"
    )]
    fn integrity_check(&self) {
        let base_addr = self.base.addr().get();
        let mut expected_addr = base_addr;
        let mut current = self.head;

        while let Some(block_ptr) = current {
            let block_addr = block_ptr.addr().get();
            assert!(
                block_addr == expected_addr,
                "block header at {block_addr:#x} is not at the expected address {expected_addr:#x}"
            );

            // SAFETY: Same list invariant as in allocate()/coalesce().
            let block = unsafe { &*block_ptr.as_ptr() };

            assert!(
                block.size % ALIGNMENT == 0,
                "block at {block_addr:#x} has unaligned size {}",
                block.size
            );
            assert!(
                (block_addr + HEADER_SIZE) % ALIGNMENT == 0,
                "payload of block at {block_addr:#x} is not {ALIGNMENT}-byte aligned"
            );

            expected_addr = block_addr + HEADER_SIZE + block.size;
            current = block.next;
        }

        if self.head.is_some() {
            assert!(
                expected_addr - base_addr == self.layout.size(),
                "block list covers {} of {} arena bytes",
                expected_addr - base_addr,
                self.layout.size()
            );
        }
    }
}

impl Default for ByteArena {
    /// Reserves an arena of [`DEFAULT_ARENA_CAPACITY`] bytes.
    fn default() -> Self {
        Self::new(NonZero::new(DEFAULT_ARENA_CAPACITY).unwrap())
    }
}

impl Drop for ByteArena {
    fn drop(&mut self) {
        // SAFETY: base was allocated in new() with this exact layout and has
        // not been deallocated before.
        unsafe {
            dealloc(self.base.as_ptr(), self.layout);
        }
    }
}

// SAFETY: ByteArena contains raw pointers but they refer solely to the
// backing region it owns exclusively. The arena does not share these pointers
// with other threads on its own and does not rely on thread-local state; all
// mutation goes through &mut self.
unsafe impl Send for ByteArena {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::arithmetic_side_effects,
    reason = "test code doesn't need the same safety rigor as production code"
)]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(ByteArena: Send, Debug);

    #[test]
    fn smoke_test() {
        let mut arena = ByteArena::new(nz!(4096));

        let block = arena.allocate(100).unwrap();
        assert!(block.len() >= 100);

        // The handed-out region is plain writable memory.
        unsafe {
            block.cast::<u8>().write_bytes(0xAB, 100);
            assert_eq!(block.cast::<u8>().read(), 0xAB);
        }

        unsafe {
            arena.release(block.cast::<u8>());
        }
    }

    #[test]
    fn zero_size_allocation_is_refused() {
        let mut arena = ByteArena::new(nz!(4096));

        assert!(arena.allocate(0).is_none());
    }

    #[test]
    fn oversized_allocation_is_refused() {
        let mut arena = ByteArena::new(nz!(4096));

        // Larger than the whole arena: no partial allocation happens.
        assert!(arena.allocate(arena.capacity() + 1).is_none());

        // The refusal did not consume anything.
        assert!(arena.allocate(arena.usable_capacity()).is_some());
    }

    #[test]
    fn allocations_are_aligned() {
        let mut arena = ByteArena::default();

        for size in [1, 3, 8, 13, 100, 1000] {
            let block = arena.allocate(size).unwrap();
            assert_eq!(
                block.cast::<u8>().addr().get() % ALIGNMENT,
                0,
                "allocation of {size} bytes returned an unaligned block"
            );
        }
    }

    #[test]
    fn sizes_are_rounded_up_to_alignment() {
        let mut arena = ByteArena::default();

        let block = arena.allocate(13).unwrap();
        assert_eq!(block.len(), 16);
    }

    #[test]
    fn first_fit_reuses_the_released_block() {
        // Fresh 1 MiB arena: allocate, allocate, release the first, allocate
        // again - the third allocation must reuse the first block rather
        // than extending further into the arena.
        let mut arena = ByteArena::default();

        let first = arena.allocate(100).unwrap();
        let second = arena.allocate(100).unwrap();
        assert_ne!(first.cast::<u8>(), second.cast::<u8>());

        unsafe {
            arena.release(first.cast::<u8>());
        }

        let third = arena.allocate(100).unwrap();
        assert_eq!(third.cast::<u8>(), first.cast::<u8>());
    }

    #[test]
    fn releasing_everything_restores_the_full_arena() {
        let mut arena = ByteArena::new(nz!(8192));

        // Varying sizes that together fit the arena.
        let blocks: Vec<_> = [128_usize, 256, 64, 512]
            .into_iter()
            .map(|size| arena.allocate(size).unwrap())
            .collect();

        for block in blocks {
            unsafe {
                arena.release(block.cast::<u8>());
            }
        }

        // Full coalescing back to one block: the whole usable arena is
        // allocatable again in a single piece.
        let all = arena.allocate(arena.usable_capacity()).unwrap();
        assert_eq!(all.len(), arena.usable_capacity());
    }

    #[test]
    fn a_run_of_free_neighbors_merges_in_one_release() {
        let mut arena = ByteArena::new(nz!(8192));

        let a = arena.allocate(64).unwrap();
        let b = arena.allocate(64).unwrap();
        let c = arena.allocate(64).unwrap();
        // Keep a guard allocated so the tail block does not participate.
        let _guard = arena.allocate(64).unwrap();

        unsafe {
            arena.release(a.cast::<u8>());
            arena.release(c.cast::<u8>());

            // Releasing b leaves a, b and c adjacent and free; the single
            // coalescing pass must collapse all three into one block.
            arena.release(b.cast::<u8>());
        }

        // A request spanning all three payloads plus the two absorbed
        // headers only fits if the run fully merged.
        let merged_size = 3 * 64 + 2 * HEADER_SIZE;
        let merged = arena.allocate(merged_size).unwrap();
        assert_eq!(merged.cast::<u8>(), a.cast::<u8>());
    }

    #[test]
    fn barely_larger_block_is_handed_out_unsplit() {
        // An arena with exactly one 64-byte block. A request of 56 bytes
        // leaves too little leftover for a header plus payload, so the whole
        // block is handed out.
        let capacity = HEADER_SIZE + 64;
        let mut arena = ByteArena::new(NonZero::new(capacity).unwrap());

        let block = arena.allocate(56).unwrap();
        assert_eq!(block.len(), 64);

        // Nothing remains to satisfy even the smallest request.
        assert!(arena.allocate(1).is_none());
    }

    #[test]
    fn split_leftover_remains_allocatable() {
        let capacity = HEADER_SIZE + 1024;
        let mut arena = ByteArena::new(NonZero::new(capacity).unwrap());

        let first = arena.allocate(256).unwrap();
        assert_eq!(first.len(), 256);

        // The split left a trailing free block of 1024 - 256 - HEADER_SIZE.
        let leftover = 1024 - 256 - HEADER_SIZE;
        let second = arena.allocate(leftover).unwrap();
        assert_eq!(second.len(), leftover);

        assert!(arena.allocate(1).is_none());
    }

    #[test]
    fn payloads_do_not_disturb_the_block_list() {
        let mut arena = ByteArena::new(nz!(4096));

        let first = arena.allocate(128).unwrap();
        let second = arena.allocate(128).unwrap();

        // Saturate both payloads end to end.
        unsafe {
            first.cast::<u8>().write_bytes(0xFF, first.len());
            second.cast::<u8>().write_bytes(0xEE, second.len());
        }

        // The list survives (integrity_check runs inside in debug builds)
        // and both blocks release and merge cleanly.
        unsafe {
            arena.release(second.cast::<u8>());
            arena.release(first.cast::<u8>());
        }

        assert!(arena.allocate(arena.usable_capacity()).is_some());
    }

    #[test]
    fn capacity_is_rounded_up_to_alignment() {
        let arena = ByteArena::new(nz!(4097));

        assert_eq!(arena.capacity(), 4104);
        assert_eq!(arena.capacity() % ALIGNMENT, 0);
    }

    #[test]
    fn default_arena_has_the_documented_capacity() {
        let arena = ByteArena::default();

        assert_eq!(arena.capacity(), DEFAULT_ARENA_CAPACITY);
    }

    #[test]
    #[should_panic]
    fn tiny_arena_construction_panics() {
        drop(ByteArena::new(nz!(8)));
    }

    #[test]
    fn exhaustion_after_many_small_allocations() {
        let mut arena = ByteArena::new(nz!(1024));

        let mut handles = Vec::new();
        while let Some(block) = arena.allocate(32) {
            handles.push(block);
        }

        // Headers take their toll: the arena holds fewer than the 32 blocks
        // a header-free layout would fit, but at least one.
        assert!(!handles.is_empty());
        assert!(handles.len() < 32);

        // Releasing one block makes exactly one more allocation possible.
        let released = handles.pop().unwrap();
        unsafe {
            arena.release(released.cast::<u8>());
        }

        assert!(arena.allocate(32).is_some());
        assert!(arena.allocate(32).is_none());
    }

    #[test]
    fn arena_can_move_between_threads() {
        let mut arena = ByteArena::new(nz!(4096));
        let block = arena.allocate(64).unwrap();
        let address = block.cast::<u8>().addr();

        let handle = std::thread::spawn(move || {
            // The arena and its outstanding block arrived intact.
            unsafe {
                arena.release(block.cast::<u8>());
            }

            let reused = arena.allocate(64).unwrap();
            assert_eq!(reused.cast::<u8>().addr(), address);
        });

        handle.join().unwrap();
    }
}
