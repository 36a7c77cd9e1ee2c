//! Benchmark profiles for the chunkpool allocator.
//!
//! - [`tiered_pool`]: the three-tier small-object layout
//! - [`churn_sizes`]: deterministic request-size sequence for churn loops
//! - [`fragment`]: leave every other chunk of an arena in use

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::ptr::NonNull;

use chunkpool::PoolAllocator;
use chunkpool_test_utils::layouts;

/// A `u8` allocator over [`layouts::TIERED`].
///
/// # Panics
///
/// Panics if the layout is rejected, which would be a fixture bug.
pub fn tiered_pool() -> PoolAllocator<u8> {
    PoolAllocator::new(layouts::TIERED).expect("tiered layout is valid")
}

/// `len` request sizes in `1..=max`, from a fixed linear congruential
/// sequence so every run sees the same workload.
pub fn churn_sizes(len: usize, max: usize) -> Vec<usize> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 33) as usize % max + 1
        })
        .collect()
}

/// Fill a fresh single-arena pool of `chunks` one-byte chunks, then free
/// every other chunk. Returns the pool and the pointers still held.
pub fn fragment(chunks: usize) -> (PoolAllocator<u8>, Vec<NonNull<u8>>) {
    let pool = PoolAllocator::new(&[(1, chunks)]).expect("fragment layout is valid");
    let all: Vec<_> = (0..chunks)
        .map(|_| pool.allocate(1).expect("fresh arena has room"))
        .collect();
    let mut held = Vec::with_capacity(chunks / 2);
    for (i, ptr) in all.into_iter().enumerate() {
        if i % 2 == 0 {
            pool.deallocate(ptr, 1).expect("pointer was just allocated");
        } else {
            held.push(ptr);
        }
    }
    (pool, held)
}
