//! Integration tests: allocation scenarios through the typed allocator.
//!
//! Each test drives a `PoolAllocator` end to end and checks arena
//! occupancy through `stats()` rather than internal state.

use chunkpool::prelude::*;
use chunkpool_test_utils::{layouts, Triple, Word4};

// ── Capacity and exhaustion ──────────────────────────────────────────

#[test]
fn single_arena_fills_one_chunk_per_small_value() {
    let pool: PoolAllocator<Word4> = PoolAllocator::new(layouts::SINGLE_8X4).unwrap();

    let first = pool.allocate(1).unwrap();
    let second = pool.allocate(1).unwrap();
    assert_eq!(pool.stats().arenas[0].used_chunks, 2);

    let third = pool.allocate(1).unwrap();
    let fourth = pool.allocate(1).unwrap();
    assert_eq!(pool.stats().arenas[0].used_chunks, 4);
    assert_eq!(pool.free_bytes(), 0);

    let err = pool.allocate(1).unwrap_err();
    assert_eq!(
        err,
        PoolError::OutOfMemory {
            requested: 4,
            available: 0
        }
    );

    for ptr in [first, second, third, fourth] {
        pool.deallocate(ptr, 1).unwrap();
    }
    assert_eq!(pool.free_bytes(), 32);
}

#[test]
fn request_beyond_every_arena_fails() {
    let pool: PoolAllocator<Triple> = PoolAllocator::new(layouts::SMALL_THEN_LARGE).unwrap();
    // 3 × 12 = 36 bytes, larger than the 32-byte arena.
    assert!(matches!(
        pool.allocate(3),
        Err(PoolError::OutOfMemory { requested: 36, .. })
    ));
    assert_eq!(pool.free_bytes(), pool.capacity_bytes());
}

#[test]
fn exhaustion_is_final_until_release() {
    let pool: PoolAllocator<u64> = PoolAllocator::new(&[(8, 2)]).unwrap();
    let a = pool.allocate(1).unwrap();
    let _b = pool.allocate(1).unwrap();
    assert!(pool.allocate(1).is_err());
    pool.deallocate(a, 1).unwrap();
    let c = pool.allocate(1).unwrap();
    assert_eq!(a, c, "the freed chunk is the leftmost free run");
}

// ── Selection ────────────────────────────────────────────────────────

#[test]
fn best_fit_prefers_arena_with_fewest_free_bytes() {
    let pool: PoolAllocator<u64> = PoolAllocator::new(layouts::SMALL_THEN_LARGE).unwrap();
    // 8 bytes fit both arenas; the 4×2 arena has 8 free bytes, the 8×4 has 32.
    let ptr = pool.allocate(1).unwrap();
    let stats = pool.stats();
    assert_eq!(stats.arenas[0].used_chunks, 2);
    assert_eq!(stats.arenas[1].used_chunks, 0);

    // Now only the second arena qualifies.
    let next = pool.allocate(1).unwrap();
    assert_eq!(pool.stats().arenas[1].used_chunks, 1);

    pool.deallocate(ptr, 1).unwrap();
    pool.deallocate(next, 1).unwrap();
}

#[test]
fn equal_free_bytes_resolve_to_first_arena() {
    let pool: PoolAllocator<u32> = PoolAllocator::new(&[(8, 4), (16, 2)]).unwrap();
    pool.allocate(1).unwrap();
    let stats = pool.stats();
    assert_eq!(stats.arenas[0].used_chunks, 1);
    assert_eq!(stats.arenas[1].used_chunks, 0);
}

// ── Fragmentation ────────────────────────────────────────────────────

#[test]
fn non_adjacent_free_chunks_cannot_serve_a_two_chunk_request() {
    let pool: PoolAllocator<u64> = PoolAllocator::new(&[(8, 4)]).unwrap();
    let ptrs: Vec<_> = (0..4).map(|_| pool.allocate(1).unwrap()).collect();
    pool.deallocate(ptrs[0], 1).unwrap();
    pool.deallocate(ptrs[2], 1).unwrap();

    let stats = pool.stats();
    assert_eq!(stats.free_bytes(), 16);
    assert_eq!(stats.arenas[0].largest_free_run, 1);

    assert!(matches!(
        pool.allocate(2),
        Err(PoolError::OutOfMemory { requested: 16, .. })
    ));
    assert_eq!(pool.stats(), stats, "failed request leaves state untouched");
}

#[test]
fn fallback_policy_uses_a_less_preferred_arena() {
    let config = PoolConfig::from([(8, 4), (8, 8)])
        .with_policy(SelectionPolicy::BestFitWithFallback);
    let pool: PoolAllocator<u64> = PoolAllocator::with_config(config).unwrap();
    let ptrs: Vec<_> = (0..4).map(|_| pool.allocate(1).unwrap()).collect();
    pool.deallocate(ptrs[1], 1).unwrap();
    pool.deallocate(ptrs[3], 1).unwrap();

    let run = pool.allocate(2).unwrap();
    assert_eq!(pool.stats().arenas[1].used_chunks, 2);
    pool.deallocate(run, 2).unwrap();
}

// ── Release ──────────────────────────────────────────────────────────

#[test]
fn allocate_then_deallocate_restores_stats() {
    let pool: PoolAllocator<Triple> = PoolAllocator::new(layouts::TIERED).unwrap();
    let keep = pool.allocate(5).unwrap();
    let before = pool.stats();

    let ptr = pool.allocate(17).unwrap();
    assert_ne!(pool.stats(), before);
    pool.deallocate(ptr, 17).unwrap();
    assert_eq!(pool.stats(), before);

    pool.deallocate(keep, 5).unwrap();
}

#[test]
fn foreign_pointer_is_rejected() {
    let pool: PoolAllocator<u32> = PoolAllocator::new(layouts::SINGLE_8X4).unwrap();
    let mut local = 7u32;
    let foreign = std::ptr::NonNull::from(&mut local);
    assert!(!pool.owns(foreign));
    assert_eq!(
        pool.deallocate(foreign, 1),
        Err(PoolError::InvalidPointer {
            address: foreign.as_ptr() as usize
        })
    );
}

#[test]
fn pointer_from_another_pool_is_rejected() {
    let a: PoolAllocator<u32> = PoolAllocator::new(layouts::SINGLE_8X4).unwrap();
    let b: PoolAllocator<u32> = PoolAllocator::new(layouts::SINGLE_8X4).unwrap();
    let ptr = a.allocate(1).unwrap();
    assert!(matches!(
        b.deallocate(ptr, 1),
        Err(PoolError::InvalidPointer { .. })
    ));
    a.deallocate(ptr, 1).unwrap();
}

#[test]
fn live_allocations_hold_independent_values() {
    let pool: PoolAllocator<u64> = PoolAllocator::new(&[(8, 16)]).unwrap();
    let ptrs: Vec<_> = (0..8u64).map(|_| pool.allocate(2).unwrap()).collect();

    for (i, ptr) in ptrs.iter().enumerate() {
        // SAFETY: each pointer covers two live, exclusively owned u64 slots.
        unsafe {
            ptr.as_ptr().write(i as u64);
            ptr.as_ptr().add(1).write(!(i as u64));
        }
    }
    for (i, ptr) in ptrs.iter().enumerate() {
        // SAFETY: as above; values were written in the previous loop.
        let (lo, hi) = unsafe { (ptr.as_ptr().read(), ptr.as_ptr().add(1).read()) };
        assert_eq!(lo, i as u64);
        assert_eq!(hi, !(i as u64));
    }
    for ptr in ptrs {
        pool.deallocate(ptr, 2).unwrap();
    }
}
