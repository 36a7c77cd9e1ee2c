//! chunkpool: a typed allocator over a fixed set of preallocated arenas.
//!
//! The caller declares a handful of `(chunk_size, chunk_count)` arenas up
//! front. Each request for `count` values of `T` is routed to the arena
//! whose free byte count fits it most tightly, and served from the leftmost
//! run of free chunks there. When nothing fits, the request fails; there is
//! no fallback to the global heap.
//!
//! # Quick start
//!
//! ```rust
//! use chunkpool::prelude::*;
//!
//! // One arena of 4 × 8-byte chunks, one of 8 × 64-byte chunks.
//! let pool: PoolAllocator<u32> = PoolAllocator::new(&[(8, 4), (64, 8)]).unwrap();
//!
//! let small = pool.allocate(2).unwrap();   // 8 bytes: one chunk, first arena
//! let large = pool.allocate(40).unwrap();  // 160 bytes: three chunks, second arena
//! assert_eq!(pool.stats().arenas[0].used_chunks, 1);
//! assert_eq!(pool.stats().arenas[1].used_chunks, 3);
//!
//! // A view for another element type shares the same arenas.
//! let bytes: PoolAllocator<u8> = pool.rebind();
//! assert!(bytes.shares_arenas_with(&pool));
//!
//! pool.deallocate(small, 2).unwrap();
//! pool.deallocate(large, 40).unwrap();
//! assert_eq!(pool.free_bytes(), pool.capacity_bytes());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `chunkpool-arena` | Type-erased arenas, configuration, errors, statistics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod allocator;

/// Type-erased arenas and arena sets (`chunkpool-arena`).
///
/// Use [`arena::ArenaSet`] directly for byte-level requests with an
/// explicit alignment.
pub use chunkpool_arena as arena;

pub use allocator::PoolAllocator;
pub use chunkpool_arena::{
    ArenaLayout, ArenaStats, PoolConfig, PoolError, PoolStats, SelectionPolicy, MAX_ALIGN,
};

/// Common imports for typical chunkpool usage.
///
/// ```rust
/// use chunkpool::prelude::*;
/// ```
pub mod prelude {
    pub use crate::allocator::PoolAllocator;
    pub use chunkpool_arena::{PoolConfig, PoolError, PoolStats, SelectionPolicy};
}
