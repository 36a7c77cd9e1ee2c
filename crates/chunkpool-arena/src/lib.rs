//! Fixed-chunk arenas with best-fit selection for chunkpool.
//!
//! Provides a small, fixed set of preallocated byte arenas, each divided
//! into equal-size chunks, and the logic that routes a byte request to one
//! of them. Nothing here knows about element types; the `chunkpool` crate
//! layers a typed allocator on top.
//!
//! # Architecture
//!
//! ```text
//! ArenaSet (selection + run search + pointer resolution)
//! └── Arena × N (fixed at construction, construction order preserved)
//!     ├── Vec<Block> (16-byte aligned backing bytes)
//!     └── Box<[bool]> (one occupancy flag per chunk)
//! ```
//!
//! # Failure model
//!
//! Exhaustion is a hard failure. There is no growth, no compaction and no
//! fallback to the system heap: a request that no arena can serve returns
//! [`PoolError::OutOfMemory`]. Every operation either completes or leaves
//! the arenas untouched.
//!
//! # Threading
//!
//! Single-threaded only. [`Arena`] holds a raw base pointer and is neither
//! `Send` nor `Sync`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod config;
pub mod error;
pub mod handle;
pub mod set;
pub mod stats;

// Public re-exports for the primary API surface.
pub use arena::{Arena, MAX_ALIGN};
pub use config::{ArenaLayout, PoolConfig, SelectionPolicy};
pub use error::PoolError;
pub use handle::ChunkRun;
pub use set::ArenaSet;
pub use stats::{ArenaStats, PoolStats};
