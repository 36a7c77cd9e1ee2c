//! Test fixtures and invariant checks for chunkpool development.
//!
//! Provides standard arena layouts ([`layouts`]), element types of known
//! size and alignment, and [`assert_consistent`] for checking an
//! [`ArenaSet`]'s bookkeeping after every step of a scenario.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use chunkpool_arena::{ArenaSet, PoolConfig, SelectionPolicy};

/// Standard arena layouts used across tests and benches.
pub mod layouts {
    /// One arena of four 8-byte chunks.
    pub const SINGLE_8X4: &[(usize, usize)] = &[(8, 4)];

    /// A 4-byte × 2 arena followed by an 8-byte × 4 arena.
    pub const SMALL_THEN_LARGE: &[(usize, usize)] = &[(4, 2), (8, 4)];

    /// Three tiers of increasing chunk size, a typical small-object mix.
    pub const TIERED: &[(usize, usize)] = &[(16, 256), (64, 128), (256, 32)];
}

/// Element of exactly 4 bytes, aligned to 4.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C, align(4))]
pub struct Word4(pub [u8; 4]);

/// Element of exactly 12 bytes, aligned to 4.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Triple {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

/// Element of exactly 16 bytes, aligned to 16.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C, align(16))]
pub struct Aligned16(pub [u8; 16]);

/// Build an arena set from `pairs` with the given policy.
///
/// # Panics
///
/// Panics if the layout is rejected.
pub fn arena_set(pairs: &[(usize, usize)], policy: SelectionPolicy) -> ArenaSet {
    ArenaSet::new(PoolConfig::from(pairs).with_policy(policy))
        .unwrap_or_else(|e| panic!("fixture layout {pairs:?} rejected: {e}"))
}

/// Check every arena's free byte count against its occupancy flags.
///
/// # Panics
///
/// Panics with the offending arena index if `free_bytes` differs from
/// `chunk_size × free flags` or exceeds the arena capacity.
pub fn assert_consistent(set: &ArenaSet) {
    for (index, arena) in set.arenas().iter().enumerate() {
        let free_flags = arena.occupancy().iter().filter(|&&used| !used).count();
        assert_eq!(
            arena.free_bytes(),
            free_flags * arena.chunk_size(),
            "arena {index}: free_bytes disagrees with occupancy"
        );
        assert!(
            arena.free_bytes() <= arena.capacity_bytes(),
            "arena {index}: free_bytes exceeds capacity"
        );
    }
}
