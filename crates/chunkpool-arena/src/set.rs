//! The arena set: best-fit selection, run search and pointer resolution.
//!
//! [`ArenaSet`] is type-erased: every request is expressed in bytes plus an
//! alignment. The typed front-end in the `chunkpool` crate converts element
//! counts into bytes and shares one `ArenaSet` between rebound views.
//!
//! # Allocation
//!
//! 1. Among arenas whose free byte count covers the request, pick the one
//!    with the fewest free bytes (first in construction order on a tie).
//! 2. In that arena, take the leftmost run of `ceil(bytes / chunk_size)`
//!    free chunks whose first byte satisfies the alignment.
//!
//! Step 1 only looks at aggregate free bytes. Under
//! [`SelectionPolicy::BestFit`] a fragmented best-fit arena fails the request
//! outright; [`SelectionPolicy::BestFitWithFallback`] moves on to the next
//! qualifying arena instead.
//!
//! # Release
//!
//! The owning arena is found by address range containment, in construction
//! order. The run length is recomputed from the byte count, so the caller
//! must pass the same count it allocated with.

use smallvec::SmallVec;

use crate::arena::{Arena, MAX_ALIGN};
use crate::config::{PoolConfig, SelectionPolicy};
use crate::error::PoolError;
use crate::handle::ChunkRun;
use crate::stats::{ArenaStats, PoolStats};

/// An ordered, fixed collection of arenas.
///
/// The arena list is established once in [`ArenaSet::new`] and never
/// resized, reordered or replaced. Dropping the set releases every buffer,
/// invalidating all outstanding runs.
#[derive(Debug)]
pub struct ArenaSet {
    arenas: Vec<Arena>,
    policy: SelectionPolicy,
}

impl ArenaSet {
    /// Create one arena per layout in `config`, in order.
    ///
    /// Fails with `InvalidLayout` if the configuration does not validate and
    /// with `OutOfMemory` if any buffer cannot be reserved. Buffers reserved
    /// before a failure are released.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let arenas = config
            .arenas
            .iter()
            .map(|&layout| Arena::new(layout))
            .collect::<Result<Vec<_>, _>>()?;

        let set = Self {
            arenas,
            policy: config.policy,
        };
        tracing::debug!(
            arenas = set.arenas.len(),
            capacity_bytes = set.capacity_bytes(),
            policy = ?set.policy,
            "arena set created"
        );
        Ok(set)
    }

    /// Number of arenas.
    pub fn len(&self) -> usize {
        self.arenas.len()
    }

    /// Always false: construction rejects an empty arena list.
    pub fn is_empty(&self) -> bool {
        self.arenas.is_empty()
    }

    /// Arenas in construction order.
    pub fn arenas(&self) -> &[Arena] {
        &self.arenas
    }

    /// The selection policy fixed at construction.
    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Sum of every arena's buffer size.
    pub fn capacity_bytes(&self) -> usize {
        self.arenas.iter().map(Arena::capacity_bytes).sum()
    }

    /// Sum of every arena's free bytes.
    pub fn free_bytes(&self) -> usize {
        self.arenas.iter().map(Arena::free_bytes).sum()
    }

    /// Index of the best-fit arena for a `bytes`-sized request: the arena
    /// with the fewest free bytes that still has at least `bytes` free.
    /// Ties go to the arena created first.
    pub fn select(&self, bytes: usize) -> Option<usize> {
        self.candidates(bytes).first().copied()
    }

    /// Carve a run covering `bytes` bytes whose first byte is aligned to
    /// `align`.
    ///
    /// Fails with `OutOfMemory` when no arena has enough free bytes, or when
    /// the selected arena(s) have no long enough aligned run. Fails with
    /// `InvalidLayout` when `align` is not a power of two or exceeds
    /// [`MAX_ALIGN`]. State is untouched on failure.
    pub fn allocate(&mut self, bytes: usize, align: usize) -> Result<ChunkRun, PoolError> {
        if !align.is_power_of_two() || align > MAX_ALIGN {
            return Err(PoolError::InvalidLayout {
                reason: format!(
                    "alignment {align} must be a power of two no larger than {MAX_ALIGN}"
                ),
            });
        }

        let candidates = self.candidates(bytes);
        if candidates.is_empty() {
            let available = self
                .arenas
                .iter()
                .map(Arena::free_bytes)
                .max()
                .unwrap_or(0);
            tracing::debug!(bytes, available, "no arena has enough free bytes");
            return Err(PoolError::OutOfMemory {
                requested: bytes,
                available,
            });
        }

        let tries = match self.policy {
            SelectionPolicy::BestFit => 1,
            SelectionPolicy::BestFitWithFallback => candidates.len(),
        };

        for &index in candidates.iter().take(tries) {
            let arena = &mut self.arenas[index];
            let chunks = arena.chunks_for(bytes);
            let Some(first) = first_free_run(arena, chunks, align) else {
                tracing::debug!(
                    arena = index,
                    bytes,
                    chunks,
                    free_bytes = arena.free_bytes(),
                    "no contiguous run in selected arena"
                );
                continue;
            };
            let Some(ptr) = arena.chunk_ptr(first) else {
                continue;
            };
            arena.claim(first, chunks);
            let run = ChunkRun {
                arena: index,
                first_chunk: first,
                chunks,
                chunk_size: arena.chunk_size(),
                ptr,
            };
            tracing::trace!(%run, bytes, "allocated");
            return Ok(run);
        }

        Err(PoolError::OutOfMemory {
            requested: bytes,
            available: self.arenas[candidates[0]].free_bytes(),
        })
    }

    /// Release the run starting at `addr` that was allocated for `bytes`
    /// bytes, returning the run that was freed.
    ///
    /// Fails with `InvalidPointer` if `addr` is outside every arena, is not
    /// on a chunk boundary, or the recomputed run would reach past the end
    /// of its arena. A byte count different from the one used to allocate
    /// is not detected beyond these checks and leaves the occupancy
    /// inconsistent with the caller's view.
    pub fn deallocate(&mut self, addr: usize, bytes: usize) -> Result<ChunkRun, PoolError> {
        let invalid = PoolError::InvalidPointer { address: addr };
        let index = self.resolve(addr).ok_or_else(|| invalid.clone())?;
        let arena = &mut self.arenas[index];

        let offset = arena.offset_of(addr).ok_or_else(|| invalid.clone())?;
        if offset % arena.chunk_size() != 0 {
            return Err(invalid);
        }
        let first = offset / arena.chunk_size();
        let chunks = arena.chunks_for(bytes);
        match first.checked_add(chunks) {
            Some(end) if end <= arena.chunk_count() => {}
            _ => return Err(invalid),
        }
        let ptr = arena.chunk_ptr(first).ok_or(invalid)?;

        let released = arena.release(first, chunks);
        if released != chunks {
            tracing::warn!(
                arena = index,
                first,
                chunks,
                released,
                "released run contained chunks that were already free"
            );
        }

        let run = ChunkRun {
            arena: index,
            first_chunk: first,
            chunks,
            chunk_size: arena.chunk_size(),
            ptr,
        };
        tracing::trace!(%run, bytes, "deallocated");
        Ok(run)
    }

    /// Index of the arena whose buffer contains `addr`, checking arenas in
    /// construction order.
    pub fn resolve(&self, addr: usize) -> Option<usize> {
        self.arenas.iter().position(|arena| arena.contains(addr))
    }

    /// Whether `addr` lies inside any arena buffer.
    pub fn owns(&self, addr: usize) -> bool {
        self.resolve(addr).is_some()
    }

    /// Snapshot of every arena's occupancy.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            arenas: self.arenas.iter().map(ArenaStats::of).collect(),
        }
    }

    /// Arenas qualifying for `bytes`, tightest first, construction order on
    /// ties. Zero-byte requests still need one chunk, so they are treated
    /// as one-byte requests here.
    fn candidates(&self, bytes: usize) -> SmallVec<[usize; 8]> {
        let needed = bytes.max(1);
        let mut candidates: SmallVec<[usize; 8]> = self
            .arenas
            .iter()
            .enumerate()
            .filter(|(_, arena)| arena.free_bytes() >= needed)
            .map(|(index, _)| index)
            .collect();
        // Stable sort keeps construction order among equal free counts.
        candidates.sort_by_key(|&index| self.arenas[index].free_bytes());
        candidates
    }
}

/// Leftmost run of `chunks` free chunks in `arena` whose first byte offset
/// is a multiple of `align`.
fn first_free_run(arena: &Arena, chunks: usize, align: usize) -> Option<usize> {
    if chunks > arena.chunk_count() {
        return None;
    }
    let chunk_size = arena.chunk_size();
    let mut start = 0;
    let mut len = 0;
    for (i, &used) in arena.occupancy().iter().enumerate() {
        if used {
            len = 0;
            continue;
        }
        if len == 0 {
            if (i * chunk_size) % align != 0 {
                continue;
            }
            start = i;
        }
        len += 1;
        if len == chunks {
            return Some(start);
        }
    }
    None
}
