//! Point-in-time occupancy snapshots.

use std::fmt;

use crate::arena::Arena;

/// Occupancy snapshot of one arena.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Bytes per chunk.
    pub chunk_size: usize,
    /// Number of chunks.
    pub chunk_count: usize,
    /// Bytes not covered by a used chunk.
    pub free_bytes: usize,
    /// Number of chunks in use.
    pub used_chunks: usize,
    /// Longest run of adjacent free chunks.
    pub largest_free_run: usize,
}

impl ArenaStats {
    pub(crate) fn of(arena: &Arena) -> Self {
        Self {
            chunk_size: arena.chunk_size(),
            chunk_count: arena.chunk_count(),
            free_bytes: arena.free_bytes(),
            used_chunks: arena.used_chunks(),
            largest_free_run: arena.largest_free_run(),
        }
    }

    /// Total buffer size in bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.chunk_size * self.chunk_count
    }

    /// Number of free chunks.
    pub fn free_chunks(&self) -> usize {
        self.chunk_count - self.used_chunks
    }

    /// Free bytes that cannot be handed out as one run, as a fraction of
    /// all free bytes. Zero when nothing or everything is free.
    pub fn fragmentation(&self) -> f64 {
        let free_chunks = self.free_chunks();
        if free_chunks == 0 {
            return 0.0;
        }
        1.0 - self.largest_free_run as f64 / free_chunks as f64
    }
}

/// Occupancy snapshot of a whole arena set, in construction order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// One entry per arena.
    pub arenas: Vec<ArenaStats>,
}

impl PoolStats {
    /// Sum of every arena's buffer size.
    pub fn capacity_bytes(&self) -> usize {
        self.arenas.iter().map(ArenaStats::capacity_bytes).sum()
    }

    /// Sum of every arena's free bytes.
    pub fn free_bytes(&self) -> usize {
        self.arenas.iter().map(|a| a.free_bytes).sum()
    }

    /// Bytes covered by used chunks across all arenas.
    pub fn used_bytes(&self) -> usize {
        self.capacity_bytes() - self.free_bytes()
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} arenas, {}/{} bytes used",
            self.arenas.len(),
            self.used_bytes(),
            self.capacity_bytes()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(chunk_count: usize, used_chunks: usize, largest_free_run: usize) -> ArenaStats {
        ArenaStats {
            chunk_size: 8,
            chunk_count,
            free_bytes: (chunk_count - used_chunks) * 8,
            used_chunks,
            largest_free_run,
        }
    }

    #[test]
    fn fragmentation_zero_when_free_space_contiguous() {
        assert_eq!(stats(4, 2, 2).fragmentation(), 0.0);
        assert_eq!(stats(4, 4, 0).fragmentation(), 0.0);
    }

    #[test]
    fn fragmentation_half_for_two_isolated_chunks() {
        assert_eq!(stats(4, 2, 1).fragmentation(), 0.5);
    }

    #[test]
    fn pool_totals_sum_arenas() {
        let pool = PoolStats {
            arenas: vec![stats(4, 1, 3), stats(2, 0, 2)],
        };
        assert_eq!(pool.capacity_bytes(), 48);
        assert_eq!(pool.free_bytes(), 40);
        assert_eq!(pool.used_bytes(), 8);
        assert_eq!(pool.to_string(), "2 arenas, 8/48 bytes used");
    }
}
