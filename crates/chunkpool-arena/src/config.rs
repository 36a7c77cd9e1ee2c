//! Arena set configuration parameters.

use crate::error::PoolError;

/// Chunk geometry of a single arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaLayout {
    /// Bytes per chunk. Must be non-zero.
    pub chunk_size: usize,
    /// Number of chunks. Must be non-zero.
    pub chunk_count: usize,
}

impl ArenaLayout {
    /// Create a layout of `chunk_count` chunks of `chunk_size` bytes.
    pub const fn new(chunk_size: usize, chunk_count: usize) -> Self {
        Self {
            chunk_size,
            chunk_count,
        }
    }

    /// Total buffer size in bytes, or `None` on overflow.
    pub fn capacity_bytes(&self) -> Option<usize> {
        self.chunk_size.checked_mul(self.chunk_count)
    }

    /// Check that both dimensions are non-zero and the product fits `usize`.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.chunk_size == 0 {
            return Err(PoolError::InvalidLayout {
                reason: "chunk_size must be at least 1".into(),
            });
        }
        if self.chunk_count == 0 {
            return Err(PoolError::InvalidLayout {
                reason: "chunk_count must be at least 1".into(),
            });
        }
        if self.capacity_bytes().is_none() {
            return Err(PoolError::InvalidLayout {
                reason: format!(
                    "{} chunks of {} bytes overflows usize",
                    self.chunk_count, self.chunk_size
                ),
            });
        }
        Ok(())
    }
}

impl From<(usize, usize)> for ArenaLayout {
    fn from((chunk_size, chunk_count): (usize, usize)) -> Self {
        Self::new(chunk_size, chunk_count)
    }
}

/// How an allocation request picks its arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Pick the single arena with the smallest free byte count that still
    /// covers the request. If that arena has no contiguous run long enough,
    /// the request fails even when another arena could have served it.
    #[default]
    BestFit,
    /// Visit every arena whose free byte count covers the request, tightest
    /// first, and take the first one with a long enough run.
    BestFitWithFallback,
}

/// Configuration for an [`ArenaSet`](crate::ArenaSet).
///
/// Arenas are created in the order listed here, and that order is the
/// tie-break when two arenas report the same free byte count.
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolConfig {
    /// Arena layouts in construction order.
    pub arenas: Vec<ArenaLayout>,
    /// Arena selection policy. Default: [`SelectionPolicy::BestFit`].
    pub policy: SelectionPolicy,
}

impl PoolConfig {
    /// Empty configuration with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arena of `chunk_count` chunks of `chunk_size` bytes.
    pub fn arena(mut self, chunk_size: usize, chunk_count: usize) -> Self {
        self.arenas.push(ArenaLayout::new(chunk_size, chunk_count));
        self
    }

    /// Replace the selection policy.
    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sum of every arena's buffer size in bytes, or `None` on overflow.
    pub fn total_capacity_bytes(&self) -> Option<usize> {
        self.arenas
            .iter()
            .try_fold(0usize, |acc, l| acc.checked_add(l.capacity_bytes()?))
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.arenas.is_empty() {
            return Err(PoolError::InvalidLayout {
                reason: "at least one arena is required".into(),
            });
        }
        for (index, layout) in self.arenas.iter().enumerate() {
            layout.validate().map_err(|e| match e {
                PoolError::InvalidLayout { reason } => PoolError::InvalidLayout {
                    reason: format!("arena {index}: {reason}"),
                },
                other => other,
            })?;
        }
        Ok(())
    }
}

impl From<&[(usize, usize)]> for PoolConfig {
    fn from(pairs: &[(usize, usize)]) -> Self {
        pairs.iter().copied().collect()
    }
}

impl<const N: usize> From<[(usize, usize); N]> for PoolConfig {
    fn from(pairs: [(usize, usize); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl FromIterator<(usize, usize)> for PoolConfig {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Self {
            arenas: iter.into_iter().map(ArenaLayout::from).collect(),
            policy: SelectionPolicy::default(),
        }
    }
}
