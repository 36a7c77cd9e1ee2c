//! A single fixed-chunk arena: owned buffer plus chunk occupancy.
//!
//! An [`Arena`] knows nothing about other arenas or about element types. It
//! owns its bytes, tracks which chunks are in use and keeps a running free
//! byte count. Arena selection and run search live in
//! [`ArenaSet`](crate::ArenaSet).

use std::ptr::NonNull;

use crate::config::ArenaLayout;
use crate::error::PoolError;

/// Alignment guaranteed for the first byte of every arena buffer.
///
/// A chunk's address is aligned to `T` when its byte offset is a multiple of
/// `align_of::<T>()`, for any `T` whose alignment does not exceed this.
pub const MAX_ALIGN: usize = 16;

#[allow(dead_code)]
#[derive(Clone, Copy)]
#[repr(C, align(16))]
struct Block([u8; MAX_ALIGN]);

const _: () = assert!(std::mem::align_of::<Block>() == MAX_ALIGN);

const ZERO_BLOCK: Block = Block([0; MAX_ALIGN]);

/// One arena of `chunk_count` chunks, each `chunk_size` bytes.
///
/// The backing storage is reserved once at construction and released on
/// drop. After construction the storage is only ever addressed through
/// `base`, so pointers handed out for earlier runs stay valid while later
/// runs are carved.
pub struct Arena {
    /// Backing storage. Never resized or borrowed after construction.
    _storage: Vec<Block>,
    /// First byte of `_storage`.
    base: NonNull<u8>,
    chunk_size: usize,
    chunk_count: usize,
    /// Bytes not covered by a used chunk. Always a multiple of `chunk_size`.
    free_bytes: usize,
    /// `occupancy[i]` is true while chunk `i` belongs to a live run.
    occupancy: Box<[bool]>,
}

impl Arena {
    /// Reserve a zeroed buffer for `layout` with every chunk free.
    ///
    /// Returns `InvalidLayout` for zero or overflowing dimensions and
    /// `OutOfMemory` when the buffer cannot be reserved.
    pub fn new(layout: ArenaLayout) -> Result<Self, PoolError> {
        layout.validate()?;
        let ArenaLayout {
            chunk_size,
            chunk_count,
        } = layout;
        let capacity = chunk_size * chunk_count;
        let blocks = capacity.div_ceil(MAX_ALIGN);

        let mut storage: Vec<Block> = Vec::new();
        storage
            .try_reserve_exact(blocks)
            .map_err(|_| PoolError::OutOfMemory {
                requested: capacity,
                available: 0,
            })?;
        storage.resize(blocks, ZERO_BLOCK);

        let mut occupancy: Vec<bool> = Vec::new();
        occupancy
            .try_reserve_exact(chunk_count)
            .map_err(|_| PoolError::OutOfMemory {
                requested: capacity,
                available: 0,
            })?;
        occupancy.resize(chunk_count, false);

        let base = NonNull::new(storage.as_mut_ptr().cast::<u8>()).ok_or(
            PoolError::OutOfMemory {
                requested: capacity,
                available: 0,
            },
        )?;

        Ok(Self {
            _storage: storage,
            base,
            chunk_size,
            chunk_count,
            free_bytes: capacity,
            occupancy: occupancy.into_boxed_slice(),
        })
    }

    /// Bytes per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Total buffer size in bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.chunk_size * self.chunk_count
    }

    /// Bytes not covered by any used chunk.
    pub fn free_bytes(&self) -> usize {
        self.free_bytes
    }

    /// Number of chunks currently in use.
    pub fn used_chunks(&self) -> usize {
        self.chunk_count - self.free_bytes / self.chunk_size
    }

    /// Per-chunk occupancy flags, `true` meaning used.
    pub fn occupancy(&self) -> &[bool] {
        &self.occupancy
    }

    /// Length of the longest run of adjacent free chunks.
    pub fn largest_free_run(&self) -> usize {
        let mut best = 0;
        let mut current = 0;
        for &used in self.occupancy.iter() {
            if used {
                current = 0;
            } else {
                current += 1;
                best = best.max(current);
            }
        }
        best
    }

    /// Chunks needed to hold `bytes`, rounded up. Zero-byte requests still
    /// take one chunk so that every live run has a distinct address.
    pub fn chunks_for(&self, bytes: usize) -> usize {
        bytes.div_ceil(self.chunk_size).max(1)
    }

    /// Address of the first buffer byte.
    pub fn base_addr(&self) -> usize {
        self.base.as_ptr() as usize
    }

    /// Whether `addr` lies inside this arena's buffer.
    ///
    /// The upper bound is exclusive: the address one past the last byte
    /// belongs to whatever follows the buffer, not to this arena.
    pub fn contains(&self, addr: usize) -> bool {
        self.offset_of(addr).is_some()
    }

    /// Byte offset of `addr` into the buffer, if it lies inside it.
    pub fn offset_of(&self, addr: usize) -> Option<usize> {
        let offset = addr.checked_sub(self.base_addr())?;
        (offset < self.capacity_bytes()).then_some(offset)
    }

    /// Pointer to the first byte of chunk `chunk`.
    ///
    /// Returns `None` if `chunk` is out of range.
    pub fn chunk_ptr(&self, chunk: usize) -> Option<NonNull<u8>> {
        if chunk >= self.chunk_count {
            return None;
        }
        NonNull::new(self.base.as_ptr().wrapping_add(chunk * self.chunk_size))
    }

    /// Mark chunks `first..first + len` used.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds `chunk_count`. In debug builds, also
    /// panics if any chunk in the range is already used.
    pub fn claim(&mut self, first: usize, len: usize) {
        let run = &mut self.occupancy[first..first + len];
        debug_assert!(
            run.iter().all(|&used| !used),
            "claiming a run that overlaps a live run"
        );
        run.fill(true);
        self.free_bytes -= len * self.chunk_size;
    }

    /// Mark chunks `first..first + len` free and return how many of them
    /// were actually in use.
    ///
    /// Chunks that were already free are left alone, so the free byte count
    /// always matches the occupancy flags.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds `chunk_count`.
    pub fn release(&mut self, first: usize, len: usize) -> usize {
        let mut released = 0;
        for used in &mut self.occupancy[first..first + len] {
            if *used {
                *used = false;
                released += 1;
            }
        }
        self.free_bytes += released * self.chunk_size;
        released
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("base", &self.base)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_count", &self.chunk_count)
            .field("free_bytes", &self.free_bytes)
            .finish()
    }
}
