//! Chunk run descriptors.
//!
//! A [`ChunkRun`] records where a carve-out landed: which arena, which
//! chunks, and the address of its first byte.

use std::fmt;
use std::ptr::NonNull;

/// A contiguous run of chunks inside one arena.
///
/// Returned by [`ArenaSet::allocate`](crate::ArenaSet::allocate) for a new
/// run and by [`ArenaSet::deallocate`](crate::ArenaSet::deallocate) for the
/// run that was released. The run does not own the memory it points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct ChunkRun {
    /// Index of the arena in construction order.
    pub(crate) arena: usize,
    /// Index of the first chunk of the run.
    pub(crate) first_chunk: usize,
    /// Number of chunks in the run.
    pub(crate) chunks: usize,
    /// Chunk size of the owning arena, in bytes.
    pub(crate) chunk_size: usize,
    /// First byte of the run.
    pub(crate) ptr: NonNull<u8>,
}

impl ChunkRun {
    /// Index of the owning arena in construction order.
    pub fn arena(&self) -> usize {
        self.arena
    }

    /// Index of the first chunk.
    pub fn first_chunk(&self) -> usize {
        self.first_chunk
    }

    /// Number of chunks covered.
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Byte offset of the run from the start of its arena buffer.
    pub fn byte_offset(&self) -> usize {
        self.first_chunk * self.chunk_size
    }

    /// Bytes covered by the run (whole chunks).
    pub fn len_bytes(&self) -> usize {
        self.chunks * self.chunk_size
    }

    /// Pointer to the first byte of the run.
    pub fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Address of the first byte of the run.
    pub fn address(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Whether two runs share at least one chunk.
    pub fn overlaps(&self, other: &ChunkRun) -> bool {
        self.arena == other.arena
            && self.first_chunk < other.first_chunk + other.chunks
            && other.first_chunk < self.first_chunk + self.chunks
    }
}

impl fmt::Display for ChunkRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChunkRun(arena={}, chunks={}..{}, addr={:#x})",
            self.arena,
            self.first_chunk,
            self.first_chunk + self.chunks,
            self.address()
        )
    }
}
