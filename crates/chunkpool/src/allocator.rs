//! Typed allocator front-end over a shared [`ArenaSet`].
//!
//! A [`PoolAllocator<T>`] turns element counts into byte requests against
//! an `ArenaSet`. Clones and rebound views share the same arenas, so memory
//! allocated through one view may be released through any other, provided
//! the byte count matches.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;
use std::rc::Rc;

use chunkpool_arena::{ArenaSet, PoolConfig, PoolError, PoolStats, SelectionPolicy, MAX_ALIGN};

/// Allocator for contiguous runs of `T` backed by fixed chunk arenas.
///
/// Returned pointers are non-owning views into arena memory. They stay
/// valid until the matching [`deallocate`](Self::deallocate) or until the
/// last view sharing the arenas is dropped, whichever comes first. The
/// memory is zeroed at construction but not between reuses; nothing is
/// constructed or dropped in it.
///
/// Not thread-safe: the type is neither `Send` nor `Sync`.
pub struct PoolAllocator<T> {
    arenas: Rc<RefCell<ArenaSet>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PoolAllocator<T> {
    /// Alignment requested for every run. Fails to compile for element
    /// types aligned beyond [`MAX_ALIGN`].
    const ALIGN: usize = {
        let align = mem::align_of::<T>();
        assert!(align <= MAX_ALIGN, "element alignment exceeds MAX_ALIGN");
        align
    };

    /// Create one arena per `(chunk_size, chunk_count)` pair, in order,
    /// with the default best-fit policy.
    ///
    /// ```rust
    /// use chunkpool::PoolAllocator;
    ///
    /// let pool: PoolAllocator<u32> = PoolAllocator::new(&[(8, 4)]).unwrap();
    /// let ptr = pool.allocate(1).unwrap();
    /// pool.deallocate(ptr, 1).unwrap();
    /// ```
    pub fn new(pairs: &[(usize, usize)]) -> Result<Self, PoolError> {
        Self::with_config(PoolConfig::from(pairs))
    }

    /// Create the arenas described by `config`.
    pub fn with_config(config: PoolConfig) -> Result<Self, PoolError> {
        Ok(Self::from_set(ArenaSet::new(config)?))
    }

    /// Wrap an existing arena set.
    pub fn from_set(set: ArenaSet) -> Self {
        let _ = Self::ALIGN;
        Self {
            arenas: Rc::new(RefCell::new(set)),
            _marker: PhantomData,
        }
    }

    /// Allocate room for `count` contiguous values of `T`.
    ///
    /// Fails with `OutOfMemory` when the byte size overflows, when no arena
    /// has that many free bytes, or when the best-fit arena has no long
    /// enough run of free chunks. The last case can happen even though the
    /// reported free bytes look sufficient.
    pub fn allocate(&self, count: usize) -> Result<NonNull<T>, PoolError> {
        let bytes = count
            .checked_mul(mem::size_of::<T>())
            .ok_or_else(|| PoolError::OutOfMemory {
                requested: usize::MAX,
                available: self.free_bytes(),
            })?;
        let run = self.arenas.borrow_mut().allocate(bytes, Self::ALIGN)?;
        Ok(run.as_ptr().cast::<T>())
    }

    /// Release a run previously returned by [`allocate`](Self::allocate)
    /// on this allocator or any view sharing its arenas.
    ///
    /// `count` must equal the count passed to `allocate`. Fails with
    /// `InvalidPointer` if `ptr` does not lie in any arena.
    pub fn deallocate(&self, ptr: NonNull<T>, count: usize) -> Result<(), PoolError> {
        let address = ptr.as_ptr() as usize;
        let bytes = count
            .checked_mul(mem::size_of::<T>())
            .ok_or(PoolError::InvalidPointer { address })?;
        self.arenas.borrow_mut().deallocate(address, bytes)?;
        Ok(())
    }

    /// A view of the same arenas for elements of type `U`.
    ///
    /// No arena is created and no buffer is copied.
    pub fn rebind<U>(&self) -> PoolAllocator<U> {
        let _ = PoolAllocator::<U>::ALIGN;
        tracing::trace!(
            from = std::any::type_name::<T>(),
            to = std::any::type_name::<U>(),
            "rebind"
        );
        PoolAllocator {
            arenas: Rc::clone(&self.arenas),
            _marker: PhantomData,
        }
    }

    /// Whether `self` and `other` share one arena set.
    pub fn shares_arenas_with<U>(&self, other: &PoolAllocator<U>) -> bool {
        Rc::ptr_eq(&self.arenas, &other.arenas)
    }

    /// Whether `ptr` lies inside one of the arenas.
    pub fn owns(&self, ptr: NonNull<T>) -> bool {
        self.arenas.borrow().owns(ptr.as_ptr() as usize)
    }

    /// Number of arenas.
    pub fn arena_count(&self) -> usize {
        self.arenas.borrow().len()
    }

    /// Selection policy of the shared arena set.
    pub fn policy(&self) -> SelectionPolicy {
        self.arenas.borrow().policy()
    }

    /// Free bytes summed over all arenas.
    pub fn free_bytes(&self) -> usize {
        self.arenas.borrow().free_bytes()
    }

    /// Buffer bytes summed over all arenas.
    pub fn capacity_bytes(&self) -> usize {
        self.arenas.borrow().capacity_bytes()
    }

    /// Occupancy snapshot of every arena.
    pub fn stats(&self) -> PoolStats {
        self.arenas.borrow().stats()
    }
}

impl<T> Clone for PoolAllocator<T> {
    fn clone(&self) -> Self {
        Self {
            arenas: Rc::clone(&self.arenas),
            _marker: PhantomData,
        }
    }
}

/// Two allocators compare equal when memory from one can be released
/// through the other, i.e. when they share one arena set.
impl<T, U> PartialEq<PoolAllocator<U>> for PoolAllocator<T> {
    fn eq(&self, other: &PoolAllocator<U>) -> bool {
        self.shares_arenas_with(other)
    }
}

impl<T> Eq for PoolAllocator<T> {}

impl<T> fmt::Debug for PoolAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("element", &std::any::type_name::<T>())
            .field("arenas", &self.arena_count())
            .field("free_bytes", &self.free_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_byte_values_take_one_eight_byte_chunk_each() {
        let pool: PoolAllocator<u32> = PoolAllocator::new(&[(8, 4)]).unwrap();
        let ptrs: Vec<_> = (0..4).map(|_| pool.allocate(1).unwrap()).collect();
        assert_eq!(pool.free_bytes(), 0);
        assert!(matches!(
            pool.allocate(1),
            Err(PoolError::OutOfMemory { .. })
        ));
        for ptr in ptrs {
            pool.deallocate(ptr, 1).unwrap();
        }
        assert_eq!(pool.free_bytes(), 32);
    }

    #[test]
    fn pointers_are_aligned_for_the_element() {
        let pool: PoolAllocator<u64> = PoolAllocator::new(&[(8, 8)]).unwrap();
        let ptr = pool.allocate(3).unwrap();
        assert_eq!(ptr.as_ptr() as usize % mem::align_of::<u64>(), 0);
    }

    #[test]
    fn count_overflow_is_out_of_memory() {
        let pool: PoolAllocator<u64> = PoolAllocator::new(&[(8, 8)]).unwrap();
        assert!(matches!(
            pool.allocate(usize::MAX),
            Err(PoolError::OutOfMemory { .. })
        ));
        assert_eq!(pool.free_bytes(), 64);
    }

    #[test]
    fn clone_and_rebind_share_arenas() {
        let pool: PoolAllocator<u32> = PoolAllocator::new(&[(8, 4)]).unwrap();
        let clone = pool.clone();
        let bytes: PoolAllocator<u8> = pool.rebind();
        assert!(pool.shares_arenas_with(&clone));
        assert!(pool == bytes);

        let other: PoolAllocator<u32> = PoolAllocator::new(&[(8, 4)]).unwrap();
        assert!(pool != other);
    }

    #[test]
    fn zero_sized_elements_still_take_a_chunk() {
        let pool: PoolAllocator<()> = PoolAllocator::new(&[(8, 2)]).unwrap();
        let a = pool.allocate(1).unwrap();
        let b = pool.allocate(1).unwrap();
        assert_ne!(a, b);
        pool.deallocate(a, 1).unwrap();
        pool.deallocate(b, 1).unwrap();
        assert_eq!(pool.free_bytes(), 16);
    }

    #[test]
    fn debug_names_element_type() {
        let pool: PoolAllocator<u16> = PoolAllocator::new(&[(8, 1)]).unwrap();
        let rendered = format!("{pool:?}");
        assert!(rendered.contains("u16"));
        assert!(rendered.contains("free_bytes: 8"));
    }
}
