#![forbid(unsafe_code)]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod atomic_array;
pub mod atomic_list;

pub use self::{
    atomic_array::AtomicArray,
    atomic_list::{
        AtomicLists,
        ListIter,
    },
};

/// Errors that may occur when operating on a bounded data structure.
#[derive(Debug, PartialEq, Eq)]
pub struct OutOfBoundsAccess;

/// Index types that may be used as keys for the bounded data structures.
pub trait Index: Copy + Clone {
    /// Creates a new key from the given index.
    fn from_index(index: usize) -> Self;
    /// Returns the index from the given key.
    fn into_index(self) -> usize;
}

impl Index for usize {
    #[inline]
    fn from_index(index: usize) -> Self {
        index
    }

    #[inline]
    fn into_index(self) -> usize {
        self
    }
}

impl Index for u32 {
    #[inline]
    fn from_index(index: usize) -> Self {
        assert!(index < u32::MAX as usize, "index {} out of u32 range", index);
        index as u32
    }

    #[inline]
    fn into_index(self) -> usize {
        self as usize
    }
}
