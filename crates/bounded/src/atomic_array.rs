use super::{
    Index,
    OutOfBoundsAccess,
};
use alloc::vec::Vec;
use core::{
    marker::PhantomData,
    sync::atomic::{
        AtomicU32,
        Ordering,
    },
};

/// A fixed length array of `u32` cells that may be shared across threads.
///
/// All plain accessors use relaxed ordering. Callers are expected to
/// partition the index space between threads or to synchronize through
/// an outer fork/join point. The array never changes its length after
/// construction so shared references to it are enough to mutate it.
#[derive(Debug)]
pub struct AtomicArray<Idx> {
    values: Vec<AtomicU32>,
    marker: PhantomData<fn() -> Idx>,
}

impl<Idx> Default for AtomicArray<Idx> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            marker: Default::default(),
        }
    }
}

impl<Idx> AtomicArray<Idx> {
    /// Returns the length of the atomic array.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the atomic array is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over a snapshot of the current values.
    ///
    /// # Note
    ///
    /// Every value is loaded individually so the snapshot is only
    /// consistent if no other thread writes concurrently.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.values.iter().map(|cell| cell.load(Ordering::Relaxed))
    }

    /// Consumes the atomic array and returns its values.
    pub fn into_vec(self) -> Vec<u32> {
        self.values.into_iter().map(AtomicU32::into_inner).collect()
    }
}

impl<Idx> From<Vec<u32>> for AtomicArray<Idx> {
    fn from(values: Vec<u32>) -> Self {
        Self {
            values: values.into_iter().map(AtomicU32::new).collect(),
            marker: Default::default(),
        }
    }
}

impl<Idx> AtomicArray<Idx>
where
    Idx: Index,
{
    /// Creates a new atomic array with the given length.
    ///
    /// Initializes every cell with the value returned by the closure.
    pub fn with_len<F>(len: usize, mut init: F) -> Self
    where
        F: FnMut(Idx) -> u32,
    {
        Self {
            values: (0..len)
                .map(|index| AtomicU32::new(init(Idx::from_index(index))))
                .collect(),
            marker: Default::default(),
        }
    }

    /// Ensures that the given index is valid for the atomic array.
    ///
    /// # Errors
    ///
    /// If the given index is out of bounds.
    fn ensure_valid_index(&self, index: Idx) -> Result<usize, OutOfBoundsAccess> {
        let index = index.into_index();
        if index >= self.len() {
            return Err(OutOfBoundsAccess)
        }
        Ok(index)
    }

    /// Returns the underlying atomic cell at the given index.
    ///
    /// # Panics
    ///
    /// If the given index is out of bounds.
    #[inline]
    pub fn cell(&self, index: Idx) -> &AtomicU32 {
        let index = self
            .ensure_valid_index(index)
            .expect("encountered out of bounds index");
        &self.values[index]
    }

    /// Returns the value at the given index.
    ///
    /// # Errors
    ///
    /// If the given index is out of bounds for the atomic array.
    #[inline]
    pub fn get(&self, index: Idx) -> Result<u32, OutOfBoundsAccess> {
        self.ensure_valid_index(index)
            .map(|index| self.values[index].load(Ordering::Relaxed))
    }

    /// Updates the value at the given index.
    ///
    /// # Errors
    ///
    /// If the given index is out of bounds for the atomic array.
    #[inline]
    pub fn set(&self, index: Idx, new_value: u32) -> Result<(), OutOfBoundsAccess> {
        self.ensure_valid_index(index)
            .map(|index| self.values[index].store(new_value, Ordering::Relaxed))
    }

    /// Returns the value at the given index.
    ///
    /// # Panics
    ///
    /// If the given index is out of bounds.
    #[inline]
    pub fn load(&self, index: Idx) -> u32 {
        self.cell(index).load(Ordering::Relaxed)
    }

    /// Stores the value at the given index.
    ///
    /// # Panics
    ///
    /// If the given index is out of bounds.
    #[inline]
    pub fn store(&self, index: Idx, new_value: u32) {
        self.cell(index).store(new_value, Ordering::Relaxed)
    }

    /// Lowers the value at the given index to `new_value` if it is smaller.
    ///
    /// Returns the previous value.
    ///
    /// # Panics
    ///
    /// If the given index is out of bounds.
    #[inline]
    pub fn fetch_min(&self, index: Idx, new_value: u32) -> u32 {
        self.cell(index).fetch_min(new_value, Ordering::Relaxed)
    }

    /// Adds `amount` to the value at the given index and returns the previous value.
    ///
    /// # Panics
    ///
    /// If the given index is out of bounds.
    #[inline]
    pub fn fetch_add(&self, index: Idx, amount: u32) -> u32 {
        self.cell(index).fetch_add(amount, Ordering::Relaxed)
    }
}
