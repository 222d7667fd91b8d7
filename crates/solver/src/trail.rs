use crate::Variable;
use bounded::AtomicArray;
use core::sync::atomic::{
    AtomicUsize,
    Ordering,
};

/// Two-bit marker telling how a trail entry came to be assigned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum Move {
    /// A free choice; backtracking flips it.
    Decision = 0,
    /// The second polarity of a decision after the first one failed.
    Flipped = 1,
    /// Forced by unit propagation.
    Forced = 2,
}

impl Move {
    fn from_raw(raw: u32) -> Self {
        match raw & 0b11 {
            0 => Self::Decision,
            1 => Self::Flipped,
            _ => Self::Forced,
        }
    }
}

/// Scratch memory for the decision stacks of all components.
///
/// Components reserve disjoint ranges by atomically advancing a shared
/// heap offset.
#[derive(Debug, Default)]
pub struct Trail {
    variables: AtomicArray<usize>,
    moves: AtomicArray<usize>,
    heap: AtomicUsize,
}

impl Trail {
    /// Creates scratch memory for `capacity` trail entries in total.
    pub fn new(capacity: usize) -> Self {
        Self {
            variables: AtomicArray::with_len(capacity, |_| 0),
            moves: AtomicArray::with_len(capacity, |_| 0),
            heap: AtomicUsize::new(0),
        }
    }

    /// Returns the total number of trail entries.
    pub fn capacity(&self) -> usize {
        self.variables.len()
    }

    /// Reserves an exclusive range of `len` entries.
    ///
    /// # Panics
    ///
    /// If the scratch memory is exhausted.
    pub fn reserve(&self, len: usize) -> TrailSlice<'_> {
        let base = self.heap.fetch_add(len, Ordering::Relaxed);
        assert!(
            base + len <= self.capacity(),
            "reserved trail range {}..{} exceeds the capacity of {}",
            base,
            base + len,
            self.capacity(),
        );
        TrailSlice {
            trail: self,
            base,
            capacity: len,
            len: 0,
        }
    }
}

/// The decision stack of a single component.
#[derive(Debug)]
pub struct TrailSlice<'a> {
    trail: &'a Trail,
    base: usize,
    capacity: usize,
    len: usize,
}

impl<'a> TrailSlice<'a> {
    /// Returns the number of entries on the stack.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the stack is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pushes the variable with its move marker.
    ///
    /// # Panics
    ///
    /// If the reserved range is full.
    pub fn push(&mut self, variable: Variable, kind: Move) {
        assert!(
            self.len < self.capacity,
            "pushed more entries to the trail than its capacity of {}",
            self.capacity,
        );
        let index = self.base + self.len;
        self.trail
            .variables
            .store(index, variable.into_index() as u32);
        self.trail.moves.store(index, kind as u32);
        self.len += 1;
    }

    /// Returns the topmost entry if any.
    pub fn last(&self) -> Option<(Variable, Move)> {
        if self.is_empty() {
            return None
        }
        let index = self.base + self.len - 1;
        let variable = Variable::from_valid_index(self.trail.variables.load(index) as usize);
        let kind = Move::from_raw(self.trail.moves.load(index));
        Some((variable, kind))
    }

    /// Replaces the move marker of the topmost entry.
    ///
    /// # Panics
    ///
    /// If the stack is empty.
    pub fn set_last_move(&mut self, kind: Move) {
        assert!(!self.is_empty(), "tried to update the move of an empty trail");
        self.trail
            .moves
            .store(self.base + self.len - 1, kind as u32);
    }

    /// Pops the topmost entry if any.
    pub fn pop(&mut self) -> Option<(Variable, Move)> {
        let last = self.last()?;
        self.len -= 1;
        Some(last)
    }
}
