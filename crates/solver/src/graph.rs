use crate::{
    ClauseStore,
    Error,
    Variable,
};
use bounded::AtomicArray;
use core::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use rayon::prelude::*;

/// Undirected dependency edges between variables sharing a clause.
///
/// Every edge is stored in both directions as a `(row, column)` pair.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EdgeList {
    rows: Vec<u32>,
    cols: Vec<u32>,
}

impl EdgeList {
    /// Collects the dependency edges of the clause store.
    ///
    /// Only consecutive literals of a clause are connected. This yields the
    /// same connected components as connecting all pairs while producing
    /// `2 * (len - 1)` instead of `len * (len - 1)` edges per clause.
    ///
    /// # Errors
    ///
    /// If more than `capacity` edges are required. The error carries the
    /// exact number of required edges so that the caller can retry.
    pub fn build(store: &ClauseStore, capacity: usize) -> Result<Self, Error> {
        let len_slots = capacity.min(store.max_edges());
        let rows = AtomicArray::<usize>::with_len(len_slots, |_| 0);
        let cols = AtomicArray::<usize>::with_len(len_slots, |_| 0);
        let len_edges = AtomicUsize::new(0);
        (0..store.len_variables()).into_par_iter().for_each(|index| {
            let owner = Variable::from_valid_index(index);
            for (_, literals) in store.clauses_of(owner) {
                for pair in literals.windows(2) {
                    let lhs = pair[0].variable();
                    let rhs = pair[1].variable();
                    if lhs == rhs {
                        continue
                    }
                    let slot = len_edges.fetch_add(2, Ordering::Relaxed);
                    if slot + 2 > capacity {
                        // Keep counting so that the caller learns the required size.
                        continue
                    }
                    let (lhs, rhs) = (lhs.into_index() as u32, rhs.into_index() as u32);
                    rows.store(slot, lhs);
                    cols.store(slot, rhs);
                    rows.store(slot + 1, rhs);
                    cols.store(slot + 1, lhs);
                }
            }
        });
        let required = len_edges.into_inner();
        if required > capacity {
            return Err(Error::EdgeCapacityExceeded { required, capacity })
        }
        let mut rows = rows.into_vec();
        let mut cols = cols.into_vec();
        rows.truncate(required);
        cols.truncate(required);
        Ok(Self { rows, cols })
    }

    /// Returns the number of directed edges.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no edges.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns an iterator over all directed edges.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.rows.iter().copied().zip(self.cols.iter().copied())
    }
}
