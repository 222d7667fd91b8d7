use crate::{
    graph::EdgeList,
    Variable,
};
use bounded::AtomicArray;
use core::sync::atomic::{
    AtomicBool,
    Ordering,
};
use rayon::prelude::*;
use tracing::debug;

/// Compressed sparse row adjacency of the dependency graph.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Csr {
    offsets: Vec<usize>,
    targets: Vec<u32>,
}

impl Csr {
    /// Sorts the edges by row and derives the row offsets.
    fn from_edges(len_variables: usize, edges: &EdgeList) -> Self {
        let mut pairs = edges.iter().collect::<Vec<_>>();
        pairs.par_sort_unstable();
        let offsets = (0..=len_variables)
            .into_par_iter()
            .map(|row| pairs.partition_point(|&(source, _)| (source as usize) < row))
            .collect();
        let targets = pairs.into_iter().map(|(_, target)| target).collect();
        Self { offsets, targets }
    }

    /// Returns the neighbors of the variable at `row`.
    fn neighbors(&self, row: usize) -> &[u32] {
        &self.targets[self.offsets[row]..self.offsets[row + 1]]
    }
}

/// Connected components of the dependency graph.
///
/// Every variable is labeled with the smallest variable index of its
/// component, the representative.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Components {
    labels: Vec<u32>,
    /// All variables ordered by `(representative, index)`.
    members: Vec<Variable>,
    len_components: usize,
}

impl Components {
    /// Labels the connected components of the dependency graph.
    ///
    /// Runs parallel minimum label propagation with pointer jumping until no
    /// label changes any more.
    pub fn label(len_variables: usize, edges: &EdgeList) -> Self {
        let csr = Csr::from_edges(len_variables, edges);
        let labels = AtomicArray::<usize>::with_len(len_variables, |index| index as u32);
        let mut iterations = 0;
        loop {
            iterations += 1;
            let changed = AtomicBool::new(false);
            (0..len_variables).into_par_iter().for_each(|row| {
                let current = labels.load(row);
                let lowest = csr
                    .neighbors(row)
                    .iter()
                    .map(|&target| labels.load(target as usize))
                    .fold(current, u32::min);
                if lowest < current {
                    labels.fetch_min(row, lowest);
                    changed.store(true, Ordering::Relaxed);
                }
            });
            (0..len_variables).into_par_iter().for_each(|row| {
                let parent = labels.load(row);
                let grandparent = labels.load(parent as usize);
                if grandparent < parent {
                    labels.fetch_min(row, grandparent);
                }
            });
            if !changed.into_inner() {
                break
            }
        }
        let labels = labels.into_vec();
        let len_components = labels
            .par_iter()
            .enumerate()
            .filter(|&(index, &label)| index as u32 == label)
            .count();
        let mut members = (0..len_variables)
            .map(Variable::from_valid_index)
            .collect::<Vec<_>>();
        members.par_sort_unstable_by_key(|variable| {
            (labels[variable.into_index()], variable.into_index())
        });
        debug!(
            variables = len_variables,
            edges = edges.len(),
            components = len_components,
            iterations,
            "labeled connected components"
        );
        Self {
            labels,
            members,
            len_components,
        }
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.len_components
    }

    /// Returns the representative of the component of the variable.
    ///
    /// # Panics
    ///
    /// If the variable is out of bounds.
    pub fn representative(&self, variable: Variable) -> Variable {
        Variable::from_valid_index(self.labels[variable.into_index()] as usize)
    }

    /// Returns `true` if the variable represents its component.
    pub fn is_representative(&self, variable: Variable) -> bool {
        self.representative(variable) == variable
    }

    /// Returns the members of the component in index order.
    ///
    /// Returns an empty slice if `representative` does not represent a component.
    pub fn members(&self, representative: Variable) -> &[Variable] {
        let label = representative.into_index() as u32;
        let label_of = |variable: &Variable| self.labels[variable.into_index()];
        let start = self.members.partition_point(|variable| label_of(variable) < label);
        let end = self.members.partition_point(|variable| label_of(variable) <= label);
        &self.members[start..end]
    }

    /// Returns an iterator over the representatives of all components.
    #[cfg(test)]
    pub fn representatives(&self) -> impl Iterator<Item = Variable> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(index, &label)| index as u32 == label)
            .map(|(index, _)| Variable::from_valid_index(index))
    }
}
