#![forbid(unsafe_code)]
#![allow(clippy::len_without_is_empty)]

//! A parallel DPLL solver for depletant constraint systems.
//!
//! Solving runs in phases. First the dependency graph between variables
//! sharing a clause is collected and partitioned into connected components
//! while every clause starts watching its first literal. Then every
//! component is searched independently by a cyclic backtracking solver with
//! lazily migrated watches.

mod assignment;
mod builder;
mod clause_store;
mod components;
mod config;
mod graph;
mod literal;
mod model;
mod ring;
mod sanitizer;
mod search;
mod trail;
mod watch_list;

#[cfg(test)]
mod tests;

use crate::{
    assignment::Assignment,
    components::Components,
    graph::EdgeList,
    search::{
        Search,
        SearchCounters,
        Verdict,
    },
    trail::Trail,
    watch_list::WatchList,
};
pub use crate::{
    builder::{
        BuildError,
        ClauseStoreBuilder,
    },
    clause_store::{
        ClauseIter,
        ClauseRef,
        ClauseStore,
        StoreError,
    },
    config::SolverConfig,
    literal::{
        Literal,
        Sign,
        Variable,
    },
    model::{
        Model,
        ModelIter,
    },
    search::SolveStats,
};
use bounded::AtomicArray;
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while solving.
///
/// Unsatisfiability is not an error but reported by [`Solution`].
#[derive(Debug, Error)]
pub enum Error {
    /// The dependency edge list was too small.
    ///
    /// Retrying with a capacity of at least `required` succeeds.
    #[error("dependency graph requires {required} edges but capacity is {capacity}")]
    EdgeCapacityExceeded { required: usize, capacity: usize },
    /// A clause at the given store position had no literal left to watch.
    #[error("clause at position {clause} has no literal left to watch")]
    UnwatchableClause { clause: usize },
    #[error("invalid clause store: {0}")]
    InvalidStore(#[from] StoreError),
    #[error("failed to build clause store: {0}")]
    Build(#[from] BuildError),
    #[error("failed to create worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// The outcome of solving a clause store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    model: Model,
    stats: SolveStats,
}

impl Solution {
    /// Returns `true` if all components are satisfiable.
    pub fn is_sat(&self) -> bool {
        self.unsat_count() == 0
    }

    /// Returns the number of unsatisfiable components.
    pub fn unsat_count(&self) -> usize {
        self.stats.unsat_components
    }

    /// Returns the variable assignment found.
    ///
    /// Variables of satisfiable components hold a satisfying assignment even
    /// if other components are unsatisfiable. Variables that never needed a
    /// value stay unassigned.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Consumes the solution and returns its model.
    pub fn into_model(self) -> Model {
        self.model
    }

    /// Returns the statistics of the solve.
    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }
}

/// The parallel per-component solver.
#[derive(Debug, Default)]
pub struct Solver {
    config: SolverConfig,
    pool: Option<rayon::ThreadPool>,
}

impl Solver {
    /// Creates a new solver from the configuration.
    ///
    /// # Errors
    ///
    /// If a dedicated thread pool was requested but could not be created.
    pub fn new(config: SolverConfig) -> Result<Self, Error> {
        let pool = match config.num_threads() {
            Some(num_threads) => {
                Some(
                    rayon::ThreadPoolBuilder::new()
                        .num_threads(num_threads)
                        .thread_name(|index| format!("dpsat-worker-{}", index))
                        .build()?,
                )
            }
            None => None,
        };
        Ok(Self { config, pool })
    }

    /// Returns the configuration of the solver.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves every connected component of the clause store.
    ///
    /// Solving is deterministic: the same store always yields the same
    /// model regardless of the number of threads.
    ///
    /// # Errors
    ///
    /// - If the configured edge capacity is too small for the store.
    /// - If the search broke an internal invariant.
    pub fn solve(&self, store: &ClauseStore) -> Result<Solution, Error> {
        match &self.pool {
            Some(pool) => pool.install(|| self.solve_store(store)),
            None => self.solve_store(store),
        }
    }

    fn solve_store(&self, store: &ClauseStore) -> Result<Solution, Error> {
        let len_variables = store.len_variables();
        let capacity = self
            .config
            .edge_capacity()
            .unwrap_or_else(|| store.max_edges());
        let edges = EdgeList::build(store, capacity)?;
        debug!(
            variables = len_variables,
            clauses = store.len_clauses(),
            edges = edges.len(),
            capacity,
            "built dependency graph"
        );
        let (components, watches) = rayon::join(
            || Components::label(len_variables, &edges),
            || WatchList::build(store),
        );
        let assignment = Assignment::new(len_variables);
        let next = AtomicArray::with_len(len_variables, |variable: Variable| {
            variable.into_index() as u32
        });
        let trail = Trail::new(len_variables);
        let counters = SearchCounters::default();
        let search = Search {
            watches: &watches,
            assignment: &assignment,
            next: &next,
            trail: &trail,
            counters: &counters,
        };
        (0..len_variables)
            .into_par_iter()
            .map(Variable::from_valid_index)
            .filter(|&variable| components.is_representative(variable))
            .try_for_each(|representative| -> Result<(), Error> {
                let members = components.members(representative);
                if search.solve_component(members)? == Verdict::Unsat {
                    counters.record_unsat();
                }
                Ok(())
            })?;
        let stats = counters.into_stats(components.len());
        debug!(
            components = stats.components,
            unsat_components = stats.unsat_components,
            decisions = stats.decisions,
            conflicts = stats.conflicts,
            forced = stats.forced,
            "solved all components"
        );
        Ok(Solution {
            model: assignment.into_model(),
            stats,
        })
    }
}
