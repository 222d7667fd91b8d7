use crate::{
    assignment::Assignment,
    ring::ActiveRing,
    trail::{
        Move,
        Trail,
        TrailSlice,
    },
    watch_list::{
        UnitStatus,
        WatchList,
    },
    Error,
    Sign,
    Variable,
};
use bounded::AtomicArray;
use core::sync::atomic::{
    AtomicU64,
    AtomicUsize,
    Ordering,
};
use tracing::trace;

/// Outcome of the search of a single component.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Verdict {
    Sat,
    Unsat,
}

/// Aggregated statistics of a solve.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SolveStats {
    /// Number of connected components.
    pub components: usize,
    /// Number of components found to be unsatisfiable.
    pub unsat_components: usize,
    /// Number of free decisions over all components.
    pub decisions: u64,
    /// Number of assignments forced by unit propagation.
    pub forced: u64,
    /// Number of conflicts over all components.
    pub conflicts: u64,
}

/// Counters shared by all component workers.
#[derive(Debug, Default)]
pub struct SearchCounters {
    unsat: AtomicUsize,
    decisions: AtomicU64,
    forced: AtomicU64,
    conflicts: AtomicU64,
}

impl SearchCounters {
    fn record(&self, local: &LocalCounters) {
        self.decisions.fetch_add(local.decisions, Ordering::Relaxed);
        self.forced.fetch_add(local.forced, Ordering::Relaxed);
        self.conflicts.fetch_add(local.conflicts, Ordering::Relaxed);
    }

    /// Counts another unsatisfiable component.
    pub fn record_unsat(&self) {
        self.unsat.fetch_add(1, Ordering::Relaxed);
    }

    /// Consumes the counters into statistics.
    pub fn into_stats(self, components: usize) -> SolveStats {
        SolveStats {
            components,
            unsat_components: self.unsat.into_inner(),
            decisions: self.decisions.into_inner(),
            forced: self.forced.into_inner(),
            conflicts: self.conflicts.into_inner(),
        }
    }
}

#[derive(Debug, Default)]
struct LocalCounters {
    decisions: u64,
    forced: u64,
    conflicts: u64,
}

/// The next step chosen after scanning the active ring.
#[derive(Debug, Copy, Clone)]
enum Step {
    /// The successor of `predecessor` is forced to `value`.
    Force {
        predecessor: Variable,
        variable: Variable,
        value: bool,
    },
    /// No unit was found; branch on the ring head.
    Decide,
    /// Both literals of the successor of `predecessor` are forced.
    Conflict { predecessor: Variable },
}

/// Shared state of the search phase.
///
/// Every field is shared by all component workers. Clauses never span two
/// components so every worker only touches entries of its own variables,
/// literals and clauses.
#[derive(Debug)]
pub struct Search<'a> {
    pub watches: &'a WatchList<'a>,
    pub assignment: &'a Assignment,
    pub next: &'a AtomicArray<Variable>,
    pub trail: &'a Trail,
    pub counters: &'a SearchCounters,
}

impl<'a> Search<'a> {
    /// Runs the backtracking search for the component with the given members.
    ///
    /// # Errors
    ///
    /// If a clause loses its last non-`false` literal during watch migration.
    pub fn solve_component(&self, members: &[Variable]) -> Result<Verdict, Error> {
        let mut trail = self.trail.reserve(members.len());
        let mut ring = ActiveRing::new(
            self.next,
            members
                .iter()
                .copied()
                .filter(|&variable| self.watches.is_active(variable)),
        );
        let mut local = LocalCounters::default();
        let verdict = loop {
            let tail = match ring.tail() {
                Some(tail) => tail,
                None => break Verdict::Sat,
            };
            match self.scan(&ring, tail) {
                Step::Force {
                    predecessor,
                    variable,
                    value,
                } => {
                    local.forced += 1;
                    ring.remove_after(predecessor);
                    trail.push(variable, Move::Forced);
                    self.commit(&mut ring, variable, value)?;
                }
                Step::Decide => {
                    local.decisions += 1;
                    let variable = ring.remove_after(tail);
                    let value = self.preferred_value(variable);
                    trail.push(variable, Move::Decision);
                    self.commit(&mut ring, variable, value)?;
                }
                Step::Conflict { predecessor } => {
                    local.conflicts += 1;
                    ring.set_tail(predecessor);
                    match self.backtrack(&mut ring, &mut trail) {
                        Some((variable, value)) => {
                            self.commit(&mut ring, variable, value)?
                        }
                        None => break Verdict::Unsat,
                    }
                }
            }
        };
        self.counters.record(&local);
        trace!(
            representative = members.first().map(|variable| variable.into_index()),
            members = members.len(),
            decisions = local.decisions,
            conflicts = local.conflicts,
            ?verdict,
            "solved component"
        );
        Ok(verdict)
    }

    /// Walks the ring once starting at its head looking for unit literals.
    fn scan(&self, ring: &ActiveRing, tail: Variable) -> Step {
        let mut predecessor = tail;
        loop {
            let variable = ring.next(predecessor);
            match self.watches.unit_status(variable, self.assignment) {
                UnitStatus::Both => return Step::Conflict { predecessor },
                UnitStatus::Positive => {
                    return Step::Force {
                        predecessor,
                        variable,
                        value: true,
                    }
                }
                UnitStatus::Negative => {
                    return Step::Force {
                        predecessor,
                        variable,
                        value: false,
                    }
                }
                UnitStatus::Neither => (),
            }
            if variable == tail {
                return Step::Decide
            }
            predecessor = variable;
        }
    }

    /// Returns the value that falsifies an unwatched literal if possible.
    ///
    /// Chooses `true` only if the negative literal is unwatched while the
    /// positive one is watched, `false` otherwise.
    fn preferred_value(&self, variable: Variable) -> bool {
        self.watches.is_watched(variable.into_literal(Sign::True))
            && !self.watches.is_watched(variable.into_literal(Sign::False))
    }

    /// Assigns the value and migrates the watches of the falsified literal.
    fn commit(
        &self,
        ring: &mut ActiveRing,
        variable: Variable,
        value: bool,
    ) -> Result<(), Error> {
        self.assignment.assign(variable, value);
        let falsified = variable.into_literal(Sign::from_bool(!value));
        self.watches
            .migrate(falsified, self.assignment, |activated| {
                ring.push_front(activated)
            })
    }

    /// Undoes forced assignments back to the most recent decision.
    ///
    /// Returns the decision variable together with its flipped value, or
    /// `None` if no decision is left to flip.
    fn backtrack(
        &self,
        ring: &mut ActiveRing,
        trail: &mut TrailSlice,
    ) -> Option<(Variable, bool)> {
        while let Some((variable, kind)) = trail.last() {
            if kind == Move::Decision {
                trail.set_last_move(Move::Flipped);
                let flipped = self.assignment.get(variable) == Some(false);
                return Some((variable, flipped))
            }
            trail.pop();
            self.assignment.unassign(variable);
            if self.watches.is_active(variable) {
                ring.push_front(variable);
            }
        }
        None
    }
}
