use crate::{
    assignment::Assignment,
    ClauseRef,
    ClauseStore,
    Error,
    Literal,
    Sign,
    Variable,
};
use bounded::{
    AtomicArray,
    AtomicLists,
    Index as _,
};
use rayon::prelude::*;
use tracing::error;

/// Unit status of both literals of a variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    /// Neither literal is forced.
    Neither,
    /// The positive literal is forced to `true`.
    Positive,
    /// The negative literal is forced to `true`.
    Negative,
    /// Both literals are forced which is a conflict.
    Both,
}

/// The watch list monitoring which clauses are watching which literals.
///
/// Every clause watches exactly one of its literals. The watched literal is
/// never `false` under the current assignment; once it becomes `false` the
/// clause migrates to another literal.
#[derive(Debug)]
pub struct WatchList<'a> {
    store: &'a ClauseStore,
    lists: AtomicLists<Literal, ClauseRef>,
    /// Flat store position of the watched literal of each clause.
    watched: AtomicArray<ClauseRef>,
}

impl<'a> WatchList<'a> {
    /// Lets every clause watch its first literal.
    ///
    /// Clauses are pushed concurrently per owning variable. Afterwards every
    /// list is re-linked in descending clause order so that searching does
    /// not depend on how the pushes interleaved.
    pub fn build(store: &'a ClauseStore) -> Self {
        let len_literals = 2 * store.len_variables();
        let lists = AtomicLists::new(len_literals, store.len_slots());
        let watched = AtomicArray::with_len(store.len_slots(), |clause: ClauseRef| {
            clause.position() as u32
        });
        (0..store.len_variables()).into_par_iter().for_each(|index| {
            let owner = Variable::from_valid_index(index);
            for (clause, literals) in store.clauses_of(owner) {
                lists.push_front(literals[0], clause);
            }
        });
        (0..len_literals).into_par_iter().for_each(|index| {
            let literal = Literal::from_index(index);
            let mut clauses = lists.iter(literal).collect::<Vec<_>>();
            if clauses.len() > 1 {
                clauses.sort_unstable_by(|lhs, rhs| rhs.cmp(lhs));
                lists.relink(literal, clauses);
            }
        });
        Self {
            store,
            lists,
            watched,
        }
    }

    /// Returns `true` if any clause watches the literal.
    #[inline]
    pub fn is_watched(&self, literal: Literal) -> bool {
        !self.lists.is_empty(literal)
    }

    /// Returns `true` if any clause watches either literal of the variable.
    #[inline]
    pub fn is_active(&self, variable: Variable) -> bool {
        self.is_watched(variable.into_literal(Sign::True))
            || self.is_watched(variable.into_literal(Sign::False))
    }

    /// Returns an iterator over the clauses watching the literal.
    #[cfg(test)]
    pub fn watchers(&self, literal: Literal) -> impl Iterator<Item = ClauseRef> + '_ {
        self.lists.iter(literal)
    }

    /// Returns `true` if all literals but the watched one of the clause are `false`.
    fn is_unit_clause(&self, clause: ClauseRef, assignment: &Assignment) -> bool {
        let start = clause.position();
        let watched = self.watched.load(clause) as usize;
        self.store
            .clause(clause)
            .iter()
            .enumerate()
            .all(|(offset, &literal)| {
                start + offset == watched || assignment.is_false(literal)
            })
    }

    /// Returns `true` if some clause watching the literal forces it to be `true`.
    pub fn is_unit(&self, literal: Literal, assignment: &Assignment) -> bool {
        self.lists
            .iter(literal)
            .any(|clause| self.is_unit_clause(clause, assignment))
    }

    /// Returns the unit status of both literals of the variable.
    pub fn unit_status(&self, variable: Variable, assignment: &Assignment) -> UnitStatus {
        let positive = self.is_unit(variable.into_literal(Sign::True), assignment);
        let negative = self.is_unit(variable.into_literal(Sign::False), assignment);
        match (positive, negative) {
            (false, false) => UnitStatus::Neither,
            (true, false) => UnitStatus::Positive,
            (false, true) => UnitStatus::Negative,
            (true, true) => UnitStatus::Both,
        }
    }

    /// Moves every clause watching the now `false` literal to another literal.
    ///
    /// Each clause is scanned forward, wrapping around, from its watched
    /// literal for the next literal that is not `false`. `newly_watched` is
    /// called for every unassigned variable that had no watched literal
    /// before.
    ///
    /// # Errors
    ///
    /// If a clause has no literal left that is not `false`. Unit detection
    /// rules this out, so this indicates a broken search invariant.
    pub fn migrate<F>(
        &self,
        falsified: Literal,
        assignment: &Assignment,
        mut newly_watched: F,
    ) -> Result<(), Error>
    where
        F: FnMut(Variable),
    {
        for clause in self.lists.take(falsified) {
            let start = clause.position();
            let literals = self.store.clause(clause);
            let len = literals.len();
            let current = self.watched.load(clause) as usize - start;
            let replacement = (1..len)
                .map(|step| (current + step) % len)
                .find(|&offset| !assignment.is_false(literals[offset]));
            let offset = match replacement {
                Some(offset) => offset,
                None => {
                    error!(
                        clause = start,
                        literal = ?falsified,
                        "clause has no literal left to watch"
                    );
                    return Err(Error::UnwatchableClause { clause: start })
                }
            };
            let literal = literals[offset];
            let variable = literal.variable();
            let was_inactive =
                assignment.get(variable).is_none() && !self.is_active(variable);
            self.watched.store(clause, (start + offset) as u32);
            self.lists.push_front(literal, clause);
            if was_inactive {
                newly_watched(variable);
            }
        }
        Ok(())
    }
}
