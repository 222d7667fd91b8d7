use crate::Literal;

/// A clause sanitizer.
#[derive(Debug, Default, Clone)]
pub struct ClauseSanitizer {
    literals: Vec<Literal>,
}

impl ClauseSanitizer {
    /// Sanitizes the clause literals.
    ///
    /// # Note
    ///
    /// This sorts the literals and removes duplicates. Clauses containing
    /// both polarities of a variable are always satisfied and reported as
    /// tautological so that they can be dropped entirely.
    pub fn sanitize<I>(&mut self, literals: I) -> SanitizedLiterals<'_>
    where
        I: IntoIterator<Item = Literal>,
    {
        self.literals.clear();
        self.literals.extend(literals);
        if self.literals.is_empty() {
            return SanitizedLiterals::EmptyClause
        }
        self.literals.sort_unstable();
        self.literals.dedup();
        // Sorting places both polarities of a variable next to each other.
        let is_tautology = self
            .literals
            .windows(2)
            .any(|pair| pair[0].variable() == pair[1].variable());
        if is_tautology {
            return SanitizedLiterals::TautologicalClause
        }
        SanitizedLiterals::Literals(&self.literals)
    }
}

/// The result for the sanitation of clause literals.
#[derive(Debug, Clone, PartialEq)]
pub enum SanitizedLiterals<'a> {
    /// The input was empty and represents the unsatisfiable empty clause.
    EmptyClause,
    /// A clause that is always satisfied, e.g. `(a OR (NOT a))`.
    TautologicalClause,
    /// The sorted and deduplicated literals.
    Literals(&'a [Literal]),
}
