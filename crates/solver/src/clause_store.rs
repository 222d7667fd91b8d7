use crate::{
    builder::CnfBuilder,
    BuildError,
    Literal,
    Model,
    Variable,
};
use bounded::Index;
use cnf_parser::{
    Error as CnfError,
    Input,
};
use thiserror::Error;

/// A slightly faster hash set due to usage of `ahash` hasher.
type HashSet<T> = std::collections::HashSet<T, ahash::RandomState>;

/// Reference to a clause by the flat store position of its first literal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ClauseRef(u32);

impl ClauseRef {
    /// Returns the flat store position of the first literal of the clause.
    #[inline]
    pub fn position(self) -> usize {
        self.0 as usize
    }
}

impl Index for ClauseRef {
    #[inline]
    fn from_index(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize);
        Self(index as u32)
    }

    #[inline]
    fn into_index(self) -> usize {
        self.position()
    }
}

/// Reasons why raw clause store data is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{len_variables} variables with stride {stride} exceed the supported store size")]
    TooLarge { len_variables: usize, stride: usize },
    #[error("expected {expected} literal slots but found {found}")]
    LiteralsLenMismatch { expected: usize, found: usize },
    #[error("expected {expected} row lengths but found {found}")]
    RowCountMismatch { expected: usize, found: usize },
    #[error("row of variable {variable} holds {len} entries but the stride is {stride}")]
    RowTooLong {
        variable: usize,
        len: usize,
        stride: usize,
    },
    #[error("literal {literal:?} at position {position} references an unknown variable")]
    LiteralOutOfRange { position: usize, literal: Literal },
    #[error("empty clause at position {position}")]
    EmptyClause { position: usize },
    #[error("clause at position {clause} contains {literal:?} more than once")]
    DuplicateLiteral { clause: usize, literal: Literal },
    #[error("row of variable {variable} ends with an unterminated clause")]
    UnterminatedClause { variable: usize },
}

/// Immutable clause input of a single solve.
///
/// Row-major array with one row of `stride` literal slots per variable.
/// The first `row_len(v)` slots of a row hold the clauses owned by `v`,
/// each terminated by [`Literal::SENTINEL`]. Remaining slots are padding.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClauseStore {
    len_variables: usize,
    stride: usize,
    literals: Vec<Literal>,
    row_lens: Vec<u32>,
}

impl ClauseStore {
    /// Creates a clause store from its raw parts.
    ///
    /// # Errors
    ///
    /// - If the array sizes do not match `len_variables` and `stride`.
    /// - If a row is longer than the stride or its last clause is unterminated.
    /// - If a clause is empty, contains a literal twice or references an
    ///   unknown variable.
    pub fn new(
        len_variables: usize,
        stride: usize,
        literals: Vec<Literal>,
        row_lens: Vec<u32>,
    ) -> Result<Self, StoreError> {
        let len_slots = len_variables
            .checked_mul(stride)
            .filter(|&len_slots| {
                len_variables <= Variable::MAX_LEN && len_slots < u32::MAX as usize
            })
            .ok_or(StoreError::TooLarge {
                len_variables,
                stride,
            })?;
        if literals.len() != len_slots {
            return Err(StoreError::LiteralsLenMismatch {
                expected: len_slots,
                found: literals.len(),
            })
        }
        if row_lens.len() != len_variables {
            return Err(StoreError::RowCountMismatch {
                expected: len_variables,
                found: row_lens.len(),
            })
        }
        let store = Self {
            len_variables,
            stride,
            literals,
            row_lens,
        };
        store.validate_rows()?;
        Ok(store)
    }

    /// Loads a clause store from DIMACS CNF input.
    ///
    /// # Errors
    ///
    /// If the input is malformed or contains an empty clause.
    pub fn from_cnf<I>(input: &mut I) -> Result<Self, CnfError<BuildError>>
    where
        I: Input,
    {
        let mut builder = CnfBuilder::default();
        cnf_parser::parse_cnf(input, &mut builder)?;
        Ok(builder.into_store())
    }

    fn validate_rows(&self) -> Result<(), StoreError> {
        let mut seen = HashSet::default();
        for variable in 0..self.len_variables {
            let len = self.row_lens[variable] as usize;
            if len > self.stride {
                return Err(StoreError::RowTooLong {
                    variable,
                    len,
                    stride: self.stride,
                })
            }
            let base = variable * self.stride;
            let row = &self.literals[base..base + len];
            if let Some(last) = row.last() {
                if !last.is_sentinel() {
                    return Err(StoreError::UnterminatedClause { variable })
                }
            }
            let mut clause_start = base;
            seen.clear();
            for (offset, &literal) in row.iter().enumerate() {
                let position = base + offset;
                if literal.is_sentinel() {
                    if position == clause_start {
                        return Err(StoreError::EmptyClause { position })
                    }
                    clause_start = position + 1;
                    seen.clear();
                    continue
                }
                if literal.variable().into_index() >= self.len_variables {
                    return Err(StoreError::LiteralOutOfRange { position, literal })
                }
                if !seen.insert(literal) {
                    return Err(StoreError::DuplicateLiteral {
                        clause: clause_start,
                        literal,
                    })
                }
            }
        }
        Ok(())
    }

    /// Returns the number of variables.
    #[inline]
    pub fn len_variables(&self) -> usize {
        self.len_variables
    }

    /// Returns the number of literal slots per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the total number of literal slots including padding.
    #[inline]
    pub fn len_slots(&self) -> usize {
        self.literals.len()
    }

    /// Returns the raw row-major literal slots.
    #[inline]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// Returns the number of valid entries of each row.
    #[inline]
    pub fn row_lens(&self) -> &[u32] {
        &self.row_lens
    }

    /// Returns the valid entries of the row owned by the variable.
    ///
    /// # Panics
    ///
    /// If the variable is out of bounds.
    pub fn row(&self, variable: Variable) -> &[Literal] {
        let index = variable.into_index();
        let base = index * self.stride;
        &self.literals[base..base + self.row_lens[index] as usize]
    }

    /// Returns an iterator over the clauses owned by the variable.
    pub fn clauses_of(&self, variable: Variable) -> ClauseIter {
        ClauseIter {
            row: self.row(variable),
            position: variable.into_index() * self.stride,
        }
    }

    /// Returns an iterator over all clauses of the store.
    pub fn clauses(&self) -> impl Iterator<Item = (ClauseRef, &[Literal])> + '_ {
        (0..self.len_variables)
            .map(Variable::from_valid_index)
            .flat_map(move |variable| self.clauses_of(variable))
    }

    /// Returns the literals of the referenced clause.
    ///
    /// # Panics
    ///
    /// If the reference does not point to the start of a clause of this store.
    pub fn clause(&self, clause: ClauseRef) -> &[Literal] {
        let start = clause.position();
        let row_end = (start / self.stride) * self.stride + self.stride;
        let tail = &self.literals[start..row_end];
        let len = tail
            .iter()
            .position(|literal| literal.is_sentinel())
            .unwrap_or_else(|| panic!("encountered unterminated clause at {}", start));
        &tail[..len]
    }

    /// Returns the number of clauses.
    pub fn len_clauses(&self) -> usize {
        self.clauses().count()
    }

    /// Returns the number of dependency edges the chain encoding may produce.
    pub fn max_edges(&self) -> usize {
        self.clauses()
            .map(|(_, literals)| 2 * (literals.len() - 1))
            .sum()
    }

    /// Returns `true` if every clause has a literal that is `true` under the model.
    pub fn is_satisfied_by(&self, model: &Model) -> bool {
        self.clauses().all(|(_, literals)| {
            literals
                .iter()
                .any(|&literal| model.is_satisfied(literal) == Some(true))
        })
    }
}

/// Iterator over the clauses of a single clause store row.
#[derive(Debug, Clone)]
pub struct ClauseIter<'a> {
    row: &'a [Literal],
    position: usize,
}

impl<'a> Iterator for ClauseIter<'a> {
    type Item = (ClauseRef, &'a [Literal]);

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.row.iter().position(|literal| literal.is_sentinel())?;
        let clause = ClauseRef::from_index(self.position);
        let literals = &self.row[..len];
        self.row = &self.row[len + 1..];
        self.position += len + 1;
        Some((clause, literals))
    }
}
