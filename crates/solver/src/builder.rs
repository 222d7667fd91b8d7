use crate::{
    sanitizer::{
        ClauseSanitizer,
        SanitizedLiterals,
    },
    ClauseStore,
    Literal,
    StoreError,
    Variable,
};
use cnf_parser::Output;
use thiserror::Error;

/// Errors encountered while assembling a clause store from clauses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing problem line before clause inputs")]
    MissingProblemLine,
    #[error("encountered empty clause")]
    EmptyClause,
    #[error("literal {literal:?} exceeds the {len_variables} declared variables")]
    LiteralOutOfRange {
        literal: Literal,
        len_variables: usize,
    },
    #[error("too many variables: {0}")]
    TooManyVariables(usize),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Assembles a [`ClauseStore`] from individual clauses.
///
/// Every clause is sanitized and then owned by the variable of its smallest
/// literal, which also becomes the literal the clause watches first.
#[derive(Debug, Default, Clone)]
pub struct ClauseStoreBuilder {
    rows: Vec<Vec<Literal>>,
    sanitizer: ClauseSanitizer,
}

impl ClauseStoreBuilder {
    /// Creates a builder for the given number of variables.
    ///
    /// # Errors
    ///
    /// If more variables are requested than the solver supports.
    pub fn new(len_variables: usize) -> Result<Self, BuildError> {
        if len_variables > Variable::MAX_LEN {
            return Err(BuildError::TooManyVariables(len_variables))
        }
        Ok(Self {
            rows: vec![Vec::new(); len_variables],
            sanitizer: ClauseSanitizer::default(),
        })
    }

    /// Returns the number of variables.
    pub fn len_variables(&self) -> usize {
        self.rows.len()
    }

    /// Adds a clause given as a disjunction of literals.
    ///
    /// Tautological clauses are dropped silently.
    ///
    /// # Errors
    ///
    /// - If a literal refers to an undeclared variable.
    /// - If the clause is empty.
    pub fn add_clause<I>(&mut self, literals: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = Literal>,
    {
        let len_variables = self.len_variables();
        let Self { rows, sanitizer } = self;
        let mut out_of_range = None;
        let sanitized = sanitizer.sanitize(literals.into_iter().inspect(|literal| {
            if literal.variable().into_index() >= len_variables {
                out_of_range.get_or_insert(*literal);
            }
        }));
        if let Some(literal) = out_of_range {
            return Err(BuildError::LiteralOutOfRange {
                literal,
                len_variables,
            })
        }
        match sanitized {
            SanitizedLiterals::EmptyClause => Err(BuildError::EmptyClause),
            SanitizedLiterals::TautologicalClause => Ok(()),
            SanitizedLiterals::Literals(literals) => {
                let owner = literals[0].variable().into_index();
                let row = &mut rows[owner];
                row.extend_from_slice(literals);
                row.push(Literal::SENTINEL);
                Ok(())
            }
        }
    }

    /// Finalizes the builder into a padded clause store.
    ///
    /// # Errors
    ///
    /// If the resulting store exceeds the supported size.
    pub fn finalize(self) -> Result<ClauseStore, BuildError> {
        let len_variables = self.rows.len();
        let stride = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut literals = Vec::with_capacity(len_variables * stride);
        let mut row_lens = Vec::with_capacity(len_variables);
        for row in &self.rows {
            literals.extend_from_slice(row);
            literals.extend((row.len()..stride).map(|_| Literal::SENTINEL));
            row_lens.push(row.len() as u32);
        }
        let store = ClauseStore::new(len_variables, stride, literals, row_lens)?;
        Ok(store)
    }
}

/// Drives a [`ClauseStoreBuilder`] from DIMACS CNF parser events.
#[derive(Debug, Default)]
pub(crate) struct CnfBuilder {
    builder: Option<ClauseStoreBuilder>,
    current_clause: Vec<Literal>,
    store: ClauseStore,
}

impl CnfBuilder {
    fn finalize_current_clause(&mut self) -> Result<(), BuildError> {
        let builder = self
            .builder
            .as_mut()
            .ok_or(BuildError::MissingProblemLine)?;
        builder.add_clause(self.current_clause.drain(..))
    }

    /// Returns the store assembled once the parser finished.
    pub fn into_store(self) -> ClauseStore {
        self.store
    }
}

impl Output for CnfBuilder {
    type Error = BuildError;

    fn problem(
        &mut self,
        num_variables: u32,
        _num_clauses: u32,
    ) -> Result<(), Self::Error> {
        self.builder = Some(ClauseStoreBuilder::new(num_variables as usize)?);
        Ok(())
    }

    fn literal(&mut self, literal: cnf_parser::Literal) -> Result<(), Self::Error> {
        self.current_clause.push(literal.into());
        Ok(())
    }

    fn finalize_clause(&mut self) -> Result<(), Self::Error> {
        self.finalize_current_clause()
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        if !self.current_clause.is_empty() {
            self.finalize_current_clause()?;
        }
        let builder = self.builder.take().ok_or(BuildError::MissingProblemLine)?;
        self.store = builder.finalize()?;
        Ok(())
    }
}
