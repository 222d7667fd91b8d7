use crate::{
    Literal,
    Variable,
};
use core::{
    fmt,
    fmt::Display,
    iter,
    slice,
};

/// The assignment produced by a solve.
///
/// Variables that no search ever had to decide remain unassigned; any value
/// satisfies their clauses. The model is only meaningful for the whole
/// system if the solve reported no unsatisfiable component.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Model {
    values: Vec<Option<bool>>,
}

impl Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (variable, value) in self {
            let index = variable.into_index() + 1;
            if f.alternate() {
                match value {
                    Some(value) => writeln!(f, " - var({:3}) = {}", index, value)?,
                    None => writeln!(f, " - var({:3}) = unassigned", index)?,
                }
            } else {
                match value {
                    Some(true) => write!(f, "{} ", index)?,
                    Some(false) => write!(f, "-{} ", index)?,
                    None => (),
                }
            }
        }
        Ok(())
    }
}

impl Model {
    pub(crate) fn from_values(values: Vec<Option<bool>>) -> Self {
        Self { values }
    }

    /// Returns the number of variables covered by the model.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the model covers no variables.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value of the variable or `None` if it is unassigned.
    pub fn get(&self, variable: Variable) -> Option<bool> {
        self.values.get(variable.into_index()).copied().flatten()
    }

    /// Returns whether the literal is satisfied or `None` if its variable is unassigned.
    pub fn is_satisfied(&self, literal: Literal) -> Option<bool> {
        self.get(literal.variable())
            .map(|value| literal.is_satisfied_by(value))
    }

    /// Returns the values of all variables in index order.
    pub fn as_slice(&self) -> &[Option<bool>] {
        &self.values
    }

    /// Returns the number of assigned variables.
    pub fn len_assigned(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }
}

impl<'a> IntoIterator for &'a Model {
    type Item = (Variable, Option<bool>);
    type IntoIter = ModelIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        ModelIter {
            iter: self.values.iter().enumerate(),
        }
    }
}

pub struct ModelIter<'a> {
    iter: iter::Enumerate<slice::Iter<'a, Option<bool>>>,
}

impl<'a> Iterator for ModelIter<'a> {
    type Item = (Variable, Option<bool>);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .next()
            .map(|(index, value)| (Variable::from_valid_index(index), *value))
    }
}
