use crate::{
    Literal,
    Model,
    Variable,
};
use bounded::AtomicArray;

const FALSE: u32 = 0;
const TRUE: u32 = 1;
const UNASSIGNED: u32 = 2;

/// The shared variable assignment of a solve.
///
/// Every component worker only ever touches the variables of its own
/// component.
#[derive(Debug, Default)]
pub struct Assignment {
    values: AtomicArray<Variable>,
}

impl Assignment {
    /// Creates a new assignment with all variables unassigned.
    pub fn new(len_variables: usize) -> Self {
        Self {
            values: AtomicArray::with_len(len_variables, |_| UNASSIGNED),
        }
    }

    /// Returns the value of the variable if assigned.
    #[inline]
    pub fn get(&self, variable: Variable) -> Option<bool> {
        match self.values.load(variable) {
            FALSE => Some(false),
            TRUE => Some(true),
            _ => None,
        }
    }

    /// Assigns the value to the variable.
    #[inline]
    pub fn assign(&self, variable: Variable, value: bool) {
        let raw = if value { TRUE } else { FALSE };
        self.values.store(variable, raw)
    }

    /// Resets the variable to unassigned.
    #[inline]
    pub fn unassign(&self, variable: Variable) {
        self.values.store(variable, UNASSIGNED)
    }

    /// Returns `true` if the literal is `false` under the current assignment.
    ///
    /// Literals of unassigned variables are never `false`.
    #[inline]
    pub fn is_false(&self, literal: Literal) -> bool {
        match self.get(literal.variable()) {
            Some(value) => !literal.is_satisfied_by(value),
            None => false,
        }
    }

    /// Consumes the assignment and returns it as model.
    pub fn into_model(self) -> Model {
        let values = self
            .values
            .into_vec()
            .into_iter()
            .map(|raw| {
                match raw {
                    FALSE => Some(false),
                    TRUE => Some(true),
                    _ => None,
                }
            })
            .collect();
        Model::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_and_unassign_work() {
        let assignment = Assignment::new(2);
        let x0 = Variable::from_index(0).unwrap();
        let pos = Literal::new(x0, crate::Sign::True);
        assert_eq!(assignment.get(x0), None);
        assert!(!assignment.is_false(pos));
        assert!(!assignment.is_false(!pos));
        assignment.assign(x0, false);
        assert_eq!(assignment.get(x0), Some(false));
        assert!(assignment.is_false(pos));
        assert!(!assignment.is_false(!pos));
        assignment.unassign(x0);
        assert_eq!(assignment.get(x0), None);
        assignment.assign(x0, true);
        assert_eq!(assignment.into_model().as_slice(), &[Some(true), None]);
    }
}
