use bounded::Index;
use core::{
    fmt,
    ops::Not,
};

/// The sign of a literal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Sign {
    True = 0,
    False = 1,
}

impl Sign {
    /// Creates a sign from the given `bool` value.
    ///
    /// - `false` becomes `Sign::False`
    /// - `true` becomes `Sign::True`
    #[inline]
    pub fn from_bool(value: bool) -> Self {
        match value {
            true => Self::True,
            false => Self::False,
        }
    }

    /// Converts the sign into a `bool` value.
    ///
    /// - `Sign::True` becomes `true`
    /// - `Sign::False` becomes `false`
    #[inline]
    pub fn into_bool(self) -> bool {
        matches!(self, Self::True)
    }
}

impl Not for Sign {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
        }
    }
}

/// A literal of a variable with its polarity.
///
/// Encoded as `variable * 2 + polarity` where polarity `0` is positive.
/// The raw value `u32::MAX` is reserved for [`Literal::SENTINEL`].
#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[repr(transparent)]
pub struct Literal {
    value: u32,
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            return write!(f, "Literal(SENTINEL)")
        }
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "Literal({}x{})", sign, self.value >> 1)
    }
}

impl Literal {
    /// Terminates clauses and pads clause store rows.
    pub const SENTINEL: Self = Self { value: u32::MAX };

    /// Creates a new literal for the variable with the given polarity.
    #[inline]
    pub fn new(variable: Variable, sign: Sign) -> Self {
        variable.into_literal(sign)
    }

    /// Creates a literal from its raw encoding.
    #[inline]
    pub fn from_raw(value: u32) -> Self {
        Self { value }
    }

    /// Returns the raw encoding of the literal.
    #[inline]
    pub fn into_raw(self) -> u32 {
        self.value
    }

    /// Returns `true` if this is the clause terminating sentinel.
    #[inline]
    pub fn is_sentinel(self) -> bool {
        self == Self::SENTINEL
    }

    /// Returns the variable of the literal.
    #[inline]
    pub fn variable(self) -> Variable {
        Variable::from(self)
    }

    /// Returns `true` if the literal has positive polarity.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.value & 1 == 0
    }

    /// Returns `true` if the literal has negative polarity.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.value & 1 != 0
    }

    /// Returns the polarity of the literal.
    #[inline]
    pub fn sign(self) -> Sign {
        match self.is_positive() {
            true => Sign::True,
            false => Sign::False,
        }
    }

    /// Returns `true` if the literal evaluates to `true` for the variable value.
    #[inline]
    pub fn is_satisfied_by(self, value: bool) -> bool {
        self.is_positive() == value
    }
}

impl From<i32> for Literal {
    /// Converts a DIMACS style literal, e.g. `-3` for the negation of the third variable.
    #[inline]
    fn from(x: i32) -> Self {
        debug_assert!(x != 0);
        let var = x.unsigned_abs() - 1;
        let sign = (x < 0) as u32;
        Literal {
            value: (var << 1) + sign,
        }
    }
}

impl From<cnf_parser::Literal> for Literal {
    #[inline]
    fn from(literal: cnf_parser::Literal) -> Self {
        Self::from(literal.into_value().get())
    }
}

impl Not for Literal {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self {
            value: self.value ^ 1,
        }
    }
}

impl Index for Literal {
    #[inline]
    fn from_index(index: usize) -> Self {
        Self {
            value: u32::try_from(index).expect("encountered invalid literal index"),
        }
    }

    #[inline]
    fn into_index(self) -> usize {
        self.value as usize
    }
}

/// A unique variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Variable {
    value: u32,
}

impl From<Literal> for Variable {
    #[inline]
    fn from(literal: Literal) -> Self {
        Self {
            value: literal.value >> 1,
        }
    }
}

impl Variable {
    /// The maximum supported number of unique variables.
    pub const MAX_LEN: usize = (u32::MAX >> 1) as usize;

    /// Returns the variable for the given index if valid.
    ///
    /// # Note
    ///
    /// This solver only supports up to 2^31-1 unique variables.
    /// Any index that is out of this range is invalid for this operation.
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= Self::MAX_LEN {
            return None
        }
        Some(Self {
            value: index as u32,
        })
    }

    /// Returns the variable for an index already known to be in range.
    #[inline]
    pub(crate) fn from_valid_index(index: usize) -> Self {
        debug_assert!(index < Self::MAX_LEN);
        Self {
            value: index as u32,
        }
    }

    /// Returns the literal for the variable with the given polarity.
    #[inline]
    pub fn into_literal(self, sign: Sign) -> Literal {
        Literal {
            value: (self.value << 1) + sign as u32,
        }
    }

    /// Returns the index of the variable.
    #[inline]
    pub fn into_index(self) -> usize {
        self.value as usize
    }
}

impl Index for Variable {
    #[inline]
    fn from_index(index: usize) -> Self {
        Variable::from_index(index).expect("encountered invalid variable index")
    }

    #[inline]
    fn into_index(self) -> usize {
        self.into_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_encoding_works() {
        let x3 = Variable::from_index(3).unwrap();
        let pos = x3.into_literal(Sign::True);
        let neg = x3.into_literal(Sign::False);
        assert_eq!(pos.into_raw(), 6);
        assert_eq!(neg.into_raw(), 7);
        assert_eq!(!pos, neg);
        assert_eq!(pos.variable(), x3);
        assert_eq!(neg.variable(), x3);
        assert!(pos.is_positive());
        assert!(neg.is_negative());
        assert_eq!(Literal::from(4_i32), pos);
        assert_eq!(Literal::from(-4_i32), neg);
    }

    #[test]
    fn literal_satisfaction_works() {
        let lit = Literal::from(1_i32);
        assert!(lit.is_satisfied_by(true));
        assert!(!lit.is_satisfied_by(false));
        assert!((!lit).is_satisfied_by(false));
        assert!(!(!lit).is_satisfied_by(true));
    }

    #[test]
    fn sentinel_is_not_a_regular_literal() {
        assert!(Literal::SENTINEL.is_sentinel());
        assert!(!Literal::from(1_i32).is_sentinel());
        assert_eq!(Literal::from_raw(u32::MAX), Literal::SENTINEL);
        assert!(Variable::from_index(Variable::MAX_LEN).is_none());
    }

    #[test]
    fn sign_conversions_work() {
        assert!(Sign::True.into_bool());
        assert!(!Sign::False.into_bool());
        assert_eq!(Sign::from_bool(true), Sign::True);
        assert_eq!(!Sign::True, Sign::False);
    }
}
