//! SQL comparison operators accepted in WHERE clauses

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::{Error, Result};

/// A comparison operator from the fixed set MySQL WHERE clauses accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operator(&'static str);

impl Operator {
    pub const EQ: Self = Operator("=");
    pub const NEQ: Self = Operator("<>");
    pub const GT: Self = Operator(">");
    pub const LT: Self = Operator("<");
    pub const GTE: Self = Operator(">=");
    pub const LTE: Self = Operator("<=");
    pub const LIKE: Self = Operator("LIKE");

    /// Every operator, in the order they are matched when parsing
    pub const ALL: [Operator; 7] = [
        Self::EQ,
        Self::NEQ,
        Self::GT,
        Self::LT,
        Self::GTE,
        Self::LTE,
        Self::LIKE,
    ];

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Whether `candidate` names one of the supported operators
    pub fn is_valid(candidate: &str) -> bool {
        Self::ALL.iter().any(|op| op.0 == candidate)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.0 == s)
            .ok_or_else(|| Error::InvalidOperator {
                operator: s.to_string(),
            })
    }
}

/// Trait for types that can be converted to SQL operators
pub trait IntoOperator {
    fn into_operator(self) -> Result<Operator>;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> Result<Operator> {
        Ok(self)
    }
}

/// String operators are matched exactly; `!=` is not accepted, use `<>`
impl IntoOperator for &str {
    fn into_operator(self) -> Result<Operator> {
        self.parse()
    }
}

impl IntoOperator for String {
    fn into_operator(self) -> Result<Operator> {
        self.as_str().parse()
    }
}

/// Convenience module for operator constants
pub mod op {
    use super::Operator;

    pub const EQ: Operator = Operator::EQ;
    pub const NEQ: Operator = Operator::NEQ;
    pub const GT: Operator = Operator::GT;
    pub const LT: Operator = Operator::LT;
    pub const GTE: Operator = Operator::GTE;
    pub const LTE: Operator = Operator::LTE;
    pub const LIKE: Operator = Operator::LIKE;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_constants() {
        assert_eq!(Operator::EQ.as_str(), "=");
        assert_eq!(Operator::NEQ.as_str(), "<>");
        assert_eq!(Operator::LIKE.as_str(), "LIKE");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Operator::GTE), ">=");
        assert_eq!(format!("{}", op::LIKE), "LIKE");
    }

    #[test]
    fn test_string_conversion() {
        assert_eq!("<>".into_operator().unwrap(), Operator::NEQ);
        assert_eq!("LIKE".into_operator().unwrap(), Operator::LIKE);
        assert_eq!(String::from("<=").into_operator().unwrap(), Operator::LTE);
    }

    #[test]
    fn test_invalid_string_conversion() {
        let err = "!=".into_operator().unwrap_err();
        assert!(matches!(err, Error::InvalidOperator { ref operator } if operator == "!="));

        // Matching is exact, lowercase keywords are rejected
        assert!("like".into_operator().is_err());
    }

    #[test]
    fn test_is_valid() {
        assert!(Operator::is_valid(">"));
        assert!(!Operator::is_valid("ILIKE"));
    }
}
