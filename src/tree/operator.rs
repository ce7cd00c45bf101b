use std::fmt;

use serde::{Deserialize, Serialize};

/// Every operator a tree node can carry.
///
/// The set is closed: trees are built either by the parser or by hand, and
/// each walker matches on the full enumeration. Operators that a particular
/// backend cannot express are rejected at walk time with
/// [`WalkError::UnexpectedOperator`](crate::tree::WalkError::UnexpectedOperator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    RegexEq,
    RegexNotEq,
    Like,
    ILike,
    In,
    Between,
    And,
    Or,
    Not,
    Is,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::RegexEq => "~=",
            Operator::RegexNotEq => "~!",
            Operator::Like => "like",
            Operator::ILike => "ilike",
            Operator::In => "in",
            Operator::Between => "between",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::Is => "is",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
        };
        write!(f, "{}", symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_surface_syntax() {
        assert_eq!(Operator::Eq.to_string(), "=");
        assert_eq!(Operator::RegexNotEq.to_string(), "~!");
        assert_eq!(Operator::ILike.to_string(), "ilike");
        assert_eq!(Operator::Mod.to_string(), "%");
    }
}
