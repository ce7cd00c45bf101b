use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::{Operator, Value};

/// A single node of a parsed search expression.
///
/// Trees are immutable once built: every walker takes `&Node` and leaves the
/// tree untouched, so one parsed expression can be walked any number of
/// times, from any number of threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// A field reference, possibly dotted (`spec.pages`).
    Identifier(String),
    /// A literal scalar.
    Literal(Value),
    /// An ordered list of child nodes, the right side of `in` and `between`.
    ArrayLiteral(Vec<Node>),
    UnaryExpr { op: Operator, right: Box<Node> },
    BinaryExpr { op: Operator, left: Box<Node>, right: Box<Node> },
    /// The literal `null`, kept apart from scalars so `is null` can test
    /// for it structurally.
    NullLiteral,
}

/// Discriminant of a [`Node`], used in error messages and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Identifier,
    Literal,
    ArrayLiteral,
    UnaryExpr,
    BinaryExpr,
    NullLiteral,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Identifier => "identifier",
            NodeKind::Literal => "literal",
            NodeKind::ArrayLiteral => "array literal",
            NodeKind::UnaryExpr => "unary expression",
            NodeKind::BinaryExpr => "binary expression",
            NodeKind::NullLiteral => "null literal",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Identifier(_) => NodeKind::Identifier,
            Node::Literal(_) => NodeKind::Literal,
            Node::ArrayLiteral(_) => NodeKind::ArrayLiteral,
            Node::UnaryExpr { .. } => NodeKind::UnaryExpr,
            Node::BinaryExpr { .. } => NodeKind::BinaryExpr,
            Node::NullLiteral => NodeKind::NullLiteral,
        }
    }

    pub fn ident(name: impl Into<String>) -> Node {
        Node::Identifier(name.into())
    }

    pub fn literal(value: impl Into<Value>) -> Node {
        Node::Literal(value.into())
    }

    pub fn unary(op: Operator, right: Node) -> Node {
        Node::UnaryExpr { op, right: Box::new(right) }
    }

    pub fn binary(op: Operator, left: Node, right: Node) -> Node {
        Node::BinaryExpr { op, left: Box::new(left), right: Box::new(right) }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Identifier(name) => write!(f, "{}", name),
            Node::Literal(value) => write!(f, "{}", value),
            Node::NullLiteral => write!(f, "null"),
            Node::ArrayLiteral(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Node::UnaryExpr { op, right } => match op {
                Operator::Sub => write!(f, "-{}", right),
                _ => write!(f, "{} {}", op, right),
            },
            Node::BinaryExpr { op, left, right } => {
                // between gets its surface form back instead of the array
                if let (Operator::Between, Node::ArrayLiteral(bounds)) = (op, right.as_ref()) {
                    if bounds.len() == 2 {
                        return write!(f, "({} between {} and {})", left, bounds[0], bounds[1]);
                    }
                }
                write!(f, "({} {} {})", left, op, right)
            }
        }
    }
}
