use serde_json::{json, Value as Json};

use crate::tree::{Node, Operator, Value, WalkError, WalkResult};
use crate::walkers::{check_depth, Coerce, TreeWalker, DEFAULT_MAX_DEPTH};

/// Renders a tree as a MongoDB-style filter document.
///
/// Document filters are field-centric: every predicate needs an identifier
/// on the left and a literal on the right, and arithmetic has no filter
/// form at all. Trees that fall outside that shape are rejected with the
/// same error kinds the other walkers use.
pub struct DocWalker {
    max_depth: usize,
}

impl DocWalker {
    pub fn new() -> Self {
        DocWalker { max_depth: DEFAULT_MAX_DEPTH }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn walk_at(&self, node: &Node, depth: usize) -> WalkResult<Json> {
        check_depth(depth, self.max_depth)?;
        match node {
            Node::BinaryExpr { op, left, right } => self.render_binary(*op, left, right, depth),
            Node::UnaryExpr { op, right } => match op {
                Operator::Not => Ok(json!({ "$nor": [self.walk_at(right, depth + 1)?] })),
                other => Err(WalkError::UnexpectedOperator { operator: *other }),
            },
            other => Err(WalkError::TypeMismatch {
                expected: "boolean expression".to_string(),
                got: other.kind().name().to_string(),
            }),
        }
    }

    fn render_binary(
        &self,
        op: Operator,
        left: &Node,
        right: &Node,
        depth: usize,
    ) -> WalkResult<Json> {
        match op {
            Operator::And => Ok(json!({
                "$and": [self.walk_at(left, depth + 1)?, self.walk_at(right, depth + 1)?]
            })),
            Operator::Or => Ok(json!({
                "$or": [self.walk_at(left, depth + 1)?, self.walk_at(right, depth + 1)?]
            })),
            Operator::Eq => {
                let field = Self::field_name(left)?;
                Ok(json!({ field: Self::literal_json(right)? }))
            }
            Operator::NotEq => {
                let field = Self::field_name(left)?;
                Ok(json!({ field: { "$ne": Self::literal_json(right)? } }))
            }
            Operator::Lt | Operator::LtEq | Operator::Gt | Operator::GtEq => {
                let field = Self::field_name(left)?;
                let key = match op {
                    Operator::Lt => "$lt",
                    Operator::LtEq => "$lte",
                    Operator::Gt => "$gt",
                    _ => "$gte",
                };
                Ok(json!({ field: { key: Self::literal_json(right)? } }))
            }
            Operator::Like => {
                let field = Self::field_name(left)?;
                let pattern = Coerce::like_to_regex(Self::pattern_string(right)?);
                Ok(json!({ field: { "$regex": pattern } }))
            }
            Operator::ILike => {
                let field = Self::field_name(left)?;
                let pattern = Coerce::like_to_regex(Self::pattern_string(right)?);
                Ok(json!({ field: { "$regex": pattern, "$options": "i" } }))
            }
            Operator::RegexEq => {
                let field = Self::field_name(left)?;
                Ok(json!({ field: { "$regex": Self::pattern_string(right)? } }))
            }
            Operator::RegexNotEq => {
                let field = Self::field_name(left)?;
                Ok(json!({ field: { "$not": { "$regex": Self::pattern_string(right)? } } }))
            }
            Operator::In => {
                let field = Self::field_name(left)?;
                match right {
                    Node::ArrayLiteral(items) => {
                        let values = items
                            .iter()
                            .map(Self::literal_json)
                            .collect::<WalkResult<Vec<_>>>()?;
                        Ok(json!({ field: { "$in": values } }))
                    }
                    other => Err(WalkError::TypeMismatch {
                        expected: "array".to_string(),
                        got: other.kind().name().to_string(),
                    }),
                }
            }
            Operator::Between => {
                let field = Self::field_name(left)?;
                match right {
                    Node::ArrayLiteral(bounds) if bounds.len() == 2 => {
                        let lo = Self::literal_json(&bounds[0])?;
                        let hi = Self::literal_json(&bounds[1])?;
                        Ok(json!({ field: { "$gte": lo, "$lte": hi } }))
                    }
                    Node::ArrayLiteral(bounds) => Err(WalkError::TypeMismatch {
                        expected: "2 values".to_string(),
                        got: format!("{} values", bounds.len()),
                    }),
                    other => Err(WalkError::TypeMismatch {
                        expected: "array".to_string(),
                        got: other.kind().name().to_string(),
                    }),
                }
            }
            Operator::Is => {
                let field = Self::field_name(left)?;
                match right {
                    Node::NullLiteral => Ok(json!({ field: Json::Null })),
                    // `is <non-null>` matches no document
                    _ => Ok(json!({ "$expr": false })),
                }
            }
            // arithmetic has no document form
            Operator::Add
            | Operator::Sub
            | Operator::Mul
            | Operator::Div
            | Operator::Mod
            | Operator::Not => Err(WalkError::UnexpectedOperator { operator: op }),
        }
    }

    fn field_name(node: &Node) -> WalkResult<&str> {
        match node {
            Node::Identifier(name) => Ok(name),
            other => Err(WalkError::TypeMismatch {
                expected: "identifier".to_string(),
                got: other.kind().name().to_string(),
            }),
        }
    }

    fn literal_json(node: &Node) -> WalkResult<Json> {
        match node {
            Node::Literal(value) => Ok(value.to_json()),
            Node::NullLiteral => Ok(Json::Null),
            other => Err(WalkError::TypeMismatch {
                expected: "literal value".to_string(),
                got: other.kind().name().to_string(),
            }),
        }
    }

    fn pattern_string(node: &Node) -> WalkResult<&str> {
        match node {
            Node::Literal(Value::String(s)) => Ok(s),
            Node::Literal(other) => Err(WalkError::mismatch("string", other)),
            other => Err(WalkError::TypeMismatch {
                expected: "literal value".to_string(),
                got: other.kind().name().to_string(),
            }),
        }
    }
}

impl Default for DocWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeWalker for DocWalker {
    type Output = Json;

    fn walk(&self, tree: &Node) -> WalkResult<Json> {
        self.walk_at(tree, 0)
    }
}
