use std::cmp::Ordering;

use regex::Regex;
use tracing::warn;

use crate::tree::{Node, Operator, Value, WalkError, WalkResult};
use crate::walkers::{check_depth, Coerce, TreeWalker, DEFAULT_MAX_DEPTH};

/// Evaluates a tree against one record, through a lookup closure.
///
/// The lookup maps a field name to a value, or `None` when the record has
/// no such field. `None` surfaces as [`WalkError::KeyNotFound`]; a field
/// that exists but is empty should be reported as `Some(Value::Null)`
/// instead, which is what `is null` tests for.
pub struct Evaluator<F>
where
    F: Fn(&str) -> Option<Value>,
{
    lookup: F,
    max_depth: usize,
}

/// One-shot evaluation, for callers that do not keep the walker around.
pub fn walk<F>(tree: &Node, lookup: F) -> WalkResult<Value>
where
    F: Fn(&str) -> Option<Value>,
{
    Evaluator::new(lookup).walk(tree)
}

impl<F> Evaluator<F>
where
    F: Fn(&str) -> Option<Value>,
{
    pub fn new(lookup: F) -> Self {
        Evaluator { lookup, max_depth: DEFAULT_MAX_DEPTH }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn walk_at(&self, node: &Node, depth: usize) -> WalkResult<Value> {
        check_depth(depth, self.max_depth)?;
        match node {
            Node::Identifier(name) => self.resolve(name),
            Node::Literal(value) => Ok(value.clone()),
            Node::NullLiteral => Ok(Value::Null),
            Node::ArrayLiteral(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.walk_at(item, depth + 1)?);
                }
                Ok(Value::Array(values))
            }
            Node::UnaryExpr { op, right } => {
                let right = self.walk_at(right, depth + 1)?;
                Self::eval_unary(*op, right)
            }
            // Both children always evaluate, right side first. `and`/`or`
            // do not short-circuit: an error in either operand surfaces no
            // matter what the other one held.
            Node::BinaryExpr { op, left, right } => {
                let right = self.walk_at(right, depth + 1)?;
                let left = self.walk_at(left, depth + 1)?;
                Self::eval_binary(*op, left, right)
            }
        }
    }

    fn resolve(&self, name: &str) -> WalkResult<Value> {
        match (self.lookup)(name) {
            Some(value) => Ok(Coerce::promote(value)),
            None => Err(WalkError::KeyNotFound { key: name.to_string() }),
        }
    }

    fn eval_unary(op: Operator, right: Value) -> WalkResult<Value> {
        match op {
            Operator::Not => match right {
                Value::Boolean(b) => Ok(Value::Boolean(!b)),
                other => Err(WalkError::mismatch("boolean", &other)),
            },
            Operator::Sub => match Coerce::to_number(&right) {
                Some(n) => Ok(Value::Number(-n)),
                None => Err(WalkError::mismatch("number", &right)),
            },
            other => Err(WalkError::UnexpectedOperator { operator: other }),
        }
    }

    fn eval_binary(op: Operator, left: Value, right: Value) -> WalkResult<Value> {
        match op {
            Operator::Eq => Ok(Value::Boolean(left == right)),
            Operator::NotEq => Ok(Value::Boolean(left != right)),
            Operator::Lt => {
                Ok(Value::Boolean(Coerce::compare(&left, &right)? == Ordering::Less))
            }
            Operator::LtEq => {
                Ok(Value::Boolean(Coerce::compare(&left, &right)? != Ordering::Greater))
            }
            Operator::Gt => {
                Ok(Value::Boolean(Coerce::compare(&left, &right)? == Ordering::Greater))
            }
            Operator::GtEq => {
                Ok(Value::Boolean(Coerce::compare(&left, &right)? != Ordering::Less))
            }
            Operator::And => {
                let l = Self::boolean_operand(&left)?;
                let r = Self::boolean_operand(&right)?;
                Ok(Value::Boolean(l && r))
            }
            Operator::Or => {
                let l = Self::boolean_operand(&left)?;
                let r = Self::boolean_operand(&right)?;
                Ok(Value::Boolean(l || r))
            }
            Operator::Like => Self::eval_like(&left, &right, false).map(Value::Boolean),
            Operator::ILike => Self::eval_like(&left, &right, true).map(Value::Boolean),
            Operator::RegexEq => Self::eval_regex(&left, &right).map(Value::Boolean),
            Operator::RegexNotEq => Self::eval_regex(&left, &right).map(|m| Value::Boolean(!m)),
            Operator::In => match right {
                Value::Array(items) => Self::eval_in(&left, &items).map(Value::Boolean),
                other => Err(WalkError::mismatch("array", &other)),
            },
            Operator::Between => match right {
                Value::Array(bounds) => {
                    if bounds.len() != 2 {
                        return Err(WalkError::TypeMismatch {
                            expected: "2 values".to_string(),
                            got: format!("{} values", bounds.len()),
                        });
                    }
                    Self::eval_between(&left, &bounds[0], &bounds[1]).map(Value::Boolean)
                }
                other => Err(WalkError::mismatch("array", &other)),
            },
            // `is` only answers "is it null": a non-null right side makes
            // the whole expression false, even when both sides are equal.
            Operator::Is => Ok(Value::Boolean(right.is_null() && left.is_null())),
            Operator::Add => {
                let (l, r) = Self::numeric_operands(&left, &right)?;
                Ok(Value::Number(l + r))
            }
            Operator::Sub => {
                let (l, r) = Self::numeric_operands(&left, &right)?;
                Ok(Value::Number(l - r))
            }
            Operator::Mul => {
                let (l, r) = Self::numeric_operands(&left, &right)?;
                Ok(Value::Number(l * r))
            }
            Operator::Div => {
                let (l, r) = Self::numeric_operands(&left, &right)?;
                if r == 0.0 {
                    return Err(WalkError::DivisionByZero { operation: "division".to_string() });
                }
                Ok(Value::Number(l / r))
            }
            // integral remainder: both operands truncate toward zero first
            Operator::Mod => {
                let (l, r) = Self::numeric_operands(&left, &right)?;
                let (l, r) = (l as i64, r as i64);
                if r == 0 {
                    return Err(WalkError::DivisionByZero { operation: "modulus".to_string() });
                }
                Ok(Value::Number((l % r) as f64))
            }
            Operator::Not => Err(WalkError::UnexpectedOperator { operator: Operator::Not }),
        }
    }

    fn boolean_operand(value: &Value) -> WalkResult<bool> {
        value
            .as_bool()
            .ok_or_else(|| WalkError::mismatch("boolean", value))
    }

    // Left operand is checked before the right one, so when both are wrong
    // the error names the left kind.
    fn numeric_operands(left: &Value, right: &Value) -> WalkResult<(f64, f64)> {
        let l = Coerce::to_number(left).ok_or_else(|| WalkError::mismatch("number", left))?;
        let r = Coerce::to_number(right).ok_or_else(|| WalkError::mismatch("number", right))?;
        Ok((l, r))
    }

    fn eval_like(left: &Value, right: &Value, case_insensitive: bool) -> WalkResult<bool> {
        let value = left
            .as_str()
            .ok_or_else(|| WalkError::mismatch("string", left))?;
        let pattern = right
            .as_str()
            .ok_or_else(|| WalkError::mismatch("string", right))?;
        let (value, pattern) = if case_insensitive {
            (value.to_lowercase(), pattern.to_lowercase())
        } else {
            (value.to_string(), pattern.to_string())
        };
        let translated = Coerce::like_to_regex(&pattern);
        match Regex::new(&translated) {
            Ok(re) => Ok(re.is_match(&value)),
            // a pattern that does not survive translation matches nothing
            Err(err) => {
                warn!("like pattern {:?} does not compile ({}), treating as no match", pattern, err);
                Ok(false)
            }
        }
    }

    fn eval_regex(left: &Value, right: &Value) -> WalkResult<bool> {
        let value = left
            .as_str()
            .ok_or_else(|| WalkError::mismatch("string", left))?;
        let pattern = right
            .as_str()
            .ok_or_else(|| WalkError::mismatch("string", right))?;
        let re = Regex::new(pattern).map_err(|err| WalkError::InvalidRegex {
            pattern: pattern.to_string(),
            message: err.to_string(),
        })?;
        Ok(re.is_match(value))
    }

    fn eval_in(left: &Value, items: &[Value]) -> WalkResult<bool> {
        match left {
            Value::Null => Ok(false),
            Value::String(_) | Value::Number(_) | Value::Timestamp(_) | Value::Boolean(_) => {
                Ok(items.iter().any(|item| item == left))
            }
            other => Err(WalkError::mismatch(
                "string, number, timestamp, or boolean",
                other,
            )),
        }
    }

    // Bounds are inclusive on both ends. Timestamp ranges insist on real
    // timestamps; date-looking strings are not coerced here.
    fn eval_between(left: &Value, min: &Value, max: &Value) -> WalkResult<bool> {
        match left {
            Value::Number(v) => {
                let lo =
                    Coerce::to_number(min).ok_or_else(|| WalkError::mismatch("number", min))?;
                let hi =
                    Coerce::to_number(max).ok_or_else(|| WalkError::mismatch("number", max))?;
                Ok(*v >= lo && *v <= hi)
            }
            Value::Timestamp(v) => {
                let lo = match min {
                    Value::Timestamp(t) => *t,
                    other => return Err(WalkError::mismatch("timestamp", other)),
                };
                let hi = match max {
                    Value::Timestamp(t) => *t,
                    other => return Err(WalkError::mismatch("timestamp", other)),
                };
                Ok(*v >= lo && *v <= hi)
            }
            other => Err(WalkError::mismatch("number or timestamp", other)),
        }
    }
}

impl<F> TreeWalker for Evaluator<F>
where
    F: Fn(&str) -> Option<Value>,
{
    type Output = Value;

    fn walk(&self, tree: &Node) -> WalkResult<Value> {
        self.walk_at(tree, 0)
    }
}
