use crate::tree::{Node, Operator, Value, WalkError, WalkResult};
use crate::walkers::{check_depth, TreeWalker, DEFAULT_MAX_DEPTH};

/// Target flavor for generated SQL. The dialect decides placeholder style,
/// identifier quoting, and how case-insensitive and regex matches spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Postgres,
    MySql,
}

impl SqlDialect {
    fn placeholder(&self, index: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${}", index),
            SqlDialect::MySql => "?".to_string(),
        }
    }

    fn quote(&self, segment: &str) -> String {
        match self {
            SqlDialect::Postgres => format!("\"{}\"", segment.replace('"', "\"\"")),
            SqlDialect::MySql => format!("`{}`", segment.replace('`', "``")),
        }
    }
}

/// A rendered `WHERE` clause body plus its bind parameters, in placeholder
/// order. Literals never land in the SQL text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlFilter {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Renders a tree as a parameterized SQL filter.
pub struct SqlWalker {
    dialect: SqlDialect,
    max_depth: usize,
}

impl SqlWalker {
    pub fn new(dialect: SqlDialect) -> Self {
        SqlWalker { dialect, max_depth: DEFAULT_MAX_DEPTH }
    }

    pub fn postgres() -> Self {
        Self::new(SqlDialect::Postgres)
    }

    pub fn mysql() -> Self {
        Self::new(SqlDialect::MySql)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn walk_at(&self, node: &Node, depth: usize, out: &mut SqlFilter) -> WalkResult<()> {
        check_depth(depth, self.max_depth)?;
        match node {
            Node::Identifier(name) => {
                out.sql.push_str(&self.quote_identifier(name));
                Ok(())
            }
            Node::Literal(value) => {
                self.push_param(out, value.clone());
                Ok(())
            }
            Node::NullLiteral => {
                out.sql.push_str("NULL");
                Ok(())
            }
            Node::ArrayLiteral(items) => self.render_list(items, depth, out),
            Node::UnaryExpr { op, right } => match op {
                Operator::Not => {
                    out.sql.push_str("NOT (");
                    self.walk_at(right, depth + 1, out)?;
                    out.sql.push(')');
                    Ok(())
                }
                Operator::Sub => {
                    out.sql.push_str("-(");
                    self.walk_at(right, depth + 1, out)?;
                    out.sql.push(')');
                    Ok(())
                }
                other => Err(WalkError::UnexpectedOperator { operator: *other }),
            },
            Node::BinaryExpr { op, left, right } => self.render_binary(*op, left, right, depth, out),
        }
    }

    fn render_binary(
        &self,
        op: Operator,
        left: &Node,
        right: &Node,
        depth: usize,
        out: &mut SqlFilter,
    ) -> WalkResult<()> {
        match op {
            Operator::Eq
            | Operator::NotEq
            | Operator::Lt
            | Operator::LtEq
            | Operator::Gt
            | Operator::GtEq
            | Operator::And
            | Operator::Or
            | Operator::Add
            | Operator::Sub
            | Operator::Mul
            | Operator::Div
            | Operator::Mod => self.render_infix(Self::infix_symbol(op)?, left, right, depth, out),
            Operator::Like => self.render_infix("LIKE", left, right, depth, out),
            Operator::ILike => match self.dialect {
                SqlDialect::Postgres => self.render_infix("ILIKE", left, right, depth, out),
                // MySQL has no ILIKE; fold both sides instead
                SqlDialect::MySql => {
                    out.sql.push_str("(LOWER(");
                    self.walk_at(left, depth + 1, out)?;
                    out.sql.push_str(") LIKE LOWER(");
                    self.walk_at(right, depth + 1, out)?;
                    out.sql.push_str("))");
                    Ok(())
                }
            },
            Operator::RegexEq => match self.dialect {
                SqlDialect::Postgres => self.render_infix("~", left, right, depth, out),
                SqlDialect::MySql => self.render_infix("REGEXP", left, right, depth, out),
            },
            Operator::RegexNotEq => match self.dialect {
                SqlDialect::Postgres => self.render_infix("!~", left, right, depth, out),
                SqlDialect::MySql => self.render_infix("NOT REGEXP", left, right, depth, out),
            },
            Operator::In => match right {
                Node::ArrayLiteral(items) if items.is_empty() => {
                    // `IN ()` is not SQL; nothing is a member of nothing
                    out.sql.push_str("FALSE");
                    Ok(())
                }
                Node::ArrayLiteral(items) => {
                    out.sql.push('(');
                    self.walk_at(left, depth + 1, out)?;
                    out.sql.push_str(" IN ");
                    self.render_list(items, depth, out)?;
                    out.sql.push(')');
                    Ok(())
                }
                other => Err(WalkError::TypeMismatch {
                    expected: "array".to_string(),
                    got: other.kind().name().to_string(),
                }),
            },
            Operator::Between => match right {
                Node::ArrayLiteral(bounds) if bounds.len() == 2 => {
                    out.sql.push('(');
                    self.walk_at(left, depth + 1, out)?;
                    out.sql.push_str(" BETWEEN ");
                    self.walk_at(&bounds[0], depth + 1, out)?;
                    out.sql.push_str(" AND ");
                    self.walk_at(&bounds[1], depth + 1, out)?;
                    out.sql.push(')');
                    Ok(())
                }
                Node::ArrayLiteral(bounds) => Err(WalkError::TypeMismatch {
                    expected: "2 values".to_string(),
                    got: format!("{} values", bounds.len()),
                }),
                other => Err(WalkError::TypeMismatch {
                    expected: "array".to_string(),
                    got: other.kind().name().to_string(),
                }),
            },
            Operator::Is => match right {
                Node::NullLiteral => {
                    out.sql.push('(');
                    self.walk_at(left, depth + 1, out)?;
                    out.sql.push_str(" IS NULL)");
                    Ok(())
                }
                // `is <non-null>` is false for every row
                _ => {
                    out.sql.push_str("FALSE");
                    Ok(())
                }
            },
            Operator::Not => Err(WalkError::UnexpectedOperator { operator: Operator::Not }),
        }
    }

    fn render_infix(
        &self,
        symbol: &str,
        left: &Node,
        right: &Node,
        depth: usize,
        out: &mut SqlFilter,
    ) -> WalkResult<()> {
        out.sql.push('(');
        self.walk_at(left, depth + 1, out)?;
        out.sql.push(' ');
        out.sql.push_str(symbol);
        out.sql.push(' ');
        self.walk_at(right, depth + 1, out)?;
        out.sql.push(')');
        Ok(())
    }

    fn render_list(&self, items: &[Node], depth: usize, out: &mut SqlFilter) -> WalkResult<()> {
        out.sql.push('(');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.sql.push_str(", ");
            }
            self.walk_at(item, depth + 1, out)?;
        }
        out.sql.push(')');
        Ok(())
    }

    fn infix_symbol(op: Operator) -> WalkResult<&'static str> {
        match op {
            Operator::Eq => Ok("="),
            Operator::NotEq => Ok("<>"),
            Operator::Lt => Ok("<"),
            Operator::LtEq => Ok("<="),
            Operator::Gt => Ok(">"),
            Operator::GtEq => Ok(">="),
            Operator::And => Ok("AND"),
            Operator::Or => Ok("OR"),
            Operator::Add => Ok("+"),
            Operator::Sub => Ok("-"),
            Operator::Mul => Ok("*"),
            Operator::Div => Ok("/"),
            Operator::Mod => Ok("%"),
            other => Err(WalkError::UnexpectedOperator { operator: other }),
        }
    }

    // Dotted names quote per segment, so `spec.pages` addresses a column
    // through its table or a nested field, not one odd column name.
    fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|segment| self.dialect.quote(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn push_param(&self, out: &mut SqlFilter, value: Value) {
        out.params.push(value);
        let placeholder = self.dialect.placeholder(out.params.len());
        out.sql.push_str(&placeholder);
    }
}

impl TreeWalker for SqlWalker {
    type Output = SqlFilter;

    fn walk(&self, tree: &Node) -> WalkResult<SqlFilter> {
        let mut out = SqlFilter::default();
        self.walk_at(tree, 0, &mut out)?;
        Ok(out)
    }
}
