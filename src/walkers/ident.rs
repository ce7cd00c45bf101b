use crate::tree::{Node, WalkError, WalkResult};
use crate::walkers::{check_depth, TreeWalker, DEFAULT_MAX_DEPTH};

/// Rewrites every identifier in a tree through a mapping, producing a new
/// tree. The input tree is never touched.
///
/// Typical uses: mapping user-facing field names onto storage columns
/// before SQL generation, or validating that a query only mentions known
/// fields. A `None` from the mapping fails the walk with
/// [`WalkError::KeyNotFound`].
pub struct IdentWalker<F>
where
    F: Fn(&str) -> Option<String>,
{
    mapping: F,
    max_depth: usize,
}

impl<F> IdentWalker<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(mapping: F) -> Self {
        IdentWalker { mapping, max_depth: DEFAULT_MAX_DEPTH }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn walk_at(&self, node: &Node, depth: usize) -> WalkResult<Node> {
        check_depth(depth, self.max_depth)?;
        match node {
            Node::Identifier(name) => match (self.mapping)(name) {
                Some(renamed) => Ok(Node::Identifier(renamed)),
                None => Err(WalkError::KeyNotFound { key: name.to_string() }),
            },
            Node::Literal(_) | Node::NullLiteral => Ok(node.clone()),
            Node::ArrayLiteral(items) => {
                let rewritten = items
                    .iter()
                    .map(|item| self.walk_at(item, depth + 1))
                    .collect::<WalkResult<Vec<_>>>()?;
                Ok(Node::ArrayLiteral(rewritten))
            }
            Node::UnaryExpr { op, right } => {
                Ok(Node::unary(*op, self.walk_at(right, depth + 1)?))
            }
            Node::BinaryExpr { op, left, right } => Ok(Node::binary(
                *op,
                self.walk_at(left, depth + 1)?,
                self.walk_at(right, depth + 1)?,
            )),
        }
    }
}

impl<F> TreeWalker for IdentWalker<F>
where
    F: Fn(&str) -> Option<String>,
{
    type Output = Node;

    fn walk(&self, tree: &Node) -> WalkResult<Node> {
        self.walk_at(tree, 0)
    }
}
