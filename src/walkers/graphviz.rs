use crate::tree::{Node, WalkResult};
use crate::walkers::{check_depth, TreeWalker, DEFAULT_MAX_DEPTH};

/// Renders a tree as a Graphviz `digraph`, for debugging and docs.
///
/// Node ids are assigned in visit order (`n0`, `n1`, ...), so the output is
/// deterministic for a given tree. Operators draw as boxes, leaves as
/// ellipses. Every operator renders; this walker rejects nothing but
/// overly deep trees.
pub struct GraphvizWalker {
    max_depth: usize,
}

impl GraphvizWalker {
    pub fn new() -> Self {
        GraphvizWalker { max_depth: DEFAULT_MAX_DEPTH }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn render(
        &self,
        node: &Node,
        depth: usize,
        counter: &mut usize,
        out: &mut String,
    ) -> WalkResult<usize> {
        check_depth(depth, self.max_depth)?;
        let id = *counter;
        *counter += 1;
        match node {
            Node::Identifier(name) => {
                Self::leaf(out, id, name);
            }
            Node::Literal(value) => {
                Self::leaf(out, id, &value.to_string());
            }
            Node::NullLiteral => {
                Self::leaf(out, id, "null");
            }
            Node::ArrayLiteral(items) => {
                Self::branch(out, id, "array");
                let mut child_ids = Vec::with_capacity(items.len());
                for item in items {
                    child_ids.push(self.render(item, depth + 1, counter, out)?);
                }
                for child in child_ids {
                    Self::edge(out, id, child);
                }
            }
            Node::UnaryExpr { op, right } => {
                Self::branch(out, id, &op.to_string());
                let child = self.render(right, depth + 1, counter, out)?;
                Self::edge(out, id, child);
            }
            Node::BinaryExpr { op, left, right } => {
                Self::branch(out, id, &op.to_string());
                let left_id = self.render(left, depth + 1, counter, out)?;
                let right_id = self.render(right, depth + 1, counter, out)?;
                Self::edge(out, id, left_id);
                Self::edge(out, id, right_id);
            }
        }
        Ok(id)
    }

    fn leaf(out: &mut String, id: usize, label: &str) {
        out.push_str(&format!("  n{} [shape=ellipse label=\"{}\"]\n", id, Self::escape(label)));
    }

    fn branch(out: &mut String, id: usize, label: &str) {
        out.push_str(&format!("  n{} [shape=box label=\"{}\"]\n", id, Self::escape(label)));
    }

    fn edge(out: &mut String, from: usize, to: usize) {
        out.push_str(&format!("  n{} -> n{}\n", from, to));
    }

    fn escape(label: &str) -> String {
        label.replace('\\', "\\\\").replace('"', "\\\"")
    }
}

impl Default for GraphvizWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeWalker for GraphvizWalker {
    type Output = String;

    fn walk(&self, tree: &Node) -> WalkResult<String> {
        let mut out = String::from("digraph {\n");
        let mut counter = 0;
        self.render(tree, 0, &mut counter, &mut out)?;
        out.push_str("}\n");
        Ok(out)
    }
}
