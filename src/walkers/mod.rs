pub mod helpers;
pub use helpers::*;

pub mod semantics;
pub use semantics::*;

pub mod sql;
pub use sql::*;

pub mod doc;
pub use doc::*;

pub mod graphviz;
pub use graphviz::*;

pub mod ident;
pub use ident::*;


use crate::tree::{Node, WalkError, WalkResult};

/// Recursion ceiling walkers apply unless reconfigured.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// A read-only interpretation of an expression tree.
///
/// Implementations never mutate the tree and take `&self`, so a parsed tree
/// plus any number of walkers can be shared across threads freely. Each
/// walker handles the whole closed operator set: operators it cannot
/// express are reported as [`WalkError::UnexpectedOperator`], operand shape
/// problems as [`WalkError::TypeMismatch`], and trees nested beyond the
/// walker's depth limit as [`WalkError::DepthLimitExceeded`].
pub trait TreeWalker {
    type Output;

    fn walk(&self, tree: &Node) -> WalkResult<Self::Output>;
}

pub(crate) fn check_depth(depth: usize, limit: usize) -> WalkResult<()> {
    if depth > limit {
        return Err(WalkError::DepthLimitExceeded { limit });
    }
    Ok(())
}
