pub mod tree;
pub use tree::{Node, NodeKind, Operator, Value, WalkError, WalkResult};

pub mod parser;
pub use parser::{parse, ParseError};

pub mod walkers;
pub use walkers::{
    DocWalker, Evaluator, GraphvizWalker, IdentWalker, SqlDialect, SqlFilter, SqlWalker,
    TreeWalker, DEFAULT_MAX_DEPTH,
};

pub mod record;
pub use record::Record;
