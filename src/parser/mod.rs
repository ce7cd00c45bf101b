pub mod lexer;
pub use lexer::*;

pub mod parse_error;
pub use parse_error::*;

pub mod query_parser;
pub use query_parser::*;
