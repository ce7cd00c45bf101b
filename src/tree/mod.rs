pub mod value;
pub use value::*;

pub mod operator;
pub use operator::*;

pub mod node;
pub use node::*;

pub mod error;
pub use error::*;
