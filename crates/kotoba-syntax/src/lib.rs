pub mod ast;
pub mod error;
pub mod keyword;
pub mod token;
pub mod tree;

pub use ast::*;
pub use error::*;
pub use token::*;
pub use tree::*;
