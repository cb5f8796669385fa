//! SQL rewriting.
//!
//! Generators produce tokens anchored at offsets of the original SQL. Tokens
//! are sorted, checked for overlaps and spliced into one SQL string per
//! route unit.

pub mod builder;
pub mod context;
pub mod engine;
pub mod error;
pub mod generator;
pub mod parameter;
pub mod token;

pub use builder::SqlBuilder;
pub use context::RewriteContext;
pub use engine::{RewriteEngine, SqlUnit};
pub use error::Error;
pub use parameter::ParameterBuilder;
pub use token::{Token, TokenKind};
