//! Routing and rewriting core for sharded SQL databases.
//!
//! Takes a parsed statement with its parameters, picks the data sources and
//! actual tables that must run it, and rewrites it for each of them.

pub mod config;
pub mod encrypt;
pub mod engine;
pub mod error;
pub mod logger;
pub mod rewrite;
pub mod router;
pub mod sharding;
pub mod statement;

pub use engine::{
    Engine, ExecutionContext, ExecutionUnit, PaginationDecision, QueryContext,
    QueryContextBuilder,
};
pub use error::Error;
