//! A selector-chain evaluation engine for JSONPath queries.
//!
//! Queries are built as immutable chains of [`Selector`]s with a
//! [`ChainBuilder`] and run over `serde_json` documents through a
//! [`PathExpression`]. Results can be returned as values, as
//! [`NormalizedPath`]s, or as both, optionally sorted into document order and
//! deduplicated by path.
//!
//! The query-string parser is not part of this crate; chains are constructed
//! programmatically.

pub mod accumulator;
pub mod builder;
pub mod cache;
pub mod error;
pub mod expression;
pub mod filter;
pub mod functions;
pub mod options;
pub mod path;
mod parser;
pub mod selector;
pub mod value;

// --- Public API ---
pub use accumulator::{JsonPathNode, NodeAccumulator, NodeListAccumulator, PathAccumulator, ValueAccumulator};
pub use builder::ChainBuilder;
pub use cache::EvalCache;
pub use error::JPathError;
pub use expression::PathExpression;
pub use filter::{CompareOp, FilterExpr, Predicate};
pub use functions::{FilterFunction, FunctionRegistry};
pub use options::ResultOptions;
pub use parser::parse_normalized_path;
pub use path::{NormalizedPath, PathNode, PathStep, resolve};
pub use selector::{Selector, SelectorKind, Slice, normalize_index};
pub use value::{EvalValue, ValueKind, compare};
