//! JSONPath queries over `serde_json` documents.
//!
//! This crate re-exports the selector-chain engine from `jsonsel-jpath`:
//!
//! ```
//! use jsonsel::{ChainBuilder, ResultOptions};
//! use serde_json::json;
//!
//! let doc = json!({"store": {"book": [{"price": 8}, {"price": 12}]}});
//! let expr = ChainBuilder::new()
//!     .root()
//!     .recursive_descent()
//!     .identifier("price")
//!     .build();
//!
//! let paths: Vec<String> = expr
//!     .select_paths(&doc, ResultOptions::SORT)
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(paths, ["$['store']['book'][0]['price']", "$['store']['book'][1]['price']"]);
//! ```

pub use jsonsel_jpath::*;

pub use jsonsel_jpath::error::JPathError as Error;

/// Result type for fallible construction (slices, normalized path parsing,
/// function resolution).
pub type Result<T> = std::result::Result<T, Error>;

/// Parses a normalized path string and looks it up in `root`.
///
/// Returns `Ok(None)` when the path is well formed but does not exist in the
/// document.
pub fn lookup<'a>(root: &'a serde_json::Value, path: &str) -> Result<Option<&'a serde_json::Value>> {
    let path: NormalizedPath = path.parse()?;
    let found = path.resolve(root);
    log::debug!("Looked up {} -> {}", path, if found.is_some() { "found" } else { "missing" });
    Ok(found)
}
