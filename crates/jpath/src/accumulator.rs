//! Receivers for the matches produced by a Traverse-mode walk.
//!
//! A match is normally a borrowed document node. The `length` pseudo-member
//! is the exception: it arrives as an owned, synthesized number.
use crate::path::{NormalizedPath, PathNode};
use crate::value::EvalValue;

/// A sink that receives each match as it is found.
pub trait NodeAccumulator<'a> {
    fn accumulate(&mut self, path: &PathNode, value: EvalValue<'a>);
}

/// A match record: where a value was found, and the value.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPathNode<'a> {
    pub path: NormalizedPath,
    pub value: EvalValue<'a>,
}

/// Collects values only; paths are never materialized.
#[derive(Debug, Default)]
pub struct ValueAccumulator<'a> {
    pub values: Vec<EvalValue<'a>>,
}

impl<'a> NodeAccumulator<'a> for ValueAccumulator<'a> {
    fn accumulate(&mut self, _path: &PathNode, value: EvalValue<'a>) {
        self.values.push(value);
    }
}

/// Collects (path, value) match records.
#[derive(Debug, Default)]
pub struct NodeListAccumulator<'a> {
    pub nodes: Vec<JsonPathNode<'a>>,
}

impl<'a> NodeAccumulator<'a> for NodeListAccumulator<'a> {
    fn accumulate(&mut self, path: &PathNode, value: EvalValue<'a>) {
        self.nodes.push(JsonPathNode {
            path: path.to_normalized_path(),
            value,
        });
    }
}

/// Collects paths only.
#[derive(Debug, Default)]
pub struct PathAccumulator {
    pub paths: Vec<NormalizedPath>,
}

impl<'a> NodeAccumulator<'a> for PathAccumulator {
    fn accumulate(&mut self, path: &PathNode, _value: EvalValue<'a>) {
        self.paths.push(path.to_normalized_path());
    }
}
