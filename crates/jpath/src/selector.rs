//! The selector chain and its two evaluation strategies.
//!
//! Each [`Selector`] matches against a current node and hands every match to
//! its tail, the rest of the chain. A selector without a tail ends the chain.
//!
//! - [`Selector::select`] streams matches into a [`NodeAccumulator`].
//! - [`Selector::evaluate`] returns one [`EvalValue`], gathering the matches
//!   of multi-producing selectors into a node list. Filter predicates use
//!   this mode.
use crate::accumulator::NodeAccumulator;
use crate::cache::EvalCache;
use crate::error::JPathError;
use crate::filter::Predicate;
use crate::options::ResultOptions;
use crate::path::PathNode;
use crate::value::EvalValue;
use serde_json::Value;
use std::sync::Arc;

/// The pseudo-member that yields the length of an array or string.
///
/// A string's length is its number of Unicode scalar values (`char`s), not
/// UTF-16 code units, so `"😀"` has length 1.
const LENGTH: &str = "length";

/// An array slice `[start:stop:step]`.
///
/// Absent bounds default to the whole array in the direction of `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    start: Option<i64>,
    stop: Option<i64>,
    step: i64,
}

impl Slice {
    pub fn new(start: Option<i64>, stop: Option<i64>, step: i64) -> Result<Self, JPathError> {
        if step == 0 {
            return Err(JPathError::ZeroSliceStep);
        }
        Ok(Self { start, stop, step })
    }

    pub fn start(&self) -> Option<i64> {
        self.start
    }

    pub fn stop(&self) -> Option<i64> {
        self.stop
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// The selected indices of an array of `len` elements, in traversal order.
    ///
    /// Negative bounds count from the end. Bounds are clamped into `[0, len]`
    /// for a positive step and into `[-1, len - 1]` for a negative step.
    pub fn indices(&self, len: usize) -> impl Iterator<Item = usize> + use<> {
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        let step = self.step;
        let normalize = |bound: i64| if bound >= 0 { bound } else { len.saturating_add(bound) };

        let (mut i, end) = if step > 0 {
            let lower = self.start.map_or(0, normalize).clamp(0, len);
            let upper = self.stop.map_or(len, normalize).clamp(0, len);
            (lower, upper)
        } else {
            let upper = self.start.map_or(len - 1, normalize).clamp(-1, len - 1);
            let lower = self.stop.map_or(-1, normalize).clamp(-1, len - 1);
            (upper, lower)
        };

        std::iter::from_fn(move || {
            let in_range = if step > 0 { i < end } else { i > end };
            if !in_range {
                return None;
            }
            let current = i;
            i = i.saturating_add(step);
            usize::try_from(current).ok()
        })
    }
}

/// Resolves a possibly negative index against an array of `len` elements.
pub fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let i = if index >= 0 { index } else { len.checked_add(index)? };
    if (0..len).contains(&i) {
        usize::try_from(i).ok()
    } else {
        None
    }
}

/// The selector variants.
#[derive(Debug, Clone)]
pub enum SelectorKind {
    /// `$`. The id keys the evaluation-scoped cache.
    Root { id: usize },
    /// `@`.
    CurrentNode,
    /// Walks `depth` ancestors up the current path.
    ParentNode { depth: usize },
    /// An object member, or `length` of an array or string.
    ///
    /// `length` is synthesized only as the last selector of a chain, and a
    /// real member of that name always wins. Strings count `char`s, not UTF-16
    /// code units.
    Identifier(String),
    /// An array element; negative indices count from the end.
    Index(i64),
    Slice(Slice),
    /// `..`: the current node and all of its descendants, pre-order.
    RecursiveDescent,
    /// `*`: every array element or object member.
    Wildcard,
    /// Independent branches; each branch already ends in the union's tail.
    Union(Vec<Arc<Selector>>),
    /// Keeps children for which the predicate is truthy.
    Filter(Arc<dyn Predicate>),
}

/// One link of an immutable selector chain.
#[derive(Debug)]
pub struct Selector {
    kind: SelectorKind,
    tail: Option<Arc<Selector>>,
}

fn index_path(path: &PathNode, index: usize, options: ResultOptions) -> PathNode {
    if options.contains(ResultOptions::PATH) {
        path.index(index)
    } else {
        path.clone()
    }
}

fn name_path(path: &PathNode, name: &str, options: ResultOptions) -> PathNode {
    if options.contains(ResultOptions::PATH) {
        path.name(name)
    } else {
        path.clone()
    }
}

/// Re-resolves the ancestor `depth` levels above `path` against `root`.
fn resolve_ancestor<'a, 'p>(
    root: &'a Value,
    path: &'p PathNode,
    depth: usize,
) -> Option<(&'p PathNode, &'a Value)> {
    let ancestor = path.ancestor(depth)?;
    let value = ancestor.to_normalized_path().resolve(root)?;
    Some((ancestor, value))
}

impl Selector {
    pub(crate) fn new(kind: SelectorKind, tail: Option<Arc<Selector>>) -> Self {
        Self { kind, tail }
    }

    pub fn kind(&self) -> &SelectorKind {
        &self.kind
    }

    pub fn tail(&self) -> Option<&Arc<Selector>> {
        self.tail.as_ref()
    }

    /// Traverse mode: streams every match under `current` into `acc`.
    pub fn select<'a>(
        &self,
        cache: &mut EvalCache<'a>,
        root: &'a Value,
        path: &PathNode,
        current: &'a Value,
        acc: &mut dyn NodeAccumulator<'a>,
        options: ResultOptions,
    ) {
        match &self.kind {
            SelectorKind::Root { .. } => {
                self.select_tail(cache, root, path.sentinel(), root, acc, options);
            }
            SelectorKind::CurrentNode => {
                self.select_tail(cache, root, path, current, acc, options);
            }
            SelectorKind::ParentNode { depth } => {
                if let Some((ancestor, value)) = resolve_ancestor(root, path, *depth) {
                    self.select_tail(cache, root, ancestor, value, acc, options);
                }
            }
            SelectorKind::Identifier(name) => match current {
                Value::Object(obj) => {
                    if let Some(value) = obj.get(name) {
                        let path = name_path(path, name, options);
                        self.select_tail(cache, root, &path, value, acc, options);
                    }
                }
                _ => {
                    if let Some(len) = self.pseudo_length(name, current) {
                        let path = name_path(path, name, options);
                        acc.accumulate(&path, EvalValue::Owned(len.into()));
                    }
                }
            },
            SelectorKind::Index(index) => {
                if let Value::Array(arr) = current {
                    if let Some(i) = normalize_index(*index, arr.len()) {
                        let path = index_path(path, i, options);
                        self.select_tail(cache, root, &path, &arr[i], acc, options);
                    }
                }
            }
            SelectorKind::Slice(slice) => {
                if let Value::Array(arr) = current {
                    for i in slice.indices(arr.len()) {
                        let path = index_path(path, i, options);
                        self.select_tail(cache, root, &path, &arr[i], acc, options);
                    }
                }
            }
            SelectorKind::RecursiveDescent => {
                self.select_tail(cache, root, path, current, acc, options);
                match current {
                    Value::Array(arr) => {
                        for (i, item) in arr.iter().enumerate() {
                            let path = index_path(path, i, options);
                            self.select(cache, root, &path, item, acc, options);
                        }
                    }
                    Value::Object(obj) => {
                        for (name, item) in obj {
                            let path = name_path(path, name, options);
                            self.select(cache, root, &path, item, acc, options);
                        }
                    }
                    _ => {}
                }
            }
            SelectorKind::Wildcard => match current {
                Value::Array(arr) => {
                    for (i, item) in arr.iter().enumerate() {
                        let path = index_path(path, i, options);
                        self.select_tail(cache, root, &path, item, acc, options);
                    }
                }
                Value::Object(obj) => {
                    for (name, item) in obj {
                        let path = name_path(path, name, options);
                        self.select_tail(cache, root, &path, item, acc, options);
                    }
                }
                _ => {}
            },
            SelectorKind::Union(branches) => {
                for branch in branches {
                    branch.select(cache, root, path, current, acc, options);
                }
            }
            SelectorKind::Filter(predicate) => match current {
                Value::Array(arr) => {
                    for (i, item) in arr.iter().enumerate() {
                        let path = index_path(path, i, options);
                        if predicate.evaluate(cache, root, &path, item, options).is_truthy() {
                            self.select_tail(cache, root, &path, item, acc, options);
                        }
                    }
                }
                Value::Object(obj) => {
                    for (name, item) in obj {
                        let path = name_path(path, name, options);
                        if predicate.evaluate(cache, root, &path, item, options).is_truthy() {
                            self.select_tail(cache, root, &path, item, acc, options);
                        }
                    }
                }
                _ => {}
            },
        }
    }

    /// Evaluate mode: returns the chain's result under `current` as one value.
    ///
    /// Single-producing selectors return their tail's value directly. No match
    /// is the empty node list.
    pub fn evaluate<'a>(
        &self,
        cache: &mut EvalCache<'a>,
        root: &'a Value,
        path: &PathNode,
        current: &'a Value,
        options: ResultOptions,
    ) -> EvalValue<'a> {
        match &self.kind {
            SelectorKind::Root { id } => {
                if let Some(value) = cache.try_get(*id) {
                    return value;
                }
                let value = self.evaluate_tail(cache, root, path.sentinel(), root, options);
                cache.put(*id, value.clone());
                value
            }
            SelectorKind::CurrentNode => self.evaluate_tail(cache, root, path, current, options),
            SelectorKind::ParentNode { depth } => match resolve_ancestor(root, path, *depth) {
                Some((ancestor, value)) => self.evaluate_tail(cache, root, ancestor, value, options),
                None => EvalValue::nothing(),
            },
            SelectorKind::Identifier(name) => match current {
                Value::Object(obj) => match obj.get(name) {
                    Some(value) => {
                        let path = name_path(path, name, options);
                        self.evaluate_tail(cache, root, &path, value, options)
                    }
                    None => EvalValue::nothing(),
                },
                _ => match self.pseudo_length(name, current) {
                    Some(len) => EvalValue::Owned(len.into()),
                    None => EvalValue::nothing(),
                },
            },
            SelectorKind::Index(index) => match current {
                Value::Array(arr) => match normalize_index(*index, arr.len()) {
                    Some(i) => {
                        let path = index_path(path, i, options);
                        self.evaluate_tail(cache, root, &path, &arr[i], options)
                    }
                    None => EvalValue::nothing(),
                },
                _ => EvalValue::nothing(),
            },
            SelectorKind::Slice(slice) => {
                let mut list = Vec::new();
                if let Value::Array(arr) = current {
                    for i in slice.indices(arr.len()) {
                        let path = index_path(path, i, options);
                        self.evaluate_tail(cache, root, &path, &arr[i], options)
                            .flatten_into(&mut list);
                    }
                }
                EvalValue::NodeList(list)
            }
            SelectorKind::RecursiveDescent => {
                let mut list = Vec::new();
                self.descend(cache, root, path, current, options, &mut list);
                EvalValue::NodeList(list)
            }
            SelectorKind::Wildcard => {
                let mut list = Vec::new();
                match current {
                    Value::Array(arr) => {
                        for (i, item) in arr.iter().enumerate() {
                            let path = index_path(path, i, options);
                            self.evaluate_tail(cache, root, &path, item, options)
                                .flatten_into(&mut list);
                        }
                    }
                    Value::Object(obj) => {
                        for (name, item) in obj {
                            let path = name_path(path, name, options);
                            self.evaluate_tail(cache, root, &path, item, options)
                                .flatten_into(&mut list);
                        }
                    }
                    _ => {}
                }
                EvalValue::NodeList(list)
            }
            SelectorKind::Union(branches) => {
                let mut list = Vec::new();
                for branch in branches {
                    branch
                        .evaluate(cache, root, path, current, options)
                        .flatten_into(&mut list);
                }
                EvalValue::NodeList(list)
            }
            SelectorKind::Filter(predicate) => {
                let mut list = Vec::new();
                match current {
                    Value::Array(arr) => {
                        for (i, item) in arr.iter().enumerate() {
                            let path = index_path(path, i, options);
                            if predicate.evaluate(cache, root, &path, item, options).is_truthy() {
                                self.evaluate_tail(cache, root, &path, item, options)
                                    .flatten_into(&mut list);
                            }
                        }
                    }
                    Value::Object(obj) => {
                        for (name, item) in obj {
                            let path = name_path(path, name, options);
                            if predicate.evaluate(cache, root, &path, item, options).is_truthy() {
                                self.evaluate_tail(cache, root, &path, item, options)
                                    .flatten_into(&mut list);
                            }
                        }
                    }
                    _ => {}
                }
                EvalValue::NodeList(list)
            }
        }
    }

    /// The value of the `length` pseudo-member on a non-object node.
    ///
    /// Synthesized lengths are not document nodes, so nothing may follow
    /// them. Strings count Unicode scalar values, not UTF-16 code units.
    fn pseudo_length(&self, name: &str, current: &Value) -> Option<usize> {
        if name != LENGTH || self.tail.is_some() {
            return None;
        }
        match current {
            Value::Array(arr) => Some(arr.len()),
            Value::String(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    fn descend<'a>(
        &self,
        cache: &mut EvalCache<'a>,
        root: &'a Value,
        path: &PathNode,
        current: &'a Value,
        options: ResultOptions,
        list: &mut Vec<EvalValue<'a>>,
    ) {
        self.evaluate_tail(cache, root, path, current, options)
            .flatten_into(list);
        match current {
            Value::Array(arr) => {
                for (i, item) in arr.iter().enumerate() {
                    let path = index_path(path, i, options);
                    self.descend(cache, root, &path, item, options, list);
                }
            }
            Value::Object(obj) => {
                for (name, item) in obj {
                    let path = name_path(path, name, options);
                    self.descend(cache, root, &path, item, options, list);
                }
            }
            _ => {}
        }
    }

    fn select_tail<'a>(
        &self,
        cache: &mut EvalCache<'a>,
        root: &'a Value,
        path: &PathNode,
        current: &'a Value,
        acc: &mut dyn NodeAccumulator<'a>,
        options: ResultOptions,
    ) {
        match &self.tail {
            Some(tail) => tail.select(cache, root, path, current, acc, options),
            None => acc.accumulate(path, EvalValue::Node(current)),
        }
    }

    fn evaluate_tail<'a>(
        &self,
        cache: &mut EvalCache<'a>,
        root: &'a Value,
        path: &PathNode,
        current: &'a Value,
        options: ResultOptions,
    ) -> EvalValue<'a> {
        match &self.tail {
            Some(tail) => tail.evaluate(cache, root, path, current, options),
            None => EvalValue::Node(current),
        }
    }
}
