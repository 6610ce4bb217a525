//! The top-level entry point: runs a selector chain over a document and
//! shapes the matches into an ordered result set.
use crate::accumulator::{JsonPathNode, NodeListAccumulator, PathAccumulator, ValueAccumulator};
use crate::cache::EvalCache;
use crate::options::ResultOptions;
use crate::path::{NormalizedPath, PathNode};
use crate::selector::Selector;
use crate::value::EvalValue;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// A compiled query: an immutable selector chain.
///
/// Expressions are cheap to clone and can be shared between threads. Every
/// call creates its own accumulator and evaluation cache, so nothing carries
/// over from one call to the next.
#[derive(Debug, Clone)]
pub struct PathExpression {
    chain: Arc<Selector>,
    requires_paths: bool,
}

impl PathExpression {
    pub(crate) fn new(chain: Arc<Selector>, requires_paths: bool) -> Self {
        Self {
            chain,
            requires_paths,
        }
    }

    /// The first selector of the chain.
    pub fn chain(&self) -> &Selector {
        &self.chain
    }

    /// True if the chain walks back up to ancestors, which needs path tracking.
    pub fn requires_paths(&self) -> bool {
        self.requires_paths
    }

    fn effective_options(&self, options: ResultOptions) -> ResultOptions {
        if self.requires_paths || options.needs_ordering() {
            options | ResultOptions::PATH
        } else {
            options
        }
    }

    /// Selects the matching values, in traversal order unless `SORT` is given.
    ///
    /// Matches are document nodes, except for a trailing `length` pseudo-member,
    /// which yields an owned number.
    pub fn select<'a>(&self, root: &'a Value, options: ResultOptions) -> Vec<EvalValue<'a>> {
        let options = self.effective_options(options);
        let mut cache = EvalCache::new();

        let values = if options.needs_ordering() {
            let mut acc = NodeListAccumulator::default();
            self.chain
                .select(&mut cache, root, &PathNode::root(), root, &mut acc, options);
            post_process(acc.nodes, options, |node| &node.path)
                .into_iter()
                .map(|node| node.value)
                .collect()
        } else {
            let mut acc = ValueAccumulator::default();
            self.chain
                .select(&mut cache, root, &PathNode::root(), root, &mut acc, options);
            acc.values
        };

        log::debug!("Selected {} value(s) with options {}", values.len(), options);
        values
    }

    /// Selects the normalized paths of the matches.
    pub fn select_paths(&self, root: &Value, options: ResultOptions) -> Vec<NormalizedPath> {
        let options = self.effective_options(options | ResultOptions::PATH);
        let mut cache = EvalCache::new();
        let mut acc = PathAccumulator::default();
        self.chain
            .select(&mut cache, root, &PathNode::root(), root, &mut acc, options);

        let paths = post_process(acc.paths, options, |path| path);
        log::debug!("Selected {} path(s) with options {}", paths.len(), options);
        paths
    }

    /// Selects match records: each value together with its normalized path.
    pub fn select_nodes<'a>(&self, root: &'a Value, options: ResultOptions) -> Vec<JsonPathNode<'a>> {
        let options = self.effective_options(options | ResultOptions::PATH);
        let mut cache = EvalCache::new();
        let mut acc = NodeListAccumulator::default();
        self.chain
            .select(&mut cache, root, &PathNode::root(), root, &mut acc, options);

        let nodes = post_process(acc.nodes, options, |node| &node.path);
        log::debug!("Selected {} node(s) with options {}", nodes.len(), options);
        nodes
    }

    /// Evaluates the chain against `root` as a single value, gathering
    /// multiple matches into a node list.
    pub fn evaluate<'a>(&self, root: &'a Value) -> EvalValue<'a> {
        let mut cache = EvalCache::new();
        self.evaluate_with(&mut cache, root, &PathNode::root(), root, ResultOptions::empty())
    }

    /// Evaluates the chain from `current`, located at `path`, inside an
    /// evaluation that is already in progress, sharing its cache.
    ///
    /// Parent steps walk up from `path`, so it must be the real location of
    /// `current` whenever the chain contains one.
    pub fn evaluate_with<'a>(
        &self,
        cache: &mut EvalCache<'a>,
        root: &'a Value,
        path: &PathNode,
        current: &'a Value,
        options: ResultOptions,
    ) -> EvalValue<'a> {
        let options = if self.requires_paths {
            options | ResultOptions::PATH
        } else {
            options
        };
        self.chain.evaluate(cache, root, path, current, options)
    }
}

/// Sorts by path when `SORT` is set, then drops repeated paths when `NO_DUPS`
/// is set, keeping the first occurrence.
fn post_process<T>(
    mut items: Vec<T>,
    options: ResultOptions,
    path_of: impl Fn(&T) -> &NormalizedPath,
) -> Vec<T> {
    if items.len() < 2 {
        return items;
    }
    if options.contains(ResultOptions::SORT) {
        items.sort_by(|a, b| path_of(a).cmp(path_of(b)));
    }
    if options.contains(ResultOptions::NO_DUPS) {
        let mut seen = HashSet::with_capacity(items.len());
        items.retain(|item| seen.insert(path_of(item).clone()));
    }
    items
}
