//! Explicit construction of selector chains.
//!
//! A [`ChainBuilder`] records steps front to back. [`ChainBuilder::build`]
//! links them back to front, so every selector is created with its final
//! tail and the resulting chain is immutable.
use crate::expression::PathExpression;
use crate::filter::Predicate;
use crate::selector::{Selector, SelectorKind, Slice};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ROOT_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone)]
enum Step {
    Root,
    Current,
    Parent(usize),
    Identifier(String),
    Index(i64),
    Slice(Slice),
    RecursiveDescent,
    Wildcard,
    Union(Vec<ChainBuilder>),
    Filter(Arc<dyn Predicate>),
}

/// Records the steps of a query.
///
/// ```
/// use jsonsel_jpath::{ChainBuilder, ResultOptions};
/// use serde_json::json;
///
/// let doc = json!({"a": [1, 2, 3]});
/// let expr = ChainBuilder::new().root().identifier("a").index(-1).build();
/// assert_eq!(expr.select(&doc, ResultOptions::empty()), vec![&json!(3)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChainBuilder {
    steps: Vec<Step>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// `$`: restarts from the document root.
    pub fn root(self) -> Self {
        self.push(Step::Root)
    }

    /// `@`: the current node.
    pub fn current(self) -> Self {
        self.push(Step::Current)
    }

    /// Walks `depth` ancestors up from the current node.
    pub fn parent(self, depth: usize) -> Self {
        self.push(Step::Parent(depth))
    }

    pub fn identifier(self, name: impl Into<String>) -> Self {
        self.push(Step::Identifier(name.into()))
    }

    pub fn index(self, index: i64) -> Self {
        self.push(Step::Index(index))
    }

    pub fn slice(self, slice: Slice) -> Self {
        self.push(Step::Slice(slice))
    }

    pub fn recursive_descent(self) -> Self {
        self.push(Step::RecursiveDescent)
    }

    pub fn wildcard(self) -> Self {
        self.push(Step::Wildcard)
    }

    /// Runs each branch from the current node. Steps added after the union
    /// continue every branch.
    pub fn union(self, branches: impl IntoIterator<Item = ChainBuilder>) -> Self {
        self.push(Step::Union(branches.into_iter().collect()))
    }

    /// Keeps the children of the current node for which `predicate` is truthy.
    pub fn filter(self, predicate: impl Predicate + 'static) -> Self {
        self.push(Step::Filter(Arc::new(predicate)))
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True if any step, including steps inside union branches and filter
    /// predicates, walks up to an ancestor.
    pub fn requires_paths(&self) -> bool {
        self.steps.iter().any(|step| match step {
            Step::Parent(_) => true,
            Step::Union(branches) => branches.iter().any(ChainBuilder::requires_paths),
            Step::Filter(predicate) => predicate.requires_paths(),
            _ => false,
        })
    }

    /// Links the recorded steps in front of `tail`.
    fn link(&self, tail: Option<Arc<Selector>>) -> Option<Arc<Selector>> {
        self.steps.iter().rev().fold(tail, |tail, step| {
            let (kind, tail) = match step {
                Step::Root => (
                    SelectorKind::Root {
                        id: NEXT_ROOT_ID.fetch_add(1, Ordering::Relaxed),
                    },
                    tail,
                ),
                Step::Current => (SelectorKind::CurrentNode, tail),
                Step::Parent(depth) => (SelectorKind::ParentNode { depth: *depth }, tail),
                Step::Identifier(name) => (SelectorKind::Identifier(name.clone()), tail),
                Step::Index(index) => (SelectorKind::Index(*index), tail),
                Step::Slice(slice) => (SelectorKind::Slice(*slice), tail),
                Step::RecursiveDescent => (SelectorKind::RecursiveDescent, tail),
                Step::Wildcard => (SelectorKind::Wildcard, tail),
                Step::Union(branches) => {
                    let branches = branches
                        .iter()
                        .map(|branch| {
                            branch
                                .link(tail.clone())
                                .unwrap_or_else(|| Arc::new(Selector::new(SelectorKind::CurrentNode, None)))
                        })
                        .collect();
                    (SelectorKind::Union(branches), None)
                }
                Step::Filter(predicate) => (SelectorKind::Filter(Arc::clone(predicate)), tail),
            };
            Some(Arc::new(Selector::new(kind, tail)))
        })
    }

    /// Links the chain into an immutable, shareable expression.
    pub fn build(&self) -> PathExpression {
        let chain = self
            .link(None)
            .unwrap_or_else(|| Arc::new(Selector::new(SelectorKind::CurrentNode, None)));
        let requires_paths = self.requires_paths();
        log::debug!(
            "Built selector chain of {} step(s), requires_paths: {}",
            self.steps.len(),
            requires_paths
        );
        PathExpression::new(chain, requires_paths)
    }
}
