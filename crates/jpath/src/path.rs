//! Locations within a document.
//!
//! A [`PathNode`] is a backward-linked, structurally shared chain from a leaf
//! step up to the root sentinel. Many in-flight paths share their common
//! ancestors, so extending a path is a single allocation. A
//! [`NormalizedPath`] is the materialized front-to-back step sequence; it is
//! the unit of ordering and equality for results.
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt::{self, Write};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::JPathError;

/// One step from a node to one of its children.
///
/// Steps order indices before names; indices compare numerically and names by
/// their string ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathStep {
    /// An array element (`[2]`).
    Index(usize),
    /// An object member (`['name']`).
    Name(String),
}

impl PathStep {
    /// Looks up this step's child of `value`. A step whose kind does not match
    /// the node kind selects nothing.
    pub fn apply<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        match (self, value) {
            (PathStep::Index(i), Value::Array(arr)) => arr.get(*i),
            (PathStep::Name(name), Value::Object(obj)) => obj.get(name),
            _ => None,
        }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Index(i) => write!(f, "[{}]", i),
            PathStep::Name(name) => {
                f.write_str("['")?;
                write_escaped_name(f, name)?;
                f.write_str("']")
            }
        }
    }
}

fn write_escaped_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    for c in name.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\u{08}' => f.write_str("\\b")?,
            '\u{0C}' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

#[derive(Debug)]
enum Link {
    Root,
    Child {
        parent: PathNode,
        step: PathStep,
        depth: usize,
    },
}

/// A shared handle to one node of a path chain.
///
/// Cloning is a reference-count increment. Equality and ordering are defined
/// by the step sequence, never by chain identity.
#[derive(Debug, Clone)]
pub struct PathNode(Arc<Link>);

impl PathNode {
    /// The root sentinel (`$`).
    pub fn root() -> Self {
        PathNode(Arc::new(Link::Root))
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(PathStep::Index(index))
    }

    pub fn name(&self, name: &str) -> Self {
        self.child(PathStep::Name(name.to_string()))
    }

    pub fn child(&self, step: PathStep) -> Self {
        PathNode(Arc::new(Link::Child {
            parent: self.clone(),
            step,
            depth: self.depth() + 1,
        }))
    }

    pub fn is_root(&self) -> bool {
        matches!(*self.0, Link::Root)
    }

    /// Number of steps between this node and the root.
    pub fn depth(&self) -> usize {
        match &*self.0 {
            Link::Root => 0,
            Link::Child { depth, .. } => *depth,
        }
    }

    /// The step leading to this node, or `None` for the root.
    pub fn step(&self) -> Option<&PathStep> {
        match &*self.0 {
            Link::Root => None,
            Link::Child { step, .. } => Some(step),
        }
    }

    pub fn parent(&self) -> Option<&PathNode> {
        match &*self.0 {
            Link::Root => None,
            Link::Child { parent, .. } => Some(parent),
        }
    }

    /// Walks `levels` ancestors up the chain.
    pub fn ancestor(&self, levels: usize) -> Option<&PathNode> {
        let mut node = self;
        for _ in 0..levels {
            node = node.parent()?;
        }
        Some(node)
    }

    /// The root sentinel this chain hangs from.
    pub fn sentinel(&self) -> &PathNode {
        let mut node = self;
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// True if `self` and `other` are the same allocation.
    pub fn ptr_eq(&self, other: &PathNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Steps from the leaf back to the root.
    fn steps_rev(&self) -> impl Iterator<Item = &PathStep> {
        let mut node = Some(self);
        std::iter::from_fn(move || {
            let current = node?;
            node = current.parent();
            current.step()
        })
    }

    /// Materializes the step sequence, root first.
    pub fn to_normalized_path(&self) -> NormalizedPath {
        let mut steps: Vec<PathStep> = self.steps_rev().cloned().collect();
        steps.reverse();
        NormalizedPath { steps }
    }
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.depth() == other.depth() && self.steps_rev().eq(other.steps_rev())
    }
}

impl Eq for PathNode {}

impl Hash for PathNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.depth().hash(state);
        for step in self.steps_rev() {
            step.hash(state);
        }
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathNode {
    /// Front-to-back step order, with a prefix before its extensions.
    fn cmp(&self, other: &Self) -> Ordering {
        let common = self.depth().min(other.depth());
        let prefixes = self
            .ancestor(self.depth() - common)
            .zip(other.ancestor(other.depth() - common));
        let ordering = match prefixes {
            Some((a, b)) => cmp_same_depth(a, b),
            None => Ordering::Equal,
        };
        ordering.then(self.depth().cmp(&other.depth()))
    }
}

/// Compares two chains of equal depth, root end first.
fn cmp_same_depth(a: &PathNode, b: &PathNode) -> Ordering {
    if a.ptr_eq(b) {
        return Ordering::Equal;
    }
    match (a.parent(), b.parent()) {
        (Some(pa), Some(pb)) => cmp_same_depth(pa, pb).then_with(|| a.step().cmp(&b.step())),
        _ => Ordering::Equal,
    }
}

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_normalized_path(), f)
    }
}

/// A materialized location: the steps from the document root to a value.
///
/// Renders as `$['store']['book'][0]` and parses back from the same form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    steps: Vec<PathStep>,
}

impl NormalizedPath {
    /// The path of the document root itself.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True for the root path.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn push(&mut self, step: PathStep) {
        self.steps.push(step);
    }

    pub fn parent(&self) -> Option<NormalizedPath> {
        let (_, init) = self.steps.split_last()?;
        Some(Self::from_steps(init.to_vec()))
    }

    /// Rebuilds a fresh path chain with the same steps.
    pub fn to_path_node(&self) -> PathNode {
        self.steps
            .iter()
            .fold(PathNode::root(), |node, step| node.child(step.clone()))
    }

    /// Follows the steps from `root`. Returns `None` when a step is missing or
    /// its kind disagrees with the node it is applied to.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        resolve(root, &self.steps)
    }

    /// Renders the path as an RFC 6901 JSON Pointer.
    pub fn to_json_pointer(&self) -> String {
        let mut pointer = String::new();
        for step in &self.steps {
            pointer.push('/');
            match step {
                PathStep::Index(i) => pointer.push_str(&i.to_string()),
                PathStep::Name(name) => {
                    pointer.push_str(&name.replace('~', "~0").replace('/', "~1"))
                }
            }
        }
        pointer
    }
}

/// Follows `steps` from `root` by plain member/index lookup.
pub fn resolve<'a>(root: &'a Value, steps: &[PathStep]) -> Option<&'a Value> {
    steps.iter().try_fold(root, |node, step| step.apply(node))
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('$')?;
        for step in &self.steps {
            fmt::Display::fmt(step, f)?;
        }
        Ok(())
    }
}

impl FromStr for NormalizedPath {
    type Err = JPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_normalized_path(s)
    }
}

impl From<&PathNode> for NormalizedPath {
    fn from(node: &PathNode) -> Self {
        node.to_normalized_path()
    }
}
