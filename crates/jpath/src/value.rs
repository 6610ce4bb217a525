//! Document value kinds and the value produced by Evaluate-mode selection.
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

static NULL: Value = Value::Null;

/// The discriminated kind of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    False,
    True,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(false) => ValueKind::False,
            Value::Bool(true) => ValueKind::True,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

/// The result of evaluating a selector chain as a single value.
///
/// Document nodes are borrowed, never copied. Values that do not exist in the
/// document (literals, computed lengths) are owned, and multiple matches are
/// gathered into a `NodeList`. An empty node list means "no match".
#[derive(Clone)]
pub enum EvalValue<'a> {
    /// A node of the queried document.
    Node(&'a Value),
    /// A value synthesized during evaluation.
    Owned(Value),
    /// The matches of a multi-producing selector, in encounter order.
    NodeList(Vec<EvalValue<'a>>),
}

impl<'a> EvalValue<'a> {
    pub fn null() -> Self {
        EvalValue::Node(&NULL)
    }

    /// The empty node list, used for "no match".
    pub fn nothing() -> Self {
        EvalValue::NodeList(Vec::new())
    }

    /// Borrows the underlying JSON value, if this is not a node list.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            EvalValue::Node(v) => Some(*v),
            EvalValue::Owned(v) => Some(v),
            EvalValue::NodeList(_) => None,
        }
    }

    /// The document node this value refers to, if it is one.
    pub fn as_node(&self) -> Option<&'a Value> {
        match self {
            EvalValue::Node(v) => Some(*v),
            _ => None,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self.as_value() {
            Some(v) => ValueKind::of(v),
            None => ValueKind::Array,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, EvalValue::NodeList(items) if items.is_empty())
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Collapses a single-element node list into its element.
    pub fn into_singular(self) -> Self {
        match self {
            EvalValue::NodeList(mut items) if items.len() == 1 => items.remove(0),
            other => other,
        }
    }

    /// Truthiness as used by filter predicates.
    ///
    /// Null, `false`, empty strings, empty arrays, empty objects and the empty
    /// node list are false. Everything else, including any number, is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            EvalValue::NodeList(items) => !items.is_empty(),
            EvalValue::Node(v) => value_is_truthy(v),
            EvalValue::Owned(v) => value_is_truthy(v),
        }
    }

    /// Materializes this value as an owned JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            EvalValue::Node(v) => (*v).clone(),
            EvalValue::Owned(v) => v.clone(),
            EvalValue::NodeList(items) => Value::Array(items.iter().map(Self::to_value).collect()),
        }
    }

    /// Appends `self` to `list`, splicing in the members of a node list.
    pub(crate) fn flatten_into(self, list: &mut Vec<EvalValue<'a>>) {
        match self {
            EvalValue::NodeList(items) => list.extend(items),
            other => list.push(other),
        }
    }

    /// Number of array items, treating node lists as arrays.
    fn array_len(&self) -> Option<usize> {
        match self {
            EvalValue::NodeList(items) => Some(items.len()),
            other => other.as_value().and_then(Value::as_array).map(Vec::len),
        }
    }
}

impl fmt::Debug for EvalValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalValue::Node(v) => write!(f, "Node({})", v),
            EvalValue::Owned(v) => write!(f, "Owned({})", v),
            EvalValue::NodeList(items) => f.debug_list().entries(items).finish(),
        }
    }
}

impl From<Value> for EvalValue<'_> {
    fn from(value: Value) -> Self {
        EvalValue::Owned(value)
    }
}

impl<'a> From<&'a Value> for EvalValue<'a> {
    fn from(value: &'a Value) -> Self {
        EvalValue::Node(value)
    }
}

impl PartialEq for EvalValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EvalValue::NodeList(a), EvalValue::NodeList(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
            }
            (EvalValue::NodeList(items), v) | (v, EvalValue::NodeList(items)) => {
                match v.as_value().and_then(Value::as_array) {
                    Some(arr) => {
                        arr.len() == items.len()
                            && items.iter().zip(arr).all(|(x, y)| *x == EvalValue::Node(y))
                    }
                    None => false,
                }
            }
            (a, b) => match (a.as_value(), b.as_value()) {
                (Some(a), Some(b)) => json_eq(a, b),
                _ => false,
            },
        }
    }
}

impl PartialEq<Value> for EvalValue<'_> {
    fn eq(&self, other: &Value) -> bool {
        *self == EvalValue::Node(other)
    }
}

impl PartialEq<&Value> for EvalValue<'_> {
    fn eq(&self, other: &&Value) -> bool {
        *self == EvalValue::Node(other)
    }
}

/// Orders two values when they are comparable: numbers numerically and strings
/// lexicographically. Equal arrays (node lists included) compare as `Equal`.
/// Returns `None` for any other pairing, and whenever either side is the empty
/// node list.
pub fn compare(lhs: &EvalValue<'_>, rhs: &EvalValue<'_>) -> Option<Ordering> {
    if lhs.is_nothing() || rhs.is_nothing() {
        return None;
    }
    if let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) {
        return a.partial_cmp(&b);
    }
    if let (Some(a), Some(b)) = (lhs.as_str(), rhs.as_str()) {
        return Some(a.cmp(b));
    }
    if lhs.array_len().is_some() && rhs.array_len().is_some() && lhs == rhs {
        return Some(Ordering::Equal);
    }
    None
}

pub(crate) fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(arr) => !arr.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
        Value::Bool(true) | Value::Number(_) => true,
    }
}

/// Structural equality where numbers compare by magnitude, so `1` equals `1.0`.
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| json_eq(v, w)))
        }
        _ => a == b,
    }
}
