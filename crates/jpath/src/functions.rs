//! Defines the registry and built-in implementations for filter functions.
use crate::value::{EvalValue, json_eq};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// The signature for a filter function implementation.
pub type FilterFunction = for<'a> fn(args: Vec<EvalValue<'a>>) -> EvalValue<'a>;

/// A registered function and the number of arguments it takes.
#[derive(Clone, Copy)]
pub struct FunctionEntry {
    pub arity: usize,
    pub func: FilterFunction,
}

/// A registry to hold all functions available to filter expressions.
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionEntry>,
}

impl FunctionRegistry {
    /// Creates a new, empty function registry.
    pub fn new() -> Self {
        Self { functions: HashMap::new() }
    }

    /// Registers a new function.
    pub fn register(&mut self, name: &str, arity: usize, func: FilterFunction) {
        self.functions.insert(name.to_lowercase(), FunctionEntry { arity, func });
    }

    /// Finds a function by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&FunctionEntry> {
        self.functions.get(&name.to_lowercase())
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

fn first(args: Vec<EvalValue<'_>>) -> EvalValue<'_> {
    args.into_iter()
        .next()
        .map(EvalValue::into_singular)
        .unwrap_or_else(EvalValue::nothing)
}

// --- Built-in Function Implementations ---

/// `length(x)`: characters of a string, items of an array, members of an
/// object. Characters are Unicode scalar values (`char`s), not UTF-16 code
/// units, so `"😀"` has length 1.
fn length(args: Vec<EvalValue<'_>>) -> EvalValue<'_> {
    let arg = first(args);
    let len = match arg.as_value() {
        Some(Value::String(s)) => s.chars().count(),
        Some(Value::Array(arr)) => arr.len(),
        Some(Value::Object(obj)) => obj.len(),
        _ => return EvalValue::nothing(),
    };
    EvalValue::Owned(len.into())
}

fn count(args: Vec<EvalValue<'_>>) -> EvalValue<'_> {
    let n = match args.first() {
        Some(EvalValue::NodeList(items)) => items.len(),
        Some(_) => 1,
        None => 0,
    };
    EvalValue::Owned(n.into())
}

fn contains(args: Vec<EvalValue<'_>>) -> EvalValue<'_> {
    let mut args = args.into_iter();
    let haystack = args.next().unwrap_or_else(EvalValue::nothing);
    let needle = args.next().map(EvalValue::into_singular);
    let found = match (&haystack, needle) {
        (EvalValue::NodeList(items), Some(needle)) => items.iter().any(|item| *item == needle),
        (haystack, Some(needle)) => match haystack.as_value() {
            Some(Value::String(h)) => needle.as_str().is_some_and(|n| h.contains(n)),
            Some(Value::Array(arr)) => needle
                .as_value()
                .is_some_and(|n| arr.iter().any(|item| json_eq(item, n))),
            _ => false,
        },
        _ => false,
    };
    EvalValue::Owned(found.into())
}

fn upper(args: Vec<EvalValue<'_>>) -> EvalValue<'_> {
    match first(args).as_str() {
        Some(s) => EvalValue::Owned(s.to_uppercase().into()),
        None => EvalValue::nothing(),
    }
}

fn lower(args: Vec<EvalValue<'_>>) -> EvalValue<'_> {
    match first(args).as_str() {
        Some(s) => EvalValue::Owned(s.to_lowercase().into()),
        None => EvalValue::nothing(),
    }
}

impl Default for FunctionRegistry {
    /// Creates a new registry populated with all built-in functions.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register("length", 1, length);
        registry.register("count", 1, count);
        registry.register("contains", 2, contains);
        registry.register("upper", 1, upper);
        registry.register("lower", 1, lower);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call<'a>(name: &str, args: Vec<EvalValue<'a>>) -> EvalValue<'a> {
        let registry = FunctionRegistry::default();
        let entry = registry.get(name).unwrap();
        assert_eq!(entry.arity, args.len());
        (entry.func)(args)
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FunctionRegistry::default();
        assert!(registry.get("LENGTH").is_some());
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_length() {
        let s = json!("héllo");
        let arr = json!([1, 2, 3]);
        let obj = json!({"a": 1});
        let num = json!(4);
        assert_eq!(call("length", vec![EvalValue::Node(&s)]).to_value(), json!(5));
        let emoji = json!("\u{1F600}");
        assert_eq!(call("length", vec![EvalValue::Node(&emoji)]).to_value(), json!(1));
        assert_eq!(call("length", vec![EvalValue::Node(&arr)]).to_value(), json!(3));
        assert_eq!(call("length", vec![EvalValue::Node(&obj)]).to_value(), json!(1));
        assert!(call("length", vec![EvalValue::Node(&num)]).is_nothing());
    }

    #[test]
    fn test_count() {
        let one = json!(1);
        let list = EvalValue::NodeList(vec![EvalValue::Node(&one), EvalValue::Node(&one)]);
        assert_eq!(call("count", vec![list]).to_value(), json!(2));
        assert_eq!(call("count", vec![EvalValue::nothing()]).to_value(), json!(0));
        assert_eq!(call("count", vec![EvalValue::Node(&one)]).to_value(), json!(1));
    }

    #[test]
    fn test_contains() {
        let hay = json!("haystack");
        let arr = json!([1, "x"]);
        let needle = |v: Value| EvalValue::Owned(v);
        assert!(call("contains", vec![EvalValue::Node(&hay), needle(json!("st"))]).is_truthy());
        assert!(!call("contains", vec![EvalValue::Node(&hay), needle(json!("zz"))]).is_truthy());
        assert!(call("contains", vec![EvalValue::Node(&arr), needle(json!(1.0))]).is_truthy());
        assert!(!call("contains", vec![EvalValue::Node(&arr), needle(json!("y"))]).is_truthy());
    }

    #[test]
    fn test_case_mapping() {
        let s = json!("MiXed");
        assert_eq!(call("upper", vec![EvalValue::Node(&s)]).to_value(), json!("MIXED"));
        assert_eq!(call("lower", vec![EvalValue::Node(&s)]).to_value(), json!("mixed"));
        assert!(call("upper", vec![EvalValue::nothing()]).is_nothing());
    }
}
