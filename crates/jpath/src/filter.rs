//! The predicate boundary used by the Filter selector, and a small expression
//! tree that implements it.
//!
//! The filter selector only relies on [`Predicate`]: it hands over the root,
//! the candidate node with its path and the evaluation-scoped cache, and keeps
//! the candidate when the returned value is truthy. [`FilterExpr`] is the stock
//! implementation: comparisons, boolean connectives, literals, path operands
//! and registered functions.
use crate::cache::EvalCache;
use crate::error::JPathError;
use crate::expression::PathExpression;
use crate::functions::{FilterFunction, FunctionRegistry};
use crate::options::ResultOptions;
use crate::path::PathNode;
use crate::value::{EvalValue, compare};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Decides whether a filter candidate is kept.
pub trait Predicate: fmt::Debug + Send + Sync {
    /// Evaluates the predicate for `current`, found at `path`. The filter
    /// keeps `current` when the result is truthy.
    ///
    /// `path` is only extended when `options` contain `PATH`, which the
    /// filter's chain forces whenever [`Predicate::requires_paths`] is true.
    fn evaluate<'a>(
        &self,
        cache: &mut EvalCache<'a>,
        root: &'a Value,
        path: &PathNode,
        current: &'a Value,
        options: ResultOptions,
    ) -> EvalValue<'a>;

    /// True if evaluation needs normalized paths to be tracked.
    fn requires_paths(&self) -> bool {
        false
    }
}

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Applies the operator to two operands.
    ///
    /// Single-element node lists compare as their element. The empty node list
    /// equals only itself and orders against nothing else.
    pub fn apply(self, lhs: &EvalValue<'_>, rhs: &EvalValue<'_>) -> bool {
        let equal = || match (lhs.is_nothing(), rhs.is_nothing()) {
            (true, true) => true,
            (false, false) => lhs == rhs,
            _ => false,
        };
        match self {
            CompareOp::Eq => equal(),
            CompareOp::Ne => !equal(),
            CompareOp::Lt => compare(lhs, rhs) == Some(Ordering::Less),
            CompareOp::Gt => compare(lhs, rhs) == Some(Ordering::Greater),
            CompareOp::Le => matches!(compare(lhs, rhs), Some(Ordering::Less | Ordering::Equal)),
            CompareOp::Ge => {
                matches!(compare(lhs, rhs), Some(Ordering::Greater | Ordering::Equal))
            }
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        };
        f.write_str(symbol)
    }
}

/// A filter expression tree.
#[derive(Clone)]
pub enum FilterExpr {
    /// A constant value.
    Literal(Value),
    /// A `$`- or `@`-anchored query, evaluated as one value.
    Path(PathExpression),
    Compare {
        op: CompareOp,
        lhs: Box<FilterExpr>,
        rhs: Box<FilterExpr>,
    },
    And(Box<FilterExpr>, Box<FilterExpr>),
    Or(Box<FilterExpr>, Box<FilterExpr>),
    Not(Box<FilterExpr>),
    /// A call to a registered function, resolved when the tree is built.
    Function {
        name: String,
        func: FilterFunction,
        args: Vec<FilterExpr>,
    },
}

impl FilterExpr {
    pub fn literal(value: impl Into<Value>) -> Self {
        FilterExpr::Literal(value.into())
    }

    pub fn path(expr: PathExpression) -> Self {
        FilterExpr::Path(expr)
    }

    pub fn compare(op: CompareOp, lhs: FilterExpr, rhs: FilterExpr) -> Self {
        FilterExpr::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn eq(lhs: FilterExpr, rhs: FilterExpr) -> Self {
        Self::compare(CompareOp::Eq, lhs, rhs)
    }

    pub fn ne(lhs: FilterExpr, rhs: FilterExpr) -> Self {
        Self::compare(CompareOp::Ne, lhs, rhs)
    }

    pub fn lt(lhs: FilterExpr, rhs: FilterExpr) -> Self {
        Self::compare(CompareOp::Lt, lhs, rhs)
    }

    pub fn le(lhs: FilterExpr, rhs: FilterExpr) -> Self {
        Self::compare(CompareOp::Le, lhs, rhs)
    }

    pub fn gt(lhs: FilterExpr, rhs: FilterExpr) -> Self {
        Self::compare(CompareOp::Gt, lhs, rhs)
    }

    pub fn ge(lhs: FilterExpr, rhs: FilterExpr) -> Self {
        Self::compare(CompareOp::Ge, lhs, rhs)
    }

    pub fn and(lhs: FilterExpr, rhs: FilterExpr) -> Self {
        FilterExpr::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: FilterExpr, rhs: FilterExpr) -> Self {
        FilterExpr::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn not(expr: FilterExpr) -> Self {
        FilterExpr::Not(Box::new(expr))
    }

    /// Resolves `name` in `registry` and checks the argument count.
    pub fn call(
        registry: &FunctionRegistry,
        name: &str,
        args: Vec<FilterExpr>,
    ) -> Result<Self, JPathError> {
        let entry = registry
            .get(name)
            .ok_or_else(|| JPathError::UnknownFunction(name.to_string()))?;
        if entry.arity != args.len() {
            return Err(JPathError::FunctionError {
                function: name.to_string(),
                message: format!("expected {} argument(s), got {}", entry.arity, args.len()),
            });
        }
        Ok(FilterExpr::Function {
            name: name.to_string(),
            func: entry.func,
            args,
        })
    }

    fn eval<'a>(
        &self,
        cache: &mut EvalCache<'a>,
        root: &'a Value,
        path: &PathNode,
        current: &'a Value,
        options: ResultOptions,
    ) -> EvalValue<'a> {
        match self {
            FilterExpr::Literal(value) => EvalValue::Owned(value.clone()),
            FilterExpr::Path(expr) => expr.evaluate_with(cache, root, path, current, options),
            FilterExpr::Compare { op, lhs, rhs } => {
                let lhs = lhs.eval(cache, root, path, current, options).into_singular();
                let rhs = rhs.eval(cache, root, path, current, options).into_singular();
                EvalValue::Owned(op.apply(&lhs, &rhs).into())
            }
            FilterExpr::And(lhs, rhs) => {
                let result = lhs.eval(cache, root, path, current, options).is_truthy()
                    && rhs.eval(cache, root, path, current, options).is_truthy();
                EvalValue::Owned(result.into())
            }
            FilterExpr::Or(lhs, rhs) => {
                let result = lhs.eval(cache, root, path, current, options).is_truthy()
                    || rhs.eval(cache, root, path, current, options).is_truthy();
                EvalValue::Owned(result.into())
            }
            FilterExpr::Not(expr) => {
                let result = !expr.eval(cache, root, path, current, options).is_truthy();
                EvalValue::Owned(result.into())
            }
            FilterExpr::Function { func, args, .. } => {
                let args = args
                    .iter()
                    .map(|arg| arg.eval(cache, root, path, current, options))
                    .collect();
                func(args)
            }
        }
    }
}

impl Predicate for FilterExpr {
    fn evaluate<'a>(
        &self,
        cache: &mut EvalCache<'a>,
        root: &'a Value,
        path: &PathNode,
        current: &'a Value,
        options: ResultOptions,
    ) -> EvalValue<'a> {
        let result = self.eval(cache, root, path, current, options);
        log::trace!("filter {:?} on {} at {} -> {:?}", self, current, path, result);
        result
    }

    fn requires_paths(&self) -> bool {
        match self {
            FilterExpr::Literal(_) => false,
            FilterExpr::Path(expr) => expr.requires_paths(),
            FilterExpr::Compare { lhs, rhs, .. }
            | FilterExpr::And(lhs, rhs)
            | FilterExpr::Or(lhs, rhs) => lhs.requires_paths() || rhs.requires_paths(),
            FilterExpr::Not(expr) => expr.requires_paths(),
            FilterExpr::Function { args, .. } => args.iter().any(Predicate::requires_paths),
        }
    }
}

impl fmt::Debug for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Literal(value) => write!(f, "{}", value),
            FilterExpr::Path(_) => f.write_str("<path>"),
            FilterExpr::Compare { op, lhs, rhs } => write!(f, "({:?} {} {:?})", lhs, op, rhs),
            FilterExpr::And(lhs, rhs) => write!(f, "({:?} && {:?})", lhs, rhs),
            FilterExpr::Or(lhs, rhs) => write!(f, "({:?} || {:?})", lhs, rhs),
            FilterExpr::Not(expr) => write!(f, "!{:?}", expr),
            FilterExpr::Function { name, args, .. } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ChainBuilder;
    use serde_json::json;

    fn current(member: &str) -> FilterExpr {
        FilterExpr::path(ChainBuilder::new().current().identifier(member).build())
    }

    fn check(expr: &FilterExpr, root: &Value, candidate: &Value) -> bool {
        let mut cache = EvalCache::new();
        expr.evaluate(&mut cache, root, &PathNode::root(), candidate, ResultOptions::empty())
            .is_truthy()
    }

    #[test]
    fn test_comparisons() {
        let doc = json!({"n": 2, "s": "abc", "z": null});
        let cases = [
            (FilterExpr::gt(current("n"), FilterExpr::literal(1)), true),
            (FilterExpr::ge(current("n"), FilterExpr::literal(2.0)), true),
            (FilterExpr::lt(current("n"), FilterExpr::literal(2)), false),
            (FilterExpr::le(current("s"), FilterExpr::literal("abd")), true),
            (FilterExpr::eq(current("s"), FilterExpr::literal("abc")), true),
            (FilterExpr::ne(current("s"), FilterExpr::literal("abc")), false),
            (FilterExpr::lt(current("s"), FilterExpr::literal(5)), false),
            (FilterExpr::eq(current("z"), FilterExpr::literal(Value::Null)), true),
        ];
        for (expr, expected) in cases {
            assert_eq!(check(&expr, &doc, &doc), expected, "{:?}", expr);
        }
    }

    #[test]
    fn test_missing_member_is_nothing() {
        let doc = json!({"a": 1});
        let missing = || current("missing");
        assert!(!check(&FilterExpr::eq(missing(), FilterExpr::literal(Value::Null)), &doc, &doc));
        assert!(check(&FilterExpr::ne(missing(), FilterExpr::literal(1)), &doc, &doc));
        assert!(!check(&FilterExpr::lt(missing(), FilterExpr::literal(1)), &doc, &doc));
        assert!(check(&FilterExpr::eq(missing(), current("other")), &doc, &doc));
        assert!(!check(&missing(), &doc, &doc));
        assert!(check(&current("a"), &doc, &doc));
    }

    #[test]
    fn test_connectives() {
        let doc = json!({"a": 1, "b": false});
        let a = || current("a");
        let b = || current("b");
        assert!(!check(&FilterExpr::and(a(), b()), &doc, &doc));
        assert!(check(&FilterExpr::or(b(), a()), &doc, &doc));
        assert!(check(&FilterExpr::not(b()), &doc, &doc));
    }

    #[test]
    fn test_function_calls() {
        let registry = FunctionRegistry::default();
        let doc = json!({"tags": ["x", "y"], "name": "Widget"});
        let len = FilterExpr::call(&registry, "length", vec![current("tags")]).unwrap();
        assert!(check(&FilterExpr::eq(len, FilterExpr::literal(2)), &doc, &doc));

        let lower = FilterExpr::call(&registry, "lower", vec![current("name")]).unwrap();
        assert!(check(&FilterExpr::eq(lower, FilterExpr::literal("widget")), &doc, &doc));

        let has_y = FilterExpr::call(&registry, "contains", vec![current("tags"), FilterExpr::literal("y")])
            .unwrap();
        assert!(check(&has_y, &doc, &doc));
    }

    #[test]
    fn test_call_resolution_errors() {
        let registry = FunctionRegistry::default();
        assert_eq!(
            FilterExpr::call(&registry, "nope", vec![]).err(),
            Some(JPathError::UnknownFunction("nope".into()))
        );
        assert!(matches!(
            FilterExpr::call(&registry, "length", vec![]),
            Err(JPathError::FunctionError { .. })
        ));
    }

    #[test]
    fn test_root_reference_inside_predicate() {
        let doc = json!({"limit": 2, "items": [1, 2, 3]});
        let limit = FilterExpr::path(ChainBuilder::new().root().identifier("limit").build());
        let expr = FilterExpr::ge(FilterExpr::path(ChainBuilder::new().current().build()), limit);
        let items = doc["items"].as_array().unwrap();
        let kept: Vec<bool> = items.iter().map(|item| check(&expr, &doc, item)).collect();
        assert_eq!(kept, vec![false, true, true]);
    }

    #[test]
    fn test_requires_paths_sees_parent_operands() {
        let plain = FilterExpr::not(current("a"));
        assert!(!plain.requires_paths());
        let parent = FilterExpr::path(ChainBuilder::new().root().identifier("a").parent(1).build());
        assert!(FilterExpr::and(plain, parent).requires_paths());
    }

    #[test]
    fn test_parent_operand_walks_from_candidate_path() {
        let doc = json!({"a": {"k": 99}, "items": [{"a": {"b": 0, "k": 1}}]});
        let owner_k = ChainBuilder::new()
            .current()
            .identifier("a")
            .identifier("b")
            .parent(1)
            .identifier("k")
            .build();
        let expr = FilterExpr::eq(FilterExpr::path(owner_k), FilterExpr::literal(1));
        let candidate = PathNode::root().name("items").index(0);
        let mut cache = EvalCache::new();
        let item = &doc["items"][0];
        let kept = expr.evaluate(&mut cache, &doc, &candidate, item, ResultOptions::PATH);
        assert!(kept.is_truthy());
    }
}
