#![allow(dead_code)]

use jsonsel::{
    ChainBuilder, EvalCache, EvalValue, NormalizedPath, PathExpression, PathNode, Predicate,
    ResultOptions,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The bookstore document used across the integration tests.
pub fn bookstore() -> Value {
    json!({
        "store": {
            "book": [
                {"category": "reference", "author": "Nigel Rees", "title": "Sayings of the Century", "price": 8.95},
                {"category": "fiction", "author": "Evelyn Waugh", "title": "Sword of Honour", "price": 12.99},
                {"category": "fiction", "author": "Herman Melville", "title": "Moby Dick", "isbn": "0-553-21311-3", "price": 8.99},
                {"category": "fiction", "author": "J. R. R. Tolkien", "title": "The Lord of the Rings", "isbn": "0-395-19395-8", "price": 22.99}
            ],
            "bicycle": {"color": "red", "price": 19.95}
        },
        "expensive": 10
    })
}

/// `@.<member>` as a filter operand.
pub fn current_member(member: &str) -> jsonsel::FilterExpr {
    jsonsel::FilterExpr::path(ChainBuilder::new().current().identifier(member).build())
}

pub fn path_strings(expr: &PathExpression, doc: &Value, options: ResultOptions) -> Vec<String> {
    expr.select_paths(doc, options)
        .iter()
        .map(NormalizedPath::to_string)
        .collect()
}

/// Cache counters `(misses, hits)` seen by a [`CacheRecorder`], one entry per
/// candidate.
pub type Observed = Arc<Mutex<Vec<(usize, usize)>>>;

/// A predicate that references its operand twice for every candidate and
/// records the cache counters afterwards. Truthy when both references agree.
#[derive(Debug)]
pub struct CacheRecorder {
    operand: PathExpression,
    observed: Observed,
}

impl CacheRecorder {
    pub fn new(operand: PathExpression) -> (Self, Observed) {
        let observed = Observed::default();
        let recorder = Self {
            operand,
            observed: Arc::clone(&observed),
        };
        (recorder, observed)
    }
}

impl Predicate for CacheRecorder {
    fn evaluate<'a>(
        &self,
        cache: &mut EvalCache<'a>,
        root: &'a Value,
        path: &PathNode,
        current: &'a Value,
        options: ResultOptions,
    ) -> EvalValue<'a> {
        let first = self.operand.evaluate_with(cache, root, path, current, options);
        let second = self.operand.evaluate_with(cache, root, path, current, options);
        if let Ok(mut observed) = self.observed.lock() {
            observed.push((cache.misses(), cache.hits()));
        }
        EvalValue::Owned((first.is_truthy() && first == second).into())
    }
}
