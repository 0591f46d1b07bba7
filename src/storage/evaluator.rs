//! Evaluates translated queries against in-process documents

use crate::core::document::Document;
use crate::core::query::{Comparison, Predicate, Query, SortDirection};
use serde_json::Value;
use std::cmp::Ordering;

/// Whether a document satisfies every predicate
pub fn matches_all(document: &Document, filter: &[Predicate]) -> bool {
    filter.iter().all(|predicate| matches(document, predicate))
}

/// Whether a document satisfies one predicate
///
/// Equality matches when any resolved value equals the operand, or is an
/// array containing it. Relational comparisons only consider numeric values,
/// so a missing or non-numeric field never matches.
pub fn matches(document: &Document, predicate: &Predicate) -> bool {
    let candidates = document.lookup(&predicate.path);

    match predicate.op {
        Comparison::Eq => candidates
            .iter()
            .any(|value| equals_or_contains(value, &predicate.value)),
        Comparison::In => {
            let options = predicate.value.as_array().map(Vec::as_slice).unwrap_or(&[]);
            candidates.iter().any(|value| {
                options
                    .iter()
                    .any(|option| equals_or_contains(value, option))
            })
        }
        op => {
            let Some(operand) = predicate.value.as_f64() else {
                return false;
            };
            candidates
                .iter()
                .flat_map(|value| numbers(value))
                .any(|n| match op {
                    Comparison::Lt => n < operand,
                    Comparison::Gt => n > operand,
                    Comparison::Lte => n <= operand,
                    Comparison::Gte => n >= operand,
                    Comparison::Eq | Comparison::In => false,
                })
        }
    }
}

fn equals_or_contains(value: &Value, operand: &Value) -> bool {
    if values_equal(value, operand) {
        return true;
    }
    match value {
        Value::Array(items) => items.iter().any(|item| values_equal(item, operand)),
        _ => false,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

fn numbers(value: &Value) -> Vec<f64> {
    match value {
        Value::Number(n) => n.as_f64().into_iter().collect(),
        Value::Array(items) => items.iter().filter_map(Value::as_f64).collect(),
        _ => Vec::new(),
    }
}

/// Filter, sort, limit and project a document set
///
/// Sorting is stable, so documents with equal keys keep insertion order.
pub fn apply(documents: &[Document], query: &Query) -> Vec<Document> {
    let mut matched: Vec<&Document> = documents
        .iter()
        .filter(|document| matches_all(document, &query.filter))
        .collect();

    if let Some(sort) = &query.sort {
        matched.sort_by(|a, b| {
            let ordering = compare_values(
                a.lookup(&sort.field).first().copied(),
                b.lookup(&sort.field).first().copied(),
            );
            match sort.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    if let Some(limit) = query.limit {
        matched.truncate(limit);
    }

    matched
        .into_iter()
        .map(|document| match &query.projection {
            Some(fields) => document.project(fields),
            None => document.clone(),
        })
        .collect()
}

/// Missing values sort first, then null, numbers, strings, objects, arrays, booleans
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(0.0);
                let y = y.as_f64().unwrap_or(0.0);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => type_rank(a).cmp(&type_rank(b)),
        },
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}
