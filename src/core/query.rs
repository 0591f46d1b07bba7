//! Query translation
//!
//! The [`QueryTranslator`] turns caller-supplied filter/sort/limit/projection
//! arguments into a [`Query`], the store-neutral representation every backend
//! understands. It never executes anything.
//!
//! # Filter format
//!
//! A filter is a JSON object whose keys are dotted field paths, optionally
//! suffixed with a comparison operator:
//!
//! ```text
//! {"title": "Good Omens"}            exact match on a top-level field
//! {"information.price<": 10}         numeric comparison on a nested field
//! {"authors.featured": true}         match inside each element of a sequence
//! {"age>=": 18, "age<": 65}          clauses are combined with AND
//! ```
//!
//! Supported suffixes: none (equality), `<`, `>`, `<=`, `>=`.

use crate::core::error::{GatewayError, GatewayResult};
use crate::core::schema::Schema;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Comparison applied by a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq,
    Lt,
    Gt,
    Lte,
    Gte,
    /// Equality against any of several candidate values
    In,
}

impl Comparison {
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Comparison::Lt | Comparison::Gt | Comparison::Lte | Comparison::Gte
        )
    }

    /// MongoDB query operator for this comparison
    pub fn operator(&self) -> &'static str {
        match self {
            Comparison::Eq => "$eq",
            Comparison::Lt => "$lt",
            Comparison::Gt => "$gt",
            Comparison::Lte => "$lte",
            Comparison::Gte => "$gte",
            Comparison::In => "$in",
        }
    }
}

/// One filter clause: `path <op> value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub path: String,
    pub op: Comparison,
    pub value: Value,
}

impl Predicate {
    pub fn new(path: impl Into<String>, op: Comparison, value: Value) -> Self {
        Self {
            path: path.into(),
            op,
            value,
        }
    }

    pub fn eq(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Comparison::Eq, value)
    }

    /// Match a natural key given as a raw path segment
    ///
    /// Path parameters are always strings, but the stored key may be a number
    /// or boolean, so the raw text is matched against every plausible typed
    /// form of it.
    pub fn key(field: impl Into<String>, raw: &str) -> Self {
        let mut variants = vec![Value::String(raw.to_string())];
        match raw {
            "true" => variants.push(Value::Bool(true)),
            "false" => variants.push(Value::Bool(false)),
            _ => {
                if let Ok(i) = raw.parse::<i64>() {
                    variants.push(Value::from(i));
                } else if let Ok(f) = raw.parse::<f64>()
                    && raw.contains('.')
                {
                    variants.push(Value::from(f));
                }
            }
        }

        if variants.len() == 1 {
            Self::eq(field, variants.remove(0))
        } else {
            Self::new(field, Comparison::In, Value::Array(variants))
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// MongoDB sort specifier
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// A translated, store-neutral query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Conjunctive filter clauses (empty = match everything)
    pub filter: Vec<Predicate>,
    pub sort: Option<SortSpec>,
    pub limit: Option<usize>,
    /// Top-level fields to keep; `_id` is always kept
    pub projection: Option<Vec<String>>,
}

impl Query {
    /// Match every document, no refinements
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: Vec<Predicate>) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

/// Query parameters accepted on list routes
///
/// # Example
/// ```text
/// GET /authors?filter={"information.price<":10}
/// GET /numbers?sort=number:desc&limit=5
/// GET /users?fields=first,age
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct QueryParams {
    /// Filter as a JSON object string
    pub filter: Option<String>,

    /// `field`, `field:asc` or `field:desc`
    pub sort: Option<String>,

    /// Maximum number of documents to return
    pub limit: Option<usize>,

    /// Comma-separated projection list
    pub fields: Option<String>,
}

impl QueryParams {
    /// Whether any cursor refinement or filter was requested
    pub fn has_refinements(&self) -> bool {
        self.filter.is_some() || self.sort.is_some() || self.limit.is_some() || self.fields.is_some()
    }
}

/// Refinements applied after filtering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

fn path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
            .expect("field path pattern is valid")
    })
}

/// Normalizes caller arguments into a [`Query`]
///
/// When a schema is in effect, filters, sort keys and projections may only
/// reference fields the schema declares.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryTranslator<'a> {
    schema: Option<&'a Schema>,
}

impl<'a> QueryTranslator<'a> {
    pub fn new(schema: Option<&'a Schema>) -> Self {
        Self { schema }
    }

    /// Translate a parsed filter value and options
    pub fn translate(&self, filter: Option<&Value>, options: &QueryOptions) -> GatewayResult<Query> {
        let filter = match filter {
            Some(value) => self.parse_filter(value)?,
            None => Vec::new(),
        };

        let sort = options
            .sort
            .as_deref()
            .map(|s| self.parse_sort(s))
            .transpose()?;

        match options.limit {
            Some(0) => return Err(GatewayError::invalid_query("limit must be at least 1")),
            Some(limit) if i64::try_from(limit).is_err() => {
                return Err(GatewayError::invalid_query(format!(
                    "limit must not exceed {}",
                    i64::MAX
                )));
            }
            _ => {}
        }

        let projection = match &options.fields {
            Some(fields) => {
                for field in fields {
                    self.check_path(field)?;
                }
                Some(fields.clone())
            }
            None => None,
        };

        Ok(Query {
            filter,
            sort,
            limit: options.limit,
            projection,
        })
    }

    /// Translate raw HTTP query parameters
    pub fn translate_params(&self, params: &QueryParams) -> GatewayResult<Query> {
        let filter = params
            .filter
            .as_deref()
            .map(|raw| {
                serde_json::from_str::<Value>(raw)
                    .map_err(|e| GatewayError::invalid_query(format!("filter is not JSON: {e}")))
            })
            .transpose()?;

        let fields = params.fields.as_deref().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        });

        let options = QueryOptions {
            sort: params.sort.clone(),
            limit: params.limit,
            fields,
        };

        self.translate(filter.as_ref(), &options)
    }

    /// Translate a filter object into predicates
    pub fn parse_filter(&self, filter: &Value) -> GatewayResult<Vec<Predicate>> {
        let Some(object) = filter.as_object() else {
            return Err(GatewayError::invalid_query("filter must be a JSON object"));
        };

        let mut predicates = Vec::with_capacity(object.len());
        for (key, value) in object {
            let (path, op) = split_operator(key);
            self.check_path(path)?;

            if op.is_relational() && !value.is_number() {
                return Err(GatewayError::invalid_query(format!(
                    "comparison on '{path}' requires a numeric operand"
                )));
            }
            if value.is_object() {
                return Err(GatewayError::invalid_query(format!(
                    "'{path}' cannot be compared to an object"
                )));
            }

            predicates.push(Predicate::new(path, op, value.clone()));
        }

        Ok(predicates)
    }

    fn parse_sort(&self, raw: &str) -> GatewayResult<SortSpec> {
        let (field, direction) = match raw.rsplit_once(':') {
            Some((field, "asc")) => (field, SortDirection::Ascending),
            Some((field, "desc")) => (field, SortDirection::Descending),
            Some((_, other)) => {
                return Err(GatewayError::invalid_query(format!(
                    "unknown sort direction '{other}'"
                )));
            }
            None => (raw, SortDirection::Ascending),
        };
        self.check_path(field)?;
        Ok(SortSpec {
            field: field.to_string(),
            direction,
        })
    }

    fn check_path(&self, path: &str) -> GatewayResult<()> {
        if !path_pattern().is_match(path) {
            return Err(GatewayError::invalid_query(format!(
                "'{path}' is not a valid field path"
            )));
        }

        if let Some(schema) = self.schema {
            let top = path.split('.').next().unwrap_or(path);
            if !schema.declares(top) {
                return Err(GatewayError::invalid_query(format!(
                    "field '{top}' is not declared"
                )));
            }
        }

        Ok(())
    }
}

fn split_operator(key: &str) -> (&str, Comparison) {
    if let Some(path) = key.strip_suffix("<=") {
        (path, Comparison::Lte)
    } else if let Some(path) = key.strip_suffix(">=") {
        (path, Comparison::Gte)
    } else if let Some(path) = key.strip_suffix('<') {
        (path, Comparison::Lt)
    } else if let Some(path) = key.strip_suffix('>') {
        (path, Comparison::Gt)
    } else {
        (key, Comparison::Eq)
    }
}
