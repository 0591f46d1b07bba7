//! Schema-flexible documents
//!
//! A [`Document`] is an ordered mapping from field name to JSON value. Values
//! may be scalars, nested mappings, or ordered sequences of nested mappings
//! (embedded sub-documents). Field order and sequence order are preserved
//! exactly as inserted (`serde_json` is built with `preserve_order`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Name of the store-assigned identifier field
pub const ID_FIELD: &str = "_id";

/// A single record stored in a collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a document from a JSON value
    ///
    /// Returns `None` if the value is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Get a top-level field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Insert or replace a top-level field, returning the previous value
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Remove a top-level field
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    /// Whether the document has a top-level field
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// The store-assigned identifier, if any
    pub fn id(&self) -> Option<&Value> {
        self.0.get(ID_FIELD)
    }

    /// Assign a fresh identifier when the document has none
    ///
    /// Identifiers are UUID v4 strings so that keys look the same whichever
    /// backend stored the document. An explicitly supplied `_id` is kept.
    pub fn ensure_id(&mut self) -> &Value {
        self.0
            .entry(ID_FIELD)
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()))
    }

    /// Top-level field names in insertion order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve a dotted path, fanning out through embedded sequences
    ///
    /// `authors.featured` yields the `featured` value of every element of the
    /// `authors` array; `information.price` yields the nested price. Missing
    /// segments yield nothing.
    pub fn lookup<'a>(&'a self, path: &str) -> Vec<&'a Value> {
        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            return Vec::new();
        };

        let mut current: Vec<&Value> = self.0.get(first).into_iter().collect();
        for segment in segments {
            current = current
                .into_iter()
                .flat_map(|value| descend(value, segment))
                .collect();
        }
        current
    }

    /// Overwrite top-level fields with those of `patch`
    ///
    /// The identifier is never replaced.
    pub fn apply_patch(&mut self, patch: &Document) {
        for (field, value) in &patch.0 {
            if field == ID_FIELD {
                continue;
            }
            self.0.insert(field.clone(), value.clone());
        }
    }

    /// Keep only the listed top-level fields (plus the identifier)
    pub fn project(&self, fields: &[String]) -> Document {
        let map = self
            .0
            .iter()
            .filter(|(field, _)| field.as_str() == ID_FIELD || fields.iter().any(|f| f == *field))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();
        Document(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn descend<'a>(value: &'a Value, segment: &str) -> Vec<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment).into_iter().collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_object().and_then(|map| map.get(segment)))
            .collect(),
        _ => Vec::new(),
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        document.into_value()
    }
}
