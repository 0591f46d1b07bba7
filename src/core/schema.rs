//! Optional per-resource schema validation
//!
//! Resources are schema-less by default. When a schema is configured, request
//! bodies are checked against it before they reach the store, and filters may
//! only reference declared fields.

use crate::core::document::{Document, ID_FIELD};
use crate::core::error::{FieldError, GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON type a field value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldKind {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Object => value.is_object(),
            FieldKind::Array => value.is_array(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::Number => "a number",
            FieldKind::Boolean => "a boolean",
            FieldKind::Object => "an object",
            FieldKind::Array => "an array",
        }
    }
}

/// Declaration of one top-level field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub kind: Option<FieldKind>,
}

impl FieldRule {
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            required: true,
            kind: Some(kind),
        }
    }

    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            required: false,
            kind: Some(kind),
        }
    }

    fn check(&self, value: &Value) -> Option<FieldError> {
        match self.kind {
            Some(kind) if !value.is_null() && !kind.accepts(value) => Some(FieldError::new(
                &self.name,
                format!("must be {}", kind.describe()),
            )),
            _ => None,
        }
    }
}

/// Set of declared fields for a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldRule>,
}

impl Schema {
    pub fn new(fields: Vec<FieldRule>) -> Self {
        Self { fields }
    }

    fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|rule| rule.name == name)
    }

    /// Whether a top-level field is declared (the identifier always is)
    pub fn declares(&self, field: &str) -> bool {
        field == ID_FIELD || self.rule(field).is_some()
    }

    /// Validate a document about to be created
    ///
    /// Undeclared fields are dropped. A required field that is absent or null
    /// and any field of the wrong kind are reported together.
    pub fn validate_create(&self, document: Document) -> GatewayResult<Document> {
        let mut errors = Vec::new();

        for rule in &self.fields {
            match document.get(&rule.name) {
                None | Some(Value::Null) if rule.required => {
                    errors.push(FieldError::new(&rule.name, "is required"));
                }
                Some(value) => errors.extend(rule.check(value)),
                None => {}
            }
        }

        if !errors.is_empty() {
            return Err(GatewayError::Validation(errors));
        }

        let kept = document
            .into_map()
            .into_iter()
            .filter(|(field, _)| self.declares(field))
            .collect::<serde_json::Map<_, _>>();
        Ok(Document::from(kept))
    }

    /// Validate a patch about to be applied to an existing document
    pub fn validate_patch(&self, patch: &Document) -> GatewayResult<()> {
        let mut errors = Vec::new();

        for field in patch.fields() {
            if field == ID_FIELD {
                continue;
            }
            let Some(rule) = self.rule(field) else {
                errors.push(FieldError::new(field, "is not declared"));
                continue;
            };
            if let Some(value) = patch.get(field) {
                if value.is_null() && rule.required {
                    errors.push(FieldError::new(field, "is required"));
                } else {
                    errors.extend(rule.check(value));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::Validation(errors))
        }
    }
}
