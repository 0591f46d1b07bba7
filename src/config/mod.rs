//! Configuration loading and management
//!
//! A gateway is described by a single YAML document:
//!
//! ```yaml
//! store:
//!   backend: mongodb
//!   uri: mongodb://127.0.0.1:27017
//!   database: authorListDB
//! server:
//!   port: 3001
//! resources:
//!   - name: authors
//!     collection: authorList
//!     views:
//!       - name: featured
//!         filter: { "authors.featured": true }
//! seed:
//!   - collection: users
//!     generate: { kind: users, count: 10 }
//! ```
//!
//! Environment variables override the file after parsing: `DOCGATE_URI`,
//! `DOCGATE_DATABASE`, `DOCGATE_HOST` and `PORT`.

use crate::core::document::ID_FIELD;
use crate::core::error::{GatewayError, GatewayResult};
use crate::core::query::QueryOptions;
use crate::core::schema::Schema;
use crate::core::seed::FixtureSource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use validator::Validate;

/// Which document store the gateway talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendKind {
    #[default]
    #[serde(rename = "in-memory")]
    InMemory,
    #[serde(rename = "mongodb")]
    MongoDb,
}

/// Store connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default = "default_uri")]
    pub uri: String,

    #[validate(length(min = 1, message = "database name must not be empty"))]
    pub database: String,
}

fn default_uri() -> String {
    "mongodb://127.0.0.1:27017".to_string()
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    #[validate(length(min = 1, message = "host must not be empty"))]
    pub host: String,

    /// `0` binds an ephemeral port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Operation a resource may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    List,
    FilteredList,
    GetByKey,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Create,
        Operation::List,
        Operation::FilteredList,
        Operation::GetByKey,
        Operation::Update,
        Operation::Delete,
    ];
}

fn all_operations() -> Vec<Operation> {
    Operation::ALL.to_vec()
}

/// How a lookup that matches nothing is answered over HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotFoundPolicy {
    /// `200 OK` with a `null` body
    #[default]
    Null,
    /// `404 Not Found` with a `null` body
    Status404,
}

/// A fixed, named read-only query exposed as `GET /{resource}/{view}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ViewConfig {
    #[validate(length(min = 1))]
    pub name: String,

    #[serde(default)]
    pub filter: Option<Value>,

    #[serde(default)]
    pub sort: Option<String>,

    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

impl ViewConfig {
    pub fn options(&self) -> QueryOptions {
        QueryOptions {
            sort: self.sort.clone(),
            limit: self.limit,
            fields: self.fields.clone(),
        }
    }
}

/// One collection exposed over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ResourceConfig {
    /// Route prefix (`/{name}`)
    #[validate(length(min = 1, message = "resource name must not be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "collection name must not be empty"))]
    pub collection: String,

    /// Natural key field used by the `/{name}/{key}` routes
    #[serde(default = "default_key")]
    #[validate(length(min = 1))]
    pub key: String,

    #[serde(default = "all_operations")]
    pub operations: Vec<Operation>,

    #[serde(default)]
    pub schema: Option<Schema>,

    #[serde(default)]
    pub not_found: NotFoundPolicy,

    #[serde(default)]
    #[validate(nested)]
    pub views: Vec<ViewConfig>,
}

fn default_key() -> String {
    ID_FIELD.to_string()
}

impl ResourceConfig {
    /// A resource exposing every operation with the default key
    pub fn new(name: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: collection.into(),
            key: default_key(),
            operations: all_operations(),
            schema: None,
            not_found: NotFoundPolicy::default(),
            views: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_operations(mut self, operations: impl Into<Vec<Operation>>) -> Self {
        self.operations = operations.into();
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_not_found(mut self, policy: NotFoundPolicy) -> Self {
        self.not_found = policy;
        self
    }

    pub fn with_view(mut self, view: ViewConfig) -> Self {
        self.views.push(view);
        self
    }

    pub fn allows(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }
}

/// Fixtures loaded into one collection before serving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SeedConfig {
    #[validate(length(min = 1, message = "seed collection must not be empty"))]
    pub collection: String,

    #[serde(flatten)]
    pub source: FixtureSource,
}

/// Complete gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GatewayConfig {
    #[validate(nested)]
    pub store: StoreConfig,

    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    #[serde(default)]
    #[validate(nested)]
    pub resources: Vec<ResourceConfig>,

    #[serde(default)]
    #[validate(nested)]
    pub seed: Vec<SeedConfig>,
}

/// Route segments the gateway reserves for itself
const RESERVED_NAMES: &[&str] = &["health", "healthz"];

fn is_path_segment(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl GatewayConfig {
    /// In-memory store, default listener, nothing exposed
    pub fn in_memory(database: impl Into<String>) -> Self {
        Self {
            store: StoreConfig {
                backend: BackendKind::InMemory,
                uri: "memory://".to_string(),
                database: database.into(),
            },
            server: ServerConfig::default(),
            resources: Vec::new(),
            seed: Vec::new(),
        }
    }

    pub fn with_resource(mut self, resource: ResourceConfig) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_seed(mut self, collection: impl Into<String>, source: FixtureSource) -> Self {
        self.seed.push(SeedConfig {
            collection: collection.into(),
            source,
        });
        self
    }

    /// Load a configuration file, apply environment overrides and validate
    pub fn load(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let mut config = Self::parse_file(path.as_ref())?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.check()?;
        Ok(config)
    }

    /// Load and validate a configuration file, without environment overrides
    pub fn from_yaml_file(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let config = Self::parse_file(path.as_ref())?;
        config.check()?;
        Ok(config)
    }

    /// Parse and validate a YAML string
    pub fn from_yaml_str(yaml: &str) -> GatewayResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| GatewayError::Config(format!("cannot parse configuration: {e}")))?;
        config.check()?;
        Ok(config)
    }

    fn parse_file(path: &Path) -> GatewayResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&content)
            .map_err(|e| GatewayError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Override store and listener settings from a variable lookup
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> GatewayResult<()> {
        if let Some(uri) = lookup("DOCGATE_URI") {
            self.store.uri = uri;
        }
        if let Some(database) = lookup("DOCGATE_DATABASE") {
            self.store.database = database;
        }
        if let Some(host) = lookup("DOCGATE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| GatewayError::Config(format!("PORT '{port}' is not a valid port")))?;
        }
        Ok(())
    }

    /// Structural validation plus the cross-field rules `validator` cannot express
    pub fn check(&self) -> GatewayResult<()> {
        self.validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let mut names = HashSet::new();
        for resource in &self.resources {
            if !is_path_segment(&resource.name) || RESERVED_NAMES.contains(&resource.name.as_str())
            {
                return Err(GatewayError::Config(format!(
                    "'{}' cannot be used as a resource name",
                    resource.name
                )));
            }
            if !names.insert(resource.name.as_str()) {
                return Err(GatewayError::Config(format!(
                    "resource '{}' is declared twice",
                    resource.name
                )));
            }

            let mut views = HashSet::new();
            for view in &resource.views {
                if !is_path_segment(&view.name) || !views.insert(view.name.as_str()) {
                    return Err(GatewayError::Config(format!(
                        "view '{}' of resource '{}' is invalid or duplicated",
                        view.name, resource.name
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|r| r.name == name)
    }
}
