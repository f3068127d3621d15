// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Connector configuration
//!
//! Describes the backend endpoint and the collections exposed to queries.
//! The configuration doubles as the [`SchemaView`] used during planning.

use super::error::{ConfigError, ConfigResult};
use super::traits::{is_point_column, SchemaView};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6333";
pub const QDRANT_URL_ENV: &str = "QDRANT_URL";
pub const QDRANT_API_KEY_ENV: &str = "QDRANT_API_KEY";

fn default_qdrant_url() -> String {
    DEFAULT_QDRANT_URL.to_string()
}

fn default_vectors() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,
    #[serde(default)]
    pub qdrant_api_key: Option<String>,
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub name: String,
    /// Backend collection name when it differs from `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default = "default_vectors")]
    pub vectors: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            qdrant_url: default_qdrant_url(),
            qdrant_api_key: None,
            collections: Vec::new(),
        }
    }
}

impl CollectionConfig {
    pub fn new(name: &str, fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            backend_name: None,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            vectors: true,
        }
    }

    pub fn without_vectors(mut self) -> Self {
        self.vectors = false;
        self
    }

    pub fn with_backend_name(mut self, backend_name: &str) -> Self {
        self.backend_name = Some(backend_name.to_string());
        self
    }
}

impl ConnectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, collection: CollectionConfig) -> Self {
        self.collections.push(collection);
        self
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_json(&contents)?;
        config.apply_env_overrides();
        log::debug!(
            "loaded connector config from {} ({} collection(s))",
            path.display(),
            config.collections.len()
        );
        Ok(config)
    }

    /// Override the endpoint and API key from `QDRANT_URL` / `QDRANT_API_KEY`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(QDRANT_URL_ENV) {
            if !url.is_empty() {
                self.qdrant_url = url;
            }
        }
        if let Ok(key) = std::env::var(QDRANT_API_KEY_ENV) {
            if !key.is_empty() {
                self.qdrant_api_key = Some(key);
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let mut names = HashSet::new();
        for collection in &self.collections {
            if collection.name.is_empty() {
                return Err(ConfigError::Invalid(
                    "collection name must not be empty".to_string(),
                ));
            }
            if !names.insert(collection.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate collection '{}'",
                    collection.name
                )));
            }
            if let Some(field) = collection.fields.iter().find(|f| is_point_column(f)) {
                return Err(ConfigError::Invalid(format!(
                    "field '{}' in collection '{}' shadows a point column",
                    field, collection.name
                )));
            }
        }
        Ok(())
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionConfig> {
        self.collections.iter().find(|c| c.name == name)
    }
}

impl SchemaView for ConnectorConfig {
    fn collection_exists(&self, name: &str) -> bool {
        self.collection(name).is_some()
    }

    fn fields_of(&self, collection: &str) -> BTreeSet<String> {
        self.collection(collection)
            .map(|c| c.fields.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn is_vector_collection(&self, collection: &str) -> bool {
        self.collection(collection).map_or(false, |c| c.vectors)
    }

    fn backend_collection(&self, collection: &str) -> String {
        self.collection(collection)
            .and_then(|c| c.backend_name.clone())
            .unwrap_or_else(|| collection.to_string())
    }
}
