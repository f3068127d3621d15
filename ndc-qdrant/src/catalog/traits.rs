// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Schema view consulted by the planner

use std::collections::BTreeSet;

/// Point-level columns every collection exposes outside its payload
pub const POINT_COLUMNS: [&str; 4] = ["id", "score", "vector", "version"];

/// Returns true if `name` is a point-level column rather than a payload field
pub fn is_point_column(name: &str) -> bool {
    POINT_COLUMNS.contains(&name)
}

/// Read-only description of the collections a connector exposes
pub trait SchemaView: Send + Sync {
    fn collection_exists(&self, name: &str) -> bool;

    /// Declared payload fields; empty for unknown collections
    fn fields_of(&self, collection: &str) -> BTreeSet<String>;

    /// True when points carry vectors, enabling search and recommend
    fn is_vector_collection(&self, collection: &str) -> bool;

    /// Name of the collection in the backend
    fn backend_collection(&self, collection: &str) -> String {
        collection.to_string()
    }
}
