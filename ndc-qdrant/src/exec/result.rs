// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query result types

use crate::transport::Point;
use crate::types::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single projected row, keyed by output alias in request order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub values: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: String, value: Value) {
        self.values.insert(key, value);
    }

    /// Remove a key, keeping the order of the rest
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result for one request or one variable binding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregates: Option<IndexMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
}

impl RowSet {
    pub fn row_count(&self) -> usize {
        self.rows.as_ref().map_or(0, Vec::len)
    }

    pub fn aggregate(&self, alias: &str) -> Option<&Value> {
        self.aggregates.as_ref().and_then(|a| a.get(alias))
    }
}

/// Points returned by the backend for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRowGroup {
    pub points: Vec<Point>,
}

impl From<Vec<Point>> for RawRowGroup {
    fn from(points: Vec<Point>) -> Self {
        Self { points }
    }
}
