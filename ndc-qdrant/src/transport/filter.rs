// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Backend filter predicates
//!
//! These serialize to the exact JSON the vector store expects:
//!
//! ```text
//! {"must": [{"key": "int", "match": {"value": 5}}],
//!  "must_not": [{"has_id": [1, 2]}],
//!  "should": [{"key": "score", "range": {"gte": 2.5, "lte": 2.5}}]}
//! ```

use super::types::PointId;
use crate::types::Value;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Boolean combination of conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must: Option<Vec<Condition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should: Option<Vec<Condition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_not: Option<Vec<Condition>>,
}

impl Filter {
    /// All conditions must hold
    pub fn must(conditions: Vec<Condition>) -> Self {
        Self {
            must: Some(conditions),
            ..Default::default()
        }
    }

    /// At least one condition must hold
    pub fn should(conditions: Vec<Condition>) -> Self {
        Self {
            should: Some(conditions),
            ..Default::default()
        }
    }

    /// None of the conditions may hold
    pub fn must_not(conditions: Vec<Condition>) -> Self {
        Self {
            must_not: Some(conditions),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Payload key matches a value, a text fragment or any of a set
    Field { key: String, matcher: Match },
    Range { key: String, range: Range },
    HasId(Vec<PointId>),
    /// Payload key is missing, null or an empty list
    IsEmpty { key: String },
    Nested(Filter),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Match {
    Value(Value),
    Text(String),
    Any(Vec<Value>),
}

/// Numeric bounds, any subset of which may be set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Range {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
}

impl Range {
    /// Closed interval holding exactly `value`
    pub fn exactly(value: f64) -> Self {
        Self {
            gte: Some(value),
            lte: Some(value),
            ..Default::default()
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.gt.map_or(true, |bound| value > bound)
            && self.gte.map_or(true, |bound| value >= bound)
            && self.lt.map_or(true, |bound| value < bound)
            && self.lte.map_or(true, |bound| value <= bound)
    }
}

#[derive(Serialize)]
struct KeyRef<'a> {
    key: &'a str,
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Condition::Field { key, matcher } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("key", key)?;
                map.serialize_entry("match", matcher)?;
                map.end()
            }
            Condition::Range { key, range } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("key", key)?;
                map.serialize_entry("range", range)?;
                map.end()
            }
            Condition::HasId(ids) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("has_id", ids)?;
                map.end()
            }
            Condition::IsEmpty { key } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("is_empty", &KeyRef { key })?;
                map.end()
            }
            Condition::Nested(filter) => filter.serialize(serializer),
        }
    }
}
