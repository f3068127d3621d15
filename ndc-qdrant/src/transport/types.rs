// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Points and request bodies exchanged with the vector store

use super::filter::Filter;
use crate::types::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Point identifier: unsigned integer or UUID
///
/// Numeric ids order before UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Num(u64),
    Uuid(String),
}

impl PointId {
    /// Interpret a request value as a point id
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Integer(n) if *n >= 0 => Ok(PointId::Num(*n as u64)),
            Value::Float(_) => match value.as_i64() {
                Some(n) if n >= 0 => Ok(PointId::Num(n as u64)),
                _ => Err(format!("{} is not a valid point id", value)),
            },
            Value::String(s) => uuid::Uuid::parse_str(s)
                .map(|id| PointId::Uuid(id.hyphenated().to_string()))
                .map_err(|_| format!("'{}' is not a valid point id", s)),
            other => Err(format!("{} is not a valid point id", other)),
        }
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointId::Num(n) => write!(f, "{}", n),
            PointId::Uuid(s) => write!(f, "{}", s),
        }
    }
}

impl From<&PointId> for Value {
    fn from(id: &PointId) -> Self {
        match id {
            PointId::Num(n) => match i64::try_from(*n) {
                Ok(n) => Value::Integer(n),
                Err(_) => Value::Float(*n as f64),
            },
            PointId::Uuid(s) => Value::String(s.clone()),
        }
    }
}

/// Stored vector: a single dense vector or a set of named ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointVector {
    Dense(Vec<f64>),
    Named(BTreeMap<String, Vec<f64>>),
}

impl PointVector {
    /// The vector used for similarity: the dense one, or the first named one
    pub fn primary(&self) -> Option<&[f64]> {
        match self {
            PointVector::Dense(v) => Some(v),
            PointVector::Named(named) => named.values().next().map(Vec::as_slice),
        }
    }

    pub fn to_value(&self) -> Value {
        fn dense(v: &[f64]) -> Value {
            Value::List(v.iter().copied().map(Value::Float).collect())
        }
        match self {
            PointVector::Dense(v) => dense(v),
            PointVector::Named(named) => Value::Object(
                named
                    .iter()
                    .map(|(name, v)| (name.clone(), dense(v)))
                    .collect(),
            ),
        }
    }
}

/// A point as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<IndexMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<PointVector>,
}

impl Point {
    pub fn new(id: PointId) -> Self {
        Self {
            id,
            version: None,
            score: None,
            payload: None,
            vector: None,
        }
    }

    pub fn with_vector(mut self, vector: Vec<f64>) -> Self {
        self.vector = Some(PointVector::Dense(vector));
        self
    }

    pub fn with_payload(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload
            .get_or_insert_with(IndexMap::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn payload_value(&self, key: &str) -> Option<&Value> {
        self.payload.as_ref().and_then(|payload| payload.get(key))
    }
}

/// Payload keys to return with each point
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PayloadSelector {
    pub include: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    pub with_payload: PayloadSelector,
    pub with_vector: bool,
    /// First point id to return; omitted to start from the beginning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<PointId>,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScrollResponse {
    pub points: Vec<Point>,
    #[serde(default)]
    pub next_page_offset: Option<PointId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub vector: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    pub with_payload: PayloadSelector,
    pub with_vector: bool,
    /// Number of leading hits to skip
    pub offset: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendRequest {
    pub positive: Vec<PointId>,
    pub negative: Vec<PointId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    pub with_payload: PayloadSelector,
    pub with_vector: bool,
    pub offset: u32,
    pub limit: u32,
}

/// Wire envelope for batched search and recommend calls
#[derive(Debug, Serialize)]
pub struct BatchRequest<'a, T> {
    pub searches: &'a [T],
}

impl<'a, T> BatchRequest<'a, T> {
    pub fn new(searches: &'a [T]) -> Self {
        Self { searches }
    }

    pub fn len(&self) -> usize {
        self.searches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.searches.is_empty()
    }
}
