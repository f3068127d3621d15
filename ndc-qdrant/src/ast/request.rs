// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query request IR
//!
//! A request names a collection and carries a query body (fields, aggregates,
//! pagination, predicate), optional arguments that select vector search or
//! recommendation, and optional variable bindings that turn it into a batch.

use super::expression::Expression;
use crate::exec::error::QueryResult;
use crate::types::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One binding of variable names to values
pub type VariableSet = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub collection: String,
    pub query: Query,
    #[serde(default)]
    pub arguments: IndexMap<String, Argument>,
    #[serde(default)]
    pub collection_relationships: IndexMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<VariableSet>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<IndexMap<String, Field>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregates: Option<IndexMap<String, Aggregate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<serde_json::Value>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Expression>,
}

/// A projected field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Field {
    Column {
        column: String,
    },
    Relationship {
        relationship: String,
        #[serde(default)]
        query: serde_json::Value,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Aggregate {
    StarCount,
    ColumnCount {
        column: String,
        #[serde(default)]
        distinct: bool,
    },
    SingleColumn {
        column: String,
        function: String,
    },
}

/// Request argument, either inline or bound per variable set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Argument {
    Literal { value: Value },
    Variable { name: String },
}

impl QueryRequest {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            query: Query::default(),
            arguments: IndexMap::new(),
            collection_relationships: IndexMap::new(),
            variables: None,
        }
    }

    /// Parse a request from its JSON wire form
    pub fn from_json(body: &str) -> QueryResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Project `column` under `alias`
    pub fn with_field(mut self, alias: &str, column: &str) -> Self {
        self.query.fields.get_or_insert_with(IndexMap::new).insert(
            alias.to_string(),
            Field::Column {
                column: column.to_string(),
            },
        );
        self
    }

    /// Request an empty field map, distinct from omitting fields entirely
    pub fn with_no_fields(mut self) -> Self {
        self.query.fields.get_or_insert_with(IndexMap::new);
        self
    }

    pub fn with_aggregate(mut self, alias: &str, aggregate: Aggregate) -> Self {
        self.query
            .aggregates
            .get_or_insert_with(IndexMap::new)
            .insert(alias.to_string(), aggregate);
        self
    }

    pub fn with_predicate(mut self, predicate: Expression) -> Self {
        self.query.predicate = Some(predicate);
        self
    }

    pub fn with_argument(mut self, name: &str, argument: Argument) -> Self {
        self.arguments.insert(name.to_string(), argument);
        self
    }

    pub fn with_variables(mut self, variables: Vec<VariableSet>) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.query.offset = Some(offset);
        self
    }
}

impl Argument {
    pub fn literal(value: impl Into<Value>) -> Self {
        Argument::Literal {
            value: value.into(),
        }
    }

    pub fn variable(name: &str) -> Self {
        Argument::Variable {
            name: name.to_string(),
        }
    }
}
