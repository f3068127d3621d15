// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query planning
//!
//! Turns a validated request into a [`QueryPlan`]: one backend request per
//! variable binding (or a single request without variables), all of the same
//! kind, plus everything the projector needs to shape rows and aggregates.

use super::compiler::ExpressionCompiler;
use crate::ast::{Aggregate, Argument, Field, QueryRequest, VariableSet};
use crate::catalog::{is_point_column, SchemaView};
use crate::exec::error::{QueryError, QueryResult};
use crate::functions::{AggregateFunction, AggregateSpec};
use crate::transport::{
    PayloadSelector, PointId, RecommendRequest, ScrollRequest, SearchRequest,
};
use crate::types::Value;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Page size used when the request sets no limit
pub const DEFAULT_LIMIT: u32 = i32::MAX as u32;

/// Kind of backend request a plan issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Scroll,
    Search,
    Recommend,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Scroll => write!(f, "scroll"),
            RequestKind::Search => write!(f, "search batch"),
            RequestKind::Recommend => write!(f, "recommend batch"),
        }
    }
}

/// Executable plan for one query request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    /// Backend collection name
    pub collection_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scroll_requests: Vec<ScrollRequest>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_requests: Vec<SearchRequest>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommend_requests: Vec<RecommendRequest>,
    /// Output key to source column, in output order
    pub field_aliases: IndexMap<String, String>,
    /// Row keys fetched only to feed aggregates, stripped before output
    pub aggregate_only_columns: IndexSet<String>,
    pub aggregates: IndexMap<String, AggregateSpec>,
}

impl QueryPlan {
    /// The single request kind this plan issues
    pub fn kind(&self) -> QueryResult<RequestKind> {
        let kinds: Vec<RequestKind> = [
            (RequestKind::Scroll, self.scroll_requests.is_empty()),
            (RequestKind::Search, self.search_requests.is_empty()),
            (RequestKind::Recommend, self.recommend_requests.is_empty()),
        ]
        .into_iter()
        .filter(|(_, empty)| !empty)
        .map(|(kind, _)| kind)
        .collect();

        match kinds.as_slice() {
            [kind] => Ok(*kind),
            [] => Err(QueryError::BadRequest(
                "query plan contains no backend requests".to_string(),
            )),
            _ => Err(QueryError::NotSupported(
                "query plan mixes backend request kinds".to_string(),
            )),
        }
    }

    pub fn request_count(&self) -> usize {
        self.scroll_requests.len() + self.search_requests.len() + self.recommend_requests.len()
    }

    /// True when the caller asked for at least one field
    pub fn has_requested_fields(&self) -> bool {
        self.field_aliases.len() > self.aggregate_only_columns.len()
    }
}

/// How the request reaches the backend, decided by its arguments
enum SearchMode<'r> {
    Scroll,
    Search {
        vector: &'r Argument,
    },
    Recommend {
        positive: &'r Argument,
        negative: Option<&'r Argument>,
    },
}

impl<'r> SearchMode<'r> {
    fn from_arguments(arguments: &'r IndexMap<String, Argument>) -> QueryResult<Self> {
        if let Some(name) = arguments
            .keys()
            .find(|name| !matches!(name.as_str(), "vector" | "positive" | "negative"))
        {
            return Err(QueryError::NotSupported(format!("argument '{}'", name)));
        }

        match (
            arguments.get("vector"),
            arguments.get("positive"),
            arguments.get("negative"),
        ) {
            (Some(_), Some(_), _) => Err(QueryError::BadRequest(
                "vector and positive arguments are mutually exclusive".to_string(),
            )),
            (Some(_), None, Some(_)) => Err(QueryError::BadRequest(
                "negative examples require positive examples, not a vector".to_string(),
            )),
            (Some(vector), None, None) => Ok(SearchMode::Search { vector }),
            (None, Some(positive), negative) => Ok(SearchMode::Recommend { positive, negative }),
            (None, None, Some(_)) => Err(QueryError::BadRequest(
                "negative examples require positive examples".to_string(),
            )),
            (None, None, None) => Ok(SearchMode::Scroll),
        }
    }

    fn is_scroll(&self) -> bool {
        matches!(self, SearchMode::Scroll)
    }
}

/// Accumulated projection: output aliases and what to fetch for them
#[derive(Debug, Default)]
struct Projection {
    aliases: IndexMap<String, String>,
    hidden: IndexSet<String>,
    payload: Vec<String>,
    with_vector: bool,
}

impl Projection {
    fn fetch(&mut self, column: &str) {
        if column == "vector" {
            self.with_vector = true;
        } else if !is_point_column(column) && !self.payload.iter().any(|c| c == column) {
            self.payload.push(column.to_string());
        }
    }

    fn selector(&self) -> PayloadSelector {
        PayloadSelector {
            include: self.payload.clone(),
        }
    }
}

/// Plans query requests against a schema
pub struct QueryPlanner<'a> {
    schema: &'a dyn SchemaView,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(schema: &'a dyn SchemaView) -> Self {
        Self { schema }
    }

    pub fn plan(&self, request: &QueryRequest) -> QueryResult<QueryPlan> {
        self.validate(request)?;
        let fields = self.schema.fields_of(&request.collection);

        let mut projection = Projection::default();
        self.resolve_fields(request, &fields, &mut projection)?;
        let aggregates = self.resolve_aggregates(request, &fields, &mut projection)?;

        let mode = SearchMode::from_arguments(&request.arguments)?;
        if !mode.is_scroll() && !self.schema.is_vector_collection(&request.collection) {
            return Err(QueryError::BadRequest(format!(
                "collection '{}' has no vectors to search",
                request.collection
            )));
        }

        let bindings: Vec<Option<&VariableSet>> = match &request.variables {
            None => vec![None],
            Some(sets) if sets.is_empty() => {
                return Err(QueryError::BadRequest(
                    "variables must contain at least one binding".to_string(),
                ))
            }
            Some(sets) => sets.iter().map(Some).collect(),
        };

        let limit = request.query.limit.unwrap_or(DEFAULT_LIMIT);
        let offset = request.query.offset.unwrap_or(0);
        let mut plan = QueryPlan {
            collection_name: self.schema.backend_collection(&request.collection),
            scroll_requests: Vec::new(),
            search_requests: Vec::new(),
            recommend_requests: Vec::new(),
            field_aliases: IndexMap::new(),
            aggregate_only_columns: IndexSet::new(),
            aggregates,
        };

        for binding in bindings {
            let filter = request
                .query
                .predicate
                .as_ref()
                .map(|predicate| ExpressionCompiler::new(binding).compile(predicate))
                .transpose()?;

            match &mode {
                SearchMode::Scroll => plan.scroll_requests.push(ScrollRequest {
                    filter,
                    with_payload: projection.selector(),
                    with_vector: projection.with_vector,
                    offset: (offset > 0).then(|| PointId::Num(u64::from(offset))),
                    limit,
                }),
                SearchMode::Search { vector } => {
                    let value = resolve_argument("vector", vector, binding)?;
                    let vector = value.as_vector().ok_or_else(|| {
                        QueryError::BadRequest(format!(
                            "vector argument must be a non-empty list of numbers, got {}",
                            value.type_name()
                        ))
                    })?;
                    plan.search_requests.push(SearchRequest {
                        vector,
                        filter,
                        with_payload: projection.selector(),
                        with_vector: projection.with_vector,
                        offset,
                        limit,
                    });
                }
                SearchMode::Recommend { positive, negative } => {
                    let positive = point_ids(&resolve_argument("positive", positive, binding)?)?;
                    if positive.is_empty() {
                        return Err(QueryError::BadRequest(
                            "positive argument requires at least one point id".to_string(),
                        ));
                    }
                    let negative = match negative {
                        Some(negative) => {
                            point_ids(&resolve_argument("negative", negative, binding)?)?
                        }
                        None => Vec::new(),
                    };
                    plan.recommend_requests.push(RecommendRequest {
                        positive,
                        negative,
                        filter,
                        with_payload: projection.selector(),
                        with_vector: projection.with_vector,
                        offset,
                        limit,
                    });
                }
            }
        }

        plan.field_aliases = projection.aliases;
        plan.aggregate_only_columns = projection.hidden;

        log::debug!(
            "planned {} with {} request(s) against '{}'",
            plan.kind()?,
            plan.request_count(),
            plan.collection_name
        );
        Ok(plan)
    }

    fn validate(&self, request: &QueryRequest) -> QueryResult<()> {
        if !self.schema.collection_exists(&request.collection) {
            return Err(QueryError::Conflict(format!(
                "collection '{}' does not exist",
                request.collection
            )));
        }
        if !request.collection_relationships.is_empty() {
            return Err(QueryError::NotSupported("collection relationships".to_string()));
        }
        if request.query.order_by.is_some() {
            return Err(QueryError::NotSupported("order_by".to_string()));
        }
        Ok(())
    }

    fn check_column(
        &self,
        collection: &str,
        column: &str,
        fields: &BTreeSet<String>,
    ) -> QueryResult<()> {
        if is_point_column(column) || fields.contains(column) {
            Ok(())
        } else {
            Err(QueryError::BadRequest(format!(
                "unknown column '{}' in collection '{}'",
                column, collection
            )))
        }
    }

    fn resolve_fields(
        &self,
        request: &QueryRequest,
        fields: &BTreeSet<String>,
        projection: &mut Projection,
    ) -> QueryResult<()> {
        let Some(requested) = &request.query.fields else {
            return Ok(());
        };
        for (alias, field) in requested {
            match field {
                Field::Column { column } => {
                    self.check_column(&request.collection, column, fields)?;
                    projection.aliases.insert(alias.clone(), column.clone());
                    projection.fetch(column);
                }
                Field::Relationship { relationship, .. } => {
                    return Err(QueryError::NotSupported(format!(
                        "relationship field '{}'",
                        relationship
                    )))
                }
            }
        }
        Ok(())
    }

    /// Resolve aggregates, fetching any column they read that is not already projected
    fn resolve_aggregates(
        &self,
        request: &QueryRequest,
        fields: &BTreeSet<String>,
        projection: &mut Projection,
    ) -> QueryResult<IndexMap<String, AggregateSpec>> {
        let mut resolved = IndexMap::new();
        let Some(aggregates) = &request.query.aggregates else {
            return Ok(resolved);
        };

        for (alias, aggregate) in aggregates {
            let spec = match aggregate {
                Aggregate::StarCount => AggregateSpec::StarCount,
                Aggregate::ColumnCount { column, distinct } => AggregateSpec::ColumnCount {
                    column: column.clone(),
                    distinct: *distinct,
                },
                Aggregate::SingleColumn { column, function } => AggregateSpec::SingleColumn {
                    column: column.clone(),
                    function: AggregateFunction::from_name(function).ok_or_else(|| {
                        QueryError::NotSupported(format!("aggregate function '{}'", function))
                    })?,
                },
            };

            if let Some(column) = spec.column() {
                self.check_column(&request.collection, column, fields)?;
                if !projection.aliases.values().any(|c| c == column) {
                    let hidden = if projection.aliases.contains_key(column) {
                        format!("{}#aggregate", column)
                    } else {
                        column.to_string()
                    };
                    projection.aliases.insert(hidden.clone(), column.to_string());
                    projection.hidden.insert(hidden);
                    projection.fetch(column);
                }
            }
            resolved.insert(alias.clone(), spec);
        }
        Ok(resolved)
    }
}

fn resolve_argument(
    name: &str,
    argument: &Argument,
    binding: Option<&VariableSet>,
) -> QueryResult<Value> {
    match argument {
        Argument::Literal { value } => Ok(value.clone()),
        Argument::Variable { name: variable } => binding
            .ok_or_else(|| {
                QueryError::BadRequest(format!(
                    "argument '{}' uses variable '{}' without variable bindings",
                    name, variable
                ))
            })?
            .get(variable)
            .cloned()
            .ok_or_else(|| QueryError::BadRequest(format!("variable '{}' is not bound", variable))),
    }
}

/// A single id or a list of ids
fn point_ids(value: &Value) -> QueryResult<Vec<PointId>> {
    let ids = match value {
        Value::List(items) => items.iter().map(PointId::from_value).collect(),
        single => PointId::from_value(single).map(|id| vec![id]),
    };
    ids.map_err(QueryError::BadRequest)
}
