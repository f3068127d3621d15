// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query Coordinator - orchestration of planning, execution and projection
//!
//! `run_query` plans a request, sends the plan through a transport and
//! projects the raw points into one row set per request (or per variable
//! binding). `explain_query` stops after planning and never touches the
//! transport.

use crate::ast::QueryRequest;
use crate::catalog::{ConnectorConfig, SchemaView};
use crate::exec::{BatchExecutor, QueryResult, RowProjector, RowSet};
use crate::plan::{QueryExplanation, QueryPlan, QueryPlanner};
use crate::transport::{QdrantTransport, Transport};
use std::sync::Arc;

/// Plan, execute and project a request
pub async fn run_query(
    request: &QueryRequest,
    schema: &dyn SchemaView,
    transport: &dyn Transport,
) -> QueryResult<Vec<RowSet>> {
    let plan = QueryPlanner::new(schema).plan(request)?;
    let groups = BatchExecutor::new(transport).execute(&plan).await?;
    RowProjector::new(&plan).project(groups)
}

/// Describe what a request would send to the backend
pub fn explain_query(request: &QueryRequest, schema: &dyn SchemaView) -> QueryExplanation {
    match QueryPlanner::new(schema).plan(request) {
        Ok(plan) => QueryExplanation::from_plan(&plan),
        Err(err) => {
            log::debug!("explain rejected request: {}", err);
            QueryExplanation::from_error(&err)
        }
    }
}

/// Query Coordinator - single entry point bundling a schema and a transport
///
/// Cheap to clone and safe to share across tasks; each call is independent.
#[derive(Clone)]
pub struct QueryCoordinator {
    schema: Arc<dyn SchemaView>,
    transport: Arc<dyn Transport>,
}

impl QueryCoordinator {
    pub fn new(schema: Arc<dyn SchemaView>, transport: Arc<dyn Transport>) -> Self {
        Self { schema, transport }
    }

    /// Build a coordinator whose schema is the connector configuration
    pub fn from_config(config: ConnectorConfig, transport: Arc<dyn Transport>) -> Self {
        Self::new(Arc::new(config), transport)
    }

    /// Build a coordinator talking to the Qdrant server named by the configuration
    pub fn connect(config: ConnectorConfig) -> QueryResult<Self> {
        let transport = QdrantTransport::from_config(&config)?;
        log::debug!("using Qdrant at {}", transport.base_url());
        Ok(Self::from_config(config, Arc::new(transport)))
    }

    /// Plan without executing
    pub fn plan(&self, request: &QueryRequest) -> QueryResult<QueryPlan> {
        QueryPlanner::new(self.schema.as_ref()).plan(request)
    }

    pub async fn run_query(&self, request: &QueryRequest) -> QueryResult<Vec<RowSet>> {
        run_query(request, self.schema.as_ref(), self.transport.as_ref()).await
    }

    pub fn explain_query(&self, request: &QueryRequest) -> QueryExplanation {
        explain_query(request, self.schema.as_ref())
    }

    /// Run a request given as JSON and return the response as JSON
    ///
    /// The response is an array with one row set per request or binding.
    pub async fn run_query_json(&self, body: &str) -> QueryResult<serde_json::Value> {
        let request = QueryRequest::from_json(body)?;
        let row_sets = self.run_query(&request).await?;
        Ok(serde_json::to_value(row_sets)?)
    }

    /// Explain a request given as JSON; malformed input is a rejected explanation
    pub fn explain_query_json(&self, body: &str) -> QueryExplanation {
        match QueryRequest::from_json(body) {
            Ok(request) => self.explain_query(&request),
            Err(err) => QueryExplanation::from_error(&err),
        }
    }
}
