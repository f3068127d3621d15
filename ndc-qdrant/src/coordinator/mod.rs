// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query Coordinator - central orchestration for query execution

pub mod query_coordinator;

pub use query_coordinator::{explain_query, run_query, QueryCoordinator};

// Re-export types needed for the public API
pub use crate::exec::{QueryError, QueryResult, Row, RowSet};
pub use crate::plan::QueryExplanation;
