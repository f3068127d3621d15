// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! ndc-qdrant - Query compiler and execution engine for a Qdrant data connector
//!
//! Translates vendor-neutral query requests (fields, aggregates, pagination,
//! predicates, variable bindings and search arguments) into vector store
//! scroll, search and recommend calls, runs them in batches and shapes the
//! returned points into row sets.
//!
//! # Usage
//!
//! ```ignore
//! let config = ConnectorConfig::from_file("config.json")?;
//! let coordinator = QueryCoordinator::from_config(config, Arc::new(transport));
//! let response = coordinator.run_query_json(body).await?;
//! ```

// Public modules - exposed to external users
pub mod ast;
pub mod catalog;
pub mod coordinator;
pub mod exec;
pub mod functions;
pub mod plan;
pub mod transport;
pub mod types;

// Re-export the public API - QueryCoordinator is the main entry point
pub use ast::{Expression, QueryRequest};
pub use catalog::{CollectionConfig, ConfigError, ConnectorConfig, SchemaView};
pub use coordinator::{explain_query, run_query, QueryCoordinator};
pub use exec::{ErrorKind, QueryError, QueryResult, Row, RowSet};
pub use plan::{QueryExplanation, QueryPlan};
pub use transport::{MemoryTransport, QdrantTransport, Transport, TransportError};
pub use types::Value;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
