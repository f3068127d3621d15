// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query execution: backend dispatch and result projection

pub mod error;
pub mod executor;
pub mod projector;
pub mod result;

pub use error::{ErrorKind, QueryError, QueryResult};
pub use executor::BatchExecutor;
pub use projector::RowProjector;
pub use result::{RawRowGroup, Row, RowSet};
