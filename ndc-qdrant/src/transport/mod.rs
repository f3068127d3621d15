// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Backend transport layer
//!
//! Wire types for points, filters and request bodies, the asynchronous
//! [`Transport`] trait, an HTTP client for a Qdrant server and an
//! in-memory implementation.

pub mod error;
pub mod filter;
pub mod matcher;
pub mod memory;
pub mod qdrant;
pub mod traits;
pub mod types;

pub use error::{TransportError, TransportResult};
pub use filter::{Condition, Filter, Match, Range};
pub use memory::MemoryTransport;
pub use qdrant::QdrantTransport;
pub use traits::Transport;
pub use types::{
    BatchRequest, PayloadSelector, Point, PointId, PointVector, RecommendRequest, ScrollRequest,
    ScrollResponse, SearchRequest,
};
