// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Transport trait implemented by every backend client

use super::error::TransportResult;
use super::types::{
    BatchRequest, Point, RecommendRequest, ScrollRequest, ScrollResponse, SearchRequest,
};
use async_trait::async_trait;

/// Asynchronous access to a vector store
///
/// Batch calls return one result list per request, in request order.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Page through a collection in id order
    async fn scroll(
        &self,
        collection: &str,
        request: &ScrollRequest,
    ) -> TransportResult<ScrollResponse>;

    /// Nearest-neighbour search for a single vector
    async fn search(&self, collection: &str, request: &SearchRequest)
        -> TransportResult<Vec<Point>>;

    async fn search_batch(
        &self,
        collection: &str,
        batch: &BatchRequest<'_, SearchRequest>,
    ) -> TransportResult<Vec<Vec<Point>>>;

    async fn recommend_batch(
        &self,
        collection: &str,
        batch: &BatchRequest<'_, RecommendRequest>,
    ) -> TransportResult<Vec<Vec<Point>>>;
}
