// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Batch execution of query plans
//!
//! Scroll requests are issued concurrently and joined in request order.
//! Search and recommend requests go out as one batch call each; the backend
//! answers with one result list per request.

use super::error::{QueryError, QueryResult};
use super::result::RawRowGroup;
use crate::plan::{QueryPlan, RequestKind};
use crate::transport::{BatchRequest, Point, Transport};
use futures::future::try_join_all;

pub struct BatchExecutor<'t> {
    transport: &'t dyn Transport,
}

impl<'t> BatchExecutor<'t> {
    pub fn new(transport: &'t dyn Transport) -> Self {
        Self { transport }
    }

    /// Run every request of the plan; group `i` answers request `i`
    pub async fn execute(&self, plan: &QueryPlan) -> QueryResult<Vec<RawRowGroup>> {
        let kind = plan.kind()?;
        let collection = plan.collection_name.as_str();
        log::debug!(
            "dispatching {} request(s) as {} to '{}'",
            plan.request_count(),
            kind,
            collection
        );

        let groups: Vec<Vec<Point>> = match kind {
            RequestKind::Scroll => {
                let calls = plan
                    .scroll_requests
                    .iter()
                    .map(|request| self.transport.scroll(collection, request));
                try_join_all(calls)
                    .await?
                    .into_iter()
                    .map(|response| response.points)
                    .collect()
            }
            RequestKind::Search => {
                let batch = BatchRequest::new(&plan.search_requests);
                let groups = self.transport.search_batch(collection, &batch).await?;
                check_group_count(groups, batch.len())?
            }
            RequestKind::Recommend => {
                let batch = BatchRequest::new(&plan.recommend_requests);
                let groups = self.transport.recommend_batch(collection, &batch).await?;
                check_group_count(groups, batch.len())?
            }
        };

        Ok(groups.into_iter().map(RawRowGroup::from).collect())
    }
}

fn check_group_count(groups: Vec<Vec<Point>>, expected: usize) -> QueryResult<Vec<Vec<Point>>> {
    if groups.len() != expected {
        log::warn!(
            "backend returned {} result list(s) for {} request(s)",
            groups.len(),
            expected
        );
        return Err(QueryError::Upstream(format!(
            "expected {} result list(s), got {}",
            expected,
            groups.len()
        )));
    }
    Ok(groups)
}
