// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query explanation
//!
//! Describes what a request would send to the backend without sending it.

use super::planner::{QueryPlan, RequestKind};
use crate::exec::error::QueryError;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryExplanation {
    /// True when the request planned successfully
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<RequestKind>,
    pub request_count: usize,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl QueryExplanation {
    pub fn from_plan(plan: &QueryPlan) -> Self {
        let kind = match plan.kind() {
            Ok(kind) => kind,
            Err(err) => return Self::from_error(&err),
        };
        let request_count = plan.request_count();
        let plan_json = match serde_json::to_string_pretty(plan) {
            Ok(json) => json,
            Err(err) => return Self::from_error(&QueryError::from(err)),
        };
        Self {
            accepted: true,
            kind: Some(kind),
            request_count,
            summary: format!(
                "{} with {} request(s) against collection '{}'",
                kind, request_count, plan.collection_name
            ),
            plan_json: Some(plan_json),
            error_code: None,
        }
    }

    pub fn from_error(error: &QueryError) -> Self {
        Self {
            accepted: false,
            kind: None,
            request_count: 0,
            summary: error.to_string(),
            plan_json: None,
            error_code: Some(error.kind().code()),
        }
    }

    /// Flatten into the string map carried by an explain response
    pub fn details(&self) -> BTreeMap<String, String> {
        let mut details = BTreeMap::new();
        details.insert("accepted".to_string(), self.accepted.to_string());
        details.insert("summary".to_string(), self.summary.clone());
        details.insert("request_count".to_string(), self.request_count.to_string());
        if let Some(kind) = self.kind {
            details.insert("kind".to_string(), kind.to_string());
        }
        if let Some(plan) = &self.plan_json {
            details.insert("plan".to_string(), plan.clone());
        }
        if let Some(code) = self.error_code {
            details.insert("error_code".to_string(), code.to_string());
        }
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Argument, QueryRequest};
    use crate::catalog::{CollectionConfig, ConnectorConfig};
    use crate::plan::QueryPlanner;

    fn schema() -> ConnectorConfig {
        ConnectorConfig::new().with_collection(CollectionConfig::new("articles", &["int"]))
    }

    #[test]
    fn test_explain_accepted_plan() {
        let schema = schema();
        let request = QueryRequest::new("articles")
            .with_field("Int", "int")
            .with_argument("vector", Argument::literal(vec![0i64, 0]));
        let plan = QueryPlanner::new(&schema).plan(&request).unwrap();
        let explanation = QueryExplanation::from_plan(&plan);

        assert!(explanation.accepted);
        assert_eq!(explanation.kind, Some(RequestKind::Search));
        assert_eq!(explanation.request_count, 1);
        assert_eq!(
            explanation.summary,
            "search batch with 1 request(s) against collection 'articles'"
        );
        let plan_json: serde_json::Value =
            serde_json::from_str(explanation.plan_json.as_ref().unwrap()).unwrap();
        assert_eq!(plan_json["search_requests"][0]["vector"], serde_json::json!([0.0, 0.0]));

        let details = explanation.details();
        assert_eq!(details["accepted"], "true");
        assert_eq!(details["kind"], "search batch");
        assert!(!details.contains_key("error_code"));
    }

    #[test]
    fn test_explain_rejected_request() {
        let err = QueryError::NotSupported("order_by".to_string());
        let explanation = QueryExplanation::from_error(&err);
        assert!(!explanation.accepted);
        assert_eq!(explanation.summary, err.to_string());
        assert_eq!(explanation.error_code, Some("NOT_SUPPORTED"));
        assert_eq!(explanation.details()["error_code"], "NOT_SUPPORTED");
        assert!(explanation.plan_json.is_none());
    }
}
