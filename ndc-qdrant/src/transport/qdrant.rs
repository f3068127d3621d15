// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! HTTP transport for a Qdrant server
//!
//! Every call is a JSON `POST` to `/collections/{name}/points/{action}`; the
//! server wraps successful results in a `{"result": ...}` envelope and errors
//! in `{"status": {"error": ...}}`.

use super::error::{TransportError, TransportResult};
use super::traits::Transport;
use super::types::{
    BatchRequest, Point, RecommendRequest, ScrollRequest, ScrollResponse, SearchRequest,
};
use crate::catalog::ConnectorConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const API_KEY_HEADER: &str = "api-key";

#[derive(Deserialize)]
struct ResultEnvelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    status: ErrorStatus,
}

#[derive(Deserialize)]
struct ErrorStatus {
    error: String,
}

/// Transport backed by the Qdrant REST API
pub struct QdrantTransport {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl QdrantTransport {
    pub fn new(url: &str, api_key: Option<String>) -> TransportResult<Self> {
        Self::with_timeout(url, api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> TransportResult<Self> {
        let base_url = url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(TransportError::InvalidRequest(
                "Qdrant URL must not be empty".to_string(),
            ));
        }
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            TransportError::Unavailable(format!("failed to initialize HTTP client: {}", e))
        })?;
        Ok(Self {
            base_url,
            api_key: api_key.filter(|key| !key.is_empty()),
            http,
        })
    }

    /// Connect to the endpoint named by the configuration
    pub fn from_config(config: &ConnectorConfig) -> TransportResult<Self> {
        Self::new(&config.qdrant_url, config.qdrant_api_key.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, collection: &str, action: &str) -> String {
        format!(
            "{}/collections/{}/points/{}",
            self.base_url, collection, action
        )
    }

    async fn post<B, R>(&self, collection: &str, action: &str, body: &B) -> TransportResult<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(collection, action);
        log::debug!("POST {}", url);

        let mut request = self.http.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        let response = request.send().await.map_err(|err| {
            TransportError::Unavailable(format!("request to {} failed: {}", url, err))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|err| {
            TransportError::Protocol(format!(
                "response read failed (status {}): {}",
                status, err
            ))
        })?;
        decode_response(status, collection, &text)
    }
}

fn decode_response<R: DeserializeOwned>(
    status: StatusCode,
    collection: &str,
    body: &str,
) -> TransportResult<R> {
    if status.is_success() {
        return serde_json::from_str::<ResultEnvelope<R>>(body)
            .map(|envelope| envelope.result)
            .map_err(|err| TransportError::Protocol(format!("response decode failed: {}", err)));
    }

    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.status.error)
        .unwrap_or_else(|_| body.to_string());
    log::warn!("Qdrant answered {} for '{}': {}", status, collection, message);

    Err(match status {
        StatusCode::NOT_FOUND => TransportError::CollectionNotFound(collection.to_string()),
        s if s.is_client_error() => {
            TransportError::InvalidRequest(format!("status {}: {}", s, message))
        }
        s => TransportError::Unavailable(format!("status {}: {}", s, message)),
    })
}

#[async_trait]
impl Transport for QdrantTransport {
    async fn scroll(
        &self,
        collection: &str,
        request: &ScrollRequest,
    ) -> TransportResult<ScrollResponse> {
        self.post(collection, "scroll", request).await
    }

    async fn search(
        &self,
        collection: &str,
        request: &SearchRequest,
    ) -> TransportResult<Vec<Point>> {
        self.post(collection, "search", request).await
    }

    async fn search_batch(
        &self,
        collection: &str,
        batch: &BatchRequest<'_, SearchRequest>,
    ) -> TransportResult<Vec<Vec<Point>>> {
        self.post(collection, "search/batch", batch).await
    }

    async fn recommend_batch(
        &self,
        collection: &str,
        batch: &BatchRequest<'_, RecommendRequest>,
    ) -> TransportResult<Vec<Vec<Point>>> {
        self.post(collection, "recommend/batch", batch).await
    }
}
