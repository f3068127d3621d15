// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query error types

use crate::transport::TransportError;
use thiserror::Error;

/// Errors surfaced by planning and execution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),
}

/// Coarse classification used by callers to map errors onto responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    NotSupported,
    Conflict,
    Upstream,
}

impl ErrorKind {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::NotSupported => "NOT_SUPPORTED",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Upstream => "UPSTREAM_FAILURE",
        }
    }

    /// HTTP status an outer surface should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotSupported => 501,
            ErrorKind::Conflict => 409,
            ErrorKind::Upstream => 502,
        }
    }
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::BadRequest(_) => ErrorKind::BadRequest,
            QueryError::NotSupported(_) => ErrorKind::NotSupported,
            QueryError::Conflict(_) => ErrorKind::Conflict,
            QueryError::Upstream(_) => ErrorKind::Upstream,
        }
    }

    /// The message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            QueryError::BadRequest(msg)
            | QueryError::NotSupported(msg)
            | QueryError::Conflict(msg)
            | QueryError::Upstream(msg) => msg,
        }
    }

    /// True when the caller, not the backend, is at fault
    pub fn is_client_error(&self) -> bool {
        !matches!(self, QueryError::Upstream(_))
    }
}

impl From<TransportError> for QueryError {
    fn from(error: TransportError) -> Self {
        QueryError::Upstream(error.to_string())
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(error: serde_json::Error) -> Self {
        QueryError::BadRequest(format!("Malformed query request: {}", error))
    }
}

pub type QueryResult<T> = Result<T, QueryError>;
