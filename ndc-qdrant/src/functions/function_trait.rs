// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Aggregate function trait
//!
//! An aggregate is a fold: each row's value is stepped into an immutable
//! [`AggregateState`], and the final state is rendered as a result value.

use crate::exec::error::QueryError;
use crate::types::Value;
use std::collections::HashSet;

/// Error type for function execution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FunctionError {
    #[error("Invalid argument type: {message}")]
    InvalidArgumentType { message: String },

    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation { operation: String },
}

/// Result type for function execution
pub type FunctionResult<T> = Result<T, FunctionError>;

impl From<FunctionError> for QueryError {
    fn from(error: FunctionError) -> Self {
        QueryError::NotSupported(error.to_string())
    }
}

/// Intermediate state of one aggregate over one row group
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateState {
    /// Nothing accumulated yet; the aggregate is left out of the result
    Empty,
    Count(i64),
    Distinct(HashSet<Value>),
    Sum(Value),
    Mean(f64),
}

impl AggregateState {
    /// Render the state, `None` while still empty
    pub fn finish(self) -> Option<Value> {
        match self {
            AggregateState::Empty => None,
            AggregateState::Count(n) => Some(Value::Integer(n)),
            AggregateState::Distinct(seen) => Some(Value::Integer(seen.len() as i64)),
            AggregateState::Sum(total) => Some(total),
            AggregateState::Mean(mean) => Some(Value::Float(mean)),
        }
    }
}

/// An aggregate function folded over the rows of a group
pub trait Function: Send + Sync {
    /// Get the function name
    fn name(&self) -> &str;

    /// Fold one row's value into `state`
    ///
    /// `value` is `None` when the row has no such column. `group_size` is the
    /// number of rows in the group.
    fn step(
        &self,
        state: AggregateState,
        value: Option<&Value>,
        group_size: usize,
    ) -> FunctionResult<AggregateState>;
}
