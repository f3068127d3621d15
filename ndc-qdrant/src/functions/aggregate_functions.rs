// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Aggregate function implementations

use super::function_trait::{AggregateState, Function, FunctionError, FunctionResult};
use crate::types::Value;
use serde::Serialize;
use std::collections::HashSet;

/// Single-column aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFunction {
    Sum,
    Avg,
}

impl AggregateFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sum" => Some(AggregateFunction::Sum),
            "avg" => Some(AggregateFunction::Avg),
            _ => None,
        }
    }
}

/// Planned aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AggregateSpec {
    StarCount,
    ColumnCount {
        column: String,
        distinct: bool,
    },
    SingleColumn {
        column: String,
        function: AggregateFunction,
    },
}

impl AggregateSpec {
    /// Column the aggregate reads, if any
    pub fn column(&self) -> Option<&str> {
        match self {
            AggregateSpec::StarCount => None,
            AggregateSpec::ColumnCount { column, .. }
            | AggregateSpec::SingleColumn { column, .. } => Some(column),
        }
    }

    pub fn function(&self) -> Box<dyn Function> {
        match self {
            AggregateSpec::StarCount => Box::new(StarCountFunction),
            AggregateSpec::ColumnCount { distinct, .. } => Box::new(ColumnCountFunction {
                distinct: *distinct,
            }),
            AggregateSpec::SingleColumn {
                function: AggregateFunction::Sum,
                ..
            } => Box::new(SumFunction),
            AggregateSpec::SingleColumn {
                function: AggregateFunction::Avg,
                ..
            } => Box::new(AverageFunction),
        }
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// COUNT(*) - counts rows
#[derive(Debug)]
pub struct StarCountFunction;

impl Function for StarCountFunction {
    fn name(&self) -> &str {
        "star_count"
    }

    fn step(
        &self,
        state: AggregateState,
        _value: Option<&Value>,
        _group_size: usize,
    ) -> FunctionResult<AggregateState> {
        match state {
            AggregateState::Count(n) => Ok(AggregateState::Count(n + 1)),
            _ => Ok(AggregateState::Count(1)),
        }
    }
}

/// COUNT(column) - counts non-null values, optionally distinct ones
#[derive(Debug)]
pub struct ColumnCountFunction {
    pub distinct: bool,
}

impl Function for ColumnCountFunction {
    fn name(&self) -> &str {
        if self.distinct {
            "column_count_distinct"
        } else {
            "column_count"
        }
    }

    fn step(
        &self,
        state: AggregateState,
        value: Option<&Value>,
        _group_size: usize,
    ) -> FunctionResult<AggregateState> {
        let value = present(value);
        if self.distinct {
            let mut seen = match state {
                AggregateState::Distinct(seen) => seen,
                _ => HashSet::new(),
            };
            if let Some(value) = value {
                seen.insert(value.clone());
            }
            Ok(AggregateState::Distinct(seen))
        } else {
            let count = match state {
                AggregateState::Count(n) => n,
                _ => 0,
            };
            Ok(AggregateState::Count(count + i64::from(value.is_some())))
        }
    }
}

/// SUM(column) - adds numbers, concatenates strings; nulls are rejected
#[derive(Debug)]
pub struct SumFunction;

impl Function for SumFunction {
    fn name(&self) -> &str {
        "sum"
    }

    fn step(
        &self,
        state: AggregateState,
        value: Option<&Value>,
        _group_size: usize,
    ) -> FunctionResult<AggregateState> {
        let value = present(value).ok_or_else(|| FunctionError::UnsupportedOperation {
            operation: "sum over a null or missing value".to_string(),
        })?;
        let total = match (state, value) {
            (AggregateState::Empty, Value::Integer(_) | Value::Float(_) | Value::String(_)) => {
                value.clone()
            }
            (AggregateState::Sum(Value::Integer(a)), Value::Integer(b)) => a
                .checked_add(*b)
                .map(Value::Integer)
                .unwrap_or(Value::Float(a as f64 + *b as f64)),
            (AggregateState::Sum(acc), Value::Integer(_) | Value::Float(_)) if acc.is_number() => {
                let a = acc.as_f64().unwrap_or_default();
                let b = value.as_f64().unwrap_or_default();
                Value::Float(a + b)
            }
            (AggregateState::Sum(Value::String(mut acc)), Value::String(s)) => {
                acc.push_str(s);
                Value::String(acc)
            }
            (AggregateState::Empty, other) => {
                return Err(FunctionError::InvalidArgumentType {
                    message: format!("sum over {} values", other.type_name()),
                })
            }
            (_, other) => {
                return Err(FunctionError::UnsupportedOperation {
                    operation: format!("sum mixing strings and numbers ({})", other.type_name()),
                })
            }
        };
        Ok(AggregateState::Sum(total))
    }
}

/// AVG(column) - streaming mean over every row of the group
#[derive(Debug)]
pub struct AverageFunction;

impl Function for AverageFunction {
    fn name(&self) -> &str {
        "avg"
    }

    fn step(
        &self,
        state: AggregateState,
        value: Option<&Value>,
        group_size: usize,
    ) -> FunctionResult<AggregateState> {
        let value = present(value).ok_or_else(|| FunctionError::UnsupportedOperation {
            operation: "avg over a null or missing value".to_string(),
        })?;
        let n = value.as_f64().ok_or_else(|| FunctionError::InvalidArgumentType {
            message: format!("avg over {} values", value.type_name()),
        })?;
        let mean = match state {
            AggregateState::Mean(mean) => mean,
            _ => 0.0,
        };
        Ok(AggregateState::Mean(mean + n / group_size.max(1) as f64))
    }
}
