// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Aggregate functions evaluated over projected row groups

mod accumulator;
mod aggregate_functions;
mod function_trait;

pub use accumulator::GroupAccumulator;
pub use aggregate_functions::{
    AggregateFunction, AggregateSpec, AverageFunction, ColumnCountFunction, StarCountFunction,
    SumFunction,
};
pub use function_trait::{AggregateState, Function, FunctionError, FunctionResult};
