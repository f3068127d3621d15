// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Request IR: the vendor-neutral query shape accepted by the connector

pub mod expression;
pub mod request;

pub use expression::{
    BinaryArrayComparisonOperator, BinaryComparisonOperator, ComparisonOp, ComparisonTarget,
    ComparisonValue, Expression, UnaryComparisonOperator,
};
pub use request::{Aggregate, Argument, Field, Query, QueryRequest, VariableSet};
