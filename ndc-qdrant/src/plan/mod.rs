// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query planning: predicate compilation, request planning and explanation

pub mod compiler;
pub mod explain;
pub mod planner;

pub use compiler::ExpressionCompiler;
pub use explain::QueryExplanation;
pub use planner::{QueryPlan, QueryPlanner, RequestKind, DEFAULT_LIMIT};
