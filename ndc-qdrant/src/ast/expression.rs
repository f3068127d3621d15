// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Predicate expressions of the request IR
//!
//! Every node is tagged by a `type` field on the wire, e.g.
//! `{"type": "binary_comparison_operator", "column": {...}, "operator": {...}, "value": {...}}`.

use crate::types::Value;
use serde::{Deserialize, Serialize};

/// Boolean predicate tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    And {
        expressions: Vec<Expression>,
    },
    Or {
        expressions: Vec<Expression>,
    },
    Not {
        expression: Box<Expression>,
    },
    UnaryComparisonOperator {
        column: ComparisonTarget,
        operator: UnaryComparisonOperator,
    },
    BinaryComparisonOperator {
        column: ComparisonTarget,
        operator: BinaryComparisonOperator,
        value: ComparisonValue,
    },
    BinaryArrayComparisonOperator {
        column: ComparisonTarget,
        operator: BinaryArrayComparisonOperator,
        values: Vec<ComparisonValue>,
    },
    /// Related-collection predicate; parsed so it can be rejected cleanly
    Exists {
        #[serde(default)]
        in_collection: serde_json::Value,
        #[serde(default, rename = "where")]
        predicate: Option<Box<Expression>>,
    },
}

impl Expression {
    pub fn and(expressions: Vec<Expression>) -> Self {
        Expression::And { expressions }
    }

    pub fn or(expressions: Vec<Expression>) -> Self {
        Expression::Or { expressions }
    }

    pub fn not(expression: Expression) -> Self {
        Expression::Not {
            expression: Box::new(expression),
        }
    }

    /// `column = value`
    pub fn equal(column: &str, value: impl Into<Value>) -> Self {
        Expression::BinaryComparisonOperator {
            column: ComparisonTarget::column(column),
            operator: BinaryComparisonOperator::Equal,
            value: ComparisonValue::Scalar {
                value: value.into(),
            },
        }
    }

    /// `column <op> value` for a named custom operator such as `gt` or `like`
    pub fn custom(operator: &str, column: &str, value: impl Into<Value>) -> Self {
        Expression::BinaryComparisonOperator {
            column: ComparisonTarget::column(column),
            operator: BinaryComparisonOperator::Custom {
                name: operator.to_string(),
            },
            value: ComparisonValue::Scalar {
                value: value.into(),
            },
        }
    }

    pub fn is_null(column: &str) -> Self {
        Expression::UnaryComparisonOperator {
            column: ComparisonTarget::column(column),
            operator: UnaryComparisonOperator::IsNull,
        }
    }

    /// `column IN (values...)`
    pub fn is_in(column: &str, values: Vec<Value>) -> Self {
        Expression::BinaryArrayComparisonOperator {
            column: ComparisonTarget::column(column),
            operator: BinaryArrayComparisonOperator::In,
            values: values
                .into_iter()
                .map(|value| ComparisonValue::Scalar { value })
                .collect(),
        }
    }
}

/// Column a comparison applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComparisonTarget {
    Column {
        name: String,
        /// Relationship path; must be empty
        #[serde(default)]
        path: Vec<serde_json::Value>,
    },
    RootCollectionColumn {
        name: String,
    },
}

impl ComparisonTarget {
    pub fn column(name: &str) -> Self {
        ComparisonTarget::Column {
            name: name.to_string(),
            path: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ComparisonTarget::Column { name, .. } | ComparisonTarget::RootCollectionColumn { name } => {
                name
            }
        }
    }

    /// True when the target traverses a relationship
    pub fn has_path(&self) -> bool {
        matches!(self, ComparisonTarget::Column { path, .. } if !path.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryComparisonOperator {
    IsNull,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BinaryComparisonOperator {
    Equal,
    Custom { name: String },
}

/// Resolved comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    Like,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl BinaryComparisonOperator {
    /// Resolve to a known operator, `None` for unrecognised custom names
    pub fn resolve(&self) -> Option<ComparisonOp> {
        match self {
            BinaryComparisonOperator::Equal => Some(ComparisonOp::Equal),
            BinaryComparisonOperator::Custom { name } => match name.as_str() {
                "like" => Some(ComparisonOp::Like),
                "gt" => Some(ComparisonOp::Gt),
                "lt" => Some(ComparisonOp::Lt),
                "gte" => Some(ComparisonOp::Gte),
                "lte" => Some(ComparisonOp::Lte),
                _ => None,
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BinaryComparisonOperator::Equal => "equal",
            BinaryComparisonOperator::Custom { name } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryArrayComparisonOperator {
    In,
    #[serde(other)]
    Unsupported,
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComparisonValue {
    Scalar { value: Value },
    Column { column: ComparisonTarget },
    Variable { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_nested_expression() {
        let expr: Expression = serde_json::from_value(json!({
            "type": "and",
            "expressions": [
                {
                    "type": "binary_comparison_operator",
                    "column": {"type": "column", "name": "int"},
                    "operator": {"type": "custom", "name": "gt"},
                    "value": {"type": "scalar", "value": 5}
                },
                {
                    "type": "not",
                    "expression": {
                        "type": "unary_comparison_operator",
                        "column": {"type": "column", "name": "string", "path": []},
                        "operator": "is_null"
                    }
                },
                {
                    "type": "binary_array_comparison_operator",
                    "column": {"type": "root_collection_column", "name": "id"},
                    "operator": "in",
                    "values": [{"type": "variable", "name": "ids"}]
                }
            ]
        }))
        .unwrap();

        let expected = Expression::and(vec![
            Expression::custom("gt", "int", 5i64),
            Expression::not(Expression::is_null("string")),
            Expression::BinaryArrayComparisonOperator {
                column: ComparisonTarget::RootCollectionColumn {
                    name: "id".to_string(),
                },
                operator: BinaryArrayComparisonOperator::In,
                values: vec![ComparisonValue::Variable {
                    name: "ids".to_string(),
                }],
            },
        ]);
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_unknown_operators_parse_as_unsupported() {
        let unary: UnaryComparisonOperator = serde_json::from_value(json!("is_nan")).unwrap();
        assert_eq!(unary, UnaryComparisonOperator::Unsupported);

        let array: BinaryArrayComparisonOperator =
            serde_json::from_value(json!("contains")).unwrap();
        assert_eq!(array, BinaryArrayComparisonOperator::Unsupported);

        let binary: BinaryComparisonOperator =
            serde_json::from_value(json!({"type": "custom", "name": "regex"})).unwrap();
        assert_eq!(binary.resolve(), None);
        assert_eq!(binary.name(), "regex");
    }

    #[test]
    fn test_comparison_target_path() {
        let target: ComparisonTarget = serde_json::from_value(json!({
            "type": "column",
            "name": "author_id",
            "path": [{"relationship": "author"}]
        }))
        .unwrap();
        assert!(target.has_path());
        assert_eq!(target.name(), "author_id");
        assert!(!ComparisonTarget::column("x").has_path());
    }
}
