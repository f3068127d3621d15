// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Predicate compilation
//!
//! Translates request expressions into backend filters. Boolean connectives
//! wrap each compiled child as a nested filter; leaf comparisons become a
//! single-condition `must` clause:
//!
//! - `and` / `or` / `not` become `must` / `should` / `must_not`
//! - equality on `id` becomes `has_id`
//! - equality with a non-integral number becomes a closed range, since exact
//!   float matching is not supported by the backend
//! - `like` becomes a full-text match, `gt`/`lt`/`gte`/`lte` a range
//! - `is_null` becomes `is_empty`, `in` becomes `match.any` (or `has_id`)

use crate::ast::{
    BinaryArrayComparisonOperator, BinaryComparisonOperator, ComparisonOp, ComparisonTarget,
    ComparisonValue, Expression, UnaryComparisonOperator, VariableSet,
};
use crate::exec::error::{QueryError, QueryResult};
use crate::transport::{Condition, Filter, Match, PointId, Range};
use crate::types::Value;

/// Compiles expressions against an optional variable binding
#[derive(Debug, Clone, Copy)]
pub struct ExpressionCompiler<'a> {
    variables: Option<&'a VariableSet>,
}

impl<'a> ExpressionCompiler<'a> {
    pub fn new(variables: Option<&'a VariableSet>) -> Self {
        Self { variables }
    }

    pub fn compile(&self, expression: &Expression) -> QueryResult<Filter> {
        match expression {
            Expression::And { expressions } => Ok(Filter::must(self.compile_nested(expressions)?)),
            Expression::Or { expressions } => Ok(Filter::should(self.compile_nested(expressions)?)),
            Expression::Not { expression } => Ok(Filter::must_not(vec![Condition::Nested(
                self.compile(expression)?,
            )])),
            Expression::UnaryComparisonOperator { column, operator } => {
                let key = Self::column_name(column)?;
                match operator {
                    UnaryComparisonOperator::IsNull => {
                        Ok(leaf(Condition::IsEmpty { key: key.to_string() }))
                    }
                    UnaryComparisonOperator::Unsupported => Err(QueryError::NotSupported(
                        "unary comparison operator".to_string(),
                    )),
                }
            }
            Expression::BinaryComparisonOperator {
                column,
                operator,
                value,
            } => self.compile_comparison(column, operator, value),
            Expression::BinaryArrayComparisonOperator {
                column,
                operator,
                values,
            } => self.compile_membership(column, *operator, values),
            Expression::Exists { .. } => Err(QueryError::NotSupported(
                "exists predicates over related collections".to_string(),
            )),
        }
    }

    fn compile_nested(&self, expressions: &[Expression]) -> QueryResult<Vec<Condition>> {
        expressions
            .iter()
            .map(|expression| self.compile(expression).map(Condition::Nested))
            .collect()
    }

    fn compile_comparison(
        &self,
        column: &ComparisonTarget,
        operator: &BinaryComparisonOperator,
        value: &ComparisonValue,
    ) -> QueryResult<Filter> {
        let key = Self::column_name(column)?;
        let op = operator.resolve().ok_or_else(|| {
            QueryError::NotSupported(format!(
                "comparison operator '{}'",
                operator.name()
            ))
        })?;
        let value = self.resolve_value(value)?;

        let condition = match op {
            ComparisonOp::Equal => Self::equality(key, value)?,
            ComparisonOp::Like => match value {
                Value::String(text) => Condition::Field {
                    key: key.to_string(),
                    matcher: Match::Text(text),
                },
                other => {
                    return Err(QueryError::BadRequest(format!(
                        "like on '{}' requires a string, got {}",
                        key,
                        other.type_name()
                    )))
                }
            },
            ComparisonOp::Gt | ComparisonOp::Lt | ComparisonOp::Gte | ComparisonOp::Lte => {
                if key == "id" {
                    return Err(QueryError::NotSupported(
                        "range comparisons on id".to_string(),
                    ));
                }
                let bound = value.as_f64().ok_or_else(|| {
                    QueryError::BadRequest(format!(
                        "range comparison on '{}' requires a number, got {}",
                        key,
                        value.type_name()
                    ))
                })?;
                let mut range = Range::default();
                match op {
                    ComparisonOp::Gt => range.gt = Some(bound),
                    ComparisonOp::Lt => range.lt = Some(bound),
                    ComparisonOp::Gte => range.gte = Some(bound),
                    _ => range.lte = Some(bound),
                }
                Condition::Range {
                    key: key.to_string(),
                    range,
                }
            }
        };
        Ok(leaf(condition))
    }

    fn equality(key: &str, value: Value) -> QueryResult<Condition> {
        if key == "id" {
            return Ok(Condition::HasId(vec![point_id(&value)?]));
        }
        match value {
            Value::Float(f) if !value.is_integral() => Ok(Condition::Range {
                key: key.to_string(),
                range: Range::exactly(f),
            }),
            Value::Integer(_) | Value::Float(_) | Value::String(_) | Value::Bool(_) => {
                Ok(Condition::Field {
                    key: key.to_string(),
                    matcher: Match::Value(value.normalized()),
                })
            }
            other => Err(QueryError::BadRequest(format!(
                "equality on '{}' requires a scalar, got {}",
                key,
                other.type_name()
            ))),
        }
    }

    fn compile_membership(
        &self,
        column: &ComparisonTarget,
        operator: BinaryArrayComparisonOperator,
        values: &[ComparisonValue],
    ) -> QueryResult<Filter> {
        let key = Self::column_name(column)?;
        if operator != BinaryArrayComparisonOperator::In {
            return Err(QueryError::NotSupported(
                "array comparison operator".to_string(),
            ));
        }
        if values.is_empty() {
            return Err(QueryError::BadRequest(format!(
                "in on '{}' requires at least one value",
                key
            )));
        }
        if key == "vector" {
            return Err(QueryError::NotSupported("in on vector".to_string()));
        }

        let scalars = values
            .iter()
            .map(|value| match value {
                ComparisonValue::Scalar { value } => Ok(value.clone().normalized()),
                ComparisonValue::Variable { name } => Err(QueryError::NotSupported(format!(
                    "variable '{}' inside an in list",
                    name
                ))),
                ComparisonValue::Column { .. } => Err(QueryError::NotSupported(
                    "column references inside an in list".to_string(),
                )),
            })
            .collect::<QueryResult<Vec<_>>>()?;

        let condition = if key == "id" {
            Condition::HasId(scalars.iter().map(point_id).collect::<QueryResult<_>>()?)
        } else {
            Condition::Field {
                key: key.to_string(),
                matcher: Match::Any(scalars),
            }
        };
        Ok(leaf(condition))
    }

    fn resolve_value(&self, value: &ComparisonValue) -> QueryResult<Value> {
        match value {
            ComparisonValue::Scalar { value } => Ok(value.clone()),
            ComparisonValue::Variable { name } => {
                let variables = self.variables.ok_or_else(|| {
                    QueryError::BadRequest(format!(
                        "variable '{}' used without variable bindings",
                        name
                    ))
                })?;
                variables.get(name).cloned().ok_or_else(|| {
                    QueryError::BadRequest(format!("variable '{}' is not bound", name))
                })
            }
            ComparisonValue::Column { .. } => Err(QueryError::NotSupported(
                "comparisons against another column".to_string(),
            )),
        }
    }

    fn column_name(target: &ComparisonTarget) -> QueryResult<&str> {
        if target.has_path() {
            return Err(QueryError::NotSupported(format!(
                "relationship path on column '{}'",
                target.name()
            )));
        }
        Ok(target.name())
    }
}

fn leaf(condition: Condition) -> Filter {
    Filter::must(vec![condition])
}

fn point_id(value: &Value) -> QueryResult<PointId> {
    PointId::from_value(value).map_err(QueryError::BadRequest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(expression: &Expression) -> QueryResult<Filter> {
        ExpressionCompiler::new(None).compile(expression)
    }

    fn compiled_json(expression: &Expression) -> serde_json::Value {
        serde_json::to_value(compile(expression).unwrap()).unwrap()
    }

    #[test]
    fn test_integer_equality_is_match_value() {
        assert_eq!(
            compiled_json(&Expression::equal("int", 5i64)),
            json!({"must": [{"key": "int", "match": {"value": 5}}]})
        );
        assert_eq!(
            compiled_json(&Expression::equal("int", 5.0)),
            json!({"must": [{"key": "int", "match": {"value": 5}}]})
        );
    }

    #[test]
    fn test_float_equality_is_closed_range() {
        assert_eq!(
            compiled_json(&Expression::equal("float", 2.5)),
            json!({"must": [{"key": "float", "range": {"gte": 2.5, "lte": 2.5}}]})
        );
    }

    #[test]
    fn test_id_equality_and_membership_use_has_id() {
        assert_eq!(
            compiled_json(&Expression::equal("id", 1i64)),
            json!({"must": [{"has_id": [1]}]})
        );
        assert_eq!(
            compiled_json(&Expression::is_in(
                "id",
                vec![Value::Integer(1), Value::Integer(2)]
            )),
            json!({"must": [{"has_id": [1, 2]}]})
        );
        assert!(matches!(
            compile(&Expression::equal("id", "nope")),
            Err(QueryError::BadRequest(_))
        ));
    }

    #[test]
    fn test_connectives_nest_children() {
        let expression = Expression::or(vec![
            Expression::custom("gt", "int", 5i64),
            Expression::not(Expression::is_null("string")),
            Expression::custom("like", "string", "rust"),
        ]);
        assert_eq!(
            compiled_json(&expression),
            json!({"should": [
                {"must": [{"key": "int", "range": {"gt": 5.0}}]},
                {"must_not": [{"must": [{"is_empty": {"key": "string"}}]}]},
                {"must": [{"key": "string", "match": {"text": "rust"}}]}
            ]})
        );
    }

    #[test]
    fn test_range_operators() {
        for (op, bound) in [("gt", "gt"), ("lt", "lt"), ("gte", "gte"), ("lte", "lte")] {
            assert_eq!(
                compiled_json(&Expression::custom(op, "int", 3i64)),
                json!({"must": [{"key": "int", "range": {bound: 3.0}}]})
            );
        }
        assert!(matches!(
            compile(&Expression::custom("gt", "id", 3i64)),
            Err(QueryError::NotSupported(_))
        ));
        assert!(matches!(
            compile(&Expression::custom("gt", "int", "three")),
            Err(QueryError::BadRequest(_))
        ));
    }

    #[test]
    fn test_membership_rules() {
        assert_eq!(
            compiled_json(&Expression::is_in(
                "string",
                vec![Value::from("a"), Value::from("b")]
            )),
            json!({"must": [{"key": "string", "match": {"any": ["a", "b"]}}]})
        );
        assert!(matches!(
            compile(&Expression::is_in("string", vec![])),
            Err(QueryError::BadRequest(_))
        ));
        assert!(matches!(
            compile(&Expression::is_in("vector", vec![Value::Integer(1)])),
            Err(QueryError::NotSupported(_))
        ));

        let with_variable = Expression::BinaryArrayComparisonOperator {
            column: ComparisonTarget::column("int"),
            operator: BinaryArrayComparisonOperator::In,
            values: vec![ComparisonValue::Variable {
                name: "x".to_string(),
            }],
        };
        assert!(matches!(
            compile(&with_variable),
            Err(QueryError::NotSupported(_))
        ));
    }

    #[test]
    fn test_variables_resolve_against_binding() {
        let expression = Expression::BinaryComparisonOperator {
            column: ComparisonTarget::column("int"),
            operator: BinaryComparisonOperator::Equal,
            value: ComparisonValue::Variable {
                name: "x".to_string(),
            },
        };

        let mut binding = VariableSet::new();
        binding.insert("x".to_string(), Value::Integer(10));
        let filter = ExpressionCompiler::new(Some(&binding))
            .compile(&expression)
            .unwrap();
        assert_eq!(
            serde_json::to_value(filter).unwrap(),
            json!({"must": [{"key": "int", "match": {"value": 10}}]})
        );

        assert!(matches!(
            compile(&expression),
            Err(QueryError::BadRequest(_))
        ));
        let empty = VariableSet::new();
        assert!(matches!(
            ExpressionCompiler::new(Some(&empty)).compile(&expression),
            Err(QueryError::BadRequest(_))
        ));
    }

    #[test]
    fn test_unsupported_shapes() {
        let custom = Expression::custom("regex", "string", "a.*");
        assert!(matches!(compile(&custom), Err(QueryError::NotSupported(_))));

        let column_value = Expression::BinaryComparisonOperator {
            column: ComparisonTarget::column("int"),
            operator: BinaryComparisonOperator::Equal,
            value: ComparisonValue::Column {
                column: ComparisonTarget::column("float"),
            },
        };
        assert!(matches!(
            compile(&column_value),
            Err(QueryError::NotSupported(_))
        ));

        let with_path = Expression::UnaryComparisonOperator {
            column: ComparisonTarget::Column {
                name: "author".to_string(),
                path: vec![json!({"relationship": "author"})],
            },
            operator: UnaryComparisonOperator::IsNull,
        };
        assert!(matches!(
            compile(&with_path),
            Err(QueryError::NotSupported(_))
        ));

        let unary = Expression::UnaryComparisonOperator {
            column: ComparisonTarget::column("int"),
            operator: UnaryComparisonOperator::Unsupported,
        };
        assert!(matches!(compile(&unary), Err(QueryError::NotSupported(_))));

        assert!(matches!(
            compile(&Expression::custom("like", "string", 5i64)),
            Err(QueryError::BadRequest(_))
        ));
        assert!(matches!(
            compile(&Expression::equal("string", Value::Null)),
            Err(QueryError::BadRequest(_))
        ));
    }
}
