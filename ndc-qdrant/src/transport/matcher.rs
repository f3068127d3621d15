// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Filter evaluation against stored points

use super::filter::{Condition, Filter, Match, Range};
use super::types::Point;
use crate::types::Value;

/// Evaluates backend filters in process
pub struct FilterMatcher;

impl FilterMatcher {
    /// Check a point against a filter
    pub fn matches(point: &Point, filter: &Filter) -> bool {
        let must = filter
            .must
            .as_ref()
            .map_or(true, |conditions| conditions.iter().all(|c| Self::holds(point, c)));
        let should = match &filter.should {
            Some(conditions) if !conditions.is_empty() => {
                conditions.iter().any(|c| Self::holds(point, c))
            }
            _ => true,
        };
        let must_not = filter
            .must_not
            .as_ref()
            .map_or(true, |conditions| !conditions.iter().any(|c| Self::holds(point, c)));
        must && should && must_not
    }

    fn holds(point: &Point, condition: &Condition) -> bool {
        match condition {
            Condition::Field { key, matcher } => point
                .payload_value(key)
                .map_or(false, |actual| Self::field_matches(actual, matcher)),
            Condition::Range { key, range } => point
                .payload_value(key)
                .map_or(false, |actual| Self::in_range(actual, range)),
            Condition::HasId(ids) => ids.contains(&point.id),
            Condition::IsEmpty { key } => match point.payload_value(key) {
                None | Some(Value::Null) => true,
                Some(Value::List(items)) => items.is_empty(),
                Some(_) => false,
            },
            Condition::Nested(filter) => Self::matches(point, filter),
        }
    }

    fn field_matches(actual: &Value, matcher: &Match) -> bool {
        // Array payloads match when any element does
        if let Value::List(items) = actual {
            return items.iter().any(|item| Self::field_matches(item, matcher));
        }
        match matcher {
            Match::Value(expected) => actual == expected,
            Match::Text(fragment) => actual
                .as_str()
                .map_or(false, |text| text.contains(fragment.as_str())),
            Match::Any(values) => values.iter().any(|expected| actual == expected),
        }
    }

    fn in_range(actual: &Value, range: &Range) -> bool {
        match actual {
            Value::List(items) => items.iter().any(|item| Self::in_range(item, range)),
            other => other.as_f64().map_or(false, |n| range.contains(n)),
        }
    }
}
