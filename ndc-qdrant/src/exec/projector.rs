// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Row projection and aggregation
//!
//! Each raw group becomes one [`RowSet`]. Rows are built in point order with
//! keys in request order; aggregates are folded over the rows before columns
//! fetched only for aggregation are stripped.

use super::error::QueryResult;
use super::result::{RawRowGroup, Row, RowSet};
use crate::functions::GroupAccumulator;
use crate::plan::QueryPlan;
use crate::transport::Point;
use crate::types::Value;
use std::collections::HashMap;

pub struct RowProjector<'p> {
    plan: &'p QueryPlan,
    /// First alias carrying each source column
    column_aliases: HashMap<&'p str, &'p str>,
}

impl<'p> RowProjector<'p> {
    pub fn new(plan: &'p QueryPlan) -> Self {
        let mut column_aliases = HashMap::new();
        for (alias, column) in &plan.field_aliases {
            column_aliases
                .entry(column.as_str())
                .or_insert(alias.as_str());
        }
        Self {
            plan,
            column_aliases,
        }
    }

    /// Project every group, in order
    pub fn project(&self, groups: Vec<RawRowGroup>) -> QueryResult<Vec<RowSet>> {
        groups
            .into_iter()
            .map(|group| self.project_group(&group))
            .collect()
    }

    pub fn project_group(&self, group: &RawRowGroup) -> QueryResult<RowSet> {
        let group_size = group.points.len();
        let mut rows: Vec<Row> = group.points.iter().map(|point| self.project_point(point)).collect();

        let accumulator = rows.iter().try_fold(
            GroupAccumulator::new(&self.plan.aggregates, group_size),
            |accumulator, row| {
                accumulator.fold_row(|column| {
                    self.column_aliases
                        .get(column)
                        .and_then(|alias| row.get(alias))
                })
            },
        )?;

        for row in &mut rows {
            for hidden in &self.plan.aggregate_only_columns {
                row.remove(hidden);
            }
        }

        let aggregates = Some(accumulator.finish()).filter(|computed| !computed.is_empty());
        let rows = (self.plan.has_requested_fields() && !rows.is_empty()).then_some(rows);

        log::debug!(
            "projected {} point(s) into {} row(s)",
            group_size,
            rows.as_ref().map_or(0, Vec::len)
        );
        Ok(RowSet { aggregates, rows })
    }

    fn project_point(&self, point: &Point) -> Row {
        let mut row = Row::new();
        for (alias, column) in &self.plan.field_aliases {
            let value = match column.as_str() {
                "id" => Some(Value::from(&point.id)),
                "score" => point.score.map(Value::Float),
                "version" => point.version.map(|version| {
                    i64::try_from(version).map_or(Value::Float(version as f64), Value::Integer)
                }),
                "vector" => Some(point.vector.as_ref().map_or(Value::Null, |v| v.to_value())),
                payload_key => Some(point.payload_value(payload_key).cloned().unwrap_or(Value::Null)),
            };
            if let Some(value) = value {
                row.insert(alias.clone(), value);
            }
        }
        row
    }
}
