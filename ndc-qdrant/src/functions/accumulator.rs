// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Per-group aggregate accumulation

use super::aggregate_functions::AggregateSpec;
use super::function_trait::{AggregateState, Function};
use crate::exec::error::QueryResult;
use crate::types::Value;
use indexmap::IndexMap;

struct Slot<'p> {
    alias: &'p str,
    column: Option<&'p str>,
    function: Box<dyn Function>,
    state: AggregateState,
}

/// Folds the rows of one group through every requested aggregate
pub struct GroupAccumulator<'p> {
    slots: Vec<Slot<'p>>,
    group_size: usize,
}

impl<'p> GroupAccumulator<'p> {
    pub fn new(aggregates: &'p IndexMap<String, AggregateSpec>, group_size: usize) -> Self {
        let slots = aggregates
            .iter()
            .map(|(alias, spec)| Slot {
                alias,
                column: spec.column(),
                function: spec.function(),
                state: AggregateState::Empty,
            })
            .collect();
        Self { slots, group_size }
    }

    /// Step one row into every aggregate; `lookup` reads a column of the row
    pub fn fold_row<'r>(mut self, lookup: impl Fn(&str) -> Option<&'r Value>) -> QueryResult<Self> {
        for slot in &mut self.slots {
            let value = slot.column.and_then(&lookup);
            let state = std::mem::replace(&mut slot.state, AggregateState::Empty);
            slot.state = slot.function.step(state, value, self.group_size)?;
        }
        Ok(self)
    }

    /// Results in request order, leaving out aggregates that never stepped
    pub fn finish(self) -> IndexMap<String, Value> {
        self.slots
            .into_iter()
            .filter_map(|slot| {
                let alias = slot.alias.to_string();
                slot.state.finish().map(|value| (alias, value))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
