//! Per-operation request builders.
//!
//! Each builder owns exactly one [`OperatorBuilder`] for its whole chain, so
//! every condition, update and key expression attached to one request draws
//! value placeholders from the same counter. Repeated `.condition(...)` calls
//! are combined with `AND`.

mod read;
mod write;

use std::collections::HashMap;

use anyhow::Context;
use keyforge_model::AttributeValue;
use serde::Serialize;

use crate::error::KeyforgeResult;
use crate::expression::{CompiledExpression, Condition, LogicalOp, OperatorBuilder, compile};

pub use read::{GetItem, Query, Scan};
pub use write::{DeleteItem, PutItem, UpdateItem};

/// Serialize a request input to the store's JSON wire form.
pub fn to_wire_json<T: Serialize>(input: &T) -> KeyforgeResult<String> {
    let json = serde_json::to_string(input).context("failed to serialize request input")?;
    Ok(json)
}

/// Conditions attached to one request plus the counter they share.
#[derive(Debug, Default)]
pub(crate) struct ConditionChain {
    pub(crate) ops: OperatorBuilder,
    conditions: Vec<Condition>,
}

impl ConditionChain {
    pub(crate) fn push(&mut self, build: impl FnOnce(&mut OperatorBuilder) -> Condition) {
        let condition = build(&mut self.ops);
        self.conditions.push(condition);
    }

    pub(crate) fn push_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    /// The conjunction of every attached condition, flattened one level.
    ///
    /// A single condition comes back unwrapped, and the children of a
    /// non-negated `AND` are spliced into the top-level group. Anything
    /// deeper keeps its nesting.
    pub(crate) fn combined(&self) -> Condition {
        let mut group: Vec<Condition> = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            match condition {
                Condition::Combinator(node)
                    if node.op() == LogicalOp::And && !node.is_negated() =>
                {
                    group.extend(node.children().iter().cloned());
                }
                other => group.push(other.clone()),
            }
        }
        if group.len() == 1 {
            if let Some(only) = group.pop() {
                return only;
            }
        }
        Condition::and(group)
    }

    pub(crate) fn compile(&self) -> CompiledExpression {
        compile(&self.combined())
    }
}

/// Collect `(name, value)` pairs into an attribute map.
pub(crate) fn attribute_map<K, V>(
    pairs: impl IntoIterator<Item = (K, V)>,
) -> HashMap<String, AttributeValue>
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
