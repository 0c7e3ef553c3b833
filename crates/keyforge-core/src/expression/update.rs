//! Update expression builder.
//!
//! Actions are collected per clause and emitted in the order
//! `SET`, `REMOVE`, `ADD`, `DELETE`. Value placeholders come from the
//! borrowed [`OperatorBuilder`], so an update and the condition guarding it
//! never mint the same placeholder.

use std::collections::HashMap;

use keyforge_model::AttributeValue;

use super::attr::AttrRef;
use super::compiler::CompiledExpression;
use super::operator::OperatorBuilder;

/// Update actions collected so far, grouped by clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateActions {
    set: Vec<String>,
    remove: Vec<String>,
    add: Vec<String>,
    delete: Vec<String>,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl UpdateActions {
    /// Returns `true` if no action was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
            && self.remove.is_empty()
            && self.add.is_empty()
            && self.delete.is_empty()
    }

    /// Render the `UpdateExpression`.
    #[must_use]
    pub fn compile(&self) -> CompiledExpression {
        let clauses: Vec<String> = [
            ("SET", &self.set),
            ("REMOVE", &self.remove),
            ("ADD", &self.add),
            ("DELETE", &self.delete),
        ]
        .into_iter()
        .filter(|(_, parts)| !parts.is_empty())
        .map(|(keyword, parts)| format!("{keyword} {}", parts.join(", ")))
        .collect();

        CompiledExpression {
            expression: clauses.join(" "),
            names: self.names.clone(),
            values: self.values.clone(),
        }
    }
}

/// Records update actions against attribute handles.
#[derive(Debug)]
pub struct UpdateBuilder<'a> {
    ops: &'a mut OperatorBuilder,
    actions: UpdateActions,
}

impl<'a> UpdateBuilder<'a> {
    /// Start an empty update that mints placeholders from `ops`.
    pub fn new(ops: &'a mut OperatorBuilder) -> Self {
        Self::resume(ops, UpdateActions::default())
    }

    /// Continue recording into previously collected actions.
    pub fn resume(ops: &'a mut OperatorBuilder, actions: UpdateActions) -> Self {
        Self { ops, actions }
    }

    /// `SET #a = :a_n`
    pub fn set(&mut self, attr: &AttrRef, value: impl Into<AttributeValue>) -> &mut Self {
        let operand = self.operand(attr);
        let ph = self.bind(attr, value.into());
        self.actions.set.push(format!("{operand} = {ph}"));
        self
    }

    /// `SET #a = if_not_exists(#a, :a_n)`
    pub fn set_if_not_exists(
        &mut self,
        attr: &AttrRef,
        value: impl Into<AttributeValue>,
    ) -> &mut Self {
        let operand = self.operand(attr);
        let ph = self.bind(attr, value.into());
        self.actions
            .set
            .push(format!("{operand} = if_not_exists({operand}, {ph})"));
        self
    }

    /// `SET #a = #a + :a_n`
    pub fn increment(&mut self, attr: &AttrRef, by: impl Into<AttributeValue>) -> &mut Self {
        self.arithmetic(attr, '+', by.into())
    }

    /// `SET #a = #a - :a_n`
    pub fn decrement(&mut self, attr: &AttrRef, by: impl Into<AttributeValue>) -> &mut Self {
        self.arithmetic(attr, '-', by.into())
    }

    /// `SET #a = list_append(#a, :a_n)`
    pub fn list_append<V>(&mut self, attr: &AttrRef, items: impl IntoIterator<Item = V>) -> &mut Self
    where
        V: Into<AttributeValue>,
    {
        let operand = self.operand(attr);
        let list = AttributeValue::L(items.into_iter().map(Into::into).collect());
        let ph = self.bind(attr, list);
        self.actions
            .set
            .push(format!("{operand} = list_append({operand}, {ph})"));
        self
    }

    /// `REMOVE #a`
    pub fn remove(&mut self, attr: &AttrRef) -> &mut Self {
        let operand = self.operand(attr);
        self.actions.remove.push(operand);
        self
    }

    /// `ADD #a :a_n` (numbers and sets)
    pub fn add(&mut self, attr: &AttrRef, value: impl Into<AttributeValue>) -> &mut Self {
        let operand = self.operand(attr);
        let ph = self.bind(attr, value.into());
        self.actions.add.push(format!("{operand} {ph}"));
        self
    }

    /// `DELETE #a :a_n` (set elements)
    pub fn delete(&mut self, attr: &AttrRef, subset: impl Into<AttributeValue>) -> &mut Self {
        let operand = self.operand(attr);
        let ph = self.bind(attr, subset.into());
        self.actions.delete.push(format!("{operand} {ph}"));
        self
    }

    /// Render the `UpdateExpression` recorded so far.
    #[must_use]
    pub fn build(&self) -> CompiledExpression {
        self.actions.compile()
    }

    /// Release the borrowed operator builder and keep the actions.
    #[must_use]
    pub fn into_actions(self) -> UpdateActions {
        self.actions
    }

    fn arithmetic(&mut self, attr: &AttrRef, sign: char, by: AttributeValue) -> &mut Self {
        let operand = self.operand(attr);
        let ph = self.bind(attr, by);
        self.actions
            .set
            .push(format!("{operand} = {operand} {sign} {ph}"));
        self
    }

    fn operand(&mut self, attr: &AttrRef) -> String {
        let (operand, names) = attr.operand();
        self.actions.names.extend(names);
        operand
    }

    fn bind(&mut self, attr: &AttrRef, value: AttributeValue) -> String {
        let ph = self.ops.counter_mut().mint(attr.name(), "");
        self.actions.values.insert(ph.clone(), value);
        ph
    }
}
