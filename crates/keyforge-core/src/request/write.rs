use std::collections::HashMap;

use keyforge_model::input::{DeleteItemInput, PutItemInput, UpdateItemInput};
use keyforge_model::{AttributeValue, ModelDefinition, ReturnValue};
use tracing::debug;

use super::{ConditionChain, attribute_map};
use crate::error::KeyforgeResult;
use crate::expression::{
    AttrRef, CompiledExpression, Condition, OperatorBuilder, UpdateActions, UpdateBuilder,
};
use crate::key::{KeySelection, key_item, resolve_item_keys, resolve_keys};

/// Builds a `PutItem` request: the item plus every physical key it resolves.
#[derive(Debug)]
pub struct PutItem<'m> {
    model: &'m ModelDefinition,
    item: HashMap<String, AttributeValue>,
    chain: ConditionChain,
    return_values: Option<ReturnValue>,
}

impl<'m> PutItem<'m> {
    /// Write `item` under the keys its attributes resolve to.
    pub fn new<K, V>(model: &'m ModelDefinition, item: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        Self {
            model,
            item: attribute_map(item),
            chain: ConditionChain::default(),
            return_values: None,
        }
    }

    /// AND a condition onto the put.
    #[must_use]
    pub fn condition(mut self, build: impl FnOnce(&mut OperatorBuilder) -> Condition) -> Self {
        self.chain.push(build);
        self
    }

    /// Fail if an item with the same primary key already exists.
    #[must_use]
    pub fn if_not_exists(mut self) -> Self {
        if let Some(hash_key) = self.model.key.first() {
            let attr = AttrRef::new(hash_key.name.clone());
            self.chain.push(|ops| ops.not_exists(&attr));
        }
        self
    }

    /// Attributes returned after the write.
    #[must_use]
    pub fn return_values(mut self, return_values: ReturnValue) -> Self {
        self.return_values = Some(return_values);
        self
    }

    /// Resolve the keys and assemble the request.
    ///
    /// The primary key must resolve; indexes whose variables are absent are
    /// left out of the item.
    pub fn build(self) -> KeyforgeResult<PutItemInput> {
        let keys = key_item(resolve_item_keys(self.model, &self.item)?);
        let condition = self.chain.compile();
        debug!(
            model = %self.model.name,
            keys = keys.len(),
            condition = %condition.expression,
            "built put"
        );

        let mut item = self.item;
        item.extend(keys);
        Ok(PutItemInput {
            table_name: self.model.table_name.clone(),
            item,
            condition_expression: condition.expression(),
            expression_attribute_names: condition.names,
            expression_attribute_values: condition.values,
            return_values: self.return_values,
        })
    }
}

/// Builds an `UpdateItem` request.
#[derive(Debug)]
pub struct UpdateItem<'m> {
    model: &'m ModelDefinition,
    attrs: HashMap<String, AttributeValue>,
    chain: ConditionChain,
    actions: UpdateActions,
    return_values: Option<ReturnValue>,
}

impl<'m> UpdateItem<'m> {
    /// Update the item whose primary key resolves from `attrs`.
    pub fn new<K, V>(model: &'m ModelDefinition, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        Self {
            model,
            attrs: attribute_map(attrs),
            chain: ConditionChain::default(),
            actions: UpdateActions::default(),
            return_values: None,
        }
    }

    /// Record update actions. May be called repeatedly.
    #[must_use]
    pub fn update(mut self, record: impl FnOnce(&mut UpdateBuilder<'_>)) -> Self {
        let actions = std::mem::take(&mut self.actions);
        let mut builder = UpdateBuilder::resume(&mut self.chain.ops, actions);
        record(&mut builder);
        self.actions = builder.into_actions();
        self
    }

    /// AND a condition onto the update.
    #[must_use]
    pub fn condition(mut self, build: impl FnOnce(&mut OperatorBuilder) -> Condition) -> Self {
        self.chain.push(build);
        self
    }

    /// Attributes returned after the write.
    #[must_use]
    pub fn return_values(mut self, return_values: ReturnValue) -> Self {
        self.return_values = Some(return_values);
        self
    }

    /// Resolve the key and assemble the request.
    pub fn build(self) -> KeyforgeResult<UpdateItemInput> {
        let key = key_item(resolve_keys(self.model, &self.attrs, KeySelection::Key)?);
        let update = self.actions.compile();
        let condition = self.chain.compile();
        debug!(
            model = %self.model.name,
            update = %update.expression,
            condition = %condition.expression,
            "built update"
        );

        let mut merged = CompiledExpression::default();
        merged.merge_placeholders(&update);
        merged.merge_placeholders(&condition);
        Ok(UpdateItemInput {
            table_name: self.model.table_name.clone(),
            key,
            update_expression: update.expression(),
            condition_expression: condition.expression(),
            expression_attribute_names: merged.names,
            expression_attribute_values: merged.values,
            return_values: self.return_values,
        })
    }
}

/// Builds a `DeleteItem` request.
#[derive(Debug)]
pub struct DeleteItem<'m> {
    model: &'m ModelDefinition,
    attrs: HashMap<String, AttributeValue>,
    chain: ConditionChain,
    return_values: Option<ReturnValue>,
}

impl<'m> DeleteItem<'m> {
    /// Delete the item whose primary key resolves from `attrs`.
    pub fn new<K, V>(model: &'m ModelDefinition, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        Self {
            model,
            attrs: attribute_map(attrs),
            chain: ConditionChain::default(),
            return_values: None,
        }
    }

    /// AND a condition onto the delete.
    #[must_use]
    pub fn condition(mut self, build: impl FnOnce(&mut OperatorBuilder) -> Condition) -> Self {
        self.chain.push(build);
        self
    }

    /// Attributes returned after the write.
    #[must_use]
    pub fn return_values(mut self, return_values: ReturnValue) -> Self {
        self.return_values = Some(return_values);
        self
    }

    /// Resolve the key and assemble the request.
    pub fn build(self) -> KeyforgeResult<DeleteItemInput> {
        let key = key_item(resolve_keys(self.model, &self.attrs, KeySelection::Key)?);
        let condition = self.chain.compile();
        Ok(DeleteItemInput {
            table_name: self.model.table_name.clone(),
            key,
            condition_expression: condition.expression(),
            expression_attribute_names: condition.names,
            expression_attribute_values: condition.values,
            return_values: self.return_values,
        })
    }
}
