use std::collections::HashMap;

use keyforge_model::input::{GetItemInput, QueryInput, ScanInput};
use keyforge_model::{AttributeValue, ModelDefinition, Select};
use tracing::debug;

use super::{ConditionChain, attribute_map};
use crate::config::{KeyforgeConfig, PartialKeyPolicy};
use crate::error::{KeyforgeError, KeyforgeResult};
use crate::expression::{AttrRef, CompiledExpression, Condition, OperatorBuilder, projection};
use crate::key::{KeySelection, key_item, resolve_keys};
use crate::partition::QueryPartitioner;

/// Builds a `GetItem` request from business attributes.
#[derive(Debug)]
pub struct GetItem<'m> {
    model: &'m ModelDefinition,
    attrs: HashMap<String, AttributeValue>,
    projection: Vec<AttrRef>,
    consistent_read: Option<bool>,
}

impl<'m> GetItem<'m> {
    /// Fetch the item whose primary key resolves from `attrs`.
    pub fn new<K, V>(model: &'m ModelDefinition, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        Self {
            model,
            attrs: attribute_map(attrs),
            projection: Vec::new(),
            consistent_read: None,
        }
    }

    /// Apply configuration defaults.
    #[must_use]
    pub fn with_config(mut self, config: &KeyforgeConfig) -> Self {
        if config.consistent_read && self.consistent_read.is_none() {
            self.consistent_read = Some(true);
        }
        self
    }

    /// Return only these attributes.
    #[must_use]
    pub fn project<'a>(mut self, attrs: impl IntoIterator<Item = &'a AttrRef>) -> Self {
        self.projection.extend(attrs.into_iter().cloned());
        self
    }

    /// Request a strongly consistent read.
    #[must_use]
    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.consistent_read = Some(consistent);
        self
    }

    /// Resolve the key and assemble the request.
    pub fn build(self) -> KeyforgeResult<GetItemInput> {
        let key = key_item(resolve_keys(self.model, &self.attrs, KeySelection::Key)?);
        let projected = projection(&self.projection);
        Ok(GetItemInput {
            table_name: self.model.table_name.clone(),
            key,
            consistent_read: self.consistent_read,
            projection_expression: projected.expression(),
            expression_attribute_names: projected.names,
        })
    }
}

/// Builds a `Query` request, splitting conditions between the key and the
/// filter.
#[derive(Debug)]
pub struct Query<'m> {
    model: &'m ModelDefinition,
    index: Option<String>,
    chain: ConditionChain,
    projection: Vec<AttrRef>,
    policy: PartialKeyPolicy,
    limit: Option<i32>,
    scan_index_forward: Option<bool>,
    exclusive_start_key: HashMap<String, AttributeValue>,
    select: Option<Select>,
    consistent_read: Option<bool>,
}

impl<'m> Query<'m> {
    /// Query the table's primary key.
    #[must_use]
    pub fn new(model: &'m ModelDefinition) -> Self {
        Self {
            model,
            index: None,
            chain: ConditionChain::default(),
            projection: Vec::new(),
            policy: PartialKeyPolicy::default(),
            limit: None,
            scan_index_forward: None,
            exclusive_start_key: HashMap::new(),
            select: None,
            consistent_read: None,
        }
    }

    /// Apply configuration defaults.
    #[must_use]
    pub fn with_config(mut self, config: &KeyforgeConfig) -> Self {
        self.policy = config.partial_key_policy;
        if config.consistent_read && self.consistent_read.is_none() {
            self.consistent_read = Some(true);
        }
        self
    }

    /// Query a secondary index instead of the primary key.
    #[must_use]
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.index = Some(name.into());
        self
    }

    /// AND a condition onto the query.
    #[must_use]
    pub fn condition(mut self, build: impl FnOnce(&mut OperatorBuilder) -> Condition) -> Self {
        self.chain.push(build);
        self
    }

    /// AND an already-built condition onto the query.
    ///
    /// The condition must come from [`ops`](Self::ops) or carry placeholders
    /// that cannot collide with it.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.chain.push_condition(condition);
        self
    }

    /// The operator builder backing this request.
    pub fn ops(&mut self) -> &mut OperatorBuilder {
        &mut self.chain.ops
    }

    /// Return only these attributes.
    #[must_use]
    pub fn project<'a>(mut self, attrs: impl IntoIterator<Item = &'a AttrRef>) -> Self {
        self.projection.extend(attrs.into_iter().cloned());
        self
    }

    /// Handling of attributes that feed several key templates.
    #[must_use]
    pub fn policy(mut self, policy: PartialKeyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Maximum number of items to evaluate.
    #[must_use]
    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// `false` reads the key range in descending order.
    #[must_use]
    pub fn scan_index_forward(mut self, forward: bool) -> Self {
        self.scan_index_forward = Some(forward);
        self
    }

    /// Continue from a previous page's opaque last evaluated key.
    #[must_use]
    pub fn start_key(mut self, key: HashMap<String, AttributeValue>) -> Self {
        self.exclusive_start_key = key;
        self
    }

    /// Attributes returned in the result.
    #[must_use]
    pub fn select(mut self, select: Select) -> Self {
        self.select = Some(select);
        self
    }

    /// Request a strongly consistent read.
    #[must_use]
    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.consistent_read = Some(consistent);
        self
    }

    /// Partition the conditions and assemble the request.
    ///
    /// Fails with [`KeyforgeError::MissingKeyCondition`] if nothing could be
    /// pushed into the key.
    pub fn build(self) -> KeyforgeResult<QueryInput> {
        let partitioner = match self.index.as_deref() {
            Some(index) => QueryPartitioner::for_index(self.model, index)?,
            None => QueryPartitioner::for_model(self.model),
        }
        .with_policy(self.policy);

        let split = partitioner.partition(&self.chain.combined())?;
        if split.key_conditions.is_empty() {
            return Err(KeyforgeError::MissingKeyCondition {
                model: self.model.name.clone(),
            });
        }

        let key = split.key_expression();
        let filter = split.filter_expression();
        let projected = projection(&self.projection);
        debug!(
            model = %self.model.name,
            index = ?self.index,
            key = %key.expression,
            filter = %filter.expression,
            "built query"
        );

        let mut merged = CompiledExpression::default();
        merged.merge_placeholders(&key);
        merged.merge_placeholders(&filter);
        merged.merge_placeholders(&projected);

        Ok(QueryInput {
            table_name: self.model.table_name.clone(),
            index_name: self.index,
            key_condition_expression: key.expression(),
            filter_expression: filter.expression(),
            projection_expression: projected.expression(),
            expression_attribute_names: merged.names,
            expression_attribute_values: merged.values,
            scan_index_forward: self.scan_index_forward,
            limit: self.limit,
            exclusive_start_key: self.exclusive_start_key,
            select: self.select,
            consistent_read: self.consistent_read,
        })
    }
}

/// Builds a `Scan` request; every condition becomes a filter.
#[derive(Debug)]
pub struct Scan<'m> {
    model: &'m ModelDefinition,
    index: Option<String>,
    chain: ConditionChain,
    projection: Vec<AttrRef>,
    limit: Option<i32>,
    exclusive_start_key: HashMap<String, AttributeValue>,
    segment: Option<(i32, i32)>,
    select: Option<Select>,
    consistent_read: Option<bool>,
}

impl<'m> Scan<'m> {
    /// Scan the whole table.
    #[must_use]
    pub fn new(model: &'m ModelDefinition) -> Self {
        Self {
            model,
            index: None,
            chain: ConditionChain::default(),
            projection: Vec::new(),
            limit: None,
            exclusive_start_key: HashMap::new(),
            segment: None,
            select: None,
            consistent_read: None,
        }
    }

    /// Apply configuration defaults.
    #[must_use]
    pub fn with_config(mut self, config: &KeyforgeConfig) -> Self {
        if config.consistent_read && self.consistent_read.is_none() {
            self.consistent_read = Some(true);
        }
        self
    }

    /// Scan a secondary index instead of the table.
    #[must_use]
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.index = Some(name.into());
        self
    }

    /// AND a filter condition onto the scan.
    #[must_use]
    pub fn condition(mut self, build: impl FnOnce(&mut OperatorBuilder) -> Condition) -> Self {
        self.chain.push(build);
        self
    }

    /// Return only these attributes.
    #[must_use]
    pub fn project<'a>(mut self, attrs: impl IntoIterator<Item = &'a AttrRef>) -> Self {
        self.projection.extend(attrs.into_iter().cloned());
        self
    }

    /// Maximum number of items to evaluate.
    #[must_use]
    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Continue from a previous page's opaque last evaluated key.
    #[must_use]
    pub fn start_key(mut self, key: HashMap<String, AttributeValue>) -> Self {
        self.exclusive_start_key = key;
        self
    }

    /// Scan one segment of a parallel scan.
    #[must_use]
    pub fn segment(mut self, segment: i32, total_segments: i32) -> Self {
        self.segment = Some((segment, total_segments));
        self
    }

    /// Attributes returned in the result.
    #[must_use]
    pub fn select(mut self, select: Select) -> Self {
        self.select = Some(select);
        self
    }

    /// Request a strongly consistent read.
    #[must_use]
    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.consistent_read = Some(consistent);
        self
    }

    /// Compile the filter and assemble the request.
    pub fn build(self) -> KeyforgeResult<ScanInput> {
        if let Some(index) = self.index.as_deref() {
            if self.model.index(index).is_none() {
                return Err(KeyforgeError::UnknownIndex {
                    model: self.model.name.clone(),
                    index: index.to_owned(),
                });
            }
        }

        let filter = self.chain.compile();
        let projected = projection(&self.projection);
        let mut merged = CompiledExpression::default();
        merged.merge_placeholders(&filter);
        merged.merge_placeholders(&projected);

        Ok(ScanInput {
            table_name: self.model.table_name.clone(),
            index_name: self.index,
            filter_expression: filter.expression(),
            projection_expression: projected.expression(),
            expression_attribute_names: merged.names,
            expression_attribute_values: merged.values,
            limit: self.limit,
            exclusive_start_key: self.exclusive_start_key,
            segment: self.segment.map(|(segment, _)| segment),
            total_segments: self.segment.map(|(_, total)| total),
            select: self.select,
            consistent_read: self.consistent_read,
        })
    }
}
