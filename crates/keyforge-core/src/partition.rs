//! Query condition partitioning.
//!
//! Splits a query's condition tree into the part the store can answer from
//! an index range read (key conditions) and the part it must evaluate on
//! every item read (filter conditions).
//!
//! Routing rules:
//!
//! - A top-level, non-negated `AND` is decomposed one level: each leaf child
//!   is routed on its own, every nested combinator goes to the filter.
//! - An `OR` or a negated combinator goes to the filter as a whole.
//! - A leaf goes to the key when it is a key-sargable, non-negated operator
//!   on an attribute that some key template uses. The first key definition
//!   in declaration order wins; the leaf is rewritten to address that
//!   physical key and every value is passed through its template.
//! - Anything else goes to the filter unchanged. That includes raw leaves
//!   and leaves whose attribute cannot be recovered from their expression
//!   text.

use std::collections::{HashMap, HashSet};

use keyforge_model::{AttributeValue, KeyDefinition, ModelDefinition};
use tracing::{debug, trace, warn};

use crate::config::PartialKeyPolicy;
use crate::error::{KeyforgeError, KeyforgeResult};
use crate::expression::condition::rename_placeholder;
use crate::expression::{CompareOp, CompiledExpression, Condition, Leaf, LeafKind, LogicalOp, compile};
use crate::key::KeyTemplate;

/// Key and filter halves of a query condition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPartition {
    /// Rewritten leaves addressing physical key attributes.
    pub key_conditions: Vec<Condition>,
    /// Everything evaluated after the key range is read.
    pub filter_conditions: Vec<Condition>,
}

impl QueryPartition {
    /// `KeyConditionExpression`, joined with a plain ` AND `.
    #[must_use]
    pub fn key_expression(&self) -> CompiledExpression {
        compile_key_conditions(&self.key_conditions)
    }

    /// `FilterExpression`, compiled as the conjunction of the filter
    /// conditions.
    #[must_use]
    pub fn filter_expression(&self) -> CompiledExpression {
        compile(&Condition::and(self.filter_conditions.iter().cloned()))
    }
}

/// Join key conditions with ` AND ` and merge their placeholders.
///
/// The store's key grammar admits no `OR` and no nesting, so the fragments
/// are concatenated without parentheses.
#[must_use]
pub fn compile_key_conditions(conditions: &[Condition]) -> CompiledExpression {
    let mut out = CompiledExpression::default();
    let mut fragments = Vec::with_capacity(conditions.len());
    for condition in conditions {
        let compiled = compile(condition);
        out.merge_placeholders(&compiled);
        if !compiled.is_empty() {
            fragments.push(compiled.expression);
        }
    }
    out.expression = fragments.join(" AND ");
    out
}

/// Partition `condition` against the primary key of `model`.
///
/// Without a model there are no key templates and everything is a filter.
pub fn partition(
    condition: &Condition,
    model: Option<&ModelDefinition>,
) -> KeyforgeResult<QueryPartition> {
    match model {
        Some(model) => QueryPartitioner::for_model(model).partition(condition),
        None => Ok(QueryPartition {
            key_conditions: Vec::new(),
            filter_conditions: vec![condition.clone()],
        }),
    }
}

#[derive(Debug)]
struct KeySlot<'m> {
    definition: &'m KeyDefinition,
    template: KeyTemplate,
}

/// Partitions query conditions against one key schema (the table key or one
/// secondary index).
#[derive(Debug)]
pub struct QueryPartitioner<'m> {
    model: &'m str,
    slots: Vec<KeySlot<'m>>,
    policy: PartialKeyPolicy,
}

impl<'m> QueryPartitioner<'m> {
    /// Partition against the table's primary key.
    #[must_use]
    pub fn for_model(model: &'m ModelDefinition) -> Self {
        Self::new(&model.name, model.key.iter())
    }

    /// Partition against a secondary index.
    pub fn for_index(model: &'m ModelDefinition, index: &str) -> KeyforgeResult<Self> {
        let definition = model.index(index).ok_or_else(|| KeyforgeError::UnknownIndex {
            model: model.name.clone(),
            index: index.to_owned(),
        })?;
        Ok(Self::new(&model.name, definition.key.iter()))
    }

    fn new(model: &'m str, keys: impl Iterator<Item = &'m KeyDefinition>) -> Self {
        let slots = keys
            .map(|definition| KeySlot {
                definition,
                template: KeyTemplate::parse(definition.value.as_str()),
            })
            .collect();
        Self {
            model,
            slots,
            policy: PartialKeyPolicy::default(),
        }
    }

    /// Set how shadowed key definitions are handled.
    #[must_use]
    pub fn with_policy(mut self, policy: PartialKeyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Split `condition` into key and filter conditions.
    pub fn partition(&self, condition: &Condition) -> KeyforgeResult<QueryPartition> {
        let mut out = QueryPartition::default();

        let group: Vec<&Condition> = match condition {
            Condition::Combinator(node) if node.op() == LogicalOp::And && !node.is_negated() => {
                node.children().iter().collect()
            }
            Condition::Combinator(_) => {
                trace!(model = self.model, "combinator routed to filter");
                out.filter_conditions.push(condition.clone());
                return Ok(out);
            }
            Condition::Leaf(_) => vec![condition],
        };

        let bindings = equality_bindings(&group);
        let mut pushed: Vec<(String, usize)> = Vec::new();

        for child in group {
            let Condition::Leaf(leaf) = child else {
                trace!(model = self.model, "nested combinator routed to filter");
                out.filter_conditions.push(child.clone());
                continue;
            };
            match self.route(leaf, &bindings)? {
                Some((slot, rewritten)) => {
                    if let Some(attribute) = leaf.attribute_name() {
                        pushed.push((attribute.to_owned(), slot));
                    }
                    out.key_conditions.push(Condition::Leaf(rewritten));
                }
                None => out.filter_conditions.push(child.clone()),
            }
        }

        self.check_shadowed(&pushed, &bindings)?;
        Ok(out)
    }

    fn route(
        &self,
        leaf: &Leaf,
        bindings: &HashMap<String, AttributeValue>,
    ) -> KeyforgeResult<Option<(usize, Leaf)>> {
        if leaf.is_negated() || !leaf.kind().is_key_sargable() {
            trace!(model = self.model, expression = leaf.expression(), "leaf is not key-sargable");
            return Ok(None);
        }
        let Some(attribute) = leaf.attribute_name() else {
            trace!(
                model = self.model,
                expression = leaf.expression(),
                "no single attribute in leaf, routed to filter"
            );
            return Ok(None);
        };
        let Some(slot) = self
            .slots
            .iter()
            .position(|slot| slot.template.references(attribute))
        else {
            return Ok(None);
        };

        let KeySlot { definition, template } = &self.slots[slot];
        let mut values = HashMap::with_capacity(leaf.values().len());
        for (placeholder, value) in leaf.values() {
            let physical = template.resolve_with(|var| {
                if var == attribute {
                    Some(value)
                } else {
                    bindings.get(var)
                }
            })?;
            values.insert(placeholder.clone(), AttributeValue::S(physical));
        }

        let token = format!("#{}", definition.name);
        let rewritten = Leaf {
            expression: rename_placeholder(leaf.expression(), &format!("#{attribute}"), &token),
            names: HashMap::from([(token, definition.name.clone())]),
            values,
            negated: false,
            kind: leaf.kind(),
        };
        debug!(
            model = self.model,
            attribute,
            key = %definition.name,
            expression = %rewritten.expression,
            "pushed into key condition"
        );
        Ok(Some((slot, rewritten)))
    }

    /// Report key definitions that use a pushed attribute, received no key
    /// condition, yet could have been fully constrained by the equalities
    /// present in the query.
    fn check_shadowed(
        &self,
        pushed: &[(String, usize)],
        bindings: &HashMap<String, AttributeValue>,
    ) -> KeyforgeResult<()> {
        let constrained: HashSet<usize> = pushed.iter().map(|(_, slot)| *slot).collect();
        let mut reported: HashSet<usize> = HashSet::new();

        for (attribute, chosen) in pushed {
            let shadowed: Vec<String> = self
                .slots
                .iter()
                .enumerate()
                .filter(|(i, slot)| {
                    *i > *chosen
                        && !constrained.contains(i)
                        && slot.template.references(attribute)
                        && slot.template.variables().all(|var| bindings.contains_key(var))
                })
                .filter(|(i, _)| reported.insert(*i))
                .map(|(_, slot)| slot.definition.name.clone())
                .collect();
            if shadowed.is_empty() {
                continue;
            }

            let chosen = self.slots[*chosen].definition.name.clone();
            match self.policy {
                PartialKeyPolicy::Warn => warn!(
                    model = self.model,
                    attribute = %attribute,
                    chosen = %chosen,
                    ?shadowed,
                    "attribute feeds several keys but only the first received a key condition"
                ),
                PartialKeyPolicy::Reject => {
                    return Err(KeyforgeError::AmbiguousKeyReference {
                        attribute: attribute.clone(),
                        chosen,
                        shadowed,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Attribute values pinned by non-negated `=` leaves of one `AND` group.
fn equality_bindings(group: &[&Condition]) -> HashMap<String, AttributeValue> {
    let mut bindings = HashMap::new();
    for child in group {
        let Condition::Leaf(leaf) = child else {
            continue;
        };
        if leaf.is_negated() || leaf.kind() != LeafKind::Compare(CompareOp::Eq) {
            continue;
        }
        let (Some(attribute), Some(value)) = (leaf.attribute_name(), single_value(leaf)) else {
            continue;
        };
        bindings
            .entry(attribute.to_owned())
            .or_insert_with(|| value.clone());
    }
    bindings
}

fn single_value(leaf: &Leaf) -> Option<&AttributeValue> {
    let mut values = leaf.values().values();
    match (values.next(), values.next()) {
        (Some(value), None) => Some(value),
        _ => None,
    }
}
