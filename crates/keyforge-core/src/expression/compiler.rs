//! Condition tree serialization.

use std::collections::HashMap;

use keyforge_model::AttributeValue;
use tracing::trace;

use super::condition::{Combinator, Condition, Leaf};

/// An expression string plus the placeholder maps it references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledExpression {
    /// Expression text. Empty means "no condition".
    pub expression: String,
    /// Name placeholders (`#a` to `a`).
    pub names: HashMap<String, String>,
    /// Value placeholders (`:a_0` to value).
    pub values: HashMap<String, AttributeValue>,
}

impl CompiledExpression {
    /// Returns `true` if there is no expression text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expression.is_empty()
    }

    /// The expression text, or `None` when empty.
    #[must_use]
    pub fn expression(&self) -> Option<String> {
        (!self.expression.is_empty()).then(|| self.expression.clone())
    }

    /// Fold another fragment's placeholder maps into this one's.
    ///
    /// Only the maps are merged; the expression text is left alone.
    pub fn merge_placeholders(&mut self, other: &CompiledExpression) {
        self.names
            .extend(other.names.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.values
            .extend(other.values.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

/// Serialize a condition tree.
///
/// Empty combinators and empty children are dropped instead of failing, so
/// callers may omit clauses conditionally.
#[must_use]
pub fn compile(root: &Condition) -> CompiledExpression {
    let mut names = HashMap::new();
    let mut values = HashMap::new();
    let expression = fragment(root, &mut names, &mut values);
    trace!(%expression, "compiled condition");
    CompiledExpression {
        expression,
        names,
        values,
    }
}

fn fragment(
    node: &Condition,
    names: &mut HashMap<String, String>,
    values: &mut HashMap<String, AttributeValue>,
) -> String {
    match node {
        Condition::Leaf(leaf) => leaf_fragment(leaf, names, values),
        Condition::Combinator(node) => combinator_fragment(node, names, values),
    }
}

fn leaf_fragment(
    leaf: &Leaf,
    names: &mut HashMap<String, String>,
    values: &mut HashMap<String, AttributeValue>,
) -> String {
    names.extend(leaf.names.iter().map(|(k, v)| (k.clone(), v.clone())));
    values.extend(leaf.values.iter().map(|(k, v)| (k.clone(), v.clone())));
    if leaf.expression.is_empty() {
        return String::new();
    }
    negate_if(leaf.negated, leaf.expression.clone())
}

fn combinator_fragment(
    node: &Combinator,
    names: &mut HashMap<String, String>,
    values: &mut HashMap<String, AttributeValue>,
) -> String {
    let mut parts: Vec<String> = node
        .children
        .iter()
        .map(|child| fragment(child, names, values))
        .filter(|part| !part.is_empty())
        .collect();

    let joined = match parts.len() {
        0 => return String::new(),
        1 => parts.swap_remove(0),
        _ => parts
            .iter()
            .map(|part| format!("({part})"))
            .collect::<Vec<_>>()
            .join(node.op.joiner()),
    };
    negate_if(node.negated, joined)
}

fn negate_if(negated: bool, expression: String) -> String {
    if negated {
        format!("NOT ({expression})")
    } else {
        expression
    }
}
