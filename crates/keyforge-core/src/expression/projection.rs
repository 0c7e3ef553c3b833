//! Projection expressions.

use std::collections::HashMap;

use super::attr::AttrRef;
use super::compiler::CompiledExpression;

/// Render `#a, #b, ...` for the given attributes.
///
/// Duplicates are kept once, in first-seen order. The result carries no value
/// placeholders.
#[must_use]
pub fn projection<'a>(attrs: impl IntoIterator<Item = &'a AttrRef>) -> CompiledExpression {
    let mut names = HashMap::new();
    let mut parts: Vec<String> = Vec::new();
    for attr in attrs {
        let (operand, attr_names) = attr.operand();
        names.extend(attr_names);
        if !parts.contains(&operand) {
            parts.push(operand);
        }
    }
    CompiledExpression {
        expression: parts.join(", "),
        names,
        values: HashMap::new(),
    }
}
