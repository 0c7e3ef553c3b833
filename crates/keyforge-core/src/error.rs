//! Error types for the Keyforge core.
//!
//! Every error here is synchronous and deterministic: the core performs no
//! I/O, so nothing is retryable.

use keyforge_model::AttributeType;

/// Core error type.
#[derive(Debug, thiserror::Error)]
pub enum KeyforgeError {
    /// A key template references variables the caller did not supply.
    #[error("missing template variable(s) {} for key template \"{template}\"", .missing.join(", "))]
    MissingTemplateVariable {
        /// The template being resolved.
        template: String,
        /// Every variable that was absent, in template order.
        missing: Vec<String>,
    },

    /// A template variable was bound to a value with no textual form.
    #[error(
        "template variable '{variable}' has type {attribute_type} which cannot be substituted into key template \"{template}\""
    )]
    UnsupportedTemplateValue {
        /// The template being resolved.
        template: String,
        /// The offending variable.
        variable: String,
        /// The type of the supplied value.
        attribute_type: AttributeType,
    },

    /// An attribute name is not declared on the model.
    #[error("model {model} has no attribute '{name}'")]
    UnknownAttribute {
        /// Model name.
        model: String,
        /// Requested attribute name.
        name: String,
    },

    /// An index name is not declared on the model.
    #[error("model {model} has no index '{index}'")]
    UnknownIndex {
        /// Model name.
        model: String,
        /// Requested index name.
        index: String,
    },

    /// A business attribute feeds several key templates but only the first
    /// one received a key condition.
    #[error(
        "attribute '{attribute}' is pushed into key '{chosen}' but also feeds unconstrained key(s) {}",
        .shadowed.join(", ")
    )]
    AmbiguousKeyReference {
        /// Business attribute name.
        attribute: String,
        /// Physical key that received the condition.
        chosen: String,
        /// Physical keys left without any key condition.
        shadowed: Vec<String>,
    },

    /// A query produced no key condition at all.
    #[error("query on {model} has no condition on any key attribute")]
    MissingKeyCondition {
        /// Model name.
        model: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for Keyforge operations.
pub type KeyforgeResult<T> = Result<T, KeyforgeError>;
