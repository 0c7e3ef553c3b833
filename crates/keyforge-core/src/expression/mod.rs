//! Condition, update and projection expressions.
//!
//! Callers build conditions from [`AttrRef`] handles through an
//! [`OperatorBuilder`], combine them with [`and`], [`or`] and [`not`], and
//! serialize the tree with [`compile`]:
//!
//! 1. **Leaves**: each operator call renders one fragment and mints fresh
//!    value placeholders from the builder's private counter.
//! 2. **Trees**: combinators group leaves; negation is a flag on any node.
//! 3. **Compilation**: a post-order walk parenthesizes and joins fragments and
//!    merges every placeholder map.

pub mod attr;
pub mod compiler;
pub mod condition;
pub mod operator;
pub mod projection;
pub mod update;

pub use attr::{AttrRef, AttributeSet};
pub use compiler::{CompiledExpression, compile};
pub use condition::{
    Combinator, CompareOp, Condition, Leaf, LeafKind, LogicalOp, and, not, or,
};
pub use operator::{OperatorBuilder, PlaceholderCounter, SizeBuilder};
pub use projection::projection;
pub use update::{UpdateActions, UpdateBuilder};
