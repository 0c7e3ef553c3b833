//! Condition compiler, key templates and query partitioning for Keyforge.
//!
//! Callers describe reads and writes over business attributes; this crate
//! turns them into the store's expression strings and placeholder maps, and
//! decides which query conditions can be answered from a key range.

pub mod config;
pub mod error;
pub mod expression;
pub mod key;
pub mod partition;
pub mod request;

pub use config::{KeyforgeConfig, PartialKeyPolicy};
pub use error::{KeyforgeError, KeyforgeResult};
pub use expression::{
    AttrRef, AttributeSet, CompiledExpression, Condition, OperatorBuilder, and, compile, not, or,
};
pub use key::{KeySelection, KeyTemplate, extract_template_vars, resolve_keys, resolve_template};
pub use partition::{QueryPartition, QueryPartitioner, compile_key_conditions, partition};
pub use request::{DeleteItem, GetItem, PutItem, Query, Scan, UpdateItem, to_wire_json};
