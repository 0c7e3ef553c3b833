//! Wire and schema types for Keyforge.
//!
//! This crate holds the value, schema and request types shared by the
//! expression engine and its callers. Everything here is plain data with
//! serde derives; no expression logic lives in this crate.

pub mod attribute_value;
pub mod input;
pub mod schema;
pub mod types;

pub use attribute_value::AttributeValue;
pub use schema::{AttributeDefinition, IndexDefinition, KeyDefinition, ModelDefinition};
pub use types::{AttributeType, ReturnValue, Select};
