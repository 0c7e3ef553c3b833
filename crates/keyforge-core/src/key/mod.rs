//! Key templates and physical key resolution.
//!
//! A model derives each physical key attribute (`PK`, `SK`, `GSI1PK`, ...)
//! from a template over its business attributes. Resolution is pure and
//! all-or-nothing: it either substitutes every variable or fails naming
//! every missing one.

pub mod resolve;
pub mod template;

pub use resolve::{KeySelection, key_item, resolve_index_keys, resolve_item_keys, resolve_keys};
pub use template::{KeyTemplate, Segment, extract_template_vars, resolve_template};
