//! Integration tests for Keyforge over a sample photo-sharing schema.
//!
//! The schema (`fixtures/models.json`) declares four entity types sharing one
//! table: `User`, `Photo`, `Like` and `Follow`. Tests build requests through
//! the public API and assert on the wire-level output.
//!
//! Run them with:
//! ```text
//! cargo test -p keyforge-integration
//! ```

use std::sync::{Once, OnceLock};

use anyhow::{Context, Result};
use keyforge_core::AttributeSet;
use keyforge_model::ModelDefinition;

static INIT: Once = Once::new();

const MODELS: &str = include_str!("../fixtures/models.json");

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Parse the sample schema.
pub fn load_models() -> Result<Vec<ModelDefinition>> {
    serde_json::from_str(MODELS).context("failed to parse fixtures/models.json")
}

/// Look up one sample model by name.
///
/// # Panics
///
/// Panics if the fixture does not parse or does not declare `name`.
#[must_use]
pub fn model(name: &str) -> &'static ModelDefinition {
    static LOADED: OnceLock<Vec<ModelDefinition>> = OnceLock::new();

    init_tracing();
    LOADED
        .get_or_init(|| load_models().unwrap_or_else(|e| panic!("{e:#}")))
        .iter()
        .find(|model| model.name == name)
        .unwrap_or_else(|| panic!("fixture declares no model {name}"))
}

/// Attribute handles of one sample model.
#[must_use]
pub fn attrs(name: &str) -> AttributeSet {
    AttributeSet::from_model(model(name))
}

mod test_query;
mod test_schema;
mod test_write;
