//! Resolution of a model's physical keys from business attributes.

use std::collections::HashMap;

use keyforge_model::{AttributeValue, KeyDefinition, ModelDefinition};
use tracing::debug;

use super::template::KeyTemplate;
use crate::error::{KeyforgeError, KeyforgeResult};

/// Which key definitions of a model to resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeySelection {
    /// The primary key.
    #[default]
    Key,
    /// Every secondary index key.
    Index,
    /// Primary key and every secondary index key.
    Both,
}

impl KeySelection {
    fn definitions(self, model: &ModelDefinition) -> Vec<&KeyDefinition> {
        match self {
            Self::Key => model.key.iter().collect(),
            Self::Index => model.index_keys().collect(),
            Self::Both => model.key.iter().chain(model.index_keys()).collect(),
        }
    }
}

/// Resolve every selected key definition, keyed by physical attribute name.
///
/// All-or-nothing: the first definition that cannot be resolved fails the
/// whole call.
pub fn resolve_keys(
    model: &ModelDefinition,
    attrs: &HashMap<String, AttributeValue>,
    which: KeySelection,
) -> KeyforgeResult<HashMap<String, String>> {
    which
        .definitions(model)
        .into_iter()
        .map(|def| -> KeyforgeResult<(String, String)> {
            let physical = KeyTemplate::parse(def.value.as_str()).resolve(attrs)?;
            Ok((def.name.clone(), physical))
        })
        .collect()
}

/// Resolve the key definitions of one named index.
pub fn resolve_index_keys(
    model: &ModelDefinition,
    index: &str,
    attrs: &HashMap<String, AttributeValue>,
) -> KeyforgeResult<HashMap<String, String>> {
    let definition = model
        .index(index)
        .ok_or_else(|| KeyforgeError::UnknownIndex {
            model: model.name.clone(),
            index: index.to_owned(),
        })?;
    definition
        .key
        .iter()
        .map(|def| -> KeyforgeResult<(String, String)> {
            let physical = KeyTemplate::parse(def.value.as_str()).resolve(attrs)?;
            Ok((def.name.clone(), physical))
        })
        .collect()
}

/// Resolve the primary key and every index whose variables are all present.
///
/// An index missing any variable is left out, the way the store leaves an
/// item out of a sparse index. The primary key is always required.
pub fn resolve_item_keys(
    model: &ModelDefinition,
    attrs: &HashMap<String, AttributeValue>,
) -> KeyforgeResult<HashMap<String, String>> {
    let mut keys = resolve_keys(model, attrs, KeySelection::Key)?;
    for index in &model.index {
        match resolve_index_keys(model, &index.name, attrs) {
            Ok(resolved) => keys.extend(resolved),
            Err(KeyforgeError::MissingTemplateVariable { template, missing }) => {
                debug!(
                    model = %model.name,
                    index = %index.name,
                    %template,
                    ?missing,
                    "skipping sparse index"
                );
            }
            Err(e) => return Err(e),
        }
    }
    Ok(keys)
}

/// Wrap resolved keys as string attribute values.
#[must_use]
pub fn key_item(keys: HashMap<String, String>) -> HashMap<String, AttributeValue> {
    keys.into_iter()
        .map(|(name, value)| (name, AttributeValue::S(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn like_model() -> ModelDefinition {
        ModelDefinition::new("Like", "app-table")
            .with_key("PK", "PL#${photoId}")
            .with_key("SK", "LIKE#${username}")
            .with_index(
                "GSI1",
                vec![
                    KeyDefinition::new("GSI1PK", "PL#${photoId}"),
                    KeyDefinition::new("GSI1SK", "LIKE#${timestamp}"),
                ],
            )
    }

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, AttributeValue> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), AttributeValue::s(*v)))
            .collect()
    }

    #[test]
    fn test_should_resolve_selected_keys() {
        let model = like_model();
        let full = attrs(&[("photoId", "p1"), ("username", "bob"), ("timestamp", "t9")]);

        let key = resolve_keys(&model, &full, KeySelection::Key).unwrap();
        assert_eq!(key.len(), 2);
        assert_eq!(key["PK"], "PL#p1");
        assert_eq!(key["SK"], "LIKE#bob");

        let index = resolve_keys(&model, &full, KeySelection::Index).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index["GSI1SK"], "LIKE#t9");

        assert_eq!(resolve_keys(&model, &full, KeySelection::Both).unwrap().len(), 4);
    }

    #[test]
    fn test_should_fail_without_partial_result() {
        let model = like_model();
        let err = resolve_keys(&model, &attrs(&[("photoId", "p1")]), KeySelection::Key)
            .unwrap_err();
        assert!(matches!(
            err,
            KeyforgeError::MissingTemplateVariable { ref missing, .. } if *missing == ["username"]
        ));
    }

    #[test]
    fn test_should_reject_unknown_index() {
        let err = resolve_index_keys(&like_model(), "GSI9", &HashMap::new()).unwrap_err();
        assert!(matches!(err, KeyforgeError::UnknownIndex { ref index, .. } if index == "GSI9"));
    }

    #[test]
    fn test_should_skip_sparse_index_on_item() {
        let model = like_model();
        let keys =
            resolve_item_keys(&model, &attrs(&[("photoId", "p1"), ("username", "bob")])).unwrap();
        assert_eq!(keys.len(), 2);
        assert!(!keys.contains_key("GSI1PK"));

        let item = key_item(keys);
        assert_eq!(item["PK"], AttributeValue::s("PL#p1"));
    }
}
