//! Model definitions: the key templates and attributes of one entity type.
//!
//! A model is declared in JSON as
//!
//! ```text
//! {
//!   "name": "Photo",
//!   "tableName": "app-table",
//!   "key":   { "PK": { "value": "UP#${username}" }, "SK": { "value": "PHOTO#${timestamp}" } },
//!   "index": { "GSI1": { "GSI1PK": { "value": "PHOTO#${photoId}" } } },
//!   "attributes": { "username": { "type": "S", "required": true } }
//! }
//! ```
//!
//! Key definitions are matched in declaration order, so every keyed map is
//! deserialized into an ordered `Vec` rather than a `HashMap`.

use serde::{Deserialize, Serialize};

use crate::types::AttributeType;

/// One physical key attribute and the template its value is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDefinition {
    /// Physical attribute name in the table (e.g. `PK`, `GSI1SK`).
    pub name: String,
    /// Template such as `USER#${username}`.
    pub value: String,
}

impl KeyDefinition {
    /// Create a key definition.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A secondary index and its key definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    /// Index name as known to the store.
    pub name: String,
    /// Key definitions, hash key first.
    pub key: Vec<KeyDefinition>,
}

/// A business attribute of the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    /// Attribute name.
    pub name: String,
    /// Declared type, if any.
    pub attribute_type: Option<AttributeType>,
    /// Whether the attribute must be present on every item.
    pub required: bool,
}

/// Key templates plus attributes of one entity type stored in a shared table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefinition {
    /// Entity name, used in diagnostics.
    pub name: String,
    /// Table the entity lives in.
    pub table_name: String,
    /// Primary key definitions, hash key first.
    #[serde(with = "keyed::keys")]
    pub key: Vec<KeyDefinition>,
    /// Secondary index definitions.
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "keyed::indexes")]
    pub index: Vec<IndexDefinition>,
    /// Business attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "keyed::attributes")]
    pub attributes: Vec<AttributeDefinition>,
}

impl ModelDefinition {
    /// Create an empty model for the given table.
    #[must_use]
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            key: Vec::new(),
            index: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Append a primary key definition.
    #[must_use]
    pub fn with_key(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.key.push(KeyDefinition::new(name, template));
        self
    }

    /// Append a secondary index.
    #[must_use]
    pub fn with_index(mut self, name: impl Into<String>, key: Vec<KeyDefinition>) -> Self {
        self.index.push(IndexDefinition {
            name: name.into(),
            key,
        });
        self
    }

    /// Append an attribute definition.
    #[must_use]
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        attribute_type: Option<AttributeType>,
        required: bool,
    ) -> Self {
        self.attributes.push(AttributeDefinition {
            name: name.into(),
            attribute_type,
            required,
        });
        self
    }

    /// Look up a secondary index by name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexDefinition> {
        self.index.iter().find(|index| index.name == name)
    }

    /// Look up an attribute definition by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// All key definitions of every secondary index, in declaration order.
    pub fn index_keys(&self) -> impl Iterator<Item = &KeyDefinition> {
        self.index.iter().flat_map(|index| index.key.iter())
    }
}

// ---------------------------------------------------------------------------
// Ordered keyed-map codecs
// ---------------------------------------------------------------------------

mod keyed {
    use std::collections::HashSet;
    use std::fmt;
    use std::marker::PhantomData;

    use serde::de::{self, MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{AttributeDefinition, IndexDefinition, KeyDefinition};
    use crate::types::AttributeType;

    /// A JSON object kept in document order.
    struct Entries<V>(Vec<(String, V)>);

    impl<V: Serialize> Serialize for Entries<V> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.0.len()))?;
            for (key, value) in &self.0 {
                map.serialize_entry(key, value)?;
            }
            map.end()
        }
    }

    impl<'de, V: Deserialize<'de>> Deserialize<'de> for Entries<V> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(EntriesVisitor(PhantomData))
        }
    }

    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
        type Value = Entries<V>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a map of uniquely named definitions")
        }

        fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
            let mut seen = HashSet::new();
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, V>()? {
                if !seen.insert(key.clone()) {
                    return Err(de::Error::custom(format!("duplicate definition '{key}'")));
                }
                entries.push((key, value));
            }
            Ok(Entries(entries))
        }
    }

    #[derive(Serialize, Deserialize)]
    struct TemplateBody {
        value: String,
    }

    #[derive(Serialize, Deserialize)]
    struct AttributeBody {
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        attribute_type: Option<AttributeType>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        required: bool,
    }

    fn to_entries(keys: &[KeyDefinition]) -> Entries<TemplateBody> {
        Entries(
            keys.iter()
                .map(|key| {
                    (
                        key.name.clone(),
                        TemplateBody {
                            value: key.value.clone(),
                        },
                    )
                })
                .collect(),
        )
    }

    fn from_entries(entries: Entries<TemplateBody>) -> Vec<KeyDefinition> {
        entries
            .0
            .into_iter()
            .map(|(name, body)| KeyDefinition {
                name,
                value: body.value,
            })
            .collect()
    }

    pub(super) mod keys {
        use super::{Deserialize, Deserializer, Entries, KeyDefinition, Serialize, Serializer};

        pub(in super::super) fn serialize<S: Serializer>(
            keys: &[KeyDefinition],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            super::to_entries(keys).serialize(serializer)
        }

        pub(in super::super) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<KeyDefinition>, D::Error> {
            Entries::<super::TemplateBody>::deserialize(deserializer).map(super::from_entries)
        }
    }

    pub(super) mod indexes {
        use super::{Deserialize, Deserializer, Entries, IndexDefinition, Serialize, Serializer};

        pub(in super::super) fn serialize<S: Serializer>(
            indexes: &[IndexDefinition],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            Entries(
                indexes
                    .iter()
                    .map(|index| (index.name.clone(), super::to_entries(&index.key)))
                    .collect(),
            )
            .serialize(serializer)
        }

        pub(in super::super) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<IndexDefinition>, D::Error> {
            let Entries(entries) =
                Entries::<Entries<super::TemplateBody>>::deserialize(deserializer)?;
            Ok(entries
                .into_iter()
                .map(|(name, key)| IndexDefinition {
                    name,
                    key: super::from_entries(key),
                })
                .collect())
        }
    }

    pub(super) mod attributes {
        use super::{
            AttributeBody, AttributeDefinition, Deserialize, Deserializer, Entries, Serialize,
            Serializer,
        };

        pub(in super::super) fn serialize<S: Serializer>(
            attributes: &[AttributeDefinition],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            Entries(
                attributes
                    .iter()
                    .map(|attr| {
                        (
                            attr.name.clone(),
                            AttributeBody {
                                attribute_type: attr.attribute_type,
                                required: attr.required,
                            },
                        )
                    })
                    .collect(),
            )
            .serialize(serializer)
        }

        pub(in super::super) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<AttributeDefinition>, D::Error> {
            let Entries(entries) = Entries::<AttributeBody>::deserialize(deserializer)?;
            Ok(entries
                .into_iter()
                .map(|(name, body)| AttributeDefinition {
                    name,
                    attribute_type: body.attribute_type,
                    required: body.required,
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHOTO: &str = r#"{
        "name": "Photo",
        "tableName": "app-table",
        "key": {
            "SK": { "value": "PHOTO#${username}#${timestamp}" },
            "PK": { "value": "UP#${username}" }
        },
        "index": {
            "GSI1": {
                "GSI1PK": { "value": "PHOTO#${photoId}" },
                "GSI1SK": { "value": "PHOTO#${photoId}" }
            }
        },
        "attributes": {
            "username": { "type": "S", "required": true },
            "likes": { "type": "N" },
            "caption": {}
        }
    }"#;

    #[test]
    fn test_should_keep_key_declaration_order() {
        let model: ModelDefinition = serde_json::from_str(PHOTO).unwrap();
        let names: Vec<_> = model.key.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, ["SK", "PK"]);
        assert_eq!(model.key[1].value, "UP#${username}");
    }

    #[test]
    fn test_should_parse_indexes_and_attributes() {
        let model: ModelDefinition = serde_json::from_str(PHOTO).unwrap();
        let gsi = model.index("GSI1").unwrap();
        assert_eq!(gsi.key.len(), 2);
        assert_eq!(gsi.key[0].name, "GSI1PK");
        assert_eq!(model.index_keys().count(), 2);

        let username = model.attribute("username").unwrap();
        assert_eq!(username.attribute_type, Some(AttributeType::S));
        assert!(username.required);
        let caption = model.attribute("caption").unwrap();
        assert_eq!(caption.attribute_type, None);
        assert!(!caption.required);
    }

    #[test]
    fn test_should_default_missing_index_and_attributes() {
        let model: ModelDefinition = serde_json::from_str(
            r#"{"name":"User","tableName":"t","key":{"PK":{"value":"USER#${username}"}}}"#,
        )
        .unwrap();
        assert!(model.index.is_empty());
        assert!(model.attributes.is_empty());
    }

    #[test]
    fn test_should_reject_duplicate_key_names() {
        let result: Result<ModelDefinition, _> = serde_json::from_str(
            r#"{"name":"User","tableName":"t","key":{"PK":{"value":"a"},"PK":{"value":"b"}}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_should_serialize_in_declaration_order() {
        let model = ModelDefinition::new("User", "t")
            .with_key("PK", "USER#${username}")
            .with_key("SK", "PROFILE");
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(
            json,
            r#"{"name":"User","tableName":"t","key":{"PK":{"value":"USER#${username}"},"SK":{"value":"PROFILE"}}}"#
        );
        let back: ModelDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
