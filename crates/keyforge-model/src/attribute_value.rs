//! The store's `AttributeValue` type.
//!
//! On the wire a value is a single-key object such as `{"S": "alice"}`. That
//! is serde's externally tagged layout, so the derive does the work and only
//! the binary variants carry a base64 field codec.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::AttributeType;

/// A single attribute value.
///
/// Numbers are always string-encoded to preserve arbitrary precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// String value.
    S(String),
    /// Number value (string-encoded for arbitrary precision).
    N(String),
    /// Binary value (base64-encoded in JSON).
    #[serde(with = "base64_bytes")]
    B(bytes::Bytes),
    /// String Set.
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    /// Number Set (string-encoded).
    #[serde(rename = "NS")]
    Ns(Vec<String>),
    /// Binary Set (base64-encoded in JSON).
    #[serde(rename = "BS", with = "base64_bytes_list")]
    Bs(Vec<bytes::Bytes>),
    /// Boolean value.
    #[serde(rename = "BOOL")]
    Bool(bool),
    /// Null value.
    #[serde(rename = "NULL")]
    Null(bool),
    /// List of attribute values.
    L(Vec<AttributeValue>),
    /// Map of attribute values.
    M(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Shorthand for a string value.
    #[must_use]
    pub fn s(value: impl Into<String>) -> Self {
        Self::S(value.into())
    }

    /// Shorthand for a number value from anything that prints as a number.
    #[must_use]
    pub fn n(value: impl fmt::Display) -> Self {
        Self::N(value.to_string())
    }

    /// Returns the type tag of this value.
    #[must_use]
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Self::S(_) => AttributeType::S,
            Self::N(_) => AttributeType::N,
            Self::B(_) => AttributeType::B,
            Self::Ss(_) => AttributeType::Ss,
            Self::Ns(_) => AttributeType::Ns,
            Self::Bs(_) => AttributeType::Bs,
            Self::Bool(_) => AttributeType::Bool,
            Self::Null(_) => AttributeType::Null,
            Self::L(_) => AttributeType::L,
            Self::M(_) => AttributeType::M,
        }
    }

    /// Renders a scalar value the way it appears inside a key template.
    ///
    /// Returns `None` for binary values and for every collection type, which
    /// have no canonical textual form.
    #[must_use]
    pub fn to_template_string(&self) -> Option<String> {
        match self {
            Self::S(s) => Some(s.clone()),
            Self::N(n) => Some(n.clone()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null(_) => Some("null".to_owned()),
            Self::B(_)
            | Self::Ss(_)
            | Self::Ns(_)
            | Self::Bs(_)
            | Self::L(_)
            | Self::M(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S(s) => write!(f, "{{S: {s}}}"),
            Self::N(n) => write!(f, "{{N: {n}}}"),
            Self::B(b) => write!(f, "{{B: {} bytes}}", b.len()),
            Self::Ss(v) => write!(f, "{{SS: {v:?}}}"),
            Self::Ns(v) => write!(f, "{{NS: {v:?}}}"),
            Self::Bs(v) => write!(f, "{{BS: {} items}}", v.len()),
            Self::Bool(b) => write!(f, "{{BOOL: {b}}}"),
            Self::Null(b) => write!(f, "{{NULL: {b}}}"),
            Self::L(v) => write!(f, "{{L: {} items}}", v.len()),
            Self::M(m) => write!(f, "{{M: {} keys}}", m.len()),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::S(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

impl From<&String> for AttributeValue {
    fn from(value: &String) -> Self {
        Self::S(value.clone())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AttributeValue {
                fn from(value: $ty) -> Self {
                    Self::N(value.to_string())
                }
            }
        )*
    };
}

number_from!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

impl From<bytes::Bytes> for AttributeValue {
    fn from(value: bytes::Bytes) -> Self {
        Self::B(value)
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(value: Vec<AttributeValue>) -> Self {
        Self::L(value)
    }
}

impl From<HashMap<String, AttributeValue>> for AttributeValue {
    fn from(value: HashMap<String, AttributeValue>) -> Self {
        Self::M(value)
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub(super) fn serialize<S: Serializer>(
        value: &bytes::Bytes,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<bytes::Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map(bytes::Bytes::from)
            .map_err(de::Error::custom)
    }
}

mod base64_bytes_list {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub(super) fn serialize<S: Serializer>(
        value: &[bytes::Bytes],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(value.len()))?;
        for item in value {
            seq.serialize_element(&STANDARD.encode(item))?;
        }
        seq.end()
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<bytes::Bytes>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .into_iter()
            .map(|encoded| {
                STANDARD
                    .decode(encoded)
                    .map(bytes::Bytes::from)
                    .map_err(de::Error::custom)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_serialize_single_key_objects() {
        let json = serde_json::to_string(&AttributeValue::s("hello")).unwrap();
        assert_eq!(json, r#"{"S":"hello"}"#);

        let json = serde_json::to_string(&AttributeValue::from(42)).unwrap();
        assert_eq!(json, r#"{"N":"42"}"#);

        let json = serde_json::to_string(&AttributeValue::Bool(true)).unwrap();
        assert_eq!(json, r#"{"BOOL":true}"#);
    }

    #[test]
    fn test_should_serialize_nested_list() {
        let val = AttributeValue::L(vec![AttributeValue::s("a"), AttributeValue::from(1_u8)]);
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, r#"{"L":[{"S":"a"},{"N":"1"}]}"#);
    }

    #[test]
    fn test_should_encode_binary_as_base64() {
        let val = AttributeValue::B(bytes::Bytes::from_static(b"test data"));
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, r#"{"B":"dGVzdCBkYXRh"}"#);

        let back: AttributeValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, val);
    }

    #[test]
    fn test_should_deserialize_sets() {
        let val: AttributeValue = serde_json::from_str(r#"{"NS":["1","2","3"]}"#).unwrap();
        assert!(matches!(val, AttributeValue::Ns(ref v) if v.len() == 3));

        let val: AttributeValue = serde_json::from_str(r#"{"BS":["AQI="]}"#).unwrap();
        assert!(matches!(val, AttributeValue::Bs(ref v) if v[0] == bytes::Bytes::from_static(&[1, 2])));
    }

    #[test]
    fn test_should_reject_unknown_type_key() {
        let result: Result<AttributeValue, _> = serde_json::from_str(r#"{"X":"1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_should_render_scalars_for_templates() {
        assert_eq!(
            AttributeValue::s("alice").to_template_string().as_deref(),
            Some("alice")
        );
        assert_eq!(
            AttributeValue::from(2.5).to_template_string().as_deref(),
            Some("2.5")
        );
        assert_eq!(
            AttributeValue::Bool(false).to_template_string().as_deref(),
            Some("false")
        );
        assert_eq!(
            AttributeValue::Null(true).to_template_string().as_deref(),
            Some("null")
        );
        assert!(AttributeValue::L(vec![]).to_template_string().is_none());
    }

    #[test]
    fn test_should_report_attribute_type() {
        assert_eq!(AttributeValue::s("x").attribute_type(), AttributeType::S);
        assert_eq!(
            AttributeValue::Ss(vec!["x".to_owned()]).attribute_type(),
            AttributeType::Ss
        );
    }
}
