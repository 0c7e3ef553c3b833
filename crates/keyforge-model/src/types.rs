//! Shared enums used by schemas, conditions and request inputs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type tag of an attribute value, as used by `attribute_type(...)` and by
/// schema attribute definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    /// String.
    S,
    /// Number.
    N,
    /// Binary.
    B,
    /// String set.
    #[serde(rename = "SS")]
    Ss,
    /// Number set.
    #[serde(rename = "NS")]
    Ns,
    /// Binary set.
    #[serde(rename = "BS")]
    Bs,
    /// Boolean.
    #[serde(rename = "BOOL")]
    Bool,
    /// Null.
    #[serde(rename = "NULL")]
    Null,
    /// List.
    L,
    /// Map.
    M,
}

impl AttributeType {
    /// The tag as written on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::N => "N",
            Self::B => "B",
            Self::Ss => "SS",
            Self::Ns => "NS",
            Self::Bs => "BS",
            Self::Bool => "BOOL",
            Self::Null => "NULL",
            Self::L => "L",
            Self::M => "M",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which item attributes a write operation returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnValue {
    /// Nothing.
    #[default]
    #[serde(rename = "NONE")]
    None,
    /// The whole item before the write.
    #[serde(rename = "ALL_OLD")]
    AllOld,
    /// Touched attributes before the write.
    #[serde(rename = "UPDATED_OLD")]
    UpdatedOld,
    /// The whole item after the write.
    #[serde(rename = "ALL_NEW")]
    AllNew,
    /// Touched attributes after the write.
    #[serde(rename = "UPDATED_NEW")]
    UpdatedNew,
}

/// Result shape of a query or scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Select {
    /// Every stored attribute.
    #[default]
    #[serde(rename = "ALL_ATTRIBUTES")]
    AllAttributes,
    /// Whatever the index projects.
    #[serde(rename = "ALL_PROJECTED_ATTRIBUTES")]
    AllProjectedAttributes,
    /// The `ProjectionExpression` attributes.
    #[serde(rename = "SPECIFIC_ATTRIBUTES")]
    SpecificAttributes,
    /// No items, only the match count.
    #[serde(rename = "COUNT")]
    Count,
}
