//! Keyforge configuration.
//!
//! Configuration is driven by environment variables:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `KEYFORGE_PARTIAL_KEY_POLICY` | `warn` | `warn` or `reject` for attributes feeding several key templates |
//! | `KEYFORGE_CONSISTENT_READ` | `false` | Default `ConsistentRead` for get/query/scan |

use std::env;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::KeyforgeError;

/// What the query partitioner does when a business attribute feeds more
/// than one key template and only the first one receives a key condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartialKeyPolicy {
    /// Route to the first key definition and log every unconstrained one.
    #[default]
    Warn,
    /// Fail with [`KeyforgeError::AmbiguousKeyReference`].
    Reject,
}

impl PartialKeyPolicy {
    /// Returns the configuration string for this policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for PartialKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartialKeyPolicy {
    type Err = KeyforgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "reject" => Ok(Self::Reject),
            other => Err(KeyforgeError::InvalidConfig(format!(
                "unknown partial key policy '{other}' (expected 'warn' or 'reject')"
            ))),
        }
    }
}

/// Global configuration for request building.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyforgeConfig {
    /// Handling of attributes that feed several key templates.
    pub partial_key_policy: PartialKeyPolicy,
    /// Default for `ConsistentRead` on get, query and scan.
    pub consistent_read: bool,
}

impl KeyforgeConfig {
    /// Load configuration from environment variables, falling back to the
    /// default for any value that does not parse.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup_lenient(|key| env::var(key).ok())
    }

    /// Load configuration from environment variables, rejecting values that
    /// do not parse.
    pub fn try_from_env() -> Result<Self, KeyforgeError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, KeyforgeError> {
        let mut config = Self::default();
        if let Some(v) = lookup("KEYFORGE_PARTIAL_KEY_POLICY") {
            config.partial_key_policy = v.parse()?;
        }
        config.consistent_read = env_bool(lookup("KEYFORGE_CONSISTENT_READ"), false);
        Ok(config)
    }

    /// Each variable is checked on its own; a bad one is logged and dropped
    /// so the others still apply.
    fn from_lookup_lenient(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let validated = |key: &str| {
            let value = lookup(key)?;
            match Self::from_lookup(|k| (k == key).then(|| value.clone())) {
                Ok(_) => Some(value),
                Err(e) => {
                    warn!(error = %e, key, "ignoring invalid configuration value");
                    None
                }
            }
        };
        Self::from_lookup(validated).unwrap_or_default()
    }
}

fn env_bool(value: Option<String>, default: bool) -> bool {
    value.map_or(default, |v| {
        matches!(v.as_str(), "1" | "true" | "yes" | "TRUE" | "YES")
    })
}
