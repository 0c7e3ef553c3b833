//! Attribute handles.
//!
//! An [`AttrRef`] names a business attribute. It is a plain value: cheap to
//! clone, never mutated, compared by name and path. An [`AttributeSet`] is the
//! table of handles for one model, built once from its definition.

use std::collections::HashMap;
use std::fmt;

use keyforge_model::ModelDefinition;

use crate::error::{KeyforgeError, KeyforgeResult};

/// Symbolic reference to a business attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrRef {
    name: String,
    path: Option<String>,
}

impl AttrRef {
    /// Reference a top-level attribute.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }

    /// Reference a nested document path such as `address.city` or `tags[0]`.
    ///
    /// `name` is the handle's identity and is used to mint value
    /// placeholders; `path` is what the expression dereferences.
    #[must_use]
    pub fn nested(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
        }
    }

    /// The attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The document path, if this handle addresses a nested value.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Render the operand text and the name placeholders it introduces.
    ///
    /// A top-level attribute renders as `#name`. A nested path renders every
    /// dotted segment as its own placeholder and keeps list indexes literal,
    /// so `address.lines[1]` becomes `#address.#lines[1]`.
    pub(crate) fn operand(&self) -> (String, Vec<(String, String)>) {
        let Some(path) = self.path.as_deref() else {
            return (
                format!("#{}", self.name),
                vec![(format!("#{}", self.name), self.name.clone())],
            );
        };

        let mut names = Vec::new();
        let rendered: Vec<String> = path
            .split('.')
            .map(|segment| {
                let (head, indexes) = segment
                    .find('[')
                    .map_or((segment, ""), |at| segment.split_at(at));
                names.push((format!("#{head}"), head.to_owned()));
                format!("#{head}{indexes}")
            })
            .collect();
        (rendered.join("."), names)
    }
}

impl fmt::Display for AttrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => f.write_str(path),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for AttrRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The attribute handles of one model.
#[derive(Debug, Clone, Default)]
pub struct AttributeSet {
    model: String,
    attrs: HashMap<String, AttrRef>,
}

impl AttributeSet {
    /// Build the handle table from a model's attribute definitions.
    #[must_use]
    pub fn from_model(model: &ModelDefinition) -> Self {
        let attrs = model
            .attributes
            .iter()
            .map(|def| (def.name.clone(), AttrRef::new(def.name.clone())))
            .collect();
        Self {
            model: model.name.clone(),
            attrs,
        }
    }

    /// Fetch a handle, failing if the model does not declare the attribute.
    pub fn attr(&self, name: &str) -> KeyforgeResult<AttrRef> {
        self.attrs
            .get(name)
            .cloned()
            .ok_or_else(|| KeyforgeError::UnknownAttribute {
                model: self.model.clone(),
                name: name.to_owned(),
            })
    }

    /// Fetch a handle if declared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrRef> {
        self.attrs.get(name)
    }

    /// Number of declared attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Returns `true` if the model declares no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}
