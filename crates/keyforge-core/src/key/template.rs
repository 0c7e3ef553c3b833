//! Key templates such as `PHOTO#${username}#${timestamp}`.

use std::collections::HashMap;
use std::fmt;

use keyforge_model::AttributeValue;

use crate::error::{KeyforgeError, KeyforgeResult};

/// A parsed piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied verbatim.
    Literal(String),
    /// A `${name}` marker.
    Variable(String),
}

/// A parsed key template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl KeyTemplate {
    /// Parse a template. Parsing never fails: an unterminated `${` or an
    /// empty `${}` is kept as literal text.
    #[must_use]
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source.as_str();

        while let Some(start) = rest.find("${") {
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) if end > 0 && !after[..end].contains('{') => {
                    literal.push_str(&rest[..start]);
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Variable(after[..end].to_owned()));
                    rest = &after[end + 1..];
                }
                Some(_) => {
                    literal.push_str(&rest[..start + 2]);
                    rest = after;
                }
                None => break,
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { source, segments }
    }

    /// The template text as declared.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parsed segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Variable names in order of appearance, repeats included.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns `true` if the template uses the variable `name`.
    #[must_use]
    pub fn references(&self, name: &str) -> bool {
        self.variables().any(|var| var == name)
    }

    /// Substitute every variable from `attrs`.
    pub fn resolve(&self, attrs: &HashMap<String, AttributeValue>) -> KeyforgeResult<String> {
        self.resolve_with(|name| attrs.get(name))
    }

    /// Substitute every variable using `lookup`.
    ///
    /// Fails with [`KeyforgeError::MissingTemplateVariable`] naming every
    /// absent variable, or with [`KeyforgeError::UnsupportedTemplateValue`]
    /// if a value has no textual form. Never returns a partial key.
    pub fn resolve_with<'v>(
        &self,
        lookup: impl Fn(&str) -> Option<&'v AttributeValue>,
    ) -> KeyforgeResult<String> {
        let mut out = String::with_capacity(self.source.len());
        let mut missing: Vec<String> = Vec::new();
        let mut unsupported = None;

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => match lookup(name) {
                    None => {
                        if !missing.contains(name) {
                            missing.push(name.clone());
                        }
                    }
                    Some(value) => match value.to_template_string() {
                        Some(text) => out.push_str(&text),
                        None if unsupported.is_none() => {
                            unsupported = Some(KeyforgeError::UnsupportedTemplateValue {
                                template: self.source.clone(),
                                variable: name.clone(),
                                attribute_type: value.attribute_type(),
                            });
                        }
                        None => {}
                    },
                },
            }
        }

        if !missing.is_empty() {
            return Err(KeyforgeError::MissingTemplateVariable {
                template: self.source.clone(),
                missing,
            });
        }
        match unsupported {
            Some(err) => Err(err),
            None => Ok(out),
        }
    }

    /// Recover variable bindings from a physical key.
    ///
    /// Literals must match exactly; each variable extends up to the next
    /// occurrence of the literal that follows it, or to the end of the key.
    /// Returns `None` if the key does not fit the template, if two
    /// variables are adjacent, or if a repeated variable binds two values.
    #[must_use]
    pub fn match_key(&self, physical: &str) -> Option<HashMap<String, String>> {
        let mut bindings: HashMap<String, String> = HashMap::new();
        let mut rest = physical;
        let mut segments = self.segments.iter().peekable();

        while let Some(segment) = segments.next() {
            match segment {
                Segment::Literal(text) => rest = rest.strip_prefix(text.as_str())?,
                Segment::Variable(name) => {
                    let value = match segments.peek() {
                        None => std::mem::take(&mut rest),
                        Some(Segment::Literal(next)) => {
                            let end = rest.find(next.as_str())?;
                            let (value, tail) = rest.split_at(end);
                            rest = tail;
                            value
                        }
                        Some(Segment::Variable(_)) => return None,
                    };
                    match bindings.get(name) {
                        Some(bound) if bound != value => return None,
                        Some(_) => {}
                        None => {
                            bindings.insert(name.clone(), value.to_owned());
                        }
                    }
                }
            }
        }
        rest.is_empty().then_some(bindings)
    }
}

impl fmt::Display for KeyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl From<&str> for KeyTemplate {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

/// Variable names of `template` in order of appearance, repeats included.
#[must_use]
pub fn extract_template_vars(template: &str) -> Vec<String> {
    KeyTemplate::parse(template)
        .variables()
        .map(str::to_owned)
        .collect()
}

/// Substitute every `${name}` in `template` from `attrs`.
pub fn resolve_template(
    template: &str,
    attrs: &HashMap<String, AttributeValue>,
) -> KeyforgeResult<String> {
    KeyTemplate::parse(template).resolve(attrs)
}

#[cfg(test)]
mod tests {
    use keyforge_model::AttributeType;

    use super::*;

    fn attrs(pairs: &[(&str, AttributeValue)]) -> HashMap<String, AttributeValue> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn test_should_extract_variables_in_order() {
        assert_eq!(
            extract_template_vars("PHOTO#${username}#${timestamp}"),
            vec!["username", "timestamp"]
        );
        assert_eq!(extract_template_vars("${a}-${a}"), vec!["a", "a"]);
        assert!(extract_template_vars("STATIC").is_empty());
    }

    #[test]
    fn test_should_resolve_template() {
        let resolved =
            resolve_template("USER#${username}", &attrs(&[("username", "alice".into())]))
                .unwrap();
        assert_eq!(resolved, "USER#alice");
    }

    #[test]
    fn test_should_render_scalar_values() {
        let template = KeyTemplate::parse("${n}|${b}|${z}");
        let resolved = template
            .resolve(&attrs(&[
                ("n", 42.into()),
                ("b", true.into()),
                ("z", AttributeValue::Null(true)),
            ]))
            .unwrap();
        assert_eq!(resolved, "42|true|null");
    }

    #[test]
    fn test_should_report_every_missing_variable() {
        let err = resolve_template(
            "PHOTO#${username}#${timestamp}#${username}",
            &HashMap::new(),
        )
        .unwrap_err();
        match err {
            KeyforgeError::MissingTemplateVariable { template, missing } => {
                assert_eq!(template, "PHOTO#${username}#${timestamp}#${username}");
                assert_eq!(missing, vec!["username", "timestamp"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_should_reject_values_without_text_form() {
        let err = resolve_template(
            "TAG#${tags}",
            &attrs(&[("tags", AttributeValue::Ss(vec!["a".to_owned()]))]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            KeyforgeError::UnsupportedTemplateValue { ref variable, attribute_type: AttributeType::Ss, .. }
                if variable == "tags"
        ));
    }

    #[test]
    fn test_should_keep_malformed_markers_literal() {
        let template = KeyTemplate::parse("A#${}#${open");
        assert_eq!(template.variables().count(), 0);
        assert_eq!(template.resolve(&HashMap::new()).unwrap(), "A#${}#${open");

        let nested = KeyTemplate::parse("${a#${b}");
        assert_eq!(nested.variables().collect::<Vec<_>>(), vec!["b"]);

        let mixed = KeyTemplate::parse("${}${x}");
        assert_eq!(mixed.variables().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(
            mixed.resolve(&attrs(&[("x", "1".into())])).unwrap(),
            "${}1"
        );
    }

    #[test]
    fn test_should_match_physical_key() {
        let template = KeyTemplate::parse("PHOTO#${username}#${timestamp}");
        let bindings = template.match_key("PHOTO#alice#2024-05-01").unwrap();
        assert_eq!(bindings["username"], "alice");
        assert_eq!(bindings["timestamp"], "2024-05-01");

        assert!(template.match_key("USER#alice").is_none());
        assert!(KeyTemplate::parse("USER#${u}#END").match_key("USER#alice").is_none());
    }

    #[test]
    fn test_should_reject_inconsistent_repeated_binding() {
        let template = KeyTemplate::parse("${a}-${a}");
        assert_eq!(template.match_key("x-x").unwrap()["a"], "x");
        assert!(template.match_key("x-y").is_none());
        assert!(KeyTemplate::parse("${a}${b}").match_key("xy").is_none());
    }

    #[test]
    fn test_should_round_trip_through_match() {
        let template = KeyTemplate::parse("FOLLOW#${followedUsername}");
        let physical = template
            .resolve(&attrs(&[("followedUsername", "bob".into())]))
            .unwrap();
        let bindings = template.match_key(&physical).unwrap();
        assert_eq!(bindings["followedUsername"], "bob");
        assert!(template.references("followedUsername"));
        assert!(!template.references("bob"));
    }
}
