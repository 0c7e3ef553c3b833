//! Schema loading, attribute handles and key templates.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use keyforge_core::{
        KeySelection, KeyTemplate, KeyforgeError, extract_template_vars, resolve_keys,
    };
    use keyforge_model::{AttributeType, AttributeValue};

    use crate::{attrs, load_models, model};

    #[test]
    fn test_should_load_models_in_declared_order() {
        let models = load_models().unwrap();
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["User", "Photo", "Like", "Follow"]);

        let photo = model("Photo");
        let keys: Vec<&str> = photo.key.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(keys, vec!["PK", "SK"]);
        assert_eq!(
            photo.attribute("tags").and_then(|a| a.attribute_type),
            Some(AttributeType::Ss)
        );
        assert!(photo.attribute("username").unwrap().required);
    }

    #[test]
    fn test_should_reject_undeclared_attribute() {
        let user = attrs("User");
        assert_eq!(user.len(), 4);
        let err = user.attr("email").unwrap_err();
        assert_eq!(err.to_string(), "model User has no attribute 'email'");
    }

    #[test]
    fn test_should_resolve_every_key_of_like() {
        let values: HashMap<String, AttributeValue> = [
            ("photoId", "p-1"),
            ("username", "alice"),
            ("timestamp", "t-1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), AttributeValue::s(v)))
        .collect();

        let keys = resolve_keys(model("Like"), &values, KeySelection::Both).unwrap();
        assert_eq!(keys.len(), 4);
        assert_eq!(keys["SK"], "LIKE#alice");
        assert_eq!(keys["GSI1SK"], "LIKE#t-1");
    }

    #[test]
    fn test_should_decode_physical_sort_key() {
        let photo = model("Photo");
        let template = KeyTemplate::parse(photo.key[1].value.as_str());
        assert_eq!(
            extract_template_vars(template.as_str()),
            vec!["username", "timestamp"]
        );

        let bindings = template.match_key("PHOTO#alice#2024-05-01").unwrap();
        assert_eq!(bindings["username"], "alice");
        assert_eq!(bindings["timestamp"], "2024-05-01");
    }

    #[test]
    fn test_should_name_missing_variables_with_template() {
        let err = resolve_keys(model("Photo"), &HashMap::new(), KeySelection::Key).unwrap_err();
        assert!(matches!(err, KeyforgeError::MissingTemplateVariable { .. }));
        assert_eq!(
            err.to_string(),
            "missing template variable(s) username for key template \"UP#${username}\""
        );
    }
}
