//! Query and scan building against the sample schema.

#[cfg(test)]
mod tests {
    use keyforge_core::expression::AttrRef;
    use keyforge_core::{
        KeyforgeConfig, KeyforgeError, PartialKeyPolicy, Query, Scan, and, or, to_wire_json,
    };
    use keyforge_model::AttributeValue;

    use crate::{attrs, model};

    #[test]
    fn test_should_push_username_into_first_key_of_user() {
        let user = attrs("User");
        let username = user.attr("username").unwrap();
        let input = Query::new(model("User"))
            .condition(|ops| ops.eq(&username, "alice"))
            .build()
            .unwrap();

        assert_eq!(
            input.key_condition_expression.as_deref(),
            Some("#PK = :username_0")
        );
        assert_eq!(input.filter_expression, None);
        assert_eq!(input.expression_attribute_names.len(), 1);
        assert_eq!(
            input.expression_attribute_values[":username_0"],
            AttributeValue::s("USER#alice")
        );
    }

    #[test]
    fn test_should_reject_shadowed_sort_key_when_configured() {
        let user = attrs("User");
        let username = user.attr("username").unwrap();
        let config = KeyforgeConfig {
            partial_key_policy: PartialKeyPolicy::Reject,
            ..Default::default()
        };
        let err = Query::new(model("User"))
            .with_config(&config)
            .condition(|ops| ops.eq(&username, "alice"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            KeyforgeError::AmbiguousKeyReference { ref chosen, ref shadowed, .. }
                if chosen == "PK" && *shadowed == ["SK"]
        ));
    }

    #[test]
    fn test_should_split_photo_query_into_key_and_filter() {
        let photo = attrs("Photo");
        let username = photo.attr("username").unwrap();
        let timestamp = photo.attr("timestamp").unwrap();
        let likes = photo.attr("likesCount").unwrap();

        let input = Query::new(model("Photo"))
            .condition(|ops| {
                and([
                    ops.eq(&username, "alice"),
                    ops.begins_with(&timestamp, "2024-05"),
                    ops.gt(&likes, 10),
                ])
            })
            .scan_index_forward(false)
            .build()
            .unwrap();

        assert_eq!(
            input.key_condition_expression.as_deref(),
            Some("#PK = :username_0 AND begins_with(#SK, :timestamp_1)")
        );
        assert_eq!(
            input.filter_expression.as_deref(),
            Some("#likesCount > :likesCount_2")
        );
        assert_eq!(
            input.expression_attribute_values[":username_0"],
            AttributeValue::s("UP#alice")
        );
        assert_eq!(
            input.expression_attribute_values[":timestamp_1"],
            AttributeValue::s("PHOTO#alice#2024-05")
        );
        assert_eq!(
            input.expression_attribute_values[":likesCount_2"],
            AttributeValue::n("10")
        );
        assert_eq!(input.expression_attribute_names.len(), 3);
    }

    #[test]
    fn test_should_keep_or_group_in_filter() {
        let photo = attrs("Photo");
        let username = photo.attr("username").unwrap();
        let likes = photo.attr("likesCount").unwrap();
        let comments = photo.attr("commentCount").unwrap();

        let input = Query::new(model("Photo"))
            .condition(|ops| ops.eq(&username, "alice"))
            .condition(|ops| or([ops.gte(&likes, 100), ops.gte(&comments, 50)]))
            .build()
            .unwrap();

        assert_eq!(
            input.key_condition_expression.as_deref(),
            Some("#PK = :username_0")
        );
        assert_eq!(
            input.filter_expression.as_deref(),
            Some("(#likesCount >= :likesCount_1) OR (#commentCount >= :commentCount_2)")
        );
    }

    #[test]
    fn test_should_refuse_query_with_only_or() {
        let user = attrs("User");
        let username = user.attr("username").unwrap();
        let err = Query::new(model("User"))
            .condition(|ops| or([ops.eq(&username, "alice"), ops.eq(&username, "bob")]))
            .build()
            .unwrap_err();
        assert!(matches!(err, KeyforgeError::MissingKeyCondition { .. }));
    }

    #[test]
    fn test_should_query_likes_by_photo_on_index() {
        let like = attrs("Like");
        let photo_id = like.attr("photoId").unwrap();
        let timestamp = like.attr("timestamp").unwrap();

        let input = Query::new(model("Like"))
            .index("GSI1")
            .condition(|ops| ops.eq(&photo_id, "p-42"))
            .condition(|ops| ops.between(&timestamp, "2024-01-01", "2024-12-31"))
            .limit(50)
            .build()
            .unwrap();

        assert_eq!(input.index_name.as_deref(), Some("GSI1"));
        assert_eq!(
            input.key_condition_expression.as_deref(),
            Some("#GSI1PK = :photoId_0 AND #GSI1SK BETWEEN :timestamp_low_1 AND :timestamp_high_2")
        );
        assert_eq!(
            input.expression_attribute_values[":timestamp_low_1"],
            AttributeValue::s("LIKE#2024-01-01")
        );
        assert_eq!(
            input.expression_attribute_values[":timestamp_high_2"],
            AttributeValue::s("LIKE#2024-12-31")
        );
    }

    #[test]
    fn test_should_query_followers_and_project() {
        let follow = attrs("Follow");
        let following = follow.attr("followingUsername").unwrap();
        let followed = follow.attr("followedUsername").unwrap();

        let input = Query::new(model("Follow"))
            .index("GSI1")
            .condition(|ops| ops.eq(&following, "bob"))
            .project([&followed])
            .build()
            .unwrap();

        assert_eq!(
            input.key_condition_expression.as_deref(),
            Some("#GSI1PK = :followingUsername_0")
        );
        assert_eq!(
            input.projection_expression.as_deref(),
            Some("#followedUsername")
        );
        assert_eq!(
            input.expression_attribute_names["#followedUsername"],
            "followedUsername"
        );
        assert_eq!(input.expression_attribute_names["#GSI1PK"], "GSI1PK");
    }

    #[test]
    fn test_should_serialize_query_to_wire_json() {
        let user = attrs("User");
        let username = user.attr("username").unwrap();
        let json = to_wire_json(
            &Query::new(model("User"))
                .condition(|ops| ops.eq(&username, "alice"))
                .consistent_read(true)
                .build()
                .unwrap(),
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "TableName": "app-table",
                "KeyConditionExpression": "#PK = :username_0",
                "ExpressionAttributeNames": { "#PK": "PK" },
                "ExpressionAttributeValues": { ":username_0": { "S": "USER#alice" } },
                "ConsistentRead": true
            })
        );
    }

    #[test]
    fn test_should_scan_nested_path_as_filter() {
        let city = AttrRef::nested("city", "location.city");
        let photo = attrs("Photo");
        let tags = photo.attr("tags").unwrap();

        let input = Scan::new(model("Photo"))
            .condition(|ops| ops.eq(&city, "Oslo"))
            .condition(|ops| ops.contains(&tags, "sunset"))
            .build()
            .unwrap();

        assert_eq!(
            input.filter_expression.as_deref(),
            Some("(#location.#city = :city_0) AND (contains(#tags, :tags_1))")
        );
        assert_eq!(input.expression_attribute_names.len(), 3);
        assert_eq!(input.expression_attribute_values.len(), 2);
    }
}
