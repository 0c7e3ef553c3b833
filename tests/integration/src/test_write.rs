//! Put, update and delete building against the sample schema.

#[cfg(test)]
mod tests {
    use keyforge_core::{DeleteItem, KeyforgeError, PutItem, UpdateItem, not, to_wire_json};
    use keyforge_model::{AttributeValue, ReturnValue};

    use crate::{attrs, model};

    #[test]
    fn test_should_put_like_with_index_keys() {
        let input = PutItem::new(
            model("Like"),
            [
                ("photoId", "p-42"),
                ("username", "alice"),
                ("timestamp", "2024-05-01T10:00:00Z"),
            ],
        )
        .if_not_exists()
        .build()
        .unwrap();

        assert_eq!(input.table_name, "app-table");
        assert_eq!(input.item["PK"], AttributeValue::s("PL#p-42"));
        assert_eq!(input.item["SK"], AttributeValue::s("LIKE#alice"));
        assert_eq!(input.item["GSI1PK"], AttributeValue::s("PL#p-42"));
        assert_eq!(
            input.item["GSI1SK"],
            AttributeValue::s("LIKE#2024-05-01T10:00:00Z")
        );
        assert_eq!(input.item["username"], AttributeValue::s("alice"));
        assert_eq!(
            input.condition_expression.as_deref(),
            Some("attribute_not_exists(#PK)")
        );
    }

    #[test]
    fn test_should_resolve_follow_keys_and_require_primary() {
        let follow = model("Follow");
        let input = PutItem::new(
            follow,
            [("followedUsername", "bob"), ("followingUsername", "alice")],
        )
        .build()
        .unwrap();
        assert_eq!(input.item["PK"], AttributeValue::s("FOLLOW#bob"));
        assert_eq!(input.item["GSI1PK"], AttributeValue::s("FOLLOW#alice"));
        assert_eq!(input.item.len(), 6);

        let err = PutItem::new(follow, [("followedUsername", "bob")])
            .build()
            .unwrap_err();
        match err {
            KeyforgeError::MissingTemplateVariable { template, missing } => {
                assert_eq!(template, "FOLLOW#${followingUsername}");
                assert_eq!(missing, vec!["followingUsername"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_should_update_photo_counters_under_condition() {
        let photo = attrs("Photo");
        let likes = photo.attr("likesCount").unwrap();
        let tags = photo.attr("tags").unwrap();

        let input = UpdateItem::new(
            model("Photo"),
            [("username", "alice"), ("timestamp", "2024-05-01")],
        )
        .condition(|ops| ops.exists(&likes))
        .update(|u| {
            u.increment(&likes, 1);
        })
        .update(|u| {
            u.add(&tags, AttributeValue::Ss(vec!["popular".to_owned()]));
        })
        .return_values(ReturnValue::AllNew)
        .build()
        .unwrap();

        assert_eq!(input.key["PK"], AttributeValue::s("UP#alice"));
        assert_eq!(input.key["SK"], AttributeValue::s("PHOTO#alice#2024-05-01"));
        assert_eq!(
            input.update_expression.as_deref(),
            Some("SET #likesCount = #likesCount + :likesCount_0 ADD #tags :tags_1")
        );
        assert_eq!(
            input.condition_expression.as_deref(),
            Some("attribute_exists(#likesCount)")
        );
        assert_eq!(input.expression_attribute_names.len(), 2);
        assert_eq!(input.expression_attribute_values.len(), 2);
    }

    #[test]
    fn test_should_delete_follow_with_negated_condition() {
        let follow = attrs("Follow");
        let timestamp = follow.attr("timestamp").unwrap();

        let input = DeleteItem::new(
            model("Follow"),
            [("followedUsername", "bob"), ("followingUsername", "alice")],
        )
        .condition(|ops| not(ops.lt(&timestamp, "2020-01-01")))
        .return_values(ReturnValue::AllOld)
        .build()
        .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&to_wire_json(&input).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "TableName": "app-table",
                "Key": {
                    "PK": { "S": "FOLLOW#bob" },
                    "SK": { "S": "FOLLOW#alice" }
                },
                "ConditionExpression": "NOT (#timestamp < :timestamp_0)",
                "ExpressionAttributeNames": { "#timestamp": "timestamp" },
                "ExpressionAttributeValues": { ":timestamp_0": { "S": "2020-01-01" } },
                "ReturnValues": "ALL_OLD"
            })
        );
    }
}
