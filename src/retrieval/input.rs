//! Wire request and response shapes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::{AttributeValue, Item};

/// Query/scan request as the store expects it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestInput {
    pub table_name: String,
    /// Only present when a secondary index was selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_condition_expression: Option<String>,
    /// Omitted when empty, never sent as `""`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expression_attribute_names: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expression_attribute_values: BTreeMap<String, AttributeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_start_key: Option<Item>,
}

impl RequestInput {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Copy of this request starting after `key`
    pub fn with_start_key(&self, key: Item) -> Self {
        Self {
            exclusive_start_key: Some(key),
            ..self.clone()
        }
    }
}

/// One page returned by the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Page {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub scanned_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<Item>,
}

/// Pages aggregated by one retrieval
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseSet {
    pub items: Vec<Item>,
    pub count: u64,
    pub scanned_count: u64,
    /// Key to resume from; `None` once the result set is exhausted
    pub last_key: Option<Item>,
    /// Store calls made
    pub times_queried: u32,
}

impl ResponseSet {
    pub(crate) fn absorb(&mut self, page: Page) {
        self.items.extend(page.items);
        self.count += page.count;
        self.scanned_count += page.scanned_count;
        self.last_key = page.last_evaluated_key;
        self.times_queried += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_fields_omitted() {
        let input = RequestInput::new("users");
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, json!({"TableName": "users"}));
    }

    #[test]
    fn test_pascal_case_keys() {
        let mut input = RequestInput::new("users");
        input.index_name = Some("nameGlobalIndex".into());
        input.key_condition_expression = Some("#qha = :qhv".into());
        input
            .expression_attribute_names
            .insert("#qha".into(), "name".into());
        input
            .expression_attribute_values
            .insert(":qhv".into(), AttributeValue::string("Charlie"));
        input.select = Some("COUNT".into());

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["IndexName"], "nameGlobalIndex");
        assert_eq!(json["KeyConditionExpression"], "#qha = :qhv");
        assert_eq!(json["ExpressionAttributeValues"][":qhv"], json!({"S": "Charlie"}));
        assert_eq!(json["Select"], "COUNT");
        assert!(json.get("FilterExpression").is_none());
    }

    #[test]
    fn test_page_from_wire() {
        let page: Page = serde_json::from_value(json!({
            "Items": [{"id": {"S": "1"}}],
            "Count": 1,
            "ScannedCount": 4,
            "LastEvaluatedKey": {"id": {"S": "1"}}
        }))
        .unwrap();

        let mut response = ResponseSet::default();
        response.absorb(page);
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.scanned_count, 4);
        assert!(response.last_key.is_some());
        assert_eq!(response.times_queried, 1);
    }
}
