//! CLI Configuration Tests
//!
//! Tests must prove that:
//! 1. A config file loads the catalog the compiler selects against
//! 2. Invalid catalogs are rejected at load time
//! 3. Request documents compile end to end

use std::fs;

use aeroquery::cli::{compile_document, explain_document, Config};
use serde_json::json;
use tempfile::tempdir;

const USERS_CONFIG: &str = r#"{
    "table": {
        "name": "users",
        "hash_key": "id",
        "indexes": [
            {"name": "nameGlobalIndex", "hash_attribute": "name", "range_attribute": "age"}
        ]
    },
    "log_level": "error"
}"#;

fn load(content: &str) -> Result<Config, aeroquery::cli::CliError> {
    let dir = tempdir().unwrap();
    let path = dir.path().join("aeroquery.json");
    fs::write(&path, content).unwrap();
    Config::load(&path)
}

// =============================================================================
// CONFIG LOADING
// =============================================================================

/// Test: Catalog, log level and offset are read from the file.
#[test]
fn test_config_loads_catalog() {
    let config = load(USERS_CONFIG).unwrap();

    assert_eq!(config.table.name, "users");
    assert_eq!(config.table.indexes.len(), 1);
    assert_eq!(config.log_level, "error");
    assert_eq!(config.placeholder_offset, 0);
}

/// Test: A secondary index without a hash attribute is rejected.
#[test]
fn test_config_rejects_bad_catalog() {
    let err = load(
        r#"{"table": {"name": "users", "hash_key": "id",
            "indexes": [{"name": "broken", "hash_attribute": ""}]}}"#,
    )
    .unwrap_err();

    assert_eq!(err.code_str(), "AERO_CLI_CONFIG_ERROR");
}

// =============================================================================
// END TO END
// =============================================================================

/// Test: A map-form query document compiles to the wire request.
#[tokio::test]
async fn test_document_compiles_to_wire_request() {
    let config = load(USERS_CONFIG).unwrap();
    let document = json!({
        "condition": {"name": "Charlie", "age": {"exists": true}},
        "options": {"attributes": ["name", "email"], "consistent_read": true}
    });

    let input = compile_document(&config, document).await.unwrap().unwrap();
    let wire = serde_json::to_value(&input).unwrap();

    assert_eq!(wire["IndexName"], "nameGlobalIndex");
    assert_eq!(wire["KeyConditionExpression"], "#qha = :qhv");
    assert_eq!(wire["FilterExpression"], "attribute_exists (#a1)");
    assert_eq!(wire["ProjectionExpression"], "#a2, #a3");
    assert_eq!(wire["ConsistentRead"], true);
    assert_eq!(wire["ExpressionAttributeNames"]["#a1"], "age");
    assert_eq!(wire["ExpressionAttributeNames"]["#a2"], "name");
}

/// Test: Explain reports the chosen index as JSON.
#[tokio::test]
async fn test_explain_document() {
    let config = load(USERS_CONFIG).unwrap();
    let plan = explain_document(&config, json!({"condition": {"name": "Charlie"}}))
        .await
        .unwrap();

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["accepted"], true);
    assert_eq!(json["index"], "nameGlobalIndex");
    assert_eq!(json["key_condition"], "#qha = :qhv");
    assert!(plan.to_string().contains("Index: nameGlobalIndex"));
}
