//! CLI command implementations
//!
//! Every command loads the configuration first. `compile` and `explain`
//! then read one request document from stdin:
//!
//! ```json
//! {
//!   "operation": "query",
//!   "condition": {"name": "Charlie", "age": {"between": [10, 20]}},
//!   "options": {"limit": 10}
//! }
//! ```
//!
//! `raw` may replace `condition` with a pre-built expression object.

use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};
use crate::condition::Condition;
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::planner::ExplainPlan;
use crate::retrieval::{Operation, RequestInput, RetrievalError, RetrievalOptions, RetrievalRequest};
use crate::value::JsonMarshaller;

/// Request document read from stdin
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestDocument {
    #[serde(default = "default_operation")]
    pub operation: Operation,
    /// Map-form condition
    #[serde(default)]
    pub condition: Value,
    /// Pre-built expression object
    #[serde(default)]
    pub raw: Option<Map<String, Value>>,
    #[serde(default)]
    pub options: RetrievalOptions,
}

fn default_operation() -> Operation {
    Operation::Query
}

impl RequestDocument {
    /// Parse a request document
    pub fn parse(value: Value) -> CliResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| CliError::invalid_request(format!("Invalid request document: {}", e)))
    }

    /// Builds the retrieval request against the configured table
    pub fn into_request(self, config: &Config) -> Result<RetrievalRequest, RetrievalError> {
        let condition = match (self.raw, self.condition) {
            (Some(_), condition) if !condition.is_null() => {
                return Err(RetrievalError::InvalidOption(
                    "'condition' and 'raw' cannot both be given".into(),
                ))
            }
            (Some(raw), _) => Condition::raw(raw),
            (None, condition) => Condition::try_from(condition)?,
        };

        Ok(
            RetrievalRequest::new(self.operation, config.table.clone(), condition)
                .with_options(self.options)
                .placeholder_offset(config.placeholder_offset),
        )
    }
}

/// Compiles a request document into its wire form
pub async fn compile_document(config: &Config, document: Value) -> CliResult<Result<RequestInput, RetrievalError>> {
    let request = match RequestDocument::parse(document)?.into_request(config) {
        Ok(request) => request,
        Err(err) => return Ok(Err(err)),
    };
    Ok(request.build(&JsonMarshaller).await)
}

/// Produces the explain plan for a request document
pub async fn explain_document(config: &Config, document: Value) -> CliResult<ExplainPlan> {
    let document = RequestDocument::parse(document)?;
    let operation = document.operation;
    match document.into_request(config) {
        Ok(request) => Ok(request.explain(&JsonMarshaller).await),
        Err(err) => Ok(ExplainPlan::rejected(
            operation.as_str(),
            &config.table.name,
            err.code(),
            err.to_string(),
        )),
    }
}

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Compile { config } => compile(&config),
        Command::Explain { config } => explain(&config),
        Command::Validate { config } => validate(&config),
    }
}

/// Compile one request and print the wire request
pub fn compile(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let document = read_request()?;

    match runtime()?.block_on(compile_document(&config, document))? {
        Ok(input) => write_response(serde_json::to_value(&input)?),
        Err(err) => reject(&err),
    }
}

/// Print how one request would run. A rejected plan is still a successful
/// explain.
pub fn explain(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let document = read_request()?;

    let plan = runtime()?.block_on(explain_document(&config, document))?;
    write_response(json!({
        "plan": serde_json::to_value(&plan)?,
        "text": plan.to_string(),
    }))
}

/// Check the configuration and list index candidates
pub fn validate(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;

    write_response(json!({
        "table": config.table.name,
        "candidates": config.table.candidates(),
        "placeholder_offset": config.placeholder_offset,
    }))
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.log_severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("table", config.table.name.as_str())],
    );
    Ok(config)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::runtime_error(format!("Failed to start runtime: {}", e)))
}

fn reject(err: &RetrievalError) -> CliResult<()> {
    write_error(err.code(), &err.to_string())?;
    Err(CliError::request_rejected(err.code()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{IndexDescriptor, TableDescriptor};

    fn config() -> Config {
        Config {
            table: TableDescriptor::new("users", "id").with_index(IndexDescriptor::secondary(
                "nameGlobalIndex",
                "name",
                Some("age".to_string()),
            )),
            log_level: "warn".to_string(),
            placeholder_offset: 0,
        }
    }

    #[tokio::test]
    async fn test_compile_query_document() {
        let document = json!({
            "condition": {"name": "Charlie", "age": {"between": [10, 20]}}
        });
        let input = compile_document(&config(), document).await.unwrap().unwrap();

        assert_eq!(input.index_name.as_deref(), Some("nameGlobalIndex"));
        assert_eq!(
            input.key_condition_expression.as_deref(),
            Some("#qha = :qhv AND #qra BETWEEN :qrv_1 AND :qrv_2")
        );
        assert!(input.filter_expression.is_none());
    }

    #[tokio::test]
    async fn test_compile_scan_document_with_options() {
        let document = json!({
            "operation": "scan",
            "condition": {"status": "active"},
            "options": {"limit": 5, "count": true}
        });
        let input = compile_document(&config(), document).await.unwrap().unwrap();

        assert_eq!(input.filter_expression.as_deref(), Some("#a0 = :v0"));
        assert_eq!(input.limit, Some(5));
        assert_eq!(input.select.as_deref(), Some("COUNT"));
    }

    #[tokio::test]
    async fn test_placeholder_offset_applies() {
        let mut config = config();
        config.placeholder_offset = 10;
        let document = json!({"operation": "scan", "condition": {"status": "active"}});
        let input = compile_document(&config, document).await.unwrap().unwrap();

        assert_eq!(input.filter_expression.as_deref(), Some("#a10 = :v10"));
    }

    #[tokio::test]
    async fn test_raw_and_condition_conflict() {
        let document = json!({
            "condition": {"id": 1},
            "raw": {"FilterExpression": "#n = :v", "ExpressionAttributeNames": {"#n": "id"},
                    "ExpressionAttributeValues": {":v": 1}}
        });
        let err = compile_document(&config(), document).await.unwrap().unwrap_err();
        assert_eq!(err.code(), "AERO_INVALID_OPTION");
    }

    #[tokio::test]
    async fn test_unknown_field_rejected() {
        let err = compile_document(&config(), json!({"filter": {}})).await.unwrap_err();
        assert_eq!(err.code_str(), "AERO_CLI_INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_explain_rejection() {
        let plan = explain_document(&config(), json!({"condition": {"age": {"gt": 3}}}))
            .await
            .unwrap();

        assert!(!plan.accepted);
        assert_eq!(plan.rejection_code.as_deref(), Some("AERO_NO_USABLE_INDEX"));
    }
}
