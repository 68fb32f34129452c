//! Wire types for the GovQuery backend
//!
//! Unknown fields are ignored on decode; absent optionals are omitted on encode.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::STATUS_UNHEALTHY;

/// Natural-language query conversion request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_codes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_choice: Option<String>,
}

impl QueryRequest {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_table_codes(mut self, codes: Vec<String>) -> Self {
        self.table_codes = Some(codes);
        self
    }

    #[must_use]
    pub fn with_model_choice(mut self, model: impl Into<String>) -> Self {
        self.model_choice = Some(model.into());
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Conversion result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub sql_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_context_used: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_status: Option<String>,
}

/// Column descriptor within a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Census table schema descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub table_code: String,
    pub table_name: String,
    #[serde(default)]
    pub geography_levels: Vec<String>,
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

/// Backend feature flags reported by the health endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendFeatures {
    pub auto_deployment: bool,
    pub cold_start_fallback: bool,
    pub smart_error_recovery: bool,
    pub auto_stop: String,
}

/// Backend health status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas_loaded: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modal_app_running: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modal_app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_attempted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<BackendFeatures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    /// Status reported in place of a backend answer when it cannot be reached
    #[must_use]
    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: STATUS_UNHEALTHY.to_string(),
            schemas_loaded: Some(0),
            modal_app_running: Some(false),
            modal_app_name: Some(String::new()),
            deployment_attempted: Some(false),
            features: None,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn is_unhealthy(&self) -> bool {
        self.status == STATUS_UNHEALTHY
    }
}

/// SQL execution request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<u32>,
}

/// SQL execution result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Remote SQL parse request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSqlRequest {
    pub sql: String,
}

/// Model deployment result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployResponse {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_query_request_omits_absent_optionals() {
        let request = QueryRequest::new("median income in Ohio");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!({ "query": "median income in Ohio" }));
    }

    #[test]
    fn test_query_request_builder() {
        let request = QueryRequest::new("q")
            .with_table_codes(vec!["B19013".into()])
            .with_model_choice("auto")
            .with_max_tokens(256)
            .with_temperature(0.1);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["table_codes"], json!(["B19013"]));
        assert_eq!(json["model_choice"], "auto");
        assert_eq!(json["max_tokens"], 256);
    }

    #[test]
    fn test_schema_info_decodes_type_field() {
        let schema: SchemaInfo = serde_json::from_value(json!({
            "table_code": "B01001",
            "table_name": "Sex by Age",
            "geography_levels": ["state", "county"],
            "columns": [{ "name": "total", "type": "integer", "description": "Total population" }],
            "extra": true
        }))
        .unwrap();
        assert_eq!(schema.columns[0].data_type, "integer");
        assert_eq!(schema.geography_levels.len(), 2);

        let back = serde_json::to_value(&schema).unwrap();
        assert_eq!(back["columns"][0]["type"], "integer");
    }

    #[test]
    fn test_health_response_tolerates_unknown_fields() {
        let health: HealthResponse = serde_json::from_value(json!({
            "status": "healthy",
            "schemas_loaded": 12,
            "features": { "auto_deployment": true, "auto_stop": "10m" },
            "uptime": 99
        }))
        .unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.schemas_loaded, Some(12));
        let features = health.features.unwrap();
        assert!(features.auto_deployment);
        assert!(!features.cold_start_fallback);
        assert_eq!(features.auto_stop, "10m");
    }

    #[test]
    fn test_unhealthy_sentinel() {
        let health = HealthResponse::unhealthy("Request timeout after 30s");
        assert!(health.is_unhealthy());
        assert_eq!(health.schemas_loaded, Some(0));
        assert_eq!(health.modal_app_running, Some(false));
        assert_eq!(health.error.as_deref(), Some("Request timeout after 30s"));
    }

    #[test]
    fn test_execute_request_max_rows_optional() {
        let json = serde_json::to_value(ExecuteRequest {
            sql: "SELECT 1".into(),
            max_rows: None,
        })
        .unwrap();
        assert_eq!(json, json!({ "sql": "SELECT 1" }));
    }

    #[test]
    fn test_deploy_response_decode() {
        let deploy: DeployResponse = serde_json::from_value(json!({
            "status": "deployed",
            "message": "ok"
        }))
        .unwrap();
        assert!(deploy.app_name.is_none());
    }
}
