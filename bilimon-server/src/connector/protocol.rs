//! Data-connector wire types
//!
//! The low-code platform posts `{params, context}` where `params` may be a
//! JSON object or a string holding one, and `datasourceConfig` inside it
//! may again be either.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::role::FieldSpec;
use super::ShapedRecord;
use crate::models::ValidationError;
use crate::repos::VIDEO_METADATA;

/// Field type code for plain text columns
pub const FIELD_TYPE_TEXT: u8 = 1;

#[derive(Debug, Default, Deserialize)]
pub struct ConnectorRequest {
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub context: Option<Value>,
}

/// What the connector was asked for, after unwrapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorQuery {
    pub collection: String,
    pub page_token: String,
}

impl ConnectorRequest {
    pub fn query(&self) -> Result<ConnectorQuery, ValidationError> {
        let params = self.params.as_ref().map(unwrap_json_string).unwrap_or(Value::Null);

        let config = params
            .get("datasourceConfig")
            .map(unwrap_json_string)
            .unwrap_or(Value::Null);

        let collection = config
            .get("collection")
            .or_else(|| params.get("collection"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(VIDEO_METADATA)
            .to_owned();
        validate_collection(&collection)?;

        let page_token = match params.get("pageToken") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };

        Ok(ConnectorQuery {
            collection,
            page_token,
        })
    }
}

fn unwrap_json_string(value: &Value) -> Value {
    match value {
        Value::String(s) if s.trim().is_empty() => Value::Null,
        Value::String(s) => serde_json::from_str(s).unwrap_or(Value::Null),
        other => other.clone(),
    }
}

fn validate_collection(name: &str) -> Result<(), ValidationError> {
    if name.starts_with("system.") || name.contains('$') || name.contains('\0') {
        return Err(ValidationError::InvalidFormat {
            field: "collection",
            reason: "not a readable collection name",
        });
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub field_id: &'static str,
    pub field_name: &'static str,
    pub field_type: u8,
    pub is_primary: bool,
    pub description: String,
}

impl From<&FieldSpec> for FieldDef {
    fn from(spec: &FieldSpec) -> Self {
        Self {
            field_id: spec.id,
            field_name: spec.name,
            field_type: FIELD_TYPE_TEXT,
            is_primary: spec.id == "id",
            description: String::new(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMeta {
    pub table_name: String,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Serialize)]
pub struct RecordOut {
    #[serde(rename = "primaryID")]
    pub primary_id: String,
    pub data: super::Record,
}

impl From<ShapedRecord> for RecordOut {
    fn from(r: ShapedRecord) -> Self {
        Self {
            primary_id: r.primary_id,
            data: r.data,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsData {
    pub next_page_token: String,
    pub has_more: bool,
    pub records: Vec<RecordOut>,
}

/// Capability descriptor served at `/meta.json`
pub fn meta_descriptor() -> Value {
    json!({
        "schemaVersion": 1,
        "version": env!("CARGO_PKG_VERSION"),
        "type": "data_connector",
        "extraData": {
            "dataSourceConfigUiUri": "/",
            "initHeight": 600,
            "initWidth": 800
        },
        "protocol": {
            "type": "http",
            "httpProtocol": {
                "uris": [
                    { "type": "tableMeta", "uri": "/table_meta" },
                    { "type": "records", "uri": "/records" }
                ]
            }
        }
    })
}
