/// Editor bridge protocol types (JSON-RPC 2.0, one message per line)
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::rules::{Rule, RuleId};
use crate::engine::search::SearchFlags;

// ─── JSON-RPC Envelope ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

// ─── Initialize ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct Capabilities {
    pub methods: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub server_info: ServerInfo,
    pub capabilities: Capabilities,
}

// ─── Conversion ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TextParams {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ConvertParams {
    pub text: String,
    /// Overrides the profile's capitalize flag for this call only.
    #[serde(default)]
    pub capitalize: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ConvertResult {
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConvertMatchesParams {
    pub text: String,
    pub search: String,
    #[serde(flatten)]
    pub flags: SearchFlags,
}

#[derive(Debug, Serialize)]
pub struct ConvertMatchesResult {
    pub text: String,
    pub replacements: usize,
}

// ─── Rules ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RulesListResult<'a> {
    pub rules: &'a [Rule],
}

#[derive(Debug, Deserialize)]
pub struct RuleAddParams {
    pub rule: Rule,
}

#[derive(Debug, Deserialize)]
pub struct RuleIdParams {
    pub id: RuleId,
}

#[derive(Debug, Deserialize)]
pub struct RuleUpdateParams {
    pub id: RuleId,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

// ─── Settings ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResult {
    pub profile: String,
    pub capitalize: bool,
    pub rule_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SettingsSetParams {
    pub capitalize: bool,
}
