use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::protocol::*;
use crate::engine::classify::classify;
use crate::engine::search::convert_matches;
use crate::engine::EngineState;
use crate::settings::Store;

const METHODS: &[&str] = &[
    "initialize",
    "ping",
    "case/classify",
    "case/convert",
    "case/convertMatches",
    "rules/list",
    "rules/add",
    "rules/remove",
    "rules/update",
    "settings/get",
    "settings/set",
    "settings/save",
];

/// Serve conversion requests from an editor over stdin/stdout.
///
/// Rule and settings edits stay in memory until `settings/save`.
pub async fn run(mut state: EngineState, profile: String, store: Store) -> Result<()> {
    let stdin = BufReader::new(io::stdin());
    let mut stdout = io::stdout();
    let mut lines = stdin.lines();

    tracing::info!("caseconvert stdio bridge ready (profile '{}')", profile);

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        tracing::debug!("← {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                let resp = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"));
                send(&mut stdout, &resp).await?;
                continue;
            }
        };

        let response = handle_request(&mut state, &profile, &store, &request);

        // Notifications (no id) don't get a response
        if request.id.is_some() {
            send(&mut stdout, &response).await?;
        }
    }

    tracing::info!("stdin closed, bridge shutting down");
    Ok(())
}

fn handle_request(
    state: &mut EngineState,
    profile: &str,
    store: &Store,
    req: &JsonRpcRequest,
) -> JsonRpcResponse {
    let id = req.id.clone();

    match req.method.as_str() {
        // ── Lifecycle ──────────────────────────────────────────────
        "initialize" => respond(
            id,
            InitializeResult {
                server_info: ServerInfo {
                    name: format!("caseconvert ({profile})"),
                    version: env!("CARGO_PKG_VERSION").into(),
                },
                capabilities: Capabilities {
                    methods: METHODS.to_vec(),
                },
            },
        ),

        "ping" => JsonRpcResponse::success(id, json!({})),

        // ── Conversion ─────────────────────────────────────────────
        "case/classify" => match params::<TextParams>(req) {
            Ok(p) => JsonRpcResponse::success(id, json!({ "case": classify(&p.text) })),
            Err(resp) => resp,
        },

        "case/convert" => match params::<ConvertParams>(req) {
            Ok(p) => {
                let capitalize = p.capitalize.unwrap_or(state.capitalize);
                let result = match crate::engine::try_convert(&p.text, &state.rules, capitalize) {
                    Ok(converted) => ConvertResult {
                        result: Some(converted),
                        reason: None,
                    },
                    Err(e) => ConvertResult {
                        result: None,
                        reason: Some(e.to_string()),
                    },
                };
                respond(id, result)
            }
            Err(resp) => resp,
        },

        "case/convertMatches" => match params::<ConvertMatchesParams>(req) {
            Ok(p) => {
                let converted = convert_matches(&p.text, &p.search, p.flags, state);
                respond(
                    id,
                    ConvertMatchesResult {
                        text: converted.text,
                        replacements: converted.replacements,
                    },
                )
            }
            Err(resp) => resp,
        },

        // ── Rules ──────────────────────────────────────────────────
        "rules/list" => respond(
            id,
            RulesListResult {
                rules: state.rules.get_rules(),
            },
        ),

        "rules/add" => match params::<RuleAddParams>(req) {
            Ok(p) => match p.rule.validate() {
                Ok(()) => {
                    let rule_id = state.rules.add_rule(p.rule);
                    tracing::info!("Added rule {}", rule_id);
                    JsonRpcResponse::success(id, json!({ "id": rule_id }))
                }
                Err(e) => JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid rule: {e}")),
            },
            Err(resp) => resp,
        },

        "rules/remove" => match params::<RuleIdParams>(req) {
            Ok(p) => {
                let removed = state.rules.remove_rule(p.id);
                JsonRpcResponse::success(id, json!({ "removed": removed }))
            }
            Err(resp) => resp,
        },

        "rules/update" => match params::<RuleUpdateParams>(req) {
            Ok(p) => match update_rule(state, &p) {
                Ok(()) => respond(id, json!({ "rule": state.rules.get_rule(p.id) })),
                Err(e) => JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
            },
            Err(resp) => resp,
        },

        // ── Settings ───────────────────────────────────────────────
        "settings/get" => respond(id, settings(state, profile)),

        "settings/set" => match params::<SettingsSetParams>(req) {
            Ok(p) => {
                state.capitalize = p.capitalize;
                respond(id, settings(state, profile))
            }
            Err(resp) => resp,
        },

        "settings/save" => match store.save(profile, state) {
            Ok(()) => JsonRpcResponse::success(id, json!({ "saved": true })),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("{e:#}")),
        },

        // ── Unknown ────────────────────────────────────────────────
        method => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {method}")),
    }
}

fn update_rule(state: &mut EngineState, p: &RuleUpdateParams) -> Result<(), crate::error::RuleError> {
    if let Some(label) = &p.label {
        state.rules.set_label(p.id, label)?;
    }
    if let Some(enabled) = p.enabled {
        state.rules.set_enabled(p.id, enabled)?;
    }
    if p.label.is_none() && p.enabled.is_none() {
        state
            .rules
            .get_rule(p.id)
            .ok_or(crate::error::RuleError::UnknownRule(p.id))?;
    }
    Ok(())
}

fn settings(state: &EngineState, profile: &str) -> SettingsResult {
    SettingsResult {
        profile: profile.to_string(),
        capitalize: state.capitalize,
        rule_count: state.rules.len(),
    }
}

/// Deserialize the request params, or build the error response to send back.
fn params<T: DeserializeOwned>(req: &JsonRpcRequest) -> std::result::Result<T, JsonRpcResponse> {
    let Some(p) = req.params.as_ref() else {
        return Err(JsonRpcResponse::error(req.id.clone(), INVALID_PARAMS, "Missing params"));
    };
    serde_json::from_value(p.clone()).map_err(|e| {
        JsonRpcResponse::error(req.id.clone(), INVALID_PARAMS, format!("Invalid params: {e}"))
    })
}

fn respond(id: Option<serde_json::Value>, result: impl Serialize) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Failed to encode result: {e}")),
    }
}

async fn send(stdout: &mut io::Stdout, resp: &JsonRpcResponse) -> Result<()> {
    let json = serde_json::to_string(resp)?;
    tracing::debug!("→ {}", json);
    stdout.write_all(json.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::env::temp_dir;

    fn temp_store() -> Store {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = temp_dir().join(format!("caseconvert_bridge_{}_{}.db", std::process::id(), id));
        Store::open(&path).unwrap()
    }

    fn call(state: &mut EngineState, store: &Store, method: &str, params: Value) -> Value {
        let req: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        }))
        .unwrap();
        let resp = handle_request(state, "test", store, &req);
        serde_json::to_value(resp).unwrap()
    }

    #[test]
    fn test_convert() {
        let store = temp_store();
        let mut state = EngineState::default();
        let resp = call(&mut state, &store, "case/convert", json!({ "text": "foo_bar" }));
        assert_eq!(resp["result"]["result"], "fooBar");

        let resp = call(
            &mut state,
            &store,
            "case/convert",
            json!({ "text": "foo_bar", "capitalize": true }),
        );
        assert_eq!(resp["result"]["result"], "FooBar");
    }

    #[test]
    fn test_convert_reports_reason() {
        let store = temp_store();
        let mut state = EngineState::default();
        let resp = call(&mut state, &store, "case/convert", json!({ "text": "FOO" }));
        assert!(resp["result"]["result"].is_null());
        assert_eq!(resp["result"]["reason"], "input is neither snake_case nor camelCase");
    }

    #[test]
    fn test_classify() {
        let store = temp_store();
        let mut state = EngineState::default();
        let resp = call(&mut state, &store, "case/classify", json!({ "text": "fooBar" }));
        assert_eq!(resp["result"]["case"], "camelCase");
    }

    #[test]
    fn test_convert_matches() {
        let store = temp_store();
        let mut state = EngineState::default();
        let resp = call(
            &mut state,
            &store,
            "case/convertMatches",
            json!({ "text": "a fooBar b fooBar", "search": "fooBar", "wholeWord": true }),
        );
        assert_eq!(resp["result"]["text"], "a foo_bar b foo_bar");
        assert_eq!(resp["result"]["replacements"], 2);
    }

    #[test]
    fn test_rule_lifecycle_and_save() {
        let store = temp_store();
        let mut state = EngineState::default();

        let resp = call(
            &mut state,
            &store,
            "rules/add",
            json!({ "rule": {
                "domain": "snake_to_camel",
                "condition": { "kind": "always_true" },
                "actions": [{ "kind": "add_prefix", "value": "get" }]
            }}),
        );
        assert_eq!(resp["result"]["id"], 1);

        let resp = call(&mut state, &store, "case/convert", json!({ "text": "singleton" }));
        assert_eq!(resp["result"]["result"], "getSingleton");

        let resp = call(
            &mut state,
            &store,
            "rules/update",
            json!({ "id": 1, "label": "getters", "enabled": false }),
        );
        assert_eq!(resp["result"]["rule"]["label"], "getters");
        assert_eq!(resp["result"]["rule"]["enabled"], false);

        let resp = call(&mut state, &store, "settings/save", Value::Null);
        assert_eq!(resp["result"]["saved"], true);
        let saved = store.load("test").unwrap().unwrap();
        assert_eq!(saved.rules.get_rule(1).unwrap().label.as_deref(), Some("getters"));

        let resp = call(&mut state, &store, "rules/remove", json!({ "id": 1 }));
        assert_eq!(resp["result"]["removed"], true);
        let resp = call(&mut state, &store, "rules/list", Value::Null);
        assert_eq!(resp["result"]["rules"], json!([]));
    }

    #[test]
    fn test_rules_add_rejects_invalid_rule() {
        let store = temp_store();
        let mut state = EngineState::default();
        let resp = call(
            &mut state,
            &store,
            "rules/add",
            json!({ "rule": {
                "domain": "camel_to_snake",
                "condition": { "kind": "has_prefix", "value": "" },
                "actions": [{ "kind": "remove_prefix", "value": "m" }]
            }}),
        );
        assert_eq!(resp["error"]["code"], INVALID_PARAMS);
        assert!(state.rules.is_empty());
    }

    #[test]
    fn test_update_unknown_rule() {
        let store = temp_store();
        let mut state = EngineState::default();
        let resp = call(&mut state, &store, "rules/update", json!({ "id": 9 }));
        assert_eq!(resp["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn test_settings_set() {
        let store = temp_store();
        let mut state = EngineState::default();
        let resp = call(&mut state, &store, "settings/set", json!({ "capitalize": true }));
        assert_eq!(resp["result"]["capitalize"], true);
        assert_eq!(resp["result"]["profile"], "test");
        assert!(state.capitalize);
    }

    #[test]
    fn test_initialize() {
        let store = temp_store();
        let mut state = EngineState::default();
        let resp = call(&mut state, &store, "initialize", Value::Null);
        assert_eq!(resp["result"]["serverInfo"]["name"], "caseconvert (test)");
        let methods = resp["result"]["capabilities"]["methods"].as_array().unwrap();
        assert!(methods.contains(&json!("case/convert")));
        assert!(resp["result"].get("methods").is_none());

        let resp = call(&mut state, &store, "initialized", Value::Null);
        assert_eq!(resp["error"]["code"], METHOD_NOT_FOUND);
    }

    #[test]
    fn test_missing_params_and_unknown_method() {
        let store = temp_store();
        let mut state = EngineState::default();
        let resp = call(&mut state, &store, "case/convert", Value::Null);
        assert_eq!(resp["error"]["code"], INVALID_PARAMS);

        let resp = call(&mut state, &store, "nope", Value::Null);
        assert_eq!(resp["error"]["code"], METHOD_NOT_FOUND);
    }
}
