//! Deterministic contract engine interpreting JSON commands.
//!
//! Stands in for the sandboxed WASM runtime in devnets and tests. The
//! bytecode is ignored; behavior is driven entirely by the message:
//!
//! | Message                                   | Result                          |
//! |-------------------------------------------|---------------------------------|
//! | `{"nop":{}}`, `{}` or `{"op":"noop"}`     | success, empty data             |
//! | `{"echo":{"data":"<base64>"}}`            | success, data echoed back       |
//! | `{"fail":{"error":"..","data":"<b64>"}}`  | failure with optional partial data |

use crate::domain::value_objects::Binary;
use crate::ports::outbound::{ContractEngine, EngineFailure, EngineResponse, Env, MessageInfo};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Command {
    Nop {},
    Echo {
        data: Binary,
    },
    Fail {
        error: String,
        #[serde(default)]
        data: Binary,
    },
}

/// JSON command interpreter.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCommandEngine;

impl JsonCommandEngine {
    /// Create the engine.
    pub fn new() -> Self {
        Self
    }

    fn run(&self, msg: &[u8]) -> Result<EngineResponse, EngineFailure> {
        let invalid = |e: serde_json::Error| EngineFailure {
            error: format!("invalid message: {e}"),
            data: Binary::new(),
        };
        let value: Value = serde_json::from_slice(msg).map_err(invalid)?;

        // Bare init messages and the `op` form are no-ops too
        let is_empty = value.as_object().is_some_and(serde_json::Map::is_empty);
        if is_empty || value.get("op").and_then(Value::as_str) == Some("noop") {
            return Ok(EngineResponse::default());
        }

        let command: Command = serde_json::from_value(value).map_err(invalid)?;

        match command {
            Command::Nop {} => Ok(EngineResponse::default()),
            Command::Echo { data } => Ok(EngineResponse {
                data,
                attributes: vec![("action".to_string(), "echo".to_string())],
            }),
            Command::Fail { error, data } => Err(EngineFailure { error, data }),
        }
    }
}

impl ContractEngine for JsonCommandEngine {
    fn instantiate(
        &self,
        _code: &[u8],
        _env: &Env,
        _info: &MessageInfo,
        msg: &[u8],
    ) -> Result<EngineResponse, EngineFailure> {
        self.run(msg)
    }

    fn execute(
        &self,
        _code: &[u8],
        _env: &Env,
        _info: &MessageInfo,
        msg: &[u8],
    ) -> Result<EngineResponse, EngineFailure> {
        self.run(msg)
    }
}
