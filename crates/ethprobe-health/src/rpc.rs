//! JSON-RPC 2.0 wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HealthError, HealthResult};

pub const ETH_BLOCK_NUMBER: &str = "eth_blockNumber";
pub const ETH_CHAIN_ID: &str = "eth_chainId";

/// A parameterless JSON-RPC request.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: [Value; 0],
    pub id: u64,
}

impl<'a> RpcRequest<'a> {
    pub fn new(method: &'a str, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params: [],
            id,
        }
    }
}

/// A JSON-RPC response envelope.
///
/// Both members are optional on the wire; `into_result` decides which
/// combinations are usable.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

impl RpcResponse {
    pub fn from_slice(method: &str, body: &[u8]) -> HealthResult<Self> {
        serde_json::from_slice(body).map_err(|e| {
            HealthError::Protocol(format!("{method}: malformed JSON-RPC response: {e}"))
        })
    }

    /// Extract the string `result`, turning an `error` object or a
    /// missing/null/non-string result into a protocol error.
    pub fn into_result(self, method: &str) -> HealthResult<String> {
        if let Some(err) = self.error {
            let code = err.code.map(|c| format!(" {c}")).unwrap_or_default();
            return Err(HealthError::Protocol(format!(
                "{method}: node returned error{code}: {}",
                err.message
            )));
        }

        match self.result {
            Some(Value::String(s)) => Ok(s),
            None | Some(Value::Null) => {
                Err(HealthError::Protocol(format!("{method}: response has no result")))
            }
            Some(other) => Err(HealthError::Protocol(format!(
                "{method}: expected a hex string result, got {other}"
            ))),
        }
    }
}
