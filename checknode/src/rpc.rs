//! JSON-RPC client for nodes reached through a port-forward tunnel
//!
//! Results are decoded once into [`RpcValue`] so callers match on shape
//! instead of probing untyped JSON.

use anyhow::anyhow;
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::constants::rpc;
use crate::errors::{HexError, RpcError};
use crate::hex::parse_hex_quantity;
use crate::tunnel::Tunnel;

/// Shape of a JSON-RPC `result`
#[derive(Debug, Clone, PartialEq)]
pub enum RpcValue {
    Bool(bool),
    /// `0x`-prefixed string
    Hex(String),
    Object(Map<String, Value>),
    Other(Value),
}

impl From<Value> for RpcValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => RpcValue::Bool(b),
            Value::String(s) if s.starts_with("0x") || s.starts_with("0X") => RpcValue::Hex(s),
            Value::Object(fields) => RpcValue::Object(fields),
            other => RpcValue::Other(other),
        }
    }
}

impl RpcValue {
    /// Decode a hex quantity result such as `net_peerCount` or `eth_blockNumber`
    pub fn hex_quantity(&self) -> Result<i64, HexError> {
        match self {
            RpcValue::Hex(s) => parse_hex_quantity(s),
            RpcValue::Other(Value::String(s)) => parse_hex_quantity(s),
            RpcValue::Bool(b) => Err(HexError::NotAString {
                value: b.to_string(),
            }),
            RpcValue::Object(fields) => Err(HexError::NotAString {
                value: Value::Object(fields.clone()).to_string(),
            }),
            RpcValue::Other(other) => Err(HexError::NotAString {
                value: other.to_string(),
            }),
        }
    }
}

pub struct RpcClient {
    client: Client,
}

/// Create the HTTP client shared by RPC and reference requests
pub fn create_http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))
}

impl RpcClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Call `method` with empty params on the node behind `tunnel`
    pub async fn call(
        &self,
        tunnel: &Tunnel,
        rpc_path: &str,
        method: &str,
    ) -> Result<RpcValue, RpcError> {
        let url = tunnel.endpoint(rpc_path);
        self.call_url(&url, method).await
    }

    async fn call_url(&self, url: &str, method: &str) -> Result<RpcValue, RpcError> {
        let request_body = serde_json::json!({
            "jsonrpc": rpc::JSONRPC_VERSION,
            "method": method,
            "params": [],
            "id": rpc::REQUEST_ID
        });

        debug!("Calling {} on {}", method, url);

        let response = self
            .client
            .post(url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RpcError::Timeout {
                        url: url.to_string(),
                        method: method.to_string(),
                    }
                } else {
                    RpcError::ConnectionFailed {
                        url: url.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(RpcError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse {
                method: method.to_string(),
                reason: format!("Failed to parse JSON response: {}", e),
            })?;

        extract_result(method, body)
    }
}

fn extract_result(method: &str, body: Value) -> Result<RpcValue, RpcError> {
    let Value::Object(mut envelope) = body else {
        return Err(RpcError::InvalidResponse {
            method: method.to_string(),
            reason: "response is not a JSON object".to_string(),
        });
    };

    if let Some(error) = envelope.get("error").filter(|e| !e.is_null()) {
        return Err(RpcError::NodeError {
            method: method.to_string(),
            code: error.get("code").and_then(|c| c.as_i64()).unwrap_or_default(),
            message: error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string(),
        });
    }

    envelope
        .remove("result")
        .map(RpcValue::from)
        .ok_or_else(|| RpcError::MissingResult {
            method: method.to_string(),
        })
}
