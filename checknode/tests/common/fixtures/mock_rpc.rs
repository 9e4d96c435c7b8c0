//! Mock node RPC server
//!
//! Answers JSON-RPC calls per method so a check sequence can be scripted
//! without a real node behind a tunnel.

use checknode::hex::to_hex_quantity;
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub struct MockRpcServer {
    pub server: MockServer,
    pub port: u16,
}

impl MockRpcServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let port = server.address().port();
        Self { server, port }
    }

    /// Answer `rpc_method` on `rpc_path` with `result`
    pub async fn mock_result(&self, rpc_path: &str, rpc_method: &str, result: Value) {
        Mock::given(method("POST"))
            .and(path(rpc_path))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": result
            })))
            .mount(&self.server)
            .await;
    }

    /// Node that reports `eth_syncing = false`
    pub async fn mock_synced_node(&self, rpc_path: &str, peers: u64, block: u64) {
        self.mock_result(rpc_path, "eth_syncing", json!(false)).await;
        self.mock_result(rpc_path, "net_peerCount", json!(to_hex_quantity(peers)))
            .await;
        self.mock_result(rpc_path, "eth_blockNumber", json!(to_hex_quantity(block)))
            .await;
    }

    /// Node that reports a sync in progress from `starting_block`
    pub async fn mock_syncing_node(&self, rpc_path: &str, starting_block: u64, peers: u64, block: u64) {
        self.mock_result(
            rpc_path,
            "eth_syncing",
            json!({
                "startingBlock": to_hex_quantity(starting_block),
                "currentBlock": to_hex_quantity(block),
                "highestBlock": to_hex_quantity(block + 100)
            }),
        )
        .await;
        self.mock_result(rpc_path, "net_peerCount", json!(to_hex_quantity(peers)))
            .await;
        self.mock_result(rpc_path, "eth_blockNumber", json!(to_hex_quantity(block)))
            .await;
    }

    /// Answer `rpc_method` with a bare HTTP status
    pub async fn mock_http_status(&self, rpc_path: &str, rpc_method: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(rpc_path))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Answer `rpc_method` with a JSON-RPC error object
    pub async fn mock_rpc_error(&self, rpc_path: &str, rpc_method: &str, code: i64, message: &str) {
        Mock::given(method("POST"))
            .and(path(rpc_path))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": code, "message": message }
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer `rpc_method` with a body that is not JSON
    pub async fn mock_garbage(&self, rpc_path: &str, rpc_method: &str) {
        Mock::given(method("POST"))
            .and(path(rpc_path))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>bad gateway</html>"))
            .mount(&self.server)
            .await;
    }

    /// JSON-RPC methods received so far, in arrival order
    pub async fn received_methods(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| request.body_json::<Value>().ok())
            .filter_map(|body| body["method"].as_str().map(str::to_string))
            .collect()
    }
}
