//! Mock Etherscan-compatible reference API

use checknode::hex::to_hex_quantity;
use serde_json::json;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub struct MockReferenceServer {
    pub server: MockServer,
}

impl MockReferenceServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Value for `public_apis.<chain>`
    pub fn base_url(&self) -> String {
        format!("{}/api", self.server.uri())
    }

    pub async fn mock_latest_block(&self, block: u64) {
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("module", "proxy"))
            .and(query_param("action", "eth_blockNumber"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 83,
                "result": to_hex_quantity(block)
            })))
            .mount(&self.server)
            .await;
    }

    /// Rate-limited style answer without a `result` field
    pub async fn mock_missing_result(&self) {
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "NOTOK"
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_malformed_result(&self, result: &str) {
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 83,
                "result": result
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_unavailable(&self) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&self.server)
            .await;
    }
}
