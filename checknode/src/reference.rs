//! Latest block height from an independent Etherscan-compatible endpoint

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::constants::reference;
use crate::errors::{HexError, ReferenceError};
use crate::hex::parse_hex_quantity;

pub struct ReferenceFetcher {
    client: Client,
}

impl ReferenceFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// GET `<base>?module=proxy&action=eth_blockNumber` and decode `result`
    pub async fn fetch_latest_block(&self, chain: &str, base_url: &str) -> Result<i64, ReferenceError> {
        debug!("Fetching reference block for {} from {}", chain, base_url);

        let response = self
            .client
            .get(base_url)
            .query(&[("module", reference::MODULE), ("action", reference::ACTION)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReferenceError::Timeout {
                        url: base_url.to_string(),
                    }
                } else {
                    ReferenceError::RequestFailed {
                        url: base_url.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(ReferenceError::HttpStatus {
                url: base_url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ReferenceError::InvalidResponse {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        let block = match json.get("result") {
            None | Some(Value::Null) => {
                return Err(ReferenceError::MissingBlockNumber {
                    url: base_url.to_string(),
                })
            }
            Some(Value::String(hex)) => parse_hex_quantity(hex),
            Some(other) => Err(HexError::NotAString {
                value: other.to_string(),
            }),
        };

        block.map_err(|source| ReferenceError::Decode {
            url: base_url.to_string(),
            source,
        })
    }
}
