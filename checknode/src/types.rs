//! Check targets, sync verdicts and per-node results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rpc::RpcValue;

/// One checkable node, resolved from the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTarget {
    pub chain: String,
    pub service: String,
    pub port: u16,
    pub rpc_path: String,
    pub namespace: String,
    /// `public_apis.<chain>`; `None` fails the node at the reference stage
    pub reference_url: Option<String>,
    pub has_peer_count: bool,
}

/// Classifier output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncVerdict {
    Synced,
    Syncing,
    Unknown,
}

impl SyncVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncVerdict::Synced => "synced",
            SyncVerdict::Syncing => "syncing",
            SyncVerdict::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SyncVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded `eth_syncing` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSyncStatus {
    /// Node answered with a boolean
    NotSyncing,
    /// Node reports a sync in progress
    Syncing { starting_block: String },
    Unrecognized,
}

impl From<&RpcValue> for RawSyncStatus {
    fn from(value: &RpcValue) -> Self {
        match value {
            RpcValue::Bool(_) => RawSyncStatus::NotSyncing,
            RpcValue::Object(fields) => match fields.get("startingBlock").and_then(|v| v.as_str()) {
                Some(starting_block) => RawSyncStatus::Syncing {
                    starting_block: starting_block.to_string(),
                },
                None => RawSyncStatus::Unrecognized,
            },
            RpcValue::Hex(_) | RpcValue::Other(_) => RawSyncStatus::Unrecognized,
        }
    }
}

/// Outcome of one successful node check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeResult {
    pub chain: String,
    pub sync_status: SyncVerdict,
    pub node_block: i64,
    pub latest_block: i64,
    /// `latest_block - node_block`
    pub diff: i64,
    pub peers_count: Option<i64>,
    pub checked_at: DateTime<Utc>,
}

impl NodeResult {
    pub fn new(
        chain: &str,
        sync_status: SyncVerdict,
        node_block: i64,
        latest_block: i64,
        peers_count: Option<i64>,
    ) -> Self {
        Self {
            chain: chain.to_string(),
            sync_status,
            node_block,
            latest_block,
            diff: latest_block - node_block,
            peers_count,
            checked_at: Utc::now(),
        }
    }
}
