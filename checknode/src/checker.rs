//! Single-node check: tunnel, three RPC queries, reference lookup, verdict

use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::classifier::classify;
use crate::constants::rpc::{METHOD_BLOCK_NUMBER, METHOD_PEER_COUNT, METHOD_SYNCING};
use crate::errors::{CheckError, ReferenceError, RpcError};
use crate::reference::ReferenceFetcher;
use crate::rpc::RpcClient;
use crate::tunnel::{Tunnel, TunnelProvider};
use crate::types::{NodeResult, NodeTarget, RawSyncStatus};

/// Step of the check sequence at which a node failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStage {
    AcquireTunnel,
    QuerySyncStatus,
    QueryPeerCount,
    QueryBlockHeight,
    FetchReference,
}

impl fmt::Display for CheckStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckStage::AcquireTunnel => "port forward",
            CheckStage::QuerySyncStatus => "sync status",
            CheckStage::QueryPeerCount => "peers count",
            CheckStage::QueryBlockHeight => "latest block",
            CheckStage::FetchReference => "latest block from scanner",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct CheckFailure {
    pub chain: String,
    pub stage: CheckStage,
    pub error: CheckError,
}

impl CheckFailure {
    fn new(chain: &str, stage: CheckStage, error: impl Into<CheckError>) -> Self {
        Self {
            chain: chain.to_string(),
            stage,
            error: error.into(),
        }
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error getting {} for {}: {}", self.stage, self.chain, self.error)
    }
}

impl std::error::Error for CheckFailure {}

pub struct NodeChecker {
    tunnels: Arc<dyn TunnelProvider>,
    rpc: RpcClient,
    reference: ReferenceFetcher,
}

impl NodeChecker {
    pub fn new(tunnels: Arc<dyn TunnelProvider>, rpc: RpcClient, reference: ReferenceFetcher) -> Self {
        Self {
            tunnels,
            rpc,
            reference,
        }
    }

    /// Run the full sequence for one node. The tunnel is closed before this
    /// returns on every path; a panic closes it through `Drop`.
    pub async fn check(&self, target: &NodeTarget, local_port: u16) -> Result<NodeResult, CheckFailure> {
        let mut tunnel = self
            .tunnels
            .open(target, local_port)
            .await
            .map_err(|e| CheckFailure::new(&target.chain, CheckStage::AcquireTunnel, e))?;

        let outcome = self.query_node(target, &tunnel).await;
        tunnel.close();
        outcome
    }

    async fn query_node(&self, target: &NodeTarget, tunnel: &Tunnel) -> Result<NodeResult, CheckFailure> {
        let chain = target.chain.as_str();

        let status = self
            .rpc
            .call(tunnel, &target.rpc_path, METHOD_SYNCING)
            .await
            .map_err(|e| CheckFailure::new(chain, CheckStage::QuerySyncStatus, e))?;
        let raw_status = RawSyncStatus::from(&status);

        let peers_count = if target.has_peer_count {
            let peers = self
                .query_quantity(tunnel, target, METHOD_PEER_COUNT)
                .await
                .map_err(|e| CheckFailure::new(chain, CheckStage::QueryPeerCount, e))?;
            Some(peers)
        } else {
            debug!("Skipping peers count for {}", chain);
            None
        };

        let node_block = self
            .query_quantity(tunnel, target, METHOD_BLOCK_NUMBER)
            .await
            .map_err(|e| CheckFailure::new(chain, CheckStage::QueryBlockHeight, e))?;

        let latest_block = self
            .fetch_reference(target)
            .await
            .map_err(|e| CheckFailure::new(chain, CheckStage::FetchReference, e))?;

        let classification = classify(&raw_status, latest_block);
        if let Some(e) = &classification.error {
            warn!("Failed to determine node {} sync status: {}", chain, e);
        }

        Ok(NodeResult::new(
            chain,
            classification.verdict,
            node_block,
            latest_block,
            peers_count,
        ))
    }

    async fn fetch_reference(&self, target: &NodeTarget) -> Result<i64, ReferenceError> {
        let base_url = target
            .reference_url
            .as_deref()
            .ok_or_else(|| ReferenceError::NotConfigured {
                chain: target.chain.clone(),
            })?;
        self.reference.fetch_latest_block(&target.chain, base_url).await
    }

    async fn query_quantity(
        &self,
        tunnel: &Tunnel,
        target: &NodeTarget,
        method: &str,
    ) -> Result<i64, RpcError> {
        self.rpc
            .call(tunnel, &target.rpc_path, method)
            .await?
            .hex_quantity()
            .map_err(|source| RpcError::Decode {
                method: method.to_string(),
                source,
            })
    }
}
