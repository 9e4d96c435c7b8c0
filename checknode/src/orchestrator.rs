//! Concurrent fan-out of node checks with a wait-for-all join

use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::checker::NodeChecker;
use crate::config::Config;
use crate::errors::ConfigError;
use crate::reference::ReferenceFetcher;
use crate::rpc::{create_http_client, RpcClient};
use crate::tunnel::{PortForward, TunnelProvider};
use crate::types::{NodeResult, NodeTarget};

pub struct Orchestrator {
    checker: Arc<NodeChecker>,
    base_local_port: u16,
}

impl Orchestrator {
    pub fn new(checker: NodeChecker, base_local_port: u16) -> Self {
        Self {
            checker: Arc::new(checker),
            base_local_port,
        }
    }

    /// Wire the real port-forward transport and HTTP clients from config
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let tunnels: Arc<dyn TunnelProvider> = Arc::new(PortForward::new(
            &config.tunnel_program,
            Duration::from_secs(config.tunnel_ready_timeout_seconds),
        ));
        let client = create_http_client(Duration::from_secs(config.rpc_timeout_seconds))?;

        let checker = NodeChecker::new(
            tunnels,
            RpcClient::new(client.clone()),
            ReferenceFetcher::new(client),
        );

        Ok(Self::new(checker, config.base_local_port))
    }

    /// Check every target in parallel and keep the successful results.
    /// Failed nodes are logged and left out of the returned map.
    pub async fn run_all(
        &self,
        targets: Vec<NodeTarget>,
    ) -> Result<BTreeMap<String, NodeResult>, ConfigError> {
        let ports = allocate_local_ports(self.base_local_port, targets.len())?;

        info!("Checking {} nodes", targets.len());

        let mut chains = Vec::with_capacity(targets.len());
        let mut tasks = Vec::with_capacity(targets.len());

        for (target, local_port) in targets.into_iter().zip(ports) {
            chains.push(target.chain.clone());
            let checker = self.checker.clone();
            tasks.push(tokio::spawn(async move {
                checker.check(&target, local_port).await
            }));
        }

        let mut results = BTreeMap::new();
        for (chain, outcome) in chains.into_iter().zip(join_all(tasks).await) {
            match outcome {
                Ok(Ok(result)) => {
                    info!(
                        "{}: {} at block {} (diff {})",
                        chain, result.sync_status, result.node_block, result.diff
                    );
                    results.insert(chain, result);
                }
                Ok(Err(failure)) => error!("{}", failure),
                Err(e) => error!("Check task for {} panicked: {}", chain, e),
            }
        }

        Ok(results)
    }
}

/// One distinct local port per target, `base + 1 ..= base + count`
pub fn allocate_local_ports(base: u16, count: usize) -> Result<Vec<u16>, ConfigError> {
    let highest = base as usize + count;
    if highest > u16::MAX as usize {
        return Err(ConfigError::InvalidValue {
            field: "base_local_port".to_string(),
            reason: format!("{} tunnels do not fit above port {}", count, base),
        });
    }

    Ok((1..=count).map(|offset| base + offset as u16).collect())
}
