pub mod manager;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::{chains, rpc, tunnel};
use crate::errors::ConfigError;
use crate::orchestrator::allocate_local_ports;
use crate::types::NodeTarget;

pub use manager::ConfigManager;

/// Node registry: the nodes to check plus the reference endpoint per chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_seconds: u64,
    #[serde(default = "default_ready_timeout")]
    pub tunnel_ready_timeout_seconds: u64,
    #[serde(default = "default_base_local_port")]
    pub base_local_port: u16,
    #[serde(default = "default_tunnel_program")]
    pub tunnel_program: String,
    pub nodes: HashMap<String, NodeConfig>,
    #[serde(default)]
    pub public_apis: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub service: String,
    pub port: u16,
    pub rpc_path: String,
    pub namespace: Option<String>,
    /// Overrides the built-in list of chains without `net_peerCount`
    pub peer_count: Option<bool>,
}

fn default_rpc_timeout() -> u64 {
    rpc::DEFAULT_TIMEOUT_SECONDS
}

fn default_ready_timeout() -> u64 {
    tunnel::DEFAULT_READY_TIMEOUT_SECONDS
}

fn default_base_local_port() -> u16 {
    tunnel::DEFAULT_BASE_LOCAL_PORT
}

fn default_tunnel_program() -> String {
    tunnel::DEFAULT_PROGRAM.to_string()
}

/// Which configured chains a run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainSelector {
    All,
    One(String),
}

impl ChainSelector {
    pub fn from_arg(chain: Option<String>) -> Self {
        match chain {
            Some(chain) => ChainSelector::One(chain),
            None => ChainSelector::All,
        }
    }
}

impl Config {
    /// Reject registries that cannot produce a usable run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "nodes".to_string(),
            });
        }

        if self.rpc_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rpc_timeout_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.tunnel_program.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "tunnel_program".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        allocate_local_ports(self.base_local_port, self.nodes.len())?;

        for (chain, node) in &self.nodes {
            if node.service.trim().is_empty() {
                return Err(ConfigError::MissingRequired {
                    field: format!("nodes.{}.service", chain),
                });
            }
            if node.port == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("nodes.{}.port", chain),
                    reason: "must be greater than zero".to_string(),
                });
            }
            if !node.rpc_path.starts_with('/') {
                return Err(ConfigError::InvalidValue {
                    field: format!("nodes.{}.rpc_path", chain),
                    reason: format!("'{}' must start with '/'", node.rpc_path),
                });
            }
        }

        Ok(())
    }

    /// Resolve the selector into check targets, sorted by chain id
    pub fn targets(&self, selector: &ChainSelector) -> Result<Vec<NodeTarget>, ConfigError> {
        let mut chains: Vec<&String> = match selector {
            ChainSelector::All => self.nodes.keys().collect(),
            ChainSelector::One(chain) => {
                let (key, _) = self.nodes.get_key_value(chain).ok_or_else(|| {
                    ConfigError::UnknownChain {
                        chain: chain.clone(),
                    }
                })?;
                vec![key]
            }
        };
        chains.sort();

        chains
            .into_iter()
            .map(|chain| self.target_for(chain))
            .collect()
    }

    fn target_for(&self, chain: &str) -> Result<NodeTarget, ConfigError> {
        let node = self
            .nodes
            .get(chain)
            .ok_or_else(|| ConfigError::UnknownChain {
                chain: chain.to_string(),
            })?;

        // A chain without a reference endpoint fails on its own at check time
        let reference_url = self
            .public_apis
            .get(chain)
            .filter(|url| !url.trim().is_empty())
            .cloned();

        Ok(NodeTarget {
            chain: chain.to_string(),
            service: node.service.clone(),
            port: node.port,
            rpc_path: node.rpc_path.clone(),
            namespace: node
                .namespace
                .clone()
                .unwrap_or_else(|| tunnel::DEFAULT_NAMESPACE.to_string()),
            reference_url,
            has_peer_count: node
                .peer_count
                .unwrap_or_else(|| !chains::WITHOUT_PEER_COUNT.contains(&chain)),
        })
    }
}
