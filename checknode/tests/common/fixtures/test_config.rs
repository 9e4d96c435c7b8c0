//! Test registry builder for creating node registries programmatically

use checknode::types::NodeTarget;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestNode {
    chain: String,
    service: String,
    port: u16,
    rpc_path: String,
    namespace: Option<String>,
    peer_count: Option<bool>,
    public_api: Option<String>,
}

/// Builder for `nodes_conf.toml` files
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    settings: Vec<String>,
    nodes: Vec<TestNode>,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
            settings: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Top-level `key = value` line, value written verbatim
    pub fn with_setting(mut self, key: &str, value: &str) -> Self {
        self.settings.push(format!("{} = {}", key, value));
        self
    }

    pub fn with_node(mut self, chain: &str, rpc_path: &str, public_api: &str) -> Self {
        self.nodes.push(TestNode {
            chain: chain.to_string(),
            service: format!("{}-node", chain),
            port: 8545,
            rpc_path: rpc_path.to_string(),
            namespace: None,
            peer_count: None,
            public_api: Some(public_api.to_string()),
        });
        self
    }

    pub fn with_node_options(
        mut self,
        chain: &str,
        namespace: Option<&str>,
        peer_count: Option<bool>,
        public_api: Option<&str>,
    ) -> Self {
        self.nodes.push(TestNode {
            chain: chain.to_string(),
            service: format!("{}-node", chain),
            port: 8545,
            rpc_path: "/".to_string(),
            namespace: namespace.map(str::to_string),
            peer_count,
            public_api: public_api.map(str::to_string),
        });
        self
    }

    pub fn to_toml(&self) -> String {
        let mut toml = String::new();
        for setting in &self.settings {
            toml.push_str(setting);
            toml.push('\n');
        }

        for node in &self.nodes {
            toml.push_str(&format!("\n[nodes.{}]\n", node.chain));
            toml.push_str(&format!("service = \"{}\"\n", node.service));
            toml.push_str(&format!("port = {}\n", node.port));
            toml.push_str(&format!("rpc_path = \"{}\"\n", node.rpc_path));
            if let Some(namespace) = &node.namespace {
                toml.push_str(&format!("namespace = \"{}\"\n", namespace));
            }
            if let Some(peer_count) = node.peer_count {
                toml.push_str(&format!("peer_count = {}\n", peer_count));
            }
        }

        toml.push_str("\n[public_apis]\n");
        for node in &self.nodes {
            if let Some(api) = &node.public_api {
                toml.push_str(&format!("{} = \"{}\"\n", node.chain, api));
            }
        }

        toml
    }

    /// Write the registry and keep the temp dir alive with it
    pub fn build(self) -> TestConfig {
        let path = self.temp_dir.path().join("nodes_conf.toml");
        fs::write(&path, self.to_toml()).expect("Failed to write registry");
        TestConfig {
            _temp_dir: self.temp_dir,
            path,
        }
    }
}

pub struct TestConfig {
    _temp_dir: TempDir,
    pub path: PathBuf,
}

/// Target for chain `eth` answering on `rpc_path`
pub fn eth_target(rpc_path: &str, reference_url: &str) -> NodeTarget {
    NodeTarget {
        chain: "eth".to_string(),
        service: "geth".to_string(),
        port: 8545,
        rpc_path: rpc_path.to_string(),
        namespace: "blockchains".to_string(),
        reference_url: Some(reference_url.to_string()),
        has_peer_count: true,
    }
}
