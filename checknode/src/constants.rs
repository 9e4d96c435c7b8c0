//! Defaults and fixed protocol values, grouped by concern

use std::time::Duration;

/// Port-forward tunnel constants
pub mod tunnel {
    use super::Duration;

    /// Program used to open tunnels
    pub const DEFAULT_PROGRAM: &str = "kubectl";

    /// Namespace used when a node does not set one
    pub const DEFAULT_NAMESPACE: &str = "blockchains";

    /// Local ports are allocated from `base + 1` upwards
    pub const DEFAULT_BASE_LOCAL_PORT: u16 = 8080;

    /// Upper bound for the readiness probe
    pub const DEFAULT_READY_TIMEOUT_SECONDS: u64 = 5;

    /// Delay between readiness probe attempts
    pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(200);

    /// Host the forwarded port is bound on
    pub const LOCAL_HOST: &str = "127.0.0.1";
}

/// JSON-RPC constants
pub mod rpc {
    pub const JSONRPC_VERSION: &str = "2.0";

    /// Fixed request id; every call is a single request on its own connection
    pub const REQUEST_ID: u64 = 1;

    pub const METHOD_SYNCING: &str = "eth_syncing";
    pub const METHOD_PEER_COUNT: &str = "net_peerCount";
    pub const METHOD_BLOCK_NUMBER: &str = "eth_blockNumber";

    /// Default timeout in seconds for every HTTP request
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
}

/// Reference endpoint constants
pub mod reference {
    pub const MODULE: &str = "proxy";
    pub const ACTION: &str = "eth_blockNumber";
}

/// Sync classification constants
pub mod sync {
    /// A node whose sync started more than this many blocks below the
    /// reference head is still catching up
    pub const TOLERANCE_BLOCKS: i64 = 20;
}

/// Chain-specific quirks
pub mod chains {
    /// Chains without a meaningful `net_peerCount`
    pub const WITHOUT_PEER_COUNT: &[&str] = &["arb"];
}

/// Registry location defaults
pub mod registry {
    /// Path relative to `$HOME`
    pub const DEFAULT_RELATIVE_PATH: &str = "bin/nodes_conf.toml";
}
