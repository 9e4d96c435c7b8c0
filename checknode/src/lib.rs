pub mod checker;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod errors;
pub mod hex;
pub mod orchestrator;
pub mod reference;
pub mod report;
pub mod rpc;
pub mod tunnel;
pub mod types;

// Re-export commonly used types
pub use checker::{CheckFailure, CheckStage, NodeChecker};
pub use classifier::{classify, Classification};
pub use config::{ChainSelector, Config, ConfigManager, NodeConfig};
pub use orchestrator::Orchestrator;
pub use reference::ReferenceFetcher;
pub use rpc::{RpcClient, RpcValue};
pub use tunnel::{PortForward, Tunnel, TunnelProvider};
pub use types::{NodeResult, NodeTarget, RawSyncStatus, SyncVerdict};
