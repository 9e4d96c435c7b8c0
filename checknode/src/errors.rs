//! Custom error types for the node checker
//!
//! Every per-node failure is typed so the orchestrator can log the offending
//! chain and cause. Only `ConfigError` is fatal to a whole run.

use std::fmt;

/// Main error type for a single node check
#[derive(Debug)]
pub enum CheckError {
    /// Port-forward establishment errors
    Tunnel(TunnelError),

    /// JSON-RPC transport or decode errors
    Rpc(RpcError),

    /// Reference endpoint errors
    Reference(ReferenceError),
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the registry file
    LoadFailed { path: String, reason: String },

    /// Registry is not valid TOML for the expected shape
    ParseError { reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    MissingRequired { field: String },

    /// Requested chain is not in the registry
    UnknownChain { chain: String },
}

/// Tunnel error variants
#[derive(Debug)]
pub enum TunnelError {
    /// The forwarding process could not be started
    SpawnFailed { chain: String, reason: String },

    /// The forwarding process exited before the tunnel became ready
    ProcessExited { chain: String, status: String },

    /// Something else already listens on the local port
    PortInUse {
        chain: String,
        local_port: u16,
        reason: String,
    },

    /// Local port did not accept connections before the deadline
    NotReady {
        chain: String,
        local_port: u16,
        waited_ms: u128,
    },
}

/// JSON-RPC error variants
#[derive(Debug)]
pub enum RpcError {
    /// Connection to the tunnel endpoint failed
    ConnectionFailed { url: String, reason: String },

    /// Request timeout
    Timeout { url: String, method: String },

    /// Endpoint answered with a non-success HTTP status
    HttpStatus { url: String, status: u16 },

    /// Body was not a JSON-RPC envelope
    InvalidResponse { method: String, reason: String },

    /// Node returned a JSON-RPC error object
    NodeError {
        method: String,
        code: i64,
        message: String,
    },

    /// Envelope has no `result` field
    MissingResult { method: String },

    /// `result` could not be decoded into the expected value
    Decode { method: String, source: HexError },
}

/// Reference endpoint error variants
#[derive(Debug)]
pub enum ReferenceError {
    /// HTTP request failed
    RequestFailed { url: String, reason: String },

    /// Request timeout
    Timeout { url: String },

    /// Endpoint answered with a non-success HTTP status
    HttpStatus { url: String, status: u16 },

    /// Body was not JSON
    InvalidResponse { url: String, reason: String },

    /// Response has no block number
    MissingBlockNumber { url: String },

    /// Block number could not be decoded
    Decode { url: String, source: HexError },

    /// Registry has no `public_apis` entry for the chain
    NotConfigured { chain: String },
}

/// Classification error variants
#[derive(Debug)]
pub enum ClassificationError {
    /// `startingBlock` is present but is not a hex quantity
    InvalidStartingBlock { value: String, source: HexError },
}

/// Hex quantity decode errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    /// Value is not a JSON string
    NotAString { value: String },

    /// Value lacks the `0x` prefix
    MissingPrefix { value: String },

    /// Nothing after the prefix
    Empty,

    /// Digits are not base-16 or overflow i64
    Invalid { value: String, reason: String },
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Tunnel(e) => write!(f, "Tunnel error: {}", e),
            CheckError::Rpc(e) => write!(f, "RPC error: {}", e),
            CheckError::Reference(e) => write!(f, "Reference error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
            ConfigError::UnknownChain { chain } => {
                write!(f, "Node '{}' not found in configuration", chain)
            }
        }
    }
}

impl fmt::Display for TunnelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunnelError::SpawnFailed { chain, reason } => {
                write!(f, "Failed to start port forward for {}: {}", chain, reason)
            }
            TunnelError::ProcessExited { chain, status } => {
                write!(f, "Port forward for {} exited early ({})", chain, status)
            }
            TunnelError::PortInUse {
                chain,
                local_port,
                reason,
            } => {
                write!(
                    f,
                    "Local port {} for {} is already in use: {}",
                    local_port, chain, reason
                )
            }
            TunnelError::NotReady {
                chain,
                local_port,
                waited_ms,
            } => {
                write!(
                    f,
                    "Port forward for {} not accepting connections on port {} after {}ms",
                    chain, local_port, waited_ms
                )
            }
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::ConnectionFailed { url, reason } => {
                write!(f, "Connection to {} failed: {}", url, reason)
            }
            RpcError::Timeout { url, method } => {
                write!(f, "Timeout while calling {} on {}", method, url)
            }
            RpcError::HttpStatus { url, status } => {
                write!(f, "{} returned HTTP {}", url, status)
            }
            RpcError::InvalidResponse { method, reason } => {
                write!(f, "Invalid response to {}: {}", method, reason)
            }
            RpcError::NodeError {
                method,
                code,
                message,
            } => {
                write!(f, "{} failed with code {}: {}", method, code, message)
            }
            RpcError::MissingResult { method } => {
                write!(f, "Response to {} has no result", method)
            }
            RpcError::Decode { method, source } => {
                write!(f, "Failed to decode {} result: {}", method, source)
            }
        }
    }
}

impl fmt::Display for ReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceError::RequestFailed { url, reason } => {
                write!(f, "Request to {} failed: {}", url, reason)
            }
            ReferenceError::Timeout { url } => write!(f, "Timeout while querying {}", url),
            ReferenceError::HttpStatus { url, status } => {
                write!(f, "{} returned HTTP {}", url, status)
            }
            ReferenceError::InvalidResponse { url, reason } => {
                write!(f, "Invalid response from {}: {}", url, reason)
            }
            ReferenceError::MissingBlockNumber { url } => {
                write!(f, "No block number found in response from {}", url)
            }
            ReferenceError::Decode { url, source } => {
                write!(f, "Invalid block number from {}: {}", url, source)
            }
            ReferenceError::NotConfigured { chain } => {
                write!(f, "No public API configured for {}", chain)
            }
        }
    }
}

impl fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationError::InvalidStartingBlock { value, source } => {
                write!(f, "Invalid startingBlock '{}': {}", value, source)
            }
        }
    }
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexError::NotAString { value } => write!(f, "expected hex string, got {}", value),
            HexError::MissingPrefix { value } => write!(f, "'{}' is missing the 0x prefix", value),
            HexError::Empty => write!(f, "no digits after 0x prefix"),
            HexError::Invalid { value, reason } => {
                write!(f, "'{}' is not a valid hex quantity: {}", value, reason)
            }
        }
    }
}

impl std::error::Error for CheckError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for TunnelError {}
impl std::error::Error for RpcError {}
impl std::error::Error for ReferenceError {}
impl std::error::Error for ClassificationError {}
impl std::error::Error for HexError {}

impl From<TunnelError> for CheckError {
    fn from(err: TunnelError) -> Self {
        CheckError::Tunnel(err)
    }
}

impl From<RpcError> for CheckError {
    fn from(err: RpcError) -> Self {
        CheckError::Rpc(err)
    }
}

impl From<ReferenceError> for CheckError {
    fn from(err: ReferenceError) -> Self {
        CheckError::Reference(err)
    }
}
