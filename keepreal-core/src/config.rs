//! Environment-driven configuration with sensible defaults.

use std::path::PathBuf;

/// Devnet RPC endpoint used when no override is configured.
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Pinning service REST API base.
pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";

/// Public gateway prefix used to resolve pinned content.
pub const DEFAULT_IPFS_GATEWAY: &str = "https://gateway.pinata.cloud/ipfs/";

#[derive(Debug, Clone)]
pub struct Config {
    /// Ledger RPC endpoint (default: Solana devnet).
    pub rpc_url: String,
    /// Pinning service API base URL.
    pub pinata_api_url: String,
    /// Bearer credential for the pinning service. Absence selects the mock
    /// content store only when `allow_mock_store` is set.
    pub pinata_jwt: Option<String>,
    /// Gateway prefix for resolving content identifiers.
    pub ipfs_gateway: String,
    /// Directory holding the per-owner gallery cache.
    pub data_dir: PathBuf,
    /// Permit the deterministic mock content store when the pinning
    /// credential is missing (default: debug builds only).
    pub allow_mock_store: bool,
    /// Request timeout for pinning uploads and gateway fetches, in seconds.
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            pinata_api_url: DEFAULT_PINATA_API_URL.to_string(),
            pinata_jwt: None,
            ipfs_gateway: DEFAULT_IPFS_GATEWAY.to_string(),
            data_dir: PathBuf::from(".keepreal"),
            allow_mock_store: cfg!(debug_assertions),
            http_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let rpc_url = std::env::var("KEEPREAL_RPC_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        let pinata_api_url = std::env::var("KEEPREAL_PINATA_API_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PINATA_API_URL.to_string());

        let pinata_jwt = std::env::var("KEEPREAL_PINATA_JWT")
            .ok()
            .filter(|v| !v.is_empty());

        let ipfs_gateway = std::env::var("KEEPREAL_IPFS_GATEWAY")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_IPFS_GATEWAY.to_string());

        let data_dir = std::env::var("KEEPREAL_DATA_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".keepreal"));

        let allow_mock_store = std::env::var("KEEPREAL_ALLOW_MOCK_STORE")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(cfg!(debug_assertions));

        let http_timeout_secs = std::env::var("KEEPREAL_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Self {
            rpc_url,
            pinata_api_url,
            pinata_jwt,
            ipfs_gateway,
            data_dir,
            allow_mock_store,
            http_timeout_secs,
        }
    }
}
