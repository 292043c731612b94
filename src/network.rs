//! Network selection

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{AirdropError, Result};

/// Directory under the home directory holding per-network credential files
pub const CREDENTIALS_DIR: &str = ".near-credentials";

/// Endpoints and key store location of one NEAR network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub network_id: String,
    /// JSON-RPC endpoint
    pub node_url: String,
    pub wallet_url: String,
    pub helper_url: String,
    pub explorer_url: String,
    /// Root of the unencrypted file system key store
    pub key_store_dir: PathBuf,
}

impl NetworkConfig {
    /// Explorer link for a transaction hash
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/transactions/{}", self.explorer_url, tx_hash)
    }
}

/// Pick the configuration for `name`, which must be `mainnet` or `testnet`
pub fn select_network(name: &str, key_store_dir: &Path) -> Result<NetworkConfig> {
    let config = match name {
        "mainnet" => NetworkConfig {
            network_id: "mainnet".to_string(),
            node_url: "https://rpc.mainnet.near.org".to_string(),
            wallet_url: "https://wallet.near.org".to_string(),
            helper_url: "https://helper.mainnet.near.org".to_string(),
            explorer_url: "https://explorer.mainnet.near.org".to_string(),
            key_store_dir: key_store_dir.to_path_buf(),
        },
        "testnet" => NetworkConfig {
            network_id: "testnet".to_string(),
            node_url: "https://rpc.testnet.near.org".to_string(),
            wallet_url: "https://wallet.testnet.near.org".to_string(),
            helper_url: "https://helper.testnet.near.org".to_string(),
            explorer_url: "https://explorer.testnet.near.org".to_string(),
            key_store_dir: key_store_dir.to_path_buf(),
        },
        other => {
            warn!("please choose a configuration");
            return Err(AirdropError::UnknownNetwork(other.to_string()));
        }
    };

    info!("configuration set to {}", config.network_id);
    Ok(config)
}

/// `$HOME/.near-credentials`
pub fn default_key_store_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(CREDENTIALS_DIR))
        .ok_or_else(|| AirdropError::Configuration("Cannot determine home directory".to_string()))
}
