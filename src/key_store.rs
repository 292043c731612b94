//! Unencrypted file system key store, the layout near-cli writes to

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::error::{AirdropError, Result};
use crate::signer::{InMemorySigner, PublicKey};

/// Contents of `<network>/<account>.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialFile {
    pub account_id: String,
    #[serde(default)]
    pub public_key: Option<PublicKey>,
    #[serde(alias = "secret_key")]
    pub private_key: String,
}

/// Reads credentials from `<root>/<network_id>/<account_id>.json`
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    root: PathBuf,
}

impl FileKeyStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn credential_path(&self, network_id: &str, account_id: &str) -> PathBuf {
        self.root.join(network_id).join(format!("{}.json", account_id))
    }

    /// Load the signer for `account_id` on `network_id`
    pub async fn signer(&self, network_id: &str, account_id: &str) -> Result<InMemorySigner> {
        let path = self.credential_path(network_id, account_id);
        debug!("Loading credentials from {}", path.display());

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AirdropError::KeyStore(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let credentials: CredentialFile = serde_json::from_str(&content).map_err(|e| {
            AirdropError::KeyStore(format!("Malformed credential file {}: {}", path.display(), e))
        })?;

        if credentials.account_id != account_id {
            return Err(AirdropError::KeyStore(format!(
                "Credential file {} belongs to {}, expected {}",
                path.display(),
                credentials.account_id,
                account_id
            )));
        }

        let signer = InMemorySigner::from_secret_key(account_id, &credentials.private_key)?;
        if let Some(public_key) = credentials.public_key {
            if public_key != signer.public_key() {
                return Err(AirdropError::KeyStore(format!(
                    "Public key {} does not match the private key in {}",
                    public_key,
                    path.display()
                )));
            }
        }

        Ok(signer)
    }
}
