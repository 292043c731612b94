//! Connection to a network and signing account handles

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AirdropError, Result};
use crate::key_store::FileKeyStore;
use crate::network::NetworkConfig;
use crate::provider::{AccessKeyList, ExecutionOutcome, JsonRpcProvider};
use crate::signer::InMemorySigner;
use crate::transaction::{decode_block_hash, FunctionCall, Transaction};

/// Operations the airdrop workflows need from an account
#[async_trait]
pub trait ContractCaller: Send + Sync {
    /// Signer account id
    fn account_id(&self) -> &str;

    async fn access_keys(&self) -> Result<AccessKeyList>;

    /// Sign, send and wait for a change call
    async fn function_call(&self, call: &FunctionCall) -> Result<ExecutionOutcome>;

    async fn view_function(&self, contract_id: &str, method_name: &str, args: &Value) -> Result<Value>;
}

/// Provider plus key store for one network
#[derive(Debug, Clone)]
pub struct Connection {
    config: NetworkConfig,
    provider: Arc<JsonRpcProvider>,
    key_store: FileKeyStore,
}

impl Connection {
    pub fn connect(config: &NetworkConfig) -> Result<Self> {
        let provider = JsonRpcProvider::new(&config.node_url)?;
        debug!("Connected to {} via {}", config.network_id, config.node_url);

        Ok(Self {
            config: config.clone(),
            provider: Arc::new(provider),
            key_store: FileKeyStore::new(&config.key_store_dir),
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn provider(&self) -> Arc<JsonRpcProvider> {
        Arc::clone(&self.provider)
    }

    /// Account handle signing with the stored key of `account_id`
    pub async fn account(&self, account_id: &str) -> Result<Account> {
        let signer = self.key_store.signer(&self.config.network_id, account_id).await?;
        info!("Loaded key {} for {}", signer.public_key(), account_id);

        Ok(Account::new(self.provider(), signer))
    }
}

/// Account able to sign transactions
#[derive(Debug, Clone)]
pub struct Account {
    provider: Arc<JsonRpcProvider>,
    signer: InMemorySigner,
    /// Last nonce this handle signed with, shared by clones
    last_nonce: Arc<AtomicU64>,
}

impl Account {
    pub fn new(provider: Arc<JsonRpcProvider>, signer: InMemorySigner) -> Self {
        Self {
            provider,
            signer,
            last_nonce: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn signer(&self) -> &InMemorySigner {
        &self.signer
    }

    /// Reserve the nonce for the next transaction.
    ///
    /// The node's view of the access key can lag behind transactions this
    /// handle already sent, so the higher of the viewed and the last used
    /// nonce wins.
    fn next_nonce(&self, viewed: u64) -> u64 {
        let previous = self
            .last_nonce
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(last.max(viewed) + 1))
            .unwrap_or_else(|last| last);
        previous.max(viewed) + 1
    }
}

#[async_trait]
impl ContractCaller for Account {
    fn account_id(&self) -> &str {
        self.signer.account_id()
    }

    async fn access_keys(&self) -> Result<AccessKeyList> {
        self.provider.view_access_key_list(self.account_id()).await
    }

    async fn function_call(&self, call: &FunctionCall) -> Result<ExecutionOutcome> {
        let access_key = self
            .provider
            .view_access_key(self.account_id(), &self.signer.public_key())
            .await?;
        let block_hash = decode_block_hash(&access_key.block_hash)?;

        let nonce = self.next_nonce(access_key.nonce);

        let signed = Transaction::function_call(call, &self.signer, nonce, block_hash)?
            .sign(&self.signer)?;
        debug!(
            "Sending {}.{} as {} (nonce {}, tx {})",
            call.contract_id,
            call.method_name,
            self.account_id(),
            signed.transaction.nonce,
            signed.hash()
        );

        let outcome = self.provider.broadcast_tx_commit(&signed).await?;
        for (receipt_id, log) in outcome.logs() {
            info!("Receipt: {}\tLog: {}", receipt_id, log);
        }

        if let Some(failure) = outcome.failure() {
            return Err(AirdropError::ExecutionFailed {
                tx_hash: outcome.tx_hash().to_string(),
                failure: failure.to_string(),
            });
        }

        Ok(outcome)
    }

    async fn view_function(&self, contract_id: &str, method_name: &str, args: &Value) -> Result<Value> {
        self.provider.view_function(contract_id, method_name, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        let provider = JsonRpcProvider::new("http://127.0.0.1:3030").unwrap();
        Account::new(Arc::new(provider), InMemorySigner::from_seed("token.near", [1u8; 32]))
    }

    #[test]
    fn test_next_nonce_survives_lagging_view() {
        let account = account();

        assert_eq!(account.next_nonce(41), 42);
        assert_eq!(account.next_nonce(41), 43);
        assert_eq!(account.next_nonce(42), 44);
    }

    #[test]
    fn test_next_nonce_follows_view_ahead_of_cache() {
        let account = account();
        assert_eq!(account.next_nonce(5), 6);

        // key used elsewhere in the meantime
        assert_eq!(account.next_nonce(100), 101);
        assert_eq!(account.clone().next_nonce(100), 102);
    }
}
