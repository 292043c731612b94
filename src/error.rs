//! Error types for the airdrop library

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, AirdropError>;

/// Main error type for the library
#[derive(Debug, Error)]
pub enum AirdropError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Settings could not be loaded or deserialized
    #[error("Settings error: {0}")]
    Settings(#[from] ::config::ConfigError),

    /// Network name matched neither known configuration
    #[error("Unknown network '{0}', expected 'mainnet' or 'testnet'")]
    UnknownNetwork(String),

    /// Credential file missing or unreadable
    #[error("Key store error: {0}")]
    KeyStore(String),

    /// Malformed public or secret key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Amount that cannot be converted to base units
    #[error("Invalid amount '{amount}': {reason}")]
    InvalidAmount { amount: String, reason: String },

    /// Transport level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error object returned by the JSON-RPC node
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Transaction was included but its execution failed
    #[error("Execution failed for transaction {tx_hash}: {failure}")]
    ExecutionFailed { tx_hash: String, failure: String },

    /// A single airdrop transfer failed
    #[error("Transfer #{index} to {receiver_id} failed: {source}")]
    TransferFailed {
        index: usize,
        receiver_id: String,
        #[source]
        source: Box<AirdropError>,
    },

    /// JSON encoding or decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AirdropError {
    /// Error kind without the per-entry wrapper
    pub fn root(&self) -> &AirdropError {
        match self {
            AirdropError::TransferFailed { source, .. } => source.root(),
            other => other,
        }
    }
}
