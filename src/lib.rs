//! NEAR token airdrop library
//!
//! Sends NEP-141 `ft_transfer` calls from one account to a list of recipients,
//! one transaction at a time, over plain NEAR JSON-RPC.
//!
//! # Example
//!
//! ```rust,no_run
//! use near_token_airdrop::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = Settings::load(None)?;
//!     let network = settings.network_config()?;
//!
//!     let connection = Connection::connect(&network)?;
//!     let account = connection.account(&settings.account_id).await?;
//!
//!     let runner = AirdropRunner::new(&account, TransferPlan::from_settings(&settings)?);
//!     let receipts = runner.run(&settings.recipients).await?;
//!
//!     println!("{} transfers sent", receipts.len());
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod airdrop;
pub mod config;
pub mod error;
pub mod key_store;
pub mod network;
pub mod provider;
pub mod signer;
pub mod staking;
pub mod transaction;
pub mod units;

pub use account::{Account, Connection, ContractCaller};
pub use airdrop::{AirdropRunner, HolderAirdropSummary, NftToken, TransferPlan, TransferReceipt};
pub use config::{AirdropEntry, Settings};
pub use error::{AirdropError, Result};
pub use network::{select_network, NetworkConfig};
pub use provider::{AccessKeyList, ExecutionOutcome, JsonRpcProvider};
pub use signer::{InMemorySigner, PublicKey};
pub use staking::StakingPlan;
pub use transaction::FunctionCall;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::account::{Account, Connection, ContractCaller};
    pub use crate::airdrop::{AirdropRunner, TransferPlan, TransferReceipt};
    pub use crate::config::{AirdropEntry, Settings};
    pub use crate::error::{AirdropError, Result};
    pub use crate::network::{select_network, NetworkConfig};
    pub use crate::provider::ExecutionOutcome;
    pub use crate::staking::StakingPlan;
    pub use crate::transaction::FunctionCall;
    pub use crate::units::{parse_token_amount, ONE_TOKEN, ONE_YOCTO};
}
