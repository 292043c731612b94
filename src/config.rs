//! Airdrop settings: defaults, optional settings file, `AIRDROP_*` environment

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::network::{default_key_store_dir, select_network, NetworkConfig};
use crate::units::parse_base_units;

/// Settings file looked up in the working directory when no path is given
pub const DEFAULT_SETTINGS_FILE: &str = "airdrop";

/// Environment variable prefix, e.g. `AIRDROP_NETWORK`, `AIRDROP_GAS__MAX`
pub const ENV_PREFIX: &str = "AIRDROP";

/// One recipient and the whole-token amount sent to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirdropEntry {
    pub receiver_id: String,
    pub amount: String,
}

impl AirdropEntry {
    pub fn new(receiver_id: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            receiver_id: receiver_id.into(),
            amount: amount.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub network: String,
    /// Signer account
    pub account_id: String,
    pub token_contract_id: String,
    pub staking_contract_id: String,
    pub nft_contract_id: String,
    /// Defaults to `$HOME/.near-credentials`
    #[serde(default)]
    pub key_store_dir: Option<PathBuf>,
    /// Value of `msg` inside the transfer memo
    pub memo: String,
    pub gas: GasSettings,
    pub deposit: DepositSettings,
    pub recipients: Vec<AirdropEntry>,
    pub holders: HoldersSettings,
    pub staking: StakingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasSettings {
    pub ft_transfer: u64,
    pub max: u64,
}

/// Deposits in yoctoNEAR, kept as strings since they exceed 64 bits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositSettings {
    /// Attached to `ft_transfer`, `claim_reward` and `unstake`
    pub call: String,
    /// Attached to `nft_approve`
    pub stake: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldersSettings {
    pub from_index: String,
    pub limit: u64,
    pub amount: String,
    #[serde(default)]
    pub excluded_owner: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingSettings {
    pub token_id: String,
    pub stake_msg: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: "mainnet".to_string(),
            account_id: "kokumokongz_token_wallet.near".to_string(),
            token_contract_id: "kokumokongz_token_wallet.near".to_string(),
            staking_contract_id: "kokumokongz_staking_wallet.near".to_string(),
            nft_contract_id: "banc.neartopia.near".to_string(),
            key_store_dir: None,
            memo: "Airdrop to NFT Holder".to_string(),
            gas: GasSettings {
                ft_transfer: 4_000_000_000_000,
                max: 300_000_000_000_000,
            },
            deposit: DepositSettings {
                call: "1".to_string(),
                stake: "450000000000000000000".to_string(),
            },
            recipients: default_recipients(),
            holders: HoldersSettings {
                from_index: "580".to_string(),
                limit: 15,
                amount: "100".to_string(),
                excluded_owner: Some("vexpremint.near".to_string()),
            },
            staking: StakingSettings {
                token_id: "QmVmz2KGaWW9qWvzajHSGNjpx1odxaXBaCGeaNwd8JsFyo".to_string(),
                stake_msg: "Stake to Platform".to_string(),
            },
        }
    }
}

/// The built-in recipient table
pub fn default_recipients() -> Vec<AirdropEntry> {
    [
        ("veejayrex.near", "200"),
        ("hessmart.near", "200"),
        ("newein.near", "100"),
        ("a5e34454d4262f68c2a6613b76f6ecfe1f00cd3af08698e1ae4b5247d1d6e9dd", "200"),
        ("moffelvdbuurt.near", "500"),
        ("khanamjad096.near", "100"),
        ("aldi100.near", "100"),
        ("r76.near", "200"),
        ("codedforum.near", "100"),
        ("onium.near", "100"),
    ]
    .into_iter()
    .map(|(receiver_id, amount)| AirdropEntry::new(receiver_id, amount))
    .collect()
}

impl Settings {
    /// Built-in defaults, then the settings file, then `AIRDROP_*` variables.
    ///
    /// An explicit `path` must exist; the default `airdrop.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => ::config::File::from(path),
            None => ::config::File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };

        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    pub fn key_store_dir(&self) -> Result<PathBuf> {
        match &self.key_store_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_key_store_dir(),
        }
    }

    /// Resolve the configured network name
    pub fn network_config(&self) -> Result<NetworkConfig> {
        select_network(&self.network, &self.key_store_dir()?)
    }

    pub fn call_deposit(&self) -> Result<u128> {
        parse_base_units(&self.deposit.call)
    }

    pub fn stake_deposit(&self) -> Result<u128> {
        parse_base_units(&self.deposit.stake)
    }

    /// JSON memo attached to every transfer, `{"msg":"..."}`
    pub fn memo_json(&self) -> String {
        serde_json::json!({ "msg": self.memo }).to_string()
    }
}
