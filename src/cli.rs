//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use near_token_airdrop::Settings;

#[derive(Parser, Debug)]
#[command(name = "near-token-airdrop")]
#[command(about = "Send NEP-141 token airdrops over NEAR JSON-RPC", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (TOML); `airdrop.toml` is used when present
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Network to use (mainnet or testnet)
    #[arg(short, long)]
    pub network: Option<String>,

    /// Signer account id
    #[arg(short, long)]
    pub account: Option<String>,

    /// Token contract receiving the ft_transfer calls
    #[arg(short, long)]
    pub token_contract: Option<String>,

    /// Credential store root
    #[arg(long)]
    pub key_store_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Operation to run, the airdrop when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Send the configured recipient list one transfer at a time
    Airdrop,

    /// Print the signer's access keys
    AccessKeys,

    /// Airdrop to holders of unapproved tokens of the NFT contract
    Holders {
        /// First token index to scan
        #[arg(long)]
        from_index: Option<String>,

        /// Number of tokens to scan
        #[arg(short, long)]
        limit: Option<u64>,

        /// Whole tokens sent to each holder
        #[arg(long)]
        amount: Option<String>,
    },

    /// Approve an NFT to the staking contract
    Stake {
        /// Token to stake
        #[arg(long)]
        token_id: Option<String>,
    },

    /// Claim staking rewards
    Claim,

    /// Withdraw an NFT from the staking contract
    Unstake {
        /// Token to unstake
        #[arg(long)]
        token_id: Option<String>,
    },
}

impl Cli {
    /// Apply flag overrides on top of the loaded settings
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(network) = &self.network {
            settings.network = network.clone();
        }
        if let Some(account) = &self.account {
            settings.account_id = account.clone();
        }
        if let Some(token_contract) = &self.token_contract {
            settings.token_contract_id = token_contract.clone();
        }
        if let Some(dir) = &self.key_store_dir {
            settings.key_store_dir = Some(dir.clone());
        }

        match &self.command {
            Some(Command::Holders { from_index, limit, amount }) => {
                if let Some(from_index) = from_index {
                    settings.holders.from_index = from_index.clone();
                }
                if let Some(limit) = limit {
                    settings.holders.limit = *limit;
                }
                if let Some(amount) = amount {
                    settings.holders.amount = amount.clone();
                }
            }
            Some(Command::Stake { token_id: Some(token_id) })
            | Some(Command::Unstake { token_id: Some(token_id) }) => {
                settings.staking.token_id = token_id.clone();
            }
            _ => {}
        }
    }
}
