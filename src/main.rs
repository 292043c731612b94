//! NEAR token airdrop CLI

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use near_token_airdrop::prelude::*;
use near_token_airdrop::staking;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    cli.apply(&mut settings);

    let network = settings.network_config().context("Failed to select network")?;
    let connection = Connection::connect(&network).context("Failed to connect")?;
    let account = connection
        .account(&settings.account_id)
        .await
        .with_context(|| format!("Failed to load account {}", settings.account_id))?;

    match cli.command.clone().unwrap_or(Command::Airdrop) {
        Command::Airdrop => {
            let runner = AirdropRunner::new(&account, TransferPlan::from_settings(&settings)?);
            let receipts = runner.run(&settings.recipients).await.context("Airdrop aborted")?;
            for receipt in &receipts {
                info!("{} -> {}", receipt.receiver_id, connection.config().explorer_tx_url(&receipt.tx_hash));
            }
        }
        Command::AccessKeys => {
            let keys = account.access_keys().await.context("Failed to fetch access keys")?;
            println!("{}", serde_json::to_string_pretty(&keys)?);
        }
        Command::Holders { .. } => {
            let runner = AirdropRunner::new(&account, TransferPlan::from_settings(&settings)?);
            let summary = runner
                .run_for_holders(&settings.nft_contract_id, &settings.holders)
                .await
                .context("Holder airdrop aborted")?;
            for (holder, error) in &summary.failed {
                info!("Not paid: {} ({})", holder, error);
            }
        }
        Command::Stake { .. } => {
            let plan = StakingPlan::from_settings(&settings)?;
            staking::stake(&account, &plan, &settings.staking.token_id)
                .await
                .context("Stake failed")?;
        }
        Command::Claim => {
            let plan = StakingPlan::from_settings(&settings)?;
            staking::claim_reward(&account, &plan).await.context("Claim failed")?;
        }
        Command::Unstake { .. } => {
            let plan = StakingPlan::from_settings(&settings)?;
            staking::unstake(&account, &plan, &settings.staking.token_id)
                .await
                .context("Unstake failed")?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
