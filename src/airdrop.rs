//! Sequential `ft_transfer` airdrops

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::account::ContractCaller;
use crate::config::{AirdropEntry, HoldersSettings, Settings};
use crate::error::{AirdropError, Result};
use crate::transaction::FunctionCall;
use crate::units::{format_token_amount, parse_token_amount};

/// NEP-141 transfer method
pub const FT_TRANSFER: &str = "ft_transfer";

/// Parameters shared by every transfer of a run
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlan {
    pub token_contract_id: String,
    pub gas: u64,
    pub deposit: u128,
    /// JSON text sent as the `memo` argument
    pub memo: String,
}

impl TransferPlan {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            token_contract_id: settings.token_contract_id.clone(),
            gas: settings.gas.ft_transfer,
            deposit: settings.call_deposit()?,
            memo: settings.memo_json(),
        })
    }

    /// `ft_transfer` call sending `base_units` to `receiver_id`
    pub fn transfer_call(&self, receiver_id: &str, base_units: u128) -> FunctionCall {
        FunctionCall::new(&self.token_contract_id, FT_TRANSFER)
            .args(json!({
                "receiver_id": receiver_id,
                "amount": base_units.to_string(),
                "memo": self.memo,
            }))
            .gas(self.gas)
            .deposit(self.deposit)
    }
}

/// A transfer that completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub index: usize,
    pub receiver_id: String,
    /// Base units sent
    pub amount: u128,
    pub tx_hash: String,
}

/// Token as returned by the NEP-171 `nft_tokens` view
#[derive(Debug, Clone, Deserialize)]
pub struct NftToken {
    pub token_id: String,
    pub owner_id: String,
    #[serde(default)]
    pub approved_account_ids: Option<Value>,
}

impl NftToken {
    /// No approvals, i.e. the token is not staked or listed anywhere
    pub fn has_no_approvals(&self) -> bool {
        matches!(&self.approved_account_ids, Some(Value::Object(map)) if map.is_empty())
    }
}

/// Tokens whose holder qualifies for the holder airdrop, in listing order
pub fn eligible_holders<'t>(tokens: &'t [NftToken], excluded_owner: Option<&str>) -> Vec<&'t NftToken> {
    tokens
        .iter()
        .filter(|token| token.has_no_approvals())
        .filter(|token| excluded_owner != Some(token.owner_id.as_str()))
        .collect()
}

/// Outcome of a holder airdrop, which keeps going past failures
#[derive(Debug, Default)]
pub struct HolderAirdropSummary {
    pub tokens_scanned: usize,
    pub sent: Vec<TransferReceipt>,
    /// Holder and error text of each failed transfer
    pub failed: Vec<(String, String)>,
}

impl HolderAirdropSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives transfers from one signing account
pub struct AirdropRunner<'a, C: ContractCaller + ?Sized> {
    caller: &'a C,
    plan: TransferPlan,
}

impl<'a, C: ContractCaller + ?Sized> AirdropRunner<'a, C> {
    pub fn new(caller: &'a C, plan: TransferPlan) -> Self {
        Self { caller, plan }
    }

    /// Log the signer's access keys, then send one transfer per entry in order.
    ///
    /// Stops at the first failure and returns it; transfers already sent stay
    /// sent, and running again sends them again.
    pub async fn run(&self, entries: &[AirdropEntry]) -> Result<Vec<TransferReceipt>> {
        let access_keys = self.caller.access_keys().await?;
        info!(
            "Access keys of {}:\n{}",
            self.caller.account_id(),
            serde_json::to_string_pretty(&access_keys)?
        );

        let mut receipts = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let receipt = self
                .transfer(index, &entry.receiver_id, &entry.amount)
                .await
                .map_err(|source| AirdropError::TransferFailed {
                    index,
                    receiver_id: entry.receiver_id.clone(),
                    source: Box::new(source),
                })?;
            receipts.push(receipt);
        }

        info!("Airdrop finished: {} transfers sent", receipts.len());
        Ok(receipts)
    }

    async fn transfer(&self, index: usize, receiver_id: &str, amount: &str) -> Result<TransferReceipt> {
        let base_units = parse_token_amount(amount)?;
        let call = self.plan.transfer_call(receiver_id, base_units);
        info!(
            "[{}] Sending {} tokens to {}",
            index,
            format_token_amount(base_units),
            receiver_id
        );

        let outcome = self.caller.function_call(&call).await?;
        info!("[{}] Transfer to {} done in {}", index, receiver_id, outcome.tx_hash());

        Ok(TransferReceipt {
            index,
            receiver_id: receiver_id.to_string(),
            amount: base_units,
            tx_hash: outcome.tx_hash().to_string(),
        })
    }

    /// Page of tokens from an NFT contract
    pub async fn nft_tokens(&self, nft_contract_id: &str, from_index: &str, limit: u64) -> Result<Vec<NftToken>> {
        let tokens = self
            .caller
            .view_function(
                nft_contract_id,
                "nft_tokens",
                &json!({ "from_index": from_index, "limit": limit }),
            )
            .await?;
        Ok(serde_json::from_value(tokens)?)
    }

    /// Send `holders.amount` to every holder of an unapproved token in one
    /// page of `nft_contract_id`. A failed transfer is logged and skipped.
    pub async fn run_for_holders(
        &self,
        nft_contract_id: &str,
        holders: &HoldersSettings,
    ) -> Result<HolderAirdropSummary> {
        let tokens = self
            .nft_tokens(nft_contract_id, &holders.from_index, holders.limit)
            .await?;

        let mut summary = HolderAirdropSummary {
            tokens_scanned: tokens.len(),
            ..Default::default()
        };

        for (index, token) in eligible_holders(&tokens, holders.excluded_owner.as_deref())
            .into_iter()
            .enumerate()
        {
            info!("{}: {}", token.token_id, token.owner_id);
            match self.transfer(index, &token.owner_id, &holders.amount).await {
                Ok(receipt) => summary.sent.push(receipt),
                Err(e) => {
                    warn!("Transfer to {} failed: {}", token.owner_id, e);
                    summary.failed.push((token.owner_id.clone(), e.to_string()));
                }
            }
        }

        info!(
            "Holder airdrop finished: {} tokens scanned, {} sent, {} failed",
            summary.tokens_scanned,
            summary.sent.len(),
            summary.failed.len()
        );
        Ok(summary)
    }
}
