//! NFT staking calls: approve to the staking contract, claim, unstake

use serde_json::json;
use tracing::info;

use crate::account::ContractCaller;
use crate::config::Settings;
use crate::error::Result;
use crate::provider::ExecutionOutcome;
use crate::transaction::FunctionCall;

#[derive(Debug, Clone, PartialEq)]
pub struct StakingPlan {
    pub nft_contract_id: String,
    pub staking_contract_id: String,
    pub gas: u64,
    /// Storage deposit for the approval
    pub stake_deposit: u128,
    pub call_deposit: u128,
    pub stake_msg: String,
}

impl StakingPlan {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            nft_contract_id: settings.nft_contract_id.clone(),
            staking_contract_id: settings.staking_contract_id.clone(),
            gas: settings.gas.max,
            stake_deposit: settings.stake_deposit()?,
            call_deposit: settings.call_deposit()?,
            stake_msg: settings.staking.stake_msg.clone(),
        })
    }

    /// `nft_approve` granting the staking contract the token; the contract
    /// stakes it on the approval callback.
    pub fn stake_call(&self, token_id: &str) -> FunctionCall {
        FunctionCall::new(&self.nft_contract_id, "nft_approve")
            .args(json!({
                "token_id": token_id,
                "account_id": self.staking_contract_id,
                "msg": json!({ "staking_status": self.stake_msg }).to_string(),
            }))
            .gas(self.gas)
            .deposit(self.stake_deposit)
    }

    pub fn claim_call(&self) -> FunctionCall {
        FunctionCall::new(&self.staking_contract_id, "claim_reward")
            .gas(self.gas)
            .deposit(self.call_deposit)
    }

    pub fn unstake_call(&self, token_id: &str) -> FunctionCall {
        FunctionCall::new(&self.staking_contract_id, "unstake")
            .args(json!({ "token_id": token_id }))
            .gas(self.gas)
            .deposit(self.call_deposit)
    }
}

async fn send<C: ContractCaller + ?Sized>(caller: &C, call: FunctionCall) -> Result<ExecutionOutcome> {
    info!("Calling {}.{} as {}", call.contract_id, call.method_name, caller.account_id());
    let outcome = caller.function_call(&call).await?;
    info!("{} done in {}", call.method_name, outcome.tx_hash());
    if let Some(value) = outcome.success_value().filter(|v| !v.is_empty()) {
        info!("{} returned {}", call.method_name, String::from_utf8_lossy(&value));
    }
    Ok(outcome)
}

pub async fn stake<C: ContractCaller + ?Sized>(caller: &C, plan: &StakingPlan, token_id: &str) -> Result<ExecutionOutcome> {
    send(caller, plan.stake_call(token_id)).await
}

pub async fn claim_reward<C: ContractCaller + ?Sized>(caller: &C, plan: &StakingPlan) -> Result<ExecutionOutcome> {
    send(caller, plan.claim_call()).await
}

pub async fn unstake<C: ContractCaller + ?Sized>(caller: &C, plan: &StakingPlan, token_id: &str) -> Result<ExecutionOutcome> {
    send(caller, plan.unstake_call(token_id)).await
}
