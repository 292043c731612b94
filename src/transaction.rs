//! Function call description, transaction encoding and signing

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use borsh::BorshSerialize;
use sha2::{Digest, Sha256};
use std::io;

use crate::error::{AirdropError, Result};
use crate::signer::{InMemorySigner, PublicKey, Signature};

/// Borsh discriminant of `Action::FunctionCall` in the NEAR protocol
const FUNCTION_CALL_ACTION: u8 = 2;

/// A change call against a contract method
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub contract_id: String,
    pub method_name: String,
    /// JSON arguments
    pub args: serde_json::Value,
    /// Prepaid gas
    pub gas: u64,
    /// Attached deposit in yoctoNEAR
    pub deposit: u128,
}

impl FunctionCall {
    /// Start a call with empty arguments, zero gas and no deposit
    pub fn new(contract_id: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            contract_id: contract_id.into(),
            method_name: method_name.into(),
            args: serde_json::json!({}),
            gas: 0,
            deposit: 0,
        }
    }

    /// Set arguments
    pub fn args(mut self, args: serde_json::Value) -> Self {
        self.args = args;
        self
    }

    /// Set prepaid gas
    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    /// Set attached deposit
    pub fn deposit(mut self, deposit: u128) -> Self {
        self.deposit = deposit;
        self
    }

    fn to_action(&self) -> Result<Action> {
        Ok(Action::FunctionCall(FunctionCallAction {
            method_name: self.method_name.clone(),
            args: serde_json::to_vec(&self.args)?,
            gas: self.gas,
            deposit: self.deposit,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, BorshSerialize)]
pub struct FunctionCallAction {
    pub method_name: String,
    pub args: Vec<u8>,
    pub gas: u64,
    pub deposit: u128,
}

/// Transaction action. Only function calls are ever sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    FunctionCall(FunctionCallAction),
}

impl BorshSerialize for Action {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Action::FunctionCall(action) => {
                BorshSerialize::serialize(&FUNCTION_CALL_ACTION, writer)?;
                BorshSerialize::serialize(action, writer)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, BorshSerialize)]
pub struct Transaction {
    pub signer_id: String,
    pub public_key: PublicKey,
    pub nonce: u64,
    pub receiver_id: String,
    pub block_hash: [u8; 32],
    pub actions: Vec<Action>,
}

impl Transaction {
    /// Wrap `call` into a transaction from `signer`
    pub fn function_call(
        call: &FunctionCall,
        signer: &InMemorySigner,
        nonce: u64,
        block_hash: [u8; 32],
    ) -> Result<Self> {
        Ok(Self {
            signer_id: signer.account_id().to_string(),
            public_key: signer.public_key(),
            nonce,
            receiver_id: call.contract_id.clone(),
            block_hash,
            actions: vec![call.to_action()?],
        })
    }

    /// SHA-256 of the borsh encoding
    pub fn hash(&self) -> Result<[u8; 32]> {
        let bytes = borsh::to_vec(self)?;
        Ok(Sha256::digest(&bytes).into())
    }

    pub fn sign(self, signer: &InMemorySigner) -> Result<SignedTransaction> {
        let hash = self.hash()?;
        let signature = signer.sign(&hash);
        Ok(SignedTransaction {
            transaction: self,
            signature,
            hash,
        })
    }
}

#[derive(Debug, Clone, BorshSerialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: Signature,
    #[borsh(skip)]
    hash: [u8; 32],
}

impl SignedTransaction {
    /// Transaction hash in base58, as explorers show it
    pub fn hash(&self) -> String {
        bs58::encode(self.hash).into_string()
    }

    /// Base64 of the borsh encoding, the form `broadcast_tx_commit` expects
    pub fn to_base64(&self) -> Result<String> {
        Ok(BASE64.encode(borsh::to_vec(self)?))
    }
}

/// Decode a base58 block hash as returned by RPC queries
pub fn decode_block_hash(text: &str) -> Result<[u8; 32]> {
    bs58::decode(text)
        .into_vec()
        .map_err(|e| AirdropError::Rpc {
            code: 0,
            message: format!("Invalid block hash '{}': {}", text, e),
        })?
        .try_into()
        .map_err(|v: Vec<u8>| AirdropError::Rpc {
            code: 0,
            message: format!("Block hash must be 32 bytes, got {}", v.len()),
        })
}
