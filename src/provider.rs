//! JSON-RPC provider for a NEAR node

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::error::{AirdropError, Result};
use crate::signer::PublicKey;
use crate::transaction::SignedTransaction;

/// Permission and nonce of one access key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessKey {
    pub nonce: u64,
    /// `"FullAccess"` or a `{"FunctionCall": {...}}` object
    pub permission: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessKeyInfo {
    pub public_key: String,
    pub access_key: AccessKey,
}

/// Result of `view_access_key_list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessKeyList {
    pub keys: Vec<AccessKeyInfo>,
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default)]
    pub block_height: Option<u64>,
}

/// Result of `view_access_key`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccessKeyView {
    pub nonce: u64,
    pub permission: Value,
    pub block_hash: String,
    pub block_height: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Outcome {
    #[serde(default)]
    pub logs: Vec<String>,
    pub executor_id: String,
    #[serde(default)]
    pub gas_burnt: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutcomeWithId {
    pub id: String,
    pub outcome: Outcome,
}

/// Final outcome returned by `broadcast_tx_commit`
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionOutcome {
    pub status: Value,
    pub transaction_outcome: OutcomeWithId,
    #[serde(default)]
    pub receipts_outcome: Vec<OutcomeWithId>,
}

impl ExecutionOutcome {
    pub fn tx_hash(&self) -> &str {
        &self.transaction_outcome.id
    }

    /// Failure object when the transaction or one of its receipts failed
    pub fn failure(&self) -> Option<&Value> {
        self.status.get("Failure")
    }

    /// Decoded return value of a successful call
    pub fn success_value(&self) -> Option<Vec<u8>> {
        self.status
            .get("SuccessValue")
            .and_then(Value::as_str)
            .and_then(|encoded| BASE64.decode(encoded).ok())
    }

    /// Logs emitted by all receipts, in execution order
    pub fn logs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.receipts_outcome.iter().flat_map(|receipt| {
            receipt
                .outcome
                .logs
                .iter()
                .map(move |log| (receipt.id.as_str(), log.as_str()))
        })
    }

    pub fn gas_burnt(&self) -> u64 {
        self.transaction_outcome.outcome.gas_burnt
            + self.receipts_outcome.iter().map(|r| r.outcome.gas_burnt).sum::<u64>()
    }
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    cause: Option<Value>,
}

impl RpcErrorBody {
    fn into_error(self) -> AirdropError {
        let detail = self
            .cause
            .as_ref()
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                self.data.map(|d| match d {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
            });

        let message = match detail {
            Some(detail) if !detail.is_empty() => format!("{}: {}", self.message, detail),
            _ => self.message,
        };

        AirdropError::Rpc {
            code: self.code,
            message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

/// Provider bound to one JSON-RPC endpoint
#[derive(Debug)]
pub struct JsonRpcProvider {
    client: Client,
    url: Url,
    request_id: AtomicU64,
}

impl JsonRpcProvider {
    pub fn new(node_url: &str) -> Result<Self> {
        let url: Url = node_url
            .parse()
            .map_err(|e| AirdropError::Configuration(format!("Invalid RPC URL '{}': {}", node_url, e)))?;

        Ok(Self {
            client: Client::new(),
            url,
            request_id: AtomicU64::new(0),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send one JSON-RPC request and decode its `result`
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "Sending JSON-RPC request");

        let response = self
            .client
            .post(self.url.clone())
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }))
            .send()
            .await?;

        // Nodes answer handler errors with non-2xx statuses and a JSON-RPC body
        let status_error = response.error_for_status_ref().err();
        let body = response.bytes().await?;
        let response = match serde_json::from_slice::<RpcResponse>(&body) {
            Ok(parsed) if parsed.result.is_some() || parsed.error.is_some() => parsed,
            parsed => match status_error {
                Some(e) => return Err(e.into()),
                None => parsed?,
            },
        };

        if let Some(error) = response.error {
            return Err(error.into_error());
        }

        let result = response.result.ok_or_else(|| AirdropError::Rpc {
            code: 0,
            message: format!("Response to '{}' has neither result nor error", method),
        })?;

        Ok(serde_json::from_value(result)?)
    }

    /// `query` request; view errors reported inside `result` become errors too
    async fn query<T: DeserializeOwned>(&self, request: Value) -> Result<T> {
        let result: Value = self.call("query", request).await?;
        if let Some(message) = result.get("error").and_then(Value::as_str) {
            return Err(AirdropError::Rpc {
                code: 0,
                message: message.to_string(),
            });
        }
        Ok(serde_json::from_value(result)?)
    }

    pub async fn view_access_key_list(&self, account_id: &str) -> Result<AccessKeyList> {
        self.query(json!({
            "request_type": "view_access_key_list",
            "finality": "final",
            "account_id": account_id,
        }))
        .await
    }

    /// Latest known state of one key, read at `optimistic` finality so the
    /// nonce reflects recently executed transactions
    pub async fn view_access_key(&self, account_id: &str, public_key: &PublicKey) -> Result<AccessKeyView> {
        self.query(json!({
            "request_type": "view_access_key",
            "finality": "optimistic",
            "account_id": account_id,
            "public_key": public_key.to_string(),
        }))
        .await
    }

    /// Run a view method and decode its JSON return value
    pub async fn view_function(&self, contract_id: &str, method_name: &str, args: &Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct CallResult {
            result: Vec<u8>,
            #[serde(default)]
            logs: Vec<String>,
        }

        let call: CallResult = self
            .query(json!({
                "request_type": "call_function",
                "finality": "final",
                "account_id": contract_id,
                "method_name": method_name,
                "args_base64": BASE64.encode(serde_json::to_vec(args)?),
            }))
            .await?;

        for log in &call.logs {
            debug!(contract_id, method_name, "View log: {}", log);
        }

        if call.result.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&call.result)?)
    }

    /// Submit a signed transaction and wait until it is final
    pub async fn broadcast_tx_commit(&self, signed: &SignedTransaction) -> Result<ExecutionOutcome> {
        self.call("broadcast_tx_commit", json!([signed.to_base64()?])).await
    }
}
