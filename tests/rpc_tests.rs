//! Account and provider against a mocked JSON-RPC node

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::{Arc, Mutex};

use near_token_airdrop::prelude::*;
use near_token_airdrop::{InMemorySigner, JsonRpcProvider};

const ACCOUNT: &str = "kokumokongz_token_wallet.near";

fn signer() -> InMemorySigner {
    InMemorySigner::from_seed(ACCOUNT, [11u8; 32])
}

fn account(server: &ServerGuard) -> Account {
    let provider = JsonRpcProvider::new(&server.url()).unwrap();
    Account::new(Arc::new(provider), signer())
}

fn rpc_result(result: serde_json::Value) -> String {
    json!({ "jsonrpc": "2.0", "id": 0, "result": result }).to_string()
}

async fn mock_access_key(server: &mut ServerGuard, nonce: u64, hits: usize) -> mockito::Mock {
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "query",
            "params": {
                "request_type": "view_access_key",
                "account_id": ACCOUNT,
                "public_key": signer().public_key().to_string(),
            }
        })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "nonce": nonce,
            "permission": "FullAccess",
            "block_hash": bs58::encode([1u8; 32]).into_string(),
            "block_height": 1000
        })))
        .expect(hits)
        .create_async()
        .await
}

/// Nonce of a borsh `SignedTransaction` taken from a `broadcast_tx_commit` body
fn broadcast_nonce(body: &[u8]) -> u64 {
    let request: serde_json::Value = serde_json::from_slice(body).unwrap();
    let tx = BASE64.decode(request["params"][0].as_str().unwrap()).unwrap();

    let signer_len = u32::from_le_bytes(tx[0..4].try_into().unwrap()) as usize;
    // signer id, then key type byte and 32 key bytes
    let offset = 4 + signer_len + 1 + 32;
    u64::from_le_bytes(tx[offset..offset + 8].try_into().unwrap())
}

fn success_outcome(tx_hash: &str) -> serde_json::Value {
    json!({
        "status": { "SuccessValue": "" },
        "transaction": {},
        "transaction_outcome": {
            "id": tx_hash,
            "outcome": { "logs": [], "executor_id": ACCOUNT, "gas_burnt": 2428000000000u64 }
        },
        "receipts_outcome": [{
            "id": "receipt1",
            "outcome": {
                "logs": ["EVENT_JSON:{\"standard\":\"nep141\",\"event\":\"ft_transfer\"}"],
                "executor_id": ACCOUNT,
                "gas_burnt": 1000
            }
        }]
    })
}

#[tokio::test]
async fn test_view_access_key_list() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "jsonrpc": "2.0",
            "method": "query",
            "params": {
                "request_type": "view_access_key_list",
                "finality": "final",
                "account_id": ACCOUNT
            }
        })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "keys": [{
                "public_key": signer().public_key().to_string(),
                "access_key": { "nonce": 7, "permission": "FullAccess" }
            }],
            "block_hash": "11111111111111111111111111111111",
            "block_height": 1000
        })))
        .create_async()
        .await;

    let keys = account(&server).access_keys().await.unwrap();

    mock.assert_async().await;
    assert_eq!(keys.keys.len(), 1);
    assert_eq!(keys.keys[0].access_key.nonce, 7);
    assert_eq!(keys.keys[0].public_key, signer().public_key().to_string());
}

#[tokio::test]
async fn test_runner_broadcasts_one_transaction_per_entry() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "params": { "request_type": "view_access_key_list" }
        })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({ "keys": [] })))
        .expect(1)
        .create_async()
        .await;
    // the view lags and keeps reporting nonce 41
    let key = mock_access_key(&mut server, 41, 2).await;
    let nonces = Arc::new(Mutex::new(Vec::new()));
    let sent = Arc::clone(&nonces);
    let broadcast = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "broadcast_tx_commit" })))
        .with_header("content-type", "application/json")
        .with_body_from_request(move |request| {
            sent.lock().unwrap().push(broadcast_nonce(request.body().unwrap()));
            rpc_result(success_outcome("6zgh2u9DqHHiXzdy9ouTP7oGky2T4nugqzqt9wJZwNFm")).into_bytes()
        })
        .expect(2)
        .create_async()
        .await;

    let account = account(&server);
    let runner = AirdropRunner::new(&account, TransferPlan::from_settings(&Settings::default()).unwrap());
    let receipts = runner
        .run(&[
            AirdropEntry::new("veejayrex.near", "200"),
            AirdropEntry::new("hessmart.near", "200"),
        ])
        .await
        .unwrap();

    list.assert_async().await;
    key.assert_async().await;
    broadcast.assert_async().await;
    assert_eq!(receipts.len(), 2);
    assert_eq!(receipts[1].receiver_id, "hessmart.near");
    assert_eq!(receipts[1].amount, 200 * ONE_TOKEN);
    assert_eq!(receipts[0].tx_hash, "6zgh2u9DqHHiXzdy9ouTP7oGky2T4nugqzqt9wJZwNFm");
    assert_eq!(*nonces.lock().unwrap(), vec![42, 43]);
}

#[tokio::test]
async fn test_failed_execution_is_an_error() {
    let mut server = Server::new_async().await;
    let _key = mock_access_key(&mut server, 1, 1).await;
    let mut outcome = success_outcome("FailedTx");
    outcome["status"] = json!({
        "Failure": { "ActionError": { "index": 0, "kind": { "FunctionCallError": { "ExecutionError": "Smart contract panicked: The account doesn't have enough balance" } } } }
    });
    let _broadcast = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "broadcast_tx_commit" })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(outcome))
        .create_async()
        .await;

    let call = FunctionCall::new(ACCOUNT, "ft_transfer").gas(4_000_000_000_000).deposit(ONE_YOCTO);
    let err = account(&server).function_call(&call).await.unwrap_err();

    match err {
        AirdropError::ExecutionFailed { tx_hash, failure } => {
            assert_eq!(tx_hash, "FailedTx");
            assert!(failure.contains("enough balance"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_rpc_error_is_propagated() {
    let mut server = Server::new_async().await;
    let _error = server
        .mock("POST", "/")
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 0,
                "error": {
                    "name": "HANDLER_ERROR",
                    "cause": { "name": "UNKNOWN_ACCESS_KEY", "info": {} },
                    "code": -32000,
                    "message": "Server error",
                    "data": "Access key does not exist"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let call = FunctionCall::new(ACCOUNT, "ft_transfer");
    let err = account(&server).function_call(&call).await.unwrap_err();

    match err {
        AirdropError::Rpc { code, message } => {
            assert_eq!(code, -32000);
            assert_eq!(message, "Server error: UNKNOWN_ACCESS_KEY");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_rpc_error_with_http_error_status_keeps_cause() {
    let mut server = Server::new_async().await;
    let _timeout = server
        .mock("POST", "/")
        .with_status(408)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 0,
                "error": {
                    "name": "HANDLER_ERROR",
                    "cause": { "name": "TIMEOUT_ERROR", "info": {} },
                    "code": -32000,
                    "message": "Server error",
                    "data": "Timeout"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = account(&server).access_keys().await.unwrap_err();

    match err {
        AirdropError::Rpc { code, message } => {
            assert_eq!(code, -32000);
            assert_eq!(message, "Server error: TIMEOUT_ERROR");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_http_error_without_rpc_body() {
    let mut server = Server::new_async().await;
    let _gateway = server
        .mock("POST", "/")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let err = account(&server).access_keys().await.unwrap_err();

    assert!(matches!(err, AirdropError::Http(_)));
}

#[tokio::test]
async fn test_view_function_decodes_result_bytes() {
    let mut server = Server::new_async().await;
    let tokens = json!([{ "token_id": "580", "owner_id": "a.near", "approved_account_ids": {} }]);
    let _view = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "params": {
                "request_type": "call_function",
                "account_id": "banc.neartopia.near",
                "method_name": "nft_tokens"
            }
        })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "result": serde_json::to_vec(&tokens).unwrap(),
            "logs": [],
            "block_height": 1000,
            "block_hash": "11111111111111111111111111111111"
        })))
        .create_async()
        .await;

    let value = account(&server)
        .view_function("banc.neartopia.near", "nft_tokens", &json!({ "from_index": "580", "limit": 15 }))
        .await
        .unwrap();

    assert_eq!(value, tokens);
}

#[tokio::test]
async fn test_connection_loads_account_from_key_store() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("testnet");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(format!("{}.json", ACCOUNT)),
        json!({
            "account_id": ACCOUNT,
            "public_key": signer().public_key().to_string(),
            "private_key": signer().secret_key_string(),
        })
        .to_string(),
    )
    .unwrap();

    let network = select_network("testnet", tmp.path()).unwrap();
    let connection = Connection::connect(&network).unwrap();
    let account = connection.account(ACCOUNT).await.unwrap();

    assert_eq!(account.account_id(), ACCOUNT);
    assert_eq!(account.signer().public_key(), signer().public_key());
    assert_eq!(connection.provider().url().as_str(), "https://rpc.testnet.near.org/");

    let missing = connection.account("someone.testnet").await;
    assert!(matches!(missing, Err(AirdropError::KeyStore(_))));
}
