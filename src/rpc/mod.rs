//! Minimal JSON-RPC client for the point lookups the monitor needs:
//! transaction fetch, account fetch and lamport balance. Calls walk the
//! configured endpoint list and retry whole rounds with exponential
//! backoff before giving up.

pub mod types;

pub use types::{
    AccountInfoValue, TokenBalance, TransactionBody, TransactionEnvelope, TransactionMeta,
    UiTokenAmount,
};

use crate::errors::WatchError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Duration;
use tokio::time::sleep;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Retry rounds across the full endpoint list before a call fails.
const MAX_RETRY_ROUNDS: usize = 3;
/// Base delay for exponential backoff between rounds.
const RETRY_BASE_DELAY_MS: u64 = 500;

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Raw-transaction fetch seam consumed by the watch coordinator.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// `Ok(None)` means not yet available or pruned - an expected case,
    /// not an error.
    async fn fetch_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionEnvelope>, WatchError>;
}

pub struct RpcClient {
    http: reqwest::Client,
    endpoints: Vec<String>,
}

impl RpcClient {
    pub fn new(rpc_url: &str, fallbacks: &[String]) -> Self {
        let mut endpoints = vec![rpc_url.to_string()];
        endpoints.extend(fallbacks.iter().cloned());

        Self {
            http: reqwest::Client::new(),
            endpoints,
        }
    }

    /// Issue one JSON-RPC call, walking endpoints and retrying rounds
    /// with backoff. Returns the `result` field as raw JSON.
    async fn call(&self, method: &str, params: Value) -> Result<Value, WatchError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let mut delay = RETRY_BASE_DELAY_MS;
        let mut last_error = String::new();

        for round in 0..MAX_RETRY_ROUNDS {
            for endpoint in &self.endpoints {
                match self.call_endpoint(endpoint, &body).await {
                    Ok(result) => {
                        if round > 0 {
                            logger::debug(
                                LogTag::Rpc,
                                "RETRY_OK",
                                &format!("{} succeeded on round {}", method, round + 1),
                            );
                        }
                        return Ok(result);
                    }
                    Err(e) => {
                        last_error = e;
                        logger::debug(
                            LogTag::Rpc,
                            "ENDPOINT_FAIL",
                            &format!("{} via {}: {}", method, endpoint, last_error),
                        );
                    }
                }
            }

            if round + 1 < MAX_RETRY_ROUNDS {
                sleep(Duration::from_millis(delay)).await;
                delay *= 2;
            }
        }

        Err(WatchError::rpc(format!(
            "{} failed after {} rounds: {}",
            method, MAX_RETRY_ROUNDS, last_error
        )))
    }

    async fn call_endpoint(&self, endpoint: &str, body: &Value) -> Result<Value, String> {
        let response = self
            .http
            .post(endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| format!("invalid JSON body: {}", e))?;

        if let Some(err) = payload.get("error") {
            if !err.is_null() {
                return Err(format!("node error: {}", err));
            }
        }

        match payload.get("result") {
            Some(result) => Ok(result.clone()),
            None => Err("response carries no result".to_string()),
        }
    }

    /// Fetch raw account data (base64 decoded). `Ok(None)` when the
    /// account does not exist.
    pub async fn get_account_data(&self, pubkey: &str) -> Result<Option<Vec<u8>>, WatchError> {
        solana_sdk::pubkey::Pubkey::from_str(pubkey)
            .map_err(|e| WatchError::rpc(format!("invalid pubkey {}: {}", pubkey, e)))?;

        let result = self
            .call(
                "getAccountInfo",
                json!([pubkey, { "encoding": "base64", "commitment": "confirmed" }]),
            )
            .await?;

        let value = result.get("value").cloned().unwrap_or(Value::Null);
        if value.is_null() {
            return Ok(None);
        }

        let info: AccountInfoValue = serde_json::from_value(value)?;
        let bytes = BASE64
            .decode(info.data.0.as_bytes())
            .map_err(|e| WatchError::rpc(format!("account data decode failed: {}", e)))?;

        Ok(Some(bytes))
    }

    /// Lamport balance for an address.
    pub async fn get_balance(&self, pubkey: &str) -> Result<u64, WatchError> {
        let result = self
            .call("getBalance", json!([pubkey, { "commitment": "confirmed" }]))
            .await?;

        result
            .get("value")
            .and_then(Value::as_u64)
            .ok_or_else(|| WatchError::rpc("getBalance returned no value"))
    }
}

#[async_trait]
impl TransactionSource for RpcClient {
    async fn fetch_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionEnvelope>, WatchError> {
        let result = self
            .call(
                "getTransaction",
                json!([
                    signature,
                    {
                        "encoding": "json",
                        "commitment": "confirmed",
                        "maxSupportedTransactionVersion": 0
                    }
                ]),
            )
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        let envelope: TransactionEnvelope = serde_json::from_value(result)?;
        Ok(Some(envelope))
    }
}
