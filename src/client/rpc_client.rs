// RPC client for making JSON-RPC requests against the node
use crate::encoding::Address;
use crate::client::NodeApi;
use async_trait::async_trait;
use num_bigint::BigUint;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("RPC request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed RPC response: {0}")]
    Protocol(String),
    /// Error object returned by the node, surfaced verbatim.
    #[error("{0}")]
    Node(String),
}

/// Wire form of one remote call. Built at dispatch time, never persisted.
#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Vec<String>,
    id: u64,
}

pub struct RpcClient {
    url: String,
    client: Client,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: Client::new(),
            request_id: AtomicU64::new(1),
        }
    }

    async fn call(&self, method: &str, params: Vec<String>) -> Result<Value, RpcError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };
        debug!(method, id, "rpc call");

        let response = self.client.post(&self.url).json(&request).send().await?;
        let json: Value = response.json().await?;

        if let Some(error) = json.get("error") {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown node error");
            return Err(RpcError::Node(msg.to_string()));
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| RpcError::Protocol("missing result field".to_string()))
    }
}

fn value_to_address(value: &Value) -> Result<Address, RpcError> {
    value
        .as_str()
        .ok_or_else(|| RpcError::Protocol("expected address string".to_string()))?
        .parse()
        .map_err(|e| RpcError::Protocol(format!("bad address in response: {}", e)))
}

fn value_to_amount(value: &Value) -> Result<BigUint, RpcError> {
    if let Some(n) = value.as_u64() {
        return Ok(BigUint::from(n));
    }
    if let Some(s) = value.as_str() {
        if let Ok(n) = s.parse::<BigUint>() {
            return Ok(n);
        }
    }
    Err(RpcError::Protocol(format!("bad amount in response: {}", value)))
}

#[async_trait]
impl NodeApi for RpcClient {
    async fn node_info(&self) -> Result<Value, RpcError> {
        self.call("getNodeInfo", vec![]).await
    }

    async fn node_id(&self) -> Result<String, RpcError> {
        let result = self.call("getNodeId", vec![]).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RpcError::Protocol("expected node id string".to_string()))
    }

    async fn accounts(&self) -> Result<Vec<Address>, RpcError> {
        let result = self.call("getAccounts", vec![]).await?;
        let entries = result
            .as_array()
            .ok_or_else(|| RpcError::Protocol("expected account list".to_string()))?;
        entries.iter().map(value_to_address).collect()
    }

    async fn last_account(&self) -> Result<Option<Address>, RpcError> {
        let result = self.call("getLastAccount", vec![]).await?;
        if result.is_null() {
            return Ok(None);
        }
        value_to_address(&result).map(Some)
    }

    async fn new_account(&self, password: &str) -> Result<Address, RpcError> {
        let result = self.call("newAccount", vec![password.to_string()]).await?;
        value_to_address(&result)
    }

    async fn unlock_account(&self, address: &Address, password: &str) -> Result<(), RpcError> {
        self.call(
            "unlockAccount",
            vec![address.to_string(), password.to_string()],
        )
        .await?;
        Ok(())
    }

    async fn balance(&self, address: &Address) -> Result<BigUint, RpcError> {
        let result = self.call("getBalance", vec![address.to_string()]).await?;
        // Nodes answer either a bare number or {"balance": ...}.
        match result.get("balance") {
            Some(inner) => value_to_amount(inner),
            None => value_to_amount(&result),
        }
    }

    async fn connect_peer(&self, url: &str) -> Result<(), RpcError> {
        self.call("connectPeer", vec![url.to_string()]).await?;
        Ok(())
    }

    async fn peers(&self) -> Result<Vec<String>, RpcError> {
        let result = self.call("getPeers", vec![]).await?;
        let entries = result
            .as_array()
            .ok_or_else(|| RpcError::Protocol("expected peer list".to_string()))?;
        entries
            .iter()
            .map(|p| {
                p.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| RpcError::Protocol("expected peer string".to_string()))
            })
            .collect()
    }

    async fn set_miner(&self, address: &Address) -> Result<(), RpcError> {
        self.call("setMiner", vec![address.to_string()]).await?;
        Ok(())
    }

    async fn start_mine(&self) -> Result<(), RpcError> {
        self.call("startMine", vec![]).await?;
        Ok(())
    }

    async fn stop_mine(&self) -> Result<(), RpcError> {
        self.call("stopMine", vec![]).await?;
        Ok(())
    }

    async fn send_asset(
        &self,
        from: &Address,
        to: &Address,
        amount: &BigUint,
    ) -> Result<String, RpcError> {
        let result = self
            .call(
                "sendAsset",
                vec![from.to_string(), to.to_string(), amount.to_string()],
            )
            .await?;
        if let Some(hash) = result.as_str() {
            return Ok(hash.to_string());
        }
        result
            .get("tx_hash")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| RpcError::Protocol("missing transaction hash".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_with_protocol_tag() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "getBalance",
            params: vec!["0x9821e8c1dc176c92cac40b3c1fdb795aa1b38f89".to_string()],
            id: 7,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "getBalance");
        assert_eq!(json["id"], 7);
        assert_eq!(
            json["params"][0],
            "0x9821e8c1dc176c92cac40b3c1fdb795aa1b38f89"
        );
    }

    #[test]
    fn test_value_to_amount_accepts_number_and_string() {
        assert_eq!(
            value_to_amount(&serde_json::json!(5_000_000_000_000u64)).unwrap(),
            BigUint::from(5_000_000_000_000u64)
        );
        assert_eq!(
            value_to_amount(&serde_json::json!("340282366920938463463374607431768211456"))
                .unwrap()
                .to_string(),
            "340282366920938463463374607431768211456"
        );
        assert!(value_to_amount(&serde_json::json!({"x": 1})).is_err());
    }
}
