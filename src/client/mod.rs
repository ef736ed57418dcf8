pub mod rpc_client;

pub use rpc_client::{RpcClient, RpcError};

use crate::encoding::Address;
use async_trait::async_trait;
use num_bigint::BigUint;
use serde_json::Value;

/// The remote node surface the console consumes. One method per console
/// command; implemented by [`RpcClient`] and by recording mocks in tests.
#[async_trait]
pub trait NodeApi {
    async fn node_info(&self) -> Result<Value, RpcError>;
    async fn node_id(&self) -> Result<String, RpcError>;
    async fn accounts(&self) -> Result<Vec<Address>, RpcError>;
    async fn last_account(&self) -> Result<Option<Address>, RpcError>;
    async fn new_account(&self, password: &str) -> Result<Address, RpcError>;
    async fn unlock_account(&self, address: &Address, password: &str) -> Result<(), RpcError>;
    async fn balance(&self, address: &Address) -> Result<BigUint, RpcError>;
    async fn connect_peer(&self, url: &str) -> Result<(), RpcError>;
    async fn peers(&self) -> Result<Vec<String>, RpcError>;
    async fn set_miner(&self, address: &Address) -> Result<(), RpcError>;
    async fn start_mine(&self) -> Result<(), RpcError>;
    async fn stop_mine(&self) -> Result<(), RpcError>;
    async fn send_asset(
        &self,
        from: &Address,
        to: &Address,
        amount: &BigUint,
    ) -> Result<String, RpcError>;
}
