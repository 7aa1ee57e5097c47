use super::types::{CallRequest, RpcBlock, RpcHeader, RpcReceipt, RpcTransaction};
use crate::error::ExplorerError;
use crate::models::{BlockRecord, ReceiptRecord, SyncStatus, TransactionRecord};
use alloy_primitives::{Address, Bytes, B256, U256, U64};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use jsonrpsee::core::client::{ClientT, Subscription, SubscriptionClientT};
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub type EventStream<T> = BoxStream<'static, Result<T, ExplorerError>>;

// Which block to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockId {
    Number(u64),
    Hash(B256),
    Latest,
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Number(n) => write!(f, "block {}", n),
            BlockId::Hash(h) => write!(f, "block {}", h),
            BlockId::Latest => write!(f, "latest block"),
        }
    }
}

// A new block header notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadEvent {
    pub number: u64,
}

// The explorer's view of an Ethereum-compatible node. Every method is a single
// round-trip; `None` means the node answered but does not know the entity
#[async_trait]
pub trait NodeClient: Send + Sync {
    async fn block(&self, id: BlockId, full_transactions: bool) -> Result<Option<BlockRecord>, ExplorerError>;

    async fn block_number(&self) -> Result<u64, ExplorerError>;

    async fn transaction(&self, hash: B256) -> Result<Option<TransactionRecord>, ExplorerError>;

    async fn receipt(&self, hash: B256) -> Result<Option<ReceiptRecord>, ExplorerError>;

    // Current gas price in wei.
    async fn gas_price(&self) -> Result<U256, ExplorerError>;

    async fn peer_count(&self) -> Result<u64, ExplorerError>;

    async fn hashrate(&self) -> Result<u64, ExplorerError>;

    async fn is_mining(&self) -> Result<bool, ExplorerError>;

    async fn syncing(&self) -> Result<SyncStatus, ExplorerError>;

    async fn balance(&self, address: Address) -> Result<U256, ExplorerError>;

    async fn code(&self, address: Address) -> Result<Bytes, ExplorerError>;

    async fn transaction_count(&self, address: Address) -> Result<u64, ExplorerError>;

    // Read-only contract call against the latest state.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ExplorerError>;

    // Push stream of new block headers. Dropping the stream releases the node-side subscription.
    async fn subscribe_new_heads(&self) -> Result<EventStream<HeadEvent>, ExplorerError>;

    // Push stream of pending transaction hashes. Dropping the stream releases the node-side subscription.
    async fn subscribe_pending_transactions(&self) -> Result<EventStream<B256>, ExplorerError>;
}

// NodeClient over JSON-RPC: HTTP for queries, WebSocket for subscriptions.
pub struct RpcNodeClient {
    http: HttpClient,
    ws_url: String,
    ws: Mutex<Option<Arc<WsClient>>>,
    timeout: Duration,
}

impl RpcNodeClient {
    pub fn new(http_url: &str, ws_url: &str, timeout: Duration) -> Result<Self, ExplorerError> {
        // Calls are bounded in `request`
        let http = HttpClientBuilder::default()
            .build(http_url)
            .map_err(|e| ExplorerError::Config(format!("invalid node URL {}: {}", http_url, e)))?;
        info!("Using node RPC at {} (subscriptions via {})", http_url, ws_url);
        Ok(RpcNodeClient { http, ws_url: ws_url.to_string(), ws: Mutex::new(None), timeout })
    }

    // Every call is bounded; a slow node is treated like an unreachable one
    async fn request<R>(&self, method: &str, params: ArrayParams) -> Result<R, ExplorerError>
    where
        R: DeserializeOwned,
    {
        match tokio::time::timeout(self.timeout, self.http.request(method, params)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ExplorerError::Timeout(self.timeout)),
        }
    }

    // Reuses the live WebSocket connection, reconnecting if it dropped
    async fn ws_client(&self) -> Result<Arc<WsClient>, ExplorerError> {
        let mut guard = self.ws.lock().await;
        if let Some(client) = guard.as_ref() {
            if client.is_connected() {
                return Ok(client.clone());
            }
            warn!("Node WebSocket at {} disconnected, reconnecting", self.ws_url);
        }

        let connect = WsClientBuilder::default().request_timeout(self.timeout).build(&self.ws_url);
        let client = match tokio::time::timeout(self.timeout, connect).await {
            Ok(client) => Arc::new(client?),
            Err(_) => return Err(ExplorerError::Timeout(self.timeout)),
        };
        info!("Connected to node WebSocket at {}", self.ws_url);
        guard.replace(client.clone());
        Ok(client)
    }

    async fn subscribe<T>(&self, kind: &'static str) -> Result<EventStream<T>, ExplorerError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.ws_client().await?;
        let subscription: Subscription<T> =
            client.subscribe("eth_subscribe", rpc_params![kind], "eth_unsubscribe").await?;
        info!("Subscribed to {} on {}", kind, self.ws_url);
        Ok(subscription
            .map(|item| item.map_err(|e| ExplorerError::Decode(e.to_string())))
            .boxed())
    }
}

fn block_params(id: BlockId, full_transactions: bool) -> (&'static str, ArrayParams) {
    match id {
        BlockId::Number(n) => ("eth_getBlockByNumber", rpc_params![format!("0x{:x}", n), full_transactions]),
        BlockId::Latest => ("eth_getBlockByNumber", rpc_params!["latest", full_transactions]),
        BlockId::Hash(h) => ("eth_getBlockByHash", rpc_params![h, full_transactions]),
    }
}

#[async_trait]
impl NodeClient for RpcNodeClient {
    async fn block(&self, id: BlockId, full_transactions: bool) -> Result<Option<BlockRecord>, ExplorerError> {
        let (method, params) = block_params(id, full_transactions);
        let block: Option<RpcBlock> = self.request(method, params).await?;
        Ok(block.map(BlockRecord::from))
    }

    async fn block_number(&self) -> Result<u64, ExplorerError> {
        let number: U64 = self.request("eth_blockNumber", rpc_params![]).await?;
        Ok(number.to::<u64>())
    }

    async fn transaction(&self, hash: B256) -> Result<Option<TransactionRecord>, ExplorerError> {
        let tx: Option<RpcTransaction> = self.request("eth_getTransactionByHash", rpc_params![hash]).await?;
        Ok(tx.map(TransactionRecord::from))
    }

    async fn receipt(&self, hash: B256) -> Result<Option<ReceiptRecord>, ExplorerError> {
        let receipt: Option<RpcReceipt> = self.request("eth_getTransactionReceipt", rpc_params![hash]).await?;
        Ok(receipt.map(ReceiptRecord::from))
    }

    async fn gas_price(&self) -> Result<U256, ExplorerError> {
        self.request("eth_gasPrice", rpc_params![]).await
    }

    async fn peer_count(&self) -> Result<u64, ExplorerError> {
        let count: U64 = self.request("net_peerCount", rpc_params![]).await?;
        Ok(count.to::<u64>())
    }

    async fn hashrate(&self) -> Result<u64, ExplorerError> {
        let rate: U256 = self.request("eth_hashrate", rpc_params![]).await?;
        Ok(rate.saturating_to::<u64>())
    }

    async fn is_mining(&self) -> Result<bool, ExplorerError> {
        self.request("eth_mining", rpc_params![]).await
    }

    async fn syncing(&self) -> Result<SyncStatus, ExplorerError> {
        self.request("eth_syncing", rpc_params![]).await
    }

    async fn balance(&self, address: Address) -> Result<U256, ExplorerError> {
        self.request("eth_getBalance", rpc_params![address, "latest"]).await
    }

    async fn code(&self, address: Address) -> Result<Bytes, ExplorerError> {
        self.request("eth_getCode", rpc_params![address, "latest"]).await
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, ExplorerError> {
        let count: U64 = self.request("eth_getTransactionCount", rpc_params![address, "latest"]).await?;
        Ok(count.to::<u64>())
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ExplorerError> {
        self.request("eth_call", rpc_params![CallRequest { to, data }, "latest"]).await
    }

    async fn subscribe_new_heads(&self) -> Result<EventStream<HeadEvent>, ExplorerError> {
        let headers = self.subscribe::<RpcHeader>("newHeads").await?;
        Ok(headers
            .map(|item| item.map(|h| HeadEvent { number: h.number }))
            .boxed())
    }

    async fn subscribe_pending_transactions(&self) -> Result<EventStream<B256>, ExplorerError> {
        self.subscribe::<B256>("newPendingTransactions").await
    }
}
