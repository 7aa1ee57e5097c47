#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use etherlens::error::ExplorerError;
use etherlens::models::{
    BlockRecord, BlockTransactions, ReceiptRecord, ServerMessage, SyncStatus, TransactionRecord, TxStatus,
};
use etherlens::node::{BlockId, EventStream, HeadEvent, NodeClient};
use etherlens::pipeline::Outbox;
use etherlens::Config;
use futures::channel::mpsc;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// In-memory node with switchable failures
#[derive(Default)]
pub struct MockNode {
    pub blocks: Mutex<HashMap<u64, BlockRecord>>,
    pub transactions: Mutex<HashMap<B256, TransactionRecord>>,
    pub receipts: Mutex<HashMap<B256, ReceiptRecord>>,
    pub balances: Mutex<HashMap<Address, U256>>,
    pub codes: Mutex<HashMap<Address, Bytes>>,
    pub nonces: Mutex<HashMap<Address, u64>>,
    // eth_call answers keyed by contract and 4-byte selector
    pub calls: Mutex<HashMap<(Address, [u8; 4]), Bytes>>,
    pub gas_price: U256,
    pub fail_blocks: AtomicBool,
    pub fail_stats: AtomicBool,
    pub block_calls: AtomicUsize,
    // Makes every block lookup take this long
    pub block_delay: Mutex<Option<Duration>>,
    heads: Mutex<Option<mpsc::UnboundedReceiver<Result<HeadEvent, ExplorerError>>>>,
    pending: Mutex<Option<mpsc::UnboundedReceiver<Result<B256, ExplorerError>>>>,
}

impl MockNode {
    pub fn new() -> Self {
        MockNode { gas_price: U256::from(20_000_000_000u64), ..Default::default() }
    }

    pub fn with_block(self, block: BlockRecord) -> Self {
        for tx in block.transactions.full() {
            self.transactions.lock().unwrap().insert(tx.hash, tx.clone());
        }
        self.blocks.lock().unwrap().insert(block.number, block);
        self
    }

    pub fn with_transaction(self, tx: TransactionRecord) -> Self {
        self.transactions.lock().unwrap().insert(tx.hash, tx);
        self
    }

    pub fn with_receipt(self, receipt: ReceiptRecord) -> Self {
        self.receipts.lock().unwrap().insert(receipt.transaction_hash, receipt);
        self
    }

    // Feeds for the two subscriptions; each can be taken once
    pub fn subscriptions(
        &self,
    ) -> (mpsc::UnboundedSender<Result<HeadEvent, ExplorerError>>, mpsc::UnboundedSender<Result<B256, ExplorerError>>) {
        let (heads_tx, heads_rx) = mpsc::unbounded();
        let (pending_tx, pending_rx) = mpsc::unbounded();
        // Pending first: the relay subscribes to heads first and must find both
        *self.pending.lock().unwrap() = Some(pending_rx);
        *self.heads.lock().unwrap() = Some(heads_rx);
        (heads_tx, pending_tx)
    }

    fn stats_guard(&self) -> Result<(), ExplorerError> {
        if self.fail_stats.load(Ordering::SeqCst) {
            return Err(ExplorerError::Rpc("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn block(&self, id: BlockId, full_transactions: bool) -> Result<Option<BlockRecord>, ExplorerError> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.block_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_blocks.load(Ordering::SeqCst) {
            return Err(ExplorerError::Rpc("connection refused".into()));
        }
        let blocks = self.blocks.lock().unwrap();
        let block = match id {
            BlockId::Number(n) => blocks.get(&n).cloned(),
            BlockId::Hash(h) => blocks.values().find(|b| b.hash == h).cloned(),
            BlockId::Latest => blocks.keys().max().and_then(|n| blocks.get(n)).cloned(),
        };
        Ok(block.map(|mut block| {
            if !full_transactions {
                let hashes = block.transactions.full().iter().map(|tx| tx.hash).collect();
                block.transactions = BlockTransactions::Hashes(hashes);
            }
            block
        }))
    }

    async fn block_number(&self) -> Result<u64, ExplorerError> {
        Ok(self.blocks.lock().unwrap().keys().max().copied().unwrap_or_default())
    }

    async fn transaction(&self, hash: B256) -> Result<Option<TransactionRecord>, ExplorerError> {
        Ok(self.transactions.lock().unwrap().get(&hash).cloned())
    }

    async fn receipt(&self, hash: B256) -> Result<Option<ReceiptRecord>, ExplorerError> {
        Ok(self.receipts.lock().unwrap().get(&hash).cloned())
    }

    async fn gas_price(&self) -> Result<U256, ExplorerError> {
        self.stats_guard()?;
        Ok(self.gas_price)
    }

    async fn peer_count(&self) -> Result<u64, ExplorerError> {
        self.stats_guard()?;
        Ok(25)
    }

    async fn hashrate(&self) -> Result<u64, ExplorerError> {
        self.stats_guard()?;
        Ok(0)
    }

    async fn is_mining(&self) -> Result<bool, ExplorerError> {
        Ok(false)
    }

    async fn syncing(&self) -> Result<SyncStatus, ExplorerError> {
        Ok(SyncStatus::Idle(false))
    }

    async fn balance(&self, address: Address) -> Result<U256, ExplorerError> {
        Ok(self.balances.lock().unwrap().get(&address).copied().unwrap_or_default())
    }

    async fn code(&self, address: Address) -> Result<Bytes, ExplorerError> {
        Ok(self.codes.lock().unwrap().get(&address).cloned().unwrap_or_default())
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, ExplorerError> {
        Ok(self.nonces.lock().unwrap().get(&address).copied().unwrap_or_default())
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ExplorerError> {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&data[..4]);
        Ok(self.calls.lock().unwrap().get(&(to, selector)).cloned().unwrap_or_default())
    }

    async fn subscribe_new_heads(&self) -> Result<EventStream<HeadEvent>, ExplorerError> {
        match self.heads.lock().unwrap().take() {
            Some(rx) => Ok(rx.boxed()),
            None => Err(ExplorerError::Rpc("subscription refused".into())),
        }
    }

    async fn subscribe_pending_transactions(&self) -> Result<EventStream<B256>, ExplorerError> {
        match self.pending.lock().unwrap().take() {
            Some(rx) => Ok(rx.boxed()),
            None => Err(ExplorerError::Rpc("subscription refused".into())),
        }
    }
}

// Collects everything the enricher publishes
#[derive(Default)]
pub struct RecordingOutbox {
    pub messages: Mutex<Vec<ServerMessage>>,
}

impl RecordingOutbox {
    pub fn taken(&self) -> Vec<ServerMessage> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }
}

impl Outbox for RecordingOutbox {
    fn publish(&self, message: ServerMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

pub fn config() -> Config {
    Config::from_lookup(|_: &str| None).unwrap()
}

pub fn config_with(pairs: &[(&str, &str)]) -> Config {
    let pairs: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Config::from_lookup(move |key: &str| pairs.get(key).cloned()).unwrap()
}

pub fn address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn hash(byte: u8) -> B256 {
    B256::repeat_byte(byte)
}

pub fn transaction(hash_byte: u8, from: Address, to: Option<Address>, block_number: Option<u64>) -> TransactionRecord {
    TransactionRecord {
        hash: hash(hash_byte),
        nonce: 0,
        block_hash: block_number.map(|_| hash(0xbb)),
        block_number,
        transaction_index: block_number.map(|_| 0),
        from,
        to,
        value: U256::from(1_000_000_000_000_000_000u128),
        gas_price: U256::from(1_000_000_000u64),
        gas: 21_000,
        input: Bytes::new(),
        status: if block_number.is_some() { TxStatus::Confirmed } else { TxStatus::Pending },
        timestamp: None,
        gas_used: None,
        logs: None,
        contract_address: None,
    }
}

pub fn block(number: u64, gas_used: u64, gas_limit: u64, transactions: Vec<TransactionRecord>) -> BlockRecord {
    BlockRecord {
        number,
        hash: B256::left_padding_from(&number.to_be_bytes()),
        parent_hash: B256::left_padding_from(&number.saturating_sub(1).to_be_bytes()),
        timestamp: 1_700_000_000 + number * 12,
        miner: address(0xee),
        gas_used,
        gas_limit,
        size: 1_000,
        base_fee_per_gas: None,
        transactions: BlockTransactions::Full(transactions),
    }
}

pub fn receipt(hash_byte: u8, success: bool, gas_used: u64) -> ReceiptRecord {
    ReceiptRecord {
        transaction_hash: hash(hash_byte),
        status: success,
        gas_used,
        logs: Vec::new(),
        contract_address: None,
        block_number: Some(100),
    }
}
