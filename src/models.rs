use crate::utils::u256_decimal;
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

// Lifecycle of a transaction as seen by viewers. Only ever moves forward:
// pending -> confirmed -> success | failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Success,
    Failed,
}

impl TxStatus {
    fn rank(self) -> u8 {
        match self {
            TxStatus::Pending => 0,
            TxStatus::Confirmed => 1,
            TxStatus::Success | TxStatus::Failed => 2,
        }
    }

    // Applies an observed status without ever regressing; a settled outcome is final
    pub fn advance(self, observed: TxStatus) -> TxStatus {
        if observed.rank() > self.rank() {
            observed
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRecord {
    pub transaction_hash: B256,
    pub status: bool,
    pub gas_used: u64,
    pub logs: Vec<LogRecord>,
    pub contract_address: Option<Address>,
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub hash: B256,
    pub nonce: u64,
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub transaction_index: Option<u64>,
    pub from: Address,
    pub to: Option<Address>,
    #[serde(with = "u256_decimal")]
    pub value: U256,
    #[serde(with = "u256_decimal")]
    pub gas_price: U256,
    pub gas: u64,
    #[serde(default)]
    pub input: Bytes,
    pub status: TxStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<LogRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
}

impl TransactionRecord {
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    pub fn touches(&self, address: &Address) -> bool {
        self.from == *address || self.to.as_ref() == Some(address)
    }

    // Upper bound on the fee: gas limit times gas price
    pub fn max_fee(&self) -> U256 {
        U256::from(self.gas).saturating_mul(self.gas_price)
    }

    // Merges the execution outcome into the record. Execution fields come only from the receipt
    pub fn confirm(mut self, receipt: &ReceiptRecord) -> TransactionRecord {
        let outcome = if receipt.status { TxStatus::Success } else { TxStatus::Failed };
        self.status = self.status.advance(outcome);
        self.gas_used = Some(receipt.gas_used);
        self.logs = Some(receipt.logs.clone());
        self.contract_address = receipt.contract_address;
        if self.block_number.is_none() {
            self.block_number = receipt.block_number;
        }
        self
    }
}

// Full objects when fetched with transactions, bare hashes otherwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransactions {
    Full(Vec<TransactionRecord>),
    Hashes(Vec<B256>),
}

impl BlockTransactions {
    pub fn len(&self) -> usize {
        match self {
            BlockTransactions::Full(txs) => txs.len(),
            BlockTransactions::Hashes(hashes) => hashes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn full(&self) -> &[TransactionRecord] {
        match self {
            BlockTransactions::Full(txs) => txs,
            BlockTransactions::Hashes(_) => &[],
        }
    }
}

impl Default for BlockTransactions {
    fn default() -> Self {
        BlockTransactions::Full(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    pub number: u64,
    pub hash: B256,
    pub parent_hash: B256,
    pub timestamp: u64,
    pub miner: Address,
    pub gas_used: u64,
    pub gas_limit: u64,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "u256_decimal::opt")]
    pub base_fee_per_gas: Option<U256>,
    pub transactions: BlockTransactions,
}

impl BlockRecord {
    // Sum of gas limit times gas price over the block's transactions
    pub fn fee_total(&self) -> U256 {
        self.transactions
            .full()
            .iter()
            .fold(U256::ZERO, |acc, tx| acc.saturating_add(tx.max_fee()))
    }
}

// Point-in-time network snapshot pushed to viewers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub latest_block_number: u64,
    pub latest_block_time: u64,
    pub gas_price: String, // gwei
    pub peer_count: u64,
    pub hashrate: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgress {
    #[serde(with = "alloy_serde::quantity")]
    pub starting_block: u64,
    #[serde(with = "alloy_serde::quantity")]
    pub current_block: u64,
    #[serde(with = "alloy_serde::quantity")]
    pub highest_block: u64,
}

// eth_syncing answers `false` or a progress object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SyncStatus {
    Syncing(SyncProgress),
    Idle(bool),
}

// /api/stats: the network snapshot plus node-local flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    #[serde(flatten)]
    pub stats: NetworkStats,
    pub is_mining: bool,
    pub syncing: SyncStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDetail {
    #[serde(flatten)]
    pub block: BlockRecord,
    pub next_block_hash: Option<B256>,
    pub total_reward: String, // ether
    pub gas_utilization: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: TransactionRecord,
    pub contract_created: Option<Address>,
    pub contract_code: Option<Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetail {
    pub address: Address,
    pub balance: String, // ether
    pub is_contract: bool,
    pub contract_code: Option<Bytes>,
    pub transaction_count: u64,
    pub latest_transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub token: Address,
    pub owner: Address,
    #[serde(with = "u256_decimal")]
    pub balance: U256,
}

// Frames pushed to viewers as {"type": ..., "data": ...}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    NetworkStats(NetworkStats),
    NewBlock(BlockRecord),
    NewTransaction(TransactionRecord),
    TransactionConfirmed(TransactionRecord),
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::NetworkStats(_) => "networkStats",
            ServerMessage::NewBlock(_) => "newBlock",
            ServerMessage::NewTransaction(_) => "newTransaction",
            ServerMessage::TransactionConfirmed(_) => "transactionConfirmed",
        }
    }

    pub fn is_transaction(&self) -> bool {
        matches!(self, ServerMessage::NewTransaction(_) | ServerMessage::TransactionConfirmed(_))
    }
}
