use crate::models::{
    BlockRecord, BlockTransactions, LogRecord, ReceiptRecord, TransactionRecord, TxStatus,
};
use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};

// Payloads exactly as the node sends them (hex quantities); converted into the
// display models before anything leaves the node module

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcHeader {
    #[serde(with = "alloy_serde::quantity")]
    pub number: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: B256,
    #[serde(default, with = "alloy_serde::quantity")]
    pub nonce: u64,
    #[serde(default)]
    pub block_hash: Option<B256>,
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub block_number: Option<u64>,
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub transaction_index: Option<u64>,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub value: Option<U256>,
    #[serde(default)]
    pub gas_price: Option<U256>,
    #[serde(default, with = "alloy_serde::quantity")]
    pub gas: u64,
    #[serde(default)]
    pub input: Bytes,
}

impl From<RpcTransaction> for TransactionRecord {
    // Missing value/gasPrice become zero so formatting never sees an absent amount
    fn from(tx: RpcTransaction) -> Self {
        let status = if tx.block_number.is_some() { TxStatus::Confirmed } else { TxStatus::Pending };
        TransactionRecord {
            hash: tx.hash,
            nonce: tx.nonce,
            block_hash: tx.block_hash,
            block_number: tx.block_number,
            transaction_index: tx.transaction_index,
            from: tx.from,
            to: tx.to,
            value: tx.value.unwrap_or_default(),
            gas_price: tx.gas_price.unwrap_or_default(),
            gas: tx.gas,
            input: tx.input,
            status,
            timestamp: None,
            gas_used: None,
            logs: None,
            contract_address: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RpcBlockTransactions {
    Full(Vec<RpcTransaction>),
    Hashes(Vec<B256>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    #[serde(with = "alloy_serde::quantity")]
    pub number: u64,
    pub hash: B256,
    pub parent_hash: B256,
    #[serde(with = "alloy_serde::quantity")]
    pub timestamp: u64,
    #[serde(default)]
    pub miner: Address,
    #[serde(with = "alloy_serde::quantity")]
    pub gas_used: u64,
    #[serde(with = "alloy_serde::quantity")]
    pub gas_limit: u64,
    #[serde(default, with = "alloy_serde::quantity")]
    pub size: u64,
    #[serde(default)]
    pub base_fee_per_gas: Option<U256>,
    pub transactions: RpcBlockTransactions,
}

impl From<RpcBlock> for BlockRecord {
    fn from(block: RpcBlock) -> Self {
        let transactions = match block.transactions {
            RpcBlockTransactions::Full(txs) => {
                BlockTransactions::Full(txs.into_iter().map(TransactionRecord::from).collect())
            }
            RpcBlockTransactions::Hashes(hashes) => BlockTransactions::Hashes(hashes),
        };
        BlockRecord {
            number: block.number,
            hash: block.hash,
            parent_hash: block.parent_hash,
            timestamp: block.timestamp,
            miner: block.miner,
            gas_used: block.gas_used,
            gas_limit: block.gas_limit,
            size: block.size,
            base_fee_per_gas: block.base_fee_per_gas,
            transactions,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Address,
    #[serde(default)]
    pub topics: Vec<B256>,
    #[serde(default)]
    pub data: Bytes,
}

impl From<RpcLog> for LogRecord {
    fn from(log: RpcLog) -> Self {
        LogRecord { address: log.address, topics: log.topics, data: log.data }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: B256,
    // Absent on pre-Byzantium receipts, which carry a state root instead
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(with = "alloy_serde::quantity")]
    pub gas_used: u64,
    #[serde(default)]
    pub logs: Vec<RpcLog>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub block_number: Option<u64>,
}

impl From<RpcReceipt> for ReceiptRecord {
    fn from(receipt: RpcReceipt) -> Self {
        ReceiptRecord {
            transaction_hash: receipt.transaction_hash,
            status: receipt.status.map(|s| s == U64::from(1)).unwrap_or(true),
            gas_used: receipt.gas_used,
            logs: receipt.logs.into_iter().map(LogRecord::from).collect(),
            contract_address: receipt.contract_address,
            block_number: receipt.block_number,
        }
    }
}

// eth_call request object
#[derive(Debug, Clone, Serialize)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
}
