use crate::config::Config;
use crate::error::ExplorerError;
use crate::models::{
    AddressDetail, BlockDetail, BlockRecord, NetworkStats, NodeStatus, TokenBalance, TokenInfo,
    TransactionDetail, TransactionRecord,
};
use crate::node::{self, BlockId, NodeClient};
use crate::utils::{from_wei, gas_utilization, GWEI_DECIMALS, WEI_DECIMALS};
use alloy_primitives::{Address, B256, U256};
use futures::future::try_join_all;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;

// Read-only queries behind the HTTP and GraphQL APIs. No caching
#[derive(Clone)]
pub struct Explorer {
    node: Arc<dyn NodeClient>,
    block_reward: U256,
    latest_blocks: usize,
    address_scan_depth: u64,
}

impl Explorer {
    pub fn new(node: Arc<dyn NodeClient>, config: &Config) -> Self {
        Explorer {
            node,
            block_reward: config.block_reward_wei,
            latest_blocks: config.latest_blocks,
            address_scan_depth: config.address_scan_depth,
        }
    }

    pub async fn stats(&self) -> Result<NodeStatus, ExplorerError> {
        let (latest, gas_price, peer_count, is_mining, hashrate, syncing) = tokio::try_join!(
            self.node.block(BlockId::Latest, false),
            self.node.gas_price(),
            self.node.peer_count(),
            self.node.is_mining(),
            self.node.hashrate(),
            self.node.syncing(),
        )?;
        let latest = latest.ok_or_else(|| ExplorerError::not_found(BlockId::Latest))?;
        Ok(NodeStatus {
            stats: NetworkStats {
                latest_block_number: latest.number,
                latest_block_time: latest.timestamp,
                gas_price: from_wei(gas_price, GWEI_DECIMALS),
                peer_count,
                hashrate,
            },
            is_mining,
            syncing,
        })
    }

    // Most recent blocks, newest first
    pub async fn latest_blocks(&self) -> Result<Vec<BlockRecord>, ExplorerError> {
        let head = self.node.block_number().await?;
        let count = (self.latest_blocks as u64).min(head.saturating_add(1));
        let fetches = (0..count).map(|i| self.node.block(BlockId::Number(head - i), true));
        let blocks = try_join_all(fetches).await?;
        Ok(blocks.into_iter().flatten().collect())
    }

    // Block with its successor's hash and the reward paid to the miner
    pub async fn block(&self, id: BlockId) -> Result<BlockDetail, ExplorerError> {
        let (block, next) = match id {
            // Number known up front: fetch the successor alongside
            BlockId::Number(number) => tokio::try_join!(
                self.node.block(id, true),
                self.node.block(BlockId::Number(number.saturating_add(1)), false),
            )?,
            _ => {
                let block = self.node.block(id, true).await?;
                let next = match &block {
                    Some(b) => self.node.block(BlockId::Number(b.number.saturating_add(1)), false).await?,
                    None => None,
                };
                (block, next)
            }
        };
        let block = block.ok_or_else(|| ExplorerError::not_found(id))?;
        Ok(block_detail(block, next.map(|b| b.hash), self.block_reward))
    }

    // Transaction merged with its receipt, block time, and any contract it created
    pub async fn transaction(&self, hash: B256) -> Result<TransactionDetail, ExplorerError> {
        let (tx, receipt) = tokio::try_join!(self.node.transaction(hash), self.node.receipt(hash))?;
        let tx = tx.ok_or_else(|| ExplorerError::not_found(format!("transaction {}", hash)))?;

        let mut tx = match &receipt {
            Some(receipt) => tx.confirm(receipt),
            None => tx,
        };
        if let Some(number) = tx.block_number {
            tx.timestamp = self.node.block(BlockId::Number(number), false).await?.map(|b| b.timestamp);
        }

        let contract_created = if tx.is_contract_creation() { tx.contract_address } else { None };
        let contract_code = match contract_created {
            Some(address) => Some(self.node.code(address).await?),
            None => None,
        };
        Ok(TransactionDetail { transaction: tx, contract_created, contract_code })
    }

    // Balance, code, nonce, and the address's transactions in the last few blocks
    pub async fn address(&self, address: Address) -> Result<AddressDetail, ExplorerError> {
        let (balance, code, transaction_count, head) = tokio::try_join!(
            self.node.balance(address),
            self.node.code(address),
            self.node.transaction_count(address),
            self.node.block_number(),
        )?;

        let depth = self.address_scan_depth.min(head.saturating_add(1));
        let fetches = (0..depth).map(|i| self.node.block(BlockId::Number(head - i), true));
        let blocks: Vec<BlockRecord> = try_join_all(fetches).await?.into_iter().flatten().collect();

        let is_contract = !code.is_empty();
        Ok(AddressDetail {
            address,
            balance: from_wei(balance, WEI_DECIMALS),
            is_contract,
            contract_code: is_contract.then_some(code),
            transaction_count,
            latest_transactions: transactions_touching(&blocks, &address),
        })
    }

    // Token indexing is not implemented; the list is always empty
    pub fn tokens(&self) -> Vec<TokenInfo> {
        Vec::new()
    }

    pub async fn token(&self, address: Address) -> Result<TokenInfo, ExplorerError> {
        node::token_info(self.node.as_ref(), address).await
    }

    pub async fn token_balance(&self, token: Address, owner: Address) -> Result<TokenBalance, ExplorerError> {
        node::token_balance(self.node.as_ref(), token, owner).await
    }
}

pub fn block_detail(block: BlockRecord, next_block_hash: Option<B256>, block_reward: U256) -> BlockDetail {
    let total_reward = block_reward.saturating_add(block.fee_total());
    let gas_utilization = gas_utilization(block.gas_used, block.gas_limit);
    BlockDetail {
        block,
        next_block_hash,
        total_reward: from_wei(total_reward, WEI_DECIMALS),
        gas_utilization,
    }
}

// Keeps block order; within a block, transaction order
pub fn transactions_touching(blocks: &[BlockRecord], address: &Address) -> Vec<TransactionRecord> {
    blocks
        .par_iter()
        .flat_map_iter(|block| block.transactions.full().iter().filter(|tx| tx.touches(address)).cloned())
        .collect()
}

// What a search box query refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum SearchTarget {
    Block(u64),
    Transaction(B256),
    Address(Address),
}

lazy_static::lazy_static! {
    static ref BLOCK_QUERY: Regex = Regex::new(r"^\d+$").unwrap();
    static ref TX_QUERY: Regex = Regex::new(r"^0x[a-fA-F0-9]{64}$").unwrap();
    static ref ADDRESS_QUERY: Regex = Regex::new(r"^0x[a-fA-F0-9]{40}$").unwrap();
}

pub fn classify_query(query: &str) -> Result<SearchTarget, ExplorerError> {
    let query = query.trim();
    let invalid = || ExplorerError::invalid("enter a valid block number, transaction hash, or address");
    if BLOCK_QUERY.is_match(query) {
        query.parse().map(SearchTarget::Block).map_err(|_| invalid())
    } else if TX_QUERY.is_match(query) {
        query.parse().map(SearchTarget::Transaction).map_err(|_| invalid())
    } else if ADDRESS_QUERY.is_match(query) {
        query.parse().map(SearchTarget::Address).map_err(|_| invalid())
    } else {
        Err(invalid())
    }
}

pub fn parse_block_number(raw: &str) -> Result<u64, ExplorerError> {
    raw.trim().parse().map_err(|_| ExplorerError::invalid(format!("block number {:?}", raw)))
}

// A block is addressed by number or by hash
pub fn parse_block_id(raw: &str) -> Result<BlockId, ExplorerError> {
    let raw = raw.trim();
    if TX_QUERY.is_match(raw) {
        return parse_hash(raw).map(BlockId::Hash);
    }
    parse_block_number(raw).map(BlockId::Number)
}

pub fn parse_hash(raw: &str) -> Result<B256, ExplorerError> {
    if !TX_QUERY.is_match(raw.trim()) {
        return Err(ExplorerError::invalid(format!("transaction hash {:?}", raw)));
    }
    raw.trim().parse().map_err(|_| ExplorerError::invalid(format!("transaction hash {:?}", raw)))
}

pub fn parse_address(raw: &str) -> Result<Address, ExplorerError> {
    if !ADDRESS_QUERY.is_match(raw.trim()) {
        return Err(ExplorerError::invalid(format!("address {:?}", raw)));
    }
    raw.trim().parse().map_err(|_| ExplorerError::invalid(format!("address {:?}", raw)))
}
