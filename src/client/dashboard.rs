use crate::models::{BlockRecord, NetworkStats, ServerMessage, TransactionRecord};
use alloy_primitives::B256;
use std::collections::{BTreeMap, HashMap, VecDeque};

pub const DEFAULT_CAPACITY: usize = 10;

// Explicit viewer state fed by push frames. Frames may arrive in any order:
// blocks are upserted by number, transactions by hash, and a transaction's
// status never moves backwards
#[derive(Debug, Clone)]
pub struct Dashboard {
    capacity: usize,
    stats: Option<NetworkStats>,
    blocks: BTreeMap<u64, BlockRecord>,
    transactions: HashMap<B256, TransactionRecord>,
    arrival: VecDeque<B256>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Dashboard {
    pub fn new(capacity: usize) -> Self {
        Dashboard {
            capacity: capacity.max(1),
            stats: None,
            blocks: BTreeMap::new(),
            transactions: HashMap::new(),
            arrival: VecDeque::new(),
        }
    }

    pub fn apply(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::NetworkStats(stats) => self.apply_stats(stats),
            ServerMessage::NewBlock(block) => self.apply_block(block),
            ServerMessage::NewTransaction(tx) => self.apply_transaction(tx),
            // Only updates rows the viewer already shows
            ServerMessage::TransactionConfirmed(tx) => {
                if self.transactions.contains_key(&tx.hash) {
                    self.apply_transaction(tx);
                }
            }
        }
    }

    fn apply_stats(&mut self, stats: NetworkStats) {
        // An older snapshot completing late must not roll the counters back
        if let Some(current) = &self.stats {
            if current.latest_block_number > stats.latest_block_number {
                return;
            }
        }
        self.stats = Some(stats);
    }

    fn apply_block(&mut self, block: BlockRecord) {
        self.blocks.insert(block.number, block);
        while self.blocks.len() > self.capacity {
            self.blocks.pop_first();
        }
    }

    fn apply_transaction(&mut self, incoming: TransactionRecord) {
        match self.transactions.get_mut(&incoming.hash) {
            Some(existing) => {
                let status = existing.status.advance(incoming.status);
                // A stale frame keeps the richer record already shown
                if status == incoming.status {
                    *existing = incoming;
                }
                existing.status = status;
            }
            None => {
                self.arrival.push_back(incoming.hash);
                self.transactions.insert(incoming.hash, incoming);
                while self.arrival.len() > self.capacity {
                    if let Some(evicted) = self.arrival.pop_front() {
                        self.transactions.remove(&evicted);
                    }
                }
            }
        }
    }

    pub fn stats(&self) -> Option<&NetworkStats> {
        self.stats.as_ref()
    }

    // Newest first
    pub fn blocks(&self) -> impl Iterator<Item = &BlockRecord> {
        self.blocks.values().rev()
    }

    // Most recently seen first
    pub fn transactions(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.arrival.iter().rev().filter_map(|hash| self.transactions.get(hash))
    }

    pub fn transaction(&self, hash: &B256) -> Option<&TransactionRecord> {
        self.transactions.get(hash)
    }
}
