use crate::error::ExplorerError;
use crate::metrics::{BLOCKS_ENRICHED, TXS_ENRICHED};
use crate::models::{BlockRecord, NetworkStats, ServerMessage, TxStatus};
use crate::node::{BlockId, NodeClient};
use crate::utils::{from_wei, GWEI_DECIMALS};
use alloy_primitives::B256;
use log::{debug, warn};
use std::sync::Arc;

// Destination for enriched records
pub trait Outbox: Send + Sync {
    fn publish(&self, message: ServerMessage);
}

// Turns bare subscription events into self-contained, display-ready records
#[derive(Clone)]
pub struct Enricher {
    node: Arc<dyn NodeClient>,
}

impl Enricher {
    pub fn new(node: Arc<dyn NodeClient>) -> Self {
        Enricher { node }
    }

    // New block header: full block plus a fresh network snapshot, emitted as two messages.
    // Without the block the event is dropped; a failed snapshot only loses the stats message
    pub async fn enrich_block(&self, number: u64, outbox: &dyn Outbox) -> Result<(), ExplorerError> {
        let (block, stats) = tokio::join!(
            self.node.block(BlockId::Number(number), true),
            self.snapshot_parts(),
        );
        // Header may refer to a block the HTTP endpoint cannot see yet
        let block = block?.ok_or_else(|| ExplorerError::not_found(BlockId::Number(number)))?;

        let stats = match stats {
            Ok((gas_price, peer_count, hashrate)) => Some(NetworkStats {
                latest_block_number: block.number,
                latest_block_time: block.timestamp,
                gas_price,
                peer_count,
                hashrate,
            }),
            Err(e) => {
                warn!("Network stats unavailable for block {}: {}", number, e);
                None
            }
        };

        debug!("Enriched block {} with {} transactions", block.number, block.transactions.len());
        outbox.publish(ServerMessage::NewBlock(block));
        if let Some(stats) = stats {
            outbox.publish(ServerMessage::NetworkStats(stats));
        }
        BLOCKS_ENRICHED.inc();
        Ok(())
    }

    async fn snapshot_parts(&self) -> Result<(String, u64, u64), ExplorerError> {
        let (gas_price, peer_count, hashrate) =
            tokio::try_join!(self.node.gas_price(), self.node.peer_count(), self.node.hashrate())?;
        Ok((from_wei(gas_price, GWEI_DECIMALS), peer_count, hashrate))
    }

    // Pending transaction hash: the transaction stamped with the latest block time.
    // If it is already mined, a second richer record follows once the receipt is in.
    // A hash the node no longer knows is not an error; nothing is emitted
    pub async fn enrich_pending(&self, hash: B256, outbox: &dyn Outbox) -> Result<(), ExplorerError> {
        let (tx, latest) = tokio::try_join!(self.node.transaction(hash), self.latest_block())?;

        let Some(mut tx) = tx else {
            debug!("Transaction {} left the pool before lookup, ignoring", hash);
            return Ok(());
        };
        tx.timestamp = Some(latest.timestamp);
        let observed = if tx.block_number.is_some() { TxStatus::Confirmed } else { TxStatus::Pending };
        tx.status = tx.status.advance(observed);

        outbox.publish(ServerMessage::NewTransaction(tx.clone()));
        TXS_ENRICHED.inc();

        if tx.block_number.is_none() {
            return Ok(());
        }
        match self.node.receipt(hash).await {
            Ok(Some(receipt)) => {
                outbox.publish(ServerMessage::TransactionConfirmed(tx.confirm(&receipt)));
            }
            Ok(None) => debug!("Receipt for {} not available yet", hash),
            // The first record is already out; only the upgrade is lost
            Err(e) => warn!("Receipt lookup for {} failed: {}", hash, e),
        }
        Ok(())
    }

    async fn latest_block(&self) -> Result<BlockRecord, ExplorerError> {
        self.node
            .block(BlockId::Latest, false)
            .await?
            .ok_or_else(|| ExplorerError::not_found(BlockId::Latest))
    }
}
