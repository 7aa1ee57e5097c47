mod common;

use common::{address, block, hash, receipt, transaction, MockNode, RecordingOutbox};
use etherlens::models::{ServerMessage, TxStatus};
use etherlens::pipeline::Enricher;
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[tokio::test]
async fn new_head_emits_block_then_stats() {
    let node = MockNode::new().with_block(block(100, 250, 1000, vec![]));
    let enricher = Enricher::new(Arc::new(node));
    let outbox = RecordingOutbox::default();

    enricher.enrich_block(100, &outbox).await.unwrap();

    let messages = outbox.taken();
    assert_eq!(messages.len(), 2);
    assert!(matches!(&messages[0], ServerMessage::NewBlock(b) if b.number == 100));
    match &messages[1] {
        ServerMessage::NetworkStats(stats) => {
            assert_eq!(stats.latest_block_number, 100);
            assert_eq!(stats.gas_price, "20");
            assert_eq!(stats.peer_count, 25);
        }
        other => panic!("expected stats, got {:?}", other),
    }
}

#[tokio::test]
async fn failed_block_fetch_drops_the_event() {
    let node = MockNode::new().with_block(block(100, 0, 1000, vec![]));
    node.fail_blocks.store(true, Ordering::SeqCst);
    let enricher = Enricher::new(Arc::new(node));
    let outbox = RecordingOutbox::default();

    assert!(enricher.enrich_block(100, &outbox).await.is_err());
    assert!(outbox.taken().is_empty());
}

#[tokio::test]
async fn unknown_block_is_not_published() {
    let enricher = Enricher::new(Arc::new(MockNode::new()));
    let outbox = RecordingOutbox::default();

    assert!(enricher.enrich_block(7, &outbox).await.is_err());
    assert!(outbox.taken().is_empty());
}

#[tokio::test]
async fn failed_snapshot_still_emits_block() {
    let node = MockNode::new().with_block(block(100, 0, 1000, vec![]));
    node.fail_stats.store(true, Ordering::SeqCst);
    let enricher = Enricher::new(Arc::new(node));
    let outbox = RecordingOutbox::default();

    enricher.enrich_block(100, &outbox).await.unwrap();

    let messages = outbox.taken();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind(), "newBlock");
}

#[tokio::test]
async fn pending_transaction_is_stamped_with_latest_block_time() {
    let head = block(100, 0, 1000, vec![]);
    let timestamp = head.timestamp;
    let node = MockNode::new()
        .with_block(head)
        .with_transaction(transaction(0x01, address(0xaa), Some(address(0xbb)), None));
    let enricher = Enricher::new(Arc::new(node));
    let outbox = RecordingOutbox::default();

    enricher.enrich_pending(hash(0x01), &outbox).await.unwrap();

    let messages = outbox.taken();
    assert_eq!(messages.len(), 1);
    match &messages[0] {
        ServerMessage::NewTransaction(tx) => {
            assert_eq!(tx.status, TxStatus::Pending);
            assert_eq!(tx.timestamp, Some(timestamp));
            assert_eq!(tx.gas_used, None);
        }
        other => panic!("expected transaction, got {:?}", other),
    }
}

#[tokio::test]
async fn vanished_transaction_emits_nothing() {
    let node = MockNode::new().with_block(block(100, 0, 1000, vec![]));
    let enricher = Enricher::new(Arc::new(node));
    let outbox = RecordingOutbox::default();

    enricher.enrich_pending(hash(0x42), &outbox).await.unwrap();
    assert!(outbox.taken().is_empty());
}

#[tokio::test]
async fn mined_transaction_is_followed_by_confirmation() {
    let node = MockNode::new()
        .with_block(block(100, 0, 1000, vec![]))
        .with_transaction(transaction(0x01, address(0xaa), Some(address(0xbb)), Some(100)))
        .with_receipt(receipt(0x01, true, 21_000));
    let enricher = Enricher::new(Arc::new(node));
    let outbox = RecordingOutbox::default();

    enricher.enrich_pending(hash(0x01), &outbox).await.unwrap();

    let messages = outbox.taken();
    assert_eq!(messages.len(), 2);
    let ServerMessage::NewTransaction(first) = &messages[0] else {
        panic!("expected transaction first, got {:?}", messages[0]);
    };
    let ServerMessage::TransactionConfirmed(second) = &messages[1] else {
        panic!("expected confirmation second, got {:?}", messages[1]);
    };
    assert_eq!(first.status, TxStatus::Confirmed);
    assert_eq!(second.status, TxStatus::Success);
    assert_eq!(second.hash, first.hash);
    assert_eq!(second.gas_used, Some(21_000));
    assert_eq!(second.timestamp, first.timestamp);
}

#[tokio::test]
async fn failed_receipt_settles_as_failed() {
    let node = MockNode::new()
        .with_block(block(100, 0, 1000, vec![]))
        .with_transaction(transaction(0x01, address(0xaa), Some(address(0xbb)), Some(100)))
        .with_receipt(receipt(0x01, false, 30_000));
    let enricher = Enricher::new(Arc::new(node));
    let outbox = RecordingOutbox::default();

    enricher.enrich_pending(hash(0x01), &outbox).await.unwrap();

    match outbox.taken().pop() {
        Some(ServerMessage::TransactionConfirmed(tx)) => assert_eq!(tx.status, TxStatus::Failed),
        other => panic!("expected confirmation, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_receipt_only_emits_first_record() {
    let node = MockNode::new()
        .with_block(block(100, 0, 1000, vec![]))
        .with_transaction(transaction(0x01, address(0xaa), None, Some(100)));
    let enricher = Enricher::new(Arc::new(node));
    let outbox = RecordingOutbox::default();

    enricher.enrich_pending(hash(0x01), &outbox).await.unwrap();

    let messages = outbox.taken();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind(), "newTransaction");
}
