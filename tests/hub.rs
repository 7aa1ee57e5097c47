mod common;

use common::block;
use etherlens::models::ServerMessage;
use etherlens::pipeline::Outbox;
use etherlens::websocket::Hub;

#[test]
fn disconnect_is_idempotent() {
    let hub = Hub::new(16);
    let mut session = hub.connect();
    let id = session.id();
    assert_eq!(hub.session_count(), 1);
    assert_eq!(hub.handle_counts(), (1, 1));

    session.close();
    session.close();
    assert!(!hub.disconnect(&id));
    assert_eq!(hub.session_count(), 0);
    assert_eq!(hub.handle_counts(), (0, 0));

    drop(session);
    assert_eq!(hub.session_count(), 0);
}

#[test]
fn dropping_a_session_releases_its_handles() {
    let hub = Hub::new(16);
    let first = hub.connect();
    let second = hub.connect();
    assert_eq!(hub.handle_counts(), (2, 2));

    drop(first);
    assert_eq!(hub.session_count(), 1);
    assert_eq!(hub.handle_counts(), (1, 1));
    drop(second);
    assert_eq!(hub.handle_counts(), (0, 0));
}

#[test]
fn every_session_receives_every_frame() {
    let hub = Hub::new(16);
    let mut first = hub.connect();
    let mut second = hub.connect();

    hub.publish(ServerMessage::NewBlock(block(1, 0, 1000, vec![])));
    hub.publish(ServerMessage::NewBlock(block(2, 0, 1000, vec![])));

    for session in [&mut first, &mut second] {
        let numbers: Vec<u64> = session
            .drain()
            .iter()
            .map(|frame| match frame.as_ref() {
                ServerMessage::NewBlock(b) => b.number,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }
}

#[test]
fn slow_session_loses_oldest_frames() {
    let hub = Hub::new(2);
    let mut session = hub.connect();

    for number in 1..=5 {
        hub.publish(ServerMessage::NewBlock(block(number, 0, 1000, vec![])));
    }

    let numbers: Vec<u64> = session
        .drain()
        .iter()
        .filter_map(|frame| match frame.as_ref() {
            ServerMessage::NewBlock(b) => Some(b.number),
            _ => None,
        })
        .collect();
    assert_eq!(numbers, vec![4, 5]);
    assert!(session.is_open());
}

#[test]
fn closed_session_drains_nothing() {
    let hub = Hub::new(16);
    let mut session = hub.connect();
    session.close();

    hub.publish(ServerMessage::NewBlock(block(1, 0, 1000, vec![])));
    assert!(session.drain().is_empty());
    assert!(!session.is_open());
}

#[test]
fn publishing_without_viewers_is_harmless() {
    let hub = Hub::new(4);
    hub.publish(ServerMessage::NewBlock(block(1, 0, 1000, vec![])));

    let mut late = hub.connect();
    assert!(late.drain().is_empty());
}

#[test]
fn buffer_depth_rounds_up_to_power_of_two() {
    let hub = Hub::new(3);
    let mut session = hub.connect();

    for number in 1..=6 {
        hub.publish(ServerMessage::NewBlock(block(number, 0, 1000, vec![])));
    }

    let numbers: Vec<u64> = session
        .drain()
        .iter()
        .filter_map(|frame| match frame.as_ref() {
            ServerMessage::NewBlock(b) => Some(b.number),
            _ => None,
        })
        .collect();
    assert_eq!(numbers, vec![3, 4, 5, 6]);
}
