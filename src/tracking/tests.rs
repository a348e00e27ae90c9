use super::LocationFanout;
use crate::broker::{LoadId, TopicKind, UserId};
use crate::hub::Hub;
use crate::transport::message::ServerMessage;
use crate::utils::LoadcastError;
use serde_json::{Value, json};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tungstenite::protocol::Message as WsMessage;

fn connect(hub: &Hub) -> (String, UnboundedReceiver<WsMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (hub.connect(tx).unwrap(), rx)
}

fn track(hub: &Hub, id: &str, load: &str) {
    assert!(hub.join(id, LoadId::parse(load).unwrap().topic()));
}

/// (loadId, payload) of every locationUpdated frame waiting on `rx`.
fn updates(rx: &mut UnboundedReceiver<WsMessage>) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        match serde_json::from_str::<ServerMessage>(frame.to_text().unwrap()).unwrap() {
            ServerMessage::LocationUpdated {
                load_id, payload, ..
            } => out.push((load_id, payload)),
            other => panic!("Expected locationUpdated, got {other:?}"),
        }
    }
    out
}

#[test]
fn test_report_reaches_exactly_the_trackers() {
    let hub = Hub::default();
    let fanout = LocationFanout::new(hub.clone());
    let (c1, mut rx1) = connect(&hub);
    let (c2, mut rx2) = connect(&hub);
    let (_c3, mut rx3) = connect(&hub);
    track(&hub, &c1, "L7");
    track(&hub, &c2, "L7");

    let payload = json!({"lat": 9.5, "lng": -3.25, "ts": 1700000000});
    let delivery = fanout.report_location("L7", payload.clone()).unwrap();

    assert_eq!(delivery.delivered, 2);
    assert_eq!(updates(&mut rx1), vec![("L7".to_string(), payload.clone())]);
    assert_eq!(updates(&mut rx2), vec![("L7".to_string(), payload)]);
    assert!(updates(&mut rx3).is_empty());
}

#[test]
fn test_end_to_end_leave_scenario() {
    let hub = Hub::default();
    let fanout = LocationFanout::new(hub.clone());
    let (a, mut rx_a) = connect(&hub);
    let (b, mut rx_b) = connect(&hub);
    let (_c, mut rx_c) = connect(&hub);
    track(&hub, &a, "L1");
    track(&hub, &b, "L1");

    fanout.report_location("L1", json!({"lat": 1, "lng": 2})).unwrap();
    assert_eq!(
        updates(&mut rx_a),
        vec![("L1".to_string(), json!({"lat": 1, "lng": 2}))]
    );
    assert_eq!(
        updates(&mut rx_b),
        vec![("L1".to_string(), json!({"lat": 1, "lng": 2}))]
    );
    assert!(updates(&mut rx_c).is_empty());

    assert!(hub.leave(&b, &LoadId::parse("L1").unwrap().topic()));
    fanout.report_location("L1", json!({"lat": 3, "lng": 4})).unwrap();
    assert_eq!(
        updates(&mut rx_a),
        vec![("L1".to_string(), json!({"lat": 3, "lng": 4}))]
    );
    assert!(updates(&mut rx_b).is_empty());
    assert!(updates(&mut rx_c).is_empty());
}

#[test]
fn test_invalid_load_id_is_rejected() {
    let hub = Hub::default();
    let fanout = LocationFanout::new(hub.clone());

    for bad in ["", "  ", "L1 "] {
        match fanout.report_location(bad, json!({})) {
            Err(LoadcastError::InvalidTopicIdentifier { kind }) => {
                assert_eq!(kind, TopicKind::LoadTracking)
            }
            other => panic!("Expected invalid identifier for {bad:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_untracked_load_is_dropped() {
    let hub = Hub::default();
    let fanout = LocationFanout::new(hub.clone());
    let (_id, mut rx) = connect(&hub);

    let delivery = fanout.report_location("L404", json!({"lat": 0})).unwrap();
    assert_eq!(delivery.delivered, 0);
    assert_eq!(delivery.failed, 0);
    assert!(updates(&mut rx).is_empty());
    assert_eq!(hub.stats().topics, 0);
}

#[test]
fn test_user_inbox_with_same_id_gets_no_location() {
    let hub = Hub::default();
    let fanout = LocationFanout::new(hub.clone());
    let (inbox, mut rx_inbox) = connect(&hub);
    let (tracker, mut rx_tracker) = connect(&hub);
    hub.join(&inbox, UserId::parse("42").unwrap().into());
    track(&hub, &tracker, "42");

    fanout.report_location("42", json!({"lat": 5})).unwrap();
    assert!(rx_inbox.try_recv().is_err());
    assert_eq!(updates(&mut rx_tracker).len(), 1);
}

#[test]
fn test_updates_arrive_in_publish_order() {
    let hub = Hub::default();
    let fanout = LocationFanout::new(hub.clone());
    let (a, mut rx_a) = connect(&hub);
    let (b, mut rx_b) = connect(&hub);
    track(&hub, &a, "L1");
    track(&hub, &b, "L1");

    fanout.report_location("L1", json!({"seq": 1})).unwrap();
    fanout.report_location("L1", json!({"seq": 2})).unwrap();

    let expected = vec![
        ("L1".to_string(), json!({"seq": 1})),
        ("L1".to_string(), json!({"seq": 2})),
    ];
    assert_eq!(updates(&mut rx_a), expected);
    assert_eq!(updates(&mut rx_b), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_disconnect_during_publish_is_safe() {
    let hub = Hub::new(10_000);
    let fanout = LocationFanout::new(hub.clone());
    let (stayer, mut rx_stayer) = connect(&hub);
    track(&hub, &stayer, "L1");

    let publisher = {
        let fanout = fanout.clone();
        tokio::spawn(async move {
            for seq in 0..200 {
                fanout.report_location("L1", json!({ "seq": seq })).unwrap();
                tokio::task::yield_now().await;
            }
        })
    };
    let churn = {
        let hub = hub.clone();
        tokio::spawn(async move {
            for _ in 0..100 {
                let (id, rx) = connect(&hub);
                track(&hub, &id, "L1");
                tokio::task::yield_now().await;
                drop(rx);
                hub.disconnect(&id);
            }
        })
    };
    publisher.await.unwrap();
    churn.await.unwrap();

    let seqs: Vec<i64> = updates(&mut rx_stayer)
        .into_iter()
        .map(|(_, payload)| payload["seq"].as_i64().unwrap())
        .collect();
    assert_eq!(seqs, (0..200).collect::<Vec<_>>());
    assert_eq!(hub.connections_of(&LoadId::parse("L1").unwrap().topic()), vec![stayer]);
}
