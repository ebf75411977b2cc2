use pairlink_core::{IceCandidate, RoomId, SignalMessage};

use crate::integration::{init_tracing, spawn_test_server};
use crate::utils::TestClient;

#[tokio::test]
async fn test_candidates_keep_order() {
    init_tracing();

    let addr = spawn_test_server().await;
    let room_id = RoomId::from("ordered");

    let mut a = TestClient::connect(addr).await.expect("connect a");
    let mut b = TestClient::connect(addr).await.expect("connect b");

    for client in [&mut a, &mut b] {
        client
            .send(&SignalMessage::Join {
                room_id: room_id.clone(),
            })
            .await
            .unwrap();
        assert!(matches!(
            client.recv().await.unwrap(),
            SignalMessage::Joined { .. }
        ));
    }

    let sent: Vec<IceCandidate> = (0..50)
        .map(|i| IceCandidate::new(format!("candidate:{} 1 udp 1 10.0.0.1 {} typ host", i, 40000 + i)))
        .collect();

    for candidate in &sent {
        a.send(&SignalMessage::Candidate {
            room_id: room_id.clone(),
            candidate: candidate.clone(),
        })
        .await
        .unwrap();
    }

    let mut received = Vec::new();
    while received.len() < sent.len() {
        match b.recv().await.expect("candidate lost") {
            SignalMessage::Candidate { candidate, .. } => received.push(candidate),
            other => panic!("unexpected {:?}", other),
        }
    }

    assert_eq!(received, sent);
    a.expect_silence().await.unwrap();
}
