use pairlink_core::{PeerId, RoomId, SignalMessage};

use crate::integration::{create_test_relay, init_tracing, join};

#[tokio::test]
async fn test_join_acknowledged_to_sender_only() {
    init_tracing();

    let (relay, signaling, _rx) = create_test_relay();
    let (a, b) = (PeerId::new(), PeerId::new());

    join(&relay, a, "r1").await;
    join(&relay, b, "r1").await;

    let joined = SignalMessage::Joined {
        room_id: RoomId::from("r1"),
    };
    assert_eq!(signaling.messages_for(&a).await, vec![joined.clone()]);
    assert_eq!(signaling.messages_for(&b).await, vec![joined]);
}

#[tokio::test]
async fn test_switching_rooms_ends_call_in_old_room() {
    init_tracing();

    let (relay, signaling, _rx) = create_test_relay();
    let (a, b) = (PeerId::new(), PeerId::new());

    join(&relay, a, "r1").await;
    join(&relay, b, "r1").await;
    join(&relay, a, "r2").await;

    assert_eq!(
        signaling.relayed_to(&b).await,
        vec![SignalMessage::EndCall {
            room_id: RoomId::from("r1")
        }]
    );
    assert_eq!(relay.registry().room_of(&a), Some(RoomId::from("r2")));
    assert_eq!(relay.registry().members(&RoomId::from("r1")), vec![b]);
}
