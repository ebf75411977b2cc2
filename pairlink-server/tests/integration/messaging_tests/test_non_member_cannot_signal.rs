use pairlink_core::{ErrorCode, IceCandidate, PeerId, RoomId, SessionDescription, SignalMessage};
use pairlink_server::RelayError;

use crate::integration::{create_test_relay, init_tracing, join};

#[tokio::test]
async fn test_non_member_cannot_signal() {
    init_tracing();

    let (relay, signaling, _rx) = create_test_relay();
    let (a, b, outsider) = (PeerId::new(), PeerId::new(), PeerId::new());
    let room_id = RoomId::from("r1");

    join(&relay, a, "r1").await;
    join(&relay, b, "r1").await;

    let attempts = vec![
        SignalMessage::Offer {
            room_id: room_id.clone(),
            sdp: SessionDescription::offer("intruder"),
        },
        SignalMessage::Answer {
            room_id: room_id.clone(),
            sdp: SessionDescription::answer("intruder"),
        },
        SignalMessage::Candidate {
            room_id: room_id.clone(),
            candidate: IceCandidate::new("candidate:0"),
        },
        SignalMessage::EndCall {
            room_id: room_id.clone(),
        },
        SignalMessage::Leave {
            room_id: room_id.clone(),
        },
    ];

    for msg in attempts {
        let result = relay.handle(outsider, msg).await;
        assert!(matches!(result, Err(RelayError::NotAMember { .. })));
    }

    assert_eq!(
        signaling.errors_for(&outsider).await,
        vec![ErrorCode::NotAMember; 5]
    );
    assert!(signaling.relayed_to(&a).await.is_empty());
    assert!(signaling.relayed_to(&b).await.is_empty());
    assert_eq!(relay.registry().members(&room_id), vec![a, b]);
}

#[tokio::test]
async fn test_member_of_other_room_cannot_signal() {
    init_tracing();

    let (relay, signaling, _rx) = create_test_relay();
    let (a, b) = (PeerId::new(), PeerId::new());

    join(&relay, a, "r1").await;
    join(&relay, b, "r2").await;

    let result = relay
        .handle(
            b,
            SignalMessage::Candidate {
                room_id: RoomId::from("r1"),
                candidate: IceCandidate::new("candidate:0"),
            },
        )
        .await;

    assert!(result.is_err());
    assert!(signaling.relayed_to(&a).await.is_empty());
}
