use pairlink_client::{NegotiationState, TransportEvent};
use pairlink_core::{IceCandidate, RoomId, SessionDescription, SignalMessage};

use crate::integration::{TestCoordinator, init_tracing};

#[tokio::test]
async fn test_stale_session_events_ignored() {
    init_tracing();

    let room_id = RoomId::from("r1");
    let mut test = TestCoordinator::in_room("r1").await;

    for sdp in ["v=0 first", "v=0 renegotiated"] {
        test.coordinator
            .handle_signal(SignalMessage::Offer {
                room_id: room_id.clone(),
                sdp: SessionDescription::offer(sdp),
            })
            .await
            .unwrap();
    }
    test.sent();

    assert_eq!(test.factory.created(), 2);
    assert_eq!(test.media.released(), 1);

    let stale = test.factory.sink(0).session_id();
    let current = test.factory.sink(1).session_id();
    assert_ne!(stale, current);
    assert_eq!(test.coordinator.session_id(), Some(current));

    test.coordinator
        .handle_transport_event(TransportEvent::CandidateDiscovered(
            stale,
            IceCandidate::new("candidate:stale"),
        ))
        .await;
    test.coordinator
        .handle_transport_event(TransportEvent::Failed(stale))
        .await;

    assert!(test.sent().is_empty());
    assert!(test.emitted().is_empty());
    assert_eq!(
        test.coordinator.session_state(),
        Some(NegotiationState::HaveLocalAnswer)
    );

    test.coordinator
        .handle_transport_event(TransportEvent::Failed(current))
        .await;
    assert_eq!(
        test.coordinator.session_state(),
        Some(NegotiationState::Ended)
    );
    assert_eq!(test.media.released(), 2);
}
