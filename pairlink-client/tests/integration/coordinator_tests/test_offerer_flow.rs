use pairlink_client::{NegotiationState, TransportEvent};
use pairlink_core::{IceCandidate, RoomId, SdpType, SessionDescription, SignalMessage};

use crate::integration::{TestCoordinator, init_tracing};
use crate::utils::TransportCall;

#[tokio::test]
async fn test_offerer_flow() {
    init_tracing();

    let room_id = RoomId::from("r1");
    let mut test = TestCoordinator::in_room("r1").await;

    test.coordinator.start_call().await.unwrap();

    assert_eq!(
        test.sent(),
        vec![SignalMessage::Offer {
            room_id: room_id.clone(),
            sdp: SessionDescription::offer("v=0 mock-offer"),
        }]
    );
    assert_eq!(
        test.coordinator.session_state(),
        Some(NegotiationState::HaveLocalOffer)
    );
    assert_eq!(test.media.acquired(), 1);

    // Local candidates are trickled to the room.
    let session_id = test.factory.sink(0).session_id();
    test.coordinator
        .handle_transport_event(TransportEvent::CandidateDiscovered(
            session_id,
            IceCandidate::new("candidate:local"),
        ))
        .await;
    assert_eq!(
        test.sent(),
        vec![SignalMessage::Candidate {
            room_id: room_id.clone(),
            candidate: IceCandidate::new("candidate:local"),
        }]
    );

    // Remote candidate before the answer waits for it.
    test.coordinator
        .handle_signal(SignalMessage::Candidate {
            room_id: room_id.clone(),
            candidate: IceCandidate::new("candidate:remote"),
        })
        .await
        .unwrap();
    assert!(test.factory.log(0).candidates().is_empty());

    test.coordinator
        .handle_signal(SignalMessage::Answer {
            room_id: room_id.clone(),
            sdp: SessionDescription::answer("v=0 remote-answer"),
        })
        .await
        .unwrap();

    assert_eq!(
        test.coordinator.session_state(),
        Some(NegotiationState::Connected)
    );

    let log = test.factory.log(0);
    assert_eq!(
        log.calls(),
        vec![
            TransportCall::AddTracks(1),
            TransportCall::CreateOffer,
            TransportCall::SetLocal(SdpType::Offer),
            TransportCall::SetRemote(SdpType::Answer),
            TransportCall::AddCandidate("candidate:remote".to_owned()),
        ]
    );

    // A second answer is out of place.
    assert!(
        test.coordinator
            .handle_signal(SignalMessage::Answer {
                room_id,
                sdp: SessionDescription::answer("again"),
            })
            .await
            .is_err()
    );
}
