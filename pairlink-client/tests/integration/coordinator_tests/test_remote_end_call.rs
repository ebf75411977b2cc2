use pairlink_client::{CallEvent, NegotiationError};
use pairlink_core::{RoomId, SessionDescription, SignalMessage};

use crate::integration::{TestCoordinator, init_tracing};

#[tokio::test]
async fn test_remote_end_call() {
    init_tracing();

    let room_id = RoomId::from("r1");
    let mut test = TestCoordinator::in_room("r1").await;

    test.coordinator
        .handle_signal(SignalMessage::Offer {
            room_id: room_id.clone(),
            sdp: SessionDescription::offer("v=0 remote-offer"),
        })
        .await
        .unwrap();
    test.sent();

    test.coordinator
        .handle_signal(SignalMessage::EndCall {
            room_id: room_id.clone(),
        })
        .await
        .unwrap();

    assert!(test.coordinator.room_id().is_none());
    assert_eq!(test.media.released(), 1);
    assert_eq!(
        test.sent(),
        vec![SignalMessage::Leave {
            room_id: room_id.clone()
        }]
    );
    assert_eq!(
        test.emitted(),
        vec![CallEvent::CallEnded { by_remote: true }]
    );

    // Late traffic for the old room is refused.
    let err = test
        .coordinator
        .handle_signal(SignalMessage::Answer {
            room_id,
            sdp: SessionDescription::answer("late"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, NegotiationError::UnexpectedMessage(_)));
    assert_eq!(test.media.released(), 1);
}
