use pairlink_client::NegotiationError;
use pairlink_core::{ErrorCode, IceCandidate, RoomId, SessionDescription, SignalMessage};

use crate::integration::{TestCoordinator, init_tracing};

#[tokio::test]
async fn test_answer_without_session() {
    init_tracing();

    let mut test = TestCoordinator::in_room("r1").await;

    let err = test
        .coordinator
        .handle_signal(SignalMessage::Answer {
            room_id: RoomId::from("r1"),
            sdp: SessionDescription::answer("v=0 stray"),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, NegotiationError::UnexpectedMessage("answer")));
    assert_eq!(err.code(), Some(ErrorCode::UnexpectedMessage));
    assert_eq!(test.coordinator.room_id(), Some(&RoomId::from("r1")));
    assert!(test.coordinator.session_state().is_none());
    assert_eq!(test.factory.created(), 0);
    assert_eq!(test.media.acquired(), 0);
    assert_eq!(test.media.released(), 0);
    assert!(test.sent().is_empty());
}

#[tokio::test]
async fn test_candidate_without_session() {
    init_tracing();

    let mut test = TestCoordinator::in_room("r1").await;

    let err = test
        .coordinator
        .handle_signal(SignalMessage::Candidate {
            room_id: RoomId::from("r1"),
            candidate: IceCandidate::new("candidate:stray"),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, NegotiationError::UnexpectedMessage("candidate")));
    assert_eq!(test.coordinator.room_id(), Some(&RoomId::from("r1")));
    assert!(test.coordinator.session_state().is_none());
    assert_eq!(test.factory.created(), 0);
    assert_eq!(test.media.acquired(), 0);
    assert_eq!(test.media.released(), 0);
    assert!(test.sent().is_empty());

    // The room is still usable.
    test.coordinator.start_call().await.unwrap();
    assert_eq!(test.factory.created(), 1);
}
