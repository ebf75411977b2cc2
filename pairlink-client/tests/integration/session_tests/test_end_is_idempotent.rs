use pairlink_client::{NegotiationError, NegotiationState};
use pairlink_core::{IceCandidate, SessionDescription};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::TransportCall;

#[tokio::test]
async fn test_end_is_idempotent() {
    init_tracing();

    let (mut session, log, media) = create_test_session().await;

    session
        .add_remote_candidate(IceCandidate::new("candidate:early"))
        .await
        .unwrap();
    session.create_offer().await.unwrap();

    session.end().await;
    assert_eq!(session.state(), NegotiationState::Ended);
    assert_eq!(session.pending_candidates(), 0);

    session.end().await;
    assert!(session.is_ended());

    assert_eq!(media.released(), 1);
    assert_eq!(log.count(&TransportCall::Close), 1);

    // Nothing moves an ended session.
    assert!(matches!(
        session
            .apply_remote_answer(SessionDescription::answer("late"))
            .await,
        Err(NegotiationError::InvalidState {
            state: NegotiationState::Ended,
            ..
        })
    ));
    assert!(matches!(
        session
            .add_remote_candidate(IceCandidate::new("candidate:late"))
            .await,
        Err(NegotiationError::InvalidState { .. })
    ));
    assert!(log.candidates().is_empty());
}
