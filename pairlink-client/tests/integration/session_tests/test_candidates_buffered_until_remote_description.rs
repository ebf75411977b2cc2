use pairlink_client::NegotiationState;
use pairlink_core::{IceCandidate, SdpType, SessionDescription};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::TransportCall;

#[tokio::test]
async fn test_candidates_buffered_until_remote_description() {
    init_tracing();

    let (mut session, log, _media) = create_test_session().await;

    session
        .add_remote_candidate(IceCandidate::new("candidate:1"))
        .await
        .unwrap();
    session
        .add_remote_candidate(IceCandidate::new("candidate:2"))
        .await
        .unwrap();

    assert_eq!(session.pending_candidates(), 2);
    assert!(log.candidates().is_empty());

    session
        .apply_remote_offer(SessionDescription::offer("remote"))
        .await
        .unwrap();

    assert_eq!(session.state(), NegotiationState::HaveRemoteOffer);
    assert_eq!(session.pending_candidates(), 0);
    assert_eq!(
        log.calls(),
        vec![
            TransportCall::AddTracks(1),
            TransportCall::SetRemote(SdpType::Offer),
            TransportCall::AddCandidate("candidate:1".to_owned()),
            TransportCall::AddCandidate("candidate:2".to_owned()),
        ]
    );

    // Once the description is in place candidates go straight through.
    session
        .add_remote_candidate(IceCandidate::new("candidate:3"))
        .await
        .unwrap();
    assert_eq!(session.pending_candidates(), 0);
    assert_eq!(
        log.candidates(),
        vec!["candidate:1", "candidate:2", "candidate:3"]
    );
}
