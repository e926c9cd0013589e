//! Tests for the marketplace API adapter.

use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::domain::{EntryStatus, SessionStatus};

async fn api_for(server: &MockServer) -> HttpMarketplaceApi {
    let base = Url::parse(&format!("{}/api/v1/", server.uri())).expect("base url");
    HttpMarketplaceApi::new(base, Duration::from_secs(5)).expect("client builds")
}

fn intake() -> JoinIntake {
    JoinIntake {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        question: "Will it rain?".into(),
        photo: None,
        audio: None,
    }
}

#[rstest]
fn endpoint_appends_encoded_segments_to_base_path() {
    let base = Url::parse("https://market.example/api/v1/").expect("base url");
    let api = HttpMarketplaceApi::new(base, Duration::from_secs(1)).expect("client builds");

    let url = api.endpoint(&["payment-authorizations", "pi_1/secret", "confirm"]);

    assert_eq!(
        url.as_str(),
        "https://market.example/api/v1/payment-authorizations/pi_1%2Fsecret/confirm"
    );
}

#[rstest]
fn non_hierarchical_base_url_is_rejected() {
    let base = Url::parse("mailto:ops@market.example").expect("url parses");
    let err = HttpMarketplaceApi::new(base, Duration::from_secs(1)).expect_err("rejected");
    assert!(matches!(err, HttpMarketplaceApiError::BaseUrl { .. }));
}

#[rstest]
#[case::server_message(StatusCode::CONFLICT, br#"{"message":"Queue is full"}"#.as_slice(), "Queue is full")]
#[case::blank_message(StatusCode::CONFLICT, br#"{"message":"  "}"#.as_slice(), r#"status 409: {"message":" "}"#)]
#[case::html(StatusCode::BAD_GATEWAY, b"<html>\n  <b>bad</b>\n</html>".as_slice(), "status 502: <html> <b>bad</b> </html>")]
#[case::empty(StatusCode::SERVICE_UNAVAILABLE, b"".as_slice(), "status 503")]
fn error_message_prefers_server_text(
    #[case] status: StatusCode,
    #[case] body: &[u8],
    #[case] expected: &str,
) {
    assert_eq!(error_message(status, body), expected);
}

#[rstest]
fn long_bodies_are_truncated() {
    let body = "x".repeat(400);
    let message = error_message(StatusCode::INTERNAL_SERVER_ERROR, body.as_bytes());
    assert!(message.ends_with("..."));
    assert!(message.len() < 200);
}

#[rstest]
#[case::client(StatusCode::UNPROCESSABLE_ENTITY, true)]
#[case::server(StatusCode::INTERNAL_SERVER_ERROR, false)]
fn membership_statuses_split_rejection_from_transport(
    #[case] status: StatusCode,
    #[case] rejected: bool,
) {
    let err = map_membership_status(status, br#"{"message":"nope"}"#);
    assert_eq!(
        matches!(err, QueueMembershipError::Rejected { .. }),
        rejected
    );
}

#[rstest]
#[tokio::test]
async fn fetches_session_by_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/live-sessions/by-code/TAROT-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s1",
            "vendorId": "v1",
            "status": "LIVE",
            "price": { "amount": 2500, "currency": "AUD" },
            "queueCount": 3
        })))
        .mount(&server)
        .await;
    let api = api_for(&server).await;

    let session = api
        .fetch_session_by_code(&SessionCode::new("TAROT-42").expect("code"))
        .await
        .expect("fetch succeeds")
        .expect("session exists");

    assert_eq!(session.id.as_str(), "s1");
    assert_eq!(session.status, SessionStatus::Live);
    assert_eq!(session.queue_count, 3);
}

#[rstest]
#[tokio::test]
async fn unknown_code_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let api = api_for(&server).await;

    let session = api
        .fetch_session_by_code(&SessionCode::new("nope").expect("code"))
        .await
        .expect("404 is not an error");

    assert!(session.is_none());
}

#[rstest]
#[tokio::test]
async fn malformed_session_payload_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    let api = api_for(&server).await;

    let err = api
        .fetch_session_by_code(&SessionCode::new("abc").expect("code"))
        .await
        .expect_err("decode fails");

    assert!(matches!(err, SessionDirectoryError::Decode { .. }));
}

#[rstest]
#[tokio::test]
async fn join_posts_intake_and_returns_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/live-sessions/s1/entries"))
        .and(body_json(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "question": "Will it rain?"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "entryId": "e1",
            "sessionId": "s1",
            "status": "WAITING",
            "position": 2,
            "amount": { "amount": 2500, "currency": "AUD" },
            "authorizationHandle": "h1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let api = api_for(&server).await;

    let entry = api
        .join_queue(&SessionId::new("s1").expect("session id"), &intake())
        .await
        .expect("join succeeds");

    assert_eq!(entry.id.as_str(), "e1");
    assert_eq!(entry.status, EntryStatus::Waiting);
    assert_eq!(entry.question, "Will it rain?");
    assert_eq!(entry.authorization_handle.expose(), "h1");
}

#[rstest]
#[tokio::test]
async fn join_rejection_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "Queue is full" })),
        )
        .mount(&server)
        .await;
    let api = api_for(&server).await;

    let err = api
        .join_queue(&SessionId::new("s1").expect("session id"), &intake())
        .await
        .expect_err("join rejected");

    assert_eq!(err, QueueMembershipError::rejected("Queue is full"));
}

#[rstest]
#[tokio::test]
async fn leave_tolerates_missing_entry() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/live-sessions/s1/entries/e1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    let api = api_for(&server).await;

    api.leave_queue(
        &EntryId::new("e1").expect("entry id"),
        &SessionId::new("s1").expect("session id"),
    )
    .await
    .expect("already gone counts as left");
}

#[rstest]
#[tokio::test]
async fn polls_position_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/live-sessions/s1/entries/e1/position"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entryId": "e1",
            "entryStatus": "IN_PROGRESS",
            "position": 0,
            "totalWaiting": 0,
            "sessionStatus": "LIVE"
        })))
        .mount(&server)
        .await;
    let api = api_for(&server).await;

    let snapshot = api
        .fetch_position(
            &EntryId::new("e1").expect("entry id"),
            &SessionId::new("s1").expect("session id"),
        )
        .await
        .expect("poll succeeds");

    assert_eq!(snapshot.entry_status, EntryStatus::InProgress);
    assert_eq!(snapshot.session_status, SessionStatus::Live);
}

#[rstest]
#[case::declined(402, true)]
#[case::provider_down(503, false)]
#[tokio::test]
async fn confirm_maps_provider_failures(#[case] status: u16, #[case] declined: bool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/payment-authorizations/h1/confirm"))
        .and(body_json(json!({ "amount": { "amount": 2500, "currency": "AUD" } })))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({ "message": "card declined" })),
        )
        .mount(&server)
        .await;
    let api = api_for(&server).await;

    let err = api
        .confirm(&AuthorizationHandle::new("h1"), &Money::new(2500, "AUD"))
        .await
        .expect_err("confirmation fails");

    assert_eq!(
        matches!(err, PaymentAuthorizationError::Declined { .. }),
        declined
    );
    assert!(err.to_string().contains("card declined"));
}

#[rstest]
#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let server = MockServer::start().await;
    let api = api_for(&server).await;
    drop(server);

    let err = api
        .fetch_position(
            &EntryId::new("e1").expect("entry id"),
            &SessionId::new("s1").expect("session id"),
        )
        .await
        .expect_err("server is gone");

    assert!(matches!(err, PositionFeedError::Transport { .. }));
}
