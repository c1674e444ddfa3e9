//! Integration tests for the session client against a mock site.

mod support;

use hegre_core::{SessionError, SessionPreferences, SessionClient};
use wiremock::matchers::{body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_success_posts_token_and_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(support::LOGIN_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .and(body_string_contains("authenticity_token=tok-123"))
        .and(body_string_contains("username=member"))
        .and(body_string_contains("password=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"success"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = support::session(&server);
    assert!(!session.is_authenticated());

    session
        .login(support::USERNAME, support::PASSWORD)
        .await
        .expect("login should succeed");
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_login_fails_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><form></form></html>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = support::session(&server);
    let err = session.login("u", "p").await.unwrap_err();
    assert!(matches!(err, SessionError::Auth { .. }), "got {err:?}");
    assert!(err.to_string().contains("authenticity_token"));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_login_fails_on_rejected_status_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(support::LOGIN_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"status":"error","message":"Invalid credentials"}"#),
        )
        .mount(&server)
        .await;

    let mut session = support::session(&server);
    let err = session.login("u", "wrong").await.unwrap_err();
    assert!(matches!(err, SessionError::Auth { .. }), "got {err:?}");
    assert!(err.to_string().contains("Invalid credentials"));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_login_fails_on_non_200_reply() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(support::LOGIN_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(403).set_body_string(r#"{"status":"success"}"#))
        .mount(&server)
        .await;

    let mut session = support::session(&server);
    let err = session.login("u", "p").await.unwrap_err();
    assert!(matches!(err, SessionError::Auth { .. }), "got {err:?}");
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_get_stream_requires_login_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/media/file.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let session = support::session(&server);
    let err = session
        .get_stream(&format!("{}/media/file.mp4", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::NotAuthenticated));
}

#[tokio::test]
async fn test_get_stream_yields_whole_body_in_bounded_chunks() {
    let server = MockServer::start().await;
    let body: Vec<u8> = (0..100_000_u32).map(|i| (i % 251) as u8).collect();
    Mock::given(method("GET"))
        .and(path("/media/big.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let session = support::logged_in_session(&server).await;
    let mut stream = session
        .get_stream(&format!("{}/media/big.bin", server.uri()))
        .await
        .expect("stream should open");
    assert_eq!(stream.content_length(), Some(body.len() as u64));

    let mut received = Vec::new();
    while let Some(chunk) = stream.next_chunk().await.expect("chunk") {
        assert!(chunk.len() <= hegre_core::session::CHUNK_SIZE);
        received.extend_from_slice(&chunk);
    }
    assert_eq!(received, body);
}

#[tokio::test]
async fn test_get_reports_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/films/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let session = support::session(&server);
    let err = session
        .get_text(&format!("{}/films/missing", server.uri()))
        .await
        .unwrap_err();
    assert!(
        matches!(err, SessionError::HttpStatus { status: 404, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_preference_cookies_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .and(header_regex("cookie", "locale=de"))
        .and(header_regex("cookie", "country=DE"))
        .and(header_regex("cookie", "_width=3840"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let preferences = SessionPreferences {
        locale: "de".to_string(),
        country: "DE".to_string(),
        ..SessionPreferences::default()
    };
    let session = SessionClient::with_base_url(&server.uri(), &preferences).unwrap();
    let body = session
        .get_text(&format!("{}/movies", server.uri()))
        .await
        .expect("cookies should match");
    assert_eq!(body, "ok");
}
