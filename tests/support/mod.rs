//! Shared fixtures for integration tests: a mock site with a login form,
//! listing pages, detail pages and media endpoints.

#![allow(dead_code)]

pub mod truncating_server;

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use hegre_core::{ProgressSink, SessionClient, SessionPreferences, TaskId};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "member";
pub const PASSWORD: &str = "secret";

pub const LOGIN_PAGE: &str = r#"<html><body><form>
    <input type="hidden" name="authenticity_token" value="tok-123">
    <input name="username"><input name="password" type="password">
    </form></body></html>"#;

/// Mounts the login form and a login endpoint that accepts any credentials.
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"status":"success","redirect":"/"}"#),
        )
        .mount(server)
        .await;
}

/// Session against the mock server, not yet logged in.
pub fn session(server: &MockServer) -> SessionClient {
    SessionClient::with_base_url(&server.uri(), &SessionPreferences::default())
        .expect("session should build")
}

/// Logged-in session against the mock server.
pub async fn logged_in_session(server: &MockServer) -> SessionClient {
    mount_login(server).await;
    let mut session = session(server);
    session
        .login(USERNAME, PASSWORD)
        .await
        .expect("login should succeed");
    session
}

/// Film detail page whose assets all live under `{base}/media/`.
pub fn film_page(base: &str, slug: &str, code: u64) -> String {
    format!(
        r#"<html><body>
        <div class="title"><span class="translated-text">Film {slug}</span></div>
        <div class="comments-wrapper" data-id="{code}"></div>
        <div class="format-details">HD 42:23 minutes</div>
        <div class="massage-copy">About {slug}.</div>
        <span class="date">January 1, 2024</span>
        <div class="video-player-wrapper" style="background-image: url('{base}/media/{slug}-cover.jpg?v=1')"></div>
        <a class="record-model" href="/models/jane" title="Jane">Jane</a>
        <div class="approved-tags"><a class="tag">outdoor</a></div>
        <div class="video-inner"><script>$(function() {{ new VideoPlayer($('#player'), {{"resolutions":[{{"sources":{{"default":[{{"mp4":"{base}/media/{slug}-2160p.mp4?v=1"}}]}},"type":2160}},{{"sources":{{"default":[{{"mp4":"{base}/media/{slug}-720p.mp4?v=1"}}]}},"type":720}}],"clip":{{"subtitles":[{{"src":"{base}/media/{slug}-en.vtt?v=1","label":"English"}},{{"src":"{base}/media/{slug}-de.vtt?v=1","label":"German"}}]}}}});</script></div>
        <div class="trailer"><a href="{base}/media/{slug}-trailer-480p.mp4"><strong>480p</strong></a></div>
        </body></html>"#
    )
}

/// Film listing page with `(slug, code)` items.
pub fn films_listing(items: &[(&str, u64)]) -> String {
    let items: String = items
        .iter()
        .map(|(slug, code)| {
            format!(r#"<div class="item" data-id="{code}"><a href="/films/{slug}">{slug}</a></div>"#)
        })
        .collect();
    format!(r#"<html><body><div id="films-listing">{items}</div></body></html>"#)
}

/// Listing page showing the end-of-results marker.
pub const LISTING_END: &str =
    r#"<html><body><div id="films-listing"><p class="hint">No results found</p></div></body></html>"#;

/// Mounts `/movies` page `page` with the given body.
pub async fn mount_movies_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/movies"))
        .and(query_param("films_page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts the detail page of a film.
pub async fn mount_film(server: &MockServer, slug: &str, code: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/films/{slug}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(film_page(
            &server.uri(),
            slug,
            code,
        )))
        .mount(server)
        .await;
}

/// Mounts a media file, expecting exactly `calls` requests.
pub async fn mount_media(server: &MockServer, name: &str, body: &[u8], calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/media/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(calls)
        .mount(server)
        .await;
}

/// One event received by [`RecordingProgress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Add(TaskId, String),
    SetTotal(TaskId, u64),
    Advance(TaskId, u64),
    Fail(TaskId),
    Finish(TaskId),
    Message(String),
}

/// Progress sink that records every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    next_id: AtomicU64,
    events: Mutex<Vec<Event>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressSink for RecordingProgress {
    fn add_task(&self, label: &str) -> TaskId {
        let task = TaskId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.push(Event::Add(task, label.to_string()));
        task
    }

    fn set_total(&self, task: TaskId, total: u64) {
        self.push(Event::SetTotal(task, total));
    }

    fn advance(&self, task: TaskId, delta: u64) {
        self.push(Event::Advance(task, delta));
    }

    fn fail_task(&self, task: TaskId) {
        self.push(Event::Fail(task));
    }

    fn finish_task(&self, task: TaskId) {
        self.push(Event::Finish(task));
    }

    fn message(&self, line: &str) {
        self.push(Event::Message(line.to_string()));
    }
}
