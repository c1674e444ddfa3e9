//! Authenticated HTTP session against the site.
//!
//! [`SessionClient`] owns the cookie jar, performs the form login and exposes
//! the GET primitives everything else is built on. Preference cookies (locale,
//! country, player width) are set at construction so listing and detail pages
//! render the same markup whether or not the session is logged in.
//!
//! Login takes `&mut self`. Callers log in first and share the client behind
//! an `Arc` afterwards, so the login is complete before any download starts.

mod error;
mod stream;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use scraper::Html;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

pub use error::SessionError;
pub use stream::{CHUNK_SIZE, StreamHandle};

use crate::selectors::AUTHENTICITY_TOKEN;
use crate::user_agent;

/// Site root used when no other base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://www.hegre.com/";

/// HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Maximum idle time between body reads (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

const LOGIN_PATH: &str = "login";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Preference cookies sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPreferences {
    pub locale: String,
    pub country: String,
    /// Screen width advertised to the site; controls which player sources are listed.
    pub width: u32,
}

impl Default for SessionPreferences {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            country: "US".to_string(),
            width: 3840,
        }
    }
}

/// Fetches HTML pages by URL.
///
/// Implemented by [`SessionClient`]; the crawler and orchestrator depend on
/// this seam so page fetching can be replaced in tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches `url` and returns the response body as text.
    async fn fetch_page(&self, url: &str) -> Result<String, SessionError>;
}

#[derive(Debug, Deserialize)]
struct LoginReply {
    status: Option<String>,
}

/// Cookie-holding HTTP session.
#[derive(Debug)]
pub struct SessionClient {
    client: Client,
    base_url: Url,
    authenticated: bool,
}

impl SessionClient {
    /// Creates a session against the public site.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Network`] if the HTTP client cannot be built.
    pub fn new(preferences: &SessionPreferences) -> Result<Self, SessionError> {
        Self::with_base_url(DEFAULT_BASE_URL, preferences)
    }

    /// Creates a session against another host, e.g. a local mock server.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidUrl`] for an unparsable base URL and
    /// [`SessionError::Network`] if the HTTP client cannot be built.
    pub fn with_base_url(
        base_url: &str,
        preferences: &SessionPreferences,
    ) -> Result<Self, SessionError> {
        let mut base_url =
            Url::parse(base_url).map_err(|_| SessionError::invalid_url(base_url))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let jar = Arc::new(Jar::default());
        for cookie in [
            format!("locale={}", preferences.locale),
            format!("country={}", preferences.country),
            format!("_width={}", preferences.width),
        ] {
            jar.add_cookie_str(&cookie, &base_url);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .read_timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .cookie_provider(jar)
            .build()
            .map_err(|e| SessionError::transport(base_url.as_str(), e))?;

        debug!(base_url = %base_url, "session created");
        Ok(Self {
            client,
            base_url,
            authenticated: false,
        })
    }

    /// The site root all relative links are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether [`login`](Self::login) has succeeded on this session.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Resolves `href` against the site root.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidUrl`] if the result is not a valid URL.
    pub fn absolutize(&self, href: &str) -> Result<Url, SessionError> {
        self.base_url
            .join(href)
            .map_err(|_| SessionError::invalid_url(href))
    }

    /// Logs in with the site's login form.
    ///
    /// Fetches the login page for its anti-forgery token, posts the
    /// credentials and requires an HTTP 200 reply whose JSON `status` is
    /// `"success"`. The session cookie set by the reply is kept in the jar.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Auth`] when the token is missing or the login
    /// is rejected, and transport errors when the site cannot be reached.
    #[instrument(skip(self, password), fields(base_url = %self.base_url))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        let login_url = self.absolutize(LOGIN_PATH)?;
        let page = self.get_text(login_url.as_str()).await?;
        let token = find_authenticity_token(&page).ok_or_else(|| {
            SessionError::auth("could not extract authenticity_token from login page")
        })?;

        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("authenticity_token", &token)
            .append_pair("username", username)
            .append_pair("password", password)
            .finish();

        let response = self
            .client
            .post(login_url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header("X-Requested-With", "XMLHttpRequest")
            .body(body)
            .send()
            .await
            .map_err(|e| SessionError::transport(login_url.as_str(), e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SessionError::transport(login_url.as_str(), e))?;

        if status != StatusCode::OK {
            return Err(SessionError::auth(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text.trim()
            )));
        }

        let accepted = serde_json::from_str::<LoginReply>(&text)
            .ok()
            .and_then(|reply| reply.status)
            .is_some_and(|status| status == "success");
        if !accepted {
            return Err(SessionError::auth(format!("HTTP 200: {}", text.trim())));
        }

        self.authenticated = true;
        info!("logged in");
        Ok(())
    }

    /// Sends a GET with the session cookies.
    ///
    /// Does not require a login; listing and detail pages are public.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::HttpStatus`] for non-success statuses and
    /// transport errors otherwise.
    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, url: &str) -> Result<Response, SessionError> {
        let parsed = Url::parse(url).map_err(|_| SessionError::invalid_url(url))?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| SessionError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }

    /// Sends a GET and returns the body as text.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get), plus transport errors while reading the body.
    pub async fn get_text(&self, url: &str) -> Result<String, SessionError> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| SessionError::transport(url, e))
    }

    /// Opens a streamed GET for a members-only asset.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] without sending anything when
    /// the session has not logged in, otherwise the errors of [`get`](Self::get).
    #[instrument(level = "debug", skip(self))]
    pub async fn get_stream(&self, url: &str) -> Result<StreamHandle, SessionError> {
        if !self.authenticated {
            return Err(SessionError::NotAuthenticated);
        }
        let response = self.get(url).await?;
        Ok(StreamHandle::new(url, response))
    }
}

#[async_trait]
impl PageSource for SessionClient {
    async fn fetch_page(&self, url: &str) -> Result<String, SessionError> {
        self.get_text(url).await
    }
}

fn find_authenticity_token(page: &str) -> Option<String> {
    let document = Html::parse_document(page);
    document
        .select(&AUTHENTICITY_TOKEN)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(ToString::to_string)
}
