// API client module: talks to the private Hide My Email endpoints using a
// browser session cookie. Requests go through a scoped `Session` that owns
// the HTTP connection pool and the header set built from the credentials.

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, ACCEPT, ACCEPT_LANGUAGE,
    CACHE_CONTROL, CONNECTION, CONTENT_TYPE, COOKIE, ORIGIN, PRAGMA, REFERER, USER_AGENT,
};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::credentials::Credentials;
use crate::envelope::Envelope;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/98.0.4758.109 Safari/537.36";
const WEB_ORIGIN: &str = "https://www.icloud.com";
const WEB_REFERER: &str = "https://www.icloud.com/";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("cookie contains characters that are not allowed in a header")]
    InvalidCookie(#[source] InvalidHeaderValue),
    #[error("request failed")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response payload")]
    Decode(#[from] serde_json::Error),
}

/// The three remote operations. Every call makes exactly one attempt and a
/// timeout comes back as [`Envelope::timed_out`] rather than an error.
#[async_trait]
pub trait HideMyEmailApi: Send + Sync {
    /// Ask the service for a fresh alias address.
    async fn generate_email(&self) -> Result<Envelope, ApiError>;
    /// Activate a generated address with the configured label and note.
    async fn reserve_email(&self, address: &str) -> Result<Envelope, ApiError>;
    /// Fetch every alias on the account.
    async fn list_email(&self) -> Result<Envelope, ApiError>;
}

/// Client configuration plus credentials. Holds no network resources until
/// a session is opened.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Config,
    credentials: Credentials,
}

#[derive(Serialize)]
struct ReservePayload<'a> {
    hme: &'a str,
    label: &'a str,
    note: &'a str,
}

impl ApiClient {
    pub fn new(config: Config, credentials: Credentials) -> Self {
        ApiClient {
            config,
            credentials,
        }
    }

    /// Acquire the network session. The connection pool is released when the
    /// returned guard is dropped, whichever way the caller exits.
    pub fn open_session(&self) -> Result<Session<'_>, ApiError> {
        let http = Client::builder()
            .default_headers(self.headers()?)
            .timeout(self.config.timeout)
            .build()?;
        debug!(base_url = %self.config.base_url, "session opened");
        Ok(Session { client: self, http })
    }

    /// Header set sent with every request.
    pub fn headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(HeaderName::from_static("sec-gpc"), HeaderValue::from_static("1"));
        headers.insert(ORIGIN, HeaderValue::from_static(WEB_ORIGIN));
        headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static("same-site"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static("cors"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-dest"),
            HeaderValue::from_static("empty"),
        );
        headers.insert(REFERER, HeaderValue::from_static(WEB_REFERER));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en-GB;q=0.9,en;q=0.8"),
        );
        if !self.credentials.is_empty() {
            let mut cookie = HeaderValue::from_str(self.credentials.cookie())
                .map_err(ApiError::InvalidCookie)?;
            cookie.set_sensitive(true);
            headers.insert(COOKIE, cookie);
        }
        Ok(headers)
    }
}

/// An open, authenticated session. Shared read-only by every request of a
/// batch.
pub struct Session<'a> {
    client: &'a ApiClient,
    http: Client,
}

impl Session<'_> {
    fn endpoint(&self, operation: &str) -> String {
        format!("{}/{}", self.client.config.base_url, operation)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Envelope, ApiError> {
        let request = request.query(&self.client.config.query_params());
        let outcome = match request.send().await {
            Ok(response) => response.json::<Envelope>().await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(envelope) => Ok(envelope),
            Err(e) if e.is_timeout() => {
                debug!(operation, timeout = ?self.client.config.timeout, "request timed out");
                Ok(Envelope::timed_out())
            }
            Err(e) => Err(ApiError::Transport(e)),
        }
    }
}

#[async_trait]
impl HideMyEmailApi for Session<'_> {
    async fn generate_email(&self) -> Result<Envelope, ApiError> {
        let request = self.http.post(self.endpoint("generate"));
        self.send("generate", request).await
    }

    async fn reserve_email(&self, address: &str) -> Result<Envelope, ApiError> {
        let config = &self.client.config;
        let payload = ReservePayload {
            hme: address,
            label: &config.label,
            note: &config.note,
        };
        // Sent under the session's `text/plain` content type, like the web client.
        let request = self
            .http
            .post(self.endpoint("reserve"))
            .body(serde_json::to_vec(&payload)?);
        self.send("reserve", request).await
    }

    async fn list_email(&self) -> Result<Envelope, ApiError> {
        let request = self.http.get(self.endpoint("list"));
        self.send("list", request).await
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        debug!("session released");
    }
}
