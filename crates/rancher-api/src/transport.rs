//! Raw HTTP transport.
//!
//! Sends one request and hands back status, headers and body. It knows
//! nothing about schemas or error bodies, and it never retries: status
//! handling and conflict retry live in the client.

use std::time::{Duration, Instant};

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::error::{Error, Result};

/// Default connect and read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for a [`Transport`].
#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Sent with every request. `Accept: application/json` when empty.
    pub headers: Vec<(String, String)>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            access_key: None,
            secret_key: None,
            headers: Vec::new(),
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }
}

/// A response as it came off the wire.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The body as text. Bodies that are not valid UTF-8 are an error.
    pub fn text(&self) -> Result<String> {
        Ok(String::from_utf8(self.body.clone())?)
    }
}

/// Pooled HTTP session with auth and default headers applied.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    access_key: Option<String>,
    secret_key: Option<String>,
    read_timeout: Duration,
}

impl Transport {
    /// Build a session from the given settings.
    pub fn new(settings: TransportSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if settings.headers.is_empty() {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        for (name, value) in &settings.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::Config(format!("Invalid header name: {}", name)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| Error::Config(format!("Invalid value for header {}", name)))?;
            headers.insert(name, value);
        }

        let user_agent = settings
            .user_agent
            .unwrap_or_else(|| format!("rancher-api/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            access_key: settings.access_key,
            secret_key: settings.secret_key,
            read_timeout: settings.read_timeout,
        })
    }

    /// Execute a single request.
    ///
    /// Any response, whatever its status, is `Ok`. Only failures to obtain a
    /// response (connect, timeout, body read) are errors; those are logged
    /// here and returned as [`Error::Transport`].
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse> {
        let started = Instant::now();
        let mut request = self
            .http
            .request(method.clone(), url)
            .timeout(self.read_timeout);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(access_key) = &self.access_key {
            request = request.basic_auth(access_key, self.secret_key.as_ref());
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let failed = |source: reqwest::Error| {
            tracing::warn!(%method, url, error = %source, "HTTP request failed");
            Error::Transport {
                method: method.to_string(),
                url: url.to_string(),
                source,
            }
        };

        let response = request.send().await.map_err(&failed)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(&failed)?.to_vec();

        tracing::debug!(
            %method,
            url,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "HTTP request"
        );

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
