// Shared HTTP transport for both printer API clients.
//
// One `HttpTransport` is bound to one printer: it owns the base URL, the
// auth header scheme, and a `reqwest::Client`. Every call carries its own
// timeout and an optional set of extra HTTP statuses that still count as a
// usable response (OctoPrint answers 409 while the printer is busy).

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Default per-call timeout for status reads.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

const API_KEY_HEADER: &str = "X-Api-Key";

/// How a printer expects to be authenticated.
#[derive(Debug, Clone, Default)]
pub enum AuthScheme {
    /// No credentials configured.
    #[default]
    None,
    /// OctoPrint-style `X-Api-Key: <key>` header.
    ApiKeyHeader(SecretString),
    /// Moonraker-style `Authorization: Bearer <token>` header.
    Bearer(SecretString),
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound applied by the client itself; per-call timeouts are
    /// always shorter or equal.
    pub timeout: Duration,
    /// Timeout for requests that don't set their own (status reads).
    pub read_timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            read_timeout: DEFAULT_READ_TIMEOUT,
            user_agent: concat!("farmdash/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}

/// A single upstream request.
///
/// Built with [`ApiRequest::get`] / [`ApiRequest::post`] and refined with
/// the `timeout` / `accept` builders before being handed to
/// [`HttpTransport::send`]. Without an explicit timeout the transport's
/// read timeout applies.
#[derive(Debug, Clone)]
pub struct ApiRequest<'a> {
    pub method: Method,
    pub endpoint: &'a str,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
    pub accepted: &'a [u16],
}

impl<'a> ApiRequest<'a> {
    pub fn get(endpoint: &'a str) -> Self {
        Self {
            method: Method::GET,
            endpoint,
            body: None,
            timeout: None,
            accepted: &[],
        }
    }

    pub fn post(endpoint: &'a str, body: Value) -> Self {
        Self {
            method: Method::POST,
            endpoint,
            body: Some(body),
            timeout: None,
            accepted: &[],
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Treat these non-2xx statuses as valid, parseable responses.
    pub fn accept(mut self, statuses: &'a [u16]) -> Self {
        self.accepted = statuses;
        self
    }
}

/// Raw HTTP transport bound to one printer.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    auth: AuthScheme,
    read_timeout: Duration,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("auth", &self.auth)
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport with a freshly built client.
    pub fn new(base_url: Url, auth: AuthScheme, config: &TransportConfig) -> Result<Self, Error> {
        let http = config.build_client()?;
        Ok(Self::with_client(http, base_url, auth).with_read_timeout(config.read_timeout))
    }

    /// Create a transport around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, auth: AuthScheme) -> Self {
        Self {
            http,
            base_url,
            auth,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Override the timeout used by requests that don't set their own.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// The printer base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join an endpoint onto the base URL.
    ///
    /// Plain string concatenation rather than `Url::join`, so a base URL
    /// carrying a path prefix (reverse-proxy ingress) keeps it.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Ok(Url::parse(&full)?)
    }

    /// Send a request and decode the JSON body.
    ///
    /// An empty body on an accepted status decodes to `Value::Null`.
    pub async fn send(&self, req: ApiRequest<'_>) -> Result<Value, Error> {
        let url = self.endpoint_url(req.endpoint)?;
        let timeout = req.timeout.unwrap_or(self.read_timeout);
        debug!(method = %req.method, %url, timeout_ms = timeout.as_millis(), "upstream request");

        let mut builder = self
            .http
            .request(req.method.clone(), url)
            .timeout(timeout)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        builder = match &self.auth {
            AuthScheme::None => builder,
            AuthScheme::ApiKeyHeader(key) => builder.header(API_KEY_HEADER, key.expose_secret()),
            AuthScheme::Bearer(token) => builder.header(
                AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            ),
        };

        if let Some(ref body) = req.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| classify(e, timeout))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| classify(e, timeout))?;

        if !status.is_success() && !req.accepted.contains(&status.as_u16()) {
            return Err(Error::Status {
                status: status.as_u16(),
                endpoint: req.endpoint.to_owned(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            timeout_secs: timeout.as_secs(),
        }
    } else {
        Error::Transport(err)
    }
}
