// Moonraker HTTP client
//
// Wraps `HttpTransport` with Moonraker's bearer-token auth. Endpoint
// methods live in `printer.rs` (printer/*) and `server.rs` (server/*) as
// inherent methods to keep this module focused on construction.

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::Error;
use crate::transport::{AuthScheme, HttpTransport, TransportConfig};

/// Raw HTTP client for a Moonraker instance.
#[derive(Debug, Clone)]
pub struct MoonrakerClient {
    pub(crate) transport: HttpTransport,
}

impl MoonrakerClient {
    /// Create a client for the Moonraker instance at `base_url`.
    ///
    /// `token` is sent as `Authorization: Bearer <token>` when present.
    pub fn new(
        base_url: Url,
        token: Option<SecretString>,
        config: &TransportConfig,
    ) -> Result<Self, Error> {
        let auth = token.map_or(AuthScheme::None, AuthScheme::Bearer);
        Ok(Self {
            transport: HttpTransport::new(base_url, auth, config)?,
        })
    }

    /// Create a client around an existing transport.
    pub fn with_transport(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// The Moonraker base URL.
    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }
}

/// Decode a typed model out of a loosely-typed body.
pub(crate) fn decode<T: DeserializeOwned>(body: Value) -> Result<T, Error> {
    T::deserialize(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_string(),
    })
}
