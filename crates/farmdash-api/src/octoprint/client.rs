// OctoPrint HTTP client
//
// Wraps `HttpTransport` with OctoPrint's `X-Api-Key` auth.

use secrecy::SecretString;
use url::Url;

use crate::error::Error;
use crate::transport::{AuthScheme, HttpTransport, TransportConfig};

/// Raw HTTP client for an OctoPrint instance.
#[derive(Debug, Clone)]
pub struct OctoPrintClient {
    pub(crate) transport: HttpTransport,
}

impl OctoPrintClient {
    /// Create a client for the OctoPrint instance at `base_url`.
    pub fn new(
        base_url: Url,
        api_key: Option<SecretString>,
        config: &TransportConfig,
    ) -> Result<Self, Error> {
        let auth = api_key.map_or(AuthScheme::None, AuthScheme::ApiKeyHeader);
        Ok(Self {
            transport: HttpTransport::new(base_url, auth, config)?,
        })
    }

    /// Create a client around an existing transport.
    pub fn with_transport(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// The OctoPrint base URL.
    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }
}
