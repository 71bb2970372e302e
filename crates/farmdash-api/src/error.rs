use thiserror::Error;

/// Top-level error type for the `farmdash-api` crate.
///
/// Every upstream call resolves to either a decoded JSON body or one of these
/// variants. Nothing in this crate panics on a bad response; `farmdash-core`
/// decides whether a failure means "offline", "error", or a failed command.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, reset, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request exceeded its per-call deadline.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Endpoint could not be joined onto the printer base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The underlying `reqwest::Client` could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Upstream ────────────────────────────────────────────────────
    /// Upstream answered with an HTTP status outside 2xx and outside the
    /// caller's accepted set.
    #[error("HTTP {status} from {endpoint}")]
    Status {
        status: u16,
        endpoint: String,
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// Body was not valid JSON, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the printer could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a timeout of any flavor.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// HTTP status code of a rejected response, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
