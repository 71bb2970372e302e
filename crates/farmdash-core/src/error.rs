// ── Core error types ──
//
// Errors surfaced by farmdash-core. Callers never see raw HTTP statuses or
// JSON parse failures; the `From<farmdash_api::Error>` impl folds them into
// the variants below. Status queries turn these into offline/error records
// and control actions into a failed `ControlResult`, so nothing here ever
// escapes as a panic.

use serde_json::Value;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to printer at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Printer did not answer within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    #[error("Unsupported {what}: {detail}")]
    Unsupported { what: String, detail: String },

    /// The printer answered but refused the request.
    #[error("Printer rejected the request: {message}")]
    Rejected {
        message: String,
        status: Option<u16>,
    },

    /// The request was well-formed but there was nothing to act on.
    #[error("{message}")]
    OperationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn failed(message: impl Into<String>) -> Self {
        Self::OperationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<farmdash_api::Error> for CoreError {
    fn from(err: farmdash_api::Error) -> Self {
        match err {
            // timeouts were already split out as `Error::Timeout` by the transport
            farmdash_api::Error::Transport(ref e) => {
                if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Rejected {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            farmdash_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            farmdash_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            farmdash_api::Error::ClientBuild(message) => CoreError::Config { message },
            farmdash_api::Error::Status {
                status,
                endpoint,
                body,
            } => CoreError::Rejected {
                message: upstream_message(&body)
                    .unwrap_or_else(|| format!("HTTP {status} from {endpoint}")),
                status: Some(status),
            },
            farmdash_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unexpected response from printer: {message}"))
            }
        }
    }
}

/// Pull a human-readable message out of an upstream error body.
///
/// Moonraker answers `{"error": {"message": ...}}`, OctoPrint
/// `{"error": "..."}`; anything else yields `None`.
fn upstream_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = error_message(value.get("error")?);
    (!message.is_empty()).then_some(message)
}

/// Render the value of an upstream `error` key as text.
pub(crate) fn error_message(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_owned),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
