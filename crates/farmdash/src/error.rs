//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` / `ConfigError` into user-facing errors with help text
//! and distinct exit codes.

use miette::Diagnostic;
use thiserror::Error;

use farmdash_config::ConfigError;
use farmdash_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to printer at {url}")]
    #[diagnostic(
        code(farmdash::connection_failed),
        help("Check that the printer is powered on and reachable.\nReason: {reason}")
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(farmdash::timeout),
        help("Increase the timeout with --timeout or check the printer's responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Printers ─────────────────────────────────────────────────────
    #[error("Printer '{name}' not found")]
    #[diagnostic(
        code(farmdash::not_found),
        help("Run: farmdash printers to see configured printers")
    )]
    PrinterNotFound { name: String },

    #[error("{action} on '{printer}' failed: {message}")]
    #[diagnostic(code(farmdash::control_failed))]
    ControlFailed {
        printer: String,
        action: String,
        message: String,
    },

    #[error("Printer rejected the request: {message}")]
    #[diagnostic(code(farmdash::rejected))]
    Rejected { message: String },

    #[error("Unsupported {what}: {detail}")]
    #[diagnostic(code(farmdash::unsupported))]
    Unsupported { what: String, detail: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(farmdash::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(farmdash::config),
        help("Check the config file (farmdash config path) and FARMDASH_* variables.")
    )]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(farmdash::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    #[diagnostic(code(farmdash::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML serialization failed: {0}")]
    #[diagnostic(code(farmdash::toml))]
    Toml(#[from] toml::ser::Error),

    #[error("{0}")]
    #[diagnostic(code(farmdash::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::PrinterNotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(Box::new(err))
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::ValidationFailed { field, reason } => Self::Validation { field, reason },
            CoreError::Unsupported { what, detail } => Self::Unsupported { what, detail },
            CoreError::Rejected { message, .. } => Self::Rejected { message },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::OperationFailed { message } | CoreError::Internal(message) => {
                Self::Internal(message)
            }
        }
    }
}
