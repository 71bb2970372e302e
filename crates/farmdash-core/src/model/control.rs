// ── Control outcome envelope ──

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Uniform result of a control action.
///
/// Exactly one of `result` / `error` is meaningful; a failed result always
/// carries a non-empty `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlResult {
    pub success: bool,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl ControlResult {
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "Unknown error".into();
        }
        Self {
            success: false,
            result: None,
            error: Some(error),
        }
    }
}

impl From<Result<Value, CoreError>> for ControlResult {
    fn from(outcome: Result<Value, CoreError>) -> Self {
        match outcome {
            Ok(value) => Self::ok(value),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn failure_always_has_a_message() {
        let r = ControlResult::failed("  ");
        assert!(!r.success);
        assert_eq!(r.error.as_deref(), Some("Unknown error"));
        assert!(r.result.is_none());
    }

    #[test]
    fn serializes_both_keys() {
        let r = ControlResult::ok(json!({ "status": "ok" }));
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({ "success": true, "result": { "status": "ok" }, "error": null })
        );
    }
}
