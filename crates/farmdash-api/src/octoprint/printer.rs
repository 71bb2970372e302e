// OctoPrint printer endpoints
//
// api/printer state plus the printhead, tool, bed and raw command
// sub-resources. OctoPrint answers most commands with 204 No Content,
// which the transport decodes to `Value::Null`.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::octoprint::client::OctoPrintClient;
use crate::transport::ApiRequest;

/// OctoPrint answers 409 Conflict when the printer is not operational but
/// still sends a parseable state body.
const PRINTER_ACCEPTED: &[u16] = &[409];

const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);
const HOME_TIMEOUT: Duration = Duration::from_secs(60);
const JOG_TIMEOUT: Duration = Duration::from_secs(30);

impl OctoPrintClient {
    /// `GET api/printer` (409 accepted).
    pub async fn printer_state(&self) -> Result<Value, Error> {
        self.transport
            .send(ApiRequest::get("api/printer").accept(PRINTER_ACCEPTED))
            .await
    }

    /// `POST api/printer/printhead` `{"command": "home", "axes": [...]}`
    ///
    /// Axis names are sent lower-case.
    pub async fn home(&self, axes: &[&str]) -> Result<Value, Error> {
        debug!(?axes, "homing printhead");
        self.transport
            .send(
                ApiRequest::post(
                    "api/printer/printhead",
                    json!({ "command": "home", "axes": axes }),
                )
                .timeout(HOME_TIMEOUT),
            )
            .await
    }

    /// `POST api/printer/printhead` `{"command": "jog", "<axis>": distance}`
    pub async fn jog(&self, axis: &str, distance: f64) -> Result<Value, Error> {
        debug!(axis, distance, "jogging printhead");
        let mut body = serde_json::Map::new();
        body.insert("command".into(), json!("jog"));
        body.insert(axis.to_owned(), json!(distance));
        self.transport
            .send(ApiRequest::post("api/printer/printhead", Value::Object(body)).timeout(JOG_TIMEOUT))
            .await
    }

    /// `POST api/printer/tool` `{"command": "target", "targets": {"tool0": t}}`
    pub async fn set_tool_target(&self, celsius: f64) -> Result<Value, Error> {
        self.transport
            .send(
                ApiRequest::post(
                    "api/printer/tool",
                    json!({ "command": "target", "targets": { "tool0": celsius } }),
                )
                .timeout(COMMAND_TIMEOUT),
            )
            .await
    }

    /// `POST api/printer/bed` `{"command": "target", "target": t}`
    pub async fn set_bed_target(&self, celsius: f64) -> Result<Value, Error> {
        self.transport
            .send(
                ApiRequest::post(
                    "api/printer/bed",
                    json!({ "command": "target", "target": celsius }),
                )
                .timeout(COMMAND_TIMEOUT),
            )
            .await
    }

    /// `POST api/printer/command` `{"command": "<gcode>"}`
    pub async fn send_command(&self, gcode: &str) -> Result<Value, Error> {
        debug!(gcode, "sending raw command");
        self.transport
            .send(
                ApiRequest::post("api/printer/command", json!({ "command": gcode }))
                    .timeout(COMMAND_TIMEOUT),
            )
            .await
    }
}
