// Moonraker printer endpoints
//
// printer/info, printer/objects/*, printer/print_stats, printer/gcode/script
// and the printer/print/* lifecycle actions.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::moonraker::client::{MoonrakerClient, decode};
use crate::moonraker::models::{ObjectListResponse, PrintAction};
use crate::transport::ApiRequest;

/// Objects every combined status query subscribes to, in wire order.
pub const BASE_STATUS_OBJECTS: [&str; 7] = [
    "print_stats",
    "toolhead",
    "extruder",
    "heater_bed",
    "display_status",
    "virtual_sdcard",
    "webhooks",
];

const PRINT_ACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the query string for `printer/objects/query`.
///
/// Objects are `&`-joined; spaces inside object ids (`temperature_sensor
/// chamber`) are sent as `%20`.
pub fn objects_query_string<S: AsRef<str>>(objects: &[S]) -> String {
    objects
        .iter()
        .map(|o| o.as_ref().replace(' ', "%20"))
        .collect::<Vec<_>>()
        .join("&")
}

impl MoonrakerClient {
    /// `GET printer/info`
    pub async fn printer_info(&self) -> Result<Value, Error> {
        self.transport.send(ApiRequest::get("printer/info")).await
    }

    /// `GET printer/objects/list`, unwrapped to the object id list.
    ///
    /// A body without `result.objects` yields an empty list.
    pub async fn list_objects(&self) -> Result<Vec<String>, Error> {
        let body = self
            .transport
            .send(ApiRequest::get("printer/objects/list"))
            .await?;
        if body.is_null() {
            return Ok(Vec::new());
        }
        let parsed: ObjectListResponse = decode(body)?;
        Ok(parsed.result.objects)
    }

    /// `GET printer/objects/query?<objects>`
    pub async fn query_objects<S: AsRef<str>>(&self, objects: &[S]) -> Result<Value, Error> {
        let endpoint = format!("printer/objects/query?{}", objects_query_string(objects));
        self.transport.send(ApiRequest::get(&endpoint)).await
    }

    /// `GET printer/print_stats`
    pub async fn print_stats(&self) -> Result<Value, Error> {
        self.transport
            .send(ApiRequest::get("printer/print_stats"))
            .await
    }

    /// `POST printer/gcode/script` with `{"script": ...}`.
    ///
    /// Multi-line scripts are `\n`-joined. The timeout should cover the
    /// physical duration of the commands: Moonraker holds the response
    /// until Klipper has executed the script.
    pub async fn run_gcode(&self, script: &str, timeout: Duration) -> Result<Value, Error> {
        debug!(script = %script.replace('\n', " | "), "sending gcode script");
        self.transport
            .send(ApiRequest::post("printer/gcode/script", json!({ "script": script })).timeout(timeout))
            .await
    }

    /// `POST printer/print/{pause,resume,cancel}`
    pub async fn print_action(&self, action: PrintAction) -> Result<Value, Error> {
        let endpoint = format!("printer/print/{}", action.as_str());
        debug!(action = action.as_str(), "print lifecycle action");
        self.transport
            .send(ApiRequest::post(&endpoint, json!({})).timeout(PRINT_ACTION_TIMEOUT))
            .await
    }

    /// `POST printer/print/start` with `{"filename": ...}`
    pub async fn start_print(&self, filename: &str) -> Result<Value, Error> {
        debug!(filename, "starting print");
        self.transport
            .send(
                ApiRequest::post("printer/print/start", json!({ "filename": filename }))
                    .timeout(PRINT_ACTION_TIMEOUT),
            )
            .await
    }
}
