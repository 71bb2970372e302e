// OctoPrint job and file endpoints

use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::octoprint::client::OctoPrintClient;
use crate::transport::ApiRequest;

const JOB_TIMEOUT: Duration = Duration::from_secs(10);

/// Job commands accepted by `POST api/job`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCommand {
    Pause,
    Resume,
    Cancel,
}

impl JobCommand {
    /// Request body for this command.
    ///
    /// Pause and resume are both the `pause` command with an explicit
    /// `action`, so a repeated call never toggles back.
    pub fn body(self) -> Value {
        match self {
            Self::Pause => json!({ "command": "pause", "action": "pause" }),
            Self::Resume => json!({ "command": "pause", "action": "resume" }),
            Self::Cancel => json!({ "command": "cancel" }),
        }
    }
}

/// Path segment for `api/files/local/<path>`; folder separators are sent
/// as `%2F` so the whole path stays one segment.
pub fn local_file_endpoint(path: &str) -> String {
    format!("api/files/local/{}", path.replace('/', "%2F"))
}

impl OctoPrintClient {
    /// `GET api/job`
    pub async fn job(&self) -> Result<Value, Error> {
        self.transport.send(ApiRequest::get("api/job")).await
    }

    /// `POST api/job`
    pub async fn job_command(&self, command: JobCommand) -> Result<Value, Error> {
        debug!(?command, "job command");
        self.transport
            .send(ApiRequest::post("api/job", command.body()).timeout(JOB_TIMEOUT))
            .await
    }

    /// `POST api/files/local/<path>` `{"command": "select", "print": true}`
    pub async fn select_and_print(&self, path: &str) -> Result<Value, Error> {
        let endpoint = local_file_endpoint(path);
        debug!(path, "selecting file and starting print");
        self.transport
            .send(
                ApiRequest::post(&endpoint, json!({ "command": "select", "print": true }))
                    .timeout(JOB_TIMEOUT),
            )
            .await
    }
}
