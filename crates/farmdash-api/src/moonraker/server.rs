// Moonraker server endpoints
//
// Job queue and print history under server/*.

use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::moonraker::client::{MoonrakerClient, decode};
use crate::moonraker::models::{HistoryJob, HistoryResponse};
use crate::transport::ApiRequest;

impl MoonrakerClient {
    /// `GET server/job_queue/status`
    pub async fn job_queue_status(&self) -> Result<Value, Error> {
        self.transport
            .send(ApiRequest::get("server/job_queue/status"))
            .await
    }

    /// `GET server/history/list?limit=<n>`, most recent first.
    ///
    /// Fails with [`Error::Deserialization`] when the body carries no
    /// `result` (history component not loaded).
    pub async fn history(&self, limit: u32) -> Result<Vec<HistoryJob>, Error> {
        let endpoint = format!("server/history/list?limit={limit}");
        debug!(limit, "fetching print history");
        let body = self.transport.send(ApiRequest::get(&endpoint)).await?;
        let parsed: HistoryResponse = decode(body)?;
        Ok(parsed.result.jobs)
    }
}
