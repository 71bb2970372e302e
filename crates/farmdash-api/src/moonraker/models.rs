// Moonraker response models
//
// Only the envelopes the core needs structurally are typed here. Status
// objects stay `serde_json::Value` because Klipper reports whatever its
// config declares.

use serde::Deserialize;

/// `GET printer/objects/list` → `{ "result": { "objects": [...] } }`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ObjectListResponse {
    #[serde(default)]
    pub result: ObjectList,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ObjectList {
    #[serde(default)]
    pub objects: Vec<String>,
}

/// `GET server/history/list` → `{ "result": { "count": n, "jobs": [...] } }`
///
/// `result` is required: a body without it means the history component is
/// not loaded, which callers report differently from an empty history.
#[derive(Debug, Deserialize)]
pub(crate) struct HistoryResponse {
    pub result: HistoryList,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistoryList {
    #[serde(default)]
    pub jobs: Vec<HistoryJob>,
}

/// One entry of the Moonraker print history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryJob {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub print_duration: Option<f64>,
}

/// Print-lifecycle actions under `printer/print/*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintAction {
    Pause,
    Resume,
    Cancel,
}

impl PrintAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Cancel => "cancel",
        }
    }
}
