// ── Printer manager ──
//
// Owns the registry of printer adapters and is the single entry point for
// consumers: status polling (one printer or all of them), control dispatch,
// hot reload, and an optional background poller that keeps a status
// snapshot fresh. Cheaply cloneable via `Arc<ManagerInner>`.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use farmdash_api::TransportConfig;
use futures_util::stream::{self, StreamExt};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::adapter::PrinterAdapter;
use crate::command::Command;
use crate::config::{ManagerSettings, PrinterConfig, PrinterKind};
use crate::dispatch;
use crate::model::{ControlResult, NormalizedStatus};

/// Statuses keyed by printer name, in configuration order.
pub type StatusMap = IndexMap<String, NormalizedStatus>;

/// `error` text for a dispatch against an unknown printer.
pub const PRINTER_NOT_FOUND: &str = "Printer not found";

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(250);

// ── Registry ─────────────────────────────────────────────────────

struct PrinterEntry {
    config: PrinterConfig,
    adapter: PrinterAdapter,
}

/// Immutable set of adapters; replaced wholesale on reload.
#[derive(Default)]
struct Registry {
    printers: IndexMap<String, Arc<PrinterEntry>>,
}

impl Registry {
    fn build(configs: Vec<PrinterConfig>, transport: &TransportConfig) -> Self {
        let mut printers = IndexMap::with_capacity(configs.len());
        for config in configs {
            let adapter = match PrinterAdapter::from_config(&config, transport) {
                Ok(adapter) => adapter,
                Err(e) => {
                    warn!(printer = %config.name, error = %e, "skipping printer");
                    continue;
                }
            };
            let name = config.name.clone();
            if printers
                .insert(name.clone(), Arc::new(PrinterEntry { config, adapter }))
                .is_some()
            {
                warn!(printer = %name, "duplicate printer name, later entry wins");
            }
        }
        Self { printers }
    }
}

// ── Summaries ────────────────────────────────────────────────────

/// Configured printer as shown to consumers; credentials are reduced to a
/// flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrinterSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PrinterKind,
    pub url: String,
    pub has_api_key: bool,
    pub use_websocket: bool,
}

/// Liveness summary of the manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub status: &'static str,
    pub printers_count: usize,
    /// Most recent successful status update across all printers.
    pub last_update: Option<DateTime<Utc>>,
}

// ── PrinterManager ───────────────────────────────────────────────

#[derive(Clone)]
pub struct PrinterManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    settings: ManagerSettings,
    transport: TransportConfig,
    registry: ArcSwap<Registry>,
    last_update: DashMap<String, DateTime<Utc>>,
    snapshot_tx: watch::Sender<Arc<StatusMap>>,
    poller: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl PrinterManager {
    pub fn new(configs: Vec<PrinterConfig>, settings: ManagerSettings) -> Self {
        let transport = TransportConfig {
            read_timeout: settings.status_timeout,
            ..TransportConfig::default()
        };
        let registry = Registry::build(configs, &transport);
        info!(printers = registry.printers.len(), "printer registry built");
        let (snapshot_tx, _) = watch::channel(Arc::new(StatusMap::new()));

        Self {
            inner: Arc::new(ManagerInner {
                settings,
                transport,
                registry: ArcSwap::from_pointee(registry),
                last_update: DashMap::new(),
                snapshot_tx,
                poller: Mutex::new(None),
            }),
        }
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.inner.settings
    }

    /// Replace the whole registry with one built from `configs`.
    ///
    /// In-flight calls keep using the adapters they started with.
    pub fn reload(&self, configs: Vec<PrinterConfig>) {
        let registry = Registry::build(configs, &self.inner.transport);
        self.inner
            .last_update
            .retain(|name, _| registry.printers.contains_key(name));
        info!(printers = registry.printers.len(), "printer registry reloaded");
        self.inner.registry.store(Arc::new(registry));
    }

    fn entry(&self, name: &str) -> Option<Arc<PrinterEntry>> {
        self.inner.registry.load().printers.get(name).cloned()
    }

    pub fn printer_names(&self) -> Vec<String> {
        self.inner.registry.load().printers.keys().cloned().collect()
    }

    pub fn printers(&self) -> Vec<PrinterSummary> {
        self.inner
            .registry
            .load()
            .printers
            .values()
            .map(|entry| PrinterSummary {
                name: entry.config.name.clone(),
                kind: entry.config.kind,
                url: entry.config.base_url.to_string(),
                has_api_key: entry.config.api_key.is_some(),
                use_websocket: entry.config.use_websocket,
            })
            .collect()
    }

    // ── Status ───────────────────────────────────────────────────

    async fn poll(&self, entry: Arc<PrinterEntry>) -> NormalizedStatus {
        let adapter = &entry.adapter;
        let deadline = self.inner.settings.status_deadline();

        let status = if let Ok(status) = tokio::time::timeout(deadline, adapter.status()).await {
            status
        } else {
            warn!(printer = adapter.name(), deadline_ms = deadline.as_millis(), "status poll timed out");
            NormalizedStatus::offline(adapter.name(), adapter.kind())
        };

        if status.online {
            self.inner
                .last_update
                .insert(adapter.name().to_owned(), Utc::now());
        }
        debug!(printer = adapter.name(), online = status.online, state = %status.state, "status polled");
        status
    }

    /// Status of one printer, `None` when it isn't configured.
    pub async fn get_status(&self, name: &str) -> Option<NormalizedStatus> {
        let entry = self.entry(name)?;
        Some(self.poll(entry).await)
    }

    /// Status of every printer, in configuration order.
    ///
    /// Printers are polled concurrently (bounded by `max_concurrent_polls`),
    /// each under its own deadline, so one stuck printer only costs its own
    /// entry.
    pub async fn get_all_status(&self) -> StatusMap {
        let registry = self.inner.registry.load_full();
        let limit = self.inner.settings.max_concurrent_polls.max(1);

        let statuses: Vec<NormalizedStatus> = stream::iter(registry.printers.values().cloned())
            .map(|entry| self.poll(entry))
            .buffered(limit)
            .collect()
            .await;

        statuses
            .into_iter()
            .map(|status| (status.name.clone(), status))
            .collect()
    }

    // ── Control ──────────────────────────────────────────────────

    /// Validate and run a loosely-typed control request.
    pub async fn dispatch(
        &self,
        name: &str,
        action: &str,
        params: &Map<String, Value>,
    ) -> ControlResult {
        let Some(entry) = self.entry(name) else {
            warn!(printer = name, action, "control request for unknown printer");
            return ControlResult::failed(PRINTER_NOT_FOUND);
        };
        dispatch::dispatch(&entry.adapter, action, params).await
    }

    /// Run an already-validated command.
    pub async fn execute(&self, name: &str, command: &Command) -> ControlResult {
        let Some(entry) = self.entry(name) else {
            return ControlResult::failed(PRINTER_NOT_FOUND);
        };
        dispatch::run(&entry.adapter, command).await
    }

    // ── Bookkeeping ──────────────────────────────────────────────

    /// When `name` last answered a status poll successfully.
    pub fn last_update(&self, name: &str) -> Option<DateTime<Utc>> {
        self.inner.last_update.get(name).map(|ts| *ts)
    }

    pub fn health(&self) -> HealthSummary {
        HealthSummary {
            status: "ok",
            printers_count: self.inner.registry.load().printers.len(),
            last_update: self.inner.last_update.iter().map(|ts| *ts.value()).max(),
        }
    }

    // ── Background polling ───────────────────────────────────────

    /// Latest snapshot from the background poller (empty until it ran).
    pub fn latest(&self) -> Arc<StatusMap> {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Watch the poller's snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<StatusMap>> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Start the background poller; a no-op when it is already running.
    pub async fn start_polling(&self) {
        let mut slot = self.inner.poller.lock().await;
        if slot.is_some() {
            return;
        }
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(self.clone(), cancel.clone()));
        *slot = Some((cancel, handle));
        info!(interval_ms = self.inner.settings.poll_interval.as_millis(), "status poller started");
    }

    /// Stop the background poller and wait for it to finish.
    pub async fn stop_polling(&self) {
        let Some((cancel, handle)) = self.inner.poller.lock().await.take() else {
            return;
        };
        cancel.cancel();
        let _ = handle.await;
        info!("status poller stopped");
    }
}

async fn poll_task(manager: PrinterManager, cancel: CancellationToken) {
    let period = manager.inner.settings.poll_interval.max(MIN_POLL_INTERVAL);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let statuses = manager.get_all_status().await;
                manager.inner.snapshot_tx.send_replace(Arc::new(statuses));
            }
        }
    }
}
