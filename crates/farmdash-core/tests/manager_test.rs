#![allow(clippy::unwrap_used)]
// Integration tests for `PrinterManager` against mocked Moonraker and
// OctoPrint servers.

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use farmdash_core::{
    ChamberSensorKind, ManagerSettings, PrinterConfig, PrinterKind, PrinterManager,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn settings() -> ManagerSettings {
    ManagerSettings {
        status_timeout: Duration::from_secs(2),
        ..ManagerSettings::default()
    }
}

fn klipper(name: &str, url: &str) -> PrinterConfig {
    PrinterConfig::new(name, PrinterKind::Klipper, url).unwrap()
}

fn octoprint(name: &str, url: &str) -> PrinterConfig {
    PrinterConfig::new(name, PrinterKind::OctoPrint, url).unwrap()
}

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn ok_json(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

async fn mount_objects_list(server: &MockServer, objects: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/printer/objects/list"))
        .respond_with(ok_json(json!({ "result": { "objects": objects } })))
        .mount(server)
        .await;
}

async fn mount_objects_query(server: &MockServer, status: Value) {
    Mock::given(method("GET"))
        .and(path("/printer/objects/query"))
        .respond_with(ok_json(json!({ "result": { "eventtime": 1.0, "status": status } })))
        .mount(server)
        .await;
}

/// Expect exactly `times` G-code scripts equal to `script`.
async fn expect_gcode(server: &MockServer, script: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/printer/gcode/script"))
        .and(body_json(json!({ "script": script })))
        .respond_with(ok_json(json!({ "result": "ok" })))
        .expect(times)
        .mount(server)
        .await;
}

async fn expect_no_gcode(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/printer/gcode/script"))
        .respond_with(ok_json(json!({ "result": "ok" })))
        .expect(0)
        .mount(server)
        .await;
}

// ── Status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_printer_is_offline() {
    let manager = PrinterManager::new(vec![klipper("ghost", "http://127.0.0.1:9")], settings());

    let status = manager.get_status("ghost").await.unwrap();
    assert!(!status.online);
    assert_eq!(status.state, "offline");
    assert_eq!(status.error.as_deref(), Some("Cannot connect to printer"));
    assert!(status.telemetry.is_none());
    assert!(manager.last_update("ghost").is_none());
}

#[tokio::test]
async fn unknown_printer_has_no_status() {
    let manager = PrinterManager::new(Vec::new(), settings());
    assert!(manager.get_status("nope").await.is_none());
}

#[tokio::test]
async fn klipper_status_is_normalized() {
    let server = MockServer::start().await;
    mount_objects_list(&server, &["toolhead", "temperature_fan chamber"]).await;
    mount_objects_query(
        &server,
        json!({
            "print_stats": { "state": "printing", "filename": "benchy.gcode", "print_duration": 600 },
            "virtual_sdcard": { "progress": 0.42 },
            "display_status": { "progress": 0.9, "message": "Layer 12" },
            "extruder": { "temperature": 214.96, "target": 215 },
            "heater_bed": { "temperature": 60, "target": 60 },
            "toolhead": { "position": [10.004, 20.5, 0.2, 0] },
            "webhooks": { "state": "ready" },
            "temperature_fan chamber": { "temperature": 38.44, "target": 40 },
        }),
    )
    .await;

    let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());
    let status = manager.get_status("voron").await.unwrap();

    assert!(status.online);
    assert_eq!(status.state, "printing");
    assert!(status.error.is_none());
    let t = status.telemetry.unwrap();
    assert!((t.progress - 42.0).abs() < f64::EPSILON);
    assert_eq!(t.file, "benchy.gcode");
    assert_eq!(t.print_time, "00:10:00");
    assert_eq!(t.message, "Layer 12");
    assert!((t.extruder_temp.actual - 215.0).abs() < f64::EPSILON);
    assert!((t.position.x - 10.0).abs() < f64::EPSILON);
    assert_eq!(t.klippy_state.as_deref(), Some("ready"));
    assert_eq!(t.chamber_temps.len(), 1);
    assert_eq!(t.chamber_temps[0].sensor_type, ChamberSensorKind::TemperatureFan);
    assert_eq!(t.chamber_temps[0].target, Some(40.0));

    assert!(manager.last_update("voron").is_some());
    assert_eq!(manager.health().printers_count, 1);
    assert!(manager.health().last_update.is_some());

    // Chamber objects are part of the combined query.
    let requests = server.received_requests().await.unwrap();
    let query = requests
        .iter()
        .find(|r| r.url.path() == "/printer/objects/query")
        .unwrap();
    assert!(
        query
            .url
            .query()
            .unwrap()
            .ends_with("webhooks&temperature_fan%20chamber")
    );
}

#[tokio::test]
async fn klipper_malformed_status_is_error_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/printer/objects/query"))
        .respond_with(ok_json(json!({ "result": { "status": "not an object" } })))
        .mount(&server)
        .await;

    let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());
    let status = manager.get_status("voron").await.unwrap();

    assert!(!status.online);
    assert_eq!(status.state, "error");
    assert!(status.error.is_some());
    assert!(status.telemetry.is_none());
}

#[tokio::test]
async fn klipper_empty_objects_answer_is_offline() {
    for body in [ResponseTemplate::new(200), ok_json(json!({}))] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/printer/objects/query"))
            .respond_with(body)
            .mount(&server)
            .await;

        let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());
        let status = manager.get_status("voron").await.unwrap();

        assert!(!status.online);
        assert_eq!(status.state, "offline");
        assert_eq!(status.error.as_deref(), Some("Cannot connect to printer"));
        assert!(status.telemetry.is_none());
    }
}

#[tokio::test]
async fn octoprint_status_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/printer"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "state": { "text": "Printing", "flags": { "ready": false } },
            "temperature": { "tool0": { "actual": 200.04, "target": 200 }, "bed": { "actual": 55, "target": 60 } },
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/job"))
        .respond_with(ok_json(json!({
            "job": { "file": { "name": "clip.gcode" } },
            "progress": { "completion": 50.0, "printTime": 600, "printTimeLeft": 600 },
        })))
        .mount(&server)
        .await;

    let manager = PrinterManager::new(vec![octoprint("mk3", &server.uri())], settings());
    let status = manager.get_status("mk3").await.unwrap();

    assert!(status.online);
    assert_eq!(status.state, "printing");
    let t = status.telemetry.unwrap();
    assert_eq!(t.remaining_time, "00:10:00");
    assert_eq!(t.file, "clip.gcode");
    assert_eq!(t.ready, Some(false));
}

#[tokio::test]
async fn octoprint_missing_job_is_offline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/printer"))
        .respond_with(ok_json(json!({ "state": { "text": "Operational" } })))
        .mount(&server)
        .await;

    let manager = PrinterManager::new(vec![octoprint("mk3", &server.uri())], settings());
    let status = manager.get_status("mk3").await.unwrap();
    assert_eq!(status.state, "offline");
}

#[tokio::test]
async fn bulk_status_isolates_a_stuck_printer() {
    let fast = MockServer::start().await;
    mount_objects_query(&fast, json!({ "print_stats": { "state": "standby" } })).await;

    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/printer/objects/query"))
        .respond_with(ok_json(json!({ "result": { "status": {} } })).set_delay(Duration::from_secs(10)))
        .mount(&slow)
        .await;

    let manager = PrinterManager::new(
        vec![klipper("slow", &slow.uri()), klipper("fast", &fast.uri())],
        ManagerSettings {
            status_timeout: Duration::from_millis(300),
            ..ManagerSettings::default()
        },
    );

    let started = Instant::now();
    let all = manager.get_all_status().await;
    assert!(started.elapsed() < Duration::from_secs(5));

    let names: Vec<&str> = all.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["slow", "fast"]);
    assert_eq!(all["slow"].state, "offline");
    assert!(all["fast"].online);
    assert_eq!(all["fast"].state, "standby");
}

// ── Dispatch: validation ────────────────────────────────────────────

#[tokio::test]
async fn dispatch_to_unknown_printer() {
    let manager = PrinterManager::new(Vec::new(), settings());
    let result = manager.dispatch("nope", "pause", &Map::new()).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Printer not found"));
}

#[tokio::test]
async fn unknown_action_is_rejected() {
    let server = MockServer::start().await;
    let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());
    let result = manager.dispatch("voron", "launch", &Map::new()).await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("action"));
}

// ── Dispatch: Klipper ───────────────────────────────────────────────

#[tokio::test]
async fn klipper_jog_sends_relative_move() {
    let server = MockServer::start().await;
    expect_gcode(&server, "G91\nG0 X5 F1800\nG90", 1).await;

    let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());
    let result = manager
        .dispatch("voron", "jog", &params(json!({ "axis": "X", "distance": 5 })))
        .await;
    assert!(result.success, "{result:?}");
}

#[tokio::test]
async fn klipper_jog_with_bad_axis_sends_nothing() {
    let server = MockServer::start().await;
    expect_no_gcode(&server).await;

    let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());
    let result = manager
        .dispatch("voron", "jog", &params(json!({ "axis": "Q", "distance": 5 })))
        .await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("axis"));
}

#[tokio::test]
async fn klipper_home_variants() {
    let server = MockServer::start().await;
    expect_gcode(&server, "G28", 1).await;
    expect_gcode(&server, "G28 X", 1).await;

    let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());

    let all = manager.dispatch("voron", "home", &Map::new()).await;
    assert!(all.success);

    let filtered = manager
        .dispatch("voron", "home", &params(json!({ "axes": ["x", "q"] })))
        .await;
    assert!(filtered.success);

    let invalid = manager
        .dispatch("voron", "home", &params(json!({ "axes": ["q"] })))
        .await;
    assert!(!invalid.success);
    assert!(invalid.error.unwrap().contains("axes"));
}

#[tokio::test]
async fn klipper_negative_bed_target_clamps_to_zero() {
    let server = MockServer::start().await;
    expect_gcode(&server, "M140 S0", 1).await;

    let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());
    let result = manager
        .dispatch(
            "voron",
            "set_temperature",
            &params(json!({ "heater_type": "bed", "temperature": -10 })),
        )
        .await;
    assert!(result.success);
    assert_eq!(
        result.result.unwrap()["message"],
        "Bed temperature set to 0°C"
    );
}

#[tokio::test]
async fn klipper_chamber_temperature_sensor_is_unsupported() {
    let server = MockServer::start().await;
    mount_objects_list(&server, &["temperature_sensor chamber"]).await;
    expect_no_gcode(&server).await;

    let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());
    let result = manager
        .dispatch(
            "voron",
            "set_temperature",
            &params(json!({ "heater_type": "chamber", "temperature": 40, "heater_name": "Chamber" })),
        )
        .await;

    assert!(!result.success);
    assert!(
        result
            .error
            .unwrap()
            .to_lowercase()
            .contains("unsupported chamber sensor type")
    );
}

#[tokio::test]
async fn klipper_chamber_fan_target() {
    let server = MockServer::start().await;
    mount_objects_list(&server, &["temperature_fan chamber_fan"]).await;
    expect_gcode(
        &server,
        "SET_TEMPERATURE_FAN_TARGET temperature_fan=chamber_fan target=45",
        1,
    )
    .await;

    let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());
    let result = manager
        .dispatch(
            "voron",
            "set_temperature",
            &params(json!({ "heater_type": "chamber", "temperature": 45, "heater_name": "chamber fan" })),
        )
        .await;
    assert!(result.success, "{result:?}");
}

#[tokio::test]
async fn klipper_gcode_error_key_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/printer/gcode/script"))
        .respond_with(ok_json(json!({ "error": { "message": "Must home axis first" } })))
        .mount(&server)
        .await;

    let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());
    let result = manager
        .dispatch("voron", "jog", &params(json!({ "axis": "z", "distance": "1" })))
        .await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("Must home axis first"));
}

#[tokio::test]
async fn klipper_pause_uses_print_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/printer/print/pause"))
        .respond_with(ok_json(json!({ "result": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());
    let result = manager.dispatch("voron", "pause", &Map::new()).await;
    assert!(result.success);
    assert_eq!(result.result, Some(json!({ "result": "ok" })));
}

#[tokio::test]
async fn klipper_reprint_with_empty_history_fails_without_starting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/server/history/list"))
        .and(query_param("limit", "1"))
        .respond_with(ok_json(json!({ "result": { "count": 0, "jobs": [] } })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/printer/print/start"))
        .respond_with(ok_json(json!({ "result": "ok" })))
        .expect(0)
        .mount(&server)
        .await;

    let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());
    let result = manager.dispatch("voron", "reprint", &Map::new()).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("No print history found"));
}

#[tokio::test]
async fn klipper_reprint_restarts_last_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/server/history/list"))
        .respond_with(ok_json(json!({
            "result": { "count": 1, "jobs": [{ "filename": "benchy.gcode", "status": "completed" }] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/printer/print/start"))
        .and(body_json(json!({ "filename": "benchy.gcode" })))
        .respond_with(ok_json(json!({ "result": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = PrinterManager::new(vec![klipper("voron", &server.uri())], settings());
    let result = manager.dispatch("voron", "reprint", &Map::new()).await;
    assert!(result.success);
    assert_eq!(result.result, Some(json!({ "filename": "benchy.gcode" })));
}

// ── Dispatch: OctoPrint ─────────────────────────────────────────────

#[tokio::test]
async fn octoprint_chamber_uses_m141() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/printer/command"))
        .and(body_json(json!({ "command": "M141 S50" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let manager = PrinterManager::new(vec![octoprint("mk3", &server.uri())], settings());
    let result = manager
        .dispatch(
            "mk3",
            "set_temperature",
            &params(json!({ "heater_type": "chamber", "temperature": 50, "heater_name": "Chamber" })),
        )
        .await;
    assert!(result.success, "{result:?}");
}

#[tokio::test]
async fn octoprint_home_all_sends_every_axis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/printer/printhead"))
        .and(body_json(json!({ "command": "home", "axes": ["x", "y", "z"] })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let manager = PrinterManager::new(vec![octoprint("mk3", &server.uri())], settings());
    let result = manager
        .dispatch("mk3", "home", &params(json!({ "axes": "all" })))
        .await;
    assert!(result.success);
}

#[tokio::test]
async fn octoprint_reprint_without_file_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/job"))
        .respond_with(ok_json(json!({ "job": { "file": { "name": null } }, "state": "Operational" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let manager = PrinterManager::new(vec![octoprint("mk3", &server.uri())], settings());
    let result = manager.dispatch("mk3", "reprint", &Map::new()).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("No file found to reprint"));
}

// ── Registry ────────────────────────────────────────────────────────

#[tokio::test]
async fn reload_swaps_the_registry() {
    let manager = PrinterManager::new(
        vec![
            klipper("voron", "http://voron.local:7125"),
            octoprint("mk3", "http://mk3.local"),
        ],
        settings(),
    );
    assert_eq!(manager.printer_names(), vec!["voron", "mk3"]);

    manager.reload(vec![octoprint("mk4", "http://mk4.local")]);
    assert_eq!(manager.printer_names(), vec!["mk4"]);
    assert_eq!(manager.health().printers_count, 1);

    let summaries = manager.printers();
    assert_eq!(summaries[0].kind, PrinterKind::OctoPrint);
    assert!(!summaries[0].has_api_key);
}

#[tokio::test]
async fn duplicate_names_keep_the_last_entry() {
    let manager = PrinterManager::new(
        vec![
            klipper("voron", "http://old.local"),
            klipper("voron", "http://new.local"),
        ],
        settings(),
    );
    let summaries = manager.printers();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].url, "http://new.local/");
}

#[tokio::test]
async fn poller_publishes_snapshots() {
    let server = MockServer::start().await;
    mount_objects_query(&server, json!({ "print_stats": { "state": "standby" } })).await;

    let manager = PrinterManager::new(
        vec![klipper("voron", &server.uri())],
        ManagerSettings {
            poll_interval: Duration::from_secs(60),
            ..settings()
        },
    );
    let mut rx = manager.subscribe();
    manager.start_polling().await;

    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(manager.latest()["voron"].online);

    manager.stop_polling().await;
}
