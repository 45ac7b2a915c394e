// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line behaviour against a filesystem object store.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("objects");
        let config = dir.path().join("leadflow.toml");
        std::fs::write(
            &config,
            format!(
                r#"
[enrichment]
skip_owner_lookup = true

[storage]
backend = "filesystem"
root = "{}"
raw_bucket = "raw"
curated_bucket = "curated"
error_bucket = "errors"

[log]
level = "debug"
"#,
                root.display().to_string().replace('\\', "/")
            ),
        )
        .expect("write config");
        Self { dir, config }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write input");
        path
    }

    fn object(&self, bucket: &str, key: &str) -> PathBuf {
        self.dir.path().join("objects").join(bucket).join(key)
    }

    fn run(&self, args: &[&str]) -> Output {
        leadflow(&self.config, args)
    }
}

fn leadflow(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_leadflow"))
        .env_clear()
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("run leadflow")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "leadflow failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn ingest_then_process_writes_curated_artifact() {
    let ws = Workspace::new();
    let payload = ws.write(
        "webhook.json",
        &json!({
            "event": {
                "lead_id": "lead_cli",
                "data": {
                    "display_name": "Jane Doe",
                    "status_label": "Qualified",
                    "date_created": "2024-03-01T09:30:00Z"
                }
            }
        })
        .to_string(),
    );

    let receipt = stdout_json(&ws.run(&["ingest", "--file", payload.to_str().unwrap()]));
    let raw_key = receipt["key"].as_str().expect("key").to_string();
    assert_eq!(
        raw_key,
        "crm/lead_created/dt=2024-03-01/lead_id=lead_cli/crm_event_lead_cli.json"
    );
    assert!(ws.object("raw", &raw_key).is_file());

    let body = ws.write(
        "delivery.json",
        &json!({"Records": [{"s3": {"bucket": {"name": "raw"}, "object": {"key": raw_key}}}]})
            .to_string(),
    );
    let report = stdout_json(&ws.run(&["process", "--file", body.to_str().unwrap()]));
    assert_eq!(report["objects"][0]["outcome"], "processed");
    assert_eq!(report["objects"][0]["owner_lookup_status"], "skipped");

    let curated_path = ws.object(
        "curated",
        "crm/lead_enriched/dt=2024-03-01/lead_id=lead_cli/lead_lead_cli.json",
    );
    let curated: Value =
        serde_json::from_slice(&std::fs::read(curated_path).expect("curated artifact"))
            .expect("curated JSON");
    assert_eq!(curated["display_name"], "Jane Doe");
    assert_eq!(curated["lead_owner"], Value::Null);
    assert_eq!(curated["owner_lookup_status"], "skipped");
}

#[test]
fn process_fails_when_raw_object_is_missing() {
    let ws = Workspace::new();
    let body = ws.write(
        "delivery.json",
        &json!({"Records": [{"s3": {"bucket": {"name": "raw"}, "object": {
            "key": "crm/lead_created/dt=2024-03-01/lead_id=ghost/crm_event_ghost.json"
        }}}]})
        .to_string(),
    );

    let output = ws.run(&["process", "--file", body.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn process_fails_on_malformed_delivery() {
    let ws = Workspace::new();
    let body = ws.write("delivery.json", "this is not json");

    let output = ws.run(&["process", "--file", body.to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn ingest_rejects_payload_without_lead_id() {
    let ws = Workspace::new();
    let payload = ws.write("webhook.json", r#"{"event": {"data": {}}}"#);

    let output = ws.run(&["ingest", "--file", payload.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(!ws.dir.path().join("objects").join("raw").exists());
}

#[test]
fn invalid_config_exits_before_running() {
    let ws = Workspace::new();
    let bad = ws.write("bad.toml", "[storage]\ncurated_buckt = \"x\"\n");

    let output = leadflow(&bad, &["check"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(!output.stderr.is_empty());
}

#[test]
fn check_passes_for_local_setup() {
    let ws = Workspace::new();
    let output = ws.run(&["check"]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("object store"));
    assert!(!stdout.contains("FAIL"));
}
