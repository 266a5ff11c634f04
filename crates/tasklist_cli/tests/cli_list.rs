use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tasklist-{nanos}-{file_name}"))
}

fn run(store_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tasklist"))
        .args(args)
        .env("TASKLIST_STORE_PATH", store_path)
        .env("TASKLIST_CONFIG_PATH", temp_path("no-config.json"))
        .env("TASKLIST_DISABLE_NOTIFICATIONS", "1")
        .output()
        .expect("failed to run tasklist")
}

#[test]
fn list_shows_newest_pending_first() {
    let store_path = temp_path("cli-list.json");
    run(&store_path, &["add", "first task"]);
    run(&store_path, &["add", "second task"]);
    let output = run(&store_path, &["list"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let second = stdout.find("second task").expect("second task listed");
    let first = stdout.find("first task").expect("first task listed");
    assert!(second < first);
    assert!(stdout.contains("pending"));
}

#[test]
fn list_json_splits_collections() {
    let store_path = temp_path("cli-list-json.json");
    run(&store_path, &["add", "keep"]);
    run(&store_path, &["add", "done"]);
    run(&store_path, &["finish", "--text", "done"]);
    let output = run(&store_path, &["list", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["pending"].as_array().unwrap().len(), 1);
    assert_eq!(value["pending"][0]["text"], "keep");
    assert_eq!(value["finished"][0]["text"], "done");
    assert_eq!(value["finished"][0]["state"], "finished");
}

#[test]
fn list_on_empty_store() {
    let store_path = temp_path("cli-list-empty.json");
    let output = run(&store_path, &["list"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No tasks."));
    assert!(!store_path.exists());
}

#[test]
fn list_treats_malformed_entries_as_empty() {
    let store_path = temp_path("cli-list-malformed.json");
    let stored = serde_json::json!({
        "schema_version": 1,
        "entries": { "todo-tasks": "not json", "finished-tasks": "{}" }
    });
    std::fs::write(&store_path, stored.to_string()).unwrap();

    let output = run(&store_path, &["list", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["pending"].as_array().unwrap().is_empty());
    assert!(value["finished"].as_array().unwrap().is_empty());
}

#[test]
fn list_migrates_legacy_finished_key() {
    let store_path = temp_path("cli-list-legacy.json");
    let legacy = serde_json::json!([{
        "id": "6188700000",
        "text": "old chore",
        "createdAt": "2025-12-19T00:00:00Z",
        "finishedAt": "2025-12-19T08:00:00Z",
    }]);
    let stored = serde_json::json!({
        "schema_version": 1,
        "entries": { "completed_tasks": legacy.to_string() }
    });
    std::fs::write(&store_path, stored.to_string()).unwrap();

    let output = run(&store_path, &["list", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["finished"][0]["text"], "old chore");
}

#[test]
fn list_reads_widget_saved_tasks() {
    let store_path = temp_path("cli-list-widget.json");
    let stored = serde_json::json!({
        "schema_version": 1,
        "entries": {
            "todo-tasks": r#"[{"id":"6188800000","text":"Buy milk","createdDate":1766188800000}]"#,
            "completed_tasks": r#"[{"id":"6188700000","text":"<strike>Pay rent</strike>","createdDate":1766102400000,"finishedDate":1766131200000}]"#,
        }
    });
    std::fs::write(&store_path, stored.to_string()).unwrap();

    let output = run(&store_path, &["list", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["pending"][0]["text"], "Buy milk");
    assert_eq!(value["pending"][0]["createdAt"], "2025-12-20T00:00:00Z");
    assert_eq!(value["finished"][0]["text"], "Pay rent");
    assert_eq!(value["finished"][0]["finishedAt"], "2025-12-19T08:00:00Z");
}
