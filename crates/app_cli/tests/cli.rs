#![allow(deprecated)]

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd(temp: &TempDir) -> assert_cmd::Command {
    let mut c = assert_cmd::Command::cargo_bin("pinboard").unwrap();
    c.env("PINBOARD_DATA_DIR", temp.path()).env_remove("RUST_LOG");
    c
}

/// Pre-seed a config so tests skip the modelled network delay.
fn write_config(temp: &TempDir, backend: &str) {
    let dir = temp.path().join("config");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("config.json"),
        format!(
            r#"{{"schema_version":1,"storage":{{"backend":"{backend}","latency_ms":0}},"log_filter":"debug"}}"#
        ),
    )
    .unwrap();
}

fn add(temp: &TempDir, args: &[&str]) -> String {
    let out = cmd(temp)
        .arg("add")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8_lossy(&out)
        .trim()
        .strip_prefix("Created note ")
        .expect("created line")
        .to_string()
}

fn list(temp: &TempDir, args: &[&str]) -> Vec<String> {
    let out = cmd(temp)
        .arg("list")
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8_lossy(&out)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn new_notes_are_listed_first() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "sqlite");
    let milk = add(&temp, &["buy", "milk", "--tags", "home"]);
    let dog = add(&temp, &["walk dog"]);

    let lines = list(&temp, &[]);
    assert_eq!(
        lines,
        vec![format!("- {dog} walk dog"), format!("- {milk} buy milk [home]")]
    );
    assert!(temp.path().join("pinboard.db").exists());
}

#[test]
fn pin_moves_note_to_top_and_back() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "json_file");
    let a = add(&temp, &["A"]);
    let b = add(&temp, &["B"]);
    let c = add(&temp, &["C"]);

    cmd(&temp)
        .args(["pin", &a])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Pinned note {a}")));
    let lines = list(&temp, &[]);
    assert_eq!(lines[0], format!("* {a} A"));
    assert_eq!(lines[1], format!("- {c} C"));
    assert_eq!(lines[2], format!("- {b} B"));

    cmd(&temp)
        .args(["pin", &a])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Unpinned note {a}")));
    let lines = list(&temp, &[]);
    assert_eq!(lines[0], format!("- {a} A"));
}

#[test]
fn search_and_tag_filters_combine() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "sqlite");
    add(&temp, &["Buy Milk", "--tags", "home"]);
    add(&temp, &["Walk dog", "--tags", "home work"]);
    add(&temp, &["Milk report", "--tags", "work"]);

    let lines = list(&temp, &["-s", "milk"]);
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.to_lowercase().contains("milk")));

    let lines = list(&temp, &["-t", "work"]);
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.contains("work")));

    let lines = list(&temp, &["-s", "milk", "-t", "work"]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Milk report"));

    let lines = list(&temp, &["-s", "nothing-like-this"]);
    assert_eq!(lines, vec!["No notes."]);
}

#[test]
fn invalid_pattern_matches_literally() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "sqlite");
    add(&temp, &["price (usd"]);
    add(&temp, &["other"]);

    cmd(&temp)
        .args(["list", "-s", "(usd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("price (usd"))
        .stdout(predicate::str::contains("other").not())
        .stderr(predicate::str::contains("plain text"));
}

#[test]
fn edit_moves_note_and_replaces_fields() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "sqlite");
    let first = add(&temp, &["first", "--tags", "old"]);
    let second = add(&temp, &["second"]);

    cmd(&temp)
        .args(["edit", &first, "--tags", "new tags"])
        .assert()
        .success();
    let lines = list(&temp, &[]);
    assert_eq!(
        lines,
        vec![
            format!("- {first} first [new tags]"),
            format!("- {second} second")
        ]
    );

    cmd(&temp).args(["edit", &first]).assert().failure();
}

#[test]
fn missing_ids_are_reported() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "sqlite");
    add(&temp, &["only"]);

    for args in [
        vec!["delete", "42"],
        vec!["pin", "42"],
        vec!["edit", "42", "--text", "x"],
    ] {
        cmd(&temp)
            .args(&args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Note 42 not found"));
    }
    assert_eq!(list(&temp, &[]).len(), 1);
}

#[test]
fn delete_removes_note() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "sqlite");
    let keep = add(&temp, &["keep"]);
    let drop = add(&temp, &["drop"]);

    cmd(&temp).args(["delete", &drop]).assert().success();
    assert_eq!(list(&temp, &[]), vec![format!("- {keep} keep")]);
}

#[test]
fn tags_lists_counts() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "sqlite");
    cmd(&temp)
        .arg("tags")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tags."));

    add(&temp, &["a", "--tags", "home work"]);
    add(&temp, &["b", "--tags", "work"]);
    cmd(&temp)
        .arg("tags")
        .assert()
        .success()
        .stdout(predicate::str::contains("work 2"))
        .stdout(predicate::str::contains("home 1"));
}

#[test]
fn corrupted_store_is_treated_as_empty() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "json_file");
    fs::write(temp.path().join("notes.json"), "{\"oops\": true}").unwrap();

    assert_eq!(list(&temp, &[]), vec!["No notes."]);

    let id = add(&temp, &["fresh start"]);
    assert_eq!(list(&temp, &[]), vec![format!("- {id} fresh start")]);
}

#[test]
fn binary_store_is_treated_as_empty() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "json_file");
    fs::write(temp.path().join("notes.json"), [0xff, 0xfe, b'[', b']']).unwrap();

    cmd(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No notes."))
        .stderr(predicate::str::is_empty());
}

#[test]
fn default_config_is_written_on_first_run() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).arg("tags").assert().success();
    let raw = fs::read_to_string(temp.path().join("config").join("config.json")).unwrap();
    assert!(raw.contains("\"latency_ms\": 100"));
    assert!(temp.path().join("logs").exists());
}

#[test]
fn path_prints_data_dir() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains(temp.path().to_string_lossy().to_string()));
    assert!(!temp.path().join("config").exists());
    assert!(!temp.path().join("pinboard.db").exists());
}
