use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const CITY_HALL: &str = "107.6098,-6.9175";
const GEDUNG_SATE: &str = "107.6191,-6.9025";

fn pinmap(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pinmap").unwrap();
    cmd.current_dir(dir)
        .env_remove("PINMAP_POSITION")
        .env_remove("PINMAP_STORAGE")
        .env_remove("RUST_LOG")
        .arg("--storage")
        .arg(dir.join("local-storage.json"));
    cmd
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    serde_json::from_slice(&output.stdout).unwrap()
}

fn seed(dir: &Path) {
    pinmap(dir).args(["save", "A", "--at", CITY_HALL]).assert().success();
    pinmap(dir).args(["save", "B", "--at", GEDUNG_SATE]).assert().success();
}

#[test]
fn test_help() {
    Command::cargo_bin("pinmap")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("nearest"));
}

#[test]
fn test_save_then_list() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());

    let list = json_stdout(pinmap(dir.path()).args(["--format", "json", "list"]));
    let entries = list.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["name"], "B");
    assert_eq!(entries[1]["coordinate"][0], 107.6191);
    assert_eq!(entries[1]["coordinate"][1], -6.9025);

    pinmap(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved locations"))
        .stdout(predicate::str::contains("2 locations"));
}

#[test]
fn test_storage_file_layout() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());

    let raw = std::fs::read_to_string(dir.path().join("local-storage.json")).unwrap();
    let items: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let locations: serde_json::Value =
        serde_json::from_str(items["locations"].as_str().unwrap()).unwrap();

    assert_eq!(locations[0]["name"], "A");
    assert!(locations[0]["content"].as_str().unwrap().contains("<strong>A</strong>"));
}

#[test]
fn test_save_rejects_blank_name() {
    let dir = TempDir::new().unwrap();

    pinmap(dir.path())
        .args(["save", "   ", "--at", CITY_HALL])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("must not be empty"));
}

#[test]
fn test_save_rejects_bad_coordinate() {
    let dir = TempDir::new().unwrap();

    pinmap(dir.path())
        .args(["save", "Nowhere", "--at", "200,100"])
        .assert()
        .failure();
    assert!(!dir.path().join("local-storage.json").exists());
}

#[test]
fn test_nearest_from_position() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());

    let outcome = json_stdout(pinmap(dir.path()).args([
        "--format",
        "json",
        "nearest",
        "--from",
        "107.61,-6.915",
    ]));

    assert_eq!(outcome["outcome"], "found");
    assert_eq!(outcome["name"], "A");
    assert_eq!(outcome["index"], 0);
    let km = outcome["distance_km"].as_f64().unwrap();
    assert!((km - 0.279).abs() < 0.01, "got {km}");
}

#[test]
fn test_nearest_position_from_env() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());

    pinmap(dir.path())
        .env("PINMAP_POSITION", "107.62,-6.90")
        .arg("nearest")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nearest location found"))
        .stdout(predicate::str::contains("B"));
}

#[test]
fn test_nearest_without_position() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());

    let output = pinmap(dir.path())
        .args(["--format", "json", "nearest"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(5));
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["outcome"], "location_unavailable");
}

#[test]
fn test_nearest_empty_store() {
    let dir = TempDir::new().unwrap();

    pinmap(dir.path())
        .args(["nearest", "--from", CITY_HALL])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved locations"));
}

#[test]
fn test_nearby_ranks_by_distance() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());

    let ranked = json_stdout(pinmap(dir.path()).args([
        "--format",
        "json",
        "nearby",
        "--from",
        GEDUNG_SATE,
    ]));
    let ranked = ranked.as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["name"], "B");
    assert_eq!(ranked[1]["name"], "A");

    let within = json_stdout(pinmap(dir.path()).args([
        "--format",
        "json",
        "nearby",
        "--from",
        GEDUNG_SATE,
        "--radius",
        "1",
    ]));
    assert_eq!(within.as_array().unwrap().len(), 1);
}

#[test]
fn test_click_prompts_until_named() {
    let dir = TempDir::new().unwrap();

    pinmap(dir.path())
        .args(["click", "11979068.1", "-771930.2"])
        .write_stdin("\nCity Hall\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Enter a location name"))
        .stdout(predicate::str::contains("Nothing was entered!"))
        .stdout(predicate::str::contains("Saved!"));

    let list = json_stdout(pinmap(dir.path()).args(["--format", "json", "list"]));
    let coordinate = &list[0]["coordinate"];
    assert!((coordinate[0].as_f64().unwrap() - 107.6098).abs() < 1e-4);
    assert!((coordinate[1].as_f64().unwrap() + 6.9175).abs() < 1e-4);
}

#[test]
fn test_click_cancelled_on_end_of_input() {
    let dir = TempDir::new().unwrap();

    pinmap(dir.path())
        .args(["click", "0", "0"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing saved"));
    assert!(!dir.path().join("local-storage.json").exists());
}

#[test]
fn test_show_details() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());

    pinmap(dir.path())
        .args(["show", "B"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Location details"))
        .stdout(predicate::str::contains("-6.90250, 107.61910"));

    pinmap(dir.path()).args(["show", "C"]).assert().code(2);
}

#[test]
fn test_distance_between_points() {
    let dir = TempDir::new().unwrap();

    let result = json_stdout(pinmap(dir.path()).args([
        "--format",
        "json",
        "distance",
        CITY_HALL,
        GEDUNG_SATE,
    ]));
    let km = result["distance_km"].as_f64().unwrap();
    assert!((km - 1.96).abs() < 0.05, "got {km}");
}

#[test]
fn test_distance_between_saved_names() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());

    pinmap(dir.path())
        .args(["distance", "A", "B"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.96 km"));
}

#[test]
fn test_project_and_unproject() {
    let dir = TempDir::new().unwrap();

    let projected = json_stdout(pinmap(dir.path()).args(["--format", "json", "project", CITY_HALL]));
    assert!((projected["x"].as_f64().unwrap() - 11_979_068.1).abs() < 1.0);
    assert!((projected["y"].as_f64().unwrap() + 771_930.2).abs() < 1.0);

    pinmap(dir.path())
        .args(["unproject", "11979068.1", "-771930.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-6.91750, 107.60980"));
}

#[test]
fn test_malformed_storage_starts_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("local-storage.json"), "not json").unwrap();

    let list = json_stdout(pinmap(dir.path()).args(["--format", "json", "list"]));
    assert_eq!(list, serde_json::json!([]));

    pinmap(dir.path()).args(["save", "A", "--at", CITY_HALL]).assert().success();
    let list = json_stdout(pinmap(dir.path()).args(["--format", "json", "list"]));
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[test]
fn test_malformed_locations_value_starts_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("local-storage.json"),
        r#"{"locations": "{not an array"}"#,
    )
    .unwrap();

    pinmap(dir.path())
        .args(["nearest", "--from", CITY_HALL])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved locations"));
}

#[test]
fn test_damaged_entry_does_not_hide_the_rest() {
    let dir = TempDir::new().unwrap();
    let locations = r#"[{"name":"A","coordinate":[107.6098,-6.9175]},{"name":"bad","coordinate":[107.6,null]},{"name":"text","coordinate":"107.6,-6.9"}]"#;
    let storage = serde_json::json!({ "locations": locations });
    std::fs::write(dir.path().join("local-storage.json"), storage.to_string()).unwrap();

    let outcome = json_stdout(pinmap(dir.path()).args([
        "--format",
        "json",
        "nearest",
        "--from",
        "107.61,-6.915",
    ]));
    assert_eq!(outcome["outcome"], "found");
    assert_eq!(outcome["name"], "A");

    pinmap(dir.path()).args(["save", "C", "--at", GEDUNG_SATE]).assert().success();

    let list = json_stdout(pinmap(dir.path()).args(["--format", "json", "list"]));
    let entries = list.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["name"], "A");
    assert_eq!(entries[1]["coordinate"], serde_json::json!([107.6, null]));
    assert_eq!(entries[2]["coordinate"], "107.6,-6.9");
    assert_eq!(entries[3]["name"], "C");
}

#[test]
fn test_config_position_and_key() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".pinmap.toml"),
        "[storage]\nkey = \"pins\"\n\n[geolocation]\nposition = [107.62, -6.90]\n",
    )
    .unwrap();
    seed(dir.path());

    let outcome = json_stdout(pinmap(dir.path()).args(["--format", "json", "nearest"]));
    assert_eq!(outcome["name"], "B");

    let raw = std::fs::read_to_string(dir.path().join("local-storage.json")).unwrap();
    assert!(raw.contains("\"pins\""));
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();

    pinmap(dir.path())
        .args(["--config", "missing.toml", "list"])
        .assert()
        .code(3);
}
