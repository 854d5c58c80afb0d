use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Run keyring-sync with given args.
fn keyring_sync() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("keyring-sync");
    cmd.env_remove("KEYRING_SYNC_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// Write a config whose store lives in `dir` and whose keys are `entries`.
fn write_config(dir: &assert_fs::TempDir, entries: &[(&str, String)]) {
    let scratch = dir.child("scratch");
    scratch.create_dir_all().unwrap();

    let mut config = format!(
        "[keyring]\npath = \"{}\"\nscratch_dir = \"{}\"\ngpg = \"/nonexistent/bin/gpg\"\n",
        dir.child("store.gpg").path().display(),
        scratch.path().display(),
    );
    for (id, url) in entries {
        config.push_str(&format!("\n[[keys]]\nid = \"{id}\"\nurl = \"{url}\"\n"));
    }
    dir.child("keyring-sync.toml").write_str(&config).unwrap();
}

fn file_url(dir: &assert_fs::TempDir, name: &str) -> String {
    format!("file://{}", dir.child(name).path().display())
}

fn scratch_is_empty(dir: &assert_fs::TempDir) -> bool {
    std::fs::read_dir(dir.child("scratch").path())
        .unwrap()
        .next()
        .is_none()
}

// ─── init ───────────────────────────────────────────────────────

#[test]
fn init_writes_sample_config() {
    let dir = assert_fs::TempDir::new().unwrap();

    keyring_sync()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote keyring-sync.toml"));

    dir.child("keyring-sync.toml")
        .assert(predicate::str::contains("sentinel = \"CURRENT\""));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("keyring-sync.toml").write_str("# mine\n").unwrap();

    keyring_sync()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    dir.child("keyring-sync.toml").assert("# mine\n");

    keyring_sync()
        .current_dir(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();

    dir.child("keyring-sync.toml")
        .assert(predicate::str::contains("[[keys]]"));
}

// ─── configuration errors ───────────────────────────────────────

#[test]
fn missing_config_fails() {
    let dir = assert_fs::TempDir::new().unwrap();

    keyring_sync()
        .current_dir(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn invalid_key_id_in_config_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    write_config(&dir, &[("ABC123", "https://keys.example.org/k.asc".into())]);

    keyring_sync()
        .current_dir(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid key ID 'ABC123'"));
}

#[test]
fn config_flag_points_elsewhere() {
    let dir = assert_fs::TempDir::new().unwrap();
    write_config(&dir, &[("CURRENT", "https://keys.example.org/CURRENT.public".into())]);
    let other = assert_fs::TempDir::new().unwrap();

    keyring_sync()
        .current_dir(other.path())
        .arg("--config")
        .arg(dir.child("keyring-sync.toml").path())
        .arg("check")
        .assert()
        .success();
}

// ─── check ──────────────────────────────────────────────────────

#[test]
fn check_on_missing_store_needs_import_without_gpg() {
    let dir = assert_fs::TempDir::new().unwrap();
    write_config(
        &dir,
        &[
            ("CURRENT", "https://keys.example.org/CURRENT.public".into()),
            (
                "D75CEA17048B9ACBF186794B32637D44F14F620E",
                "https://keys.example.org/keyring.gpg".into(),
            ),
        ],
    );

    keyring_sync()
        .current_dir(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("CURRENT: always refreshed"))
        .stdout(predicate::str::contains(
            "D75CEA17048B9ACBF186794B32637D44F14F620E: needs import",
        ))
        .stdout(predicate::str::contains("2 of 2 key(s) would be fetched"));

    dir.child("store.gpg").assert(predicate::path::missing());
    assert!(scratch_is_empty(&dir));
}

// ─── import failures (no gpg required) ──────────────────────────

#[test]
fn import_fetch_failure_fails_and_cleans_up() {
    let dir = assert_fs::TempDir::new().unwrap();
    write_config(&dir, &[("CURRENT", file_url(&dir, "missing.asc"))]);

    keyring_sync()
        .current_dir(dir.path())
        .arg("import")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not fetch"))
        .stderr(predicate::str::contains("1 of 1 key(s) failed to import"));

    dir.child("store.gpg").assert(predicate::path::missing());
    assert!(scratch_is_empty(&dir));
}

#[test]
fn import_malformed_artifact_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("error.html")
        .write_str("<!DOCTYPE html><html><body>404</body></html>")
        .unwrap();
    write_config(&dir, &[("CURRENT", file_url(&dir, "error.html"))]);

    keyring_sync()
        .current_dir(dir.path())
        .arg("import")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is malformed"));

    dir.child("store.gpg").assert(predicate::path::missing());
    assert!(scratch_is_empty(&dir));
}

#[test]
fn import_truncated_armor_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("key.asc")
        .write_str("-----BEGIN PGP PUBLIC KEY BLOCK-----\n\nmQINBF\n")
        .unwrap();
    write_config(&dir, &[("CURRENT", file_url(&dir, "key.asc"))]);

    keyring_sync()
        .current_dir(dir.path())
        .arg("import")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no END line"));

    assert!(scratch_is_empty(&dir));
}

#[test]
fn import_stops_at_first_failure_by_default() {
    let dir = assert_fs::TempDir::new().unwrap();
    write_config(
        &dir,
        &[
            ("DEADBEEF", file_url(&dir, "a.gpg")),
            ("CAFEBABE", file_url(&dir, "b.gpg")),
        ],
    );

    let output = keyring_sync()
        .current_dir(dir.path())
        .args(["import", "--format", "json"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["failed"], 1);
    assert_eq!(report["changed"], false);
    assert_eq!(report["results"].as_array().unwrap().len(), 1);
    assert_eq!(report["results"][0]["id"], "DEADBEEF");
    assert_eq!(report["results"][0]["status"], "failed");
}

#[test]
fn import_keep_going_reports_every_record() {
    let dir = assert_fs::TempDir::new().unwrap();
    write_config(
        &dir,
        &[
            ("DEADBEEF", file_url(&dir, "a.gpg")),
            ("CAFEBABE", file_url(&dir, "b.gpg")),
        ],
    );

    let output = keyring_sync()
        .current_dir(dir.path())
        .args(["import", "--keep-going", "--format", "json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 of 2 key(s) failed to import"))
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["failed"], 2);
    let results = report["results"].as_array().unwrap();
    assert_eq!(results[1]["id"], "CAFEBABE");
    assert!(
        results[1]["error"]
            .as_str()
            .unwrap()
            .contains("Could not fetch")
    );
}

#[test]
fn import_key_selection_must_be_configured() {
    let dir = assert_fs::TempDir::new().unwrap();
    write_config(&dir, &[("CURRENT", file_url(&dir, "k.asc"))]);

    keyring_sync()
        .current_dir(dir.path())
        .args(["import", "--key", "DEADBEEF"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key 'DEADBEEF' is not configured"));
}

#[test]
fn import_selected_key_only() {
    let dir = assert_fs::TempDir::new().unwrap();
    write_config(
        &dir,
        &[
            ("DEADBEEF", file_url(&dir, "a.gpg")),
            ("CAFEBABE", file_url(&dir, "b.gpg")),
        ],
    );

    let output = keyring_sync()
        .current_dir(dir.path())
        .args(["import", "--key", "0xcafebabe", "--format", "json"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "CAFEBABE");
}

#[test]
fn list_on_missing_store_warns() {
    let dir = assert_fs::TempDir::new().unwrap();
    write_config(&dir, &[("CURRENT", file_url(&dir, "k.asc"))]);

    keyring_sync()
        .current_dir(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No keys in"));
}
