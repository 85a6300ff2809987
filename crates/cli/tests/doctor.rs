use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn doctor_uses_defaults_without_config() {
    let tmp = tempdir().unwrap();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rvars"));
    cmd.env("XDG_CONFIG_HOME", tmp.path()); // empty dir → defaults
    cmd.arg("doctor");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OK   rvars doctor"))
        .stdout(predicate::str::contains("engine: path"))
        .stdout(predicate::str::contains("strict: true"));
}

#[test]
fn doctor_reads_default_location() {
    let tmp = tempdir().unwrap();
    let cfg_dir = tmp.path().join("rendervars");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(
        cfg_dir.join("config.toml"),
        "version = 1\n[scripting]\nengine = \"lua\"\nmemory_limit = 1024\n",
    )
    .unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rvars"));
    cmd.env("XDG_CONFIG_HOME", tmp.path());
    cmd.arg("doctor");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("engine: lua"))
        .stdout(predicate::str::contains("memory_limit: 1024"));
}

#[test]
fn doctor_fails_when_explicit_config_missing() {
    let tmp = tempdir().unwrap();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rvars"));
    cmd.arg("--config").arg(tmp.path().join("missing.toml")).arg("doctor");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("FAIL rvars doctor"))
        .stdout(predicate::str::contains("config file not found"));
}

#[test]
fn doctor_fails_on_bad_version() {
    let tmp = tempdir().unwrap();
    let config = tmp.path().join("config.toml");
    fs::write(&config, "version = 2\n").unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rvars"));
    cmd.arg("--config").arg(&config).arg("doctor");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("FAIL rvars doctor"))
        .stdout(predicate::str::contains("version 2 is unsupported"));
}
