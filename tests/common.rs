#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub const ALICE: &str = "alice@example.com";
pub const BOB: &str = "bob@example.com";

/// Binary under test, with HOME pointed at a scratch directory so the real
/// configuration file is never read or written.
pub fn rts() -> Command {
    let mut home: PathBuf = env::temp_dir();
    home.push("rtimesheet_test_home");
    fs::create_dir_all(&home).ok();

    let mut cmd = cargo_bin_cmd!("rtimesheet");
    cmd.env("HOME", &home).env_remove("GITHUB_TOKEN");
    cmd
}

/// `rtimesheet --db <db> --user <email> ...`
pub fn rts_as(db_path: &str, email: &str) -> Command {
    let mut cmd = rts();
    cmd.args(["--db", db_path, "--user", email]);
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rtimesheet.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Fresh database with two registered users, Alice and Bob.
pub fn init_with_users(name: &str) -> String {
    let db_path = setup_test_db(name);

    rts()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    for (user, email) in [("Alice", ALICE), ("Bob", BOB)] {
        rts()
            .args(["--db", &db_path, "user", "add", user, email])
            .assert()
            .success();
    }

    db_path
}

/// Alice owns client #1 (EUR, 80/h) and project #1 billed to it.
pub fn init_with_project(name: &str) -> String {
    let db_path = init_with_users(name);

    rts_as(&db_path, ALICE)
        .args(["client", "add", "Acme", "--currency", "EUR", "--rate", "80"])
        .assert()
        .success();

    rts_as(&db_path, ALICE)
        .args(["project", "add", "Website", "--client", "1"])
        .assert()
        .success();

    db_path
}
