use predicates::str::contains;

mod common;
use common::{ALICE, BOB, init_with_project, init_with_users, rts, rts_as, setup_test_db};

#[test]
fn test_init_creates_database() {
    let db_path = setup_test_db("cli_init");

    rts()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(std::path::Path::new(&db_path).exists());
}

#[test]
fn test_user_add_and_list() {
    let db_path = init_with_users("cli_users");

    rts()
        .args(["--db", &db_path, "user", "list"])
        .assert()
        .success()
        .stdout(contains(ALICE))
        .stdout(contains(BOB));
}

#[test]
fn test_duplicate_email_is_a_validation_error() {
    let db_path = init_with_users("cli_dup_user");

    rts()
        .args(["--db", &db_path, "user", "add", "Other", ALICE])
        .assert()
        .code(2)
        .stderr(contains("already registered"));
}

#[test]
fn test_command_without_acting_user_fails() {
    let db_path = init_with_users("cli_no_user");

    rts()
        .args(["--db", &db_path, "client", "list"])
        .assert()
        .code(1)
        .stderr(contains("No active user"));
}

#[test]
fn test_unknown_user_is_not_found() {
    let db_path = init_with_users("cli_unknown_user");

    rts_as(&db_path, "nobody@example.com")
        .args(["client", "list"])
        .assert()
        .code(4);
}

#[test]
fn test_missing_project_exits_with_not_found() {
    let db_path = init_with_users("cli_missing_project");

    rts_as(&db_path, ALICE)
        .args(["project", "show", "99"])
        .assert()
        .code(4);
}

#[test]
fn test_foreign_project_is_forbidden() {
    let db_path = init_with_project("cli_forbidden");

    rts_as(&db_path, BOB)
        .args(["project", "show", "1"])
        .assert()
        .code(3);

    rts_as(&db_path, BOB)
        .args(["task", "add", "1", "Sneaky"])
        .assert()
        .code(3);
}

#[test]
fn test_client_name_is_required() {
    let db_path = init_with_users("cli_client_blank");

    rts_as(&db_path, ALICE)
        .args(["client", "add", "  "])
        .assert()
        .code(2);
}

#[test]
fn test_project_inherits_client_currency_and_rate() {
    let db_path = init_with_project("cli_project_defaults");

    rts_as(&db_path, ALICE)
        .args(["project", "show", "1"])
        .assert()
        .success()
        .stdout(contains("EUR"))
        .stdout(contains("80.00"));
}

#[test]
fn test_archived_projects_are_hidden_by_default() {
    let db_path = init_with_project("cli_archive");

    rts_as(&db_path, ALICE)
        .args(["project", "archive", "1"])
        .assert()
        .success();

    rts_as(&db_path, ALICE)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(contains("No projects found"));

    rts_as(&db_path, ALICE)
        .args(["project", "list", "--archived"])
        .assert()
        .success()
        .stdout(contains("Website"));
}

#[test]
fn test_bad_date_is_rejected() {
    let db_path = init_with_project("cli_bad_date");

    rts_as(&db_path, ALICE)
        .args(["task", "add", "1", "Report", "--due", "2025-13-40"])
        .assert()
        .code(2);
}

#[test]
fn test_log_print_shows_audit_rows() {
    let db_path = init_with_project("cli_log");

    rts()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("migration_applied"))
        .stdout(contains("project_add"));
}

#[test]
fn test_db_check_and_info() {
    let db_path = init_with_users("cli_db");

    rts()
        .args(["--db", &db_path, "db", "--check", "--info"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"))
        .stdout(contains("users"));
}
