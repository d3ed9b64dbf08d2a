use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{ALICE, BOB, init_with_project, rts_as, temp_out};

fn log_time(db: &str, email: &str, start: &str, end: &str) {
    rts_as(db, email)
        .args(["time", "add", "1", "--start", start, "--end", end])
        .assert()
        .success();
}

#[test]
fn test_owner_time_is_approved_and_invoiced() {
    let db = init_with_project("wf_owner_invoice");

    log_time(&db, ALICE, "2025-09-01 09:00", "2025-09-01 11:30");

    rts_as(&db, ALICE)
        .args(["time", "list"])
        .assert()
        .success()
        .stdout(contains("approved"))
        .stdout(contains("200.00 EUR"));

    rts_as(&db, ALICE)
        .args(["invoice", "create", "1", "--issued", "2025-10-01"])
        .assert()
        .success()
        .stdout(contains("INV-2025-0001"))
        .stdout(contains("200.00 EUR"));

    // billed logs are not billed twice
    rts_as(&db, ALICE)
        .args(["invoice", "create", "1", "--issued", "2025-10-02"])
        .assert()
        .code(2);
}

#[test]
fn test_invoice_tax_and_discount() {
    let db = init_with_project("wf_invoice_totals");

    log_time(&db, ALICE, "2025-09-01 09:00", "2025-09-01 10:00");

    rts_as(&db, ALICE)
        .args([
            "invoice", "create", "1", "--tax", "20", "--discount", "10", "--issued", "2025-10-01",
        ])
        .assert()
        .success()
        // (80 - 10) * 1.2
        .stdout(contains("84.00 EUR"));
}

#[test]
fn test_discount_above_subtotal_is_rejected() {
    let db = init_with_project("wf_invoice_discount");

    log_time(&db, ALICE, "2025-09-01 09:00", "2025-09-01 10:00");

    rts_as(&db, ALICE)
        .args(["invoice", "create", "1", "--discount", "500"])
        .assert()
        .code(2)
        .stderr(contains("discount"));
}

#[test]
fn test_member_time_needs_approval_before_billing() {
    let db = init_with_project("wf_member_approval");

    rts_as(&db, ALICE)
        .args(["team", "add", BOB, "--rate", "50"])
        .assert()
        .success();
    rts_as(&db, ALICE)
        .args(["project", "member-add", "1", BOB])
        .assert()
        .success();

    log_time(&db, BOB, "2025-09-02 09:00", "2025-09-02 11:00");

    rts_as(&db, BOB)
        .args(["time", "list", "--mine"])
        .assert()
        .success()
        .stdout(contains("pending"))
        .stdout(contains("100.00 EUR"));

    rts_as(&db, ALICE)
        .args(["invoice", "create", "1"])
        .assert()
        .code(2);

    // members cannot approve
    rts_as(&db, BOB)
        .args(["time", "approve", "1"])
        .assert()
        .code(3);

    rts_as(&db, ALICE)
        .args(["time", "approve", "1"])
        .assert()
        .success();

    rts_as(&db, ALICE)
        .args(["invoice", "create", "1", "--issued", "2025-10-01"])
        .assert()
        .success()
        .stdout(contains("100.00 EUR"));
}

#[test]
fn test_end_before_start_is_rejected() {
    let db = init_with_project("wf_bad_interval");

    rts_as(&db, ALICE)
        .args([
            "time", "add", "1", "--start", "2025-09-01 11:00", "--end", "2025-09-01 10:00",
        ])
        .assert()
        .code(2)
        .stderr(contains("end_time"));
}

#[test]
fn test_single_running_timer() {
    let db = init_with_project("wf_timer");

    rts_as(&db, ALICE)
        .args(["time", "start", "1", "--at", "2025-09-01 09:00"])
        .assert()
        .success();

    rts_as(&db, ALICE)
        .args(["time", "start", "1"])
        .assert()
        .code(2)
        .stderr(contains("timer"));

    rts_as(&db, ALICE)
        .args(["time", "stop", "--at", "2025-09-01 09:45"])
        .assert()
        .success()
        .stdout(contains("00h 45m"));

    rts_as(&db, ALICE)
        .args(["time", "current"])
        .assert()
        .success()
        .stdout(contains("No timer is running"));
}

#[test]
fn test_weekly_task_recurs_once_per_day() {
    let db = init_with_project("wf_recur");

    rts_as(&db, ALICE)
        .args([
            "task", "add", "1", "Weekly report", "--due", "2025-09-01", "--recurring", "weekly",
        ])
        .assert()
        .success();

    rts_as(&db, ALICE)
        .args(["tasks", "recur", "--date", "2025-09-01"])
        .assert()
        .success()
        .stdout(contains("1 created"))
        .stdout(contains("2025-09-08"));

    rts_as(&db, ALICE)
        .args(["tasks", "recur", "--date", "2025-09-01"])
        .assert()
        .success()
        .stdout(contains("0 created, 1 already present"));

    rts_as(&db, ALICE)
        .args(["task", "list"])
        .assert()
        .success()
        .stdout(contains("2025-09-08"));
}

#[test]
fn test_recurring_task_needs_due_date() {
    let db = init_with_project("wf_recur_no_due");

    rts_as(&db, ALICE)
        .args(["task", "add", "1", "Standup", "--recurring", "daily"])
        .assert()
        .code(2)
        .stderr(contains("due_date"));
}

#[test]
fn test_member_can_only_assign_themselves() {
    let db = init_with_project("wf_assign");

    rts_as(&db, ALICE).args(["team", "add", BOB]).assert().success();
    rts_as(&db, ALICE)
        .args(["project", "member-add", "1", BOB])
        .assert()
        .success();

    rts_as(&db, BOB)
        .args(["task", "add", "1", "Fix bug", "--assign", ALICE])
        .assert()
        .code(2);

    rts_as(&db, BOB)
        .args(["task", "add", "1", "Fix bug", "--tag", "Bug Fix"])
        .assert()
        .success();

    rts_as(&db, BOB)
        .args(["task", "show", "1"])
        .assert()
        .success()
        .stdout(contains(BOB))
        .stdout(contains("bug-fix"));

    rts_as(&db, BOB)
        .args(["tag", "list", "--prefix", "bu"])
        .assert()
        .success()
        .stdout(contains("bug-fix"));
}

#[test]
fn test_export_time_logs_csv() {
    let db = init_with_project("wf_export_csv");
    let out = temp_out("wf_export_csv", "csv");

    log_time(&db, ALICE, "2025-09-01 09:00", "2025-09-01 11:30");
    log_time(&db, ALICE, "2025-10-01 09:00", "2025-10-01 10:00");

    rts_as(&db, ALICE)
        .args([
            "export", "time-logs", "--format", "csv", "--file", &out, "--range", "2025-09",
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&out).expect("read exported csv");
    assert!(content.starts_with("id,date,start,end,hours"));
    assert!(content.contains("2025-09-01"));
    assert!(!content.contains("2025-10-01"));
}

#[test]
fn test_export_time_logs_xlsx() {
    let db = init_with_project("wf_export_xlsx");
    let out = temp_out("wf_export_xlsx", "xlsx");

    log_time(&db, ALICE, "2025-09-01 09:00", "2025-09-01 11:30");
    log_time(&db, ALICE, "2025-09-02 14:00", "2025-09-02 15:00");

    rts_as(&db, ALICE)
        .args(["export", "time-logs", "--format", "xlsx", "--file", &out])
        .assert()
        .success()
        .stdout(contains("XLSX export completed"));

    let bytes = fs::read(&out).expect("read exported workbook");
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_empty_export_still_writes_headers() {
    let db = init_with_project("wf_export_empty");
    let out = temp_out("wf_export_empty", "csv");

    rts_as(&db, BOB)
        .args(["export", "clients", "--file", &out])
        .assert()
        .success();

    let content = fs::read_to_string(&out).expect("read exported csv");
    assert_eq!(content.lines().count(), 1);
    assert!(!content.contains("Acme"));
}

#[test]
fn test_export_requires_absolute_path() {
    let db = init_with_project("wf_export_relative");

    rts_as(&db, ALICE)
        .args(["export", "projects", "--format", "json", "--file", "out.json"])
        .assert()
        .code(2);
}

#[test]
fn test_export_projects_json() {
    let db = init_with_project("wf_export_json");
    let out = temp_out("wf_export_json", "json");

    rts_as(&db, ALICE)
        .args(["export", "projects", "--format", "json", "--file", &out])
        .assert()
        .success();

    let content = fs::read_to_string(&out).expect("read exported json");
    let parsed: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    assert_eq!(parsed.as_array().map(|a| a.len()), Some(1));
    assert!(content.contains("Website"));
    assert!(content.contains("Acme"));
}

#[test]
fn test_notes_are_private() {
    let db = init_with_project("wf_notes");

    rts_as(&db, ALICE)
        .args(["note", "add", "Kickoff", "--body", "Call Monday", "--project", "1"])
        .assert()
        .success();

    rts_as(&db, ALICE)
        .args(["note", "show", "1"])
        .assert()
        .success()
        .stdout(contains("Call Monday"));

    rts_as(&db, BOB).args(["note", "show", "1"]).assert().code(3);
    rts_as(&db, BOB)
        .args(["note", "list"])
        .assert()
        .success()
        .stdout(contains("No notes found"));
}

#[test]
fn test_project_chat_for_members_only() {
    let db = init_with_project("wf_chat");

    rts_as(&db, ALICE)
        .args(["chat", "send", "1", "Deploy at five"])
        .assert()
        .success();

    rts_as(&db, BOB)
        .args(["chat", "send", "1", "hi"])
        .assert()
        .code(3);

    rts_as(&db, ALICE).args(["team", "add", BOB]).assert().success();
    rts_as(&db, ALICE)
        .args(["project", "member-add", "1", BOB])
        .assert()
        .success();

    rts_as(&db, BOB)
        .args(["chat", "list", "1"])
        .assert()
        .success()
        .stdout(contains("Deploy at five").and(contains("Alice")));
}

#[test]
fn test_attachment_roundtrip() {
    let db = init_with_project("wf_attach");
    let src = temp_out("wf_attach_src", "txt");
    let dest = temp_out("wf_attach_dest", "txt");
    fs::write(&src, "price sheet").expect("write source");

    rts_as(&db, ALICE)
        .args(["task", "add", "1", "Design"])
        .assert()
        .success();

    rts_as(&db, ALICE)
        .args(["attach", "add", "1", &src])
        .assert()
        .success();

    rts_as(&db, ALICE)
        .args(["attach", "get", "1", "--file", &dest])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&dest).expect("read copy"), "price sheet");
}

#[test]
fn test_task_delete_warns_on_missing_attachment_file() {
    let db = init_with_project("wf_attach_missing");
    let src = temp_out("wf_attach_missing_src", "txt");
    fs::write(&src, "draft contract").expect("write source");

    rts_as(&db, ALICE)
        .args(["task", "add", "1", "Contract"])
        .assert()
        .success();
    rts_as(&db, ALICE)
        .args(["attach", "add", "1", &src])
        .assert()
        .success();

    let conn = rusqlite::Connection::open(&db).expect("open db");
    let stored: String = conn
        .query_row("SELECT stored_path FROM attachments WHERE id = 1", [], |r| r.get(0))
        .expect("stored path");
    drop(conn);
    fs::remove_file(&stored).expect("remove stored copy");

    rts_as(&db, ALICE)
        .args(["task", "del", "1"])
        .assert()
        .success()
        .stdout(contains("not removed").and(contains("Task #1 deleted")));
}

#[test]
fn test_dashboard_json() {
    let db = init_with_project("wf_dashboard");

    log_time(&db, ALICE, "2025-09-01 09:00", "2025-09-01 11:00");

    let output = rts_as(&db, ALICE)
        .args(["dashboard", "--date", "2025-09-03", "--json"])
        .output()
        .expect("run dashboard");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let start = stdout.find('{').expect("json object");
    let stats: serde_json::Value = serde_json::from_str(&stdout[start..]).expect("valid json");

    assert_eq!(stats["clients"], 1);
    assert_eq!(stats["active_projects"], 1);
    assert_eq!(stats["totals"][0]["currency"], "EUR");
    assert_eq!(stats["totals"][0]["unpaid"]["amount"], 160.0);
    assert_eq!(stats["trend"].as_array().map(|t| t.len()), Some(7));
}
