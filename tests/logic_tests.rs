//! Library-level tests on an in-memory database.

use chrono::NaiveDate;
use rtimesheet::config::Config;
use rtimesheet::core::auth::Actor;
use rtimesheet::core::chat::ChatLogic;
use rtimesheet::core::client::ClientLogic;
use rtimesheet::core::dashboard::DashboardLogic;
use rtimesheet::core::invoice::InvoiceLogic;
use rtimesheet::core::project::ProjectLogic;
use rtimesheet::core::recur::RecurLogic;
use rtimesheet::core::task::TaskLogic;
use rtimesheet::core::team::TeamLogic;
use rtimesheet::core::timelog::{TimeLogLogic, resolve_rate};
use rtimesheet::core::tracker::{IssueTracker, TrackerLogic};
use rtimesheet::core::user::UserLogic;
use rtimesheet::db::invoices::next_sequence;
use rtimesheet::db::log::load_log;
use rtimesheet::db::pool::DbPool;
use rtimesheet::db::tasks::TaskFilter;
use rtimesheet::errors::{AppError, AppResult};
use rtimesheet::models::client::ClientInput;
use rtimesheet::models::invoice::{InvoiceInput, InvoiceStatus};
use rtimesheet::models::project::ProjectInput;
use rtimesheet::models::task::{TaskInput, TaskStatus};
use rtimesheet::models::time_log::{ApprovalStatus, TimeLogInput};
use rtimesheet::models::tracker::{ExternalIssue, Provider};
use rtimesheet::utils::time::parse_datetime;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn actor(pool: &mut DbPool, name: &str, email: &str) -> Actor {
    Actor {
        user: UserLogic::register(pool, name, email).unwrap(),
    }
}

struct Fixture {
    pool: DbPool,
    alice: Actor,
    bob: Actor,
    client_id: i64,
    project_id: i64,
}

/// Alice owns an EUR client at 80/h and a project billed to it.
fn fixture() -> Fixture {
    let mut pool = DbPool::in_memory().unwrap();
    let cfg = Config::default();
    let alice = actor(&mut pool, "Alice", "alice@example.com");
    let bob = actor(&mut pool, "Bob", "bob@example.com");

    let client = ClientLogic::create(
        &mut pool,
        &cfg,
        &alice,
        &ClientInput {
            name: Some("Acme".into()),
            currency: Some("EUR".into()),
            hourly_rate: Some(80.0),
            ..Default::default()
        },
    )
    .unwrap();

    let project = ProjectLogic::create(
        &mut pool,
        &cfg,
        &alice,
        &ProjectInput {
            name: Some("Website".into()),
            client_id: Some(client.id),
            ..Default::default()
        },
    )
    .unwrap();

    Fixture {
        pool,
        alice,
        bob,
        client_id: client.id,
        project_id: project.id,
    }
}

fn interval(start: &str, end: &str) -> TimeLogInput {
    TimeLogInput {
        start_time: parse_datetime(start),
        end_time: parse_datetime(end),
        ..Default::default()
    }
}

fn join_project(f: &mut Fixture, team_rate: Option<f64>, member_rate: Option<f64>) {
    TeamLogic::add(&mut f.pool, &f.alice, "bob@example.com", team_rate).unwrap();
    ProjectLogic::add_member(&mut f.pool, &f.alice, f.project_id, "bob@example.com", member_rate)
        .unwrap();
}

#[test]
fn test_rate_precedence() {
    let mut f = fixture();
    let (project, _) = ProjectLogic::get(&mut f.pool, &f.alice, f.project_id).unwrap();

    assert_eq!(resolve_rate(&f.pool.conn, &project, f.alice.id()).unwrap(), 80.0);

    join_project(&mut f, Some(50.0), None);
    assert_eq!(resolve_rate(&f.pool.conn, &project, f.bob.id()).unwrap(), 50.0);

    ProjectLogic::add_member(&mut f.pool, &f.alice, f.project_id, "bob@example.com", Some(65.0))
        .unwrap();
    assert_eq!(resolve_rate(&f.pool.conn, &project, f.bob.id()).unwrap(), 65.0);
}

#[test]
fn test_rate_is_snapshotted_on_the_log() {
    let mut f = fixture();
    let log = TimeLogLogic::add(
        &mut f.pool,
        &f.alice,
        f.project_id,
        &interval("2025-09-01 09:00", "2025-09-01 10:00"),
    )
    .unwrap();

    ProjectLogic::update(
        &mut f.pool,
        &f.alice,
        f.project_id,
        &ProjectInput {
            hourly_rate: Some(120.0),
            ..Default::default()
        },
    )
    .unwrap();

    let reloaded = TimeLogLogic::get(&mut f.pool, &f.alice, log.id).unwrap();
    assert_eq!(reloaded.hourly_rate, 80.0);
    assert_eq!(reloaded.duration_minutes, Some(60));
}

#[test]
fn test_member_edit_resets_approval() {
    let mut f = fixture();
    join_project(&mut f, None, None);

    let log = TimeLogLogic::add(
        &mut f.pool,
        &f.bob,
        f.project_id,
        &interval("2025-09-01 09:00", "2025-09-01 10:00"),
    )
    .unwrap();
    assert_eq!(log.status, ApprovalStatus::Pending);

    TimeLogLogic::review(&mut f.pool, &f.alice, log.id, ApprovalStatus::Approved).unwrap();

    let edited = TimeLogLogic::edit(
        &mut f.pool,
        &f.bob,
        log.id,
        &TimeLogInput {
            description: Some("design review".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(edited.status, ApprovalStatus::Pending);
}

#[test]
fn test_cancelled_invoice_releases_logs() {
    let mut f = fixture();
    TimeLogLogic::add(
        &mut f.pool,
        &f.alice,
        f.project_id,
        &interval("2025-09-01 09:00", "2025-09-01 11:00"),
    )
    .unwrap();

    let input = InvoiceInput {
        issue_date: Some(day("2025-10-01")),
        ..Default::default()
    };
    let first = InvoiceLogic::create(&mut f.pool, &f.alice, f.client_id, &input).unwrap();
    assert_eq!(first.invoice.number, "INV-2025-0001");
    assert_eq!(first.invoice.total, 160.0);
    assert_eq!(first.items.len(), 1);

    let again = InvoiceLogic::create(&mut f.pool, &f.alice, f.client_id, &input);
    assert!(matches!(again, Err(AppError::Validation { .. })));

    InvoiceLogic::set_status(&mut f.pool, &f.alice, first.invoice.id, InvoiceStatus::Cancelled)
        .unwrap();
    let reopened =
        InvoiceLogic::set_status(&mut f.pool, &f.alice, first.invoice.id, InvoiceStatus::Draft);
    assert!(reopened.is_err());

    let second = InvoiceLogic::create(&mut f.pool, &f.alice, f.client_id, &input).unwrap();
    assert_eq!(second.invoice.number, "INV-2025-0002");
}

#[test]
fn test_paid_invoice_cannot_be_deleted() {
    let mut f = fixture();
    TimeLogLogic::add(
        &mut f.pool,
        &f.alice,
        f.project_id,
        &interval("2025-09-01 09:00", "2025-09-01 10:00"),
    )
    .unwrap();

    let inv = InvoiceLogic::create(&mut f.pool, &f.alice, f.client_id, &InvoiceInput::default())
        .unwrap()
        .invoice;
    InvoiceLogic::set_status(&mut f.pool, &f.alice, inv.id, InvoiceStatus::Paid).unwrap();

    assert!(InvoiceLogic::delete(&mut f.pool, &f.alice, inv.id).is_err());
    assert!(matches!(
        InvoiceLogic::get(&mut f.pool, &f.bob, inv.id),
        Err(AppError::Forbidden(_))
    ));
}

#[test]
fn test_monthly_recurrence_clamps_to_month_end() {
    let mut f = fixture();
    let task = TaskLogic::create(
        &mut f.pool,
        &f.alice,
        f.project_id,
        &TaskInput {
            title: Some("Payroll".into()),
            due_date: Some(day("2025-01-31")),
            recurring: Some("monthly".into()),
            ..Default::default()
        },
    )
    .unwrap();

    let report = RecurLogic::run(&mut f.pool, day("2025-01-31")).unwrap();
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.created[0].source_id, task.id);
    assert_eq!(report.created[0].due_date, day("2025-02-28"));

    let copy = TaskLogic::details(&mut f.pool, &f.alice, report.created[0].task_id).unwrap();
    assert_eq!(copy.task.recurring_parent_id, Some(task.id));
    assert_eq!(copy.task.status, TaskStatus::Todo);
    assert_eq!(copy.assignees.len(), 1);

    // the copy continues the chain
    let next = RecurLogic::run(&mut f.pool, day("2025-02-28")).unwrap();
    assert_eq!(next.created[0].due_date, day("2025-03-28"));

    let rerun = RecurLogic::run(&mut f.pool, day("2025-01-31")).unwrap();
    assert!(rerun.created.is_empty());
    assert_eq!(rerun.skipped, 1);
}

#[test]
fn test_dashboard_only_counts_owned_projects() {
    let mut f = fixture();
    let cfg = Config::default();

    TimeLogLogic::add(
        &mut f.pool,
        &f.alice,
        f.project_id,
        &interval("2025-09-01 09:00", "2025-09-01 10:30"),
    )
    .unwrap();

    let bobs = ProjectLogic::create(
        &mut f.pool,
        &cfg,
        &f.bob,
        &ProjectInput {
            name: Some("Side gig".into()),
            currency: Some("USD".into()),
            hourly_rate: Some(40.0),
            ..Default::default()
        },
    )
    .unwrap();
    TimeLogLogic::add(
        &mut f.pool,
        &f.bob,
        bobs.id,
        &interval("2025-09-01 09:00", "2025-09-01 17:00"),
    )
    .unwrap();

    let stats = DashboardLogic::build(&mut f.pool, &f.alice, day("2025-09-03")).unwrap();
    assert_eq!(stats.totals.len(), 1);
    assert_eq!(stats.totals[0].currency, "EUR");
    assert_eq!(stats.totals[0].unpaid.hours, 1.5);
    assert_eq!(stats.totals[0].unpaid.amount, 120.0);
    assert_eq!(stats.clients, 1);
    assert_eq!(stats.trend.len(), 7);
    assert_eq!(stats.trend[4].date, day("2025-09-01"));
    assert_eq!(stats.trend[4].user_hours, 1.5);
}

#[test]
fn test_member_sees_only_visible_tasks() {
    let mut f = fixture();
    TaskLogic::create(
        &mut f.pool,
        &f.alice,
        f.project_id,
        &TaskInput {
            title: Some("Private".into()),
            ..Default::default()
        },
    )
    .unwrap();

    let filter = TaskFilter::default();
    assert!(TaskLogic::list(&mut f.pool, &f.bob, &filter).unwrap().is_empty());

    join_project(&mut f, None, None);
    assert_eq!(TaskLogic::list(&mut f.pool, &f.bob, &filter).unwrap().len(), 1);

    let mine = TaskFilter {
        assigned_to: Some(f.bob.id()),
        ..Default::default()
    };
    assert!(TaskLogic::list(&mut f.pool, &f.bob, &mine).unwrap().is_empty());
}

struct FakeTracker(Vec<ExternalIssue>);

impl IssueTracker for FakeTracker {
    fn provider(&self) -> Provider {
        Provider::Github
    }

    fn fetch_issues(&self) -> AppResult<Vec<ExternalIssue>> {
        Ok(self.0.clone())
    }
}

fn issue(id: &str, title: &str, closed: bool) -> ExternalIssue {
    ExternalIssue {
        external_id: id.to_string(),
        title: title.to_string(),
        body: None,
        url: format!("https://github.com/acme/web/issues/{id}"),
        closed,
    }
}

#[test]
fn test_tracker_sync_upserts_tasks() {
    let mut f = fixture();

    let first = FakeTracker(vec![
        issue("1", "Broken header", false),
        issue("2", "Old closed bug", true),
    ]);
    let report = TrackerLogic::sync(&mut f.pool, &f.alice, f.project_id, &first).unwrap();
    assert_eq!((report.created, report.updated, report.skipped), (1, 0, 1));

    // unchanged issue is skipped, closed one turns the task done
    let report = TrackerLogic::sync(&mut f.pool, &f.alice, f.project_id, &first).unwrap();
    assert_eq!((report.created, report.updated, report.skipped), (0, 0, 2));

    let second = FakeTracker(vec![issue("1", "Broken header on mobile", true)]);
    let report = TrackerLogic::sync(&mut f.pool, &f.alice, f.project_id, &second).unwrap();
    assert_eq!(report.updated, 1);

    let tasks = TaskLogic::list(&mut f.pool, &f.alice, &TaskFilter::default()).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Broken header on mobile");
    assert_eq!(tasks[0].status, TaskStatus::Done);
    assert_eq!(tasks[0].external_id.as_deref(), Some("1"));
}

#[test]
fn test_tracker_sync_is_owner_only() {
    let mut f = fixture();
    join_project(&mut f, None, None);

    let tracker = FakeTracker(vec![issue("1", "x", false)]);
    let res = TrackerLogic::sync(&mut f.pool, &f.bob, f.project_id, &tracker);
    assert!(matches!(res, Err(AppError::Forbidden(_))));
}

#[test]
fn test_edit_takes_the_current_rate() {
    let mut f = fixture();
    join_project(&mut f, Some(50.0), None);

    let log = TimeLogLogic::add(
        &mut f.pool,
        &f.bob,
        f.project_id,
        &interval("2025-09-01 09:00", "2025-09-01 10:00"),
    )
    .unwrap();
    assert_eq!(log.hourly_rate, 50.0);

    ProjectLogic::add_member(&mut f.pool, &f.alice, f.project_id, "bob@example.com", Some(65.0))
        .unwrap();

    let edited = TimeLogLogic::edit(
        &mut f.pool,
        &f.bob,
        log.id,
        &TimeLogInput {
            description: Some("copy review".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(edited.hourly_rate, 65.0);
}

#[test]
fn test_dashboard_counts_team_time_on_owned_projects() {
    let mut f = fixture();
    let cfg = Config::default();
    join_project(&mut f, Some(50.0), None);

    let approved = TimeLogLogic::add(
        &mut f.pool,
        &f.bob,
        f.project_id,
        &interval("2025-09-01 09:00", "2025-09-01 11:00"),
    )
    .unwrap();
    TimeLogLogic::review(&mut f.pool, &f.alice, approved.id, ApprovalStatus::Approved).unwrap();

    TimeLogLogic::add(
        &mut f.pool,
        &f.bob,
        f.project_id,
        &interval("2025-09-02 09:00", "2025-09-02 10:00"),
    )
    .unwrap();

    let side = ProjectLogic::create(
        &mut f.pool,
        &cfg,
        &f.bob,
        &ProjectInput {
            name: Some("Side gig".into()),
            currency: Some("USD".into()),
            hourly_rate: Some(40.0),
            ..Default::default()
        },
    )
    .unwrap();
    TimeLogLogic::add(
        &mut f.pool,
        &f.bob,
        side.id,
        &interval("2025-09-01 12:00", "2025-09-01 18:00"),
    )
    .unwrap();

    let stats = DashboardLogic::build(&mut f.pool, &f.alice, day("2025-09-03")).unwrap();
    assert_eq!(stats.totals.len(), 1);
    assert_eq!(stats.totals[0].currency, "EUR");
    assert_eq!(stats.totals[0].unpaid.hours, 2.0);
    assert_eq!(stats.totals[0].unpaid.amount, 100.0);
    assert_eq!(stats.pending_approvals, 1);
    assert_eq!(stats.trend[4].date, day("2025-09-01"));
    assert_eq!(stats.trend[4].team_hours, 2.0);
    assert_eq!(stats.trend[4].user_hours, 0.0);
    assert_eq!(stats.trend[5].team_hours, 0.0);
}

#[test]
fn test_chat_messages_are_audited() {
    let mut f = fixture();
    join_project(&mut f, None, None);

    let id = ChatLogic::send(&mut f.pool, &f.bob, f.project_id, "standup at ten").unwrap();

    let entries = load_log(&f.pool.conn).unwrap();
    let entry = entries
        .iter()
        .find(|e| e.operation == "chat_send")
        .expect("chat_send entry");
    assert_eq!(entry.target, f.project_id.to_string());
    assert!(entry.message.contains(&format!("#{id}")));
}

#[test]
fn test_invoice_sequence_orders_numerically() {
    let f = fixture();
    for number in ["INV-2025-9999", "INV-2025-10000"] {
        f.pool
            .conn
            .execute(
                "INSERT INTO invoices (user_id, client_id, number, issue_date, currency,
                                       created_at, updated_at)
                 VALUES (?1, ?2, ?3, '2025-06-01', 'EUR', '', '')",
                rusqlite::params![f.alice.id(), f.client_id, number],
            )
            .unwrap();
    }

    assert_eq!(next_sequence(&f.pool.conn, f.alice.id(), 2025).unwrap(), 10001);
    assert_eq!(next_sequence(&f.pool.conn, f.alice.id(), 2026).unwrap(), 1);
}
