use crate::core::backup::zip_file;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use chrono::Local;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

/// A schema step. Applied steps are recorded in `log` as
/// `operation = 'migration_applied'`, `target = version`.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_initial_schema",
        description: "Created users, clients, projects, team and time log tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS clients (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name        TEXT NOT NULL,
            email       TEXT,
            address     TEXT,
            currency    TEXT NOT NULL DEFAULT 'USD',
            hourly_rate REAL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_clients_user ON clients(user_id);

        CREATE TABLE IF NOT EXISTS projects (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            client_id   INTEGER REFERENCES clients(id) ON DELETE SET NULL,
            name        TEXT NOT NULL,
            description TEXT,
            currency    TEXT NOT NULL DEFAULT 'USD',
            hourly_rate REAL NOT NULL DEFAULT 0,
            archived    INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id);

        CREATE TABLE IF NOT EXISTS team_members (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            member_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            hourly_rate REAL,
            created_at  TEXT NOT NULL,
            UNIQUE(owner_id, member_id)
        );

        CREATE TABLE IF NOT EXISTS project_members (
            project_id  INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            hourly_rate REAL,
            PRIMARY KEY (project_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS time_logs (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id          INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            project_id       INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            task_id          INTEGER,
            description      TEXT,
            start_time       TEXT NOT NULL,
            end_time         TEXT,
            duration_minutes INTEGER,
            hourly_rate      REAL NOT NULL DEFAULT 0,
            is_paid          INTEGER NOT NULL DEFAULT 0,
            status           TEXT NOT NULL DEFAULT 'pending'
                             CHECK(status IN ('pending','approved','rejected')),
            invoice_id       INTEGER,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_time_logs_project ON time_logs(project_id, start_time);
        CREATE INDEX IF NOT EXISTS idx_time_logs_user ON time_logs(user_id, start_time);
        "#,
    },
    Migration {
        version: "20250315_0002_tasks",
        description: "Created tasks, assignees and tags",
        sql: r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id          INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            created_by          INTEGER NOT NULL REFERENCES users(id),
            title               TEXT NOT NULL,
            description         TEXT,
            status              TEXT NOT NULL DEFAULT 'todo'
                                CHECK(status IN ('todo','in_progress','done')),
            priority            TEXT NOT NULL DEFAULT 'medium'
                                CHECK(priority IN ('low','medium','high')),
            due_date            TEXT,
            is_recurring        INTEGER NOT NULL DEFAULT 0,
            recurring_frequency TEXT
                                CHECK(recurring_frequency IS NULL OR recurring_frequency IN
                                      ('daily','weekly','every_other_week','monthly')),
            recurring_parent_id INTEGER,
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_recurring ON tasks(is_recurring, due_date);

        CREATE TABLE IF NOT EXISTS task_assignees (
            task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (task_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS tags (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name    TEXT NOT NULL,
            UNIQUE(user_id, name)
        );

        CREATE TABLE IF NOT EXISTS taggables (
            tag_id        INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            taggable_type TEXT NOT NULL CHECK(taggable_type IN ('task','time_log')),
            taggable_id   INTEGER NOT NULL,
            PRIMARY KEY (tag_id, taggable_type, taggable_id)
        );
        "#,
    },
    Migration {
        version: "20250402_0003_invoices",
        description: "Created invoices and invoice items",
        sql: r#"
        CREATE TABLE IF NOT EXISTS invoices (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            client_id  INTEGER NOT NULL REFERENCES clients(id),
            number     TEXT NOT NULL,
            issue_date TEXT NOT NULL,
            due_date   TEXT,
            status     TEXT NOT NULL DEFAULT 'draft'
                       CHECK(status IN ('draft','sent','paid','cancelled')),
            currency   TEXT NOT NULL,
            subtotal   REAL NOT NULL DEFAULT 0,
            discount   REAL NOT NULL DEFAULT 0,
            tax_rate   REAL NOT NULL DEFAULT 0,
            total      REAL NOT NULL DEFAULT 0,
            notes      TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(user_id, number)
        );

        CREATE TABLE IF NOT EXISTS invoice_items (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            invoice_id  INTEGER NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
            time_log_id INTEGER,
            description TEXT NOT NULL,
            quantity    REAL NOT NULL,
            unit_price  REAL NOT NULL,
            amount      REAL NOT NULL
        );
        "#,
    },
    Migration {
        version: "20250420_0004_notes_chat_attachments",
        description: "Created notes, project messages and task attachments",
        sql: r#"
        CREATE TABLE IF NOT EXISTS notes (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            project_id INTEGER REFERENCES projects(id) ON DELETE SET NULL,
            client_id  INTEGER REFERENCES clients(id) ON DELETE SET NULL,
            title      TEXT NOT NULL,
            body       TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS messages (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            body       TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_messages_project ON messages(project_id, id);

        CREATE TABLE IF NOT EXISTS attachments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id     INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            user_id     INTEGER NOT NULL REFERENCES users(id),
            file_name   TEXT NOT NULL,
            stored_path TEXT NOT NULL,
            size_bytes  INTEGER NOT NULL,
            created_at  TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20250512_0005_issue_trackers",
        description: "Added external issue references to tasks and project tracker links",
        sql: r#"
        ALTER TABLE tasks ADD COLUMN external_source TEXT;
        ALTER TABLE tasks ADD COLUMN external_id TEXT;
        ALTER TABLE tasks ADD COLUMN external_url TEXT;
        CREATE UNIQUE INDEX IF NOT EXISTS idx_tasks_external
            ON tasks(project_id, external_source, external_id)
            WHERE external_id IS NOT NULL;

        CREATE TABLE IF NOT EXISTS project_trackers (
            project_id     INTEGER PRIMARY KEY REFERENCES projects(id) ON DELETE CASCADE,
            provider       TEXT NOT NULL CHECK(provider IN ('github','jira')),
            repository     TEXT NOT NULL,
            base_url       TEXT,
            last_synced_at TEXT
        );
        "#,
    },
];

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )
}

fn is_applied(conn: &Connection, version: &str) -> rusqlite::Result<bool> {
    let mut chk = conn.prepare_cached(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Versions not yet applied, in order.
pub fn pending_versions(conn: &Connection) -> AppResult<Vec<&'static str>> {
    ensure_log_table(conn)?;
    let mut out = Vec::new();
    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            out.push(m.version);
        }
    }
    Ok(out)
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(m.sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;

    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, 'migration_applied', ?2, ?3)",
        rusqlite::params![Local::now().to_rfc3339(), m.version, m.description],
    )?;

    tx.commit()?;
    Ok(())
}

/// Zip the database file next to itself before upgrading a populated schema.
fn backup_before_migration(conn: &Connection) -> AppResult<()> {
    let db_path: String = conn
        .query_row("PRAGMA database_list;", [], |row| row.get::<_, String>(2))
        .unwrap_or_default();

    if db_path.is_empty() {
        warning("Could not determine DB path, backup skipped.");
        return Ok(());
    }

    let src = Path::new(&db_path);
    let backup_name = format!(
        "{}-backup_pre_migration.zip",
        Local::now().format("%Y%m%d_%H%M%S")
    );
    let dest = src
        .parent()
        .map(|p| p.join(&backup_name))
        .unwrap_or_else(|| backup_name.clone().into());

    zip_file(src, &dest)?;
    success(format!("📦 Backup created: {}", dest.display()));
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db() and every time the database is opened.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    let pending = pending_versions(conn)?;
    if pending.is_empty() {
        return Ok(());
    }

    // an already-populated schema gets a safety copy first
    let upgrading = pending.len() < MIGRATIONS.len();
    if upgrading {
        warning("Schema upgrade required: creating safety backup before migration...");
        backup_before_migration(conn)?;
    }

    for m in MIGRATIONS.iter().filter(|m| pending.contains(&m.version)) {
        apply(conn, m)?;
        if upgrading {
            success(format!("Migration applied: {}", m.version));
        }
    }

    Ok(())
}
