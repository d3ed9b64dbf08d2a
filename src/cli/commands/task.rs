use super::open_session;
use crate::cli::parser::{Commands, TaskCmd, TasksCmd};
use crate::config::Config;
use crate::core::recur::RecurLogic;
use crate::core::task::TaskLogic;
use crate::db::pool::DbPool;
use crate::db::tasks::TaskFilter;
use crate::errors::AppResult;
use crate::models::task::{Task, TaskInput};
use crate::ui::messages::{field, header, info, success, warning};
use crate::utils::colors::{colorize_optional, colorize_status};
use crate::utils::date::{parse_optional_date, today};
use crate::utils::formatting::truncate;
use crate::utils::table::Table;

fn due_label(t: &Task) -> String {
    let due = t.due_date.map(|d| d.format("%Y-%m-%d").to_string());
    colorize_optional(due.as_deref())
}

fn recurrence_label(t: &Task) -> String {
    let freq = t
        .recurring_frequency
        .filter(|_| t.is_recurring)
        .map(|f| f.to_db_str());
    colorize_optional(freq)
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Task { action } = cmd else {
        return Ok(());
    };

    let (mut pool, actor) = open_session(cfg)?;

    match action {
        TaskCmd::Add {
            project,
            title,
            description,
            status,
            priority,
            due,
            recurring,
            assign,
            tags,
        } => {
            let input = TaskInput {
                title: Some(title.clone()),
                description: description.clone(),
                status: *status,
                priority: *priority,
                due_date: parse_optional_date(due.as_ref())?,
                recurring: recurring.clone(),
                no_recurring: false,
                assignees: (!assign.is_empty()).then(|| assign.clone()),
                tags: tags.clone(),
            };
            let task = TaskLogic::create(&mut pool, &actor, *project, &input)?;
            success(format!("Task #{} '{}' created", task.id, task.title));
        }

        TaskCmd::List {
            project,
            status,
            mine,
        } => {
            let filter = TaskFilter {
                project_id: *project,
                status: *status,
                assigned_to: mine.then(|| actor.id()),
            };
            let tasks = TaskLogic::list(&mut pool, &actor, &filter)?;
            if tasks.is_empty() {
                warning("No tasks found.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "PROJECT", "TITLE", "STATUS", "PRIORITY", "DUE", "REPEATS"]);
            for t in &tasks {
                table.add_row(vec![
                    t.id.to_string(),
                    t.project_id.to_string(),
                    truncate(&t.title, 40),
                    colorize_status(t.status.to_db_str()),
                    t.priority.to_db_str().to_string(),
                    due_label(t),
                    recurrence_label(t),
                ]);
            }
            table.print(&cfg.separator_char);
        }

        TaskCmd::Show { id } => {
            let d = TaskLogic::details(&mut pool, &actor, *id)?;
            let t = &d.task;
            header(format!("Task #{}: {}", t.id, t.title));
            field("Project", format!("#{}", t.project_id));
            field("Description", colorize_optional(t.description.as_deref()));
            field("Status", colorize_status(t.status.to_db_str()));
            field("Priority", t.priority.to_db_str());
            field("Due", due_label(t));
            field("Repeats", recurrence_label(t));
            if let Some(parent) = t.recurring_parent_id {
                field("Series of", format!("#{parent}"));
            }
            if let Some(url) = &t.external_url {
                field("Issue", url);
            }

            let assignees: Vec<String> = d.assignees.iter().map(|u| u.email.clone()).collect();
            field("Assignees", colorize_optional(Some(assignees.join(", ").as_str())));
            field("Tags", colorize_optional(Some(d.tags.join(", ").as_str())));

            if !d.attachments.is_empty() {
                info("Attachments:");
                for a in &d.attachments {
                    println!("    #{} {} ({} bytes)", a.id, a.file_name, a.size_bytes);
                }
            }
        }

        TaskCmd::Edit {
            id,
            title,
            description,
            status,
            priority,
            due,
            recurring,
            no_recurring,
            assign,
            tags,
        } => {
            let input = TaskInput {
                title: title.clone(),
                description: description.clone(),
                status: *status,
                priority: *priority,
                due_date: parse_optional_date(due.as_ref())?,
                recurring: recurring.clone(),
                no_recurring: *no_recurring,
                assignees: (!assign.is_empty()).then(|| assign.clone()),
                tags: tags.clone(),
            };
            let task = TaskLogic::update(&mut pool, &actor, *id, &input)?;
            success(format!("Task #{} updated", task.id));
        }

        TaskCmd::Status { id, status } => {
            let task = TaskLogic::set_status(&mut pool, &actor, *id, *status)?;
            success(format!(
                "Task #{} is now {}",
                task.id,
                colorize_status(task.status.to_db_str())
            ));
        }

        TaskCmd::Del { id } => {
            TaskLogic::delete(&mut pool, &actor, *id)?;
            success(format!("Task #{id} deleted"));
        }
    }

    Ok(())
}

/// `tasks recur`: system job, no acting user needed.
pub fn handle_jobs(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Tasks { action } = cmd else {
        return Ok(());
    };

    match action {
        TasksCmd::Recur { date } => {
            let day = parse_optional_date(date.as_ref())?.unwrap_or_else(today);
            let mut pool = DbPool::open(&cfg.database)?;
            let report = RecurLogic::run(&mut pool, day)?;

            for occ in &report.created {
                info(format!(
                    "Task #{} → #{} due {}",
                    occ.source_id,
                    occ.task_id,
                    occ.due_date.format("%Y-%m-%d")
                ));
            }
            success(format!(
                "Recurring tasks for {}: {} created, {} already present",
                day.format("%Y-%m-%d"),
                report.created.len(),
                report.skipped
            ));
        }
    }

    Ok(())
}
