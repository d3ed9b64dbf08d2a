//! Generation of the next occurrence of recurring tasks.

use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{tags as tag_db, tasks as task_db};
use crate::errors::AppResult;
use crate::models::tag::Taggable;
use crate::models::task::{Task, TaskStatus};
use chrono::NaiveDate;

/// One occurrence created by a recurrence run.
#[derive(Debug, Clone)]
pub struct Occurrence {
    pub source_id: i64,
    pub task_id: i64,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct RecurReport {
    pub created: Vec<Occurrence>,
    pub skipped: usize,
}

pub struct RecurLogic;

impl RecurLogic {
    /// For every recurring task due on `date`, create the next occurrence
    /// unless its chain already holds a task due on that day. Running twice
    /// for the same date creates nothing the second time.
    pub fn run(pool: &mut DbPool, date: NaiveDate) -> AppResult<RecurReport> {
        let mut report = RecurReport::default();

        for task in task_db::recurring_due_on(&pool.conn, &date)? {
            let Some(next) = task
                .recurring_frequency
                .and_then(|f| f.advance(date))
            else {
                report.skipped += 1;
                continue;
            };

            let root = task.recurrence_root();
            if task_db::chain_has_due(&pool.conn, root, &next)? {
                report.skipped += 1;
                continue;
            }

            let copy = Task {
                id: 0,
                status: TaskStatus::Todo,
                due_date: Some(next),
                recurring_parent_id: Some(root),
                external_source: None,
                external_id: None,
                external_url: None,
                created_at: String::new(),
                updated_at: String::new(),
                ..task.clone()
            };

            let tx = pool.conn.unchecked_transaction()?;
            let new_id = task_db::insert_task(&tx, &copy)?;

            let assignee_ids: Vec<i64> = task_db::assignees(&tx, task.id)?
                .into_iter()
                .map(|u| u.id)
                .collect();
            task_db::set_assignees(&tx, new_id, &assignee_ids)?;

            for tag_id in tag_db::ids_for(&tx, Taggable::Task, task.id)? {
                tag_db::attach(&tx, tag_id, Taggable::Task, new_id)?;
            }
            tx.commit()?;

            audit(
                &pool.conn,
                "task_recur",
                &new_id.to_string(),
                &format!("Next occurrence of task #{} due {}", task.id, next),
            );

            report.created.push(Occurrence {
                source_id: task.id,
                task_id: new_id,
                due_date: next,
            });
        }

        Ok(report)
    }
}
