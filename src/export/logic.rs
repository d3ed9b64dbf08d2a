use crate::core::auth::Actor;
use crate::db::pool::DbPool;
use crate::db::{
    clients as client_db, invoices as invoice_db, projects as project_db, tags as tag_db,
    tasks as task_db, time_logs as log_db,
};
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::{
    ClientExport, ExportRecord, InvoiceExport, ProjectExport, TaskExport, TimeLogExport,
};
use crate::export::pdf_export::export_pdf;
use crate::export::xlsx::export_xlsx;
use crate::export::{ExportEntity, ExportFormat};
use crate::models::tag::Taggable;
use crate::models::time_log::TimeLogFilter;
use crate::ui::messages::warning;
use crate::utils::date::{month_name, parse_range};
use crate::utils::path::{expand_tilde, is_absolute};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::path::Path;

type Bounds = Option<(NaiveDate, NaiveDate)>;

fn in_bounds(date: Option<NaiveDate>, bounds: Bounds) -> bool {
    match (bounds, date) {
        (None, _) => true,
        (Some((from, to)), Some(d)) => d >= from && d <= to,
        (Some(_), None) => false,
    }
}

pub struct ExportLogic;

impl ExportLogic {
    /// Export one entity of the actor's data.
    ///
    /// `range` accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `start:end` of the
    /// same shape, or `all`. It filters time logs by day, tasks by due date and
    /// invoices by issue date. Returns the number of exported records.
    pub fn export(
        pool: &mut DbPool,
        actor: &Actor,
        entity: ExportEntity,
        format: ExportFormat,
        file: &str,
        range: Option<&str>,
        force: bool,
    ) -> AppResult<usize> {
        if !is_absolute(file) {
            return Err(AppError::validation(
                "file",
                format!("output file path must be absolute: {file}"),
            ));
        }

        let bounds = match range {
            Some(r) => parse_range(r)?,
            None => None,
        };
        if bounds.is_some() && !entity.is_dated() {
            warning(format!("--range is ignored for {}", entity.title().to_lowercase()));
        }

        let out = expand_tilde(file);
        let path = out.as_path();
        ensure_writable(path, force)?;
        let title = build_title(entity, range, bounds);

        let count = match entity {
            ExportEntity::TimeLogs => {
                let filter = TimeLogFilter {
                    from: bounds.map(|b| b.0),
                    to: bounds.map(|b| b.1),
                    ..Default::default()
                };
                let records: Vec<TimeLogExport> = log_db::list_time_logs(&pool.conn, actor.id(), &filter)?
                    .iter()
                    .map(TimeLogExport::from)
                    .collect();
                write(&records, format, path, entity, &title)?
            }
            ExportEntity::Clients => {
                let records: Vec<ClientExport> = client_db::list_clients(&pool.conn, actor.id())?
                    .iter()
                    .map(ClientExport::from)
                    .collect();
                write(&records, format, path, entity, &title)?
            }
            ExportEntity::Projects => {
                let mut names: HashMap<i64, String> = HashMap::new();
                let mut records = Vec::new();
                for p in project_db::list_visible(&pool.conn, actor.id(), true)? {
                    let client = match p.client_id {
                        Some(cid) => {
                            if !names.contains_key(&cid) {
                                names.insert(cid, client_db::get_client(&pool.conn, cid)?.name);
                            }
                            names.get(&cid).cloned()
                        }
                        None => None,
                    };
                    records.push(ProjectExport::new(&p, client));
                }
                write(&records, format, path, entity, &title)?
            }
            ExportEntity::Tasks => {
                let mut records = Vec::new();
                for t in task_db::list_tasks(&pool.conn, actor.id(), &Default::default())? {
                    if !in_bounds(t.due_date, bounds) {
                        continue;
                    }
                    let assignees = task_db::assignees(&pool.conn, t.id)?
                        .into_iter()
                        .map(|u| u.email)
                        .collect();
                    let tags = tag_db::names_for(&pool.conn, Taggable::Task, t.id)?;
                    records.push(TaskExport::new(&t, assignees, tags));
                }
                write(&records, format, path, entity, &title)?
            }
            ExportEntity::Invoices => {
                let mut records = Vec::new();
                for inv in invoice_db::list_invoices(&pool.conn, actor.id(), None)? {
                    if !in_bounds(Some(inv.issue_date), bounds) {
                        continue;
                    }
                    let client = client_db::get_client(&pool.conn, inv.client_id)?.name;
                    records.push(InvoiceExport::new(&inv, client));
                }
                write(&records, format, path, entity, &title)?
            }
        };

        if count == 0 {
            warning("No records found for the selected range; wrote headers only.");
        }
        Ok(count)
    }
}

fn write<R: ExportRecord>(
    records: &[R],
    format: ExportFormat,
    path: &Path,
    entity: ExportEntity,
    title: &str,
) -> AppResult<usize> {
    match format {
        ExportFormat::Csv => export_csv(records, path)?,
        ExportFormat::Json => export_json(records, path)?,
        ExportFormat::Xlsx => export_xlsx(records, entity.title(), path)?,
        ExportFormat::Pdf => export_pdf(records, path, title)?,
    }
    Ok(records.len())
}

/// PDF title for the selected period.
fn build_title(entity: ExportEntity, range: Option<&str>, bounds: Bounds) -> String {
    let base = entity.title();
    let (Some(p), Some((from, to))) = (range, bounds) else {
        return base.to_string();
    };
    if !entity.is_dated() {
        return base.to_string();
    }

    match p.trim().len() {
        4 => format!("{base} {}", from.year()),
        7 => format!("{base} {} {}", month_name(from.month()), from.year()),
        10 => format!("{base} {from}"),
        _ => format!("{base} {from} to {to}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_follow_the_range_shape() {
        let month = parse_range("2025-03").unwrap();
        assert_eq!(
            build_title(ExportEntity::TimeLogs, Some("2025-03"), month),
            "Time logs March 2025"
        );
        let span = parse_range("2025-01-01:2025-01-31").unwrap();
        assert_eq!(
            build_title(ExportEntity::Invoices, Some("2025-01-01:2025-01-31"), span),
            "Invoices 2025-01-01 to 2025-01-31"
        );
        assert_eq!(build_title(ExportEntity::Clients, None, None), "Clients");
    }
}
