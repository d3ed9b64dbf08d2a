//! Flat export records, one per entity.
//!
//! Every record knows its fixed column list; CSV, XLSX and PDF write
//! `headers()` followed by `to_row()` for each record, JSON serializes the
//! records themselves.

use crate::models::client::Client;
use crate::models::invoice::Invoice;
use crate::models::project::Project;
use crate::models::task::Task;
use crate::models::time_log::TimeLogRow;
use crate::utils::formatting::round2;
use crate::utils::time::format_datetime;
use serde::Serialize;

pub trait ExportRecord: Serialize {
    fn headers() -> &'static [&'static str];
    fn to_row(&self) -> Vec<String>;
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(|x| x.to_string()).unwrap_or_default()
}

#[derive(Serialize, Clone, Debug)]
pub struct TimeLogExport {
    pub id: i64,
    pub date: String,
    pub start: String,
    pub end: Option<String>,
    pub hours: f64,
    pub project: String,
    pub task: Option<String>,
    pub user: String,
    pub description: Option<String>,
    pub rate: f64,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub paid: bool,
}

impl From<&TimeLogRow> for TimeLogExport {
    fn from(r: &TimeLogRow) -> Self {
        let l = &r.log;
        Self {
            id: l.id,
            date: l.start_time.format("%Y-%m-%d").to_string(),
            start: format_datetime(&l.start_time),
            end: l.end_time.as_ref().map(format_datetime),
            hours: round2(l.hours()),
            project: r.project_name.clone(),
            task: r.task_title.clone(),
            user: r.user_email.clone(),
            description: l.description.clone(),
            rate: l.hourly_rate,
            amount: round2(l.amount()),
            currency: r.currency.clone(),
            status: l.status.to_db_str().to_string(),
            paid: l.is_paid,
        }
    }
}

impl ExportRecord for TimeLogExport {
    fn headers() -> &'static [&'static str] {
        &[
            "id", "date", "start", "end", "hours", "project", "task", "user", "description", "rate",
            "amount", "currency", "status", "paid",
        ]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.date.clone(),
            self.start.clone(),
            opt(&self.end),
            format!("{:.2}", self.hours),
            self.project.clone(),
            opt(&self.task),
            self.user.clone(),
            opt(&self.description),
            format!("{:.2}", self.rate),
            format!("{:.2}", self.amount),
            self.currency.clone(),
            self.status.clone(),
            self.paid.to_string(),
        ]
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct ClientExport {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub currency: String,
    pub hourly_rate: Option<f64>,
    pub created_at: String,
}

impl From<&Client> for ClientExport {
    fn from(c: &Client) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            email: c.email.clone(),
            address: c.address.clone(),
            currency: c.currency.clone(),
            hourly_rate: c.hourly_rate,
            created_at: c.created_at.clone(),
        }
    }
}

impl ExportRecord for ClientExport {
    fn headers() -> &'static [&'static str] {
        &["id", "name", "email", "address", "currency", "hourly_rate", "created_at"]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            opt(&self.email),
            opt(&self.address),
            self.currency.clone(),
            self.hourly_rate.map(|r| format!("{r:.2}")).unwrap_or_default(),
            self.created_at.clone(),
        ]
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct ProjectExport {
    pub id: i64,
    pub name: String,
    pub client: Option<String>,
    pub description: Option<String>,
    pub currency: String,
    pub hourly_rate: f64,
    pub archived: bool,
}

impl ProjectExport {
    pub fn new(p: &Project, client: Option<String>) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            client,
            description: p.description.clone(),
            currency: p.currency.clone(),
            hourly_rate: p.hourly_rate,
            archived: p.archived,
        }
    }
}

impl ExportRecord for ProjectExport {
    fn headers() -> &'static [&'static str] {
        &["id", "name", "client", "description", "currency", "hourly_rate", "archived"]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            opt(&self.client),
            opt(&self.description),
            self.currency.clone(),
            format!("{:.2}", self.hourly_rate),
            self.archived.to_string(),
        ]
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct TaskExport {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub due_date: Option<String>,
    pub recurring: Option<String>,
    pub assignees: String,
    pub tags: String,
    pub external_url: Option<String>,
}

impl TaskExport {
    pub fn new(t: &Task, assignees: Vec<String>, tags: Vec<String>) -> Self {
        Self {
            id: t.id,
            project_id: t.project_id,
            title: t.title.clone(),
            status: t.status.to_db_str().to_string(),
            priority: t.priority.to_db_str().to_string(),
            due_date: t.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            recurring: t.recurring_frequency.map(|f| f.to_db_str().to_string()),
            assignees: assignees.join(";"),
            tags: tags.join(";"),
            external_url: t.external_url.clone(),
        }
    }
}

impl ExportRecord for TaskExport {
    fn headers() -> &'static [&'static str] {
        &[
            "id", "project_id", "title", "status", "priority", "due_date", "recurring", "assignees",
            "tags", "external_url",
        ]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.project_id.to_string(),
            self.title.clone(),
            self.status.clone(),
            self.priority.clone(),
            opt(&self.due_date),
            opt(&self.recurring),
            self.assignees.clone(),
            self.tags.clone(),
            opt(&self.external_url),
        ]
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct InvoiceExport {
    pub id: i64,
    pub number: String,
    pub client: String,
    pub issue_date: String,
    pub due_date: Option<String>,
    pub status: String,
    pub currency: String,
    pub subtotal: f64,
    pub discount: f64,
    pub tax_rate: f64,
    pub total: f64,
}

impl InvoiceExport {
    pub fn new(i: &Invoice, client: String) -> Self {
        Self {
            id: i.id,
            number: i.number.clone(),
            client,
            issue_date: i.issue_date.format("%Y-%m-%d").to_string(),
            due_date: i.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            status: i.status.to_db_str().to_string(),
            currency: i.currency.clone(),
            subtotal: i.subtotal,
            discount: i.discount,
            tax_rate: i.tax_rate,
            total: i.total,
        }
    }
}

impl ExportRecord for InvoiceExport {
    fn headers() -> &'static [&'static str] {
        &[
            "id", "number", "client", "issue_date", "due_date", "status", "currency", "subtotal",
            "discount", "tax_rate", "total",
        ]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.number.clone(),
            self.client.clone(),
            self.issue_date.clone(),
            opt(&self.due_date),
            self.status.clone(),
            self.currency.clone(),
            format!("{:.2}", self.subtotal),
            format!("{:.2}", self.discount),
            format!("{:.2}", self.tax_rate),
            format!("{:.2}", self.total),
        ]
    }
}

pub(crate) fn to_table<R: ExportRecord>(records: &[R]) -> Vec<Vec<String>> {
    records.iter().map(ExportRecord::to_row).collect()
}
