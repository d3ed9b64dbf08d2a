//! Invoice generation from billable time logs.

use crate::core::auth::{Actor, ensure_owns_client, ensure_owns_project};
use crate::core::validate;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{clients as client_db, invoices as invoice_db, projects as project_db, time_logs as log_db};
use crate::errors::{AppError, AppResult};
use crate::models::client::Client;
use crate::models::invoice::{Invoice, InvoiceInput, InvoiceItem, InvoiceStatus};
use crate::models::time_log::TimeLogRow;
use crate::utils::date::today;
use crate::utils::formatting::round2;
use chrono::Datelike;

#[derive(Debug, Clone)]
pub struct InvoiceDetails {
    pub invoice: Invoice,
    pub client: Client,
    pub items: Vec<InvoiceItem>,
}

/// Invoice amounts derived from the items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub total: f64,
}

/// total = (subtotal - discount) * (1 + tax/100), rounded to cents.
pub fn compute_totals(items: &[InvoiceItem], discount: f64, tax_rate: f64) -> AppResult<Totals> {
    let subtotal = round2(items.iter().map(|i| i.amount).sum());
    validate::non_negative("discount", discount)?;
    validate::non_negative("tax_rate", tax_rate)?;

    if discount > subtotal {
        return Err(AppError::validation(
            "discount",
            format!("discount {discount:.2} exceeds subtotal {subtotal:.2}"),
        ));
    }

    Ok(Totals {
        subtotal,
        total: round2((subtotal - discount) * (1.0 + tax_rate / 100.0)),
    })
}

fn item_for(row: &TimeLogRow) -> InvoiceItem {
    let what = row
        .task_title
        .clone()
        .or_else(|| row.log.description.clone())
        .unwrap_or_else(|| "Work".to_string());
    let quantity = round2(row.log.hours());

    InvoiceItem {
        id: 0,
        invoice_id: 0,
        time_log_id: Some(row.log.id),
        description: format!(
            "{} {}: {}",
            row.log.start_time.format("%Y-%m-%d"),
            row.project_name,
            what
        ),
        quantity,
        unit_price: row.log.hourly_rate,
        amount: round2(quantity * row.log.hourly_rate),
    }
}

pub struct InvoiceLogic;

impl InvoiceLogic {
    pub fn create(pool: &mut DbPool, actor: &Actor, client_id: i64, input: &InvoiceInput) -> AppResult<InvoiceDetails> {
        let client = client_db::get_client(&pool.conn, client_id)?;
        ensure_owns_client(actor, &client)?;

        for pid in &input.project_ids {
            let project = project_db::get_project(&pool.conn, *pid)?;
            ensure_owns_project(actor, &project)?;
            if project.client_id != Some(client.id) {
                return Err(AppError::validation(
                    "project_ids",
                    format!("project #{pid} is not billed to client #{}", client.id),
                ));
            }
        }

        let rows: Vec<TimeLogRow> =
            log_db::billable_for_client(&pool.conn, actor.id(), client.id, input.from, input.to)?
                .into_iter()
                .filter(|r| input.project_ids.is_empty() || input.project_ids.contains(&r.log.project_id))
                .collect();

        if rows.is_empty() {
            return Err(AppError::validation(
                "time_logs",
                "no approved, unbilled time logs for this client",
            ));
        }

        let currency = rows[0].currency.clone();
        if rows.iter().any(|r| r.currency != currency) {
            return Err(AppError::validation(
                "currency",
                "selected projects use different currencies; invoice them separately",
            ));
        }

        let items: Vec<InvoiceItem> = rows.iter().map(item_for).collect();
        let totals = compute_totals(&items, input.discount, input.tax_rate)?;

        let issue_date = input.issue_date.unwrap_or_else(today);
        if let Some(due) = input.due_date
            && due < issue_date
        {
            return Err(AppError::validation("due_date", "due date precedes issue date"));
        }

        let seq = invoice_db::next_sequence(&pool.conn, actor.id(), issue_date.year())?;
        let invoice = Invoice {
            id: 0,
            user_id: actor.id(),
            client_id: client.id,
            number: format!("INV-{}-{:04}", issue_date.year(), seq),
            issue_date,
            due_date: input.due_date,
            status: InvoiceStatus::Draft,
            currency,
            subtotal: totals.subtotal,
            discount: round2(input.discount),
            tax_rate: input.tax_rate,
            total: totals.total,
            notes: validate::optional_text(input.notes.as_ref()),
            created_at: String::new(),
            updated_at: String::new(),
        };

        let id = invoice_db::insert_invoice(&pool.conn, &invoice, &items)?;
        audit(&pool.conn, "invoice_add", &id.to_string(), &invoice.number);
        Self::details(pool, actor, id)
    }

    pub fn details(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<InvoiceDetails> {
        let invoice = Self::get(pool, actor, id)?;
        Ok(InvoiceDetails {
            client: client_db::get_client(&pool.conn, invoice.client_id)?,
            items: invoice_db::items(&pool.conn, invoice.id)?,
            invoice,
        })
    }

    pub fn get(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<Invoice> {
        let invoice = invoice_db::get_invoice(&pool.conn, id)?;
        if invoice.user_id != actor.id() {
            return Err(AppError::Forbidden(format!("invoice #{id} belongs to another user")));
        }
        Ok(invoice)
    }

    pub fn list(pool: &mut DbPool, actor: &Actor, status: Option<InvoiceStatus>) -> AppResult<Vec<Invoice>> {
        invoice_db::list_invoices(&pool.conn, actor.id(), status)
    }

    /// Paid marks the billed logs paid; cancelled releases them for billing
    /// again and is final.
    pub fn set_status(pool: &mut DbPool, actor: &Actor, id: i64, status: InvoiceStatus) -> AppResult<Invoice> {
        let invoice = Self::get(pool, actor, id)?;

        if invoice.status == InvoiceStatus::Cancelled && status != InvoiceStatus::Cancelled {
            return Err(AppError::validation(
                "status",
                format!("invoice {} is cancelled", invoice.number),
            ));
        }

        invoice_db::set_status(&pool.conn, id, status)?;
        audit(
            &pool.conn,
            "invoice_status",
            &id.to_string(),
            &format!("{} -> {}", invoice.number, status.to_db_str()),
        );
        invoice_db::get_invoice(&pool.conn, id)
    }

    pub fn delete(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<()> {
        let invoice = Self::get(pool, actor, id)?;
        if invoice.status == InvoiceStatus::Paid {
            return Err(AppError::validation(
                "status",
                format!("invoice {} is paid and cannot be deleted", invoice.number),
            ));
        }

        invoice_db::delete_invoice(&pool.conn, id)?;
        audit(&pool.conn, "invoice_del", &id.to_string(), &invoice.number);
        Ok(())
    }
}
