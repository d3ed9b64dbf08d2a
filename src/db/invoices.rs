use crate::db::{bad_column, date_col, fmt_date};
use crate::errors::{AppError, AppResult};
use crate::models::invoice::{Invoice, InvoiceItem, InvoiceStatus};
use crate::utils::time::now_rfc3339;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_invoice(row: &Row) -> rusqlite::Result<Invoice> {
    let status_str: String = row.get("status")?;
    let status = InvoiceStatus::from_db_str(&status_str)
        .ok_or_else(|| bad_column(AppError::Other(format!("Invalid status: {status_str}"))))?;

    let issue: String = row.get("issue_date")?;
    let issue_date = date_col(Some(issue))?
        .ok_or_else(|| bad_column(AppError::InvalidDate("empty issue_date".into())))?;

    Ok(Invoice {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        client_id: row.get("client_id")?,
        number: row.get("number")?,
        issue_date,
        due_date: date_col(row.get("due_date")?)?,
        status,
        currency: row.get("currency")?,
        subtotal: row.get("subtotal")?,
        discount: row.get("discount")?,
        tax_rate: row.get("tax_rate")?,
        total: row.get("total")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn map_item(row: &Row) -> rusqlite::Result<InvoiceItem> {
    Ok(InvoiceItem {
        id: row.get("id")?,
        invoice_id: row.get("invoice_id")?,
        time_log_id: row.get("time_log_id")?,
        description: row.get("description")?,
        quantity: row.get("quantity")?,
        unit_price: row.get("unit_price")?,
        amount: row.get("amount")?,
    })
}

/// Insert the invoice with its items and attach the billed time logs,
/// all in one transaction.
pub fn insert_invoice(conn: &Connection, inv: &Invoice, items: &[InvoiceItem]) -> AppResult<i64> {
    let tx = conn.unchecked_transaction()?;
    let now = now_rfc3339();

    tx.execute(
        "INSERT INTO invoices (user_id, client_id, number, issue_date, due_date, status, currency,
                               subtotal, discount, tax_rate, total, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
        params![
            inv.user_id,
            inv.client_id,
            inv.number,
            fmt_date(&inv.issue_date),
            inv.due_date.as_ref().map(fmt_date),
            inv.status.to_db_str(),
            inv.currency,
            inv.subtotal,
            inv.discount,
            inv.tax_rate,
            inv.total,
            inv.notes,
            now,
        ],
    )?;
    let invoice_id = tx.last_insert_rowid();

    for item in items {
        tx.execute(
            "INSERT INTO invoice_items (invoice_id, time_log_id, description, quantity, unit_price, amount)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                invoice_id,
                item.time_log_id,
                item.description,
                item.quantity,
                item.unit_price,
                item.amount
            ],
        )?;

        if let Some(log_id) = item.time_log_id {
            tx.execute(
                "UPDATE time_logs SET invoice_id = ?1, updated_at = ?2 WHERE id = ?3",
                params![invoice_id, now, log_id],
            )?;
        }
    }

    tx.commit()?;
    Ok(invoice_id)
}

pub fn get_invoice(conn: &Connection, id: i64) -> AppResult<Invoice> {
    conn.query_row("SELECT * FROM invoices WHERE id = ?1", [id], map_invoice)
        .optional()?
        .ok_or_else(|| AppError::not_found("Invoice", id))
}

pub fn list_invoices(
    conn: &Connection,
    user_id: i64,
    status: Option<InvoiceStatus>,
) -> AppResult<Vec<Invoice>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM invoices
         WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
         ORDER BY issue_date ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![user_id, status.map(|s| s.to_db_str())], map_invoice)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn items(conn: &Connection, invoice_id: i64) -> AppResult<Vec<InvoiceItem>> {
    let mut stmt =
        conn.prepare("SELECT * FROM invoice_items WHERE invoice_id = ?1 ORDER BY id ASC")?;
    let rows = stmt.query_map([invoice_id], map_item)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Next free sequence for `INV-<year>-NNNN` numbers of this owner.
pub fn next_sequence(conn: &Connection, user_id: i64, year: i32) -> AppResult<u32> {
    let prefix = format!("INV-{year}-");
    let last: Option<String> = conn
        .query_row(
            "SELECT number FROM invoices
             WHERE user_id = ?1 AND number LIKE ?2 || '%'
             ORDER BY CAST(substr(number, length(?2) + 1) AS INTEGER) DESC LIMIT 1",
            params![user_id, prefix],
            |r| r.get(0),
        )
        .optional()?;

    let seq = last
        .and_then(|n| n.strip_prefix(&prefix).and_then(|s| s.parse::<u32>().ok()))
        .unwrap_or(0);
    Ok(seq + 1)
}

/// Persist a status change and its effect on the billed time logs.
pub fn set_status(conn: &Connection, invoice_id: i64, status: InvoiceStatus) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;
    let now = now_rfc3339();

    tx.execute(
        "UPDATE invoices SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.to_db_str(), now, invoice_id],
    )?;

    match status {
        InvoiceStatus::Paid => {
            tx.execute(
                "UPDATE time_logs SET is_paid = 1, updated_at = ?1 WHERE invoice_id = ?2",
                params![now, invoice_id],
            )?;
        }
        InvoiceStatus::Cancelled => {
            tx.execute(
                "UPDATE time_logs SET invoice_id = NULL, is_paid = 0, updated_at = ?1
                 WHERE invoice_id = ?2",
                params![now, invoice_id],
            )?;
        }
        InvoiceStatus::Draft | InvoiceStatus::Sent => {
            tx.execute(
                "UPDATE time_logs SET is_paid = 0, updated_at = ?1 WHERE invoice_id = ?2",
                params![now, invoice_id],
            )?;
        }
    }

    tx.commit()?;
    Ok(())
}

/// Delete the invoice and release its time logs.
pub fn delete_invoice(conn: &Connection, invoice_id: i64) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE time_logs SET invoice_id = NULL, is_paid = 0, updated_at = ?1
         WHERE invoice_id = ?2",
        params![now_rfc3339(), invoice_id],
    )?;
    tx.execute("DELETE FROM invoices WHERE id = ?1", [invoice_id])?;
    tx.commit()?;
    Ok(())
}
