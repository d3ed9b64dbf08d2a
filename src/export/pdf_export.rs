use crate::core::invoice::InvoiceDetails;
use crate::errors::{AppError, AppResult};
use crate::export::model::{ExportRecord, to_table};
use crate::export::notify_export_success;
use crate::export::pdf::PdfReport;
use crate::ui::messages::info;
use crate::utils::formatting::money;
use std::path::Path;

pub(crate) fn export_pdf<R: ExportRecord>(records: &[R], path: &Path, title: &str) -> AppResult<()> {
    info(format!("Exporting to PDF: {}", path.display()));

    let mut pdf = PdfReport::new(title);
    pdf.table(R::headers(), &to_table(records));
    pdf.save(path)
        .map_err(|e| AppError::Export(format!("PDF export error: {e}")))?;

    notify_export_success("PDF", path);
    Ok(())
}

/// Render an invoice: client block, one row per item, then the totals.
pub fn export_invoice_pdf(details: &InvoiceDetails, path: &Path) -> AppResult<()> {
    let inv = &details.invoice;
    let cur = inv.currency.as_str();

    let mut intro = vec![
        format!("Invoice: {}", inv.number),
        format!("Issued: {}", inv.issue_date.format("%Y-%m-%d")),
    ];
    if let Some(due) = inv.due_date {
        intro.push(format!("Due: {}", due.format("%Y-%m-%d")));
    }
    intro.push(format!("Status: {}", inv.status.to_db_str()));
    intro.push(String::new());
    intro.push(format!("Bill to: {}", details.client.name));
    if let Some(email) = &details.client.email {
        intro.push(email.clone());
    }
    if let Some(address) = &details.client.address {
        intro.extend(address.lines().map(str::to_string));
    }

    let rows: Vec<Vec<String>> = details
        .items
        .iter()
        .map(|i| {
            vec![
                i.description.clone(),
                format!("{:.2}", i.quantity),
                money(i.unit_price, cur),
                money(i.amount, cur),
            ]
        })
        .collect();

    let mut outro = vec![format!("Subtotal: {}", money(inv.subtotal, cur))];
    if inv.discount > 0.0 {
        outro.push(format!("Discount: -{}", money(inv.discount, cur)));
    }
    if inv.tax_rate > 0.0 {
        outro.push(format!("Tax: {:.2}%", inv.tax_rate));
    }
    outro.push(format!("Total: {}", money(inv.total, cur)));
    if let Some(notes) = &inv.notes {
        outro.push(String::new());
        outro.extend(notes.lines().map(str::to_string));
    }

    let mut pdf = PdfReport::new(&format!("Invoice {}", inv.number));
    pdf.lines(&intro);
    pdf.gap();
    pdf.table(&["description", "hours", "rate", "amount"], &rows);
    pdf.gap();
    pdf.lines(&outro);
    pdf.save(path)
        .map_err(|e| AppError::Export(format!("PDF export error: {e}")))?;

    notify_export_success("Invoice PDF", path);
    Ok(())
}
