use super::open_session;
use crate::cli::parser::{Commands, InvoiceCmd};
use crate::config::Config;
use crate::core::invoice::{InvoiceDetails, InvoiceLogic};
use crate::errors::AppResult;
use crate::export::{ensure_writable, export_invoice_pdf};
use crate::models::invoice::InvoiceInput;
use crate::ui::messages::{field, header, success, warning};
use crate::utils::colors::{colorize_optional, colorize_status};
use crate::utils::date::{parse_optional_date, parse_range};
use crate::utils::formatting::{money, truncate};
use crate::utils::path::expand_tilde;
use crate::utils::table::Table;

fn print_details(d: &InvoiceDetails, sep: &str) {
    let inv = &d.invoice;
    let cur = inv.currency.as_str();

    header(format!("Invoice {}", inv.number));
    field("Client", &d.client.name);
    field("Issued", inv.issue_date.format("%Y-%m-%d"));
    field(
        "Due",
        colorize_optional(inv.due_date.map(|d| d.format("%Y-%m-%d").to_string()).as_deref()),
    );
    field("Status", colorize_status(inv.status.to_db_str()));

    let mut table = Table::new(&["DESCRIPTION", "HOURS", "RATE", "AMOUNT"]);
    for item in &d.items {
        table.add_row(vec![
            truncate(&item.description, 60),
            format!("{:.2}", item.quantity),
            money(item.unit_price, cur),
            money(item.amount, cur),
        ]);
    }
    table.print(sep);

    field("Subtotal", money(inv.subtotal, cur));
    if inv.discount > 0.0 {
        field("Discount", money(inv.discount, cur));
    }
    if inv.tax_rate > 0.0 {
        field("Tax", format!("{:.2}%", inv.tax_rate));
    }
    field("Total", money(inv.total, cur));
    if let Some(notes) = &inv.notes {
        field("Notes", notes);
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Invoice { action } = cmd else {
        return Ok(());
    };

    let (mut pool, actor) = open_session(cfg)?;

    match action {
        InvoiceCmd::Create {
            client,
            projects,
            range,
            tax,
            discount,
            due,
            issued,
            notes,
        } => {
            let bounds = match range {
                Some(r) => parse_range(r)?,
                None => None,
            };
            let input = InvoiceInput {
                project_ids: projects.clone(),
                from: bounds.map(|(f, _)| f),
                to: bounds.map(|(_, t)| t),
                tax_rate: *tax,
                discount: *discount,
                due_date: parse_optional_date(due.as_ref())?,
                notes: notes.clone(),
                issue_date: parse_optional_date(issued.as_ref())?,
            };
            let details = InvoiceLogic::create(&mut pool, &actor, *client, &input)?;
            success(format!(
                "Invoice {} created for {} ({} items, total {})",
                details.invoice.number,
                details.client.name,
                details.items.len(),
                money(details.invoice.total, &details.invoice.currency)
            ));
        }

        InvoiceCmd::List { status } => {
            let invoices = InvoiceLogic::list(&mut pool, &actor, *status)?;
            if invoices.is_empty() {
                warning("No invoices found.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "NUMBER", "CLIENT", "ISSUED", "DUE", "TOTAL", "STATUS"]);
            for inv in &invoices {
                table.add_row(vec![
                    inv.id.to_string(),
                    inv.number.clone(),
                    format!("#{}", inv.client_id),
                    inv.issue_date.format("%Y-%m-%d").to_string(),
                    colorize_optional(inv.due_date.map(|d| d.format("%Y-%m-%d").to_string()).as_deref()),
                    money(inv.total, &inv.currency),
                    colorize_status(inv.status.to_db_str()),
                ]);
            }
            table.print(&cfg.separator_char);
        }

        InvoiceCmd::Show { id } => {
            let details = InvoiceLogic::details(&mut pool, &actor, *id)?;
            print_details(&details, &cfg.separator_char);
        }

        InvoiceCmd::Status { id, status } => {
            let inv = InvoiceLogic::set_status(&mut pool, &actor, *id, *status)?;
            success(format!(
                "Invoice {} is now {}",
                inv.number,
                colorize_status(inv.status.to_db_str())
            ));
        }

        InvoiceCmd::Del { id } => {
            InvoiceLogic::delete(&mut pool, &actor, *id)?;
            success(format!("Invoice #{id} deleted; its time logs can be billed again"));
        }

        InvoiceCmd::Pdf { id, file, force } => {
            let details = InvoiceLogic::details(&mut pool, &actor, *id)?;
            let path = expand_tilde(file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            ensure_writable(&path, *force)?;
            export_invoice_pdf(&details, &path)?;
        }
    }

    Ok(())
}
