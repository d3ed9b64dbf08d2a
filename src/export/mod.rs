//! File exports of the actor's data, plus invoice PDFs.

mod excel_date;
mod fs_utils;
mod json_csv;
pub mod logic;
pub mod model;
mod pdf;
mod pdf_export;
mod xlsx;

pub use fs_utils::ensure_writable;
pub use logic::ExportLogic;
pub use pdf_export::export_invoice_pdf;

use crate::ui::messages::success;
use clap::ValueEnum;
use std::path::Path;

pub(crate) fn notify_export_success(label: &str, path: &Path) {
    success(format!("{label} export completed: {}", path.display()));
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// What to export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportEntity {
    TimeLogs,
    Clients,
    Projects,
    Tasks,
    Invoices,
}

impl ExportEntity {
    pub fn title(&self) -> &'static str {
        match self {
            ExportEntity::TimeLogs => "Time logs",
            ExportEntity::Clients => "Clients",
            ExportEntity::Projects => "Projects",
            ExportEntity::Tasks => "Tasks",
            ExportEntity::Invoices => "Invoices",
        }
    }

    /// Whether `--range` filters this entity.
    pub fn is_dated(&self) -> bool {
        matches!(
            self,
            ExportEntity::TimeLogs | ExportEntity::Tasks | ExportEntity::Invoices
        )
    }
}
