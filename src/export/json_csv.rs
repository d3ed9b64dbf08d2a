use crate::errors::AppResult;
use crate::export::model::ExportRecord;
use crate::export::notify_export_success;
use crate::ui::messages::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub(crate) fn export_json<R: ExportRecord>(records: &[R], path: &Path) -> AppResult<()> {
    info(format!("Exporting to JSON: {}", path.display()));

    let json_data = serde_json::to_string_pretty(records)?;
    let mut file = File::create(path)?;
    file.write_all(json_data.as_bytes())?;

    notify_export_success("JSON", path);
    Ok(())
}

/// The header row is written even for an empty dataset.
pub(crate) fn export_csv<R: ExportRecord>(records: &[R], path: &Path) -> AppResult<()> {
    info(format!("Exporting to CSV: {}", path.display()));

    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(R::headers())?;
    for item in records {
        wtr.write_record(item.to_row())?;
    }
    wtr.flush()?;

    notify_export_success("CSV", path);
    Ok(())
}
