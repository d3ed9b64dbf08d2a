use crate::errors::{AppError, AppResult};
use crate::export::excel_date::parse_to_excel_date;
use crate::export::model::ExportRecord;
use crate::export::notify_export_success;
use crate::ui::messages::info;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

const HEADER_BG: u32 = 0x2F75B5;
const BANDS: [u32; 2] = [0xEAF3FB, 0xFFFFFF];

/// Columns holding money or hours: two decimals and a total row.
const SUMMED: &[&str] = &["hours", "amount", "subtotal", "total"];
const DECIMAL: &[&str] = &["hours", "rate", "hourly_rate", "amount", "subtotal", "discount", "tax_rate", "total"];

/// Cell formats for one background band.
struct Band {
    text: Format,
    number: Format,
    decimal: Format,
}

impl Band {
    fn new(rgb: u32) -> Self {
        let base = Format::new()
            .set_background_color(Color::RGB(rgb))
            .set_pattern(FormatPattern::Solid)
            .set_border(FormatBorder::Thin);
        Self {
            text: base.clone(),
            number: base.clone().set_align(FormatAlign::Right),
            decimal: base.set_align(FormatAlign::Right).set_num_format("0.00"),
        }
    }
}

/// One sheet per export: bold header, banded rows, a total row for
/// hour and money columns, auto-sized columns.
pub(crate) fn export_xlsx<R: ExportRecord>(records: &[R], sheet: &str, path: &Path) -> AppResult<()> {
    info(format!("Exporting to XLSX: {}", path.display()));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).map_err(to_export_error)?;

    let headers = R::headers();
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(HEADER_BG))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *header, &header_format)
            .map_err(to_export_error)?;
    }
    worksheet.set_freeze_panes(1, 0).ok();

    let bands = [Band::new(BANDS[0]), Band::new(BANDS[1])];
    let decimal_cols: Vec<bool> = headers.iter().map(|h| DECIMAL.contains(h)).collect();
    let mut sums: Vec<Option<f64>> = headers
        .iter()
        .map(|h| SUMMED.contains(h).then_some(0.0))
        .collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        let band = &bands[i % 2];

        for (col, value) in record.to_row().iter().enumerate() {
            let decimal = decimal_cols.get(col).copied().unwrap_or(false);
            let written = write_cell(worksheet, row, col as u16, value, band, decimal)?;

            if let (Some(n), Some(Some(sum))) = (written, sums.get_mut(col)) {
                *sum += n;
            }
            if let Some(w) = widths.get_mut(col) {
                *w = (*w).max(value.width());
            }
        }
    }

    if !records.is_empty() && sums.iter().any(Option::is_some) {
        write_totals(worksheet, (records.len() + 1) as u32, &sums)?;
    }

    for (c, w) in widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, *w as f64 + 2.0)
            .map_err(to_export_error)?;
    }

    workbook.save(path_str(path)?).map_err(to_export_error)?;

    notify_export_success("XLSX", path);
    Ok(())
}

/// Write one cell as a date, a number or text. Returns the numeric value
/// when the cell was written as a number.
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    s: &str,
    band: &Band,
    decimal: bool,
) -> AppResult<Option<f64>> {
    if let Some((num_format, serial)) = parse_to_excel_date(s) {
        let fmt = band.text.clone().set_num_format(num_format);
        worksheet
            .write_with_format(row, col, serial, &fmt)
            .map_err(to_export_error)?;
        return Ok(None);
    }

    if let Ok(num) = s.parse::<f64>() {
        let fmt = if decimal { &band.decimal } else { &band.number };
        worksheet
            .write_with_format(row, col, num, fmt)
            .map_err(to_export_error)?;
        return Ok(Some(num));
    }

    worksheet
        .write_with_format(row, col, s, &band.text)
        .map_err(to_export_error)?;
    Ok(None)
}

fn write_totals(worksheet: &mut Worksheet, row: u32, sums: &[Option<f64>]) -> AppResult<()> {
    let label = Format::new().set_bold().set_border_top(FormatBorder::Thin);
    let value = label.clone().set_align(FormatAlign::Right).set_num_format("0.00");

    worksheet
        .write_with_format(row, 0, "Total", &label)
        .map_err(to_export_error)?;
    for (col, sum) in sums.iter().enumerate() {
        if let Some(sum) = sum {
            worksheet
                .write_with_format(row, col as u16, *sum, &value)
                .map_err(to_export_error)?;
        }
    }
    Ok(())
}

fn to_export_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(e.to_string())
}

fn path_str(path: &Path) -> AppResult<&str> {
    path.to_str()
        .ok_or_else(|| AppError::Export(format!("invalid path: {}", path.display())))
}
