use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use std::fs;
use std::path::Path;

const PAGE_W: f32 = 595.0;
const PAGE_H: f32 = 842.0;
const MARGIN: f32 = 50.0;
const ROW_H: f32 = 20.0;
const LINE_H: f32 = 16.0;

const BODY_PT: f32 = 10.0;
const HEADER_PT: f32 = 11.0;
const TITLE_PT: f32 = 14.0;

const HEADER_FILL: (f32, f32, f32) = (0.85, 0.87, 0.90);
const STRIPE_FILL: (f32, f32, f32) = (0.96, 0.96, 0.96);

const FONT: Name<'static> = Name(b"F1");

/// Helvetica only covers Latin-1; anything else is replaced.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

/// Numbers are right-aligned inside their cell.
fn is_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.parse::<f64>().is_ok()
}

/// A page being filled, top to bottom.
struct Page {
    content: Content,
    y: f32,
}

impl Page {
    fn new(title: &str) -> Self {
        let mut page = Self {
            content: Content::new(),
            y: PAGE_H - MARGIN - 20.0,
        };
        page.text(MARGIN, PAGE_H - MARGIN + 15.0, TITLE_PT, title);
        page
    }

    fn fits(&self, height: f32) -> bool {
        self.y - height >= MARGIN
    }

    fn text(&mut self, x: f32, y: f32, size: f32, text: &str) {
        let bytes = latin1(text);
        self.content.begin_text();
        self.content.set_font(FONT, size);
        self.content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        self.content.show(Str(&bytes));
        self.content.end_text();
    }

    fn line(&mut self, text: &str) {
        self.y -= LINE_H;
        let y = self.y;
        self.text(MARGIN, y, BODY_PT, text);
    }

    fn band(&mut self, width: f32, (r, g, b): (f32, f32, f32)) {
        self.content.save_state();
        self.content.set_fill_rgb(r, g, b);
        self.content.rect(MARGIN, self.y, width, ROW_H);
        self.content.fill_nonzero();
        self.content.restore_state();
    }

    fn row(&mut self, widths: &[f32], cells: &[String], size: f32, fill: Option<(f32, f32, f32)>) {
        self.y -= ROW_H;
        if let Some(rgb) = fill {
            self.band(widths.iter().sum(), rgb);
        }

        let y = self.y;
        let mut x = MARGIN;
        for (cell, w) in cells.iter().zip(widths) {
            // ~0.55em per Helvetica glyph
            let glyph_w = size * 0.55;
            let max_chars = ((w - 8.0) / glyph_w).max(1.0) as usize;
            let shown = crate::utils::formatting::truncate(cell, max_chars);
            let tx = if is_numeric(cell) {
                x + w - 4.0 - shown.chars().count() as f32 * glyph_w
            } else {
                x + 4.0
            };
            self.text(tx, y + 5.0, size, &shown);

            self.content.save_state();
            self.content.set_stroke_rgb(0.65, 0.65, 0.65);
            self.content.rect(x, y, *w, ROW_H);
            self.content.stroke();
            self.content.restore_state();
            x += w;
        }
    }
}

/// Multi-page A4 report: a title on every page, free text lines around a
/// bordered table whose header repeats after each page break, and
/// `Page i of n` footers.
pub struct PdfReport {
    title: String,
    done: Vec<Page>,
    current: Page,
}

impl PdfReport {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            done: Vec::new(),
            current: Page::new(title),
        }
    }

    fn break_page(&mut self) {
        let next = Page::new(&self.title);
        self.done.push(std::mem::replace(&mut self.current, next));
    }

    pub fn lines(&mut self, lines: &[String]) {
        for line in lines {
            if !self.current.fits(LINE_H) {
                self.break_page();
            }
            self.current.line(line);
        }
    }

    pub fn gap(&mut self) {
        if self.current.fits(LINE_H) {
            self.current.y -= LINE_H;
        }
    }

    pub fn table(&mut self, headers: &[&str], rows: &[Vec<String>]) {
        let widths = col_widths(headers, rows);
        let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

        if !self.current.fits(2.0 * ROW_H) {
            self.break_page();
        }
        self.current.row(&widths, &header, HEADER_PT, Some(HEADER_FILL));

        for (i, row) in rows.iter().enumerate() {
            if !self.current.fits(ROW_H) {
                self.break_page();
                self.current.row(&widths, &header, HEADER_PT, Some(HEADER_FILL));
            }
            let stripe = (i % 2 == 0).then_some(STRIPE_FILL);
            self.current.row(&widths, row, BODY_PT, stripe);
        }
    }

    pub fn save(mut self, path: &Path) -> std::io::Result<()> {
        self.done.push(self.current);
        let total = self.done.len();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);
        let mut next = 4;

        let mut pdf = Pdf::new();
        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

        let mut kids = Vec::with_capacity(total);
        for (i, mut page) in self.done.into_iter().enumerate() {
            page.text(
                PAGE_W - MARGIN - 70.0,
                MARGIN - 35.0,
                BODY_PT,
                &format!("Page {} of {}", i + 1, total),
            );

            let page_id = Ref::new(next);
            let content_id = Ref::new(next + 1);
            next += 2;
            kids.push(page_id);

            let mut writer = pdf.page(page_id);
            writer
                .parent(pages_id)
                .media_box(Rect::new(0.0, 0.0, PAGE_W, PAGE_H))
                .contents(content_id);
            writer.resources().fonts().pair(FONT, font_id);
            drop(writer);

            pdf.stream(content_id, &page.content.finish());
        }

        pdf.pages(pages_id).count(total as i32).kids(kids);
        pdf.catalog(catalog_id).pages(pages_id);

        fs::write(path, pdf.finish())
    }
}

/// Column widths from header and cell lengths, scaled down to the printable width.
fn col_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<f32> {
    let mut widths: Vec<f32> = headers.iter().map(|h| h.len() as f32 * 6.5).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = w.max(cell.chars().count() as f32 * 6.2);
        }
    }

    let total: f32 = widths.iter().sum();
    let printable = PAGE_W - 2.0 * MARGIN;
    if total > printable {
        let scale = printable / total;
        widths.iter_mut().for_each(|w| *w *= scale);
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_latin1_text_is_replaced() {
        assert_eq!(latin1("café €"), vec![b'c', b'a', b'f', 0xE9, b' ', b'?']);
    }

    #[test]
    fn wide_tables_are_scaled_to_the_page() {
        let rows = vec![vec!["x".repeat(200), "y".repeat(200)]];
        let widths = col_widths(&["a", "b"], &rows);
        let total: f32 = widths.iter().sum();
        assert!((total - (PAGE_W - 2.0 * MARGIN)).abs() < 0.01);
    }

    #[test]
    fn long_tables_break_pages() {
        let rows: Vec<Vec<String>> = (0..100).map(|i| vec![i.to_string()]).collect();
        let mut report = PdfReport::new("t");
        report.table(&["n"], &rows);
        assert!(!report.done.is_empty());
    }
}
