//! Minimal PDF 1.4 writer for the sales report.
//!
//! Produces uncompressed content streams using the standard Helvetica fonts and
//! one embedded JPEG (DCTDecode) image. Pages are A4 portrait.

use super::table::{TABLE_HEADER, TableRow};

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const ROW_HEIGHT: f32 = 18.0;
const CELL_PADDING: f32 = 6.0;
const AVG_GLYPH_WIDTH: f32 = 0.5;

const HEADER_FILL: (f32, f32, f32) = (0.5, 0.5, 0.5);
const HEADER_TEXT: (f32, f32, f32) = (0.96, 0.96, 0.96);
const BODY_FILL: (f32, f32, f32) = (0.96, 0.96, 0.86);
const HISTORICAL_SWATCH: (f32, f32, f32) = (0.12, 0.47, 0.71);
const FORECAST_SWATCH: (f32, f32, f32) = (1.0, 0.5, 0.05);

/// Encoded JPEG plus its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Everything placed in the report, in reading order.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    pub intro: String,
    pub note: Option<String>,
    pub chart: JpegImage,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "/F1",
            Font::Bold => "/F2",
        }
    }
}

/// Lay out `doc` and serialize it to PDF bytes.
pub fn render_pdf(doc: &ReportDocument) -> Vec<u8> {
    let pages = layout(doc);
    serialize(&pages, &doc.chart, &doc.title)
}

/// Number of pages `doc` lays out to.
pub fn page_count(doc: &ReportDocument) -> usize {
    layout(doc).len()
}

struct PageBuilder {
    pages: Vec<String>,
    current: String,
    y: f32,
}

impl PageBuilder {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: String::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn fits(&self, height: f32) -> bool {
        self.y - height >= MARGIN
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure(&mut self, height: f32) {
        if !self.fits(height) {
            self.new_page();
        }
    }

    fn text(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str) {
        self.current.push_str(&format!(
            "BT {} {size} Tf {x:.2} {y:.2} Td ({}) Tj ET\n",
            font.resource(),
            escape_text(text)
        ));
    }

    fn fill_color(&mut self, (r, g, b): (f32, f32, f32)) {
        self.current.push_str(&format!("{r} {g} {b} rg\n"));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.current
            .push_str(&format!("{x:.2} {y:.2} {w:.2} {h:.2} re f\n"));
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.current.push_str(&format!(
            "0 0 0 RG 0.5 w {x:.2} {y:.2} {w:.2} {h:.2} re S\n"
        ));
    }

    /// Left-aligned wrapped paragraph advancing the cursor.
    fn paragraph(&mut self, font: Font, size: f32, text: &str) {
        let leading = size * 1.3;
        for line in wrap(text, size, CONTENT_WIDTH) {
            self.ensure(leading);
            self.y -= leading;
            self.fill_color((0.0, 0.0, 0.0));
            self.text(font, size, MARGIN, self.y, &line);
        }
    }

    fn space(&mut self, height: f32) {
        self.y -= height;
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.new_page();
        }
        self.pages
    }
}

fn layout(doc: &ReportDocument) -> Vec<String> {
    let mut page = PageBuilder::new();
    page.paragraph(Font::Bold, 18.0, &doc.title);
    page.space(10.0);
    page.paragraph(Font::Regular, 10.0, &doc.intro);
    if let Some(note) = &doc.note {
        page.space(6.0);
        page.paragraph(Font::Regular, 10.0, note);
    }
    page.space(14.0);
    layout_chart(&mut page, &doc.chart);
    page.space(16.0);
    page.ensure(14.0 * 1.3 + 2.0 * ROW_HEIGHT);
    page.paragraph(Font::Bold, 14.0, "Detailed Data");
    page.space(8.0);
    layout_table(&mut page, &doc.rows);
    page.finish()
}

fn layout_chart(page: &mut PageBuilder, chart: &JpegImage) {
    let aspect = chart.height.max(1) as f32 / chart.width.max(1) as f32;
    let width = CONTENT_WIDTH - 16.0;
    let height = width * aspect;
    page.ensure(height + 56.0);
    page.paragraph(Font::Bold, 12.0, "Historical vs. Forecasted Sales");
    page.space(4.0);

    let x = MARGIN + 16.0;
    let y = page.y - height;
    page.current.push_str(&format!(
        "q {width:.2} 0 0 {height:.2} {x:.2} {y:.2} cm /Im1 Do Q\n"
    ));
    page.fill_color((0.0, 0.0, 0.0));
    page.current.push_str(&format!(
        "BT /F1 9 Tf 0 1 -1 0 {:.2} {:.2} Tm ({}) Tj ET\n",
        MARGIN + 8.0,
        y + height / 2.0 - 30.0,
        escape_text("Revenue (Units)")
    ));
    page.y = y;

    page.space(14.0);
    page.text(
        Font::Regular,
        9.0,
        x + width / 2.0 - 25.0,
        page.y,
        "Time Period",
    );
    page.space(14.0);
    let legend_y = page.y;
    for (offset, label, color) in [
        (0.0, "Actual Sales", HISTORICAL_SWATCH),
        (110.0, "Forecast", FORECAST_SWATCH),
    ] {
        page.fill_color(color);
        page.fill_rect(x + offset, legend_y, 12.0, 6.0);
        page.fill_color((0.0, 0.0, 0.0));
        page.text(Font::Regular, 9.0, x + offset + 16.0, legend_y, label);
    }
}

fn layout_table(page: &mut PageBuilder, rows: &[TableRow]) {
    table_row(page, TABLE_HEADER, true);
    for row in rows {
        if !page.fits(ROW_HEIGHT) {
            page.new_page();
            table_row(page, TABLE_HEADER, true);
        }
        table_row(page, row.cells(), false);
    }
}

fn table_row(page: &mut PageBuilder, cells: [&str; 3], header: bool) {
    let col_width = CONTENT_WIDTH / TABLE_HEADER.len() as f32;
    page.y -= ROW_HEIGHT;
    let y = page.y;
    page.fill_color(if header { HEADER_FILL } else { BODY_FILL });
    page.fill_rect(MARGIN, y, CONTENT_WIDTH, ROW_HEIGHT);
    page.fill_color(if header { HEADER_TEXT } else { (0.0, 0.0, 0.0) });
    let font = if header { Font::Bold } else { Font::Regular };
    for (i, cell) in cells.iter().enumerate() {
        let cell_x = MARGIN + i as f32 * col_width;
        let text_x = cell_x + ((col_width - text_width(cell, 10.0)) / 2.0).max(CELL_PADDING);
        page.text(font, 10.0, text_x, y + 5.0, cell);
        page.stroke_rect(cell_x, y, col_width, ROW_HEIGHT);
    }
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH
}

/// Greedy word wrap using an average glyph width estimate.
fn wrap(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let max_chars = ((max_width / (size * AVG_GLYPH_WIDTH)) as usize).max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Escape a string literal; characters outside Latin-1 become `?`.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", ch as u32)),
            _ => out.push('?'),
        }
    }
    out
}

struct ObjectWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl ObjectWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    /// Append the next object; ids are assigned sequentially from 1.
    fn object(&mut self, body: &[u8]) {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, dict: &str, data: &[u8]) {
        let mut body = format!("<< {dict} /Length {} >>\nstream\n", data.len()).into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.object(&body);
    }

    fn finish(mut self, root: usize, info: usize) -> Vec<u8> {
        let xref = self.buf.len();
        let size = self.offsets.len() + 1;
        let mut table = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            table.push_str(&format!("{offset:010} 00000 n \n"));
        }
        table.push_str(&format!(
            "trailer\n<< /Size {size} /Root {root} 0 R /Info {info} 0 R >>\nstartxref\n{xref}\n%%EOF\n"
        ));
        self.buf.extend_from_slice(table.as_bytes());
        self.buf
    }
}

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FIRST_PAGE_ID: usize = 6;

fn serialize(pages: &[String], image: &JpegImage, title: &str) -> Vec<u8> {
    let mut out = ObjectWriter::new();
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| FIRST_PAGE_ID + 2 * i).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    out.object(format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").as_bytes());
    out.object(
        format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} >>",
            page_ids.len()
        )
        .as_bytes(),
    );
    out.object(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    out.object(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );
    out.stream(
        &format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode",
            image.width, image.height
        ),
        &image.data,
    );
    for (page_id, content) in page_ids.iter().zip(pages) {
        out.object(
            format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> /XObject << /Im1 5 0 R >> >> \
                 /Contents {} 0 R >>",
                page_id + 1
            )
            .as_bytes(),
        );
        out.stream("", content.as_bytes());
    }
    out.object(
        format!(
            "<< /Title ({}) /Producer (salescast) >>",
            escape_text(title)
        )
        .as_bytes(),
    );
    let info_id = out.offsets.len();
    out.finish(CATALOG_ID, info_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(rows: usize, note: Option<&str>) -> ReportDocument {
        ReportDocument {
            title: "Sales Performance Report: Q1 (draft)".to_string(),
            intro: "Intro text ".repeat(30),
            note: note.map(str::to_string),
            chart: JpegImage {
                width: 960,
                height: 480,
                data: vec![0xFF, 0xD8, 0xFF, 0xD9],
            },
            rows: (0..rows)
                .map(|i| TableRow {
                    period: i.to_string(),
                    actual: format!("{:.2}", i as f64),
                    forecast: "-".to_string(),
                })
                .collect(),
        }
    }

    fn count(haystack: &[u8], needle: &str) -> usize {
        haystack
            .windows(needle.len())
            .filter(|w| *w == needle.as_bytes())
            .count()
    }

    #[test]
    fn short_table_fits_one_page() {
        let doc = document(10, None);
        assert_eq!(page_count(&doc), 1);
        let bytes = render_pdf(&doc);
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert_eq!(count(&bytes, "/Type /Page "), 1);
        assert_eq!(count(&bytes, "/Filter /DCTDecode"), 1);
        assert_eq!(count(&bytes, "(Detailed Data) Tj"), 1);
    }

    #[test]
    fn long_table_repeats_header_on_every_page() {
        let doc = document(120, None);
        let pages = page_count(&doc);
        assert!(pages >= 3);
        let bytes = render_pdf(&doc);
        assert_eq!(count(&bytes, "/Type /Page "), pages);
        // One header per page plus the chart's x-axis label.
        assert_eq!(count(&bytes, "(Time Period) Tj"), pages + 1);
        assert_eq!(count(&bytes, "(119) Tj"), 1);
    }

    #[test]
    fn note_line_is_rendered() {
        let bytes = render_pdf(&document(0, Some("Note: no trained model")));
        assert_eq!(count(&bytes, "(Note: no trained model) Tj"), 1);
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let bytes = render_pdf(&document(5, None));
        let marker = b"startxref\n";
        let pos = bytes
            .windows(marker.len())
            .rposition(|w| w == marker)
            .unwrap();
        let tail = std::str::from_utf8(&bytes[pos + marker.len()..]).unwrap();
        let start: usize = tail.lines().next().unwrap().parse().unwrap();
        let xref = std::str::from_utf8(&bytes[start..]).unwrap();
        assert!(xref.starts_with("xref"));
        let entries: Vec<usize> = xref
            .lines()
            .skip(3)
            .take_while(|line| line.ends_with(" n "))
            .map(|line| line[..10].parse().unwrap())
            .collect();
        assert!(!entries.is_empty());
        for (i, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", i + 1);
            assert!(bytes[*offset..].starts_with(expected.as_bytes()));
        }
    }

    #[test]
    fn escapes_parentheses_and_latin1() {
        assert_eq!(escape_text("a(b)\\"), "a\\(b\\)\\\\");
        assert_eq!(escape_text("R²"), "R\\262");
        assert_eq!(escape_text("→"), "?");
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap(&"word ".repeat(100), 10.0, 100.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| line.chars().count() <= 20));
    }
}
