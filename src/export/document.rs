//! Paginated PDF rendering of the enquiry table.
//!
//! Layout is computed up front in points, measured from the top of the page,
//! and only then drawn with `printpdf`. Keeping the two apart lets the page
//! breaking be checked without parsing PDF output.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point,
    Polygon, Rgb,
};

use super::text::{printable, text_width, wrap, Face};
use super::{rows, EXPORT_TITLE};
use crate::{errors::AppError, structs::Enquiry, structs::ENQUIRY_COLUMNS};

// US Letter, in points.
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 36.0;

/// id, name, email, phone, furniture_type, message, timestamp.
pub const COLUMN_WIDTHS: [f32; 7] = [30.0, 75.0, 105.0, 70.0, 90.0, 80.0, 90.0];

const TITLE_SIZE: f32 = 12.0;
const TITLE_BLOCK: f32 = TITLE_SIZE * 1.2 + 24.0;
pub const CELL_SIZE: f32 = 8.0;
pub const LEADING: f32 = 10.0;
pub const PAD_X: f32 = 3.0;
pub const PAD_Y: f32 = 4.0;

const HEADER_FILL: (f32, f32, f32) = (0.847, 0.824, 0.918);
const GRID: (f32, f32, f32) = (0.8, 0.8, 0.8);
const INK: (f32, f32, f32) = (0.2, 0.2, 0.2);

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRow {
    /// Distance from the top edge of the page.
    pub top: f32,
    pub height: f32,
    pub header: bool,
    /// Wrapped lines per column.
    pub cells: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub title: bool,
    pub rows: Vec<PlacedRow>,
}

impl PageLayout {
    pub fn data_rows(&self) -> impl Iterator<Item = &PlacedRow> {
        self.rows.iter().filter(|r| !r.header)
    }
}

pub fn inner_width(column: usize) -> f32 {
    COLUMN_WIDTHS[column] - 2.0 * PAD_X
}

fn row_height(cells: &[Vec<String>]) -> f32 {
    let lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
    lines as f32 * LEADING + 2.0 * PAD_Y
}

fn wrap_row<S: AsRef<str>>(values: &[S], face: Face) -> Vec<Vec<String>> {
    values
        .iter()
        .enumerate()
        .map(|(col, v)| wrap(&printable(v.as_ref()), face, CELL_SIZE, inner_width(col)))
        .collect()
}

struct Paginator {
    pages: Vec<PageLayout>,
    header: Vec<Vec<String>>,
    cursor: f32,
    data_on_page: usize,
}

impl Paginator {
    fn new(header: Vec<Vec<String>>) -> Self {
        let mut p = Paginator {
            pages: Vec::new(),
            header,
            cursor: 0.0,
            data_on_page: 0,
        };
        p.start_page();
        p
    }

    fn start_page(&mut self) {
        let title = self.pages.is_empty();
        self.cursor = MARGIN + if title { TITLE_BLOCK } else { 0.0 };
        let height = row_height(&self.header);
        let header = PlacedRow {
            top: self.cursor,
            height,
            header: true,
            cells: self.header.clone(),
        };
        self.cursor += height;
        self.data_on_page = 0;
        self.pages.push(PageLayout {
            title,
            rows: vec![header],
        });
    }

    fn available(&self) -> f32 {
        PAGE_HEIGHT - MARGIN - self.cursor
    }

    fn place(&mut self, cells: Vec<Vec<String>>) {
        let height = row_height(&cells);
        let row = PlacedRow {
            top: self.cursor,
            height,
            header: false,
            cells,
        };
        self.cursor += height;
        self.data_on_page += 1;
        if let Some(page) = self.pages.last_mut() {
            page.rows.push(row);
        }
    }

    fn push_row(&mut self, mut cells: Vec<Vec<String>>) {
        loop {
            if row_height(&cells) <= self.available() {
                self.place(cells);
                return;
            }
            if self.data_on_page > 0 {
                self.start_page();
                continue;
            }
            // Taller than a whole page: fill this one and carry the rest over.
            let fit = (((self.available() - 2.0 * PAD_Y) / LEADING).floor() as usize).max(1);
            let rest: Vec<Vec<String>> = cells
                .iter_mut()
                .map(|lines| lines.split_off(fit.min(lines.len())))
                .collect();
            self.place(cells);
            self.start_page();
            cells = rest;
        }
    }
}

/// Lay out title, header and data rows across as many pages as needed.
pub fn layout<S: AsRef<str>>(data: &[Vec<S>]) -> Vec<PageLayout> {
    let mut paginator = Paginator::new(wrap_row(&ENQUIRY_COLUMNS, Face::Bold));
    for values in data {
        paginator.push_row(wrap_row(values, Face::Regular));
    }
    paginator.pages
}

pub fn render(enquiries: &[Enquiry]) -> Result<Vec<u8>, AppError> {
    let pages = layout(&rows(enquiries));

    let (doc, first_page, first_layer) =
        PdfDocument::new(EXPORT_TITLE, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        draw_page(&layer, page, &regular, &bold);
    }

    log::debug!("Rendered {} enquiries on {} PDF pages", enquiries.len(), pages.len());
    Ok(doc.save_to_bytes()?)
}

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

/// Converts a top-relative coordinate pair into a PDF point.
fn at(x: f32, top: f32) -> Point {
    Point::new(mm(x), mm(PAGE_HEIGHT - top))
}

fn rgb((r, g, b): (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn corners(x: f32, top: f32, w: f32, h: f32) -> Vec<(Point, bool)> {
    vec![
        (at(x, top), false),
        (at(x + w, top), false),
        (at(x + w, top + h), false),
        (at(x, top + h), false),
    ]
}

fn draw_page(
    layer: &PdfLayerReference,
    page: &PageLayout,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    if page.title {
        let width = text_width(EXPORT_TITLE, Face::Bold, TITLE_SIZE);
        layer.set_fill_color(rgb(INK));
        layer.use_text(
            EXPORT_TITLE,
            TITLE_SIZE,
            mm((PAGE_WIDTH - width) / 2.0),
            mm(PAGE_HEIGHT - MARGIN - TITLE_SIZE),
            bold,
        );
    }

    layer.set_outline_color(rgb(GRID));
    layer.set_outline_thickness(0.5);

    for row in &page.rows {
        let (face, font) = if row.header {
            (Face::Bold, bold)
        } else {
            (Face::Regular, regular)
        };
        let mut x = MARGIN;
        for (col, lines) in row.cells.iter().enumerate() {
            let w = COLUMN_WIDTHS[col];
            if row.header {
                layer.set_fill_color(rgb(HEADER_FILL));
                layer.add_polygon(Polygon {
                    rings: vec![corners(x, row.top, w, row.height)],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                });
            }
            layer.add_line(Line {
                points: corners(x, row.top, w, row.height),
                is_closed: true,
            });

            layer.set_fill_color(rgb(INK));
            let block = lines.len() as f32 * LEADING;
            let first_baseline = row.top + (row.height - block) / 2.0 + LEADING * 0.8;
            for (i, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let tw = text_width(line, face, CELL_SIZE);
                layer.use_text(
                    line.as_str(),
                    CELL_SIZE,
                    mm(x + (w - tw) / 2.0),
                    mm(PAGE_HEIGHT - (first_baseline + i as f32 * LEADING)),
                    font,
                );
            }
            x += w;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: usize, message: &str) -> Vec<String> {
        vec![
            id.to_string(),
            "Priya Raman".into(),
            "priya@example.com".into(),
            "+91 98450 12345".into(),
            "Resin Furniture- Coffee Table".into(),
            message.into(),
            "2025-06-01 10:15:00".into(),
        ]
    }

    fn bottom(row: &PlacedRow) -> f32 {
        row.top + row.height
    }

    #[test]
    fn columns_fit_between_the_margins() {
        let total: f32 = COLUMN_WIDTHS.iter().sum();
        assert!(total <= PAGE_WIDTH - 2.0 * MARGIN);
        let widest = COLUMN_WIDTHS.iter().cloned().fold(0.0, f32::max);
        assert_eq!(widest, COLUMN_WIDTHS[2], "email is the widest column");
        assert!(COLUMN_WIDTHS[0] < COLUMN_WIDTHS[1], "id is the narrowest column");
    }

    #[test]
    fn standard_timestamp_fits_on_one_line() {
        let stamp = "2025-12-31 23:59:59";
        assert!(text_width(stamp, Face::Regular, CELL_SIZE) <= inner_width(6));
        assert_eq!(wrap(stamp, Face::Regular, CELL_SIZE, inner_width(6)), vec![stamp.to_string()]);
    }

    #[test]
    fn empty_set_is_title_and_header_only() {
        let pages = layout::<String>(&[]);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].title);
        assert_eq!(pages[0].rows.len(), 1);
        assert!(pages[0].rows[0].header);
        assert_eq!(pages[0].rows[0].cells.len(), ENQUIRY_COLUMNS.len());
    }

    #[test]
    fn long_message_wraps_inside_its_own_cell() {
        let message = "We would like a conference table for twelve with a deep green resin \
                       river, brass inlays and a matte finish, delivered before the end of \
                       the quarter if at all possible.";
        let pages = layout(&[record(1, message)]);
        let row = pages[0].data_rows().next().unwrap();
        let cell = &row.cells[5];

        assert!(cell.len() > 1);
        for line in cell {
            assert!(text_width(line, Face::Regular, CELL_SIZE) <= inner_width(5));
        }
        assert_eq!(cell.join(" "), message.split_whitespace().collect::<Vec<_>>().join(" "));
        // Neighbouring cells are untouched and the row grows to fit.
        assert_eq!(row.cells[6], vec!["2025-06-01 10:15:00".to_string()]);
        assert_eq!(row.height, cell.len() as f32 * LEADING + 2.0 * PAD_Y);
    }

    #[test]
    fn many_rows_paginate_with_a_header_on_every_page() {
        let data: Vec<_> = (1..=150).map(|i| record(i, "short")).collect();
        let pages = layout(&data);
        assert!(pages.len() > 1);
        assert!(pages[0].title);
        assert!(pages[1..].iter().all(|p| !p.title));

        let mut placed = 0;
        for page in &pages {
            assert!(page.rows[0].header);
            for row in &page.rows {
                assert!(bottom(row) <= PAGE_HEIGHT - MARGIN + 1e-3);
            }
            placed += page.data_rows().count();
        }
        assert_eq!(placed, 150);
    }

    #[test]
    fn row_taller_than_a_page_continues_on_the_next() {
        let message = "resin ".repeat(2000);
        let pages = layout(&[record(7, &message)]);
        assert!(pages.len() > 1);

        let continued: Vec<String> = pages
            .iter()
            .flat_map(|p| p.data_rows())
            .flat_map(|r| r.cells[5].iter().cloned())
            .collect();
        let expected = wrap(&message, Face::Regular, CELL_SIZE, inner_width(5));
        assert_eq!(continued, expected);

        for page in &pages {
            for row in &page.rows {
                assert!(bottom(row) <= PAGE_HEIGHT - MARGIN + 1e-3);
            }
        }
    }

    #[test]
    fn render_produces_a_pdf() {
        let bytes = render(&[]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
