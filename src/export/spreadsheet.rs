use rust_xlsxwriter::{Format, FormatAlign, Workbook};

use super::{rows, EXPORT_TITLE};
use crate::{
    errors::AppError,
    structs::{Enquiry, ENQUIRY_COLUMNS},
};

pub const SHEET_NAME: &str = "Enquiries";
pub const MAX_COLUMN_WIDTH: usize = 50;
/// Excel refuses cell strings longer than this many characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Cut `value` to at most [`MAX_CELL_CHARS`] characters, on a char boundary.
pub fn clip_to_cell_limit(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

/// Width per column: longest rendered value plus two, capped at
/// [`MAX_COLUMN_WIDTH`]. Headers take part, the merged title does not.
pub fn column_widths(data: &[Vec<String>]) -> [usize; 7] {
    let mut widths = [0usize; 7];
    for (col, header) in ENQUIRY_COLUMNS.iter().enumerate() {
        widths[col] = header.chars().count();
    }
    for row in data {
        for (col, value) in row.iter().enumerate().take(widths.len()) {
            widths[col] = widths[col].max(value.chars().count());
        }
    }
    widths.map(|w| (w + 2).min(MAX_COLUMN_WIDTH))
}

pub fn render(enquiries: &[Enquiry]) -> Result<Vec<u8>, AppError> {
    let data = rows(enquiries);
    let last_col = (ENQUIRY_COLUMNS.len() - 1) as u16;

    let mut workbook = Workbook::new();
    let title_format = Format::new()
        .set_bold()
        .set_font_size(14)
        .set_align(FormatAlign::Center);
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.merge_range(0, 0, 0, last_col, EXPORT_TITLE, &title_format)?;

    for (col, header) in ENQUIRY_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(1, col as u16, *header, &header_format)?;
    }

    for (offset, enquiry) in enquiries.iter().enumerate() {
        let row = offset as u32 + 2;
        sheet.write_number(row, 0, enquiry.id as f64)?;
        for (col, value) in data[offset].iter().enumerate().skip(1) {
            let clipped = clip_to_cell_limit(value);
            if clipped.len() < value.len() {
                log::warn!(
                    "Enquiry {}: {} clipped to {} characters in xlsx export",
                    enquiry.id,
                    ENQUIRY_COLUMNS[col],
                    MAX_CELL_CHARS
                );
            }
            sheet.write_string(row, col as u16, clipped)?;
        }
    }

    for (col, width) in column_widths(&data).iter().enumerate() {
        sheet.set_column_width(col as u16, *width as f64)?;
    }

    log::debug!("Rendered {} enquiries to xlsx", enquiries.len());
    Ok(workbook.save_to_buffer()?)
}
