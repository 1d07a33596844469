//! Owner-side exports of the enquiry table.
//!
//! - `spreadsheet`: single-sheet xlsx workbook
//! - `document`: paginated PDF with wrapped cells
//! - `text`: Helvetica metrics and line breaking used by `document`
//! - `ExportCache`: last generated buffer per format, keyed by table contents

pub mod document;
pub mod spreadsheet;
pub mod text;

use std::{collections::HashMap, sync::Mutex};

use chrono::NaiveDateTime;

use crate::{db::EnquirySetKey, errors::AppError, structs::Enquiry};

pub const EXPORT_TITLE: &str = "Sylva Decors Inquiry List";
pub const FILENAME_PREFIX: &str = "sylva_decors_enquiries";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Spreadsheet,
    Document,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Document => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Document => "application/pdf",
        }
    }

    pub fn render(self, enquiries: &[Enquiry]) -> Result<Vec<u8>, AppError> {
        match self {
            ExportFormat::Spreadsheet => spreadsheet::render(enquiries),
            ExportFormat::Document => document::render(enquiries),
        }
    }
}

/// Display strings for each record, in `ENQUIRY_COLUMNS` order. A missing
/// message renders as an empty cell.
pub fn rows(enquiries: &[Enquiry]) -> Vec<Vec<String>> {
    enquiries
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.name.clone(),
                e.email.clone(),
                e.phone.clone(),
                e.furniture_type.clone(),
                e.message_text().to_owned(),
                e.timestamp_text(),
            ]
        })
        .collect()
}

pub fn export_filename(format: ExportFormat, now: NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        FILENAME_PREFIX,
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Holds the most recent export per format. An entry is only served while the
/// table still matches the key it was generated for; enquiries are append-only,
/// so any new submission changes the key.
#[derive(Debug, Default)]
pub struct ExportCache {
    entries: Mutex<HashMap<ExportFormat, (EnquirySetKey, Vec<u8>)>>,
}

impl ExportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, format: ExportFormat, key: EnquirySetKey) -> Option<Vec<u8>> {
        let entries = self.entries.lock().ok()?;
        match entries.get(&format) {
            Some((cached_key, bytes)) if *cached_key == key => Some(bytes.clone()),
            _ => None,
        }
    }

    pub fn put(&self, format: ExportFormat, key: EnquirySetKey, bytes: Vec<u8>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(format, (key, bytes));
        }
    }

    /// Return the cached buffer for `enquiries`, rendering and storing it on a
    /// miss. Render failures are not cached.
    pub fn get_or_render(
        &self,
        format: ExportFormat,
        enquiries: &[Enquiry],
    ) -> Result<Vec<u8>, AppError> {
        let key = EnquirySetKey::of(enquiries);
        if let Some(bytes) = self.get(format, key) {
            log::debug!("Serving cached {} export for {:?}", format.extension(), key);
            return Ok(bytes);
        }
        let bytes = format.render(enquiries)?;
        self.put(format, key, bytes.clone());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn enquiry(id: i64, message: Option<&str>) -> Enquiry {
        Enquiry {
            id,
            name: "Meera".into(),
            email: "meera@example.com".into(),
            phone: "080 2222 3333".into(),
            furniture_type: "Resin Furniture- Dining Table, Wall Decors - Resin Wall Clock".into(),
            message: message.map(str::to_owned),
            timestamp: at(9, 5, 7),
        }
    }

    #[test]
    fn filename_has_prefix_and_second_precision_suffix() {
        assert_eq!(
            export_filename(ExportFormat::Spreadsheet, at(14, 3, 9)),
            "sylva_decors_enquiries_20250601_140309.xlsx"
        );
        assert_eq!(
            export_filename(ExportFormat::Document, at(0, 0, 0)),
            "sylva_decors_enquiries_20250601_000000.pdf"
        );
    }

    #[test]
    fn missing_message_renders_as_empty_text() {
        let rendered = rows(&[enquiry(3, None)]);
        assert_eq!(rendered[0][5], "");
        assert_eq!(rendered[0][0], "3");
        assert_eq!(rendered[0][6], "2025-06-01 09:05:07");
    }

    #[test]
    fn cache_hits_only_for_the_same_enquiry_set() {
        let cache = ExportCache::new();
        let one = vec![enquiry(1, Some("hello"))];
        let first = cache.get_or_render(ExportFormat::Document, &one).unwrap();
        assert_eq!(
            cache.get(ExportFormat::Document, EnquirySetKey::of(&one)),
            Some(first)
        );
        assert_eq!(cache.get(ExportFormat::Spreadsheet, EnquirySetKey::of(&one)), None);

        let two = vec![enquiry(1, Some("hello")), enquiry(2, None)];
        assert_eq!(cache.get(ExportFormat::Document, EnquirySetKey::of(&two)), None);
        cache.get_or_render(ExportFormat::Document, &two).unwrap();
        assert_eq!(cache.get(ExportFormat::Document, EnquirySetKey::of(&one)), None);
    }
}
