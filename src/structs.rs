use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;

/// Separator used when the selected categories are flattened into one column.
pub const CATEGORY_SEPARATOR: &str = ", ";

/// Export column schema, in display order.
pub const ENQUIRY_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "email",
    "phone",
    "furniture_type",
    "message",
    "timestamp",
];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const FURNITURE_CATEGORIES: [&str; 17] = [
    "Resin Furniture- Coffee Table",
    "Resin Furniture-Center Table",
    "Resin Furniture- Wall Panels",
    "Resin Furniture- Dining Table",
    "Resin Furniture- Conference Table",
    "Wall Decors - Geocode Wall Art",
    "Wall Decors-Ocean Inspired Wall Panels",
    "Wall Decors - Resin Wall Clock",
    "Functional Decors - Theme Based Coaster Set",
    "Functional Decors - Wood Resin Trays",
    "Functional Decors - Customized Name Plates",
    "Preservation Arts - Wedding Varmala's & Florals",
    "Preservation Art - Umbilical Cords",
    "Preservation Art - Pet Keepsakes",
    "Corporate Corner - Corporate Gifting",
    "Corporate Corner - Resin Trophies & Medals",
    "Corporate Corner - Artistic Resin Furniture & Corporate Spaces",
];

/// One stored customer submission.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Enquiry {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub furniture_type: String,
    pub message: Option<String>,
    pub timestamp: NaiveDateTime,
}

impl Enquiry {
    /// The selected categories, in the order they were submitted.
    pub fn categories(&self) -> Vec<String> {
        split_categories(&self.furniture_type)
    }

    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Credential {
    pub username: String,
    pub pwd_hash: String,
}

/// A submission that passed presence checks and is ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnquiry {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub categories: Vec<String>,
    pub message: String,
}

impl NewEnquiry {
    pub fn validate(
        name: &str,
        email: &str,
        phone: &str,
        categories: &[String],
        message: &str,
    ) -> Result<Self, AppError> {
        let mut selected: Vec<String> = Vec::with_capacity(categories.len());
        for label in categories.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            if label.contains(',') {
                return Err(AppError::Validation(format!(
                    "Furniture type \"{label}\" must not contain a comma."
                )));
            }
            if !selected.iter().any(|s| s == label) {
                selected.push(label.to_owned());
            }
        }

        // Whitespace-only input counts as missing; accepted values are stored as typed.
        let blank = |s: &str| s.trim().is_empty();
        if blank(name) || blank(email) || blank(phone) || selected.is_empty() {
            return Err(AppError::Validation(
                "Please fill all required fields (Name, Email, Phone, Furniture Types).".into(),
            ));
        }

        Ok(NewEnquiry {
            name: name.to_owned(),
            email: email.to_owned(),
            phone: phone.to_owned(),
            categories: selected,
            message: message.to_owned(),
        })
    }

    pub fn furniture_type(&self) -> String {
        self.categories.join(CATEGORY_SEPARATOR)
    }
}

pub fn split_categories(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
