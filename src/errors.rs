use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sqlx::Error as SqlxError;
use thiserror::Error;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const STORE_UNAVAILABLE: &str = "The enquiry store is currently unreachable. Please try again.";
pub const EXPORT_FAILED: &str = "Could not generate the export. Please try again.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(SqlxError),

    #[error("Database error: {0}")]
    Database(SqlxError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Password hash error: {0}")]
    PasswordHash(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// True when the store could not be reached at all, as opposed to a query
    /// that reached it and failed.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }
}

impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        match err {
            SqlxError::PoolTimedOut
            | SqlxError::PoolClosed
            | SqlxError::Io(_)
            | SqlxError::Tls(_)
            | SqlxError::WorkerCrashed => AppError::StoreUnavailable(err),
            other => AppError::Database(other),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Export(err.to_string())
    }
}

impl From<printpdf::Error> for AppError {
    fn from(err: printpdf::Error) -> Self {
        AppError::Export(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Export(_)
            | AppError::Session(_)
            | AppError::PasswordHash(_)
            | AppError::Template(_)
            | AppError::Config(_)
            | AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal details stay in the log.
        let body = match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::InvalidCredentials => INVALID_CREDENTIALS.to_owned(),
            AppError::StoreUnavailable(_) => STORE_UNAVAILABLE.to_owned(),
            AppError::Export(_) => EXPORT_FAILED.to_owned(),
            _ => "Internal server error".to_owned(),
        };
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(body)
    }
}

impl From<AppError> for std::io::Error {
    fn from(err: AppError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    }
}
