use serde::Serialize;
use serde_json::{Value, json};

use crate::infrastructure::cache::CacheError;
use crate::infrastructure::scraper::ScrapeError;
use crate::infrastructure::spreadsheet::SpreadsheetError;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorInfo<'a>,
}

#[derive(Serialize)]
struct ErrorInfo<'a> {
    code: &'static str,
    message: &'a str,
    details: &'a Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Spreadsheet { message: String, details: Value },
    #[error("{message}")]
    Scrape { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn spreadsheet(message: impl Into<String>, details: Value) -> Self {
        Self::Spreadsheet {
            message: message.into(),
            details,
        }
    }
    pub fn scrape(message: impl Into<String>, details: Value) -> Self {
        Self::Scrape {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Spreadsheet { .. } => "spreadsheet_error",
            AppError::Scrape { .. } => "scrape_error",
            AppError::Internal { .. } => "internal_error",
        }
    }

    pub fn details(&self) -> &Value {
        match self {
            AppError::Validation { details, .. }
            | AppError::NotFound { details, .. }
            | AppError::Spreadsheet { details, .. }
            | AppError::Scrape { details, .. }
            | AppError::Internal { details, .. } => details,
        }
    }

    /// Renders the error as a JSON document for `--json` output.
    pub fn to_json(&self) -> Value {
        let message = self.to_string();
        let body = ErrorBody {
            error: ErrorInfo {
                code: self.code(),
                message: &message,
                details: self.details(),
            },
        };

        serde_json::to_value(body).unwrap_or_else(|_| json!({"error": {"code": self.code()}}))
    }
}

impl From<SpreadsheetError> for AppError {
    fn from(e: SpreadsheetError) -> Self {
        match e {
            SpreadsheetError::SheetNotFound(sheet) => {
                AppError::not_found("Worksheet not found", json!({"sheet": sheet}))
            }
            other => AppError::spreadsheet("Spreadsheet error", json!({"reason": other.to_string()})),
        }
    }
}

impl From<ScrapeError> for AppError {
    fn from(e: ScrapeError) -> Self {
        AppError::scrape("Failed to retrieve page", json!({"reason": e.to_string()}))
    }
}

impl From<CacheError> for AppError {
    fn from(e: CacheError) -> Self {
        AppError::internal("Cache error", json!({"reason": e.to_string()}))
    }
}
