use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::MetricName;

pub type CoreResult<T> = Result<T, CoreError>;

/// A sheet could not be turned into a rectangular, typed grid.
///
/// Every variant names the sheet so the message can be shown to the end user
/// as-is.
#[derive(Debug, Clone, Error)]
pub enum SourceFormatError {
    #[error("sheet '{sheet}': failed to read '{}': {message}", .path.display())]
    Unreadable {
        sheet: String,
        path: PathBuf,
        message: String,
    },

    #[error("sheet '{sheet}': no header row left after skipping {skipped} row(s)")]
    MissingHeader { sheet: String, skipped: usize },

    #[error("sheet '{sheet}': missing expected column `{column}`")]
    MissingColumn { sheet: String, column: String },

    #[error("sheet '{sheet}': duplicate column `{column}`")]
    DuplicateColumn { sheet: String, column: String },

    #[error("sheet '{sheet}': row {row} has {found} cell(s), expected {expected}")]
    RaggedRow {
        sheet: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("sheet '{sheet}': row {row}: invalid date '{value}'")]
    InvalidDate {
        sheet: String,
        row: usize,
        value: String,
    },

    #[error("sheet '{sheet}': row {row}, column `{column}`: invalid number '{value}'")]
    InvalidValue {
        sheet: String,
        row: usize,
        column: String,
        value: String,
    },
}

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error(transparent)]
    SourceFormat(#[from] SourceFormatError),

    #[error("cannot join `{left}` with `{right}`: expected one sale-side and one rent-side metric of the same kind")]
    IncompatibleMetrics { left: MetricName, right: MetricName },

    #[error("region '{region}' has more than one point dated {date}")]
    DuplicateDate { region: String, date: NaiveDate },

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid color '{0}': expected #RRGGBB")]
    InvalidColor(String),

    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error("change tables were not loaded (both sale and rent change sheets are required)")]
    ChangeTablesUnavailable,
}

/// Error surfaced by the `rsp` binary: a message plus the process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let exit_code = match &err {
            CoreError::SourceFormat(_)
            | CoreError::InvalidDateRange { .. }
            | CoreError::InvalidColor(_)
            | CoreError::UnknownRegion(_)
            | CoreError::ChangeTablesUnavailable => 2,
            CoreError::IncompatibleMetrics { .. } | CoreError::DuplicateDate { .. } => 3,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl From<SourceFormatError> for AppError {
    fn from(err: SourceFormatError) -> Self {
        CoreError::from(err).into()
    }
}
