use thiserror::Error;

/// Operator-facing text for the missing-column tier.
pub const MISSING_COLUMNS_MESSAGE: &str =
    "One or both specified columns are not found in the file.";

/// Errors that can occur while loading, summarizing or writing a sheet
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("{}", MISSING_COLUMNS_MESSAGE)]
    MissingColumns { columns: Vec<String> },

    /// `row` is the 1-based spreadsheet row (the header is row 1).
    #[error("Non-numeric value '{value}' in column '{column}' at row {row}")]
    NonNumericShare {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Index out of bounds: row {row}, col {col} (sheet has {rows} rows, {cols} cols)")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Row index out of bounds: {index} (sheet has {count} rows)")]
    RowIndexOutOfBounds { index: usize, count: usize },

    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Columns not named: {0}")]
    ColumnsNotNamed(String),

    #[error("Data length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Write error: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SheetError {
    /// True for the missing-column tier; every other variant is generic.
    #[must_use]
    pub fn is_missing_column(&self) -> bool {
        matches!(self, SheetError::MissingColumns { .. })
    }

    /// Message shown to the operator for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_missing_column() {
            format!("Error: {self}")
        } else {
            format!("An error occurred: {self}")
        }
    }
}

impl From<calamine::XlsxError> for SheetError {
    fn from(e: calamine::XlsxError) -> Self {
        SheetError::Workbook(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for SheetError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        SheetError::Write(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
