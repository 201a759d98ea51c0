//! Sheet model and account share summaries for sharesum
//!
//! Loads the first sheet of an xlsx workbook, groups its rows by an account
//! column, sums a share column per account and writes the result back out as
//! a single-sheet workbook.
//!
//! # Examples
//!
//! ## Summarizing a sheet
//!
//! ```
//! use sharesum_sheet::{summarize, CellValue, Sheet};
//!
//! let mut sheet = Sheet::from_data(vec![
//!     vec![CellValue::from("acc"), CellValue::from("fr")],
//!     vec![CellValue::Int(1), CellValue::Int(10)],
//!     vec![CellValue::Int(2), CellValue::Int(5)],
//!     vec![CellValue::Int(1), CellValue::Int(3)],
//! ]);
//! sheet.name_columns_by_row(0).unwrap();
//!
//! let summary = summarize(&sheet, "acc", "fr").unwrap();
//! let totals: Vec<f64> = summary.rows.iter().map(|row| row.total).collect();
//! assert_eq!(totals, vec![13.0, 5.0]);
//! ```
//!
//! ## Processing an uploaded workbook
//!
//! ```no_run
//! use sharesum_sheet::{process, ProcessRequest};
//!
//! let bytes = std::fs::read("shares.xlsx").unwrap();
//! let processed = process(&ProcessRequest::new(bytes, "acc", "fr")).unwrap();
//! std::fs::write(processed.file_name(), &processed.bytes).unwrap();
//! ```

mod cell;
mod error;
mod process;
mod sheet;
mod summary;
mod xlsx;

/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export sheet error types.
pub use error::{Result, SheetError, MISSING_COLUMNS_MESSAGE};
/// Re-export the per-request processing entry points.
pub use process::{
    process, process_sheet, ProcessRequest, ProcessedWorkbook, DEFAULT_ACCOUNT_COLUMN,
    DEFAULT_SHARE_COLUMN, OUTPUT_FILE_NAME, XLSX_CONTENT_TYPE,
};
/// Re-export sheet type.
pub use sheet::Sheet;
/// Re-export summary types.
pub use summary::{summarize, AccountKey, ShareRow, ShareSummary, OUTPUT_SHEET_NAME};
/// Re-export XLSX read options.
pub use xlsx::XlsxReadOptions;
