use crate::error::Result;
use crate::sheet::Sheet;
use crate::summary::{summarize, ShareSummary};
use crate::xlsx::XlsxReadOptions;

/// Default account column offered to the operator.
pub const DEFAULT_ACCOUNT_COLUMN: &str = "acc";
/// Default share column offered to the operator.
pub const DEFAULT_SHARE_COLUMN: &str = "fr";
/// File name suggested for the downloaded workbook.
pub const OUTPUT_FILE_NAME: &str = "processed_file.xlsx";
/// MIME type of an xlsx workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Everything one processing run needs: the uploaded workbook and the two
/// operator-supplied column names.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub workbook: Vec<u8>,
    pub account_column: String,
    pub share_column: String,
}

impl ProcessRequest {
    pub fn new(
        workbook: Vec<u8>,
        account_column: impl Into<String>,
        share_column: impl Into<String>,
    ) -> Self {
        Self {
            workbook,
            account_column: account_column.into(),
            share_column: share_column.into(),
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct ProcessedWorkbook {
    pub summary: ShareSummary,
    /// The output workbook, ready for download
    pub bytes: Vec<u8>,
}

impl ProcessedWorkbook {
    #[must_use]
    pub fn file_name(&self) -> &'static str {
        OUTPUT_FILE_NAME
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        XLSX_CONTENT_TYPE
    }
}

/// Load the first sheet, summarize it and serialize the summary.
pub fn process(request: &ProcessRequest) -> Result<ProcessedWorkbook> {
    let sheet = Sheet::from_xlsx_bytes_with_options(
        &request.workbook,
        XlsxReadOptions::default().with_headers(true),
    )?;
    process_sheet(&sheet, &request.account_column, &request.share_column)
}

/// Summarize an already loaded sheet and serialize the summary.
///
/// Columns must be named from the header row.
pub fn process_sheet(
    sheet: &Sheet,
    account_column: &str,
    share_column: &str,
) -> Result<ProcessedWorkbook> {
    let summary = summarize(sheet, account_column, share_column)?;
    let bytes = summary.to_xlsx_bytes()?;
    Ok(ProcessedWorkbook { summary, bytes })
}
