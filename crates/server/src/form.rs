//! The upload form and its per-submission state machine.
//!
//! Idle -> FileUploaded -> (Processed | Errored). Nothing is kept on the
//! server between submissions; the uploaded workbook travels back to the
//! browser in a hidden field so the operator can edit the column names and
//! resubmit.

use crate::config::ServerConfig;
use crate::upload::{
    FormInput, UploadedFile, ACCOUNT_FIELD, CARRIED_NAME_FIELD, CARRIED_WORKBOOK_FIELD,
    FILE_FIELD, SHARE_FIELD,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sharesum_sheet::{process, ProcessRequest, ProcessedWorkbook, XLSX_CONTENT_TYPE};
use tracing::{debug, info, warn};

/// Where one form submission ended up.
#[derive(Debug)]
pub enum FormState {
    Idle,
    /// A workbook is present but at least one column name is empty.
    FileUploaded {
        file: UploadedFile,
        account_column: String,
        share_column: String,
    },
    Processed {
        file: UploadedFile,
        account_column: String,
        share_column: String,
        output: ProcessedWorkbook,
    },
    Errored {
        file: Option<UploadedFile>,
        account_column: String,
        share_column: String,
        message: String,
    },
}

impl FormState {
    /// Advance from the submitted fields, running the transform when both the
    /// workbook and both column names are present.
    pub fn from_input(input: FormInput, config: &ServerConfig) -> Self {
        let account_column = input
            .account_column
            .clone()
            .unwrap_or_else(|| config.account_column.clone());
        let share_column = input
            .share_column
            .clone()
            .unwrap_or_else(|| config.share_column.clone());

        let file = match input.workbook() {
            Ok(Some(file)) => file,
            Ok(None) => return FormState::Idle,
            Err(e) => {
                warn!(error = %e, "carried workbook could not be decoded");
                return FormState::Errored {
                    file: None,
                    account_column,
                    share_column,
                    message: format!("An error occurred: {e}"),
                };
            }
        };

        if file.bytes.len() > config.max_upload_bytes {
            warn!(file = %file.name, size = file.bytes.len(), "workbook over upload limit");
            return FormState::rejected(
                &format!(
                    "the workbook is larger than the {} byte upload limit",
                    config.max_upload_bytes
                ),
                config,
            );
        }

        if account_column.is_empty() || share_column.is_empty() {
            debug!(file = %file.name, "waiting for both column names");
            return FormState::FileUploaded {
                file,
                account_column,
                share_column,
            };
        }

        let request = ProcessRequest::new(file.bytes.clone(), &account_column, &share_column);
        match process(&request) {
            Ok(output) => {
                info!(
                    file = %file.name,
                    accounts = output.summary.len(),
                    "processed workbook"
                );
                FormState::Processed {
                    file,
                    account_column,
                    share_column,
                    output,
                }
            }
            Err(e) => {
                warn!(file = %file.name, error = %e, "processing failed");
                FormState::Errored {
                    file: Some(file),
                    account_column,
                    share_column,
                    message: e.user_message(),
                }
            }
        }
    }

    /// A submission that could not be used at all: no workbook is kept and
    /// the column names fall back to the configured defaults.
    pub fn rejected(reason: &str, config: &ServerConfig) -> Self {
        FormState::Errored {
            file: None,
            account_column: config.account_column.clone(),
            share_column: config.share_column.clone(),
            message: format!("An error occurred: {reason}"),
        }
    }

    fn file(&self) -> Option<&UploadedFile> {
        match self {
            FormState::Idle => None,
            FormState::FileUploaded { file, .. } | FormState::Processed { file, .. } => Some(file),
            FormState::Errored { file, .. } => file.as_ref(),
        }
    }

    fn columns(&self) -> Option<(&str, &str)> {
        match self {
            FormState::Idle => None,
            FormState::FileUploaded {
                account_column,
                share_column,
                ..
            }
            | FormState::Processed {
                account_column,
                share_column,
                ..
            }
            | FormState::Errored {
                account_column,
                share_column,
                ..
            } => Some((account_column, share_column)),
        }
    }

    /// Render the whole page for this state.
    pub fn render(&self) -> String {
        let mut html = String::from(PAGE_HEAD);
        html.push_str("<h1>Excel File Processor</h1>\n");
        html.push_str(&format!(
            "<form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\n\
             <label>Upload your Excel file <input type=\"file\" name=\"{FILE_FIELD}\" \
             accept=\".xlsx,{XLSX_CONTENT_TYPE}\"></label>\n"
        ));

        if let Some(file) = self.file() {
            html.push_str(&format!(
                "<p class=\"current\">Current file: {}</p>\n\
                 <input type=\"hidden\" name=\"{CARRIED_NAME_FIELD}\" value=\"{}\">\n\
                 <input type=\"hidden\" name=\"{CARRIED_WORKBOOK_FIELD}\" value=\"{}\">\n",
                escape_html(&file.name),
                escape_html(&file.name),
                file.to_base64(),
            ));
        }

        if let (Some(_), Some((account_column, share_column))) = (self.file(), self.columns()) {
            html.push_str(&format!(
                "<label>Enter the column name for account ID or number (e.g., \"acc\"): \
                 <input type=\"text\" name=\"{ACCOUNT_FIELD}\" value=\"{}\"></label>\n\
                 <label>Enter the column name for the share amount (e.g., \"fr\"): \
                 <input type=\"text\" name=\"{SHARE_FIELD}\" value=\"{}\"></label>\n",
                escape_html(account_column),
                escape_html(share_column),
            ));
        }

        html.push_str("<button type=\"submit\">Process</button>\n</form>\n");

        match self {
            FormState::Errored { message, .. } => {
                html.push_str(&format!(
                    "<div class=\"error\" role=\"alert\">{}</div>\n",
                    escape_html(message)
                ));
            }
            FormState::Processed { output, .. } => {
                html.push_str(&render_output(output));
            }
            FormState::Idle | FormState::FileUploaded { .. } => {}
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

fn render_output(output: &ProcessedWorkbook) -> String {
    let summary = &output.summary;
    let mut html = format!(
        "<a class=\"download\" download=\"{}\" href=\"data:{};base64,{}\">Download Processed File</a>\n",
        output.file_name(),
        output.content_type(),
        STANDARD.encode(&output.bytes),
    );

    html.push_str(&format!(
        "<table>\n<thead><tr><th>{}</th><th>{}</th></tr></thead>\n<tbody>\n",
        escape_html(&summary.account_column),
        escape_html(&summary.share_column),
    ));
    for row in &summary.rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(&row.account.to_string()),
            row.total
        ));
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const PAGE_HEAD: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\">
<title>Excel File Processor</title>
<style>
body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
label { display: block; margin: 0.75rem 0; }
.error { color: #a00; border: 1px solid #a00; padding: 0.5rem; margin: 1rem 0; }
.download { display: inline-block; margin: 1rem 0; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 0.25rem 0.75rem; text-align: left; }
</style>
</head>
<body>
";
