//! Multipart form fields shared by the HTML form and the API routes.

use axum::extract::multipart::{Multipart, MultipartError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const FILE_FIELD: &str = "file";
pub const ACCOUNT_FIELD: &str = "account_column";
pub const SHARE_FIELD: &str = "share_column";
/// Hidden field carrying a previously uploaded workbook as base64.
pub const CARRIED_WORKBOOK_FIELD: &str = "workbook_b64";
pub const CARRIED_NAME_FIELD: &str = "workbook_name";

/// A workbook received from the operator.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Encode for the hidden form field.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Raw fields of one form submission.
#[derive(Debug, Default)]
pub struct FormInput {
    pub file: Option<UploadedFile>,
    pub carried_workbook: Option<String>,
    pub carried_name: Option<String>,
    pub account_column: Option<String>,
    pub share_column: Option<String>,
}

impl FormInput {
    /// Drain a multipart body. Unknown fields are ignored and an empty file
    /// part (no file chosen) counts as absent.
    pub async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut input = FormInput::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                FILE_FIELD => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    if !bytes.is_empty() {
                        input.file = Some(UploadedFile {
                            name: file_name,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                ACCOUNT_FIELD => input.account_column = Some(field.text().await?),
                SHARE_FIELD => input.share_column = Some(field.text().await?),
                CARRIED_WORKBOOK_FIELD => {
                    let text = field.text().await?;
                    if !text.is_empty() {
                        input.carried_workbook = Some(text);
                    }
                }
                CARRIED_NAME_FIELD => input.carried_name = Some(field.text().await?),
                _ => {}
            }
        }

        Ok(input)
    }

    /// The workbook for this submission: a fresh upload wins over the carried one.
    pub fn workbook(&self) -> Result<Option<UploadedFile>, base64::DecodeError> {
        if let Some(file) = &self.file {
            return Ok(Some(file.clone()));
        }
        match &self.carried_workbook {
            Some(encoded) => Ok(Some(UploadedFile {
                name: self.carried_name.clone().unwrap_or_default(),
                bytes: STANDARD.decode(encoded.trim())?,
            })),
            None => Ok(None),
        }
    }
}
