use clap::Parser;
use sharesum_sheet::{DEFAULT_ACCOUNT_COLUMN, DEFAULT_SHARE_COLUMN};
use std::net::SocketAddr;

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
/// Room for the text fields and multipart framing of a form submission.
const FORM_FIELD_ALLOWANCE: usize = 16 * 1024;

/// Server settings, from flags or `SHARESUM_*` environment variables.
#[derive(Parser, Debug, Clone)]
#[command(name = "sharesum-server")]
#[command(version, about = "Upload a workbook, get per-account share totals back", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "SHARESUM_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Account column name pre-filled in the form
    #[arg(long, env = "SHARESUM_ACCOUNT_COLUMN", default_value = DEFAULT_ACCOUNT_COLUMN)]
    pub account_column: String,

    /// Share column name pre-filled in the form
    #[arg(long, env = "SHARESUM_SHARE_COLUMN", default_value = DEFAULT_SHARE_COLUMN)]
    pub share_column: String,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "SHARESUM_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Body limit for the form route. A resubmission carries the previous
    /// workbook base64-encoded (4/3 of its size) next to an optional fresh
    /// upload, so the form needs more room than `max_upload_bytes`.
    pub fn form_body_limit(&self) -> usize {
        let carried = self.max_upload_bytes.div_ceil(3).saturating_mul(4);
        self.max_upload_bytes
            .saturating_add(carried)
            .saturating_add(FORM_FIELD_ALLOWANCE)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            account_column: DEFAULT_ACCOUNT_COLUMN.to_string(),
            share_column: DEFAULT_SHARE_COLUMN.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
