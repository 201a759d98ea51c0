//! # sharesum-cli
//!
//! Sum a share column per account from the command line.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use sharesum_sheet::{
    process_sheet, ShareSummary, Sheet, XlsxReadOptions, DEFAULT_ACCOUNT_COLUMN,
    DEFAULT_SHARE_COLUMN, OUTPUT_FILE_NAME,
};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// sharesum - per-account share totals from an Excel workbook
#[derive(Parser, Debug)]
#[command(name = "sharesum")]
#[command(author, version, about = "Group a workbook by account and sum shares", long_about = None)]
struct Cli {
    /// Workbook to read (first sheet only)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Account column name
    #[arg(short = 'a', long = "account", default_value = DEFAULT_ACCOUNT_COLUMN)]
    account_column: String,

    /// Share column name
    #[arg(short = 's', long = "share", default_value = DEFAULT_SHARE_COLUMN)]
    share_column: String,

    /// Where to write the summary workbook
    #[arg(short = 'o', long = "output", default_value = OUTPUT_FILE_NAME)]
    output: PathBuf,

    /// Output format for the summary printed to stdout
    #[arg(short = 'f', long = "format", default_value = "table")]
    format: OutputFormat,

    /// Print the summary without writing a workbook
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Pretty table output (default)
    #[default]
    Table,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    if let Err(e) = run(&cli) {
        // sheet errors already carry their operator-facing wording
        let message = match e.downcast_ref::<sharesum_sheet::SheetError>() {
            Some(sheet_error) => sheet_error.user_message(),
            None => format!("An error occurred: {e:#}"),
        };
        eprintln!("{}", message.red().bold());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.account_column.is_empty() || cli.share_column.is_empty() {
        anyhow::bail!("both --account and --share must be non-empty");
    }

    debug!(file = %cli.file.display(), "loading workbook");
    let sheet = Sheet::from_xlsx_with_options(
        &cli.file,
        XlsxReadOptions::default().with_headers(true),
    )
    .with_context(|| format!("Failed to read workbook: {}", cli.file.display()))?;

    let processed = process_sheet(&sheet, &cli.account_column, &cli.share_column)?;
    info!(accounts = processed.summary.len(), "summarized workbook");

    print!("{}", render_summary(&processed.summary, cli.format)?);

    if !cli.dry_run {
        std::fs::write(&cli.output, &processed.bytes)
            .with_context(|| format!("Failed to write {}", cli.output.display()))?;
        info!(output = %cli.output.display(), "wrote summary workbook");
    }

    Ok(())
}

/// Render the summary for stdout.
fn render_summary(summary: &ShareSummary, format: OutputFormat) -> Result<String> {
    let mut out = String::new();
    match format {
        OutputFormat::Json => {
            out.push_str(&serde_json::to_string_pretty(summary)?);
            out.push('\n');
        }
        OutputFormat::Csv => {
            out.push_str(&format!(
                "{},{}\n",
                csv_escape(&summary.account_column),
                csv_escape(&summary.share_column)
            ));
            for row in &summary.rows {
                out.push_str(&format!(
                    "{},{}\n",
                    csv_escape(&row.account.to_string()),
                    row.total
                ));
            }
        }
        OutputFormat::Table => {
            let accounts: Vec<String> = summary.rows.iter().map(|r| r.account.to_string()).collect();
            let totals: Vec<String> = summary.rows.iter().map(|r| r.total.to_string()).collect();
            let account_width = accounts
                .iter()
                .map(String::len)
                .chain(std::iter::once(summary.account_column.len()))
                .max()
                .unwrap_or(0);
            let total_width = totals
                .iter()
                .map(String::len)
                .chain(std::iter::once(summary.share_column.len()))
                .max()
                .unwrap_or(0);

            out.push_str(&format!(
                "{:<account_width$}  {:>total_width$}\n",
                summary.account_column.bold(),
                summary.share_column.bold()
            ));
            for (account, total) in accounts.iter().zip(&totals) {
                out.push_str(&format!("{account:<account_width$}  {total:>total_width$}\n"));
            }
            if summary.is_empty() {
                out.push_str(&format!("{}\n", "(no rows)".dimmed()));
            }
        }
    }
    Ok(out)
}

/// Quote a CSV field when it contains a separator, quote or newline.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
