//! Export sinks: aligned text, xlsx workbook and live spreadsheet tab

pub mod aligned_text;
pub mod live_sheet;
pub mod xlsx;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::io::SheetsService;
use crate::settings::FormConfig;
use crate::table::Table;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported export format '{0}'. Supported formats: csv, xlsx, spreadsheet")]
    UnsupportedFormat(String),

    #[error("{field} not specified for form {form_id}")]
    MissingField {
        field: &'static str,
        form_id: String,
    },

    #[error("Export write failed: {0:#}")]
    Write(#[source] anyhow::Error),
}

/// Export format selector of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Column-aligned plain text (configured as `csv`)
    AlignedText,
    Xlsx,
    Spreadsheet,
}

impl ExportFormat {
    /// Parse format from string (case-insensitive)
    pub fn parse(s: &str) -> Result<Self, ExportError> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::AlignedText),
            "xlsx" => Ok(ExportFormat::Xlsx),
            "spreadsheet" => Ok(ExportFormat::Spreadsheet),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Where a table is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    AlignedText(PathBuf),
    Xlsx(PathBuf),
    Spreadsheet {
        spreadsheet_id: String,
        sheet_name: String,
    },
}

impl ExportTarget {
    /// Resolve a form's target; relative file names are joined onto `output_dir`
    pub fn resolve(form: &FormConfig, output_dir: &Path) -> Result<Self, ExportError> {
        let format = ExportFormat::parse(&form.export_format)?;

        if format == ExportFormat::Spreadsheet {
            let spreadsheet_id = non_empty(form.spreadsheet_id.as_deref()).ok_or_else(|| {
                ExportError::MissingField {
                    field: "spreadsheetId",
                    form_id: form.form_id.clone(),
                }
            })?;
            return Ok(ExportTarget::Spreadsheet {
                spreadsheet_id: spreadsheet_id.to_string(),
                sheet_name: form.sheet_name().to_string(),
            });
        }

        let file_name =
            non_empty(form.file_name.as_deref()).ok_or_else(|| ExportError::MissingField {
                field: "fileName",
                form_id: form.form_id.clone(),
            })?;
        let path = output_dir.join(file_name);

        Ok(match format {
            ExportFormat::Xlsx => ExportTarget::Xlsx(path),
            _ => ExportTarget::AlignedText(path),
        })
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportTarget::AlignedText(path) => write!(f, "{} (aligned text)", path.display()),
            ExportTarget::Xlsx(path) => write!(f, "{} (xlsx)", path.display()),
            ExportTarget::Spreadsheet {
                spreadsheet_id,
                sheet_name,
            } => write!(f, "spreadsheet {} tab '{}'", spreadsheet_id, sheet_name),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Write `table` to `target`
pub async fn export_table(
    table: &Table,
    target: &ExportTarget,
    sheets: &dyn SheetsService,
) -> Result<(), ExportError> {
    let result = match target {
        ExportTarget::AlignedText(path) => aligned_text::write(table, path).await,
        ExportTarget::Xlsx(path) => xlsx::write(table, path).await,
        ExportTarget::Spreadsheet {
            spreadsheet_id,
            sheet_name,
        } => live_sheet::write(table, sheets, spreadsheet_id, sheet_name).await,
    };

    result.map_err(ExportError::Write)
}

/// Create the parent directory of an output file if missing
pub(crate) async fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}
