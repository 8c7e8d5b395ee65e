use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::DEFAULT_SHEET_NAME;
use crate::table::Table;

/// Build a single-sheet workbook: header row, then data rows, no index column
pub fn build_workbook(table: &Table) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(DEFAULT_SHEET_NAME)?;

    for (row_idx, cells) in table.to_grid().iter().enumerate() {
        let row = u32::try_from(row_idx).context("Too many rows for an xlsx sheet")?;
        for (col_idx, value) in cells.iter().enumerate() {
            let col = u16::try_from(col_idx).context("Too many columns for an xlsx sheet")?;
            worksheet
                .write_string(row, col, value)
                .with_context(|| format!("Failed to write cell ({}, {})", row, col))?;
        }
    }

    Ok(workbook)
}

/// Save the workbook to `path`, replacing any previous file
pub async fn write(table: &Table, path: &Path) -> Result<()> {
    super::ensure_parent_dir(path).await?;

    let owned = table.clone();
    let target: PathBuf = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut workbook = build_workbook(&owned)?;
        workbook.save(&target)?;
        Ok(())
    })
    .await
    .context("xlsx writer task failed")?
    .with_context(|| format!("Failed to save {}", path.display()))?;

    info!("Exported {} rows to {} as XLSX", table.len(), path.display());
    Ok(())
}
