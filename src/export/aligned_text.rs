use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::config::COLUMN_GAP;
use crate::table::Table;

/// Render `table` as left-aligned columns, header first
///
/// Each column is as wide as its longest cell or its name, plus a gap.
/// Trailing whitespace is trimmed from every line.
pub fn render(table: &Table) -> String {
    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(col, name)| {
            table
                .rows()
                .iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, table.columns(), &widths);
    for row in table.rows() {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (cell, width) in cells.iter().zip(widths) {
        let padded = width + COLUMN_GAP;
        line.push_str(&format!("{:<padded$}", cell));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Write the aligned rendering to `path`, replacing any previous file
pub async fn write(table: &Table, path: &Path) -> Result<()> {
    super::ensure_parent_dir(path).await?;

    tokio::fs::write(path, render(table))
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(
        "Exported {} rows to {} as aligned text",
        table.len(),
        path.display()
    );
    Ok(())
}
