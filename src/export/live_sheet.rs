use anyhow::Result;
use tracing::info;

use crate::io::{SheetRange, SheetsService, ValueInputOption};
use crate::table::Table;

/// Overwrite a spreadsheet tab with `table`
///
/// The whole tab is cleared first, then header and rows are written from
/// `A1` with user-entered semantics so numbers and dates are parsed.
pub async fn write(
    table: &Table,
    sheets: &dyn SheetsService,
    spreadsheet_id: &str,
    sheet_name: &str,
) -> Result<()> {
    info!(
        "Clearing sheet '{}' in spreadsheet {}...",
        sheet_name, spreadsheet_id
    );
    sheets
        .clear_values(spreadsheet_id, &SheetRange::whole_sheet(sheet_name))
        .await?;

    info!("Writing {} rows to sheet '{}'...", table.len(), sheet_name);
    sheets
        .update_values(
            spreadsheet_id,
            &SheetRange::cells(sheet_name, "A1"),
            &table.to_grid(),
            ValueInputOption::UserEntered,
        )
        .await?;

    info!(
        "Exported {} rows to spreadsheet {} tab '{}'",
        table.len(),
        spreadsheet_id,
        sheet_name
    );
    Ok(())
}
