use tracing::{info, warn};

use super::{RawSheetRow, SourceOutcome};
use crate::io::{FormsService, SheetRange, SheetsService};

/// Look up the spreadsheet a form writes its responses into
pub async fn find_linked_sheet(forms: &dyn FormsService, form_id: &str) -> SourceOutcome<String> {
    match forms.get_form(form_id).await {
        Ok(metadata) => match metadata.linked_spreadsheet_id() {
            Some(sheet_id) => {
                info!("Found linked sheet {} for form {}", sheet_id, form_id);
                SourceOutcome::Data(sheet_id.to_string())
            }
            None => {
                info!("No linked sheet found in metadata of form {}", form_id);
                SourceOutcome::Empty("form has no spreadsheet destination".to_string())
            }
        },
        Err(e) => {
            warn!("Error retrieving metadata of form {}: {:#}", form_id, e);
            SourceOutcome::Failed(format!("{:#}", e))
        }
    }
}

/// Read the full first tab of the linked spreadsheet; the first row is the header
pub async fn fetch_sheet_rows(
    sheets: &dyn SheetsService,
    spreadsheet_id: &str,
) -> SourceOutcome<Vec<RawSheetRow>> {
    let metadata = match sheets.get_metadata(spreadsheet_id).await {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!("Sheets API error for {}: {:#}", spreadsheet_id, e);
            return SourceOutcome::Failed(format!("{:#}", e));
        }
    };

    let Some(title) = metadata.first_sheet_title() else {
        info!("Linked spreadsheet {} has no tabs", spreadsheet_id);
        return SourceOutcome::Empty("linked spreadsheet has no tabs".to_string());
    };

    let range = SheetRange::whole_sheet(title);
    match sheets.get_values(spreadsheet_id, &range).await {
        Ok(grid) if grid.is_empty() => {
            info!("No data found in the linked sheet {}", spreadsheet_id);
            SourceOutcome::Empty("linked sheet is empty".to_string())
        }
        Ok(grid) => {
            info!(
                "Fetched {} rows (including header) from {} of {}",
                grid.len(),
                range,
                spreadsheet_id
            );
            SourceOutcome::Data(grid)
        }
        Err(e) => {
            warn!("Sheets API error for {}: {:#}", spreadsheet_id, e);
            SourceOutcome::Failed(format!("{:#}", e))
        }
    }
}
