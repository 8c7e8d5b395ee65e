//! Response acquisition: direct listing and the linked-sheet fallback
//!
//! Every adapter call reports an explicit [`SourceOutcome`]; remote errors are
//! logged and folded into [`SourceOutcome::Failed`] rather than returned.

pub mod direct;
pub mod linked_sheet;

use crate::io::RawResponseRecord;

/// One row of cells as read from a spreadsheet tab
pub type RawSheetRow = Vec<String>;

/// Result of one acquisition step
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome<T> {
    /// The step produced data
    Data(T),
    /// The step succeeded but there was nothing to return
    Empty(String),
    /// The remote call failed; carries the diagnostic that was logged
    Failed(String),
}

impl<T> SourceOutcome<T> {
    pub fn into_data(self) -> Option<T> {
        match self {
            SourceOutcome::Data(data) => Some(data),
            SourceOutcome::Empty(_) | SourceOutcome::Failed(_) => None,
        }
    }
}

/// Raw rows tagged by the source that produced them
#[derive(Debug, Clone)]
pub enum RawRows {
    /// Submissions from the Forms API response listing
    Responses(Vec<RawResponseRecord>),
    /// Header row followed by data rows from the linked spreadsheet
    Sheet(Vec<RawSheetRow>),
}

impl RawRows {
    pub fn source_name(&self) -> &'static str {
        match self {
            RawRows::Responses(_) => "Forms API",
            RawRows::Sheet(_) => "linked sheet",
        }
    }
}
