use std::fmt;

/// A1-notation range expression addressing one tab of a spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    sheet: String,
    cells: Option<String>,
}

impl SheetRange {
    /// The whole tab, i.e. every used cell
    pub fn whole_sheet(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            cells: None,
        }
    }

    /// A cell block within the tab, e.g. `A1` or `A1:C10`
    pub fn cells(sheet: impl Into<String>, cells: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            cells: Some(cells.into()),
        }
    }
}

impl fmt::Display for SheetRange {
    /// Tab names are always quoted, with embedded quotes doubled
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.sheet.replace('\'', "''"))?;
        if let Some(cells) = &self.cells {
            write!(f, "!{}", cells)?;
        }
        Ok(())
    }
}
