use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::info;

use super::normalize::NormalizedRow;
use crate::config::CREATE_TIME_FIELD;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TableError {
    #[error("Renaming column '{from}' to '{to}' collides with another column named '{to}'")]
    DuplicateColumn { from: String, to: String },
}

/// Rectangular table: every row holds exactly one cell per column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header row followed by every data row
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        std::iter::once(self.columns.clone())
            .chain(self.rows.iter().cloned())
            .collect()
    }
}

/// Reconciles normalized rows into a [`Table`]
pub struct TableBuilder<'a> {
    overrides: &'a HashMap<String, String>,
}

impl<'a> TableBuilder<'a> {
    pub fn new(overrides: &'a HashMap<String, String>) -> Self {
        Self { overrides }
    }

    /// Union the columns, fill gaps, sort by creation time, then apply renames
    pub fn build(&self, rows: Vec<NormalizedRow>) -> Result<Table, TableError> {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for row in &rows {
            for (name, _) in row.fields() {
                if !index.contains_key(name) {
                    index.insert(name.to_string(), columns.len());
                    columns.push(name.to_string());
                }
            }
        }

        let mut cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                let mut line = vec![String::new(); columns.len()];
                for (name, value) in row.fields() {
                    line[index[name]] = value.to_string();
                }
                line
            })
            .collect();

        // Stable, so rows sharing a timestamp keep their arrival order
        if let Some(&time_col) = index.get(CREATE_TIME_FIELD) {
            cells.sort_by(|a, b| a[time_col].cmp(&b[time_col]));
        }

        let columns = self.rename_columns(columns)?;

        Ok(Table {
            columns,
            rows: cells,
        })
    }

    fn rename_columns(&self, columns: Vec<String>) -> Result<Vec<String>, TableError> {
        if self.overrides.is_empty() {
            return Ok(columns);
        }

        let mut seen: HashSet<String> = HashSet::with_capacity(columns.len());
        let mut renamed = Vec::with_capacity(columns.len());

        for column in columns {
            let name = match self.overrides.get(&column) {
                Some(new_name) => {
                    info!("Mapping column: {} -> {}", column, new_name);
                    new_name.clone()
                }
                None => column.clone(),
            };

            if !seen.insert(name.clone()) {
                return Err(TableError::DuplicateColumn {
                    from: column,
                    to: name,
                });
            }
            renamed.push(name);
        }

        Ok(renamed)
    }
}
