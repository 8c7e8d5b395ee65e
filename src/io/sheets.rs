use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::http::ApiClient;
use super::range::SheetRange;

/// How the destination interprets written cell values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Values are stored exactly as given
    #[cfg_attr(not(test), allow(dead_code))]
    Raw,
    /// Values are parsed as if typed into the UI (numbers, dates, formulas)
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
            ValueInputOption::UserEntered => "USER_ENTERED",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpreadsheetMetadata {
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetEntry {
    #[serde(default)]
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetProperties {
    #[serde(default)]
    pub title: String,
}

impl SpreadsheetMetadata {
    pub fn first_sheet_title(&self) -> Option<&str> {
        self.sheets.first().map(|s| s.properties.title.as_str())
    }
}

/// Read-write access to spreadsheet values
#[async_trait]
pub trait SheetsService: Send + Sync {
    async fn get_metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetMetadata>;

    /// Cell grid of `range`, row-major; trailing empty cells may be omitted
    async fn get_values(&self, spreadsheet_id: &str, range: &SheetRange)
    -> Result<Vec<Vec<String>>>;

    async fn clear_values(&self, spreadsheet_id: &str, range: &SheetRange) -> Result<()>;

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &SheetRange,
        values: &[Vec<String>],
        input: ValueInputOption,
    ) -> Result<()>;
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: String,
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

#[derive(Serialize)]
struct EmptyBody {}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Sheets API v4 REST client
pub struct GoogleSheetsClient {
    api: ApiClient,
}

impl GoogleSheetsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SheetsService for GoogleSheetsClient {
    async fn get_metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetMetadata> {
        let mut url = self.api.endpoint(&["spreadsheets", spreadsheet_id])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        self.api
            .get_json(url)
            .await
            .with_context(|| format!("Failed to read metadata for spreadsheet {}", spreadsheet_id))
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &SheetRange,
    ) -> Result<Vec<Vec<String>>> {
        let range_expr = range.to_string();
        let url = self
            .api
            .endpoint(&["spreadsheets", spreadsheet_id, "values", &range_expr])?;

        let value_range: ValueRange = self
            .api
            .get_json(url)
            .await
            .with_context(|| format!("Failed to read {} from spreadsheet {}", range, spreadsheet_id))?;

        Ok(value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn clear_values(&self, spreadsheet_id: &str, range: &SheetRange) -> Result<()> {
        let segment = format!("{}:clear", range);
        let url = self
            .api
            .endpoint(&["spreadsheets", spreadsheet_id, "values", &segment])?;

        let _: IgnoredAny = self
            .api
            .send_json(Method::POST, url, &EmptyBody {})
            .await
            .with_context(|| format!("Failed to clear {} in spreadsheet {}", range, spreadsheet_id))?;

        Ok(())
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &SheetRange,
        values: &[Vec<String>],
        input: ValueInputOption,
    ) -> Result<()> {
        let range_expr = range.to_string();
        let mut url = self
            .api
            .endpoint(&["spreadsheets", spreadsheet_id, "values", &range_expr])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", input.as_str());

        let body = ValueRangeBody {
            range: range_expr,
            major_dimension: "ROWS",
            values,
        };

        let _: IgnoredAny = self
            .api
            .send_json(Method::PUT, url, &body)
            .await
            .with_context(|| format!("Failed to write {} in spreadsheet {}", range, spreadsheet_id))?;

        Ok(())
    }
}
