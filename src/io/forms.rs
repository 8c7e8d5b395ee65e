use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::http::ApiClient;
use crate::config::SPREADSHEET_DESTINATION;

/// One form submission as returned by the Forms API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResponseRecord {
    #[serde(default)]
    pub response_id: String,
    #[serde(default)]
    pub create_time: Option<String>,
    /// Question id -> answer object, in the order the API returned them
    #[serde(default)]
    pub answers: Map<String, Value>,
}

/// The part of a form resource describing where responses are written
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormMetadata {
    #[serde(default)]
    pub response_destination: Option<ResponseDestination>,
    #[serde(default)]
    pub linked_sheet_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDestination {
    #[serde(default)]
    pub destination_type: Option<String>,
    #[serde(default)]
    pub spreadsheet: Option<String>,
}

impl FormMetadata {
    /// Id of the spreadsheet the form writes its responses into, if any
    pub fn linked_spreadsheet_id(&self) -> Option<&str> {
        let from_destination = self
            .response_destination
            .as_ref()
            .filter(|d| d.destination_type.as_deref() == Some(SPREADSHEET_DESTINATION))
            .and_then(|d| d.spreadsheet.as_deref());

        from_destination
            .or(self.linked_sheet_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Read access to form responses and form metadata
#[async_trait]
pub trait FormsService: Send + Sync {
    /// All responses submitted to the form, across every result page
    async fn list_responses(&self, form_id: &str) -> Result<Vec<RawResponseRecord>>;

    async fn get_form(&self, form_id: &str) -> Result<FormMetadata>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePage {
    #[serde(default)]
    responses: Vec<RawResponseRecord>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Forms API v1 REST client
pub struct GoogleFormsClient {
    api: ApiClient,
}

impl GoogleFormsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl FormsService for GoogleFormsClient {
    async fn list_responses(&self, form_id: &str) -> Result<Vec<RawResponseRecord>> {
        let mut responses = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.api.endpoint(&["forms", form_id, "responses"])?;
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let page: ResponsePage = self
                .api
                .get_json(url)
                .await
                .with_context(|| format!("Failed to list responses for form {}", form_id))?;

            responses.extend(page.responses);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(responses)
    }

    async fn get_form(&self, form_id: &str) -> Result<FormMetadata> {
        let url = self.api.endpoint(&["forms", form_id])?;
        self.api
            .get_json(url)
            .await
            .with_context(|| format!("Failed to read metadata for form {}", form_id))
    }
}
