//! In-memory service doubles shared by unit and integration tests

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde_json::{Map, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::io::forms::FormMetadata;
use crate::io::sheets::{SheetEntry, SheetProperties, SpreadsheetMetadata};
use crate::io::{
    AuthorizedClient, CredentialProvider, FormsService, RawResponseRecord, SheetRange,
    SheetsService, ValueInputOption,
};

/// Build a response record whose answers are single text answers
pub fn response(id: &str, create_time: &str, answers: &[(&str, &str)]) -> RawResponseRecord {
    let mut map = Map::new();
    for (question_id, text) in answers {
        map.insert(
            question_id.to_string(),
            json!({
                "questionId": question_id,
                "textAnswers": {"answers": [{"value": text}]}
            }),
        );
    }

    RawResponseRecord {
        response_id: id.to_string(),
        create_time: Some(create_time.to_string()),
        answers: map,
    }
}

pub fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// Forms API double; unconfigured forms have no responses and no destination
#[derive(Default)]
pub struct MockForms {
    responses: HashMap<String, Result<Vec<RawResponseRecord>, String>>,
    metadata: HashMap<String, Result<FormMetadata, String>>,
}

impl MockForms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(mut self, form_id: &str, responses: Vec<RawResponseRecord>) -> Self {
        self.responses.insert(form_id.to_string(), Ok(responses));
        self
    }

    pub fn with_list_error(mut self, form_id: &str, message: &str) -> Self {
        self.responses
            .insert(form_id.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_metadata(mut self, form_id: &str, metadata: FormMetadata) -> Self {
        self.metadata.insert(form_id.to_string(), Ok(metadata));
        self
    }

    pub fn with_metadata_error(mut self, form_id: &str, message: &str) -> Self {
        self.metadata
            .insert(form_id.to_string(), Err(message.to_string()));
        self
    }
}

#[async_trait]
impl FormsService for MockForms {
    async fn list_responses(&self, form_id: &str) -> Result<Vec<RawResponseRecord>> {
        match self.responses.get(form_id) {
            Some(Ok(responses)) => Ok(responses.clone()),
            Some(Err(message)) => Err(anyhow!("{}", message)),
            None => Ok(Vec::new()),
        }
    }

    async fn get_form(&self, form_id: &str) -> Result<FormMetadata> {
        match self.metadata.get(form_id) {
            Some(Ok(metadata)) => Ok(metadata.clone()),
            Some(Err(message)) => Err(anyhow!("{}", message)),
            None => Ok(FormMetadata::default()),
        }
    }
}

/// A call observed by [`MockSheets`]; ranges are recorded in A1 notation
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCall {
    GetMetadata(String),
    GetValues(String, String),
    Clear(String, String),
    Update(String, String, Vec<Vec<String>>, ValueInputOption),
}

struct MockSpreadsheet {
    tabs: Vec<String>,
    values: Vec<Vec<String>>,
}

/// Sheets API double recording every call
#[derive(Default)]
pub struct MockSheets {
    spreadsheets: HashMap<String, MockSpreadsheet>,
    fail_writes: bool,
    calls: Mutex<Vec<SheetCall>>,
}

impl MockSheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spreadsheet; every range read returns `values`
    pub fn with_spreadsheet(
        mut self,
        spreadsheet_id: &str,
        tabs: &[&str],
        values: Vec<Vec<String>>,
    ) -> Self {
        self.spreadsheets.insert(
            spreadsheet_id.to_string(),
            MockSpreadsheet {
                tabs: tabs.iter().map(|t| t.to_string()).collect(),
                values,
            },
        );
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn calls(&self) -> Vec<SheetCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: SheetCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn lookup(&self, spreadsheet_id: &str) -> Result<&MockSpreadsheet> {
        self.spreadsheets
            .get(spreadsheet_id)
            .ok_or_else(|| anyhow!("HTTP 404 Not Found: spreadsheet {}", spreadsheet_id))
    }
}

#[async_trait]
impl SheetsService for MockSheets {
    async fn get_metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetMetadata> {
        self.record(SheetCall::GetMetadata(spreadsheet_id.to_string()));
        let sheet = self.lookup(spreadsheet_id)?;
        Ok(SpreadsheetMetadata {
            sheets: sheet
                .tabs
                .iter()
                .map(|title| SheetEntry {
                    properties: SheetProperties {
                        title: title.clone(),
                    },
                })
                .collect(),
        })
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &SheetRange,
    ) -> Result<Vec<Vec<String>>> {
        self.record(SheetCall::GetValues(
            spreadsheet_id.to_string(),
            range.to_string(),
        ));
        Ok(self.lookup(spreadsheet_id)?.values.clone())
    }

    async fn clear_values(&self, spreadsheet_id: &str, range: &SheetRange) -> Result<()> {
        self.record(SheetCall::Clear(
            spreadsheet_id.to_string(),
            range.to_string(),
        ));
        if self.fail_writes {
            bail!("HTTP 403 Forbidden: caller lacks write access");
        }
        Ok(())
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &SheetRange,
        values: &[Vec<String>],
        input: ValueInputOption,
    ) -> Result<()> {
        self.record(SheetCall::Update(
            spreadsheet_id.to_string(),
            range.to_string(),
            values.to_vec(),
            input,
        ));
        if self.fail_writes {
            bail!("HTTP 403 Forbidden: caller lacks write access");
        }
        Ok(())
    }
}

/// Credential provider handing out fixed mock services
pub struct MockProvider {
    client: AuthorizedClient,
    acquisitions: AtomicUsize,
    fail: bool,
    panic_on_first: bool,
}

impl MockProvider {
    pub fn new(forms: Arc<MockForms>, sheets: Arc<MockSheets>) -> Self {
        Self {
            client: AuthorizedClient { forms, sheets },
            acquisitions: AtomicUsize::new(0),
            fail: false,
            panic_on_first: false,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn panicking_once(mut self) -> Self {
        self.panic_on_first = true;
        self
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for MockProvider {
    async fn acquire(&self) -> Result<AuthorizedClient> {
        let previous = self.acquisitions.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_first && previous == 0 {
            panic!("credential store exploded");
        }
        if self.fail {
            bail!("OAuth token has been revoked");
        }
        Ok(self.client.clone())
    }
}
