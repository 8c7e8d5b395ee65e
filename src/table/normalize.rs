use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

use crate::config::{
    CREATE_TIME_FIELD, RESPONSE_ID_FIELD, RESPONSE_ID_MASK, RESPONSE_ID_VISIBLE_CHARS,
    TEXT_ANSWER_SEPARATOR,
};
use crate::io::RawResponseRecord;
use crate::source::{RawRows, RawSheetRow};

/// A flat, ordered mapping of field name to string value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRow {
    fields: Vec<(String, String)>,
}

impl NormalizedRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing an earlier value in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NormalizedRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = NormalizedRow::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

/// Flatten raw rows from either source into normalized rows
pub fn normalize(raw: RawRows) -> Vec<NormalizedRow> {
    match raw {
        RawRows::Responses(records) => records.iter().map(normalize_response).collect(),
        RawRows::Sheet(grid) => normalize_sheet(grid),
    }
}

/// One row per submission: masked response id, creation time, one field per question
pub fn normalize_response(record: &RawResponseRecord) -> NormalizedRow {
    let mut row = NormalizedRow::new();
    row.insert(RESPONSE_ID_FIELD, mask_response_id(&record.response_id));
    row.insert(
        CREATE_TIME_FIELD,
        record.create_time.clone().unwrap_or_default(),
    );

    for (question_id, answer) in &record.answers {
        row.insert(question_id.as_str(), render_answer(answer));
    }

    row
}

/// Zip every data row to the header row's names
///
/// Cells beyond the header are dropped; short rows leave fields absent.
/// Repeated header names are suffixed (`Name`, `Name.1`, ...) so every
/// column survives.
pub fn normalize_sheet(grid: Vec<RawSheetRow>) -> Vec<NormalizedRow> {
    let mut rows = grid.into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let header = unique_header(header);

    rows.map(|cells| header.iter().cloned().zip(cells).collect::<NormalizedRow>())
        .collect()
}

/// Give each header cell a distinct name, keeping the first occurrence as is
fn unique_header(header: RawSheetRow) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(header.len());
    let mut names = Vec::with_capacity(header.len());

    for name in header {
        let mut unique = name.clone();
        let mut suffix = 1;
        while taken.contains(&unique) {
            unique = format!("{}.{}", name, suffix);
            suffix += 1;
        }

        if unique != name {
            warn!("Repeated sheet header '{}' renamed to '{}'", name, unique);
        }
        taken.insert(unique.clone());
        names.push(unique);
    }

    names
}

/// Keep only the last few characters of a response id
fn mask_response_id(response_id: &str) -> String {
    let char_count = response_id.chars().count();
    let visible: String = response_id
        .chars()
        .skip(char_count.saturating_sub(RESPONSE_ID_VISIBLE_CHARS))
        .collect();
    format!("{}{}", RESPONSE_ID_MASK, visible)
}

/// Text answers joined by ", "; any other answer shape as compact JSON
fn render_answer(answer: &Value) -> String {
    match answer.get("textAnswers") {
        Some(text_answers) => text_answers
            .get("answers")
            .and_then(Value::as_array)
            .map(|answers| {
                answers
                    .iter()
                    .map(|a| a.get("value").and_then(Value::as_str).unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join(TEXT_ANSWER_SEPARATOR)
            })
            .unwrap_or_default(),
        None => answer.to_string(),
    }
}
