//! Exporter configuration file model
//!
//! The configuration is a YAML document listing the forms to export, a global
//! column rename mapping and where to find the API bearer token. Both the
//! camelCase keys and the legacy upper-case spellings are accepted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};

use crate::config::{DEFAULT_EXPORT_FORMAT, DEFAULT_SHEET_NAME};

/// Top-level configuration document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExporterConfig {
    #[serde(alias = "Forms")]
    pub forms: Vec<FormConfig>,
    /// Column renames applied to every exported table: original name -> new name
    #[serde(
        default,
        alias = "MappingOverrides",
        deserialize_with = "null_as_default"
    )]
    pub mapping_overrides: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub credentials: CredentialsConfig,
}

/// One form to export and where its table goes
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    #[serde(alias = "GOOGLE_FORM_ID")]
    pub form_id: String,
    /// One of `csv`, `xlsx`, `spreadsheet`; checked when the form is exported
    #[serde(default = "default_export_format", alias = "ExportFormat")]
    pub export_format: String,
    #[serde(default, alias = "FILE_NAME")]
    pub file_name: Option<String>,
    #[serde(default, alias = "GOOGLE_SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,
    #[serde(default, alias = "SHEET_NAME")]
    pub sheet_name: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl FormConfig {
    /// Destination tab name, `Sheet1` when not configured
    pub fn sheet_name(&self) -> &str {
        self.sheet_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_SHEET_NAME)
    }
}

/// Where the bearer token for the Google APIs comes from
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsConfig {
    /// File holding the token; relative paths resolve against the config file
    pub token_file: Option<PathBuf>,
    /// Environment variable holding the token
    pub token_env: Option<String>,
}

fn default_export_format() -> String {
    DEFAULT_EXPORT_FORMAT.to_string()
}

fn default_enabled() -> bool {
    true
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ExporterConfig {
    /// Read and validate the configuration file at `path`
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

        Self::from_yaml(&raw)
            .with_context(|| format!("Invalid configuration file {}", path.display()))
    }

    /// Parse and validate a configuration document
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw).context("Failed to parse YAML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (index, form) in self.forms.iter().enumerate() {
            if form.form_id.trim().is_empty() {
                bail!("Form entry {} has an empty form id", index + 1);
            }
        }

        validate_overrides(&self.mapping_overrides)
    }
}

/// Reject override mappings whose result depends on application order
///
/// Two source names may not share a target, and a target may not itself be
/// renamed by another entry. Together these keep a rebuild of an already
/// renamed table a no-op.
fn validate_overrides(overrides: &HashMap<String, String>) -> Result<()> {
    let mut entries: Vec<(&String, &String)> = overrides.iter().collect();
    entries.sort();

    let mut targets: HashMap<&str, &str> = HashMap::new();
    for (source, target) in entries {
        if target.trim().is_empty() {
            bail!("Mapping override for '{}' has an empty target name", source);
        }

        if let Some(previous) = targets.insert(target.as_str(), source.as_str()) {
            bail!(
                "Mapping overrides '{}' and '{}' both rename to '{}'",
                previous,
                source,
                target
            );
        }

        if target != source && overrides.contains_key(target) {
            bail!(
                "Mapping override '{}' -> '{}' targets a name that is itself renamed",
                source,
                target
            );
        }
    }

    Ok(())
}
