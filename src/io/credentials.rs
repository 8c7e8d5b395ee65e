use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use derive_builder::Builder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::forms::{FormsService, GoogleFormsClient};
use super::http::ApiClient;
use super::sheets::{GoogleSheetsClient, SheetsService};
use crate::config::{DEFAULT_TOKEN_ENV, FORMS_API_BASE_URL, HTTP_TIMEOUT, SHEETS_API_BASE_URL};
use crate::settings::CredentialsConfig;

/// Handles to the remote services, authorized for one export run
///
/// The token behind it must carry the read-only form responses scope, the
/// spreadsheets scope and the read-only drive scope.
#[derive(Clone)]
pub struct AuthorizedClient {
    pub forms: Arc<dyn FormsService>,
    pub sheets: Arc<dyn SheetsService>,
}

/// Produces authorized service handles on demand
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn acquire(&self) -> Result<AuthorizedClient>;
}

/// HTTP settings shared by the Forms and Sheets clients
#[derive(Debug, Clone, Builder)]
pub struct ApiClientArgs {
    #[builder(setter(into), default = "FORMS_API_BASE_URL.to_string()")]
    forms_base_url: String,
    #[builder(setter(into), default = "SHEETS_API_BASE_URL.to_string()")]
    sheets_base_url: String,
    #[builder(default = "HTTP_TIMEOUT")]
    timeout: Duration,
}

/// Where a bearer token is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    File(PathBuf),
    Env(String),
}

impl TokenSource {
    /// Token file if configured (resolved against `base_dir`), else an environment variable
    pub fn from_config(config: &CredentialsConfig, base_dir: &Path) -> Self {
        match (&config.token_file, &config.token_env) {
            (Some(file), _) => TokenSource::File(base_dir.join(file)),
            (None, Some(var)) => TokenSource::Env(var.clone()),
            (None, None) => TokenSource::Env(DEFAULT_TOKEN_ENV.to_string()),
        }
    }

    async fn read(&self) -> Result<String> {
        let raw = match self {
            TokenSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read token file {}", path.display()))?,
            TokenSource::Env(var) => std::env::var(var)
                .with_context(|| format!("Environment variable {} is not set", var))?,
        };

        let token = raw.trim();
        if token.is_empty() {
            bail!("Bearer token from {:?} is empty", self);
        }
        Ok(token.to_string())
    }
}

/// Credential provider handing out pre-issued bearer tokens
///
/// The token is re-read on every `acquire`, so an external process can keep
/// the file or variable refreshed while the exporter runs.
pub struct TokenCredentialProvider {
    source: TokenSource,
    http: reqwest::Client,
    forms_base_url: Url,
    sheets_base_url: Url,
}

impl TokenCredentialProvider {
    pub fn new(source: TokenSource, args: ApiClientArgs) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(args.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let forms_base_url = Url::parse(&args.forms_base_url)
            .map_err(|e| anyhow!("Invalid Forms API URL '{}': {}", args.forms_base_url, e))?;
        let sheets_base_url = Url::parse(&args.sheets_base_url)
            .map_err(|e| anyhow!("Invalid Sheets API URL '{}': {}", args.sheets_base_url, e))?;

        Ok(Self {
            source,
            http,
            forms_base_url,
            sheets_base_url,
        })
    }
}

#[async_trait]
impl CredentialProvider for TokenCredentialProvider {
    async fn acquire(&self) -> Result<AuthorizedClient> {
        let token = self.source.read().await?;

        let forms = GoogleFormsClient::new(ApiClient::new(
            self.http.clone(),
            self.forms_base_url.clone(),
            token.clone(),
        ));
        let sheets = GoogleSheetsClient::new(ApiClient::new(
            self.http.clone(),
            self.sheets_base_url.clone(),
            token,
        ));

        Ok(AuthorizedClient {
            forms: Arc::new(forms),
            sheets: Arc::new(sheets),
        })
    }
}
