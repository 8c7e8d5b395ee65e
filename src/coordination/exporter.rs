use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::export::{ExportTarget, export_table};
use crate::io::{AuthorizedClient, CredentialProvider};
use crate::settings::{ExporterConfig, FormConfig};
use crate::source::{RawRows, SourceOutcome, direct, linked_sheet};
use crate::table::{TableBuilder, normalize};
use crate::telemetry::FormOutcome;

/// Process-wide, read-only state shared by every form and cycle
pub struct ExportContext {
    pub config: ExporterConfig,
    pub credentials: Arc<dyn CredentialProvider>,
    /// Directory relative output file names resolve against
    pub output_dir: PathBuf,
}

/// Drives one form from acquisition to export
pub struct FormExporter {
    context: Arc<ExportContext>,
}

impl FormExporter {
    pub fn new(context: Arc<ExportContext>) -> Self {
        Self { context }
    }

    /// Export one form; every failure is contained in the returned outcome
    pub async fn export_form(&self, form: &FormConfig) -> FormOutcome {
        if !form.enabled {
            info!("Skipping disabled form {}", form.form_id);
            return FormOutcome::Disabled;
        }

        info!("Exporting form {}...", form.form_id);

        let client = match self.context.credentials.acquire().await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to acquire credentials for form {}: {:#}", form.form_id, e);
                return FormOutcome::CredentialError(format!("{:#}", e));
            }
        };

        let Some(raw) = Self::acquire_rows(&client, &form.form_id).await else {
            info!(
                "Unable to retrieve responses for form {} by any method",
                form.form_id
            );
            return FormOutcome::NoData;
        };

        let source = raw.source_name();
        let builder = TableBuilder::new(&self.context.config.mapping_overrides);
        let table = match builder.build(normalize(raw)) {
            Ok(table) => table,
            Err(e) => {
                error!("Configuration error for form {}: {}", form.form_id, e);
                return FormOutcome::ConfigError(e.to_string());
            }
        };

        if table.is_empty() {
            info!("No data to export for form {}", form.form_id);
            return FormOutcome::EmptyTable;
        }

        info!(
            "Built table from {} with {} rows; columns: {:?}",
            source,
            table.len(),
            table.columns()
        );

        let target = match ExportTarget::resolve(form, &self.context.output_dir) {
            Ok(target) => target,
            Err(e) => {
                error!("Error: {}", e);
                return FormOutcome::ConfigError(e.to_string());
            }
        };

        match export_table(&table, &target, client.sheets.as_ref()).await {
            Ok(()) => FormOutcome::Exported {
                rows: table.len(),
                target: target.to_string(),
            },
            Err(e) => {
                warn!("Export of form {} to {} failed: {}", form.form_id, target, e);
                FormOutcome::ExportFailed(e.to_string())
            }
        }
    }

    /// Direct listing first; the linked sheet only when that yields nothing
    async fn acquire_rows(client: &AuthorizedClient, form_id: &str) -> Option<RawRows> {
        match direct::fetch_responses(client.forms.as_ref(), form_id).await {
            SourceOutcome::Data(responses) => return Some(RawRows::Responses(responses)),
            SourceOutcome::Empty(reason) | SourceOutcome::Failed(reason) => {
                info!(
                    "Direct retrieval for form {} yielded nothing ({}); trying linked sheet",
                    form_id, reason
                );
            }
        }

        let sheet_id = linked_sheet::find_linked_sheet(client.forms.as_ref(), form_id)
            .await
            .into_data()?;

        linked_sheet::fetch_sheet_rows(client.sheets.as_ref(), &sheet_id)
            .await
            .into_data()
            .map(RawRows::Sheet)
    }
}
