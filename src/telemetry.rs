/// How one form's export ended in a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Table written to its target
    Exported { rows: usize, target: String },
    /// Neither source produced any data
    NoData,
    /// Data was found but the reconciled table has no rows
    EmptyTable,
    /// Form is disabled in the configuration
    Disabled,
    /// Missing target field, unsupported format or colliding column rename
    ConfigError(String),
    /// The credential provider could not authorize the run
    CredentialError(String),
    /// The target write failed
    ExportFailed(String),
}

impl FormOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            FormOutcome::ConfigError(_)
                | FormOutcome::CredentialError(_)
                | FormOutcome::ExportFailed(_)
        )
    }
}

/// Statistics aggregated over one export pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleStats {
    pub forms_processed: usize,
    pub forms_exported: usize,
    pub forms_without_data: usize,
    pub forms_disabled: usize,
    pub forms_failed: usize,
    pub rows_exported: u64,
    pub durations_ms: Vec<u64>,
}

impl CycleStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with the outcome of one form
    pub fn update(&mut self, outcome: &FormOutcome, duration_ms: u64) {
        self.forms_processed += 1;
        self.durations_ms.push(duration_ms);

        match outcome {
            FormOutcome::Exported { rows, .. } => {
                self.forms_exported += 1;
                self.rows_exported += *rows as u64;
            }
            FormOutcome::NoData | FormOutcome::EmptyTable => {
                self.forms_without_data += 1;
            }
            FormOutcome::Disabled => {
                self.forms_disabled += 1;
            }
            FormOutcome::ConfigError(_)
            | FormOutcome::CredentialError(_)
            | FormOutcome::ExportFailed(_) => {
                self.forms_failed += 1;
            }
        }
    }

    /// Slowest single form in the pass
    pub fn max_duration_ms(&self) -> Option<u64> {
        self.durations_ms.iter().copied().max()
    }
}
