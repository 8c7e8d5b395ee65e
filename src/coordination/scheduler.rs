use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::exporter::{ExportContext, FormExporter};
use crate::telemetry::CycleStats;

/// Run one export pass over every configured form, in configuration order
pub async fn run_cycle(context: Arc<ExportContext>) -> CycleStats {
    let cycle_id = Uuid::new_v4();
    let start = Instant::now();
    info!(
        "Starting export cycle {} for {} forms",
        cycle_id,
        context.config.forms.len()
    );

    let exporter = FormExporter::new(context.clone());
    let mut stats = CycleStats::new();

    for form in &context.config.forms {
        let form_start = Instant::now();
        let outcome = exporter.export_form(form).await;
        let duration_ms = form_start.elapsed().as_millis() as u64;

        if outcome.is_failure() {
            warn!("Form {} failed: {:?}", form.form_id, outcome);
        } else {
            info!("Form {} finished: {:?}", form.form_id, outcome);
        }
        stats.update(&outcome, duration_ms);
    }

    info!(
        "Export cycle {} done in {:.2}s: {} exported, {} without data, {} failed",
        cycle_id,
        start.elapsed().as_secs_f64(),
        stats.forms_exported,
        stats.forms_without_data,
        stats.forms_failed
    );
    stats
}

/// Periodic driver: one pass at startup, then a pass every `interval`
///
/// A pass that panics is logged and the loop carries on; the sleep always
/// follows a pass, so passes never overlap.
pub struct Scheduler {
    context: Arc<ExportContext>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(context: Arc<ExportContext>, interval: Duration) -> Self {
        Self { context, interval }
    }

    /// Single pass, without the panic guard
    pub async fn run_once(&self) -> CycleStats {
        run_cycle(self.context.clone()).await
    }

    /// Poll until the process is stopped
    pub async fn run_forever(&self) {
        self.run(None).await
    }

    /// Startup pass followed by up to `max_iterations` pass-then-sleep iterations
    pub async fn run(&self, max_iterations: Option<usize>) {
        info!("Running startup export pass");
        self.guarded_pass().await;

        let mut iteration = 0usize;
        loop {
            if let Some(max) = max_iterations
                && iteration >= max
            {
                break;
            }
            iteration += 1;

            self.guarded_pass().await;
            info!("Next export pass in {}s", self.interval.as_secs());
            tokio::time::sleep(self.interval).await;
        }
    }

    async fn guarded_pass(&self) -> Option<CycleStats> {
        let handle = tokio::spawn(run_cycle(self.context.clone()));
        match handle.await {
            Ok(stats) => Some(stats),
            Err(e) => {
                error!("Export pass aborted: {:#}", e);
                None
            }
        }
    }
}
