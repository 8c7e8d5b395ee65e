use tracing::{info, warn};

use super::SourceOutcome;
use crate::io::{FormsService, RawResponseRecord};

/// List every response of `form_id` straight from the Forms API
pub async fn fetch_responses(
    forms: &dyn FormsService,
    form_id: &str,
) -> SourceOutcome<Vec<RawResponseRecord>> {
    match forms.list_responses(form_id).await {
        Ok(responses) if responses.is_empty() => {
            info!("No responses found via Forms API for form {}", form_id);
            SourceOutcome::Empty("Forms API returned no responses".to_string())
        }
        Ok(responses) => {
            info!(
                "Fetched {} responses via Forms API for form {}",
                responses.len(),
                form_id
            );
            SourceOutcome::Data(responses)
        }
        Err(e) => {
            warn!("Forms API error for form {}: {:#}", form_id, e);
            SourceOutcome::Failed(format!("{:#}", e))
        }
    }
}
