//! Proposal drafting from an RFP and the company profile

use crate::error::ExtractorError;
use crate::prompt::DraftPromptBuilder;
use crate::remote::classify_provider_error;
use crate::types::DraftOutcome;
use rfpilot_domain::traits::{LlmProvider, RfpStore};
use rfpilot_domain::{NewResponseDraft, RfpId};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Section title stored with every generated draft
pub const DRAFT_SECTION_TITLE: &str = "Complete Proposal Draft";

/// Writes a proposal draft for an RFP on behalf of the stored company
pub struct ResponseDrafter<L, S> {
    provider: Arc<L>,
    store: Arc<Mutex<S>>,
}

impl<L, S> ResponseDrafter<L, S>
where
    L: LlmProvider + Send + Sync + 'static,
    S: RfpStore,
    S::Error: Display,
{
    /// Create a drafter sharing the given provider and store
    pub fn new(provider: Arc<L>, store: Arc<Mutex<S>>) -> Self {
        Self { provider, store }
    }

    /// Generate and store a proposal draft for `rfp_id`
    pub async fn draft(&self, rfp_id: RfpId) -> Result<DraftOutcome, ExtractorError> {
        let (request, company_id) = {
            let store = self
                .store
                .lock()
                .map_err(|e| ExtractorError::Store(format!("Store lock error: {}", e)))?;

            let rfp = store
                .get_rfp(rfp_id)
                .map_err(|e| ExtractorError::Store(e.to_string()))?
                .ok_or_else(|| ExtractorError::Input(format!("RFP not found: {}", rfp_id)))?;
            let requirements = store
                .list_requirements(rfp_id)
                .map_err(|e| ExtractorError::Store(e.to_string()))?;
            let company = store
                .get_company_profile()
                .map_err(|e| ExtractorError::Store(e.to_string()))?
                .ok_or_else(|| {
                    ExtractorError::Input("Please complete your company profile first".to_string())
                })?;

            (
                DraftPromptBuilder::new(&rfp, &requirements, &company).build(),
                company.id,
            )
        };

        info!("Drafting proposal for RFP {}", rfp_id);

        let provider = Arc::clone(&self.provider);
        let reply = tokio::task::spawn_blocking(move || {
            provider
                .complete(&request)
                .map_err(|e| ExtractorError::from(classify_provider_error(&e)))
        })
        .await
        .map_err(|e| ExtractorError::Task(format!("Draft generation: {}", e)))??;

        let content = reply.as_text().trim().to_string();
        if content.is_empty() {
            return Err(ExtractorError::RemoteMalformed(
                "No content in AI response".to_string(),
            ));
        }

        let draft = NewResponseDraft {
            rfp_id,
            company_id,
            section_title: DRAFT_SECTION_TITLE.to_string(),
            draft_content: content.clone(),
        };

        let saved = self
            .store
            .lock()
            .map_err(|e| e.to_string())
            .and_then(|mut store| {
                store
                    .insert_response_draft(&draft)
                    .map_err(|e| e.to_string())
            });

        let (saved, draft_id) = match saved {
            Ok(id) => (true, Some(id)),
            Err(e) => {
                warn!("Failed to save draft for RFP {}: {}", rfp_id, e);
                (false, None)
            }
        };

        info!("Drafted {} characters for RFP {} (saved: {})", content.len(), rfp_id, saved);

        Ok(DraftOutcome {
            rfp_id,
            content,
            saved,
            draft_id,
        })
    }
}
