//! End-to-end processing of an uploaded RFP document

use crate::config::{ExtractorConfig, RemoteFailurePolicy};
use crate::decode::decode_document;
use crate::error::ExtractorError;
use crate::merge::{merge, DEFAULT_CURRENCY};
use crate::pattern::PatternExtractor;
use crate::remote::RemoteExtractor;
use crate::types::{ExtractionResult, ProcessingOutcome};
use rfpilot_domain::traits::{BlobStore, LlmProvider, RfpStore};
use rfpilot_domain::{NewRequirement, Rfp, RfpId, RfpStatus, RfpUpdate};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Turns an RFP's uploaded document into structured fields and requirements
///
/// Pattern and remote extraction run concurrently on blocking threads. The
/// store lock is only taken between awaits.
pub struct RfpProcessor<L, S, B> {
    store: Arc<Mutex<S>>,
    blobs: Arc<B>,
    pattern: PatternExtractor,
    remote: RemoteExtractor<L>,
    config: ExtractorConfig,
}

impl<L, S, B> RfpProcessor<L, S, B>
where
    L: LlmProvider + Send + Sync + 'static,
    S: RfpStore,
    S::Error: Display,
    B: BlobStore + Send + Sync + 'static,
    B::Error: Display,
{
    /// Create a processor sharing the given provider, store and blob store
    pub fn new(
        provider: Arc<L>,
        store: Arc<Mutex<S>>,
        blobs: Arc<B>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            store,
            blobs,
            pattern: PatternExtractor::new(config.clone()),
            remote: RemoteExtractor::new(provider, &config),
            config,
        })
    }

    /// The shared store
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Process the document attached to `rfp_id`
    ///
    /// Writes the merged fields and the audit record to the RFP and marks it
    /// active, then appends the requirement rows. A failed requirement insert
    /// is reported through `requirements_persisted` rather than as an error.
    pub async fn process(&self, rfp_id: RfpId) -> Result<ProcessingOutcome, ExtractorError> {
        let rfp = self.load_rfp(rfp_id)?;
        let reference = rfp
            .document_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ExtractorError::Input(format!("RFP {} has no document", rfp_id)))?;

        info!("Processing RFP {} (document '{}')", rfp_id, reference);

        let bytes = self.fetch_document(reference).await?;
        let document = decode_document(bytes);
        debug!(
            "Decoded {} bytes into {} characters of text",
            document.bytes.len(),
            document.text.chars().count()
        );

        let text: Arc<str> = Arc::from(document.text);
        let pattern_task = {
            let extractor = self.pattern.clone();
            let text = Arc::clone(&text);
            tokio::task::spawn_blocking(move || extractor.extract(&text))
        };
        let remote_task = {
            let extractor = self.remote.clone();
            let text = Arc::clone(&text);
            tokio::task::spawn_blocking(move || extractor.extract(&text))
        };

        let (pattern, remote) = tokio::join!(pattern_task, remote_task);
        let pattern = pattern
            .map_err(|e| ExtractorError::Task(format!("Pattern extraction: {}", e)))?;
        let remote = remote
            .map_err(|e| ExtractorError::Task(format!("Remote extraction: {}", e)))?;

        let remote = match remote.into_result(&self.config) {
            Ok(result) => Some(result),
            Err(failure) => match self.config.remote_failure_policy {
                RemoteFailurePolicy::FailLoud => {
                    warn!("Remote extraction failed for RFP {}: {:?}", rfp_id, failure);
                    return Err(failure.into());
                }
                RemoteFailurePolicy::PatternOnly => {
                    warn!(
                        "Remote extraction failed for RFP {} ({:?}); continuing with pattern output",
                        rfp_id, failure
                    );
                    None
                }
            },
        };

        let (merged, merge_report) = merge(remote.as_ref(), &pattern, &rfp);
        let update = build_update(remote.as_ref(), &pattern, &merged)?;
        let rows: Vec<NewRequirement> = merged
            .requirements
            .iter()
            .map(|r| r.to_new_requirement())
            .collect();

        let (requirements_persisted, requirements_inserted) = {
            let mut store = self.lock_store()?;

            store
                .update_rfp(rfp_id, &update)
                .map_err(|e| ExtractorError::Store(e.to_string()))?;

            if rows.is_empty() {
                (true, 0)
            } else {
                match store.insert_requirements(rfp_id, &rows) {
                    Ok(count) => (true, count),
                    Err(e) => {
                        warn!("Failed to store requirements for RFP {}: {}", rfp_id, e);
                        (false, 0)
                    }
                }
            }
        };

        info!(
            "Processed RFP {}: {} requirements stored (persisted: {}, remote used: {})",
            rfp_id, requirements_inserted, requirements_persisted, merge_report.remote_used
        );

        Ok(ProcessingOutcome {
            rfp_id,
            merged,
            requirements_persisted,
            requirements_inserted,
            merge_report,
        })
    }

    fn load_rfp(&self, rfp_id: RfpId) -> Result<Rfp, ExtractorError> {
        let store = self.lock_store()?;
        store
            .get_rfp(rfp_id)
            .map_err(|e| ExtractorError::Store(e.to_string()))?
            .ok_or_else(|| ExtractorError::Input(format!("RFP not found: {}", rfp_id)))
    }

    async fn fetch_document(&self, reference: String) -> Result<Vec<u8>, ExtractorError> {
        let blobs = Arc::clone(&self.blobs);

        tokio::task::spawn_blocking(move || {
            blobs
                .fetch(&reference)
                .map_err(|e| ExtractorError::Transport(e.to_string()))
        })
        .await
        .map_err(|e| ExtractorError::Task(format!("Document download: {}", e)))?
    }

    fn lock_store(&self) -> Result<std::sync::MutexGuard<'_, S>, ExtractorError> {
        self.store
            .lock()
            .map_err(|e| ExtractorError::Store(format!("Store lock error: {}", e)))
    }
}

fn build_update(
    remote: Option<&ExtractionResult>,
    pattern: &ExtractionResult,
    merged: &ExtractionResult,
) -> Result<RfpUpdate, ExtractorError> {
    let audit = serde_json::json!({
        "remote": remote,
        "pattern": pattern,
        "merged": merged,
    });

    Ok(RfpUpdate {
        title: merged.title.clone(),
        client_name: merged.client_name.clone(),
        deadline: merged.deadline.clone(),
        budget_min: merged.budget_min,
        budget_max: merged.budget_max,
        currency: merged
            .currency
            .clone()
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        description: merged.description.clone(),
        required_technologies: merged.required_technologies.clone(),
        extracted_data: serde_json::to_string(&audit)?,
        status: RfpStatus::Active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_record_keeps_all_three_results() {
        let pattern = ExtractionResult {
            deadline: Some("2025-11-15".to_string()),
            ..ExtractionResult::default()
        };
        let merged = ExtractionResult {
            deadline: Some("2025-11-15".to_string()),
            currency: Some("USD".to_string()),
            ..ExtractionResult::default()
        };

        let update = build_update(None, &pattern, &merged).unwrap();
        let audit: serde_json::Value = serde_json::from_str(&update.extracted_data).unwrap();

        assert!(audit["remote"].is_null());
        assert_eq!(audit["pattern"]["deadline"], "2025-11-15");
        assert_eq!(audit["merged"]["currency"], "USD");
        assert_eq!(update.status, RfpStatus::Active);
        assert_eq!(update.currency, "USD");
    }
}
