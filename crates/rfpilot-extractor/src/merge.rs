//! Reconciliation of remote and pattern extraction results

use crate::types::{ExtractionResult, MergeReport};
use rfpilot_domain::Rfp;
use tracing::{debug, warn};

/// Currency used when no source names one
pub const DEFAULT_CURRENCY: &str = "USD";

/// Three-tier field resolution: remote, then pattern, then stored
///
/// ```
/// use rfpilot_extractor::resolve;
///
/// assert_eq!(resolve(Some(1), Some(2), Some(3)), Some(1));
/// assert_eq!(resolve(None, Some(2), Some(3)), Some(2));
/// assert_eq!(resolve(None, None, Some(3)), Some(3));
/// assert_eq!(resolve::<i32>(None, None, None), None);
/// ```
pub fn resolve<T>(remote: Option<T>, pattern: Option<T>, stored: Option<T>) -> Option<T> {
    remote.or(pattern).or(stored)
}

/// Combine the remote and pattern results into the canonical record
///
/// Scalar fields are resolved independently with [`resolve`]. Technologies
/// come only from the remote result. The requirement list is taken whole from
/// the remote result when it has any, otherwise from the pattern result.
/// A resolved `budget_min` greater than `budget_max` is dropped.
pub fn merge(
    remote: Option<&ExtractionResult>,
    pattern: &ExtractionResult,
    stored: &Rfp,
) -> (ExtractionResult, MergeReport) {
    let mut report = MergeReport {
        remote_used: remote.is_some(),
        ..MergeReport::default()
    };

    let title = resolve(
        remote.and_then(|r| r.title.clone()),
        None,
        Some(stored.title.clone()).filter(|t| !t.trim().is_empty()),
    );
    let client_name = resolve(
        remote.and_then(|r| r.client_name.clone()),
        pattern.client_name.clone(),
        stored.client_name.clone(),
    );
    let deadline = resolve(
        remote.and_then(|r| r.deadline.clone()),
        pattern.deadline.clone(),
        stored.deadline.clone(),
    );
    let currency = resolve(
        remote.and_then(|r| r.currency.clone()),
        pattern.currency.clone(),
        stored.currency.clone(),
    )
    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    let description = resolve(
        remote.and_then(|r| r.description.clone()),
        pattern.description.clone(),
        stored.description.clone(),
    );

    let mut budget_min = resolve(remote.and_then(|r| r.budget_min), pattern.budget_min, stored.budget_min);
    let budget_max = resolve(remote.and_then(|r| r.budget_max), pattern.budget_max, stored.budget_max);

    if let (Some(min), Some(max)) = (budget_min, budget_max) {
        if min > max {
            warn!(
                "Merged budget_min {} exceeds budget_max {}; dropping budget_min",
                min, max
            );
            report.budget_conflict = Some((min, max));
            budget_min = None;
        }
    }

    let required_technologies = remote
        .map(|r| r.required_technologies.clone())
        .unwrap_or_default();

    let requirements = match remote {
        Some(r) if !r.requirements.is_empty() => {
            report.requirements_from_remote = true;
            r.requirements.clone()
        }
        _ => pattern.requirements.clone(),
    };

    debug!(
        "Merged record: remote_used={}, {} requirements (from remote: {})",
        report.remote_used,
        requirements.len(),
        report.requirements_from_remote
    );

    let merged = ExtractionResult {
        title,
        client_name,
        deadline,
        budget_min,
        budget_max,
        currency: Some(currency),
        description,
        required_technologies,
        requirements,
    };

    (merged, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequirementCandidate;
    use rfpilot_domain::{Category, Priority, RfpId};

    fn stored() -> Rfp {
        Rfp::new(RfpId::new(), "Uploaded RFP", 0)
    }

    fn candidate(text: &str) -> RequirementCandidate {
        RequirementCandidate {
            text: text.to_string(),
            category: Category::Technical,
            priority: Priority::Medium,
            is_mandatory: false,
        }
    }

    #[test]
    fn test_remote_deadline_wins() {
        let remote = ExtractionResult {
            deadline: Some("2025-11-15".to_string()),
            ..ExtractionResult::default()
        };
        let pattern = ExtractionResult {
            deadline: Some("2025-12-01".to_string()),
            ..ExtractionResult::default()
        };

        let (merged, _) = merge(Some(&remote), &pattern, &stored());
        assert_eq!(merged.deadline.as_deref(), Some("2025-11-15"));
    }

    #[test]
    fn test_pattern_deadline_when_remote_null() {
        let remote = ExtractionResult::default();
        let pattern = ExtractionResult {
            deadline: Some("2025-12-01".to_string()),
            ..ExtractionResult::default()
        };

        let (merged, _) = merge(Some(&remote), &pattern, &stored());
        assert_eq!(merged.deadline.as_deref(), Some("2025-12-01"));
    }

    #[test]
    fn test_stored_value_is_last_resort() {
        let mut rfp = stored();
        rfp.client_name = Some("City of Springfield".to_string());
        rfp.budget_max = Some(90_000.0);

        let (merged, _) = merge(None, &ExtractionResult::default(), &rfp);
        assert_eq!(merged.client_name.as_deref(), Some("City of Springfield"));
        assert_eq!(merged.budget_max, Some(90_000.0));
        assert_eq!(merged.title.as_deref(), Some("Uploaded RFP"));
    }

    #[test]
    fn test_remote_title_overrides_stored() {
        let remote = ExtractionResult {
            title: Some("Permit Portal Modernization".to_string()),
            ..ExtractionResult::default()
        };

        let (merged, _) = merge(Some(&remote), &ExtractionResult::default(), &stored());
        assert_eq!(merged.title.as_deref(), Some("Permit Portal Modernization"));
    }

    #[test]
    fn test_currency_defaults_to_usd() {
        let (merged, _) = merge(None, &ExtractionResult::default(), &stored());
        assert_eq!(merged.currency.as_deref(), Some("USD"));

        let pattern = ExtractionResult {
            currency: Some("EUR".to_string()),
            ..ExtractionResult::default()
        };
        let (merged, _) = merge(None, &pattern, &stored());
        assert_eq!(merged.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_technologies_come_only_from_remote() {
        let pattern = ExtractionResult {
            required_technologies: vec!["COBOL".to_string()],
            ..ExtractionResult::default()
        };
        let (merged, _) = merge(None, &pattern, &stored());
        assert!(merged.required_technologies.is_empty());

        let remote = ExtractionResult {
            required_technologies: vec!["Rust".to_string(), "Rust".to_string()],
            ..ExtractionResult::default()
        };
        let (merged, _) = merge(Some(&remote), &pattern, &stored());
        assert_eq!(merged.required_technologies, vec!["Rust", "Rust"]);
    }

    #[test]
    fn test_requirements_selected_as_whole_list() {
        let pattern = ExtractionResult {
            requirements: vec![candidate("Pattern requirement one"), candidate("Pattern requirement two")],
            ..ExtractionResult::default()
        };
        let remote = ExtractionResult {
            requirements: vec![candidate("Remote requirement")],
            ..ExtractionResult::default()
        };

        let (merged, report) = merge(Some(&remote), &pattern, &stored());
        assert_eq!(merged.requirements, remote.requirements);
        assert!(report.requirements_from_remote);

        let (merged, report) = merge(Some(&ExtractionResult::default()), &pattern, &stored());
        assert_eq!(merged.requirements, pattern.requirements);
        assert!(!report.requirements_from_remote);
        assert!(report.remote_used);
    }

    #[test]
    fn test_mixed_source_budget_conflict_drops_min() {
        let remote = ExtractionResult {
            budget_min: Some(800_000.0),
            ..ExtractionResult::default()
        };
        let pattern = ExtractionResult {
            budget_max: Some(500_000.0),
            ..ExtractionResult::default()
        };

        let (merged, report) = merge(Some(&remote), &pattern, &stored());
        assert_eq!(merged.budget_min, None);
        assert_eq!(merged.budget_max, Some(500_000.0));
        assert_eq!(report.budget_conflict, Some((800_000.0, 500_000.0)));
    }

    #[test]
    fn test_consistent_budget_kept() {
        let pattern = ExtractionResult {
            budget_min: Some(200_000.0),
            budget_max: Some(500_000.0),
            ..ExtractionResult::default()
        };

        let (merged, report) = merge(None, &pattern, &stored());
        assert_eq!(merged.budget_min, Some(200_000.0));
        assert_eq!(merged.budget_max, Some(500_000.0));
        assert_eq!(report.budget_conflict, None);
        assert!(!report.remote_used);
    }
}
