//! Extraction records and processing outcomes

use rfpilot_domain::{Category, NewRequirement, Priority, RfpId};
use serde::{Deserialize, Serialize};

/// Structured fields recovered from an RFP document
///
/// Both extractors produce this shape; the merger combines them into the
/// canonical record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionResult {
    /// Project title
    pub title: Option<String>,

    /// Issuing organization
    pub client_name: Option<String>,

    /// Submission deadline (`YYYY-MM-DD`)
    pub deadline: Option<String>,

    /// Lower budget bound
    pub budget_min: Option<f64>,

    /// Upper budget bound
    pub budget_max: Option<f64>,

    /// ISO 4217-like currency code
    pub currency: Option<String>,

    /// Short project description
    pub description: Option<String>,

    /// Technologies the client asks for
    pub required_technologies: Vec<String>,

    /// Requirement candidates, in document order
    pub requirements: Vec<RequirementCandidate>,
}

/// One requirement recovered from a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementCandidate {
    /// Normalized requirement text
    #[serde(rename = "requirement_text")]
    pub text: String,

    /// Category
    #[serde(default)]
    pub category: Category,

    /// Priority
    #[serde(default = "default_priority")]
    pub priority: Priority,

    /// Whether the requirement is mandatory
    #[serde(default = "default_mandatory")]
    pub is_mandatory: bool,
}

fn default_priority() -> Priority {
    Priority::Medium
}

fn default_mandatory() -> bool {
    true
}

impl RequirementCandidate {
    /// Convert into a row ready to be stored
    pub fn to_new_requirement(&self) -> NewRequirement {
        NewRequirement {
            requirement_text: self.text.clone(),
            category: self.category,
            priority: self.priority,
            is_mandatory: self.is_mandatory,
        }
    }
}

/// A downloaded document and its best-effort decoded text
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Original bytes
    pub bytes: Vec<u8>,

    /// Decoded text
    pub text: String,
}

/// Notes the merger records about how the canonical record was built
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeReport {
    /// Whether a remote result took part in the merge
    pub remote_used: bool,

    /// Whether the requirement list came from the remote result
    pub requirements_from_remote: bool,

    /// Resolved `(budget_min, budget_max)` pair that contradicted itself;
    /// `budget_min` was dropped
    pub budget_conflict: Option<(f64, f64)>,
}

/// Result of processing one RFP
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    /// The RFP that was processed
    pub rfp_id: RfpId,

    /// Canonical record written to the RFP
    pub merged: ExtractionResult,

    /// Whether the requirement rows were stored
    pub requirements_persisted: bool,

    /// Number of requirement rows stored
    pub requirements_inserted: usize,

    /// How the canonical record was assembled
    pub merge_report: MergeReport,
}

/// Result of drafting a proposal response
#[derive(Debug, Clone)]
pub struct DraftOutcome {
    /// The RFP the draft answers
    pub rfp_id: RfpId,

    /// Generated proposal text
    pub content: String,

    /// Whether the draft row was stored
    pub saved: bool,

    /// Row id of the stored draft
    pub draft_id: Option<i64>,
}
