//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{
    CompanyProfile, Completion, CompletionRequest, NewRequirement, NewResponseDraft,
    Requirement, ResponseDraft, Rfp, RfpId, RfpUpdate,
};

/// Trait for storing and retrieving RFPs and their dependents
///
/// Implemented by the infrastructure layer (rfpilot-store)
pub trait RfpStore {
    /// Error type for store operations
    type Error;

    /// Insert a new pending RFP
    fn create_rfp(&mut self, rfp: Rfp) -> Result<RfpId, Self::Error>;

    /// Get an RFP by ID
    fn get_rfp(&self, id: RfpId) -> Result<Option<Rfp>, Self::Error>;

    /// All RFPs, newest first
    fn list_rfps(&self) -> Result<Vec<Rfp>, Self::Error>;

    /// Attach a blob store reference to an RFP
    fn set_document(&mut self, id: RfpId, document_url: &str) -> Result<(), Self::Error>;

    /// Apply extracted fields to an RFP
    ///
    /// Idempotent for a given update. Fails if the RFP does not exist.
    fn update_rfp(&mut self, id: RfpId, update: &RfpUpdate) -> Result<(), Self::Error>;

    /// Append requirement rows to an RFP, returning how many were inserted
    fn insert_requirements(
        &mut self,
        rfp_id: RfpId,
        requirements: &[NewRequirement],
    ) -> Result<usize, Self::Error>;

    /// List the requirements of an RFP in insertion order
    fn list_requirements(&self, rfp_id: RfpId) -> Result<Vec<Requirement>, Self::Error>;

    /// Get the company profile, if one has been saved
    fn get_company_profile(&self) -> Result<Option<CompanyProfile>, Self::Error>;

    /// Insert or replace the company profile, returning its row id
    fn save_company_profile(&mut self, profile: &CompanyProfile) -> Result<i64, Self::Error>;

    /// Store a generated proposal draft, returning its row id
    fn insert_response_draft(&mut self, draft: &NewResponseDraft) -> Result<i64, Self::Error>;

    /// List the proposal drafts of an RFP
    fn list_response_drafts(&self, rfp_id: RfpId) -> Result<Vec<ResponseDraft>, Self::Error>;
}

/// Trait for fetching uploaded documents
///
/// Implemented by the infrastructure layer (rfpilot-store)
pub trait BlobStore {
    /// Error type for blob operations
    type Error;

    /// Download the bytes stored under `reference`
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, Self::Error>;
}

/// Coarse classification of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The provider is rate-limiting us; retrying later may succeed
    Throttled,

    /// Billing or quota is exhausted; needs external action
    QuotaExhausted,

    /// The call succeeded but carried no usable payload
    Malformed,

    /// Any other failure
    Other,
}

/// Errors returned by an `LlmProvider` must say what kind of failure they are
pub trait ProviderError: std::fmt::Display {
    /// Classify this error
    fn kind(&self) -> ProviderErrorKind;
}

/// Trait for text-generation provider operations
///
/// Implemented by the infrastructure layer (rfpilot-llm)
pub trait LlmProvider {
    /// Error type for provider operations
    type Error: ProviderError;

    /// Run one completion round-trip
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, Self::Error>;
}
