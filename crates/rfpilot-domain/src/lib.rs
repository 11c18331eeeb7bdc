//! RFPilot Domain Layer
//!
//! This crate contains the domain model shared by every other RFPilot crate.
//! It defines the RFP entity, requirement records, the company profile used for
//! drafting proposals, and the trait interfaces for the collaborators the
//! extraction pipeline depends on.
//!
//! ## Key Concepts
//!
//! - **RFP**: A Request for Proposal, backed by an uploaded document
//! - **Requirement**: A single obligation extracted from an RFP document
//! - **Company Profile**: Capabilities and past projects used to draft a response
//! - **Collaborators**: Relational store, blob store, and text-generation provider
//!
//! ## Architecture
//!
//! - Pure business types only (plus `serde` derives for the audit blob)
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod company;
pub mod completion;
pub mod requirement;
pub mod rfp;
pub mod traits;

// Re-exports for convenience
pub use company::{Capability, CompanyProfile, NewResponseDraft, PastProject, ResponseDraft};
pub use completion::{Completion, CompletionRequest, ToolSpec};
pub use requirement::{Category, NewRequirement, Priority, Requirement};
pub use rfp::{Rfp, RfpId, RfpStatus, RfpUpdate};
pub use traits::{ProviderError, ProviderErrorKind};
