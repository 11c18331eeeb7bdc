//! RFPilot Extractor
//!
//! Turns uploaded RFP documents into structured records and requirement rows.
//!
//! # Overview
//!
//! Every processed document goes through two extractors. A deterministic
//! pattern extractor pulls deadlines, budgets and bullet requirements out of
//! the text with regular expressions. A remote extractor asks a
//! text-generation provider for the same fields through a tool call. The
//! merger reconciles both with the values already stored on the RFP, and the
//! pipeline persists the result.
//!
//! # Architecture
//!
//! ```text
//!                       ┌─► PatternExtractor ─┐
//! BlobStore → decode ───┤                     ├─► merge → RfpStore
//!                       └─► RemoteExtractor ──┘
//! ```
//!
//! # Key Features
//!
//! - **Fail-loud by default**: a remote failure fails the run unless
//!   [`RemoteFailurePolicy::PatternOnly`] is configured
//! - **Three-tier resolution**: remote, then pattern, then stored values
//! - **Audit trail**: the remote, pattern and merged records are stored together
//! - **Proposal drafting**: [`ResponseDrafter`] writes a draft from the company profile
//!
//! # Example Usage
//!
//! ```no_run
//! use rfpilot_extractor::{ExtractorConfig, RfpProcessor};
//! use rfpilot_llm::MockProvider;
//! use rfpilot_store::{FsBlobStore, SqliteStore};
//! use rfpilot_domain::RfpId;
//! use std::sync::{Arc, Mutex};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(MockProvider::structured("{}"));
//! let store = Arc::new(Mutex::new(SqliteStore::new("rfpilot.db")?));
//! let blobs = Arc::new(FsBlobStore::new("uploads"));
//!
//! let processor = RfpProcessor::new(provider, store, blobs, ExtractorConfig::default())?;
//!
//! let outcome = processor.process(RfpId::new()).await?;
//! println!("Stored {} requirements", outcome.requirements_inserted);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod decode;
mod drafter;
mod error;
mod merge;
mod normalize;
mod parser;
mod pattern;
mod pipeline;
mod prompt;
mod remote;
mod types;


pub use config::{ExtractorConfig, RemoteFailurePolicy};
pub use decode::decode_document;
pub use drafter::{ResponseDrafter, DRAFT_SECTION_TITLE};
pub use error::ExtractorError;
pub use merge::{merge, resolve, DEFAULT_CURRENCY};
pub use normalize::{
    currency_from_symbol, magnitude_multiplier, month_number, normalize_date, parse_amount,
    DateShape,
};
pub use parser::{parse_extraction, parse_extraction_with};
pub use pattern::PatternExtractor;
pub use pipeline::RfpProcessor;
pub use prompt::{
    extraction_tool, truncate_chars, DraftPromptBuilder, PromptBuilder, EXTRACTION_TOOL_NAME,
};
pub use remote::{classify_provider_error, RemoteExtractor, RemoteFailure, RemoteReply};
pub use types::{
    DraftOutcome, ExtractionResult, MergeReport, ProcessingOutcome, RawDocument,
    RequirementCandidate,
};
