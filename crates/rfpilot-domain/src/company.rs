//! Company profile and proposal drafts

use crate::rfp::RfpId;

/// A capability the company offers
#[derive(Debug, Clone, PartialEq)]
pub struct Capability {
    /// Capability area (e.g. "Cloud")
    pub category: String,

    /// Capability description
    pub capability: String,

    /// Proficiency (e.g. "expert")
    pub proficiency_level: Option<String>,
}

/// A completed project used as a reference
#[derive(Debug, Clone, PartialEq)]
pub struct PastProject {
    /// Project name
    pub project_name: String,

    /// Client the project was delivered for
    pub client_name: Option<String>,

    /// Project budget
    pub budget: Option<f64>,

    /// Technologies used
    pub technologies_used: Vec<String>,

    /// Outcome summary
    pub outcome: Option<String>,

    /// Completion date (`YYYY-MM-DD`)
    pub completion_date: Option<String>,
}

/// The responding company's profile
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyProfile {
    /// Row identifier assigned by the store (0 before saving)
    pub id: i64,

    /// Company name
    pub name: String,

    /// Industry
    pub industry: Option<String>,

    /// Headcount
    pub employee_count: Option<u32>,

    /// Funds available to take on work
    pub available_funds: Option<f64>,

    /// Technologies the company works with
    pub technologies: Vec<String>,

    /// Company description
    pub description: Option<String>,

    /// Capabilities
    pub capabilities: Vec<Capability>,

    /// Past projects, most recent first
    pub past_projects: Vec<PastProject>,
}

impl CompanyProfile {
    /// Create an empty profile with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            industry: None,
            employee_count: None,
            available_funds: None,
            technologies: Vec::new(),
            description: None,
            capabilities: Vec::new(),
            past_projects: Vec::new(),
        }
    }
}

/// Proposal draft to be stored for an RFP
#[derive(Debug, Clone, PartialEq)]
pub struct NewResponseDraft {
    /// RFP the draft answers
    pub rfp_id: RfpId,

    /// Company the draft is written for
    pub company_id: i64,

    /// Section title
    pub section_title: String,

    /// Generated content
    pub draft_content: String,
}

/// A persisted proposal draft
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDraft {
    /// Row identifier assigned by the store
    pub id: i64,

    /// RFP the draft answers
    pub rfp_id: RfpId,

    /// Company the draft is written for
    pub company_id: i64,

    /// Section title
    pub section_title: String,

    /// Generated content
    pub draft_content: String,

    /// Draft status (always "draft" when generated)
    pub status: String,

    /// When this draft was created (seconds since Unix epoch)
    pub created_at: u64,
}
