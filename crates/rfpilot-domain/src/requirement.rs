//! Requirement module - obligations extracted from an RFP document

use crate::rfp::RfpId;
use serde::{Deserialize, Serialize};

/// Requirement category
///
/// Unclassifiable requirements default to `Technical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    /// Systems, integrations, platforms
    #[default]
    Technical,

    /// Experience, certifications, staffing
    Qualification,

    /// Regulation, standards, legal
    Compliance,

    /// Artifacts to hand over
    Deliverable,

    /// Support, maintenance, service levels
    Operational,

    /// Pricing, payment, insurance
    Financial,
}

impl Category {
    /// All categories in declaration order
    pub const ALL: [Category; 6] = [
        Category::Technical,
        Category::Qualification,
        Category::Compliance,
        Category::Deliverable,
        Category::Operational,
        Category::Financial,
    ];

    /// Get the category name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technical => "Technical",
            Category::Qualification => "Qualification",
            Category::Compliance => "Compliance",
            Category::Deliverable => "Deliverable",
            Category::Operational => "Operational",
            Category::Financial => "Financial",
        }
    }

    /// Parse a category name, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid category: {}", s))
    }
}

/// Requirement priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Must be addressed first
    High,

    /// Default priority
    Medium,

    /// Nice to have
    Low,
}

impl Priority {
    /// Get the priority name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Parse a priority name, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid priority: {}", s))
    }
}

/// Requirement row to be appended to an RFP
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequirement {
    /// Requirement text
    pub requirement_text: String,

    /// Category
    pub category: Category,

    /// Priority
    pub priority: Priority,

    /// Whether the requirement is mandatory
    pub is_mandatory: bool,
}

/// A persisted requirement row
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    /// Row identifier assigned by the store
    pub id: i64,

    /// Owning RFP
    pub rfp_id: RfpId,

    /// Requirement text
    pub requirement_text: String,

    /// Category
    pub category: Category,

    /// Priority
    pub priority: Priority,

    /// Whether the requirement is mandatory
    pub is_mandatory: bool,

    /// When this row was created (seconds since Unix epoch)
    pub created_at: u64,
}
