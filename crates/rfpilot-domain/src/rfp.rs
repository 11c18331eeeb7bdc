//! RFP module - the primary document entity being analyzed

use std::fmt;

/// Unique identifier for an RFP based on UUIDv7
///
/// UUIDv7 keeps identifiers chronologically sortable, so listing RFPs by id
/// also lists them by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RfpId(u128);

impl RfpId {
    /// Generate a new UUIDv7-based RfpId
    ///
    /// # Examples
    ///
    /// ```
    /// use rfpilot_domain::RfpId;
    ///
    /// let id = RfpId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an RfpId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an RfpId from its hyphenated UUID string
    ///
    /// # Examples
    ///
    /// ```
    /// use rfpilot_domain::RfpId;
    ///
    /// let id = RfpId::new();
    /// let parsed = RfpId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s.trim())
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid RFP id '{}': {}", s, e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for RfpId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RfpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Processing status of an RFP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RfpStatus {
    /// Created, document not yet processed
    Pending,

    /// Document processed and fields extracted
    Active,

    /// No longer being pursued
    Archived,
}

impl RfpStatus {
    /// Get the status name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            RfpStatus::Pending => "pending",
            RfpStatus::Active => "active",
            RfpStatus::Archived => "archived",
        }
    }

    /// Parse a status from its stored name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(RfpStatus::Pending),
            "active" => Some(RfpStatus::Active),
            "archived" => Some(RfpStatus::Archived),
            _ => None,
        }
    }
}

impl std::str::FromStr for RfpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid RFP status: {}", s))
    }
}

/// A persisted RFP record
#[derive(Debug, Clone, PartialEq)]
pub struct Rfp {
    /// Unique identifier
    pub id: RfpId,

    /// Human-readable title
    pub title: String,

    /// Issuing organization
    pub client_name: Option<String>,

    /// Submission deadline as an ISO date (`YYYY-MM-DD`)
    pub deadline: Option<String>,

    /// Lower budget bound
    pub budget_min: Option<f64>,

    /// Upper budget bound
    pub budget_max: Option<f64>,

    /// Currency code (e.g. "USD")
    pub currency: Option<String>,

    /// Short project description
    pub description: Option<String>,

    /// Technologies the client asks for
    pub required_technologies: Vec<String>,

    /// Blob store reference of the uploaded document
    pub document_url: Option<String>,

    /// Audit JSON of the last extraction (remote, pattern, merged)
    pub extracted_data: Option<String>,

    /// Processing status
    pub status: RfpStatus,

    /// When this RFP was created (seconds since Unix epoch)
    pub created_at: u64,

    /// When this RFP was last updated (seconds since Unix epoch)
    pub updated_at: u64,
}

impl Rfp {
    /// Create a new pending RFP with only a title
    pub fn new(id: RfpId, title: impl Into<String>, created_at: u64) -> Self {
        Self {
            id,
            title: title.into(),
            client_name: None,
            deadline: None,
            budget_min: None,
            budget_max: None,
            currency: None,
            description: None,
            required_technologies: Vec::new(),
            document_url: None,
            extracted_data: None,
            status: RfpStatus::Pending,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Field update applied to an RFP after processing its document
#[derive(Debug, Clone, PartialEq)]
pub struct RfpUpdate {
    /// Title (unchanged when `None`)
    pub title: Option<String>,

    /// Issuing organization
    pub client_name: Option<String>,

    /// Submission deadline (`YYYY-MM-DD`)
    pub deadline: Option<String>,

    /// Lower budget bound
    pub budget_min: Option<f64>,

    /// Upper budget bound
    pub budget_max: Option<f64>,

    /// Currency code
    pub currency: String,

    /// Short project description
    pub description: Option<String>,

    /// Technologies the client asks for
    pub required_technologies: Vec<String>,

    /// Audit JSON of the extraction that produced this update
    pub extracted_data: String,

    /// Status after the update
    pub status: RfpStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfp_id_display_and_parse() {
        let id = RfpId::new();
        let id_str = id.to_string();

        assert_eq!(id_str.len(), 36);
        assert_eq!(RfpId::from_string(&id_str).unwrap(), id);
    }

    #[test]
    fn test_rfp_id_invalid_string() {
        assert!(RfpId::from_string("not-a-valid-uuid").is_err());
        assert!(RfpId::from_string("").is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [RfpStatus::Pending, RfpStatus::Active, RfpStatus::Archived] {
            assert_eq!(RfpStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!("ACTIVE".parse::<RfpStatus>(), Ok(RfpStatus::Active));
        assert!("draft".parse::<RfpStatus>().is_err());
    }

    #[test]
    fn test_new_rfp_is_pending() {
        let rfp = Rfp::new(RfpId::new(), "Data platform", 1000);
        assert_eq!(rfp.status, RfpStatus::Pending);
        assert_eq!(rfp.updated_at, 1000);
        assert!(rfp.document_url.is_none());
    }
}
