//! RFPilot Storage Layer
//!
//! Implements the `RfpStore` trait using SQLite and the `BlobStore` trait
//! using the local filesystem.
//!
//! # Architecture
//!
//! - SQLite for RFPs, requirements, the company profile and proposal drafts
//! - String lists (technologies) are stored as JSON arrays in TEXT columns
//! - Uploaded documents live under a blob root directory
//!
//! # Examples
//!
//! ```no_run
//! use rfpilot_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for RFP operations
//! ```

#![warn(missing_docs)]

pub mod blob;

use rfpilot_domain::traits::RfpStore;
use rfpilot_domain::{
    Capability, Category, CompanyProfile, NewRequirement, NewResponseDraft, PastProject,
    Priority, Requirement, ResponseDraft, Rfp, RfpId, RfpStatus, RfpUpdate,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

pub use blob::{BlobError, FsBlobStore};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// JSON encoding of a list column failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

const RFP_COLUMNS: &str = "id, title, client_name, deadline, budget_min, budget_max, currency, \
     description, required_technologies, document_url, extracted_data, status, created_at, updated_at";

/// SQLite-based implementation of RfpStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a SqliteStore behind a mutex
/// or give each thread its own instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Convert RfpId to bytes for storage
    fn rfp_id_to_bytes(id: RfpId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to RfpId
    fn bytes_to_rfp_id(bytes: &[u8]) -> Result<RfpId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for RfpId, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(RfpId::from_value(u128::from_be_bytes(arr)))
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn encode_list(items: &[String]) -> Result<String, StoreError> {
        Ok(serde_json::to_string(items)?)
    }

    fn decode_list(idx: usize, raw: String) -> rusqlite::Result<Vec<String>> {
        serde_json::from_str(&raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    }

    fn conversion_error(idx: usize, e: StoreError) -> rusqlite::Error {
        let ty = if idx == 0 {
            rusqlite::types::Type::Blob
        } else {
            rusqlite::types::Type::Text
        };
        rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(e))
    }

    fn row_to_rfp(row: &Row<'_>) -> rusqlite::Result<Rfp> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_rfp_id(&id_bytes).map_err(|e| Self::conversion_error(0, e))?;

        let status_str: String = row.get(11)?;
        let status = RfpStatus::parse(&status_str).ok_or_else(|| {
            Self::conversion_error(
                11,
                StoreError::InvalidData(format!("Unknown RFP status: {}", status_str)),
            )
        })?;

        Ok(Rfp {
            id,
            title: row.get(1)?,
            client_name: row.get(2)?,
            deadline: row.get(3)?,
            budget_min: row.get(4)?,
            budget_max: row.get(5)?,
            currency: row.get(6)?,
            description: row.get(7)?,
            required_technologies: Self::decode_list(8, row.get(8)?)?,
            document_url: row.get(9)?,
            extracted_data: row.get(10)?,
            status,
            created_at: row.get::<_, i64>(12)? as u64,
            updated_at: row.get::<_, i64>(13)? as u64,
        })
    }

    fn row_to_requirement(row: &Row<'_>) -> rusqlite::Result<Requirement> {
        let id_bytes: Vec<u8> = row.get(1)?;
        let rfp_id = Self::bytes_to_rfp_id(&id_bytes).map_err(|e| Self::conversion_error(0, e))?;

        let category_str: String = row.get(3)?;
        let priority_str: String = row.get(4)?;

        Ok(Requirement {
            id: row.get(0)?,
            rfp_id,
            requirement_text: row.get(2)?,
            // Rows written by other tools may carry free-form labels
            category: Category::parse(&category_str).unwrap_or_default(),
            priority: Priority::parse(&priority_str).unwrap_or(Priority::Medium),
            is_mandatory: row.get(5)?,
            created_at: row.get::<_, i64>(6)? as u64,
        })
    }

    fn load_capabilities(&self, company_id: i64) -> Result<Vec<Capability>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT category, capability, proficiency_level
             FROM company_capabilities WHERE company_id = ?1 ORDER BY id",
        )?;

        let capabilities = stmt
            .query_map(params![company_id], |row| {
                Ok(Capability {
                    category: row.get(0)?,
                    capability: row.get(1)?,
                    proficiency_level: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(capabilities)
    }

    fn load_past_projects(&self, company_id: i64) -> Result<Vec<PastProject>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT project_name, client_name, budget, technologies_used, outcome, completion_date
             FROM past_projects WHERE company_id = ?1
             ORDER BY completion_date IS NULL, completion_date DESC, id",
        )?;

        let projects = stmt
            .query_map(params![company_id], |row| {
                Ok(PastProject {
                    project_name: row.get(0)?,
                    client_name: row.get(1)?,
                    budget: row.get(2)?,
                    technologies_used: Self::decode_list(3, row.get(3)?)?,
                    outcome: row.get(4)?,
                    completion_date: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }
}

impl RfpStore for SqliteStore {
    type Error = StoreError;

    fn create_rfp(&mut self, rfp: Rfp) -> Result<RfpId, Self::Error> {
        self.conn.execute(
            "INSERT INTO rfps (id, title, client_name, deadline, budget_min, budget_max, currency,
                               description, required_technologies, document_url, extracted_data,
                               status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                Self::rfp_id_to_bytes(rfp.id),
                &rfp.title,
                &rfp.client_name,
                &rfp.deadline,
                rfp.budget_min,
                rfp.budget_max,
                &rfp.currency,
                &rfp.description,
                Self::encode_list(&rfp.required_technologies)?,
                &rfp.document_url,
                &rfp.extracted_data,
                rfp.status.as_str(),
                rfp.created_at as i64,
                rfp.updated_at as i64,
            ],
        )?;

        debug!("Created RFP {}", rfp.id);
        Ok(rfp.id)
    }

    fn get_rfp(&self, id: RfpId) -> Result<Option<Rfp>, Self::Error> {
        let rfp = self
            .conn
            .query_row(
                &format!("SELECT {} FROM rfps WHERE id = ?1", RFP_COLUMNS),
                params![Self::rfp_id_to_bytes(id)],
                Self::row_to_rfp,
            )
            .optional()?;

        Ok(rfp)
    }

    fn list_rfps(&self) -> Result<Vec<Rfp>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM rfps ORDER BY created_at DESC, rowid DESC",
            RFP_COLUMNS
        ))?;

        let rfps = stmt
            .query_map([], Self::row_to_rfp)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rfps)
    }

    fn set_document(&mut self, id: RfpId, document_url: &str) -> Result<(), Self::Error> {
        let updated = self.conn.execute(
            "UPDATE rfps SET document_url = ?2, updated_at = ?3 WHERE id = ?1",
            params![Self::rfp_id_to_bytes(id), document_url, Self::now() as i64],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(format!("RFP {}", id)));
        }
        Ok(())
    }

    fn update_rfp(&mut self, id: RfpId, update: &RfpUpdate) -> Result<(), Self::Error> {
        let updated = self.conn.execute(
            "UPDATE rfps SET
                title = COALESCE(?2, title),
                client_name = ?3,
                deadline = ?4,
                budget_min = ?5,
                budget_max = ?6,
                currency = ?7,
                description = ?8,
                required_technologies = ?9,
                extracted_data = ?10,
                status = ?11,
                updated_at = ?12
             WHERE id = ?1",
            params![
                Self::rfp_id_to_bytes(id),
                &update.title,
                &update.client_name,
                &update.deadline,
                update.budget_min,
                update.budget_max,
                &update.currency,
                &update.description,
                Self::encode_list(&update.required_technologies)?,
                &update.extracted_data,
                update.status.as_str(),
                Self::now() as i64,
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(format!("RFP {}", id)));
        }

        debug!("Updated RFP {} (status {})", id, update.status.as_str());
        Ok(())
    }

    fn insert_requirements(
        &mut self,
        rfp_id: RfpId,
        requirements: &[NewRequirement],
    ) -> Result<usize, Self::Error> {
        let id_bytes = Self::rfp_id_to_bytes(rfp_id);
        let now = Self::now() as i64;

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO rfp_requirements
                    (rfp_id, requirement_text, category, priority, is_mandatory, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for requirement in requirements {
                stmt.execute(params![
                    &id_bytes,
                    &requirement.requirement_text,
                    requirement.category.as_str(),
                    requirement.priority.as_str(),
                    requirement.is_mandatory,
                    now,
                ])?;
            }
        }
        tx.commit()?;

        Ok(requirements.len())
    }

    fn list_requirements(&self, rfp_id: RfpId) -> Result<Vec<Requirement>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, rfp_id, requirement_text, category, priority, is_mandatory, created_at
             FROM rfp_requirements WHERE rfp_id = ?1 ORDER BY id",
        )?;

        let requirements = stmt
            .query_map(params![Self::rfp_id_to_bytes(rfp_id)], Self::row_to_requirement)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(requirements)
    }

    fn get_company_profile(&self) -> Result<Option<CompanyProfile>, Self::Error> {
        let company = self
            .conn
            .query_row(
                "SELECT id, name, industry, employee_count, available_funds, technologies, description
                 FROM companies ORDER BY id LIMIT 1",
                [],
                |row| {
                    Ok(CompanyProfile {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        industry: row.get(2)?,
                        employee_count: row.get(3)?,
                        available_funds: row.get(4)?,
                        technologies: Self::decode_list(5, row.get(5)?)?,
                        description: row.get(6)?,
                        capabilities: Vec::new(),
                        past_projects: Vec::new(),
                    })
                },
            )
            .optional()?;

        let Some(mut company) = company else {
            return Ok(None);
        };

        company.capabilities = self.load_capabilities(company.id)?;
        company.past_projects = self.load_past_projects(company.id)?;
        Ok(Some(company))
    }

    fn save_company_profile(&mut self, profile: &CompanyProfile) -> Result<i64, Self::Error> {
        let now = Self::now() as i64;
        let technologies = Self::encode_list(&profile.technologies)?;

        let tx = self.conn.transaction()?;

        let existing = if profile.id > 0 {
            tx.query_row(
                "SELECT id FROM companies WHERE id = ?1",
                params![profile.id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
        } else {
            None
        };

        let company_id = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE companies SET name = ?2, industry = ?3, employee_count = ?4,
                        available_funds = ?5, technologies = ?6, description = ?7, updated_at = ?8
                     WHERE id = ?1",
                    params![
                        id,
                        &profile.name,
                        &profile.industry,
                        profile.employee_count,
                        profile.available_funds,
                        &technologies,
                        &profile.description,
                        now,
                    ],
                )?;
                tx.execute("DELETE FROM company_capabilities WHERE company_id = ?1", params![id])?;
                tx.execute("DELETE FROM past_projects WHERE company_id = ?1", params![id])?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO companies
                        (name, industry, employee_count, available_funds, technologies, description, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        &profile.name,
                        &profile.industry,
                        profile.employee_count,
                        profile.available_funds,
                        &technologies,
                        &profile.description,
                        now,
                    ],
                )?;
                tx.last_insert_rowid()
            }
        };

        for capability in &profile.capabilities {
            tx.execute(
                "INSERT INTO company_capabilities (company_id, category, capability, proficiency_level)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    company_id,
                    &capability.category,
                    &capability.capability,
                    &capability.proficiency_level,
                ],
            )?;
        }

        for project in &profile.past_projects {
            tx.execute(
                "INSERT INTO past_projects
                    (company_id, project_name, client_name, budget, technologies_used, outcome, completion_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    company_id,
                    &project.project_name,
                    &project.client_name,
                    project.budget,
                    Self::encode_list(&project.technologies_used)?,
                    &project.outcome,
                    &project.completion_date,
                ],
            )?;
        }

        tx.commit()?;
        Ok(company_id)
    }

    fn insert_response_draft(&mut self, draft: &NewResponseDraft) -> Result<i64, Self::Error> {
        self.conn.execute(
            "INSERT INTO rfp_responses (rfp_id, company_id, section_title, draft_content, status, created_at)
             VALUES (?1, ?2, ?3, ?4, 'draft', ?5)",
            params![
                Self::rfp_id_to_bytes(draft.rfp_id),
                draft.company_id,
                &draft.section_title,
                &draft.draft_content,
                Self::now() as i64,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn list_response_drafts(&self, rfp_id: RfpId) -> Result<Vec<ResponseDraft>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, rfp_id, company_id, section_title, draft_content, status, created_at
             FROM rfp_responses WHERE rfp_id = ?1 ORDER BY id",
        )?;

        let drafts = stmt
            .query_map(params![Self::rfp_id_to_bytes(rfp_id)], |row| {
                let id_bytes: Vec<u8> = row.get(1)?;
                let rfp_id =
                    Self::bytes_to_rfp_id(&id_bytes).map_err(|e| Self::conversion_error(0, e))?;

                Ok(ResponseDraft {
                    id: row.get(0)?,
                    rfp_id,
                    company_id: row.get(2)?,
                    section_title: row.get(3)?,
                    draft_content: row.get(4)?,
                    status: row.get(5)?,
                    created_at: row.get::<_, i64>(6)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfp_id_bytes_round_trip() {
        let id = RfpId::new();
        let bytes = SqliteStore::rfp_id_to_bytes(id);
        assert_eq!(bytes.len(), 16);
        assert_eq!(SqliteStore::bytes_to_rfp_id(&bytes).unwrap(), id);
    }

    #[test]
    fn test_bytes_to_rfp_id_rejects_wrong_length() {
        assert!(matches!(
            SqliteStore::bytes_to_rfp_id(&[1, 2, 3]),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_schema_is_idempotent() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        assert!(store.initialize_schema().is_ok());
    }
}
