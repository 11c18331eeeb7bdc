//! HTTP request handlers for the RFPilot service.
//!
//! Implements RFP registration and listing, document processing, proposal
//! drafting, company profile and health check endpoints using axum.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use rfpilot_domain::traits::{LlmProvider, RfpStore};
use rfpilot_domain::{
    Capability, CompanyProfile, PastProject, Requirement, ResponseDraft, Rfp, RfpId,
};
use rfpilot_extractor::{
    ExtractionResult, ExtractorConfig, ExtractorError, ResponseDrafter, RfpProcessor,
};
use rfpilot_store::{FsBlobStore, SqliteStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};

/// Shared application state
pub struct AppState<L> {
    /// Document processing pipeline
    pub processor: Arc<RfpProcessor<L, SqliteStore, FsBlobStore>>,
    /// Proposal drafter
    pub drafter: Arc<ResponseDrafter<L, SqliteStore>>,
    /// Store shared with the processor and drafter
    pub store: Arc<Mutex<SqliteStore>>,
}

impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            processor: Arc::clone(&self.processor),
            drafter: Arc::clone(&self.drafter),
            store: Arc::clone(&self.store),
        }
    }
}

impl<L> AppState<L>
where
    L: LlmProvider + Send + Sync + 'static,
{
    /// Wire the processor and drafter around one provider and one store
    pub fn new(
        provider: L,
        store: SqliteStore,
        blobs: FsBlobStore,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        let provider = Arc::new(provider);
        let store = Arc::new(Mutex::new(store));

        let processor = RfpProcessor::new(
            Arc::clone(&provider),
            Arc::clone(&store),
            Arc::new(blobs),
            config,
        )?;
        let drafter = ResponseDrafter::new(provider, Arc::clone(&store));

        Ok(Self {
            processor: Arc::new(processor),
            drafter: Arc::new(drafter),
            store,
        })
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, SqliteStore>, AppError> {
        self.store
            .lock()
            .map_err(|e| AppError::Internal(format!("Store lock error: {}", e)))
    }
}

/// Request naming an RFP
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfpIdRequest {
    /// RFP identifier (UUID)
    #[serde(default)]
    pub rfp_id: Option<String>,
}

/// Request registering an uploaded RFP
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRfpRequest {
    /// Title shown until extraction finds a better one
    pub title: String,
    /// Blob store reference of the uploaded document
    #[serde(default)]
    pub document_url: Option<String>,
}

/// Request attaching an uploaded document to an RFP
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    /// Blob store reference of the uploaded document
    #[serde(default)]
    pub document_url: Option<String>,
}

/// Capability entry of a company profile request
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityBody {
    /// Capability area
    pub category: String,
    /// Capability description
    pub capability: String,
    /// Proficiency
    #[serde(default)]
    pub proficiency_level: Option<String>,
}

/// Past project entry of a company profile request
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastProjectBody {
    /// Project name
    pub project_name: String,
    /// Client
    #[serde(default)]
    pub client_name: Option<String>,
    /// Budget
    #[serde(default)]
    pub budget: Option<f64>,
    /// Technologies used
    #[serde(default)]
    pub technologies_used: Vec<String>,
    /// Outcome summary
    #[serde(default)]
    pub outcome: Option<String>,
    /// Completion date (`YYYY-MM-DD`)
    #[serde(default)]
    pub completion_date: Option<String>,
}

/// Company profile request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfileRequest {
    /// Company name
    pub name: String,
    /// Industry
    #[serde(default)]
    pub industry: Option<String>,
    /// Headcount
    #[serde(default)]
    pub employee_count: Option<u32>,
    /// Funds available to take on work
    #[serde(default)]
    pub available_funds: Option<f64>,
    /// Technologies
    #[serde(default)]
    pub technologies: Vec<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Capabilities
    #[serde(default)]
    pub capabilities: Vec<CapabilityBody>,
    /// Past projects
    #[serde(default)]
    pub past_projects: Vec<PastProjectBody>,
}

impl CompanyProfileRequest {
    fn into_profile(self, id: i64) -> CompanyProfile {
        CompanyProfile {
            id,
            name: self.name,
            industry: self.industry,
            employee_count: self.employee_count,
            available_funds: self.available_funds,
            technologies: self.technologies,
            description: self.description,
            capabilities: self
                .capabilities
                .into_iter()
                .map(|c| Capability {
                    category: c.category,
                    capability: c.capability,
                    proficiency_level: c.proficiency_level,
                })
                .collect(),
            past_projects: self
                .past_projects
                .into_iter()
                .map(|p| PastProject {
                    project_name: p.project_name,
                    client_name: p.client_name,
                    budget: p.budget,
                    technologies_used: p.technologies_used,
                    outcome: p.outcome,
                    completion_date: p.completion_date,
                })
                .collect(),
        }
    }
}

/// The stored company profile
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfileResponse {
    /// Row identifier
    pub id: i64,
    /// Company name
    pub name: String,
    /// Industry
    pub industry: Option<String>,
    /// Headcount
    pub employee_count: Option<u32>,
    /// Funds available to take on work
    pub available_funds: Option<f64>,
    /// Technologies
    pub technologies: Vec<String>,
    /// Description
    pub description: Option<String>,
    /// Capabilities
    pub capabilities: Vec<CapabilityBody>,
    /// Past projects, most recent first
    pub past_projects: Vec<PastProjectBody>,
}

impl From<CompanyProfile> for CompanyProfileResponse {
    fn from(profile: CompanyProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            industry: profile.industry,
            employee_count: profile.employee_count,
            available_funds: profile.available_funds,
            technologies: profile.technologies,
            description: profile.description,
            capabilities: profile
                .capabilities
                .into_iter()
                .map(|c| CapabilityBody {
                    category: c.category,
                    capability: c.capability,
                    proficiency_level: c.proficiency_level,
                })
                .collect(),
            past_projects: profile
                .past_projects
                .into_iter()
                .map(|p| PastProjectBody {
                    project_name: p.project_name,
                    client_name: p.client_name,
                    budget: p.budget,
                    technologies_used: p.technologies_used,
                    outcome: p.outcome,
                    completion_date: p.completion_date,
                })
                .collect(),
        }
    }
}

/// A stored proposal draft
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRowResponse {
    /// Row identifier
    pub id: i64,
    /// Company the draft was written for
    pub company_id: i64,
    /// Section title
    pub section_title: String,
    /// Generated proposal text
    pub draft_content: String,
    /// Draft status
    pub status: String,
    /// Creation time (seconds since Unix epoch)
    pub created_at: u64,
}

impl From<ResponseDraft> for DraftRowResponse {
    fn from(draft: ResponseDraft) -> Self {
        Self {
            id: draft.id,
            company_id: draft.company_id,
            section_title: draft.section_title,
            draft_content: draft.draft_content,
            status: draft.status,
            created_at: draft.created_at,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
}

/// Response to a processing request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    /// Always true
    pub success: bool,
    /// Canonical record written to the RFP
    pub data: ExtractionResult,
    /// Whether the requirement rows were stored
    pub requirements_persisted: bool,
    /// Number of requirement rows stored
    pub requirements_inserted: usize,
}

/// Response to a drafting request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    /// Always true
    pub success: bool,
    /// Generated proposal text
    pub content: String,
    /// Whether the draft row was stored
    pub saved: bool,
}

/// Response carrying a created row identifier
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    /// Always true
    pub success: bool,
    /// Identifier of the created or updated row
    pub id: String,
}

/// A stored requirement
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementResponse {
    /// Row identifier
    pub id: i64,
    /// Requirement text
    pub requirement_text: String,
    /// Category
    pub category: String,
    /// Priority
    pub priority: String,
    /// Whether the requirement is mandatory
    pub is_mandatory: bool,
}

impl From<Requirement> for RequirementResponse {
    fn from(r: Requirement) -> Self {
        Self {
            id: r.id,
            requirement_text: r.requirement_text,
            category: r.category.as_str().to_string(),
            priority: r.priority.as_str().to_string(),
            is_mandatory: r.is_mandatory,
        }
    }
}

/// A stored RFP with its requirements
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfpResponse {
    /// RFP identifier
    pub id: String,
    /// Title
    pub title: String,
    /// Issuing organization
    pub client_name: Option<String>,
    /// Deadline (`YYYY-MM-DD`)
    pub deadline: Option<String>,
    /// Lower budget bound
    pub budget_min: Option<f64>,
    /// Upper budget bound
    pub budget_max: Option<f64>,
    /// Currency code
    pub currency: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Technologies the client asks for
    pub required_technologies: Vec<String>,
    /// Blob store reference
    pub document_url: Option<String>,
    /// Audit record of the last extraction
    pub extracted_data: Option<serde_json::Value>,
    /// Processing status
    pub status: String,
    /// Creation time (seconds since Unix epoch)
    pub created_at: u64,
    /// Last update time (seconds since Unix epoch)
    pub updated_at: u64,
    /// Requirements in insertion order
    pub requirements: Vec<RequirementResponse>,
}

impl RfpResponse {
    fn new(rfp: Rfp, requirements: Vec<Requirement>) -> Self {
        Self {
            id: rfp.id.to_string(),
            title: rfp.title,
            client_name: rfp.client_name,
            deadline: rfp.deadline,
            budget_min: rfp.budget_min,
            budget_max: rfp.budget_max,
            currency: rfp.currency,
            description: rfp.description,
            required_technologies: rfp.required_technologies,
            document_url: rfp.document_url,
            extracted_data: rfp
                .extracted_data
                .as_deref()
                .and_then(|s| serde_json::from_str(s).ok()),
            status: rfp.status.as_str().to_string(),
            created_at: rfp.created_at,
            updated_at: rfp.updated_at,
            requirements: requirements.into_iter().map(RequirementResponse::from).collect(),
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Present (and true) when retrying later may succeed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed request
    BadRequest(String),
    /// Unknown resource
    NotFound(String),
    /// Processing or drafting failure
    Extractor(ExtractorError),
    /// Direct store access failure
    Store(StoreError),
    /// Internal server error
    Internal(String),
}

/// HTTP status for a processing failure
pub fn status_for(error: &ExtractorError) -> StatusCode {
    match error {
        ExtractorError::Input(_) => StatusCode::BAD_REQUEST,
        ExtractorError::Transport(_) => StatusCode::BAD_GATEWAY,
        ExtractorError::RemoteThrottled => StatusCode::TOO_MANY_REQUESTS,
        ExtractorError::RemoteQuotaExhausted => StatusCode::PAYMENT_REQUIRED,
        ExtractorError::RemoteMalformed(_) | ExtractorError::Remote(_) => StatusCode::BAD_GATEWAY,
        ExtractorError::Store(_)
        | ExtractorError::Task(_)
        | ExtractorError::Config(_)
        | ExtractorError::JsonParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, retryable) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Extractor(e) => {
                let retryable = e.is_retryable().then_some(true);
                (status_for(&e), e.to_string(), retryable)
            }
            AppError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        };

        if status.is_server_error() {
            error!("Request failed ({}): {}", status, message);
        } else {
            warn!("Request rejected ({}): {}", status, message);
        }

        let body = Json(ErrorResponse {
            error: message,
            retryable,
        });
        (status, body).into_response()
    }
}

impl From<ExtractorError> for AppError {
    fn from(e: ExtractorError) -> Self {
        AppError::Extractor(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            other => AppError::Store(other),
        }
    }
}

fn parse_rfp_id(raw: Option<&str>) -> Result<RfpId, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("rfpId is required".to_string()))?;

    RfpId::from_string(raw).map_err(AppError::BadRequest)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
    })
}

/// POST /rfps - Register an uploaded RFP as pending
async fn create_rfp<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<CreateRfpRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError>
where
    L: LlmProvider + Send + Sync + 'static,
{
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("title is required".to_string()));
    }

    let mut rfp = Rfp::new(RfpId::new(), title, now_secs());
    rfp.document_url = request.document_url.filter(|url| !url.trim().is_empty());

    let id = state.lock_store()?.create_rfp(rfp)?;
    info!("Registered RFP {}", id);

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            id: id.to_string(),
        }),
    ))
}

/// GET /rfps/:id - An RFP with its requirements
async fn get_rfp<L>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
) -> Result<Json<RfpResponse>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
{
    let rfp_id = parse_rfp_id(Some(&id))?;

    let store = state.lock_store()?;
    let rfp = store
        .get_rfp(rfp_id)?
        .ok_or_else(|| AppError::NotFound(format!("RFP not found: {}", rfp_id)))?;
    let requirements = store.list_requirements(rfp_id)?;

    Ok(Json(RfpResponse::new(rfp, requirements)))
}

/// GET /rfps - All RFPs with their requirements, newest first
async fn list_rfps<L>(
    State(state): State<AppState<L>>,
) -> Result<Json<Vec<RfpResponse>>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
{
    let store = state.lock_store()?;
    let rfps = store
        .list_rfps()?
        .into_iter()
        .map(|rfp| {
            let requirements = store.list_requirements(rfp.id)?;
            Ok(RfpResponse::new(rfp, requirements))
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    Ok(Json(rfps))
}

/// PUT /rfps/:id/document - Attach an uploaded document to an RFP
async fn set_rfp_document<L>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
    Json(request): Json<DocumentRequest>,
) -> Result<Json<CreatedResponse>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
{
    let rfp_id = parse_rfp_id(Some(&id))?;
    let document_url = request
        .document_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::BadRequest("documentUrl is required".to_string()))?;

    state.lock_store()?.set_document(rfp_id, document_url)?;
    info!("Attached document {} to RFP {}", document_url, rfp_id);

    Ok(Json(CreatedResponse {
        success: true,
        id: rfp_id.to_string(),
    }))
}

/// GET /rfps/:id/drafts - Stored proposal drafts of an RFP, oldest first
async fn list_drafts<L>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<DraftRowResponse>>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
{
    let rfp_id = parse_rfp_id(Some(&id))?;

    let store = state.lock_store()?;
    if store.get_rfp(rfp_id)?.is_none() {
        return Err(AppError::NotFound(format!("RFP not found: {}", rfp_id)));
    }
    let drafts = store.list_response_drafts(rfp_id)?;

    Ok(Json(drafts.into_iter().map(DraftRowResponse::from).collect()))
}

/// POST /rfps/process - Extract fields and requirements from the RFP document
async fn process_rfp<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<RfpIdRequest>,
) -> Result<Json<ProcessResponse>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
{
    let rfp_id = parse_rfp_id(request.rfp_id.as_deref())?;

    let outcome = state.processor.process(rfp_id).await?;

    Ok(Json(ProcessResponse {
        success: true,
        data: outcome.merged,
        requirements_persisted: outcome.requirements_persisted,
        requirements_inserted: outcome.requirements_inserted,
    }))
}

/// POST /rfps/draft-response - Write a proposal draft for the RFP
async fn draft_response<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<RfpIdRequest>,
) -> Result<Json<DraftResponse>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
{
    let rfp_id = parse_rfp_id(request.rfp_id.as_deref())?;

    let outcome = state.drafter.draft(rfp_id).await?;

    Ok(Json(DraftResponse {
        success: true,
        content: outcome.content,
        saved: outcome.saved,
    }))
}

/// PUT /company-profile - Insert or replace the company profile
async fn save_company_profile<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<CompanyProfileRequest>,
) -> Result<Json<CreatedResponse>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
{
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }

    let mut store = state.lock_store()?;
    let existing_id = store.get_company_profile()?.map(|c| c.id).unwrap_or(0);
    let id = store.save_company_profile(&request.into_profile(existing_id))?;
    info!("Saved company profile {}", id);

    Ok(Json(CreatedResponse {
        success: true,
        id: id.to_string(),
    }))
}

/// GET /company-profile - The stored company profile
async fn get_company_profile<L>(
    State(state): State<AppState<L>>,
) -> Result<Json<CompanyProfileResponse>, AppError>
where
    L: LlmProvider + Send + Sync + 'static,
{
    let profile = state
        .lock_store()?
        .get_company_profile()?
        .ok_or_else(|| AppError::NotFound("No company profile saved".to_string()))?;

    Ok(Json(CompanyProfileResponse::from(profile)))
}

/// Create the axum router with all routes
pub fn create_router<L>(state: AppState<L>) -> Router
where
    L: LlmProvider + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/rfps", get(list_rfps::<L>).post(create_rfp::<L>))
        .route("/rfps/process", post(process_rfp::<L>))
        .route("/rfps/draft-response", post(draft_response::<L>))
        .route("/rfps/:id", get(get_rfp::<L>))
        .route("/rfps/:id/document", put(set_rfp_document::<L>))
        .route("/rfps/:id/drafts", get(list_drafts::<L>))
        .route(
            "/company-profile",
            get(get_company_profile::<L>).put(save_company_profile::<L>),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ExtractorError::Input("x".into()), StatusCode::BAD_REQUEST),
            (ExtractorError::Transport("x".into()), StatusCode::BAD_GATEWAY),
            (ExtractorError::RemoteThrottled, StatusCode::TOO_MANY_REQUESTS),
            (ExtractorError::RemoteQuotaExhausted, StatusCode::PAYMENT_REQUIRED),
            (ExtractorError::RemoteMalformed("x".into()), StatusCode::BAD_GATEWAY),
            (ExtractorError::Remote("x".into()), StatusCode::BAD_GATEWAY),
            (ExtractorError::Store("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(status_for(&error), expected, "{:?}", error);
        }
    }

    #[test]
    fn test_parse_rfp_id() {
        let id = RfpId::new();
        assert_eq!(parse_rfp_id(Some(&id.to_string())).unwrap(), id);
        assert!(matches!(parse_rfp_id(None), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_rfp_id(Some("  ")), Err(AppError::BadRequest(_))));
        assert!(matches!(
            parse_rfp_id(Some("not-a-uuid")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_store_not_found_maps_to_404() {
        let response = AppError::from(StoreError::NotFound("RFP x".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::from(StoreError::InvalidData("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_throttled_error_is_marked_retryable() {
        let response = AppError::Extractor(ExtractorError::RemoteThrottled).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
