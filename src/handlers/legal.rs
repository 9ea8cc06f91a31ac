use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_admin;
use crate::middleware::AuthUser;
use crate::models::{LegalDocumentModel, LegalKind};
use crate::response::ApiResponse;
use crate::services::legal::{LegalInput, LegalService};
use crate::utils::render_markdown;
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct LegalDocumentResponse {
    pub id: i32,
    /// terms or policy
    pub kind: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub version: String,
    pub title: String,
    pub content: String,
    pub content_html: String,
    pub effective_date: NaiveDate,
    pub is_active: bool,
    pub updated_at: String,
}

impl From<LegalDocumentModel> for LegalDocumentResponse {
    fn from(d: LegalDocumentModel) -> Self {
        let content_html = render_markdown(&d.content);
        Self {
            id: d.id,
            kind: d.kind,
            doc_type: d.doc_type,
            version: d.version,
            title: d.title,
            content: d.content,
            content_html,
            effective_date: d.effective_date,
            is_active: d.is_active,
            updated_at: d.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LegalDocumentRequest {
    /// Document type, e.g. `general` for terms or `cookies` for policies
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Dotted version such as 1.0
    #[validate(length(min = 1, max = 20))]
    pub version: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Markdown body
    #[validate(length(min = 1))]
    pub content: String,
    pub effective_date: NaiveDate,
    /// Activate immediately, replacing the current version
    #[serde(default)]
    pub is_active: bool,
}

impl From<LegalDocumentRequest> for LegalInput {
    fn from(req: LegalDocumentRequest) -> Self {
        Self {
            doc_type: req.doc_type,
            version: req.version,
            title: req.title,
            content: req.content,
            effective_date: req.effective_date,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LegalListQuery {
    /// Only versions of this type
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
}

async fn get_active(
    db: DatabaseConnection,
    kind: LegalKind,
    doc_type: &str,
) -> AppResult<ApiResponse<LegalDocumentResponse>> {
    let doc = LegalService::new(db, kind).get_active(doc_type).await?;
    Ok(ApiResponse::ok(doc.into()))
}

async fn list_versions(
    db: DatabaseConnection,
    auth_user: &AuthUser,
    kind: LegalKind,
    doc_type: Option<&str>,
) -> AppResult<ApiResponse<Vec<LegalDocumentResponse>>> {
    require_admin(auth_user)?;
    let docs = LegalService::new(db, kind).list(doc_type).await?;
    Ok(ApiResponse::ok(docs.into_iter().map(Into::into).collect()))
}

async fn create_version(
    db: DatabaseConnection,
    auth_user: &AuthUser,
    kind: LegalKind,
    payload: LegalDocumentRequest,
) -> AppResult<ApiResponse<LegalDocumentResponse>> {
    require_admin(auth_user)?;
    payload.validate()?;
    let doc = LegalService::new(db, kind)
        .create(payload.into(), auth_user.user_id)
        .await?;
    Ok(ApiResponse::ok(doc.into()))
}

async fn activate_version(
    db: DatabaseConnection,
    auth_user: &AuthUser,
    kind: LegalKind,
    id: i32,
) -> AppResult<ApiResponse<LegalDocumentResponse>> {
    require_admin(auth_user)?;
    let doc = LegalService::new(db, kind)
        .activate(id, auth_user.user_id)
        .await?;
    Ok(ApiResponse::with_message(doc.into(), "Version activated"))
}

async fn delete_version(
    db: DatabaseConnection,
    auth_user: &AuthUser,
    kind: LegalKind,
    id: i32,
) -> AppResult<ApiResponse<&'static str>> {
    require_admin(auth_user)?;
    LegalService::new(db, kind)
        .delete(id, auth_user.user_id)
        .await?;
    Ok(ApiResponse::ok("Document deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/terms/{type}/active",
    params(("type" = String, Path, description = "general, event, payment or privacy-notice")),
    responses(
        (status = 200, description = "Active terms version", body = LegalDocumentResponse),
        (status = 400, description = "Unknown type", body = AppError),
        (status = 404, description = "No active version", body = AppError),
    ),
    tag = "legal"
)]
pub async fn get_active_terms(
    Extension(db): Extension<DatabaseConnection>,
    Path(doc_type): Path<String>,
) -> AppResult<impl IntoResponse> {
    get_active(db, LegalKind::Terms, &doc_type).await
}

#[utoipa::path(
    get,
    path = "/api/v1/policies/{type}/active",
    params(("type" = String, Path, description = "privacy, cookies, refund or data-retention")),
    responses(
        (status = 200, description = "Active policy version", body = LegalDocumentResponse),
        (status = 400, description = "Unknown type", body = AppError),
        (status = 404, description = "No active version", body = AppError),
    ),
    tag = "legal"
)]
pub async fn get_active_policy(
    Extension(db): Extension<DatabaseConnection>,
    Path(doc_type): Path<String>,
) -> AppResult<impl IntoResponse> {
    get_active(db, LegalKind::Policy, &doc_type).await
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/terms",
    security(("jwt_token" = [])),
    params(LegalListQuery),
    responses(
        (status = 200, description = "Terms versions", body = Vec<LegalDocumentResponse>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "legal"
)]
pub async fn list_terms(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<LegalListQuery>,
) -> AppResult<impl IntoResponse> {
    list_versions(db, &auth_user, LegalKind::Terms, params.doc_type.as_deref()).await
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/terms",
    security(("jwt_token" = [])),
    request_body = LegalDocumentRequest,
    responses(
        (status = 200, description = "Terms version created", body = LegalDocumentResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 409, description = "Version already exists", body = AppError),
    ),
    tag = "legal"
)]
pub async fn create_terms(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<LegalDocumentRequest>,
) -> AppResult<impl IntoResponse> {
    create_version(db, &auth_user, LegalKind::Terms, payload).await
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/terms/{id}/activate",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Version activated", body = LegalDocumentResponse),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Document not found", body = AppError),
    ),
    tag = "legal"
)]
pub async fn activate_terms(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    activate_version(db, &auth_user, LegalKind::Terms, id).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/terms/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document deleted", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Document not found", body = AppError),
    ),
    tag = "legal"
)]
pub async fn delete_terms(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    delete_version(db, &auth_user, LegalKind::Terms, id).await
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/policies",
    security(("jwt_token" = [])),
    params(LegalListQuery),
    responses(
        (status = 200, description = "Policy versions", body = Vec<LegalDocumentResponse>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "legal"
)]
pub async fn list_policies(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<LegalListQuery>,
) -> AppResult<impl IntoResponse> {
    list_versions(db, &auth_user, LegalKind::Policy, params.doc_type.as_deref()).await
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/policies",
    security(("jwt_token" = [])),
    request_body = LegalDocumentRequest,
    responses(
        (status = 200, description = "Policy version created", body = LegalDocumentResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 409, description = "Version already exists", body = AppError),
    ),
    tag = "legal"
)]
pub async fn create_policy(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<LegalDocumentRequest>,
) -> AppResult<impl IntoResponse> {
    create_version(db, &auth_user, LegalKind::Policy, payload).await
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/policies/{id}/activate",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Version activated", body = LegalDocumentResponse),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Document not found", body = AppError),
    ),
    tag = "legal"
)]
pub async fn activate_policy(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    activate_version(db, &auth_user, LegalKind::Policy, id).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/policies/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document deleted", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Document not found", body = AppError),
    ),
    tag = "legal"
)]
pub async fn delete_policy(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    delete_version(db, &auth_user, LegalKind::Policy, id).await
}
