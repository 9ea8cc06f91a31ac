use crate::error::{AppError, AppResult};
use crate::handlers::article::{with_tags, ArticleResponse};
use crate::middleware::auth::require_admin;
use crate::middleware::AuthUser;
use crate::models::TagModel;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::article::{ArticleFilter, ArticleService};
use crate::services::tag::{TagInput, TagService};
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Hex color, e.g. #1e90ff
    pub color: Option<String>,
    /// Number of articles carrying the tag
    pub usage_count: i32,
    pub is_active: bool,
}

impl From<TagModel> for TagResponse {
    fn from(t: TagModel) -> Self {
        Self {
            id: t.id,
            name: t.name,
            slug: t.slug,
            description: t.description,
            color: t.color,
            usage_count: t.usage_count,
            is_active: t.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TagRequest {
    /// Tag name (1-50 characters)
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    pub color: Option<String>,
    /// Defaults to true
    pub is_active: Option<bool>,
}

impl From<TagRequest> for TagInput {
    fn from(req: TagRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            color: req.color,
            is_active: req.is_active.unwrap_or(true),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecountResponse {
    pub usage_count: i32,
}

#[utoipa::path(
    get,
    path = "/api/v1/tags",
    responses(
        (status = 200, description = "Active tags, most used first", body = Vec<TagResponse>),
    ),
    tag = "tags"
)]
pub async fn list_tags(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let service = TagService::new(db);
    let tags = service.list_tags().await?;
    let items: Vec<TagResponse> = tags.into_iter().map(TagResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/tags/{slug}/articles",
    params(
        ("slug" = String, Path, description = "Tag slug"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Published articles with this tag", body = PaginatedResponse<ArticleResponse>),
        (status = 404, description = "Tag not found", body = AppError),
    ),
    tag = "tags"
)]
pub async fn get_articles_by_tag(
    Extension(db): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, per_page) = params.resolve();

    let tag = TagService::new(db.clone()).get_by_slug(&slug).await?;
    let filter = ArticleFilter {
        tag: Some(tag.slug),
        ..Default::default()
    };

    let service = ArticleService::new(db.clone());
    let (articles, total) = service.list_published(&filter, page, per_page).await?;
    let items = with_tags(&db, articles).await?;

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/tags",
    security(("jwt_token" = [])),
    request_body = TagRequest,
    responses(
        (status = 200, description = "Tag created", body = TagResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 409, description = "Tag already exists", body = AppError),
    ),
    tag = "tags"
)]
pub async fn create_tag(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<TagRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    payload.validate()?;

    let service = TagService::new(db);
    let tag = service.create_tag(payload.into()).await?;
    Ok(ApiResponse::ok(TagResponse::from(tag)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/tags/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Tag ID")),
    request_body = TagRequest,
    responses(
        (status = 200, description = "Tag updated", body = TagResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "tags"
)]
pub async fn update_tag(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<TagRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    payload.validate()?;

    let service = TagService::new(db);
    let tag = service.update_tag(id, payload.into()).await?;
    Ok(ApiResponse::ok(TagResponse::from(tag)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/tags/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag deleted", body = String),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "tags"
)]
pub async fn delete_tag(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let service = TagService::new(db);
    service.delete_tag(id).await?;
    Ok(ApiResponse::ok("Tag deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/tags/{id}/recount",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Usage count recomputed from article links", body = RecountResponse),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Tag not found", body = AppError),
    ),
    tag = "tags"
)]
pub async fn recount_tag(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let service = TagService::new(db);
    let usage_count = service.recount_usage(id).await?;
    Ok(ApiResponse::ok(RecountResponse { usage_count }))
}
