use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_admin;
use crate::middleware::AuthUser;
use crate::models::StaticPageModel;
use crate::response::ApiResponse;
use crate::services::static_page::{PageInput, StaticPageService};
use crate::utils::render_markdown;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct PageResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub content_html: String,
    pub meta_description: Option<String>,
    pub is_published: bool,
    pub sort_order: i32,
    pub updated_at: String,
}

impl From<StaticPageModel> for PageResponse {
    fn from(p: StaticPageModel) -> Self {
        let content_html = render_markdown(&p.content);
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            content: p.content,
            content_html,
            meta_description: p.meta_description,
            is_published: p.is_published,
            sort_order: p.sort_order,
            updated_at: p.updated_at.to_string(),
        }
    }
}

/// Navigation entry for the public page list.
#[derive(Debug, Serialize, ToSchema)]
pub struct PageSummary {
    pub title: String,
    pub slug: String,
    pub meta_description: Option<String>,
    pub sort_order: i32,
}

impl From<StaticPageModel> for PageSummary {
    fn from(p: StaticPageModel) -> Self {
        Self {
            title: p.title,
            slug: p.slug,
            meta_description: p.meta_description,
            sort_order: p.sort_order,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PageRequest {
    /// Page title (1-200 characters); the slug is derived from it
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Markdown body
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(length(max = 300))]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl From<PageRequest> for PageInput {
    fn from(req: PageRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            meta_description: req.meta_description,
            is_published: req.is_published,
            sort_order: req.sort_order,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/pages",
    responses(
        (status = 200, description = "Published pages in display order", body = Vec<PageSummary>),
    ),
    tag = "pages"
)]
pub async fn list_pages(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let service = StaticPageService::new(db);
    let pages = service.list_published().await?;
    let items: Vec<PageSummary> = pages.into_iter().map(Into::into).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/pages/{slug}",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Published page", body = PageResponse),
        (status = 404, description = "Page not found", body = AppError),
    ),
    tag = "pages"
)]
pub async fn get_page(
    Extension(db): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = StaticPageService::new(db);
    let page = service.get_published_by_slug(&slug).await?;
    Ok(ApiResponse::ok(PageResponse::from(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/pages",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "All pages, drafts included", body = Vec<PageResponse>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "pages"
)]
pub async fn list_all_pages(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let service = StaticPageService::new(db);
    let pages = service.list_all().await?;
    let items: Vec<PageResponse> = pages.into_iter().map(Into::into).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/pages",
    security(("jwt_token" = [])),
    request_body = PageRequest,
    responses(
        (status = 200, description = "Page created", body = PageResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "pages"
)]
pub async fn create_page(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<PageRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    payload.validate()?;

    let service = StaticPageService::new(db);
    let page = service.create(payload.into(), auth_user.user_id).await?;
    Ok(ApiResponse::ok(PageResponse::from(page)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/pages/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Page ID")),
    request_body = PageRequest,
    responses(
        (status = 200, description = "Page updated", body = PageResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Page not found", body = AppError),
    ),
    tag = "pages"
)]
pub async fn update_page(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<PageRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    payload.validate()?;

    let service = StaticPageService::new(db);
    let page = service.update(id, payload.into(), auth_user.user_id).await?;
    Ok(ApiResponse::ok(PageResponse::from(page)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/pages/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Page ID")),
    responses(
        (status = 200, description = "Page deleted", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Page not found", body = AppError),
    ),
    tag = "pages"
)]
pub async fn delete_page(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let service = StaticPageService::new(db);
    service.delete(id, auth_user.user_id).await?;
    Ok(ApiResponse::ok("Page deleted successfully"))
}
