use crate::error::{AppError, AppResult};
use crate::handlers::tag::TagResponse;
use crate::middleware::auth::require_role;
use crate::middleware::AuthUser;
use crate::models::{ArticleModel, Role};
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::article::{ArticleCounter, ArticleFilter, ArticleInput, ArticleService};
use crate::services::article_tag::ArticleTagService;
use crate::utils::render_markdown;
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

const WRITER_ROLES: &[Role] = &[Role::Admin, Role::Client];

#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    /// Raw Markdown
    pub content: String,
    /// Rendered and sanitized HTML
    pub content_html: String,
    /// draft, published or archived
    pub status: String,
    pub author_id: i32,
    pub category_id: Option<i32>,
    pub tags: Vec<TagResponse>,
    pub view_count: i32,
    pub like_count: i32,
    pub share_count: i32,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ArticleResponse {
    fn new(a: ArticleModel, tags: Vec<TagResponse>) -> Self {
        let content_html = render_markdown(&a.content);
        Self {
            id: a.id,
            title: a.title,
            slug: a.slug,
            excerpt: a.excerpt,
            content: a.content,
            content_html,
            status: a.status,
            author_id: a.author_id,
            category_id: a.category_id,
            tags,
            view_count: a.view_count,
            like_count: a.like_count,
            share_count: a.share_count,
            published_at: a.published_at.map(|t| t.to_string()),
            created_at: a.created_at.to_string(),
            updated_at: a.updated_at.to_string(),
        }
    }
}

/// Attach tags to a page of articles with one junction query.
pub(crate) async fn with_tags(
    db: &DatabaseConnection,
    articles: Vec<ArticleModel>,
) -> AppResult<Vec<ArticleResponse>> {
    let ids: Vec<i32> = articles.iter().map(|a| a.id).collect();
    let mut tags = ArticleTagService::new(db.clone())
        .tags_for_articles(&ids)
        .await?;

    Ok(articles
        .into_iter()
        .map(|a| {
            let article_tags = tags
                .remove(&a.id)
                .unwrap_or_default()
                .into_iter()
                .map(TagResponse::from)
                .collect();
            ArticleResponse::new(a, article_tags)
        })
        .collect())
}

async fn single_with_tags(
    db: &DatabaseConnection,
    article: ArticleModel,
) -> AppResult<ArticleResponse> {
    with_tags(db, vec![article])
        .await?
        .pop()
        .ok_or(AppError::NotFound)
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ArticleListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Filter by status (writer listing only)
    pub status: Option<String>,
    /// Filter by category slug
    pub category: Option<String>,
    /// Filter by tag slug
    pub tag: Option<String>,
    /// Filter by author id
    pub author_id: Option<i32>,
}

impl ArticleListQuery {
    fn split(self) -> (PaginationQuery, ArticleFilter) {
        (
            PaginationQuery {
                page: self.page,
                per_page: self.per_page,
            },
            ArticleFilter {
                status: self.status,
                category: self.category,
                tag: self.tag,
                author_id: self.author_id,
            },
        )
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ArticleRequest {
    /// Title (1-200 characters)
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    /// Markdown body
    #[validate(length(min = 1))]
    pub content: String,
    /// draft (default on create), published or archived
    pub status: Option<String>,
    pub category_id: Option<i32>,
    /// Replaces the article's tag set when present
    #[validate(length(max = 20))]
    pub tag_ids: Option<Vec<i32>>,
}

impl From<ArticleRequest> for ArticleInput {
    fn from(req: ArticleRequest) -> Self {
        Self {
            title: req.title,
            excerpt: req.excerpt,
            content: req.content,
            status: req.status,
            category_id: req.category_id,
            tag_ids: req.tag_ids,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CounterResponse {
    /// Counter value after the increment
    pub count: i64,
}

#[utoipa::path(
    get,
    path = "/api/v1/articles",
    params(ArticleListQuery),
    responses(
        (status = 200, description = "Published articles", body = PaginatedResponse<ArticleResponse>),
    ),
    tag = "articles"
)]
pub async fn list_articles(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<ArticleListQuery>,
) -> AppResult<impl IntoResponse> {
    let (pagination, filter) = params.split();
    let (page, per_page) = pagination.resolve();

    let service = ArticleService::new(db.clone());
    let (articles, total) = service.list_published(&filter, page, per_page).await?;
    let items = with_tags(&db, articles).await?;

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/articles/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Published article", body = ArticleResponse),
        (status = 404, description = "Article not found", body = AppError),
    ),
    tag = "articles"
)]
pub async fn get_article(
    Extension(db): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = ArticleService::new(db.clone());
    let article = service.get_published_by_slug(&slug).await?;
    Ok(ApiResponse::ok(single_with_tags(&db, article).await?))
}

async fn bump(
    db: DatabaseConnection,
    slug: String,
    counter: ArticleCounter,
) -> AppResult<impl IntoResponse> {
    let service = ArticleService::new(db);
    let count = service.increment_counter(&slug, counter).await?;
    Ok(ApiResponse::ok(CounterResponse { count }))
}

#[utoipa::path(
    post,
    path = "/api/v1/articles/{slug}/view",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "View recorded", body = CounterResponse),
        (status = 404, description = "Article not found", body = AppError),
    ),
    tag = "articles"
)]
pub async fn record_view(
    Extension(db): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    bump(db, slug, ArticleCounter::View).await
}

#[utoipa::path(
    post,
    path = "/api/v1/articles/{slug}/like",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Like recorded", body = CounterResponse),
        (status = 404, description = "Article not found", body = AppError),
    ),
    tag = "articles"
)]
pub async fn record_like(
    Extension(db): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    bump(db, slug, ArticleCounter::Like).await
}

#[utoipa::path(
    post,
    path = "/api/v1/articles/{slug}/share",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Share recorded", body = CounterResponse),
        (status = 404, description = "Article not found", body = AppError),
    ),
    tag = "articles"
)]
pub async fn record_share(
    Extension(db): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    bump(db, slug, ArticleCounter::Share).await
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/articles",
    security(("jwt_token" = [])),
    params(ArticleListQuery),
    responses(
        (status = 200, description = "Articles in every status; clients see their own", body = PaginatedResponse<ArticleResponse>),
        (status = 403, description = "Admin or client only", body = AppError),
    ),
    tag = "articles"
)]
pub async fn list_writer_articles(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<ArticleListQuery>,
) -> AppResult<impl IntoResponse> {
    require_role(&auth_user, WRITER_ROLES)?;

    let (pagination, mut filter) = params.split();
    if !auth_user.is_admin() {
        filter.author_id = Some(auth_user.user_id);
    }
    let (page, per_page) = pagination.resolve();

    let service = ArticleService::new(db.clone());
    let (articles, total) = service.list_all(&filter, page, per_page).await?;
    let items = with_tags(&db, articles).await?;

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/articles",
    security(("jwt_token" = [])),
    request_body = ArticleRequest,
    responses(
        (status = 200, description = "Article created", body = ArticleResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin or client only", body = AppError),
    ),
    tag = "articles"
)]
pub async fn create_article(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<ArticleRequest>,
) -> AppResult<impl IntoResponse> {
    require_role(&auth_user, WRITER_ROLES)?;
    payload.validate()?;

    let service = ArticleService::new(db.clone());
    let article = service.create(auth_user.user_id, payload.into()).await?;
    Ok(ApiResponse::ok(single_with_tags(&db, article).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/articles/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Article ID")),
    request_body = ArticleRequest,
    responses(
        (status = 200, description = "Article updated", body = ArticleResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Article not found", body = AppError),
    ),
    tag = "articles"
)]
pub async fn update_article(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<ArticleRequest>,
) -> AppResult<impl IntoResponse> {
    require_role(&auth_user, WRITER_ROLES)?;
    payload.validate()?;

    let service = ArticleService::new(db.clone());
    let article = service.update(id, &auth_user, payload.into()).await?;
    Ok(ApiResponse::ok(single_with_tags(&db, article).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/articles/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article deleted", body = String),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Article not found", body = AppError),
    ),
    tag = "articles"
)]
pub async fn delete_article(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_role(&auth_user, WRITER_ROLES)?;

    let service = ArticleService::new(db);
    service.delete(id, &auth_user).await?;
    Ok(ApiResponse::ok("Article deleted successfully"))
}
