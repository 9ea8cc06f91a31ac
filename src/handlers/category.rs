use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_admin;
use crate::middleware::AuthUser;
use crate::models::CategoryModel;
use crate::response::ApiResponse;
use crate::services::cache::CacheService;
use crate::services::category::{CategoryInput, CategoryNode, CategoryService};
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    /// Position among siblings, ascending
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(c: CategoryModel) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            parent_id: c.parent_id,
            sort_order: c.sort_order,
            is_active: c.is_active,
            created_at: c.created_at.to_string(),
            updated_at: c.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryTreeNode {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub subcategories: Vec<CategoryTreeNode>,
}

impl utoipa::ToSchema for CategoryTreeNode {
    fn name() -> std::borrow::Cow<'static, str> {
        "CategoryTreeNode".into()
    }
}

impl utoipa::PartialSchema for CategoryTreeNode {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        use utoipa::openapi::schema::{ArrayBuilder, ObjectBuilder, Schema, Type};
        utoipa::openapi::RefOr::T(Schema::Object(
            ObjectBuilder::new()
                .schema_type(Type::Object)
                .property("id", i32::schema())
                .property("name", String::schema())
                .property("slug", String::schema())
                .property("description", Option::<String>::schema())
                .property("sort_order", i32::schema())
                .property(
                    "subcategories",
                    ArrayBuilder::new()
                        .items(utoipa::openapi::Ref::from_schema_name("CategoryTreeNode"))
                        .build(),
                )
                .required("id")
                .required("name")
                .required("slug")
                .required("sort_order")
                .required("subcategories")
                .build(),
        ))
    }
}

impl From<CategoryNode> for CategoryTreeNode {
    fn from(node: CategoryNode) -> Self {
        let c = node.category;
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            sort_order: c.sort_order,
            subcategories: node
                .subcategories
                .into_iter()
                .map(CategoryTreeNode::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryDetailResponse {
    pub category: CategoryResponse,
    /// Direct active children, in sibling order
    pub subcategories: Vec<CategoryResponse>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryRequest {
    /// Category name (1-100 characters)
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    /// Defaults to 0
    pub sort_order: Option<i32>,
    /// Defaults to true
    pub is_active: Option<bool>,
}

impl From<CategoryRequest> for CategoryInput {
    fn from(req: CategoryRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            parent_id: req.parent_id,
            sort_order: req.sort_order.unwrap_or(0),
            is_active: req.is_active.unwrap_or(true),
        }
    }
}

fn make_category_service(
    db: DatabaseConnection,
    cache: Option<Extension<CacheService>>,
) -> CategoryService {
    CategoryService::new(db).with_cache(cache.map(|Extension(c)| c))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Active categories in sibling order", body = Vec<CategoryResponse>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let service = CategoryService::new(db);
    let categories = service.list().await?;
    let items: Vec<CategoryResponse> = categories.into_iter().map(Into::into).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/tree",
    responses(
        (status = 200, description = "Nested category tree", body = Vec<CategoryTreeNode>),
    ),
    tag = "categories"
)]
pub async fn category_tree(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
) -> AppResult<impl IntoResponse> {
    let service = make_category_service(db, cache);
    let tree = service.tree().await?;
    let nodes: Vec<CategoryTreeNode> = tree.into_iter().map(CategoryTreeNode::from).collect();
    Ok(ApiResponse::ok(nodes))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category with its direct children", body = CategoryDetailResponse),
        (status = 404, description = "Category not found", body = AppError),
    ),
    tag = "categories"
)]
pub async fn get_category(
    Extension(db): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = CategoryService::new(db);
    let (category, children) = service.get_with_children(&slug).await?;
    Ok(ApiResponse::ok(CategoryDetailResponse {
        category: category.into(),
        subcategories: children.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/categories",
    security(("jwt_token" = [])),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "categories"
)]
pub async fn create_category(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    auth_user: AuthUser,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    payload.validate()?;

    let service = make_category_service(db, cache);
    let category = service.create(payload.into()).await?;
    Ok(ApiResponse::ok(CategoryResponse::from(category)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/categories/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Category not found", body = AppError),
    ),
    tag = "categories"
)]
pub async fn update_category(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    payload.validate()?;

    let service = make_category_service(db, cache);
    let category = service.update(id, payload.into()).await?;
    Ok(ApiResponse::ok(CategoryResponse::from(category)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/categories/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 409, description = "Category still has subcategories", body = AppError),
    ),
    tag = "categories"
)]
pub async fn delete_category(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let service = make_category_service(db, cache);
    service.delete(id).await?;
    Ok(ApiResponse::ok("Category deleted successfully"))
}
