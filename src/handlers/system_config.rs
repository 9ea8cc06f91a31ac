use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_admin;
use crate::middleware::AuthUser;
use crate::models::SystemConfigModel;
use crate::response::ApiResponse;
use crate::services::cache::CacheService;
use crate::services::system_config::{ConfigInput, SystemConfigService};
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfigResponse {
    pub key: String,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
    pub category: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub updated_at: String,
}

impl From<SystemConfigModel> for ConfigResponse {
    fn from(c: SystemConfigModel) -> Self {
        Self {
            key: c.key,
            value: c.value,
            category: c.category,
            description: c.description,
            is_public: c.is_public,
            created_by: c.created_by,
            updated_by: c.updated_by,
            updated_at: c.updated_at.to_string(),
        }
    }
}

/// What anonymous clients see of a public setting.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicConfigResponse {
    pub key: String,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
    pub category: String,
}

impl From<SystemConfigModel> for PublicConfigResponse {
    fn from(c: SystemConfigModel) -> Self {
        Self {
            key: c.key,
            value: c.value,
            category: c.category,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateConfigRequest {
    /// Lowercase key such as `site.name` (1-100 characters)
    #[validate(length(min = 1, max = 100))]
    pub key: String,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
    /// Defaults to `general`
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateConfigRequest {
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConfigListQuery {
    /// Only entries in this category
    pub category: Option<String>,
}

fn make_config_service(
    db: DatabaseConnection,
    cache: Option<Extension<CacheService>>,
) -> SystemConfigService {
    SystemConfigService::new(db).with_cache(cache.map(|Extension(c)| c))
}

fn category_or_default(category: Option<String>) -> String {
    category.unwrap_or_else(|| "general".to_string())
}

#[utoipa::path(
    get,
    path = "/api/v1/config/public",
    responses(
        (status = 200, description = "Public settings", body = Vec<PublicConfigResponse>),
    ),
    tag = "config"
)]
pub async fn list_public_config(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
) -> AppResult<impl IntoResponse> {
    let service = make_config_service(db, cache);
    let configs = service.list_public().await?;
    let items: Vec<PublicConfigResponse> = configs.into_iter().map(Into::into).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/config",
    security(("jwt_token" = [])),
    params(ConfigListQuery),
    responses(
        (status = 200, description = "All settings", body = Vec<ConfigResponse>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "config"
)]
pub async fn list_config(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<ConfigListQuery>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let service = SystemConfigService::new(db);
    let configs = service.list_all(params.category.as_deref()).await?;
    let items: Vec<ConfigResponse> = configs.into_iter().map(Into::into).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/config/{key}",
    security(("jwt_token" = [])),
    params(("key" = String, Path, description = "Config key")),
    responses(
        (status = 200, description = "Setting", body = ConfigResponse),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Key not found", body = AppError),
    ),
    tag = "config"
)]
pub async fn get_config(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(key): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let service = SystemConfigService::new(db);
    let config = service.get_by_key(&key).await?;
    Ok(ApiResponse::ok(ConfigResponse::from(config)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/config",
    security(("jwt_token" = [])),
    request_body = CreateConfigRequest,
    responses(
        (status = 200, description = "Setting created", body = ConfigResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 409, description = "Key already exists", body = AppError),
    ),
    tag = "config"
)]
pub async fn create_config(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    auth_user: AuthUser,
    Json(payload): Json<CreateConfigRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    payload.validate()?;

    let input = ConfigInput {
        value: payload.value,
        category: category_or_default(payload.category),
        description: payload.description,
        is_public: payload.is_public,
    };

    let service = make_config_service(db, cache);
    let config = service
        .create(&payload.key, input, auth_user.user_id)
        .await?;
    Ok(ApiResponse::ok(ConfigResponse::from(config)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/config/{key}",
    security(("jwt_token" = [])),
    params(("key" = String, Path, description = "Config key")),
    request_body = UpdateConfigRequest,
    responses(
        (status = 200, description = "Setting updated", body = ConfigResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Key not found", body = AppError),
    ),
    tag = "config"
)]
pub async fn update_config(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    auth_user: AuthUser,
    Path(key): Path<String>,
    Json(payload): Json<UpdateConfigRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;
    payload.validate()?;

    let input = ConfigInput {
        value: payload.value,
        category: category_or_default(payload.category),
        description: payload.description,
        is_public: payload.is_public,
    };

    let service = make_config_service(db, cache);
    let config = service.update(&key, input, auth_user.user_id).await?;
    Ok(ApiResponse::ok(ConfigResponse::from(config)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/config/{key}",
    security(("jwt_token" = [])),
    params(("key" = String, Path, description = "Config key")),
    responses(
        (status = 200, description = "Setting deleted", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Key not found", body = AppError),
    ),
    tag = "config"
)]
pub async fn delete_config(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
    auth_user: AuthUser,
    Path(key): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let service = make_config_service(db, cache);
    service.delete(&key, auth_user.user_id).await?;
    Ok(ApiResponse::ok("Config deleted successfully"))
}
