use axum::{extract::Extension, middleware, response::IntoResponse, routing::get, Json, Router};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tradeconnect::{config, handlers, migration, routes, services, utils};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use services::cache::CacheService;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Auth
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_current_user,
        // Articles
        handlers::article::list_articles,
        handlers::article::get_article,
        handlers::article::record_view,
        handlers::article::record_like,
        handlers::article::record_share,
        handlers::article::list_writer_articles,
        handlers::article::create_article,
        handlers::article::update_article,
        handlers::article::delete_article,
        // Categories
        handlers::category::list_categories,
        handlers::category::category_tree,
        handlers::category::get_category,
        handlers::category::create_category,
        handlers::category::update_category,
        handlers::category::delete_category,
        // Tags
        handlers::tag::list_tags,
        handlers::tag::get_articles_by_tag,
        handlers::tag::create_tag,
        handlers::tag::update_tag,
        handlers::tag::delete_tag,
        handlers::tag::recount_tag,
        // Config
        handlers::system_config::list_public_config,
        handlers::system_config::list_config,
        handlers::system_config::get_config,
        handlers::system_config::create_config,
        handlers::system_config::update_config,
        handlers::system_config::delete_config,
        // Pages
        handlers::static_page::list_pages,
        handlers::static_page::get_page,
        handlers::static_page::list_all_pages,
        handlers::static_page::create_page,
        handlers::static_page::update_page,
        handlers::static_page::delete_page,
        // Terms and policies
        handlers::legal::get_active_terms,
        handlers::legal::get_active_policy,
        handlers::legal::list_terms,
        handlers::legal::create_terms,
        handlers::legal::activate_terms,
        handlers::legal::delete_terms,
        handlers::legal::list_policies,
        handlers::legal::create_policy,
        handlers::legal::activate_policy,
        handlers::legal::delete_policy,
    ),
    components(
        schemas(
            tradeconnect::response::ApiResponse<serde_json::Value>,
            tradeconnect::response::PaginatedResponse<serde_json::Value>,
            tradeconnect::response::PaginationQuery,
            tradeconnect::error::AppError,
            handlers::auth::RegisterRequest,
            handlers::auth::LoginRequest,
            handlers::auth::AuthResponse,
            handlers::auth::UserResponse,
            handlers::article::ArticleResponse,
            handlers::article::ArticleRequest,
            handlers::article::CounterResponse,
            handlers::category::CategoryResponse,
            handlers::category::CategoryTreeNode,
            handlers::category::CategoryDetailResponse,
            handlers::category::CategoryRequest,
            handlers::tag::TagResponse,
            handlers::tag::TagRequest,
            handlers::tag::RecountResponse,
            handlers::system_config::ConfigResponse,
            handlers::system_config::PublicConfigResponse,
            handlers::system_config::CreateConfigRequest,
            handlers::system_config::UpdateConfigRequest,
            handlers::static_page::PageResponse,
            handlers::static_page::PageSummary,
            handlers::static_page::PageRequest,
            handlers::legal::LegalDocumentResponse,
            handlers::legal::LegalDocumentRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication operations"),
        (name = "articles", description = "Article publishing and engagement"),
        (name = "categories", description = "Article category hierarchy"),
        (name = "tags", description = "Article tags"),
        (name = "config", description = "System configuration"),
        (name = "pages", description = "Static pages"),
        (name = "legal", description = "Versioned terms and policies"),
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tradeconnect=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let jwt_config = validate_config()?;
    utils::jwt::init_jwt_config(jwt_config)?;

    tracing::info!(
        "Starting TradeConnect content API v{}...",
        env!("CARGO_PKG_VERSION")
    );

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    services::bootstrap_admin::ensure_bootstrap_admin(&db).await?;

    // Redis is optional; without it every read goes to Postgres.
    let cache = match CacheService::connect().await {
        Ok(cache) => {
            tracing::info!("Redis connected successfully");
            Some(cache)
        }
        Err(e) => {
            tracing::warn!("Redis unavailable, running without cache: {}", e);
            None
        }
    };

    let mut app = create_app().layer(Extension(db));
    if let Some(cache) = cache {
        app = app.layer(Extension(cache));
    }

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Fail fast on missing or weak configuration.
fn validate_config() -> anyhow::Result<config::jwt::JwtConfig> {
    let jwt_config = config::jwt::JwtConfig::from_env()?;

    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    Ok(jwt_config)
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app() -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(
            tradeconnect::middleware::security::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "TradeConnect content API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
