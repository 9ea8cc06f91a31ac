use crate::config::rate_limit::{RateLimitConfig, RouteGroup};
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let auth = auth_routes(&rate_limit_config);
    let public_read = public_read_routes(&rate_limit_config);
    let counters = counter_routes(&rate_limit_config);
    let protected =
        protected_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));

    auth.merge(public_read).merge(counters).merge(protected)
}

fn auth_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/register", routing::post(handlers::register))
        .route("/auth/login", routing::post(handlers::login));

    with_optional_rate_limit(router, config, RouteGroup::Auth)
}

/// Anonymous reads. Only published or active content is served here.
fn public_read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Articles
        .route("/articles", routing::get(handlers::article::list_articles))
        .route(
            "/articles/{slug}",
            routing::get(handlers::article::get_article),
        )
        // Categories
        .route(
            "/categories",
            routing::get(handlers::category::list_categories),
        )
        .route(
            "/categories/tree",
            routing::get(handlers::category::category_tree),
        )
        .route(
            "/categories/{slug}",
            routing::get(handlers::category::get_category),
        )
        // Tags
        .route("/tags", routing::get(handlers::tag::list_tags))
        .route(
            "/tags/{slug}/articles",
            routing::get(handlers::tag::get_articles_by_tag),
        )
        // Config
        .route(
            "/config/public",
            routing::get(handlers::system_config::list_public_config),
        )
        // Pages
        .route("/pages", routing::get(handlers::static_page::list_pages))
        .route(
            "/pages/{slug}",
            routing::get(handlers::static_page::get_page),
        )
        // Terms and policies
        .route(
            "/terms/{type}/active",
            routing::get(handlers::legal::get_active_terms),
        )
        .route(
            "/policies/{type}/active",
            routing::get(handlers::legal::get_active_policy),
        );

    with_optional_rate_limit(router, config, RouteGroup::Public)
}

/// Engagement counters are anonymous writes and get a tighter limit.
fn counter_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route(
            "/articles/{slug}/view",
            routing::post(handlers::article::record_view),
        )
        .route(
            "/articles/{slug}/like",
            routing::post(handlers::article::record_like),
        )
        .route(
            "/articles/{slug}/share",
            routing::post(handlers::article::record_share),
        );

    with_optional_rate_limit(router, config, RouteGroup::Counters)
}

/// Authenticated routes. Role checks happen in the handlers.
fn protected_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/me", routing::get(handlers::get_current_user))
        // Articles (admin or client)
        .route(
            "/admin/articles",
            routing::get(handlers::article::list_writer_articles)
                .post(handlers::article::create_article),
        )
        .route(
            "/admin/articles/{id}",
            routing::put(handlers::article::update_article)
                .delete(handlers::article::delete_article),
        )
        // Categories
        .route(
            "/admin/categories",
            routing::post(handlers::category::create_category),
        )
        .route(
            "/admin/categories/{id}",
            routing::put(handlers::category::update_category)
                .delete(handlers::category::delete_category),
        )
        // Tags
        .route("/admin/tags", routing::post(handlers::tag::create_tag))
        .route(
            "/admin/tags/{id}",
            routing::put(handlers::tag::update_tag).delete(handlers::tag::delete_tag),
        )
        .route(
            "/admin/tags/{id}/recount",
            routing::post(handlers::tag::recount_tag),
        )
        // Config
        .route(
            "/admin/config",
            routing::get(handlers::system_config::list_config)
                .post(handlers::system_config::create_config),
        )
        .route(
            "/admin/config/{key}",
            routing::get(handlers::system_config::get_config)
                .put(handlers::system_config::update_config)
                .delete(handlers::system_config::delete_config),
        )
        // Pages
        .route(
            "/admin/pages",
            routing::get(handlers::static_page::list_all_pages)
                .post(handlers::static_page::create_page),
        )
        .route(
            "/admin/pages/{id}",
            routing::put(handlers::static_page::update_page)
                .delete(handlers::static_page::delete_page),
        )
        // Terms
        .route(
            "/admin/terms",
            routing::get(handlers::legal::list_terms).post(handlers::legal::create_terms),
        )
        .route(
            "/admin/terms/{id}",
            routing::delete(handlers::legal::delete_terms),
        )
        .route(
            "/admin/terms/{id}/activate",
            routing::put(handlers::legal::activate_terms),
        )
        // Policies
        .route(
            "/admin/policies",
            routing::get(handlers::legal::list_policies).post(handlers::legal::create_policy),
        )
        .route(
            "/admin/policies/{id}",
            routing::delete(handlers::legal::delete_policy),
        )
        .route(
            "/admin/policies/{id}/activate",
            routing::put(handlers::legal::activate_policy),
        );

    with_optional_rate_limit(router, config, RouteGroup::Write)
}

fn with_optional_rate_limit(router: Router, config: &RateLimitConfig, group: RouteGroup) -> Router {
    if !config.enabled {
        return router;
    }

    let rule = config.rule(group);
    let Some(governor_conf) = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
    else {
        tracing::warn!(?group, ?rule, "Invalid rate limit rule, leaving group unlimited");
        return router;
    };

    router.layer(GovernorLayer::new(governor_conf))
}
