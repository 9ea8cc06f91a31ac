#![allow(dead_code)]

use reqwest::Client;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Once,
};
use tokio::sync::Mutex;

static INIT: Once = Once::new();
static MIGRATIONS_RAN: AtomicBool = AtomicBool::new(false);
static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Every test truncates the shared database, so tests in one binary run one at a time.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        std::env::set_var("BCRYPT_COST", "4");
        let config = tradeconnect::config::jwt::JwtConfig::from_env().unwrap();
        let _ = tradeconnect::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
    _guard: tokio::sync::MutexGuard<'static, ()>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }

    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    pub async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        body: Value,
    ) -> (u16, Value) {
        let resp = self
            .client
            .request(method, self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }
}

pub async fn spawn_app() -> TestApp {
    let guard = DB_LOCK.lock().await;
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    if !MIGRATIONS_RAN.swap(true, Ordering::SeqCst) {
        tradeconnect::migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    cleanup_tables(&db).await;

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(tradeconnect::routes::create_routes())
        .layer(axum::middleware::from_fn(
            tradeconnect::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
        _guard: guard,
    }
}

async fn cleanup_tables(db: &DatabaseConnection) {
    let tables = [
        "article_tags",
        "tags",
        "articles",
        "article_categories",
        "system_configs",
        "static_pages",
        "legal_documents",
        "users",
    ];

    for table in tables {
        let sql = format!("TRUNCATE TABLE {} RESTART IDENTITY CASCADE", table);
        let _ = db
            .execute(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql,
            ))
            .await;
    }
}

/// Register a user and return (user_id, token).
pub async fn create_test_user(app: &TestApp, username_prefix: &str) -> (i32, String) {
    let counter = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
    let username = format!("{}_{}", username_prefix, counter);

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@test.com", username),
            "password": "test_password_123"
        }))
        .send()
        .await
        .expect("Failed to register user");

    let status = resp.status();
    let body: Value = resp.json().await.expect("Failed to parse register response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to register '{}': status={}, body={}", username, status, body);
    }

    let user_id = body["data"]["user_id"]
        .as_i64()
        .expect("Response missing user_id") as i32;
    let token = body["data"]["token"]
        .as_str()
        .expect("Response missing token")
        .to_string();
    (user_id, token)
}

/// Role changes apply on the next request; the middleware reloads the user.
pub async fn set_role(db: &DatabaseConnection, user_id: i32, role: &str) {
    db.execute(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "UPDATE users SET role = $1 WHERE id = $2",
        vec![role.into(), user_id.into()],
    ))
    .await
    .expect("Failed to change user role");
}

/// Register a user, promote them to admin and return their token.
pub async fn create_admin(app: &TestApp) -> String {
    let (user_id, token) = create_test_user(app, "admin").await;
    set_role(&app.db, user_id, "admin").await;
    token
}

pub async fn create_tag(app: &TestApp, admin_token: &str, name: &str) -> i32 {
    let (status, body) = app
        .send_json(
            reqwest::Method::POST,
            "/admin/tags",
            admin_token,
            serde_json::json!({ "name": name }),
        )
        .await;
    assert_eq!(status, 200, "create tag failed: {body}");
    body["data"]["id"].as_i64().expect("tag id") as i32
}

pub async fn create_category(
    app: &TestApp,
    admin_token: &str,
    name: &str,
    parent_id: Option<i32>,
    sort_order: i32,
) -> Value {
    let (status, body) = app
        .send_json(
            reqwest::Method::POST,
            "/admin/categories",
            admin_token,
            serde_json::json!({
                "name": name,
                "parent_id": parent_id,
                "sort_order": sort_order
            }),
        )
        .await;
    assert_eq!(status, 200, "create category failed: {body}");
    body["data"].clone()
}

/// Force a tag's counter out of sync to exercise recounting.
pub async fn set_usage_count(db: &DatabaseConnection, tag_id: i32, value: i32) {
    db.execute(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "UPDATE tags SET usage_count = $1 WHERE id = $2",
        vec![value.into(), tag_id.into()],
    ))
    .await
    .expect("Failed to set usage count");
}
