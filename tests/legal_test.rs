mod common;

use reqwest::Method;
use serde_json::{json, Value};

async fn create_terms(
    app: &common::TestApp,
    token: &str,
    version: &str,
    is_active: bool,
) -> (u16, Value) {
    app.send_json(
        Method::POST,
        "/admin/terms",
        token,
        json!({
            "type": "general",
            "version": version,
            "title": format!("Terms v{version}"),
            "content": "You agree to **everything**.",
            "effective_date": "2026-01-01",
            "is_active": is_active
        }),
    )
    .await
}

#[tokio::test]
async fn one_active_version_per_type() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let (status, first) = create_terms(&app, &admin, "1.0", true).await;
    assert_eq!(status, 200);
    let (status, second) = create_terms(&app, &admin, "2.0", true).await;
    assert_eq!(status, 200);
    assert_eq!(second["data"]["type"], "general");

    let (status, body) = app.get_json("/terms/general/active").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["version"], "2.0");

    let first_id = first["data"]["id"].as_i64().unwrap();
    let (status, body) = app
        .send_json(
            Method::PUT,
            &format!("/admin/terms/{first_id}/activate"),
            &admin,
            json!({}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["is_active"], true);

    let (_, body) = app.get_json("/terms/general/active").await;
    assert_eq!(body["data"]["version"], "1.0");

    let resp = app
        .client
        .get(app.url("/admin/terms?type=general"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let active: Vec<&Value> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|d| d["is_active"] == true)
        .collect();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn inactive_creation_leaves_current_version() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    create_terms(&app, &admin, "1.0", true).await;
    let (status, _) = create_terms(&app, &admin, "1.1", false).await;
    assert_eq!(status, 200);

    let (_, body) = app.get_json("/terms/general/active").await;
    assert_eq!(body["data"]["version"], "1.0");
}

#[tokio::test]
async fn version_rules() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let (status, _) = create_terms(&app, &admin, "1.0", false).await;
    assert_eq!(status, 200);
    let (status, _) = create_terms(&app, &admin, "1.0", false).await;
    assert_eq!(status, 409);
    let (status, _) = create_terms(&app, &admin, "v2", false).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn policies_are_separate_from_terms() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let (status, _) = app
        .send_json(
            Method::POST,
            "/admin/policies",
            &admin,
            json!({
                "type": "general",
                "version": "1.0",
                "title": "Wrong kind",
                "content": "x",
                "effective_date": "2026-01-01"
            }),
        )
        .await;
    assert_eq!(status, 400);

    let (status, body) = app
        .send_json(
            Method::POST,
            "/admin/policies",
            &admin,
            json!({
                "type": "cookies",
                "version": "1.0",
                "title": "Cookie Policy",
                "content": "We use cookies.",
                "effective_date": "2026-02-01",
                "is_active": true
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["kind"], "policy");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app.get_json("/policies/cookies/active").await;
    assert_eq!(status, 200);
    assert!(body["data"]["content_html"]
        .as_str()
        .unwrap()
        .contains("cookies"));

    // A policy id is not reachable through the terms routes.
    let (status, _) = app
        .send_json(
            Method::PUT,
            &format!("/admin/terms/{id}/activate"),
            &admin,
            json!({}),
        )
        .await;
    assert_eq!(status, 404);

    let (status, _) = app
        .send_json(Method::DELETE, &format!("/admin/policies/{id}"), &admin, json!({}))
        .await;
    assert_eq!(status, 200);
    let (status, _) = app.get_json("/policies/cookies/active").await;
    assert_eq!(status, 404);
}
