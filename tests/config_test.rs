mod common;

use reqwest::Method;
use serde_json::{json, Value};

#[tokio::test]
async fn public_listing_hides_private_entries() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    for (key, value, is_public) in [
        ("site.name", json!("TradeConnect"), true),
        ("payments.fee_percent", json!(2.5), false),
    ] {
        let (status, body) = app
            .send_json(
                Method::POST,
                "/admin/config",
                &admin,
                json!({ "key": key, "value": value, "is_public": is_public }),
            )
            .await;
        assert_eq!(status, 200, "{body}");
        assert_eq!(body["data"]["category"], "general");
    }

    let (status, body) = app.get_json("/config/public").await;
    assert_eq!(status, 200);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["key"], "site.name");
    assert_eq!(items[0]["value"], "TradeConnect");

    let resp = app
        .client
        .get(app.url("/admin/config"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn key_rules_and_duplicates() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let (status, _) = app
        .send_json(
            Method::POST,
            "/admin/config",
            &admin,
            json!({ "key": "Site Name", "value": "x" }),
        )
        .await;
    assert_eq!(status, 400);

    let payload = json!({ "key": "site.locale", "value": "en" });
    let (status, _) = app
        .send_json(Method::POST, "/admin/config", &admin, payload.clone())
        .await;
    assert_eq!(status, 200);
    let (status, _) = app
        .send_json(Method::POST, "/admin/config", &admin, payload.clone())
        .await;
    assert_eq!(status, 409);

    // Deleted keys stay reserved.
    let (status, _) = app
        .send_json(Method::DELETE, "/admin/config/site.locale", &admin, json!({}))
        .await;
    assert_eq!(status, 200);
    let (status, _) = app
        .send_json(Method::POST, "/admin/config", &admin, payload)
        .await;
    assert_eq!(status, 409);
}

#[tokio::test]
async fn update_records_editor_and_value() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let (status, _) = app
        .send_json(
            Method::POST,
            "/admin/config",
            &admin,
            json!({ "key": "events.max_booths", "value": 10, "category": "events" }),
        )
        .await;
    assert_eq!(status, 200);

    let (status, body) = app
        .send_json(
            Method::PUT,
            "/admin/config/events.max_booths",
            &admin,
            json!({ "value": { "default": 12, "vip": 4 }, "category": "events", "is_public": true }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["value"]["vip"], 4);
    assert!(body["data"]["updated_by"].is_number());

    let (_, body) = app.get_json("/config/public").await;
    assert_eq!(body["data"][0]["category"], "events");

    let (status, _) = app
        .send_json(
            Method::PUT,
            "/admin/config/missing.key",
            &admin,
            json!({ "value": 1 }),
        )
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn config_admin_only() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "viewer").await;

    let resp = app
        .client
        .get(app.url("/admin/config"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}
