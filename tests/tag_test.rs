mod common;

use reqwest::Method;
use serde_json::json;

#[tokio::test]
async fn create_and_list_tags() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let (status, body) = app
        .send_json(
            Method::POST,
            "/admin/tags",
            &admin,
            json!({ "name": "Supply Chain", "color": "#1e90ff" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["slug"], "supply-chain");
    assert_eq!(body["data"]["usage_count"], 0);

    let (status, _) = app
        .send_json(
            Method::POST,
            "/admin/tags",
            &admin,
            json!({ "name": "Supply Chain" }),
        )
        .await;
    assert_eq!(status, 409);

    let (status, _) = app
        .send_json(
            Method::POST,
            "/admin/tags",
            &admin,
            json!({ "name": "Colorful", "color": "blue" }),
        )
        .await;
    assert_eq!(status, 400);

    let (status, body) = app.get_json("/tags").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn renaming_regenerates_the_slug() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;
    let id = common::create_tag(&app, &admin, "Seasonal").await;

    let (status, body) = app
        .send_json(
            Method::PUT,
            &format!("/admin/tags/{id}"),
            &admin,
            json!({ "name": "Holiday Season" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["slug"], "holiday-season");

    let (status, _) = app.get_json("/tags/seasonal/articles").await;
    assert_eq!(status, 404);
    let (status, _) = app.get_json("/tags/holiday-season/articles").await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn inactive_and_deleted_tags_are_hidden() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;
    let id = common::create_tag(&app, &admin, "Seasonal").await;
    let other = common::create_tag(&app, &admin, "Evergreen").await;

    let (status, _) = app
        .send_json(
            Method::PUT,
            &format!("/admin/tags/{id}"),
            &admin,
            json!({ "name": "Seasonal", "is_active": false }),
        )
        .await;
    assert_eq!(status, 200);

    let (status, _) = app
        .send_json(Method::DELETE, &format!("/admin/tags/{other}"), &admin, json!({}))
        .await;
    assert_eq!(status, 200);

    let (_, body) = app.get_json("/tags").await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = app.get_json("/tags/evergreen/articles").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn articles_by_tag_and_recount() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;
    let tag_id = common::create_tag(&app, &admin, "Export").await;

    for (title, status) in [("Published One", "published"), ("Draft One", "draft")] {
        let (code, body) = app
            .send_json(
                Method::POST,
                "/admin/articles",
                &admin,
                json!({ "title": title, "content": "x", "status": status, "tag_ids": [tag_id] }),
            )
            .await;
        assert_eq!(code, 200, "{body}");
    }

    let (status, body) = app.get_json("/tags/export/articles").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "published-one");

    common::set_usage_count(&app.db, tag_id, 40).await;
    let (status, body) = app
        .send_json(
            Method::POST,
            &format!("/admin/tags/{tag_id}/recount"),
            &admin,
            json!({}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["usage_count"], 2);
}

#[tokio::test]
async fn recount_unknown_tag_is_not_found() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let (status, _) = app
        .send_json(Method::POST, "/admin/tags/999/recount", &admin, json!({}))
        .await;
    assert_eq!(status, 404);
}
