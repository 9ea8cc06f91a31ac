mod common;

use reqwest::Method;
use serde_json::{json, Value};

async fn create_article(app: &common::TestApp, token: &str, body: Value) -> Value {
    let (status, body) = app
        .send_json(Method::POST, "/admin/articles", token, body)
        .await;
    assert_eq!(status, 200, "create article failed: {body}");
    body["data"].clone()
}

#[tokio::test]
async fn drafts_stay_private_until_published() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let draft = create_article(
        &app,
        &admin,
        json!({ "title": "Canton Fair Guide", "content": "# Booth tips\n\nArrive early." }),
    )
    .await;
    assert_eq!(draft["status"], "draft");
    assert_eq!(draft["slug"], "canton-fair-guide");
    assert!(draft["published_at"].is_null());
    assert_eq!(draft["excerpt"], "Booth tips Arrive early.");

    let (status, _) = app.get_json("/articles/canton-fair-guide").await;
    assert_eq!(status, 404);
    let (_, body) = app.get_json("/articles").await;
    assert_eq!(body["data"]["total"], 0);

    let id = draft["id"].as_i64().unwrap();
    let (status, published) = app
        .send_json(
            Method::PUT,
            &format!("/admin/articles/{id}"),
            &admin,
            json!({
                "title": "Canton Fair Guide",
                "content": "# Booth tips\n\nArrive early.",
                "status": "published"
            }),
        )
        .await;
    assert_eq!(status, 200);
    let stamped = published["data"]["published_at"].clone();
    assert!(stamped.is_string());

    let (status, body) = app.get_json("/articles/canton-fair-guide").await;
    assert_eq!(status, 200);
    assert!(body["data"]["content_html"]
        .as_str()
        .unwrap()
        .contains("<h1>Booth tips</h1>"));

    // Archiving and republishing keeps the first publish time.
    for status_name in ["archived", "published"] {
        let (status, body) = app
            .send_json(
                Method::PUT,
                &format!("/admin/articles/{id}"),
                &admin,
                json!({
                    "title": "Canton Fair Guide",
                    "content": "Updated",
                    "status": status_name
                }),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["published_at"], stamped);
    }
}

#[tokio::test]
async fn repeated_titles_get_numbered_slugs() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let payload = json!({ "title": "Market Update", "content": "body" });
    let first = create_article(&app, &admin, payload.clone()).await;
    let second = create_article(&app, &admin, payload.clone()).await;
    let third = create_article(&app, &admin, payload).await;

    assert_eq!(first["slug"], "market-update");
    assert_eq!(second["slug"], "market-update-1");
    assert_eq!(third["slug"], "market-update-2");
}

#[tokio::test]
async fn retitling_regenerates_the_slug() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let first = create_article(
        &app,
        &admin,
        json!({ "title": "Market Update", "content": "body", "status": "published" }),
    )
    .await;
    let second = create_article(
        &app,
        &admin,
        json!({ "title": "Trade Brief", "content": "body", "status": "published" }),
    )
    .await;

    let rename = json!({ "title": "Market Outlook", "content": "body" });
    let (status, body) = app
        .send_json(
            Method::PUT,
            &format!("/admin/articles/{}", first["id"]),
            &admin,
            rename.clone(),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["slug"], "market-outlook");

    let (status, _) = app.get_json("/articles/market-update").await;
    assert_eq!(status, 404);
    let (status, _) = app.get_json("/articles/market-outlook").await;
    assert_eq!(status, 200);

    let (status, body) = app
        .send_json(
            Method::PUT,
            &format!("/admin/articles/{}", second["id"]),
            &admin,
            rename,
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["slug"], "market-outlook-1");
    let (status, _) = app.get_json("/articles/trade-brief").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn deleted_articles_keep_their_slug() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let payload = json!({ "title": "Gala Night", "content": "body" });
    let first = create_article(&app, &admin, payload.clone()).await;
    let (status, _) = app
        .send_json(
            Method::DELETE,
            &format!("/admin/articles/{}", first["id"]),
            &admin,
            json!({}),
        )
        .await;
    assert_eq!(status, 200);

    let again = create_article(&app, &admin, payload).await;
    assert_eq!(again["slug"], "gala-night-1");
}

#[tokio::test]
async fn counters_only_count_published_articles() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    create_article(
        &app,
        &admin,
        json!({ "title": "Live", "content": "body", "status": "published" }),
    )
    .await;
    create_article(&app, &admin, json!({ "title": "Hidden", "content": "body" })).await;

    let (status, body) = app.send_json(Method::POST, "/articles/live/view", "", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["count"], 1);
    let (_, body) = app.send_json(Method::POST, "/articles/live/view", "", json!({})).await;
    assert_eq!(body["data"]["count"], 2);
    let (_, body) = app.send_json(Method::POST, "/articles/live/like", "", json!({})).await;
    assert_eq!(body["data"]["count"], 1);
    let (_, body) = app.send_json(Method::POST, "/articles/live/share", "", json!({})).await;
    assert_eq!(body["data"]["count"], 1);

    let (status, _) = app
        .send_json(Method::POST, "/articles/hidden/view", "", json!({}))
        .await;
    assert_eq!(status, 404);

    let (_, body) = app.get_json("/articles/live").await;
    assert_eq!(body["data"]["view_count"], 2);
    assert_eq!(body["data"]["like_count"], 1);
}

#[tokio::test]
async fn clients_edit_only_their_own_articles() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;
    let (alice_id, alice) = common::create_test_user(&app, "alice").await;
    let (bob_id, bob) = common::create_test_user(&app, "bob").await;
    common::set_role(&app.db, alice_id, "client").await;
    common::set_role(&app.db, bob_id, "client").await;

    let article = create_article(&app, &alice, json!({ "title": "Alice Notes", "content": "x" })).await;
    create_article(&app, &bob, json!({ "title": "Bob Notes", "content": "x" })).await;
    let id = article["id"].as_i64().unwrap();
    let path = format!("/admin/articles/{id}");

    let (status, _) = app
        .send_json(Method::PUT, &path, &bob, json!({ "title": "Taken", "content": "x" }))
        .await;
    assert_eq!(status, 403);
    let (status, _) = app.send_json(Method::DELETE, &path, &bob, json!({})).await;
    assert_eq!(status, 403);

    let resp = app
        .client
        .get(app.url("/admin/articles"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "alice-notes");

    let resp = app
        .client
        .get(app.url("/admin/articles"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 2);

    let (status, _) = app
        .send_json(Method::PUT, &path, &admin, json!({ "title": "Alice Notes", "content": "edited" }))
        .await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn plain_users_cannot_write_articles() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "reader").await;

    let (status, _) = app
        .send_json(
            Method::POST,
            "/admin/articles",
            &token,
            json!({ "title": "Nope", "content": "x" }),
        )
        .await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn invalid_status_and_category_rejected() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let (status, _) = app
        .send_json(
            Method::POST,
            "/admin/articles",
            &admin,
            json!({ "title": "Bad", "content": "x", "status": "deleted" }),
        )
        .await;
    assert_eq!(status, 400);

    let (status, body) = app
        .send_json(
            Method::POST,
            "/admin/articles",
            &admin,
            json!({ "title": "Bad", "content": "x", "category_id": 4242 }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Category does not exist");
}

#[tokio::test]
async fn tagging_tracks_usage_and_filters() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;
    let rust = common::create_tag(&app, &admin, "Rust").await;
    let trade = common::create_tag(&app, &admin, "Trade").await;
    let category = common::create_category(&app, &admin, "Insights", None, 0).await;

    let article = create_article(
        &app,
        &admin,
        json!({
            "title": "Tagged",
            "content": "x",
            "status": "published",
            "category_id": category["id"],
            "tag_ids": [trade, rust]
        }),
    )
    .await;
    assert_eq!(article["tags"].as_array().unwrap().len(), 2);
    let (_, body) = app.get_json("/articles?tag=trade").await;
    let tags = &body["data"]["items"][0]["tags"];
    assert_eq!(tags[0]["name"], "Rust");
    assert_eq!(tags[1]["name"], "Trade");

    let (_, body) = app.get_json("/articles?tag=rust").await;
    assert_eq!(body["data"]["total"], 1);
    let (_, body) = app.get_json("/articles?category=insights").await;
    assert_eq!(body["data"]["total"], 1);
    let (_, body) = app.get_json("/articles?category=missing").await;
    assert_eq!(body["data"]["total"], 0);

    let id = article["id"].as_i64().unwrap();
    let (status, _) = app
        .send_json(
            Method::PUT,
            &format!("/admin/articles/{id}"),
            &admin,
            json!({ "title": "Tagged", "content": "x", "tag_ids": [trade] }),
        )
        .await;
    assert_eq!(status, 200);

    let (_, body) = app.get_json("/tags").await;
    let usage = |slug: &str| {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["slug"] == slug)
            .unwrap()["usage_count"]
            .as_i64()
            .unwrap()
    };
    assert_eq!(usage("rust"), 0);
    assert_eq!(usage("trade"), 1);

    let (status, _) = app
        .send_json(Method::DELETE, &format!("/admin/articles/{id}"), &admin, json!({}))
        .await;
    assert_eq!(status, 200);
    let (_, body) = app.get_json("/tags").await;
    assert_eq!(body["data"][0]["usage_count"], 0);

    let (status, _) = app.get_json("/articles/tagged").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn unknown_tag_ids_rejected() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let (status, _) = app
        .send_json(
            Method::POST,
            "/admin/articles",
            &admin,
            json!({ "title": "Bad tags", "content": "x", "tag_ids": [777] }),
        )
        .await;
    assert_eq!(status, 400);
}
