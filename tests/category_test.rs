mod common;

use reqwest::Method;
use serde_json::json;

#[tokio::test]
async fn tree_nests_and_orders_siblings() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let trade = common::create_category(&app, &admin, "Trade Shows", None, 0).await;
    let trade_id = trade["id"].as_i64().unwrap() as i32;
    common::create_category(&app, &admin, "Europe", Some(trade_id), 2).await;
    let asia = common::create_category(&app, &admin, "Asia", Some(trade_id), 1).await;
    let asia_id = asia["id"].as_i64().unwrap() as i32;
    common::create_category(&app, &admin, "Japan", Some(asia_id), 0).await;
    common::create_category(&app, &admin, "Guides", None, 1).await;

    let (status, body) = app.get_json("/categories/tree").await;
    assert_eq!(status, 200);
    let roots = body["data"].as_array().unwrap();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0]["slug"], "trade-shows");
    assert_eq!(roots[1]["slug"], "guides");

    let children = roots[0]["subcategories"].as_array().unwrap();
    assert_eq!(children[0]["name"], "Asia");
    assert_eq!(children[1]["name"], "Europe");
    assert_eq!(children[0]["subcategories"][0]["name"], "Japan");
}

#[tokio::test]
async fn duplicate_names_get_suffixed_slugs() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let first = common::create_category(&app, &admin, "Logistics", None, 0).await;
    let second = common::create_category(&app, &admin, "Logistics", None, 0).await;
    assert_eq!(first["slug"], "logistics");
    assert_eq!(second["slug"], "logistics-1");
}

#[tokio::test]
async fn parent_validation() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let (status, body) = app
        .send_json(
            Method::POST,
            "/admin/categories",
            &admin,
            json!({ "name": "Orphan", "parent_id": 9999 }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Parent category does not exist");

    let cat = common::create_category(&app, &admin, "Self", None, 0).await;
    let id = cat["id"].as_i64().unwrap();
    let (status, body) = app
        .send_json(
            Method::PUT,
            &format!("/admin/categories/{id}"),
            &admin,
            json!({ "name": "Self", "parent_id": id }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Category cannot be its own parent");

    let (status, hidden) = app
        .send_json(
            Method::POST,
            "/admin/categories",
            &admin,
            json!({ "name": "Hidden", "is_active": false }),
        )
        .await;
    assert_eq!(status, 200);
    let (status, body) = app
        .send_json(
            Method::POST,
            "/admin/categories",
            &admin,
            json!({ "name": "Under Hidden", "parent_id": hidden["data"]["id"] }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Parent category does not exist");
}

#[tokio::test]
async fn renaming_regenerates_the_slug() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;
    let cat = common::create_category(&app, &admin, "Exhibitions", None, 0).await;
    let id = cat["id"].as_i64().unwrap();

    let (status, body) = app
        .send_json(
            Method::PUT,
            &format!("/admin/categories/{id}"),
            &admin,
            json!({ "name": "Trade Exhibitions" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["slug"], "trade-exhibitions");
}

#[tokio::test]
async fn detail_lists_children_and_delete_rules() {
    let app = common::spawn_app().await;
    let admin = common::create_admin(&app).await;

    let parent = common::create_category(&app, &admin, "Markets", None, 0).await;
    let parent_id = parent["id"].as_i64().unwrap() as i32;
    let child = common::create_category(&app, &admin, "Retail", Some(parent_id), 0).await;

    let (status, body) = app.get_json("/categories/markets").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["subcategories"][0]["slug"], "retail");

    let (status, _) = app
        .send_json(
            Method::DELETE,
            &format!("/admin/categories/{parent_id}"),
            &admin,
            json!({}),
        )
        .await;
    assert_eq!(status, 409);

    let child_id = child["id"].as_i64().unwrap();
    let (status, _) = app
        .send_json(
            Method::DELETE,
            &format!("/admin/categories/{child_id}"),
            &admin,
            json!({}),
        )
        .await;
    assert_eq!(status, 200);

    let (status, _) = app.get_json("/categories/retail").await;
    assert_eq!(status, 404);

    // The retired row still holds its slug.
    let again = common::create_category(&app, &admin, "Retail", None, 0).await;
    assert_eq!(again["slug"], "retail-1");
}

#[tokio::test]
async fn non_admin_cannot_write() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "plain").await;

    let (status, _) = app
        .send_json(
            Method::POST,
            "/admin/categories",
            &token,
            json!({ "name": "Nope" }),
        )
        .await;
    assert_eq!(status, 403);
}
