mod common;

use axum::http::{Method, StatusCode, header};
use serde_json::{Value, json};

use common::{TestApp, spawn_app};

async fn create_product(app: &TestApp, token: &str, body: Value) -> Value {
    let response = app
        .send(Method::POST, "/products/create", Some(token), Some(body))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.body
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = spawn_app().await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert!(response.body["version"].is_string());
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_metrics_requires_admin() {
    let app = spawn_app().await;
    let user = app.verified_user("alice", "a@x.com", "pw").await;
    let admin = app.admin("root", "root@x.com", "pw").await;

    let anonymous = app.get("/metrics", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.headers[header::WWW_AUTHENTICATE], "Bearer");

    assert_eq!(
        app.get("/metrics", Some(&user)).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(app.get("/metrics", Some(&admin)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_product_crud_as_admin() {
    let app = spawn_app().await;
    let admin = app.admin("root", "root@x.com", "pw").await;

    let created = create_product(
        &app,
        &admin,
        json!({
            "name": "Lamp",
            "description": "Desk lamp",
            "price": 25.0,
            "image": "lamp.png",
            "category": "Home",
        }),
    )
    .await;
    assert_eq!(created["name"], "Lamp");
    assert_eq!(created["category"], "Home");
    let key = created["key"].as_str().unwrap().to_string();

    // Reading a single product is public.
    let fetched = app.get(&format!("/products/{key}"), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created);

    let updated = app
        .send(
            Method::PUT,
            &format!("/products/update/{key}"),
            Some(&admin),
            Some(json!({ "price": 30.0 })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["price"], 30.0);
    assert_eq!(updated.body["name"], "Lamp");

    let deleted = app
        .send(
            Method::DELETE,
            &format!("/products/delete/{key}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["key"], key.as_str());

    let gone = app.get(&format!("/products/{key}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["detail"], "Product not found");
}

#[tokio::test]
async fn test_product_writes_require_admin() {
    let app = spawn_app().await;
    let user = app.verified_user("alice", "a@x.com", "pw").await;
    let body = json!({ "name": "Lamp", "price": 25.0 });

    let anonymous = app
        .send(Method::POST, "/products/create", None, Some(body.clone()))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let forbidden = app
        .send(Method::POST, "/products/create", Some(&user), Some(body))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let delete = app
        .send(Method::DELETE, "/products/delete/product_x", Some(&user), None)
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_requires_token_and_reports_empty() {
    let app = spawn_app().await;
    let user = app.verified_user("alice", "a@x.com", "pw").await;

    let anonymous = app.get("/products/all", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let empty = app.get("/products/all", Some(&user)).await;
    assert_eq!(empty.status, StatusCode::NOT_FOUND);
    assert_eq!(empty.body["detail"], "No products found");
}

#[tokio::test]
async fn test_list_filters() {
    let app = spawn_app().await;
    let admin = app.admin("root", "root@x.com", "pw").await;
    let user = app.verified_user("alice", "a@x.com", "pw").await;

    create_product(
        &app,
        &admin,
        json!({ "name": "Lamp", "price": 25.0, "category": "Home" }),
    )
    .await;
    create_product(
        &app,
        &admin,
        json!({ "name": "Novel", "price": 12.5, "category": "Books" }),
    )
    .await;
    create_product(
        &app,
        &admin,
        json!({ "name": "Sofa", "price": 400.0, "category": "Home" }),
    )
    .await;

    let all = app.get("/products/all", Some(&user)).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body.as_array().unwrap().len(), 3);

    let home = app.get("/products/all?category=home", Some(&user)).await;
    assert_eq!(home.status, StatusCode::OK);
    assert_eq!(home.body.as_array().unwrap().len(), 2);

    let cheap_home = app
        .get("/products/all?category=Home&max_price=100", Some(&user))
        .await;
    let names: Vec<&str> = cheap_home
        .body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Lamp"]);

    let none = app
        .get("/products/all?min_price=1000", Some(&user))
        .await;
    assert_eq!(none.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_rejects_invalid_filters() {
    let app = spawn_app().await;
    let user = app.verified_user("alice", "a@x.com", "pw").await;

    for query in [
        "min_price=0",
        "min_price=-1",
        "max_price=0",
        "min_price=10&max_price=5",
    ] {
        let response = app
            .get(&format!("/products/all?{query}"), Some(&user))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{query}");
        assert!(response.body["detail"].is_string());
    }

    let long = "c".repeat(51);
    let response = app
        .get(&format!("/products/all?category={long}"), Some(&user))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_invalid_product() {
    let app = spawn_app().await;
    let admin = app.admin("root", "root@x.com", "pw").await;

    let blank = app
        .send(
            Method::POST,
            "/products/create",
            Some(&admin),
            Some(json!({ "name": "  ", "price": 1.0 })),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let negative = app
        .send(
            Method::POST,
            "/products/create",
            Some(&admin),
            Some(json!({ "name": "Lamp", "price": -1.0 })),
        )
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_unknown_product_is_404() {
    let app = spawn_app().await;
    let admin = app.admin("root", "root@x.com", "pw").await;

    let response = app
        .send(
            Method::PUT,
            "/products/update/product_missing",
            Some(&admin),
            Some(json!({ "price": 5.0 })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_filter_matches_literally() {
    let app = spawn_app().await;
    let admin = app.admin("root", "root@x.com", "pw").await;
    create_product(
        &app,
        &admin,
        json!({ "name": "Chair", "price": 50.0, "category": "Furniture" }),
    )
    .await;

    for query in ["category=%25", "category=F_rn"] {
        let response = app
            .get(&format!("/products/all?{query}"), Some(&admin))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{query}");
    }

    let plain = app.get("/products/all?category=furn", Some(&admin)).await;
    assert_eq!(plain.status, StatusCode::OK);
}
