//! End-to-end tests of the HTTP surface over the in-memory store.

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use shop_api::{create_router, AppConfig, AppState, TokenService};
use shop_core::{Identity, MemoryStore, Repositories};
use std::sync::Arc;

const SECRET: &str = "test-secret";

fn server_with(config: AppConfig) -> TestServer {
    let state = AppState::with_repositories(
        config.with_bcrypt_cost(4),
        Repositories::new(Arc::new(MemoryStore::new())),
    );
    TestServer::new(create_router(state)).unwrap()
}

fn server() -> TestServer {
    server_with(AppConfig::new(SECRET))
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

async fn register(server: &TestServer, name: &str, email: &str, password: &str) {
    server
        .post("/api/auth/register")
        .json(&json!({ "name": name, "email": email, "password": password }))
        .await
        .assert_status_ok();
}

async fn login(server: &TestServer, email: &str, password: &str) -> Value {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

/// Register and log in a fresh user, returning the session token
async fn signed_in(server: &TestServer, email: &str) -> String {
    register(server, "Shopper", email, "hunter2").await;
    login(server, email, "hunter2").await["token"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn create_coupon(server: &TestServer, body: Value) -> Value {
    let response = server.post("/api/coupons/create").json(&body).await;
    response.assert_status_ok();
    response.json::<Value>()
}

async fn apply(server: &TestServer, token: &str, body: Value) -> (StatusCode, Value) {
    let response = server
        .post("/api/coupons/apply")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&body)
        .await;
    (response.status_code(), response.json::<Value>())
}

// --- Health -----------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let server = server();

    let body = server.get("/health").await.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");

    server.get("/").await.assert_status_ok();
}

// --- Auth -------------------------------------------------------------------

#[tokio::test]
async fn test_register_then_login() {
    let server = server();

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter2" }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["msg"], "Account created");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["user"].get("password").is_none());

    let body = login(&server, "ada@example.com", "hunter2").await;
    assert_eq!(body["msg"], "Login successful");
    assert_eq!(body["user"]["name"], "Ada");
    assert!(body["user"].get("password").is_none());

    let user_id = body["user"]["id"].as_str().unwrap();
    let tokens = TokenService::new(SECRET, Duration::hours(2));
    let identity = tokens.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(identity.id, user_id);
    assert_eq!(identity.email, "ada@example.com");
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let server = server();
    register(&server, "Ada", "ada@example.com", "hunter2").await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "name": "Imposter", "email": "ada@example.com", "password": "x" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["msg"],
        "Email already in use or bad request"
    );
}

#[tokio::test]
async fn test_malformed_registration_rejected() {
    let server = server();

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": "ada@example.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["msg"],
        "Email already in use or bad request"
    );
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let server = server();
    register(&server, "Ada", "ada@example.com", "hunter2").await;

    let wrong_password = server
        .post("/api/auth/login")
        .json(&json!({ "email": "ada@example.com", "password": "nope" }))
        .await;
    let unknown_email = server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": "hunter2" }))
        .await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.json::<Value>(),
        unknown_email.json::<Value>()
    );
    assert_eq!(
        wrong_password.json::<Value>()["msg"],
        "Wrong email or password"
    );
}

// --- Middleware -------------------------------------------------------------

#[tokio::test]
async fn test_missing_token() {
    let server = server();

    let response = server.get("/api/orders").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["msg"], "No token");
}

#[tokio::test]
async fn test_invalid_tokens() {
    let server = server();
    let stale = TokenService::new(SECRET, Duration::hours(2))
        .issue_for(
            &Identity {
                id: "someone".to_string(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            Utc::now() - Duration::hours(3),
        )
        .unwrap();

    for value in [
        HeaderValue::from_static("Token abc"),
        HeaderValue::from_static("Bearer "),
        bearer("not.a.jwt"),
        bearer(&stale),
    ] {
        let response = server
            .get("/api/orders")
            .add_header(AUTHORIZATION, value)
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["msg"], "Wrong or expired token");
    }
}

// --- Products ---------------------------------------------------------------

#[tokio::test]
async fn test_product_crud() {
    let server = server();
    let token = signed_in(&server, "admin@example.com").await;

    // Writes need a token
    server
        .post("/api/products")
        .json(&json!({ "name": "Mug", "price": 12.5 }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let created = server
        .post("/api/products")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "Mug", "desc": "Ceramic", "price": 12.5, "category": "kitchen" }))
        .await;
    created.assert_status_ok();
    let product = created.json::<Value>();
    let id = product["_id"].as_str().unwrap().to_string();
    assert_eq!(product["name"], "Mug");

    let listed = server.get("/api/products").await.json::<Value>();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let fetched = server.get(&format!("/api/products/{}", id)).await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<Value>()["desc"], "Ceramic");

    let updated = server
        .put(&format!("/api/products/{}", id))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "price": 10.0 }))
        .await;
    updated.assert_status_ok();
    let updated = updated.json::<Value>();
    assert_eq!(updated["price"], 10.0);
    assert_eq!(updated["name"], "Mug");

    let deleted = server
        .delete(&format!("/api/products/{}", id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    deleted.assert_status_ok();
    assert_eq!(deleted.json::<Value>()["msg"], "Deleted");

    server
        .get(&format!("/api/products/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_missing_and_invalid() {
    let server = server();
    let token = signed_in(&server, "admin@example.com").await;

    let missing = server.get("/api/products/does-not-exist").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(missing.json::<Value>()["msg"], "Not found");

    server
        .put("/api/products/does-not-exist")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "price": 1.0 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .post("/api/products")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "Mug", "price": 1.0, "stock": 3 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/products")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "Mug", "price": -1.0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// --- Coupons ----------------------------------------------------------------

#[tokio::test]
async fn test_coupon_create_and_list() {
    let server = server();

    let coupon = create_coupon(
        &server,
        json!({ "code": "welcome10", "desc": "10% off", "type": "percent", "amount": 10 }),
    )
    .await;
    assert_eq!(coupon["code"], "WELCOME10");
    assert_eq!(coupon["enabled"], true);

    create_coupon(
        &server,
        json!({
            "code": "OLD",
            "amount": 5,
            "expiry": (Utc::now() - Duration::days(1)).to_rfc3339()
        }),
    )
    .await;
    create_coupon(&server, json!({ "code": "OFF", "amount": 5, "enabled": false })).await;

    let listed = server.get("/api/coupons").await.json::<Value>();
    let codes: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["code"].as_str())
        .collect();
    assert_eq!(codes, vec!["WELCOME10"]);

    let duplicate = server
        .post("/api/coupons/create")
        .json(&json!({ "code": "Welcome10", "amount": 1 }))
        .await;
    duplicate.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_coupon_create_can_require_auth() {
    let server = server_with(AppConfig::new(SECRET).with_protected_coupon_creation(true));

    server
        .post("/api/coupons/create")
        .json(&json!({ "code": "SAVE", "amount": 5 }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let token = signed_in(&server, "admin@example.com").await;
    server
        .post("/api/coupons/create")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "code": "SAVE", "amount": 5 }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_apply_percent_and_flat() {
    let server = server();
    let token = signed_in(&server, "ada@example.com").await;
    create_coupon(&server, json!({ "code": "TENPCT", "type": "percent", "amount": 10 })).await;
    create_coupon(&server, json!({ "code": "FIFTY", "type": "flat", "amount": 50 })).await;

    let cart = json!([{ "name": "Mug", "price": 40.0, "qty": 2 }, { "price": 15.5, "qty": 1 }]);

    let (status, quote) = apply(&server, &token, json!({ "code": "tenpct", "cart": cart })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["code"], "TENPCT");
    assert_eq!(quote["discount"], 9.0);
    assert_eq!(quote["type"], "percent");

    create_coupon(&server, json!({ "code": "TWENTYNINE", "type": "percent", "amount": 29 })).await;
    let (status, quote) = apply(
        &server,
        &token,
        json!({ "code": "TWENTYNINE", "cart": [{ "price": 100.0, "qty": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["discount"], 29.0);

    // Flat discounts never exceed the subtotal
    let (status, quote) = apply(
        &server,
        &token,
        json!({ "code": "FIFTY", "cart": [{ "price": 10.0, "qty": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["discount"], 10.0);
}

#[tokio::test]
async fn test_apply_rejections() {
    let server = server();
    let token = signed_in(&server, "ada@example.com").await;
    create_coupon(
        &server,
        json!({
            "code": "GONE",
            "amount": 5,
            "expiry": (Utc::now() - Duration::hours(1)).to_rfc3339()
        }),
    )
    .await;
    create_coupon(&server, json!({ "code": "BIGSPEND", "amount": 5, "minOrder": 100 })).await;
    create_coupon(&server, json!({ "code": "OFF", "amount": 5, "enabled": false })).await;

    let cart = json!([{ "price": 20.0, "qty": 1 }]);
    let cases = [
        (json!({ "code": "GONE", "cart": cart }), "Coupon expired"),
        (json!({ "code": "BIGSPEND", "cart": cart }), "Min order not reached."),
        (json!({ "code": "OFF", "cart": cart }), "Invalid coupon"),
        (json!({ "code": "NOPE", "cart": cart }), "Invalid coupon"),
        (json!({ "code": "GONE" }), "No code or cart sent"),
        (json!({ "cart": cart }), "No code or cart sent"),
        (json!({ "code": "GONE", "cart": [] }), "No code or cart sent"),
    ];

    for (body, expected) in cases {
        let (status, response) = apply(&server, &token, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", expected);
        assert_eq!(response["msg"], expected);
        assert_eq!(response["discount"], 0.0);
    }
}

#[tokio::test]
async fn test_apply_requires_token() {
    let server = server();

    server
        .post("/api/coupons/apply")
        .json(&json!({ "code": "ANY", "cart": [{ "price": 1.0, "qty": 1 }] }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// --- Orders -----------------------------------------------------------------

fn order_body(total: f64) -> Value {
    json!({
        "items": [{ "product": { "_id": "p1", "name": "Mug", "price": 12.5 }, "qty": 2 }],
        "total": total,
        "coupon": "TENPCT"
    })
}

#[tokio::test]
async fn test_orders_are_scoped_to_caller() {
    let server = server();
    let ada = signed_in(&server, "ada@example.com").await;
    let bob = signed_in(&server, "bob@example.com").await;

    let created = server
        .post("/api/orders")
        .add_header(AUTHORIZATION, bearer(&ada))
        .json(&order_body(22.5))
        .await;
    created.assert_status_ok();
    let order = created.json::<Value>();
    let order_id = order["_id"].as_str().unwrap().to_string();
    assert_eq!(order["total"], 22.5);
    assert_eq!(order["coupon"], "TENPCT");
    assert!(order["createdAt"].is_string());

    let mine = server
        .get("/api/orders")
        .add_header(AUTHORIZATION, bearer(&ada))
        .await
        .json::<Value>();
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let theirs = server
        .get("/api/orders")
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .json::<Value>();
    assert!(theirs.as_array().unwrap().is_empty());

    // Another user's cancel reports success but leaves the order alone
    let response = server
        .delete(&format!("/api/orders/{}", order_id))
        .add_header(AUTHORIZATION, bearer(&bob))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["msg"], "Order cancelled");

    let mine = server
        .get("/api/orders")
        .add_header(AUTHORIZATION, bearer(&ada))
        .await
        .json::<Value>();
    assert_eq!(mine.as_array().unwrap().len(), 1);

    server
        .delete(&format!("/api/orders/{}", order_id))
        .add_header(AUTHORIZATION, bearer(&ada))
        .await
        .assert_status_ok();

    let mine = server
        .get("/api/orders")
        .add_header(AUTHORIZATION, bearer(&ada))
        .await
        .json::<Value>();
    assert!(mine.as_array().unwrap().is_empty());
}
