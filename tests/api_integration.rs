//! End-to-end tests for the HTTP surface, driven through the router with `oneshot`.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use storerate_backend::{
    auth::JwtHandler,
    create_router,
    db::{Database, MIN_BCRYPT_COST},
    AppState,
};

const SECRET: &str = "integration-test-secret-at-least-32-bytes";
const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "Admin123!";

struct TestApp {
    app: Router,
    db_path: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("storerate.db");
        let db = Database::open(db_path.to_str().unwrap())
            .unwrap()
            .with_bcrypt_cost(MIN_BCRYPT_COST);
        db.ensure_admin("System Administrator Account", ADMIN_EMAIL, ADMIN_PASSWORD)
            .unwrap();

        let state = AppState::new(db, Arc::new(JwtHandler::new(SECRET)));
        Self {
            app: create_router(state),
            db_path,
            _dir: dir,
        }
    }

    /// Side channel for changes the API does not expose (deleting users, changing roles)
    fn raw_conn(&self) -> rusqlite::Connection {
        rusqlite::Connection::open(&self.db_path).unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Register a normal user and return (id, token)
    async fn register(&self, name: &str, email: &str) -> (i64, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/register",
                None,
                Some(json!({ "name": name, "email": email, "password": "Abcdef1!" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        (
            body["user"]["id"].as_i64().unwrap(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    /// Create a store owner through the admin API and return (id, token)
    async fn create_owner(&self, admin: &str, email: &str) -> (i64, String) {
        let (status, body) = self
            .post(
                "/api/users",
                admin,
                json!({
                    "name": "Store Owner Account Holder",
                    "email": email,
                    "password": "Owner123!",
                    "role": "store_owner",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create owner failed: {body}");
        let id = body["user"]["id"].as_i64().unwrap();
        (id, self.login(email, "Owner123!").await)
    }

    async fn create_store(&self, admin: &str, name: &str, owner_id: Option<i64>) -> i64 {
        let (status, body) = self
            .post(
                "/api/stores",
                admin,
                json!({
                    "name": name,
                    "email": "contact@store.example",
                    "address": "1 Market Street",
                    "ownerId": owner_id,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create store failed: {body}");
        body["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_register_login_and_list_stores() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/register",
            None,
            Some(json!({
                "name": "A very long valid name here",
                "email": "a@b.com",
                "password": "Abcdef1!",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password_hash").is_none());

    let token = app.login("a@b.com", "Abcdef1!").await;

    let (status, body) = app.get("/api/stores", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let admin = app.admin_token().await;
    app.create_store(&admin, "Zeta Grocery", None).await;
    app.create_store(&admin, "Alpha Hardware", None).await;

    let (_, body) = app.get("/api/stores", &token).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha Hardware", "Zeta Grocery"]);

    let (_, body) = app
        .get("/api/stores?sortBy=name&sortOrder=desc", &token)
        .await;
    assert_eq!(body[0]["name"], "Zeta Grocery");

    let (_, body) = app.get("/api/stores?search=alpha", &token).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["average_rating"], 0.0);
}

#[tokio::test]
async fn test_register_rejects_invalid_and_duplicate() {
    let app = TestApp::new();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/register",
            None,
            Some(json!({ "name": "Too short", "email": "x@y.com", "password": "Abcdef1!" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/register",
            None,
            Some(json!({
                "name": "A very long valid name here",
                "email": "x@y.com",
                "password": "abcdefg1!",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.register("A very long valid name here", "dup@example.com")
        .await;
    let (status, body) = app
        .send(
            Method::POST,
            "/api/register",
            None,
            Some(json!({
                "name": "Another very long valid name",
                "email": "dup@example.com",
                "password": "Abcdef1!",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "dup@example.com", "password": "Wrong123!" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_auth_gate() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/stores", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access token required");

    let (status, _) = app.get("/api/stores", "not-a-jwt").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let other = JwtHandler::new("some-other-secret-of-sufficient-length")
        .issue(1)
        .unwrap();
    let (status, _) = app.get("/api/stores", &other).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri("/api/stores")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Valid signature but the account is gone
    let (user_id, token) = app
        .register("A very long valid name here", "gone@example.com")
        .await;
    app.raw_conn()
        .execute("DELETE FROM users WHERE id = ?1", [user_id])
        .unwrap();
    let (status, body) = app.get("/api/stores", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_expired_token_rejected_by_gate() {
    let app = TestApp::new();
    let (user_id, _) = app
        .register("A very long valid name here", "late@example.com")
        .await;

    let handler = JwtHandler::with_ttl(SECRET, Duration::hours(24));
    let expired = handler
        .issue_at(user_id, Utc::now() - Duration::hours(25))
        .unwrap();
    let (status, body) = app.get("/api/me", &expired).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid or expired token");

    let fresh = handler
        .issue_at(user_id, Utc::now() - Duration::hours(23))
        .unwrap();
    let (status, body) = app.get("/api/me", &fresh).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id);
}

#[tokio::test]
async fn test_role_gate() {
    let app = TestApp::new();
    let (_, token) = app
        .register("A very long valid name here", "plain@example.com")
        .await;

    let (status, body) = app.get("/api/dashboard", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");

    let (status, _) = app.get("/api/users", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/store-owner/dashboard", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Denied before the body is looked at
    let (status, _) = app.post("/api/stores", &token, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await;
    let (status, _) = app.get("/api/dashboard", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post("/api/stores", &admin, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_role_change_applies_to_existing_token() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, _) = app.get("/api/dashboard", &admin).await;
    assert_eq!(status, StatusCode::OK);

    app.raw_conn()
        .execute(
            "UPDATE users SET role = 'user' WHERE email = ?1",
            [ADMIN_EMAIL],
        )
        .unwrap();

    let (status, _) = app.get("/api/dashboard", &admin).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/me", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn test_rating_upsert() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let store_id = app.create_store(&admin, "Corner Bakery", None).await;
    let (_, token) = app
        .register("A very long valid name here", "rater@example.com")
        .await;

    for _ in 0..2 {
        let (status, body) = app
            .post("/api/ratings", &token, json!({ "storeId": store_id, "rating": 4 }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Rating submitted successfully");
    }

    let uri = format!("/api/ratings?storeId={store_id}");
    let (_, body) = app.get(&uri, &token).await;
    assert_eq!(body["rating"], 4);

    let (_, counts) = app.get("/api/dashboard", &admin).await;
    assert_eq!(counts["ratings"], 1);

    let (status, _) = app
        .post("/api/ratings", &token, json!({ "storeId": store_id, "rating": 2 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get(&uri, &token).await;
    assert_eq!(body["rating"], 2);

    let (_, counts) = app.get("/api/dashboard", &admin).await;
    assert_eq!(counts, json!({ "users": 2, "stores": 1, "ratings": 1 }));

    let (_, stores) = app.get("/api/stores", &token).await;
    assert_eq!(stores[0]["average_rating"], 2.0);
}

#[tokio::test]
async fn test_rating_bounds_and_bad_input() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let store_id = app.create_store(&admin, "Corner Bakery", None).await;
    let (_, token) = app
        .register("A very long valid name here", "rater@example.com")
        .await;

    for rating in [json!(0), json!(6), json!(4.5), json!("4"), Value::Null] {
        let (status, _) = app
            .post(
                "/api/ratings",
                &token,
                json!({ "storeId": store_id, "rating": rating }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rating {rating} accepted");
    }

    for rating in [1, 5] {
        let (status, _) = app
            .post("/api/ratings", &token, json!({ "storeId": store_id, "rating": rating }))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = app.post("/api/ratings", &token, json!({ "rating": 3 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post("/api/ratings", &token, json!({ "storeId": 9999, "rating": 3 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Store not found");
}

#[tokio::test]
async fn test_owner_dashboard() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (owner_id, owner) = app.create_owner(&admin, "owner@example.com").await;

    let (status, body) = app.get("/api/store-owner/dashboard", &owner).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Store not found for this owner");

    let store_id = app
        .create_store(&admin, "Owner Operated Deli", Some(owner_id))
        .await;

    let (_, first) = app
        .register("First very long valid name", "first@example.com")
        .await;
    let (_, second) = app
        .register("Second very long valid name", "second@example.com")
        .await;
    app.post("/api/ratings", &first, json!({ "storeId": store_id, "rating": 4 }))
        .await;
    app.post("/api/ratings", &second, json!({ "storeId": store_id, "rating": 5 }))
        .await;

    let (status, body) = app.get("/api/store-owner/dashboard", &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"]["id"], store_id);
    assert_eq!(body["store"]["name"], "Owner Operated Deli");
    assert_eq!(body["averageRating"], "4.5");
    assert_eq!(body["ratings"].as_array().unwrap().len(), 2);

    // Only store owners may own a store
    let (plain_id, _) = app
        .register("Third very long valid name", "third@example.com")
        .await;
    let (status, _) = app
        .post(
            "/api/stores",
            &admin,
            json!({ "name": "Unowned Shop", "email": "s@shop.com", "ownerId": plain_id }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_user_listing() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.register("A very long valid name here", "plain@example.com")
        .await;
    app.create_owner(&admin, "owner@example.com").await;

    let (status, body) = app.get("/api/users", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = app.get("/api/users?role=store_owner", &admin).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["email"], "owner@example.com");

    let (status, _) = app.get("/api/users?sortBy=password_hash", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/stores?sortBy=1%3BDROP%20TABLE%20users", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let (_, token) = app
        .register("A very long valid name here", "pw@example.com")
        .await;

    let uri = "/api/users/password";
    let (status, body) = app
        .send(
            Method::PUT,
            uri,
            Some(&token),
            Some(json!({ "currentPassword": "Wrong123!", "newPassword": "Newpass1!" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Current password is incorrect");

    let (status, _) = app
        .send(
            Method::PUT,
            uri,
            Some(&token),
            Some(json!({ "currentPassword": "Abcdef1!", "newPassword": "weak" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::PUT,
            uri,
            Some(&token),
            Some(json!({ "currentPassword": "Abcdef1!", "newPassword": "Newpass1!" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password updated successfully");

    app.login("pw@example.com", "Newpass1!").await;
    let (status, _) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "pw@example.com", "password": "Abcdef1!" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_owner_average_rounds_halves_up() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (owner_id, owner) = app.create_owner(&admin, "owner@example.com").await;
    let store_id = app
        .create_store(&admin, "Quarter Point Cafe", Some(owner_id))
        .await;

    for (i, rating) in [2, 2, 2, 3].into_iter().enumerate() {
        let (_, token) = app
            .register(
                &format!("Rater number {i} with a long name"),
                &format!("rater{i}@example.com"),
            )
            .await;
        let (status, _) = app
            .post("/api/ratings", &token, json!({ "storeId": store_id, "rating": rating }))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app.get("/api/store-owner/dashboard", &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["averageRating"], "2.3");
}

#[tokio::test]
async fn test_bad_query_string_is_json_400() {
    let app = TestApp::new();
    let (_, token) = app
        .register("A very long valid name here", "query@example.com")
        .await;

    for uri in ["/api/ratings?storeId=abc", "/api/ratings"] {
        let (status, body) = app.get(uri, &token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "Invalid query parameters", "{uri}");
    }

    let (status, body) = app.get("/api/ratings?storeId=1", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], Value::Null);
}
