use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use wata::config::AppConfig;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let router = wata::build_app(pool.clone(), &config, false).await;

        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Create a user in the database and return (user_id, login_token).
    pub async fn create_user(&self, name: &str) -> (i64, String) {
        let token = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (name, login_token, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(&token)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await
        .expect("Failed to create test user");

        (result.last_insert_rowid(), token)
    }

    /// Log in as the given user and return the session cookie string.
    pub async fn login(&self, token: &str) -> String {
        let resp = self
            .post_json("/login", &serde_json::json!({ "token": token }), None)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        resp.headers()
            .get("set-cookie")
            .expect("Login should set a session cookie")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    /// Insert a collection directly, with an explicit created_at so tests
    /// can control listing order.
    pub async fn seed_collection(&self, owner_id: i64, title: &str, created_at: &str) -> i64 {
        let result = sqlx::query(
            "INSERT INTO collections (owner_id, title, note, created_at, updated_at) VALUES (?, ?, NULL, ?, ?)",
        )
        .bind(owner_id)
        .bind(title)
        .bind(created_at)
        .bind(created_at)
        .execute(&self.db)
        .await
        .expect("Failed to seed collection");

        result.last_insert_rowid()
    }

    /// Insert a collection item directly, bypassing the ownership guard.
    pub async fn seed_item(&self, collection_id: i64, wata_id: i64, adder_id: i64) -> i64 {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO collection_items (collection_id, wata_id, adder_id, updater_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(collection_id)
        .bind(wata_id)
        .bind(adder_id)
        .bind(adder_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await
        .expect("Failed to seed collection item");

        result.last_insert_rowid()
    }

    pub async fn count_collections(&self, owner_id: i64) -> i64 {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM collections WHERE owner_id = ?")
                .bind(owner_id)
                .fetch_one(&self.db)
                .await
                .unwrap();
        count
    }

    pub async fn count_items(&self, collection_id: i64) -> i64 {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM collection_items WHERE collection_id = ?")
                .bind(collection_id)
                .fetch_one(&self.db)
                .await
                .unwrap();
        count
    }

    /// Send a GET request with an optional session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a JSON request with the given method and optional session cookie.
    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        body: &serde_json::Value,
        cookie: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.request(req).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: &serde_json::Value,
        cookie: Option<&str>,
    ) -> Response {
        self.send_json("POST", uri, body, cookie).await
    }

    pub async fn put_json(
        &self,
        uri: &str,
        body: &serde_json::Value,
        cookie: Option<&str>,
    ) -> Response {
        self.send_json("PUT", uri, body, cookie).await
    }

    pub async fn delete_json(
        &self,
        uri: &str,
        body: &serde_json::Value,
        cookie: Option<&str>,
    ) -> Response {
        self.send_json("DELETE", uri, body, cookie).await
    }

    /// Send a DELETE request with an optional session cookie.
    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri).method("DELETE");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Response body should be JSON")
}
