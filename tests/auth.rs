mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn login_with_valid_token() {
    let app = TestApp::new().await;
    let (user_id, token) = app.create_user("Test User").await;

    let resp = app
        .post_json("/login", &json!({ "token": token }), None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get("set-cookie").is_some());

    let body = body_json(resp).await;
    assert_eq!(body["id"].as_i64().unwrap(), user_id);
    assert_eq!(body["name"], "Test User");
}

#[tokio::test]
async fn login_with_unknown_token_is_rejected() {
    let app = TestApp::new().await;
    app.create_user("Test User").await;

    let resp = app
        .post_json("/login", &json!({ "token": "not-a-token" }), None)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = TestApp::new().await;
    let (_user_id, token) = app.create_user("Test User").await;
    let cookie = app.login(&token).await;

    let resp = app.get("/collections", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .post_json("/logout", &json!({}), Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.get("/collections", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
