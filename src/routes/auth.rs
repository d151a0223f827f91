use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;

use crate::auth::{login_user, logout_user};
use crate::error::AppError;
use crate::models::User;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    token: String,
}

#[derive(Serialize)]
struct LoginResponse {
    id: i64,
    name: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE login_token = ?")
        .bind(&body.token)
        .fetch_optional(&state.db)
        .await?;

    match user {
        Some(user) => {
            let response = LoginResponse {
                id: user.id,
                name: user.name.clone(),
            };
            login_user(&session, user).await?;
            Ok(Json(response).into_response())
        }
        None => Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid login token" })),
        )
            .into_response()),
    }
}

async fn logout(session: Session) -> Result<impl IntoResponse, AppError> {
    logout_user(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}
