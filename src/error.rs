use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Database(sqlx::Error),
    Session(tower_sessions::session::Error),
    PermissionDenied,
    NotFound,
    TooManyCollections(i64),
    TooManyCollectionItems(i64),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
            }
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Permission denied" })),
            )
                .into_response(),
            AppError::TooManyCollections(limit) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": format!("Collection limit of {limit} reached") })),
            )
                .into_response(),
            AppError::TooManyCollectionItems(limit) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": format!("Collection item limit of {limit} reached") })),
            )
                .into_response(),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        // The store's own "no rows" signal is surfaced as a domain NotFound
        // so callers never match on sqlx error types.
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound,
            other => AppError::Database(other),
        }
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::Session(e)
    }
}
