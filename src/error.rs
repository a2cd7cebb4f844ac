use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("login required")]
    LoginRequired { login_url: String },
    #[error("unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("conflict: {0}")]
    Conflict(Cow<'static, str>),
    #[error("bad request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Rejection for requests that need an authenticated session. The response
    /// carries the login route so clients know where to send the user.
    pub fn login_required(login_url: impl Into<String>) -> Self {
        Self::LoginRequired {
            login_url: login_url.into(),
        }
    }

    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Database(_) | Self::Hash(_) | Self::Token(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "detail": "Internal server error" }),
            ),
            Self::LoginRequired { login_url } => (
                StatusCode::UNAUTHORIZED,
                json!({ "detail": "Login required", "login_url": login_url }),
            ),
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, json!({ "detail": message })),
            Self::Conflict(message) => (StatusCode::CONFLICT, json!({ "detail": message })),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "detail": message })),
        };

        (status, Json(body)).into_response()
    }
}
