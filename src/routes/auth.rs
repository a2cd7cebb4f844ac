use axum::extract::State;
use axum::http::{StatusCode, header::SET_COOKIE};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use sqlx::Row;

use crate::error::AppError;
use crate::models::{LoginRequest, SignupRequest, TokenResponse, User, UserResponse};
use crate::session::{CurrentUser, hash_password, verify_password};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let SignupRequest {
        email,
        password,
        name,
    } = payload;
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::bad_request("Email and password are required"));
    }

    let password_hash = hash_password(&password)?;
    let result = sqlx::query(
        r#"
        INSERT INTO users (email, name, password_hash, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&email)
    .bind(&name)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await;

    match result {
        Ok(row) => {
            let id: i64 = row.try_get("id")?;
            let user = User { id, email, name };
            Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
        }
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
            Err(AppError::conflict("User already exists"))
        }
        Err(err) => Err(err.into()),
    }
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query(
        r#"
        SELECT id, password_hash
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(&payload.email)
    .fetch_optional(&state.pool)
    .await?;

    let row = row.ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;
    let hashed: String = row.try_get("password_hash")?;
    if !verify_password(&payload.password, &hashed) {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let user_id: i64 = row.try_get("id")?;
    let token = state.login.issue_session(user_id)?;
    let cookie = state.login.session_cookie(&token);

    Ok((
        [(SET_COOKIE, cookie)],
        Json(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
        }),
    ))
}

async fn logout(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let cookie = state.login.clear_session_cookie();
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]))
}
