use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::models::UserResponse;
use crate::session::CurrentUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/profile", get(profile))
}

async fn index() -> Json<Value> {
    Json(json!({ "service": "member-portal", "status": "ok" }))
}

async fn profile(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}
