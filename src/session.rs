use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    request::Parts,
};
use jsonwebtoken::{self, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    exp: usize,
}

/// Issues and verifies the signed session tokens carried by clients, either as
/// a bearer header or as the `session` cookie. Constructed once, at state
/// assembly, and knows where to send unauthenticated clients.
#[derive(Clone, Debug)]
pub struct LoginManager {
    secret: String,
    expire_minutes: u64,
    login_view: String,
}

impl LoginManager {
    pub fn new(
        secret: impl Into<String>,
        expire_minutes: u64,
        login_view: impl Into<String>,
    ) -> Self {
        Self {
            secret: secret.into(),
            expire_minutes,
            login_view: login_view.into(),
        }
    }

    pub fn login_view(&self) -> &str {
        &self.login_view
    }

    /// The rejection returned for every request that needs a session and does
    /// not have a valid one.
    pub fn login_required(&self) -> AppError {
        AppError::login_required(self.login_view.clone())
    }

    pub fn issue_session(&self, user_id: i64) -> Result<String, AppError> {
        let expiration = SystemTime::now()
            .checked_add(Duration::from_secs(self.expire_minutes * 60))
            .unwrap_or(SystemTime::now());
        let exp = expiration
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs() as usize;
        let claims = TokenClaims {
            sub: user_id.to_string(),
            exp,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }

    pub fn verify_session(&self, token: &str) -> Result<i64, AppError> {
        let validation = Validation::default();
        let data = jsonwebtoken::decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| self.login_required())?;
        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| self.login_required())
    }

    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            self.expire_minutes * 60
        )
    }

    pub fn clear_session_cookie(&self) -> String {
        format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

pub fn verify_password(password: &str, hashed: &str) -> bool {
    bcrypt::verify(password, hashed).unwrap_or(false)
}

/// The user-loading callback behind every authenticated request: one lookup by
/// primary key, `None` when the id maps to no row.
pub async fn load_user(pool: &PgPool, user_id: i64) -> Result<Option<User>, AppError> {
    let row = sqlx::query(
        r#"
        SELECT id, email, name
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = row {
        let id: i64 = row.try_get("id")?;
        let email: String = row.try_get("email")?;
        let name: Option<String> = row.try_get("name")?;
        return Ok(Some(User { id, email, name }));
    }

    Ok(None)
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    let raw = parts.headers.get(COOKIE)?.to_str().ok()?;
    for pair in raw.split(';') {
        if let Some((name, value)) = pair.trim().split_once('=') {
            if name == SESSION_COOKIE {
                return Some(value.to_string());
            }
        }
    }
    None
}

pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    fn from_request_parts<'a>(
        parts: &'a mut Parts,
        state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let state = AppState::from_ref(state);
        async move {
            let token = bearer_token(parts)
                .or_else(|| cookie_token(parts))
                .ok_or_else(|| state.login.login_required())?;
            let user_id = state.login.verify_session(&token)?;
            let user = load_user(&state.pool, user_id)
                .await?
                .ok_or_else(|| state.login.login_required())?;
            Ok(Self(user))
        }
    }
}
