use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::session::LoginManager;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: AppConfig,
    pub login: LoginManager,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        let login = LoginManager::new(
            config.secret_key.clone(),
            config.session_expire_minutes,
            "/login",
        );
        Self {
            pool,
            login,
            config,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for LoginManager {
    fn from_ref(state: &AppState) -> Self {
        state.login.clone()
    }
}
