use std::env;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {name}")]
    MissingEnv { name: &'static str },
    #[error("environment variable {name} has invalid value {value:?}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("invalid database URL: {source}")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("database username cannot be carried in a connection URL")]
    InvalidDatabaseUsername,
    #[error("database password cannot be carried in a connection URL")]
    InvalidDatabasePassword,
}

/// The six environment-derived values describing the database connection.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port_raw = require_env("DATABASE_PORT")?;
        let port = port_raw
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidEnv {
                name: "DATABASE_PORT",
                value: port_raw,
            })?;

        Ok(Self {
            scheme: require_env("DATABASE_SCHEME")?,
            host: require_env("DATABASE_HOST")?,
            port,
            name: require_env("DATABASE_NAME")?,
            user: require_env("DATABASE_USER")?,
            password: require_env("DATABASE_PASSWORD")?,
        })
    }

    /// Connection URI of the form `{scheme}://{user}:{password}@{host}:{port}/{name}`.
    ///
    /// Credentials go through the URL userinfo encoder, so a password holding
    /// `@`, `:` or `/` still produces a parseable URI. Credentials without such
    /// characters come out as the literal concatenation.
    pub fn url(&self) -> Result<String, ConfigError> {
        let mut url = Url::parse(&format!(
            "{}://{}:{}/{}",
            self.scheme, self.host, self.port, self.name
        ))
        .map_err(|source| ConfigError::InvalidDatabaseUrl { source })?;
        url.set_username(&self.user)
            .map_err(|_| ConfigError::InvalidDatabaseUsername)?;
        url.set_password(Some(&self.password))
            .map_err(|_| ConfigError::InvalidDatabasePassword)?;
        Ok(url.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub secret_key: String,
    pub database_url: String,
    pub session_expire_minutes: u64,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = DatabaseConfig::from_env()?.url()?;
        let secret_key = require_env("PORTAL_SECRET_KEY")?;
        let session_expire_minutes = match env::var("PORTAL_SESSION_EXPIRE_MINUTES") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidEnv {
                    name: "PORTAL_SESSION_EXPIRE_MINUTES",
                    value,
                })?,
            Err(_) => 60 * 24,
        };
        let cors_origins = env::var("PORTAL_CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect::<Vec<_>>();

        Ok(Self {
            secret_key,
            database_url,
            session_expire_minutes,
            cors_origins,
        })
    }

    pub fn allow_all_cors(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origins.clone()
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv { name }),
    }
}
