use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use member_portal::config::AppConfig;
use member_portal::db;
use member_portal::routes::app_router;
use member_portal::session::hash_password;
use member_portal::state::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Member portal API service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server
    Serve {
        #[arg(long, default_value = "0.0.0.0:8000")]
        addr: String,
    },
    /// Create a user directly in the database
    CreateUser {
        email: String,
        password: String,
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Command::Serve { addr } => serve(config, addr).await?,
        Command::CreateUser {
            email,
            password,
            name,
        } => create_user(config, email, password, name).await?,
    }

    Ok(())
}

async fn serve(config: AppConfig, addr: String) -> Result<()> {
    let pool = db::connect(&config.database_url).await?;
    db::init_db(&pool).await?;
    let state = AppState::new(pool, config);
    let app = app_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn create_user(
    config: AppConfig,
    email: String,
    password: String,
    name: Option<String>,
) -> Result<()> {
    let pool = db::connect(&config.database_url).await?;
    db::init_db(&pool).await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await?;

    if existing > 0 {
        println!("User already exists");
        return Ok(());
    }

    let password_hash = hash_password(&password)?;
    sqlx::query(
        r#"
        INSERT INTO users (email, name, password_hash, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(&email)
    .bind(&name)
    .bind(password_hash)
    .bind(chrono::Utc::now())
    .execute(&pool)
    .await?;

    println!("Created user: {email}");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
