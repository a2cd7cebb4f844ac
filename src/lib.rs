pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;

pub use routes::app_router;
