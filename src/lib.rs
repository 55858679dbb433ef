pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::create_pool;
pub use error::LoadError;
pub use service::StatsLoader;
