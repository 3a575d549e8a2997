pub mod analytics;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod import;
pub mod models;
pub mod repositories;

pub use config::Config;
pub use database::{get_db_connection, run_migrations};
pub use error::{StoreError, StoreResult};
pub use models::*;
pub use repositories::PriceBarRepository;
