use sea_orm::DatabaseConnection;
use shared::{Config, PriceBarRepository};
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state, handed to every handler through `State`.
#[derive(Clone)]
pub struct AppState {
    pub bars: PriceBarRepository,
    pub csv_import_path: PathBuf,
    pub volatility_limit: u64,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        AppState {
            bars: PriceBarRepository::new(db),
            csv_import_path: config.csv_import_path.clone(),
            volatility_limit: config.volatility_limit,
        }
    }
}
