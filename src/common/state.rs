// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;

use super::cache::QueryCache;
use super::config::Config;
use crate::notifications::NotificationHub;

/// Application state containing the database pool, configuration and the
/// shared handles every service receives explicitly
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub http: Client,
    pub config: Arc<Config>,
    pub cache: QueryCache,
    pub notifications: NotificationHub,
}

impl AppState {
    pub fn new(db: SqlitePool, http: Client, config: Config) -> Self {
        let cache = QueryCache::new(config.public_cache_ttl_secs);
        Self {
            db,
            http,
            config: Arc::new(config),
            cache,
            notifications: NotificationHub::new(),
        }
    }
}
