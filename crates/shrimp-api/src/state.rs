use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tracing::error;

use shrimp_chat::ChatClient;
use shrimp_db::Database;
use shrimp_types::input::normalize_name;

use crate::error::ApiError;
use crate::raffle::RaffleSessions;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub chat: ChatClient,
    pub raffles: RaffleSessions,
    pub economy: EconomyConfig,
}

/// Tunables shared by the command handlers.
#[derive(Debug, Clone)]
pub struct EconomyConfig {
    /// Used when a request omits `channel`.
    pub default_channel: String,
    pub rob_cooldown: Duration,
    pub raffle_window: Duration,
    /// Pause before a game result is revealed.
    pub reveal_delay: Duration,
    pub crate_cost: i64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            default_channel: "shrimp".to_string(),
            rob_cooldown: Duration::from_secs(300),
            raffle_window: Duration::from_secs(30),
            reveal_delay: Duration::from_secs(1),
            crate_cost: 100,
        }
    }
}

impl AppStateInner {
    pub fn new(db: Database, chat: ChatClient, economy: EconomyConfig) -> AppState {
        Arc::new(Self {
            db,
            chat,
            raffles: RaffleSessions::default(),
            economy,
        })
    }

    /// Normalized channel from the query, or the configured default.
    pub fn channel(&self, requested: Option<&str>) -> Result<String, ApiError> {
        let raw = requested
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(self.economy.default_channel.as_str());
        Ok(normalize_name(raw, "channel")?)
    }
}

/// Runs a blocking database call off the async runtime.
pub async fn db_call<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow!("database task failed: {}", e))
        })?
        .map_err(ApiError::from_storage)
}

/// Unix seconds.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
