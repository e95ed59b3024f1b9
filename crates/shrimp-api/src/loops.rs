use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info, warn};

use shrimp_chat::ChatError;

use crate::state::{AppState, now};

#[derive(Debug, Error)]
pub enum LoopError {
    #[error("chat: {0}")]
    Chat(#[from] ChatError),
    #[error("storage: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Credits the channel's configured reward to everyone currently in chat.
/// Returns how many chatters were paid.
pub async fn distribute_rewards(state: &AppState, channel: &str) -> Result<usize, LoopError> {
    let chatters = state.chat.fetch_chatters(channel).await?;
    if chatters.is_empty() {
        return Ok(0);
    }

    let state = state.clone();
    let channel = channel.to_string();
    let chatters: Vec<String> = chatters.into_iter().collect();
    let paid = tokio::task::spawn_blocking(move || -> anyhow::Result<usize> {
        let reward = state.db.get_settings(&channel)?.reward_amount;
        if reward <= 0 {
            return Ok(0);
        }
        state.db.credit_many(&channel, &chatters, reward)
    })
    .await
    .map_err(|e| anyhow::anyhow!("reward task failed: {}", e))??;

    Ok(paid)
}

/// Pays every channel on a fixed interval. The first payout happens one
/// interval after startup.
pub async fn run_reward_loop(state: AppState, channels: Vec<String>, every: Duration) {
    let mut interval = interval_at(Instant::now() + every, every);

    loop {
        interval.tick().await;

        for channel in &channels {
            match distribute_rewards(&state, channel).await {
                Ok(0) => debug!("Rewards: nobody paid in #{}", channel),
                Ok(count) => info!("Rewards: paid {} chatters in #{}", count, channel),
                Err(e) => warn!("Rewards error in #{}: {}", channel, e),
            }
        }
    }
}

/// Pings an external URL so hosts that idle out quiet services keep us up.
pub async fn run_keepalive_loop(url: String, every: Duration) {
    let client = reqwest::Client::new();
    let mut interval = tokio::time::interval(every);

    loop {
        interval.tick().await;

        match client.get(&url).timeout(Duration::from_secs(10)).send().await {
            Ok(resp) => debug!("Keepalive: {} -> {}", url, resp.status()),
            Err(e) => warn!("Keepalive error: {}", e),
        }
    }
}

/// Drops rob cooldown rows that have already expired.
pub async fn run_cooldown_prune_loop(state: AppState, every: Duration) {
    let mut interval = interval_at(Instant::now() + every, every);
    let cooldown = state.economy.rob_cooldown.as_secs() as i64;

    loop {
        interval.tick().await;

        let db_state = state.clone();
        let pruned = tokio::task::spawn_blocking(move || {
            db_state.db.prune_cooldowns(now() - cooldown)
        })
        .await;

        match pruned {
            Ok(Ok(0)) => {}
            Ok(Ok(count)) => info!("Cleanup: pruned {} rob cooldowns", count),
            Ok(Err(e)) => warn!("Cleanup error: {}", e),
            Err(e) => warn!("Cleanup task failed: {}", e),
        }
    }
}
