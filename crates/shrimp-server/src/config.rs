use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use shrimp_api::EconomyConfig;
use shrimp_chat::{ChatConfig, DEFAULT_ADDR};
use shrimp_types::input::normalize_name;

/// Everything read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Channels that receive periodic rewards.
    pub channels: Vec<String>,
    pub reward_interval: Duration,
    pub economy: EconomyConfig,
    pub chat: ChatConfig,
    pub keepalive_url: Option<String>,
    pub keepalive_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let default_channel = normalize_name(
            &var("SHRIMP_DEFAULT_CHANNEL").unwrap_or_else(|| "shrimp".into()),
            "SHRIMP_DEFAULT_CHANNEL",
        )?;

        let channels = match var("SHRIMP_CHANNELS") {
            Some(list) => {
                let mut channels = Vec::new();
                for raw in list.split(',').filter(|c| !c.trim().is_empty()) {
                    let channel = normalize_name(raw, "SHRIMP_CHANNELS")?;
                    if !channels.contains(&channel) {
                        channels.push(channel);
                    }
                }
                channels
            }
            None => vec![default_channel.clone()],
        };

        let economy = EconomyConfig {
            default_channel,
            rob_cooldown: Duration::from_secs(parse_or(&var, "SHRIMP_ROB_COOLDOWN_SECS", 300)?),
            raffle_window: Duration::from_secs(parse_or(&var, "SHRIMP_RAFFLE_WINDOW_SECS", 30)?),
            reveal_delay: Duration::from_millis(parse_or(&var, "SHRIMP_REVEAL_DELAY_MS", 1000)?),
            crate_cost: parse_or(&var, "SHRIMP_CRATE_COST", 100)?,
        };
        if economy.crate_cost <= 0 {
            anyhow::bail!("SHRIMP_CRATE_COST must be positive");
        }

        let chat = ChatConfig {
            addr: var("SHRIMP_IRC_ADDR").unwrap_or_else(|| DEFAULT_ADDR.into()),
            nick: var("SHRIMP_IRC_NICK"),
            token: var("SHRIMP_IRC_TOKEN"),
            timeout: Duration::from_secs(parse_or(&var, "SHRIMP_IRC_TIMEOUT_SECS", 10)?),
            deadline: Duration::from_secs(parse_or(&var, "SHRIMP_IRC_DEADLINE_SECS", 30)?),
        };
        if chat.deadline < chat.timeout {
            anyhow::bail!("SHRIMP_IRC_DEADLINE_SECS must not be shorter than SHRIMP_IRC_TIMEOUT_SECS");
        }

        let reward_interval =
            Duration::from_secs(parse_or(&var, "SHRIMP_REWARD_INTERVAL_SECS", 600)?);
        let keepalive_interval = Duration::from_secs(parse_or(&var, "SHRIMP_KEEPALIVE_SECS", 300)?);
        if reward_interval.is_zero() || keepalive_interval.is_zero() {
            anyhow::bail!("loop intervals must be at least one second");
        }

        Ok(Self {
            host: var("SHRIMP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&var, "SHRIMP_PORT", 8000)?,
            db_path: var("SHRIMP_DB_PATH")
                .unwrap_or_else(|| "shrimp.db".into())
                .into(),
            channels,
            reward_interval,
            economy,
            chat,
            keepalive_url: var("SHRIMP_KEEPALIVE_URL"),
            keepalive_interval,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid number: {:?}", key, raw)),
        None => Ok(default),
    }
}
