use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY_NAME: &str = "shrimp";
pub const DEFAULT_REWARD_AMOUNT: i64 = 10;

/// Per-channel economy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSettings {
    pub channel: String,
    pub currency_name: String,
    pub reward_amount: i64,
}

impl ChannelSettings {
    pub fn with_defaults(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            currency_name: DEFAULT_CURRENCY_NAME.to_string(),
            reward_amount: DEFAULT_REWARD_AMOUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user: String,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item: String,
    pub rarity: String,
    pub obtained_at: i64,
}

/// An open prediction market for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub question: String,
    pub options: Vec<String>,
}

impl Poll {
    /// Case-insensitive lookup of an answer among the options; returns the
    /// option as it was declared.
    pub fn find_option(&self, answer: &str) -> Option<&str> {
        let answer = answer.trim();
        self.options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(answer))
            .map(String::as_str)
    }
}
