use serde::{Deserialize, Serialize};

// Every command is a GET with query parameters so chat bots can call it
// through a plain URL fetch. `channel` falls back to the configured default.

// -- Ledger --

#[derive(Debug, Deserialize)]
pub struct AddQuery {
    pub user: String,
    pub amount: i64,
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: String,
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
    pub channel: Option<String>,
}

// -- Games --

/// `wager` stays a string so the literal `all` can be accepted.
#[derive(Debug, Deserialize)]
pub struct WagerQuery {
    pub user: String,
    pub wager: String,
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RobQuery {
    pub robber: String,
    pub victim: String,
    pub channel: Option<String>,
}

// -- Raffle --

#[derive(Debug, Deserialize)]
pub struct RaffleQuery {
    pub amount: i64,
    pub channel: Option<String>,
}

// -- Admin --

#[derive(Debug, Deserialize)]
pub struct SetPointsQuery {
    pub name: String,
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetRewardQuery {
    pub amount: i64,
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GiveAllQuery {
    pub amount: i64,
    pub channel: Option<String>,
}

// -- Prediction market --

/// `raw` is `question | option | option ...`.
#[derive(Debug, Deserialize)]
pub struct PollQuery {
    pub raw: String,
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BetQuery {
    pub user: String,
    pub answer: String,
    pub amount: i64,
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PayupQuery {
    pub answer: String,
    pub channel: Option<String>,
}

// -- Health --

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
}
