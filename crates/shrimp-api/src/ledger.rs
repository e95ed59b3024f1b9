use axum::{
    Json,
    extract::{Query, State},
};
use tracing::{info, warn};

use shrimp_types::api::{
    AddQuery, GiveAllQuery, LeaderboardQuery, PingResponse, SetPointsQuery, SetRewardQuery,
    UserQuery,
};
use shrimp_types::input::{normalize_name, positive_amount};

use crate::error::ApiError;
use crate::state::{AppState, db_call};

const DEFAULT_LEADERBOARD_SIZE: i64 = 10;
const MAX_LEADERBOARD_SIZE: i64 = 25;
const MAX_CURRENCY_NAME_LEN: usize = 32;

/// GET /ping
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok".to_string(),
    })
}

/// GET /add?user=&amount=&channel=
pub async fn add_points(
    State(state): State<AppState>,
    Query(query): Query<AddQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let user = normalize_name(&query.user, "user")?;
    let amount = positive_amount(query.amount)?;

    let (ch, u) = (channel.clone(), user.clone());
    let (balance, currency) = db_call(&state, move |db| {
        let balance = db.apply_delta(&ch, &u, amount)?;
        Ok((balance, db.get_settings(&ch)?.currency_name))
    })
    .await?;

    info!("#{}: added {} to {} (now {})", channel, amount, user, balance);
    Ok(format!("{} now has {} {}.", user, balance, currency))
}

/// GET /points?user=&channel=
pub async fn get_points(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let user = normalize_name(&query.user, "user")?;

    let u = user.clone();
    let (balance, currency) = db_call(&state, move |db| {
        Ok((db.get_balance(&channel, &u)?, db.get_settings(&channel)?.currency_name))
    })
    .await?;

    Ok(format!("{} has {} {}.", user, balance, currency))
}

/// GET /leaderboard?limit=&channel=
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_SIZE);
    if limit <= 0 {
        return Err(ApiError::BadRequest("Limit must be positive".to_string()));
    }
    let limit = limit.min(MAX_LEADERBOARD_SIZE) as u32;

    let ch = channel.clone();
    let (board, currency) = db_call(&state, move |db| {
        Ok((db.leaderboard(&ch, limit)?, db.get_settings(&ch)?.currency_name))
    })
    .await?;

    if board.is_empty() {
        return Ok(format!("Nobody in {} has any {} yet.", channel, currency));
    }

    let ranks: Vec<String> = board
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}. {} ({})", i + 1, entry.user, entry.points))
        .collect();
    Ok(format!("Top {} {} holders: {}", board.len(), currency, ranks.join(", ")))
}

/// GET /setpoints?name=&channel=
pub async fn set_currency_name(
    State(state): State<AppState>,
    Query(query): Query<SetPointsQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let name = query.name.trim().to_string();
    if name.is_empty() || name.chars().count() > MAX_CURRENCY_NAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "Currency name must be 1 to {} characters",
            MAX_CURRENCY_NAME_LEN
        )));
    }

    let ch = channel.clone();
    let settings = db_call(&state, move |db| db.set_currency_name(&ch, &name)).await?;

    info!("#{}: currency renamed to {}", channel, settings.currency_name);
    Ok(format!("Points in {} are now called {}.", channel, settings.currency_name))
}

/// GET /setreward?amount=&channel=
pub async fn set_reward(
    State(state): State<AppState>,
    Query(query): Query<SetRewardQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    if query.amount < 0 {
        return Err(ApiError::BadRequest("Reward can't be negative".to_string()));
    }

    let ch = channel.clone();
    let amount = query.amount;
    let settings = db_call(&state, move |db| db.set_reward_amount(&ch, amount)).await?;

    info!("#{}: reward set to {}", channel, settings.reward_amount);
    Ok(format!(
        "Chatters in {} now earn {} {} every payout.",
        channel, settings.reward_amount, settings.currency_name
    ))
}

/// GET /giveall?amount=&channel=
///
/// Credits everyone currently in chat.
pub async fn give_all(
    State(state): State<AppState>,
    Query(query): Query<GiveAllQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let amount = positive_amount(query.amount)?;

    let chatters = state.chat.fetch_chatters(&channel).await.map_err(|e| {
        warn!("giveall in #{}: chatter fetch failed: {}", channel, e);
        ApiError::Unavailable("Couldn't reach chat to see who's here. Try again soon.".to_string())
    })?;
    let chatters: Vec<String> = chatters.into_iter().collect();

    let ch = channel.clone();
    let (count, currency) = db_call(&state, move |db| {
        let count = db.credit_many(&ch, &chatters, amount)?;
        Ok((count, db.get_settings(&ch)?.currency_name))
    })
    .await?;

    info!("#{}: gave {} to {} chatters", channel, amount, count);
    Ok(format!("Gave {} {} to {} chatters!", amount, currency, count))
}
