use axum::extract::{Query, State};
use tracing::info;

use shrimp_db::models::CrateOutcome;
use shrimp_types::api::UserQuery;
use shrimp_types::input::normalize_name;

use crate::error::ApiError;
use crate::state::{AppState, db_call, now};

/// GET /open?user=&channel=
///
/// Buy and open one crate.
pub async fn open_crate(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let user = normalize_name(&query.user, "user")?;
    let cost = state.economy.crate_cost;

    let loot = shrimp_games::loot::open_crate(&mut rand::rng());

    let (ch, u) = (channel.clone(), user.clone());
    let (outcome, currency) = db_call(&state, move |db| {
        let outcome = db.open_crate(&ch, &u, cost, loot.item, loot.rarity.as_str(), now())?;
        Ok((outcome, db.get_settings(&ch)?.currency_name))
    })
    .await?;

    let text = match outcome {
        CrateOutcome::InsufficientFunds { balance } => format!(
            "{}, a crate costs {} {} and you have {}.",
            user, cost, currency, balance
        ),
        CrateOutcome::Opened { balance } => {
            info!("#{}: {} opened a crate: {} ({})", channel, user, loot.item, loot.rarity.as_str());
            format!(
                "{} opened a crate and found a {} {}! Balance: {} {}",
                user,
                loot.rarity.as_str(),
                loot.item,
                balance,
                currency
            )
        }
    };
    Ok(text)
}

/// GET /inventory?user=&channel=
pub async fn inventory(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let user = normalize_name(&query.user, "user")?;

    let u = user.clone();
    let items = db_call(&state, move |db| db.get_inventory(&channel, &u)).await?;

    if items.is_empty() {
        return Ok(format!("{} hasn't found anything yet.", user));
    }

    // Newest first, duplicates folded into a count
    let mut counted: Vec<(&str, &str, usize)> = Vec::new();
    for item in &items {
        match counted.iter_mut().find(|(name, _, _)| *name == item.item) {
            Some((_, _, count)) => *count += 1,
            None => counted.push((&item.item, &item.rarity, 1)),
        }
    }

    let listed: Vec<String> = counted
        .iter()
        .map(|(name, rarity, count)| match count {
            1 => format!("{} ({})", name, rarity),
            n => format!("{} x{} ({})", name, n, rarity),
        })
        .collect();
    Ok(format!("{}'s items: {}", user, listed.join(", ")))
}
