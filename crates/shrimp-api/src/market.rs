use axum::extract::{Query, State};
use tracing::info;

use shrimp_db::models::{BetOutcome, PayupOutcome};
use shrimp_types::api::{BetQuery, PayupQuery, PollQuery};
use shrimp_types::input::{normalize_name, parse_poll, positive_amount};

use crate::error::ApiError;
use crate::state::{AppState, db_call};

/// GET /poll?raw=question|a|b&channel=
///
/// Replaces any open poll. Bets on the old poll are refunded.
pub async fn start_poll(
    State(state): State<AppState>,
    Query(query): Query<PollQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let poll = parse_poll(&query.raw)?;

    let ch = channel.clone();
    let stored = poll.clone();
    let refunded = db_call(&state, move |db| db.start_poll(&ch, &stored)).await?;

    info!("#{}: poll '{}' opened ({} bets refunded)", channel, poll.question, refunded);
    let mut text = format!(
        "Poll: {} Options: {}. Bet with !bet <option> <amount>",
        poll.question,
        poll.options.join(" / ")
    );
    if refunded > 0 {
        text.push_str(&format!(" ({} bets from the previous poll were refunded)", refunded));
    }
    Ok(text)
}

/// GET /bet?user=&answer=&amount=&channel=
pub async fn place_bet(
    State(state): State<AppState>,
    Query(query): Query<BetQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let user = normalize_name(&query.user, "user")?;
    let amount = positive_amount(query.amount)?;
    let answer = query.answer;

    let (ch, u) = (channel.clone(), user.clone());
    let (outcome, currency) = db_call(&state, move |db| {
        let outcome = db.place_bet(&ch, &u, &answer, amount)?;
        Ok((outcome, db.get_settings(&ch)?.currency_name))
    })
    .await?;

    let text = match outcome {
        BetOutcome::NoPoll => "There is no poll running right now.".to_string(),
        BetOutcome::UnknownAnswer { options } => {
            format!("{}, pick one of: {}", user, options.join(" / "))
        }
        BetOutcome::InsufficientFunds { balance } => format!(
            "{}, you only have {} {}. Not enough to bet {}.",
            user, balance, currency, amount
        ),
        BetOutcome::Placed { answer, balance, replaced } => {
            let mut text = format!(
                "{} bet {} {} on {}. Balance: {}",
                user, amount, currency, answer, balance
            );
            if let Some(previous) = replaced {
                text.push_str(&format!(" (previous bet of {} refunded)", previous));
            }
            text
        }
    };
    Ok(text)
}

/// GET /payup?answer=&channel=
///
/// Pays 2x to everyone on the winning answer.
pub async fn payup(
    State(state): State<AppState>,
    Query(query): Query<PayupQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let answer = query.answer;

    let ch = channel.clone();
    let (outcome, currency) = db_call(&state, move |db| {
        let outcome = db.payup(&ch, &answer)?;
        Ok((outcome, db.get_settings(&ch)?.currency_name))
    })
    .await?;

    let text = match outcome {
        PayupOutcome::NoPoll => "There is no poll to pay out.".to_string(),
        PayupOutcome::UnknownAnswer { options } => {
            format!("That's not an option. Options were: {}", options.join(" / "))
        }
        PayupOutcome::Settled { answer, winners } if winners.is_empty() => {
            info!("#{}: poll settled on '{}' with no winners", channel, answer);
            format!("{} wins! Nobody bet on it, so no {} paid out.", answer, currency)
        }
        PayupOutcome::Settled { answer, winners } => {
            let total: i64 = winners.iter().map(|(_, prize)| prize).sum();
            info!("#{}: poll settled on '{}', {} winners share {}", channel, answer, winners.len(), total);
            let names: Vec<String> = winners
                .iter()
                .map(|(user, prize)| format!("{} (+{})", user, prize))
                .collect();
            format!("{} wins! Paid out {} {}: {}", answer, total, currency, names.join(", "))
        }
    };
    Ok(text)
}
