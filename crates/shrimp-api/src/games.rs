use std::cmp::Ordering;

use axum::extract::{Query, State};
use tracing::debug;

use shrimp_games::{Game, Outcome};
use shrimp_types::api::WagerQuery;
use shrimp_types::input::{Wager, normalize_name};

use crate::error::ApiError;
use crate::state::{AppState, db_call};

#[derive(Debug)]
enum Settlement {
    NothingToWager,
    Insufficient { wager: i64, balance: i64 },
    Settled { wager: i64, payout: i64, balance: i64 },
}

/// Shared flow for every wager command. The outcome is rolled first, then
/// the wager and payout are applied in one transaction, then the result is
/// held back for the reveal delay.
async fn play_wager(
    state: &AppState,
    query: WagerQuery,
    game: Option<Game>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let user = normalize_name(&query.user, "user")?;
    let wager: Wager = query.wager.parse()?;

    let outcome = {
        let mut rng = rand::rng();
        match game {
            Some(game) => shrimp_games::play(game, &mut rng),
            None => shrimp_games::gamble(&mut rng),
        }
    };

    let (ch, u, multiplier) = (channel.clone(), user.clone(), outcome.multiplier);
    let (settlement, currency) = db_call(state, move |db| {
        let currency = db.get_settings(&ch)?.currency_name;
        let balance = db.get_balance(&ch, &u)?;
        let amount = wager.resolve(balance);
        if amount <= 0 {
            return Ok((Settlement::NothingToWager, currency));
        }

        let payout = multiplier.payout(amount);
        let settlement = match db.settle_wager(&ch, &u, amount, payout)? {
            Some(balance) => Settlement::Settled { wager: amount, payout, balance },
            None => Settlement::Insufficient { wager: amount, balance },
        };
        Ok((settlement, currency))
    })
    .await?;

    match settlement {
        Settlement::NothingToWager => {
            Ok(format!("{}, you don't have any {} to wager.", user, currency))
        }
        Settlement::Insufficient { wager, balance } => Ok(format!(
            "{}, you only have {} {}. Not enough to wager {}.",
            user, balance, currency, wager
        )),
        Settlement::Settled { wager, payout, balance } => {
            debug!(
                "#{} {} {}: wager {} payout {} ({})",
                channel,
                user,
                outcome.game.name(),
                wager,
                payout,
                outcome.multiplier
            );
            tokio::time::sleep(state.economy.reveal_delay).await;
            Ok(describe(&user, &outcome, wager, payout, balance, &currency))
        }
    }
}

fn describe(
    user: &str,
    outcome: &Outcome,
    wager: i64,
    payout: i64,
    balance: i64,
    currency: &str,
) -> String {
    let head = format!("[{}] {}: {}", outcome.game.name(), user, outcome.narrative);
    match payout.cmp(&wager) {
        Ordering::Greater => format!(
            "{} and won {} {} ({})! Balance: {}",
            head,
            payout - wager,
            currency,
            outcome.multiplier,
            balance
        ),
        Ordering::Equal => format!("{}. Balance: {} {}", head, balance, currency),
        Ordering::Less => format!(
            "{} and lost {} {}. Balance: {}",
            head,
            wager - payout,
            currency,
            balance
        ),
    }
}

/// GET /gamble?user=&wager=&channel=
///
/// A random game from the ensemble.
pub async fn gamble(
    State(state): State<AppState>,
    Query(query): Query<WagerQuery>,
) -> Result<String, ApiError> {
    play_wager(&state, query, None).await
}

/// GET /slots?user=&wager=&channel=
pub async fn slots(
    State(state): State<AppState>,
    Query(query): Query<WagerQuery>,
) -> Result<String, ApiError> {
    play_wager(&state, query, Some(Game::Slots)).await
}

/// GET /blackjack?user=&wager=&channel=
pub async fn blackjack(
    State(state): State<AppState>,
    Query(query): Query<WagerQuery>,
) -> Result<String, ApiError> {
    play_wager(&state, query, Some(Game::Blackjack)).await
}

pub async fn coinflip(
    State(state): State<AppState>,
    Query(query): Query<WagerQuery>,
) -> Result<String, ApiError> {
    play_wager(&state, query, Some(Game::Coinflip)).await
}

pub async fn dice(
    State(state): State<AppState>,
    Query(query): Query<WagerQuery>,
) -> Result<String, ApiError> {
    play_wager(&state, query, Some(Game::Dice)).await
}

pub async fn roulette(
    State(state): State<AppState>,
    Query(query): Query<WagerQuery>,
) -> Result<String, ApiError> {
    play_wager(&state, query, Some(Game::Roulette)).await
}

pub async fn baccarat(
    State(state): State<AppState>,
    Query(query): Query<WagerQuery>,
) -> Result<String, ApiError> {
    play_wager(&state, query, Some(Game::Baccarat)).await
}

pub async fn craps(
    State(state): State<AppState>,
    Query(query): Query<WagerQuery>,
) -> Result<String, ApiError> {
    play_wager(&state, query, Some(Game::Craps)).await
}

pub async fn keno(
    State(state): State<AppState>,
    Query(query): Query<WagerQuery>,
) -> Result<String, ApiError> {
    play_wager(&state, query, Some(Game::Keno)).await
}

pub async fn video_poker(
    State(state): State<AppState>,
    Query(query): Query<WagerQuery>,
) -> Result<String, ApiError> {
    play_wager(&state, query, Some(Game::VideoPoker)).await
}

pub async fn hilo(
    State(state): State<AppState>,
    Query(query): Query<WagerQuery>,
) -> Result<String, ApiError> {
    play_wager(&state, query, Some(Game::HiLo)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use shrimp_games::Multiplier;

    fn outcome(multiplier: Multiplier) -> Outcome {
        Outcome {
            game: Game::Slots,
            multiplier,
            narrative: "[ 🐚 | 🐚 | 🐚 ] three of a kind".to_string(),
        }
    }

    #[test]
    fn describes_win_push_and_loss() {
        let win = describe("amy", &outcome(Multiplier::times(2)), 50, 100, 150, "shrimp");
        assert_eq!(
            win,
            "[slots] amy: [ 🐚 | 🐚 | 🐚 ] three of a kind and won 50 shrimp (2x)! Balance: 150"
        );

        let push = describe("amy", &outcome(Multiplier::PUSH), 50, 50, 100, "shrimp");
        assert!(push.ends_with(". Balance: 100 shrimp"));

        let loss = describe("amy", &outcome(Multiplier::LOSS), 50, 0, 50, "shrimp");
        assert!(loss.ends_with("and lost 50 shrimp. Balance: 50"));
    }
}
