use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use axum::extract::{Query, State};
use rand::Rng;
use rand::seq::IndexedRandom;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use shrimp_chat::ChatError;
use shrimp_types::api::{RaffleQuery, UserQuery};
use shrimp_types::input::{normalize_name, positive_amount};

use crate::error::ApiError;
use crate::state::{AppState, db_call};

pub const MAX_WINNERS: usize = 3;

/// `start` found a raffle already running in the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyActive {
    pub pot: i64,
}

/// `join` found no raffle running in the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotActive;

#[derive(Debug)]
struct ActiveRaffle {
    generation: u64,
    pot: i64,
    participants: BTreeSet<String>,
}

#[derive(Default)]
struct SessionsInner {
    next_generation: u64,
    active: HashMap<String, ActiveRaffle>,
}

/// A raffle that was just closed by its timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedRaffle {
    pub pot: i64,
    pub participants: Vec<String>,
}

/// Per-channel raffle state. A channel is idle when it has no entry.
#[derive(Clone, Default)]
pub struct RaffleSessions {
    inner: Arc<Mutex<SessionsInner>>,
}

impl RaffleSessions {
    /// idle -> active. Returns the generation the closing timer must present.
    pub async fn start(&self, channel: &str, pot: i64) -> Result<u64, AlreadyActive> {
        let mut inner = self.inner.lock().await;
        if let Some(active) = inner.active.get(channel) {
            return Err(AlreadyActive { pot: active.pot });
        }

        inner.next_generation += 1;
        let generation = inner.next_generation;
        inner.active.insert(
            channel.to_string(),
            ActiveRaffle {
                generation,
                pot,
                participants: BTreeSet::new(),
            },
        );
        Ok(generation)
    }

    /// Returns `false` when the user had already joined.
    pub async fn join(&self, channel: &str, user: &str) -> Result<(i64, bool), NotActive> {
        let mut inner = self.inner.lock().await;
        let active = inner.active.get_mut(channel).ok_or(NotActive)?;
        let added = active.participants.insert(user.to_string());
        Ok((active.pot, added))
    }

    /// active -> idle, only for the raffle identified by `generation`.
    pub async fn close(&self, channel: &str, generation: u64) -> Option<ClosedRaffle> {
        let mut inner = self.inner.lock().await;
        if inner.active.get(channel)?.generation != generation {
            return None;
        }
        let raffle = inner.active.remove(channel)?;
        Some(ClosedRaffle {
            pot: raffle.pot,
            participants: raffle.participants.into_iter().collect(),
        })
    }

    pub async fn is_active(&self, channel: &str) -> bool {
        self.inner.lock().await.active.contains_key(channel)
    }
}

/// Up to [`MAX_WINNERS`] distinct participants and the even share each gets.
/// Never more winners than points in the pot, so every share is at least 1.
/// The remainder of the division is not paid out.
pub fn pick_winners<R: Rng + ?Sized>(raffle: &ClosedRaffle, rng: &mut R) -> (Vec<String>, i64) {
    let seats = usize::try_from(raffle.pot).unwrap_or(0).min(MAX_WINNERS);
    let winners: Vec<String> = raffle
        .participants
        .choose_multiple(rng, seats)
        .cloned()
        .collect();
    if winners.is_empty() {
        return (winners, 0);
    }
    let share = raffle.pot / winners.len() as i64;
    (winners, share)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaffleResult {
    /// Another timer already closed this raffle.
    Stale,
    NoEntrants,
    Paid { winners: Vec<String>, share: i64 },
}

/// Called by the raffle timer: closes the raffle, pays winners, and announces
/// the result in chat on a best-effort basis.
pub async fn finish_raffle(
    state: &AppState,
    channel: &str,
    generation: u64,
) -> Result<RaffleResult, ApiError> {
    let Some(closed) = state.raffles.close(channel, generation).await else {
        return Ok(RaffleResult::Stale);
    };

    let (winners, share) = {
        let mut rng = rand::rng();
        pick_winners(&closed, &mut rng)
    };

    let ch = channel.to_string();
    let paid = winners.clone();
    let currency = db_call(state, move |db| {
        db.credit_many(&ch, &paid, share)?;
        Ok(db.get_settings(&ch)?.currency_name)
    })
    .await?;

    let (result, text) = if winners.is_empty() {
        (
            RaffleResult::NoEntrants,
            format!("The raffle for {} {} ended with no entrants. No winners!", closed.pot, currency),
        )
    } else {
        let text = format!(
            "Raffle over! {} each won {} {}!",
            winners.join(", "),
            share,
            currency
        );
        (RaffleResult::Paid { winners, share }, text)
    };

    info!("#{} {}", channel, text);
    match state.chat.announce(channel, &text).await {
        Ok(()) => {}
        Err(ChatError::Anonymous) => debug!("Raffle announcement skipped: chat is anonymous"),
        Err(e) => warn!("Raffle announcement failed in #{}: {}", channel, e),
    }

    Ok(result)
}

/// GET /raffle?amount=&channel=
pub async fn start_raffle(
    State(state): State<AppState>,
    Query(query): Query<RaffleQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let pot = positive_amount(query.amount)?;

    let ch = channel.clone();
    let currency = db_call(&state, move |db| Ok(db.get_settings(&ch)?.currency_name)).await?;

    let generation = match state.raffles.start(&channel, pot).await {
        Ok(generation) => generation,
        Err(AlreadyActive { pot }) => {
            return Ok(format!("A raffle for {} {} is already running!", pot, currency));
        }
    };

    let window = state.economy.raffle_window;
    let timer_state = state.clone();
    let timer_channel = channel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(window).await;
        if let Err(e) = finish_raffle(&timer_state, &timer_channel, generation).await {
            warn!("Raffle in #{} failed to settle: {}", timer_channel, e);
        }
    });

    info!("Raffle started in #{} for {}", channel, pot);
    Ok(format!(
        "A raffle for {} {} has started! Type !join in the next {} seconds to enter.",
        pot,
        currency,
        window.as_secs()
    ))
}

/// GET /join?user=&channel=
pub async fn join_raffle(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let user = normalize_name(&query.user, "user")?;

    let text = match state.raffles.join(&channel, &user).await {
        Ok((_, true)) => format!("{} joined the raffle!", user),
        Ok((_, false)) => format!("{}, you're already in the raffle.", user),
        Err(NotActive) => "There is no raffle running right now.".to_string(),
    };
    Ok(text)
}
