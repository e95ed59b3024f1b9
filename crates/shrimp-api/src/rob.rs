use axum::extract::{Query, State};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::info;

use shrimp_db::models::RobOutcome;
use shrimp_types::api::RobQuery;
use shrimp_types::input::normalize_name;

use crate::error::ApiError;
use crate::state::{AppState, db_call, now};

const ROB_TEMPLATES: &[&str] = &[
    "{robber} picked {victim}'s pocket and got away with {amount} {currency}!",
    "{robber} ambushed {victim} behind the bait shop and took {amount} {currency}!",
    "{robber} distracted {victim} with a shiny lure and swiped {amount} {currency}!",
    "{robber} cracked {victim}'s treasure chest and found {amount} {currency}!",
];

/// A steal amount between 10% and 50% of the victim's balance, at least 1.
pub fn steal_amount<R: Rng + ?Sized>(victim_balance: i64, rng: &mut R) -> i64 {
    let low = (victim_balance / 10).max(1);
    let high = (victim_balance / 2).max(low);
    rng.random_range(low..=high)
}

fn render(template: &str, robber: &str, victim: &str, amount: i64, currency: &str) -> String {
    template
        .replace("{robber}", robber)
        .replace("{victim}", victim)
        .replace("{amount}", &amount.to_string())
        .replace("{currency}", currency)
}

/// GET /rob?robber=&victim=&channel=
pub async fn rob(
    State(state): State<AppState>,
    Query(query): Query<RobQuery>,
) -> Result<String, ApiError> {
    let channel = state.channel(query.channel.as_deref())?;
    let robber = normalize_name(&query.robber, "robber")?;
    let victim = normalize_name(&query.victim, "victim")?;

    if robber == victim {
        return Ok(format!("{}, you can't rob yourself.", robber));
    }

    let cooldown = state.economy.rob_cooldown.as_secs() as i64;
    let (ch, r, v) = (channel.clone(), robber.clone(), victim.clone());
    let (outcome, currency) = db_call(&state, move |db| {
        let currency = db.get_settings(&ch)?.currency_name;
        let outcome = db.rob(&ch, &r, &v, now(), cooldown, |balance| {
            steal_amount(balance, &mut rand::rng())
        })?;
        Ok((outcome, currency))
    })
    .await?;

    let text = match outcome {
        RobOutcome::Cooldown { remaining_secs } => format!(
            "{}, lay low for another {}s before going after {} again.",
            robber, remaining_secs, victim
        ),
        RobOutcome::VictimBroke => {
            format!("{} doesn't have any {} worth stealing.", victim, currency)
        }
        RobOutcome::Stolen { amount, .. } => {
            info!("#{}: {} robbed {} of {}", channel, robber, victim, amount);
            let template = ROB_TEMPLATES
                .choose(&mut rand::rng())
                .copied()
                .unwrap_or(ROB_TEMPLATES[0]);
            render(template, &robber, &victim, amount, &currency)
        }
    };

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn steal_amount_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for balance in [1, 2, 9, 10, 55, 1_000, 123_456] {
            for _ in 0..200 {
                let amount = steal_amount(balance, &mut rng);
                assert!(amount >= 1);
                assert!(amount >= balance / 10);
                assert!(amount <= (balance / 2).max(1));
            }
        }
    }

    #[test]
    fn templates_fill_every_placeholder() {
        for template in ROB_TEMPLATES {
            let text = render(template, "amy", "ben", 12, "shrimp");
            assert!(!text.contains('{'), "{}", text);
            assert!(text.contains("amy") && text.contains("ben") && text.contains("12 shrimp"));
        }
    }
}
