//! HTTP command handlers for the shrimp economy. Every route is a GET with
//! query parameters and answers with a plain-text line a chat bot can relay
//! as-is.

pub mod error;
pub mod games;
pub mod inventory;
pub mod ledger;
pub mod loops;
pub mod market;
pub mod raffle;
pub mod rob;
pub mod state;

use axum::{Router, routing::get};

pub use state::{AppState, AppStateInner, EconomyConfig};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ledger::ping))
        // Ledger
        .route("/add", get(ledger::add_points))
        .route("/points", get(ledger::get_points))
        .route("/leaderboard", get(ledger::leaderboard))
        .route("/setpoints", get(ledger::set_currency_name))
        .route("/setreward", get(ledger::set_reward))
        .route("/giveall", get(ledger::give_all))
        // Games
        .route("/gamble", get(games::gamble))
        .route("/slots", get(games::slots))
        .route("/blackjack", get(games::blackjack))
        .route("/coinflip", get(games::coinflip))
        .route("/dice", get(games::dice))
        .route("/roulette", get(games::roulette))
        .route("/baccarat", get(games::baccarat))
        .route("/craps", get(games::craps))
        .route("/keno", get(games::keno))
        .route("/videopoker", get(games::video_poker))
        .route("/hilo", get(games::hilo))
        // Social
        .route("/rob", get(rob::rob))
        .route("/raffle", get(raffle::start_raffle))
        .route("/join", get(raffle::join_raffle))
        .route("/open", get(inventory::open_crate))
        .route("/inventory", get(inventory::inventory))
        .route("/poll", get(market::start_poll))
        .route("/bet", get(market::place_bet))
        .route("/payup", get(market::payup))
        .with_state(state)
}
