//! Fixed-odds paytables for the games that resolve in a single draw.
//!
//! Weights in every table sum to 100 so they read as percentages.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::{Game, Multiplier, Outcome, pick_weighted};

#[derive(Debug)]
pub struct TableEntry {
    pub multiplier: Multiplier,
    pub weight: u32,
    /// Alternative descriptions of how the round went; one is picked at random.
    pub narratives: &'static [&'static str],
}

const fn entry(bp: u32, weight: u32, narratives: &'static [&'static str]) -> TableEntry {
    TableEntry {
        multiplier: Multiplier::from_basis_points(bp),
        weight,
        narratives,
    }
}

pub const COINFLIP: &[TableEntry] = &[
    entry(0, 50, &["the coin landed tails"]),
    entry(20_000, 50, &["the coin landed heads"]),
];

pub const DICE: &[TableEntry] = &[
    entry(0, 55, &["rolled snake eyes", "rolled a 3 against the house's 5", "rolled a 2 and a 4"]),
    entry(15_000, 25, &["rolled a 5 and edged the house"]),
    entry(20_000, 15, &["rolled a 6 and beat the house"]),
    entry(50_000, 5, &["rolled double sixes"]),
];

pub const ROULETTE: &[TableEntry] = &[
    entry(0, 53, &["the ball landed on black", "the ball dropped into green zero"]),
    entry(20_000, 46, &["the ball landed on red"]),
    entry(140_000, 1, &["the ball landed on your lucky number"]),
];

pub const BACCARAT: &[TableEntry] = &[
    entry(0, 45, &["the banker drew a natural 9", "the banker won 7 to 5"]),
    entry(10_000, 10, &["it was a tie, wager returned"]),
    entry(20_000, 44, &["the player hand won 8 to 6"]),
    entry(90_000, 1, &["a tie bet hit on a pair of naturals"]),
];

pub const CRAPS: &[TableEntry] = &[
    entry(0, 50, &["crapped out with a 2", "sevened out before hitting the point"]),
    entry(20_000, 45, &["hit the point", "rolled a natural 7 on the come out"]),
    entry(40_000, 5, &["hit a hard eight"]),
];

pub const KENO: &[TableEntry] = &[
    entry(0, 70, &["matched 1 of 10 numbers", "matched nothing on the board"]),
    entry(10_000, 15, &["matched 4 of 10 numbers, wager returned"]),
    entry(30_000, 10, &["matched 6 of 10 numbers"]),
    entry(100_000, 5, &["matched 8 of 10 numbers"]),
];

pub const VIDEO_POKER: &[TableEntry] = &[
    entry(0, 55, &["drew nothing but high cards", "missed the flush draw"]),
    entry(10_000, 21, &["held jacks or better, wager returned"]),
    entry(20_000, 13, &["drew two pair"]),
    entry(30_000, 7, &["drew three of a kind"]),
    entry(50_000, 3, &["drew a straight", "drew a flush"]),
    entry(250_000, 1, &["drew four of a kind"]),
];

pub const HI_LO: &[TableEntry] = &[
    entry(0, 48, &["called higher and a 4 came up", "called lower and a queen came up"]),
    entry(10_000, 4, &["the next card matched, wager returned"]),
    entry(20_000, 48, &["called it right"]),
];

/// Paytable for a single-draw game. Blackjack and slots have their own
/// modules and fall back to the coinflip table here.
pub fn table_for(game: Game) -> &'static [TableEntry] {
    match game {
        Game::Coinflip => COINFLIP,
        Game::Dice => DICE,
        Game::Roulette => ROULETTE,
        Game::Baccarat => BACCARAT,
        Game::Craps => CRAPS,
        Game::Keno => KENO,
        Game::VideoPoker => VIDEO_POKER,
        Game::HiLo => HI_LO,
        Game::Blackjack | Game::Slots => COINFLIP,
    }
}

pub fn play_table<R: Rng + ?Sized>(game: Game, rng: &mut R) -> Outcome {
    let entry = pick_weighted(table_for(game), |e| e.weight, rng);
    let narrative = entry.narratives.choose(rng).copied().unwrap_or(game.name());

    Outcome {
        game,
        multiplier: entry.multiplier,
        narrative: narrative.to_string(),
    }
}
