//! Game engine for the points economy.
//!
//! Every game maps a random source to a payout multiplier and a short
//! narrative. Nothing here touches balances: callers debit the wager and
//! credit `multiplier.payout(wager)`.

pub mod blackjack;
pub mod loot;
pub mod slots;
pub mod tables;

use rand::Rng;

/// 1.0x expressed in basis points.
pub const BASIS_POINTS: u32 = 10_000;

/// Payout factor in basis points (10_000 = 1x).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Multiplier(u32);

impl Multiplier {
    pub const LOSS: Multiplier = Multiplier(0);
    pub const PUSH: Multiplier = Multiplier(BASIS_POINTS);
    pub const DOUBLE: Multiplier = Multiplier(2 * BASIS_POINTS);

    pub const fn from_basis_points(bp: u32) -> Self {
        Multiplier(bp)
    }

    pub const fn times(whole: u32) -> Self {
        Multiplier(whole * BASIS_POINTS)
    }

    pub const fn basis_points(self) -> u32 {
        self.0
    }

    /// floor(wager * multiplier), saturating at `i64::MAX`.
    pub fn payout(self, wager: i64) -> i64 {
        let raw = i128::from(wager) * i128::from(self.0) / i128::from(BASIS_POINTS);
        i64::try_from(raw).unwrap_or(i64::MAX)
    }
}

impl std::fmt::Display for Multiplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / BASIS_POINTS;
        let frac = self.0 % BASIS_POINTS;
        if frac == 0 {
            write!(f, "{}x", whole)
        } else {
            let frac = format!("{:04}", frac);
            write!(f, "{}.{}x", whole, frac.trim_end_matches('0'))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Game {
    Coinflip,
    Dice,
    Roulette,
    Blackjack,
    Baccarat,
    Craps,
    Keno,
    VideoPoker,
    HiLo,
    Slots,
}

impl Game {
    pub const ALL: [Game; 10] = [
        Game::Coinflip,
        Game::Dice,
        Game::Roulette,
        Game::Blackjack,
        Game::Baccarat,
        Game::Craps,
        Game::Keno,
        Game::VideoPoker,
        Game::HiLo,
        Game::Slots,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Game::Coinflip => "coinflip",
            Game::Dice => "dice",
            Game::Roulette => "roulette",
            Game::Blackjack => "blackjack",
            Game::Baccarat => "baccarat",
            Game::Craps => "craps",
            Game::Keno => "keno",
            Game::VideoPoker => "video poker",
            Game::HiLo => "hi-lo",
            Game::Slots => "slots",
        }
    }

    /// Every multiplier this game can produce.
    pub fn multipliers(self) -> Vec<Multiplier> {
        match self {
            Game::Blackjack => vec![Multiplier::LOSS, Multiplier::PUSH, Multiplier::DOUBLE],
            Game::Slots => slots::PAYTABLE.iter().map(|t| t.multiplier).collect(),
            table_game => tables::table_for(table_game)
                .iter()
                .map(|e| e.multiplier)
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub game: Game,
    pub multiplier: Multiplier,
    pub narrative: String,
}

/// Plays one round of `game`.
pub fn play<R: Rng + ?Sized>(game: Game, rng: &mut R) -> Outcome {
    match game {
        Game::Blackjack => blackjack::play(rng).into_outcome(),
        Game::Slots => slots::spin(rng),
        table_game => tables::play_table(table_game, rng),
    }
}

/// Weight of each sub-game in the `gamble` command.
pub const GAMBLE_ENSEMBLE: [(Game, u32); 9] = [
    (Game::Coinflip, 20),
    (Game::Dice, 15),
    (Game::Roulette, 15),
    (Game::Blackjack, 10),
    (Game::Baccarat, 10),
    (Game::Craps, 10),
    (Game::VideoPoker, 10),
    (Game::Keno, 5),
    (Game::HiLo, 5),
];

/// Picks a sub-game from [`GAMBLE_ENSEMBLE`] and plays it.
pub fn gamble<R: Rng + ?Sized>(rng: &mut R) -> Outcome {
    let (game, _) = *pick_weighted(&GAMBLE_ENSEMBLE, |(_, w)| *w, rng);
    play(game, rng)
}

/// Draws one item with probability weight(item) / sum(weights).
/// `items` must be non-empty with a positive total weight.
pub(crate) fn pick_weighted<'a, T, R, W>(items: &'a [T], weight: W, rng: &mut R) -> &'a T
where
    R: Rng + ?Sized,
    W: Fn(&T) -> u32,
{
    let total: u32 = items.iter().map(&weight).sum();
    let mut roll = rng.random_range(0..total);
    for item in items {
        let w = weight(item);
        if roll < w {
            return item;
        }
        roll -= w;
    }
    &items[items.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn payout_floors() {
        assert_eq!(Multiplier::times(2).payout(50), 100);
        assert_eq!(Multiplier::LOSS.payout(50), 0);
        assert_eq!(Multiplier::PUSH.payout(37), 37);
        assert_eq!(Multiplier::from_basis_points(15_000).payout(3), 4);
        assert_eq!(Multiplier::times(25).payout(i64::MAX), i64::MAX);
    }

    #[test]
    fn multiplier_display() {
        assert_eq!(Multiplier::times(2).to_string(), "2x");
        assert_eq!(Multiplier::from_basis_points(15_000).to_string(), "1.5x");
        assert_eq!(Multiplier::from_basis_points(19_500).to_string(), "1.95x");
    }

    #[test]
    fn every_game_stays_on_its_paytable() {
        let mut rng = StdRng::seed_from_u64(7);
        for game in Game::ALL {
            let declared = game.multipliers();
            for _ in 0..500 {
                let outcome = play(game, &mut rng);
                assert_eq!(outcome.game, game);
                assert!(
                    declared.contains(&outcome.multiplier),
                    "{} produced undeclared {}",
                    game.name(),
                    outcome.multiplier
                );
                assert!(!outcome.narrative.is_empty());
            }
        }
    }

    #[test]
    fn gamble_only_picks_ensemble_games() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2_000 {
            let outcome = gamble(&mut rng);
            assert_ne!(outcome.game, Game::Slots);
            seen.insert(outcome.game);
        }
        assert_eq!(seen.len(), GAMBLE_ENSEMBLE.len());
    }

    #[test]
    fn pick_weighted_skips_zero_weights() {
        let items = [("never", 0), ("always", 3)];
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(pick_weighted(&items, |(_, w)| *w, &mut rng).0, "always");
        }
    }
}
