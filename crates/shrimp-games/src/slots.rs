use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::{Game, Multiplier, Outcome, pick_weighted};

/// Symbols on each reel.
pub const SYMBOLS: [&str; 6] = ["🦐", "🦀", "🐟", "🐙", "🐚", "💎"];

#[derive(Debug)]
pub struct SlotTier {
    pub multiplier: Multiplier,
    pub weight: u32,
    /// Symbol shown three times for a winning line; `None` for a miss or a pair.
    pub triple: Option<&'static str>,
}

pub const PAYTABLE: [SlotTier; 6] = [
    SlotTier { multiplier: Multiplier::LOSS, weight: 50, triple: None },
    SlotTier { multiplier: Multiplier::PUSH, weight: 20, triple: None },
    SlotTier { multiplier: Multiplier::times(2), weight: 15, triple: Some("🐚") },
    SlotTier { multiplier: Multiplier::times(5), weight: 10, triple: Some("🐟") },
    SlotTier { multiplier: Multiplier::times(10), weight: 4, triple: Some("🦀") },
    SlotTier { multiplier: Multiplier::times(20), weight: 1, triple: Some("🦐") },
];

pub fn spin<R: Rng + ?Sized>(rng: &mut R) -> Outcome {
    let tier = pick_weighted(&PAYTABLE, |t| t.weight, rng);
    let reels = reels_for(tier, rng);

    let verdict = match tier.triple {
        Some("🦐") => "JACKPOT",
        Some(_) => "three of a kind",
        None if tier.multiplier == Multiplier::PUSH => "a pair, wager returned",
        None => "no match",
    };

    Outcome {
        game: Game::Slots,
        multiplier: tier.multiplier,
        narrative: format!("[ {} ] {}", reels.join(" | "), verdict),
    }
}

/// Lays out reels consistent with the tier that was drawn.
fn reels_for<R: Rng + ?Sized>(tier: &SlotTier, rng: &mut R) -> Vec<&'static str> {
    if let Some(symbol) = tier.triple {
        return vec![symbol; 3];
    }

    if tier.multiplier == Multiplier::PUSH {
        let picked: Vec<&str> = SYMBOLS.choose_multiple(rng, 2).copied().collect();
        let mut reels = vec![picked[0], picked[0], picked[1]];
        reels.shuffle(rng);
        return reels;
    }

    SYMBOLS.choose_multiple(rng, 3).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn paytable_matches_published_odds() {
        let total: u32 = PAYTABLE.iter().map(|t| t.weight).sum();
        assert_eq!(total, 100);
        let odds: Vec<(u32, u32)> = PAYTABLE
            .iter()
            .map(|t| (t.multiplier.basis_points() / crate::BASIS_POINTS, t.weight))
            .collect();
        assert_eq!(odds, vec![(0, 50), (1, 20), (2, 15), (5, 10), (10, 4), (20, 1)]);
    }

    #[test]
    fn reels_agree_with_result() {
        let mut rng = StdRng::seed_from_u64(3);
        for tier in &PAYTABLE {
            let reels = reels_for(tier, &mut rng);
            assert_eq!(reels.len(), 3);
            let distinct: std::collections::HashSet<_> = reels.iter().collect();
            match (tier.triple, tier.multiplier) {
                (Some(_), _) => assert_eq!(distinct.len(), 1),
                (None, Multiplier::PUSH) => assert_eq!(distinct.len(), 2),
                (None, _) => assert_eq!(distinct.len(), 3),
            }
        }
    }
}
