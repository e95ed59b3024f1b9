//! Blackjack-lite: infinite deck, no splits or doubles, both sides draw to 17.

use rand::Rng;

use crate::{Game, Multiplier, Outcome};

/// Card values drawn with equal probability. 11 is a soft ace.
pub const CARD_VALUES: [u8; 13] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10, 11];

const STAND_ON: u8 = 17;
const BLACKJACK: u8 = 21;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hand {
    pub cards: Vec<u8>,
}

impl Hand {
    /// Best total: soft aces count 11 until that would bust, then 1.
    pub fn total(&self) -> u8 {
        let mut total: u16 = self.cards.iter().map(|&c| u16::from(c)).sum();
        let mut soft_aces = self.cards.iter().filter(|&&c| c == 11).count();
        while total > u16::from(BLACKJACK) && soft_aces > 0 {
            total -= 10;
            soft_aces -= 1;
        }
        total.min(u16::from(u8::MAX)) as u8
    }

    pub fn is_bust(&self) -> bool {
        self.total() > BLACKJACK
    }

    fn draw_to_17(&mut self, next_card: &mut impl FnMut() -> u8) {
        while self.cards.len() < 2 || self.total() < STAND_ON {
            self.cards.push(next_card());
        }
    }

    fn describe(&self) -> String {
        let cards: Vec<String> = self.cards.iter().map(|c| c.to_string()).collect();
        format!("{} ({})", self.total(), cards.join(", "))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlackjackResult {
    PlayerBust,
    DealerBust,
    PlayerHigher,
    Push,
    DealerHigher,
}

impl BlackjackResult {
    pub fn multiplier(self) -> Multiplier {
        match self {
            BlackjackResult::PlayerBust | BlackjackResult::DealerHigher => Multiplier::LOSS,
            BlackjackResult::Push => Multiplier::PUSH,
            BlackjackResult::DealerBust | BlackjackResult::PlayerHigher => Multiplier::DOUBLE,
        }
    }
}

/// Player bust loses before the dealer's hand matters.
pub fn resolve(player: &Hand, dealer: &Hand) -> BlackjackResult {
    if player.is_bust() {
        return BlackjackResult::PlayerBust;
    }
    if dealer.is_bust() {
        return BlackjackResult::DealerBust;
    }
    match player.total().cmp(&dealer.total()) {
        std::cmp::Ordering::Greater => BlackjackResult::PlayerHigher,
        std::cmp::Ordering::Equal => BlackjackResult::Push,
        std::cmp::Ordering::Less => BlackjackResult::DealerHigher,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlackjackRound {
    pub player: Hand,
    pub dealer: Hand,
    pub result: BlackjackResult,
}

impl BlackjackRound {
    pub fn into_outcome(self) -> Outcome {
        let narrative = match self.result {
            BlackjackResult::PlayerBust => format!("busted with {}", self.player.describe()),
            BlackjackResult::DealerBust => format!(
                "stood on {} and the dealer busted with {}",
                self.player.describe(),
                self.dealer.describe()
            ),
            BlackjackResult::PlayerHigher => format!(
                "beat the dealer {} to {}",
                self.player.describe(),
                self.dealer.describe()
            ),
            BlackjackResult::Push => format!(
                "pushed with the dealer at {}, wager returned",
                self.player.total()
            ),
            BlackjackResult::DealerHigher => format!(
                "lost {} to the dealer's {}",
                self.player.describe(),
                self.dealer.describe()
            ),
        };

        Outcome {
            game: Game::Blackjack,
            multiplier: self.result.multiplier(),
            narrative,
        }
    }
}

/// Deals a full round from `next_card`. The dealer always plays out its hand.
pub fn deal(mut next_card: impl FnMut() -> u8) -> BlackjackRound {
    let mut player = Hand::default();
    let mut dealer = Hand::default();

    player.draw_to_17(&mut next_card);
    dealer.draw_to_17(&mut next_card);

    let result = resolve(&player, &dealer);
    BlackjackRound { player, dealer, result }
}

pub fn play<R: Rng + ?Sized>(rng: &mut R) -> BlackjackRound {
    deal(|| CARD_VALUES[rng.random_range(0..CARD_VALUES.len())])
}
