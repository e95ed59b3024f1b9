use rand::Rng;
use rand::seq::IndexedRandom;

use crate::pick_weighted;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

struct LootTier {
    rarity: Rarity,
    weight: u32,
    items: &'static [&'static str],
}

const LOOT_TABLE: [LootTier; 5] = [
    LootTier {
        rarity: Rarity::Common,
        weight: 60,
        items: &["Shrimp Shell", "Soggy Kelp", "Sea Pebble", "Bent Hook"],
    },
    LootTier {
        rarity: Rarity::Uncommon,
        weight: 25,
        items: &["Golden Krill", "Sand Dollar", "Glass Float"],
    },
    LootTier {
        rarity: Rarity::Rare,
        weight: 10,
        items: &["Black Pearl", "Mantis Claw"],
    },
    LootTier {
        rarity: Rarity::Epic,
        weight: 4,
        items: &["Kraken Ink", "Sunken Compass"],
    },
    LootTier {
        rarity: Rarity::Legendary,
        weight: 1,
        items: &["Crown of the Deep"],
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Loot {
    pub item: &'static str,
    pub rarity: Rarity,
}

/// Rolls one item out of a crate.
pub fn open_crate<R: Rng + ?Sized>(rng: &mut R) -> Loot {
    let tier = pick_weighted(&LOOT_TABLE, |t| t.weight, rng);
    let item = tier.items.choose(rng).copied().unwrap_or("Empty Crate");
    Loot {
        item,
        rarity: tier.rarity,
    }
}
