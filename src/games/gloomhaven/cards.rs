//! Character classes and their ability cards.

use serde::{Deserialize, Serialize};

use crate::core::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Half {
    Top,
    Bottom,
}

impl Half {
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Half::Top => "top",
            Half::Bottom => "bottom",
        }
    }
}

/// What one half of a card does. Ranges are Chebyshev distances; a heal
/// with range 0 targets only the caster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Ability {
    Attack { damage: i64, range: i32 },
    Move { distance: i32 },
    Heal { amount: i64, range: i32 },
    Shield { amount: i64 },
    Loot { amount: i64 },
    /// Return up to `cards` lost cards to hand.
    Recover { cards: usize },
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ability::Attack { damage, range: 1 } => write!(f, "Attack {damage}"),
            Ability::Attack { damage, range } => write!(f, "Attack {damage}, Range {range}"),
            Ability::Move { distance } => write!(f, "Move {distance}"),
            Ability::Heal { amount, range: 0 } => write!(f, "Heal {amount}, Self"),
            Ability::Heal { amount, range } => write!(f, "Heal {amount}, Range {range}"),
            Ability::Shield { amount } => write!(f, "Shield {amount}"),
            Ability::Loot { amount } => write!(f, "Loot {amount}"),
            Ability::Recover { cards } => write!(f, "Recover {cards}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityCard {
    pub id: String,
    pub name: String,
    pub initiative: u8,
    pub top: Ability,
    pub bottom: Ability,
}

impl AbilityCard {
    #[must_use]
    pub fn half(&self, half: Half) -> Ability {
        match half {
            Half::Top => self.top,
            Half::Bottom => self.bottom,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    Brute,
    Tinkerer,
    Spellweaver,
    Scoundrel,
}

impl CharacterClass {
    /// Seat defaults when no class is configured.
    pub const ALL: [CharacterClass; 4] = [
        CharacterClass::Brute,
        CharacterClass::Tinkerer,
        CharacterClass::Spellweaver,
        CharacterClass::Scoundrel,
    ];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            CharacterClass::Brute => "brute",
            CharacterClass::Tinkerer => "tinkerer",
            CharacterClass::Spellweaver => "spellweaver",
            CharacterClass::Scoundrel => "scoundrel",
        }
    }

    pub fn parse(class: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == class)
            .ok_or_else(|| ConfigError::UnknownClass {
                game: "gloomhaven".into(),
                class: class.to_string(),
            })
    }

    #[must_use]
    pub const fn max_hp(self) -> i64 {
        match self {
            CharacterClass::Brute => 10,
            CharacterClass::Tinkerer | CharacterClass::Scoundrel => 8,
            CharacterClass::Spellweaver => 6,
        }
    }

    /// The six-card starting hand.
    #[must_use]
    pub fn hand(self) -> Vec<AbilityCard> {
        use Ability::*;
        let (prefix, cards): (&str, [(&str, u8, Ability, Ability); 6]) = match self {
            CharacterClass::Brute => (
                "brute",
                [
                    ("Trample", 72, Attack { damage: 3, range: 1 }, Move { distance: 3 }),
                    ("Eye for an Eye", 18, Attack { damage: 1, range: 1 }, Shield { amount: 1 }),
                    ("Spare Dagger", 27, Attack { damage: 3, range: 1 }, Move { distance: 2 }),
                    ("Warding Strength", 32, Shield { amount: 1 }, Heal { amount: 2, range: 1 }),
                    ("Provoking Roar", 10, Attack { damage: 2, range: 1 }, Move { distance: 1 }),
                    ("Sweeping Blow", 64, Attack { damage: 2, range: 1 }, Move { distance: 2 }),
                ],
            ),
            CharacterClass::Tinkerer => (
                "tink",
                [
                    ("Reviving Shock", 74, Heal { amount: 3, range: 2 }, Move { distance: 3 }),
                    ("Ink Bomb", 28, Attack { damage: 2, range: 3 }, Shield { amount: 1 }),
                    ("Stun Shot", 60, Attack { damage: 1, range: 3 }, Move { distance: 3 }),
                    ("Enhancement Field", 15, Heal { amount: 1, range: 3 }, Move { distance: 2 }),
                    ("Poison Dagger", 45, Attack { damage: 2, range: 1 }, Move { distance: 2 }),
                    ("Net Shooter", 33, Attack { damage: 2, range: 1 }, Heal { amount: 2, range: 0 }),
                ],
            ),
            CharacterClass::Spellweaver => (
                "spell",
                [
                    ("Fire Orbs", 62, Attack { damage: 3, range: 3 }, Move { distance: 3 }),
                    ("Frost Armor", 24, Shield { amount: 2 }, Attack { damage: 2, range: 2 }),
                    ("Mana Bolt", 5, Attack { damage: 3, range: 4 }, Move { distance: 2 }),
                    ("Aid from the Ether", 90, Recover { cards: 1 }, Move { distance: 3 }),
                    ("Impaling Eruption", 71, Attack { damage: 4, range: 3 }, Shield { amount: 1 }),
                    ("Reviving Ether", 18, Heal { amount: 3, range: 3 }, Move { distance: 2 }),
                ],
            ),
            CharacterClass::Scoundrel => (
                "scoun",
                [
                    ("Quick Hands", 3, Loot { amount: 1 }, Move { distance: 4 }),
                    ("Single Out", 29, Attack { damage: 3, range: 1 }, Move { distance: 3 }),
                    ("Backstab", 12, Attack { damage: 5, range: 1 }, Move { distance: 2 }),
                    ("Smoke Bomb", 11, Move { distance: 3 }, Attack { damage: 2, range: 1 }),
                    ("Viper Strike", 87, Attack { damage: 3, range: 1 }, Move { distance: 2 }),
                    ("Thief's Knack", 20, Loot { amount: 2 }, Move { distance: 2 }),
                ],
            ),
        };
        cards
            .into_iter()
            .enumerate()
            .map(|(i, (name, initiative, top, bottom))| AbilityCard {
                id: format!("{prefix}_{}", i + 1),
                name: name.to_string(),
                initiative,
                top,
                bottom,
            })
            .collect()
    }
}
