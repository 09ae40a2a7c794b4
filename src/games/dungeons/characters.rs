//! Adventurer classes, gear and spells.

use serde::{Deserialize, Serialize};

use crate::core::dice::modifier;
use crate::core::{ConfigError, DiceRoll};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stats {
    pub strength: i64,
    pub dexterity: i64,
    pub constitution: i64,
    pub intelligence: i64,
    pub wisdom: i64,
    pub charisma: i64,
}

impl Stats {
    const fn new(strength: i64, dexterity: i64, constitution: i64, intelligence: i64, wisdom: i64, charisma: i64) -> Self {
        Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        }
    }

    #[must_use]
    pub const fn str_mod(&self) -> i64 {
        modifier(self.strength)
    }

    #[must_use]
    pub const fn dex_mod(&self) -> i64 {
        modifier(self.dexterity)
    }

    #[must_use]
    pub const fn wis_mod(&self) -> i64 {
        modifier(self.wisdom)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    Weapon {
        name: String,
        damage: DiceRoll,
        ranged: bool,
    },
    Potion {
        name: String,
        heal: DiceRoll,
    },
    Gear {
        name: String,
    },
}

impl Item {
    fn weapon(name: &str, count: u32, sides: u32, ranged: bool) -> Self {
        Item::Weapon {
            name: name.to_string(),
            damage: DiceRoll::new(count, sides, 0),
            ranged,
        }
    }

    fn gear(name: &str) -> Self {
        Item::Gear {
            name: name.to_string(),
        }
    }

    pub fn healing_potion() -> Self {
        Item::Potion {
            name: "Potion of Healing".to_string(),
            heal: DiceRoll::new(2, 4, 2),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Item::Weapon { name, .. } | Item::Potion { name, .. } | Item::Gear { name } => name,
        }
    }

    /// Lower-case, underscore-separated name used in action ids.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
            .map(|c| if c == ' ' { '_' } else { c })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spell {
    MagicMissile,
    Shield,
    BurningHands,
    CureWounds,
    Bless,
    SacredFlame,
}

impl Spell {
    /// Cantrips are level 0 and need no slot.
    #[must_use]
    pub const fn level(self) -> u32 {
        match self {
            Spell::SacredFlame => 0,
            _ => 1,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Spell::MagicMissile => "Magic Missile",
            Spell::Shield => "Shield",
            Spell::BurningHands => "Burning Hands",
            Spell::CureWounds => "Cure Wounds",
            Spell::Bless => "Bless",
            Spell::SacredFlame => "Sacred Flame",
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Spell::MagicMissile => "magic_missile",
            Spell::Shield => "shield",
            Spell::BurningHands => "burning_hands",
            Spell::CureWounds => "cure_wounds",
            Spell::Bless => "bless",
            Spell::SacredFlame => "sacred_flame",
        }
    }

    /// Damage or healing dice, for spells that roll.
    #[must_use]
    pub const fn dice(self) -> Option<DiceRoll> {
        match self {
            Spell::MagicMissile => Some(DiceRoll::new(3, 4, 3)),
            Spell::BurningHands => Some(DiceRoll::new(3, 6, 0)),
            Spell::CureWounds | Spell::SacredFlame => Some(DiceRoll::new(1, 8, 0)),
            Spell::Shield | Spell::Bless => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdventurerClass {
    Fighter,
    Wizard,
    Rogue,
    Cleric,
    Ranger,
}

impl AdventurerClass {
    /// Defaults for seats 1 to 5.
    pub const ALL: [AdventurerClass; 5] = [
        AdventurerClass::Fighter,
        AdventurerClass::Wizard,
        AdventurerClass::Rogue,
        AdventurerClass::Cleric,
        AdventurerClass::Ranger,
    ];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            AdventurerClass::Fighter => "fighter",
            AdventurerClass::Wizard => "wizard",
            AdventurerClass::Rogue => "rogue",
            AdventurerClass::Cleric => "cleric",
            AdventurerClass::Ranger => "ranger",
        }
    }

    pub fn parse(class: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == class)
            .ok_or_else(|| ConfigError::UnknownClass {
                game: "dungeons_dragons".into(),
                class: class.to_string(),
            })
    }

    #[must_use]
    pub const fn stats(self) -> Stats {
        match self {
            AdventurerClass::Fighter => Stats::new(16, 12, 14, 10, 10, 8),
            AdventurerClass::Wizard => Stats::new(8, 14, 12, 16, 12, 10),
            AdventurerClass::Rogue => Stats::new(10, 16, 12, 12, 10, 14),
            AdventurerClass::Cleric => Stats::new(14, 10, 14, 10, 16, 12),
            AdventurerClass::Ranger => Stats::new(12, 16, 13, 10, 14, 10),
        }
    }

    #[must_use]
    pub const fn max_hp(self) -> i64 {
        match self {
            AdventurerClass::Fighter => 12,
            AdventurerClass::Wizard => 8,
            AdventurerClass::Rogue | AdventurerClass::Cleric => 10,
            AdventurerClass::Ranger => 11,
        }
    }

    #[must_use]
    pub const fn armor_class(self) -> i64 {
        match self {
            AdventurerClass::Fighter => 16,
            AdventurerClass::Wizard => 12,
            AdventurerClass::Rogue | AdventurerClass::Ranger => 14,
            AdventurerClass::Cleric => 15,
        }
    }

    #[must_use]
    pub fn inventory(self) -> Vec<Item> {
        match self {
            AdventurerClass::Fighter => vec![
                Item::weapon("Longsword", 1, 8, false),
                Item::gear("Shield"),
                Item::healing_potion(),
            ],
            AdventurerClass::Wizard => vec![
                Item::weapon("Quarterstaff", 1, 6, false),
                Item::gear("Spellbook"),
            ],
            AdventurerClass::Rogue => vec![
                Item::weapon("Shortsword", 1, 6, false),
                Item::weapon("Dagger", 1, 4, true),
                Item::gear("Thieves' Tools"),
            ],
            AdventurerClass::Cleric => vec![
                Item::weapon("Mace", 1, 6, false),
                Item::gear("Shield"),
                Item::gear("Holy Symbol"),
            ],
            AdventurerClass::Ranger => vec![
                Item::weapon("Longbow", 1, 8, true),
                Item::weapon("Shortsword", 1, 6, false),
                Item::gear("Arrows"),
            ],
        }
    }

    #[must_use]
    pub fn spells(self) -> Vec<Spell> {
        match self {
            AdventurerClass::Wizard => vec![Spell::MagicMissile, Spell::Shield, Spell::BurningHands],
            AdventurerClass::Cleric => vec![Spell::CureWounds, Spell::Bless, Spell::SacredFlame],
            _ => Vec::new(),
        }
    }

    /// Level-1 spell slots at level 1.
    #[must_use]
    pub const fn spell_slots(self) -> u32 {
        match self {
            AdventurerClass::Wizard | AdventurerClass::Cleric => 2,
            _ => 0,
        }
    }
}
