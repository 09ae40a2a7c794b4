//! Factions, leaders and the two decks.

use serde::{Deserialize, Serialize};

use super::board::TerritoryKind;
use crate::core::GameRng;

/// Forces every faction keeps off-planet at the start.
pub const STARTING_RESERVE: i64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Atreides,
    Harkonnen,
    Emperor,
    Guild,
    BeneGesserit,
    Fremen,
}

impl Faction {
    /// Seat order.
    pub const ALL: [Faction; 6] = [
        Faction::Atreides,
        Faction::Harkonnen,
        Faction::Emperor,
        Faction::Guild,
        Faction::BeneGesserit,
        Faction::Fremen,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Faction::Atreides => "House Atreides",
            Faction::Harkonnen => "House Harkonnen",
            Faction::Emperor => "Emperor",
            Faction::Guild => "Spacing Guild",
            Faction::BeneGesserit => "Bene Gesserit",
            Faction::Fremen => "Fremen",
        }
    }

    #[must_use]
    pub const fn starting_spice(self) -> i64 {
        match self {
            Faction::Atreides | Faction::Harkonnen | Faction::Emperor => 10,
            Faction::Guild | Faction::BeneGesserit => 5,
            Faction::Fremen => 3,
        }
    }

    #[must_use]
    pub const fn starting_forces(self) -> i64 {
        match self {
            Faction::Guild => 5,
            Faction::BeneGesserit => 1,
            _ => 10,
        }
    }

    #[must_use]
    pub const fn home(self) -> Option<&'static str> {
        match self {
            Faction::Atreides => Some("arrakeen"),
            Faction::Harkonnen => Some("carthag"),
            Faction::Guild => Some("tueks_sietch"),
            Faction::Fremen => Some("sietch_tabr"),
            Faction::Emperor | Faction::BeneGesserit => None,
        }
    }

    /// Spice to ship `forces` from the reserve.
    #[must_use]
    pub fn shipment_cost(self, forces: i64) -> i64 {
        match self {
            Faction::Guild => 1,
            _ => forces,
        }
    }

    /// Spice to move `forces` into a territory of kind `to`.
    #[must_use]
    pub fn movement_cost(self, forces: i64, to: TerritoryKind) -> i64 {
        match self {
            Faction::Guild => 0,
            Faction::Fremen if to != TerritoryKind::Stronghold => (forces / 2).max(1),
            _ => forces,
        }
    }

    fn leader_table(self) -> [(&'static str, i64); 5] {
        match self {
            Faction::Atreides => [
                ("Paul Atreides", 5),
                ("Leto Atreides", 3),
                ("Gurney Halleck", 4),
                ("Duncan Idaho", 2),
                ("Thufir Hawat", 5),
            ],
            Faction::Harkonnen => [
                ("Baron Harkonnen", 4),
                ("Feyd-Rautha", 6),
                ("Beast Rabban", 4),
                ("Piter de Vries", 3),
                ("Captain Iakin", 2),
            ],
            Faction::Emperor => [
                ("Shaddam IV", 5),
                ("Bashar", 5),
                ("Captain Aramsham", 2),
                ("Burseg", 3),
                ("Caid", 3),
            ],
            Faction::Guild => [
                ("Steersman", 5),
                ("Guild Rep", 3),
                ("Master Bewt", 2),
                ("Guild Agent", 1),
                ("Navigator", 4),
            ],
            Faction::BeneGesserit => [
                ("Reverend Mother", 5),
                ("Princess Irulan", 1),
                ("Wanna Marcus", 1),
                ("Lady Margot", 2),
                ("Captain Arkie", 2),
            ],
            Faction::Fremen => [
                ("Stilgar", 6),
                ("Chani", 3),
                ("Otheym", 4),
                ("Shadout Mapes", 2),
                ("Jamis", 2),
            ],
        }
    }

    #[must_use]
    pub fn leaders(self) -> Vec<Leader> {
        self.leader_table()
            .into_iter()
            .map(|(name, strength)| Leader {
                id: slugify(name),
                name: name.to_string(),
                strength,
                alive: true,
            })
            .collect()
    }
}

fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    pub id: String,
    pub name: String,
    pub strength: i64,
    pub alive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreacheryKind {
    Weapon,
    Defense,
    Special,
    Worthless,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreacheryCard {
    pub id: String,
    pub name: String,
    pub kind: TreacheryKind,
    /// Battle strength; zero for cards that add none.
    pub strength: i64,
}

/// The 18-card treachery deck, unshuffled.
#[must_use]
pub fn treachery_deck() -> Vec<TreacheryCard> {
    use TreacheryKind::*;
    [
        ("crysknife", "Crysknife", Weapon, 2),
        ("maula_pistol", "Maula Pistol", Weapon, 3),
        ("lasgun", "Lasgun", Weapon, 4),
        ("poison_blade", "Poison Blade", Weapon, 5),
        ("hunter_seeker", "Hunter Seeker", Weapon, 3),
        ("shield", "Shield", Defense, 1),
        ("snooper", "Snooper", Defense, 2),
        ("chemistry", "Chemistry", Defense, 3),
        ("tleilaxu_ghola", "Tleilaxu Ghola", Special, 0),
        ("weather_control", "Weather Control", Special, 0),
        ("karama", "Karama", Special, 0),
        ("truthtrance", "Truthtrance", Special, 0),
        ("family_atomics", "Family Atomics", Weapon, 5),
        ("poison_tooth", "Poison Tooth", Weapon, 4),
        ("cheap_hero", "Cheap Hero", Special, 0),
        ("worthless_1", "Worthless Card", Worthless, 0),
        ("worthless_2", "Worthless Card", Worthless, 0),
        ("worthless_3", "Worthless Card", Worthless, 0),
    ]
    .into_iter()
    .map(|(id, name, kind, strength)| TreacheryCard {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        strength,
    })
    .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiceCard {
    pub territory: String,
    pub amount: i64,
    pub sandworm: bool,
}

pub const SPICE_CARDS: usize = 20;
const SANDWORM_CHANCE: f64 = 0.3;

/// Random spice blow cards over the given territories.
pub fn spice_deck<'a>(territories: impl IntoIterator<Item = &'a str>, rng: &mut GameRng) -> Vec<SpiceCard> {
    let names: Vec<&str> = territories.into_iter().collect();
    (0..SPICE_CARDS)
        .filter_map(|_| {
            let territory = rng.choose(&names)?.to_string();
            Some(SpiceCard {
                territory,
                amount: rng.gen_range_inclusive(2..=5),
                sandworm: rng.gen_bool(SANDWORM_CHANCE),
            })
        })
        .collect()
}
