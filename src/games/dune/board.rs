//! Arrakis: territories, adjacency, spice and the storm.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// Number of storm sectors around the board.
pub const SECTORS: u8 = 18;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryKind {
    Stronghold,
    Sand,
    /// Never hit by the storm.
    PolarSink,
}

const TERRITORIES: [(&str, TerritoryKind, &[&str]); 18] = {
    use TerritoryKind::*;
    [
        ("arrakeen", Stronghold, &["carthag", "funeral_plain", "habbanya_ridge"]),
        ("carthag", Stronghold, &["arrakeen", "imperial_basin", "harg_pass"]),
        ("tueks_sietch", Stronghold, &["habbanya_ridge", "sietch_tabr", "false_wall_south"]),
        ("sietch_tabr", Stronghold, &["tueks_sietch", "red_chasm", "habbanya_ridge"]),
        (
            "habbanya_ridge",
            Sand,
            &["arrakeen", "tueks_sietch", "sietch_tabr", "funeral_plain"],
        ),
        ("funeral_plain", Sand, &["arrakeen", "habbanya_ridge", "the_greater_flat"]),
        ("imperial_basin", Sand, &["carthag", "harg_pass", "cielago_depression"]),
        ("harg_pass", Sand, &["carthag", "imperial_basin", "false_wall_west"]),
        ("false_wall_south", Sand, &["tueks_sietch", "the_minor_erg", "pasty_mesa"]),
        ("false_wall_west", Sand, &["harg_pass", "pasty_mesa", "false_wall_south"]),
        ("red_chasm", Sand, &["sietch_tabr", "south_mesa", "rimwall_west"]),
        (
            "the_greater_flat",
            Sand,
            &["funeral_plain", "habbanya_ridge", "cielago_depression"],
        ),
        (
            "cielago_depression",
            Sand,
            &["imperial_basin", "the_greater_flat", "south_mesa"],
        ),
        ("south_mesa", Sand, &["red_chasm", "cielago_depression", "the_minor_erg"]),
        ("the_minor_erg", Sand, &["false_wall_south", "south_mesa", "pasty_mesa"]),
        ("pasty_mesa", Sand, &["false_wall_south", "false_wall_west", "the_minor_erg"]),
        ("rimwall_west", Sand, &["red_chasm"]),
        ("polar_sink", PolarSink, &[]),
    ]
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub player: PlayerId,
    pub forces: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    pub name: String,
    pub kind: TerritoryKind,
    pub sector: Option<u8>,
    pub connections: Vec<String>,
    pub spice: i64,
    pub occupants: Vec<Occupant>,
}

impl Territory {
    #[must_use]
    pub fn forces(&self, player: PlayerId) -> i64 {
        self.occupants
            .iter()
            .find(|o| o.player == player)
            .map_or(0, |o| o.forces)
    }

    #[must_use]
    pub fn is_stronghold(&self) -> bool {
        self.kind == TerritoryKind::Stronghold
    }

    /// The only player with forces here, if exactly one.
    #[must_use]
    pub fn sole_occupant(&self) -> Option<PlayerId> {
        match self.occupants.as_slice() {
            [only] => Some(only.player),
            _ => None,
        }
    }

    pub fn add_forces(&mut self, player: PlayerId, forces: i64) {
        match self.occupants.iter_mut().find(|o| o.player == player) {
            Some(o) => o.forces += forces,
            None => self.occupants.push(Occupant { player, forces }),
        }
    }

    /// Remove and return all of `player`'s forces here.
    pub fn take_forces(&mut self, player: PlayerId) -> i64 {
        let forces = self.forces(player);
        self.occupants.retain(|o| o.player != player);
        forces
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrakis {
    pub territories: Vec<Territory>,
    /// Sector the storm currently sits over.
    pub storm: u8,
}

impl Arrakis {
    #[must_use]
    pub fn new() -> Self {
        let index = |name: &str| TERRITORIES.iter().position(|(t, _, _)| *t == name);
        let mut links = vec![Vec::new(); TERRITORIES.len()];
        for (a, &(_, _, neighbours)) in TERRITORIES.iter().enumerate() {
            for b in neighbours.iter().filter_map(|n| index(*n)) {
                links[a].push(b);
                links[b].push(a);
            }
        }

        let territories = TERRITORIES
            .iter()
            .zip(links)
            .enumerate()
            .map(|(i, (&(name, kind, _), mut linked))| {
                linked.sort_unstable();
                linked.dedup();
                Territory {
                    name: name.to_string(),
                    kind,
                    sector: (kind != TerritoryKind::PolarSink).then_some(i as u8),
                    connections: linked
                        .into_iter()
                        .map(|j| TERRITORIES[j].0.to_string())
                        .collect(),
                    spice: 0,
                    occupants: Vec::new(),
                }
            })
            .collect();

        Self {
            territories,
            storm: 0,
        }
    }

    pub fn index(&self, name: &str) -> Option<usize> {
        self.territories.iter().position(|t| t.name == name)
    }

    pub fn territory(&self, name: &str) -> Option<&Territory> {
        self.territories.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn adjacent(&self, a: usize, b: usize) -> bool {
        let target = &self.territories[b].name;
        self.territories[a].connections.iter().any(|c| c == target)
    }

    #[must_use]
    pub fn in_storm(&self, idx: usize) -> bool {
        self.territories[idx].sector == Some(self.storm)
    }

    /// Total forces `player` has on the board.
    #[must_use]
    pub fn forces_on_board(&self, player: PlayerId) -> i64 {
        self.territories.iter().map(|t| t.forces(player)).sum()
    }

    /// Strongholds where `player` is the only occupant.
    #[must_use]
    pub fn strongholds_held(&self, player: PlayerId) -> usize {
        self.territories
            .iter()
            .filter(|t| t.is_stronghold() && t.sole_occupant() == Some(player))
            .count()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.territories.iter().map(|t| t.name.as_str())
    }
}

impl Default for Arrakis {
    fn default() -> Self {
        Self::new()
    }
}
