//! The Black Barrow scenario: grid, starting cells and the monster roster.

use serde::{Deserialize, Serialize};

use crate::core::{Bounds, Cell};
use crate::rules::HitPoints;

pub const SCENARIO_NAME: &str = "Black Barrow";

/// Two rooms side by side: the entrance (x 0..=3) and the archers' hall.
pub const GRID: Bounds = Bounds::new(7, 4);

/// Character starting cells, by seat.
pub const START_CELLS: [Cell; 4] = [
    Cell::new(0, 0),
    Cell::new(0, 1),
    Cell::new(1, 0),
    Cell::new(1, 1),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterKind {
    BanditGuard,
    LivingBones,
    BanditArcher,
}

impl MonsterKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            MonsterKind::BanditGuard => "Bandit Guard",
            MonsterKind::LivingBones => "Living Bones",
            MonsterKind::BanditArcher => "Bandit Archer",
        }
    }

    /// Hit points at `level`; each level above 1 adds one.
    #[must_use]
    pub const fn max_hp(self, level: u8) -> i64 {
        let base = match self {
            MonsterKind::BanditGuard | MonsterKind::LivingBones => 5,
            MonsterKind::BanditArcher => 4,
        };
        base + level as i64 - 1
    }

    #[must_use]
    pub const fn attack(self) -> i64 {
        match self {
            MonsterKind::BanditGuard | MonsterKind::BanditArcher => 2,
            MonsterKind::LivingBones => 1,
        }
    }

    #[must_use]
    pub const fn range(self) -> i32 {
        match self {
            MonsterKind::BanditArcher => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub const fn movement(self) -> u32 {
        match self {
            MonsterKind::BanditGuard => 2,
            MonsterKind::LivingBones => 3,
            MonsterKind::BanditArcher => 1,
        }
    }
}

const SPAWNS: [(MonsterKind, Cell); 7] = [
    (MonsterKind::BanditGuard, Cell::new(3, 0)),
    (MonsterKind::BanditGuard, Cell::new(3, 1)),
    (MonsterKind::BanditGuard, Cell::new(3, 2)),
    (MonsterKind::LivingBones, Cell::new(4, 1)),
    (MonsterKind::LivingBones, Cell::new(4, 2)),
    (MonsterKind::BanditArcher, Cell::new(6, 0)),
    (MonsterKind::BanditArcher, Cell::new(6, 3)),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub id: usize,
    pub kind: MonsterKind,
    pub hp: HitPoints,
    pub position: Cell,
}

impl Monster {
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.hp.is_defeated()
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.kind.name(), self.id)
    }
}

#[must_use]
pub fn spawn_monsters(level: u8) -> Vec<Monster> {
    SPAWNS
        .iter()
        .enumerate()
        .map(|(id, &(kind, position))| Monster {
            id,
            kind,
            hp: HitPoints::full(kind.max_hp(level)),
            position,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster() {
        let monsters = spawn_monsters(1);
        assert_eq!(monsters.len(), 7);
        assert_eq!(monsters[0].hp.max, 5);
        assert_eq!(monsters[6].hp.max, 4);
        assert!(monsters.iter().all(|m| GRID.contains(m.position)));
        assert!(monsters
            .iter()
            .all(|m| !START_CELLS.contains(&m.position)));
        assert_eq!(spawn_monsters(3)[0].hp.max, 7);
    }
}
