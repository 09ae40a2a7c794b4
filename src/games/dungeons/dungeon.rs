//! The dungeon: a rock grid carved room by room, plus its monsters.

use serde::{Deserialize, Serialize};

use crate::core::{Bounds, Cell, DiceRoll};
use crate::rules::HitPoints;

pub const WIDTH: i32 = 40;
pub const HEIGHT: i32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Rock,
    Floor,
    /// Closed door; walkable, and opening it carves the next room.
    Door,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Chamber,
    ThroneRoom,
    TreasureVault,
    DragonLair,
}

impl RoomKind {
    #[must_use]
    pub const fn next(self) -> Option<RoomKind> {
        match self {
            RoomKind::Chamber => Some(RoomKind::ThroneRoom),
            RoomKind::ThroneRoom => Some(RoomKind::TreasureVault),
            RoomKind::TreasureVault => Some(RoomKind::DragonLair),
            RoomKind::DragonLair => None,
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            RoomKind::Chamber => "chamber",
            RoomKind::ThroneRoom => "throne_room",
            RoomKind::TreasureVault => "treasure_vault",
            RoomKind::DragonLair => "dragon_lair",
        }
    }

    /// Width and height in cells.
    #[must_use]
    pub const fn size(self) -> (i32, i32) {
        match self {
            RoomKind::Chamber => (5, 5),
            RoomKind::ThroneRoom => (10, 8),
            RoomKind::TreasureVault => (4, 4),
            RoomKind::DragonLair => (12, 12),
        }
    }

    /// Gold found by a successful search.
    #[must_use]
    pub const fn treasure(self) -> i64 {
        match self {
            RoomKind::Chamber => 50,
            RoomKind::ThroneRoom => 200,
            RoomKind::TreasureVault => 500,
            RoomKind::DragonLair => 1000,
        }
    }

    /// Monsters waiting when the room is opened. The starting chamber is
    /// carved at setup and left to the DM.
    #[must_use]
    pub const fn enemies(self) -> &'static [MonsterKind] {
        match self {
            RoomKind::ThroneRoom => &[MonsterKind::GoblinBoss],
            RoomKind::DragonLair => &[MonsterKind::YoungDragon],
            RoomKind::Chamber | RoomKind::TreasureVault => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub kind: RoomKind,
    /// Top-left corner.
    pub origin: Cell,
    pub width: i32,
    pub height: i32,
    /// Gold still unclaimed.
    pub treasure: i64,
}

impl Room {
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        (self.origin.x..self.origin.x + self.width).contains(&cell.x)
            && (self.origin.y..self.origin.y + self.height).contains(&cell.y)
    }

    /// The exit on the east wall, halfway down. The last room has none.
    #[must_use]
    pub fn door(&self) -> Option<Cell> {
        self.kind.next().map(|_| {
            Cell::new(self.origin.x + self.width - 1, self.origin.y + self.height / 2)
        })
    }

    pub fn cells(&self) -> impl DoubleEndedIterator<Item = Cell> + '_ {
        let Room { origin, width, .. } = *self;
        (0..self.height * width).map(move |i| Cell::new(origin.x + i % width, origin.y + i / width))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterKind {
    Goblin,
    GoblinBoss,
    YoungDragon,
}

impl MonsterKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            MonsterKind::Goblin => "Goblin",
            MonsterKind::GoblinBoss => "Goblin Boss",
            MonsterKind::YoungDragon => "Young Red Dragon",
        }
    }

    #[must_use]
    pub const fn max_hp(self) -> i64 {
        match self {
            MonsterKind::Goblin => 7,
            MonsterKind::GoblinBoss => 21,
            MonsterKind::YoungDragon => 178,
        }
    }

    #[must_use]
    pub const fn armor_class(self) -> i64 {
        match self {
            MonsterKind::Goblin => 15,
            MonsterKind::GoblinBoss => 17,
            MonsterKind::YoungDragon => 18,
        }
    }

    #[must_use]
    pub const fn attack_bonus(self) -> i64 {
        match self {
            MonsterKind::Goblin | MonsterKind::GoblinBoss => 4,
            MonsterKind::YoungDragon => 10,
        }
    }

    #[must_use]
    pub const fn damage(self) -> DiceRoll {
        match self {
            MonsterKind::Goblin => DiceRoll::new(1, 6, 2),
            MonsterKind::GoblinBoss => DiceRoll::new(2, 6, 3),
            MonsterKind::YoungDragon => DiceRoll::new(2, 10, 6),
        }
    }

    /// Experience for the killing blow.
    #[must_use]
    pub const fn experience(self) -> i64 {
        match self {
            MonsterKind::Goblin => 50,
            MonsterKind::GoblinBoss => 200,
            MonsterKind::YoungDragon => 5900,
        }
    }
}

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

/// Terrain, rooms, hidden traps and monsters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    pub bounds: Bounds,
    /// Row-major terrain.
    pub terrain: Vec<Terrain>,
    /// Carved rooms, oldest first.
    pub rooms: Vec<Room>,
    #[serde(skip)]
    pub traps: Vec<Cell>,
    pub monsters: Vec<Monster>,
}

impl Dungeon {
    /// Solid rock with the starting chamber carved at the origin.
    #[must_use]
    pub fn new() -> Self {
        let bounds = Bounds::new(WIDTH, HEIGHT);
        let mut dungeon = Self {
            bounds,
            terrain: vec![Terrain::Rock; (WIDTH * HEIGHT) as usize],
            rooms: Vec::new(),
            traps: Vec::new(),
            monsters: Vec::new(),
        };
        dungeon.carve(RoomKind::Chamber, Cell::new(0, 0));
        dungeon
    }

    fn offset(&self, cell: Cell) -> Option<usize> {
        self.bounds
            .contains(cell)
            .then(|| (cell.y * self.bounds.width + cell.x) as usize)
    }

    /// Rock outside the grid.
    #[must_use]
    pub fn terrain(&self, cell: Cell) -> Terrain {
        self.offset(cell).map_or(Terrain::Rock, |i| self.terrain[i])
    }

    fn set_terrain(&mut self, cell: Cell, terrain: Terrain) {
        if let Some(i) = self.offset(cell) {
            self.terrain[i] = terrain;
        }
    }

    #[must_use]
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.terrain(cell) != Terrain::Rock
    }

    pub fn latest_room(&self) -> Option<&Room> {
        self.rooms.last()
    }

    pub fn room_at(&self, cell: Cell) -> Option<usize> {
        self.rooms.iter().position(|r| r.contains(cell))
    }

    /// Whether the final room has been opened.
    #[must_use]
    pub fn lair_open(&self) -> bool {
        self.rooms.iter().any(|r| r.kind == RoomKind::DragonLair)
    }

    fn carve(&mut self, kind: RoomKind, origin: Cell) {
        let (width, height) = kind.size();
        let room = Room {
            kind,
            origin,
            width,
            height,
            treasure: kind.treasure(),
        };
        let cells: Vec<Cell> = room.cells().collect();
        for cell in cells {
            self.set_terrain(cell, Terrain::Floor);
        }
        if let Some(door) = room.door() {
            self.set_terrain(door, Terrain::Door);
        }
        self.rooms.push(room);
    }

    /// Open the door at `door`, carving the next room just east of it.
    /// Returns the new room, or `None` if `door` leads nowhere.
    pub fn open_door(&mut self, door: Cell) -> Option<RoomKind> {
        if self.terrain(door) != Terrain::Door {
            return None;
        }
        let from = self.rooms.iter().find(|r| r.door() == Some(door))?;
        let kind = from.kind.next()?;
        let origin = Cell::new(from.origin.x + from.width, 0);
        self.set_terrain(door, Terrain::Floor);
        self.carve(kind, origin);
        Some(kind)
    }

    pub fn living_monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.iter().filter(|m| m.is_alive())
    }

    /// First free floor cell of room `room`, scanning from its far corner.
    /// `taken` lists cells held by adventurers.
    pub fn spawn_cell(&self, room: usize, taken: &[Cell]) -> Option<Cell> {
        self.rooms.get(room)?.cells().rev().find(|c| {
            self.terrain(*c) == Terrain::Floor
                && !taken.contains(c)
                && !self.living_monsters().any(|m| m.position == *c)
        })
    }

    pub fn add_monster(&mut self, kind: MonsterKind, position: Cell) -> usize {
        let id = self.monsters.len();
        self.monsters.push(Monster {
            id,
            kind,
            hp: HitPoints::full(kind.max_hp()),
            position,
        });
        id
    }

    pub fn spawn(&mut self, kind: MonsterKind, room: usize, taken: &[Cell]) -> Option<usize> {
        let cell = self.spawn_cell(room, taken)?;
        Some(self.add_monster(kind, cell))
    }
}

impl Default for Dungeon {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_chamber() {
        let dungeon = Dungeon::new();
        assert_eq!(dungeon.rooms.len(), 1);
        assert_eq!(dungeon.terrain(Cell::new(4, 2)), Terrain::Door);
        assert_eq!(dungeon.terrain(Cell::new(4, 4)), Terrain::Floor);
        assert_eq!(dungeon.terrain(Cell::new(5, 2)), Terrain::Rock);
        assert_eq!(dungeon.terrain(Cell::new(-1, 0)), Terrain::Rock);
        assert_eq!(dungeon.terrain.iter().filter(|t| **t != Terrain::Rock).count(), 25);
    }

    #[test]
    fn test_open_doors_in_sequence() {
        let mut dungeon = Dungeon::new();
        assert_eq!(dungeon.open_door(Cell::new(0, 0)), None);
        assert_eq!(dungeon.open_door(Cell::new(4, 2)), Some(RoomKind::ThroneRoom));
        assert_eq!(dungeon.terrain(Cell::new(4, 2)), Terrain::Floor);
        assert_eq!(dungeon.terrain(Cell::new(5, 2)), Terrain::Floor);

        let throne = &dungeon.rooms[1];
        assert_eq!(throne.door(), Some(Cell::new(14, 4)));
        assert_eq!(dungeon.open_door(Cell::new(14, 4)), Some(RoomKind::TreasureVault));
        assert_eq!(dungeon.open_door(Cell::new(18, 2)), Some(RoomKind::DragonLair));
        assert!(dungeon.lair_open());
        assert_eq!(dungeon.rooms[3].door(), None);
        assert_eq!(dungeon.terrain(Cell::new(30, 11)), Terrain::Floor);
        assert_eq!(dungeon.terrain(Cell::new(31, 0)), Terrain::Rock);
    }

    #[test]
    fn test_spawn_fills_far_corner() {
        let mut dungeon = Dungeon::new();
        let first = dungeon.spawn(MonsterKind::Goblin, 0, &[]).unwrap();
        let second = dungeon.spawn(MonsterKind::Goblin, 0, &[]).unwrap();
        assert_eq!(dungeon.monsters[first].position, Cell::new(4, 4));
        assert_eq!(dungeon.monsters[second].position, Cell::new(3, 4));

        let taken = [Cell::new(2, 4)];
        let third = dungeon.spawn(MonsterKind::Goblin, 0, &taken).unwrap();
        assert_eq!(dungeon.monsters[third].position, Cell::new(1, 4));
    }
}
