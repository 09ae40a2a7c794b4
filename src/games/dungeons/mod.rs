//! Dungeons & Dragons: a dungeon master against five adventurers.
//!
//! Seat 0 is the DM. Seats 1 to 5 play fighter, wizard, rogue, cleric and
//! ranger unless configured otherwise. The dungeon starts as one chamber
//! carved out of rock; opening its door carves the throne room, then the
//! treasure vault, then the dragon's lair.
//!
//! While exploring, seats take turns in order. As soon as a monster stands,
//! everyone rolls initiative and turns follow that order until the last
//! monster falls. An adventurer's turn is up to six steps plus one action.
//! The DM may spawn a goblin, hide a trap or advance the monsters, and every
//! monster adjacent to an adventurer may attack once.
//!
//! The party wins by slaying the dragon. The DM wins when every adventurer
//! is down.

mod characters;
mod dungeon;
mod game;

pub use characters::{AdventurerClass, Item, Spell, Stats};
pub use dungeon::{Dungeon, Monster, MonsterKind, Room, RoomKind, Terrain, HEIGHT, WIDTH};
pub use game::{
    Adventurer, AttackMode, Dungeons, DungeonsAction, DungeonsBuilder, DungeonsView,
    InitiativeEntry, Target, DUNGEON_MASTER, START_CELLS,
};
