//! Gloomhaven: four characters clear the Black Barrow.
//!
//! Each seat plays a class (brute, tinkerer, spellweaver, scoundrel by
//! default) with a six-card hand. A turn is one top half and one bottom half
//! from two different cards, or a rest, or a pass. Played cards go to the
//! discard pile; resting returns them at the cost of one random card.
//!
//! After every character has gone, each living monster attacks the nearest
//! character in range (shields soak damage) or moves toward one. Characters
//! with no health, or too few cards to play a turn, are exhausted.
//!
//! Killing every monster wins for the surviving characters. Losing every
//! character ends the scenario as a draw.

mod cards;
mod game;
mod scenario;

pub use cards::{Ability, AbilityCard, CharacterClass, Half};
pub use game::{Character, Gloomhaven, GloomhavenAction, GloomhavenBuilder, GloomhavenView, Target};
pub use scenario::{Monster, MonsterKind, GRID, SCENARIO_NAME, START_CELLS};
