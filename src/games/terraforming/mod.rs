//! Terraforming Mars: a planet-terraforming economy game for 5 players.
//!
//! Seats are assigned corporations in order (Credicor, Ecoline, Helion,
//! Mining Guild, Tharsis Republic). Everyone starts at terraform rating 20
//! with no production and ten project cards.
//!
//! ## Turns
//!
//! One action per turn: play a card, sell a patent, fund a standard
//! project, convert 8 plants or 8 heat, or pass. Each real step on a global
//! tracker is worth one terraform rating.
//!
//! ## Generations
//!
//! After all five seats act, energy turns into heat, production and TR pay
//! out, and each player draws four cards. The game ends when temperature,
//! oxygen and oceans are all maxed, or after the last generation. Highest
//! TR plus victory points wins.

mod cards;
mod game;

pub use cards::{
    project_deck, CardEffect, Corporation, ProjectCard, ProjectDef, ProjectKind, StandardProject,
    Tag, Tracker,
};
pub use game::{
    Globals, Ledger, TerraformingAction, TerraformingBuilder, TerraformingMars, TerraformingPlayer,
    TerraformingView,
};
