//! Dune: six factions fight over the spice of Arrakis.
//!
//! Seats take factions in order: Atreides, Harkonnen, Emperor, Spacing
//! Guild, Bene Gesserit, Fremen. Factions with a home stronghold start
//! there; the rest keep their forces off-planet.
//!
//! ## Rounds
//!
//! A round walks nine phases. Storm, spice blow and the mentat pause run
//! automatically; in every other phase each seat gets one turn (acting or
//! passing) before the phase closes:
//!
//! - **Bidding**: one treachery card is auctioned, highest bid takes it
//! - **Revival**: buy forces back from the tanks
//! - **Shipment**: land reserve forces (the Guild pays a flat fee)
//! - **Movement**: move a stack to an adjacent territory outside the storm
//! - **Battle**: fight the largest opposing stack in a shared territory
//! - **Spice collection**: gather spice where you have forces
//!
//! Holding three strongholds alone at the mentat pause wins immediately.
//! Otherwise the game ends after the last round on strongholds, then spice.

mod board;
mod factions;
mod game;

pub use board::{Arrakis, Occupant, Territory, TerritoryKind, SECTORS};
pub use factions::{treachery_deck, Faction, Leader, SpiceCard, TreacheryCard, TreacheryKind};
pub use game::{Dune, DuneAction, DuneBuilder, DunePlayer, DuneView, HighBid, Phase};
