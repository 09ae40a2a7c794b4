//! The six rule engines.
//!
//! Each module owns its board, decks, phases and player records, and plugs
//! into the registry through its builder.

pub mod brass;
pub mod dune;
pub mod dungeons;
pub mod gloomhaven;
pub mod kittens;
pub mod terraforming;
