//! Exploding Kittens: an elimination card game for 5 players.
//!
//! - Each player is dealt 7 cards and a defuse
//! - On your turn play any number of action cards, then draw
//! - Drawing an exploding kitten without a defuse eliminates you
//! - Attacks pass two turns to the next player; Nope cancels them
//! - Last player standing wins
//!
//! Cards are conserved: deck, discard, hands and the eliminated pool always
//! add up to the same total.

mod cards;
mod game;

pub use cards::{CardKind, CatKind, KittenCard};
pub use game::{ExplodingKittens, KittensAction, KittensBuilder, KittensPlayer, KittensView};
