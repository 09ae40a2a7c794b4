//! Brass: Birmingham, an industrial economy game for 4 players.
//!
//! Players start with £17 and £10 income and a hand of 8 location and
//! industry cards. Each turn is one action:
//!
//! - **Build**: spend a card naming the city or the industry, pay the tile cost
//! - **Link**: pay for a canal (£3) or rail (£5) along an unlinked edge
//! - **Loan**: take £30 and lose up to 3 income
//! - **Pass**
//!
//! After every full round each player collects income. Two rounds make an
//! era. Canals score and vanish when the rail era starts; rails, industries
//! and money score at the end of the game.

mod board;
mod game;

pub use board::{Board, BrassCard, BuiltIndustry, City, Industry, Link};
pub use game::{BrassAction, BrassBirmingham, BrassBuilder, BrassPlayer, BrassView, Era, IndustryTrack};
