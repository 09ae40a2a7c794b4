//! Ordered card piles.
//!
//! A `Deck` is an ordered sequence where index 0 is the bottom and the last
//! element is the top. Draws come off the top. Backed by `im::Vector` so
//! snapshots and engine clones share structure.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::rng::GameRng;

/// Position for putting a card into a deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckPosition {
    /// Next card to be drawn.
    Top,
    Bottom,
    /// Insert at a specific index (0 = bottom). Clamped to the deck length.
    Index(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "C: Clone + Serialize",
    deserialize = "C: Clone + Deserialize<'de>"
))]
pub struct Deck<C: Clone> {
    cards: Vector<C>,
}

impl<C: Clone> Default for Deck<C> {
    fn default() -> Self {
        Self {
            cards: Vector::new(),
        }
    }
}

impl<C: Clone> Deck<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a deck from cards listed bottom to top.
    pub fn from_cards(cards: impl IntoIterator<Item = C>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Take the top card.
    pub fn draw(&mut self) -> Option<C> {
        self.cards.pop_back()
    }

    /// Take up to `n` cards from the top, in draw order.
    pub fn draw_many(&mut self, n: usize) -> Vec<C> {
        std::iter::from_fn(|| self.draw()).take(n).collect()
    }

    /// Put a card into the deck.
    pub fn put(&mut self, card: C, position: DeckPosition) {
        match position {
            DeckPosition::Top => self.cards.push_back(card),
            DeckPosition::Bottom => self.cards.push_front(card),
            DeckPosition::Index(i) => {
                let idx = i.min(self.cards.len());
                self.cards.insert(idx, card);
            }
        }
    }

    /// Put a card at a uniformly random index in `0..=len`.
    ///
    /// Returns the chosen index.
    pub fn insert_random(&mut self, card: C, rng: &mut GameRng) -> usize {
        let idx = rng.index(self.cards.len() + 1);
        self.cards.insert(idx, card);
        idx
    }

    /// Shuffle in place.
    pub fn shuffle(&mut self, rng: &mut GameRng) {
        let mut cards: Vec<C> = self.cards.iter().cloned().collect();
        rng.shuffle(&mut cards);
        self.cards = cards.into_iter().collect();
    }

    /// Move every card of `other` into this deck, then shuffle.
    pub fn refill_from(&mut self, other: &mut Deck<C>, rng: &mut GameRng) {
        self.cards.append(std::mem::take(&mut other.cards));
        self.shuffle(rng);
    }

    /// The top `n` cards, top first, without removing them.
    #[must_use]
    pub fn peek(&self, n: usize) -> Vec<C> {
        self.cards.iter().rev().take(n).cloned().collect()
    }

    /// Remove and return the first card (from the bottom) matching `pred`.
    pub fn remove_where(&mut self, pred: impl Fn(&C) -> bool) -> Option<C> {
        let idx = self.cards.iter().position(pred)?;
        Some(self.cards.remove(idx))
    }

    /// Index (0 = bottom) of the first card matching `pred`.
    #[must_use]
    pub fn position(&self, pred: impl Fn(&C) -> bool) -> Option<usize> {
        self.cards.iter().position(pred)
    }

    /// Cards bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.cards.iter()
    }
}

impl<C: Clone> FromIterator<C> for Deck<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::from_cards(iter)
    }
}
