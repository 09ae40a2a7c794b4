//! Card catalogue and deck construction.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatKind {
    Tacocat,
    RainbowCat,
    BeardCat,
    Cattermelon,
    HairyPotatoCat,
}

impl CatKind {
    pub const ALL: [CatKind; 5] = [
        CatKind::Tacocat,
        CatKind::RainbowCat,
        CatKind::BeardCat,
        CatKind::Cattermelon,
        CatKind::HairyPotatoCat,
    ];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            CatKind::Tacocat => "tacocat",
            CatKind::RainbowCat => "rainbow_cat",
            CatKind::BeardCat => "beard_cat",
            CatKind::Cattermelon => "cattermelon",
            CatKind::HairyPotatoCat => "hairy_potato_cat",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Attack,
    Skip,
    Favor,
    Shuffle,
    SeeTheFuture,
    Nope,
    Cat(CatKind),
    Defuse,
    ExplodingKitten,
}

impl CardKind {
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            CardKind::Attack => "attack",
            CardKind::Skip => "skip",
            CardKind::Favor => "favor",
            CardKind::Shuffle => "shuffle",
            CardKind::SeeTheFuture => "see_future",
            CardKind::Nope => "nope",
            CardKind::Cat(cat) => cat.slug(),
            CardKind::Defuse => "defuse",
            CardKind::ExplodingKitten => "exploding",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CardKind::Attack => "Attack",
            CardKind::Skip => "Skip",
            CardKind::Favor => "Favor",
            CardKind::Shuffle => "Shuffle",
            CardKind::SeeTheFuture => "See the Future",
            CardKind::Nope => "Nope",
            CardKind::Cat(CatKind::Tacocat) => "Tacocat",
            CardKind::Cat(CatKind::RainbowCat) => "Rainbow Cat",
            CardKind::Cat(CatKind::BeardCat) => "Beard Cat",
            CardKind::Cat(CatKind::Cattermelon) => "Cattermelon",
            CardKind::Cat(CatKind::HairyPotatoCat) => "Hairy Potato Cat",
            CardKind::Defuse => "Defuse",
            CardKind::ExplodingKitten => "Exploding Kitten",
        }
    }
}

/// A physical card. Ids are unique across the whole game.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KittenCard {
    pub id: String,
    pub kind: CardKind,
}

impl KittenCard {
    fn numbered(kind: CardKind, n: usize) -> Self {
        Self {
            id: format!("{}_{n}", kind.slug()),
            kind,
        }
    }

    #[must_use]
    pub fn is_kitten(&self) -> bool {
        self.kind == CardKind::ExplodingKitten
    }

    #[must_use]
    pub fn is_defuse(&self) -> bool {
        self.kind == CardKind::Defuse
    }
}

fn copies(kind: CardKind, count: usize) -> impl Iterator<Item = KittenCard> {
    (0..count).map(move |n| KittenCard::numbered(kind, n))
}

/// Action and cat cards, before defuses and kittens are added.
#[must_use]
pub fn main_deck() -> Vec<KittenCard> {
    let mut cards: Vec<KittenCard> = [
        (CardKind::Attack, 4),
        (CardKind::Skip, 4),
        (CardKind::Favor, 4),
        (CardKind::Shuffle, 4),
        (CardKind::SeeTheFuture, 5),
        (CardKind::Nope, 5),
    ]
    .into_iter()
    .flat_map(|(kind, count)| copies(kind, count))
    .collect();

    for cat in CatKind::ALL {
        cards.extend(copies(CardKind::Cat(cat), 4));
    }
    cards
}

/// `players + 2` defuse cards.
#[must_use]
pub fn defuses(players: usize) -> Vec<KittenCard> {
    copies(CardKind::Defuse, players + 2).collect()
}

/// `players - 1` exploding kittens.
#[must_use]
pub fn kittens(players: usize) -> Vec<KittenCard> {
    copies(CardKind::ExplodingKitten, players.saturating_sub(1)).collect()
}
