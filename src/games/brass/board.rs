//! Map, industries and the card deck.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::player::PlayerId;

/// Cities and the neighbours each one lists. Edges are symmetrised when the
/// board is built, so a connection listed on either side counts.
const CITY_LINKS: [(&str, &[&str]); 16] = [
    ("birmingham", &["coventry", "walsall", "wolverhampton"]),
    ("coventry", &["birmingham", "nuneaton"]),
    ("wolverhampton", &["birmingham", "walsall", "kidderminster"]),
    ("walsall", &["birmingham", "wolverhampton", "cannock"]),
    ("kidderminster", &["wolverhampton", "worcester"]),
    ("worcester", &["kidderminster", "gloucester"]),
    ("gloucester", &["worcester"]),
    ("nuneaton", &["coventry", "tamworth"]),
    ("tamworth", &["nuneaton", "burton"]),
    ("burton", &["tamworth", "derby"]),
    ("derby", &["burton", "belper"]),
    ("belper", &["derby"]),
    ("cannock", &["walsall", "stafford"]),
    ("stafford", &["cannock", "stone"]),
    ("stone", &["stafford", "uttoxeter"]),
    ("uttoxeter", &["stone", "burton"]),
];

/// The city where every build costs extra.
pub const SURCHARGE_CITY: &str = "birmingham";
pub const SURCHARGE: i64 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Cotton,
    Coal,
    Iron,
    Pottery,
    Brewery,
    Manufacturer,
}

impl Industry {
    pub const ALL: [Industry; 6] = [
        Industry::Cotton,
        Industry::Coal,
        Industry::Iron,
        Industry::Pottery,
        Industry::Brewery,
        Industry::Manufacturer,
    ];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Industry::Cotton => "cotton",
            Industry::Coal => "coal",
            Industry::Iron => "iron",
            Industry::Pottery => "pottery",
            Industry::Brewery => "brewery",
            Industry::Manufacturer => "manufacturer",
        }
    }

    /// Starting tile levels, lowest first.
    #[must_use]
    pub fn tiers(self) -> SmallVec<[u8; 8]> {
        let levels: &[u8] = match self {
            Industry::Cotton => &[1, 1, 1, 2, 2, 3, 3],
            Industry::Coal | Industry::Iron => &[1, 1, 2, 2, 3, 3],
            Industry::Pottery => &[1, 1, 1, 2, 2],
            Industry::Brewery | Industry::Manufacturer => &[1, 1, 1, 1],
        };
        SmallVec::from_slice(levels)
    }

    /// Base cost by level. Levels past the table use the last entry.
    #[must_use]
    pub fn base_cost(self, level: u8) -> i64 {
        let costs: &[i64] = match self {
            Industry::Cotton => &[12, 16, 20],
            Industry::Coal | Industry::Iron => &[8, 10, 12],
            Industry::Pottery => &[10, 14],
            Industry::Brewery => &[6, 8, 10, 12],
            Industry::Manufacturer => &[10, 14, 18, 22],
        };
        let idx = usize::from(level.max(1) - 1).min(costs.len() - 1);
        costs[idx]
    }

    /// Cost of building `level` in `city`.
    #[must_use]
    pub fn build_cost(self, level: u8, city: &str) -> i64 {
        let surcharge = if city == SURCHARGE_CITY { SURCHARGE } else { 0 };
        self.base_cost(level) + surcharge
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// A card in hand: either a place or an industry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BrassCard {
    Location(String),
    Industry(Industry),
}

impl BrassCard {
    /// Whether this card allows building `industry` in `city`.
    #[must_use]
    pub fn enables(&self, industry: Industry, city: &str) -> bool {
        match self {
            BrassCard::Location(c) => c == city,
            BrassCard::Industry(i) => *i == industry,
        }
    }

    #[must_use]
    pub fn slug(&self) -> String {
        match self {
            BrassCard::Location(c) => format!("loc_{c}"),
            BrassCard::Industry(i) => format!("ind_{i}"),
        }
    }
}

/// Two location cards per city and three per industry.
#[must_use]
pub fn full_deck() -> Vec<BrassCard> {
    let mut cards = Vec::with_capacity(CITY_LINKS.len() * 2 + Industry::ALL.len() * 3);
    for (city, _) in CITY_LINKS {
        cards.extend(std::iter::repeat(BrassCard::Location(city.to_string())).take(2));
    }
    for industry in Industry::ALL {
        cards.extend(std::iter::repeat(BrassCard::Industry(industry)).take(3));
    }
    cards
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltIndustry {
    pub owner: PlayerId,
    pub industry: Industry,
    pub level: u8,
    /// Already counted in final scoring.
    pub scored: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub connections: Vec<String>,
    pub industries: Vec<BuiltIndustry>,
    pub beer: i64,
}

/// A canal or rail between two cities, stored with the lower city index
/// first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub owner: PlayerId,
    pub from: String,
    pub to: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub cities: Vec<City>,
    /// Undirected edges as city index pairs, `a < b`, each listed once.
    pub edges: Vec<(usize, usize)>,
    pub canals: Vec<Link>,
    pub rails: Vec<Link>,
}

impl Board {
    #[must_use]
    pub fn new() -> Self {
        let index = |name: &str| CITY_LINKS.iter().position(|(c, _)| *c == name);

        let mut edges: Vec<(usize, usize)> = CITY_LINKS
            .iter()
            .enumerate()
            .flat_map(|(a, &(_, neighbours))| {
                neighbours
                    .iter()
                    .filter_map(move |n| index(*n).map(|b| (a.min(b), a.max(b))))
            })
            .collect();
        edges.sort_unstable();
        edges.dedup();

        let cities = CITY_LINKS
            .iter()
            .enumerate()
            .map(|(i, (name, _))| City {
                name: name.to_string(),
                connections: edges
                    .iter()
                    .filter_map(|&(a, b)| match (a == i, b == i) {
                        (true, _) => Some(CITY_LINKS[b].0.to_string()),
                        (_, true) => Some(CITY_LINKS[a].0.to_string()),
                        _ => None,
                    })
                    .collect(),
                industries: Vec::new(),
                beer: 0,
            })
            .collect();

        Self {
            cities,
            edges,
            canals: Vec::new(),
            rails: Vec::new(),
        }
    }

    pub fn city_index(&self, name: &str) -> Option<usize> {
        self.cities.iter().position(|c| c.name == name)
    }

    pub fn city_mut(&mut self, name: &str) -> Option<&mut City> {
        self.cities.iter_mut().find(|c| c.name == name)
    }

    /// Edge index for two cities in either order.
    pub fn edge(&self, from: &str, to: &str) -> Option<(usize, usize)> {
        let a = self.city_index(from)?;
        let b = self.city_index(to)?;
        let key = (a.min(b), a.max(b));
        self.edges.contains(&key).then_some(key)
    }

    /// Whether an edge already carries a link in `links`.
    #[must_use]
    pub fn is_linked(&self, links: &[Link], edge: (usize, usize)) -> bool {
        let (a, b) = (&self.cities[edge.0].name, &self.cities[edge.1].name);
        links.iter().any(|l| &l.from == a && &l.to == b)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
