//! Action representation: a stable id, a description, an optional cost and
//! a closed, per-game `ActionKind`.
//!
//! Actions are produced fresh by `legal_actions` on every call. Callers hand
//! the exact value back to `execute`, which re-validates it against the
//! current state instead of trusting it.
//!
//! ```
//! use tabletop_rules::core::{Action, ActionKind, Cost, Resource};
//!
//! let pass = Action::pass("End turn");
//! assert!(pass.is_pass());
//! assert_eq!(pass.id, "pass");
//!
//! let priced = Action::new("loan", "Take a loan", ActionKind::Pass)
//!     .with_cost(Cost::new(Resource::Money, 3));
//! assert_eq!(priced.cost.unwrap().amount, 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::games::brass::BrassAction;
use crate::games::dune::DuneAction;
use crate::games::dungeons::DungeonsAction;
use crate::games::gloomhaven::GloomhavenAction;
use crate::games::kittens::KittensAction;
use crate::games::terraforming::TerraformingAction;

/// Named numeric counters across all engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    // Industrial economy
    Money,
    Income,
    Links,
    // Terraforming economy
    Megacredits,
    Steel,
    Titanium,
    Plants,
    Energy,
    Heat,
    TerraformRating,
    // Faction conflict
    Spice,
    Forces,
    // Combat games
    HitPoints,
    Gold,
    SpellSlots,
    Experience,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::Money => "money",
            Resource::Income => "income",
            Resource::Links => "links",
            Resource::Megacredits => "megacredits",
            Resource::Steel => "steel",
            Resource::Titanium => "titanium",
            Resource::Plants => "plants",
            Resource::Energy => "energy",
            Resource::Heat => "heat",
            Resource::TerraformRating => "terraform rating",
            Resource::Spice => "spice",
            Resource::Forces => "forces",
            Resource::HitPoints => "hit points",
            Resource::Gold => "gold",
            Resource::SpellSlots => "spell slots",
            Resource::Experience => "experience",
        };
        f.write_str(name)
    }
}

/// Price of an action in a single resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cost {
    pub resource: Resource,
    pub amount: i64,
}

impl Cost {
    #[must_use]
    pub const fn new(resource: Resource, amount: i64) -> Self {
        Self { resource, amount }
    }
}

/// The closed set of action kinds.
///
/// `Pass` is shared. Everything else lives in the owning game's enum, and an
/// engine rejects kinds that belong to another game.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "game", content = "action", rename_all = "snake_case")]
pub enum ActionKind {
    Pass,
    Brass(BrassAction),
    Gloomhaven(GloomhavenAction),
    Terraforming(TerraformingAction),
    Dune(DuneAction),
    Dungeons(DungeonsAction),
    Kittens(KittensAction),
}

/// A complete, self-describing legal move.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Stable id, unique within one `legal_actions` result.
    pub id: String,
    /// Human-readable summary for external decision makers.
    pub description: String,
    pub cost: Option<Cost>,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(id: impl Into<String>, description: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            cost: None,
            kind,
        }
    }

    /// The shared "pass"/"end turn" action.
    pub fn pass(description: impl Into<String>) -> Self {
        Self::new("pass", description, ActionKind::Pass)
    }

    #[must_use]
    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Attach a cost only when it is non-zero.
    #[must_use]
    pub fn with_cost_if_any(self, cost: Cost) -> Self {
        if cost.amount == 0 {
            self
        } else {
            self.with_cost(cost)
        }
    }

    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.kind == ActionKind::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_cost_if_any() {
        let free = Action::pass("x").with_cost_if_any(Cost::new(Resource::Spice, 0));
        assert_eq!(free.cost, None);

        let paid = Action::pass("x").with_cost_if_any(Cost::new(Resource::Spice, 2));
        assert_eq!(paid.cost, Some(Cost::new(Resource::Spice, 2)));
    }

    #[test]
    fn test_action_serialization() {
        let action = Action::pass("End turn").with_cost(Cost::new(Resource::Money, 3));
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"game\":\"pass\""));

        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }

    #[test]
    fn test_resource_display() {
        assert_eq!(Resource::HitPoints.to_string(), "hit points");
        assert_eq!(Resource::Megacredits.to_string(), "megacredits");
    }
}
