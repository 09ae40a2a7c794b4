//! Corporations, project cards and standard projects.

use serde::{Deserialize, Serialize};

use crate::core::Resource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Building,
    Space,
    Science,
    Power,
    Plant,
    Animal,
    Jovian,
}

/// Global parameters that raise terraform rating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tracker {
    Temperature,
    Oxygen,
    Oceans,
}

impl Tracker {
    pub const ALL: [Tracker; 3] = [Tracker::Temperature, Tracker::Oxygen, Tracker::Oceans];

    #[must_use]
    pub const fn min(self) -> i64 {
        match self {
            Tracker::Temperature => -30,
            Tracker::Oxygen | Tracker::Oceans => 0,
        }
    }

    #[must_use]
    pub const fn max(self) -> i64 {
        match self {
            Tracker::Temperature => 8,
            Tracker::Oxygen => 14,
            Tracker::Oceans => 9,
        }
    }

    /// Units moved by one raise.
    #[must_use]
    pub const fn step(self) -> i64 {
        match self {
            Tracker::Temperature => 2,
            Tracker::Oxygen | Tracker::Oceans => 1,
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Tracker::Temperature => "temperature",
            Tracker::Oxygen => "oxygen",
            Tracker::Oceans => "oceans",
        }
    }
}

/// What a project does when played.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardEffect {
    /// Raise a global tracker by this many steps.
    Raise(Tracker, i64),
    /// Gain resources immediately.
    Gain(Resource, i64),
    /// Change a production rate. Negative rates must be payable.
    Production(Resource, i64),
    Vp(i64),
    /// Extra megacredits each titanium is worth.
    TitaniumValue(i64),
    Draw(usize),
    /// Extra cards drawn at every generation upkeep.
    DrawPerGeneration(usize),
}

pub struct ProjectDef {
    pub name: &'static str,
    pub cost: i64,
    pub tags: &'static [Tag],
    pub effects: &'static [CardEffect],
}

impl ProjectDef {
    #[must_use]
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    AiCentral,
    Asteroid,
    Comet,
    BigAsteroid,
    WaterImport,
    SpaceElevator,
    DevelopmentCenter,
    FusionPower,
    Geothermal,
    Trees,
    Fish,
    Livestock,
    Ironworks,
    Mine,
    Aquifer,
}

impl ProjectKind {
    pub const ALL: [ProjectKind; 15] = [
        ProjectKind::AiCentral,
        ProjectKind::Asteroid,
        ProjectKind::Comet,
        ProjectKind::BigAsteroid,
        ProjectKind::WaterImport,
        ProjectKind::SpaceElevator,
        ProjectKind::DevelopmentCenter,
        ProjectKind::FusionPower,
        ProjectKind::Geothermal,
        ProjectKind::Trees,
        ProjectKind::Fish,
        ProjectKind::Livestock,
        ProjectKind::Ironworks,
        ProjectKind::Mine,
        ProjectKind::Aquifer,
    ];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            ProjectKind::AiCentral => "ai_central",
            ProjectKind::Asteroid => "asteroid",
            ProjectKind::Comet => "comet",
            ProjectKind::BigAsteroid => "big_asteroid",
            ProjectKind::WaterImport => "water_import",
            ProjectKind::SpaceElevator => "space_elevator",
            ProjectKind::DevelopmentCenter => "development_center",
            ProjectKind::FusionPower => "fusion_power",
            ProjectKind::Geothermal => "geothermal",
            ProjectKind::Trees => "trees",
            ProjectKind::Fish => "fish",
            ProjectKind::Livestock => "livestock",
            ProjectKind::Ironworks => "ironworks",
            ProjectKind::Mine => "mine",
            ProjectKind::Aquifer => "aquifer",
        }
    }

    #[must_use]
    pub fn def(self) -> &'static ProjectDef {
        use CardEffect::*;
        use Resource::*;
        use Tag::*;
        match self {
            ProjectKind::AiCentral => &ProjectDef {
                name: "AI Central",
                cost: 21,
                tags: &[Science, Building],
                effects: &[Vp(1), DrawPerGeneration(2)],
            },
            ProjectKind::Asteroid => &ProjectDef {
                name: "Asteroid",
                cost: 14,
                tags: &[Space],
                effects: &[Raise(Tracker::Temperature, 1), Gain(Titanium, 2)],
            },
            ProjectKind::Comet => &ProjectDef {
                name: "Comet",
                cost: 21,
                tags: &[Space],
                effects: &[Raise(Tracker::Temperature, 1), Raise(Tracker::Oceans, 1)],
            },
            ProjectKind::BigAsteroid => &ProjectDef {
                name: "Big Asteroid",
                cost: 27,
                tags: &[Space],
                effects: &[Raise(Tracker::Temperature, 2), Gain(Titanium, 4)],
            },
            ProjectKind::WaterImport => &ProjectDef {
                name: "Water Import from Europa",
                cost: 25,
                tags: &[Space, Jovian],
                effects: &[Raise(Tracker::Oceans, 1), Vp(1)],
            },
            ProjectKind::SpaceElevator => &ProjectDef {
                name: "Space Elevator",
                cost: 27,
                tags: &[Space, Building],
                effects: &[TitaniumValue(1), Vp(2)],
            },
            ProjectKind::DevelopmentCenter => &ProjectDef {
                name: "Development Center",
                cost: 11,
                tags: &[Science, Building],
                effects: &[Draw(1)],
            },
            ProjectKind::FusionPower => &ProjectDef {
                name: "Fusion Power",
                cost: 14,
                tags: &[Science, Power, Building],
                effects: &[Production(Energy, 3)],
            },
            ProjectKind::Geothermal => &ProjectDef {
                name: "Geothermal Power",
                cost: 11,
                tags: &[Power, Building],
                effects: &[Production(Energy, 2)],
            },
            ProjectKind::Trees => &ProjectDef {
                name: "Trees",
                cost: 13,
                tags: &[Plant],
                effects: &[Raise(Tracker::Oxygen, 1), Production(Plants, 1), Vp(1)],
            },
            ProjectKind::Fish => &ProjectDef {
                name: "Fish",
                cost: 9,
                tags: &[Animal],
                effects: &[Vp(1)],
            },
            ProjectKind::Livestock => &ProjectDef {
                name: "Livestock",
                cost: 10,
                tags: &[Animal],
                effects: &[Production(Plants, -1), Vp(1)],
            },
            ProjectKind::Ironworks => &ProjectDef {
                name: "Ironworks",
                cost: 11,
                tags: &[Building],
                effects: &[Raise(Tracker::Oxygen, 1), Production(Energy, -1)],
            },
            ProjectKind::Mine => &ProjectDef {
                name: "Mine",
                cost: 4,
                tags: &[Building],
                effects: &[Production(Steel, 1)],
            },
            ProjectKind::Aquifer => &ProjectDef {
                name: "Aquifer Pumping",
                cost: 18,
                tags: &[],
                effects: &[Raise(Tracker::Oceans, 1)],
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectCard {
    pub id: String,
    pub kind: ProjectKind,
}

impl ProjectCard {
    #[must_use]
    pub fn def(&self) -> &'static ProjectDef {
        self.kind.def()
    }
}

/// Four copies of every project, ids like `trees_2`.
#[must_use]
pub fn project_deck() -> Vec<ProjectCard> {
    ProjectKind::ALL
        .into_iter()
        .flat_map(|kind| {
            (0..4).map(move |n| ProjectCard {
                id: format!("{}_{n}", kind.slug()),
                kind,
            })
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corporation {
    Credicor,
    Ecoline,
    Helion,
    MiningGuild,
    TharsisRepublic,
}

impl Corporation {
    /// Assigned to seats in this order.
    pub const ALL: [Corporation; 5] = [
        Corporation::Credicor,
        Corporation::Ecoline,
        Corporation::Helion,
        Corporation::MiningGuild,
        Corporation::TharsisRepublic,
    ];

    #[must_use]
    pub const fn starting_credits(self) -> i64 {
        match self {
            Corporation::Credicor => 57,
            Corporation::Ecoline => 36,
            Corporation::Helion => 42,
            Corporation::MiningGuild => 30,
            Corporation::TharsisRepublic => 40,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Corporation::Credicor => "Credicor",
            Corporation::Ecoline => "Ecoline",
            Corporation::Helion => "Helion",
            Corporation::MiningGuild => "Mining Guild",
            Corporation::TharsisRepublic => "Tharsis Republic",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardProject {
    PowerPlant,
    Asteroid,
    Aquifer,
    Greenery,
    City,
}

impl StandardProject {
    pub const ALL: [StandardProject; 5] = [
        StandardProject::PowerPlant,
        StandardProject::Asteroid,
        StandardProject::Aquifer,
        StandardProject::Greenery,
        StandardProject::City,
    ];

    #[must_use]
    pub const fn cost(self) -> i64 {
        match self {
            StandardProject::PowerPlant => 11,
            StandardProject::Asteroid => 14,
            StandardProject::Aquifer => 18,
            StandardProject::Greenery => 23,
            StandardProject::City => 25,
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            StandardProject::PowerPlant => "power_plant",
            StandardProject::Asteroid => "asteroid",
            StandardProject::Aquifer => "aquifer",
            StandardProject::Greenery => "greenery",
            StandardProject::City => "city",
        }
    }

    #[must_use]
    pub const fn effects(self) -> &'static [CardEffect] {
        match self {
            StandardProject::PowerPlant => &[CardEffect::Production(Resource::Energy, 1)],
            StandardProject::Asteroid => &[CardEffect::Raise(Tracker::Temperature, 1)],
            StandardProject::Aquifer => &[CardEffect::Raise(Tracker::Oceans, 1)],
            StandardProject::Greenery => &[CardEffect::Raise(Tracker::Oxygen, 1), CardEffect::Vp(1)],
            StandardProject::City => &[
                CardEffect::Production(Resource::Megacredits, 1),
                CardEffect::Vp(1),
            ],
        }
    }
}
