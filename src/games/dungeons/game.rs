//! Dungeons & Dragons engine: the DM's turn, adventurer turns and initiative.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

use super::characters::{AdventurerClass, Item, Spell, Stats};
use super::dungeon::{Dungeon, Monster, MonsterKind, Terrain};
use crate::core::config::require_players;
use crate::core::{
    Action, ActionError, ActionKind, Cell, ConfigError, Cost, Dice, DiceRoll, Effect, GameDetail,
    GameRng, GameState, Outcome, PlayerConfig, PlayerId, Resource, ScriptedDice, Seat,
};
use crate::rules::{
    check_cost, resolve_attack, Attack, AttackRoll, GameKind, GameResult, HitPoints, RulesEngine,
};

/// Seat 0 always runs the dungeon.
pub const DUNGEON_MASTER: PlayerId = PlayerId::new(0);

/// Adventurer starting cells, seats 1 to 5.
pub const START_CELLS: [Cell; 5] = [
    Cell::new(0, 0),
    Cell::new(0, 1),
    Cell::new(1, 0),
    Cell::new(1, 1),
    Cell::new(2, 0),
];

const MOVES_PER_TURN: u32 = 6;
const PROFICIENCY: i64 = 2;
/// Ranged weapons and ranged spells, in cells.
const REACH: i32 = 6;
const MAX_MONSTERS: usize = 8;
const SEARCH_DC: i64 = 10;
const DM_INITIATIVE: i64 = 2;
const SHIELD_SPELL_AC: i64 = 5;
const TRAP_DAMAGE: DiceRoll = DiceRoll::new(1, 6, 0);
const SECOND_WIND: DiceRoll = DiceRoll::new(1, 10, 1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackMode {
    Melee,
    Ranged,
}

impl AttackMode {
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            AttackMode::Melee => "melee",
            AttackMode::Ranged => "ranged",
        }
    }

    const fn reach(self) -> i32 {
        match self {
            AttackMode::Melee => 1,
            AttackMode::Ranged => REACH,
        }
    }
}

/// What a spell is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
    Monster { id: usize },
    Adventurer { player: PlayerId },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DungeonsAction {
    /// One step to an adjacent cell. Six per turn.
    Move { to: Cell },
    Attack { monster: usize, mode: AttackMode },
    CastSpell { spell: Spell, target: Option<Target> },
    SecondWind,
    Dodge,
    Search,
    OpenDoor,
    /// Drink a potion, by item slug.
    UseItem { item: String },
    SpawnGoblin,
    PlaceTrap,
    MonsterAttack { monster: usize, target: PlayerId },
    AdvanceMonsters,
}

impl DungeonsAction {
    fn is_dungeon_master(&self) -> bool {
        matches!(
            self,
            DungeonsAction::SpawnGoblin
                | DungeonsAction::PlaceTrap
                | DungeonsAction::MonsterAttack { .. }
                | DungeonsAction::AdvanceMonsters
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adventurer {
    pub player: PlayerId,
    pub class: AdventurerClass,
    pub stats: Stats,
    pub hp: HitPoints,
    pub armor_class: i64,
    pub position: Cell,
    pub inventory: Vec<Item>,
    pub spells: Vec<Spell>,
    pub spell_slots: u32,
    pub gold: i64,
    pub experience: i64,
    pub second_wind_used: bool,
    /// Attacks against a dodging adventurer roll with disadvantage.
    pub dodging: bool,
    pub shielded: bool,
}

impl Adventurer {
    fn new(player: PlayerId, class: AdventurerClass, position: Cell) -> Self {
        Self {
            player,
            class,
            stats: class.stats(),
            hp: HitPoints::full(class.max_hp()),
            armor_class: class.armor_class(),
            position,
            inventory: class.inventory(),
            spells: class.spells(),
            spell_slots: class.spell_slots(),
            gold: 0,
            experience: 0,
            second_wind_used: false,
            dodging: false,
            shielded: false,
        }
    }

    /// Armor class including the Shield spell.
    #[must_use]
    pub fn effective_ac(&self) -> i64 {
        if self.shielded {
            self.armor_class + SHIELD_SPELL_AC
        } else {
            self.armor_class
        }
    }

    /// First weapon usable in `mode`.
    #[must_use]
    pub fn weapon(&self, mode: AttackMode) -> Option<(&str, DiceRoll)> {
        self.inventory.iter().find_map(|item| match item {
            Item::Weapon {
                name,
                damage,
                ranged,
            } if *ranged == (mode == AttackMode::Ranged) => Some((name.as_str(), *damage)),
            _ => None,
        })
    }

    const fn attack_modifier(&self, mode: AttackMode) -> i64 {
        match mode {
            AttackMode::Melee => self.stats.str_mod(),
            AttackMode::Ranged => self.stats.dex_mod(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeEntry {
    pub player: PlayerId,
    pub total: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonsView {
    /// Traps are left out.
    pub dungeon: Dungeon,
    pub adventurers: Vec<Adventurer>,
    /// Turn order while fighting, highest first. Empty while exploring.
    pub initiative: Vec<InitiativeEntry>,
    pub blessed: bool,
    pub moves_left: u32,
}

/// What the current player has used up this turn.
#[derive(Clone, Debug, PartialEq, Eq)]
struct TurnBudget {
    moves_left: u32,
    acted: bool,
    ended: bool,
    monsters_attacked: SmallVec<[usize; 8]>,
}

impl TurnBudget {
    fn fresh() -> Self {
        Self {
            moves_left: MOVES_PER_TURN,
            acted: false,
            ended: false,
            monsters_attacked: SmallVec::new(),
        }
    }
}

/// Builder for creating a `Dungeons` engine.
#[derive(Default)]
pub struct DungeonsBuilder {
    scripted: Option<ScriptedDice>,
}

impl DungeonsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll every die from `rolls`, cycling, instead of the seeded RNG.
    /// Trap placement still draws from the seed.
    pub fn scripted_dice(mut self, rolls: impl IntoIterator<Item = u32>) -> Self {
        self.scripted = Some(ScriptedDice::new(rolls));
        self
    }

    pub fn build(self, seed: u64) -> Dungeons {
        Dungeons {
            rng: GameRng::new(seed),
            scripted: self.scripted,
            seats: Vec::new(),
            adventurers: Vec::new(),
            dungeon: Dungeon::new(),
            initiative: Vec::new(),
            blessed: false,
            budget: TurnBudget::fresh(),
            round: 0,
            turn: 0,
            current: 0,
        }
    }
}

enum Plan {
    Move { to: Cell },
    Attack { monster: usize, mode: AttackMode, attack: Attack },
    Cast { spell: Spell, target: Option<Target> },
    SecondWind,
    Dodge,
    Search,
    OpenDoor { door: Cell },
    UseItem { index: usize },
    SpawnGoblin { cell: Cell },
    PlaceTrap,
    MonsterAttack { monster: usize, target: PlayerId },
    AdvanceMonsters,
    Pass,
}

impl Plan {
    fn cost(&self) -> Option<Cost> {
        match self {
            Plan::Cast { spell, .. } if spell.level() > 0 => Some(Cost::new(Resource::SpellSlots, 1)),
            _ => None,
        }
    }

    /// Uses the turn's one action.
    fn is_action(&self) -> bool {
        !matches!(self, Plan::Move { .. } | Plan::MonsterAttack { .. } | Plan::Pass)
    }
}

#[derive(Clone, Debug)]
pub struct Dungeons {
    rng: GameRng,
    scripted: Option<ScriptedDice>,
    seats: Vec<Seat>,
    /// Seats 1 and up, in seat order.
    adventurers: Vec<Adventurer>,
    dungeon: Dungeon,
    initiative: Vec<InitiativeEntry>,
    blessed: bool,
    budget: TurnBudget,
    round: u32,
    turn: u32,
    current: usize,
}

fn attack_effects(outcome: &mut Outcome, attack: &Attack, roll: &AttackRoll) {
    if !attack.auto_hit {
        let dice = if attack.disadvantage { "2d20 (lowest)" } else { "1d20" };
        outcome.push(Effect::Roll {
            purpose: "to hit".into(),
            dice: dice.into(),
            total: roll.total,
        });
    }
    if roll.hit {
        outcome.push(Effect::Roll {
            purpose: "damage".into(),
            dice: attack.damage.to_string(),
            total: roll.damage,
        });
    }
}

const fn spell_reach(spell: Spell) -> i32 {
    match spell {
        Spell::MagicMissile | Spell::SacredFlame => REACH,
        Spell::BurningHands | Spell::CureWounds => 1,
        Spell::Shield | Spell::Bless => 0,
    }
}

impl Dungeons {
    pub fn adventurer(&self, player: PlayerId) -> Option<&Adventurer> {
        self.adventurers.get(player.index().checked_sub(1)?)
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    /// Whether any monster still stands.
    #[must_use]
    pub fn in_combat(&self) -> bool {
        self.dungeon.living_monsters().next().is_some()
    }

    fn me_mut(&mut self, player: PlayerId) -> &mut Adventurer {
        &mut self.adventurers[player.index() - 1]
    }

    fn dice(&mut self) -> &mut dyn Dice {
        if let Some(dice) = self.scripted.as_mut() {
            return dice;
        }
        &mut self.rng
    }

    fn roll(&mut self, dice: DiceRoll) -> i64 {
        dice.roll(self.dice())
    }

    fn living_adventurers(&self) -> impl Iterator<Item = &Adventurer> {
        self.adventurers
            .iter()
            .filter(move |a| self.seats[a.player.index()].alive)
    }

    fn adventurer_cells(&self) -> Vec<Cell> {
        self.living_adventurers().map(|a| a.position).collect()
    }

    fn occupied(&self, cell: Cell) -> bool {
        self.living_adventurers().any(|a| a.position == cell)
            || self.dungeon.living_monsters().any(|m| m.position == cell)
    }

    fn living_monster(&self, id: usize) -> Result<&Monster, ActionError> {
        self.dungeon
            .monsters
            .get(id)
            .filter(|m| m.is_alive())
            .ok_or_else(|| ActionError::precondition(format!("no living monster {id}")))
    }

    fn living_adventurer(&self, player: PlayerId) -> Result<&Adventurer, ActionError> {
        self.adventurer(player)
            .filter(|a| self.seats[a.player.index()].alive)
            .ok_or_else(|| ActionError::precondition(format!("{player} is not a standing adventurer")))
    }

    /// Where the DM may spawn a goblin: the newest room's far corner.
    fn goblin_cell(&self) -> Result<Cell, ActionError> {
        if self.dungeon.living_monsters().count() >= MAX_MONSTERS {
            return Err(ActionError::Exhausted("monster roster".into()));
        }
        let room = self.dungeon.rooms.len().saturating_sub(1);
        self.dungeon
            .spawn_cell(room, &self.adventurer_cells())
            .ok_or_else(|| ActionError::Exhausted("free floor".into()))
    }

    fn trap_cells(&self) -> Vec<Cell> {
        self.dungeon
            .bounds
            .cells()
            .filter(|&c| {
                self.dungeon.terrain(c) == Terrain::Floor
                    && !self.occupied(c)
                    && !self.dungeon.traps.contains(&c)
            })
            .collect()
    }

    fn spell_targets(&self, me: &Adventurer, spell: Spell) -> Vec<Option<Target>> {
        let reach = spell_reach(spell);
        match spell {
            Spell::Shield | Spell::Bless => vec![None],
            Spell::CureWounds => self
                .living_adventurers()
                .filter(|a| me.position.distance(a.position) <= reach)
                .map(|a| Some(Target::Adventurer { player: a.player }))
                .collect(),
            Spell::MagicMissile | Spell::BurningHands | Spell::SacredFlame => self
                .dungeon
                .living_monsters()
                .filter(|m| me.position.distance(m.position) <= reach)
                .map(|m| Some(Target::Monster { id: m.id }))
                .collect(),
        }
    }

    fn plan(&self, player: PlayerId, action: &Action) -> Result<Plan, ActionError> {
        let dnd = match &action.kind {
            ActionKind::Pass => return Ok(Plan::Pass),
            ActionKind::Dungeons(a) => a,
            _ => return Err(ActionError::WrongGame),
        };
        match (player == DUNGEON_MASTER, dnd.is_dungeon_master()) {
            (true, true) => self.plan_dungeon_master(dnd),
            (false, false) => self.plan_adventurer(player, dnd),
            (true, false) => Err(ActionError::precondition("the dungeon master has no adventurer")),
            (false, true) => Err(ActionError::precondition(
                "only the dungeon master controls monsters",
            )),
        }
    }

    fn plan_dungeon_master(&self, action: &DungeonsAction) -> Result<Plan, ActionError> {
        match action {
            &DungeonsAction::MonsterAttack { monster, target } => {
                let attacker = self.living_monster(monster)?;
                if self.budget.monsters_attacked.contains(&monster) {
                    return Err(ActionError::precondition(format!(
                        "{} already attacked this turn",
                        attacker.label()
                    )));
                }
                let victim = self.living_adventurer(target)?;
                if !attacker.position.is_adjacent(victim.position) {
                    return Err(ActionError::precondition(format!(
                        "{} is not next to {target}",
                        attacker.label()
                    )));
                }
                Ok(Plan::MonsterAttack { monster, target })
            }
            _ if self.budget.acted => Err(ActionError::precondition(
                "the dungeon master already acted this turn",
            )),
            DungeonsAction::SpawnGoblin => self.goblin_cell().map(|cell| Plan::SpawnGoblin { cell }),
            DungeonsAction::PlaceTrap => {
                if self.trap_cells().is_empty() {
                    return Err(ActionError::Exhausted("free floor".into()));
                }
                Ok(Plan::PlaceTrap)
            }
            DungeonsAction::AdvanceMonsters => {
                if !self.in_combat() {
                    return Err(ActionError::precondition("no monsters to advance"));
                }
                Ok(Plan::AdvanceMonsters)
            }
            _ => Err(ActionError::precondition("the dungeon master has no adventurer")),
        }
    }

    fn plan_adventurer(&self, player: PlayerId, action: &DungeonsAction) -> Result<Plan, ActionError> {
        let me = self.living_adventurer(player)?;
        if let &DungeonsAction::Move { to } = action {
            if self.budget.moves_left == 0 {
                return Err(ActionError::Exhausted("movement".into()));
            }
            if !me.position.is_adjacent(to) {
                return Err(ActionError::precondition(format!("{to} is not adjacent")));
            }
            if !self.dungeon.is_walkable(to) {
                return Err(ActionError::precondition(format!("{to} is solid rock")));
            }
            if self.occupied(to) {
                return Err(ActionError::precondition(format!("{to} is occupied")));
            }
            return Ok(Plan::Move { to });
        }
        if self.budget.acted {
            return Err(ActionError::precondition("already acted this turn"));
        }

        match action {
            &DungeonsAction::Attack { monster, mode } => {
                let target = self.living_monster(monster)?;
                let (_, damage) = me.weapon(mode).ok_or_else(|| {
                    ActionError::precondition(format!("no {} weapon", mode.slug()))
                })?;
                if me.position.distance(target.position) > mode.reach() {
                    return Err(ActionError::precondition(format!(
                        "{} is out of reach",
                        target.label()
                    )));
                }
                let attack = Attack::new(me.attack_modifier(mode), damage)
                    .bonus(PROFICIENCY + i64::from(self.blessed));
                Ok(Plan::Attack {
                    monster,
                    mode,
                    attack,
                })
            }
            &DungeonsAction::CastSpell { spell, target } => {
                if !me.spells.contains(&spell) {
                    return Err(ActionError::precondition(format!(
                        "a {} cannot cast {}",
                        me.class.slug(),
                        spell.name()
                    )));
                }
                if spell.level() > 0 {
                    ActionError::require(Resource::SpellSlots, 1, i64::from(me.spell_slots))?;
                }
                if !self.spell_targets(me, spell).contains(&target) {
                    return Err(ActionError::precondition(format!(
                        "invalid target for {}",
                        spell.name()
                    )));
                }
                Ok(Plan::Cast { spell, target })
            }
            DungeonsAction::SecondWind => {
                if me.class != AdventurerClass::Fighter {
                    return Err(ActionError::precondition("only fighters have second wind"));
                }
                if me.second_wind_used {
                    return Err(ActionError::Exhausted("second wind".into()));
                }
                Ok(Plan::SecondWind)
            }
            DungeonsAction::Dodge => Ok(Plan::Dodge),
            DungeonsAction::Search | DungeonsAction::OpenDoor if self.in_combat() => {
                Err(ActionError::WrongPhase("combat".into()))
            }
            DungeonsAction::Search => Ok(Plan::Search),
            DungeonsAction::OpenDoor => {
                if self.dungeon.terrain(me.position) != Terrain::Door {
                    return Err(ActionError::precondition("not standing on a door"));
                }
                Ok(Plan::OpenDoor { door: me.position })
            }
            DungeonsAction::UseItem { item } => me
                .inventory
                .iter()
                .position(|i| matches!(i, Item::Potion { .. }) && &i.slug() == item)
                .map(|index| Plan::UseItem { index })
                .ok_or_else(|| ActionError::precondition(format!("no usable {item}"))),
            _ => Err(ActionError::precondition(
                "only the dungeon master controls monsters",
            )),
        }
    }

    fn apply(&mut self, player: PlayerId, plan: Plan) -> Outcome {
        let name = self.seats[player.index()].name.clone();
        if plan.is_action() {
            self.budget.acted = true;
        }
        let outcome = match plan {
            Plan::Move { to } => self.move_adventurer(player, &name, to),
            Plan::Attack {
                monster,
                mode,
                attack,
            } => {
                let armor = self.dungeon.monsters[monster].kind.armor_class();
                let roll = resolve_attack(&attack, armor, self.dice());
                let mut outcome = Outcome::new(format!(
                    "{name} made a {} attack on {}",
                    mode.slug(),
                    self.dungeon.monsters[monster].label()
                ));
                attack_effects(&mut outcome, &attack, &roll);
                if roll.hit {
                    self.hit_monster(player, monster, roll.damage, &mut outcome);
                }
                outcome
            }
            Plan::Cast { spell, target } => self.cast(player, &name, spell, target),
            Plan::SecondWind => {
                let amount = self.roll(SECOND_WIND);
                self.me_mut(player).second_wind_used = true;
                let mut outcome = Outcome::new(format!("{name} used Second Wind"));
                self.heal_adventurer(player, amount, &mut outcome);
                outcome
            }
            Plan::Dodge => {
                self.me_mut(player).dodging = true;
                Outcome::new(format!("{name} is dodging"))
            }
            Plan::Search => self.search(player, &name),
            Plan::OpenDoor { door } => self.open_door(&name, door),
            Plan::UseItem { index } => {
                let item = self.me_mut(player).inventory.remove(index);
                let mut outcome = Outcome::new(format!("{name} used {}", item.name()));
                if let Item::Potion { heal, .. } = item {
                    let amount = self.roll(heal);
                    self.heal_adventurer(player, amount, &mut outcome);
                }
                outcome
            }
            Plan::SpawnGoblin { cell } => {
                let id = self.dungeon.add_monster(MonsterKind::Goblin, cell);
                let label = self.dungeon.monsters[id].label();
                debug!(monster = %label, %cell, "goblin spawned");
                Outcome::new(format!("{name} spawned {label} at {cell}"))
            }
            Plan::PlaceTrap => {
                let cells = self.trap_cells();
                if let Some(&cell) = self.rng.choose(&cells) {
                    self.dungeon.traps.push(cell);
                    debug!(%cell, "trap placed");
                }
                Outcome::new(format!("{name} set a hidden trap"))
            }
            Plan::MonsterAttack { monster, target } => self.monster_attack(monster, target),
            Plan::AdvanceMonsters => self.advance_monsters(&name),
            Plan::Pass => {
                self.budget.ended = true;
                Outcome::new(format!("{name} ended their turn"))
            }
        };
        self.sync_scores();
        outcome
    }

    fn move_adventurer(&mut self, player: PlayerId, name: &str, to: Cell) -> Outcome {
        self.budget.moves_left -= 1;
        let me = self.me_mut(player);
        let from = std::mem::replace(&mut me.position, to);
        let mut outcome = Outcome::new(format!("{name} moved to {to}")).with(Effect::Moved {
            unit: me.class.slug().to_string(),
            from: from.to_string(),
            to: to.to_string(),
        });
        if let Some(i) = self.dungeon.traps.iter().position(|&t| t == to) {
            self.dungeon.traps.swap_remove(i);
            let damage = self.roll(TRAP_DAMAGE);
            info!(player = %player, cell = %to, damage, "trap sprung");
            outcome.push(Effect::Roll {
                purpose: "trap".into(),
                dice: TRAP_DAMAGE.to_string(),
                total: damage,
            });
            self.hurt_adventurer(player, damage, &mut outcome);
        }
        outcome
    }

    fn cast(&mut self, player: PlayerId, name: &str, spell: Spell, target: Option<Target>) -> Outcome {
        let mut outcome = Outcome::new(format!("{name} cast {}", spell.name()));
        if spell.level() > 0 {
            self.me_mut(player).spell_slots -= 1;
            outcome.push(Effect::Resource {
                player,
                resource: Resource::SpellSlots,
                delta: -1,
            });
        }
        match (spell, target) {
            (Spell::Shield, _) => {
                self.me_mut(player).shielded = true;
                outcome.note(format!("+{SHIELD_SPELL_AC} armor class until their next turn"));
            }
            (Spell::Bless, _) => {
                self.blessed = true;
                outcome.note("the party is blessed until the round ends");
            }
            (Spell::CureWounds, Some(Target::Adventurer { player: ally })) => {
                let wisdom = self.me_mut(player).stats.wis_mod();
                let amount = spell.dice().map_or(0, |d| self.roll(d)) + wisdom;
                self.heal_adventurer(ally, amount, &mut outcome);
            }
            (_, Some(Target::Monster { id })) => {
                if let Some(dice) = spell.dice() {
                    let attack = Attack::new(0, dice).auto_hit();
                    let roll = resolve_attack(&attack, 0, self.dice());
                    attack_effects(&mut outcome, &attack, &roll);
                    self.hit_monster(player, id, roll.damage, &mut outcome);
                }
            }
            _ => {}
        }
        outcome
    }

    fn search(&mut self, player: PlayerId, name: &str) -> Outcome {
        let (wisdom, position) = {
            let me = self.me_mut(player);
            (me.stats.wis_mod(), me.position)
        };
        let check = i64::from(self.dice().roll(20)) + wisdom;
        let mut outcome = Outcome::new(format!("{name} searched the room")).with(Effect::Roll {
            purpose: "search".into(),
            dice: "1d20".into(),
            total: check,
        });
        if check < SEARCH_DC {
            outcome.note("found nothing");
            return outcome;
        }
        let gold = self
            .dungeon
            .room_at(position)
            .map_or(0, |r| std::mem::take(&mut self.dungeon.rooms[r].treasure));
        if gold == 0 {
            outcome.note("nothing left to find");
        } else {
            self.me_mut(player).gold += gold;
            outcome.push(Effect::Resource {
                player,
                resource: Resource::Gold,
                delta: gold,
            });
        }
        outcome
    }

    fn open_door(&mut self, name: &str, door: Cell) -> Outcome {
        let Some(kind) = self.dungeon.open_door(door) else {
            return Outcome::new(format!("the door at {door} leads nowhere"));
        };
        let mut outcome = Outcome::new(format!("{name} opened the door to the {}", kind.slug()));
        let room = self.dungeon.rooms.len() - 1;
        let taken = self.adventurer_cells();
        for &enemy in kind.enemies() {
            if let Some(id) = self.dungeon.spawn(enemy, room, &taken) {
                outcome.note(format!("{} appears", self.dungeon.monsters[id].label()));
            }
        }
        info!(room = kind.slug(), monsters = kind.enemies().len(), "room opened");
        outcome
    }

    fn monster_attack(&mut self, monster: usize, target: PlayerId) -> Outcome {
        self.budget.monsters_attacked.push(monster);
        let (kind, label) = {
            let m = &self.dungeon.monsters[monster];
            (m.kind, m.label())
        };
        let victim = &self.adventurers[target.index() - 1];
        let attack = Attack::new(0, kind.damage())
            .bonus(kind.attack_bonus())
            .with_disadvantage(victim.dodging);
        let armor = victim.effective_ac();
        let roll = resolve_attack(&attack, armor, self.dice());
        let mut outcome = Outcome::new(format!(
            "{label} attacked {}",
            self.seats[target.index()].name
        ));
        attack_effects(&mut outcome, &attack, &roll);
        if roll.hit {
            self.hurt_adventurer(target, roll.damage, &mut outcome);
        }
        outcome
    }

    /// Every living monster takes one step toward the nearest adventurer.
    fn advance_monsters(&mut self, name: &str) -> Outcome {
        let mut outcome = Outcome::new(format!("{name} advanced the monsters"));
        for idx in 0..self.dungeon.monsters.len() {
            let monster = &self.dungeon.monsters[idx];
            if !monster.is_alive() {
                continue;
            }
            let here = monster.position;
            let Some(goal) = self
                .living_adventurers()
                .min_by_key(|a| (here.distance(a.position), a.player))
                .map(|a| a.position)
            else {
                break;
            };
            if here.is_adjacent(goal) {
                continue;
            }
            let step = here.step_toward(goal);
            if self.dungeon.is_walkable(step) && !self.occupied(step) {
                let monster = &mut self.dungeon.monsters[idx];
                monster.position = step;
                outcome.push(Effect::Moved {
                    unit: monster.label(),
                    from: here.to_string(),
                    to: step.to_string(),
                });
            }
        }
        outcome
    }

    fn hit_monster(&mut self, player: PlayerId, id: usize, damage: i64, outcome: &mut Outcome) {
        let monster = &mut self.dungeon.monsters[id];
        let dealt = monster.hp.damage(damage);
        let label = monster.label();
        let slain = !monster.is_alive();
        let experience = monster.kind.experience();
        outcome.push(Effect::Damage {
            target: label.clone(),
            amount: dealt,
        });
        if slain {
            info!(monster = %label, player = %player, "monster slain");
            outcome.push(Effect::Defeated { target: label });
            self.me_mut(player).experience += experience;
            outcome.push(Effect::Resource {
                player,
                resource: Resource::Experience,
                delta: experience,
            });
        }
    }

    fn hurt_adventurer(&mut self, player: PlayerId, damage: i64, outcome: &mut Outcome) {
        let me = self.me_mut(player);
        let dealt = me.hp.damage(damage);
        let down = me.hp.is_defeated();
        let class = me.class;
        let seat = &mut self.seats[player.index()];
        outcome.push(Effect::Damage {
            target: seat.name.clone(),
            amount: dealt,
        });
        if down && seat.alive {
            seat.alive = false;
            outcome.push(Effect::Eliminated { player });
            info!(player = %player, class = class.slug(), "adventurer down");
        }
    }

    fn heal_adventurer(&mut self, player: PlayerId, amount: i64, outcome: &mut Outcome) {
        let healed = self.me_mut(player).hp.heal(amount);
        outcome.push(Effect::Healed {
            target: self.seats[player.index()].name.clone(),
            amount: healed,
        });
    }

    fn sync_scores(&mut self) {
        for adventurer in &self.adventurers {
            self.seats[adventurer.player.index()].score = adventurer.experience;
        }
    }

    /// d20 + DEX for adventurers, d20 + 2 for the DM; ties go to the lower seat.
    fn roll_initiative(&mut self) {
        let mut order = Vec::new();
        for player in PlayerId::all(self.seats.len()) {
            if !self.seats[player.index()].alive {
                continue;
            }
            let bonus = self
                .adventurer(player)
                .map_or(DM_INITIATIVE, |a| a.stats.dex_mod());
            let total = i64::from(self.dice().roll(20)) + bonus;
            order.push(InitiativeEntry { player, total });
        }
        order.sort_by_key(|e| (Reverse(e.total), e.player));
        self.initiative = order;
    }

    fn turn_order(&self) -> Vec<PlayerId> {
        if self.initiative.is_empty() {
            PlayerId::all(self.seats.len()).collect()
        } else {
            self.initiative.iter().map(|e| e.player).collect()
        }
    }

    /// Reset the turn budget and the incoming adventurer's reactions.
    fn start_turn(&mut self) {
        self.budget = TurnBudget::fresh();
        let slot = self.current.checked_sub(1);
        if let Some(me) = slot.and_then(|i| self.adventurers.get_mut(i)) {
            me.dodging = false;
            me.shielded = false;
        }
    }
}

impl RulesEngine for Dungeons {
    fn kind(&self) -> GameKind {
        GameKind::DungeonsDragons
    }

    fn setup(&mut self, players: &[PlayerConfig]) -> Result<GameState, ConfigError> {
        if self.is_set_up() {
            return Err(ConfigError::AlreadySetUp);
        }
        let count = GameKind::DungeonsDragons.player_count();
        require_players(GameKind::DungeonsDragons.id(), count, players)?;
        let classes = players
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, p)| {
                p.class
                    .as_deref()
                    .map_or(Ok(AdventurerClass::ALL[i - 1]), AdventurerClass::parse)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.seats = players
            .iter()
            .enumerate()
            .map(|(i, p)| Seat::new(PlayerId::new(i as u8), p.name.clone()))
            .collect();
        self.adventurers = classes
            .into_iter()
            .zip(START_CELLS)
            .enumerate()
            .map(|(i, (class, cell))| Adventurer::new(PlayerId::new(i as u8 + 1), class, cell))
            .collect();
        self.dungeon = Dungeon::new();
        self.current = DUNGEON_MASTER.index();
        self.budget = TurnBudget::fresh();
        self.round = 1;
        self.turn = 1;

        info!(
            adventurers = self.adventurers.len(),
            classes = ?self.adventurers.iter().map(|a| a.class.slug()).collect::<Vec<_>>(),
            "dungeon set up"
        );
        Ok(self.state())
    }

    fn state(&self) -> GameState {
        let mut dungeon = self.dungeon.clone();
        dungeon.traps.clear();
        let phase = if self.in_combat() { "combat" } else { "exploration" };
        GameState {
            game: GameKind::DungeonsDragons,
            turn: self.turn,
            round: self.round,
            phase: phase.to_string(),
            current_player: self.current_player(),
            game_over: self.is_terminal().is_some(),
            winners: self.is_terminal().map(|r| r.winners()).unwrap_or_default(),
            seats: self.seats.clone(),
            decks: Vec::new(),
            detail: GameDetail::Dungeons(DungeonsView {
                dungeon,
                adventurers: self.adventurers.clone(),
                initiative: self.initiative.clone(),
                blessed: self.blessed,
                moves_left: self.budget.moves_left,
            }),
        }
    }

    fn legal_actions(&self, player: PlayerId) -> Vec<Action> {
        if !self.can_act(player) {
            return Vec::new();
        }
        let action = |id: String, description: String, a: DungeonsAction| {
            Action::new(id, description, ActionKind::Dungeons(a))
        };
        let mut actions = Vec::new();

        if player == DUNGEON_MASTER {
            if !self.budget.acted {
                if let Ok(cell) = self.goblin_cell() {
                    actions.push(action(
                        "spawn_goblin".into(),
                        format!("Spawn a goblin at {cell}"),
                        DungeonsAction::SpawnGoblin,
                    ));
                }
                if !self.trap_cells().is_empty() {
                    actions.push(action(
                        "place_trap".into(),
                        "Hide a trap on a free floor cell".into(),
                        DungeonsAction::PlaceTrap,
                    ));
                }
                if self.in_combat() {
                    actions.push(action(
                        "advance_monsters".into(),
                        "Move every monster toward the party".into(),
                        DungeonsAction::AdvanceMonsters,
                    ));
                }
            }
            for m in self.dungeon.living_monsters() {
                if self.budget.monsters_attacked.contains(&m.id) {
                    continue;
                }
                for a in self.living_adventurers().filter(|a| m.position.is_adjacent(a.position)) {
                    actions.push(action(
                        format!("monster_attack_{}_p{}", m.id, a.player.index()),
                        format!("{} attacks {}", m.label(), self.seats[a.player.index()].name),
                        DungeonsAction::MonsterAttack {
                            monster: m.id,
                            target: a.player,
                        },
                    ));
                }
            }
        } else if let Some(me) = self.adventurer(player) {
            if self.budget.moves_left > 0 {
                for to in me.position.neighbours() {
                    if self.dungeon.is_walkable(to) && !self.occupied(to) {
                        actions.push(action(
                            format!("move_{}_{}", to.x, to.y),
                            format!("Move to {to}"),
                            DungeonsAction::Move { to },
                        ));
                    }
                }
            }
            if !self.budget.acted {
                self.adventurer_actions(me, &mut actions);
            }
        }

        actions.push(Action::pass("End turn"));
        actions
    }

    fn execute(&mut self, player: PlayerId, action: &Action) -> Result<Outcome, ActionError> {
        self.check_actor(player)?;
        let plan = self
            .plan(player, action)
            .and_then(|plan| check_cost(action, plan.cost()).map(|()| plan));
        let plan = match plan {
            Ok(plan) => plan,
            Err(err) => {
                debug!(player = %player, action = %action.id, %err, "action rejected");
                return Err(err);
            }
        };
        debug!(player = %player, action = %action.id, "executing");
        Ok(self.apply(player, plan))
    }

    fn advance_turn(&mut self) {
        if !self.is_set_up() || self.is_terminal().is_some() {
            return;
        }
        self.turn += 1;
        let in_combat = self.in_combat();

        if in_combat && self.initiative.is_empty() {
            self.roll_initiative();
            info!(
                order = ?self.initiative.iter().map(|e| e.player.index()).collect::<Vec<_>>(),
                "combat started"
            );
            if let Some(first) = self.initiative.first() {
                self.current = first.player.index();
            }
            self.start_turn();
            return;
        }
        if !in_combat && !self.initiative.is_empty() {
            self.initiative.clear();
            info!(round = self.round, "combat over");
        }

        let order = self.turn_order();
        let n = order.len();
        let pos = order
            .iter()
            .position(|p| p.index() == self.current)
            .unwrap_or(0);
        let Some(step) = (1..=n).find(|s| self.seats[order[(pos + s) % n].index()].alive) else {
            return;
        };
        if pos + step >= n {
            self.round += 1;
            self.blessed = false;
            debug!(round = self.round, "round started");
        }
        self.current = order[(pos + step) % n].index();
        self.start_turn();
    }

    /// `None` while the player whose turn it was has just been eliminated.
    fn current_player(&self) -> Option<PlayerId> {
        if !self.is_set_up() || self.is_terminal().is_some() || !self.seats[self.current].alive {
            return None;
        }
        Some(PlayerId::new(self.current as u8))
    }

    fn seats(&self) -> &[Seat] {
        &self.seats
    }

    fn is_terminal(&self) -> Option<GameResult> {
        if !self.is_set_up() {
            return None;
        }
        let living: Vec<PlayerId> = self.living_adventurers().map(|a| a.player).collect();
        if living.is_empty() {
            return Some(GameResult::Winner(DUNGEON_MASTER));
        }
        let dragon_slain = self
            .dungeon
            .monsters
            .iter()
            .any(|m| m.kind == MonsterKind::YoungDragon && !m.is_alive());
        if dragon_slain || (self.dungeon.lair_open() && !self.in_combat()) {
            Some(GameResult::from_leaders(living))
        } else {
            None
        }
    }

    fn turn_complete(&self, player: PlayerId) -> bool {
        player.index() == self.current
            && (self.budget.ended
                || (player != DUNGEON_MASTER && self.budget.acted && self.budget.moves_left == 0))
    }
}

impl Dungeons {
    fn adventurer_actions(&self, me: &Adventurer, actions: &mut Vec<Action>) {
        let push = |actions: &mut Vec<Action>, id: String, description: String, a: DungeonsAction| {
            actions.push(Action::new(id, description, ActionKind::Dungeons(a)));
        };

        for mode in [AttackMode::Melee, AttackMode::Ranged] {
            let Some((weapon, _)) = me.weapon(mode) else {
                continue;
            };
            for m in self
                .dungeon
                .living_monsters()
                .filter(|m| me.position.distance(m.position) <= mode.reach())
            {
                push(
                    actions,
                    format!("attack_{}_{}", m.id, mode.slug()),
                    format!("Attack {} with {weapon}", m.label()),
                    DungeonsAction::Attack {
                        monster: m.id,
                        mode,
                    },
                );
            }
        }

        for &spell in &me.spells {
            if spell.level() > 0 && me.spell_slots == 0 {
                continue;
            }
            for target in self.spell_targets(me, spell) {
                let suffix = match target {
                    None => String::new(),
                    Some(Target::Monster { id }) => format!("_m{id}"),
                    Some(Target::Adventurer { player }) => format!("_p{}", player.index()),
                };
                let action = Action::new(
                    format!("cast_{}{suffix}", spell.slug()),
                    format!("Cast {}", spell.name()),
                    ActionKind::Dungeons(DungeonsAction::CastSpell { spell, target }),
                );
                actions.push(if spell.level() > 0 {
                    action.with_cost(Cost::new(Resource::SpellSlots, 1))
                } else {
                    action
                });
            }
        }

        if me.class == AdventurerClass::Fighter && !me.second_wind_used {
            push(
                actions,
                "second_wind".into(),
                format!("Second Wind: heal {SECOND_WIND}"),
                DungeonsAction::SecondWind,
            );
        }
        push(
            actions,
            "dodge".into(),
            "Dodge until your next turn".into(),
            DungeonsAction::Dodge,
        );
        if !self.in_combat() {
            push(
                actions,
                "search".into(),
                "Search the room for treasure".into(),
                DungeonsAction::Search,
            );
            if self.dungeon.terrain(me.position) == Terrain::Door {
                push(
                    actions,
                    "open_door".into(),
                    "Open the door".into(),
                    DungeonsAction::OpenDoor,
                );
            }
        }

        let mut offered: Vec<String> = Vec::new();
        for item in &me.inventory {
            if let Item::Potion { name, heal } = item {
                let slug = item.slug();
                if offered.contains(&slug) {
                    continue;
                }
                push(
                    actions,
                    format!("use_{slug}"),
                    format!("Drink {name} ({heal})"),
                    DungeonsAction::UseItem { item: slug.clone() },
                );
                offered.push(slug);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::dungeons::dungeon::RoomKind;

    const FIGHTER: PlayerId = PlayerId::new(1);
    const WIZARD: PlayerId = PlayerId::new(2);
    const ROGUE: PlayerId = PlayerId::new(3);
    const CLERIC: PlayerId = PlayerId::new(4);
    const RANGER: PlayerId = PlayerId::new(5);

    fn new_game(rolls: &[u32]) -> Dungeons {
        let mut game = DungeonsBuilder::new()
            .scripted_dice(rolls.iter().copied())
            .build(3);
        game.setup(&PlayerConfig::numbered(6)).unwrap();
        game
    }

    fn act(a: DungeonsAction) -> Action {
        Action::new("x", "", ActionKind::Dungeons(a))
    }

    fn ids(game: &Dungeons, player: PlayerId) -> Vec<String> {
        game.legal_actions(player).into_iter().map(|a| a.id).collect()
    }

    fn give_turn(game: &mut Dungeons, player: PlayerId) {
        game.current = player.index();
        game.start_turn();
    }

    fn place(game: &mut Dungeons, player: PlayerId, cell: Cell) {
        game.me_mut(player).position = cell;
    }

    #[test]
    fn test_setup_seats_and_classes() {
        let game = new_game(&[10]);
        assert_eq!(game.seats().len(), 6);
        assert!(game.adventurer(DUNGEON_MASTER).is_none());
        assert_eq!(game.adventurer(FIGHTER).unwrap().class, AdventurerClass::Fighter);
        assert_eq!(game.adventurer(RANGER).unwrap().position, Cell::new(2, 0));
        assert_eq!(game.adventurer(WIZARD).unwrap().spell_slots, 2);
        let state = game.state();
        assert_eq!(state.phase, "exploration");
        assert_eq!(state.current_player, Some(DUNGEON_MASTER));
    }

    #[test]
    fn test_configured_and_unknown_class() {
        let mut players = PlayerConfig::numbered(6);
        players[2] = PlayerConfig::new("Vex").with_class("ranger");
        let mut game = DungeonsBuilder::new().build(1);
        game.setup(&players).unwrap();
        assert_eq!(game.adventurer(WIZARD).unwrap().class, AdventurerClass::Ranger);

        players[3] = PlayerConfig::new("Pike").with_class("bard");
        let mut game = DungeonsBuilder::new().build(1);
        assert_eq!(
            game.setup(&players),
            Err(ConfigError::UnknownClass {
                game: "dungeons_dragons".into(),
                class: "bard".into()
            })
        );
        assert!(!game.is_set_up());
    }

    #[test]
    fn test_dungeon_master_options_while_exploring() {
        let game = new_game(&[10]);
        let dm = ids(&game, DUNGEON_MASTER);
        assert!(dm.contains(&"spawn_goblin".to_string()));
        assert!(dm.contains(&"place_trap".to_string()));
        assert!(!dm.contains(&"advance_monsters".to_string()));
        assert_eq!(dm.last().map(String::as_str), Some("pass"));
        assert!(game.legal_actions(FIGHTER).is_empty());
    }

    #[test]
    fn test_roles_are_enforced() {
        let mut game = new_game(&[10]);
        assert_eq!(
            game.execute(DUNGEON_MASTER, &act(DungeonsAction::Dodge)),
            Err(ActionError::precondition("the dungeon master has no adventurer"))
        );
        give_turn(&mut game, FIGHTER);
        assert_eq!(
            game.execute(FIGHTER, &act(DungeonsAction::SpawnGoblin)),
            Err(ActionError::precondition("only the dungeon master controls monsters"))
        );
    }

    #[test]
    fn test_spawn_then_initiative_order() {
        let mut game = new_game(&[10]);
        game.execute(DUNGEON_MASTER, &act(DungeonsAction::SpawnGoblin))
            .unwrap();
        assert_eq!(game.dungeon().monsters[0].position, Cell::new(4, 4));
        assert!(!ids(&game, DUNGEON_MASTER).contains(&"spawn_goblin".to_string()));
        assert_eq!(
            game.execute(DUNGEON_MASTER, &act(DungeonsAction::SpawnGoblin)),
            Err(ActionError::precondition("the dungeon master already acted this turn"))
        );
        assert!(!game.turn_complete(DUNGEON_MASTER));
        game.execute(DUNGEON_MASTER, &Action::pass("")).unwrap();
        assert!(game.turn_complete(DUNGEON_MASTER));

        game.advance_turn();
        // every d20 is 10: rogue 13, ranger 13, DM 12, wizard 12, fighter 11, cleric 10
        let order: Vec<_> = game.initiative.iter().map(|e| e.player.index()).collect();
        assert_eq!(order, vec![3, 5, 0, 2, 1, 4]);
        assert_eq!(game.current_player(), Some(ROGUE));
        assert_eq!(game.state().phase, "combat");

        game.blessed = true;
        for _ in 0..5 {
            game.advance_turn();
        }
        assert_eq!(game.current_player(), Some(CLERIC));
        assert_eq!(game.state().round, 1);
        game.advance_turn();
        assert_eq!(game.current_player(), Some(ROGUE));
        assert_eq!(game.state().round, 2);
        assert!(!game.blessed);
    }

    #[test]
    fn test_melee_kill_awards_experience() {
        // d20 12 + STR 3 + proficiency 2 = 17 vs AC 15; 1d8 5 + 3 = 8
        let mut game = new_game(&[12, 5]);
        place(&mut game, FIGHTER, Cell::new(3, 3));
        game.dungeon.add_monster(MonsterKind::Goblin, Cell::new(4, 4));
        give_turn(&mut game, FIGHTER);
        assert!(ids(&game, FIGHTER).contains(&"attack_0_melee".to_string()));

        let out = game
            .execute(
                FIGHTER,
                &act(DungeonsAction::Attack {
                    monster: 0,
                    mode: AttackMode::Melee,
                }),
            )
            .unwrap();
        assert!(!game.dungeon().monsters[0].is_alive());
        assert!(out.effects.contains(&Effect::Damage {
            target: "Goblin 0".into(),
            amount: 7
        }));
        assert!(out.effects.contains(&Effect::Defeated {
            target: "Goblin 0".into()
        }));
        assert_eq!(game.adventurer(FIGHTER).unwrap().experience, 50);
        assert_eq!(game.state().seats[1].score, 50);
        assert!(!game.turn_complete(FIGHTER));
    }

    #[test]
    fn test_ranged_miss_and_melee_reach() {
        let mut game = new_game(&[3]);
        game.dungeon.add_monster(MonsterKind::Goblin, Cell::new(4, 4));
        give_turn(&mut game, RANGER);
        let listed = ids(&game, RANGER);
        assert!(listed.contains(&"attack_0_ranged".to_string()));
        assert!(!listed.contains(&"attack_0_melee".to_string()));

        let melee = act(DungeonsAction::Attack {
            monster: 0,
            mode: AttackMode::Melee,
        });
        assert_eq!(
            game.execute(RANGER, &melee),
            Err(ActionError::precondition("Goblin 0 is out of reach"))
        );

        let ranged = act(DungeonsAction::Attack {
            monster: 0,
            mode: AttackMode::Ranged,
        });
        let out = game.execute(RANGER, &ranged).unwrap();
        assert_eq!(
            out.effects,
            vec![Effect::Roll {
                purpose: "to hit".into(),
                dice: "1d20".into(),
                total: 8
            }]
        );
        assert_eq!(game.dungeon().monsters[0].hp.current, 7);
    }

    #[test]
    fn test_spell_slots_are_spent_and_priced() {
        let mut game = new_game(&[1]);
        game.dungeon.add_monster(MonsterKind::Goblin, Cell::new(4, 4));
        give_turn(&mut game, WIZARD);
        let missile = game
            .legal_actions(WIZARD)
            .into_iter()
            .find(|a| a.id == "cast_magic_missile_m0")
            .unwrap();
        assert_eq!(missile.cost, Some(Cost::new(Resource::SpellSlots, 1)));

        let mut stale = missile.clone();
        stale.cost = None;
        assert!(matches!(game.execute(WIZARD, &stale), Err(ActionError::Stale(_))));

        let out = game.execute(WIZARD, &missile).unwrap();
        // 3d4+3 with every die showing 1
        assert_eq!(game.dungeon().monsters[0].hp.current, 1);
        assert!(out.effects.contains(&Effect::Resource {
            player: WIZARD,
            resource: Resource::SpellSlots,
            delta: -1
        }));
        assert_eq!(game.adventurer(WIZARD).unwrap().spell_slots, 1);

        give_turn(&mut game, WIZARD);
        game.me_mut(WIZARD).spell_slots = 0;
        assert!(!ids(&game, WIZARD).iter().any(|id| id.starts_with("cast_magic_missile")));
        assert_eq!(
            game.execute(WIZARD, &missile),
            Err(ActionError::Insufficient {
                resource: Resource::SpellSlots,
                need: 1,
                have: 0
            })
        );
    }

    #[test]
    fn test_cure_wounds_touches_an_ally() {
        let mut game = new_game(&[5]);
        game.me_mut(FIGHTER).hp.current = 4;
        give_turn(&mut game, CLERIC);
        assert!(ids(&game, CLERIC).contains(&"cast_cure_wounds_p1".to_string()));

        let cure = act(DungeonsAction::CastSpell {
            spell: Spell::CureWounds,
            target: Some(Target::Adventurer { player: FIGHTER }),
        })
        .with_cost(Cost::new(Resource::SpellSlots, 1));
        let out = game.execute(CLERIC, &cure).unwrap();
        assert_eq!(game.adventurer(FIGHTER).unwrap().hp.current, 12);
        assert!(out.effects.contains(&Effect::Healed {
            target: "Player1".into(),
            amount: 8
        }));
    }

    #[test]
    fn test_shield_spell_turns_a_hit() {
        let mut game = new_game(&[12]);
        game.dungeon.add_monster(MonsterKind::Goblin, Cell::new(0, 2));
        give_turn(&mut game, WIZARD);
        let shield = act(DungeonsAction::CastSpell {
            spell: Spell::Shield,
            target: None,
        })
        .with_cost(Cost::new(Resource::SpellSlots, 1));
        game.execute(WIZARD, &shield).unwrap();
        assert_eq!(game.adventurer(WIZARD).unwrap().effective_ac(), 17);

        give_turn(&mut game, DUNGEON_MASTER);
        assert!(ids(&game, DUNGEON_MASTER).contains(&"monster_attack_0_p2".to_string()));
        game.execute(
            DUNGEON_MASTER,
            &act(DungeonsAction::MonsterAttack {
                monster: 0,
                target: WIZARD,
            }),
        )
        .unwrap();
        // 12 + 4 = 16 misses AC 17
        assert_eq!(game.adventurer(WIZARD).unwrap().hp.current, 8);

        give_turn(&mut game, WIZARD);
        assert_eq!(game.adventurer(WIZARD).unwrap().effective_ac(), 12);
    }

    #[test]
    fn test_dodge_imposes_disadvantage() {
        let mut game = new_game(&[18, 3]);
        place(&mut game, FIGHTER, Cell::new(3, 3));
        game.dungeon.add_monster(MonsterKind::Goblin, Cell::new(4, 4));
        give_turn(&mut game, FIGHTER);
        game.execute(FIGHTER, &act(DungeonsAction::Dodge)).unwrap();

        give_turn(&mut game, DUNGEON_MASTER);
        let out = game
            .execute(
                DUNGEON_MASTER,
                &act(DungeonsAction::MonsterAttack {
                    monster: 0,
                    target: FIGHTER,
                }),
            )
            .unwrap();
        assert_eq!(
            out.effects,
            vec![Effect::Roll {
                purpose: "to hit".into(),
                dice: "2d20 (lowest)".into(),
                total: 7
            }]
        );
        assert_eq!(game.adventurer(FIGHTER).unwrap().hp.current, 12);
    }

    #[test]
    fn test_monster_attack_downs_adventurer() {
        let mut game = new_game(&[20, 6]);
        game.me_mut(WIZARD).hp.current = 1;
        game.dungeon.add_monster(MonsterKind::Goblin, Cell::new(0, 2));
        let attack = act(DungeonsAction::MonsterAttack {
            monster: 0,
            target: WIZARD,
        });
        let out = game.execute(DUNGEON_MASTER, &attack).unwrap();
        assert!(out.effects.contains(&Effect::Eliminated { player: WIZARD }));
        assert!(!game.seats()[2].alive);
        assert!(game.is_terminal().is_none());

        let again = act(DungeonsAction::MonsterAttack {
            monster: 0,
            target: CLERIC,
        });
        assert_eq!(
            game.execute(DUNGEON_MASTER, &again),
            Err(ActionError::precondition("Goblin 0 already attacked this turn"))
        );
    }

    #[test]
    fn test_traps_stay_hidden_and_spring() {
        let mut game = new_game(&[4]);
        game.execute(DUNGEON_MASTER, &act(DungeonsAction::PlaceTrap))
            .unwrap();
        assert_eq!(game.dungeon().traps.len(), 1);
        match game.state().detail {
            GameDetail::Dungeons(view) => assert!(view.dungeon.traps.is_empty()),
            other => panic!("unexpected detail {other:?}"),
        }

        place(&mut game, FIGHTER, Cell::new(3, 3));
        game.dungeon.traps = vec![Cell::new(3, 4)];
        give_turn(&mut game, FIGHTER);
        let out = game
            .execute(FIGHTER, &act(DungeonsAction::Move { to: Cell::new(3, 4) }))
            .unwrap();
        assert!(out.effects.contains(&Effect::Damage {
            target: "Player1".into(),
            amount: 4
        }));
        assert_eq!(game.adventurer(FIGHTER).unwrap().hp.current, 8);
        assert!(game.dungeon().traps.is_empty());
    }

    #[test]
    fn test_trap_death_ends_the_turn() {
        let mut game = new_game(&[6]);
        game.me_mut(WIZARD).hp.current = 1;
        place(&mut game, WIZARD, Cell::new(3, 3));
        game.dungeon.traps = vec![Cell::new(3, 4)];
        give_turn(&mut game, WIZARD);
        let out = game
            .execute(WIZARD, &act(DungeonsAction::Move { to: Cell::new(3, 4) }))
            .unwrap();

        assert!(out.effects.contains(&Effect::Eliminated { player: WIZARD }));
        assert!(!game.seats()[WIZARD.index()].alive);
        assert_eq!(game.current_player(), None);
        let state = game.state();
        assert_eq!(state.current_player, None);
        assert!(!state.game_over);
        assert!(game.legal_actions(WIZARD).is_empty());
        assert!(matches!(
            game.execute(WIZARD, &act(DungeonsAction::Dodge)),
            Err(ActionError::Eliminated(p)) if p == WIZARD
        ));

        game.advance_turn();
        assert_eq!(game.current_player(), Some(ROGUE));
    }

    #[test]
    fn test_search_claims_treasure_once() {
        let mut game = new_game(&[10]);
        give_turn(&mut game, CLERIC);
        let out = game.execute(CLERIC, &act(DungeonsAction::Search)).unwrap();
        assert!(out.effects.contains(&Effect::Resource {
            player: CLERIC,
            resource: Resource::Gold,
            delta: 50
        }));
        assert_eq!(game.dungeon().rooms[0].treasure, 0);

        give_turn(&mut game, CLERIC);
        game.execute(CLERIC, &act(DungeonsAction::Search)).unwrap();
        assert_eq!(game.adventurer(CLERIC).unwrap().gold, 50);

        game.dungeon.add_monster(MonsterKind::Goblin, Cell::new(4, 4));
        give_turn(&mut game, CLERIC);
        assert_eq!(
            game.execute(CLERIC, &act(DungeonsAction::Search)),
            Err(ActionError::WrongPhase("combat".into()))
        );
    }

    #[test]
    fn test_failed_search_finds_nothing() {
        let mut game = new_game(&[9]);
        give_turn(&mut game, ROGUE);
        game.execute(ROGUE, &act(DungeonsAction::Search)).unwrap();
        assert_eq!(game.adventurer(ROGUE).unwrap().gold, 0);
        assert_eq!(game.dungeon().rooms[0].treasure, 50);
    }

    #[test]
    fn test_opening_the_door_starts_combat() {
        let mut game = new_game(&[10]);
        place(&mut game, ROGUE, Cell::new(4, 2));
        give_turn(&mut game, ROGUE);
        assert!(ids(&game, ROGUE).contains(&"open_door".to_string()));

        game.execute(ROGUE, &act(DungeonsAction::OpenDoor)).unwrap();
        let dungeon = game.dungeon();
        assert_eq!(dungeon.rooms[1].kind, RoomKind::ThroneRoom);
        assert_eq!(dungeon.terrain(Cell::new(4, 2)), Terrain::Floor);
        assert_eq!(dungeon.monsters[0].kind, MonsterKind::GoblinBoss);
        assert_eq!(dungeon.monsters[0].position, Cell::new(14, 7));
        assert_eq!(game.state().phase, "combat");

        game.advance_turn();
        assert_eq!(game.initiative.len(), 6);
    }

    #[test]
    fn test_second_wind_and_potion() {
        let mut game = new_game(&[6]);
        game.me_mut(FIGHTER).hp.current = 3;
        give_turn(&mut game, FIGHTER);
        game.execute(FIGHTER, &act(DungeonsAction::SecondWind))
            .unwrap();
        assert_eq!(game.adventurer(FIGHTER).unwrap().hp.current, 10);

        give_turn(&mut game, FIGHTER);
        let listed = ids(&game, FIGHTER);
        assert!(!listed.contains(&"second_wind".to_string()));
        assert!(listed.contains(&"use_potion_of_healing".to_string()));
        assert_eq!(
            game.execute(FIGHTER, &act(DungeonsAction::SecondWind)),
            Err(ActionError::Exhausted("second wind".into()))
        );

        let potion = act(DungeonsAction::UseItem {
            item: "potion_of_healing".into(),
        });
        let out = game.execute(FIGHTER, &potion).unwrap();
        assert!(out.effects.contains(&Effect::Healed {
            target: "Player1".into(),
            amount: 2
        }));
        assert_eq!(game.adventurer(FIGHTER).unwrap().inventory.len(), 2);
    }

    #[test]
    fn test_movement_budget_and_turn_completion() {
        let mut game = new_game(&[1]);
        place(&mut game, FIGHTER, Cell::new(3, 3));
        give_turn(&mut game, FIGHTER);
        for step in 0..6 {
            let to = if step % 2 == 0 { Cell::new(3, 4) } else { Cell::new(3, 3) };
            game.execute(FIGHTER, &act(DungeonsAction::Move { to }))
                .unwrap();
        }
        assert!(!ids(&game, FIGHTER).iter().any(|id| id.starts_with("move_")));
        assert_eq!(
            game.execute(FIGHTER, &act(DungeonsAction::Move { to: Cell::new(3, 4) })),
            Err(ActionError::Exhausted("movement".into()))
        );
        assert!(!game.turn_complete(FIGHTER));

        game.execute(FIGHTER, &act(DungeonsAction::Dodge)).unwrap();
        assert!(game.turn_complete(FIGHTER));
        assert_eq!(
            game.execute(FIGHTER, &Action::pass("")),
            Err(ActionError::TurnComplete(FIGHTER))
        );
    }

    #[test]
    fn test_monsters_advance_on_the_party() {
        let mut game = new_game(&[10]);
        game.dungeon.add_monster(MonsterKind::Goblin, Cell::new(4, 4));
        assert!(ids(&game, DUNGEON_MASTER).contains(&"advance_monsters".to_string()));
        let out = game
            .execute(DUNGEON_MASTER, &act(DungeonsAction::AdvanceMonsters))
            .unwrap();
        assert_eq!(game.dungeon().monsters[0].position, Cell::new(3, 3));
        assert_eq!(
            out.effects,
            vec![Effect::Moved {
                unit: "Goblin 0".into(),
                from: "(4, 4)".into(),
                to: "(3, 3)".into()
            }]
        );
    }

    #[test]
    fn test_party_wiped_means_dungeon_master_wins() {
        let mut game = new_game(&[10]);
        for seat in game.seats.iter_mut().skip(1) {
            seat.alive = false;
        }
        let state = game.state();
        assert!(state.game_over);
        assert_eq!(state.winners, vec![DUNGEON_MASTER]);
        assert_eq!(state.current_player, None);
    }

    #[test]
    fn test_slaying_the_dragon_wins() {
        let mut game = new_game(&[20, 8]);
        place(&mut game, FIGHTER, Cell::new(3, 3));
        let dragon = game
            .dungeon
            .add_monster(MonsterKind::YoungDragon, Cell::new(4, 4));
        game.dungeon.monsters[dragon].hp.current = 1;
        give_turn(&mut game, FIGHTER);
        game.execute(
            FIGHTER,
            &act(DungeonsAction::Attack {
                monster: dragon,
                mode: AttackMode::Melee,
            }),
        )
        .unwrap();

        let state = game.state();
        assert!(state.game_over);
        assert_eq!(state.winners.len(), 5);
        assert!(!state.winners.contains(&DUNGEON_MASTER));
    }

    #[test]
    fn test_bless_adds_to_hit() {
        // 9 + 3 + 2 = 14 misses AC 15; blessed it is 15
        let mut game = new_game(&[9, 1]);
        place(&mut game, FIGHTER, Cell::new(3, 3));
        game.dungeon.add_monster(MonsterKind::Goblin, Cell::new(4, 4));
        give_turn(&mut game, CLERIC);
        let bless = act(DungeonsAction::CastSpell {
            spell: Spell::Bless,
            target: None,
        })
        .with_cost(Cost::new(Resource::SpellSlots, 1));
        game.execute(CLERIC, &bless).unwrap();

        give_turn(&mut game, FIGHTER);
        game.execute(
            FIGHTER,
            &act(DungeonsAction::Attack {
                monster: 0,
                mode: AttackMode::Melee,
            }),
        )
        .unwrap();
        assert_eq!(game.dungeon().monsters[0].hp.current, 3);
    }
}
