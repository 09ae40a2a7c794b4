//! Dune engine: phase machine, player actions and round end.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::board::{Arrakis, Territory};
use super::factions::{self, Faction, Leader, SpiceCard, TreacheryCard, TreacheryKind, STARTING_RESERVE};
use crate::core::config::require_players;
use crate::core::{
    Action, ActionError, ActionKind, ConfigError, Cost, Deck, DeckCount, DeckPosition, Effect,
    GameDetail, GameRng, GameState, Outcome, PlayerConfig, PlayerId, PlayerMap, Resource, Seat,
};
use crate::rules::{check_cost, GameKind, GameResult, RulesEngine};

/// Cumulative revival price: reviving n forces costs the first n entries.
const REVIVAL_COSTS: [i64; 10] = [2, 2, 2, 3, 3, 3, 4, 4, 4, 5];
const MAX_SHIPMENT: i64 = 7;
const MAX_TREACHERY: usize = 4;
const STRONGHOLDS_TO_WIN: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Storm,
    SpiceBlow,
    Bidding,
    Revival,
    Shipment,
    Movement,
    Battle,
    SpiceCollection,
    MentatPause,
}

impl Phase {
    #[must_use]
    pub const fn next(self) -> Phase {
        match self {
            Phase::Storm => Phase::SpiceBlow,
            Phase::SpiceBlow => Phase::Bidding,
            Phase::Bidding => Phase::Revival,
            Phase::Revival => Phase::Shipment,
            Phase::Shipment => Phase::Movement,
            Phase::Movement => Phase::Battle,
            Phase::Battle => Phase::SpiceCollection,
            Phase::SpiceCollection => Phase::MentatPause,
            Phase::MentatPause => Phase::Storm,
        }
    }

    /// Resolved by the engine with no player input.
    #[must_use]
    pub const fn is_automatic(self) -> bool {
        matches!(self, Phase::Storm | Phase::SpiceBlow | Phase::MentatPause)
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Phase::Storm => "storm",
            Phase::SpiceBlow => "spice_blow",
            Phase::Bidding => "bidding",
            Phase::Revival => "revival",
            Phase::Shipment => "shipment",
            Phase::Movement => "movement",
            Phase::Battle => "battle",
            Phase::SpiceCollection => "spice_collection",
            Phase::MentatPause => "mentat_pause",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DuneAction {
    Bid { amount: i64 },
    Revive { forces: i64 },
    Ship { territory: String, forces: i64 },
    /// Move every force from `from` to the adjacent `to`.
    Move { from: String, to: String },
    /// Battle plan: leader id plus optional weapon and defense card ids.
    Battle {
        territory: String,
        leader: String,
        weapon: Option<String>,
        defense: Option<String>,
    },
    CollectSpice { territory: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DunePlayer {
    pub faction: Faction,
    pub spice: i64,
    /// Off-planet forces available to ship.
    pub reserve: i64,
    /// Dead forces awaiting revival.
    pub tanks: i64,
    pub leaders: Vec<Leader>,
    pub treachery: Vec<TreacheryCard>,
}

impl DunePlayer {
    fn new(faction: Faction) -> Self {
        Self {
            faction,
            spice: faction.starting_spice(),
            reserve: STARTING_RESERVE,
            tanks: 0,
            leaders: faction.leaders(),
            treachery: Vec::new(),
        }
    }

    fn card(&self, id: &str, kind: TreacheryKind) -> Result<usize, ActionError> {
        self.treachery
            .iter()
            .position(|c| c.id == id && c.kind == kind)
            .ok_or_else(|| ActionError::precondition(format!("no {kind:?} card {id} in hand")))
    }

    fn strongest_leader(&self) -> Option<usize> {
        self.leaders
            .iter()
            .enumerate()
            .filter(|(_, l)| l.alive)
            .max_by_key(|(i, l)| (l.strength, std::cmp::Reverse(*i)))
            .map(|(i, _)| i)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighBid {
    pub player: PlayerId,
    pub amount: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuneView {
    pub phase: Phase,
    pub max_rounds: u32,
    pub board: Arrakis,
    pub players: Vec<DunePlayer>,
    /// Card up for auction this round.
    pub auction: Option<TreacheryCard>,
    pub high_bid: Option<HighBid>,
}

/// Builder for creating a `Dune` engine.
pub struct DuneBuilder {
    max_rounds: u32,
}

impl Default for DuneBuilder {
    fn default() -> Self {
        Self { max_rounds: 10 }
    }
}

impl DuneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_rounds(mut self, rounds: u32) -> Self {
        assert!(rounds > 0, "Need at least one round");
        self.max_rounds = rounds;
        self
    }

    pub fn build(self, seed: u64) -> Dune {
        Dune {
            max_rounds: self.max_rounds,
            rng: GameRng::new(seed),
            seats: Vec::new(),
            players: PlayerMap::default(),
            board: Arrakis::new(),
            spice_deck: Deck::new(),
            spice_discard: Deck::new(),
            treachery_deck: Deck::new(),
            treachery_discard: Deck::new(),
            auction: None,
            high_bid: None,
            phase: Phase::Bidding,
            round: 0,
            turn: 0,
            current: 0,
            acted: false,
            result: None,
        }
    }
}

enum Plan {
    Bid {
        amount: i64,
    },
    Revive {
        forces: i64,
        cost: i64,
    },
    Ship {
        territory: usize,
        forces: i64,
        cost: i64,
    },
    Move {
        from: usize,
        to: usize,
        forces: i64,
        cost: i64,
    },
    Battle {
        territory: usize,
        opponent: PlayerId,
        leader: usize,
        weapon: Option<usize>,
        defense: Option<usize>,
    },
    Collect {
        territory: usize,
        amount: i64,
    },
    Pass,
}

fn spice_cost(amount: i64) -> Option<Cost> {
    (amount > 0).then(|| Cost::new(Resource::Spice, amount))
}

impl Plan {
    fn cost(&self) -> Option<Cost> {
        match self {
            Plan::Bid { amount } => spice_cost(*amount),
            Plan::Revive { cost, .. } | Plan::Ship { cost, .. } | Plan::Move { cost, .. } => {
                spice_cost(*cost)
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Dune {
    max_rounds: u32,
    rng: GameRng,
    seats: Vec<Seat>,
    players: PlayerMap<DunePlayer>,
    board: Arrakis,
    spice_deck: Deck<SpiceCard>,
    spice_discard: Deck<SpiceCard>,
    treachery_deck: Deck<TreacheryCard>,
    treachery_discard: Deck<TreacheryCard>,
    auction: Option<TreacheryCard>,
    high_bid: Option<HighBid>,
    phase: Phase,
    round: u32,
    turn: u32,
    current: usize,
    acted: bool,
    result: Option<GameResult>,
}

impl Dune {
    pub fn player(&self, player: PlayerId) -> Option<&DunePlayer> {
        self.players.get(player)
    }

    pub fn board(&self) -> &Arrakis {
        &self.board
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Territories `player` may ship into: anywhere with their forces, plus
    /// their home stronghold. Storm-covered territories are excluded.
    fn shipment_targets(&self, player: PlayerId) -> Vec<usize> {
        let home = self.players[player].faction.home();
        (0..self.board.territories.len())
            .filter(|&i| {
                let t = &self.board.territories[i];
                (t.forces(player) > 0 || home == Some(t.name.as_str())) && !self.board.in_storm(i)
            })
            .collect()
    }

    /// Opponent with the most forces sharing `territory`, lowest seat on ties.
    fn opponent_in(&self, territory: &Territory, player: PlayerId) -> Option<PlayerId> {
        territory
            .occupants
            .iter()
            .filter(|o| o.player != player && o.forces > 0)
            .max_by_key(|o| (o.forces, std::cmp::Reverse(o.player)))
            .map(|o| o.player)
    }

    fn revival_cost(forces: i64) -> i64 {
        REVIVAL_COSTS.iter().take(forces.max(0) as usize).sum()
    }

    fn phase_actions(&self, player: PlayerId, out: &mut Vec<Action>) {
        let me = &self.players[player];
        match self.phase {
            Phase::Bidding => {
                if self.auction.is_none() || me.treachery.len() >= MAX_TREACHERY {
                    return;
                }
                let floor = self.high_bid.map_or(1, |b| b.amount + 1);
                for amount in floor..=me.spice {
                    let mut action = Action::new(
                        format!("bid_{amount}"),
                        format!("Bid {amount} spice for treachery card"),
                        ActionKind::Dune(DuneAction::Bid { amount }),
                    );
                    action.cost = spice_cost(amount);
                    out.push(action);
                }
            }
            Phase::Revival => {
                let max = me.tanks.min(REVIVAL_COSTS.len() as i64);
                for forces in 1..=max {
                    let cost = Self::revival_cost(forces);
                    if cost > me.spice {
                        break;
                    }
                    let mut action = Action::new(
                        format!("revive_{forces}"),
                        format!("Revive {forces} forces for {cost} spice"),
                        ActionKind::Dune(DuneAction::Revive { forces }),
                    );
                    action.cost = spice_cost(cost);
                    out.push(action);
                }
            }
            Phase::Shipment => {
                for idx in self.shipment_targets(player) {
                    let name = &self.board.territories[idx].name;
                    for forces in 1..=me.reserve.min(MAX_SHIPMENT) {
                        let cost = me.faction.shipment_cost(forces);
                        if cost > me.spice {
                            continue;
                        }
                        let mut action = Action::new(
                            format!("ship_{name}_{forces}"),
                            format!("Ship {forces} forces to {name} for {cost} spice"),
                            ActionKind::Dune(DuneAction::Ship {
                                territory: name.clone(),
                                forces,
                            }),
                        );
                        action.cost = spice_cost(cost);
                        out.push(action);
                    }
                }
            }
            Phase::Movement => {
                for (from, t) in self.board.territories.iter().enumerate() {
                    let forces = t.forces(player);
                    if forces == 0 || self.board.in_storm(from) {
                        continue;
                    }
                    for dest in &t.connections {
                        let Some(to) = self.board.index(dest) else {
                            continue;
                        };
                        if self.board.in_storm(to) {
                            continue;
                        }
                        let cost = me
                            .faction
                            .movement_cost(forces, self.board.territories[to].kind);
                        if cost > me.spice {
                            continue;
                        }
                        let mut action = Action::new(
                            format!("move_{}_{dest}", t.name),
                            format!("Move {forces} from {} to {dest}", t.name),
                            ActionKind::Dune(DuneAction::Move {
                                from: t.name.clone(),
                                to: dest.clone(),
                            }),
                        );
                        action.cost = spice_cost(cost);
                        out.push(action);
                    }
                }
            }
            Phase::Battle => {
                let weapons: Vec<Option<&TreacheryCard>> = std::iter::once(None)
                    .chain(
                        me.treachery
                            .iter()
                            .filter(|c| c.kind == TreacheryKind::Weapon)
                            .map(Some),
                    )
                    .collect();
                let defenses: Vec<Option<&TreacheryCard>> = std::iter::once(None)
                    .chain(
                        me.treachery
                            .iter()
                            .filter(|c| c.kind == TreacheryKind::Defense)
                            .map(Some),
                    )
                    .collect();
                for t in &self.board.territories {
                    if t.forces(player) == 0 || self.opponent_in(t, player).is_none() {
                        continue;
                    }
                    for leader in me.leaders.iter().filter(|l| l.alive) {
                        for weapon in &weapons {
                            for defense in &defenses {
                                let w = weapon.map_or("none", |c| c.id.as_str());
                                let d = defense.map_or("none", |c| c.id.as_str());
                                out.push(Action::new(
                                    format!("battle_{}_{}_{w}_{d}", t.name, leader.id),
                                    format!("Fight in {} with {}", t.name, leader.name),
                                    ActionKind::Dune(DuneAction::Battle {
                                        territory: t.name.clone(),
                                        leader: leader.id.clone(),
                                        weapon: weapon.map(|c| c.id.clone()),
                                        defense: defense.map(|c| c.id.clone()),
                                    }),
                                ));
                            }
                        }
                    }
                }
            }
            Phase::SpiceCollection => {
                for t in &self.board.territories {
                    if t.spice > 0 && t.forces(player) > 0 {
                        out.push(Action::new(
                            format!("collect_{}", t.name),
                            format!("Collect {} spice from {}", t.spice, t.name),
                            ActionKind::Dune(DuneAction::CollectSpice {
                                territory: t.name.clone(),
                            }),
                        ));
                    }
                }
            }
            Phase::Storm | Phase::SpiceBlow | Phase::MentatPause => {}
        }
    }

    fn territory_index(&self, name: &str) -> Result<usize, ActionError> {
        self.board
            .index(name)
            .ok_or_else(|| ActionError::precondition(format!("no territory named {name}")))
    }

    fn require_phase(&self, phase: Phase) -> Result<(), ActionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(ActionError::WrongPhase(self.phase.slug().to_string()))
        }
    }

    fn plan(&self, player: PlayerId, action: &Action) -> Result<Plan, ActionError> {
        let dune = match &action.kind {
            ActionKind::Pass => return Ok(Plan::Pass),
            ActionKind::Dune(a) => a,
            _ => return Err(ActionError::WrongGame),
        };
        let me = &self.players[player];

        match dune {
            DuneAction::Bid { amount } => {
                self.require_phase(Phase::Bidding)?;
                if self.auction.is_none() {
                    return Err(ActionError::Exhausted("no treachery card to auction".into()));
                }
                if me.treachery.len() >= MAX_TREACHERY {
                    return Err(ActionError::precondition("treachery hand is full"));
                }
                let floor = self.high_bid.map_or(1, |b| b.amount + 1);
                if *amount < floor {
                    return Err(ActionError::precondition(format!("bid must be at least {floor}")));
                }
                ActionError::require(Resource::Spice, *amount, me.spice)?;
                Ok(Plan::Bid { amount: *amount })
            }
            DuneAction::Revive { forces } => {
                self.require_phase(Phase::Revival)?;
                if *forces < 1 || *forces > REVIVAL_COSTS.len() as i64 {
                    return Err(ActionError::precondition("revive between 1 and 10 forces"));
                }
                ActionError::require(Resource::Forces, *forces, me.tanks)?;
                let cost = Self::revival_cost(*forces);
                ActionError::require(Resource::Spice, cost, me.spice)?;
                Ok(Plan::Revive {
                    forces: *forces,
                    cost,
                })
            }
            DuneAction::Ship { territory, forces } => {
                self.require_phase(Phase::Shipment)?;
                let idx = self.territory_index(territory)?;
                if !self.shipment_targets(player).contains(&idx) {
                    return Err(ActionError::precondition(format!("cannot ship into {territory}")));
                }
                if *forces < 1 || *forces > MAX_SHIPMENT {
                    return Err(ActionError::precondition("ship between 1 and 7 forces"));
                }
                ActionError::require(Resource::Forces, *forces, me.reserve)?;
                let cost = me.faction.shipment_cost(*forces);
                ActionError::require(Resource::Spice, cost, me.spice)?;
                Ok(Plan::Ship {
                    territory: idx,
                    forces: *forces,
                    cost,
                })
            }
            DuneAction::Move { from, to } => {
                self.require_phase(Phase::Movement)?;
                let a = self.territory_index(from)?;
                let b = self.territory_index(to)?;
                if !self.board.adjacent(a, b) {
                    return Err(ActionError::precondition(format!("{from} is not adjacent to {to}")));
                }
                if self.board.in_storm(a) || self.board.in_storm(b) {
                    return Err(ActionError::precondition("the storm blocks movement"));
                }
                let forces = self.board.territories[a].forces(player);
                if forces == 0 {
                    return Err(ActionError::precondition(format!("no forces in {from}")));
                }
                let cost = me
                    .faction
                    .movement_cost(forces, self.board.territories[b].kind);
                ActionError::require(Resource::Spice, cost, me.spice)?;
                Ok(Plan::Move {
                    from: a,
                    to: b,
                    forces,
                    cost,
                })
            }
            DuneAction::Battle {
                territory,
                leader,
                weapon,
                defense,
            } => {
                self.require_phase(Phase::Battle)?;
                let idx = self.territory_index(territory)?;
                let t = &self.board.territories[idx];
                if t.forces(player) == 0 {
                    return Err(ActionError::precondition(format!("no forces in {territory}")));
                }
                let opponent = self
                    .opponent_in(t, player)
                    .ok_or_else(|| ActionError::precondition(format!("nobody to fight in {territory}")))?;
                let leader = me
                    .leaders
                    .iter()
                    .position(|l| &l.id == leader && l.alive)
                    .ok_or_else(|| ActionError::precondition(format!("no living leader {leader}")))?;
                let weapon = weapon
                    .as_deref()
                    .map(|id| me.card(id, TreacheryKind::Weapon))
                    .transpose()?;
                let defense = defense
                    .as_deref()
                    .map(|id| me.card(id, TreacheryKind::Defense))
                    .transpose()?;
                Ok(Plan::Battle {
                    territory: idx,
                    opponent,
                    leader,
                    weapon,
                    defense,
                })
            }
            DuneAction::CollectSpice { territory } => {
                self.require_phase(Phase::SpiceCollection)?;
                let idx = self.territory_index(territory)?;
                let t = &self.board.territories[idx];
                if t.forces(player) == 0 {
                    return Err(ActionError::precondition(format!("no forces in {territory}")));
                }
                if t.spice == 0 {
                    return Err(ActionError::Exhausted(format!("no spice in {territory}")));
                }
                Ok(Plan::Collect {
                    territory: idx,
                    amount: t.spice,
                })
            }
        }
    }

    fn apply(&mut self, player: PlayerId, plan: Plan) -> Outcome {
        let name = self.seats[player.index()].name.clone();
        let spent = |amount: i64| Effect::Resource {
            player,
            resource: Resource::Spice,
            delta: -amount,
        };
        let outcome = match plan {
            Plan::Bid { amount } => {
                self.high_bid = Some(HighBid { player, amount });
                Outcome::new(format!("{name} bid {amount} spice"))
            }
            Plan::Revive { forces, cost } => {
                let me = &mut self.players[player];
                me.spice -= cost;
                me.tanks -= forces;
                me.reserve += forces;
                Outcome::new(format!("{name} revived {forces} forces"))
                    .with(spent(cost))
                    .with(Effect::Resource {
                        player,
                        resource: Resource::Forces,
                        delta: forces,
                    })
            }
            Plan::Ship {
                territory,
                forces,
                cost,
            } => {
                let me = &mut self.players[player];
                me.spice -= cost;
                me.reserve -= forces;
                let unit = format!("{} x{forces}", me.faction.name());
                let t = &mut self.board.territories[territory];
                t.add_forces(player, forces);
                Outcome::new(format!("{name} shipped {forces} forces to {}", t.name))
                    .with(spent(cost))
                    .with(Effect::Moved {
                        unit,
                        from: "reserve".into(),
                        to: t.name.clone(),
                    })
            }
            Plan::Move {
                from,
                to,
                forces,
                cost,
            } => {
                let me = &mut self.players[player];
                me.spice -= cost;
                let unit = format!("{} x{forces}", me.faction.name());
                self.board.territories[from].take_forces(player);
                self.board.territories[to].add_forces(player, forces);
                let (a, b) = (
                    self.board.territories[from].name.clone(),
                    self.board.territories[to].name.clone(),
                );
                let mut outcome = Outcome::new(format!("{name} moved {forces} forces from {a} to {b}"));
                if cost > 0 {
                    outcome.push(spent(cost));
                }
                outcome.push(Effect::Moved { unit, from: a, to: b });
                outcome
            }
            Plan::Battle {
                territory,
                opponent,
                leader,
                weapon,
                defense,
            } => self.resolve_battle(player, territory, opponent, leader, weapon, defense),
            Plan::Collect { territory, amount } => {
                let t = &mut self.board.territories[territory];
                t.spice = 0;
                let place = t.name.clone();
                self.players[player].spice += amount;
                Outcome::new(format!("{name} collected {amount} spice from {place}")).with(
                    Effect::Resource {
                        player,
                        resource: Resource::Spice,
                        delta: amount,
                    },
                )
            }
            Plan::Pass => Outcome::new(format!("{name} passed")),
        };
        self.sync_scores();
        outcome
    }

    fn resolve_battle(
        &mut self,
        player: PlayerId,
        territory: usize,
        opponent: PlayerId,
        leader: usize,
        weapon: Option<usize>,
        defense: Option<usize>,
    ) -> Outcome {
        let t_name = self.board.territories[territory].name.clone();
        let my_forces = self.board.territories[territory].forces(player);
        let their_forces = self.board.territories[territory].forces(opponent);

        // Remove cards highest index first so earlier indices stay valid.
        let mut used: Vec<usize> = weapon.into_iter().chain(defense).collect();
        used.sort_unstable_by(|a, b| b.cmp(a));
        let me = &mut self.players[player];
        let my_leader = me.leaders[leader].clone();
        let mut card_strength = 0;
        let mut discarded = Vec::new();
        for idx in used {
            let card = me.treachery.remove(idx);
            card_strength += card.strength;
            discarded.push(card);
        }

        let them = &self.players[opponent];
        let their_leader = them.strongest_leader();
        let their_strength = their_leader.map_or(0, |i| them.leaders[i].strength);

        let attack = my_forces + my_leader.strength + card_strength;
        let defend = their_forces + their_strength;
        let won = attack >= defend;
        let (winner, loser) = if won { (player, opponent) } else { (opponent, player) };

        let mut outcome = Outcome::new(format!(
            "Battle in {t_name}: {attack} against {defend}, {} wins",
            self.seats[winner.index()].name
        ));
        for card in discarded {
            outcome.push(Effect::CardDiscarded {
                player,
                card: card.id.clone(),
            });
            self.treachery_discard.put(card, DeckPosition::Top);
        }

        let lost = self.board.territories[territory].take_forces(loser);
        self.players[loser].tanks += lost;
        outcome.push(Effect::Damage {
            target: format!("{} forces in {t_name}", self.players[loser].faction.name()),
            amount: lost,
        });

        if won && weapon.is_some() {
            if let Some(i) = their_leader {
                let victim = &mut self.players[opponent].leaders[i];
                victim.alive = false;
                outcome.push(Effect::Defeated {
                    target: victim.name.clone(),
                });
            }
        }
        info!(territory = %t_name, attack, defend, winner = %winner, "battle resolved");
        outcome
    }

    fn sync_scores(&mut self) {
        for seat in &mut self.seats {
            seat.score = self.board.strongholds_held(seat.id) as i64;
        }
    }

    fn storm_hits(&mut self, sector: u8) -> Vec<Effect> {
        self.board.storm = sector % super::board::SECTORS;
        let mut effects = vec![Effect::Tracker {
            name: "storm".into(),
            value: i64::from(self.board.storm),
        }];
        let Some(idx) = (0..self.board.territories.len()).find(|&i| self.board.in_storm(i)) else {
            return effects;
        };
        let t = &mut self.board.territories[idx];
        t.spice = 0;
        for occupant in std::mem::take(&mut t.occupants) {
            self.players[occupant.player].reserve += occupant.forces;
            effects.push(Effect::Moved {
                unit: format!("{} x{}", self.players[occupant.player].faction.name(), occupant.forces),
                from: t.name.clone(),
                to: "reserve".into(),
            });
        }
        effects
    }

    fn run_storm(&mut self) {
        let moved = self.rng.gen_range_inclusive(1..=6);
        let sector = (i64::from(self.board.storm) + moved) as u8;
        let effects = self.storm_hits(sector);
        debug!(storm = self.board.storm, effects = effects.len(), "storm moved");
    }

    fn resolve_spice_card(&mut self, card: &SpiceCard) {
        let Some(idx) = self.board.index(&card.territory) else {
            return;
        };
        if card.sandworm {
            let t = &mut self.board.territories[idx];
            t.spice = 0;
            for occupant in std::mem::take(&mut t.occupants) {
                self.players[occupant.player].tanks += occupant.forces;
            }
            info!(territory = %card.territory, "sandworm");
        } else {
            self.board.territories[idx].spice += card.amount;
        }
    }

    fn run_spice_blow(&mut self) {
        if self.spice_deck.is_empty() {
            self.spice_deck.refill_from(&mut self.spice_discard, &mut self.rng);
        }
        let Some(card) = self.spice_deck.draw() else {
            return;
        };
        self.resolve_spice_card(&card);
        self.spice_discard.put(card, DeckPosition::Top);
    }

    fn open_auction(&mut self) {
        if self.treachery_deck.is_empty() {
            self.treachery_deck
                .refill_from(&mut self.treachery_discard, &mut self.rng);
        }
        self.auction = self.treachery_deck.draw();
        self.high_bid = None;
    }

    fn close_auction(&mut self) {
        let Some(card) = self.auction.take() else {
            return;
        };
        match self.high_bid.take() {
            Some(HighBid { player, amount }) => {
                let winner = &mut self.players[player];
                winner.spice -= amount;
                info!(player = %player, amount, card = %card.id, "auction won");
                winner.treachery.push(card);
            }
            None => self.treachery_deck.put(card, DeckPosition::Bottom),
        }
    }

    fn end_round(&mut self) {
        let holders: Vec<PlayerId> = self
            .seats
            .iter()
            .filter(|s| self.board.strongholds_held(s.id) >= STRONGHOLDS_TO_WIN)
            .map(|s| s.id)
            .collect();
        if !holders.is_empty() {
            self.result = Some(GameResult::from_leaders(holders));
        } else if self.round >= self.max_rounds {
            let key = |id: PlayerId| (self.board.strongholds_held(id), self.players[id].spice);
            let best = self.seats.iter().map(|s| key(s.id)).max();
            self.result = Some(GameResult::from_leaders(
                self.seats
                    .iter()
                    .filter(|s| Some(key(s.id)) == best)
                    .map(|s| s.id)
                    .collect(),
            ));
        }
        if let Some(result) = &self.result {
            info!(round = self.round, ?result, "dune game over");
        } else {
            self.round += 1;
        }
    }

    /// Leave the current player phase and run automatic phases until the
    /// next player phase or the end of the game.
    fn finish_phase(&mut self) {
        if self.phase == Phase::Bidding {
            self.close_auction();
        }
        loop {
            self.phase = self.phase.next();
            info!(round = self.round, phase = self.phase.slug(), "phase");
            match self.phase {
                Phase::Storm => self.run_storm(),
                Phase::SpiceBlow => self.run_spice_blow(),
                Phase::MentatPause => {
                    self.end_round();
                    if self.result.is_some() {
                        return;
                    }
                }
                Phase::Bidding => {
                    self.open_auction();
                    return;
                }
                _ => return,
            }
        }
    }
}

impl RulesEngine for Dune {
    fn kind(&self) -> GameKind {
        GameKind::Dune
    }

    fn setup(&mut self, players: &[PlayerConfig]) -> Result<GameState, ConfigError> {
        if self.is_set_up() {
            return Err(ConfigError::AlreadySetUp);
        }
        let count = GameKind::Dune.player_count();
        require_players(GameKind::Dune.id(), count, players)?;

        self.seats = players
            .iter()
            .enumerate()
            .map(|(i, p)| Seat::new(PlayerId::new(i as u8), p.name.clone()))
            .collect();
        self.players = PlayerMap::new(count, |id| DunePlayer::new(Faction::ALL[id.index()]));

        for id in PlayerId::all(count) {
            let faction = self.players[id].faction;
            match faction.home().and_then(|home| self.board.index(home)) {
                Some(idx) => self.board.territories[idx].add_forces(id, faction.starting_forces()),
                None => self.players[id].reserve += faction.starting_forces(),
            }
        }

        let mut treachery = factions::treachery_deck();
        self.rng.shuffle(&mut treachery);
        self.treachery_deck = Deck::from_cards(treachery);
        let names: Vec<String> = self.board.names().map(str::to_string).collect();
        let spice = factions::spice_deck(names.iter().map(String::as_str), &mut self.rng);
        self.spice_deck = Deck::from_cards(spice);

        self.round = 1;
        self.turn = 1;
        self.phase = Phase::Bidding;
        self.open_auction();
        self.sync_scores();

        info!(players = count, "dune set up");
        Ok(self.state())
    }

    fn state(&self) -> GameState {
        GameState {
            game: GameKind::Dune,
            turn: self.turn,
            round: self.round,
            phase: self.phase.slug().to_string(),
            current_player: self.current_player(),
            game_over: self.result.is_some(),
            winners: self.result.as_ref().map(GameResult::winners).unwrap_or_default(),
            seats: self.seats.clone(),
            decks: vec![
                DeckCount::new("spice", self.spice_deck.len()),
                DeckCount::new("spice_discard", self.spice_discard.len()),
                DeckCount::new("treachery", self.treachery_deck.len()),
                DeckCount::new("treachery_discard", self.treachery_discard.len()),
            ],
            detail: GameDetail::Dune(DuneView {
                phase: self.phase,
                max_rounds: self.max_rounds,
                board: self.board.clone(),
                players: self.players.values().cloned().collect(),
                auction: self.auction.clone(),
                high_bid: self.high_bid,
            }),
        }
    }

    fn legal_actions(&self, player: PlayerId) -> Vec<Action> {
        if !self.can_act(player) {
            return Vec::new();
        }
        let mut actions = Vec::new();
        self.phase_actions(player, &mut actions);
        actions.push(Action::pass(format!("Pass {}", self.phase.slug())));
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
        debug!(player = %player, action = %action.id, phase = self.phase.slug(), "executing");
        let outcome = self.apply(player, plan);
        self.acted = true;
        Ok(outcome)
    }

    fn advance_turn(&mut self) {
        if !self.is_set_up() || self.result.is_some() {
            return;
        }
        self.turn += 1;
        self.acted = false;
        self.current += 1;
        if self.current < self.seats.len() {
            return;
        }
        self.current = 0;
        self.finish_phase();
        self.sync_scores();
    }

    fn current_player(&self) -> Option<PlayerId> {
        if !self.is_set_up() || self.result.is_some() {
            return None;
        }
        Some(PlayerId::new(self.current as u8))
    }

    fn seats(&self) -> &[Seat] {
        &self.seats
    }

    fn is_terminal(&self) -> Option<GameResult> {
        self.result.clone()
    }

    fn turn_complete(&self, player: PlayerId) -> bool {
        self.acted && player.index() == self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_game(seed: u64) -> Dune {
        let mut game = DuneBuilder::new().build(seed);
        game.setup(&PlayerConfig::numbered(6)).unwrap();
        game
    }

    fn idx(game: &Dune, name: &str) -> usize {
        game.board.index(name).unwrap()
    }

    fn pass_phase(game: &mut Dune) {
        for _ in 0..6 {
            let p = game.current_player().unwrap();
            game.execute(p, &Action::pass("")).unwrap();
            game.advance_turn();
        }
    }

    /// Skip straight to `phase` at seat 0 without running upkeep.
    fn jump_to(game: &mut Dune, phase: Phase) {
        game.phase = phase;
        game.current = 0;
        game.acted = false;
    }

    fn act(game: &mut Dune, player: PlayerId, kind: DuneAction, cost: i64) -> Result<Outcome, ActionError> {
        let mut action = Action::new("x", "", ActionKind::Dune(kind));
        action.cost = spice_cost(cost);
        game.execute(player, &action)
    }

    #[test]
    fn test_setup_places_forces() {
        let game = new_game(1);
        assert_eq!(game.phase(), Phase::Bidding);
        assert!(game.auction.is_some());
        assert_eq!(game.treachery_deck.len(), 17);
        assert_eq!(game.spice_deck.len(), factions::SPICE_CARDS);

        let atreides = PlayerId::new(0);
        let emperor = PlayerId::new(2);
        assert_eq!(game.board.territories[idx(&game, "arrakeen")].forces(atreides), 10);
        assert_eq!(game.player(atreides).unwrap().reserve, 10);
        assert_eq!(game.player(emperor).unwrap().reserve, 20);
        assert_eq!(game.board.forces_on_board(emperor), 0);
        assert_eq!(game.player(PlayerId::new(5)).unwrap().spice, 3);
        assert_eq!(game.state().seats[0].score, 1);
    }

    #[test]
    fn test_bidding_round() {
        let mut game = new_game(1);
        let card = game.auction.clone().unwrap();
        let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));

        act(&mut game, p0, DuneAction::Bid { amount: 3 }, 3).unwrap();
        game.advance_turn();

        let bids = game.legal_actions(p1);
        assert_eq!(bids[0].id, "bid_4");
        assert_eq!(bids[0].cost, Some(Cost::new(Resource::Spice, 4)));
        assert_eq!(
            act(&mut game, p1, DuneAction::Bid { amount: 3 }, 3),
            Err(ActionError::precondition("bid must be at least 4"))
        );
        assert!(matches!(
            act(&mut game, p1, DuneAction::Bid { amount: 4 }, 0),
            Err(ActionError::Stale(_))
        ));
        act(&mut game, p1, DuneAction::Bid { amount: 4 }, 4).unwrap();
        game.advance_turn();
        for _ in 2..6 {
            let p = game.current_player().unwrap();
            game.execute(p, &Action::pass("")).unwrap();
            game.advance_turn();
        }

        assert_eq!(game.phase(), Phase::Revival);
        assert_eq!(game.player(p1).unwrap().spice, 6);
        assert_eq!(game.player(p1).unwrap().treachery, vec![card]);
        assert_eq!(game.player(p0).unwrap().spice, 10);
        assert!(game.auction.is_none());
    }

    #[test]
    fn test_unsold_card_returns_to_deck() {
        let mut game = new_game(1);
        pass_phase(&mut game);
        assert_eq!(game.treachery_deck.len(), 18);
    }

    #[test]
    fn test_wrong_phase() {
        let mut game = new_game(1);
        let err = act(
            &mut game,
            PlayerId::new(0),
            DuneAction::Ship {
                territory: "arrakeen".into(),
                forces: 1,
            },
            1,
        );
        assert!(matches!(err, Err(ActionError::WrongPhase(_))));
    }

    #[test]
    fn test_revival_costs() {
        let mut game = new_game(1);
        jump_to(&mut game, Phase::Revival);
        let p0 = PlayerId::new(0);
        game.players[p0].tanks = 5;

        let ids: Vec<_> = game.legal_actions(p0).iter().map(|a| a.id.clone()).collect();
        // 2+2+2+3 = 9 is affordable with 10 spice, 12 is not
        assert_eq!(ids, vec!["revive_1", "revive_2", "revive_3", "revive_4", "pass"]);

        act(&mut game, p0, DuneAction::Revive { forces: 4 }, 9).unwrap();
        let p = game.player(p0).unwrap();
        assert_eq!((p.spice, p.tanks, p.reserve), (1, 1, 14));
    }

    #[test]
    fn test_guild_ships_flat() {
        let mut game = new_game(1);
        jump_to(&mut game, Phase::Shipment);
        let guild = PlayerId::new(3);
        game.current = 3;

        let ships: Vec<_> = game
            .legal_actions(guild)
            .into_iter()
            .filter(|a| a.id.starts_with("ship_"))
            .collect();
        assert!(ships.iter().all(|a| a.cost == Some(Cost::new(Resource::Spice, 1))));
        assert!(ships.iter().any(|a| a.id == "ship_tueks_sietch_7"));

        act(
            &mut game,
            guild,
            DuneAction::Ship {
                territory: "tueks_sietch".into(),
                forces: 7,
            },
            1,
        )
        .unwrap();
        assert_eq!(game.board.territories[idx(&game, "tueks_sietch")].forces(guild), 12);
        assert_eq!(game.player(guild).unwrap().spice, 4);
        assert_eq!(game.player(guild).unwrap().reserve, 3);
    }

    #[test]
    fn test_cannot_ship_to_uncontrolled() {
        let mut game = new_game(1);
        jump_to(&mut game, Phase::Shipment);
        let err = act(
            &mut game,
            PlayerId::new(0),
            DuneAction::Ship {
                territory: "carthag".into(),
                forces: 1,
            },
            1,
        );
        assert!(matches!(err, Err(ActionError::Precondition(_))));
    }

    #[test]
    fn test_fremen_desert_movement() {
        let mut game = new_game(1);
        jump_to(&mut game, Phase::Movement);
        let fremen = PlayerId::new(5);
        game.current = 5;
        game.board.storm = 17;
        game.players[fremen].spice = 5;

        let moves: Vec<_> = game
            .legal_actions(fremen)
            .into_iter()
            .filter(|a| a.id.starts_with("move_"))
            .collect();
        let red = moves.iter().find(|a| a.id == "move_sietch_tabr_red_chasm").unwrap();
        assert_eq!(red.cost, Some(Cost::new(Resource::Spice, 5)));
        // 10 forces into a stronghold costs 10
        assert!(!moves.iter().any(|a| a.id == "move_sietch_tabr_tueks_sietch"));

        game.execute(fremen, red).unwrap();
        assert_eq!(game.board.territories[idx(&game, "red_chasm")].forces(fremen), 10);
        assert_eq!(game.board.territories[idx(&game, "sietch_tabr")].forces(fremen), 0);
        assert_eq!(game.player(fremen).unwrap().spice, 0);
    }

    #[test]
    fn test_storm_blocks_movement() {
        let mut game = new_game(1);
        jump_to(&mut game, Phase::Movement);
        let p0 = PlayerId::new(0);
        game.board.storm = 0;
        assert!(game.legal_actions(p0).iter().all(|a| !a.id.starts_with("move_")));
        let err = act(
            &mut game,
            p0,
            DuneAction::Move {
                from: "arrakeen".into(),
                to: "carthag".into(),
            },
            10,
        );
        assert_eq!(err, Err(ActionError::precondition("the storm blocks movement")));
    }

    #[test]
    fn test_storm_returns_forces_to_reserve() {
        let mut game = new_game(1);
        let carthag = idx(&game, "carthag");
        game.board.territories[carthag].spice = 4;
        let effects = game.storm_hits(1);

        assert_eq!(game.board.territories[carthag].occupants, vec![]);
        assert_eq!(game.board.territories[carthag].spice, 0);
        assert_eq!(game.player(PlayerId::new(1)).unwrap().reserve, 20);
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn test_sandworm_sends_forces_to_tanks() {
        let mut game = new_game(1);
        let card = SpiceCard {
            territory: "arrakeen".into(),
            amount: 3,
            sandworm: true,
        };
        let arrakeen = idx(&game, "arrakeen");
        game.board.territories[arrakeen].spice = 2;
        game.resolve_spice_card(&card);
        assert_eq!(game.board.territories[idx(&game, "arrakeen")].spice, 0);
        assert_eq!(game.player(PlayerId::new(0)).unwrap().tanks, 10);

        let blow = SpiceCard {
            sandworm: false,
            ..card
        };
        game.resolve_spice_card(&blow);
        assert_eq!(game.board.territories[idx(&game, "arrakeen")].spice, 3);
    }

    #[test]
    fn test_battle_with_weapon_kills_leader() {
        let mut game = new_game(1);
        jump_to(&mut game, Phase::Battle);
        let (atreides, harkonnen) = (PlayerId::new(0), PlayerId::new(1));
        let arrakeen = idx(&game, "arrakeen");
        game.board.territories[arrakeen].add_forces(harkonnen, 12);
        game.players[atreides].treachery.push(TreacheryCard {
            id: "lasgun".into(),
            name: "Lasgun".into(),
            kind: TreacheryKind::Weapon,
            strength: 4,
        });

        // 10 + Paul 5 + Lasgun 4 = 19 against 12 + Feyd 6 = 18
        let out = act(
            &mut game,
            atreides,
            DuneAction::Battle {
                territory: "arrakeen".into(),
                leader: "paul_atreides".into(),
                weapon: Some("lasgun".into()),
                defense: None,
            },
            0,
        )
        .unwrap();

        assert_eq!(game.board.territories[arrakeen].forces(harkonnen), 0);
        assert_eq!(game.board.territories[arrakeen].forces(atreides), 10);
        assert_eq!(game.player(harkonnen).unwrap().tanks, 12);
        assert!(!game.player(harkonnen).unwrap().leaders[1].alive);
        assert!(game.player(atreides).unwrap().treachery.is_empty());
        assert_eq!(game.treachery_discard.len(), 1);
        assert!(out.effects.contains(&Effect::Defeated {
            target: "Feyd-Rautha".into()
        }));
    }

    #[test]
    fn test_battle_lost_without_cards() {
        let mut game = new_game(1);
        jump_to(&mut game, Phase::Battle);
        let (atreides, harkonnen) = (PlayerId::new(0), PlayerId::new(1));
        let arrakeen = idx(&game, "arrakeen");
        game.board.territories[arrakeen].add_forces(harkonnen, 12);

        assert!(game
            .legal_actions(atreides)
            .iter()
            .any(|a| a.id == "battle_arrakeen_duncan_idaho_none_none"));
        // 10 + Duncan 2 = 12 against 12 + 6 = 18
        act(
            &mut game,
            atreides,
            DuneAction::Battle {
                territory: "arrakeen".into(),
                leader: "duncan_idaho".into(),
                weapon: None,
                defense: None,
            },
            0,
        )
        .unwrap();
        assert_eq!(game.board.territories[arrakeen].sole_occupant(), Some(harkonnen));
        assert_eq!(game.player(atreides).unwrap().tanks, 10);
        assert!(game.player(harkonnen).unwrap().leaders.iter().all(|l| l.alive));
    }

    #[test]
    fn test_collect_spice() {
        let mut game = new_game(1);
        jump_to(&mut game, Phase::SpiceCollection);
        let p0 = PlayerId::new(0);
        let arrakeen = idx(&game, "arrakeen");
        game.board.territories[arrakeen].spice = 6;
        let collect = game
            .legal_actions(p0)
            .into_iter()
            .find(|a| a.id == "collect_arrakeen")
            .unwrap();
        game.execute(p0, &collect).unwrap();
        assert_eq!(game.player(p0).unwrap().spice, 16);
        assert_eq!(game.board.territories[idx(&game, "arrakeen")].spice, 0);
    }

    #[test]
    fn test_three_strongholds_win() {
        let mut game = new_game(1);
        let fremen = PlayerId::new(5);
        for name in ["arrakeen", "carthag"] {
            let t = idx(&game, name);
            game.board.territories[t].occupants.clear();
            game.board.territories[t].add_forces(fremen, 2);
        }
        game.end_round();
        assert_eq!(game.is_terminal(), Some(GameResult::Winner(fremen)));
        assert!(game.state().game_over);
        assert!(game.legal_actions(fremen).is_empty());
    }

    #[test]
    fn test_max_rounds_tiebreak() {
        let mut game = DuneBuilder::new().max_rounds(1).build(9);
        game.setup(&PlayerConfig::numbered(6)).unwrap();
        for _ in 0..6 {
            pass_phase(&mut game);
        }
        // one stronghold each for four factions, Atreides and Harkonnen tie on spice
        assert_eq!(
            game.is_terminal(),
            Some(GameResult::Winners(vec![PlayerId::new(0), PlayerId::new(1)]))
        );
        assert_eq!(game.current_player(), None);
        assert_eq!(game.state().round, 1);
    }

    #[test]
    fn test_round_wraps_through_automatic_phases() {
        let mut game = new_game(4);
        for _ in 0..6 {
            pass_phase(&mut game);
        }
        assert_eq!(game.state().round, 2);
        assert_eq!(game.phase(), Phase::Bidding);
        assert_eq!(game.spice_deck.len() + game.spice_discard.len(), factions::SPICE_CARDS);
        assert_eq!(game.spice_discard.len(), 1);
    }
}
