//! Terraforming Mars engine.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cards::{self, CardEffect, Corporation, ProjectCard, StandardProject, Tag, Tracker};
use crate::core::config::require_players;
use crate::core::{
    Action, ActionError, ActionKind, ConfigError, Cost, Deck, DeckCount, DeckPosition, Effect,
    GameDetail, GameRng, GameState, Outcome, PlayerConfig, PlayerId, PlayerMap, Resource, Seat,
};
use crate::rules::{check_cost, GameKind, GameResult, RulesEngine};

const STARTING_TR: i64 = 20;
const STARTING_HAND: usize = 10;
const GENERATION_DRAW: usize = 4;
const CONVERSION_COST: i64 = 8;
const STEEL_VALUE: i64 = 2;
const TITANIUM_VALUE: i64 = 3;
const PATENT_VALUE: i64 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerraformingAction {
    /// Play a project card from hand, by card id.
    PlayCard { card: String },
    /// Discard a card from hand for one megacredit.
    SellPatent { card: String },
    Standard { project: StandardProject },
    /// 8 plants into a greenery.
    ConvertPlants,
    /// 8 heat into a temperature step.
    ConvertHeat,
}

/// One number per player resource, used for both stock and production.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub megacredits: i64,
    pub steel: i64,
    pub titanium: i64,
    pub plants: i64,
    pub energy: i64,
    pub heat: i64,
}

impl Ledger {
    const RESOURCES: [Resource; 6] = [
        Resource::Megacredits,
        Resource::Steel,
        Resource::Titanium,
        Resource::Plants,
        Resource::Energy,
        Resource::Heat,
    ];

    #[must_use]
    pub fn get(&self, resource: Resource) -> i64 {
        match resource {
            Resource::Megacredits => self.megacredits,
            Resource::Steel => self.steel,
            Resource::Titanium => self.titanium,
            Resource::Plants => self.plants,
            Resource::Energy => self.energy,
            Resource::Heat => self.heat,
            _ => 0,
        }
    }

    fn get_mut(&mut self, resource: Resource) -> Option<&mut i64> {
        match resource {
            Resource::Megacredits => Some(&mut self.megacredits),
            Resource::Steel => Some(&mut self.steel),
            Resource::Titanium => Some(&mut self.titanium),
            Resource::Plants => Some(&mut self.plants),
            Resource::Energy => Some(&mut self.energy),
            Resource::Heat => Some(&mut self.heat),
            _ => None,
        }
    }

    fn add(&mut self, resource: Resource, delta: i64) {
        if let Some(v) = self.get_mut(resource) {
            *v += delta;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformingPlayer {
    pub corporation: Corporation,
    pub stock: Ledger,
    pub production: Ledger,
    pub hand: Vec<ProjectCard>,
    pub played: Vec<ProjectCard>,
    pub terraform_rating: i64,
    pub vp: i64,
    pub titanium_value: i64,
    /// Cards drawn at upkeep on top of the usual four.
    pub extra_draws: usize,
}

impl TerraformingPlayer {
    fn new(corporation: Corporation) -> Self {
        Self {
            corporation,
            stock: Ledger {
                megacredits: corporation.starting_credits(),
                ..Ledger::default()
            },
            production: Ledger::default(),
            hand: Vec::new(),
            played: Vec::new(),
            terraform_rating: STARTING_TR,
            vp: 0,
            titanium_value: TITANIUM_VALUE,
            extra_draws: 0,
        }
    }

    /// Final score: terraform rating plus victory points.
    #[must_use]
    pub fn score(&self) -> i64 {
        self.terraform_rating + self.vp
    }

    /// Split a card price into steel, titanium and megacredits.
    ///
    /// Metal is spent without overpaying; the rest is megacredits.
    fn payment(&self, card: &ProjectCard) -> Payment {
        let def = card.def();
        let mut remaining = def.cost;
        let mut payment = Payment::default();
        if def.has_tag(Tag::Building) {
            payment.steel = self.stock.steel.min(remaining / STEEL_VALUE);
            remaining -= payment.steel * STEEL_VALUE;
        }
        if def.has_tag(Tag::Space) {
            payment.titanium = self.stock.titanium.min(remaining / self.titanium_value);
            remaining -= payment.titanium * self.titanium_value;
        }
        payment.megacredits = remaining;
        payment
    }

    /// First production rate a card would push below zero.
    fn unpayable_production(&self, effects: &[CardEffect]) -> Option<(Resource, i64)> {
        effects.iter().find_map(|e| match *e {
            CardEffect::Production(r, d) if d < 0 && self.production.get(r) + d < 0 => {
                Some((r, -d))
            }
            _ => None,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Payment {
    steel: i64,
    titanium: i64,
    megacredits: i64,
}

impl Payment {
    fn cost(self) -> Option<Cost> {
        (self.megacredits > 0).then(|| Cost::new(Resource::Megacredits, self.megacredits))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Globals {
    pub temperature: i64,
    pub oxygen: i64,
    pub oceans: i64,
}

impl Default for Globals {
    fn default() -> Self {
        Self {
            temperature: Tracker::Temperature.min(),
            oxygen: Tracker::Oxygen.min(),
            oceans: Tracker::Oceans.min(),
        }
    }
}

impl Globals {
    #[must_use]
    pub fn get(&self, tracker: Tracker) -> i64 {
        match tracker {
            Tracker::Temperature => self.temperature,
            Tracker::Oxygen => self.oxygen,
            Tracker::Oceans => self.oceans,
        }
    }

    fn get_mut(&mut self, tracker: Tracker) -> &mut i64 {
        match tracker {
            Tracker::Temperature => &mut self.temperature,
            Tracker::Oxygen => &mut self.oxygen,
            Tracker::Oceans => &mut self.oceans,
        }
    }

    /// All three trackers at their maximum.
    #[must_use]
    pub fn complete(&self) -> bool {
        Tracker::ALL.into_iter().all(|t| self.get(t) >= t.max())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformingView {
    pub generation: u32,
    pub max_generations: u32,
    pub globals: Globals,
    pub players: Vec<TerraformingPlayer>,
}

/// Builder for creating a `TerraformingMars` engine.
pub struct TerraformingBuilder {
    max_generations: u32,
}

impl Default for TerraformingBuilder {
    fn default() -> Self {
        Self { max_generations: 14 }
    }
}

impl TerraformingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Game ends after this many generations if the planet is not finished.
    pub fn max_generations(mut self, generations: u32) -> Self {
        assert!(generations > 0, "Need at least one generation");
        self.max_generations = generations;
        self
    }

    pub fn build(self, seed: u64) -> TerraformingMars {
        TerraformingMars {
            max_generations: self.max_generations,
            rng: GameRng::new(seed),
            seats: Vec::new(),
            players: PlayerMap::default(),
            deck: Deck::new(),
            discard: Deck::new(),
            globals: Globals::default(),
            generation: 0,
            turn: 0,
            current: 0,
            acted: false,
            finished: false,
        }
    }
}

enum Plan {
    Play { card: usize, payment: Payment },
    Sell { card: usize },
    Standard { project: StandardProject },
    ConvertPlants,
    ConvertHeat,
    Pass,
}

impl Plan {
    fn cost(&self) -> Option<Cost> {
        match self {
            Plan::Play { payment, .. } => payment.cost(),
            Plan::Standard { project } => Some(Cost::new(Resource::Megacredits, project.cost())),
            Plan::ConvertPlants => Some(Cost::new(Resource::Plants, CONVERSION_COST)),
            Plan::ConvertHeat => Some(Cost::new(Resource::Heat, CONVERSION_COST)),
            Plan::Sell { .. } | Plan::Pass => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TerraformingMars {
    max_generations: u32,
    rng: GameRng,
    seats: Vec<Seat>,
    players: PlayerMap<TerraformingPlayer>,
    deck: Deck<ProjectCard>,
    discard: Deck<ProjectCard>,
    globals: Globals,
    generation: u32,
    turn: u32,
    current: usize,
    acted: bool,
    finished: bool,
}

impl TerraformingMars {
    pub fn player(&self, player: PlayerId) -> Option<&TerraformingPlayer> {
        self.players.get(player)
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Total project cards across deck, discard, hands and tableaus.
    #[must_use]
    pub fn card_total(&self) -> usize {
        self.deck.len()
            + self.discard.len()
            + self
                .players
                .values()
                .map(|p| p.hand.len() + p.played.len())
                .sum::<usize>()
    }

    fn draw(&mut self, player: PlayerId, count: usize) -> usize {
        let mut drawn = 0;
        for _ in 0..count {
            if self.deck.is_empty() {
                self.deck.refill_from(&mut self.discard, &mut self.rng);
            }
            let Some(card) = self.deck.draw() else { break };
            self.players[player].hand.push(card);
            drawn += 1;
        }
        drawn
    }

    fn sync_scores(&mut self) {
        for (id, p) in self.players.iter() {
            self.seats[id.index()].score = p.score();
        }
    }

    /// Raise `tracker` by up to `steps`, granting one TR per real step.
    fn raise(&mut self, player: PlayerId, tracker: Tracker, steps: i64, outcome: &mut Outcome) {
        let value = self.globals.get_mut(tracker);
        let mut gained = 0;
        for _ in 0..steps {
            if *value >= tracker.max() {
                break;
            }
            *value = (*value + tracker.step()).min(tracker.max());
            gained += 1;
        }
        if gained == 0 {
            outcome.note(format!("{} already at maximum", tracker.slug()));
            return;
        }
        outcome.push(Effect::Tracker {
            name: tracker.slug().to_string(),
            value: *value,
        });
        self.players[player].terraform_rating += gained;
        outcome.push(Effect::Resource {
            player,
            resource: Resource::TerraformRating,
            delta: gained,
        });
    }

    fn apply_effects(&mut self, player: PlayerId, effects: &[CardEffect], outcome: &mut Outcome) {
        for effect in effects {
            match *effect {
                CardEffect::Raise(tracker, steps) => self.raise(player, tracker, steps, outcome),
                CardEffect::Gain(resource, amount) => {
                    self.players[player].stock.add(resource, amount);
                    outcome.push(Effect::Resource {
                        player,
                        resource,
                        delta: amount,
                    });
                }
                CardEffect::Production(resource, delta) => {
                    self.players[player].production.add(resource, delta);
                    outcome.push(Effect::Production {
                        player,
                        resource,
                        delta,
                    });
                }
                CardEffect::Vp(points) => {
                    self.players[player].vp += points;
                    outcome.push(Effect::Score { player, points });
                }
                CardEffect::TitaniumValue(bonus) => {
                    self.players[player].titanium_value += bonus;
                    outcome.note(format!("titanium now worth {}", self.players[player].titanium_value));
                }
                CardEffect::Draw(count) => {
                    let drawn = self.draw(player, count);
                    outcome.note(format!("drew {drawn} card(s)"));
                }
                CardEffect::DrawPerGeneration(count) => {
                    self.players[player].extra_draws += count;
                }
            }
        }
    }

    fn card_actions(&self, player: PlayerId, out: &mut Vec<Action>) {
        let me = &self.players[player];
        let mut seen = FxHashSet::default();
        for card in &me.hand {
            if !seen.insert(card.kind) {
                continue;
            }
            let def = card.def();
            let payment = me.payment(card);
            if payment.megacredits <= me.stock.megacredits
                && me.unpayable_production(def.effects).is_none()
            {
                let mut action = Action::new(
                    format!("play_{}", card.kind.slug()),
                    format!("Play {} for {} MC", def.name, def.cost),
                    ActionKind::Terraforming(TerraformingAction::PlayCard {
                        card: card.id.clone(),
                    }),
                );
                action.cost = payment.cost();
                out.push(action);
            }
            out.push(Action::new(
                format!("sell_{}", card.kind.slug()),
                format!("Sell {} patent for {PATENT_VALUE} MC", def.name),
                ActionKind::Terraforming(TerraformingAction::SellPatent {
                    card: card.id.clone(),
                }),
            ));
        }
    }

    fn plan(&self, player: PlayerId, action: &Action) -> Result<Plan, ActionError> {
        let tm = match &action.kind {
            ActionKind::Pass => return Ok(Plan::Pass),
            ActionKind::Terraforming(a) => a,
            _ => return Err(ActionError::WrongGame),
        };
        let me = &self.players[player];
        let hand_card = |id: &str| {
            me.hand
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| ActionError::precondition(format!("no card {id} in hand")))
        };

        match tm {
            TerraformingAction::PlayCard { card } => {
                let idx = hand_card(card.as_str())?;
                let card = &me.hand[idx];
                if let Some((resource, need)) = me.unpayable_production(card.def().effects) {
                    return Err(ActionError::Insufficient {
                        resource,
                        need,
                        have: me.production.get(resource),
                    });
                }
                let payment = me.payment(card);
                ActionError::require(Resource::Megacredits, payment.megacredits, me.stock.megacredits)?;
                Ok(Plan::Play { card: idx, payment })
            }
            TerraformingAction::SellPatent { card } => Ok(Plan::Sell {
                card: hand_card(card.as_str())?,
            }),
            TerraformingAction::Standard { project } => {
                ActionError::require(Resource::Megacredits, project.cost(), me.stock.megacredits)?;
                Ok(Plan::Standard { project: *project })
            }
            TerraformingAction::ConvertPlants => {
                ActionError::require(Resource::Plants, CONVERSION_COST, me.stock.plants)?;
                Ok(Plan::ConvertPlants)
            }
            TerraformingAction::ConvertHeat => {
                ActionError::require(Resource::Heat, CONVERSION_COST, me.stock.heat)?;
                Ok(Plan::ConvertHeat)
            }
        }
    }

    fn apply(&mut self, player: PlayerId, plan: Plan) -> Outcome {
        let name = self.seats[player.index()].name.clone();
        let mut outcome = match plan {
            Plan::Play { card, payment } => {
                let me = &mut self.players[player];
                me.stock.steel -= payment.steel;
                me.stock.titanium -= payment.titanium;
                me.stock.megacredits -= payment.megacredits;
                let card = me.hand.remove(card);
                let def = card.def();
                let mut outcome = Outcome::new(format!("{name} played {}", def.name));
                for (resource, amount) in [
                    (Resource::Steel, payment.steel),
                    (Resource::Titanium, payment.titanium),
                    (Resource::Megacredits, payment.megacredits),
                ] {
                    if amount > 0 {
                        outcome.push(Effect::Resource {
                            player,
                            resource,
                            delta: -amount,
                        });
                    }
                }
                me.played.push(card);
                self.apply_effects(player, def.effects, &mut outcome);
                outcome
            }
            Plan::Sell { card } => {
                let me = &mut self.players[player];
                let card = me.hand.remove(card);
                me.stock.megacredits += PATENT_VALUE;
                let outcome = Outcome::new(format!("{name} sold {}", card.def().name))
                    .with(Effect::CardDiscarded {
                        player,
                        card: card.id.clone(),
                    })
                    .with(Effect::Resource {
                        player,
                        resource: Resource::Megacredits,
                        delta: PATENT_VALUE,
                    });
                self.discard.put(card, DeckPosition::Top);
                outcome
            }
            Plan::Standard { project } => {
                self.players[player].stock.megacredits -= project.cost();
                let mut outcome = Outcome::new(format!("{name} funded {}", project.slug()))
                    .with(Effect::Resource {
                        player,
                        resource: Resource::Megacredits,
                        delta: -project.cost(),
                    });
                self.apply_effects(player, project.effects(), &mut outcome);
                outcome
            }
            Plan::ConvertPlants => {
                self.players[player].stock.plants -= CONVERSION_COST;
                let mut outcome = Outcome::new(format!("{name} planted a greenery")).with(
                    Effect::Resource {
                        player,
                        resource: Resource::Plants,
                        delta: -CONVERSION_COST,
                    },
                );
                self.apply_effects(
                    player,
                    StandardProject::Greenery.effects(),
                    &mut outcome,
                );
                outcome
            }
            Plan::ConvertHeat => {
                self.players[player].stock.heat -= CONVERSION_COST;
                let mut outcome = Outcome::new(format!("{name} vented heat")).with(
                    Effect::Resource {
                        player,
                        resource: Resource::Heat,
                        delta: -CONVERSION_COST,
                    },
                );
                self.raise(player, Tracker::Temperature, 1, &mut outcome);
                outcome
            }
            Plan::Pass => Outcome::new(format!("{name} passed")),
        };
        self.sync_scores();
        if self.globals.complete() {
            outcome.note("all global parameters maxed");
        }
        outcome
    }

    fn end_generation(&mut self) {
        for p in self.players.values_mut() {
            p.stock.heat += p.stock.energy;
            p.stock.energy = 0;
            for resource in Ledger::RESOURCES {
                p.stock.add(resource, p.production.get(resource));
            }
            p.stock.megacredits += p.terraform_rating;
        }
        for id in PlayerId::all(self.seats.len()) {
            let count = GENERATION_DRAW + self.players[id].extra_draws;
            self.draw(id, count);
        }
        info!(
            generation = self.generation,
            temperature = self.globals.temperature,
            oxygen = self.globals.oxygen,
            oceans = self.globals.oceans,
            "generation complete"
        );
        if self.generation >= self.max_generations {
            self.finished = true;
            info!(result = ?self.is_terminal(), "terraforming game over");
        } else {
            self.generation += 1;
        }
    }
}

impl RulesEngine for TerraformingMars {
    fn kind(&self) -> GameKind {
        GameKind::TerraformingMars
    }

    fn setup(&mut self, players: &[PlayerConfig]) -> Result<GameState, ConfigError> {
        if self.is_set_up() {
            return Err(ConfigError::AlreadySetUp);
        }
        let count = GameKind::TerraformingMars.player_count();
        require_players(GameKind::TerraformingMars.id(), count, players)?;

        let mut projects = cards::project_deck();
        self.rng.shuffle(&mut projects);
        self.deck = Deck::from_cards(projects);

        self.seats = players
            .iter()
            .enumerate()
            .map(|(i, p)| Seat::new(PlayerId::new(i as u8), p.name.clone()))
            .collect();
        self.players = PlayerMap::new(count, |id| {
            TerraformingPlayer::new(Corporation::ALL[id.index() % Corporation::ALL.len()])
        });
        for id in PlayerId::all(count) {
            self.draw(id, STARTING_HAND);
        }
        self.sync_scores();
        self.generation = 1;
        self.turn = 1;

        info!(players = count, deck = self.deck.len(), "terraforming set up");
        Ok(self.state())
    }

    fn state(&self) -> GameState {
        let result = self.is_terminal();
        GameState {
            game: GameKind::TerraformingMars,
            turn: self.turn,
            round: self.generation,
            phase: format!("generation_{}", self.generation),
            current_player: self.current_player(),
            game_over: result.is_some(),
            winners: result.map(|r| r.winners()).unwrap_or_default(),
            seats: self.seats.clone(),
            decks: vec![
                DeckCount::new("projects", self.deck.len()),
                DeckCount::new("discard", self.discard.len()),
            ],
            detail: GameDetail::Terraforming(TerraformingView {
                generation: self.generation,
                max_generations: self.max_generations,
                globals: self.globals,
                players: self.players.values().cloned().collect(),
            }),
        }
    }

    fn legal_actions(&self, player: PlayerId) -> Vec<Action> {
        if !self.can_act(player) {
            return Vec::new();
        }
        let me = &self.players[player];
        let mut actions = Vec::new();
        self.card_actions(player, &mut actions);

        for project in StandardProject::ALL {
            if me.stock.megacredits >= project.cost() {
                actions.push(
                    Action::new(
                        format!("project_{}", project.slug()),
                        format!("Standard project {} for {} MC", project.slug(), project.cost()),
                        ActionKind::Terraforming(TerraformingAction::Standard { project }),
                    )
                    .with_cost(Cost::new(Resource::Megacredits, project.cost())),
                );
            }
        }
        if me.stock.plants >= CONVERSION_COST {
            actions.push(
                Action::new(
                    "convert_plants",
                    format!("Convert {CONVERSION_COST} plants to greenery"),
                    ActionKind::Terraforming(TerraformingAction::ConvertPlants),
                )
                .with_cost(Cost::new(Resource::Plants, CONVERSION_COST)),
            );
        }
        if me.stock.heat >= CONVERSION_COST {
            actions.push(
                Action::new(
                    "convert_heat",
                    format!("Convert {CONVERSION_COST} heat to raise temperature"),
                    ActionKind::Terraforming(TerraformingAction::ConvertHeat),
                )
                .with_cost(Cost::new(Resource::Heat, CONVERSION_COST)),
            );
        }
        actions.push(Action::pass("Pass turn"));
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
        let outcome = self.apply(player, plan);
        self.acted = true;
        Ok(outcome)
    }

    fn advance_turn(&mut self) {
        if !self.is_set_up() || self.is_terminal().is_some() {
            return;
        }
        self.turn += 1;
        self.acted = false;
        self.current = (self.current + 1) % self.seats.len();
        if self.current == 0 {
            self.end_generation();
            self.sync_scores();
        }
    }

    fn current_player(&self) -> Option<PlayerId> {
        if !self.is_set_up() || self.is_terminal().is_some() {
            return None;
        }
        Some(PlayerId::new(self.current as u8))
    }

    fn seats(&self) -> &[Seat] {
        &self.seats
    }

    fn is_terminal(&self) -> Option<GameResult> {
        if !self.is_set_up() || !(self.finished || self.globals.complete()) {
            return None;
        }
        let best = self.players.values().map(TerraformingPlayer::score).max()?;
        Some(GameResult::from_leaders(
            self.players
                .iter()
                .filter(|(_, p)| p.score() == best)
                .map(|(id, _)| id)
                .collect(),
        ))
    }

    fn turn_complete(&self, player: PlayerId) -> bool {
        self.acted && player.index() == self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::terraforming::ProjectKind;

    fn new_game(seed: u64) -> TerraformingMars {
        let mut game = TerraformingBuilder::new().build(seed);
        game.setup(&PlayerConfig::numbered(5)).unwrap();
        game
    }

    fn give(game: &mut TerraformingMars, player: PlayerId, kind: ProjectKind) -> ProjectCard {
        let card = ProjectCard {
            id: format!("test_{}", kind.slug()),
            kind,
        };
        game.players[player].hand.push(card.clone());
        card
    }

    fn play(card: &ProjectCard, mc: i64) -> Action {
        let action = Action::new(
            "play",
            "",
            ActionKind::Terraforming(TerraformingAction::PlayCard {
                card: card.id.clone(),
            }),
        );
        action.with_cost_if_any(Cost::new(Resource::Megacredits, mc))
    }

    fn pass_generation(game: &mut TerraformingMars) {
        for _ in 0..5 {
            let p = game.current_player().unwrap();
            game.execute(p, &Action::pass("")).unwrap();
            game.advance_turn();
        }
    }

    #[test]
    fn test_setup_corporations() {
        let game = new_game(1);
        let credits: Vec<_> = PlayerId::all(5)
            .map(|id| game.player(id).unwrap().stock.megacredits)
            .collect();
        assert_eq!(credits, vec![57, 36, 42, 30, 40]);
        for id in PlayerId::all(5) {
            let p = game.player(id).unwrap();
            assert_eq!(p.terraform_rating, 20);
            assert_eq!(p.hand.len(), 10);
            assert_eq!(p.production, Ledger::default());
        }
        assert_eq!(game.deck.len(), 10);
        assert_eq!(game.card_total(), 60);
        assert_eq!(game.state().seats[0].score, 20);
    }

    #[test]
    fn test_legal_actions_affordable() {
        let game = new_game(7);
        for id in PlayerId::all(5) {
            assert_eq!(game.legal_actions(id).is_empty(), id != PlayerId::new(0));
        }
        let p0 = PlayerId::new(0);
        let actions = game.legal_actions(p0);
        assert!(actions.iter().any(Action::is_pass));
        for a in &actions {
            if let Some(cost) = a.cost {
                if cost.resource == Resource::Megacredits {
                    assert!(cost.amount <= 57);
                }
            }
        }
        let ids: FxHashSet<_> = actions.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), actions.len());
    }

    #[test]
    fn test_steel_pays_for_building() {
        let mut game = new_game(1);
        let p0 = PlayerId::new(0);
        game.players[p0].stock.steel = 5;
        let mine = give(&mut game, p0, ProjectKind::Mine);

        game.execute(p0, &play(&mine, 0)).unwrap();

        let p = game.player(p0).unwrap();
        assert_eq!(p.stock.steel, 3);
        assert_eq!(p.stock.megacredits, 57);
        assert_eq!(p.production.steel, 1);
        assert!(p.played.iter().any(|c| c.id == mine.id));
    }

    #[test]
    fn test_titanium_pays_for_space() {
        let mut game = new_game(1);
        let p0 = PlayerId::new(0);
        game.players[p0].stock.titanium = 2;
        let asteroid = give(&mut game, p0, ProjectKind::Asteroid);

        let out = game.execute(p0, &play(&asteroid, 8)).unwrap();

        let p = game.player(p0).unwrap();
        // 2 spent, 2 gained
        assert_eq!(p.stock.titanium, 2);
        assert_eq!(p.stock.megacredits, 49);
        assert_eq!(p.terraform_rating, 21);
        assert_eq!(game.globals().temperature, -28);
        assert!(out.effects.contains(&Effect::Tracker {
            name: "temperature".into(),
            value: -28
        }));
    }

    #[test]
    fn test_maxed_tracker_grants_nothing() {
        let mut game = new_game(1);
        let p0 = PlayerId::new(0);
        game.globals.temperature = 8;
        let action = Action::new(
            "project_asteroid",
            "",
            ActionKind::Terraforming(TerraformingAction::Standard {
                project: StandardProject::Asteroid,
            }),
        )
        .with_cost(Cost::new(Resource::Megacredits, 14));
        game.execute(p0, &action).unwrap();

        assert_eq!(game.globals().temperature, 8);
        assert_eq!(game.player(p0).unwrap().terraform_rating, 20);
        assert_eq!(game.player(p0).unwrap().stock.megacredits, 43);
    }

    #[test]
    fn test_negative_production_needs_rate() {
        let mut game = new_game(1);
        let p0 = PlayerId::new(0);
        game.players[p0].hand.clear();
        let livestock = give(&mut game, p0, ProjectKind::Livestock);

        assert!(!game.legal_actions(p0).iter().any(|a| a.id == "play_livestock"));
        assert_eq!(
            game.execute(p0, &play(&livestock, 10)),
            Err(ActionError::Insufficient {
                resource: Resource::Plants,
                need: 1,
                have: 0
            })
        );

        game.players[p0].production.plants = 1;
        assert!(game.legal_actions(p0).iter().any(|a| a.id == "play_livestock"));
        game.execute(p0, &play(&livestock, 10)).unwrap();
        assert_eq!(game.player(p0).unwrap().production.plants, 0);
        assert_eq!(game.player(p0).unwrap().vp, 1);
    }

    #[test]
    fn test_sell_patent() {
        let mut game = new_game(1);
        let p0 = PlayerId::new(0);
        let card = game.player(p0).unwrap().hand[0].clone();
        let sell = Action::new(
            "sell",
            "",
            ActionKind::Terraforming(TerraformingAction::SellPatent { card: card.id }),
        );
        game.execute(p0, &sell).unwrap();
        assert_eq!(game.player(p0).unwrap().stock.megacredits, 58);
        assert_eq!(game.player(p0).unwrap().hand.len(), 9);
        assert_eq!(game.discard.len(), 1);
        assert_eq!(game.card_total(), 60);
    }

    #[test]
    fn test_conversions() {
        let mut game = new_game(1);
        let p0 = PlayerId::new(0);
        game.players[p0].stock.plants = 9;
        let convert = game
            .legal_actions(p0)
            .into_iter()
            .find(|a| a.id == "convert_plants")
            .unwrap();
        game.execute(p0, &convert).unwrap();

        let p = game.player(p0).unwrap();
        assert_eq!(p.stock.plants, 1);
        assert_eq!(p.vp, 1);
        assert_eq!(p.terraform_rating, 21);
        assert_eq!(game.globals().oxygen, 1);
        assert!(!game.legal_actions(p0).iter().any(|a| a.id == "convert_heat"));
    }

    #[test]
    fn test_stale_cost() {
        let mut game = new_game(1);
        let p0 = PlayerId::new(0);
        let action = Action::new(
            "project_city",
            "",
            ActionKind::Terraforming(TerraformingAction::Standard {
                project: StandardProject::City,
            }),
        )
        .with_cost(Cost::new(Resource::Megacredits, 20));
        assert!(matches!(game.execute(p0, &action), Err(ActionError::Stale(_))));
        assert_eq!(game.player(p0).unwrap().stock.megacredits, 57);
    }

    #[test]
    fn test_generation_upkeep() {
        let mut game = new_game(1);
        let p0 = PlayerId::new(0);
        game.players[p0].stock.energy = 3;
        game.players[p0].production.energy = 2;
        game.players[p0].production.megacredits = 1;

        pass_generation(&mut game);

        let p = game.player(p0).unwrap();
        assert_eq!(p.stock.heat, 3);
        assert_eq!(p.stock.energy, 2);
        assert_eq!(p.stock.megacredits, 57 + 1 + 20);
        assert_eq!(game.generation(), 2);
        assert_eq!(game.card_total(), 60);
        // 10 left in the deck covers two and a half players
        let hands: usize = PlayerId::all(5).map(|id| game.player(id).unwrap().hand.len()).sum();
        assert_eq!(hands, 60);
    }

    #[test]
    fn test_max_generations_ends_game() {
        let mut game = TerraformingBuilder::new().max_generations(1).build(3);
        game.setup(&PlayerConfig::numbered(5)).unwrap();
        pass_generation(&mut game);

        assert!(game.is_terminal().is_some());
        assert!(game.state().game_over);
        assert_eq!(game.current_player(), None);
        assert!(game.legal_actions(PlayerId::new(0)).is_empty());
    }

    #[test]
    fn test_planet_complete_ends_game() {
        let mut game = new_game(1);
        let p0 = PlayerId::new(0);
        game.globals.temperature = 6;
        game.globals.oxygen = 14;
        game.globals.oceans = 9;
        let action = Action::new(
            "project_asteroid",
            "",
            ActionKind::Terraforming(TerraformingAction::Standard {
                project: StandardProject::Asteroid,
            }),
        )
        .with_cost(Cost::new(Resource::Megacredits, 14));
        game.execute(p0, &action).unwrap();

        assert_eq!(game.is_terminal(), Some(GameResult::Winner(p0)));
        assert_eq!(game.execute(p0, &Action::pass("")), Err(ActionError::GameOver));
    }
}
