//! Gloomhaven engine: card halves, rests and the monster round.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

use super::cards::{Ability, AbilityCard, CharacterClass, Half};
use super::scenario::{spawn_monsters, Monster, GRID, SCENARIO_NAME, START_CELLS};
use crate::core::config::require_players;
use crate::core::player::next_alive;
use crate::core::{
    Action, ActionError, ActionKind, Bounds, Cell, ConfigError, DeckCount, Effect, GameDetail,
    GameRng, GameState, Outcome, PlayerConfig, PlayerId, PlayerMap, Resource, Seat,
};
use crate::rules::{check_cost, GameKind, GameResult, HitPoints, RulesEngine};

/// What a played half is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
    Monster { id: usize },
    Cell { cell: Cell },
    Ally { player: PlayerId },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GloomhavenAction {
    PlayHalf {
        card: String,
        half: Half,
        target: Option<Target>,
    },
    /// Lose one random discard and take the rest back. Ends the turn.
    Rest,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub class: CharacterClass,
    pub hp: HitPoints,
    pub position: Cell,
    pub hand: Vec<AbilityCard>,
    pub discard: Vec<AbilityCard>,
    pub lost: Vec<AbilityCard>,
    /// Damage prevented per monster attack until the round ends.
    pub shield: i64,
    pub gold: i64,
    pub experience: i64,
    /// Halves played this turn.
    pub played: SmallVec<[Half; 2]>,
    pub ended: bool,
}

impl Character {
    fn new(class: CharacterClass, position: Cell) -> Self {
        Self {
            class,
            hp: HitPoints::full(class.max_hp()),
            position,
            hand: class.hand(),
            discard: Vec::new(),
            lost: Vec::new(),
            shield: 0,
            gold: 0,
            experience: 0,
            played: SmallVec::new(),
            ended: false,
        }
    }

    /// Out of the scenario: no health left, or too few cards to play a turn.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.hp.is_defeated() || (self.hand.is_empty() && self.discard.len() < 2)
    }

    fn turn_done(&self) -> bool {
        self.ended || self.played.len() == 2
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GloomhavenView {
    pub scenario: String,
    pub level: u8,
    pub bounds: Bounds,
    pub characters: Vec<Character>,
    pub monsters: Vec<Monster>,
}

/// Builder for creating a `Gloomhaven` engine.
pub struct GloomhavenBuilder {
    level: u8,
}

impl Default for GloomhavenBuilder {
    fn default() -> Self {
        Self { level: 1 }
    }
}

impl GloomhavenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monster level, 1 to 3.
    pub fn level(mut self, level: u8) -> Self {
        assert!((1..=3).contains(&level), "Monster level must be 1-3");
        self.level = level;
        self
    }

    pub fn build(self, seed: u64) -> Gloomhaven {
        Gloomhaven {
            level: self.level,
            rng: GameRng::new(seed),
            seats: Vec::new(),
            players: PlayerMap::default(),
            monsters: Vec::new(),
            round: 0,
            turn: 0,
            current: 0,
        }
    }
}

enum Resolved {
    Attack { monster: usize, damage: i64 },
    Move { to: Cell },
    Heal { ally: PlayerId, amount: i64 },
    Shield { amount: i64 },
    Loot { amount: i64 },
    Recover { cards: usize },
}

enum Plan {
    Play {
        card: usize,
        half: Half,
        resolved: Resolved,
    },
    Rest,
    Pass,
}

#[derive(Clone, Debug)]
pub struct Gloomhaven {
    level: u8,
    rng: GameRng,
    seats: Vec<Seat>,
    players: PlayerMap<Character>,
    monsters: Vec<Monster>,
    round: u32,
    turn: u32,
    current: usize,
}

impl Gloomhaven {
    pub fn character(&self, player: PlayerId) -> Option<&Character> {
        self.players.get(player)
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    fn living_characters(&self) -> impl Iterator<Item = (PlayerId, &Character)> {
        self.players
            .iter()
            .filter(move |(id, _)| self.seats[id.index()].alive)
    }

    fn occupied(&self, cell: Cell) -> bool {
        self.living_characters().any(|(_, c)| c.position == cell)
            || self.monsters.iter().any(|m| m.is_alive() && m.position == cell)
    }

    /// Every target `ability` could be aimed at for `player` right now.
    fn targets(&self, player: PlayerId, ability: Ability) -> Vec<Option<Target>> {
        let me = &self.players[player];
        match ability {
            Ability::Attack { range, .. } => self
                .monsters
                .iter()
                .filter(|m| m.is_alive() && me.position.distance(m.position) <= range)
                .map(|m| Some(Target::Monster { id: m.id }))
                .collect(),
            Ability::Move { distance } => GRID
                .cells()
                .filter(|&cell| {
                    (1..=distance).contains(&me.position.distance(cell)) && !self.occupied(cell)
                })
                .map(|cell| Some(Target::Cell { cell }))
                .collect(),
            Ability::Heal { range, .. } => self
                .living_characters()
                .filter(|(_, c)| me.position.distance(c.position) <= range)
                .map(|(ally, _)| Some(Target::Ally { player: ally }))
                .collect(),
            Ability::Shield { .. } | Ability::Loot { .. } => vec![None],
            Ability::Recover { .. } if me.lost.is_empty() => Vec::new(),
            Ability::Recover { .. } => vec![None],
        }
    }

    fn resolve(
        &self,
        player: PlayerId,
        ability: Ability,
        target: Option<Target>,
    ) -> Result<Resolved, ActionError> {
        let me = &self.players[player];
        match (ability, target) {
            (Ability::Attack { damage, range }, Some(Target::Monster { id })) => {
                let monster = self
                    .monsters
                    .get(id)
                    .filter(|m| m.is_alive())
                    .ok_or_else(|| ActionError::precondition(format!("no living monster {id}")))?;
                if me.position.distance(monster.position) > range {
                    return Err(ActionError::precondition(format!(
                        "{} is out of range",
                        monster.label()
                    )));
                }
                Ok(Resolved::Attack { monster: id, damage })
            }
            (Ability::Move { distance }, Some(Target::Cell { cell })) => {
                if !GRID.contains(cell) {
                    return Err(ActionError::precondition(format!("{cell} is off the map")));
                }
                if !(1..=distance).contains(&me.position.distance(cell)) {
                    return Err(ActionError::precondition(format!("{cell} is out of reach")));
                }
                if self.occupied(cell) {
                    return Err(ActionError::precondition(format!("{cell} is occupied")));
                }
                Ok(Resolved::Move { to: cell })
            }
            (Ability::Heal { amount, range }, Some(Target::Ally { player: ally })) => {
                let other = self
                    .players
                    .get(ally)
                    .filter(|_| self.seats[ally.index()].alive)
                    .ok_or_else(|| ActionError::precondition(format!("{ally} cannot be healed")))?;
                if me.position.distance(other.position) > range {
                    return Err(ActionError::precondition(format!("{ally} is out of range")));
                }
                Ok(Resolved::Heal { ally, amount })
            }
            (Ability::Shield { amount }, None) => Ok(Resolved::Shield { amount }),
            (Ability::Loot { amount }, None) => Ok(Resolved::Loot { amount }),
            (Ability::Recover { cards }, None) => {
                if me.lost.is_empty() {
                    return Err(ActionError::Exhausted("lost pile".into()));
                }
                Ok(Resolved::Recover { cards })
            }
            (ability, _) => Err(ActionError::precondition(format!(
                "wrong target for {ability}"
            ))),
        }
    }

    fn plan(&self, player: PlayerId, action: &Action) -> Result<Plan, ActionError> {
        let gloom = match &action.kind {
            ActionKind::Pass => return Ok(Plan::Pass),
            ActionKind::Gloomhaven(a) => a,
            _ => return Err(ActionError::WrongGame),
        };
        let me = &self.players[player];
        match gloom {
            GloomhavenAction::PlayHalf { card, half, target } => {
                if me.played.contains(half) {
                    return Err(ActionError::precondition(format!(
                        "{} half already played this turn",
                        half.slug()
                    )));
                }
                let idx = me
                    .hand
                    .iter()
                    .position(|c| &c.id == card)
                    .ok_or_else(|| ActionError::precondition(format!("{card} is not in hand")))?;
                let resolved = self.resolve(player, me.hand[idx].half(*half), *target)?;
                Ok(Plan::Play {
                    card: idx,
                    half: *half,
                    resolved,
                })
            }
            GloomhavenAction::Rest => {
                if !me.played.is_empty() {
                    return Err(ActionError::precondition("cannot rest after playing a card"));
                }
                if me.discard.is_empty() {
                    return Err(ActionError::precondition("no cards to recover"));
                }
                Ok(Plan::Rest)
            }
        }
    }

    fn apply(&mut self, player: PlayerId, plan: Plan) -> Outcome {
        let name = self.seats[player.index()].name.clone();
        let outcome = match plan {
            Plan::Play {
                card,
                half,
                resolved,
            } => {
                let me = &mut self.players[player];
                let card = me.hand.remove(card);
                let mut outcome = Outcome::new(format!(
                    "{name} played {} ({}): {}",
                    card.name,
                    half.slug(),
                    card.half(half)
                ));
                me.discard.push(card);
                me.played.push(half);
                self.resolve_half(player, resolved, &mut outcome);
                outcome
            }
            Plan::Rest => {
                let me = &mut self.players[player];
                let lost = me.discard.remove(self.rng.index(me.discard.len()));
                let recovered = me.discard.len();
                me.hand.append(&mut me.discard);
                me.ended = true;
                let outcome = Outcome::new(format!(
                    "{name} rested, recovered {recovered} cards and lost {}",
                    lost.name
                ))
                .with(Effect::CardLost {
                    player,
                    card: lost.id.clone(),
                });
                me.lost.push(lost);
                outcome
            }
            Plan::Pass => {
                self.players[player].ended = true;
                Outcome::new(format!("{name} ended their turn"))
            }
        };
        self.sync_scores();
        outcome
    }

    fn resolve_half(&mut self, player: PlayerId, resolved: Resolved, outcome: &mut Outcome) {
        match resolved {
            Resolved::Attack { monster, damage } => {
                let target = &mut self.monsters[monster];
                let dealt = target.hp.damage(damage);
                outcome.push(Effect::Damage {
                    target: target.label(),
                    amount: dealt,
                });
                if !target.is_alive() {
                    outcome.push(Effect::Defeated {
                        target: target.label(),
                    });
                    info!(monster = %target.label(), player = %player, "monster slain");
                    self.players[player].experience += 1;
                    outcome.push(Effect::Resource {
                        player,
                        resource: Resource::Experience,
                        delta: 1,
                    });
                }
            }
            Resolved::Move { to } => {
                let me = &mut self.players[player];
                let from = std::mem::replace(&mut me.position, to);
                outcome.push(Effect::Moved {
                    unit: me.class.slug().to_string(),
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
            Resolved::Heal { ally, amount } => {
                let healed = self.players[ally].hp.heal(amount);
                outcome.push(Effect::Healed {
                    target: self.seats[ally.index()].name.clone(),
                    amount: healed,
                });
            }
            Resolved::Shield { amount } => {
                self.players[player].shield += amount;
                outcome.note(format!("shield {amount} until the end of the round"));
            }
            Resolved::Loot { amount } => {
                self.players[player].gold += amount;
                outcome.push(Effect::Resource {
                    player,
                    resource: Resource::Gold,
                    delta: amount,
                });
            }
            Resolved::Recover { cards } => {
                let me = &mut self.players[player];
                let keep = me.lost.len().saturating_sub(cards);
                for card in me.lost.split_off(keep) {
                    outcome.push(Effect::CardGained {
                        player,
                        card: card.id.clone(),
                    });
                    me.hand.push(card);
                }
            }
        }
    }

    fn sync_scores(&mut self) {
        for (id, character) in self.players.iter() {
            self.seats[id.index()].score = character.experience;
        }
    }

    /// Nearest living character to `from`, lowest seat on ties.
    fn nearest_character(&self, from: Cell) -> Option<(PlayerId, Cell)> {
        self.living_characters()
            .min_by_key(|(id, c)| (from.distance(c.position), *id))
            .map(|(id, c)| (id, c.position))
    }

    fn monster_turn(&mut self, idx: usize) {
        let kind = self.monsters[idx].kind;
        let Some((target, goal)) = self.nearest_character(self.monsters[idx].position) else {
            return;
        };
        if self.monsters[idx].position.distance(goal) <= kind.range() {
            let victim = &mut self.players[target];
            let dealt = victim.hp.damage(kind.attack() - victim.shield);
            debug!(monster = %self.monsters[idx].label(), target = %target, dealt, "monster attacks");
            return;
        }
        for _ in 0..kind.movement() {
            let here = self.monsters[idx].position;
            if here.distance(goal) <= kind.range() {
                break;
            }
            let step = here.step_toward(goal);
            if !GRID.contains(step) || self.occupied(step) {
                break;
            }
            self.monsters[idx].position = step;
        }
    }

    /// Monsters act, exhausted characters drop out, shields reset.
    fn end_round(&mut self) {
        for idx in 0..self.monsters.len() {
            if self.monsters[idx].is_alive() {
                self.monster_turn(idx);
            }
        }
        for id in PlayerId::all(self.seats.len()) {
            if self.seats[id.index()].alive && self.players[id].is_exhausted() {
                self.seats[id.index()].alive = false;
                info!(player = %id, class = self.players[id].class.slug(), "character exhausted");
            }
        }
        for character in self.players.values_mut() {
            character.shield = 0;
        }
        self.round += 1;
        match self.is_terminal() {
            Some(result) => info!(round = self.round, ?result, "scenario over"),
            None => info!(round = self.round, "round started"),
        }
    }
}

impl RulesEngine for Gloomhaven {
    fn kind(&self) -> GameKind {
        GameKind::Gloomhaven
    }

    fn setup(&mut self, players: &[PlayerConfig]) -> Result<GameState, ConfigError> {
        if self.is_set_up() {
            return Err(ConfigError::AlreadySetUp);
        }
        let count = GameKind::Gloomhaven.player_count();
        require_players(GameKind::Gloomhaven.id(), count, players)?;
        let classes = players
            .iter()
            .enumerate()
            .map(|(i, p)| {
                p.class
                    .as_deref()
                    .map_or(Ok(CharacterClass::ALL[i]), CharacterClass::parse)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.seats = players
            .iter()
            .enumerate()
            .map(|(i, p)| Seat::new(PlayerId::new(i as u8), p.name.clone()))
            .collect();
        self.players = PlayerMap::from_vec(
            classes
                .into_iter()
                .zip(START_CELLS)
                .map(|(class, cell)| Character::new(class, cell))
                .collect(),
        );
        self.monsters = spawn_monsters(self.level);
        self.round = 1;
        self.turn = 1;

        info!(
            scenario = SCENARIO_NAME,
            level = self.level,
            monsters = self.monsters.len(),
            "gloomhaven set up"
        );
        Ok(self.state())
    }

    fn state(&self) -> GameState {
        let mut decks = Vec::new();
        for (id, c) in self.players.iter() {
            decks.push(DeckCount::new(format!("hand_{}", id.index()), c.hand.len()));
            decks.push(DeckCount::new(format!("discard_{}", id.index()), c.discard.len()));
        }
        GameState {
            game: GameKind::Gloomhaven,
            turn: self.turn,
            round: self.round,
            phase: "character_turns".to_string(),
            current_player: self.current_player(),
            game_over: self.is_terminal().is_some(),
            winners: self.is_terminal().map(|r| r.winners()).unwrap_or_default(),
            seats: self.seats.clone(),
            decks,
            detail: GameDetail::Gloomhaven(GloomhavenView {
                scenario: SCENARIO_NAME.to_string(),
                level: self.level,
                bounds: GRID,
                characters: self.players.values().cloned().collect(),
                monsters: self.monsters.clone(),
            }),
        }
    }

    fn legal_actions(&self, player: PlayerId) -> Vec<Action> {
        if !self.can_act(player) {
            return Vec::new();
        }
        let me = &self.players[player];
        let mut actions = Vec::new();
        for card in &me.hand {
            for half in [Half::Top, Half::Bottom] {
                if me.played.contains(&half) {
                    continue;
                }
                let ability = card.half(half);
                for target in self.targets(player, ability) {
                    let suffix = match target {
                        None => String::new(),
                        Some(Target::Monster { id }) => format!("_m{id}"),
                        Some(Target::Cell { cell }) => format!("_{}_{}", cell.x, cell.y),
                        Some(Target::Ally { player }) => format!("_p{}", player.index()),
                    };
                    actions.push(Action::new(
                        format!("play_{}_{}{suffix}", card.id, half.slug()),
                        format!("Play {} ({}): {ability}", card.name, half.slug()),
                        ActionKind::Gloomhaven(GloomhavenAction::PlayHalf {
                            card: card.id.clone(),
                            half,
                            target,
                        }),
                    ));
                }
            }
        }
        if me.played.is_empty() && !me.discard.is_empty() {
            actions.push(Action::new(
                "rest",
                "Rest to recover discarded cards",
                ActionKind::Gloomhaven(GloomhavenAction::Rest),
            ));
        }
        actions.push(Action::pass("End turn"));
        actions
    }

    fn execute(&mut self, player: PlayerId, action: &Action) -> Result<Outcome, ActionError> {
        self.check_actor(player)?;
        let plan = self
            .plan(player, action)
            .and_then(|plan| check_cost(action, None).map(|()| plan));
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
        let current = &mut self.players[PlayerId::new(self.current as u8)];
        current.played.clear();
        current.ended = false;

        match next_alive(&self.seats, self.current) {
            Some(next) if next > self.current => self.current = next,
            _ => {
                self.end_round();
                if let Some(first) = self.seats.iter().position(|s| s.alive) {
                    self.current = first;
                }
            }
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
        if !self.is_set_up() {
            return None;
        }
        let living: Vec<PlayerId> = self.living_characters().map(|(id, _)| id).collect();
        if self.monsters.iter().all(|m| !m.is_alive()) {
            Some(GameResult::from_leaders(living))
        } else if living.is_empty() {
            Some(GameResult::Draw)
        } else {
            None
        }
    }

    fn turn_complete(&self, player: PlayerId) -> bool {
        player.index() == self.current && self.players.get(player).is_some_and(Character::turn_done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_game() -> Gloomhaven {
        let mut game = GloomhavenBuilder::new().build(7);
        game.setup(&PlayerConfig::numbered(4)).unwrap();
        game
    }

    fn play(card: &str, half: Half, target: Option<Target>) -> Action {
        Action::new(
            "x",
            "",
            ActionKind::Gloomhaven(GloomhavenAction::PlayHalf {
                card: card.into(),
                half,
                target,
            }),
        )
    }

    fn pass_round(game: &mut Gloomhaven) {
        for _ in 0..game.seats.iter().filter(|s| s.alive).count() {
            let p = game.current_player().unwrap();
            game.execute(p, &Action::pass("")).unwrap();
            game.advance_turn();
        }
    }

    fn clear_monsters_except(game: &mut Gloomhaven, keep: usize) {
        for m in game.monsters.iter_mut().filter(|m| m.id != keep) {
            m.hp.current = 0;
        }
    }

    #[test]
    fn test_setup_default_classes() {
        let game = new_game();
        let hp: Vec<_> = game.players.values().map(|c| c.hp.max).collect();
        assert_eq!(hp, vec![10, 8, 6, 8]);
        assert_eq!(game.character(PlayerId::new(2)).unwrap().class, CharacterClass::Spellweaver);
        assert_eq!(game.monsters().len(), 7);
        assert_eq!(game.state().current_player, Some(PlayerId::new(0)));
        assert_eq!(game.state().deck("hand_3"), Some(6));
    }

    #[test]
    fn test_configured_and_unknown_class() {
        let mut players = PlayerConfig::numbered(4);
        players[0] = PlayerConfig::new("Ada").with_class("scoundrel");
        let mut game = GloomhavenBuilder::new().level(3).build(1);
        game.setup(&players).unwrap();
        assert_eq!(game.character(PlayerId::new(0)).unwrap().hp.max, 8);
        assert_eq!(game.monsters()[0].hp.max, 7);

        players[1] = PlayerConfig::new("Bo").with_class("necromancer");
        let mut game = GloomhavenBuilder::new().build(1);
        assert_eq!(
            game.setup(&players),
            Err(ConfigError::UnknownClass {
                game: "gloomhaven".into(),
                class: "necromancer".into()
            })
        );
        assert!(!game.is_set_up());
    }

    #[test]
    fn test_move_targets_skip_occupied() {
        let game = new_game();
        let ids: Vec<_> = game
            .legal_actions(PlayerId::new(0))
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert!(ids.contains(&"play_brute_1_bottom_2_0".to_string()));
        assert!(!ids.contains(&"play_brute_1_bottom_3_0".to_string()));
        assert!(!ids.contains(&"play_brute_1_bottom_1_0".to_string()));
        // nothing in melee range yet
        assert!(!ids.iter().any(|id| id.contains("_top_m")));
        assert!(ids.contains(&"play_brute_4_top".to_string()));
        assert!(!ids.contains(&"rest".to_string()));
        assert!(game.legal_actions(PlayerId::new(1)).is_empty());
    }

    #[test]
    fn test_one_top_and_one_bottom_per_turn() {
        let mut game = new_game();
        let p0 = PlayerId::new(0);
        let to = Some(Target::Cell { cell: Cell::new(2, 0) });
        game.execute(p0, &play("brute_1", Half::Bottom, to)).unwrap();
        assert_eq!(game.character(p0).unwrap().position, Cell::new(2, 0));

        let again = game.execute(p0, &play("brute_3", Half::Bottom, Some(Target::Cell { cell: Cell::new(2, 1) })));
        assert_eq!(
            again,
            Err(ActionError::precondition("bottom half already played this turn"))
        );
        assert!(game.legal_actions(p0).iter().all(|a| !a.id.contains("_bottom")));

        game.execute(p0, &play("brute_4", Half::Top, None)).unwrap();
        assert!(game.turn_complete(p0));
        assert_eq!(
            game.execute(p0, &Action::pass("")),
            Err(ActionError::TurnComplete(p0))
        );
        let me = game.character(p0).unwrap();
        assert_eq!((me.hand.len(), me.discard.len(), me.shield), (4, 2, 1));
    }

    #[test]
    fn test_attack_and_kill() {
        let mut game = new_game();
        let p0 = PlayerId::new(0);
        game.players[p0].position = Cell::new(2, 0);
        let target = Some(Target::Monster { id: 0 });

        let out = game.execute(p0, &play("brute_3", Half::Top, target)).unwrap();
        assert_eq!(game.monsters()[0].hp.current, 2);
        assert_eq!(
            out.effects,
            vec![Effect::Damage {
                target: "Bandit Guard 0".into(),
                amount: 3
            }]
        );

        game.players[p0].played.clear();
        let out = game.execute(p0, &play("brute_1", Half::Top, target)).unwrap();
        assert!(!game.monsters()[0].is_alive());
        assert!(out.effects.contains(&Effect::Defeated {
            target: "Bandit Guard 0".into()
        }));
        assert_eq!(game.state().seats[0].score, 1);
    }

    #[test]
    fn test_attack_out_of_range() {
        let mut game = new_game();
        let err = game.execute(
            PlayerId::new(0),
            &play("brute_3", Half::Top, Some(Target::Monster { id: 6 })),
        );
        assert_eq!(err, Err(ActionError::precondition("Bandit Archer 6 is out of range")));
        assert_eq!(game.character(PlayerId::new(0)).unwrap().hand.len(), 6);
    }

    #[test]
    fn test_heal_ally_capped() {
        let mut game = new_game();
        let (brute, tinkerer) = (PlayerId::new(0), PlayerId::new(1));
        game.players[brute].hp.current = 9;
        pass_round(&mut game);
        game.execute(PlayerId::new(0), &Action::pass("")).unwrap();
        game.advance_turn();

        let heal = Some(Target::Ally { player: brute });
        let out = game.execute(tinkerer, &play("tink_1", Half::Top, heal)).unwrap();
        assert_eq!(game.character(brute).unwrap().hp.current, 10);
        assert_eq!(
            out.effects,
            vec![Effect::Healed {
                target: "Player0".into(),
                amount: 1
            }]
        );
    }

    #[test]
    fn test_rest_loses_one_card() {
        let mut game = new_game();
        let p0 = PlayerId::new(0);
        let me = &mut game.players[p0];
        let moved: Vec<_> = me.hand.drain(..3).collect();
        me.discard.extend(moved);

        let rest = game.legal_actions(p0).into_iter().find(|a| a.id == "rest").unwrap();
        let out = game.execute(p0, &rest).unwrap();
        let me = game.character(p0).unwrap();
        assert_eq!((me.hand.len(), me.discard.len(), me.lost.len()), (5, 0, 1));
        assert!(matches!(out.effects[0], Effect::CardLost { .. }));
        assert!(game.turn_complete(p0));
    }

    #[test]
    fn test_recover_lost_card() {
        let mut game = new_game();
        let weaver = PlayerId::new(2);
        game.current = 2;
        let lost = game.players[weaver].hand.remove(0);
        game.players[weaver].lost.push(lost);

        game.execute(weaver, &play("spell_4", Half::Top, None)).unwrap();
        let me = game.character(weaver).unwrap();
        assert!(me.lost.is_empty());
        assert!(me.hand.iter().any(|c| c.id == "spell_1"));
    }

    #[test]
    fn test_monster_attack_respects_shield() {
        let mut game = new_game();
        clear_monsters_except(&mut game, 0);
        game.monsters[0].position = Cell::new(2, 2);
        let scoundrel = PlayerId::new(3);
        game.players[scoundrel].shield = 1;

        pass_round(&mut game);
        let me = game.character(scoundrel).unwrap();
        assert_eq!(me.hp.current, 7);
        assert_eq!(me.shield, 0);
        assert_eq!(game.state().round, 2);
        assert_eq!(game.current_player(), Some(PlayerId::new(0)));
    }

    #[test]
    fn test_monsters_close_in() {
        let mut game = new_game();
        clear_monsters_except(&mut game, 5);
        pass_round(&mut game);
        // archer moves one step toward the nearest character at (1, 0)
        assert_eq!(game.monsters()[5].position, Cell::new(5, 0));
    }

    #[test]
    fn test_exhausted_character_skipped() {
        let mut game = new_game();
        game.players[PlayerId::new(0)].hp.current = 0;
        let p1 = PlayerId::new(1);
        game.players[p1].hand.clear();
        pass_round(&mut game);

        assert!(!game.seats[0].alive);
        assert!(!game.seats[1].alive);
        assert_eq!(game.current_player(), Some(PlayerId::new(2)));
        assert!(game.legal_actions(PlayerId::new(0)).is_empty());
    }

    #[test]
    fn test_victory_when_monsters_dead() {
        let mut game = new_game();
        clear_monsters_except(&mut game, 0);
        game.players[PlayerId::new(0)].position = Cell::new(2, 0);
        game.monsters[0].hp.current = 1;
        game.execute(
            PlayerId::new(0),
            &play("brute_3", Half::Top, Some(Target::Monster { id: 0 })),
        )
        .unwrap();

        let state = game.state();
        assert!(state.game_over);
        assert_eq!(state.winners.len(), 4);
        assert_eq!(state.current_player, None);
        assert!(game.legal_actions(PlayerId::new(1)).is_empty());
    }

    #[test]
    fn test_all_exhausted_is_draw() {
        let mut game = new_game();
        for c in game.players.values_mut() {
            c.hp.current = 0;
        }
        pass_round(&mut game);
        assert_eq!(game.is_terminal(), Some(GameResult::Draw));
    }
}
