//! Exploding Kittens engine.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cards::{self, CardKind, CatKind, KittenCard};
use crate::core::config::require_players;
use crate::core::player::next_alive;
use crate::core::{
    Action, ActionError, ActionKind, ConfigError, Deck, DeckCount, DeckPosition, Effect,
    GameDetail, GameRng, GameState, Outcome, PlayerConfig, PlayerId, PlayerMap, Seat,
};
use crate::rules::{check_cost, GameKind, GameResult, RulesEngine};

const SEE_THE_FUTURE: usize = 3;
const DISCARD_SHOWN: usize = 5;

/// Exploding Kittens actions. Cards are named by id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KittensAction {
    Attack { card: String },
    Skip { card: String },
    Favor { card: String, target: PlayerId },
    Shuffle { card: String },
    SeeTheFuture { card: String },
    Nope { card: String },
    PlayPair {
        first: String,
        second: String,
        target: PlayerId,
    },
    Draw,
}

/// Per-seat ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KittensPlayer {
    pub hand: Vec<KittenCard>,
    /// Turns still owed. The turn is over at zero.
    pub owed: u32,
    /// Owed turns include extras from an attack.
    pub under_attack: bool,
}

impl KittensPlayer {
    fn find(&self, id: &str, kind: CardKind) -> Option<usize> {
        self.hand.iter().position(|c| c.id == id && c.kind == kind)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KittensView {
    pub players: Vec<KittensPlayer>,
    pub deck_size: usize,
    pub discard_size: usize,
    /// Most recent discards, newest last.
    pub discard_top: Vec<KittenCard>,
    /// Kittens that went off with their victims.
    pub eliminated_pool: Vec<KittenCard>,
    /// Names of exploded players, in order.
    pub exploded: Vec<String>,
}

/// Builder for creating an `ExplodingKittens` engine.
pub struct KittensBuilder {
    hand_size: usize,
}

impl Default for KittensBuilder {
    fn default() -> Self {
        Self { hand_size: 7 }
    }
}

impl KittensBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Main-deck cards dealt to each player, not counting the defuse.
    pub fn hand_size(mut self, size: usize) -> Self {
        self.hand_size = size;
        self
    }

    pub fn build(self, seed: u64) -> ExplodingKittens {
        ExplodingKittens {
            hand_size: self.hand_size,
            rng: GameRng::new(seed),
            seats: Vec::new(),
            players: PlayerMap::default(),
            deck: Deck::new(),
            discard: Deck::new(),
            eliminated_pool: Vec::new(),
            exploded: Vec::new(),
            current: 0,
            turn: 0,
            round: 0,
        }
    }
}

/// Resolved, validated action ready to apply.
enum Plan {
    Attack { card: usize, victim: PlayerId },
    Skip { card: usize },
    Favor { card: usize, target: PlayerId },
    Shuffle { card: usize },
    SeeTheFuture { card: usize },
    Nope { card: usize },
    Pair { first: usize, second: usize, target: PlayerId },
    Draw,
}

#[derive(Clone, Debug)]
pub struct ExplodingKittens {
    hand_size: usize,
    rng: GameRng,
    seats: Vec<Seat>,
    players: PlayerMap<KittensPlayer>,
    deck: Deck<KittenCard>,
    discard: Deck<KittenCard>,
    eliminated_pool: Vec<KittenCard>,
    exploded: Vec<String>,
    current: usize,
    turn: u32,
    round: u32,
}

impl ExplodingKittens {
    pub fn player(&self, player: PlayerId) -> Option<&KittensPlayer> {
        self.players.get(player)
    }

    pub fn deck(&self) -> &Deck<KittenCard> {
        &self.deck
    }

    /// Total cards across deck, discard, hands and the eliminated pool.
    #[must_use]
    pub fn card_total(&self) -> usize {
        self.deck.len()
            + self.discard.len()
            + self.eliminated_pool.len()
            + self.players.values().map(|p| p.hand.len()).sum::<usize>()
    }

    fn alive_count(&self) -> usize {
        self.seats.iter().filter(|s| s.alive).count()
    }

    /// Living opponents with at least one card.
    fn targets(&self, player: PlayerId) -> Vec<PlayerId> {
        self.seats
            .iter()
            .filter(|s| s.alive && s.id != player && !self.players[s.id].hand.is_empty())
            .map(|s| s.id)
            .collect()
    }

    fn check_target(&self, player: PlayerId, target: PlayerId) -> Result<(), ActionError> {
        let seat = self
            .seats
            .get(target.index())
            .ok_or(ActionError::UnknownPlayer(target))?;
        if target == player {
            return Err(ActionError::precondition("cannot target yourself"));
        }
        if !seat.alive {
            return Err(ActionError::Eliminated(target));
        }
        if self.players[target].hand.is_empty() {
            return Err(ActionError::precondition(format!("{target} has no cards")));
        }
        Ok(())
    }

    fn hand_card(
        &self,
        player: PlayerId,
        id: &str,
        kind: CardKind,
    ) -> Result<usize, ActionError> {
        self.players[player]
            .find(id, kind)
            .ok_or_else(|| ActionError::precondition(format!("no {} card {id} in hand", kind.name())))
    }

    fn plan(&self, player: PlayerId, action: &KittensAction) -> Result<Plan, ActionError> {
        let me = &self.players[player];
        let plan = match action {
            KittensAction::Attack { card } => {
                let card = self.hand_card(player, card, CardKind::Attack)?;
                let victim = next_alive(&self.seats, player.index())
                    .map(|i| self.seats[i].id)
                    .ok_or_else(|| ActionError::precondition("nobody to attack"))?;
                Plan::Attack { card, victim }
            }
            KittensAction::Skip { card } => Plan::Skip {
                card: self.hand_card(player, card, CardKind::Skip)?,
            },
            KittensAction::Favor { card, target } => {
                let card = self.hand_card(player, card, CardKind::Favor)?;
                self.check_target(player, *target)?;
                Plan::Favor {
                    card,
                    target: *target,
                }
            }
            KittensAction::Shuffle { card } => Plan::Shuffle {
                card: self.hand_card(player, card, CardKind::Shuffle)?,
            },
            KittensAction::SeeTheFuture { card } => Plan::SeeTheFuture {
                card: self.hand_card(player, card, CardKind::SeeTheFuture)?,
            },
            KittensAction::Nope { card } => {
                let card = self.hand_card(player, card, CardKind::Nope)?;
                if !(me.under_attack && me.owed > 1) {
                    return Err(ActionError::precondition("no attack to nope"));
                }
                Plan::Nope { card }
            }
            KittensAction::PlayPair {
                first,
                second,
                target,
            } => {
                if first == second {
                    return Err(ActionError::precondition("a pair needs two different cards"));
                }
                let a = me
                    .hand
                    .iter()
                    .position(|c| &c.id == first)
                    .ok_or_else(|| ActionError::precondition(format!("no card {first} in hand")))?;
                let b = me
                    .hand
                    .iter()
                    .position(|c| &c.id == second)
                    .ok_or_else(|| ActionError::precondition(format!("no card {second} in hand")))?;
                match (me.hand[a].kind, me.hand[b].kind) {
                    (CardKind::Cat(x), CardKind::Cat(y)) if x == y => {}
                    _ => return Err(ActionError::precondition("not a matching cat pair")),
                }
                self.check_target(player, *target)?;
                Plan::Pair {
                    first: a,
                    second: b,
                    target: *target,
                }
            }
            KittensAction::Draw => {
                if self.deck.is_empty() {
                    return Err(ActionError::Exhausted("draw pile".into()));
                }
                Plan::Draw
            }
        };
        Ok(plan)
    }

    fn discard_from_hand(&mut self, player: PlayerId, index: usize, outcome: &mut Outcome) {
        let card = self.players[player].hand.remove(index);
        outcome.push(Effect::CardDiscarded {
            player,
            card: card.id.clone(),
        });
        self.discard.put(card, DeckPosition::Top);
    }

    fn steal_random(&mut self, thief: PlayerId, target: PlayerId, outcome: &mut Outcome) {
        let victim = &mut self.players[target].hand;
        if victim.is_empty() {
            return;
        }
        let idx = self.rng.index(victim.len());
        let card = victim.remove(idx);
        outcome.push(Effect::CardStolen {
            from: target,
            to: thief,
            card: card.id.clone(),
        });
        self.players[thief].hand.push(card);
    }

    fn apply(&mut self, player: PlayerId, plan: Plan) -> Outcome {
        let name = self.seats[player.index()].name.clone();
        match plan {
            Plan::Attack { card, victim } => {
                let mut outcome = Outcome::new(format!("{name} attacks {victim}"));
                self.discard_from_hand(player, card, &mut outcome);
                let me = &mut self.players[player];
                me.owed = 0;
                me.under_attack = false;
                let next = &mut self.players[victim];
                next.owed += 2;
                next.under_attack = true;
                outcome.push(Effect::TurnsOwed {
                    player: victim,
                    turns: next.owed,
                });
                outcome
            }
            Plan::Skip { card } => {
                let mut outcome = Outcome::new(format!("{name} skips"));
                self.discard_from_hand(player, card, &mut outcome);
                self.consume_turn(player, &mut outcome);
                outcome
            }
            Plan::Favor { card, target } => {
                let mut outcome = Outcome::new(format!("{name} asks {target} for a favor"));
                self.discard_from_hand(player, card, &mut outcome);
                self.steal_random(player, target, &mut outcome);
                outcome
            }
            Plan::Shuffle { card } => {
                let mut outcome = Outcome::new(format!("{name} shuffles the deck"));
                self.discard_from_hand(player, card, &mut outcome);
                self.deck.shuffle(&mut self.rng);
                outcome
            }
            Plan::SeeTheFuture { card } => {
                let mut outcome = Outcome::new(format!("{name} sees the future"));
                self.discard_from_hand(player, card, &mut outcome);
                let cards = self
                    .deck
                    .peek(SEE_THE_FUTURE)
                    .into_iter()
                    .map(|c| c.kind.name().to_string())
                    .collect();
                outcome.push(Effect::Revealed { player, cards });
                outcome
            }
            Plan::Nope { card } => {
                let mut outcome = Outcome::new(format!("{name} nopes the attack"));
                self.discard_from_hand(player, card, &mut outcome);
                let me = &mut self.players[player];
                me.owed = 1;
                me.under_attack = false;
                outcome.push(Effect::TurnsOwed { player, turns: 1 });
                outcome
            }
            Plan::Pair {
                first,
                second,
                target,
            } => {
                let mut outcome = Outcome::new(format!("{name} plays a pair against {target}"));
                // Remove the higher index first so the lower stays valid.
                let (hi, lo) = if first > second { (first, second) } else { (second, first) };
                self.discard_from_hand(player, hi, &mut outcome);
                self.discard_from_hand(player, lo, &mut outcome);
                self.steal_random(player, target, &mut outcome);
                outcome
            }
            Plan::Draw => self.draw(player, name),
        }
    }

    fn consume_turn(&mut self, player: PlayerId, outcome: &mut Outcome) {
        let me = &mut self.players[player];
        me.owed = me.owed.saturating_sub(1);
        outcome.push(Effect::TurnsOwed {
            player,
            turns: me.owed,
        });
    }

    fn draw(&mut self, player: PlayerId, name: String) -> Outcome {
        let Some(card) = self.deck.draw() else {
            return Outcome::new(format!("{name} finds the deck empty"));
        };
        let mut outcome = Outcome::new(format!("{name} draws"));
        self.consume_turn(player, &mut outcome);

        if !card.is_kitten() {
            outcome.push(Effect::CardGained {
                player,
                card: card.id.clone(),
            });
            self.players[player].hand.push(card);
            return outcome;
        }

        let defuse = self.players[player].hand.iter().position(KittenCard::is_defuse);
        if let Some(idx) = defuse {
            self.discard_from_hand(player, idx, &mut outcome);
            let index = self.deck.insert_random(card, &mut self.rng);
            outcome.summary = format!("{name} defuses an exploding kitten");
            outcome.push(Effect::HazardReinserted { index });
            debug!(player = %player, index, "kitten defused");
        } else {
            let me = &mut self.players[player];
            me.owed = 0;
            me.under_attack = false;
            self.seats[player.index()].alive = false;
            self.eliminated_pool.push(card);
            self.exploded.push(name.clone());
            outcome.summary = format!("{name} exploded");
            outcome.push(Effect::Eliminated { player });
            info!(player = %player, name = %name, "player exploded");
            if let Some(result) = self.is_terminal() {
                info!(?result, "game over");
            }
        }
        outcome
    }

    fn card_actions(&self, player: PlayerId) -> Vec<Action> {
        let me = &self.players[player];
        let mut seen = FxHashSet::default();
        let mut actions = Vec::new();
        let targets = self.targets(player);

        for card in &me.hand {
            if !seen.insert(card.kind) {
                continue;
            }
            let id = card.id.clone();
            let kittens = |a: KittensAction| ActionKind::Kittens(a);
            match card.kind {
                CardKind::Attack => actions.push(Action::new(
                    format!("play_{id}"),
                    "Play Attack - end turn without drawing, next player takes 2 turns",
                    kittens(KittensAction::Attack { card: id }),
                )),
                CardKind::Skip => actions.push(Action::new(
                    format!("play_{id}"),
                    "Play Skip - end one turn without drawing",
                    kittens(KittensAction::Skip { card: id }),
                )),
                CardKind::Shuffle => actions.push(Action::new(
                    format!("play_{id}"),
                    "Play Shuffle - shuffle the draw pile",
                    kittens(KittensAction::Shuffle { card: id }),
                )),
                CardKind::SeeTheFuture => actions.push(Action::new(
                    format!("play_{id}"),
                    "Play See the Future - see the top 3 cards",
                    kittens(KittensAction::SeeTheFuture { card: id }),
                )),
                CardKind::Nope if me.under_attack && me.owed > 1 => actions.push(Action::new(
                    format!("play_{id}"),
                    "Play Nope - cancel the extra turns from an attack",
                    kittens(KittensAction::Nope { card: id }),
                )),
                CardKind::Favor => {
                    for &target in &targets {
                        actions.push(Action::new(
                            format!("play_{id}_target_{}", target.0),
                            format!("Play Favor on {} - take a card from them", self.seats[target.index()].name),
                            kittens(KittensAction::Favor {
                                card: id.clone(),
                                target,
                            }),
                        ));
                    }
                }
                CardKind::Cat(cat) => {
                    let Some(mate) = self.mate(player, cat, &id) else {
                        continue;
                    };
                    for &target in &targets {
                        actions.push(Action::new(
                            format!("play_pair_{id}_{mate}_target_{}", target.0),
                            format!(
                                "Play pair of {} on {} - steal a random card",
                                card.kind.name(),
                                self.seats[target.index()].name
                            ),
                            kittens(KittensAction::PlayPair {
                                first: id.clone(),
                                second: mate.clone(),
                                target,
                            }),
                        ));
                    }
                }
                CardKind::Nope | CardKind::Defuse | CardKind::ExplodingKitten => {}
            }
        }
        actions
    }

    /// Another card of the same cat kind.
    fn mate(&self, player: PlayerId, cat: CatKind, id: &str) -> Option<String> {
        self.players[player]
            .hand
            .iter()
            .find(|c| c.kind == CardKind::Cat(cat) && c.id != id)
            .map(|c| c.id.clone())
    }
}

impl RulesEngine for ExplodingKittens {
    fn kind(&self) -> GameKind {
        GameKind::ExplodingKittens
    }

    fn setup(&mut self, players: &[PlayerConfig]) -> Result<GameState, ConfigError> {
        if self.is_set_up() {
            return Err(ConfigError::AlreadySetUp);
        }
        let count = GameKind::ExplodingKittens.player_count();
        require_players(GameKind::ExplodingKittens.id(), count, players)?;

        let mut main = cards::main_deck();
        self.rng.shuffle(&mut main);
        let mut main = Deck::from_cards(main);
        let mut defuses = cards::defuses(count);

        let mut hands = Vec::with_capacity(count);
        for _ in players {
            let mut hand = main.draw_many(self.hand_size);
            hand.extend(defuses.pop());
            hands.push(KittensPlayer {
                hand,
                owed: 0,
                under_attack: false,
            });
        }

        for card in defuses {
            main.put(card, DeckPosition::Top);
        }
        main.shuffle(&mut self.rng);
        for card in cards::kittens(count) {
            main.put(card, DeckPosition::Top);
        }
        main.shuffle(&mut self.rng);

        hands[0].owed = 1;
        self.seats = players
            .iter()
            .enumerate()
            .map(|(i, p)| Seat::new(PlayerId::new(i as u8), p.name.clone()))
            .collect();
        self.players = PlayerMap::from_vec(hands);
        self.deck = main;
        self.current = 0;
        self.turn = 1;
        self.round = 1;

        info!(players = count, deck = self.deck.len(), "exploding kittens set up");
        Ok(self.state())
    }

    fn state(&self) -> GameState {
        let result = self.is_terminal();
        let discard: Vec<KittenCard> = self.discard.iter().cloned().collect();
        let shown = discard.len().saturating_sub(DISCARD_SHOWN);
        GameState {
            game: GameKind::ExplodingKittens,
            turn: self.turn,
            round: self.round,
            phase: "play".into(),
            current_player: self.current_player(),
            game_over: result.is_some(),
            winners: result.map(|r| r.winners()).unwrap_or_default(),
            seats: self.seats.clone(),
            decks: vec![
                DeckCount::new("draw", self.deck.len()),
                DeckCount::new("discard", self.discard.len()),
            ],
            detail: GameDetail::Kittens(KittensView {
                players: self.players.values().cloned().collect(),
                deck_size: self.deck.len(),
                discard_size: discard.len(),
                discard_top: discard[shown..].to_vec(),
                eliminated_pool: self.eliminated_pool.clone(),
                exploded: self.exploded.clone(),
            }),
        }
    }

    fn legal_actions(&self, player: PlayerId) -> Vec<Action> {
        if !self.can_act(player) {
            return Vec::new();
        }
        let mut actions = self.card_actions(player);
        if !self.deck.is_empty() {
            actions.push(Action::new(
                "draw_card",
                "Draw a card from the deck",
                ActionKind::Kittens(KittensAction::Draw),
            ));
        }
        actions
    }

    fn execute(&mut self, player: PlayerId, action: &Action) -> Result<Outcome, ActionError> {
        self.check_actor(player)?;
        let ActionKind::Kittens(kind) = &action.kind else {
            return Err(ActionError::WrongGame);
        };
        check_cost(action, None)?;
        let plan = match self.plan(player, kind) {
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
        let cur = PlayerId::new(self.current as u8);
        self.turn += 1;
        if self.seats[self.current].alive && self.players[cur].owed > 0 {
            debug!(player = %cur, owed = self.players[cur].owed, "same player continues");
            return;
        }

        self.players[cur].under_attack = false;
        let Some(next) = next_alive(&self.seats, self.current) else {
            return;
        };
        if next <= self.current {
            self.round += 1;
        }
        self.current = next;
        let player = &mut self.players[PlayerId::new(next as u8)];
        player.owed = player.owed.max(1);
        debug!(player = next, owed = player.owed, "turn advanced");
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
        match self.alive_count() {
            0 => Some(GameResult::Draw),
            1 => self
                .seats
                .iter()
                .find(|s| s.alive)
                .map(|s| GameResult::Winner(s.id)),
            _ => None,
        }
    }

    fn turn_complete(&self, player: PlayerId) -> bool {
        self.players.get(player).is_some_and(|p| p.owed == 0)
    }
}
