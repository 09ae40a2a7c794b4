//! Brass: Birmingham engine.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

use super::board::{self, Board, BrassCard, BuiltIndustry, Industry, Link};
use crate::core::config::require_players;
use crate::core::{
    Action, ActionError, ActionKind, ConfigError, Cost, Deck, DeckCount, DeckPosition, Effect,
    GameDetail, GameRng, GameState, Outcome, PlayerConfig, PlayerId, PlayerMap, Resource, Seat,
};
use crate::rules::{check_cost, GameKind, GameResult, RulesEngine};

const LOAN_AMOUNT: i64 = 30;
const LOAN_INCOME_PENALTY: i64 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Era {
    Canal,
    Rail,
}

impl Era {
    /// Price of one link in this era.
    #[must_use]
    pub const fn link_cost(self) -> i64 {
        match self {
            Era::Canal => 3,
            Era::Rail => 5,
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Era::Canal => "canal",
            Era::Rail => "rail",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BrassAction {
    /// Build the next tile of `industry` in `city`, spending `card`.
    Build {
        industry: Industry,
        city: String,
        card: BrassCard,
    },
    Link { from: String, to: String },
    Loan,
}

/// Remaining tiles of one industry, lowest level first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryTrack {
    pub industry: Industry,
    pub remaining: SmallVec<[u8; 8]>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrassPlayer {
    pub money: i64,
    pub income: i64,
    pub links: i64,
    pub hand: Vec<BrassCard>,
    pub tracks: Vec<IndustryTrack>,
}

impl BrassPlayer {
    fn new(money: i64, income: i64, links: i64) -> Self {
        Self {
            money,
            income,
            links,
            hand: Vec::new(),
            tracks: Industry::ALL
                .into_iter()
                .map(|industry| IndustryTrack {
                    industry,
                    remaining: industry.tiers(),
                })
                .collect(),
        }
    }

    /// Level of the next tile for `industry`, if any are left.
    #[must_use]
    pub fn next_level(&self, industry: Industry) -> Option<u8> {
        self.track(industry).and_then(|t| t.remaining.first().copied())
    }

    fn track(&self, industry: Industry) -> Option<&IndustryTrack> {
        self.tracks.iter().find(|t| t.industry == industry)
    }

    fn take_tile(&mut self, industry: Industry) -> Option<u8> {
        let track = self.tracks.iter_mut().find(|t| t.industry == industry)?;
        if track.remaining.is_empty() {
            None
        } else {
            Some(track.remaining.remove(0))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrassView {
    pub era: Era,
    /// Rounds completed in the current era.
    pub era_round: u32,
    pub rounds_per_era: u32,
    pub board: Board,
    pub players: Vec<BrassPlayer>,
}

/// Builder for creating a `BrassBirmingham` engine.
pub struct BrassBuilder {
    rounds_per_era: u32,
    starting_money: i64,
    starting_income: i64,
    starting_links: i64,
    hand_size: usize,
}

impl Default for BrassBuilder {
    fn default() -> Self {
        Self {
            rounds_per_era: 2,
            starting_money: 17,
            starting_income: 10,
            starting_links: 10,
            hand_size: 8,
        }
    }
}

impl BrassBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rounds_per_era(mut self, rounds: u32) -> Self {
        assert!(rounds > 0, "An era needs at least one round");
        self.rounds_per_era = rounds;
        self
    }

    pub fn starting_money(mut self, money: i64) -> Self {
        self.starting_money = money;
        self
    }

    pub fn hand_size(mut self, size: usize) -> Self {
        self.hand_size = size;
        self
    }

    pub fn build(self, seed: u64) -> BrassBirmingham {
        BrassBirmingham {
            rounds_per_era: self.rounds_per_era,
            starting_money: self.starting_money,
            starting_income: self.starting_income,
            starting_links: self.starting_links,
            hand_size: self.hand_size,
            rng: GameRng::new(seed),
            seats: Vec::new(),
            players: PlayerMap::default(),
            board: Board::new(),
            deck: Deck::new(),
            discard: Deck::new(),
            era: Era::Canal,
            era_round: 0,
            round: 0,
            turn: 0,
            current: 0,
            acted: false,
            finished: false,
        }
    }
}

enum Plan {
    Build {
        industry: Industry,
        city: String,
        level: u8,
        cost: i64,
        card: usize,
    },
    Link {
        edge: (usize, usize),
        cost: i64,
    },
    Loan,
    Pass,
}

impl Plan {
    fn cost(&self) -> Option<Cost> {
        match self {
            Plan::Build { cost, .. } | Plan::Link { cost, .. } => {
                Some(Cost::new(Resource::Money, *cost))
            }
            Plan::Loan | Plan::Pass => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BrassBirmingham {
    rounds_per_era: u32,
    starting_money: i64,
    starting_income: i64,
    starting_links: i64,
    hand_size: usize,
    rng: GameRng,
    seats: Vec<Seat>,
    players: PlayerMap<BrassPlayer>,
    board: Board,
    deck: Deck<BrassCard>,
    discard: Deck<BrassCard>,
    era: Era,
    era_round: u32,
    round: u32,
    turn: u32,
    current: usize,
    /// Current player has used their action.
    acted: bool,
    finished: bool,
}

impl BrassBirmingham {
    pub fn player(&self, player: PlayerId) -> Option<&BrassPlayer> {
        self.players.get(player)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn era(&self) -> Era {
        self.era
    }

    /// Total cards across deck, discard and hands.
    #[must_use]
    pub fn card_total(&self) -> usize {
        self.deck.len()
            + self.discard.len()
            + self.players.values().map(|p| p.hand.len()).sum::<usize>()
    }

    fn era_links(&self) -> &[Link] {
        match self.era {
            Era::Canal => &self.board.canals,
            Era::Rail => &self.board.rails,
        }
    }

    fn draw_card(&mut self) -> Option<BrassCard> {
        if self.deck.is_empty() {
            self.deck.refill_from(&mut self.discard, &mut self.rng);
        }
        self.deck.draw()
    }

    fn deal(&mut self, player: PlayerId) {
        while self.players[player].hand.len() < self.hand_size {
            let Some(card) = self.draw_card() else { break };
            self.players[player].hand.push(card);
        }
    }

    fn build_actions(&self, player: PlayerId, out: &mut Vec<Action>) {
        let me = &self.players[player];
        let mut seen = FxHashSet::default();
        for card in &me.hand {
            if !seen.insert(card) {
                continue;
            }
            for industry in Industry::ALL {
                let Some(level) = me.next_level(industry) else {
                    continue;
                };
                for city in &self.board.cities {
                    if !card.enables(industry, &city.name) {
                        continue;
                    }
                    let cost = industry.build_cost(level, &city.name);
                    if me.money < cost {
                        continue;
                    }
                    out.push(
                        Action::new(
                            format!("build_{industry}_{}_{}", city.name, card.slug()),
                            format!(
                                "Build level {level} {industry} in {} for £{cost}",
                                city.name
                            ),
                            ActionKind::Brass(BrassAction::Build {
                                industry,
                                city: city.name.clone(),
                                card: card.clone(),
                            }),
                        )
                        .with_cost(Cost::new(Resource::Money, cost)),
                    );
                }
            }
        }
    }

    fn link_actions(&self, player: PlayerId, out: &mut Vec<Action>) {
        let me = &self.players[player];
        let cost = self.era.link_cost();
        if me.links <= 0 || me.money < cost {
            return;
        }
        let taken = self.era_links();
        for &edge in &self.board.edges {
            if self.board.is_linked(taken, edge) {
                continue;
            }
            let from = &self.board.cities[edge.0].name;
            let to = &self.board.cities[edge.1].name;
            out.push(
                Action::new(
                    format!("link_{from}_{to}"),
                    format!("Build {} link from {from} to {to} for £{cost}", self.era.slug()),
                    ActionKind::Brass(BrassAction::Link {
                        from: from.clone(),
                        to: to.clone(),
                    }),
                )
                .with_cost(Cost::new(Resource::Money, cost)),
            );
        }
    }

    fn plan(&self, player: PlayerId, action: &Action) -> Result<Plan, ActionError> {
        let brass = match &action.kind {
            ActionKind::Pass => return Ok(Plan::Pass),
            ActionKind::Brass(a) => a,
            _ => return Err(ActionError::WrongGame),
        };
        let me = &self.players[player];

        match brass {
            BrassAction::Build {
                industry,
                city,
                card,
            } => {
                if self.board.city_index(city).is_none() {
                    return Err(ActionError::precondition(format!("no city named {city}")));
                }
                let card_idx = me
                    .hand
                    .iter()
                    .position(|c| c == card)
                    .ok_or_else(|| ActionError::precondition("card not in hand"))?;
                if !card.enables(*industry, city) {
                    return Err(ActionError::precondition(format!(
                        "card does not allow {industry} in {city}"
                    )));
                }
                let level = me
                    .next_level(*industry)
                    .ok_or_else(|| ActionError::precondition(format!("no {industry} tiles left")))?;
                let cost = industry.build_cost(level, city);
                ActionError::require(Resource::Money, cost, me.money)?;
                Ok(Plan::Build {
                    industry: *industry,
                    city: city.clone(),
                    level,
                    cost,
                    card: card_idx,
                })
            }
            BrassAction::Link { from, to } => {
                let edge = self
                    .board
                    .edge(from, to)
                    .ok_or_else(|| ActionError::precondition(format!("{from} and {to} are not connected")))?;
                if self.board.is_linked(self.era_links(), edge) {
                    return Err(ActionError::precondition("link already built this era"));
                }
                ActionError::require(Resource::Links, 1, me.links)?;
                let cost = self.era.link_cost();
                ActionError::require(Resource::Money, cost, me.money)?;
                Ok(Plan::Link { edge, cost })
            }
            BrassAction::Loan => Ok(Plan::Loan),
        }
    }

    fn apply(&mut self, player: PlayerId, plan: Plan) -> Outcome {
        let name = self.seats[player.index()].name.clone();
        match plan {
            Plan::Build {
                industry,
                city,
                level,
                cost,
                card,
            } => {
                let me = &mut self.players[player];
                me.money -= cost;
                me.take_tile(industry);
                let card = me.hand.remove(card);
                let mut outcome = Outcome::new(format!("{name} built level {level} {industry} in {city}"))
                    .with(Effect::Resource {
                        player,
                        resource: Resource::Money,
                        delta: -cost,
                    })
                    .with(Effect::CardDiscarded {
                        player,
                        card: card.slug(),
                    });
                self.discard.put(card, DeckPosition::Top);

                if let Some(c) = self.board.city_mut(&city) {
                    c.industries.push(BuiltIndustry {
                        owner: player,
                        industry,
                        level,
                        scored: false,
                    });
                    if industry == Industry::Brewery {
                        c.beer += i64::from(level);
                    }
                }
                outcome.push(Effect::Built {
                    player,
                    what: format!("{industry} {level}"),
                    location: city,
                });
                outcome
            }
            Plan::Link { edge, cost } => {
                let me = &mut self.players[player];
                me.money -= cost;
                me.links -= 1;
                let link = Link {
                    owner: player,
                    from: self.board.cities[edge.0].name.clone(),
                    to: self.board.cities[edge.1].name.clone(),
                };
                let outcome = Outcome::new(format!("{name} linked {} and {}", link.from, link.to))
                    .with(Effect::Resource {
                        player,
                        resource: Resource::Money,
                        delta: -cost,
                    })
                    .with(Effect::Resource {
                        player,
                        resource: Resource::Links,
                        delta: -1,
                    })
                    .with(Effect::Built {
                        player,
                        what: format!("{} link", self.era.slug()),
                        location: format!("{}-{}", link.from, link.to),
                    });
                match self.era {
                    Era::Canal => self.board.canals.push(link),
                    Era::Rail => self.board.rails.push(link),
                }
                outcome
            }
            Plan::Loan => {
                let me = &mut self.players[player];
                let penalty = LOAN_INCOME_PENALTY.min(me.income);
                me.money += LOAN_AMOUNT;
                me.income -= penalty;
                Outcome::new(format!("{name} took a £{LOAN_AMOUNT} loan"))
                    .with(Effect::Resource {
                        player,
                        resource: Resource::Money,
                        delta: LOAN_AMOUNT,
                    })
                    .with(Effect::Production {
                        player,
                        resource: Resource::Income,
                        delta: -penalty,
                    })
            }
            Plan::Pass => Outcome::new(format!("{name} passed")),
        }
    }

    fn end_round(&mut self) {
        for p in self.players.values_mut() {
            p.money += p.income;
        }
        self.round += 1;
        self.era_round += 1;
        debug!(round = self.round, era = self.era.slug(), "income collected");

        if self.era_round < self.rounds_per_era {
            return;
        }
        match self.era {
            Era::Canal => self.start_rail_era(),
            Era::Rail => self.final_scoring(),
        }
    }

    fn start_rail_era(&mut self) {
        for link in std::mem::take(&mut self.board.canals) {
            self.seats[link.owner.index()].score += 1;
        }
        for id in PlayerId::all(self.seats.len()) {
            for card in std::mem::take(&mut self.players[id].hand) {
                self.discard.put(card, DeckPosition::Top);
            }
        }
        for id in PlayerId::all(self.seats.len()) {
            self.deal(id);
        }
        self.era = Era::Rail;
        self.era_round = 0;
        info!(round = self.round, "rail era begins");
    }

    fn final_scoring(&mut self) {
        for link in &self.board.rails {
            self.seats[link.owner.index()].score += 1;
        }
        for city in &mut self.board.cities {
            for built in city.industries.iter_mut().filter(|b| !b.scored) {
                built.scored = true;
                self.seats[built.owner.index()].score += i64::from(built.level);
            }
        }
        for (id, p) in self.players.iter() {
            self.seats[id.index()].score += p.money / 10;
        }
        self.finished = true;
        info!(result = ?self.is_terminal(), "brass game over");
    }
}

impl RulesEngine for BrassBirmingham {
    fn kind(&self) -> GameKind {
        GameKind::BrassBirmingham
    }

    fn setup(&mut self, players: &[PlayerConfig]) -> Result<GameState, ConfigError> {
        if self.is_set_up() {
            return Err(ConfigError::AlreadySetUp);
        }
        let count = GameKind::BrassBirmingham.player_count();
        require_players(GameKind::BrassBirmingham.id(), count, players)?;

        let mut cards = board::full_deck();
        self.rng.shuffle(&mut cards);
        self.deck = Deck::from_cards(cards);

        self.seats = players
            .iter()
            .enumerate()
            .map(|(i, p)| Seat::new(PlayerId::new(i as u8), p.name.clone()))
            .collect();
        self.players = PlayerMap::new(count, |_| {
            BrassPlayer::new(self.starting_money, self.starting_income, self.starting_links)
        });
        for id in PlayerId::all(count) {
            self.deal(id);
        }
        self.turn = 1;
        self.round = 1;

        info!(players = count, deck = self.deck.len(), "brass set up");
        Ok(self.state())
    }

    fn state(&self) -> GameState {
        let result = self.is_terminal();
        GameState {
            game: GameKind::BrassBirmingham,
            turn: self.turn,
            round: self.round,
            phase: self.era.slug().to_string(),
            current_player: self.current_player(),
            game_over: result.is_some(),
            winners: result.map(|r| r.winners()).unwrap_or_default(),
            seats: self.seats.clone(),
            decks: vec![
                DeckCount::new("draw", self.deck.len()),
                DeckCount::new("discard", self.discard.len()),
            ],
            detail: GameDetail::Brass(BrassView {
                era: self.era,
                era_round: self.era_round,
                rounds_per_era: self.rounds_per_era,
                board: self.board.clone(),
                players: self.players.values().cloned().collect(),
            }),
        }
    }

    fn legal_actions(&self, player: PlayerId) -> Vec<Action> {
        if !self.can_act(player) {
            return Vec::new();
        }
        let mut actions = Vec::new();
        self.build_actions(player, &mut actions);
        self.link_actions(player, &mut actions);
        actions.push(Action::new(
            "take_loan",
            format!("Take £{LOAN_AMOUNT} loan (reduce income by {LOAN_INCOME_PENALTY})"),
            ActionKind::Brass(BrassAction::Loan),
        ));
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
        if !self.is_set_up() || self.finished {
            return;
        }
        self.turn += 1;
        self.acted = false;
        self.current = (self.current + 1) % self.seats.len();
        if self.current == 0 {
            self.end_round();
        }
    }

    fn current_player(&self) -> Option<PlayerId> {
        if !self.is_set_up() || self.finished {
            return None;
        }
        Some(PlayerId::new(self.current as u8))
    }

    fn seats(&self) -> &[Seat] {
        &self.seats
    }

    fn is_terminal(&self) -> Option<GameResult> {
        if !self.finished {
            return None;
        }
        let best = self.seats.iter().map(|s| s.score).max()?;
        Some(GameResult::from_leaders(
            self.seats
                .iter()
                .filter(|s| s.score == best)
                .map(|s| s.id)
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

    fn new_game(seed: u64) -> BrassBirmingham {
        let mut game = BrassBuilder::new().build(seed);
        game.setup(&PlayerConfig::numbered(4)).unwrap();
        game
    }

    fn play_round_of_passes(game: &mut BrassBirmingham) {
        for _ in 0..4 {
            let p = game.current_player().unwrap();
            game.execute(p, &Action::pass("Pass turn")).unwrap();
            game.advance_turn();
        }
    }

    #[test]
    fn test_starting_money_and_affordable_builds() {
        let game = new_game(42);
        for id in PlayerId::all(4) {
            let p = game.player(id).unwrap();
            assert_eq!(p.money, 17);
            assert_eq!(p.income, 10);
            assert_eq!(p.hand.len(), 8);
        }

        let p0 = PlayerId::new(0);
        let actions = game.legal_actions(p0);
        let builds: Vec<_> = actions
            .iter()
            .filter(|a| matches!(a.kind, ActionKind::Brass(BrassAction::Build { .. })))
            .collect();
        assert!(!builds.is_empty());
        for a in builds {
            assert!(a.cost.unwrap().amount <= 17, "{} costs too much", a.id);
        }
    }

    #[test]
    fn test_action_ids_unique() {
        let game = new_game(3);
        let actions = game.legal_actions(PlayerId::new(0));
        let ids: FxHashSet<_> = actions.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), actions.len());
    }

    #[test]
    fn test_build_consumes_card_and_tile() {
        let mut game = new_game(42);
        let p0 = PlayerId::new(0);
        let build = game
            .legal_actions(p0)
            .into_iter()
            .find(|a| matches!(a.kind, ActionKind::Brass(BrassAction::Build { .. })))
            .unwrap();
        let ActionKind::Brass(BrassAction::Build { industry, .. }) = build.kind.clone() else {
            unreachable!()
        };
        let tiles_before = game.player(p0).unwrap().track(industry).unwrap().remaining.len();
        let total = game.card_total();

        game.execute(p0, &build).unwrap();

        let p = game.player(p0).unwrap();
        assert_eq!(p.money, 17 - build.cost.unwrap().amount);
        assert_eq!(p.hand.len(), 7);
        assert_eq!(p.track(industry).unwrap().remaining.len(), tiles_before - 1);
        assert_eq!(game.discard.len(), 1);
        assert_eq!(game.card_total(), total);
        assert!(game.legal_actions(p0).is_empty());
    }

    #[test]
    fn test_brewery_adds_beer() {
        let mut game = new_game(42);
        let p0 = PlayerId::new(0);
        game.players[p0].hand.push(BrassCard::Industry(Industry::Brewery));
        let action = Action::new(
            "x",
            "",
            ActionKind::Brass(BrassAction::Build {
                industry: Industry::Brewery,
                city: "derby".into(),
                card: BrassCard::Industry(Industry::Brewery),
            }),
        )
        .with_cost(Cost::new(Resource::Money, 6));
        game.execute(p0, &action).unwrap();

        let derby = game.board.city_index("derby").unwrap();
        assert_eq!(game.board.cities[derby].beer, 1);
    }

    #[test]
    fn test_stale_cost_rejected() {
        let mut game = new_game(42);
        let p0 = PlayerId::new(0);
        game.players[p0].hand.push(BrassCard::Location("birmingham".into()));
        let action = Action::new(
            "x",
            "",
            ActionKind::Brass(BrassAction::Build {
                industry: Industry::Coal,
                city: "birmingham".into(),
                card: BrassCard::Location("birmingham".into()),
            }),
        )
        .with_cost(Cost::new(Resource::Money, 8));
        assert!(matches!(game.execute(p0, &action), Err(ActionError::Stale(_))));
        assert_eq!(game.player(p0).unwrap().money, 17);
    }

    #[test]
    fn test_unaffordable_build_rejected() {
        let mut game = new_game(42);
        let p0 = PlayerId::new(0);
        game.players[p0].money = 5;
        game.players[p0].hand.push(BrassCard::Industry(Industry::Cotton));
        let action = Action::new(
            "x",
            "",
            ActionKind::Brass(BrassAction::Build {
                industry: Industry::Cotton,
                city: "derby".into(),
                card: BrassCard::Industry(Industry::Cotton),
            }),
        )
        .with_cost(Cost::new(Resource::Money, 12));
        assert_eq!(
            game.execute(p0, &action),
            Err(ActionError::Insufficient {
                resource: Resource::Money,
                need: 12,
                have: 5
            })
        );
    }

    #[test]
    fn test_link_listed_once_and_not_twice() {
        let mut game = new_game(42);
        let p0 = PlayerId::new(0);
        let links: Vec<_> = game
            .legal_actions(p0)
            .into_iter()
            .filter(|a| matches!(a.kind, ActionKind::Brass(BrassAction::Link { .. })))
            .collect();
        assert_eq!(links.len(), game.board.edges.len());

        let first = links[0].clone();
        game.execute(p0, &first).unwrap();
        assert_eq!(game.player(p0).unwrap().money, 14);
        assert_eq!(game.player(p0).unwrap().links, 9);

        game.advance_turn();
        let p1 = PlayerId::new(1);
        assert!(!game.legal_actions(p1).iter().any(|a| a.id == first.id));
        assert!(matches!(
            game.execute(p1, &first),
            Err(ActionError::Precondition(_))
        ));
    }

    #[test]
    fn test_loan_floors_income() {
        let mut game = new_game(42);
        let p0 = PlayerId::new(0);
        game.players[p0].income = 2;
        let loan = Action::new("take_loan", "", ActionKind::Brass(BrassAction::Loan));
        game.execute(p0, &loan).unwrap();
        assert_eq!(game.player(p0).unwrap().money, 47);
        assert_eq!(game.player(p0).unwrap().income, 0);
    }

    #[test]
    fn test_out_of_turn() {
        let mut game = new_game(42);
        assert_eq!(
            game.execute(PlayerId::new(2), &Action::pass("")),
            Err(ActionError::OutOfTurn(PlayerId::new(2)))
        );
        assert!(game.legal_actions(PlayerId::new(2)).is_empty());
    }

    #[test]
    fn test_round_upkeep_collects_income() {
        let mut game = new_game(42);
        play_round_of_passes(&mut game);
        for id in PlayerId::all(4) {
            assert_eq!(game.player(id).unwrap().money, 27);
        }
        assert_eq!(game.state().round, 2);
    }

    #[test]
    fn test_canal_to_rail_transition() {
        let mut game = new_game(42);
        let p0 = PlayerId::new(0);
        let link = game
            .legal_actions(p0)
            .into_iter()
            .find(|a| matches!(a.kind, ActionKind::Brass(BrassAction::Link { .. })))
            .unwrap();
        game.execute(p0, &link).unwrap();
        game.advance_turn();
        for _ in 0..3 {
            let p = game.current_player().unwrap();
            game.execute(p, &Action::pass("")).unwrap();
            game.advance_turn();
        }
        let total = game.card_total();
        play_round_of_passes(&mut game);

        assert_eq!(game.era(), Era::Rail);
        assert!(game.board.canals.is_empty());
        assert_eq!(game.seats[0].score, 1);
        assert_eq!(game.card_total(), total);
        for id in PlayerId::all(4) {
            assert_eq!(game.player(id).unwrap().hand.len(), 8);
        }

        let rail = game
            .legal_actions(PlayerId::new(0))
            .into_iter()
            .find(|a| matches!(a.kind, ActionKind::Brass(BrassAction::Link { .. })))
            .unwrap();
        assert_eq!(rail.cost, Some(Cost::new(Resource::Money, 5)));
    }

    #[test]
    fn test_game_ends_after_rail_era() {
        let mut game = new_game(42);
        for _ in 0..4 {
            play_round_of_passes(&mut game);
        }
        assert!(game.is_terminal().is_some());
        assert_eq!(game.current_player(), None);
        let state = game.state();
        assert!(state.game_over);
        // 17 + 4 rounds of 10 income = 57 money, 5 points each
        assert!(state.seats.iter().all(|s| s.score == 5));
        assert_eq!(game.is_terminal(), Some(GameResult::Winners(PlayerId::all(4).collect())));
    }
}
