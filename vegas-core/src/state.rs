use crate::action::Action;
use crate::casino::Casinos;
use crate::config::GameConfig;
use crate::deck::{Deck, DeckSeed};
use crate::dice::{self, Face};
use crate::log::{CasinoView, Event, Log, Outgoing, PayoutView, TableView};
use crate::player::{Player, Players};
use crate::settlement;
use crate::{Currency, GameError, PlayerId, Round, SeqNum, MAX_PLAYERS};
use rand::Rng;
use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// ChaCha stream the dice are rolled from
const DICE_STREAM: u64 = 1;
/// ChaCha stream the seeds of later matches are drawn from
const SEED_STREAM: u64 = 2;

/// Where a match is at
#[derive(Debug, PartialEq, Eq, Clone, Copy, derive_more::Display, Serialize, Deserialize)]
pub enum State {
    NotStarted,
    #[display(fmt = "InProgress(round {})", _0)]
    InProgress(Round),
    Finished,
}

impl Default for State {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// All the state of one table: who is seated, the casinos, the deck and whose turn it is.
///
/// Every change goes through [`GameState::apply`], which hands back the events to relay to the
/// players and records them in the table's log.
#[derive(Debug, Clone)]
pub struct GameState {
    /// The state this table is in. Only `change_state` writes it.
    __state_dont_change_directly: State,
    config: GameConfig,
    /// The (at most two) seated players and their ledgers
    pub players: Players,
    casinos: Casinos,
    /// Banknotes not yet dealt this match
    deck: Deck,
    current_turn: Option<PlayerId>,
    /// Seed for the next match, if one was chosen up front
    next_seed: Option<DeckSeed>,
    /// Seed of the current (or last) match
    match_seed: Option<DeckSeed>,
    seed_rng: ChaChaRng,
    dice_rng: ChaChaRng,
    /// Every event sent out so far, with sequence numbers
    logs: Log,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self::with_seed(config, DeckSeed::default())
    }

    /// A table whose first match deals from `seed`. Later matches draw their seeds from it too,
    /// so the whole life of the table is reproducible.
    pub fn with_seed(config: GameConfig, seed: DeckSeed) -> Self {
        Self {
            __state_dont_change_directly: State::NotStarted,
            config,
            players: Players::default(),
            casinos: Casinos::default(),
            deck: Deck::empty(),
            current_turn: None,
            next_seed: Some(seed),
            match_seed: None,
            seed_rng: seed.rng(SEED_STREAM),
            dice_rng: seed.rng(DICE_STREAM),
            logs: Log::default(),
        }
    }

    pub const fn state(&self) -> State {
        self.__state_dont_change_directly
    }

    /// The round being played, or 0 when no match is in progress
    pub const fn round(&self) -> Round {
        match self.state() {
            State::InProgress(r) => r,
            State::NotStarted | State::Finished => 0,
        }
    }

    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    pub const fn current_turn(&self) -> Option<PlayerId> {
        self.current_turn
    }

    pub const fn casinos(&self) -> &Casinos {
        &self.casinos
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub const fn match_seed(&self) -> Option<DeckSeed> {
        self.match_seed
    }

    pub fn last_seq_num(&self) -> SeqNum {
        self.logs.last_seq_num()
    }

    /// Events after `seq` that `viewer` is allowed to see, for catching up a late listener
    pub fn changes_since(
        &self,
        seq: SeqNum,
        viewer: PlayerId,
    ) -> impl Iterator<Item = (SeqNum, Event)> + '_ {
        self.logs
            .items_since(seq)
            .filter(move |(_, out)| out.to.includes(viewer))
            .map(|(seq, out)| (*seq, out.event.clone()))
    }

    pub fn table_view(&self) -> TableView {
        TableView {
            round: self.round(),
            casinos: self
                .casinos
                .iter()
                .map(|(face, c)| CasinoView {
                    face,
                    notes: c.notes().to_vec(),
                    dice_by_player: c.dice_by_player().clone(),
                    neutral: c.neutral(),
                })
                .collect(),
            players: self.players.view(),
            current_turn: self.current_turn,
        }
    }

    /// Perform `action` on behalf of `actor`.
    ///
    /// Returns the events to pass on. An action that isn't allowed changes nothing and produces a
    /// single `Rejected` event meant for the actor alone.
    pub fn apply(&mut self, actor: PlayerId, action: Action) -> Vec<Outgoing> {
        debug!(player_id = actor, %action, "applying action");
        let result = match action {
            Action::Join => self.join(actor),
            Action::RegisterProfile {
                name,
                avatar,
                color,
            } => self.register_profile(actor, name, avatar, color),
            Action::StartGame => self.start_game(actor),
            Action::RollDice => self.roll_dice(actor),
            Action::ChooseBetValue(face) => self.choose_bet_value(actor, face),
            Action::Disconnect => self.disconnect(actor),
        };
        match result {
            Ok(out) => {
                self.logs.extend(out.iter().cloned());
                out
            }
            Err(e) => {
                // nothing changed, so there is nothing for the log
                warn!(player_id = actor, error = %e, "action rejected");
                vec![Outgoing::only(actor, Event::Rejected(e))]
            }
        }
    }

    fn change_state(&mut self, new: State) {
        debug!(from = %self.__state_dont_change_directly, to = %new, "state change");
        // this is the only place the state should ever be changed directly
        self.__state_dont_change_directly = new;
    }

    fn in_progress(&self) -> Result<Round, GameError> {
        match self.state() {
            State::InProgress(r) => Ok(r),
            State::NotStarted | State::Finished => Err(GameError::GameNotStarted),
        }
    }

    /// The acting player, if it's their turn in a running match
    fn turn_holder(&self, player_id: PlayerId) -> Result<&Player, GameError> {
        self.in_progress()?;
        if self.current_turn != Some(player_id) {
            return Err(GameError::NotYourTurn);
        }
        self.players
            .player_by_id(player_id)
            .ok_or(GameError::PlayerNotFound)
    }

    fn player_list(&self) -> Outgoing {
        Outgoing::all(Event::PlayerList(self.players.view()))
    }

    fn snapshot(&self) -> Outgoing {
        Outgoing::all(Event::TableSnapshot(self.table_view()))
    }

    fn turn_changed(&self, player: &Player) -> Outgoing {
        Outgoing::all(Event::TurnChanged {
            player_id: player.id,
            name: player.display_name(),
        })
    }

    fn join(&mut self, player_id: PlayerId) -> Result<Vec<Outgoing>, GameError> {
        let seat = self.players.seat_player(player_id)?;
        info!(player_id, seat, "player joined");
        Ok(vec![
            Outgoing::only(
                player_id,
                Event::AwaitProfile {
                    seat,
                    suggested_name: Player::default_name(seat),
                },
            ),
            self.player_list(),
        ])
    }

    fn register_profile(
        &mut self,
        player_id: PlayerId,
        name: Option<String>,
        avatar: Option<String>,
        color: Option<String>,
    ) -> Result<Vec<Outgoing>, GameError> {
        let p = self
            .players
            .player_by_id_mut(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        p.set_profile(name, avatar, color);
        let info = p.view();
        let mut out = vec![
            Outgoing::only(player_id, Event::PlayerInfo(info)),
            self.player_list(),
        ];
        if self.players.count() == MAX_PLAYERS && self.in_progress().is_err() {
            if let Some(host) = self.players.host() {
                out.push(Outgoing::all(Event::ReadyToStart { host_id: host.id }));
            }
        }
        Ok(out)
    }

    fn start_game(&mut self, player_id: PlayerId) -> Result<Vec<Outgoing>, GameError> {
        if self.in_progress().is_ok() {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.player_by_id(player_id).is_none() {
            return Err(GameError::PlayerNotFound);
        }
        if self.players.count() < MAX_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }
        match self.players.host() {
            Some(host) if host.id == player_id => {}
            _ => return Err(GameError::NotHost),
        }

        let seed = match self.next_seed.take() {
            Some(seed) => seed,
            None => DeckSeed::new(self.seed_rng.gen()),
        };
        info!(seed = %seed, "starting match");
        self.logs.rotate();
        self.match_seed = Some(seed);
        self.deck = Deck::new(&seed);
        self.dice_rng = seed.rng(DICE_STREAM);
        self.players.reset_money();
        self.change_state(State::InProgress(1));

        let mut out = vec![Outgoing::all(Event::GameStarted { round: 1 })];
        out.append(&mut self.start_round(1));
        Ok(out)
    }

    /// Deal out dice and banknotes for the given round and hand the first turn to seat 1
    fn start_round(&mut self, round: Round) -> Vec<Outgoing> {
        self.players.start_round(&self.config);
        self.casinos = Casinos::seed(&mut self.deck, self.config.casino_threshold);
        info!(round, deck_left = self.deck.len(), "round set up");
        let mut out = vec![Outgoing::all(Event::round_setup(round, &self.casinos))];
        self.current_turn = self.players.players_iter().next().map(|p| p.id);
        if let Some(first) = self.players.players_iter().next() {
            out.push(self.turn_changed(first));
        }
        out.push(self.player_list());
        out.push(self.snapshot());
        out
    }

    fn roll_dice(&mut self, player_id: PlayerId) -> Result<Vec<Outgoing>, GameError> {
        let p = self.turn_holder(player_id)?;
        if p.pending_roll.is_some() {
            return Err(GameError::RollAlreadyPending);
        }
        if !p.has_dice() {
            return Err(GameError::NoDiceLeft);
        }
        let (colored, neutral) = (p.dice_color_left, p.dice_neutral_left);
        let name = p.display_name();
        let rolled = dice::roll(&mut self.dice_rng, colored, neutral);
        debug!(player_id, colored, neutral, "rolled");
        if let Some(p) = self.players.player_by_id_mut(player_id) {
            p.pending_roll = Some(rolled.clone());
        }
        Ok(vec![Outgoing::all(Event::DiceRolled {
            player_id,
            name,
            dice: rolled,
        })])
    }

    fn choose_bet_value(
        &mut self,
        player_id: PlayerId,
        face: Face,
    ) -> Result<Vec<Outgoing>, GameError> {
        let p = self.turn_holder(player_id)?;
        let pending = p.pending_roll.as_ref().ok_or(GameError::NoPendingRoll)?;
        let (colored, neutral) = dice::count_matching(pending, face);
        if colored == 0 && neutral == 0 {
            return Err(GameError::NoMatchingDice);
        }
        let name = p.display_name();

        self.casinos.commit(face, player_id, colored, neutral);
        let p = self
            .players
            .player_by_id_mut(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        p.spend_dice(colored, neutral);
        debug!(player_id, %face, colored, neutral, "bet placed");

        let mut out = vec![
            Outgoing::all(Event::BetPlaced {
                player_id,
                name,
                face,
                colored,
                neutral,
            }),
            self.player_list(),
            self.snapshot(),
        ];
        out.append(&mut self.advance_turn(player_id)?);
        Ok(out)
    }

    /// Pass the turn to the next player in seat order who still has dice, or end the round if
    /// nobody does.
    fn advance_turn(&mut self, after: PlayerId) -> Result<Vec<Outgoing>, GameError> {
        let (idx, _) = self
            .players
            .player_with_index_by_id(after)
            .ok_or(GameError::PlayerNotFound)?;
        let next = self
            .players
            .players_with_dice_iter_after(idx)
            .next()
            .map(|(_, p)| p.clone());
        match next {
            Some(p) => {
                self.current_turn = Some(p.id);
                debug!(player_id = p.id, "turn changed");
                Ok(vec![self.turn_changed(&p)])
            }
            None => self.end_round(),
        }
    }

    fn end_round(&mut self) -> Result<Vec<Outgoing>, GameError> {
        let round = self.in_progress()?;
        debug_assert!(!self.players.anyone_has_dice());
        let payouts = settlement::settle(&self.casinos.take());
        let winnings = settlement::winnings(&payouts);
        self.players.end_round(&winnings);
        let views = self.players.view();
        let paid: Currency = winnings.values().sum();
        let won: Currency = payouts.iter().map(|p| p.amount).sum();
        info!(round, paid, discarded = won - paid, "round settled");
        let mut out = vec![
            Outgoing::all(Event::Payouts(
                payouts.iter().map(|p| PayoutView::new(p, &views)).collect(),
            )),
            self.player_list(),
        ];
        if round >= self.config.max_rounds || self.deck.is_empty() {
            out.append(&mut self.finish());
        } else {
            let next = round + 1;
            self.change_state(State::InProgress(next));
            out.append(&mut self.start_round(next));
        }
        Ok(out)
    }

    fn finish(&mut self) -> Vec<Outgoing> {
        let winner = self
            .players
            .richest()
            .map(|p| (p.id, p.display_name()));
        match &winner {
            Some((pid, name)) => info!(player_id = pid, %name, "match won"),
            None => info!("match ended without a winner"),
        }
        let game_over = Outgoing::all(Event::GameOver {
            players: self.players.view(),
            winner,
        });
        self.change_state(State::Finished);
        self.clear_table();
        vec![game_over, self.snapshot()]
    }

    /// Forget the deck, casinos, dice and turn. Balances stay until a new match starts.
    fn clear_table(&mut self) {
        self.current_turn = None;
        self.casinos = Casinos::default();
        self.deck = Deck::empty();
        self.players.clear_dice();
    }

    fn disconnect(&mut self, player_id: PlayerId) -> Result<Vec<Outgoing>, GameError> {
        let gone = self.players.remove_player(player_id)?;
        info!(player_id, seat = gone.seat, "player left");
        if self.players.count() < MAX_PLAYERS && self.state() != State::NotStarted {
            if self.in_progress().is_ok() {
                warn!(player_id, "match abandoned");
            }
            self.change_state(State::NotStarted);
            self.clear_table();
        }
        Ok(vec![self.player_list(), self.snapshot()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::dice_from_str;
    use crate::log::Audience;

    const A: PlayerId = 11;
    const B: PlayerId = 22;
    const SEED: DeckSeed = DeckSeed::new([5; 32]);

    fn rejected(out: &[Outgoing]) -> Option<GameError> {
        match out {
            [Outgoing {
                to: Audience::Only(_),
                event: Event::Rejected(e),
            }] => Some(e.clone()),
            _ => None,
        }
    }

    fn seated() -> GameState {
        let mut gs = GameState::with_seed(GameConfig::default(), SEED);
        gs.apply(A, Action::Join);
        gs.apply(B, Action::Join);
        gs
    }

    fn started() -> GameState {
        let mut gs = seated();
        let out = gs.apply(A, Action::StartGame);
        assert_eq!(rejected(&out), None);
        gs
    }

    fn plant_roll(gs: &mut GameState, pid: PlayerId, dice: &'static str) {
        gs.players.player_by_id_mut(pid).unwrap().pending_roll = Some(dice_from_str(dice));
    }

    fn player(gs: &GameState, pid: PlayerId) -> &Player {
        gs.players.player_by_id(pid).unwrap()
    }

    /// Colored dice are only ever moved from a player's hand onto casinos
    fn assert_dice_conserved(gs: &GameState) {
        let c = gs.config();
        let mut neutral_left = 0;
        for p in gs.players.players_iter() {
            assert_eq!(
                gs.casinos().committed_by(p.id) + u16::from(p.dice_color_left),
                u16::from(c.colored_dice)
            );
            neutral_left += u16::from(p.dice_neutral_left);
        }
        assert_eq!(
            gs.casinos().neutral_committed() + neutral_left,
            u16::from(c.neutral_dice) * gs.players.count() as u16
        );
    }

    #[test]
    fn join_and_room_full() {
        let mut gs = seated();
        let out = gs.apply(33, Action::Join);
        assert_eq!(rejected(&out), Some(GameError::RoomFull));
        assert_eq!(out[0].to, Audience::Only(33));
        assert_eq!(gs.players.count(), 2);
    }

    #[test]
    fn join_prompts_for_profile() {
        let mut gs = GameState::default();
        let out = gs.apply(A, Action::Join);
        assert_eq!(
            out[0],
            Outgoing::only(
                A,
                Event::AwaitProfile {
                    seat: 1,
                    suggested_name: "Player 1".to_string()
                }
            )
        );
        assert!(matches!(out[1].event, Event::PlayerList(ref l) if l.len() == 1));
    }

    #[test]
    fn profile_then_ready() {
        let mut gs = GameState::default();
        gs.apply(A, Action::Join);
        let out = gs.apply(
            A,
            Action::RegisterProfile {
                name: Some("Ann".to_string()),
                avatar: None,
                color: Some("#ff0000".to_string()),
            },
        );
        assert!(matches!(&out[0].event, Event::PlayerInfo(v) if v.name == "Ann"));
        assert_eq!(out[0].to, Audience::Only(A));
        assert_eq!(out.len(), 2);
        gs.apply(B, Action::Join);
        let out = gs.apply(
            B,
            Action::RegisterProfile {
                name: None,
                avatar: None,
                color: None,
            },
        );
        assert_eq!(
            out.last().unwrap().event,
            Event::ReadyToStart { host_id: A }
        );
        assert_eq!(player(&gs, B).display_name(), "Player 2");
    }

    #[test]
    fn only_host_starts_with_two() {
        let mut gs = GameState::default();
        gs.apply(A, Action::Join);
        let out = gs.apply(A, Action::StartGame);
        assert_eq!(rejected(&out), Some(GameError::NotEnoughPlayers));
        gs.apply(B, Action::Join);
        let out = gs.apply(B, Action::StartGame);
        assert_eq!(rejected(&out), Some(GameError::NotHost));
        let out = gs.apply(99, Action::StartGame);
        assert_eq!(rejected(&out), Some(GameError::PlayerNotFound));
        assert_eq!(gs.state(), State::NotStarted);
        let out = gs.apply(A, Action::StartGame);
        assert_eq!(rejected(&out), None);
        let out = gs.apply(A, Action::StartGame);
        assert_eq!(rejected(&out), Some(GameError::GameAlreadyStarted));
    }

    #[test]
    fn start_sets_up_round_one() {
        let mut gs = seated();
        let out = gs.apply(A, Action::StartGame);
        assert_eq!(gs.state(), State::InProgress(1));
        assert_eq!(gs.round(), 1);
        assert_eq!(gs.current_turn(), Some(A));
        assert_eq!(out[0].event, Event::GameStarted { round: 1 });
        assert!(matches!(&out[1].event, Event::RoundSetup { round: 1, casinos } if casinos.len() == 6));
        assert_eq!(
            out[2].event,
            Event::TurnChanged {
                player_id: A,
                name: "Player 1".to_string()
            }
        );
        for p in gs.players.players_iter() {
            assert_eq!(p.dice_color_left, 8);
            assert_eq!(p.dice_neutral_left, 4);
        }
        assert!(gs.deck_len() < crate::deck::DECK_LEN);
        assert_eq!(gs.match_seed(), Some(SEED));
        assert_dice_conserved(&gs);
    }

    #[test]
    fn roll_rules() {
        let mut gs = seated();
        let out = gs.apply(A, Action::RollDice);
        assert_eq!(rejected(&out), Some(GameError::GameNotStarted));
        gs.apply(A, Action::StartGame);
        let out = gs.apply(B, Action::RollDice);
        assert_eq!(rejected(&out), Some(GameError::NotYourTurn));
        let out = gs.apply(A, Action::RollDice);
        match &out[..] {
            [Outgoing {
                to: Audience::All,
                event: Event::DiceRolled {
                    player_id, dice, ..
                },
            }] => {
                assert_eq!(*player_id, A);
                assert_eq!(dice.len(), 12);
            }
            _ => panic!("expected a dice roll, got {:?}", out),
        }
        // counts don't move until the dice are committed
        assert_eq!(player(&gs, A).dice_left(), 12);
        let pending = player(&gs, A).pending_roll.clone();
        let out = gs.apply(A, Action::RollDice);
        assert_eq!(rejected(&out), Some(GameError::RollAlreadyPending));
        assert_eq!(player(&gs, A).pending_roll, pending);
    }

    #[test]
    fn roll_without_dice() {
        let mut gs = started();
        let p = gs.players.player_by_id_mut(A).unwrap();
        p.dice_color_left = 0;
        p.dice_neutral_left = 0;
        let out = gs.apply(A, Action::RollDice);
        assert_eq!(rejected(&out), Some(GameError::NoDiceLeft));
    }

    #[test]
    fn bet_rules() {
        let mut gs = started();
        let out = gs.apply(A, Action::ChooseBetValue(Face::One));
        assert_eq!(rejected(&out), Some(GameError::NoPendingRoll));
        plant_roll(&mut gs, A, "1112233n4n5n6n");
        let out = gs.apply(B, Action::ChooseBetValue(Face::One));
        assert_eq!(rejected(&out), Some(GameError::NotYourTurn));
        let p = player(&gs, A).clone();
        plant_roll(&mut gs, A, "11122334");
        let out = gs.apply(A, Action::ChooseBetValue(Face::Five));
        assert_eq!(rejected(&out), Some(GameError::NoMatchingDice));
        // the rejected bet left the roll in place so another face can be picked
        assert!(player(&gs, A).pending_roll.is_some());
        assert_eq!(player(&gs, A).dice_left(), p.dice_left());
        assert_eq!(gs.current_turn(), Some(A));
    }

    #[test]
    fn bet_commits_and_passes_turn() {
        let mut gs = started();
        plant_roll(&mut gs, A, "333331263n3n6n6n");
        let out = gs.apply(A, Action::ChooseBetValue(Face::Three));
        assert_eq!(
            out[0].event,
            Event::BetPlaced {
                player_id: A,
                name: "Player 1".to_string(),
                face: Face::Three,
                colored: 5,
                neutral: 2,
            }
        );
        assert_eq!(gs.casinos()[Face::Three].dice_of(A), 5);
        assert_eq!(gs.casinos()[Face::Three].neutral(), 2);
        let a = player(&gs, A);
        assert_eq!(a.dice_color_left, 3);
        assert_eq!(a.dice_neutral_left, 2);
        assert!(a.pending_roll.is_none());
        assert_eq!(gs.current_turn(), Some(B));
        assert!(matches!(out.last().unwrap().event, Event::TurnChanged { player_id: B, .. }));
        assert_dice_conserved(&gs);
    }

    #[test]
    fn out_of_dice_player_is_skipped() {
        let mut gs = started();
        // A spends everything at once
        plant_roll(&mut gs, A, "111111111n1n1n1n");
        gs.apply(A, Action::ChooseBetValue(Face::One));
        assert_eq!(gs.current_turn(), Some(B));
        plant_roll(&mut gs, B, "22n3333333333n3n3n");
        gs.apply(B, Action::ChooseBetValue(Face::Two));
        // A has nothing left so B goes again
        assert_eq!(gs.current_turn(), Some(B));
        assert_dice_conserved(&gs);
    }

    /// Each player dumps everything on a single casino. With one contender per casino, each takes
    /// that casino's biggest note.
    #[test]
    fn full_round_settles_and_reseeds() {
        let mut gs = started();
        let top = |gs: &GameState, face: Face| -> Currency {
            *gs.casinos()[face].notes().iter().max().unwrap()
        };
        let a_wins = top(&gs, Face::Three);
        let b_wins = top(&gs, Face::Five);
        let deck_before = gs.deck_len();

        plant_roll(&mut gs, A, "33333333");
        gs.players.player_by_id_mut(A).unwrap().dice_neutral_left = 0;
        gs.players.player_by_id_mut(B).unwrap().dice_neutral_left = 0;
        gs.apply(A, Action::ChooseBetValue(Face::Three));
        assert_eq!(gs.current_turn(), Some(B));
        plant_roll(&mut gs, B, "55555555");
        let out = gs.apply(B, Action::ChooseBetValue(Face::Five));

        let payouts = out
            .iter()
            .find_map(|o| match &o.event {
                Event::Payouts(p) => Some(p.clone()),
                _ => None,
            })
            .expect("round should have been settled");
        assert_eq!(payouts.len(), 2);
        assert_eq!(payouts[0].face, Face::Three);
        assert_eq!(payouts[0].player_id, Some(A));
        assert_eq!(payouts[0].amount, a_wins);
        assert_eq!(payouts[1].face, Face::Five);
        assert_eq!(payouts[1].player_id, Some(B));
        assert_eq!(payouts[1].amount, b_wins);
        assert_eq!(player(&gs, A).money, a_wins);
        assert_eq!(player(&gs, B).money, b_wins);

        // round two is underway with fresh dice and casinos
        assert_eq!(gs.state(), State::InProgress(2));
        assert_eq!(gs.current_turn(), Some(A));
        assert!(gs.deck_len() < deck_before);
        for p in gs.players.players_iter() {
            assert_eq!(p.dice_left(), 12);
        }
        assert!(gs
            .casinos()
            .iter()
            .all(|(_, c)| c.dice_by_player().is_empty() && c.neutral() == 0));
        assert!(out
            .iter()
            .any(|o| matches!(o.event, Event::RoundSetup { round: 2, .. })));
        assert_dice_conserved(&gs);
    }

    fn play_round_all_on(
        gs: &mut GameState,
        a: &'static str,
        fa: Face,
        b: &'static str,
        fb: Face,
    ) -> Vec<Outgoing> {
        gs.players.player_by_id_mut(A).unwrap().dice_neutral_left = 0;
        gs.players.player_by_id_mut(B).unwrap().dice_neutral_left = 0;
        plant_roll(gs, A, a);
        gs.apply(A, Action::ChooseBetValue(fa));
        plant_roll(gs, B, b);
        gs.apply(B, Action::ChooseBetValue(fb))
    }

    #[test]
    fn match_ends_after_last_round() {
        let config = GameConfig {
            max_rounds: 2,
            ..Default::default()
        };
        let mut gs = GameState::with_seed(config, SEED);
        gs.apply(A, Action::Join);
        gs.apply(B, Action::Join);
        gs.apply(A, Action::StartGame);
        play_round_all_on(&mut gs, "11111111", Face::One, "22222222", Face::Two);
        assert_eq!(gs.round(), 2);
        // tie on casino 4: nobody gets paid there
        let out = play_round_all_on(&mut gs, "44444444", Face::Four, "44444444", Face::Four);
        let over = out
            .iter()
            .find_map(|o| match &o.event {
                Event::GameOver { players, winner } => Some((players.clone(), winner.clone())),
                _ => None,
            })
            .expect("match should be over");
        assert_eq!(gs.state(), State::Finished);
        assert_eq!(gs.current_turn(), None);
        assert_eq!(gs.deck_len(), 0);
        assert!(gs.players.players_iter().all(|p| p.dice_left() == 0));
        let (a_money, b_money) = (player(&gs, A).money, player(&gs, B).money);
        assert_eq!(over.0.len(), 2);
        match over.1 {
            Some((pid, _)) => assert_eq!(pid, if a_money > b_money { A } else { B }),
            None => assert_eq!(a_money, b_money),
        }
        // moves are refused until a new match starts, which wipes the balances
        let out = gs.apply(A, Action::RollDice);
        assert_eq!(rejected(&out), Some(GameError::GameNotStarted));
        gs.apply(A, Action::StartGame);
        assert_eq!(gs.state(), State::InProgress(1));
        assert!(gs.players.players_iter().all(|p| p.money == 0));
        // the second match deals from a different seed
        assert_ne!(gs.match_seed(), Some(SEED));
    }

    #[test]
    fn tied_balances_mean_no_winner() {
        let config = GameConfig {
            max_rounds: 1,
            ..Default::default()
        };
        let mut gs = GameState::with_seed(config, SEED);
        gs.apply(A, Action::Join);
        gs.apply(B, Action::Join);
        gs.apply(A, Action::StartGame);
        let out = play_round_all_on(&mut gs, "66666666", Face::Six, "66666666", Face::Six);
        assert!(out.iter().any(|o| o.event
            == Event::GameOver {
                players: gs.players.view(),
                winner: None
            }));
        assert_eq!(player(&gs, A).money, 0);
    }

    #[test]
    fn empty_deck_ends_match_early() {
        let mut gs = started();
        gs.deck = Deck::empty();
        play_round_all_on(&mut gs, "11111111", Face::One, "22222222", Face::Two);
        assert_eq!(gs.state(), State::Finished);
    }

    #[test]
    fn settlement_happens_once() {
        let mut gs = started();
        let top = *gs.casinos()[Face::One].notes().iter().max().unwrap();
        play_round_all_on(&mut gs, "11111111", Face::One, "22222222", Face::Two);
        assert_eq!(player(&gs, A).money, top);
        // settling again would find the freshly seeded, untouched casinos
        let payouts = settlement::settle(&gs.casinos.take());
        assert!(payouts.is_empty());
        assert_eq!(player(&gs, A).money, top);
    }

    #[test]
    fn neutral_win_is_discarded() {
        let mut gs = started();
        gs.players.player_by_id_mut(B).unwrap().dice_neutral_left = 0;
        gs.casinos[Face::Two].notes = vec![20000, 30000];
        plant_roll(&mut gs, A, "222222222n2n2n2n");
        gs.apply(A, Action::ChooseBetValue(Face::Two));
        plant_roll(&mut gs, B, "33333333");
        let out = gs.apply(B, Action::ChooseBetValue(Face::Three));
        let payouts = out
            .iter()
            .find_map(|o| match &o.event {
                Event::Payouts(p) => Some(p.clone()),
                _ => None,
            })
            .unwrap();
        // A has 8 colored, neutral has 4 on casino 2: both unique, A ranks first
        let two: Vec<_> = payouts.iter().filter(|p| p.face == Face::Two).collect();
        assert_eq!(two.len(), 2);
        assert_eq!(two[0].player_id, Some(A));
        assert_eq!(two[0].amount, 30000);
        assert_eq!(two[1].player_id, None);
        assert_eq!(two[1].name, crate::log::NEUTRAL_NAME);
        assert_eq!(two[1].amount, 20000);
        // the neutral note goes to nobody
        assert_eq!(player(&gs, A).money, 30000);
    }

    #[test]
    fn disconnect_mid_match_resets() {
        let mut gs = started();
        plant_roll(&mut gs, A, "33333333");
        gs.apply(A, Action::ChooseBetValue(Face::Three));
        let out = gs.apply(B, Action::Disconnect);
        assert_eq!(gs.state(), State::NotStarted);
        assert_eq!(gs.current_turn(), None);
        assert_eq!(gs.deck_len(), 0);
        assert_eq!(gs.casinos(), &Casinos::default());
        assert_eq!(player(&gs, A).money, 0);
        assert_eq!(player(&gs, A).dice_left(), 0);
        assert!(!out.iter().any(|o| matches!(o.event, Event::Payouts(_))));
        // the free seat can be taken again
        let out = gs.apply(B, Action::Join);
        assert!(matches!(out[0].event, Event::AwaitProfile { seat: 2, .. }));
        let out = gs.apply(77, Action::Disconnect);
        assert_eq!(rejected(&out), Some(GameError::PlayerNotFound));
    }

    #[test]
    fn host_leaving_hands_over_seat_one() {
        let mut gs = seated();
        gs.apply(A, Action::Disconnect);
        gs.apply(33, Action::Join);
        assert_eq!(gs.players.host().unwrap().id, 33);
        let out = gs.apply(B, Action::StartGame);
        assert_eq!(rejected(&out), Some(GameError::NotHost));
        let out = gs.apply(33, Action::StartGame);
        assert_eq!(rejected(&out), None);
        assert_eq!(gs.current_turn(), Some(33));
    }

    #[test]
    fn changes_since_hides_private_events() {
        let mut gs = seated();
        gs.apply(A, Action::RollDice);
        let seen_by_a: Vec<Event> = gs.changes_since(0, A).map(|(_, e)| e).collect();
        let seen_by_b: Vec<Event> = gs.changes_since(0, B).map(|(_, e)| e).collect();
        assert!(seen_by_a
            .iter()
            .any(|e| matches!(e, Event::AwaitProfile { seat: 1, .. })));
        assert!(!seen_by_b
            .iter()
            .any(|e| matches!(e, Event::AwaitProfile { seat: 1, .. })));
        // the rejected roll went straight back to A and was never logged
        assert!(!seen_by_a.iter().any(|e| matches!(e, Event::Rejected(_))));
        let last = gs.last_seq_num();
        for _ in 0..100 {
            gs.apply(99, Action::RollDice);
        }
        assert_eq!(gs.last_seq_num(), last);
        assert_eq!(gs.changes_since(last, A).count(), 0);
    }

    #[test]
    fn same_seed_same_game() {
        let mut g1 = started();
        let mut g2 = started();
        for _ in 0..3 {
            let r1 = g1.apply(g1.current_turn().unwrap(), Action::RollDice);
            let r2 = g2.apply(g2.current_turn().unwrap(), Action::RollDice);
            assert_eq!(r1, r2);
            let pid = g1.current_turn().unwrap();
            let face = player(&g1, pid).pending_roll.as_ref().unwrap()[0].face;
            assert_eq!(
                g1.apply(pid, Action::ChooseBetValue(face)),
                g2.apply(pid, Action::ChooseBetValue(face))
            );
        }
        assert_eq!(g1.table_view(), g2.table_view());
    }
}
