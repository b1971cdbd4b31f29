use crate::casino::Casinos;
use crate::dice::{Die, Face};
use crate::player::PlayerView;
use crate::settlement::{Contender, Payout};
use crate::{Currency, GameError, PlayerId, Round, Seat, SeqNum};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NEUTRAL_NAME: &str = "Neutral";

/// Who gets to see an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    All,
    Only(PlayerId),
}

impl Audience {
    pub fn includes(&self, viewer: PlayerId) -> bool {
        match self {
            Audience::All => true,
            Audience::Only(pid) => *pid == viewer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasinoSetup {
    pub face: Face,
    pub notes: Vec<Currency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasinoView {
    pub face: Face,
    pub notes: Vec<Currency>,
    pub dice_by_player: BTreeMap<PlayerId, u8>,
    pub neutral: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutView {
    pub face: Face,
    /// None when the neutral dice won the note
    pub player_id: Option<PlayerId>,
    pub name: String,
    pub amount: Currency,
}

/// Everything public about the table at one moment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub round: Round,
    pub casinos: Vec<CasinoView>,
    pub players: Vec<PlayerView>,
    pub current_turn: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    AwaitProfile {
        seat: Seat,
        suggested_name: String,
    },
    PlayerInfo(PlayerView),
    PlayerList(Vec<PlayerView>),
    ReadyToStart {
        host_id: PlayerId,
    },
    GameStarted {
        round: Round,
    },
    RoundSetup {
        round: Round,
        casinos: Vec<CasinoSetup>,
    },
    TurnChanged {
        player_id: PlayerId,
        name: String,
    },
    DiceRolled {
        player_id: PlayerId,
        name: String,
        dice: Vec<Die>,
    },
    BetPlaced {
        player_id: PlayerId,
        name: String,
        face: Face,
        colored: u8,
        neutral: u8,
    },
    Payouts(Vec<PayoutView>),
    GameOver {
        players: Vec<PlayerView>,
        winner: Option<(PlayerId, String)>,
    },
    TableSnapshot(TableView),
    Rejected(GameError),
}

impl Event {
    pub(crate) fn round_setup(round: Round, casinos: &Casinos) -> Self {
        Event::RoundSetup {
            round,
            casinos: casinos
                .iter()
                .map(|(face, c)| CasinoSetup {
                    face,
                    notes: c.notes().to_vec(),
                })
                .collect(),
        }
    }
}

impl PayoutView {
    pub(crate) fn new(p: &Payout, players: &[PlayerView]) -> Self {
        match p.to {
            Contender::Player(pid) => Self {
                face: p.face,
                player_id: Some(pid),
                name: players
                    .iter()
                    .find(|v| v.id == pid)
                    .map(|v| v.name.clone())
                    .unwrap_or_else(|| pid.to_string()),
                amount: p.amount,
            },
            Contender::Neutral => Self {
                face: p.face,
                player_id: None,
                name: NEUTRAL_NAME.to_string(),
                amount: p.amount,
            },
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::AwaitProfile {
                seat,
                suggested_name,
            } => write!(f, "Seat {seat} taken, awaiting profile (suggested {suggested_name})"),
            Event::PlayerInfo(v) => write!(f, "You are {} in seat {}", v.name, v.seat),
            Event::PlayerList(list) => write!(
                f,
                "Players: {}",
                list.iter()
                    .map(|v| format!("{} ({})", v.name, v.money))
                    .join(", ")
            ),
            Event::ReadyToStart { host_id } => write!(f, "Ready to start; host is p{host_id}"),
            Event::GameStarted { round } => write!(f, "Game started at round {round}"),
            Event::RoundSetup { round, casinos } => write!(
                f,
                "Round {round}: {}",
                casinos
                    .iter()
                    .map(|c| format!("[{}] {}", c.face, c.notes.iter().join("/")))
                    .join(" ")
            ),
            Event::TurnChanged { name, .. } => write!(f, "{name} to roll"),
            Event::DiceRolled { name, dice, .. } => {
                write!(f, "{name} rolled {}", dice.iter().join(" "))
            }
            Event::BetPlaced {
                name,
                face,
                colored,
                neutral,
                ..
            } => write!(
                f,
                "{name} puts {colored} colored and {neutral} neutral dice on casino {face}"
            ),
            Event::Payouts(payouts) if payouts.is_empty() => write!(f, "No casino paid out"),
            Event::Payouts(payouts) => write!(
                f,
                "Payouts: {}",
                payouts
                    .iter()
                    .map(|p| format!("[{}] {} {}", p.face, p.name, p.amount))
                    .join(", ")
            ),
            Event::GameOver { winner, .. } => match winner {
                Some((_, name)) => write!(f, "Game over, {name} wins"),
                None => write!(f, "Game over, nobody wins"),
            },
            Event::TableSnapshot(t) => write!(
                f,
                "Round {} with {} players, turn: {}",
                t.round,
                t.players.len(),
                match t.current_turn {
                    Some(pid) => format!("p{pid}"),
                    None => "none".to_string(),
                }
            ),
            Event::Rejected(e) => write!(f, "Rejected: {e}"),
        }
    }
}

/// An event and who it's for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub to: Audience,
    pub event: Event,
}

impl Outgoing {
    pub fn all(event: Event) -> Self {
        Self {
            to: Audience::All,
            event,
        }
    }

    pub fn only(player: PlayerId, event: Event) -> Self {
        Self {
            to: Audience::Only(player),
            event,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub(crate) struct Log {
    active: Vec<(SeqNum, Outgoing)>,
    archive: Vec<(SeqNum, Outgoing)>,
    last_seq_num: SeqNum,
}

impl Log {
    pub(crate) fn extend<I: IntoIterator<Item = Outgoing>>(&mut self, iter: I) {
        let start = self.last_seq_num + 1;
        for (seq, item) in (start..).zip(iter) {
            self.active.push((seq, item));
            self.last_seq_num = seq;
        }
    }

    /// Archive this match's items, dropping whatever was archived before. Only the previous
    /// match stays reachable.
    pub(crate) fn rotate(&mut self) {
        self.archive = std::mem::take(&mut self.active);
    }

    pub(crate) fn last_seq_num(&self) -> SeqNum {
        self.last_seq_num
    }

    pub(crate) fn items_since(
        &self,
        oldest_seq: SeqNum,
    ) -> impl Iterator<Item = &(SeqNum, Outgoing)> + '_ {
        let iter1 = self
            .archive
            .iter()
            .skip_while(move |(seq, _item)| *seq <= oldest_seq);
        let iter2 = self
            .active
            .iter()
            .skip_while(move |(seq, _item)| *seq <= oldest_seq);
        iter1.chain(iter2)
    }
}
