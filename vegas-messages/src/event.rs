//! Server --> Client messages, rendered from the core's events.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vegas_core::dice::{Die, DieKind};
use vegas_core::log::{CasinoView, PayoutView, TableView};
use vegas_core::player::PlayerView;
use vegas_core::{Currency, Event, GameError, PlayerId, Round, Seat};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWire {
    pub id: PlayerId,
    pub name: String,
    pub avatar: Option<String>,
    pub color: Option<String>,
    /// Seat number, 1 or 2
    pub index: Seat,
    pub money: Currency,
    pub dice_color_left: u8,
    pub dice_neutral_left: u8,
}

impl From<&PlayerView> for PlayerWire {
    fn from(v: &PlayerView) -> Self {
        Self {
            id: v.id,
            name: v.name.clone(),
            avatar: v.avatar.clone(),
            color: v.color.clone(),
            index: v.seat,
            money: v.money,
            dice_color_left: v.dice_color_left,
            dice_neutral_left: v.dice_neutral_left,
        }
    }
}

fn players(views: &[PlayerView]) -> Vec<PlayerWire> {
    views.iter().map(PlayerWire::from).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieWire {
    pub value: u8,
    #[serde(rename = "type")]
    pub kind: DieKind,
}

impl From<&Die> for DieWire {
    fn from(d: &Die) -> Self {
        Self {
            value: d.face.value(),
            kind: d.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasinoNotes {
    pub index: u8,
    pub banknotes: Vec<Currency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CasinoDice {
    pub index: u8,
    pub banknotes: Vec<Currency>,
    pub dice_by_player: BTreeMap<PlayerId, u8>,
    pub neutral_count: u8,
}

impl From<&CasinoView> for CasinoDice {
    fn from(c: &CasinoView) -> Self {
        Self {
            index: c.face.value(),
            banknotes: c.notes.clone(),
            dice_by_player: c.dice_by_player.clone(),
            neutral_count: c.neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutWire {
    pub casino_index: u8,
    /// Absent when the neutral dice took the note
    pub player_id: Option<PlayerId>,
    pub player_name: String,
    pub amount: Currency,
}

impl From<&PayoutView> for PayoutWire {
    fn from(p: &PayoutView) -> Self {
        Self {
            casino_index: p.face.value(),
            player_id: p.player_id,
            player_name: p.name.clone(),
            amount: p.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateWire {
    pub round: Round,
    pub casinos: Vec<CasinoDice>,
    pub players: Vec<PlayerWire>,
    pub current_turn_id: Option<PlayerId>,
}

impl From<&TableView> for GameStateWire {
    fn from(t: &TableView) -> Self {
        Self {
            round: t.round,
            casinos: t.casinos.iter().map(CasinoDice::from).collect(),
            players: players(&t.players),
            current_turn_id: t.current_turn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    #[serde(rename_all = "camelCase")]
    AwaitProfile { seat: Seat, suggested_name: String },
    PlayerInfo { player: PlayerWire },
    PlayerList { players: Vec<PlayerWire> },
    #[serde(rename_all = "camelCase")]
    ReadyToStart { host_id: PlayerId },
    GameStarted { round: Round },
    RoundSetup { round: Round, casinos: Vec<CasinoNotes> },
    #[serde(rename_all = "camelCase")]
    TurnChanged {
        current_player_id: PlayerId,
        current_player_name: String,
    },
    #[serde(rename_all = "camelCase")]
    DiceRolled {
        roller_id: PlayerId,
        roller_name: String,
        dice: Vec<DieWire>,
    },
    #[serde(rename_all = "camelCase")]
    BetPlaced {
        player_id: PlayerId,
        player_name: String,
        casino_index: u8,
        color_count: u8,
        neutral_count: u8,
    },
    Payouts { payouts: Vec<PayoutWire> },
    #[serde(rename_all = "camelCase")]
    GameOver {
        players: Vec<PlayerWire>,
        winner_id: Option<PlayerId>,
        winner_name: Option<String>,
    },
    GameState { state: GameStateWire },
    RoomFull,
    NotYourTurn,
    NoDiceLeft,
    RollRejected { reason: String },
    /// Any other refused action
    Error { code: String, message: String },
}

fn error_code(e: &GameError) -> &'static str {
    match e {
        GameError::RoomFull => "roomFull",
        GameError::PlayerAlreadySeated => "playerAlreadySeated",
        GameError::PlayerNotFound => "playerNotFound",
        GameError::NotEnoughPlayers => "notEnoughPlayers",
        GameError::NotHost => "notHost",
        GameError::GameAlreadyStarted => "gameAlreadyStarted",
        GameError::GameNotStarted => "gameNotStarted",
        GameError::NotYourTurn => "notYourTurn",
        GameError::RollAlreadyPending => "alreadyRolled",
        GameError::NoDiceLeft => "noDiceLeft",
        GameError::NoPendingRoll => "noPendingRoll",
        GameError::NoMatchingDice => "noMatchingDice",
        GameError::DeckError(_) => "deckError",
    }
}

impl From<&GameError> for ServerMsg {
    fn from(e: &GameError) -> Self {
        match e {
            GameError::RoomFull => Self::RoomFull,
            GameError::NotYourTurn => Self::NotYourTurn,
            GameError::NoDiceLeft => Self::NoDiceLeft,
            GameError::RollAlreadyPending => Self::RollRejected {
                reason: error_code(e).to_string(),
            },
            _ => Self::Error {
                code: error_code(e).to_string(),
                message: e.to_string(),
            },
        }
    }
}

impl From<&Event> for ServerMsg {
    fn from(event: &Event) -> Self {
        match event {
            Event::AwaitProfile {
                seat,
                suggested_name,
            } => Self::AwaitProfile {
                seat: *seat,
                suggested_name: suggested_name.clone(),
            },
            Event::PlayerInfo(v) => Self::PlayerInfo {
                player: PlayerWire::from(v),
            },
            Event::PlayerList(list) => Self::PlayerList {
                players: players(list),
            },
            Event::ReadyToStart { host_id } => Self::ReadyToStart { host_id: *host_id },
            Event::GameStarted { round } => Self::GameStarted { round: *round },
            Event::RoundSetup { round, casinos } => Self::RoundSetup {
                round: *round,
                casinos: casinos
                    .iter()
                    .map(|c| CasinoNotes {
                        index: c.face.value(),
                        banknotes: c.notes.clone(),
                    })
                    .collect(),
            },
            Event::TurnChanged { player_id, name } => Self::TurnChanged {
                current_player_id: *player_id,
                current_player_name: name.clone(),
            },
            Event::DiceRolled {
                player_id,
                name,
                dice,
            } => Self::DiceRolled {
                roller_id: *player_id,
                roller_name: name.clone(),
                dice: dice.iter().map(DieWire::from).collect(),
            },
            Event::BetPlaced {
                player_id,
                name,
                face,
                colored,
                neutral,
            } => Self::BetPlaced {
                player_id: *player_id,
                player_name: name.clone(),
                casino_index: face.value(),
                color_count: *colored,
                neutral_count: *neutral,
            },
            Event::Payouts(p) => Self::Payouts {
                payouts: p.iter().map(PayoutWire::from).collect(),
            },
            Event::GameOver {
                players: list,
                winner,
            } => Self::GameOver {
                players: players(list),
                winner_id: winner.as_ref().map(|(pid, _)| *pid),
                winner_name: winner.as_ref().map(|(_, name)| name.clone()),
            },
            Event::TableSnapshot(t) => Self::GameState {
                state: GameStateWire::from(t),
            },
            Event::Rejected(e) => Self::from(e),
        }
    }
}
