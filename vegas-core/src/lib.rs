pub mod action;
pub mod casino;
pub mod config;
pub mod deck;
pub mod dice;
pub mod log;
pub mod player;
pub mod room;
pub mod settlement;
pub mod state;

pub use action::Action;
pub use config::GameConfig;
pub use log::{Audience, Event, Outgoing};
pub use room::Room;
pub use state::{GameState, State};

/// Two seats at the table, and no more.
pub const MAX_PLAYERS: usize = 2;
pub type PlayerId = i32;
pub type Currency = i32;
pub type SeqNum = usize;
/// 1-based seat number. Seat 1 is the host and starts every round.
pub type Seat = u8;
pub type Round = u8;

#[derive(Debug, PartialEq, Eq, Clone, derive_more::Display, derive_more::Error)]
pub enum GameError {
    RoomFull,
    PlayerAlreadySeated,
    PlayerNotFound,
    NotEnoughPlayers,
    NotHost,
    GameAlreadyStarted,
    GameNotStarted,
    NotYourTurn,
    RollAlreadyPending,
    NoDiceLeft,
    NoPendingRoll,
    NoMatchingDice,
    #[display(fmt = "{}", _0)]
    DeckError(deck::DeckError),
}

impl From<deck::DeckError> for GameError {
    fn from(d: deck::DeckError) -> Self {
        GameError::DeckError(d)
    }
}
