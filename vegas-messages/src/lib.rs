//! JSON messages exchanged between a table and its clients.
//!
//! Inbound messages decode into core [`Action`]s. Outbound messages are rendered from the core's
//! [`Outgoing`] events, keeping each event's audience so a transport knows whether to broadcast
//! it or send it to one player.

use serde::Serialize;
use std::fmt;
use vegas_core::{Action, Audience, Outgoing};

pub mod action;
pub mod event;

pub use action::ClientMsg;
pub use event::ServerMsg;

#[derive(Debug)]
pub enum MsgError {
    Json(serde_json::Error),
    BadFace(i64),
    NameTooLong(usize),
    AvatarTooLong(usize),
    BadColor(String),
}

impl fmt::Display for MsgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "Malformed message: {}", e),
            Self::BadFace(v) => write!(f, "{} is not a die face", v),
            Self::NameTooLong(n) => write!(
                f,
                "Name is {} characters, at most {} allowed",
                n,
                action::MAX_NAME_LEN
            ),
            Self::AvatarTooLong(n) => write!(
                f,
                "Avatar is {} characters, at most {} allowed",
                n,
                action::MAX_AVATAR_LEN
            ),
            Self::BadColor(c) => write!(f, "{:?} is not a #rrggbb color", c),
        }
    }
}

impl std::error::Error for MsgError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MsgError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Parse and validate one message from a client
pub fn decode(s: &str) -> Result<Action, MsgError> {
    let msg: ClientMsg = serde_json::from_str(s)?;
    Action::try_from(msg)
}

/// A rendered server message and who should receive it
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub to: Audience,
    pub msg: ServerMsg,
}

impl From<&Outgoing> for Envelope {
    fn from(out: &Outgoing) -> Self {
        Self {
            to: out.to,
            msg: ServerMsg::from(&out.event),
        }
    }
}

pub fn encode(msg: &ServerMsg) -> Result<String, MsgError> {
    Ok(serde_json::to_string(msg)?)
}
