//! Client --> Server messages.
//!
//! Joining and leaving aren't messages: a transport turns a new connection into
//! [`Action::Join`] and a dropped one into [`Action::Disconnect`].

use crate::MsgError;
use serde::{Deserialize, Serialize};
use vegas_core::dice::Face;
use vegas_core::Action;

pub const MAX_NAME_LEN: usize = 24;
pub const MAX_AVATAR_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", deny_unknown_fields)]
pub enum ClientMsg {
    RegisterProfile {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        avatar: Option<String>,
        #[serde(default)]
        color: Option<String>,
    },
    StartGame,
    RollDice,
    /// Commit every die of the pending roll that shows this face
    ChooseBetValue { value: i64 },
}

/// Empty strings count as not given
fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

fn is_hex_color(c: &str) -> bool {
    match c.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|ch| ch.is_ascii_hexdigit()),
        None => false,
    }
}

impl TryFrom<ClientMsg> for Action {
    type Error = MsgError;

    fn try_from(msg: ClientMsg) -> Result<Self, Self::Error> {
        Ok(match msg {
            ClientMsg::RegisterProfile {
                name,
                avatar,
                color,
            } => {
                let name = non_empty(name).map(|n| n.trim().to_string());
                if let Some(n) = &name {
                    let len = n.chars().count();
                    if len > MAX_NAME_LEN {
                        return Err(MsgError::NameTooLong(len));
                    }
                }
                let avatar = non_empty(avatar);
                if let Some(a) = &avatar {
                    let len = a.chars().count();
                    if len > MAX_AVATAR_LEN {
                        return Err(MsgError::AvatarTooLong(len));
                    }
                }
                let color = non_empty(color);
                if let Some(c) = &color {
                    if !is_hex_color(c) {
                        return Err(MsgError::BadColor(c.clone()));
                    }
                }
                Action::RegisterProfile {
                    name,
                    avatar,
                    color,
                }
            }
            ClientMsg::StartGame => Action::StartGame,
            ClientMsg::RollDice => Action::RollDice,
            ClientMsg::ChooseBetValue { value } => {
                let face = u8::try_from(value)
                    .ok()
                    .and_then(|v| Face::try_from(v).ok())
                    .ok_or(MsgError::BadFace(value))?;
                Action::ChooseBetValue(face)
            }
        })
    }
}
