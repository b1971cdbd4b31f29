use crate::dice::Face;
use serde::{Deserialize, Serialize};

/// Everything a connected player can ask of the game. The acting player is passed alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Join,
    RegisterProfile {
        name: Option<String>,
        avatar: Option<String>,
        color: Option<String>,
    },
    StartGame,
    RollDice,
    ChooseBetValue(Face),
    Disconnect,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Join => write!(f, "Join"),
            Action::RegisterProfile { name, .. } => {
                write!(f, "RegisterProfile({})", name.as_deref().unwrap_or(""))
            }
            Action::StartGame => write!(f, "StartGame"),
            Action::RollDice => write!(f, "RollDice"),
            Action::ChooseBetValue(face) => write!(f, "ChooseBetValue({})", face),
            Action::Disconnect => write!(f, "Disconnect"),
        }
    }
}
