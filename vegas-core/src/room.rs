use crate::action::Action;
use crate::config::GameConfig;
use crate::deck::DeckSeed;
use crate::log::{Event, Outgoing, TableView};
use crate::state::GameState;
use crate::{PlayerId, SeqNum};
use parking_lot::Mutex;
use std::sync::Arc;

/// A table shared between connection handlers.
///
/// Actions from different players are applied one at a time, so every player sees the same order
/// of events. Cloning hands out another handle to the same table.
#[derive(Debug, Clone, Default)]
pub struct Room {
    inner: Arc<Mutex<GameState>>,
}

impl Room {
    pub fn new(config: GameConfig) -> Self {
        Self::from_state(GameState::new(config))
    }

    pub fn with_seed(config: GameConfig, seed: DeckSeed) -> Self {
        Self::from_state(GameState::with_seed(config, seed))
    }

    pub fn from_state(gs: GameState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(gs)),
        }
    }

    pub fn apply(&self, actor: PlayerId, action: Action) -> Vec<Outgoing> {
        self.inner.lock().apply(actor, action)
    }

    /// Run `f` against the table without letting any action in meanwhile
    pub fn with_state<T>(&self, f: impl FnOnce(&GameState) -> T) -> T {
        f(&self.inner.lock())
    }

    pub fn table_view(&self) -> TableView {
        self.with_state(GameState::table_view)
    }

    pub fn changes_since(&self, seq: SeqNum, viewer: PlayerId) -> Vec<(SeqNum, Event)> {
        self.with_state(|gs| gs.changes_since(seq, viewer).collect())
    }
}
