use crate::deck::Deck;
use crate::dice::Face;
use crate::{Currency, PlayerId};
use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One betting pool. Holds the notes dealt to it this round and every die committed to it.
///
/// The notes are fixed once the casino is seeded; dice only ever get added until the round is
/// settled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Casino {
    pub(crate) notes: Vec<Currency>,
    pub(crate) dice_by_player: BTreeMap<PlayerId, u8>,
    pub(crate) neutral: u8,
}

impl Casino {
    /// Draw notes from the deck until their sum reaches `threshold` or the deck is empty.
    fn seed(deck: &mut Deck, threshold: Currency) -> Self {
        let mut notes = vec![];
        let mut sum = 0;
        while sum < threshold {
            match deck.draw() {
                Ok(note) => {
                    sum += note;
                    notes.push(note);
                }
                Err(_) => break,
            }
        }
        Self {
            notes,
            ..Default::default()
        }
    }

    pub fn notes(&self) -> &[Currency] {
        &self.notes
    }

    pub fn dice_of(&self, player: PlayerId) -> u8 {
        self.dice_by_player.get(&player).copied().unwrap_or_default()
    }

    pub fn dice_by_player(&self) -> &BTreeMap<PlayerId, u8> {
        &self.dice_by_player
    }

    pub fn neutral(&self) -> u8 {
        self.neutral
    }

    pub fn value(&self) -> Currency {
        self.notes.iter().sum()
    }

    /// Counts saturate rather than wrap. A validated config never gets near the limit.
    fn commit(&mut self, player: PlayerId, colored: u8, neutral: u8) {
        if colored > 0 {
            let n = self.dice_by_player.entry(player).or_default();
            *n = n.saturating_add(colored);
        }
        self.neutral = self.neutral.saturating_add(neutral);
    }
}

/// The six casinos, indexed by the die face each one accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Casinos(EnumMap<Face, Casino>);

impl Casinos {
    /// Seed every casino for a new round, in face order, each one fully before the next. When the
    /// deck runs low it's the higher faces that go without.
    pub fn seed(deck: &mut Deck, threshold: Currency) -> Self {
        let mut c: EnumMap<Face, Casino> = Default::default();
        for (_, casino) in c.iter_mut() {
            *casino = Casino::seed(deck, threshold);
        }
        Self(c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Face, &Casino)> {
        self.0.iter()
    }

    pub(crate) fn commit(&mut self, face: Face, player: PlayerId, colored: u8, neutral: u8) {
        self.0[face].commit(player, colored, neutral)
    }

    /// Colored dice the given player has committed across all casinos
    pub fn committed_by(&self, player: PlayerId) -> u16 {
        self.0.values().map(|c| u16::from(c.dice_of(player))).sum()
    }

    pub fn neutral_committed(&self) -> u16 {
        self.0.values().map(|c| u16::from(c.neutral)).sum()
    }

    /// Empty every casino, handing back what they held. Whatever is taken can be settled exactly
    /// once.
    pub(crate) fn take(&mut self) -> Casinos {
        std::mem::take(self)
    }
}

impl std::ops::Index<Face> for Casinos {
    type Output = Casino;

    fn index(&self, face: Face) -> &Casino {
        &self.0[face]
    }
}

#[cfg(test)]
impl std::ops::IndexMut<Face> for Casinos {
    fn index_mut(&mut self, face: Face) -> &mut Casino {
        &mut self.0[face]
    }
}
