use crate::Currency;
use base64ct::{self, Base64, Encoding};
use rand::prelude::*;
use rand_chacha::ChaChaRng;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

pub const DENOMINATIONS: [Currency; 9] = [
    10000, 20000, 30000, 40000, 50000, 60000, 70000, 80000, 90000,
];
pub const NOTES_PER_DENOMINATION: usize = 6;
pub const DECK_LEN: usize = DENOMINATIONS.len() * NOTES_PER_DENOMINATION;
const SEED_LEN: usize = 32;
const ENCODED_SEED_LEN: usize = 4 * ((SEED_LEN + 3 - 1) / 3); // 4 * ceil(SEED_LEN / 3)
/// ChaCha stream used for shuffling the deck. Dice get their own streams so that rolling never
/// disturbs the note order and vice versa.
const DECK_STREAM: u64 = 0;

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum DeckError {
    EmptyDeck,
    DeckSeedDecodeError(base64ct::Error),
}

impl Error for DeckError {}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::EmptyDeck => write!(f, "No more banknotes in deck"),
            DeckError::DeckSeedDecodeError(e) => write!(f, "{}", e),
        }
    }
}

impl From<base64ct::Error> for DeckError {
    fn from(e: base64ct::Error) -> Self {
        Self::DeckSeedDecodeError(e)
    }
}

/// The banknotes not yet handed to a casino this match. Notes leave from the top (the end of the
/// Vec) and never come back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    notes: Vec<Currency>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(&DeckSeed::default())
    }
}

impl Deck {
    /// Generate the full set of banknotes, shuffled with the given seed
    pub fn new(seed: &DeckSeed) -> Self {
        let mut d = Self::unshuffled();
        d.seeded_shuffle(seed);
        d
    }

    /// A deck with no notes at all, as held by a table with no match in progress
    pub const fn empty() -> Self {
        Self { notes: Vec::new() }
    }

    fn unshuffled() -> Self {
        let notes: Vec<Currency> = DENOMINATIONS
            .iter()
            .flat_map(|d| std::iter::repeat(*d).take(NOTES_PER_DENOMINATION))
            .collect();
        assert_eq!(notes.len(), DECK_LEN);
        Self { notes }
    }

    pub fn seeded_shuffle(&mut self, seed: &DeckSeed) {
        let mut rng = seed.rng(DECK_STREAM);
        // For determinism given the same seed, the notes need to be in a known order before shuffling.
        self.notes.sort_unstable();
        self.notes.shuffle(&mut rng)
    }

    /// Take the topmost note, or return an error if there are none left.
    pub fn draw(&mut self) -> Result<Currency, DeckError> {
        self.notes.pop().ok_or(DeckError::EmptyDeck)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_notes(notes: Vec<Currency>) -> Self {
        Self { notes }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckSeed([u8; SEED_LEN]);

impl DeckSeed {
    pub const fn new(b: [u8; SEED_LEN]) -> Self {
        Self(b)
    }

    /// A ChaCha generator keyed by this seed, positioned on the given stream
    pub(crate) fn rng(&self, stream: u64) -> ChaChaRng {
        let mut rng = ChaChaRng::from_seed(self.0);
        rng.set_stream(stream);
        rng
    }
}

impl Default for DeckSeed {
    fn default() -> Self {
        let mut b = [0u8; SEED_LEN];
        thread_rng().fill_bytes(&mut b);
        Self(b)
    }
}

impl std::fmt::Display for DeckSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut b = [0u8; ENCODED_SEED_LEN];
        let s = Base64::encode(&self.0, &mut b).map_err(|_| fmt::Error)?;
        write!(f, "{}", s)
    }
}

impl FromStr for DeckSeed {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b: [u8; SEED_LEN] = [0; SEED_LEN];
        let decoded = Base64::decode(s, &mut b)?;
        if decoded.len() != SEED_LEN {
            return Err(DeckError::DeckSeedDecodeError(base64ct::Error::InvalidLength));
        }
        Ok(DeckSeed(b))
    }
}
