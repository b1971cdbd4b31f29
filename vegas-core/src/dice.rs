use enum_map::Enum;
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ALL_FACES: [Face; 6] = [
    Face::One,
    Face::Two,
    Face::Three,
    Face::Four,
    Face::Five,
    Face::Six,
];

/// The face of a die, which doubles as the index of the casino that accepts it.
#[derive(
    Hash, Enum, Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Face {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
}

impl Face {
    pub fn value(&self) -> u8 {
        use Face::*;
        match *self {
            One => 1,
            Two => 2,
            Three => 3,
            Four => 4,
            Five => 5,
            Six => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display(fmt = "{} is not a die face", _0)]
pub struct BadFace(pub u8);

impl std::error::Error for BadFace {}

impl TryFrom<u8> for Face {
    type Error = BadFace;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1..=6 => Ok(ALL_FACES[usize::from(v) - 1]),
            _ => Err(BadFace(v)),
        }
    }
}

impl From<Face> for u8 {
    fn from(f: Face) -> Self {
        f.value()
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Distribution<Face> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Face {
        ALL_FACES[rng.gen_range(0..ALL_FACES.len())]
    }
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DieKind {
    /// Owned by the player who rolled it
    Color,
    /// Owned by nobody. Whatever it wins is thrown away.
    Neutral,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Die {
    pub face: Face,
    pub kind: DieKind,
}

impl Die {
    pub const fn new(face: Face, kind: DieKind) -> Self {
        Self { face, kind }
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DieKind::Color => write!(f, "{}", self.face),
            DieKind::Neutral => write!(f, "{}n", self.face),
        }
    }
}

/// Roll `colored` colored dice followed by `neutral` neutral ones, each face uniform over 1..=6.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, colored: u8, neutral: u8) -> Vec<Die> {
    let colored = (0..colored).map(|_| DieKind::Color);
    let neutral = (0..neutral).map(|_| DieKind::Neutral);
    colored
        .chain(neutral)
        .map(|kind| Die::new(rng.gen(), kind))
        .collect()
}

/// How many of the given dice show `face`, as (colored, neutral)
pub fn count_matching(dice: &[Die], face: Face) -> (u8, u8) {
    dice.iter()
        .filter(|d| d.face == face)
        .fold((0, 0), |(c, n), d| match d.kind {
            DieKind::Color => (c + 1, n),
            DieKind::Neutral => (c, n + 1),
        })
}

#[cfg(test)]
pub(crate) fn dice_from_str(s: &'static str) -> Vec<Die> {
    // "33n5" => colored 3, neutral 3, colored 5
    let mut v: Vec<Die> = vec![];
    for ch in s.chars() {
        if ch == 'n' {
            let last = v.last_mut().expect("'n' must follow a face");
            last.kind = DieKind::Neutral;
        } else {
            let d = ch.to_digit(10).expect("faces are digits") as u8;
            v.push(Die::new(Face::try_from(d).unwrap(), DieKind::Color));
        }
    }
    v
}
