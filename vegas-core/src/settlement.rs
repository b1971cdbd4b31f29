//! Turning a fully played round of casinos into payouts.
//!
//! Each casino is settled on its own. Everybody with dice in it is a contender: each player with
//! colored dice there, plus the neutral dice as a single contender. Contenders whose die count is
//! shared with any other contender are knocked out. The rest are ranked by die count, most first,
//! and take the casino's notes largest first, one note each. Notes left over once the ranked
//! contenders run out are paid to nobody, as are notes won by the neutral dice.

use crate::casino::{Casino, Casinos};
use crate::dice::Face;
use crate::{Currency, PlayerId};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Contender {
    Player(PlayerId),
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub face: Face,
    pub to: Contender,
    pub amount: Currency,
}

/// Everyone with dice in the casino, and how many dice each has there
fn contenders(casino: &Casino) -> Vec<(Contender, u8)> {
    let mut v: Vec<(Contender, u8)> = casino
        .dice_by_player
        .iter()
        .filter(|(_, n)| **n > 0)
        .map(|(pid, n)| (Contender::Player(*pid), *n))
        .collect();
    if casino.neutral > 0 {
        v.push((Contender::Neutral, casino.neutral));
    }
    v
}

/// The contenders left after knocking out every tie, ranked most dice first
pub fn survivors(casino: &Casino) -> Vec<(Contender, u8)> {
    let all = contenders(casino);
    let tally = all.iter().map(|(_, n)| *n).counts();
    all.into_iter()
        .filter(|(_, n)| tally[n] == 1)
        .sorted_unstable_by(|a, b| b.1.cmp(&a.1))
        .collect()
}

/// Payouts for a single casino, largest note first
pub fn settle_casino(face: Face, casino: &Casino) -> Vec<Payout> {
    let ranked = survivors(casino);
    let notes = casino.notes.iter().copied().sorted_unstable_by(|a, b| b.cmp(a));
    ranked
        .into_iter()
        .zip(notes)
        .map(|((to, _), amount)| Payout { face, to, amount })
        .collect()
}

/// Payouts for every casino, in face order
pub fn settle(casinos: &Casinos) -> Vec<Payout> {
    casinos
        .iter()
        .flat_map(|(face, casino)| settle_casino(face, casino))
        .collect()
}

/// Sum up what each player is owed. Notes won by the neutral dice don't appear.
pub fn winnings(payouts: &[Payout]) -> HashMap<PlayerId, Currency> {
    let mut hm: HashMap<PlayerId, Currency> = HashMap::new();
    for p in payouts {
        if let Contender::Player(pid) = p.to {
            *hm.entry(pid).or_default() += p.amount;
        }
    }
    hm
}
