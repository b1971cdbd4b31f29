use crate::config::GameConfig;
use crate::dice::Die;
use crate::GameError;
use crate::{Currency, PlayerId, Seat, MAX_PLAYERS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Players {
    /// Index into this array is the seat number minus one
    pub(crate) players: [Option<Player>; MAX_PLAYERS],
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// None until the player registers a profile
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub color: Option<String>,
    pub seat: Seat,
    pub money: Currency,
    pub dice_color_left: u8,
    pub dice_neutral_left: u8,
    /// The latest roll, not yet committed to a casino
    pub pending_roll: Option<Vec<Die>>,
}

/// What everybody at the table gets to know about a player
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub avatar: Option<String>,
    pub color: Option<String>,
    pub seat: Seat,
    pub money: Currency,
    pub dice_color_left: u8,
    pub dice_neutral_left: u8,
}

impl Players {
    pub fn player_by_id(&self, id: PlayerId) -> Option<&Player> {
        self.players_iter().find(|x| x.id == id)
    }

    pub(crate) fn player_with_index_by_id(&self, id: PlayerId) -> Option<(usize, &Player)> {
        self.players_iter_with_index().find(|(_, x)| x.id == id)
    }

    pub(crate) fn player_by_id_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players_iter_mut().find(|x| x.id == id)
    }

    /// The player in seat 1, who may start the match and opens every round
    pub fn host(&self) -> Option<&Player> {
        self.players[0].as_ref()
    }

    /// Seat the player in the lowest free seat, returning the seat number
    pub(crate) fn seat_player(&mut self, id: PlayerId) -> Result<Seat, GameError> {
        if self.player_by_id(id).is_some() {
            return Err(GameError::PlayerAlreadySeated);
        }
        if let Some(seat_idx) = self.next_empty_seat() {
            let seat = seat_idx as Seat + 1;
            self.players[seat_idx] = Some(Player::new(id, seat));
            Ok(seat)
        } else {
            Err(GameError::RoomFull)
        }
    }

    pub(crate) fn remove_player(&mut self, id: PlayerId) -> Result<Player, GameError> {
        let (idx, _) = self
            .player_with_index_by_id(id)
            .ok_or(GameError::PlayerNotFound)?;
        self.players[idx].take().ok_or(GameError::PlayerNotFound)
    }

    fn next_empty_seat(&self) -> Option<usize> {
        self.players
            .iter()
            .enumerate()
            .find(|(_idx, p)| p.is_none())
            .map(|(i, _)| i)
    }

    pub fn players_iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter_map(|x| x.as_ref())
    }

    fn players_iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut().filter_map(|x| x.as_mut())
    }

    /// Iterate over all players, returning their index into the player array as well
    pub fn players_iter_with_index(&self) -> impl Iterator<Item = (usize, &Player)> {
        self.players
            .iter()
            .enumerate()
            .filter_map(|(i, x)| x.as_ref().map(|p| (i, p)))
    }

    pub fn count(&self) -> usize {
        self.players_iter().count()
    }

    /// Returns the players holding dice, in seat order, starting with the seat after the given
    /// seat index and wrapping around. The player at index `i` comes last, if they have dice.
    pub(crate) fn players_with_dice_iter_after(
        &self,
        i: usize,
    ) -> impl Iterator<Item = (usize, &Player)> {
        (1..=MAX_PLAYERS)
            .map(move |offset| (i + offset) % MAX_PLAYERS)
            .filter_map(move |idx| self.players[idx].as_ref().map(|p| (idx, p)))
            .filter(|(_, p)| p.has_dice())
    }

    pub(crate) fn anyone_has_dice(&self) -> bool {
        self.players_iter().any(Player::has_dice)
    }

    /// Hand everybody a full set of dice and forget any uncommitted roll
    pub(crate) fn start_round(&mut self, config: &GameConfig) {
        for p in self.players_iter_mut() {
            p.dice_color_left = config.colored_dice;
            p.dice_neutral_left = config.neutral_dice;
            p.pending_roll = None;
        }
    }

    /// Take away all dice, as when there is no match going
    pub(crate) fn clear_dice(&mut self) {
        for p in self.players_iter_mut() {
            p.dice_color_left = 0;
            p.dice_neutral_left = 0;
            p.pending_roll = None;
        }
    }

    pub(crate) fn reset_money(&mut self) {
        for p in self.players_iter_mut() {
            p.money = 0;
        }
    }

    pub(crate) fn end_round(&mut self, winnings: &HashMap<PlayerId, Currency>) {
        for (player_id, amount) in winnings.iter() {
            if let Some(player) = self.player_by_id_mut(*player_id) {
                player.money += *amount;
            }
        }
    }

    /// The single richest player, or None if the top balance is shared (or there's nobody)
    pub fn richest(&self) -> Option<&Player> {
        let top = self.players_iter().map(|p| p.money).max()?;
        let mut at_top = self.players_iter().filter(|p| p.money == top);
        match (at_top.next(), at_top.next()) {
            (Some(p), None) => Some(p),
            _ => None,
        }
    }

    pub fn view(&self) -> Vec<PlayerView> {
        self.players_iter().map(Player::view).collect()
    }
}

impl Player {
    pub(crate) fn new(id: PlayerId, seat: Seat) -> Self {
        Self {
            id,
            name: None,
            avatar: None,
            color: None,
            seat,
            money: 0,
            dice_color_left: 0,
            dice_neutral_left: 0,
            pending_roll: None,
        }
    }

    pub fn default_name(seat: Seat) -> String {
        format!("Player {}", seat)
    }

    /// The registered name, or the seat-based default if there isn't one
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| Self::default_name(self.seat))
    }

    pub fn dice_left(&self) -> u16 {
        u16::from(self.dice_color_left) + u16::from(self.dice_neutral_left)
    }

    pub fn has_dice(&self) -> bool {
        self.dice_left() > 0
    }

    pub(crate) fn set_profile(
        &mut self,
        name: Option<String>,
        avatar: Option<String>,
        color: Option<String>,
    ) {
        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        self.name = Some(name.unwrap_or_else(|| Self::default_name(self.seat)));
        self.avatar = avatar;
        self.color = color;
    }

    /// Move committed dice out of this player's hand. Counts never go below zero.
    pub(crate) fn spend_dice(&mut self, colored: u8, neutral: u8) {
        self.dice_color_left = self.dice_color_left.saturating_sub(colored);
        self.dice_neutral_left = self.dice_neutral_left.saturating_sub(neutral);
        self.pending_roll = None;
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.display_name(),
            avatar: self.avatar.clone(),
            color: self.color.clone(),
            seat: self.seat,
            money: self.money,
            dice_color_left: self.dice_color_left,
            dice_neutral_left: self.dice_neutral_left,
        }
    }
}
