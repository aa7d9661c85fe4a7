use std::fmt;

use serde::{Deserialize, Serialize};

use super::token::Token;

pub const TOKENS_PER_PLAYER: usize = 7;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    pub const ALL: [Seat; 2] = [Seat::One, Seat::Two];

    pub fn index(self) -> usize {
        match self {
            Seat::One => 0,
            Seat::Two => 1,
        }
    }

    pub fn other(self) -> Seat {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }

    // Letter in front of every token id of this seat
    pub fn prefix(self) -> char {
        match self {
            Seat::One => 'A',
            Seat::Two => 'B',
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::One => write!(f, "P1"),
            Seat::Two => write!(f, "P2"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    name: String,
    seat: Seat,
    path: Vec<usize>,
    tokens: Vec<Token>,
    dice_roll: u8,
}

impl Player {
    pub fn new(name: String, seat: Seat, path: Vec<usize>) -> Self {
        Self {
            name,
            seat,
            path,
            tokens: Vec::new(),
            dice_roll: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn dice_roll(&self) -> u8 {
        self.dice_roll
    }

    pub(crate) fn set_dice_roll(&mut self, roll: u8) {
        self.dice_roll = roll;
    }

    // Fresh roster `{prefix}1`..`{prefix}7`, the old one is dropped
    pub fn initialize_tokens(&mut self, prefix: char) {
        self.tokens = (1..=TOKENS_PER_PLAYER)
            .map(|i| Token::new(self.seat, format!("{}{}", prefix, i)))
            .collect();
    }

    pub fn reset_tokens(&mut self) {
        for token in &mut self.tokens {
            token.reset();
        }
    }

    // Take every token off the board, exited ones stay exited
    pub(crate) fn lift_tokens(&mut self) {
        for token in self.tokens.iter_mut().filter(|t| t.is_on_board()) {
            token.vacate();
        }
    }

    // Tokens that have not exited yet, on the board or not. The win check
    // counts exactly this set.
    pub fn available_tokens(&self) -> Vec<&Token> {
        self.tokens.iter().filter(|t| !t.has_exited()).collect()
    }

    pub fn exited_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.has_exited()).count()
    }

    // Roster slot of an available token
    pub fn available_slot(&self, id: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t.id() == id && !t.has_exited())
    }

    pub fn token(&self, id: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id() == id)
    }

    pub(crate) fn token_at(&self, slot: usize) -> &Token {
        &self.tokens[slot]
    }

    pub(crate) fn token_at_mut(&mut self, slot: usize) -> &mut Token {
        &mut self.tokens[slot]
    }

    pub fn path_position(&self, cell: usize) -> Option<usize> {
        self.path.iter().position(|&c| c == cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new("Ann".to_string(), Seat::One, vec![1, 2, 3, 20])
    }

    #[test]
    fn test_initialize_tokens() {
        let mut p = player();
        p.initialize_tokens('A');
        let ids: Vec<&str> = p.tokens().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["A1", "A2", "A3", "A4", "A5", "A6", "A7"]);
        assert!(p.tokens().iter().all(|t| t.seat() == Seat::One));

        p.token_at_mut(0).exit();
        p.initialize_tokens('Z');
        assert_eq!(p.tokens().len(), TOKENS_PER_PLAYER);
        assert_eq!(p.tokens()[0].id(), "Z1");
        assert_eq!(p.exited_count(), 0);
    }

    #[test]
    fn test_available_tokens_skip_exited() {
        let mut p = player();
        p.initialize_tokens('A');
        p.token_at_mut(2).set_occupied_cell(Some(3));
        p.token_at_mut(4).exit();

        let available: Vec<&str> = p.available_tokens().iter().map(|t| t.id()).collect();
        assert_eq!(available, vec!["A1", "A2", "A3", "A4", "A6", "A7"]);
        assert_eq!(p.available_slot("A5"), None);
        assert_eq!(p.available_slot("A3"), Some(2));
        assert!(p.token("A5").unwrap().has_exited());
    }

    #[test]
    fn test_reset_tokens_keeps_roster() {
        let mut p = player();
        p.initialize_tokens('A');
        p.token_at_mut(0).exit();
        p.token_at_mut(1).set_occupied_cell(Some(2));

        p.reset_tokens();
        assert_eq!(p.available_tokens().len(), TOKENS_PER_PLAYER);
        assert!(p.tokens().iter().all(|t| !t.is_on_board()));
        assert_eq!(p.tokens()[0].id(), "A1");
    }

    #[test]
    fn test_path_position_and_seats() {
        let p = player();
        assert_eq!(p.path_position(3), Some(2));
        assert_eq!(p.path_position(9), None);
        assert_eq!(Seat::One.other(), Seat::Two);
        assert_eq!(Seat::Two.prefix(), 'B');
    }
}
