use std::fmt;

use serde::Serialize;

// Everything the engine announces while it runs. Subscribers decide where it
// goes, the engine itself only logs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    GameStarted { players: [String; 2] },
    FirstRollTied { roll: u8 },
    FirstPlayerChosen { player: String, rolls: [u8; 2] },
    Rolled { player: String, roll: u8 },
    TurnForfeited { player: String },
    TurnPassed { player: String, roll: u8 },
    TokenMoved { token: String, from: Option<usize>, to: usize },
    TokenCaptured { token: String, by: String, cell: usize },
    ExtraTurn { player: String },
    TokenExited { token: String, remaining: usize },
    TurnSwitched { player: String },
    GameWon { player: String },
    GameReset,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::GameStarted { players } => {
                write!(f, "New game: {} vs {}", players[0], players[1])
            }
            Event::FirstRollTied { roll } => write!(f, "Both rolled {}, rolling again", roll),
            Event::FirstPlayerChosen { player, rolls } => {
                write!(f, "Starting game with {} ({} against {})", player, rolls[0], rolls[1])
            }
            Event::Rolled { player, roll } => write!(f, "{} rolled a {}", player, roll),
            Event::TurnForfeited { player } => write!(f, "{} cannot move 0 spaces", player),
            Event::TurnPassed { player, roll } => {
                write!(f, "{} has no move for a {} and passes", player, roll)
            }
            Event::TokenMoved { token, from: Some(from), to } => {
                write!(f, "{} moved from {} to {}", token, from, to)
            }
            Event::TokenMoved { token, from: None, to } => {
                write!(f, "{} entered the board at {}", token, to)
            }
            Event::TokenCaptured { token, by, cell } => {
                write!(f, "{} captured {} on {}", by, token, cell)
            }
            Event::ExtraTurn { player } => write!(f, "{} landed on a rosette. Roll again!", player),
            Event::TokenExited { token, remaining } => {
                write!(f, "{} has exited the board, {} left", token, remaining)
            }
            Event::TurnSwitched { player } => write!(f, "{}'s turn!", player),
            Event::GameWon { player } => {
                write!(f, "{} has cleared all of their tokens! {} wins!", player, player)
            }
            Event::GameReset => write!(f, "Game reset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_kind_tag() {
        let event = Event::TokenMoved { token: "A1".to_string(), from: None, to: 4 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "token_moved");
        assert_eq!(json["to"], 4);
        assert!(json["from"].is_null());
    }

    #[test]
    fn test_display() {
        let event = Event::TokenMoved { token: "B2".to_string(), from: Some(5), to: 8 };
        assert_eq!(event.to_string(), "B2 moved from 5 to 8");
        assert_eq!(Event::GameReset.to_string(), "Game reset");
    }
}
