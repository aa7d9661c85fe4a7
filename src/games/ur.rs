// Royal Game of Ur. Geometry lives in `layout`, everything that changes
// during play is owned by `engine::GameEngine`.

pub mod board;
pub mod dice;
pub mod engine;
pub mod event;
pub mod layout;
pub mod player;
pub mod token;

pub use board::{Board, BoardError, Cell};
pub use dice::{BinaryDice, Dice, ScriptedDice, DICE_COUNT, MAX_ROLL};
pub use engine::{ErrorKind, GameEngine, MoveOutcome, MoveReport, Phase, TurnError};
pub use event::Event;
pub use layout::Layout;
pub use player::{Player, Seat, TOKENS_PER_PLAYER};
pub use token::{Token, TokenRef};
