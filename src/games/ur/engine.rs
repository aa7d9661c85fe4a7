use std::fmt;

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;

use super::board::{Board, BoardError, Cell};
use super::dice::Dice;
use super::event::Event;
use super::layout::Layout;
use super::player::{Player, Seat, TOKENS_PER_PLAYER};
use super::token::{Token, TokenRef};
use crate::games::Validate;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Phase {
    NotStarted,
    AwaitingFirstPlayerSelection,
    AwaitingRoll,
    AwaitingMoveChoice,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Phase::NotStarted => "not started",
            Phase::AwaitingFirstPlayerSelection => "choosing first player",
            Phase::AwaitingRoll => "waiting for a roll",
            Phase::AwaitingMoveChoice => "waiting for a move",
            Phase::GameOver => "game over",
        };
        write!(f, "{}", text)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    IllegalCallOrder,
    IllegalMove,
}

// Every way a request can be turned down. None of them leave the engine in a
// different state than before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    #[error("Malformed token id {0:?}, expected a player letter followed by a roster number")]
    MalformedTokenId(String),
    #[error("{token} is not an available token of {player}")]
    UnknownToken { token: String, player: String },
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("No game in progress, start a game first")]
    NotStarted,
    #[error("The game is over, {winner} has won")]
    GameOver { winner: String },
    #[error("The first player has already been chosen")]
    FirstPlayerChosen,
    #[error("{player} already rolled a {roll}, move a token first")]
    AlreadyRolled { player: String, roll: u8 },
    #[error("{player} has not rolled yet")]
    NotRolled { player: String },
    #[error("{player} can still move with a {roll}, passing is not allowed")]
    MoveAvailable { player: String, roll: u8 },
    #[error("Moving {token} by {roll} exceeds the player's path")]
    ExceedsPath { token: String, roll: u8 },
    #[error("Cell {cell} is already taken by {occupant} of the same player")]
    BlockedByOwnToken { cell: usize, occupant: String },
    #[error("Cannot put a token on the rosette at {cell}, {occupant} is guarding it")]
    GuardedRosette { cell: usize, occupant: String },
}

impl TurnError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TurnError::MalformedTokenId(_)
            | TurnError::UnknownToken { .. }
            | TurnError::Board(_) => ErrorKind::InvalidArgument,
            TurnError::NotStarted
            | TurnError::GameOver { .. }
            | TurnError::FirstPlayerChosen
            | TurnError::AlreadyRolled { .. }
            | TurnError::NotRolled { .. }
            | TurnError::MoveAvailable { .. } => ErrorKind::IllegalCallOrder,
            TurnError::ExceedsPath { .. }
            | TurnError::BlockedByOwnToken { .. }
            | TurnError::GuardedRosette { .. } => ErrorKind::IllegalMove,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum MoveOutcome {
    Relocated,
    Captured { token: String },
    Exited,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MoveReport {
    pub token: String,
    pub from: Option<usize>,
    pub to: usize,
    pub outcome: MoveOutcome,
    pub extra_turn: bool,
    pub winner: Option<Seat>,
}

// A move that passed every check, nothing has been touched yet
#[derive(Clone, Copy, Debug)]
struct MovePlan {
    mover: TokenRef,
    from: Option<usize>,
    to: usize,
    capture: Option<TokenRef>,
}

type Listener = Box<dyn FnMut(&Event)>;

pub struct GameEngine<D> {
    layout: Layout,
    board: Board,
    players: [Player; 2],
    active: Option<Seat>,
    winner: Option<Seat>,
    phase: Phase,
    dice: D,
    listeners: Vec<Listener>,
}

fn warn_on_err<T>(result: Result<T, TurnError>) -> Result<T, TurnError> {
    if let Err(err) = &result {
        log::warn!("{}", err);
    }
    result
}

// A single letter followed by a 1-based roster index, like `A3`
fn is_token_id(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    matches!(chars.as_str().parse::<usize>(), Ok(n) if (1..=TOKENS_PER_PLAYER).contains(&n))
}

impl<D: Dice> GameEngine<D> {
    pub fn new(layout: Layout, names: [String; 2], dice: D) -> Result<Self> {
        layout.validate()?;

        let [one, two] = names;
        let players = [
            Player::new(one, Seat::One, layout.paths[0].clone()),
            Player::new(two, Seat::Two, layout.paths[1].clone()),
        ];

        Ok(Self {
            board: Board::new(&layout),
            layout,
            players,
            active: None,
            winner: None,
            phase: Phase::NotStarted,
            dice,
            listeners: Vec::new(),
        })
    }

    pub fn subscribe<F: FnMut(&Event) + 'static>(&mut self, listener: F) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: Event) {
        log::info!("{}", event);
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    pub fn active_seat(&self) -> Option<Seat> {
        self.active
    }

    pub fn active_player(&self) -> Option<&Player> {
        self.active.map(|seat| self.player(seat))
    }

    pub fn winner_seat(&self) -> Option<Seat> {
        self.winner
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner.map(|seat| self.player(seat))
    }

    pub fn token(&self, token: TokenRef) -> &Token {
        self.players[token.seat.index()].token_at(token.slot)
    }

    pub fn cell_at(&self, index: usize) -> Result<&Cell, BoardError> {
        self.board.cell_at(index)
    }

    pub fn occupancy_at(&self, index: usize) -> Result<Option<&Token>, BoardError> {
        Ok(self.board.occupancy_at(index)?.map(|r| self.token(r)))
    }

    // Occupant id for renderers, two blanks for an empty cell
    pub fn symbol(&self, index: usize) -> Result<String, BoardError> {
        Ok(self
            .occupancy_at(index)?
            .map_or_else(|| "  ".to_string(), |t| t.id().to_string()))
    }

    fn name_of(&self, seat: Seat) -> String {
        self.player(seat).name().to_string()
    }

    // Seat allowed to act right now, or why nobody is
    fn acting_seat(&self) -> Result<Seat, TurnError> {
        match self.phase {
            Phase::GameOver => Err(TurnError::GameOver {
                winner: self.winner.map(|s| self.name_of(s)).unwrap_or_default(),
            }),
            Phase::NotStarted | Phase::AwaitingFirstPlayerSelection => Err(TurnError::NotStarted),
            Phase::AwaitingRoll | Phase::AwaitingMoveChoice => {
                self.active.ok_or(TurnError::NotStarted)
            }
        }
    }

    pub fn start_game(&mut self) -> Result<Seat, TurnError> {
        self.board.reset();
        self.winner = None;
        self.active = None;
        for player in &mut self.players {
            player.initialize_tokens(player.seat().prefix());
            player.set_dice_roll(0);
        }
        self.phase = Phase::AwaitingFirstPlayerSelection;

        let players = [self.name_of(Seat::One), self.name_of(Seat::Two)];
        self.emit(Event::GameStarted { players });

        self.choose_first_active_player()
    }

    // Both seats roll until the results differ, the higher roll starts
    pub fn choose_first_active_player(&mut self) -> Result<Seat, TurnError> {
        let result = match self.phase {
            Phase::AwaitingFirstPlayerSelection => Ok(self.roll_for_first_player()),
            Phase::NotStarted => Err(TurnError::NotStarted),
            Phase::GameOver => self.acting_seat(),
            Phase::AwaitingRoll | Phase::AwaitingMoveChoice => Err(TurnError::FirstPlayerChosen),
        };
        warn_on_err(result)
    }

    fn roll_for_first_player(&mut self) -> Seat {
        let (one, two) = loop {
            let one = self.dice.roll();
            let two = self.dice.roll();
            if one != two {
                break (one, two);
            }
            self.emit(Event::FirstRollTied { roll: one });
        };

        let seat = if one > two { Seat::One } else { Seat::Two };
        self.active = Some(seat);
        self.phase = Phase::AwaitingRoll;

        let player = self.name_of(seat);
        self.emit(Event::FirstPlayerChosen { player, rolls: [one, two] });
        seat
    }

    pub fn switch_player_turn(&mut self) -> Result<Seat, TurnError> {
        let result = match self.active {
            Some(seat) => Ok(self.switch_turn(seat)),
            None => Err(TurnError::NotStarted),
        };
        warn_on_err(result)
    }

    // Hand the turn over. The outgoing roll has been used up and whatever the
    // incoming player still holds is stale.
    fn switch_turn(&mut self, from: Seat) -> Seat {
        let next = from.other();
        self.players[from.index()].set_dice_roll(0);
        self.players[next.index()].set_dice_roll(0);
        self.active = Some(next);
        self.phase = Phase::AwaitingRoll;

        let player = self.name_of(next);
        self.emit(Event::TurnSwitched { player });
        next
    }

    pub fn player_roll(&mut self) -> Result<u8, TurnError> {
        let result = self.try_roll();
        warn_on_err(result)
    }

    fn try_roll(&mut self) -> Result<u8, TurnError> {
        let seat = self.acting_seat()?;
        let pending = self.player(seat).dice_roll();
        if pending != 0 {
            return Err(TurnError::AlreadyRolled { player: self.name_of(seat), roll: pending });
        }

        let roll = self.dice.roll();
        self.players[seat.index()].set_dice_roll(roll);
        self.emit(Event::Rolled { player: self.name_of(seat), roll });

        if roll == 0 {
            self.emit(Event::TurnForfeited { player: self.name_of(seat) });
            self.switch_turn(seat);
        } else {
            self.phase = Phase::AwaitingMoveChoice;
        }

        Ok(roll)
    }

    pub fn move_token(&mut self, token_id: &str) -> Result<MoveReport, TurnError> {
        let result = self.try_move(token_id);
        warn_on_err(result)
    }

    fn try_move(&mut self, token_id: &str) -> Result<MoveReport, TurnError> {
        let seat = self.acting_seat()?;
        let plan = self.plan_move(seat, token_id)?;
        Ok(self.apply_move(seat, plan)?)
    }

    // All legality checks, in order, without mutating anything
    fn plan_move(&self, seat: Seat, token_id: &str) -> Result<MovePlan, TurnError> {
        let player = self.player(seat);
        let roll = player.dice_roll();
        if roll == 0 {
            return Err(TurnError::NotRolled { player: player.name().to_string() });
        }

        if !is_token_id(token_id) {
            return Err(TurnError::MalformedTokenId(token_id.to_string()));
        }

        let slot = player.available_slot(token_id).ok_or_else(|| TurnError::UnknownToken {
            token: token_id.to_string(),
            player: player.name().to_string(),
        })?;

        // Off the board counts as one step before the first path entry
        let from = player.token_at(slot).occupied_cell();
        let current = from
            .and_then(|cell| player.path_position(cell))
            .map_or(-1, |pos| pos as isize);
        let target = (current + roll as isize) as usize;

        let to = *player.path().get(target).ok_or_else(|| TurnError::ExceedsPath {
            token: token_id.to_string(),
            roll,
        })?;

        let cell = self.board.cell_at(to)?;
        let capture = match cell.occupant() {
            Some(occupant) if occupant.seat == seat => {
                return Err(TurnError::BlockedByOwnToken {
                    cell: to,
                    occupant: self.token(occupant).id().to_string(),
                });
            }
            Some(occupant) if cell.is_rosette() => {
                return Err(TurnError::GuardedRosette {
                    cell: to,
                    occupant: self.token(occupant).id().to_string(),
                });
            }
            other => other,
        };

        Ok(MovePlan {
            mover: TokenRef { seat, slot },
            from,
            to,
            capture,
        })
    }

    fn apply_move(&mut self, seat: Seat, plan: MovePlan) -> Result<MoveReport, BoardError> {
        let token_id = self.token(plan.mover).id().to_string();
        let mut outcome = MoveOutcome::Relocated;

        if let Some(victim) = plan.capture {
            self.board.remove_occupant(plan.to)?;
            self.players[victim.seat.index()].token_at_mut(victim.slot).reset();

            let captured = self.token(victim).id().to_string();
            self.emit(Event::TokenCaptured {
                token: captured.clone(),
                by: token_id.clone(),
                cell: plan.to,
            });
            outcome = MoveOutcome::Captured { token: captured };
        }

        if let Some(from) = plan.from {
            self.board.remove_occupant(from)?;
            self.players[seat.index()].token_at_mut(plan.mover.slot).vacate();
        }

        self.place(plan.mover, plan.to)?;
        self.emit(Event::TokenMoved { token: token_id.clone(), from: plan.from, to: plan.to });

        let cell = self.board.cell_at(plan.to)?;
        let (rosette, exit) = (cell.is_rosette(), cell.is_exit());

        if rosette {
            self.players[seat.index()].set_dice_roll(0);
            self.phase = Phase::AwaitingRoll;
            self.emit(Event::ExtraTurn { player: self.name_of(seat) });
        } else if exit {
            self.board.remove_occupant(plan.to)?;
            self.players[seat.index()].token_at_mut(plan.mover.slot).exit();
            outcome = MoveOutcome::Exited;

            let remaining = self.player(seat).available_tokens().len();
            self.emit(Event::TokenExited { token: token_id.clone(), remaining });
            self.switch_turn(seat);
        } else {
            self.switch_turn(seat);
        }

        let winner = self.check_win();

        Ok(MoveReport {
            token: token_id,
            from: plan.from,
            to: plan.to,
            outcome,
            extra_turn: rosette,
            winner,
        })
    }

    // The only place a token lands on a cell, keeps both sides in sync
    fn place(&mut self, token: TokenRef, index: usize) -> Result<(), BoardError> {
        self.board.set_occupant(index, token)?;
        self.players[token.seat.index()]
            .token_at_mut(token.slot)
            .set_occupied_cell(Some(index));
        Ok(())
    }

    // A player without available tokens wins. Ends the game and clears the
    // board.
    pub fn check_win(&mut self) -> Option<Seat> {
        if self.winner.is_some() {
            return self.winner;
        }

        if !matches!(self.phase, Phase::AwaitingRoll | Phase::AwaitingMoveChoice) {
            return None;
        }

        let seat = Seat::ALL
            .into_iter()
            .find(|seat| self.player(*seat).available_tokens().is_empty())?;

        self.winner = Some(seat);
        self.phase = Phase::GameOver;
        self.active = None;
        self.board.reset();
        for player in &mut self.players {
            player.lift_tokens();
            player.set_dice_roll(0);
        }

        self.emit(Event::GameWon { player: self.name_of(seat) });
        Some(seat)
    }

    // Ids of the active player's tokens that the pending roll can move
    pub fn legal_moves(&self) -> Vec<String> {
        let seat = match (self.phase, self.active) {
            (Phase::AwaitingMoveChoice, Some(seat)) => seat,
            _ => return Vec::new(),
        };

        self.player(seat)
            .available_tokens()
            .into_iter()
            .filter(|token| self.plan_move(seat, token.id()).is_ok())
            .map(|token| token.id().to_string())
            .collect()
    }

    // Give up a roll that no token can use
    pub fn pass_turn(&mut self) -> Result<Seat, TurnError> {
        let result = self.try_pass();
        warn_on_err(result)
    }

    fn try_pass(&mut self) -> Result<Seat, TurnError> {
        let seat = self.acting_seat()?;
        let roll = self.player(seat).dice_roll();
        if roll == 0 {
            return Err(TurnError::NotRolled { player: self.name_of(seat) });
        }

        if !self.legal_moves().is_empty() {
            return Err(TurnError::MoveAvailable { player: self.name_of(seat), roll });
        }

        self.emit(Event::TurnPassed { player: self.name_of(seat), roll });
        Ok(self.switch_turn(seat))
    }

    // Back to before the first game, keeping the token rosters
    pub fn reset(&mut self) {
        self.board.reset();
        for player in &mut self.players {
            player.reset_tokens();
            player.set_dice_roll(0);
        }
        self.active = None;
        self.winner = None;
        self.phase = Phase::NotStarted;
        self.emit(Event::GameReset);
    }
}

// Diagnostic dump following the layout's display rows
impl<D: Dice> fmt::Display for GameEngine<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fallback;
        let rows = if self.layout.display.is_empty() {
            fallback = vec![(0..self.layout.size).map(Some).collect::<Vec<_>>()];
            &fallback
        } else {
            &self.layout.display
        };

        for row in rows {
            let mut line = String::new();
            for cell in row {
                match cell {
                    Some(index) => {
                        let symbol = self.symbol(*index).unwrap_or_else(|_| "??".to_string());
                        line.push_str(&format!("|{:2}|", symbol));
                    }
                    None => line.push_str("    "),
                }
            }
            writeln!(f, "{}", line.trim_end())?;
        }

        Ok(())
    }
}
