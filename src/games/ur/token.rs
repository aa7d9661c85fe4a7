use serde::Serialize;

use super::player::Seat;

// Handle to a token: which roster, which slot in it. The board stores these
// instead of owning tokens.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct TokenRef {
    pub seat: Seat,
    pub slot: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    id: String,
    seat: Seat,
    on_board: bool,
    exited: bool,
    cell: Option<usize>,
}

impl Token {
    pub(crate) fn new(seat: Seat, id: String) -> Self {
        Self {
            id,
            seat,
            on_board: false,
            exited: false,
            cell: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn is_on_board(&self) -> bool {
        self.on_board
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    pub fn occupied_cell(&self) -> Option<usize> {
        self.cell
    }

    // Guarded setter. Occupancy is only ever cleared through `vacate`, so
    // passing `None` here is refused and leaves the token untouched.
    pub(crate) fn set_occupied_cell(&mut self, cell: Option<usize>) -> bool {
        match cell {
            Some(index) => {
                self.cell = Some(index);
                self.on_board = true;
                true
            }
            None => {
                log::warn!("Refusing to clear the cell of {} through its setter", self.id);
                false
            }
        }
    }

    pub(crate) fn vacate(&mut self) {
        self.cell = None;
        self.on_board = false;
    }

    pub(crate) fn exit(&mut self) {
        self.exited = true;
        self.on_board = false;
        self.cell = None;
    }

    pub(crate) fn reset(&mut self) {
        self.on_board = false;
        self.exited = false;
        self.cell = None;
    }
}
