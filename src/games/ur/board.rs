use thiserror::Error;

use super::layout::Layout;
use super::token::TokenRef;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Cell {index} is outside the board of {size} cells")]
    OutOfRange { index: usize, size: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    index: usize,
    rosette: bool,
    exit: bool,
    occupant: Option<TokenRef>,
}

impl Cell {
    fn new(index: usize, rosette: bool, exit: bool) -> Self {
        Self { index, rosette, exit, occupant: None }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_rosette(&self) -> bool {
        self.rosette
    }

    pub fn is_exit(&self) -> bool {
        self.exit
    }

    pub fn occupant(&self) -> Option<TokenRef> {
        self.occupant
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

// Cells and who stands on them. The board never looks at tokens, the engine
// keeps `Token::occupied_cell` mirrored with the occupant stored here.
#[derive(Clone, Debug)]
pub struct Board {
    size: usize,
    rosettes: Vec<usize>,
    exits: Vec<usize>,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(layout: &Layout) -> Self {
        let mut board = Self {
            size: layout.size,
            rosettes: layout.rosettes.clone(),
            exits: layout.exits.clone(),
            cells: Vec::with_capacity(layout.size),
        };
        board.initialize();
        board
    }

    fn initialize(&mut self) {
        for i in 0..self.size {
            let cell = Cell::new(i, self.rosettes.contains(&i), self.exits.contains(&i));
            self.cells.push(cell);
        }
    }

    // Throw every cell away and build them again
    pub fn reset(&mut self) {
        self.cells.clear();
        self.initialize();
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell_at(&self, index: usize) -> Result<&Cell, BoardError> {
        self.cells.get(index).ok_or(BoardError::OutOfRange { index, size: self.size })
    }

    pub fn occupancy_at(&self, index: usize) -> Result<Option<TokenRef>, BoardError> {
        Ok(self.cell_at(index)?.occupant)
    }

    fn cell_mut(&mut self, index: usize) -> Result<&mut Cell, BoardError> {
        let size = self.size;
        self.cells.get_mut(index).ok_or(BoardError::OutOfRange { index, size })
    }

    pub(crate) fn set_occupant(&mut self, index: usize, token: TokenRef) -> Result<(), BoardError> {
        self.cell_mut(index)?.occupant = Some(token);
        Ok(())
    }

    pub(crate) fn remove_occupant(&mut self, index: usize) -> Result<Option<TokenRef>, BoardError> {
        Ok(self.cell_mut(index)?.occupant.take())
    }
}
