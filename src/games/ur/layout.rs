use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::games::Validate;

// Board geometry. Nothing in the engine hard-wires cell numbers, every
// variant is just another value of this struct.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub size: usize,
    pub rosettes: Vec<usize>,
    pub exits: Vec<usize>,
    // One path per seat, walked from off-board (position -1) to the exit
    pub paths: [Vec<usize>; 2],
    // Rows for the diagnostic dump, `None` leaves a gap
    #[serde(default)]
    pub display: Vec<Vec<Option<usize>>>,
}

impl Layout {
    // 22 cells, both paths of length 15. The two exits sit off the drawn
    // board.
    pub fn classic() -> Self {
        Self {
            size: 22,
            rosettes: vec![4, 8, 11, 17, 19],
            exits: vec![20, 21],
            paths: [
                vec![1, 2, 3, 4, 0, 9, 10, 11, 12, 13, 14, 15, 16, 17, 20],
                vec![5, 6, 7, 8, 0, 9, 10, 11, 12, 13, 14, 15, 18, 19, 21],
            ],
            display: vec![
                vec![Some(4), Some(0), Some(8)],
                vec![Some(3), Some(9), Some(7)],
                vec![Some(2), Some(10), Some(6)],
                vec![Some(1), Some(11), Some(5)],
                vec![None, Some(12), None],
                vec![None, Some(13), None],
                vec![Some(17), Some(14), Some(19)],
                vec![Some(16), Some(15), Some(18)],
            ],
        }
    }

    // 20 cells where the exit is the last drawn square of each private lane,
    // paths of length 14.
    pub fn compact() -> Self {
        Self {
            size: 20,
            rosettes: vec![3, 7, 11, 16, 18],
            exits: vec![17, 19],
            paths: [
                vec![0, 1, 2, 3, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17],
                vec![4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 18, 19],
            ],
            display: vec![
                vec![Some(3), Some(8), Some(7)],
                vec![Some(2), Some(9), Some(6)],
                vec![Some(1), Some(10), Some(5)],
                vec![Some(0), Some(11), Some(4)],
                vec![None, Some(12), None],
                vec![None, Some(13), None],
                vec![Some(16), Some(14), Some(18)],
                vec![Some(17), Some(15), Some(19)],
            ],
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open layout file {}", path.display()))?;
        let layout: Layout = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse layout file {}", path.display()))?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn is_rosette(&self, index: usize) -> bool {
        self.rosettes.contains(&index)
    }

    pub fn is_exit(&self, index: usize) -> bool {
        self.exits.contains(&index)
    }

    fn check_index(&self, what: &str, index: usize) -> Result<()> {
        if index >= self.size {
            return Err(anyhow!(
                "{} cell {} is outside the board of {} cells",
                what,
                index,
                self.size
            ));
        }
        Ok(())
    }
}

impl Validate for Layout {
    fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(anyhow!("Board has no cells"));
        }

        for &index in &self.rosettes {
            self.check_index("Rosette", index)?;
        }

        for &index in &self.exits {
            self.check_index("Exit", index)?;
            // Landing on a rosette grants another roll and takes precedence,
            // a token could never leave through such a cell
            if self.is_rosette(index) {
                return Err(anyhow!("Exit cell {} is also a rosette", index));
            }
        }

        for (seat, path) in self.paths.iter().enumerate() {
            let (last, rest) = path
                .split_last()
                .ok_or_else(|| anyhow!("Path for seat {} is empty", seat))?;

            let mut seen = HashSet::with_capacity(path.len());
            for &index in path {
                self.check_index("Path", index)?;
                if !seen.insert(index) {
                    return Err(anyhow!("Path for seat {} visits cell {} twice", seat, index));
                }
            }

            if !self.is_exit(*last) {
                return Err(anyhow!(
                    "Path for seat {} ends on cell {} which is not an exit",
                    seat,
                    last
                ));
            }

            if let Some(early) = rest.iter().find(|&&index| self.is_exit(index)) {
                return Err(anyhow!(
                    "Path for seat {} reaches exit cell {} before its end",
                    seat,
                    early
                ));
            }
        }

        for index in self.display.iter().flatten().flatten() {
            self.check_index("Displayed", *index)?;
        }

        Ok(())
    }
}
