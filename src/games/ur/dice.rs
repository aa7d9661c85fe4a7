use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DICE_COUNT: usize = 4;
pub const MAX_ROLL: u8 = DICE_COUNT as u8;

// Source of move distances. The engine draws every random number through
// this, so tests swap in `ScriptedDice`.
pub trait Dice {
    fn roll(&mut self) -> u8;
}

impl<D: Dice + ?Sized> Dice for Box<D> {
    fn roll(&mut self) -> u8 {
        (**self).roll()
    }
}

// Four two-sided dice, each showing 0 or 1. The sum follows binomial(4, 0.5).
#[derive(Clone, Debug)]
pub struct BinaryDice<R> {
    rng: R,
}

impl<R: Rng> BinaryDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl BinaryDice<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> Dice for BinaryDice<R> {
    fn roll(&mut self) -> u8 {
        (0..DICE_COUNT).filter(|_| self.rng.random_bool(0.5)).count() as u8
    }
}

// Replays a fixed list of rolls, starting over when it runs out
#[derive(Clone, Debug)]
pub struct ScriptedDice {
    rolls: Vec<u8>,
    cursor: usize,
}

impl ScriptedDice {
    pub fn new(rolls: Vec<u8>) -> Result<Self> {
        if rolls.is_empty() {
            return Err(anyhow!("Scripted dice need at least one roll"));
        }

        if let Some(bad) = rolls.iter().find(|&&r| r > MAX_ROLL) {
            return Err(anyhow!("Roll {} is outside [0, {}]", bad, MAX_ROLL));
        }

        // Choosing the first player rerolls until the two seats differ. A new
        // game may start at either parity of the cursor, so both pairings of
        // the cycle need at least one pair that breaks the tie.
        let period = if rolls.len() % 2 == 0 { rolls.len() } else { 2 * rolls.len() };
        for offset in 0..2 {
            let always_tied = (0..period)
                .step_by(2)
                .map(|i| offset + i)
                .all(|i| rolls[i % rolls.len()] == rolls[(i + 1) % rolls.len()]);
            if always_tied {
                return Err(anyhow!(
                    "Rolls {:?} always tie when choosing the first player",
                    rolls
                ));
            }
        }

        Ok(Self { rolls, cursor: 0 })
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> u8 {
        let roll = self.rolls[self.cursor % self.rolls.len()];
        self.cursor += 1;
        roll
    }
}
