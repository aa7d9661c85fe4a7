// Rules engine for a two-player race game in the family of the Royal Game of
// Ur. Everything lives under `games::ur`, the binary adds a terminal front-end
// and a simulation harness.

pub mod games;
