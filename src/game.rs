//! Game state: one owned [`Grid`] plus the random source used for spawns.
//!
//! The random source is injected so runs are reproducible:
//! ```
//! use grid2048::{Game, Move};
//!
//! let mut game = Game::seeded(7);
//! assert_eq!(game.grid().count_empty(), 14);
//! game.slide(Move::Left);
//! assert!(game.add_tile());
//! ```

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::direction::Move;
use crate::error::GridError;
use crate::grid::{Grid, CELLS, MAX_VALUE, SIZE};

/// Opaque copy of a game's 16 cells, taken by [`Game::save`].
///
/// Deserializing goes through [`Grid`], so out-of-range cells are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    grid: Grid,
}

/// A 2048 game on a 4x4 grid.
pub struct Game<R: Rng = StdRng> {
    grid: Grid,
    rng: R,
}

/// New tile value: 1 (tile 2) with 90% probability, else 2 (tile 4).
fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    if rng.gen_range(0..10) < 9 {
        1
    } else {
        2
    }
}

impl Game<StdRng> {
    /// Start a game seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Game::new(StdRng::from_entropy())
    }

    /// Start a deterministic game from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Game::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Game<R> {
    /// Start a game with two random tiles.
    pub fn new(rng: R) -> Self {
        let mut game = Game { grid: Grid::EMPTY, rng };
        game.reset();
        game
    }

    /// Start from an existing grid, leaving it as is.
    pub fn with_grid(grid: Grid, rng: R) -> Self {
        Game { grid, rng }
    }

    /// The current grid.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Swap in a new grid wholesale, returning the previous one.
    pub fn replace_grid(&mut self, grid: Grid) -> Grid {
        trace!("replacing grid {:?} with {:?}", self.grid, grid);
        std::mem::replace(&mut self.grid, grid)
    }

    /// Reorient the grid with [`Grid::heavy_side_flip`].
    pub fn canonicalize(&mut self) {
        let flipped = self.grid.heavy_side_flip();
        self.replace_grid(flipped);
    }

    /// The random source, for callers that want to share it (bot players).
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Clear the grid and place two tiles (2 or 4) on distinct random cells.
    pub fn reset(&mut self) {
        self.grid = Grid::EMPTY;
        for idx in index::sample(&mut self.rng, CELLS, 2) {
            self.grid.cells_mut()[idx] = generate_random_tile(&mut self.rng);
        }
        debug!("reset: {:?}", self.grid);
    }

    /// Clear the grid and place between 2 and `max_cells` tiles with values
    /// drawn uniformly from `1..=max_value`, on distinct random cells.
    pub fn reset_random(&mut self, max_cells: usize, max_value: u8) -> Result<(), GridError> {
        if !(2..=CELLS).contains(&max_cells) {
            return Err(GridError::InvalidArgument(format!(
                "max_cells must be in 2..={CELLS}, got {max_cells}"
            )));
        }
        if !(1..=MAX_VALUE).contains(&max_value) {
            return Err(GridError::InvalidArgument(format!(
                "max_value must be in 1..={MAX_VALUE}, got {max_value}"
            )));
        }
        self.grid = Grid::EMPTY;
        let count = self.rng.gen_range(2..=max_cells);
        for idx in index::sample(&mut self.rng, CELLS, count) {
            self.grid.cells_mut()[idx] = self.rng.gen_range(1..=max_value);
        }
        debug!("reset_random({max_cells}, {max_value}): {:?}", self.grid);
        Ok(())
    }

    /// Spawn a 2 (90%) or 4 (10%) on a random empty cell.
    ///
    /// Returns `false` without touching the grid when no cell is empty,
    /// which callers treat as game over.
    pub fn add_tile(&mut self) -> bool {
        let open = self.grid.empty_cells();
        let Some(&(x, y)) = open.choose(&mut self.rng) else {
            debug!("add_tile: board full");
            return false;
        };
        let v = generate_random_tile(&mut self.rng);
        self.grid.cells_mut()[y * SIZE + x] = v;
        trace!("add_tile: {v} at ({x}, {y})");
        true
    }

    /// Largest cell value on the grid.
    #[inline]
    pub fn max_value(&self) -> u8 {
        self.grid.max_value()
    }

    /// Slide and merge every row (or column) toward `dir`.
    ///
    /// Equal neighbours merge once per slide into one tile of value + 1;
    /// a merged tile never merges again in the same slide. Two value-15
    /// tiles do not merge. Whether anything moved is not reported; compare
    /// against a [`Game::save`] snapshot if that matters.
    pub fn slide(&mut self, dir: Move) {
        let cells = self.grid.cells_mut();
        for y in 0..SIZE {
            let at = |x: usize| {
                let (gx, gy) = dir.remap(x, y);
                gy * SIZE + gx
            };
            let mut prev = 0u8;
            let mut out = 0usize;
            for x in 0..SIZE {
                let v = cells[at(x)];
                if v == 0 {
                    continue;
                }
                if v == prev && v < MAX_VALUE {
                    cells[at(out - 1)] = v + 1;
                    prev = 0;
                } else {
                    cells[at(out)] = v;
                    out += 1;
                    prev = v;
                }
            }
            for x in out..SIZE {
                cells[at(x)] = 0;
            }
        }
    }

    /// [`Game::slide`] taking a direction code (`L`, `R`, `U`, `D`).
    pub fn slide_code(&mut self, code: &str) -> Result<(), GridError> {
        let dir: Move = code.parse()?;
        self.slide(dir);
        Ok(())
    }

    /// Copy the current cells out.
    pub fn save(&self) -> Snapshot {
        Snapshot { grid: self.grid }
    }

    /// Put the cells from `snapshot` back.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.grid = snapshot.grid;
    }

    /// Sum over cells of `(2^v)^2`, empty cells counting as 1.
    pub fn square_score(&self) -> f64 {
        self.grid
            .cells()
            .iter()
            .map(|&v| {
                let tile = (1u64 << v) as f64;
                tile * tile
            })
            .sum()
    }

    /// Square root of [`Game::square_score`].
    pub fn score(&self) -> f64 {
        self.square_score().sqrt()
    }
}
