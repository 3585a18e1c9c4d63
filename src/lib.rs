//! grid2048: the 2048 tile-sliding game on a fixed 4x4 grid
//!
//! This crate provides:
//! - A `Grid` cell store with text encoding, flips and heavy-side canonicalization (`grid` module)
//! - A `Game` with tile spawning, slide/merge, and save/restore for lookahead (`game` module)
//! - Greedy and random bot players (`players` module)
//! - An RL-style environment with several observation and reward schemes (`env` module)
//!
//! Quick start:
//! ```
//! use grid2048::{Game, Grid, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let grid: Grid = "
//!     1122
//!     .3.3
//!     .414
//!     5665
//! ".parse().unwrap();
//! let mut game = Game::with_grid(grid, StdRng::seed_from_u64(42));
//! game.slide(Move::Left);
//! assert_eq!(game.grid().to_string(), "23..\n4...\n414.\n575.\n");
//! assert_eq!(game.max_value(), 7);
//! ```
//!
//! Lookahead without committing:
//! ```
//! use grid2048::{Game, Move};
//!
//! let mut game = Game::seeded(9);
//! let checkpoint = game.save();
//! game.slide(Move::Up);
//! game.restore(&checkpoint);
//! assert_eq!(game.save(), checkpoint);
//! ```
//!
//! Randomness only enters through the `Rng` handed to `Game`; seed it for
//! reproducible runs.
//!
pub mod direction;
pub mod env;
pub mod error;
pub mod game;
pub mod grid;
pub mod players;

pub use direction::Move;
pub use error::GridError;
pub use game::{Game, Snapshot};
pub use grid::Grid;
