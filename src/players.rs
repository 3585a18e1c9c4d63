//! Bot players that drive a [`Game`] until a spawn fails.
//!
//! The lookahead players try every direction on the live game, score the
//! result and roll back with [`Game::save`]/[`Game::restore`] before
//! committing to the best one.
//!
//! ```
//! use grid2048::players::{run_player, MaxScorePlayer};
//! use grid2048::Game;
//!
//! let mut game = Game::seeded(1);
//! let run = run_player(&mut MaxScorePlayer, &mut game, 50);
//! assert!(run.iterations <= 50);
//! assert!(run.max_value >= 1);
//! ```

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::direction::Move;
use crate::game::Game;
use crate::grid::SIZE;

/// A move-picking policy.
pub trait Player<R: Rng> {
    fn name(&self) -> &'static str;

    /// Pick the next direction. The game must be left as it was found.
    fn choose(&mut self, game: &mut Game<R>) -> Move;
}

/// Outcome of one [`run_player`] game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerRun {
    /// Slides performed before the game ended or the cap was hit.
    pub iterations: usize,
    /// Largest cell value at the end.
    pub max_value: u8,
}

/// Reset `game` and let `player` drive it for at most `max_iterations` slides.
///
/// Each turn slides in the chosen direction then spawns a tile; the game
/// ends when the spawn fails.
pub fn run_player<R, P>(player: &mut P, game: &mut Game<R>, max_iterations: usize) -> PlayerRun
where
    R: Rng,
    P: Player<R> + ?Sized,
{
    game.reset();
    let mut iterations = 0;
    while iterations < max_iterations {
        let dir = player.choose(game);
        game.slide(dir);
        iterations += 1;
        if !game.add_tile() {
            break;
        }
    }
    let run = PlayerRun { iterations, max_value: game.max_value() };
    debug!("{}: {:?}\n{}", player.name(), run, game.grid());
    run
}

/// Picks a uniformly random direction.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPlayer;

impl<R: Rng> Player<R> for RandomPlayer {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose(&mut self, game: &mut Game<R>) -> Move {
        *Move::ACTIONS.choose(game.rng_mut()).unwrap_or(&Move::Left)
    }
}

/// Direction whose slide gives the strictly highest `score`; the earliest
/// direction in `LDUR` order wins ties.
fn best_direction<R: Rng>(game: &mut Game<R>, score: impl Fn(&Game<R>) -> f64) -> Move {
    let checkpoint = game.save();
    let mut best: Option<(Move, f64)> = None;
    for dir in Move::ACTIONS {
        game.slide(dir);
        let s = score(game);
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((dir, s));
        }
        game.restore(&checkpoint);
    }
    best.map_or(Move::Left, |(dir, _)| dir)
}

/// Greedy one-ply lookahead on [`Game::score`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxScorePlayer;

impl<R: Rng> Player<R> for MaxScorePlayer {
    fn name(&self) -> &'static str {
        "max_score"
    }

    fn choose(&mut self, game: &mut Game<R>) -> Move {
        best_direction(game, Game::score)
    }
}

/// Like [`MaxScorePlayer`], with a bonus of `2^max` when the largest tile
/// sits in a corner.
#[derive(Debug, Default, Clone, Copy)]
pub struct CornerPlayer;

fn corner_score<R: Rng>(game: &Game<R>) -> f64 {
    let mut best: Option<(usize, usize, u8)> = None;
    // x outer, y inner: the first maximum in that order counts
    for x in 0..SIZE {
        for y in 0..SIZE {
            let v = game.grid().cells()[y * SIZE + x];
            if v > best.map_or(0, |(_, _, b)| b) {
                best = Some((x, y, v));
            }
        }
    }
    let mut score = game.score();
    if let Some((x, y, v)) = best {
        let edge = |c: usize| c == 0 || c == SIZE - 1;
        if edge(x) && edge(y) {
            score += (1u64 << v) as f64;
        }
    }
    score
}

impl<R: Rng> Player<R> for CornerPlayer {
    fn name(&self) -> &'static str {
        "corner"
    }

    fn choose(&mut self, game: &mut Game<R>) -> Move {
        best_direction(game, corner_score)
    }
}

/// Aggregate of several [`PlayerRun`]s for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub name: String,
    pub trials: usize,
    pub mean_iterations: f64,
    pub max_iterations: usize,
    pub mean_max_value: f64,
    pub max_max_value: u8,
    pub mean_tile: f64,
    pub max_tile: u64,
}

impl RunSummary {
    /// Mean and max of iterations, raw max value and tile (`2^max_value`).
    pub fn from_runs(name: &str, runs: &[PlayerRun]) -> Self {
        let n = runs.len().max(1) as f64;
        let mean = |f: &dyn Fn(&PlayerRun) -> f64| runs.iter().map(f).sum::<f64>() / n;
        RunSummary {
            name: name.to_string(),
            trials: runs.len(),
            mean_iterations: mean(&|r| r.iterations as f64),
            max_iterations: runs.iter().map(|r| r.iterations).max().unwrap_or(0),
            mean_max_value: mean(&|r| r.max_value as f64),
            max_max_value: runs.iter().map(|r| r.max_value).max().unwrap_or(0),
            mean_tile: mean(&|r| (1u64 << r.max_value) as f64),
            max_tile: runs.iter().map(|r| 1u64 << r.max_value).max().unwrap_or(0),
        }
    }
}
