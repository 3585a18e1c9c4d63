//! Reinforcement-learning style wrapper around [`Game`].
//!
//! An [`Env`] maps discrete actions (`0..4`, in `LDUR` order) to slides,
//! spawns a tile after each one and reports an observation, a reward and
//! whether the episode is over. Encoding and reward shaping are chosen
//! through [`EnvConfig`].
//!
//! ```
//! use grid2048::env::{Env, EnvConfig, Observation};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let config = EnvConfig { observation: Observation::OneHot, ..EnvConfig::default() };
//! let mut env = Env::new(config, StdRng::seed_from_u64(3));
//! let obs = env.reset();
//! assert_eq!(obs.len(), 16 * 12);
//! let step = env.step(0).unwrap();
//! assert_eq!(step.observation.len(), obs.len());
//! ```

use log::{debug, trace};
use rand::Rng;

use crate::direction::Move;
use crate::error::GridError;
use crate::game::Game;
use crate::grid::CELLS;

/// Number of discrete actions.
pub const ACTIONS: usize = 4;
/// Cell value of the 2048 tile; reaching it ends the episode.
pub const WIN_VALUE: u8 = 11;
/// Width of the per-cell one-hot encoding (values 0..=11).
pub const ONE_HOT_WIDTH: usize = 12;
/// Bits per cell in the bit-vector encoding.
pub const BITS_PER_CELL: usize = 4;

const FAIL_PENALTY: f64 = 2048.0;
// Expected square-sum added by one spawn: 0.9 * 2^2 + 0.1 * 4^2.
const SPAWN_DRAG: f64 = 5.2;

/// Observation encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Observation {
    /// The 16 raw cell values.
    Raw,
    /// 4 bits per cell, least significant first.
    BitVec,
    /// One-hot over values `0..12` per cell. Values above 11 set no bit.
    #[default]
    OneHot,
}

impl Observation {
    /// Length of an encoded observation.
    pub fn size(self) -> usize {
        match self {
            Observation::Raw => CELLS,
            Observation::BitVec => CELLS * BITS_PER_CELL,
            Observation::OneHot => CELLS * ONE_HOT_WIDTH,
        }
    }
}

/// Reward shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reward {
    /// Gain in the largest tile (`2^max`), else -1.
    #[default]
    MaxTile,
    /// Change in the sum of squared tiles, minus the expected spawn drag.
    SquareSum,
    /// +1 per surviving step, +2048 on reaching the 2048 tile.
    Survival,
    /// Change in the root of the squared-tile sum, +2048 on reaching the 2048 tile.
    RootSquareSum,
}

/// Curriculum start: with `probability`, a reset is replaced by a random
/// dense board that is then slid up and left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curriculum {
    pub probability: f64,
    pub max_cells: usize,
    pub max_value: u8,
}

impl Default for Curriculum {
    fn default() -> Self {
        Self { probability: 0.25, max_cells: 5, max_value: 7 }
    }
}

/// Environment knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvConfig {
    pub observation: Observation,
    pub reward: Reward,
    /// Reorient the grid with the heavy-side flip before every observation.
    pub canonicalize: bool,
    pub curriculum: Option<Curriculum>,
    /// Multiplier applied to every reward.
    pub reward_scale: f64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            observation: Observation::default(),
            reward: Reward::default(),
            canonicalize: false,
            curriculum: None,
            reward_scale: 1.0,
        }
    }
}

/// Result of [`Env::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub observation: Vec<f32>,
    pub reward: f64,
    pub terminated: bool,
    /// Always false; there is no step limit.
    pub truncated: bool,
}

/// Episode driver over a [`Game`].
pub struct Env<R: Rng> {
    game: Game<R>,
    config: EnvConfig,
    prev_score: f64,
}

impl<R: Rng> Env<R> {
    /// Build an environment and start the first episode.
    pub fn new(config: EnvConfig, rng: R) -> Self {
        let mut env = Env { game: Game::new(rng), config, prev_score: 0.0 };
        env.reset();
        env
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn game(&self) -> &Game<R> {
        &self.game
    }

    /// Start a new episode and return its first observation.
    pub fn reset(&mut self) -> Vec<f32> {
        self.game.reset();
        if let Some(c) = self.config.curriculum {
            // NaN or infinite probabilities never trigger the curriculum
            let p = if c.probability.is_finite() { c.probability.clamp(0.0, 1.0) } else { 0.0 };
            if self.game.rng_mut().gen_bool(p) {
                match self.game.reset_random(c.max_cells, c.max_value) {
                    Ok(()) => {
                        self.game.slide(Move::Up);
                        self.game.slide(Move::Left);
                        debug!("curriculum start:\n{}", self.game.grid());
                    }
                    Err(e) => debug!("curriculum skipped: {e}"),
                }
            }
        }
        if self.config.canonicalize {
            self.game.canonicalize();
        }
        self.prev_score = self.baseline_score();
        self.observe()
    }

    /// Apply `action`, spawn a tile and score the result.
    pub fn step(&mut self, action: usize) -> Result<StepOutcome, GridError> {
        let dir = Move::from_action(action)
            .ok_or_else(|| GridError::InvalidArgument(format!("action {action} not in 0..{ACTIONS}")))?;
        self.game.slide(dir);
        let spawned = self.game.add_tile();
        let (terminated, reward) = self.reward(spawned);
        trace!("step {dir}: reward {reward}, terminated {terminated}");
        if self.config.canonicalize {
            self.game.canonicalize();
        }
        Ok(StepOutcome {
            observation: self.observe(),
            reward: reward * self.config.reward_scale,
            terminated,
            truncated: false,
        })
    }

    /// Encode the current grid.
    pub fn observe(&self) -> Vec<f32> {
        let cells = self.game.grid().cells();
        let mut obs = Vec::with_capacity(self.config.observation.size());
        match self.config.observation {
            Observation::Raw => obs.extend(cells.iter().map(|&v| v as f32)),
            Observation::BitVec => {
                for &v in cells {
                    obs.extend((0..BITS_PER_CELL).map(|bit| ((v >> bit) & 1) as f32));
                }
            }
            Observation::OneHot => {
                for &v in cells {
                    obs.extend((0..ONE_HOT_WIDTH).map(|i| if i == v as usize { 1.0 } else { 0.0 }));
                }
            }
        }
        obs
    }

    fn baseline_score(&self) -> f64 {
        match self.config.reward {
            Reward::MaxTile | Reward::Survival => 0.0,
            Reward::SquareSum => self.game.square_score(),
            Reward::RootSquareSum => self.game.score(),
        }
    }

    fn reward(&mut self, spawned: bool) -> (bool, f64) {
        if !spawned {
            let penalty = match self.config.reward {
                Reward::SquareSum => FAIL_PENALTY * FAIL_PENALTY,
                _ => FAIL_PENALTY,
            };
            return (true, -penalty);
        }
        let won = self.game.max_value() >= WIN_VALUE;
        let reward = match self.config.reward {
            Reward::MaxTile => {
                let score = (1u64 << self.game.max_value()) as f64;
                if score > self.prev_score {
                    let gain = score - self.prev_score;
                    self.prev_score = score;
                    gain
                } else {
                    -1.0
                }
            }
            Reward::SquareSum => {
                let score = self.game.square_score();
                let gain = score - self.prev_score - SPAWN_DRAG;
                self.prev_score = score;
                gain
            }
            Reward::Survival => {
                if won {
                    FAIL_PENALTY
                } else {
                    1.0
                }
            }
            Reward::RootSquareSum => {
                let score = self.game.score();
                let gain = score - self.prev_score;
                self.prev_score = score;
                if won {
                    gain + FAIL_PENALTY
                } else {
                    gain
                }
            }
        };
        (won, reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn env(config: EnvConfig) -> Env<StdRng> {
        Env::new(config, StdRng::seed_from_u64(17))
    }

    fn env_on(config: EnvConfig, grid: &str) -> Env<StdRng> {
        let mut env = env(config);
        env.game.replace_grid(grid.parse::<Grid>().unwrap());
        env.prev_score = env.baseline_score();
        env
    }

    #[test]
    fn observation_lengths() {
        for (obs, len) in [(Observation::Raw, 16), (Observation::BitVec, 64), (Observation::OneHot, 192)] {
            let mut e = env(EnvConfig { observation: obs, ..EnvConfig::default() });
            assert_eq!(e.reset().len(), len);
            assert_eq!(obs.size(), len);
        }
    }

    #[test]
    fn encodings() {
        let grid = "5...\n....\n....\n...B";
        let raw = env_on(EnvConfig { observation: Observation::Raw, ..EnvConfig::default() }, grid);
        let obs = raw.observe();
        assert_eq!(obs[0], 5.0);
        assert_eq!(obs[15], 11.0);

        let bits = env_on(EnvConfig { observation: Observation::BitVec, ..EnvConfig::default() }, grid);
        let obs = bits.observe();
        assert_eq!(&obs[0..4], &[1.0, 0.0, 1.0, 0.0]);
        assert_eq!(&obs[60..64], &[1.0, 1.0, 0.0, 1.0]);

        let hot = env_on(EnvConfig::default(), grid);
        let obs = hot.observe();
        assert_eq!(obs[5], 1.0);
        assert_eq!(obs[ONE_HOT_WIDTH], 1.0);
        assert_eq!(obs.iter().sum::<f32>(), 16.0);
    }

    #[test]
    fn invalid_action() {
        let mut e = env(EnvConfig::default());
        assert!(matches!(e.step(4), Err(GridError::InvalidArgument(_))));
    }

    #[test]
    fn max_tile_reward() {
        let mut e = env_on(EnvConfig::default(), "11..\n....\n....\n....");
        // merging 1+1 gives a 4 tile: gain from 0 to 4
        let out = e.step(0).unwrap();
        assert_eq!(out.reward, 4.0);
        assert!(!out.terminated);
        assert!(!out.truncated);
    }

    #[test]
    fn failed_spawn_terminates() {
        let full = "1212\n2121\n1212\n2121";
        let mut e = env_on(EnvConfig::default(), full);
        let out = e.step(0).unwrap();
        assert!(out.terminated);
        assert_eq!(out.reward, -2048.0);

        let cfg = EnvConfig { reward: Reward::SquareSum, ..EnvConfig::default() };
        let mut e = env_on(cfg, full);
        assert_eq!(e.step(0).unwrap().reward, -(2048.0 * 2048.0));
    }

    #[test]
    fn reaching_2048_terminates() {
        let cfg = EnvConfig { reward: Reward::Survival, ..EnvConfig::default() };
        let mut e = env_on(cfg, "AA..\n....\n....\n....");
        let out = e.step(0).unwrap();
        assert!(out.terminated);
        assert_eq!(out.reward, 2048.0);
    }

    #[test]
    fn survival_and_scale() {
        let cfg = EnvConfig { reward: Reward::Survival, reward_scale: 0.5, ..EnvConfig::default() };
        let mut e = env_on(cfg, "1...\n....\n....\n....");
        let out = e.step(3).unwrap();
        assert_eq!(out.reward, 0.5);
    }

    #[test]
    fn max_tile_no_merge_is_penalized() {
        let mut e = env_on(EnvConfig::default(), "3...\n....\n....\n....");
        e.prev_score = 8.0;
        // sliding left changes nothing and the spawn is at most a 2
        let out = e.step(0).unwrap();
        assert_eq!(e.game().max_value(), 3);
        assert_eq!(out.reward, -1.0);
        assert!(!out.terminated);
    }

    #[test]
    fn root_square_sum_reward() {
        let cfg = EnvConfig { reward: Reward::RootSquareSum, ..EnvConfig::default() };
        let mut e = env_on(cfg, "11..\n....\n....\n....");
        let before = e.game().score();
        let out = e.step(0).unwrap();
        let after = e.game().score();
        assert!(out.reward != 0.0);
        assert!((out.reward - (after - before)).abs() < 1e-9);
        assert!(!out.terminated);
    }

    #[test]
    fn root_square_sum_win_bonus() {
        let cfg = EnvConfig { reward: Reward::RootSquareSum, ..EnvConfig::default() };
        let mut e = env_on(cfg, "AA..\n....\n....\n....");
        let before = e.game().score();
        let out = e.step(0).unwrap();
        let after = e.game().score();
        assert!(out.terminated);
        assert!((out.reward - (after - before + 2048.0)).abs() < 1e-9);
    }

    #[test]
    fn non_finite_curriculum_probability_is_ignored() {
        for probability in [f64::NAN, f64::INFINITY] {
            let curriculum = Curriculum { probability, ..Curriculum::default() };
            let mut e = env(EnvConfig { curriculum: Some(curriculum), ..EnvConfig::default() });
            e.reset();
            assert_eq!(e.game().grid().count_empty(), 14);
        }
    }

    #[test]
    fn square_sum_reward() {
        let cfg = EnvConfig { reward: Reward::SquareSum, ..EnvConfig::default() };
        let mut e = env_on(cfg, "11..\n....\n....\n....");
        let before = e.game().square_score();
        let out = e.step(0).unwrap();
        let after = e.game().square_score();
        assert!((out.reward - (after - before - SPAWN_DRAG)).abs() < 1e-9);
    }

    #[test]
    fn canonicalized_observations() {
        let cfg = EnvConfig { canonicalize: true, observation: Observation::Raw, ..EnvConfig::default() };
        let mut e = env(cfg);
        for action in [0, 1, 2, 3, 0, 1] {
            e.step(action).unwrap();
            let grid = *e.game().grid();
            assert_eq!(grid.heavy_side_flip(), grid);
        }
    }

    #[test]
    fn curriculum_always() {
        let curriculum = Curriculum { probability: 1.0, ..Curriculum::default() };
        let mut e = env(EnvConfig { curriculum: Some(curriculum), ..EnvConfig::default() });
        for _ in 0..20 {
            e.reset();
            let grid = e.game().grid();
            assert!(grid.count_empty() < 16);
            assert!(grid.max_value() <= 8);
            // slid up then left, so the top-left cell is occupied
            assert!(grid.get(0, 0).unwrap() > 0);
        }
    }
}
