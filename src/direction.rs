use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::grid::SIZE;

/// A direction to slide/merge tiles.
///
/// Each direction is also identified by a single character code
/// (`L`, `R`, `U`, `D`), which is what the text front-ends speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Left,
    Right,
    Up,
    Down,
}

/// Maps a slide-space coordinate `(x, y)` to the grid coordinate it addresses.
///
/// In slide space tiles always travel toward `x = 0` along row `y`.
type Remap = fn(usize, usize) -> (usize, usize);

fn remap_left(x: usize, y: usize) -> (usize, usize) {
    (x, y)
}

fn remap_right(x: usize, y: usize) -> (usize, usize) {
    (SIZE - 1 - x, y)
}

fn remap_up(x: usize, y: usize) -> (usize, usize) {
    (y, x)
}

fn remap_down(x: usize, y: usize) -> (usize, usize) {
    (y, SIZE - 1 - x)
}

// Indexed by `Move as usize`.
const REMAP: [Remap; 4] = [remap_left, remap_right, remap_up, remap_down];

impl Move {
    /// Action order used by the environment and the bot players ("LDUR").
    pub const ACTIONS: [Move; 4] = [Move::Left, Move::Down, Move::Up, Move::Right];

    /// Single-character code for this direction.
    pub fn code(self) -> char {
        match self {
            Move::Left => 'L',
            Move::Right => 'R',
            Move::Up => 'U',
            Move::Down => 'D',
        }
    }

    /// Parse a direction code. Lowercase codes are accepted.
    pub fn from_code(code: char) -> Result<Self, GridError> {
        match code.to_ascii_uppercase() {
            'L' => Ok(Move::Left),
            'R' => Ok(Move::Right),
            'U' => Ok(Move::Up),
            'D' => Ok(Move::Down),
            _ => Err(GridError::InvalidArgument(format!("invalid direction {code:?}"))),
        }
    }

    /// Direction for an environment action index (see [`Move::ACTIONS`]).
    pub fn from_action(action: usize) -> Option<Self> {
        Move::ACTIONS.get(action).copied()
    }

    #[inline]
    pub(crate) fn remap(self, x: usize, y: usize) -> (usize, usize) {
        REMAP[self as usize](x, y)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Move {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Move::from_code(c),
            _ => Err(GridError::InvalidArgument(format!("invalid direction {trimmed:?}"))),
        }
    }
}
