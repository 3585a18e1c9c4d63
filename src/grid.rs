//! The 4x4 cell store.
//!
//! Cells hold tile exponents in `0..=15`: 0 is empty and `v > 0` stands for
//! the tile `2^v`. Cells are addressed by `(x, y)`, row-major
//! (`index = y * 4 + x`).
//!
//! Besides addressing, a grid knows how to mirror/transpose itself
//! ([`Grid::flip`]) and how to pick a canonical orientation from where its
//! tiles sit ([`Grid::heavy_side_flip`]).
//!
//! ```
//! use grid2048::grid::Grid;
//!
//! let grid: Grid = "
//!     ...1
//!     ..32
//!     ..4.
//!     ....
//! ".parse().unwrap();
//! let canonical = grid.heavy_side_flip();
//! assert_eq!(canonical.to_string(), "1...\n23..\n.4..\n....\n");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::direction::Move;
use crate::error::GridError;

/// Side length of the grid.
pub const SIZE: usize = 4;
/// Number of cells in the grid.
pub const CELLS: usize = SIZE * SIZE;
/// Largest storable cell value (tile 32768).
pub const MAX_VALUE: u8 = 15;

const SYMBOLS: &[u8; CELLS] = b".123456789ABCDEF";

/// Fixed 4x4 grid of tile exponents.
///
/// Serializes as its 16 row-major cells; deserializing validates them like
/// [`Grid::from_cells`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "[u8; 16]", into = "[u8; 16]")]
pub struct Grid([u8; CELLS]);

/// Result of [`Grid::heavy_side`].
///
/// `xsum`/`ysum` are signed mass offsets along each axis: every occupied
/// cell pulls toward its side with weight +1, every empty cell with -1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeavySide {
    pub side: Move,
    pub xsum: f64,
    pub ysum: f64,
}

#[inline]
fn offset(x: usize, y: usize) -> Result<usize, GridError> {
    if x < SIZE && y < SIZE {
        Ok(y * SIZE + x)
    } else {
        Err(GridError::Index { x, y })
    }
}

#[inline]
fn check_value(value: u32) -> Result<u8, GridError> {
    if value <= MAX_VALUE as u32 {
        Ok(value as u8)
    } else {
        Err(GridError::ValueRange { value })
    }
}

fn symbol_value(c: char) -> Option<u8> {
    if !c.is_ascii() {
        return None;
    }
    SYMBOLS.iter().position(|&s| s == c as u8).map(|v| v as u8)
}

impl Grid {
    /// A constant empty grid (all zeros).
    pub const EMPTY: Grid = Grid([0; CELLS]);

    /// An empty grid.
    pub fn new() -> Self {
        Grid::EMPTY
    }

    /// Build a grid from 16 row-major cell values, validating each one.
    pub fn from_cells(cells: [u8; CELLS]) -> Result<Self, GridError> {
        for &v in &cells {
            check_value(v as u32)?;
        }
        Ok(Grid(cells))
    }

    /// Build a grid from nested rows (outer = y, inner = x).
    ///
    /// Missing rows or columns stay empty; extra ones are an index error and
    /// values above 15 a range error.
    pub fn from_rows<I, R>(rows: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = u32>,
    {
        let mut grid = Grid::EMPTY;
        for (y, row) in rows.into_iter().enumerate() {
            for (x, v) in row.into_iter().enumerate() {
                let v = check_value(v)?;
                grid.set(x, y, v)?;
            }
        }
        Ok(grid)
    }

    /// Raw row-major cell values.
    #[inline]
    pub fn cells(&self) -> &[u8; CELLS] {
        &self.0
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [u8; CELLS] {
        &mut self.0
    }

    /// Read the cell at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Result<u8, GridError> {
        Ok(self.0[offset(x, y)?])
    }

    /// Write the cell at `(x, y)`. Values above 15 are rejected.
    pub fn set(&mut self, x: usize, y: usize, value: u8) -> Result<(), GridError> {
        let idx = offset(x, y)?;
        self.0[idx] = check_value(value as u32)?;
        Ok(())
    }

    /// Iterate `(x, y, value)` in row-major order (y outer, x inner).
    #[inline]
    pub fn enumerate_cells(&self) -> CellsIter {
        CellsIter { cells: self.0, idx: 0 }
    }

    /// Coordinates of every empty cell, row-major.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.enumerate_cells()
            .filter(|&(_, _, v)| v == 0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    /// Count the number of empty cells.
    #[inline]
    pub fn count_empty(&self) -> usize {
        self.0.iter().filter(|&&v| v == 0).count()
    }

    /// Largest cell value, 0 for an empty grid.
    #[inline]
    pub fn max_value(&self) -> u8 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// Return a mirrored and/or transposed copy of this grid.
    ///
    /// The source cell `(x, y)` lands on `(x', y')` where `x' = 3 - x` if
    /// `flip_x`, `y' = 3 - y` if `flip_y`, and the pair is then swapped if
    /// `swap_xy`. The order (mirror x, mirror y, transpose) is fixed.
    pub fn flip(&self, flip_x: bool, flip_y: bool, swap_xy: bool) -> Grid {
        let mut out = Grid::EMPTY;
        for (x, y, v) in self.enumerate_cells() {
            let xn = if flip_x { SIZE - 1 - x } else { x };
            let yn = if flip_y { SIZE - 1 - y } else { y };
            let (xn, yn) = if swap_xy { (yn, xn) } else { (xn, yn) };
            out.0[yn * SIZE + xn] = v;
        }
        out
    }

    /// Side of the grid where most occupied cells sit.
    ///
    /// Ties between the axes go to the vertical one.
    pub fn heavy_side(&self) -> HeavySide {
        let center = (SIZE as f64 - 1.0) / 2.0;
        let (mut xsum, mut ysum) = (0.0, 0.0);
        for (x, y, v) in self.enumerate_cells() {
            let weight = if v > 0 { 1.0 } else { -1.0 };
            xsum += weight * (x as f64 - center);
            ysum += weight * (y as f64 - center);
        }
        let side = if xsum.abs() > ysum.abs() {
            if xsum > 0.0 { Move::Right } else { Move::Left }
        } else if ysum > 0.0 {
            Move::Down
        } else {
            Move::Up
        };
        HeavySide { side, xsum, ysum }
    }

    /// Flip so the occupied mass ends up top-left, with the dominant axis
    /// laid out horizontally.
    pub fn heavy_side_flip(&self) -> Grid {
        let HeavySide { xsum, ysum, .. } = self.heavy_side();
        self.flip(xsum > 0.0, ysum > 0.0, ysum.abs() > xsum.abs())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.0.chunks(SIZE) {
            for &v in row {
                write!(f, "{}", SYMBOLS[v as usize] as char)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<String> = self
            .0
            .chunks(SIZE)
            .map(|row| row.iter().map(|&v| SYMBOLS[v as usize] as char).collect())
            .collect();
        write!(f, "Grid({})", rows.join("/"))
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Decode four non-blank lines of four symbols from `.123456789ABCDEF`.
    /// Surrounding whitespace on each line is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut grid = Grid::EMPTY;
        let mut y = 0;
        for line in s.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if y >= SIZE {
                return Err(GridError::parse(y + 1, "more than 4 rows"));
            }
            let len = line.chars().count();
            if len != SIZE {
                return Err(GridError::parse(y + 1, format!("expected 4 cells, found {len}")));
            }
            for (x, c) in line.chars().enumerate() {
                let v = symbol_value(c)
                    .ok_or_else(|| GridError::parse(y + 1, format!("unrecognized symbol {c:?}")))?;
                grid.0[y * SIZE + x] = v;
            }
            y += 1;
        }
        if y != SIZE {
            return Err(GridError::parse(y + 1, format!("expected 4 rows, found {y}")));
        }
        Ok(grid)
    }
}

impl TryFrom<[u8; CELLS]> for Grid {
    type Error = GridError;

    fn try_from(cells: [u8; CELLS]) -> Result<Self, Self::Error> {
        Grid::from_cells(cells)
    }
}

impl From<Grid> for [u8; CELLS] {
    fn from(grid: Grid) -> Self {
        grid.0
    }
}

impl TryFrom<[[u8; SIZE]; SIZE]> for Grid {
    type Error = GridError;

    fn try_from(rows: [[u8; SIZE]; SIZE]) -> Result<Self, Self::Error> {
        Grid::from_rows(rows.iter().map(|row| row.iter().map(|&v| v as u32)))
    }
}

/// Iterator over `(x, y, value)` triples in row-major order.
///
/// Holds its own copy of the cells, so it is unaffected by later writes.
pub struct CellsIter {
    cells: [u8; CELLS],
    idx: usize,
}

impl Iterator for CellsIter {
    type Item = (usize, usize, u8);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= CELLS {
            return None;
        }
        let idx = self.idx;
        self.idx += 1;
        Some((idx % SIZE, idx / SIZE, self.cells[idx]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = CELLS - self.idx;
        (left, Some(left))
    }
}

impl ExactSizeIterator for CellsIter {}
