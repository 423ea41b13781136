use std::fmt;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Side length of the board.
pub const SIZE: usize = 4;

/// Largest tile a 4x4 board can hold (2^17).
pub const MAX_TILE: Tile = 1 << 17;

/// Cell value: 0 for empty, otherwise a power of two >= 2.
pub type Tile = u32;
/// Points accumulated from merges.
pub type Score = u64;

/// Row/column coordinate of a cell, (0, 0) is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

/// The 4x4 board, stored row-major.
///
/// A `Grid` is a plain value: every operation that changes it returns a new
/// grid, except `set` which is reserved for tile spawning inside the engine.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "[[Tile; SIZE]; SIZE]", into = "[[Tile; SIZE]; SIZE]")]
pub struct Grid([[Tile; SIZE]; SIZE]);

impl Grid {
    /// A constant empty grid (all zeros).
    pub const EMPTY: Grid = Grid([[0; SIZE]; SIZE]);

    /// Build a grid from rows, rejecting values that are not 0 or a power of
    /// two in `2..=MAX_TILE`.
    ///
    /// ```
    /// use twenty48_core::engine::Grid;
    /// let g = Grid::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// assert_eq!(g.count_empty(), 14);
    /// assert!(Grid::from_rows([[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    /// ```
    pub fn from_rows(rows: [[Tile; SIZE]; SIZE]) -> Result<Self> {
        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                ensure!(
                    is_valid_tile(value),
                    "cell ({r}, {c}) holds {value}, expected 0 or a power of two in 2..={MAX_TILE}"
                );
            }
        }
        Ok(Grid(rows))
    }

    /// Borrow the rows of the grid.
    #[inline]
    pub fn rows(&self) -> &[[Tile; SIZE]; SIZE] {
        &self.0
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Tile {
        self.0[pos.row][pos.col]
    }

    #[inline]
    pub(crate) fn set(&mut self, pos: Position, value: Tile) {
        debug_assert!(is_valid_tile(value));
        self.0[pos.row][pos.col] = value;
    }

    /// Coordinates of every empty cell, row-major.
    pub fn empty_cells(&self) -> Vec<Position> {
        self.positions().filter(|&p| self.get(p) == 0).collect()
    }

    pub fn count_empty(&self) -> usize {
        self.0.iter().flatten().filter(|&&v| v == 0).count()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.0.iter().flatten().all(|&v| v != 0)
    }

    /// Highest tile value on the board, 0 for an empty grid.
    pub fn highest_tile(&self) -> Tile {
        self.0.iter().flatten().copied().max().unwrap_or(0)
    }

    /// True if two horizontally or vertically adjacent tiles share a value.
    pub fn has_mergeable_pair(&self) -> bool {
        self.positions().any(|Position { row, col }| {
            let v = self.0[row][col];
            v != 0
                && ((col + 1 < SIZE && self.0[row][col + 1] == v)
                    || (row + 1 < SIZE && self.0[row + 1][col] == v))
        })
    }

    /// Rotate the grid 90 degrees clockwise.
    ///
    /// ```
    /// use twenty48_core::engine::Grid;
    /// let g = Grid::from_rows([[2, 4, 8, 16], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// assert_eq!(g.rotate_cw().rows()[0], [0, 0, 0, 2]);
    /// assert_eq!(g.rotate_cw().rotate_cw().rotate_cw().rotate_cw(), g);
    /// ```
    pub fn rotate_cw(self) -> Grid {
        let mut out = [[0; SIZE]; SIZE];
        for (r, row) in self.0.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                out[c][SIZE - 1 - r] = v;
            }
        }
        Grid(out)
    }

    /// Apply `turns` clockwise quarter turns.
    pub fn rotated(self, turns: usize) -> Grid {
        (0..turns % 4).fold(self, |g, _| g.rotate_cw())
    }

    /// Slide every row to the left, merging equal neighbours once each.
    /// Returns the new grid and the points earned by the merges.
    pub fn slide_left(self) -> (Grid, Score) {
        let mut out = [[0; SIZE]; SIZE];
        let mut earned = 0;
        for (dst, &row) in out.iter_mut().zip(self.0.iter()) {
            let (slid, gained) = slide_row(row);
            *dst = slid;
            earned += gained;
        }
        (Grid(out), earned)
    }

    fn positions(&self) -> impl Iterator<Item = Position> {
        (0..SIZE).flat_map(|row| (0..SIZE).map(move |col| Position { row, col }))
    }
}

/// Compact a row toward index 0, merging the leftmost equal pairs first.
///
/// A tile produced by a merge never merges again in the same slide, so
/// `[2, 2, 2, 2]` becomes `[4, 4, 0, 0]` and earns 8.
pub fn slide_row(row: [Tile; SIZE]) -> ([Tile; SIZE], Score) {
    let mut out = [0; SIZE];
    let mut earned = 0;
    let mut len = 0;
    let mut tiles = row.iter().copied().filter(|&v| v != 0).peekable();
    while let Some(v) = tiles.next() {
        if tiles.next_if_eq(&v).is_some() {
            out[len] = v * 2;
            earned += Score::from(v * 2);
        } else {
            out[len] = v;
        }
        len += 1;
    }
    (out, earned)
}

#[inline]
pub(crate) fn is_valid_tile(value: Tile) -> bool {
    value == 0 || ((2..=MAX_TILE).contains(&value) && value.is_power_of_two())
}

fn format_val(val: Tile) -> String {
    if val == 0 {
        return " ".repeat(7);
    }
    format!("{val:^7}")
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid({:?})", self.0)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(SIZE * 8 - 1);
        for (r, row) in self.0.iter().enumerate() {
            if r > 0 {
                writeln!(f, "{rule}")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

impl From<Grid> for [[Tile; SIZE]; SIZE] {
    fn from(g: Grid) -> Self {
        g.0
    }
}

impl TryFrom<[[Tile; SIZE]; SIZE]> for Grid {
    type Error = anyhow::Error;

    fn try_from(rows: [[Tile; SIZE]; SIZE]) -> Result<Self> {
        Grid::from_rows(rows)
    }
}
