use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::grid::Tile;

/// Source of the two random choices behind a tile spawn: which empty cell,
/// and which value.
///
/// The engine never reaches for a global RNG; callers hand it a source, so
/// tests can script spawns or suppress them entirely.
///
/// A source that declines a cell leaves the grid one tile short, so a reset
/// through [`NoSpawn`] or an exhausted [`ScriptedTiles`] starts with fewer
/// than two tiles. `RngTiles` never declines while an empty cell exists.
/// Values other than 2 and 4 are turned into 2 by the engine.
pub trait TileSource {
    /// Pick an index into the `candidates` empty cells (row-major order).
    /// `None` skips the spawn.
    fn choose_cell(&mut self, candidates: usize) -> Option<usize>;

    /// Pick the value of the new tile: 4 with `four_probability`, else 2.
    fn choose_value(&mut self, four_probability: f64) -> Tile;
}

impl<T: TileSource + ?Sized> TileSource for &mut T {
    #[inline]
    fn choose_cell(&mut self, candidates: usize) -> Option<usize> {
        (**self).choose_cell(candidates)
    }

    #[inline]
    fn choose_value(&mut self, four_probability: f64) -> Tile {
        (**self).choose_value(four_probability)
    }
}

/// Production source backed by any `rand::Rng`: a uniform cell choice and a
/// Bernoulli draw for the value.
///
/// ```
/// use twenty48_core::engine::{RngTiles, TileSource};
/// let mut tiles = RngTiles::seeded(7);
/// let idx = tiles.choose_cell(5).unwrap();
/// assert!(idx < 5);
/// assert_eq!(tiles.choose_value(0.0), 2);
/// assert_eq!(tiles.choose_value(1.0), 4);
/// ```
#[derive(Debug, Clone)]
pub struct RngTiles<R> {
    rng: R,
}

impl<R: Rng> RngTiles<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

}

impl RngTiles<StdRng> {
    /// Deterministic source for reproducible games.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> TileSource for RngTiles<R> {
    fn choose_cell(&mut self, candidates: usize) -> Option<usize> {
        if candidates == 0 {
            return None;
        }
        Some(self.rng.gen_range(0..candidates))
    }

    fn choose_value(&mut self, four_probability: f64) -> Tile {
        if self.rng.gen_bool(four_probability.clamp(0.0, 1.0)) { 4 } else { 2 }
    }
}

/// Never spawns anything. Useful to observe a bare slide.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpawn;

impl TileSource for NoSpawn {
    fn choose_cell(&mut self, _candidates: usize) -> Option<usize> {
        None
    }

    fn choose_value(&mut self, _four_probability: f64) -> Tile {
        2
    }
}

/// Replays a fixed script of cell indices and values.
///
/// Scripted values should be 2 or 4; anything else spawns as 2.
///
/// Cell choices and value choices are queued independently. Once the cell
/// queue runs dry no more tiles spawn; once the value queue runs dry every
/// value is 2. Cell indices are taken modulo the number of candidates.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTiles {
    cells: VecDeque<usize>,
    values: VecDeque<Tile>,
}

impl ScriptedTiles {
    pub fn new<C, V>(cells: C, values: V) -> Self
    where
        C: IntoIterator<Item = usize>,
        V: IntoIterator<Item = Tile>,
    {
        Self {
            cells: cells.into_iter().collect(),
            values: values.into_iter().collect(),
        }
    }

    /// Queue one spawn: the `cell`-th empty cell receives `value`.
    pub fn push(&mut self, cell: usize, value: Tile) -> &mut Self {
        self.cells.push_back(cell);
        self.values.push_back(value);
        self
    }

    /// Number of cell choices left in the script.
    pub fn remaining(&self) -> usize {
        self.cells.len()
    }
}

impl TileSource for ScriptedTiles {
    fn choose_cell(&mut self, candidates: usize) -> Option<usize> {
        if candidates == 0 {
            return None;
        }
        self.cells.pop_front().map(|idx| idx % candidates)
    }

    fn choose_value(&mut self, _four_probability: f64) -> Tile {
        self.values.pop_front().unwrap_or(2)
    }
}
