use log::debug;

use super::direction::Direction;
use super::grid::{Grid, Position, Score, Tile};
use super::spawn::TileSource;
use crate::rules::Rules;

/// Slide/merge tiles in the given direction. No randomness.
///
/// Every direction is reduced to a left slide: rotate the grid so that the
/// direction points left, slide, then rotate back.
pub fn shift(grid: Grid, direction: Direction) -> (Grid, Score) {
    let turns = direction.quarter_turns();
    let (moved, earned) = grid.rotated(turns).slide_left();
    (moved.rotated((4 - turns) % 4), earned)
}

/// True if sliding in `direction` changes the grid.
pub fn is_legal(grid: Grid, direction: Direction) -> bool {
    shift(grid, direction).0 != grid
}

/// Directions that change the grid, in `Direction::ALL` order.
pub fn legal_directions(grid: Grid) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|&d| is_legal(grid, d))
        .collect()
}

/// True if the grid is full and no two neighbours can merge.
pub fn is_game_over(grid: Grid) -> bool {
    grid.is_full() && !grid.has_mergeable_pair()
}

/// True if any tile has reached `target`.
pub fn reached_target(grid: Grid, target: Tile) -> bool {
    grid.highest_tile() >= target
}

/// Place a 2 or 4 on a random empty cell, drawing both choices from `source`.
///
/// Returns where the tile went and its value, or `None` if the source
/// declined. Callers must not spawn onto a full grid.
pub fn spawn_tile<S: TileSource + ?Sized>(
    grid: &mut Grid,
    source: &mut S,
    rules: &Rules,
) -> Option<(Position, Tile)> {
    let empty = grid.empty_cells();
    debug_assert!(!empty.is_empty(), "spawn attempted on a full grid");
    if empty.is_empty() {
        return None;
    }
    let pos = *empty.get(source.choose_cell(empty.len())?)?;
    let value = match source.choose_value(rules.four_probability_or_default()) {
        4 => 4,
        _ => 2,
    };
    grid.set(pos, value);
    debug!("spawned {value} at ({}, {})", pos.row, pos.col);
    Some((pos, value))
}
