//! Mapping raw player input (key names, swipe gestures) onto directions.

use crate::engine::Direction;

/// Minimum swipe length, in pixels, before a gesture counts as a move.
pub const DEFAULT_SWIPE_DISTANCE: f64 = 30.0;

/// Map a DOM-style arrow key name to a direction.
pub fn direction_for_key(key: &str) -> Option<Direction> {
    match key {
        "ArrowLeft" => Some(Direction::Left),
        "ArrowRight" => Some(Direction::Right),
        "ArrowUp" => Some(Direction::Up),
        "ArrowDown" => Some(Direction::Down),
        _ => None,
    }
}

/// Map a swipe from start to end to a direction.
///
/// `dx`/`dy` are in screen coordinates (y grows downward). Short swipes on
/// both axes are ignored; otherwise the longer axis wins, ties going vertical.
///
/// ```
/// use twenty48_core::Direction;
/// use twenty48_core::input::{DEFAULT_SWIPE_DISTANCE, direction_for_swipe};
/// assert_eq!(direction_for_swipe(-80.0, 10.0, DEFAULT_SWIPE_DISTANCE), Some(Direction::Left));
/// assert_eq!(direction_for_swipe(5.0, 5.0, DEFAULT_SWIPE_DISTANCE), None);
/// ```
pub fn direction_for_swipe(dx: f64, dy: f64, min_distance: f64) -> Option<Direction> {
    if !dx.is_finite() || !dy.is_finite() {
        return None;
    }
    if dx.abs() < min_distance && dy.abs() < min_distance {
        return None;
    }
    let dir = if dx.abs() > dy.abs() {
        if dx > 0.0 { Direction::Right } else { Direction::Left }
    } else if dy > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    };
    Some(dir)
}
