//! Engine module: the 4x4 grid, direction-agnostic slide/merge, tile
//! spawning behind an injectable random source, and the game session that
//! ties them together.
//!
//! - `Grid` is the board value with rotation and the left slide.
//! - `shift` turns any `Direction` into a left slide by rotating.
//! - `GameSession` owns score, best score and the win/game-over flags.

mod direction;
pub mod grid;
mod ops;
mod session;
mod spawn;

pub use direction::Direction;
pub use grid::{Grid, MAX_TILE, Position, SIZE, Score, Tile, slide_row};
pub use ops::{is_game_over, is_legal, legal_directions, reached_target, shift, spawn_tile};
pub use session::{GameSession, MoveOutcome, Status};
pub use spawn::{NoSpawn, RngTiles, ScriptedTiles, TileSource};
