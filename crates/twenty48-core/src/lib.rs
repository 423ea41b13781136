//! A 2048 puzzle engine.
//!
//! The engine is synchronous and owns no I/O: randomness comes in through a
//! [`engine::TileSource`], the best score comes in as a plain number, and
//! rendering or persistence is left to the caller.

pub mod engine;
pub mod input;
pub mod rules;

pub use engine::{Direction, GameSession, Grid, MoveOutcome, Status};
pub use rules::Rules;
