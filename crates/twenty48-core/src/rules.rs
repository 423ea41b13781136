//! Tunable game constants: the winning tile and the chance of spawning a 4.

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use crate::engine::Tile;

/// Rules a session is played under.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Tile value whose first appearance marks the game as won.
    #[serde(default = "defaults::target")]
    pub target: Tile,

    /// Probability that a spawned tile is a 4 rather than a 2.
    #[serde(default = "defaults::four_probability")]
    pub four_probability: f64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            target: defaults::target(),
            four_probability: defaults::four_probability(),
        }
    }
}

impl Rules {
    /// Reject targets that can never appear and probabilities outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.target >= 4 && self.target.is_power_of_two(),
            "target must be a power of two >= 4, got {}",
            self.target
        );
        ensure!(
            self.four_probability.is_finite() && (0.0..=1.0).contains(&self.four_probability),
            "four_probability must be within [0, 1], got {}",
            self.four_probability
        );
        Ok(())
    }

    /// Resolve the 4-probability to the default (0.1) if it is not usable.
    pub fn four_probability_or_default(&self) -> f64 {
        match self.four_probability {
            p if p.is_finite() && (0.0..=1.0).contains(&p) => p,
            _ => defaults::four_probability(),
        }
    }
}

mod defaults {
    use crate::engine::Tile;

    pub fn target() -> Tile { 2048 }
    pub fn four_probability() -> f64 { 0.1 }
}
