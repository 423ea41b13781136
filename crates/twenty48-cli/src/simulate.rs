use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::Serialize;
use twenty48_core::Rules;
use twenty48_core::engine::{GameSession, RngTiles, Score, Tile};

/// Salt that keeps the move stream independent of the spawn stream.
const MOVE_STREAM_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Result of one simulated game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub seed: u64,
    pub moves: u64,
    pub score: Score,
    pub highest_tile: Tile,
    pub won: bool,
    /// False if the game hit the move cap before ending.
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub games: Vec<GameSummary>,
    pub mean_score: f64,
    pub max_score: Score,
    pub highest_tile: Tile,
    pub win_rate: f64,
}

impl SimulationReport {
    pub fn from_games(games: Vec<GameSummary>) -> Self {
        let n = games.len().max(1) as f64;
        let total: Score = games.iter().map(|g| g.score).sum();
        let wins = games.iter().filter(|g| g.won).count();
        Self {
            mean_score: total as f64 / n,
            max_score: games.iter().map(|g| g.score).max().unwrap_or(0),
            highest_tile: games.iter().map(|g| g.highest_tile).max().unwrap_or(0),
            win_rate: wins as f64 / n,
            games,
        }
    }
}

/// Play one game choosing uniformly among the directions that change the board.
pub fn play_random_game(seed: u64, rules: Rules, max_moves: u64) -> GameSummary {
    let mut tiles = RngTiles::seeded(seed);
    let mut chooser = StdRng::seed_from_u64(seed ^ MOVE_STREAM_SALT);
    let mut game = GameSession::new(rules, 0, &mut tiles);
    let mut moves = 0;
    while !game.is_game_over() && moves < max_moves {
        let legal = game.legal_directions();
        let Some(&dir) = legal.choose(&mut chooser) else {
            break;
        };
        game.apply_move(dir, &mut tiles);
        moves += 1;
    }
    GameSummary {
        seed,
        moves,
        score: game.score(),
        highest_tile: game.grid().highest_tile(),
        won: game.has_won(),
        finished: game.is_game_over(),
    }
}

/// Play `games` games in parallel with seeds `base_seed, base_seed + 1, ...`.
pub fn simulate(games: u32, base_seed: u64, rules: Rules, max_moves: u64) -> SimulationReport {
    let summaries: Vec<GameSummary> = (0..games)
        .into_par_iter()
        .map(|i| play_random_game(base_seed.wrapping_add(u64::from(i)), rules, max_moves))
        .collect();
    SimulationReport::from_games(summaries)
}
