use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::grid::{Grid, Position, Score, Tile};
use super::ops;
use super::spawn::TileSource;
use crate::rules::Rules;

/// Coarse state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Playing,
    /// The target tile has appeared; moves are still accepted.
    Won,
    /// Board full with no merge left. Only `reset` leaves this state.
    GameOver,
}

/// What a single `apply_move` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// False when the direction had no effect (or the game was already over).
    pub changed: bool,
    /// Points earned by merges during this move.
    pub earned: Score,
    /// Tile spawned after the slide, if any.
    pub spawned: Option<(Position, Tile)>,
    /// True only on the move that first reached the target.
    pub reached_target: bool,
    /// True only on the move that ended the game.
    pub ended_game: bool,
}

/// One game: the grid, the running score, the best score carried in from the
/// caller, and the win/game-over flags.
///
/// The session never persists anything. The caller loads the best score,
/// passes it to [`GameSession::new`], and reads [`GameSession::best_score`]
/// back to decide whether to save.
///
/// ```
/// use twenty48_core::engine::{Direction, GameSession, RngTiles};
/// use twenty48_core::Rules;
/// let mut tiles = RngTiles::seeded(1);
/// let mut game = GameSession::new(Rules::default(), 0, &mut tiles);
/// assert_eq!(game.grid().count_empty(), 14);
/// let outcome = game.apply_move(Direction::Up, &mut tiles);
/// assert!(game.score() >= outcome.earned);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SavedSession")]
pub struct GameSession {
    grid: Grid,
    score: Score,
    best_score: Score,
    won: bool,
    win_acknowledged: bool,
    game_over: bool,
    rules: Rules,
}

/// Wire form of a session. `game_over` is ignored and re-derived from the grid.
#[derive(Deserialize)]
struct SavedSession {
    grid: Grid,
    score: Score,
    best_score: Score,
    won: bool,
    win_acknowledged: bool,
    rules: Rules,
}

impl TryFrom<SavedSession> for GameSession {
    type Error = anyhow::Error;

    fn try_from(saved: SavedSession) -> anyhow::Result<Self> {
        saved.rules.validate()?;
        let won = saved.won || ops::reached_target(saved.grid, saved.rules.target);
        Ok(Self {
            grid: saved.grid,
            score: saved.score,
            best_score: saved.best_score.max(saved.score),
            won,
            win_acknowledged: won && saved.win_acknowledged,
            game_over: ops::is_game_over(saved.grid),
            rules: saved.rules,
        })
    }
}

impl GameSession {
    /// Start a fresh game: empty grid plus two spawned tiles.
    pub fn new<S: TileSource + ?Sized>(rules: Rules, best_score: Score, source: &mut S) -> Self {
        let mut session = Self::from_grid(Grid::EMPTY, rules, best_score);
        session.reset(source);
        session
    }

    /// Resume from an existing grid with a zero score. Flags are derived from
    /// the grid itself.
    pub fn from_grid(grid: Grid, rules: Rules, best_score: Score) -> Self {
        Self {
            grid,
            score: 0,
            best_score,
            won: ops::reached_target(grid, rules.target),
            win_acknowledged: false,
            game_over: ops::is_game_over(grid),
            rules,
        }
    }

    /// Throw the current game away and deal a new two-tile board. The best
    /// score survives.
    pub fn reset<S: TileSource + ?Sized>(&mut self, source: &mut S) {
        let mut grid = Grid::EMPTY;
        ops::spawn_tile(&mut grid, source, &self.rules);
        ops::spawn_tile(&mut grid, source, &self.rules);
        self.grid = grid;
        self.score = 0;
        self.won = false;
        self.win_acknowledged = false;
        self.game_over = false;
        debug!("new game, best score {}", self.best_score);
    }

    /// Slide in `direction`. If the grid changed: bank the merge points,
    /// spawn one tile, then update the win latch and the game-over flag.
    /// A move that changes nothing, or any move after game over, is a no-op.
    pub fn apply_move<S: TileSource + ?Sized>(
        &mut self,
        direction: Direction,
        source: &mut S,
    ) -> MoveOutcome {
        if self.game_over {
            return MoveOutcome::default();
        }
        let (mut grid, earned) = ops::shift(self.grid, direction);
        if grid == self.grid {
            return MoveOutcome::default();
        }

        self.score += earned;
        self.best_score = self.best_score.max(self.score);
        let spawned = ops::spawn_tile(&mut grid, source, &self.rules);
        self.grid = grid;

        let mut outcome = MoveOutcome {
            changed: true,
            earned,
            spawned,
            ..MoveOutcome::default()
        };
        if !self.won && ops::reached_target(grid, self.rules.target) {
            self.won = true;
            outcome.reached_target = true;
            info!("reached {} with score {}", self.rules.target, self.score);
        }
        if ops::is_game_over(grid) {
            self.game_over = true;
            outcome.ended_game = true;
            info!(
                "game over: score {}, highest tile {}",
                self.score,
                grid.highest_tile()
            );
        }
        outcome
    }

    /// Dismiss the win banner and keep playing. The win itself stays latched.
    pub fn acknowledge_win(&mut self) {
        if self.won {
            self.win_acknowledged = true;
        }
    }

    /// True while a win should be announced to the player.
    pub fn shows_win_banner(&self) -> bool {
        self.won && !self.win_acknowledged && !self.game_over
    }

    pub fn status(&self) -> Status {
        if self.game_over {
            Status::GameOver
        } else if self.won {
            Status::Won
        } else {
            Status::Playing
        }
    }

    /// Directions that would currently change the grid.
    pub fn legal_directions(&self) -> Vec<Direction> {
        if self.game_over {
            return Vec::new();
        }
        ops::legal_directions(self.grid)
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    #[inline]
    pub fn best_score(&self) -> Score {
        self.best_score
    }

    #[inline]
    pub fn has_won(&self) -> bool {
        self.won
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[inline]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{NoSpawn, RngTiles, ScriptedTiles};

    fn grid(rows: [[Tile; 4]; 4]) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    const STUCK: [[Tile; 4]; 4] = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];

    #[test]
    fn new_game_has_two_tiles() {
        for seed in 0..50 {
            let mut tiles = RngTiles::seeded(seed);
            let game = GameSession::new(Rules::default(), 10, &mut tiles);
            assert_eq!(game.grid().count_empty(), 14);
            assert!(game.grid().rows().iter().flatten().all(|&v| v == 0 || v == 2 || v == 4));
            assert_eq!(game.score(), 0);
            assert_eq!(game.best_score(), 10);
            assert_eq!(game.status(), Status::Playing);
        }
    }

    #[test]
    fn move_left_merges_pair() {
        let start = grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut game = GameSession::from_grid(start, Rules::default(), 0);
        let outcome = game.apply_move(Direction::Left, &mut NoSpawn);
        assert!(outcome.changed);
        assert_eq!(outcome.earned, 4);
        assert_eq!(outcome.spawned, None);
        assert_eq!(game.grid().rows()[0], [4, 0, 0, 0]);
        assert_eq!(game.score(), 4);
        assert_eq!(game.best_score(), 4);
    }

    #[test]
    fn unchanged_move_is_noop() {
        let start = grid([[2, 4, 8, 16], [0; 4], [0; 4], [0; 4]]);
        let mut game = GameSession::from_grid(start, Rules::default(), 0);
        let mut tiles = ScriptedTiles::new([0], [2]);
        let outcome = game.apply_move(Direction::Left, &mut tiles);
        assert!(!outcome.changed);
        assert_eq!(outcome, MoveOutcome::default());
        assert_eq!(*game.grid(), start);
        assert_eq!(game.score(), 0);
        assert_eq!(tiles.remaining(), 1);
    }

    #[test]
    fn changed_move_spawns_one_tile() {
        let start = grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut game = GameSession::from_grid(start, Rules::default(), 0);
        let mut tiles = ScriptedTiles::new([0], [4]);
        let outcome = game.apply_move(Direction::Left, &mut tiles);
        // first empty cell after the slide is (0, 1)
        assert_eq!(outcome.spawned, Some((Position::new(0, 1), 4)));
        assert_eq!(game.grid().rows()[0], [4, 4, 0, 0]);
    }

    #[test]
    fn stuck_board_rejects_moves() {
        let mut game = GameSession::from_grid(grid(STUCK), Rules::default(), 7);
        assert!(game.is_game_over());
        assert_eq!(game.status(), Status::GameOver);
        for dir in Direction::ALL {
            let outcome = game.apply_move(dir, &mut RngTiles::seeded(0));
            assert!(!outcome.changed);
        }
        assert_eq!(game.score(), 0);
        assert_eq!(game.best_score(), 7);
        assert_eq!(*game.grid(), grid(STUCK));
        assert!(game.legal_directions().is_empty());
    }

    #[test]
    fn move_that_fills_board_ends_game() {
        // Sliding left merges the 4s, the spawned 2 closes the last hole.
        let start = grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [8, 16, 4, 4]]);
        let mut game = GameSession::from_grid(start, Rules::default(), 0);
        let outcome = game.apply_move(Direction::Left, &mut ScriptedTiles::new([0], [2]));
        assert!(outcome.changed);
        assert_eq!(game.grid().rows()[3], [8, 16, 8, 2]);
        assert!(outcome.ended_game);
        assert!(game.is_game_over());
    }

    #[test]
    fn win_latches() {
        let start = grid([[1024, 1024, 2048, 0], [0; 4], [0; 4], [0; 4]]);
        let rules = Rules::default();
        let game = GameSession::from_grid(start, rules, 0);
        // from_grid already sees the 2048
        assert!(game.has_won());

        let start = grid([[1024, 1024, 0, 0], [0; 4], [0; 4], [512, 512, 2, 0]]);
        let mut game = GameSession::from_grid(start, rules, 0);
        assert!(!game.has_won());
        let outcome = game.apply_move(Direction::Left, &mut NoSpawn);
        assert!(outcome.reached_target);
        assert_eq!(game.status(), Status::Won);

        let outcome = game.apply_move(Direction::Right, &mut NoSpawn);
        assert!(outcome.changed);
        assert!(!outcome.reached_target);
        assert!(game.has_won());
    }

    #[test]
    fn win_survives_merging_target_away() {
        let start = grid([[1024, 1024, 2048, 0], [0; 4], [0; 4], [0; 4]]);
        let mut game = GameSession::from_grid(start, Rules::default(), 0);
        game.apply_move(Direction::Left, &mut NoSpawn);
        assert_eq!(game.grid().rows()[0], [2048, 2048, 0, 0]);
        game.apply_move(Direction::Left, &mut NoSpawn);
        assert_eq!(game.grid().rows()[0], [4096, 0, 0, 0]);
        assert!(game.has_won());
    }

    #[test]
    fn custom_target() {
        let rules = Rules { target: 8, ..Rules::default() };
        let start = grid([[4, 4, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut game = GameSession::from_grid(start, rules, 0);
        assert!(game.apply_move(Direction::Right, &mut NoSpawn).reached_target);
    }

    #[test]
    fn keep_playing_hides_banner_but_keeps_win() {
        let start = grid([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut game = GameSession::from_grid(start, Rules::default(), 0);
        game.acknowledge_win();
        assert!(!game.shows_win_banner());
        game.apply_move(Direction::Left, &mut NoSpawn);
        assert!(game.shows_win_banner());
        game.acknowledge_win();
        assert!(!game.shows_win_banner());
        assert!(game.has_won());
    }

    #[test]
    fn reset_clears_everything_but_best() {
        let start = grid([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut game = GameSession::from_grid(start, Rules::default(), 100);
        game.apply_move(Direction::Left, &mut NoSpawn);
        assert_eq!(game.best_score(), 2048);
        game.reset(&mut RngTiles::seeded(11));
        assert_eq!(game.score(), 0);
        assert_eq!(game.best_score(), 2048);
        assert!(!game.has_won());
        assert!(!game.is_game_over());
        assert_eq!(game.grid().count_empty(), 14);
    }

    #[test]
    fn random_play_keeps_invariants() {
        let mut tiles = RngTiles::seeded(2024);
        let mut game = GameSession::new(Rules::default(), 0, &mut tiles);
        let mut last_score = 0;
        let mut steps = 0;
        while !game.is_game_over() && steps < 5_000 {
            let dir = Direction::ALL[steps % 4];
            game.apply_move(dir, &mut tiles);
            assert!(game.score() >= last_score);
            assert!(game.best_score() >= game.score());
            assert!(game
                .grid()
                .rows()
                .iter()
                .flatten()
                .all(|&v| v == 0 || (v >= 2 && v.is_power_of_two())));
            last_score = game.score();
            steps += 1;
        }
        assert!(game.score() > 0);
    }

    #[test]
    fn reset_with_declining_source_places_nothing() {
        let mut game = GameSession::new(Rules::default(), 0, &mut NoSpawn);
        assert_eq!(*game.grid(), Grid::EMPTY);
        game.reset(&mut ScriptedTiles::new([3], [4]));
        assert_eq!(game.grid().count_empty(), 15);
    }

    const SAVED: &str = r#"{"grid":GRID,"score":40,"best_score":12,"won":false,
        "win_acknowledged":true,"game_over":false,
        "rules":{"target":2048,"four_probability":0.1}}"#;

    fn load(grid_json: &str) -> serde_json::Result<GameSession> {
        serde_json::from_str(&SAVED.replace("GRID", grid_json))
    }

    #[test]
    fn loading_rejects_invalid_cells() {
        assert!(load("[[3,5,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]]").is_err());
        assert!(load("[[2,4,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]]").is_ok());
    }

    #[test]
    fn loading_rederives_flags() {
        let game = load("[[2,4,2,4],[4,2,4,2],[2,4,2,4],[4,2,4,2]]").unwrap();
        assert!(game.is_game_over());
        assert_eq!(game.best_score(), 40);
        assert!(!game.has_won());

        let game = load("[[2048,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]]").unwrap();
        assert!(game.has_won());
        assert!(!game.shows_win_banner());
        assert!(!game.is_game_over());
    }

    #[test]
    fn loading_rejects_bad_rules() {
        let json = SAVED
            .replace("GRID", "[[2,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]]")
            .replace("\"target\":2048", "\"target\":1000");
        assert!(serde_json::from_str::<GameSession>(&json).is_err());
    }

    #[test]
    fn session_serializes() {
        let game = GameSession::new(Rules::default(), 5, &mut RngTiles::seeded(9));
        let json = serde_json::to_string(&game).unwrap();
        let back: GameSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, game);
    }
}
