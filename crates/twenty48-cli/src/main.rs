mod config;
mod play;
mod simulate;
mod store;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use twenty48_core::engine::{GameSession, RngTiles};

use config::Config;
use store::BestScoreStore;

#[derive(Debug, Parser)]
#[command(author, version, about = "Play 2048 in the terminal, or simulate random games")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE", global = true, value_parser = clap::value_parser!(PathBuf))]
    config: Option<PathBuf>,

    /// Seed for tile spawns; overrides the config file
    #[arg(long, value_name = "N", global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play interactively (the default)
    Play {
        /// File holding the best score; overrides the config file
        #[arg(long, value_name = "FILE")]
        best_score_file: Option<PathBuf>,

        /// Do not read or write the best score file
        #[arg(long)]
        no_save: bool,
    },
    /// Play many random games in parallel and report scores
    Simulate {
        /// Number of games (defaults to the config value)
        #[arg(long, value_name = "N")]
        games: Option<u32>,

        /// Move cap per game (defaults to the config value)
        #[arg(long, value_name = "N")]
        max_moves: Option<u64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::load(cli.config.as_deref())?;
    let seed = cli.seed.or(config.seed);
    let command = cli.command.unwrap_or(Command::Play {
        best_score_file: None,
        no_save: false,
    });

    match command {
        Command::Play {
            best_score_file,
            no_save,
        } => {
            let store = (!no_save).then(|| {
                BestScoreStore::new(best_score_file.unwrap_or(config.storage.best_score_file))
            });
            let best = match &store {
                Some(s) => {
                    let best = s.load()?;
                    info!("best score {best} from {}", s.path().display());
                    best
                }
                None => 0,
            };
            let mut tiles = match seed {
                Some(s) => RngTiles::seeded(s),
                None => RngTiles::from_entropy(),
            };
            let mut game = GameSession::new(config.rules, best, &mut tiles);
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            play::run(stdin.lock(), &mut stdout, &mut game, &mut tiles, store.as_ref())?;
            info!("final score {}, best {}", game.score(), game.best_score());
        }
        Command::Simulate {
            games,
            max_moves,
            json,
        } => {
            let games = games.unwrap_or(config.simulate.games);
            let max_moves = max_moves.unwrap_or(config.simulate.max_moves);
            let base_seed = seed.unwrap_or_else(rand::random);
            info!("simulating {games} games from seed {base_seed}");
            let report = simulate::simulate(games, base_seed, config.rules, max_moves);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for g in &report.games {
                    println!(
                        "seed {:>20}  moves {:>6}  score {:>7}  tile {:>5}{}",
                        g.seed,
                        g.moves,
                        g.score,
                        g.highest_tile,
                        if g.won { "  won" } else { "" }
                    );
                }
                println!(
                    "games {}  mean score {:.1}  max score {}  highest tile {}  win rate {:.1}%",
                    report.games.len(),
                    report.mean_score,
                    report.max_score,
                    report.highest_tile,
                    report.win_rate * 100.0
                );
            }
        }
    }
    Ok(())
}
