use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{Context, Result};
use log::warn;
use twenty48_core::engine::{Direction, GameSession, TileSource};

use crate::store::BestScoreStore;

/// One line of terminal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    NewGame,
    KeepPlaying,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let cmd = match s.trim().to_ascii_lowercase().as_str() {
            "q" | "quit" | "exit" => Command::Quit,
            "n" | "new" | "r" | "restart" => Command::NewGame,
            "c" | "continue" => Command::KeepPlaying,
            "?" | "help" => Command::Help,
            other => Command::Move(other.parse()?),
        };
        Ok(cmd)
    }
}

const HELP: &str = "\
moves: w/a/s/d, h/j/k/l or up/down/left/right
n: new game   c: keep playing after a win   q: quit";

/// Interactive loop: render, read a command, apply it, until `quit` or EOF.
///
/// The best score is saved through `store` whenever the session beats the
/// value that was last persisted.
pub fn run<R, W, S>(
    input: R,
    out: &mut W,
    session: &mut GameSession,
    source: &mut S,
    store: Option<&BestScoreStore>,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    S: TileSource + ?Sized,
{
    let mut persisted = session.best_score();
    writeln!(out, "{HELP}")?;
    render(out, session)?;

    for line in input.lines() {
        let line = line.context("failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(c) => c,
            Err(e) => {
                writeln!(out, "{e} (type ? for help)")?;
                continue;
            }
        };
        match command {
            Command::Quit => break,
            Command::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            Command::NewGame => session.reset(source),
            Command::KeepPlaying => session.acknowledge_win(),
            Command::Move(dir) => {
                if session.is_game_over() {
                    writeln!(out, "game over, type n for a new game")?;
                    continue;
                }
                let outcome = session.apply_move(dir, source);
                if !outcome.changed {
                    writeln!(out, "nothing moves {dir}")?;
                    continue;
                }
            }
        }

        if let Some(store) = store {
            if session.best_score() > persisted {
                // keep playing even if the score file is unwritable
                match store.save_if_higher(session.best_score()) {
                    Ok(_) => persisted = session.best_score(),
                    Err(e) => warn!("could not save best score: {e:#}"),
                }
            }
        }
        render(out, session)?;
    }
    out.flush()?;
    Ok(())
}

fn render<W: Write>(out: &mut W, session: &GameSession) -> Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "score {}   best {}",
        session.score(),
        session.best_score()
    )?;
    write!(out, "{}", session.grid())?;
    if session.shows_win_banner() {
        writeln!(
            out,
            "you reached {}! type c to keep playing or n for a new game",
            session.rules().target
        )?;
    }
    if session.is_game_over() {
        writeln!(out, "game over, final score {}", session.score())?;
    }
    Ok(())
}
