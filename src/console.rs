//! Console front end.
//!
//! [`ConsoleGame`] drives a game between two [`Player`]s and prints the
//! dialogue to a [`Terminal`]. Human players read their commands from the
//! same terminal.
//!
//! ## Commands
//!
//! - `help` - List commands and the legal moves
//! - `quit` / `q` - Leave the game (any case)
//! - `save <path>` - Write the current game to a file
//! - `A1` - Place a piece, or name the piece to capture
//! - `A1A4` - Move a piece from A1 to A4
//!
//! A move and its capture may share a line, e.g. `G1 B2`.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, BufRead, Cursor, Write};
use std::rc::Rc;

use tracing::{info, warn};

use crate::error::GameError;
use crate::game::{GameState, Outcome, PlyReport};
use crate::player::Player;

pub const HELP: &str = "\
Commands:
  help          show this text and the legal moves
  quit, q       leave the game
  save <path>   save the game to a file
  A1            place a piece on A1, or capture the piece on A1
  A1A4          move the piece on A1 to A4";

/// Line-oriented input and output shared by the game loop and human players.
#[derive(Clone)]
pub struct Terminal {
    input: Rc<RefCell<dyn BufRead>>,
    output: Rc<RefCell<dyn Write>>,
}

impl Terminal {
    pub fn new(input: Rc<RefCell<dyn BufRead>>, output: Rc<RefCell<dyn Write>>) -> Self {
        Self { input, output }
    }

    pub fn stdio() -> Self {
        Self::new(
            Rc::new(RefCell::new(io::stdin().lock())),
            Rc::new(RefCell::new(io::stdout())),
        )
    }

    /// A terminal reading `script` and writing into the returned buffer.
    pub fn scripted(script: &str) -> (Self, Rc<RefCell<Vec<u8>>>) {
        let output = Rc::new(RefCell::new(Vec::new()));
        let terminal = Self::new(
            Rc::new(RefCell::new(Cursor::new(script.as_bytes().to_vec()))),
            output.clone(),
        );
        (terminal, output)
    }

    /// Next input line without its line ending, or `None` at end of input.
    pub fn read_line(&self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.borrow_mut().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    pub fn say(&self, text: impl fmt::Display) {
        let mut out = self.output.borrow_mut();
        if let Err(err) = writeln!(out, "{text}").and_then(|()| out.flush()) {
            warn!(%err, "failed to write to the terminal");
        }
    }
}

/// One parsed input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Empty,
    Help,
    Quit,
    Save(Option<String>),
    /// Anything else: move tokens, checked against the game later.
    Tokens(Vec<String>),
}

pub fn parse_command(line: &str) -> Command {
    let mut parts = line.split_whitespace();
    let Some(first) = parts.next() else {
        return Command::Empty;
    };
    match first.to_lowercase().as_str() {
        "help" => Command::Help,
        "quit" | "q" => Command::Quit,
        "save" => {
            let rest = line.trim_start()[first.len()..].trim();
            Command::Save((!rest.is_empty()).then(|| rest.to_string()))
        }
        _ => Command::Tokens(line.split_whitespace().map(str::to_string).collect()),
    }
}

/// How a console session ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameEnd {
    Finished(Outcome),
    Quit,
}

pub struct ConsoleGame {
    state: GameState,
    players: [Box<dyn Player>; 2],
    terminal: Terminal,
}

impl ConsoleGame {
    pub fn new(
        state: GameState,
        white: Box<dyn Player>,
        black: Box<dyn Player>,
        terminal: Terminal,
    ) -> Self {
        Self {
            state,
            players: [white, black],
            terminal,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Run the game until it ends, a player quits or a fatal error occurs.
    pub fn run(&mut self) -> Result<GameEnd, GameError> {
        info!(
            variant = %self.state.rules().variant,
            white = self.players[0].name(),
            black = self.players[1].name(),
            "game started"
        );
        self.terminal.say(self.state.board());

        while !self.state.is_over() {
            let side = self.state.side_to_move();
            let legal = self.state.legal_moves();
            let player = &mut self.players[side.index()];

            let mv = match player.produce_move(&self.state, &legal) {
                Ok(mv) => mv,
                Err(GameError::InputClosed) => {
                    self.terminal.say(format!("{side} resigns: input closed."));
                    self.state.resign(side)?;
                    break;
                }
                Err(GameError::Quit) => {
                    info!(%side, "quit requested");
                    self.terminal.say("Bye.");
                    return Ok(GameEnd::Quit);
                }
                Err(err) => return Err(err),
            };

            match self.state.play(side, mv) {
                Ok(report) => self.report(&report),
                Err(err @ GameError::RuleViolation { .. }) => {
                    self.terminal.say(format!("{}.", capitalize(&err.to_string())));
                    player.notify_rejected(&err);
                }
                Err(err) => return Err(err),
            }
        }

        let outcome = self
            .state
            .outcome()
            .ok_or_else(|| GameError::internal("game loop ended without an outcome"))?;
        self.terminal.say(format!("{outcome}."));
        info!(%outcome, "game over");
        Ok(GameEnd::Finished(outcome))
    }

    fn report(&self, report: &PlyReport) {
        let topo = self.state.board().topology();
        self.terminal
            .say(format!("{} {}.", report.side, report.mv.describe(topo)));
        if report.captures_owed > 0 {
            let noun = if report.captures_owed == 1 { "piece" } else { "pieces" };
            self.terminal.say(format!(
                "{} formed a mill and removes {} {noun}.",
                report.side, report.captures_owed
            ));
        } else {
            self.terminal.say(self.state.board());
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
