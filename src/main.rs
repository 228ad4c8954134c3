//! Morris-Rust: play Six or Nine Men's Morris in the terminal.
//!
//! ## Usage
//!
//! - `morris-rust` - Human vs human, nine men's morris
//! - `morris-rust --game-type 6` - Six men's morris
//! - `morris-rust --black-player random --seed 7` - Play against the computer
//! - `morris-rust --white-player alphabeta --depth 4` - Let the search play white
//! - `morris-rust --load game.txt` - Resume a saved game

use std::num::NonZeroU16;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use fastrand::Rng;
use tracing_subscriber::EnvFilter;

use morris_rust::alphabeta::AlphaBetaPlayer;
use morris_rust::board::Side;
use morris_rust::constants::{DEFAULT_SEARCH_DEPTH, MAX_SEARCH_DEPTH};
use morris_rust::console::{ConsoleGame, GameEnd, Terminal};
use morris_rust::game::GameState;
use morris_rust::human::HumanPlayer;
use morris_rust::player::{Player, RandomPlayer};
use morris_rust::rules::{MultiMillCapture, RepeatedMill, Rules};
use morris_rust::save::load_from_path;
use morris_rust::topology::Variant;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum GameType {
    #[value(name = "6")]
    Six,
    #[value(name = "9")]
    Nine,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PlayerKind {
    Human,
    Random,
    Alphabeta,
}

/// Morris-Rust: Six and Nine Men's Morris in the terminal
#[derive(Parser)]
#[command(name = "morris-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Board variant
    #[arg(long, value_enum, default_value = "9")]
    game_type: GameType,

    #[arg(long, value_enum, default_value = "human")]
    white_player: PlayerKind,

    #[arg(long, value_enum, default_value = "human")]
    black_player: PlayerKind,

    /// Seed for random players (black uses seed + 1)
    #[arg(long)]
    seed: Option<u64>,

    /// Plies the alphabeta players search
    #[arg(
        long,
        default_value_t = DEFAULT_SEARCH_DEPTH,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_SEARCH_DEPTH))
    )]
    depth: u32,

    /// Resume a saved game; its rules replace the rule flags
    #[arg(long)]
    load: Option<PathBuf>,

    /// Sides down to three pieces keep sliding instead of flying
    #[arg(long)]
    no_flying: bool,

    #[arg(long)]
    black_starts: bool,

    /// Pieces in mills can be captured at any time
    #[arg(long)]
    unprotected_mills: bool,

    /// Closing two mills at once earns two captures
    #[arg(long)]
    capture_per_mill: bool,

    /// Re-forming the mill behind the last capture earns another capture
    #[arg(long)]
    allow_repeated_mills: bool,

    /// Declare a draw after this many plies without a capture
    #[arg(long)]
    draw_after: Option<NonZeroU16>,
}

impl Cli {
    fn rules(&self) -> Rules {
        let variant = match self.game_type {
            GameType::Six => Variant::SixMen,
            GameType::Nine => Variant::NineMen,
        };
        Rules::new(variant)
            .with_flying(!self.no_flying)
            .with_white_starts(!self.black_starts)
            .with_protect_mills(!self.unprotected_mills)
            .with_multi_mill(if self.capture_per_mill {
                MultiMillCapture::PerMill
            } else {
                MultiMillCapture::Single
            })
            .with_repeated_mill(if self.allow_repeated_mills {
                RepeatedMill::Allow
            } else {
                RepeatedMill::Deny
            })
            .with_draw_after(self.draw_after)
    }

    fn player(&self, side: Side, terminal: &Terminal) -> Box<dyn Player> {
        let (kind, offset) = match side {
            Side::White => (self.white_player, 0),
            Side::Black => (self.black_player, 1),
        };
        match kind {
            PlayerKind::Human => Box::new(HumanPlayer::new(side.to_string(), terminal.clone())),
            PlayerKind::Random => {
                let rng = match self.seed {
                    Some(seed) => Rng::with_seed(seed.wrapping_add(offset)),
                    None => Rng::new(),
                };
                Box::new(RandomPlayer::new(format!("{side} (random)"), rng))
            }
            PlayerKind::Alphabeta => Box::new(AlphaBetaPlayer::new(
                format!("{side} (alphabeta)"),
                self.depth,
            )),
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let state = match &cli.load {
        Some(path) => load_from_path(path)?,
        None => GameState::new(cli.rules()),
    };

    let terminal = Terminal::stdio();
    let white = cli.player(Side::White, &terminal);
    let black = cli.player(Side::Black, &terminal);
    let mut game = ConsoleGame::new(state, white, black, terminal);

    match game.run() {
        Ok(GameEnd::Finished(_) | GameEnd::Quit) => Ok(ExitCode::SUCCESS),
        Err(err) if err.is_fatal() => bail!(err),
        Err(err) => {
            tracing::error!(%err, "game stopped");
            Ok(ExitCode::FAILURE)
        }
    }
}
