//! Morris-Rust: a rules engine for Six and Nine Men's Morris.
//!
//! The engine validates and applies moves, detects mills, resolves captures
//! and decides the end of the game. A small console front end lets humans,
//! random players and a search player play against each other.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions, piece counts and the save layout
//! - [`topology`] - Points, adjacency and mills of each variant
//! - [`board`] - Occupancy of the points
//! - [`rules`] - Rule switches and their defaults
//! - [`phase`] - Per-side piece accounting and phases
//! - [`mills`] - Mill detection and capture eligibility
//! - [`movegen`] - Move generation and validation
//! - [`game`] - Game state and the apply path
//! - [`player`] - Player trait and the random player
//! - [`alphabeta`] - Depth-limited alpha-beta player
//! - [`human`] - Human player reading the terminal
//! - [`console`] - Console game loop
//! - [`save`] - Save file codec
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```
//! use morris_rust::board::Side;
//! use morris_rust::game::GameState;
//! use morris_rust::movegen::Move;
//! use morris_rust::rules::Rules;
//!
//! let mut game = GameState::new(Rules::default());
//! let a1 = game.board().topology().parse_point("A1").unwrap();
//! game.play(Side::White, Move::Place(a1)).unwrap();
//! assert_eq!(game.side_to_move(), Side::Black);
//! ```

pub mod alphabeta;
pub mod board;
pub mod console;
pub mod constants;
pub mod error;
pub mod game;
pub mod human;
pub mod mills;
pub mod movegen;
pub mod phase;
pub mod player;
pub mod rules;
pub mod save;
pub mod topology;
