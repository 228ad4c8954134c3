//! Engine error types.

use derive_more::{Display, Error};

use crate::board::Side;
use crate::movegen::ActionKind;
use crate::topology::Coord;

/// Why a move was refused.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Violation {
    #[display("the game is over")]
    GameOver,
    #[display("it is {expected}'s turn")]
    NotYourTurn { expected: Side },
    #[display("expected a {expected} move, got a {got} move")]
    WrongAction { expected: ActionKind, got: ActionKind },
    #[display("point {index} is not on this board")]
    UnknownPoint { index: usize },
    #[display("{at} is occupied")]
    Occupied { at: Coord },
    #[display("there is no piece of yours on {at}")]
    NotOwnPiece { at: Coord },
    #[display("{from} is not adjacent to {to}")]
    NotAdjacent { from: Coord, to: Coord },
    #[display("there is no opponent piece on {at}")]
    NotOpponentPiece { at: Coord },
    #[display("{at} is protected by a mill")]
    ProtectedByMill { at: Coord },
}

/// Errors surfaced by the engine, the codec and the players.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GameError {
    /// Illegal move or capture target. The same side tries again.
    #[display("illegal move: {violation}")]
    RuleViolation { violation: Violation },
    /// A save record that does not describe a valid game.
    #[display("corrupt save data: {reason}")]
    CorruptSaveData { reason: String },
    /// The command stream ended while a player was to move.
    #[display("input closed")]
    InputClosed,
    /// The player asked to leave the game.
    #[display("quit requested")]
    Quit,
    /// The engine reached a state its rules cannot produce.
    #[display("internal invariant violated: {reason}")]
    InternalInvariant { reason: String },
}

impl GameError {
    pub fn violation(violation: Violation) -> Self {
        GameError::RuleViolation { violation }
    }

    pub fn corrupt(reason: impl Into<String>) -> Self {
        GameError::CorruptSaveData {
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        GameError::InternalInvariant {
            reason: reason.into(),
        }
    }

    /// Fatal errors end the process; everything else is handled in the loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::InternalInvariant { .. })
    }
}
