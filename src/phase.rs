//! Per-side piece accounting and the Placing/Moving/Flying phase.
//!
//! The phase is never stored. It follows from how many pieces a side still
//! has to place and how many it has left on the board, which makes the
//! transitions one-way by construction: pieces in hand only go down, and so
//! do pieces on the board once placing is over.

use std::fmt;

use crate::constants::FLYING_PIECES;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Placing,
    Moving,
    Flying,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Placing => write!(f, "placing"),
            Phase::Moving => write!(f, "moving"),
            Phase::Flying => write!(f, "flying"),
        }
    }
}

/// Piece counters for one side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SideState {
    allotted: u8,
    in_hand: u8,
    lost: u8,
}

impl SideState {
    pub fn new(allotted: u8) -> Self {
        Self {
            allotted,
            in_hand: allotted,
            lost: 0,
        }
    }

    /// Rebuild counters from a restored board. Returns `None` when the board
    /// holds more pieces than the side has placed.
    pub fn restore(allotted: u8, in_hand: u8, on_board: usize) -> Option<Self> {
        let placed = allotted.checked_sub(in_hand)?;
        let on_board = u8::try_from(on_board).ok()?;
        let lost = placed.checked_sub(on_board)?;
        Some(Self {
            allotted,
            in_hand,
            lost,
        })
    }

    pub fn allotted(&self) -> u8 {
        self.allotted
    }

    pub fn in_hand(&self) -> u8 {
        self.in_hand
    }

    pub fn placed(&self) -> u8 {
        self.allotted - self.in_hand
    }

    /// Pieces captured by the opponent.
    pub fn lost(&self) -> u8 {
        self.lost
    }

    pub fn on_board(&self) -> usize {
        (self.placed() - self.lost) as usize
    }

    /// Pieces still in play, on the board or in hand.
    pub fn remaining(&self) -> usize {
        self.on_board() + self.in_hand as usize
    }

    pub fn phase(&self, flying: bool) -> Phase {
        if self.in_hand > 0 {
            Phase::Placing
        } else if flying && self.on_board() <= FLYING_PIECES {
            Phase::Flying
        } else {
            Phase::Moving
        }
    }

    pub(crate) fn record_placement(&mut self) {
        debug_assert!(self.in_hand > 0, "placement with an empty hand");
        self.in_hand -= 1;
    }

    pub(crate) fn record_loss(&mut self) {
        debug_assert!(self.on_board() > 0, "capture of a side with no pieces");
        self.lost += 1;
    }
}
