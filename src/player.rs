//! Player abstraction.
//!
//! The controller asks whichever player owns the side to move for a move.
//! Players see a read-only view of the game and the legal moves it offers;
//! they never change the state themselves.

use fastrand::Rng;
use tracing::trace;

use crate::error::GameError;
use crate::game::GameState;
use crate::movegen::Move;

pub trait Player {
    fn name(&self) -> &str;

    /// Choose the next move or capture for the side to move.
    ///
    /// `legal` is never empty while the game is running. Returning
    /// [`GameError::InputClosed`] resigns the side, [`GameError::Quit`] ends
    /// the session.
    fn produce_move(&mut self, view: &GameState, legal: &[Move]) -> Result<Move, GameError>;

    /// Called when the controller rejected the last move this player produced.
    fn notify_rejected(&mut self, _error: &GameError) {}
}

/// Picks uniformly among the legal moves.
pub struct RandomPlayer {
    name: String,
    rng: Rng,
}

impl RandomPlayer {
    pub fn new(name: impl Into<String>, rng: Rng) -> Self {
        Self {
            name: name.into(),
            rng,
        }
    }

    pub fn seeded(name: impl Into<String>, seed: u64) -> Self {
        Self::new(name, Rng::with_seed(seed))
    }
}

impl Player for RandomPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn produce_move(&mut self, _view: &GameState, legal: &[Move]) -> Result<Move, GameError> {
        if legal.is_empty() {
            return Err(GameError::internal("asked for a move with no legal moves"));
        }
        let mv = legal[self.rng.usize(..legal.len())];
        trace!(player = %self.name, ?mv, choices = legal.len(), "random pick");
        Ok(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Side;
    use crate::rules::Rules;

    #[test]
    fn test_random_player_picks_legal_move() {
        let state = GameState::new(Rules::default());
        let legal = state.legal_moves();
        let mut player = RandomPlayer::seeded("bot", 7);
        for _ in 0..20 {
            let mv = player.produce_move(&state, &legal).unwrap();
            assert!(legal.contains(&mv));
            assert!(state.is_legal(Side::White, mv));
        }
    }

    #[test]
    fn test_same_seed_same_choices() {
        let state = GameState::new(Rules::default());
        let legal = state.legal_moves();
        let mut a = RandomPlayer::seeded("a", 42);
        let mut b = RandomPlayer::seeded("b", 42);
        for _ in 0..10 {
            assert_eq!(
                a.produce_move(&state, &legal).unwrap(),
                b.produce_move(&state, &legal).unwrap()
            );
        }
    }

    #[test]
    fn test_no_legal_moves_is_internal_error() {
        let state = GameState::new(Rules::default());
        let mut player = RandomPlayer::seeded("bot", 1);
        let err = player.produce_move(&state, &[]).unwrap_err();
        assert!(err.is_fatal());
    }
}
