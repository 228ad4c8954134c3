//! Depth-limited alpha-beta player.
//!
//! Scores are always taken from the searching side's point of view, so the
//! search alternates between maximizing and minimizing by who is to move
//! rather than by ply parity. A move that closes a mill and the captures it
//! earns are searched as one ply: capture sub-moves do not use up depth.

use tracing::debug;

use crate::board::Side;
use crate::constants::{MATERIAL_WEIGHT, MAX_SEARCH_DEPTH, MILL_WEIGHT, MOBILITY_WEIGHT, WIN_SCORE};
use crate::error::GameError;
use crate::game::{GameState, Outcome};
use crate::movegen::Move;
use crate::player::Player;

/// Material, mill and mobility score of `side` minus that of its opponent.
pub fn evaluate(state: &GameState, side: Side) -> i32 {
    features(state, side) - features(state, side.opponent())
}

fn features(state: &GameState, side: Side) -> i32 {
    let board = state.board();
    let topo = board.topology();
    let mut in_mills = 0;
    let mut mobility = 0;
    for p in board.positions_occupied_by(side) {
        if board.is_in_formed_mill(p) {
            in_mills += 1;
        }
        mobility += topo
            .neighbors(p)
            .iter()
            .filter(|&&q| board.occupancy_at(q).is_none())
            .count() as i32;
    }
    let material = state.side(side).remaining() as i32;
    MATERIAL_WEIGHT * material + MILL_WEIGHT * in_mills + MOBILITY_WEIGHT * mobility
}

fn terminal_score(outcome: Outcome, me: Side, depth: u32) -> i32 {
    // Remaining depth rewards quick wins and slow losses.
    let depth = depth as i32;
    match outcome {
        Outcome::Draw => 0,
        Outcome::Win { winner, .. } if winner == me => WIN_SCORE + depth,
        Outcome::Win { .. } => -WIN_SCORE - depth,
    }
}

/// Play `mv` on a copy of `state` and return it with the depth left to search.
fn child(state: &GameState, mv: Move, depth: u32) -> Result<(GameState, u32), GameError> {
    let mut next = state.clone();
    next.play(state.side_to_move(), mv)?;
    let left = if next.pending_captures() > 0 {
        depth
    } else {
        depth.saturating_sub(1)
    };
    Ok((next, left))
}

pub struct AlphaBetaPlayer {
    name: String,
    depth: u32,
    nodes: u64,
}

impl AlphaBetaPlayer {
    /// `depth` is clamped to `1..=MAX_SEARCH_DEPTH`.
    pub fn new(name: impl Into<String>, depth: u32) -> Self {
        Self {
            name: name.into(),
            depth: depth.clamp(1, MAX_SEARCH_DEPTH),
            nodes: 0,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Positions visited by the last search.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Best move for the side to move, or `None` when it has no legal move.
    ///
    /// Ties go to the move generated first, so equal positions always get the
    /// same answer.
    pub fn best_move(&mut self, state: &GameState) -> Result<Option<Move>, GameError> {
        self.nodes = 0;
        let me = state.side_to_move();
        let mut alpha = i32::MIN;
        let mut best = None;
        for mv in state.legal_moves() {
            let (next, left) = child(state, mv, self.depth)?;
            let score = self.search(&next, left, alpha, i32::MAX, me)?;
            if best.is_none() || score > alpha {
                alpha = score;
                best = Some(mv);
            }
        }
        Ok(best)
    }

    fn search(
        &mut self,
        state: &GameState,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        me: Side,
    ) -> Result<i32, GameError> {
        self.nodes += 1;
        if let Some(outcome) = state.outcome() {
            return Ok(terminal_score(outcome, me, depth));
        }
        if depth == 0 {
            return Ok(evaluate(state, me));
        }
        let moves = state.legal_moves();
        if moves.is_empty() {
            return Ok(evaluate(state, me));
        }

        let maximizing = state.side_to_move() == me;
        let mut best = if maximizing { i32::MIN } else { i32::MAX };
        for mv in moves {
            let (next, left) = child(state, mv, depth)?;
            let score = self.search(&next, left, alpha, beta, me)?;
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if alpha >= beta {
                break;
            }
        }
        Ok(best)
    }
}

impl Player for AlphaBetaPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn produce_move(&mut self, view: &GameState, legal: &[Move]) -> Result<Move, GameError> {
        match legal {
            [] => Err(GameError::internal("asked for a move with no legal moves")),
            [only] => Ok(*only),
            _ => {
                let mv = self
                    .best_move(view)?
                    .ok_or_else(|| GameError::internal("search found no move"))?;
                debug!(
                    player = %self.name,
                    ?mv,
                    depth = self.depth,
                    nodes = self.nodes,
                    "search done"
                );
                Ok(mv)
            }
        }
    }
}
