//! Game state and the controller's apply path.
//!
//! A [`GameState`] is changed only through [`GameState::play`] and
//! [`GameState::resign`]. `play` validates first, applies the move to a
//! scratch copy, re-checks the state invariants and only then commits, so a
//! rejected move leaves the state untouched.
//!
//! A ply runs: validate -> apply -> resolve mills. When the move closes a new
//! mill the same side stays to move and owes one or more [`Move::Capture`]s;
//! the ply completes after the last capture. Completing a ply passes the turn
//! and checks for the end of the game.

use std::fmt;

use tracing::debug;

use crate::board::{Board, Side};
use crate::constants::{FLYING_PIECES, MAX_PENDING_CAPTURES, MIN_PIECES};
use crate::error::{GameError, Violation};
use crate::mills::{MillSet, capture_targets, captures_granted, new_mills};
use crate::movegen::{self, ActionKind, Move};
use crate::phase::{Phase, SideState};
use crate::rules::{MultiMillCapture, Rules};
use crate::topology::Point;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WinReason {
    /// The loser has fewer than three pieces left.
    Reduced,
    /// The loser had no legal move on its turn.
    Blocked,
    Resigned,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win { winner: Side, reason: WinReason },
    /// Only reachable when a draw rule is configured.
    Draw,
}

impl Outcome {
    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::Win { winner, .. } => Some(*winner),
            Outcome::Draw => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win { winner, reason } => {
                let loser = winner.opponent();
                match reason {
                    WinReason::Reduced => {
                        write!(f, "{winner} wins: {loser} has fewer than three pieces")
                    }
                    WinReason::Blocked => write!(f, "{winner} wins: {loser} cannot move"),
                    WinReason::Resigned => write!(f, "{winner} wins: {loser} resigned"),
                }
            }
            Outcome::Draw => write!(f, "Draw: no capture within the move limit"),
        }
    }
}

/// What a successful call to [`GameState::play`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlyReport {
    pub side: Side,
    pub mv: Move,
    /// Captures the same side still has to make.
    pub captures_owed: u8,
    pub outcome: Option<Outcome>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    rules: Rules,
    board: Board,
    sides: [SideState; 2],
    to_move: Side,
    pending_captures: u8,
    /// Mills behind each side's most recent capture.
    spent_mills: [MillSet; 2],
    /// Completed plies since the last capture.
    quiet_plies: u16,
    outcome: Option<Outcome>,
}

/// Field-by-field description of a state, as read back from a save.
#[derive(Clone, Debug)]
pub(crate) struct Snapshot {
    pub rules: Rules,
    pub board: Board,
    pub in_hand: [u8; 2],
    pub to_move: Side,
    pub pending_captures: u8,
    pub spent_mills: [MillSet; 2],
    pub quiet_plies: u16,
    pub outcome: Option<Outcome>,
}

impl GameState {
    pub fn new(rules: Rules) -> Self {
        let allotted = rules.variant.pieces();
        Self {
            rules,
            board: Board::new(rules.variant),
            sides: [SideState::new(allotted); 2],
            to_move: rules.first_player(),
            pending_captures: 0,
            spent_mills: [MillSet::EMPTY; 2],
            quiet_plies: 0,
            outcome: None,
        }
    }

    /// Rebuild a state from its parts, rejecting anything the rules cannot
    /// produce.
    pub(crate) fn restore(snapshot: Snapshot) -> Result<Self, String> {
        let allotted = snapshot.rules.variant.pieces();
        let mut sides = [SideState::new(allotted); 2];
        for side in Side::ALL {
            let in_hand = snapshot.in_hand[side.index()];
            let on_board = snapshot.board.count(side);
            sides[side.index()] = SideState::restore(allotted, in_hand, on_board).ok_or_else(
                || format!("{side} has {on_board} pieces on the board and {in_hand} in hand"),
            )?;
        }
        let state = Self {
            rules: snapshot.rules,
            board: snapshot.board,
            sides,
            to_move: snapshot.to_move,
            pending_captures: snapshot.pending_captures,
            spent_mills: snapshot.spent_mills,
            quiet_plies: snapshot.quiet_plies,
            outcome: snapshot.outcome,
        };
        state.check_invariants()?;
        Ok(state)
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Side {
        self.to_move
    }

    pub fn side(&self, side: Side) -> &SideState {
        &self.sides[side.index()]
    }

    pub fn phase(&self, side: Side) -> Phase {
        self.side(side).phase(self.rules.flying)
    }

    /// Captures the side to move still owes.
    pub fn pending_captures(&self) -> u8 {
        self.pending_captures
    }

    pub fn spent_mills(&self, side: Side) -> MillSet {
        self.spent_mills[side.index()]
    }

    pub fn quiet_plies(&self) -> u16 {
        self.quiet_plies
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// The kind of move the side to move has to submit.
    pub fn next_action(&self) -> ActionKind {
        if self.pending_captures > 0 {
            ActionKind::Capture
        } else {
            ActionKind::for_phase(self.phase(self.to_move))
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(self)
    }

    pub fn is_legal(&self, side: Side, mv: Move) -> bool {
        movegen::validate(self, side, mv).is_ok()
    }

    /// Validate and apply one move or capture by `side`.
    pub fn play(&mut self, side: Side, mv: Move) -> Result<PlyReport, GameError> {
        if self.pending_captures > 0
            && !self.is_over()
            && capture_targets(&self.board, self.to_move.opponent(), &self.rules).is_empty()
        {
            return Err(GameError::internal(
                "a capture is owed but no opponent piece can be taken",
            ));
        }
        movegen::validate(self, side, mv)?;

        let mut next = self.clone();
        next.apply(side, mv);
        next.check_invariants().map_err(GameError::internal)?;

        debug!(
            %side,
            mv = %mv.notation(self.board.topology()),
            owed = next.pending_captures,
            "ply applied"
        );
        *self = next;
        Ok(PlyReport {
            side,
            mv,
            captures_owed: self.pending_captures,
            outcome: self.outcome,
        })
    }

    /// End the game in favor of the opponent of `side`.
    pub fn resign(&mut self, side: Side) -> Result<Outcome, GameError> {
        if self.is_over() {
            return Err(GameError::violation(Violation::GameOver));
        }
        let outcome = Outcome::Win {
            winner: side.opponent(),
            reason: WinReason::Resigned,
        };
        debug!(%side, "resigned");
        self.pending_captures = 0;
        self.outcome = Some(outcome);
        Ok(outcome)
    }

    fn apply(&mut self, side: Side, mv: Move) {
        let before = Side::ALL.map(|s| self.phase(s));
        match mv {
            Move::Place(to) => {
                self.board.set_occupancy(to, Some(side));
                self.sides[side.index()].record_placement();
                self.after_landing(side, to);
            }
            Move::Slide { from, to } | Move::Fly { from, to } => {
                self.board.set_occupancy(from, None);
                self.board.set_occupancy(to, Some(side));
                self.after_landing(side, to);
            }
            Move::Capture(p) => self.apply_capture(side, p),
        }
        for s in Side::ALL {
            let after = self.phase(s);
            if before[s.index()] != after {
                debug!(side = %s, from = %before[s.index()], to = %after, "phase change");
            }
        }
    }

    fn after_landing(&mut self, side: Side, to: Point) {
        let fresh = new_mills(
            &self.board,
            to,
            side,
            self.spent_mills[side.index()],
            &self.rules,
        );
        let available = self.board.count(side.opponent());
        let owed = captures_granted(fresh, &self.rules, available);
        if owed > 0 {
            debug!(%side, mills = fresh.len(), owed, "mill closed");
            self.spent_mills[side.index()] = fresh;
            self.pending_captures = owed;
        } else {
            if !fresh.is_empty() {
                debug!(%side, "mill closed with no piece to capture");
            }
            self.finish_ply(side, false);
        }
    }

    fn apply_capture(&mut self, side: Side, p: Point) {
        let victim = side.opponent();
        self.board.set_occupancy(p, None);
        self.sides[victim.index()].record_loss();
        for &m in self.board.mills_containing(p) {
            self.spent_mills[victim.index()].remove(m);
        }
        self.pending_captures -= 1;

        if self.side(victim).remaining() < MIN_PIECES {
            self.pending_captures = 0;
            self.outcome = Some(Outcome::Win {
                winner: side,
                reason: WinReason::Reduced,
            });
        } else if self.pending_captures == 0 {
            self.finish_ply(side, true);
        }
    }

    fn finish_ply(&mut self, side: Side, captured: bool) {
        self.quiet_plies = if captured {
            0
        } else {
            self.quiet_plies.saturating_add(1)
        };
        if let Some(limit) = self.rules.draw_after {
            if self.quiet_plies >= limit.get() {
                self.outcome = Some(Outcome::Draw);
                return;
            }
        }
        self.to_move = side.opponent();
        if self.legal_moves().is_empty() {
            self.outcome = Some(Outcome::Win {
                winner: side,
                reason: WinReason::Blocked,
            });
        }
    }

    /// Check the relations every reachable state satisfies.
    pub fn check_invariants(&self) -> Result<(), String> {
        let topo = self.board.topology();
        if topo.variant() != self.rules.variant {
            return Err("board does not match the rule variant".into());
        }
        for side in Side::ALL {
            let counters = self.side(side);
            let on_board = self.board.count(side);
            if counters.on_board() != on_board {
                return Err(format!(
                    "{side} should have {} pieces on the board, found {on_board}",
                    counters.on_board()
                ));
            }
            let spent = self.spent_mills(side).bits();
            if spent >> topo.mills().len() != 0 {
                return Err(format!("{side} remembers a mill that does not exist"));
            }
        }

        let max_pending = match self.rules.multi_mill {
            MultiMillCapture::Single => 1,
            MultiMillCapture::PerMill => MAX_PENDING_CAPTURES,
        };
        if self.pending_captures > max_pending {
            return Err(format!("{} captures pending", self.pending_captures));
        }
        if let Some(limit) = self.rules.draw_after {
            if self.outcome.is_none() && self.quiet_plies >= limit.get() {
                return Err("the draw limit was reached without a draw".into());
            }
        }

        match self.outcome {
            Some(outcome) => {
                if self.pending_captures > 0 {
                    return Err("captures pending after the game ended".into());
                }
                match outcome {
                    Outcome::Draw if self.rules.draw_after.is_none() => {
                        return Err("draw without a draw rule".into());
                    }
                    Outcome::Win {
                        winner,
                        reason: WinReason::Reduced,
                    } if self.side(winner.opponent()).remaining() >= MIN_PIECES => {
                        return Err(format!("{} was not reduced", winner.opponent()));
                    }
                    _ => {}
                }
            }
            None => {
                for side in Side::ALL {
                    if self.side(side).remaining() < MIN_PIECES {
                        return Err(format!("{side} has fewer than three pieces in play"));
                    }
                    if self.phase(side) == Phase::Flying
                        && self.side(side).on_board() != FLYING_PIECES
                    {
                        return Err(format!("{side} is flying without exactly three pieces"));
                    }
                }
                if self.pending_captures > 0 {
                    self.check_pending_captures()?;
                } else if self.legal_moves().is_empty() {
                    return Err(format!("{} has no legal move", self.to_move));
                }
            }
        }
        Ok(())
    }

    /// Owed captures must come from mills the mover still holds, and there
    /// must be enough opponent pieces to take.
    fn check_pending_captures(&self) -> Result<(), String> {
        let mover = self.to_move;
        let victim = mover.opponent();
        let owed = usize::from(self.pending_captures);
        if owed > self.board.count(victim) {
            return Err(format!(
                "{owed} captures owed but {victim} has {} pieces on the board",
                self.board.count(victim)
            ));
        }
        let spent = self.spent_mills(mover);
        if spent.is_empty() {
            return Err(format!("{mover} owes a capture without a mill"));
        }
        if let Some(m) = spent
            .iter()
            .find(|&m| !self.board.is_mill_satisfied(m, mover))
        {
            return Err(format!("{mover} owes a capture for mill {m} it does not hold"));
        }
        if owed > spent.len() {
            return Err(format!("{owed} captures owed for {} mills", spent.len()));
        }
        if capture_targets(&self.board, victim, &self.rules).is_empty() {
            return Err("a capture is owed but nothing can be taken".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Variant;

    fn at(state: &GameState, name: &str) -> Point {
        state.board().topology().parse_point(name).unwrap()
    }

    fn place(state: &mut GameState, side: Side, name: &str) -> PlyReport {
        let p = at(state, name);
        state.play(side, Move::Place(p)).unwrap()
    }

    #[test]
    fn test_new_game() {
        let state = GameState::new(Rules::default());
        assert_eq!(state.side_to_move(), Side::White);
        assert_eq!(state.next_action(), ActionKind::Place);
        assert_eq!(state.phase(Side::Black), Phase::Placing);
        assert!(!state.is_over());
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_turns_alternate_while_placing() {
        let mut state = GameState::new(Rules::default());
        let report = place(&mut state, Side::White, "A1");
        assert_eq!(report.captures_owed, 0);
        assert_eq!(state.side_to_move(), Side::Black);
        place(&mut state, Side::Black, "G7");
        assert_eq!(state.side_to_move(), Side::White);
        assert_eq!(state.side(Side::White).in_hand(), 8);
        assert_eq!(state.quiet_plies(), 2);
    }

    #[test]
    fn test_rejected_move_leaves_state_untouched() {
        let mut state = GameState::new(Rules::default());
        place(&mut state, Side::White, "A1");
        let before = state.clone();
        let a1 = at(&state, "A1");
        assert!(state.play(Side::Black, Move::Place(a1)).is_err());
        assert!(state.play(Side::White, Move::Place(0)).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_mill_owes_capture() {
        let mut state = GameState::new(Rules::default());
        place(&mut state, Side::White, "A1");
        place(&mut state, Side::Black, "B2");
        place(&mut state, Side::White, "D1");
        place(&mut state, Side::Black, "D2");
        let report = place(&mut state, Side::White, "G1");
        assert_eq!(report.captures_owed, 1);
        assert_eq!(state.side_to_move(), Side::White);
        assert_eq!(state.next_action(), ActionKind::Capture);

        let moves = state.legal_moves();
        assert_eq!(moves, [Move::Capture(at(&state, "B2")), Move::Capture(at(&state, "D2"))]);

        let b2 = at(&state, "B2");
        let report = state.play(Side::White, Move::Capture(b2)).unwrap();
        assert_eq!(report.captures_owed, 0);
        assert_eq!(state.side_to_move(), Side::Black);
        assert_eq!(state.side(Side::Black).lost(), 1);
        assert_eq!(state.board().occupancy_at(b2), None);
        assert_eq!(state.quiet_plies(), 0);
    }

    #[test]
    fn test_resign() {
        let mut state = GameState::new(Rules::new(Variant::SixMen));
        let outcome = state.resign(Side::White).unwrap();
        assert_eq!(outcome.winner(), Some(Side::Black));
        assert!(state.is_over());
        assert!(state.legal_moves().is_empty());
        assert!(state.resign(Side::Black).is_err());
        assert_eq!(outcome.to_string(), "Black wins: White resigned");
    }
}
