//! Moves, legal-move generation and validation.
//!
//! Generation always walks points in ascending id order (sources first, then
//! destinations), so the legal set is deterministic and players that pick by
//! index reproduce the same game from the same seed.

use std::fmt;

use crate::board::Side;
use crate::error::{GameError, Violation};
use crate::game::GameState;
use crate::mills::{capture_targets, is_protected};
use crate::phase::Phase;
use crate::topology::{Point, Topology};

/// The kind of action a side is expected to submit next.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Place,
    Slide,
    Fly,
    Capture,
}

impl ActionKind {
    /// Action expected from a side in `phase` when no capture is owed.
    pub fn for_phase(phase: Phase) -> ActionKind {
        match phase {
            Phase::Placing => ActionKind::Place,
            Phase::Moving => ActionKind::Slide,
            Phase::Flying => ActionKind::Fly,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Place => write!(f, "place"),
            ActionKind::Slide => write!(f, "slide"),
            ActionKind::Fly => write!(f, "fly"),
            ActionKind::Capture => write!(f, "capture"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Place(Point),
    Slide { from: Point, to: Point },
    Fly { from: Point, to: Point },
    /// Removal of an opponent piece, owed after closing a mill.
    Capture(Point),
}

impl Move {
    pub fn kind(&self) -> ActionKind {
        match self {
            Move::Place(_) => ActionKind::Place,
            Move::Slide { .. } => ActionKind::Slide,
            Move::Fly { .. } => ActionKind::Fly,
            Move::Capture(_) => ActionKind::Capture,
        }
    }

    /// Build the relocation move matching `kind` (slide or fly).
    pub fn relocation(kind: ActionKind, from: Point, to: Point) -> Option<Move> {
        match kind {
            ActionKind::Slide => Some(Move::Slide { from, to }),
            ActionKind::Fly => Some(Move::Fly { from, to }),
            ActionKind::Place | ActionKind::Capture => None,
        }
    }

    /// Point a piece of the mover lands on, if any.
    pub fn destination(&self) -> Option<Point> {
        match *self {
            Move::Place(to) | Move::Slide { to, .. } | Move::Fly { to, .. } => Some(to),
            Move::Capture(_) => None,
        }
    }

    fn points(&self) -> impl Iterator<Item = Point> {
        let (a, b) = match *self {
            Move::Place(p) | Move::Capture(p) => (p, None),
            Move::Slide { from, to } | Move::Fly { from, to } => (from, Some(to)),
        };
        std::iter::once(a).chain(b)
    }

    /// Console notation: `A1` for placements and captures, `A1A4` for moves.
    pub fn notation(&self, topo: &Topology) -> String {
        match *self {
            Move::Place(p) | Move::Capture(p) => topo.coord(p).to_string(),
            Move::Slide { from, to } | Move::Fly { from, to } => {
                format!("{}{}", topo.coord(from), topo.coord(to))
            }
        }
    }

    /// Past-tense description for the game log, e.g. "moved from A1 to A4".
    pub fn describe(&self, topo: &Topology) -> String {
        match *self {
            Move::Place(p) => format!("placed a piece on {}", topo.coord(p)),
            Move::Slide { from, to } => {
                format!("moved from {} to {}", topo.coord(from), topo.coord(to))
            }
            Move::Fly { from, to } => {
                format!("flew from {} to {}", topo.coord(from), topo.coord(to))
            }
            Move::Capture(p) => format!("removed a piece from {}", topo.coord(p)),
        }
    }
}

/// All legal moves for the side to move, in ascending point order.
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    if state.is_over() {
        return Vec::new();
    }
    let side = state.side_to_move();
    let board = state.board();
    let topo = board.topology();

    match state.next_action() {
        ActionKind::Capture => capture_targets(board, side.opponent(), state.rules())
            .into_iter()
            .map(Move::Capture)
            .collect(),
        ActionKind::Place => board.empty_positions().into_iter().map(Move::Place).collect(),
        ActionKind::Slide => board
            .positions_occupied_by(side)
            .into_iter()
            .flat_map(|from| {
                topo.neighbors(from)
                    .iter()
                    .filter(move |&&to| board.occupancy_at(to).is_none())
                    .map(move |&to| Move::Slide { from, to })
            })
            .collect(),
        ActionKind::Fly => {
            let empty = board.empty_positions();
            board
                .positions_occupied_by(side)
                .into_iter()
                .flat_map(|from| empty.iter().map(move |&to| Move::Fly { from, to }))
                .collect()
        }
    }
}

/// Check `mv` by `side` against the current state without changing it.
///
/// Accepts exactly the moves [`legal_moves`] generates; the error names the
/// first rule the move breaks.
pub fn validate(state: &GameState, side: Side, mv: Move) -> Result<(), GameError> {
    let reject = |violation| Err(GameError::violation(violation));

    if state.is_over() {
        return reject(Violation::GameOver);
    }
    if side != state.side_to_move() {
        return reject(Violation::NotYourTurn {
            expected: state.side_to_move(),
        });
    }
    let expected = state.next_action();
    if mv.kind() != expected {
        return reject(Violation::WrongAction {
            expected,
            got: mv.kind(),
        });
    }

    let board = state.board();
    let topo = board.topology();
    if let Some(index) = mv.points().find(|&p| p >= topo.len()) {
        return reject(Violation::UnknownPoint { index });
    }

    let own = |p: Point| board.occupancy_at(p) == Some(side);
    let empty = |p: Point| board.occupancy_at(p).is_none();

    match mv {
        Move::Place(to) => {
            if !empty(to) {
                return reject(Violation::Occupied { at: topo.coord(to) });
            }
        }
        Move::Slide { from, to } | Move::Fly { from, to } => {
            if !own(from) {
                return reject(Violation::NotOwnPiece {
                    at: topo.coord(from),
                });
            }
            if !empty(to) {
                return reject(Violation::Occupied { at: topo.coord(to) });
            }
            if mv.kind() == ActionKind::Slide && !topo.is_adjacent(from, to) {
                return reject(Violation::NotAdjacent {
                    from: topo.coord(from),
                    to: topo.coord(to),
                });
            }
        }
        Move::Capture(p) => {
            let victim = side.opponent();
            if board.occupancy_at(p) != Some(victim) {
                return reject(Violation::NotOpponentPiece { at: topo.coord(p) });
            }
            if is_protected(board, p, victim, state.rules()) {
                return reject(Violation::ProtectedByMill { at: topo.coord(p) });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rules;
    use crate::topology::Variant;

    fn at(state: &GameState, name: &str) -> Point {
        state.board().topology().parse_point(name).unwrap()
    }

    #[test]
    fn test_fresh_game_places_everywhere() {
        let state = GameState::new(Rules::default());
        let moves = legal_moves(&state);
        assert_eq!(moves.len(), 24);
        assert_eq!(moves[0], Move::Place(0));
        assert_eq!(moves[23], Move::Place(23));
    }

    #[test]
    fn test_notation() {
        let topo = Variant::NineMen.topology();
        let a1 = topo.parse_point("A1").unwrap();
        let a4 = topo.parse_point("A4").unwrap();
        assert_eq!(Move::Place(a1).notation(topo), "A1");
        assert_eq!(Move::Slide { from: a1, to: a4 }.notation(topo), "A1A4");
        assert_eq!(
            Move::Fly { from: a1, to: a4 }.describe(topo),
            "flew from A1 to A4"
        );
    }

    #[test]
    fn test_validate_wrong_turn_and_kind() {
        let state = GameState::new(Rules::default());
        let a1 = at(&state, "A1");
        assert_eq!(
            validate(&state, Side::Black, Move::Place(a1)),
            Err(GameError::violation(Violation::NotYourTurn {
                expected: Side::White
            }))
        );
        assert!(matches!(
            validate(&state, Side::White, Move::Slide { from: a1, to: 1 }),
            Err(GameError::RuleViolation {
                violation: Violation::WrongAction { .. }
            })
        ));
        assert_eq!(
            validate(&state, Side::White, Move::Place(99)),
            Err(GameError::violation(Violation::UnknownPoint { index: 99 }))
        );
        assert!(validate(&state, Side::White, Move::Place(a1)).is_ok());
    }

    #[test]
    fn test_validate_occupied_target() {
        let mut state = GameState::new(Rules::default());
        let a1 = at(&state, "A1");
        state.play(Side::White, Move::Place(a1)).unwrap();
        assert!(matches!(
            validate(&state, Side::Black, Move::Place(a1)),
            Err(GameError::RuleViolation {
                violation: Violation::Occupied { .. }
            })
        ));
    }

    #[test]
    fn test_relocation() {
        assert_eq!(
            Move::relocation(ActionKind::Fly, 1, 2),
            Some(Move::Fly { from: 1, to: 2 })
        );
        assert_eq!(Move::relocation(ActionKind::Place, 1, 2), None);
    }
}
