//! Mill detection and capture resolution.
//!
//! After a piece lands on a point, every mill through that point that the
//! mover now owns is a candidate. Which candidates count as new, how many
//! captures they earn and which opponent pieces may be taken are all governed
//! by [`Rules`].

use tracing::debug;

use crate::board::{Board, Side};
use crate::rules::{MultiMillCapture, RepeatedMill, Rules};
use crate::topology::{MillId, Point};

/// A set of mill ids, stored as a bitmask.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MillSet(u32);

impl MillSet {
    pub const EMPTY: MillSet = MillSet(0);

    pub fn from_bits(bits: u32) -> Self {
        MillSet(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn contains(self, mill: MillId) -> bool {
        self.0 & (1 << mill) != 0
    }

    pub fn insert(&mut self, mill: MillId) {
        self.0 |= 1 << mill;
    }

    pub fn remove(&mut self, mill: MillId) {
        self.0 &= !(1 << mill);
    }

    pub fn iter(self) -> impl Iterator<Item = MillId> {
        (0..u32::BITS as usize).filter(move |&m| self.contains(m))
    }
}

impl FromIterator<MillId> for MillSet {
    fn from_iter<I: IntoIterator<Item = MillId>>(iter: I) -> Self {
        let mut set = MillSet::EMPTY;
        for m in iter {
            set.insert(m);
        }
        set
    }
}

/// Mills through `p` that are fully owned by `side`.
pub fn formed_mills(board: &Board, p: Point, side: Side) -> MillSet {
    board
        .mills_containing(p)
        .iter()
        .copied()
        .filter(|&m| board.is_mill_satisfied(m, side))
        .collect()
}

/// Mills closed by the piece that just landed on `dest` that earn captures.
///
/// `spent` is the mover's memory of the mills behind its last capture; under
/// [`RepeatedMill::Deny`] those do not count again.
pub fn new_mills(board: &Board, dest: Point, side: Side, spent: MillSet, rules: &Rules) -> MillSet {
    let formed = formed_mills(board, dest, side);
    match rules.repeated_mill {
        RepeatedMill::Allow => formed,
        RepeatedMill::Deny => {
            let fresh = MillSet(formed.0 & !spent.0);
            if fresh != formed {
                debug!(%side, "re-formed a spent mill");
            }
            fresh
        }
    }
}

/// Captures earned by closing `mills`, capped by the pieces available to take.
pub fn captures_granted(mills: MillSet, rules: &Rules, available: usize) -> u8 {
    let earned = match rules.multi_mill {
        _ if mills.is_empty() => 0,
        MultiMillCapture::Single => 1,
        MultiMillCapture::PerMill => mills.len(),
    };
    earned.min(available) as u8
}

/// Points the capturing side may take from `victim`, ascending.
///
/// With mill protection on, pieces inside a formed mill are only eligible
/// when the victim has no piece outside a mill.
pub fn capture_targets(board: &Board, victim: Side, rules: &Rules) -> Vec<Point> {
    let pieces = board.positions_occupied_by(victim);
    if !rules.protect_mills {
        return pieces;
    }
    let (in_mill, free): (Vec<Point>, Vec<Point>) =
        pieces.into_iter().partition(|&p| board.is_in_formed_mill(p));
    if free.is_empty() { in_mill } else { free }
}

/// True when `p` holds a piece of `victim` that `capture_targets` would offer.
pub fn is_protected(board: &Board, p: Point, victim: Side, rules: &Rules) -> bool {
    board.occupancy_at(p) == Some(victim) && !capture_targets(board, victim, rules).contains(&p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Variant;

    fn board_with(white: &[&str], black: &[&str]) -> Board {
        let mut board = Board::new(Variant::NineMen);
        for (side, names) in [(Side::White, white), (Side::Black, black)] {
            for name in names {
                let p = board.topology().parse_point(name).unwrap();
                board.set_occupancy(p, Some(side));
            }
        }
        board
    }

    fn at(board: &Board, name: &str) -> Point {
        board.topology().parse_point(name).unwrap()
    }

    fn names(board: &Board, points: &[Point]) -> Vec<String> {
        points
            .iter()
            .map(|&p| board.topology().coord(p).to_string())
            .collect()
    }

    #[test]
    fn test_mill_set_ops() {
        let mut set = MillSet::EMPTY;
        set.insert(3);
        set.insert(15);
        assert!(set.contains(3));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), [3, 15]);
        set.remove(3);
        assert_eq!(set.bits(), 1 << 15);
    }

    #[test]
    fn test_formed_mills_double() {
        let board = board_with(&["A1", "D1", "G1", "A4", "A7"], &[]);
        let formed = formed_mills(&board, at(&board, "A1"), Side::White);
        assert_eq!(formed.len(), 2);
        assert!(formed_mills(&board, at(&board, "D1"), Side::White).len() == 1);
    }

    #[test]
    fn test_repeated_mill_policy() {
        let board = board_with(&["A1", "D1", "G1"], &[]);
        let a1 = at(&board, "A1");
        let formed = formed_mills(&board, a1, Side::White);
        let deny = Rules::default();
        let allow = Rules::default().with_repeated_mill(RepeatedMill::Allow);
        assert!(new_mills(&board, a1, Side::White, formed, &deny).is_empty());
        assert_eq!(new_mills(&board, a1, Side::White, formed, &allow), formed);
        assert_eq!(
            new_mills(&board, a1, Side::White, MillSet::EMPTY, &deny),
            formed
        );
    }

    #[test]
    fn test_captures_granted() {
        let two: MillSet = [0, 1].into_iter().collect();
        let single = Rules::default();
        let per_mill = Rules::default().with_multi_mill(MultiMillCapture::PerMill);
        assert_eq!(captures_granted(MillSet::EMPTY, &single, 5), 0);
        assert_eq!(captures_granted(two, &single, 5), 1);
        assert_eq!(captures_granted(two, &per_mill, 5), 2);
        assert_eq!(captures_granted(two, &per_mill, 1), 1);
        assert_eq!(captures_granted(two, &single, 0), 0);
    }

    #[test]
    fn test_protected_mill_rule() {
        let board = board_with(&[], &["A1", "D1", "G1", "B2"]);
        let protect = Rules::default();
        let open = Rules::default().with_protect_mills(false);
        assert_eq!(names(&board, &capture_targets(&board, Side::Black, &protect)), ["B2"]);
        assert_eq!(
            names(&board, &capture_targets(&board, Side::Black, &open)),
            ["A1", "D1", "G1", "B2"]
        );
        assert!(is_protected(&board, at(&board, "A1"), Side::Black, &protect));
        assert!(!is_protected(&board, at(&board, "A1"), Side::Black, &open));
    }

    #[test]
    fn test_all_in_mills_are_capturable() {
        let board = board_with(&[], &["A1", "D1", "G1"]);
        let targets = capture_targets(&board, Side::Black, &Rules::default());
        assert_eq!(names(&board, &targets), ["A1", "D1", "G1"]);
    }
}
