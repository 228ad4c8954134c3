//! Save file codec.
//!
//! A save is three unsigned decimal integers, one per line. Each is a 64-bit
//! word with a fixed layout (see the `constants` module):
//!
//! - word 0: the board, two bits per point
//! - word 1: pieces in hand, rule switches and the format version
//! - word 2: side to move, pending captures, outcome, spent mills, quiet plies
//!
//! Decoding is all-or-nothing. Any record the rules could not have produced is
//! rejected with [`GameError::CorruptSaveData`].

use std::fs;
use std::num::NonZeroU16;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::board::{Board, Side};
use crate::constants::*;
use crate::error::GameError;
use crate::game::{GameState, Outcome, Snapshot, WinReason};
use crate::mills::MillSet;
use crate::rules::{MultiMillCapture, RepeatedMill, Rules};
use crate::topology::Variant;

/// Bits of word 1 that carry data.
const WORD1_USED: u64 = 0x1_FFFF | (DRAW_AFTER_MASK << DRAW_AFTER_SHIFT) | (0xFF << VERSION_SHIFT);

/// Bits of word 2 that carry data.
const WORD2_USED: u64 = 0x7F
    | (SPENT_MASK << SPENT_WHITE_SHIFT)
    | (SPENT_MASK << SPENT_BLACK_SHIFT)
    | (QUIET_MASK << QUIET_SHIFT);

pub fn encode(state: &GameState) -> [u64; 3] {
    let board = state.board();
    let rules = state.rules();

    let mut cells = 0u64;
    for p in board.topology().points() {
        let code = match board.occupancy_at(p) {
            None => CELL_EMPTY,
            Some(Side::White) => CELL_WHITE,
            Some(Side::Black) => CELL_BLACK,
        };
        cells |= code << (p as u32 * CELL_BITS);
    }

    let mut header = u64::from(state.side(Side::White).in_hand()) << HAND_WHITE_SHIFT
        | u64::from(state.side(Side::Black).in_hand()) << HAND_BLACK_SHIFT
        | u64::from(rules.variant.pieces()) << PIECES_SHIFT
        | SAVE_FORMAT_VERSION << VERSION_SHIFT;
    for (flag, on) in [
        (FLAG_FLYING, rules.flying),
        (FLAG_WHITE_STARTS, rules.white_starts),
        (FLAG_PROTECT_MILLS, rules.protect_mills),
        (FLAG_CAPTURE_PER_MILL, rules.multi_mill == MultiMillCapture::PerMill),
        (FLAG_ALLOW_REPEATED_MILLS, rules.repeated_mill == RepeatedMill::Allow),
    ] {
        if on {
            header |= flag;
        }
    }
    if let Some(limit) = rules.draw_after {
        header |= u64::from(limit.get()) << DRAW_AFTER_SHIFT;
    }

    let (outcome, reason) = match state.outcome() {
        None => (OUTCOME_NONE, REASON_REDUCED),
        Some(Outcome::Draw) => (OUTCOME_DRAW, REASON_REDUCED),
        Some(Outcome::Win { winner, reason }) => {
            let outcome = match winner {
                Side::White => OUTCOME_WHITE_WINS,
                Side::Black => OUTCOME_BLACK_WINS,
            };
            let reason = match reason {
                WinReason::Reduced => REASON_REDUCED,
                WinReason::Blocked => REASON_BLOCKED,
                WinReason::Resigned => REASON_RESIGNED,
            };
            (outcome, reason)
        }
    };
    let turn = match state.side_to_move() {
        Side::White => 0,
        Side::Black => TURN_BLACK,
    };
    let progress = turn
        | u64::from(state.pending_captures()) << PENDING_SHIFT
        | outcome << OUTCOME_SHIFT
        | reason << REASON_SHIFT
        | u64::from(state.spent_mills(Side::White).bits()) << SPENT_WHITE_SHIFT
        | u64::from(state.spent_mills(Side::Black).bits()) << SPENT_BLACK_SHIFT
        | u64::from(state.quiet_plies()) << QUIET_SHIFT;

    [cells, header, progress]
}

pub fn decode(words: [u64; 3]) -> Result<GameState, GameError> {
    let [cells, header, progress] = words;

    let version = header >> VERSION_SHIFT;
    if version != SAVE_FORMAT_VERSION {
        return Err(GameError::corrupt(format!("unknown format version {version}")));
    }
    if header & !WORD1_USED != 0 || progress & !WORD2_USED != 0 {
        return Err(GameError::corrupt("reserved bits are set"));
    }

    let pieces = ((header >> PIECES_SHIFT) & PIECES_MASK) as u8;
    let variant = Variant::from_pieces(pieces)
        .ok_or_else(|| GameError::corrupt(format!("unknown piece count {pieces}")))?;
    let draw_after = NonZeroU16::new(((header >> DRAW_AFTER_SHIFT) & DRAW_AFTER_MASK) as u16);
    let rules = Rules::new(variant)
        .with_flying(header & FLAG_FLYING != 0)
        .with_white_starts(header & FLAG_WHITE_STARTS != 0)
        .with_protect_mills(header & FLAG_PROTECT_MILLS != 0)
        .with_multi_mill(if header & FLAG_CAPTURE_PER_MILL != 0 {
            MultiMillCapture::PerMill
        } else {
            MultiMillCapture::Single
        })
        .with_repeated_mill(if header & FLAG_ALLOW_REPEATED_MILLS != 0 {
            RepeatedMill::Allow
        } else {
            RepeatedMill::Deny
        })
        .with_draw_after(draw_after);

    let mut board = Board::new(variant);
    let used_cell_bits = board.topology().len() as u32 * CELL_BITS;
    if cells >> used_cell_bits != 0 {
        return Err(GameError::corrupt("pieces beyond the last point"));
    }
    for p in board.topology().points() {
        let occupant = match (cells >> (p as u32 * CELL_BITS)) & ((1 << CELL_BITS) - 1) {
            CELL_EMPTY => None,
            CELL_WHITE => Some(Side::White),
            CELL_BLACK => Some(Side::Black),
            code => {
                return Err(GameError::corrupt(format!("invalid cell code {code} at point {p}")));
            }
        };
        board.set_occupancy(p, occupant);
    }

    let in_hand = [
        ((header >> HAND_WHITE_SHIFT) & HAND_MASK) as u8,
        ((header >> HAND_BLACK_SHIFT) & HAND_MASK) as u8,
    ];
    let to_move = if progress & TURN_BLACK != 0 {
        Side::Black
    } else {
        Side::White
    };
    let reason = match (progress >> REASON_SHIFT) & REASON_MASK {
        REASON_REDUCED => WinReason::Reduced,
        REASON_BLOCKED => WinReason::Blocked,
        REASON_RESIGNED => WinReason::Resigned,
        code => return Err(GameError::corrupt(format!("unknown win reason {code}"))),
    };
    let outcome = match (progress >> OUTCOME_SHIFT) & OUTCOME_MASK {
        OUTCOME_WHITE_WINS => Some(Outcome::Win {
            winner: Side::White,
            reason,
        }),
        OUTCOME_BLACK_WINS => Some(Outcome::Win {
            winner: Side::Black,
            reason,
        }),
        OUTCOME_DRAW => Some(Outcome::Draw),
        _ => None,
    };
    if !matches!(outcome, Some(Outcome::Win { .. })) && reason != WinReason::Reduced {
        return Err(GameError::corrupt("win reason without a winner"));
    }

    let snapshot = Snapshot {
        rules,
        board,
        in_hand,
        to_move,
        pending_captures: ((progress >> PENDING_SHIFT) & PENDING_MASK) as u8,
        spent_mills: [
            MillSet::from_bits(((progress >> SPENT_WHITE_SHIFT) & SPENT_MASK) as u32),
            MillSet::from_bits(((progress >> SPENT_BLACK_SHIFT) & SPENT_MASK) as u32),
        ],
        quiet_plies: ((progress >> QUIET_SHIFT) & QUIET_MASK) as u16,
        outcome,
    };
    GameState::restore(snapshot).map_err(GameError::corrupt)
}

pub fn to_text(state: &GameState) -> String {
    let [a, b, c] = encode(state);
    format!("{a}\n{b}\n{c}\n")
}

pub fn from_text(text: &str) -> Result<GameState, GameError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() != 3 {
        return Err(GameError::corrupt(format!(
            "expected 3 lines, found {}",
            lines.len()
        )));
    }
    let mut words = [0u64; 3];
    for (word, line) in words.iter_mut().zip(&lines) {
        *word = line
            .parse()
            .map_err(|_| GameError::corrupt(format!("not a number: {line:?}")))?;
    }
    decode(words)
}

pub fn save_to_path(state: &GameState, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, to_text(state))
        .with_context(|| format!("failed to write save file {}", path.display()))?;
    debug!(path = %path.display(), "game saved");
    Ok(())
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<GameState> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read save file {}", path.display()))?;
    let state = from_text(&text).with_context(|| format!("cannot load {}", path.display()))?;
    debug!(path = %path.display(), "game loaded");
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::Move;

    fn play(state: &mut GameState, names: &[&str]) {
        for name in names {
            let p = state.board().topology().parse_point(name).unwrap();
            let side = state.side_to_move();
            let mv = if state.pending_captures() > 0 {
                Move::Capture(p)
            } else {
                Move::Place(p)
            };
            state.play(side, mv).unwrap();
        }
    }

    #[test]
    fn test_round_trip_new_game() {
        for variant in Variant::ALL {
            let state = GameState::new(Rules::new(variant));
            assert_eq!(decode(encode(&state)).unwrap(), state);
        }
    }

    #[test]
    fn test_round_trip_pending_capture() {
        let mut state = GameState::new(Rules::default());
        play(&mut state, &["A1", "B2", "D1", "D2", "G1"]);
        assert_eq!(state.pending_captures(), 1);
        let restored = from_text(&to_text(&state)).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.pending_captures(), 1);
    }

    #[test]
    fn test_round_trip_custom_rules() {
        let rules = Rules::new(Variant::SixMen)
            .with_flying(false)
            .with_white_starts(false)
            .with_multi_mill(MultiMillCapture::PerMill)
            .with_repeated_mill(RepeatedMill::Allow)
            .with_draw_after(NonZeroU16::new(40));
        let mut state = GameState::new(rules);
        play(&mut state, &["A1", "G7"]);
        assert_eq!(decode(encode(&state)).unwrap(), state);
    }

    #[test]
    fn test_round_trip_finished_game() {
        let mut state = GameState::new(Rules::default());
        state.resign(Side::Black).unwrap();
        assert_eq!(decode(encode(&state)).unwrap(), state);
    }

    fn corrupt_reason(words: [u64; 3]) -> String {
        match decode(words) {
            Err(GameError::CorruptSaveData { reason }) => reason,
            other => panic!("expected corrupt data, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_corrupt_words() {
        let [cells, header, progress] = encode(&GameState::new(Rules::default()));

        let bad_version = header & !(0xFF << VERSION_SHIFT) | 7 << VERSION_SHIFT;
        assert!(corrupt_reason([cells, bad_version, progress]).contains("version"));
        assert!(corrupt_reason([cells, header | 1 << 20, progress]).contains("reserved"));
        assert!(corrupt_reason([cells, header, progress | 1 << 7]).contains("reserved"));

        let bad_pieces = header & !(PIECES_MASK << PIECES_SHIFT) | 7 << PIECES_SHIFT;
        assert!(corrupt_reason([cells, bad_pieces, progress]).contains("piece count"));

        assert!(corrupt_reason([3, header, progress]).contains("cell code"));
        assert!(corrupt_reason([1 << 60, header, progress]).contains("beyond"));

        // A white piece on the board with all nine still in hand.
        assert!(corrupt_reason([1, header, progress]).contains("White"));

        // A capture owed on an empty board.
        assert!(!corrupt_reason([cells, header, progress | 1 << PENDING_SHIFT]).is_empty());

        // A draw without a draw rule.
        let draw = progress | OUTCOME_DRAW << OUTCOME_SHIFT;
        assert!(corrupt_reason([cells, header, draw]).contains("draw"));

        // Mill bits past the last mill of six men's morris.
        let six = encode(&GameState::new(Rules::new(Variant::SixMen)));
        let spent = six[2] | 1 << (SPENT_WHITE_SHIFT + 12);
        assert!(corrupt_reason([six[0], six[1], spent]).contains("mill"));
    }

    /// Six men's morris words with three pieces in each hand, White to move
    /// and `pending` captures owed for the mills in `spent_white`.
    fn pending_words(
        rules: Rules,
        white: &[&str],
        black: &[&str],
        pending: u64,
        spent_white: u32,
    ) -> [u64; 3] {
        let topo = rules.variant.topology();
        let mut cells = 0;
        for (code, names) in [(CELL_WHITE, white), (CELL_BLACK, black)] {
            for name in names {
                let p = topo.parse_point(name).unwrap();
                cells |= code << (p as u32 * CELL_BITS);
            }
        }
        let [_, header, _] = encode(&GameState::new(rules));
        let hands = (HAND_MASK << HAND_WHITE_SHIFT) | (HAND_MASK << HAND_BLACK_SHIFT);
        let header = header & !hands | 3 << HAND_WHITE_SHIFT | 3 << HAND_BLACK_SHIFT;
        let progress = pending << PENDING_SHIFT | u64::from(spent_white) << SPENT_WHITE_SHIFT;
        [cells, header, progress]
    }

    #[test]
    fn test_rejects_inconsistent_pending_captures() {
        let six = Rules::new(Variant::SixMen);
        let per_mill = six.with_multi_mill(MultiMillCapture::PerMill);
        let top_row = ["A1", "C1", "E1"];
        let top_row_mill = 0;
        assert_eq!(six.variant.topology().mill(top_row_mill), [0, 1, 2]);

        // More captures owed than opponent pieces on the board.
        let words = pending_words(per_mill, &top_row, &["E5"], 2, 1 << top_row_mill);
        assert!(corrupt_reason(words).contains("captures owed but Black has 1"));

        // Two captures owed for a single mill.
        let words = pending_words(per_mill, &top_row, &["E5", "B2"], 2, 1 << top_row_mill);
        assert!(corrupt_reason(words).contains("for 1 mills"));

        // A capture owed with no mill behind it.
        let scattered = ["A1", "B2", "D4"];
        let words = pending_words(six, &scattered, &["E5"], 1, 0);
        assert!(corrupt_reason(words).contains("without a mill"));

        // A capture owed for a mill the mover no longer holds.
        let words = pending_words(six, &scattered, &["E5"], 1, 1 << top_row_mill);
        assert!(corrupt_reason(words).contains("does not hold"));

        // The consistent record loads and the capture can be played.
        let words = pending_words(six, &top_row, &["E5"], 1, 1 << top_row_mill);
        let mut state = decode(words).unwrap();
        assert_eq!(state.pending_captures(), 1);
        let e5 = state.board().topology().parse_point("E5").unwrap();
        state.play(Side::White, Move::Capture(e5)).unwrap();
        assert_eq!(state.side_to_move(), Side::Black);
    }

    #[test]
    fn test_text_errors() {
        assert!(matches!(
            from_text("1\n2"),
            Err(GameError::CorruptSaveData { .. })
        ));
        assert!(matches!(
            from_text("1\nx\n3\n"),
            Err(GameError::CorruptSaveData { .. })
        ));
        let state = GameState::new(Rules::default());
        let padded = format!("\n{}\n\n", to_text(&state));
        assert_eq!(from_text(&padded).unwrap(), state);
    }

    #[test]
    fn test_layout_fits_every_variant() {
        assert!(MAX_POINTS as u32 * CELL_BITS <= u64::BITS);
        assert!(MAX_MILLS as u32 <= SPENT_MASK.count_ones());
        for variant in Variant::ALL {
            let topo = variant.topology();
            assert!(topo.len() <= MAX_POINTS);
            assert!(topo.mills().len() <= MAX_MILLS);
            assert!(u64::from(variant.pieces()) <= PIECES_MASK);
        }
    }

    #[test]
    fn test_new_game_words() {
        let state = GameState::new(Rules::default());
        let [cells, header, progress] = encode(&state);
        assert_eq!(cells, 0);
        assert_eq!(header & HAND_MASK, 9);
        assert_eq!(header >> VERSION_SHIFT, SAVE_FORMAT_VERSION);
        assert_eq!(progress, 0);
    }
}
