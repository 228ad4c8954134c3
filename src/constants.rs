//! Rule constants and the save-format bit layout.
//!
//! Board geometry itself is data (see [`crate::topology`]); this module only
//! holds the numbers the rules and the save codec agree on.

// =============================================================================
// Board Geometry
// =============================================================================

/// Concentric squares on a Six Men's Morris board.
pub const SIX_MEN_RINGS: usize = 2;

/// Concentric squares on a Nine Men's Morris board.
pub const NINE_MEN_RINGS: usize = 3;

/// Points on each ring: four corners and four side midpoints.
pub const POINTS_PER_RING: usize = 8;

/// Largest point count of any supported board (nine-men).
pub const MAX_POINTS: usize = NINE_MEN_RINGS * POINTS_PER_RING;

/// Largest mill count of any supported board (nine-men).
pub const MAX_MILLS: usize = 16;

// =============================================================================
// Piece Counts
// =============================================================================

/// Pieces per side in Six Men's Morris.
pub const SIX_MEN_PIECES: u8 = 6;

/// Pieces per side in Nine Men's Morris.
pub const NINE_MEN_PIECES: u8 = 9;

/// A side that has placed everything and is down to this many pieces flies.
pub const FLYING_PIECES: usize = 3;

/// A side with fewer pieces than this (on board plus in hand) has lost.
pub const MIN_PIECES: usize = 3;

/// Most captures a single move can be owed (two mills closed at once).
pub const MAX_PENDING_CAPTURES: u8 = 2;

// =============================================================================
// Search
// =============================================================================

/// Plies the alpha-beta player looks ahead unless told otherwise.
pub const DEFAULT_SEARCH_DEPTH: u32 = 3;

/// Deepest search the command line accepts.
pub const MAX_SEARCH_DEPTH: u32 = 6;

/// Score of one piece still in play (on the board or in hand).
pub const MATERIAL_WEIGHT: i32 = 100;

/// Score of one piece standing in a formed mill.
pub const MILL_WEIGHT: i32 = 10;

/// Score of one empty point next to an own piece.
pub const MOBILITY_WEIGHT: i32 = 1;

/// Base score of a won game. Wins found sooner score higher.
pub const WIN_SCORE: i32 = 1_000_000;

// =============================================================================
// Save Format (version 1)
// =============================================================================
//
// Three unsigned integers, one per line. Bit 0 is the least significant bit.
//
// Word 0: board, two bits per point (0 empty, 1 white, 2 black).
// Word 1: hands, piece count, rule flags, draw rule, format version.
// Word 2: side to move, pending captures, outcome, spent mills, quiet plies.

/// Current save format version, stored in the top byte of word 1.
pub const SAVE_FORMAT_VERSION: u64 = 1;

/// Bits used per point in word 0.
pub const CELL_BITS: u32 = 2;

pub const CELL_EMPTY: u64 = 0;
pub const CELL_WHITE: u64 = 1;
pub const CELL_BLACK: u64 = 2;

pub const HAND_WHITE_SHIFT: u32 = 0;
pub const HAND_BLACK_SHIFT: u32 = 4;
pub const HAND_MASK: u64 = 0xF;
pub const PIECES_SHIFT: u32 = 8;
pub const PIECES_MASK: u64 = 0xF;
pub const FLAG_FLYING: u64 = 1 << 12;
pub const FLAG_WHITE_STARTS: u64 = 1 << 13;
pub const FLAG_PROTECT_MILLS: u64 = 1 << 14;
pub const FLAG_CAPTURE_PER_MILL: u64 = 1 << 15;
pub const FLAG_ALLOW_REPEATED_MILLS: u64 = 1 << 16;
pub const DRAW_AFTER_SHIFT: u32 = 24;
pub const DRAW_AFTER_MASK: u64 = 0xFFFF;
pub const VERSION_SHIFT: u32 = 56;

pub const TURN_BLACK: u64 = 1;
pub const PENDING_SHIFT: u32 = 1;
pub const PENDING_MASK: u64 = 0x3;
pub const OUTCOME_SHIFT: u32 = 3;
pub const OUTCOME_MASK: u64 = 0x3;
pub const OUTCOME_NONE: u64 = 0;
pub const OUTCOME_WHITE_WINS: u64 = 1;
pub const OUTCOME_BLACK_WINS: u64 = 2;
pub const OUTCOME_DRAW: u64 = 3;
pub const REASON_SHIFT: u32 = 5;
pub const REASON_MASK: u64 = 0x3;
pub const REASON_REDUCED: u64 = 0;
pub const REASON_BLOCKED: u64 = 1;
pub const REASON_RESIGNED: u64 = 2;
pub const SPENT_WHITE_SHIFT: u32 = 8;
pub const SPENT_BLACK_SHIFT: u32 = 24;
pub const SPENT_MASK: u64 = 0xFFFF;
pub const QUIET_SHIFT: u32 = 40;
pub const QUIET_MASK: u64 = 0xFFFF;
