//! Board topology: points, adjacency and mills as data tables.
//!
//! Every supported board is a set of concentric squares. Each square ("ring")
//! carries eight points, four corners and four side midpoints, and the
//! midpoints of neighbouring rings are joined by spokes. The tables are built
//! once per [`Variant`] and shared as `&'static Topology`, so the rest of the
//! engine never branches on which game is being played.
//!
//! Points are numbered in ascending (row, column) order. Coordinates use a
//! column letter and a row digit, `A1` being the corner at column 0, row 0.

use std::fmt;
use std::sync::OnceLock;

use crate::constants::{
    NINE_MEN_PIECES, NINE_MEN_RINGS, POINTS_PER_RING, SIX_MEN_PIECES, SIX_MEN_RINGS,
};

/// A point on the board, represented as an index into the topology tables.
pub type Point = usize;

/// Index of a mill in [`Topology::mills`].
pub type MillId = usize;

/// Supported board variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    SixMen,
    NineMen,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::SixMen, Variant::NineMen];

    /// Pieces each side starts with.
    pub fn pieces(self) -> u8 {
        match self {
            Variant::SixMen => SIX_MEN_PIECES,
            Variant::NineMen => NINE_MEN_PIECES,
        }
    }

    /// Number of concentric squares on the board.
    pub fn rings(self) -> usize {
        match self {
            Variant::SixMen => SIX_MEN_RINGS,
            Variant::NineMen => NINE_MEN_RINGS,
        }
    }

    pub fn from_pieces(pieces: u8) -> Option<Variant> {
        Variant::ALL.into_iter().find(|v| v.pieces() == pieces)
    }

    /// The shared topology tables for this variant.
    pub fn topology(self) -> &'static Topology {
        static SIX: OnceLock<Topology> = OnceLock::new();
        static NINE: OnceLock<Topology> = OnceLock::new();
        match self {
            Variant::SixMen => SIX.get_or_init(|| Topology::concentric(self)),
            Variant::NineMen => NINE.get_or_init(|| Topology::concentric(self)),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::SixMen => write!(f, "Six Men's Morris"),
            Variant::NineMen => write!(f, "Nine Men's Morris"),
        }
    }
}

/// Grid coordinate of a point. `col` 0 is `A`, `row` 0 is `1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub fn new(col: u8, row: u8) -> Self {
        Self { row, col }
    }

    /// Parse a two-character coordinate such as `a1` or `G7`.
    ///
    /// Only checks the syntax; whether the grid cell is a point of a given
    /// board is answered by [`Topology::point_at`].
    pub fn parse(s: &str) -> Option<Coord> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col_char = bytes[0].to_ascii_uppercase();
        let row_char = bytes[1];
        if !col_char.is_ascii_uppercase() || !(b'1'..=b'9').contains(&row_char) {
            return None;
        }
        Some(Coord::new(col_char - b'A', row_char - b'1'))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.col) as char, self.row + 1)
    }
}

/// Immutable per-variant tables.
#[derive(Debug, PartialEq, Eq)]
pub struct Topology {
    variant: Variant,
    /// Width (and height) of the square grid the points live on.
    size: usize,
    coords: Vec<Coord>,
    adjacency: Vec<Vec<Point>>,
    mills: Vec<[Point; 3]>,
    mills_of: Vec<Vec<MillId>>,
}

impl Topology {
    /// Build the concentric-squares board for `variant`.
    pub fn concentric(variant: Variant) -> Self {
        let rings = variant.rings();
        let size = 2 * rings + 1;
        let mid = rings as u8;

        // Walk each ring clockwise from its top-left corner.
        let ring_coords: Vec<[Coord; POINTS_PER_RING]> = (0..rings)
            .map(|r| {
                let lo = r as u8;
                let hi = (size - 1 - r) as u8;
                [
                    Coord::new(lo, lo),
                    Coord::new(mid, lo),
                    Coord::new(hi, lo),
                    Coord::new(hi, mid),
                    Coord::new(hi, hi),
                    Coord::new(mid, hi),
                    Coord::new(lo, hi),
                    Coord::new(lo, mid),
                ]
            })
            .collect();

        let mut coords: Vec<Coord> = ring_coords.iter().flatten().copied().collect();
        coords.sort();
        let id = |c: Coord| -> Point {
            coords
                .binary_search(&c)
                .unwrap_or_else(|_| unreachable!("ring coordinate {c} missing from table"))
        };

        let mut adjacency = vec![Vec::new(); coords.len()];
        let mut link = |a: Point, b: Point| {
            adjacency[a].push(b);
            adjacency[b].push(a);
        };
        let mut mills = Vec::new();

        for ring in &ring_coords {
            for k in 0..POINTS_PER_RING {
                link(id(ring[k]), id(ring[(k + 1) % POINTS_PER_RING]));
            }
            // Each side of a square is corner, midpoint, corner.
            for k in (0..POINTS_PER_RING).step_by(2) {
                mills.push([
                    id(ring[k]),
                    id(ring[k + 1]),
                    id(ring[(k + 2) % POINTS_PER_RING]),
                ]);
            }
        }

        // Spokes join the side midpoints of neighbouring rings.
        for k in (1..POINTS_PER_RING).step_by(2) {
            let spoke: Vec<Point> = ring_coords.iter().map(|ring| id(ring[k])).collect();
            for pair in spoke.windows(2) {
                link(pair[0], pair[1]);
            }
            for triple in spoke.windows(3) {
                mills.push([triple[0], triple[1], triple[2]]);
            }
        }

        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
            neighbors.dedup();
        }
        for mill in &mut mills {
            mill.sort_unstable();
        }
        mills.sort_unstable();

        let mut mills_of = vec![Vec::new(); coords.len()];
        for (m, mill) in mills.iter().enumerate() {
            for &p in mill {
                mills_of[p].push(m);
            }
        }

        Self {
            variant,
            size,
            coords,
            adjacency,
            mills,
            mills_of,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Grid width used for rendering.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of points on the board.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn points(&self) -> std::ops::Range<Point> {
        0..self.coords.len()
    }

    pub fn coord(&self, p: Point) -> Coord {
        self.coords[p]
    }

    pub fn point_at(&self, coord: Coord) -> Option<Point> {
        self.coords.binary_search(&coord).ok()
    }

    /// Parse a coordinate token into a point of this board.
    pub fn parse_point(&self, s: &str) -> Option<Point> {
        Coord::parse(s).and_then(|c| self.point_at(c))
    }

    /// Neighbors of `p` in ascending order.
    pub fn neighbors(&self, p: Point) -> &[Point] {
        &self.adjacency[p]
    }

    pub fn is_adjacent(&self, a: Point, b: Point) -> bool {
        self.adjacency[a].binary_search(&b).is_ok()
    }

    pub fn mills(&self) -> &[[Point; 3]] {
        &self.mills
    }

    pub fn mill(&self, id: MillId) -> [Point; 3] {
        self.mills[id]
    }

    /// Ids of the mills that `p` belongs to.
    pub fn mills_containing(&self, p: Point) -> &[MillId] {
        &self.mills_of[p]
    }
}
