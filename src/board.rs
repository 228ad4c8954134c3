use std::fmt;

use crate::topology::{MillId, Point, Topology, Variant};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::White, Side::Black];

    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Index into per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

/// Occupancy of every point of a board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    topology: &'static Topology,
    cells: Vec<Option<Side>>,
}

impl Board {
    pub fn new(variant: Variant) -> Self {
        Self::with_topology(variant.topology())
    }

    pub fn with_topology(topology: &'static Topology) -> Self {
        Self {
            topology,
            cells: vec![None; topology.len()],
        }
    }

    pub fn topology(&self) -> &'static Topology {
        self.topology
    }

    pub fn occupancy_at(&self, p: Point) -> Option<Side> {
        self.cells[p]
    }

    pub(crate) fn set_occupancy(&mut self, p: Point, occupant: Option<Side>) {
        self.cells[p] = occupant;
    }

    /// Points held by `side`, ascending.
    pub fn positions_occupied_by(&self, side: Side) -> Vec<Point> {
        self.topology
            .points()
            .filter(|&p| self.cells[p] == Some(side))
            .collect()
    }

    /// Empty points, ascending.
    pub fn empty_positions(&self) -> Vec<Point> {
        self.topology
            .points()
            .filter(|&p| self.cells[p].is_none())
            .collect()
    }

    pub fn count(&self, side: Side) -> usize {
        self.cells.iter().filter(|&&c| c == Some(side)).count()
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn mills_containing(&self, p: Point) -> &'static [MillId] {
        self.topology.mills_containing(p)
    }

    /// True when all three points of `mill` belong to `side`.
    pub fn is_mill_satisfied(&self, mill: MillId, side: Side) -> bool {
        self.topology
            .mill(mill)
            .iter()
            .all(|&p| self.cells[p] == Some(side))
    }

    /// True when the piece on `p` is part of a mill its owner has formed.
    pub fn is_in_formed_mill(&self, p: Point) -> bool {
        match self.cells[p] {
            Some(side) => self
                .mills_containing(p)
                .iter()
                .any(|&m| self.is_mill_satisfied(m, side)),
            None => false,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Points sit on every other canvas row and every fourth column; the
        // cells between adjacent points are filled with line characters.
        let topo = self.topology;
        let size = topo.size();
        let height = 2 * size - 1;
        let width = 4 * (size - 1) + 1;
        let mut canvas = vec![vec![' '; width]; height];

        for a in topo.points() {
            let ca = topo.coord(a);
            for &b in topo.neighbors(a).iter().filter(|&&b| b > a) {
                let cb = topo.coord(b);
                if ca.row == cb.row {
                    let y = 2 * ca.row as usize;
                    for x in 4 * ca.col as usize + 1..4 * cb.col as usize {
                        canvas[y][x] = '-';
                    }
                } else {
                    let x = 4 * ca.col as usize;
                    for y in 2 * ca.row as usize + 1..2 * cb.row as usize {
                        canvas[y][x] = '|';
                    }
                }
            }
        }
        for p in topo.points() {
            let c = topo.coord(p);
            canvas[2 * c.row as usize][4 * c.col as usize] = match self.cells[p] {
                Some(Side::White) => 'O',
                Some(Side::Black) => 'X',
                None => '.',
            };
        }

        write!(f, "    ")?;
        for col in 0..size {
            write!(f, "{:<4}", (b'A' + col as u8) as char)?;
        }
        writeln!(f)?;
        for (y, line) in canvas.iter().enumerate() {
            let line: String = line.iter().collect();
            if y % 2 == 0 {
                writeln!(f, "{:>2}  {}", y / 2 + 1, line.trim_end())?;
            } else {
                writeln!(f, "    {}", line.trim_end())?;
            }
        }
        Ok(())
    }
}
