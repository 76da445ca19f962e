pub mod cell;

use rand::Rng;
use thiserror::Error;

pub use cell::{Cell, Direction};

use crate::generate::get_rng;

/// Packed cell identity: `row * size + col`.
///
/// The grid side fits a `u8`, so every key of a 255x255 maze fits a `u16`.
pub type CellKey = u16;

/// A candidate passage between two adjacent cells. Edges only exist inside
/// the generator's frontier; the carved maze stores passage flags instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: CellKey,
    pub direction: Direction,
    pub dest: CellKey,
}

/// Where the start and end cells are placed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPolicy {
    /// Start at (0, 0), end at (N-1, N-1).
    Fixed,
    /// Two uniformly random cells, distinct whenever the grid has more
    /// than one cell.
    Random,
}

impl std::fmt::Display for StartPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartPolicy::Fixed => write!(f, "Fixed corners (top-left to bottom-right)"),
            StartPolicy::Random => write!(f, "Random start and end cells"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze size must be at least 1")]
    InvalidSize,
}

/// A square maze of `size * size` cells.
///
/// Construction leaves every wall standing; the generator carves passages in
/// place, and from then on the maze is read-only. Solvers share it freely
/// since each owns its own traversal state.
#[derive(Debug)]
pub struct Maze {
    cells: Box<[Cell]>,
    size: u8,
    start: CellKey,
    end: CellKey,
}

impl Maze {
    /// Creates an all-walled maze and places the start and end markers
    /// according to `policy`. Fails fast on a zero size.
    pub fn new(size: u8, policy: StartPolicy, seed: Option<u64>) -> Result<Self, MazeError> {
        if size == 0 {
            return Err(MazeError::InvalidSize);
        }
        let total = size as usize * size as usize;
        let mut cells = vec![Cell::default(); total].into_boxed_slice();

        let (start, end) = match policy {
            StartPolicy::Fixed => (0, (total - 1) as CellKey),
            StartPolicy::Random => {
                let mut rng = get_rng(seed);
                let start = rng.random_range(0..total) as CellKey;
                let mut end = rng.random_range(0..total) as CellKey;
                while end == start && total > 1 {
                    end = rng.random_range(0..total) as CellKey;
                }
                (start, end)
            }
        };
        cells[start as usize].is_start = true;
        cells[end as usize].is_end = true;

        Ok(Maze {
            cells,
            size,
            start,
            end,
        })
    }

    /// Grid side length in cells.
    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn start(&self) -> CellKey {
        self.start
    }

    pub fn end(&self) -> CellKey {
        self.end
    }

    /// Packs a coordinate pair into its cell key. Exact inverse of
    /// [`Maze::position`] for all in-bounds coordinates.
    pub fn key(&self, row: u8, col: u8) -> CellKey {
        row as CellKey * self.size as CellKey + col as CellKey
    }

    /// Unpacks a cell key back into its (row, col) coordinate pair.
    pub fn position(&self, key: CellKey) -> (u8, u8) {
        ((key / self.size as CellKey) as u8, (key % self.size as CellKey) as u8)
    }

    /// Whether `key` names a cell of this maze.
    pub fn contains(&self, key: CellKey) -> bool {
        (key as usize) < self.cells.len()
    }

    /// Open-passage neighbors of `key`, in the fixed order up, down, left,
    /// right.
    ///
    /// Each entry pairs the neighbor's key with the direction pointing from
    /// the neighbor back into `key`, the opposite of the travel direction.
    /// A search stores that value as the neighbor's arrival direction once
    /// the neighbor becomes the current cell.
    pub fn neighbors(&self, key: CellKey) -> impl Iterator<Item = (CellKey, Direction)> {
        let (row, col) = self.position(key);
        let cell = self.cells[key as usize];
        let mut open = Vec::with_capacity(4);
        if cell.is_open(Direction::Up) {
            open.push((self.key(row - 1, col), Direction::Down));
        }
        if cell.is_open(Direction::Down) {
            open.push((self.key(row + 1, col), Direction::Up));
        }
        if cell.is_open(Direction::Left) {
            open.push((self.key(row, col - 1), Direction::Right));
        }
        if cell.is_open(Direction::Right) {
            open.push((self.key(row, col + 1), Direction::Left));
        }
        open.into_iter()
    }

    /// The up-to-4 grid-adjacent candidate edges from (row, col), in
    /// insertion order up, down, right, left. No edge crosses the boundary.
    pub fn candidate_edges(&self, row: u8, col: u8) -> Vec<Edge> {
        let source = self.key(row, col);
        let mut edges = Vec::with_capacity(4);
        if row > 0 {
            edges.push(Edge {
                source,
                direction: Direction::Up,
                dest: self.key(row - 1, col),
            });
        }
        if row + 1 < self.size {
            edges.push(Edge {
                source,
                direction: Direction::Down,
                dest: self.key(row + 1, col),
            });
        }
        if col + 1 < self.size {
            edges.push(Edge {
                source,
                direction: Direction::Right,
                dest: self.key(row, col + 1),
            });
        }
        if col > 0 {
            edges.push(Edge {
                source,
                direction: Direction::Left,
                dest: self.key(row, col - 1),
            });
        }
        edges
    }

    /// Opens the passage leaving `source` in `direction` and mirrors the
    /// flag on the destination cell. This is the only mutation the maze sees
    /// after construction, and only the generator performs it.
    pub fn open(&mut self, source: CellKey, direction: Direction) {
        let (row, col) = self.position(source);
        let dest = match direction {
            Direction::Up => self.key(row - 1, col),
            Direction::Down => self.key(row + 1, col),
            Direction::Left => self.key(row, col - 1),
            Direction::Right => self.key(row, col + 1),
        };
        self.cells[source as usize].open(direction);
        self.cells[dest as usize].open(direction.opposite());
    }

    #[cfg(test)]
    /// Raw cell slice for property tests.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

impl std::ops::Index<(u8, u8)> for Maze {
    type Output = Cell;

    fn index(&self, index: (u8, u8)) -> &Self::Output {
        &self.cells[self.key(index.0, index.1) as usize]
    }
}
