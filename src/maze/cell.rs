use std::fmt;

/// One of the four cardinal travel directions between adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The direction that crosses the same passage the other way.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        write!(f, "{}", name)
    }
}

/// Connectivity state of a single grid position.
///
/// A `true` passage flag means the wall in that direction has been carved
/// open. The neighboring cell always carries the mirrored flag for the
/// opposite direction; `Maze::open` is the only place that sets both.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    pub is_start: bool,
    pub is_end: bool,
}

impl Cell {
    /// Whether the passage in `direction` is open.
    pub fn is_open(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Carve the passage in `direction`. Mirroring the flag on the
    /// neighboring cell is `Maze::open`'s job.
    pub(crate) fn open(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.up = true,
            Direction::Down => self.down = true,
            Direction::Left => self.left = true,
            Direction::Right => self.right = true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_an_involution() {
        for direction in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            assert_ne!(direction.opposite(), direction);
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn test_open_sets_only_the_requested_flag() {
        let mut cell = Cell::default();
        cell.open(Direction::Right);
        assert!(cell.is_open(Direction::Right));
        for closed in [Direction::Up, Direction::Down, Direction::Left] {
            assert!(!cell.is_open(closed));
        }
    }
}
