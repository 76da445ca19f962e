mod bfs;
mod bidirectional;
mod dfs;

use std::fmt;

use thiserror::Error;

use crate::maze::{CellKey, Direction, Maze};
use crate::trace::VisitSink;

/// One step of a solved path: the cell plus the direction pointing from it
/// back to the cell it was reached from (`None` for a search root).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub key: CellKey,
    pub arrival: Option<Direction>,
}

/// Ordered steps from start to target. Each solver fixes its own inclusion
/// policy at the endpoints; see the solver functions.
pub type Path = Vec<PathStep>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolveError {
    #[error("cell key {0} is outside the maze")]
    UnknownKey(CellKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solver {
    Dfs,
    Bfs,
    Bidirectional,
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solver::Dfs => write!(f, "Depth-First Search (DFS)"),
            Solver::Bfs => write!(f, "Breadth-First Search (BFS)"),
            Solver::Bidirectional => write!(f, "Bidirectional BFS"),
        }
    }
}

/// Runs `solver` from `start` to `target` over an immutable maze, streaming
/// one visitation record per examined cell into `sink`.
///
/// Fails fast with [`SolveError::UnknownKey`] before any traversal if either
/// key is outside the grid. An unreachable target is not an error: the
/// solvers are total and return an empty path.
pub fn solve(
    maze: &Maze,
    solver: Solver,
    start: CellKey,
    target: CellKey,
    sink: &mut impl VisitSink,
) -> Result<Path, SolveError> {
    for key in [start, target] {
        if !maze.contains(key) {
            return Err(SolveError::UnknownKey(key));
        }
    }
    Ok(match solver {
        Solver::Dfs => dfs::dfs(maze, start, target, sink),
        Solver::Bfs => bfs::bfs(maze, start, target, sink),
        Solver::Bidirectional => bidirectional::bidirectional(maze, start, target, sink),
    })
}

#[cfg(test)]
pub(crate) mod support {
    use super::*;
    use crate::generate::generate;
    use crate::maze::StartPolicy;
    use crate::trace::NullSink;

    pub fn carved(size: u8, seed: u64) -> Maze {
        let mut maze = Maze::new(size, StartPolicy::Fixed, Some(seed)).unwrap();
        generate(&mut maze, Some(seed), &mut NullSink);
        maze
    }

    /// The key of the cell one step from `key` in `direction`.
    pub fn step_from(maze: &Maze, key: CellKey, direction: Direction) -> CellKey {
        let (row, col) = maze.position(key);
        match direction {
            Direction::Up => maze.key(row - 1, col),
            Direction::Down => maze.key(row + 1, col),
            Direction::Left => maze.key(row, col - 1),
            Direction::Right => maze.key(row, col + 1),
        }
    }

    /// Every step's arrival direction must cross an open passage.
    pub fn assert_steps_cross_open_passages(maze: &Maze, path: &Path) {
        for step in path {
            if let Some(direction) = step.arrival {
                let position = maze.position(step.key);
                assert!(
                    maze[position].is_open(direction),
                    "step at {:?} arrived through a wall",
                    position
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::support::{assert_steps_cross_open_passages, carved, step_from};
    use super::*;
    use crate::trace::NullSink;

    const SOLVERS: [Solver; 3] = [Solver::Dfs, Solver::Bfs, Solver::Bidirectional];

    #[test]
    fn test_unknown_keys_fail_before_any_traversal() {
        let maze = carved(3, 1);
        let bad_key = 9; // one past the last cell of a 3x3 grid
        for solver in SOLVERS {
            let mut records = Vec::new();
            let result = solve(&maze, solver, maze.start(), bad_key, &mut records);
            assert_eq!(result.unwrap_err(), SolveError::UnknownKey(bad_key));
            assert!(records.is_empty());
        }
    }

    #[test]
    fn test_every_solver_crosses_only_open_passages() {
        let maze = carved(9, 23);
        for solver in SOLVERS {
            let path = solve(&maze, solver, maze.start(), maze.end(), &mut NullSink).unwrap();
            assert!(!path.is_empty());
            assert_steps_cross_open_passages(&maze, &path);
        }
    }

    #[test]
    fn test_solvers_agree_on_the_intermediate_cell_set() {
        let maze = carved(8, 17);
        let endpoints = [maze.start(), maze.end()];

        let mut intermediate_sets = Vec::new();
        for solver in SOLVERS {
            let path = solve(&maze, solver, maze.start(), maze.end(), &mut NullSink).unwrap();
            let cells: HashSet<CellKey> = path
                .iter()
                .map(|step| step.key)
                .filter(|key| !endpoints.contains(key))
                .collect();
            intermediate_sets.push(cells);
        }

        // The maze is a tree: one simple path exists, so every strategy must
        // walk the same cells between the endpoints.
        assert_eq!(intermediate_sets[0], intermediate_sets[1]);
        assert_eq!(intermediate_sets[1], intermediate_sets[2]);
    }

    #[test]
    fn test_every_arrival_direction_points_at_the_predecessor() {
        let maze = carved(7, 31);
        let path = solve(&maze, Solver::Dfs, maze.start(), maze.end(), &mut NullSink).unwrap();

        for pair in path.windows(2) {
            let direction = pair[1].arrival.expect("only the start step lacks a direction");
            assert_eq!(step_from(&maze, pair[1].key, direction), pair[0].key);
        }
    }
}
