use std::collections::HashMap;

use crate::maze::{CellKey, Direction, Maze};
use crate::solvers::{Path, PathStep};
use crate::trace::VisitSink;

/// One suspended branch of the traversal: the cell it entered, how it got
/// there, and how far through the cell's neighbor list it has looked.
struct Frame {
    step: PathStep,
    neighbors: Vec<(CellKey, Direction)>,
    next: usize,
}

/// Depth-first search with an explicit frame stack, so deep mazes cannot
/// exhaust the call stack.
///
/// Explores one branch to exhaustion before backtracking, visiting neighbors
/// in the maze's deterministic iteration order; for a fixed maze the result
/// is reproducible. Emits each cell's visitation record on first visit,
/// before the target test. The returned path runs root-to-target and
/// includes the start step `(start, None)`.
pub(crate) fn dfs(
    maze: &Maze,
    start: CellKey,
    target: CellKey,
    sink: &mut impl VisitSink,
) -> Path {
    let mut visited: HashMap<CellKey, Option<Direction>> = HashMap::new();

    visited.insert(start, None);
    sink.record(start, None);
    if start == target {
        return vec![PathStep {
            key: start,
            arrival: None,
        }];
    }

    let mut stack = vec![Frame {
        step: PathStep {
            key: start,
            arrival: None,
        },
        neighbors: maze.neighbors(start).collect(),
        next: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        if frame.next >= frame.neighbors.len() {
            // Every branch below this cell came up empty: backtrack.
            stack.pop();
            continue;
        }
        let (key, arrival) = frame.neighbors[frame.next];
        frame.next += 1;

        // The maze is a tree, but the search stays cycle-safe regardless.
        if visited.contains_key(&key) {
            continue;
        }
        visited.insert(key, Some(arrival));
        sink.record(key, Some(arrival));

        if key == target {
            // The live stack is exactly the root-to-target chain.
            let mut path: Path = stack.iter().map(|frame| frame.step).collect();
            path.push(PathStep {
                key,
                arrival: Some(arrival),
            });
            return path;
        }

        stack.push(Frame {
            step: PathStep {
                key,
                arrival: Some(arrival),
            },
            neighbors: maze.neighbors(key).collect(),
            next: 0,
        });
    }

    // Target unreachable from start; a carved maze never gets here.
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::support::carved;
    use crate::trace::NullSink;

    #[test]
    fn test_path_runs_from_start_to_target_inclusive() {
        let maze = carved(6, 2);
        let path = dfs(&maze, maze.start(), maze.end(), &mut NullSink);

        let first = path.first().unwrap();
        assert_eq!(first.key, maze.start());
        assert_eq!(first.arrival, None);
        assert_eq!(path.last().unwrap().key, maze.end());
    }

    #[test]
    fn test_single_cell_search_returns_one_step() {
        let maze = carved(1, 0);
        let mut records = Vec::new();
        let path = dfs(&maze, maze.key(0, 0), maze.key(0, 0), &mut records);
        assert_eq!(
            path,
            vec![PathStep {
                key: maze.key(0, 0),
                arrival: None
            }]
        );
        assert_eq!(records, vec![(maze.key(0, 0), None)]);
    }

    #[test]
    fn test_visits_start_first_and_target_last() {
        let maze = carved(7, 13);
        let mut records = Vec::new();
        dfs(&maze, maze.start(), maze.end(), &mut records);

        assert_eq!(records.first().unwrap(), &(maze.start(), None));
        // The search stops as soon as the target is visited.
        assert_eq!(records.last().unwrap().0, maze.end());
    }

    #[test]
    fn test_result_is_deterministic_for_a_fixed_maze() {
        let maze = carved(8, 5);
        let first = dfs(&maze, maze.start(), maze.end(), &mut NullSink);
        let second = dfs(&maze, maze.start(), maze.end(), &mut NullSink);
        assert_eq!(first, second);
    }
}
