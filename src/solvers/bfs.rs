use std::collections::{HashMap, VecDeque};

use crate::maze::{CellKey, Direction, Maze};
use crate::solvers::{Path, PathStep};
use crate::trace::VisitSink;

/// Breadth-first search over a first-in-first-out frontier.
///
/// Cells are marked visited at enqueue time, so no cell can enter the
/// frontier twice; the visitation record is emitted at dequeue time, in
/// level order. The first dequeue of the target yields a shortest path by
/// edge count, which on a carved maze is the unique tree path.
///
/// The returned path excludes the start sentinel: it runs from the first
/// cell after start to the target, each step carrying the direction it was
/// reached through.
pub(crate) fn bfs(
    maze: &Maze,
    start: CellKey,
    target: CellKey,
    sink: &mut impl VisitSink,
) -> Path {
    let mut visited: HashMap<CellKey, Option<Direction>> = HashMap::from([(start, None)]);
    let mut parent: HashMap<CellKey, Option<CellKey>> = HashMap::from([(start, None)]);
    let mut frontier = VecDeque::from([start]);

    while let Some(key) = frontier.pop_front() {
        sink.record(key, visited[&key]);

        if key == target {
            // Walk the parent chain back to start; the start sentinel stays
            // out of the path.
            let mut path = Vec::new();
            let mut current = key;
            while let Some(&Some(parent_key)) = parent.get(&current) {
                path.push(PathStep {
                    key: current,
                    arrival: visited[&current],
                });
                current = parent_key;
            }
            path.reverse();
            return path;
        }

        for (neighbor, arrival) in maze.neighbors(key) {
            if !visited.contains_key(&neighbor) {
                visited.insert(neighbor, Some(arrival));
                parent.insert(neighbor, Some(key));
                frontier.push_back(neighbor);
            }
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::solvers::support::{carved, step_from};
    use crate::trace::NullSink;

    /// Reference distance map: tree distance from `root` to every cell.
    fn flood_distances(maze: &Maze, root: CellKey) -> HashMap<CellKey, usize> {
        let mut distances = HashMap::from([(root, 0)]);
        let mut queue = VecDeque::from([root]);
        while let Some(key) = queue.pop_front() {
            let next = distances[&key] + 1;
            for (neighbor, _) in maze.neighbors(key) {
                if !distances.contains_key(&neighbor) {
                    distances.insert(neighbor, next);
                    queue.push_back(neighbor);
                }
            }
        }
        distances
    }

    #[test]
    fn test_path_length_equals_tree_distance() {
        let maze = carved(9, 41);
        let path = bfs(&maze, maze.start(), maze.end(), &mut NullSink);
        let distances = flood_distances(&maze, maze.start());
        // One step per edge, start excluded.
        assert_eq!(path.len(), distances[&maze.end()]);
    }

    #[test]
    fn test_path_excludes_start_and_ends_at_target() {
        let maze = carved(5, 8);
        let path = bfs(&maze, maze.start(), maze.end(), &mut NullSink);

        let first = path.first().unwrap();
        assert_ne!(first.key, maze.start());
        // The first step is adjacent to start, through its arrival passage.
        let direction = first.arrival.unwrap();
        assert_eq!(step_from(&maze, first.key, direction), maze.start());
        assert_eq!(path.last().unwrap().key, maze.end());
    }

    #[test]
    fn test_two_by_two_path_has_one_intermediate_corner() {
        let maze = carved(2, 9);
        let path = bfs(&maze, maze.key(0, 0), maze.key(1, 1), &mut NullSink);

        assert_eq!(path.len(), 2);
        let intermediate = maze.position(path[0].key);
        assert!(intermediate == (0, 1) || intermediate == (1, 0));
        assert_eq!(path[1].key, maze.key(1, 1));
    }

    #[test]
    fn test_records_run_in_level_order() {
        let maze = carved(6, 14);
        let mut records = Vec::new();
        bfs(&maze, maze.start(), maze.end(), &mut records);
        let distances = flood_distances(&maze, maze.start());

        assert_eq!(records.first().unwrap(), &(maze.start(), None));
        assert_eq!(records.last().unwrap().0, maze.end());
        // Dequeue order never steps back to a nearer level.
        for pair in records.windows(2) {
            assert!(distances[&pair[0].0] <= distances[&pair[1].0]);
        }
    }
}
