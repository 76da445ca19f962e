use std::collections::HashSet;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::maze::{CellKey, Maze};
use crate::trace::VisitSink;

/// Get a random number generator, optionally seeded for reproducibility.
pub(crate) fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Carves a perfect maze with randomized Prim's algorithm.
///
/// The tree starts at the maze's start cell and grows by one uniformly
/// random frontier edge per iteration: the chosen edge's passage is opened
/// (both flags, keeping the mirror invariant), the destination joins the
/// tree, its own candidate edges join the frontier, and every frontier edge
/// whose destination is already in the tree is pruned. The result spans all
/// cells with no cycles.
///
/// Records `(origin, None)` when the tree is seeded, then one record per
/// added cell with its arrival direction, in carve order. A fixed `seed`
/// reproduces the identical maze.
pub fn generate(maze: &mut Maze, seed: Option<u64>, sink: &mut impl VisitSink) {
    let mut rng = get_rng(seed);
    let total = maze.size() as usize * maze.size() as usize;

    let origin = maze.start();
    let mut tree: HashSet<CellKey> = HashSet::with_capacity(total);
    tree.insert(origin);
    sink.record(origin, None);

    let (row, col) = maze.position(origin);
    let mut frontier = maze.candidate_edges(row, col);

    // Invariant: the frontier holds exactly the edges from a tree cell to a
    // cell outside the tree, so every pick grows the tree by one cell and
    // the loop ends after total - 1 passages.
    while tree.len() < total {
        debug_assert!(!frontier.is_empty());
        let edge = frontier.swap_remove(rng.random_range(0..frontier.len()));

        tree.insert(edge.dest);
        maze.open(edge.source, edge.direction);
        sink.record(edge.dest, Some(edge.direction.opposite()));

        let (row, col) = maze.position(edge.dest);
        frontier.extend(maze.candidate_edges(row, col));
        frontier.retain(|e| !tree.contains(&e.dest));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use super::*;
    use crate::maze::{Direction, StartPolicy};
    use crate::trace::NullSink;

    const DIRECTIONS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    fn generated(size: u8, seed: u64) -> Maze {
        let mut maze = Maze::new(size, StartPolicy::Fixed, Some(seed)).unwrap();
        generate(&mut maze, Some(seed), &mut NullSink);
        maze
    }

    /// Count of open passages, each counted once.
    fn passage_count(maze: &Maze) -> usize {
        let mut flags = 0;
        for row in 0..maze.size() {
            for col in 0..maze.size() {
                for direction in DIRECTIONS {
                    if maze[(row, col)].is_open(direction) {
                        flags += 1;
                    }
                }
            }
        }
        // Every passage is mirrored on both of its cells.
        flags / 2
    }

    fn reachable_from(maze: &Maze, key: CellKey) -> HashSet<CellKey> {
        let mut seen = HashSet::from([key]);
        let mut queue = VecDeque::from([key]);
        while let Some(key) = queue.pop_front() {
            for (neighbor, _) in maze.neighbors(key) {
                if seen.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        seen
    }

    #[test]
    fn test_generated_maze_is_a_spanning_tree() {
        let maze = generated(8, 3);
        let total = 8 * 8;
        assert_eq!(passage_count(&maze), total - 1);
        assert_eq!(reachable_from(&maze, maze.key(5, 2)).len(), total);
    }

    #[test]
    fn test_passage_flags_are_mirrored() {
        let maze = generated(6, 11);
        for row in 0..6u8 {
            for col in 0..6u8 {
                let checks = [
                    (Direction::Up, row.checked_sub(1).map(|r| (r, col))),
                    (Direction::Down, (row + 1 < 6).then(|| (row + 1, col))),
                    (Direction::Left, col.checked_sub(1).map(|c| (row, c))),
                    (Direction::Right, (col + 1 < 6).then(|| (row, col + 1))),
                ];
                for (direction, neighbor) in checks {
                    if maze[(row, col)].is_open(direction) {
                        let (nrow, ncol) = neighbor.expect("open passage across the boundary");
                        assert!(maze[(nrow, ncol)].is_open(direction.opposite()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_fixed_seed_reproduces_the_maze() {
        let first = generated(10, 42);
        let second = generated(10, 42);
        assert_eq!(first.cells(), second.cells());
    }

    #[test]
    fn test_single_cell_maze_generation_is_a_no_op() {
        let mut maze = Maze::new(1, StartPolicy::Fixed, None).unwrap();
        let mut records = Vec::new();
        generate(&mut maze, Some(0), &mut records);
        assert_eq!(records, vec![(maze.key(0, 0), None)]);
        assert_eq!(passage_count(&maze), 0);
    }

    #[test]
    fn test_carve_records_cover_every_cell_once() {
        let mut maze = Maze::new(7, StartPolicy::Fixed, Some(5)).unwrap();
        let mut records = Vec::new();
        generate(&mut maze, Some(5), &mut records);

        assert_eq!(records[0], (maze.start(), None));
        assert_eq!(records.len(), 7 * 7);
        let keys: HashSet<CellKey> = records.iter().map(|&(key, _)| key).collect();
        assert_eq!(keys.len(), records.len());
    }

    #[test]
    fn test_two_by_two_maze_has_three_passages() {
        let maze = generated(2, 9);
        assert_eq!(passage_count(&maze), 3);
        assert_eq!(reachable_from(&maze, maze.key(0, 0)).len(), 4);
    }
}
