use std::collections::{HashMap, VecDeque};

use crate::maze::{CellKey, Direction, Maze};
use crate::solvers::{Path, PathStep};
use crate::trace::VisitSink;

/// One side's search state: a breadth-first wave growing out of its root.
struct Wavefront {
    visited: HashMap<CellKey, Option<Direction>>,
    parent: HashMap<CellKey, Option<CellKey>>,
    frontier: VecDeque<CellKey>,
}

impl Wavefront {
    fn rooted_at(root: CellKey) -> Self {
        Wavefront {
            visited: HashMap::from([(root, None)]),
            parent: HashMap::from([(root, None)]),
            frontier: VecDeque::from([root]),
        }
    }

    /// Parent-chain walk from `from` back to this side's root, excluding
    /// the root sentinel. Steps keep this side's recorded directions, which
    /// point toward its root.
    fn walk_to_root(&self, from: CellKey) -> Vec<PathStep> {
        let mut steps = Vec::new();
        let mut current = from;
        while let Some(&Some(parent_key)) = self.parent.get(&current) {
            steps.push(PathStep {
                key: current,
                arrival: self.visited[&current],
            });
            current = parent_key;
        }
        steps
    }
}

/// Two breadth-first searches, one rooted at each endpoint, alternating
/// strictly: one dequeue per iteration regardless of frontier sizes.
///
/// After a dequeued cell is expanded, the searches have met once that cell
/// is present in both visited maps. On a carved maze the meeting cell lies
/// on the unique start-target path, so the joined walks reproduce it. The
/// result is the start-side walk (reversed to run outward from start)
/// followed by the end-side walk toward the target; both root sentinels are
/// excluded, and the meeting cell appears once per side, each entry carrying
/// that side's direction. When start equals target the first dequeue meets
/// immediately and the path is empty.
pub(crate) fn bidirectional(
    maze: &Maze,
    start: CellKey,
    target: CellKey,
    sink: &mut impl VisitSink,
) -> Path {
    let mut sides = [Wavefront::rooted_at(start), Wavefront::rooted_at(target)];
    let mut current = 0;

    while sides.iter().any(|side| !side.frontier.is_empty()) {
        let side = &mut sides[current];
        current = 1 - current;

        let Some(key) = side.frontier.pop_front() else {
            // This side is exhausted; the other keeps searching.
            continue;
        };
        sink.record(key, side.visited[&key]);

        for (neighbor, arrival) in maze.neighbors(key) {
            if !side.visited.contains_key(&neighbor) {
                side.visited.insert(neighbor, Some(arrival));
                side.parent.insert(neighbor, Some(key));
                side.frontier.push_back(neighbor);
            }
        }

        if sides[0].visited.contains_key(&key) && sides[1].visited.contains_key(&key) {
            let mut path = sides[0].walk_to_root(key);
            path.reverse();
            path.extend(sides[1].walk_to_root(key));
            return path;
        }
    }

    Vec::new()
}
