use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use std::f64::consts::SQRT_2;

use crate::goals::GoalSet;
use crate::grid::{Coord, GridMap};
use crate::movement::resolve;

/// Constraints applied during pathfinding.
#[derive(Debug, Default, Clone)]
pub struct PathConstraints {
    /// Permit diagonal edges into explored cells.
    pub allow_diagonal: bool,
    /// Cells the route must not pass through unless they are a goal.
    pub deferred: BTreeSet<Coord>,
}

impl PathConstraints {
    pub fn cardinal() -> Self {
        Self::default()
    }

    pub fn diagonal() -> Self {
        Self {
            allow_diagonal: true,
            ..Self::default()
        }
    }

    fn allows(&self, target: Coord, goals: &GoalSet) -> bool {
        !self.deferred.contains(&target) || goals.contains(target)
    }
}

/// Octile distance between two cells.
///
/// Exact for an empty grid with diagonal moves, so it never overestimates.
pub fn octile_distance(a: Coord, b: Coord) -> f64 {
    let dx = f64::from((a.x - b.x).abs());
    let dy = f64::from((a.y - b.y).abs());
    (dx + dy) + (SQRT_2 - 2.0) * dx.min(dy)
}

fn nearest_goal_distance(cell: Coord, goals: &GoalSet) -> f64 {
    goals
        .iter()
        .map(|goal| octile_distance(cell, goal))
        .fold(f64::INFINITY, f64::min)
}

/// Run A* toward the nearest member of `goals` using the octile heuristic.
///
/// Returns the path without the start cell; an empty path when `start` is
/// already a goal.
pub fn find_route_a_star(
    grid: &mut GridMap,
    start: Coord,
    goals: &GoalSet,
    constraints: &PathConstraints,
) -> Option<Vec<Coord>> {
    search(grid, start, goals, constraints, |cell| {
        nearest_goal_distance(cell, goals)
    })
}

/// Run Dijkstra's algorithm; same contract as [`find_route_a_star`].
pub fn find_route_dijkstra(
    grid: &mut GridMap,
    start: Coord,
    goals: &GoalSet,
    constraints: &PathConstraints,
) -> Option<Vec<Coord>> {
    search(grid, start, goals, constraints, |_| 0.0)
}

fn search(
    grid: &mut GridMap,
    start: Coord,
    goals: &GoalSet,
    constraints: &PathConstraints,
    heuristic: impl Fn(Coord) -> f64,
) -> Option<Vec<Coord>> {
    if goals.is_empty() || !grid.is_valid(start) {
        return None;
    }

    grid.reset_search_state();
    let mut closed = vec![false; grid.width() * grid.height()];
    let mut queue = BinaryHeap::new();

    let start_estimate = heuristic(start);
    {
        let cell = grid.cell_mut(start).ok()?;
        cell.cost_from_start = 0.0;
        cell.total_cost = start_estimate;
    }
    queue.push(AStarEntry::new(start, 0.0, start_estimate, goals.rank(start)));

    while let Some(entry) = queue.pop() {
        let index = grid.index(entry.node)?;
        if closed[index] {
            continue;
        }

        if goals.contains(entry.node) {
            return Some(reconstruct_path(grid, start, entry.node));
        }
        closed[index] = true;

        let current_cost = entry.cost.0;
        for next in grid.neighbors(entry.node, constraints.allow_diagonal) {
            let Some(next_index) = grid.index(next) else {
                continue;
            };
            if closed[next_index] || !constraints.allows(next, goals) {
                continue;
            }
            let movement = resolve(grid, entry.node, next, constraints.allow_diagonal);
            if !movement.can_move {
                continue;
            }

            let tentative = current_cost + movement.cost();
            let estimate = heuristic(next);
            let cell = grid.cell_mut(next).ok()?;
            if tentative < cell.cost_from_start {
                cell.cost_from_start = tentative;
                cell.total_cost = tentative + estimate;
                cell.backpointer = Some(entry.node);
                queue.push(AStarEntry::new(next, tentative, estimate, goals.rank(next)));
            }
        }
    }

    None
}

fn reconstruct_path(grid: &GridMap, start: Coord, goal: Coord) -> Vec<Coord> {
    let mut path = Vec::new();
    let mut current = goal;
    let limit = grid.width() * grid.height();
    while current != start && path.len() <= limit {
        path.push(current);
        match grid.cell(current).ok().and_then(|cell| cell.backpointer()) {
            Some(previous) => current = previous,
            None => break,
        }
    }
    path.reverse();
    path
}

/// Shortest edge-weighted distance from `start` to every reachable cell.
///
/// Deferred cells are treated as impassable. Uses its own bookkeeping and
/// leaves the grid's search scratch untouched.
pub fn distances_from(
    grid: &GridMap,
    start: Coord,
    constraints: &PathConstraints,
) -> HashMap<Coord, f64> {
    let mut distances: HashMap<Coord, f64> = HashMap::new();
    if !grid.is_valid(start) {
        return distances;
    }

    let no_goals = GoalSet::default();
    let mut queue = BinaryHeap::new();
    distances.insert(start, 0.0);
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        match distances.get(&entry.node) {
            Some(distance) if *distance < entry.cost.0 => continue,
            Some(_) => {}
            None => continue,
        }

        for next in grid.neighbors(entry.node, constraints.allow_diagonal) {
            if !constraints.allows(next, &no_goals) {
                continue;
            }
            let movement = resolve(grid, entry.node, next, constraints.allow_diagonal);
            if !movement.can_move {
                continue;
            }

            let next_cost = entry.cost.0 + movement.cost();
            if next_cost < *distances.get(&next).unwrap_or(&f64::INFINITY) {
                distances.insert(next, next_cost);
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    distances
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: Coord,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: Coord, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    node: Coord,
    cost: FloatOrd,
    estimate: FloatOrd,
    goal_rank: usize,
}

impl AStarEntry {
    fn new(node: Coord, cost: f64, heuristic: f64, goal_rank: Option<usize>) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
            goal_rank: goal_rank.unwrap_or(usize::MAX),
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lowest estimate first; on ties goals pop before other cells and in
        // goal-set order, then by coordinate.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.goal_rank.cmp(&self.goal_rank))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
