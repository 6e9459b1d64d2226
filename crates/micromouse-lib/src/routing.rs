use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::goals::GoalSet;
use crate::grid::{Coord, GridMap};
use crate::path::{find_route_a_star, find_route_dijkstra, PathConstraints};

/// Supported routing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAlgorithm {
    /// Uniform-cost search without a heuristic.
    Dijkstra,
    /// A* search guided by the octile heuristic.
    #[default]
    #[serde(rename = "a_star")]
    AStar,
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteAlgorithm::Dijkstra => "dijkstra",
            RouteAlgorithm::AStar => "a_star",
        };
        f.write_str(value)
    }
}

/// High-level route planning request.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub start: Coord,
    pub goals: GoalSet,
    pub algorithm: RouteAlgorithm,
    pub constraints: PathConstraints,
}

impl RouteRequest {
    /// A* request over cardinal edges only.
    pub fn a_star(start: Coord, goals: GoalSet) -> Self {
        Self {
            start,
            goals,
            algorithm: RouteAlgorithm::AStar,
            constraints: PathConstraints::cardinal(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: RouteAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_diagonals(mut self, allow: bool) -> Self {
        self.constraints.allow_diagonal = allow;
        self
    }

    pub fn deferring(mut self, cells: BTreeSet<Coord>) -> Self {
        self.constraints.deferred = cells;
        self
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub algorithm: RouteAlgorithm,
    pub start: Coord,
    /// The goal the search reached.
    pub goal: Coord,
    /// Cells to visit, excluding `start`.
    pub steps: Vec<Coord>,
    pub cost: f64,
}

impl RoutePlan {
    /// Number of edges in the route.
    pub fn hop_count(&self) -> usize {
        self.steps.len()
    }

    /// Number of diagonal edges in the route.
    pub fn diagonal_count(&self) -> usize {
        std::iter::once(self.start)
            .chain(self.steps.iter().copied())
            .zip(self.steps.iter().copied())
            .filter(|(from, to)| {
                let (dx, dy) = from.delta(*to);
                dx != 0 && dy != 0
            })
            .count()
    }
}

/// Compute a route using the requested algorithm and constraints.
///
/// An exhausted search is reported as [`Error::NoPathFound`] after logging
/// the wall model that caused it.
pub fn plan_route(grid: &mut GridMap, request: &RouteRequest) -> Result<RoutePlan> {
    grid.cell(request.start)?;
    for goal in request.goals.iter() {
        grid.cell(goal)?;
    }

    let found = match request.algorithm {
        RouteAlgorithm::AStar => {
            find_route_a_star(grid, request.start, &request.goals, &request.constraints)
        }
        RouteAlgorithm::Dijkstra => {
            find_route_dijkstra(grid, request.start, &request.goals, &request.constraints)
        }
    };

    let Some(steps) = found else {
        warn!(
            start = %request.start,
            goals = request.goals.len(),
            "no path found; known walls:\n{}",
            grid.render_ascii()
        );
        return Err(Error::NoPathFound {
            start: request.start,
            goals: request.goals.as_slice().to_vec(),
        });
    };

    let goal = steps.last().copied().unwrap_or(request.start);
    let cost = grid.cell(goal)?.cost_from_start();
    debug!(
        algorithm = %request.algorithm,
        start = %request.start,
        goal = %goal,
        hops = steps.len(),
        cost,
        "route planned"
    );

    Ok(RoutePlan {
        algorithm: request.algorithm,
        start: request.start,
        goal,
        steps,
        cost,
    })
}
