//! Frontier-based full-coverage exploration.
//!
//! The frontier holds unexplored cells that are reachable from an explored
//! one under the current wall model. Each iteration drives to the nearest
//! frontier cell, absorbs every cell explored along the way and grows the
//! frontier from them. Deferred cells (normally the goal region) are held
//! back until nothing else is left so that coverage never short-circuits
//! through the goal.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::goals::GoalSet;
use crate::grid::{Coord, GridMap};
use crate::motion::MouseState;
use crate::movement::resolve;
use crate::navigate::travel_to;
use crate::path::{distances_from, PathConstraints};
use crate::peripheral::{sense_walls, Peripheral};

const FRONTIER_MARK: &str = "*";

/// What an exploration pass covered.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExplorationReport {
    /// Cells in the order they were first explored, start included.
    pub explored: Vec<Coord>,
    /// Frontier cells abandoned because no route reaches them.
    pub unreachable: Vec<Coord>,
    pub commands: usize,
    pub replans: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Explorer {
    allow_diagonal: bool,
    deferred: BTreeSet<Coord>,
}

impl Explorer {
    pub fn new(allow_diagonal: bool) -> Self {
        Self {
            allow_diagonal,
            deferred: BTreeSet::new(),
        }
    }

    /// Hold `cells` back until the rest of the maze is covered.
    pub fn deferring(mut self, cells: impl IntoIterator<Item = Coord>) -> Self {
        self.deferred = cells.into_iter().collect();
        self
    }

    pub fn deferred(&self) -> &BTreeSet<Coord> {
        &self.deferred
    }

    /// Explore every cell reachable from the mouse's position.
    ///
    /// Terminates with an empty frontier: each iteration either explores at
    /// least one new cell or discards the candidate it failed to reach.
    pub fn explore<P: Peripheral + ?Sized>(
        &self,
        peripheral: &mut P,
        grid: &mut GridMap,
        mouse: &mut MouseState,
    ) -> Result<ExplorationReport> {
        let mut run = Run {
            explorer: self,
            frontier: BTreeSet::new(),
            parked: Vec::new(),
            deferring: !self.deferred.is_empty(),
            report: ExplorationReport::default(),
        };

        let start = mouse.cell();
        sense_walls(peripheral, grid, mouse)?;
        if grid.mark_explored(start)? {
            run.report.explored.push(start);
        }
        run.absorb(peripheral, grid, start);
        info!(%start, frontier = run.frontier.len(), "exploration started");

        loop {
            let constraints = run.constraints();
            let Some(target) = run.nearest_frontier(grid, mouse.cell(), &constraints) else {
                if run.deferring {
                    run.release_deferred(peripheral, grid);
                    continue;
                }
                break;
            };

            debug!(%target, frontier = run.frontier.len(), "heading to frontier");
            let travel = travel_to(
                peripheral,
                grid,
                mouse,
                &GoalSet::single(target),
                &constraints,
            )?;
            run.report.commands += travel.commands;
            run.report.replans += travel.replans;
            for &cell in &travel.discovered {
                run.report.explored.push(cell);
                run.absorb(peripheral, grid, cell);
            }

            if travel.reached.is_none() {
                debug!(%target, "frontier cell unreachable; dropping it");
                run.drop_candidate(peripheral, target);
            }
        }

        let leftovers = std::mem::take(&mut run.frontier);
        for cell in leftovers {
            peripheral.clear_text(cell);
            run.report.unreachable.push(cell);
        }

        info!(
            explored = run.report.explored.len(),
            unreachable = run.report.unreachable.len(),
            commands = run.report.commands,
            replans = run.report.replans,
            "exploration finished"
        );
        Ok(run.report)
    }
}

struct Run<'a> {
    explorer: &'a Explorer,
    frontier: BTreeSet<Coord>,
    /// Candidates dropped while deferring; they may be reachable through a
    /// deferred cell.
    parked: Vec<Coord>,
    deferring: bool,
    report: ExplorationReport,
}

impl Run<'_> {
    fn constraints(&self) -> PathConstraints {
        PathConstraints {
            allow_diagonal: self.explorer.allow_diagonal,
            deferred: if self.deferring {
                self.explorer.deferred.clone()
            } else {
                BTreeSet::new()
            },
        }
    }

    fn excluded(&self, cell: Coord) -> bool {
        self.deferring && self.explorer.deferred.contains(&cell)
    }

    /// Closest reachable frontier cell; ties go to the lowest coordinate.
    fn nearest_frontier(
        &self,
        grid: &GridMap,
        from: Coord,
        constraints: &PathConstraints,
    ) -> Option<Coord> {
        let distances = distances_from(grid, from, constraints);
        let mut best: Option<(Coord, f64)> = None;
        for &cell in &self.frontier {
            let Some(&distance) = distances.get(&cell) else {
                continue;
            };
            if best.map_or(true, |(_, current)| distance < current) {
                best = Some((cell, distance));
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// Take an explored cell off the frontier and push its open, unexplored
    /// neighbours on.
    fn absorb<P: Peripheral + ?Sized>(&mut self, peripheral: &mut P, grid: &GridMap, cell: Coord) {
        if self.frontier.remove(&cell) {
            peripheral.clear_text(cell);
        }
        for next in grid.neighbors(cell, false) {
            if grid.is_explored(next) || self.excluded(next) {
                continue;
            }
            if !resolve(grid, cell, next, false).can_move {
                continue;
            }
            if self.frontier.insert(next) {
                peripheral.set_text(next, FRONTIER_MARK);
            }
        }
    }

    fn drop_candidate<P: Peripheral + ?Sized>(&mut self, peripheral: &mut P, cell: Coord) {
        if !self.frontier.remove(&cell) {
            return;
        }
        if self.deferring {
            self.parked.push(cell);
        } else {
            peripheral.clear_text(cell);
            self.report.unreachable.push(cell);
        }
    }

    /// Stop deferring: the held-back cells and any parked candidates become
    /// ordinary frontier cells.
    fn release_deferred<P: Peripheral + ?Sized>(&mut self, peripheral: &mut P, grid: &GridMap) {
        self.deferring = false;
        let deferred = self.explorer.deferred.iter().copied();
        let candidates: Vec<Coord> = deferred.chain(self.parked.drain(..)).collect();
        for cell in candidates {
            if grid.is_valid(cell) && !grid.is_explored(cell) && self.frontier.insert(cell) {
                peripheral.set_text(cell, FRONTIER_MARK);
            }
        }
        info!(frontier = self.frontier.len(), "visiting deferred cells");
    }
}
