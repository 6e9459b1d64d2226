//! In-process [`Peripheral`] over a fully known maze.
//!
//! Motion is validated half a cell at a time in the same half-cell frame as
//! [`Pose`]: a landing point on an edge midpoint needs that edge to be open,
//! a cell corner is a collision and a cell centre must be inside the maze.
//! A rejected command leaves the simulated mouse where it was.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, trace};

use crate::compass::{Direction, Side};
use crate::error::{Error, Result};
use crate::grid::{Coord, GridMap};
use crate::motion::{Command, Pose};
use crate::peripheral::{Color, Peripheral};

/// Counters kept by the simulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    pub wall_queries: usize,
    pub motions: usize,
    pub half_steps: usize,
    pub rejections: usize,
}

#[derive(Debug, Clone)]
pub struct SimulatedMaze {
    truth: GridMap,
    pose: Pose,
    stats: SimStats,
    colors: BTreeMap<Coord, Color>,
    texts: BTreeMap<Coord, String>,
    drawn_walls: BTreeSet<(Coord, Direction)>,
}

impl SimulatedMaze {
    pub fn new(truth: GridMap, start: Coord, heading: Direction) -> Result<Self> {
        truth.cell(start)?;
        if !heading.is_cardinal() {
            return Err(Error::invalid_maze(format!(
                "start heading must be cardinal, got {heading}"
            )));
        }
        Ok(Self {
            truth,
            pose: Pose::at(start, heading),
            stats: SimStats::default(),
            colors: BTreeMap::new(),
            texts: BTreeMap::new(),
            drawn_walls: BTreeSet::new(),
        })
    }

    /// Build from the `+---+` text layout.
    pub fn from_ascii(text: &str, start: Coord, heading: Direction) -> Result<Self> {
        Self::new(GridMap::parse_ascii(text)?, start, heading)
    }

    pub fn truth(&self) -> &GridMap {
        &self.truth
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    pub fn color(&self, cell: Coord) -> Option<Color> {
        self.colors.get(&cell).copied()
    }

    pub fn text(&self, cell: Coord) -> Option<&str> {
        self.texts.get(&cell).map(String::as_str)
    }

    /// Cells currently carrying text, with their labels.
    pub fn texts(&self) -> impl Iterator<Item = (Coord, &str)> {
        self.texts.iter().map(|(cell, text)| (*cell, text.as_str()))
    }

    /// Walls drawn on the display, as `(cell, side)` pairs.
    pub fn drawn_walls(&self) -> &BTreeSet<(Coord, Direction)> {
        &self.drawn_walls
    }

    fn blocked(&self, cell: Coord, direction: Direction) -> bool {
        !self.truth.is_valid(cell.step(direction))
            || self.truth.wall_exists(cell, direction).unwrap_or(true)
    }

    /// Whether the mouse may stand on the half-cell point `(x2, y2)`.
    fn passable(&self, x2: i32, y2: i32) -> bool {
        let point = Pose {
            x2,
            y2,
            heading: Direction::North,
        };
        if let Some(cell) = point.centre() {
            return self.truth.is_valid(cell);
        }
        match point.edge() {
            Some((cell, direction)) => self.truth.is_valid(cell) && !self.blocked(cell, direction),
            None => false,
        }
    }

    fn advance(&mut self, command: Command, halves: i32) -> Result<()> {
        let mut pose = self.pose;
        for _ in 0..halves {
            pose = pose.advanced(1);
            if !self.passable(pose.x2, pose.y2) {
                self.stats.rejections += 1;
                debug!(
                    %command,
                    x2 = pose.x2,
                    y2 = pose.y2,
                    heading = %self.pose.heading,
                    "simulated collision"
                );
                return Err(Error::MotionRejected { command });
            }
        }
        self.stats.motions += 1;
        self.stats.half_steps += halves as usize;
        self.pose = pose;
        trace!(x2 = pose.x2, y2 = pose.y2, "moved");
        Ok(())
    }

    fn turn(&mut self, command: Command) -> Result<()> {
        self.stats.motions += 1;
        self.pose = self.pose.apply(command);
        Ok(())
    }

    fn sense(&mut self, relative: i32) -> Result<bool> {
        let Some(cell) = self.pose.centre().filter(|_| self.pose.is_square()) else {
            return Err(Error::Peripheral {
                message: format!(
                    "wall query at ({}, {}) half-cells facing {}",
                    self.pose.x2, self.pose.y2, self.pose.heading
                ),
            });
        };
        self.stats.wall_queries += 1;
        Ok(self.blocked(cell, self.pose.heading.rotate(relative)))
    }
}

impl Peripheral for SimulatedMaze {
    fn maze_width(&mut self) -> Result<usize> {
        Ok(self.truth.width())
    }

    fn maze_height(&mut self) -> Result<usize> {
        Ok(self.truth.height())
    }

    fn wall_front(&mut self) -> Result<bool> {
        self.sense(0)
    }

    fn wall_left(&mut self) -> Result<bool> {
        self.sense(-2)
    }

    fn wall_right(&mut self) -> Result<bool> {
        self.sense(2)
    }

    fn move_forward(&mut self) -> Result<()> {
        self.advance(Command::Forward, 2)
    }

    fn move_forward_half(&mut self) -> Result<()> {
        self.advance(Command::HalfForward, 1)
    }

    fn turn_left(&mut self) -> Result<()> {
        self.turn(Command::Turn90(Side::Left))
    }

    fn turn_right(&mut self) -> Result<()> {
        self.turn(Command::Turn90(Side::Right))
    }

    fn turn_left_45(&mut self) -> Result<()> {
        self.turn(Command::Turn45(Side::Left))
    }

    fn turn_right_45(&mut self) -> Result<()> {
        self.turn(Command::Turn45(Side::Right))
    }

    fn set_color(&mut self, cell: Coord, color: Color) {
        self.colors.insert(cell, color);
    }

    fn clear_color(&mut self, cell: Coord) {
        self.colors.remove(&cell);
    }

    fn clear_all_color(&mut self) {
        self.colors.clear();
    }

    fn set_text(&mut self, cell: Coord, text: &str) {
        self.texts.insert(cell, text.to_string());
    }

    fn clear_text(&mut self, cell: Coord) {
        self.texts.remove(&cell);
    }

    fn clear_all_text(&mut self) {
        self.texts.clear();
    }

    fn set_wall(&mut self, cell: Coord, direction: Direction) {
        self.drawn_walls.insert((cell, direction));
    }
}
