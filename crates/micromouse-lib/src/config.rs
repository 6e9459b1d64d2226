//! Run configuration loaded from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compass::Direction;
use crate::error::{Error, Result};
use crate::goals::GoalSet;
use crate::grid::Coord;

/// Default bound on a single peripheral round trip.
pub const DEFAULT_PERIPHERAL_TIMEOUT_MS: u64 = 5_000;

/// Settings for one mission.
///
/// Every field is optional in the JSON form; missing fields take the values
/// of [`MazeConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MazeConfig {
    /// Maze width; queried from the peripheral when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
    /// Maze height; queried from the peripheral when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<usize>,
    pub start: Coord,
    pub heading: Direction,
    /// Target cells; empty selects the centre region.
    pub goals: Vec<Coord>,
    pub explore_diagonals: bool,
    pub speed_run_diagonals: bool,
    pub return_to_start: bool,
    pub peripheral_timeout_ms: u64,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            start: Coord::new(0, 0),
            heading: Direction::North,
            goals: Vec::new(),
            explore_diagonals: false,
            speed_run_diagonals: true,
            return_to_start: true,
            peripheral_timeout_ms: DEFAULT_PERIPHERAL_TIMEOUT_MS,
        }
    }
}

impl MazeConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Goal set for a maze of the given size.
    pub fn goal_set(&self, width: usize, height: usize) -> GoalSet {
        if self.goals.is_empty() {
            GoalSet::centre(width, height)
        } else {
            GoalSet::new(self.goals.iter().copied())
        }
    }

    /// Check the settings against the actual maze size.
    pub fn validate(&self, width: usize, height: usize) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_maze(format!(
                "maze dimensions must be positive, got {width}x{height}"
            )));
        }
        if let Some(expected) = self.width.filter(|expected| *expected != width) {
            return Err(Error::invalid_maze(format!(
                "configured width {expected} does not match maze width {width}"
            )));
        }
        if let Some(expected) = self.height.filter(|expected| *expected != height) {
            return Err(Error::invalid_maze(format!(
                "configured height {expected} does not match maze height {height}"
            )));
        }
        if !self.heading.is_cardinal() {
            return Err(Error::invalid_maze(format!(
                "start heading must be cardinal, got {}",
                self.heading
            )));
        }
        if self.peripheral_timeout_ms == 0 {
            return Err(Error::invalid_maze("peripheral timeout must be positive"));
        }

        let inside = |cell: &Coord| {
            cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < width && (cell.y as usize) < height
        };
        for cell in std::iter::once(&self.start).chain(&self.goals) {
            if !inside(cell) {
                return Err(Error::OutOfBounds {
                    x: cell.x,
                    y: cell.y,
                    width,
                    height,
                });
            }
        }
        Ok(())
    }
}
