//! Maze grid and per-cell wall state.
//!
//! The grid is a flat, row-major array of [`Cell`]s. Origin `(0, 0)` is the
//! bottom-left cell and `+y` points north. Walls are stored on both sides of
//! every interior edge; a wall on the outer boundary lives on one cell only.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::compass::Direction;
use crate::error::{Error, Result};

/// Default maze side length for classic micromouse mazes.
pub const DEFAULT_SIZE: usize = 16;

/// Integer cell coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring coordinate one step in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Offset from `self` to `other`.
    pub fn delta(self, other: Coord) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl FromStr for Coord {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim().trim_start_matches('(').trim_end_matches(')');
        let (x, y) = trimmed
            .split_once(',')
            .ok_or_else(|| Error::invalid_maze(format!("expected `x,y`, got `{value}`")))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|_| Error::invalid_maze(format!("bad coordinate `{value}`")))
        };
        Ok(Self::new(parse(x)?, parse(y)?))
    }
}

/// State of one wall slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wall {
    pub exists: bool,
    /// Recorded on both adjacent cells; `false` for outer-boundary walls.
    pub shared: bool,
}

/// The four wall slots of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Walls {
    pub north: Wall,
    pub east: Wall,
    pub south: Wall,
    pub west: Wall,
}

impl Walls {
    /// Wall slot facing `direction`; `None` for diagonals.
    pub fn get(&self, direction: Direction) -> Option<&Wall> {
        match direction {
            Direction::North => Some(&self.north),
            Direction::East => Some(&self.east),
            Direction::South => Some(&self.south),
            Direction::West => Some(&self.west),
            _ => None,
        }
    }

    fn get_mut(&mut self, direction: Direction) -> Option<&mut Wall> {
        match direction {
            Direction::North => Some(&mut self.north),
            Direction::East => Some(&mut self.east),
            Direction::South => Some(&mut self.south),
            Direction::West => Some(&mut self.west),
            _ => None,
        }
    }
}

/// A single maze square.
#[derive(Debug, Clone)]
pub struct Cell {
    coord: Coord,
    walls: Walls,
    explored: bool,
    pub(crate) cost_from_start: f64,
    pub(crate) total_cost: f64,
    pub(crate) backpointer: Option<Coord>,
}

impl Cell {
    fn new(coord: Coord) -> Self {
        Self {
            coord,
            walls: Walls::default(),
            explored: false,
            cost_from_start: f64::INFINITY,
            total_cost: f64::INFINITY,
            backpointer: None,
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn walls(&self) -> &Walls {
        &self.walls
    }

    /// `true` if a wall is recorded toward a cardinal `direction`.
    pub fn has_wall(&self, direction: Direction) -> bool {
        self.walls.get(direction).is_some_and(|wall| wall.exists)
    }

    pub fn is_explored(&self) -> bool {
        self.explored
    }

    /// Cost of the best known route from the last search's start.
    pub fn cost_from_start(&self) -> f64 {
        self.cost_from_start
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn backpointer(&self) -> Option<Coord> {
        self.backpointer
    }

    fn reset_search_state(&mut self) {
        self.cost_from_start = f64::INFINITY;
        self.total_cost = f64::INFINITY;
        self.backpointer = None;
    }
}

/// Fixed-size maze model.
#[derive(Debug, Clone)]
pub struct GridMap {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Default for GridMap {
    fn default() -> Self {
        Self::blank(DEFAULT_SIZE, DEFAULT_SIZE)
    }
}

impl GridMap {
    /// Create an empty grid with no walls and nothing explored.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 || width > i32::MAX as usize || height > i32::MAX as usize {
            return Err(Error::invalid_maze(format!(
                "unsupported dimensions {width}x{height}"
            )));
        }

        Ok(Self::blank(width, height))
    }

    fn blank(width: usize, height: usize) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                cells.push(Cell::new(Coord::new(x, y)));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_valid(&self, coord: Coord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    pub(crate) fn index(&self, coord: Coord) -> Option<usize> {
        self.is_valid(coord)
            .then(|| coord.y as usize * self.width + coord.x as usize)
    }

    fn checked_index(&self, coord: Coord) -> Result<usize> {
        self.index(coord).ok_or(Error::OutOfBounds {
            x: coord.x,
            y: coord.y,
            width: self.width,
            height: self.height,
        })
    }

    pub fn cell(&self, coord: Coord) -> Result<&Cell> {
        let index = self.checked_index(coord)?;
        Ok(&self.cells[index])
    }

    pub(crate) fn cell_mut(&mut self, coord: Coord) -> Result<&mut Cell> {
        let index = self.checked_index(coord)?;
        Ok(&mut self.cells[index])
    }

    /// Every coordinate in row-major order starting at the origin.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().map(Cell::coord)
    }

    /// Record a wall on `coord` toward a cardinal `direction`.
    ///
    /// The wall is mirrored onto the in-bounds neighbour and both copies are
    /// flagged shared. Returns `true` if the model changed.
    pub fn set_wall(&mut self, coord: Coord, direction: Direction) -> Result<bool> {
        let (dx, dy) = direction.offset();
        if direction.is_diagonal() {
            return Err(Error::InvalidDirection { dx, dy });
        }

        let neighbour = coord.step(direction);
        let shared = self.is_valid(neighbour);
        let mut changed = false;

        let cell = self.cell_mut(coord)?;
        if let Some(wall) = cell.walls.get_mut(direction) {
            changed |= !wall.exists;
            wall.exists = true;
            wall.shared |= shared;
        }

        if shared {
            let mirror = self.cell_mut(neighbour)?;
            if let Some(wall) = mirror.walls.get_mut(direction.opposite()) {
                changed |= !wall.exists;
                wall.exists = true;
                wall.shared = true;
            }
        }

        Ok(changed)
    }

    /// Wall lookup for cardinal directions only.
    pub fn wall_exists(&self, coord: Coord, direction: Direction) -> Result<bool> {
        if direction.is_diagonal() {
            let (dx, dy) = direction.offset();
            return Err(Error::InvalidDirection { dx, dy });
        }
        Ok(self.cell(coord)?.has_wall(direction))
    }

    /// Mark a cell explored; returns `true` the first time.
    pub fn mark_explored(&mut self, coord: Coord) -> Result<bool> {
        let cell = self.cell_mut(coord)?;
        let first = !cell.explored;
        cell.explored = true;
        Ok(first)
    }

    /// `false` for unexplored or out-of-bounds cells.
    pub fn is_explored(&self, coord: Coord) -> bool {
        self.index(coord)
            .is_some_and(|index| self.cells[index].explored)
    }

    pub fn explored_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.explored).count()
    }

    /// Clear search scratch on every cell.
    pub fn reset_search_state(&mut self) {
        for cell in &mut self.cells {
            cell.reset_search_state();
        }
    }

    /// In-bounds neighbours in compass order.
    ///
    /// Diagonal neighbours appear only when `allow_diagonal` is set and the
    /// candidate has already been explored.
    pub fn neighbors(&self, coord: Coord, allow_diagonal: bool) -> Vec<Coord> {
        Direction::ALL
            .iter()
            .filter_map(|&direction| {
                let candidate = coord.step(direction);
                if !self.is_valid(candidate) {
                    return None;
                }
                if direction.is_diagonal() && !(allow_diagonal && self.is_explored(candidate)) {
                    return None;
                }
                Some(candidate)
            })
            .collect()
    }

    /// Render known walls as `+---+` / `|` text, top row first.
    pub fn render_ascii(&self) -> String {
        let mut out = String::new();
        for y in (0..self.height as i32).rev() {
            out.push('+');
            for x in 0..self.width as i32 {
                out.push_str(if self.has_wall(Coord::new(x, y), Direction::North) {
                    "---+"
                } else {
                    "   +"
                });
            }
            out.push('\n');

            for x in 0..self.width as i32 {
                out.push(if self.has_wall(Coord::new(x, y), Direction::West) {
                    '|'
                } else {
                    ' '
                });
                out.push_str("   ");
            }
            let last = Coord::new(self.width as i32 - 1, y);
            out.push(if self.has_wall(last, Direction::East) {
                '|'
            } else {
                ' '
            });
            out.push('\n');
        }

        out.push('+');
        for x in 0..self.width as i32 {
            out.push_str(if self.has_wall(Coord::new(x, 0), Direction::South) {
                "---+"
            } else {
                "   +"
            });
        }
        out.push('\n');
        out
    }

    /// Parse the text produced by [`GridMap::render_ascii`].
    ///
    /// Cell interiors are ignored, missing trailing characters read as open.
    pub fn parse_ascii(text: &str) -> Result<Self> {
        let mut lines: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.trim_end().chars().collect())
            .collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        let leading = lines.iter().take_while(|line| line.is_empty()).count();
        lines.drain(..leading);

        if lines.len() < 3 || lines.len() % 2 == 0 {
            return Err(Error::invalid_maze(format!(
                "expected an odd number of lines (at least 3), got {}",
                lines.len()
            )));
        }
        let top = &lines[0];
        if top.first() != Some(&'+') || top.len() < 5 {
            return Err(Error::invalid_maze("first line must start with `+---`"));
        }

        let height = (lines.len() - 1) / 2;
        let width = (top.len() - 1) / 4;
        let mut grid = Self::new(width, height)?;
        let at = |row: usize, column: usize| lines[row].get(column).copied().unwrap_or(' ');

        for y in 0..height {
            let row = height - 1 - y;
            for x in 0..width {
                let coord = Coord::new(x as i32, y as i32);
                let column = 4 * x;
                if at(2 * row, column + 2) == '-' {
                    grid.set_wall(coord, Direction::North)?;
                }
                if at(2 * row + 2, column + 2) == '-' {
                    grid.set_wall(coord, Direction::South)?;
                }
                if at(2 * row + 1, column) == '|' {
                    grid.set_wall(coord, Direction::West)?;
                }
                if at(2 * row + 1, column + 4) == '|' {
                    grid.set_wall(coord, Direction::East)?;
                }
            }
        }

        Ok(grid)
    }

    fn has_wall(&self, coord: Coord, direction: Direction) -> bool {
        self.index(coord)
            .is_some_and(|index| self.cells[index].has_wall(direction))
    }
}
