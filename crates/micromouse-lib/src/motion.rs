//! Translation from cell paths to primitive motion commands.
//!
//! Two layers live here:
//!
//! - **Baseline emission** ([`plan_commands`]): every path edge becomes the
//!   minimal turn sequence plus one full forward. Diagonal edges are routed
//!   through their intermediate corner cell, so the baseline stream only ever
//!   contains cardinal moves.
//! - **Diagonal collapsing** ([`diagonalize`]): a pure pass over a baseline
//!   stream that replaces staircases (`R F L F ...`) with runs along the
//!   diagonal between edge midpoints.
//!
//! Positions are tracked in half-cell units ([`Pose`]) so that the edge
//! midpoints visited by diagonal runs are exact.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::compass::{turn_delta, Direction, Side};
use crate::error::{Error, Result};
use crate::grid::{Coord, GridMap};
use crate::movement::resolve;

/// Primitive motion command understood by the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Forward,
    HalfForward,
    Turn90(Side),
    Turn45(Side),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Forward => f.write_str("F"),
            Command::HalfForward => f.write_str("FH"),
            Command::Turn90(side) => write!(f, "{side}"),
            Command::Turn45(side) => write!(f, "{side}45"),
        }
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Render a command stream as space-separated tokens.
pub fn format_commands(commands: &[Command]) -> String {
    commands
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Position in half-cell units plus heading.
///
/// Cell `(x, y)` has its centre at `(2x, 2y)`; odd components sit on cell
/// edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pose {
    pub x2: i32,
    pub y2: i32,
    pub heading: Direction,
}

impl Pose {
    pub fn at(cell: Coord, heading: Direction) -> Self {
        Self {
            x2: cell.x * 2,
            y2: cell.y * 2,
            heading,
        }
    }

    /// Cell whose centre the pose occupies, if any.
    pub fn centre(&self) -> Option<Coord> {
        (self.x2.rem_euclid(2) == 0 && self.y2.rem_euclid(2) == 0)
            .then(|| Coord::new(self.x2 / 2, self.y2 / 2))
    }

    /// Centred on a cell and facing along an axis.
    pub fn is_square(&self) -> bool {
        self.centre().is_some() && self.heading.is_cardinal()
    }

    /// Cell wall the pose sits on, as the cell to its west or south paired
    /// with `East` or `North`. `None` at cell centres and corners.
    ///
    /// The returned cell may lie just outside the maze when the pose is on
    /// its west or south boundary.
    pub fn edge(&self) -> Option<(Coord, Direction)> {
        match (self.x2.rem_euclid(2), self.y2.rem_euclid(2)) {
            (1, 0) => Some((
                Coord::new(self.x2.div_euclid(2), self.y2 / 2),
                Direction::East,
            )),
            (0, 1) => Some((
                Coord::new(self.x2 / 2, self.y2.div_euclid(2)),
                Direction::North,
            )),
            _ => None,
        }
    }

    /// Move `halves` half-cells along the heading.
    pub fn advanced(self, halves: i32) -> Self {
        let (dx, dy) = self.heading.offset();
        Self {
            x2: self.x2 + dx * halves,
            y2: self.y2 + dy * halves,
            heading: self.heading,
        }
    }

    pub fn apply(self, command: Command) -> Self {
        match command {
            Command::Forward => self.advanced(2),
            Command::HalfForward => self.advanced(1),
            Command::Turn90(side) => Self {
                heading: self.heading.rotate(2 * side.sign()),
                ..self
            },
            Command::Turn45(side) => Self {
                heading: self.heading.rotate(side.sign()),
                ..self
            },
        }
    }
}

/// Replay `commands` from `start` without any wall checks.
pub fn trace(start: Pose, commands: &[Command]) -> Pose {
    commands
        .iter()
        .fold(start, |pose, command| pose.apply(*command))
}

/// Where the mouse is and which way it faces.
///
/// Only acknowledged commands are applied. [`MouseState::cell`] is the last
/// cell centre reached; mid-maneuver the mouse sits between cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseState {
    pose: Pose,
    cell: Coord,
}

impl MouseState {
    pub fn new(cell: Coord, heading: Direction) -> Self {
        Self {
            pose: Pose::at(cell, heading),
            cell,
        }
    }

    pub fn cell(&self) -> Coord {
        self.cell
    }

    pub fn heading(&self) -> Direction {
        self.pose.heading
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn is_centred(&self) -> bool {
        self.pose.centre().is_some()
    }

    /// Apply an acknowledged command; landing outside `grid` is an error and
    /// leaves the state untouched.
    pub fn apply(&mut self, command: Command, grid: &GridMap) -> Result<()> {
        let next = self.pose.apply(command);
        if let Some(cell) = next.centre() {
            grid.cell(cell)?;
            self.cell = cell;
        }
        self.pose = next;
        Ok(())
    }
}

/// Shortest turn sequence from `from` to `to`: quarter turns first, then at
/// most one eighth turn.
pub fn turn_commands(from: Direction, to: Direction) -> Vec<Command> {
    let delta = turn_delta(from, to);
    let mut commands = vec![Command::Turn90(delta.side); usize::from(delta.steps / 2)];
    if delta.steps % 2 == 1 {
        commands.push(Command::Turn45(delta.side));
    }
    commands
}

/// Replace every diagonal edge of `path` with its two cardinal halves.
///
/// The result starts after `start` and contains only axis-aligned steps.
pub fn expand_diagonals(
    grid: &GridMap,
    start: Coord,
    path: &[Coord],
    allow_diagonal: bool,
) -> Result<Vec<Coord>> {
    let mut cells = Vec::with_capacity(path.len() * 2);
    let mut current = start;
    for &next in path {
        let movement = resolve(grid, current, next, allow_diagonal);
        if !movement.can_move {
            return Err(Error::IllegalMove {
                from: current,
                to: next,
            });
        }
        if let Some(corner) = movement.first_half_step {
            cells.push(corner);
        }
        cells.push(next);
        current = next;
    }
    Ok(cells)
}

/// Baseline command stream for `path` starting at `start` facing `heading`.
pub fn plan_commands(
    grid: &GridMap,
    start: Coord,
    heading: Direction,
    path: &[Coord],
    allow_diagonal: bool,
) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    let mut heading = heading;
    let mut current = start;
    for next in expand_diagonals(grid, start, path, allow_diagonal)? {
        let (dx, dy) = current.delta(next);
        let direction = Direction::from_offset(dx, dy)?;
        commands.extend(turn_commands(heading, direction));
        commands.push(Command::Forward);
        heading = direction;
        current = next;
    }
    Ok(commands)
}

/// Classification of a four-token window of the baseline stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `R F L F` (`Right`) or `L F R F` (`Left`): one step of a staircase.
    Staircase(Side),
    /// `R F R F` or `L F L F`: a U-shaped corner.
    Corner(Side),
    Other,
}

/// Classify a window; anything short of four tokens is [`BlockKind::Other`].
pub fn classify(window: Option<&[Command]>) -> BlockKind {
    match window {
        Some([Command::Turn90(first), Command::Forward, Command::Turn90(second), Command::Forward]) => {
            if first == second {
                BlockKind::Corner(*first)
            } else {
                BlockKind::Staircase(*first)
            }
        }
        _ => BlockKind::Other,
    }
}

/// Register of the collapsing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    /// Centred on a cell, facing along an axis.
    Squared,
    /// On an edge midpoint facing a diagonal; the diagonal lies on `Side` of
    /// the last cardinal move.
    Diagonal(Side),
}

struct Diagonalizer {
    out: Vec<Command>,
    pose: Pose,
    run: Run,
}

impl Diagonalizer {
    fn new(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            pose: Pose::at(Coord::default(), Direction::North),
            run: Run::Squared,
        }
    }

    fn emit(&mut self, commands: &[Command]) {
        for &command in commands {
            self.out.push(command);
            self.pose = self.pose.apply(command);
        }
    }

    fn squared_step(&mut self, rest: &[Command]) -> usize {
        if self.pose.is_square() {
            if rest[0] == Command::Forward {
                let kind = classify(rest.get(1..5));
                if kind != BlockKind::Other {
                    self.enter_after_forward(kind);
                    return 5;
                }
            }
            let kind = classify(rest.get(0..4));
            if kind != BlockKind::Other {
                self.enter_from_centre(kind);
                return 4;
            }
        }
        self.emit(&rest[..1]);
        1
    }

    fn diagonal_step(&mut self, side: Side, rest: &[Command]) -> usize {
        let kind = classify(rest.get(0..4));
        if kind == BlockKind::Other {
            self.close(side);
            return 0;
        }
        self.extend(side, kind);
        4
    }

    fn enter_from_centre(&mut self, kind: BlockKind) {
        use Command::*;
        match kind {
            BlockKind::Staircase(side) => {
                self.emit(&[Turn90(side), HalfForward, Turn45(side.opposite()), HalfForward]);
                self.run = Run::Diagonal(side);
            }
            BlockKind::Corner(side) => {
                self.emit(&[Turn90(side), HalfForward, Turn45(side), HalfForward]);
                self.run = Run::Diagonal(side.opposite());
            }
            BlockKind::Other => {}
        }
    }

    fn enter_after_forward(&mut self, kind: BlockKind) {
        use Command::*;
        match kind {
            BlockKind::Staircase(side) => {
                self.emit(&[HalfForward, Turn45(side), Forward]);
                self.run = Run::Diagonal(side);
            }
            BlockKind::Corner(side) => {
                self.emit(&[HalfForward, Turn45(side), HalfForward, Turn90(side), HalfForward]);
                self.run = Run::Diagonal(side.opposite());
            }
            BlockKind::Other => {}
        }
    }

    fn extend(&mut self, current: Side, kind: BlockKind) {
        use Command::*;
        match kind {
            BlockKind::Staircase(side) if side == current => {
                self.emit(&[Forward]);
            }
            BlockKind::Staircase(side) => {
                self.emit(&[Turn90(side), Forward]);
                self.run = Run::Diagonal(side);
            }
            BlockKind::Corner(side) if side == current => {
                self.emit(&[HalfForward, Turn90(side), HalfForward]);
                self.run = Run::Diagonal(side.opposite());
            }
            BlockKind::Corner(side) => {
                self.emit(&[Turn90(side), HalfForward, Turn90(side), HalfForward]);
            }
            BlockKind::Other => {}
        }
    }

    fn close(&mut self, side: Side) {
        self.emit(&[Command::Turn45(side.opposite()), Command::HalfForward]);
        self.run = Run::Squared;
    }

    fn finish(mut self) -> Vec<Command> {
        if let Run::Diagonal(side) = self.run {
            self.close(side);
        }
        self.out
    }
}

/// Collapse staircases in a baseline stream into diagonal runs.
///
/// The stream must start centred on a cell with an axis-aligned heading.
/// The result ends in the same cell and heading, crosses only the cell edges
/// the input crosses, and is a fixed point of this function.
pub fn diagonalize(commands: &[Command]) -> Vec<Command> {
    let mut pass = Diagonalizer::new(commands.len());
    let mut index = 0;
    while index < commands.len() {
        let rest = &commands[index..];
        index += match pass.run {
            Run::Squared => pass.squared_step(rest),
            Run::Diagonal(side) => pass.diagonal_step(side, rest),
        };
    }
    pass.finish()
}
