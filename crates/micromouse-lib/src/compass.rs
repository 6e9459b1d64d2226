//! Eight-way compass model and turn arithmetic.
//!
//! Directions are indexed `0..8` clockwise from north in 45° steps. Every
//! table below is indexed by that number, so rotation is plain modular
//! arithmetic on the index.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One of the eight 45°-spaced headings.
///
/// Serialized as its short code; parsing also accepts the long snake_case
/// name (`north_east`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

const OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const CODES: [&str; 8] = ["n", "ne", "e", "se", "s", "sw", "w", "nw"];

const NAMES: [&str; 8] = [
    "north",
    "north_east",
    "east",
    "south_east",
    "south",
    "south_west",
    "west",
    "north_west",
];

impl Direction {
    /// All directions in index order.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The four axis-aligned directions in index order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 8]
    }

    /// Unit offset `(dx, dy)` with `+y` pointing north.
    pub fn offset(self) -> (i32, i32) {
        OFFSETS[self.index()]
    }

    /// Inverse of [`Direction::offset`].
    pub fn from_offset(dx: i32, dy: i32) -> Result<Self> {
        OFFSETS
            .iter()
            .position(|&offset| offset == (dx, dy))
            .map(Self::from_index)
            .ok_or(Error::InvalidDirection { dx, dy })
    }

    /// Rotate by `steps` eighth-turns; positive is clockwise.
    pub fn rotate(self, steps: i32) -> Self {
        Self::from_index((self.index() as i32 + steps).rem_euclid(8) as usize)
    }

    /// 90° counterclockwise.
    pub fn left(self) -> Self {
        self.rotate(-2)
    }

    /// 90° clockwise.
    pub fn right(self) -> Self {
        self.rotate(2)
    }

    pub fn opposite(self) -> Self {
        self.rotate(4)
    }

    pub fn is_cardinal(self) -> bool {
        self.index() % 2 == 0
    }

    pub fn is_diagonal(self) -> bool {
        !self.is_cardinal()
    }

    /// Short protocol code (`n`, `ne`, ...).
    pub fn code(self) -> &'static str {
        CODES[self.index()]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let lowered = value.trim().to_ascii_lowercase();
        CODES
            .iter()
            .position(|code| *code == lowered)
            .or_else(|| NAMES.iter().position(|name| *name == lowered))
            .map(Self::from_index)
            .ok_or_else(|| Error::invalid_maze(format!("unknown direction `{value}`")))
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        direction.code().to_string()
    }
}

impl TryFrom<String> for Direction {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Rotation side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Sign of one eighth-turn toward this side.
    pub fn sign(self) -> i32 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "L",
            Side::Right => "R",
        })
    }
}

/// Shortest rotation between two headings, in 45° steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnDelta {
    pub steps: u8,
    pub side: Side,
}

/// Minimal rotation from `from` to `to`.
///
/// Ties (no rotation, or a half turn) resolve to [`Side::Right`].
pub fn turn_delta(from: Direction, to: Direction) -> TurnDelta {
    let clockwise = (to.index() + 8 - from.index()) % 8;
    let counterclockwise = (8 - clockwise) % 8;
    if counterclockwise < clockwise {
        TurnDelta {
            steps: counterclockwise as u8,
            side: Side::Left,
        }
    } else {
        TurnDelta {
            steps: clockwise as u8,
            side: Side::Right,
        }
    }
}
