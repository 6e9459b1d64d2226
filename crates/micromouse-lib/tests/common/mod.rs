//! Shared fixtures for the integration tests.
//!
//! Mazes live in `docs/fixtures` as `+---+` text and are loaded either as a
//! fully known map (for routing tests) or behind a [`SimulatedMaze`].

use std::fs;
use std::path::PathBuf;

use micromouse_lib::{Coord, Direction, GridMap, SimulatedMaze};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn fixture_text(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}

/// A fixture maze with every cell already explored.
#[allow(dead_code)]
pub fn known_maze(name: &str) -> GridMap {
    let mut grid = GridMap::parse_ascii(&fixture_text(name)).expect("fixture parses");
    explore_all(&mut grid);
    grid
}

/// A wall-free map with every cell explored.
#[allow(dead_code)]
pub fn open_grid(width: usize, height: usize) -> GridMap {
    let mut grid = GridMap::new(width, height).expect("valid size");
    explore_all(&mut grid);
    grid
}

#[allow(dead_code)]
pub fn explore_all(grid: &mut GridMap) {
    let coords: Vec<Coord> = grid.coords().collect();
    for coord in coords {
        grid.mark_explored(coord).expect("in bounds");
    }
}

#[allow(dead_code)]
pub fn simulator(name: &str, start: Coord, heading: Direction) -> SimulatedMaze {
    SimulatedMaze::from_ascii(&fixture_text(name), start, heading).expect("fixture parses")
}

/// Small deterministic generator so randomized tests are reproducible.
#[allow(dead_code)]
pub struct XorShift(u64);

#[allow(dead_code)]
impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    pub fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }
}
