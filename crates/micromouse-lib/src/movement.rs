//! Edge legality between neighbouring cells.
//!
//! [`resolve`] is the only place that decides whether the mouse may cross
//! from one cell to another; both the search and the motion planner go
//! through it.

use std::f64::consts::SQRT_2;

use serde::Serialize;

use crate::compass::{Direction, Side};
use crate::grid::{Coord, GridMap};

/// Which side of the diagonal heading the intermediate cell lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagonalSide {
    None,
    Left,
    Right,
}

impl From<Side> for DiagonalSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => DiagonalSide::Left,
            Side::Right => DiagonalSide::Right,
        }
    }
}

/// Outcome of a single cell-to-cell query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    pub can_move: bool,
    pub is_diagonal: bool,
    pub diagonal_side: DiagonalSide,
    /// Cell a diagonal move physically passes through.
    pub first_half_step: Option<Coord>,
    /// Raw offset from source to target.
    pub offset: (i32, i32),
}

impl Movement {
    fn blocked(offset: (i32, i32), is_diagonal: bool) -> Self {
        Self {
            can_move: false,
            is_diagonal,
            diagonal_side: DiagonalSide::None,
            first_half_step: None,
            offset,
        }
    }

    /// Compass heading of the move, if the cells are adjacent.
    pub fn direction(&self) -> Option<Direction> {
        Direction::from_offset(self.offset.0, self.offset.1).ok()
    }

    /// Edge cost: 1 for cardinal moves, √2 for diagonal ones.
    pub fn cost(&self) -> f64 {
        if self.is_diagonal {
            SQRT_2
        } else {
            1.0
        }
    }
}

/// Decide whether the mouse can travel from `from` to `to`.
pub fn resolve(grid: &GridMap, from: Coord, to: Coord, allow_diagonal: bool) -> Movement {
    let offset = from.delta(to);
    let norm_squared = offset.0 * offset.0 + offset.1 * offset.1;

    match norm_squared {
        1 => resolve_cardinal(grid, from, to, offset),
        2 => resolve_diagonal(grid, from, to, offset, allow_diagonal),
        _ => Movement::blocked(offset, false),
    }
}

fn resolve_cardinal(grid: &GridMap, from: Coord, to: Coord, offset: (i32, i32)) -> Movement {
    let Ok(direction) = Direction::from_offset(offset.0, offset.1) else {
        return Movement::blocked(offset, false);
    };
    if !grid.is_valid(to) || wall_or_outside(grid, from, direction) {
        return Movement::blocked(offset, false);
    }

    Movement {
        can_move: true,
        is_diagonal: false,
        diagonal_side: DiagonalSide::None,
        first_half_step: None,
        offset,
    }
}

fn resolve_diagonal(
    grid: &GridMap,
    from: Coord,
    to: Coord,
    offset: (i32, i32),
    allow_diagonal: bool,
) -> Movement {
    if !allow_diagonal || !grid.is_valid(from) || !grid.is_explored(to) {
        return Movement::blocked(offset, true);
    }
    let (Ok(heading), Ok(horizontal), Ok(vertical)) = (
        Direction::from_offset(offset.0, offset.1),
        Direction::from_offset(offset.0, 0),
        Direction::from_offset(0, offset.1),
    ) else {
        return Movement::blocked(offset, true);
    };

    // Each probe is an L-shaped route through one of the two corner cells.
    let probes = [
        (
            horizontal,
            !wall_or_outside(grid, from, horizontal)
                && !wall_or_outside(grid, to, vertical.opposite()),
        ),
        (
            vertical,
            !wall_or_outside(grid, from, vertical)
                && !wall_or_outside(grid, to, horizontal.opposite()),
        ),
    ];

    let side_of = |probe: Direction| {
        if probe == heading.rotate(-1) {
            Side::Left
        } else {
            Side::Right
        }
    };

    let chosen = [Side::Left, Side::Right].into_iter().find_map(|side| {
        probes
            .iter()
            .find(|(probe, open)| *open && side_of(*probe) == side)
            .map(|(probe, _)| (side, *probe))
    });

    match chosen {
        Some((side, probe)) => Movement {
            can_move: true,
            is_diagonal: true,
            diagonal_side: side.into(),
            first_half_step: Some(from.step(probe)),
            offset,
        },
        None => Movement::blocked(offset, true),
    }
}

fn wall_or_outside(grid: &GridMap, coord: Coord, direction: Direction) -> bool {
    grid.cell(coord)
        .map(|cell| cell.has_wall(direction))
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explored_grid(width: usize, height: usize) -> GridMap {
        let mut grid = GridMap::new(width, height).unwrap();
        let coords: Vec<Coord> = grid.coords().collect();
        for coord in coords {
            grid.mark_explored(coord).unwrap();
        }
        grid
    }

    #[test]
    fn cardinal_move_respects_walls() {
        let mut grid = GridMap::new(3, 3).unwrap();
        let from = Coord::new(1, 1);
        assert!(resolve(&grid, from, Coord::new(1, 2), false).can_move);

        grid.set_wall(from, Direction::North).unwrap();
        let movement = resolve(&grid, from, Coord::new(1, 2), false);
        assert!(!movement.can_move);
        assert!(!movement.is_diagonal);
        assert!(!resolve(&grid, Coord::new(1, 2), from, false).can_move);
    }

    #[test]
    fn non_adjacent_cells_cannot_move() {
        let grid = explored_grid(4, 4);
        assert!(!resolve(&grid, Coord::new(0, 0), Coord::new(2, 0), true).can_move);
        assert!(!resolve(&grid, Coord::new(0, 0), Coord::new(0, 0), true).can_move);
        assert!(!resolve(&grid, Coord::new(0, 0), Coord::new(2, 1), true).can_move);
    }

    #[test]
    fn leaving_the_grid_is_blocked() {
        let grid = GridMap::new(2, 2).unwrap();
        assert!(!resolve(&grid, Coord::new(0, 0), Coord::new(-1, 0), false).can_move);
    }

    #[test]
    fn diagonal_needs_permission_and_exploration() {
        let mut grid = GridMap::new(3, 3).unwrap();
        let from = Coord::new(0, 0);
        let to = Coord::new(1, 1);
        assert!(!resolve(&grid, from, to, true).can_move);

        grid.mark_explored(to).unwrap();
        assert!(!resolve(&grid, from, to, false).can_move);
        let movement = resolve(&grid, from, to, true);
        assert!(movement.can_move);
        assert!(movement.is_diagonal);
        assert_eq!(movement.direction(), Some(Direction::NorthEast));
        assert!((movement.cost() - SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn open_diagonal_prefers_left_corner() {
        let grid = explored_grid(3, 3);
        let movement = resolve(&grid, Coord::new(1, 1), Coord::new(2, 2), true);
        assert_eq!(movement.diagonal_side, DiagonalSide::Left);
        assert_eq!(movement.first_half_step, Some(Coord::new(1, 2)));

        let movement = resolve(&grid, Coord::new(1, 1), Coord::new(0, 2), true);
        assert_eq!(movement.diagonal_side, DiagonalSide::Left);
        assert_eq!(movement.first_half_step, Some(Coord::new(0, 1)));
    }

    #[test]
    fn blocked_corner_falls_back_to_other_side() {
        let mut grid = explored_grid(3, 3);
        grid.set_wall(Coord::new(1, 1), Direction::North).unwrap();
        let movement = resolve(&grid, Coord::new(1, 1), Coord::new(2, 2), true);
        assert!(movement.can_move);
        assert_eq!(movement.diagonal_side, DiagonalSide::Right);
        assert_eq!(movement.first_half_step, Some(Coord::new(2, 1)));
    }

    #[test]
    fn far_wall_blocks_corner_route() {
        let mut grid = explored_grid(3, 3);
        grid.set_wall(Coord::new(1, 1), Direction::North).unwrap();
        grid.set_wall(Coord::new(2, 2), Direction::South).unwrap();
        let movement = resolve(&grid, Coord::new(1, 1), Coord::new(2, 2), true);
        assert!(!movement.can_move);
        assert_eq!(movement.diagonal_side, DiagonalSide::None);
        assert_eq!(movement.first_half_step, None);
    }
}
