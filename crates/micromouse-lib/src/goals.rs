use serde::{Deserialize, Serialize};

use crate::grid::Coord;

/// Ordered, de-duplicated target cells.
///
/// Order is significant: when two goals are reached at equal cost the one
/// listed first wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Coord>", into = "Vec<Coord>")]
pub struct GoalSet {
    cells: Vec<Coord>,
}

impl GoalSet {
    pub fn new(cells: impl IntoIterator<Item = Coord>) -> Self {
        let mut unique = Vec::new();
        for cell in cells {
            if !unique.contains(&cell) {
                unique.push(cell);
            }
        }
        Self { cells: unique }
    }

    pub fn single(cell: Coord) -> Self {
        Self { cells: vec![cell] }
    }

    /// The centre region of a `width` x `height` maze: four cells when both
    /// sides are even, fewer when a side is odd.
    pub fn centre(width: usize, height: usize) -> Self {
        let span = |size: usize| {
            let upper = (size / 2) as i32;
            if size % 2 == 0 {
                vec![upper - 1, upper]
            } else {
                vec![upper]
            }
        };
        let mut cells = Vec::new();
        for x in span(width) {
            for y in span(height) {
                cells.push(Coord::new(x, y));
            }
        }
        Self::new(cells)
    }

    pub fn contains(&self, cell: Coord) -> bool {
        self.cells.contains(&cell)
    }

    /// Position of `cell` in the set.
    pub fn rank(&self, cell: Coord) -> Option<usize> {
        self.cells.iter().position(|goal| *goal == cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[Coord] {
        &self.cells
    }
}

impl From<Vec<Coord>> for GoalSet {
    fn from(cells: Vec<Coord>) -> Self {
        Self::new(cells)
    }
}

impl From<GoalSet> for Vec<Coord> {
    fn from(goals: GoalSet) -> Self {
        goals.cells
    }
}

impl FromIterator<Coord> for GoalSet {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_keep_first_position() {
        let goals = GoalSet::new([Coord::new(2, 2), Coord::new(1, 1), Coord::new(2, 2)]);
        assert_eq!(goals.len(), 2);
        assert_eq!(goals.rank(Coord::new(1, 1)), Some(1));
        assert_eq!(goals.rank(Coord::new(0, 0)), None);
    }

    #[test]
    fn classic_centre_is_four_cells() {
        let goals = GoalSet::centre(16, 16);
        assert_eq!(
            goals.as_slice(),
            &[
                Coord::new(7, 7),
                Coord::new(7, 8),
                Coord::new(8, 7),
                Coord::new(8, 8)
            ]
        );
    }

    #[test]
    fn odd_maze_has_single_centre() {
        assert_eq!(GoalSet::centre(5, 5).as_slice(), &[Coord::new(2, 2)]);
        assert_eq!(GoalSet::centre(5, 4).len(), 2);
    }
}
