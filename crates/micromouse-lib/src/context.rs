//! Owned state for one mouse in one maze.

use tracing::info;

use crate::compass::Direction;
use crate::config::MazeConfig;
use crate::error::Result;
use crate::explorer::{ExplorationReport, Explorer};
use crate::goals::GoalSet;
use crate::grid::{Coord, GridMap};
use crate::motion::MouseState;
use crate::navigate::{self, SpeedRun, Travel};
use crate::path::PathConstraints;
use crate::peripheral::{Color, Peripheral};

/// Everything a mission mutates: the learned map, the mouse and the
/// peripheral it drives.
///
/// Independent contexts share nothing, so several can run side by side.
pub struct MazeContext<P> {
    peripheral: P,
    grid: GridMap,
    mouse: MouseState,
    goals: GoalSet,
    config: MazeConfig,
}

impl<P: Peripheral> MazeContext<P> {
    /// Size the map, asking the peripheral for any dimension the config
    /// leaves out.
    pub fn new(mut peripheral: P, config: MazeConfig) -> Result<Self> {
        let width = match config.width {
            Some(width) => width,
            None => peripheral.maze_width()?,
        };
        let height = match config.height {
            Some(height) => height,
            None => peripheral.maze_height()?,
        };
        config.validate(width, height)?;

        let grid = GridMap::new(width, height)?;
        let goals = config.goal_set(width, height);
        info!(
            width,
            height,
            start = %config.start,
            goals = goals.len(),
            "maze context ready"
        );

        Ok(Self {
            peripheral,
            grid,
            mouse: MouseState::new(config.start, config.heading),
            goals,
            config,
        })
    }

    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    pub fn mouse(&self) -> &MouseState {
        &self.mouse
    }

    pub fn start(&self) -> Coord {
        self.config.start
    }

    pub fn goals(&self) -> &GoalSet {
        &self.goals
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    pub fn into_peripheral(self) -> P {
        self.peripheral
    }

    /// Reset the display, outline the maze and label the start and goal
    /// cells.
    pub fn annotate_setup(&mut self) {
        self.peripheral.clear_all_color();
        self.peripheral.clear_all_text();

        let width = self.grid.width() as i32;
        let height = self.grid.height() as i32;
        for x in 0..width {
            self.peripheral.set_wall(Coord::new(x, 0), Direction::South);
            self.peripheral.set_wall(Coord::new(x, height - 1), Direction::North);
        }
        for y in 0..height {
            self.peripheral.set_wall(Coord::new(0, y), Direction::West);
            self.peripheral.set_wall(Coord::new(width - 1, y), Direction::East);
        }

        let start = self.start();
        self.peripheral.set_color(start, Color::DarkBlue);
        self.peripheral.set_text(start, "Start");
        for goal in self.goals.iter() {
            self.peripheral.set_color(goal, Color::DarkGreen);
            self.peripheral.set_text(goal, "Goal");
        }
    }

    /// Map every reachable cell, leaving the goal region for last.
    pub fn explore(&mut self) -> Result<ExplorationReport> {
        let explorer = Explorer::new(self.config.explore_diagonals).deferring(self.goals.iter());
        info!(
            start = %self.mouse.cell(),
            deferred = explorer.deferred().len(),
            "exploring"
        );
        explorer.explore(&mut self.peripheral, &mut self.grid, &mut self.mouse)
    }

    /// Walk back to the start cell, still sensing on the way.
    pub fn return_to_start(&mut self) -> Result<Travel> {
        let constraints = PathConstraints {
            allow_diagonal: self.config.explore_diagonals,
            ..PathConstraints::default()
        };
        navigate::travel_to(
            &mut self.peripheral,
            &mut self.grid,
            &mut self.mouse,
            &GoalSet::single(self.config.start),
            &constraints,
        )
    }

    /// Fastest known route to the goal region.
    pub fn speed_run(&mut self) -> Result<SpeedRun> {
        navigate::speed_run(
            &mut self.peripheral,
            &mut self.grid,
            &mut self.mouse,
            &self.goals,
            self.config.speed_run_diagonals,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedMaze;

    const OPEN: &str = "\
+---+---+---+---+
|               |
+               +
|               |
+               +
|               |
+               +
|               |
+---+---+---+---+
";

    fn context(config: MazeConfig) -> MazeContext<SimulatedMaze> {
        let sim = SimulatedMaze::from_ascii(OPEN, config.start, config.heading).unwrap();
        MazeContext::new(sim, config).unwrap()
    }

    #[test]
    fn dimensions_come_from_the_peripheral() {
        let ctx = context(MazeConfig::default());
        assert_eq!((ctx.grid().width(), ctx.grid().height()), (4, 4));
        assert_eq!(
            ctx.goals().as_slice(),
            &[
                Coord::new(1, 1),
                Coord::new(1, 2),
                Coord::new(2, 1),
                Coord::new(2, 2)
            ]
        );
    }

    #[test]
    fn setup_labels_start_and_goals() {
        let mut ctx = context(MazeConfig::default());
        ctx.annotate_setup();
        let sim = ctx.peripheral();
        assert_eq!(sim.text(Coord::new(0, 0)), Some("Start"));
        assert_eq!(sim.color(Coord::new(0, 0)), Some(Color::DarkBlue));
        assert_eq!(sim.text(Coord::new(2, 2)), Some("Goal"));
        assert_eq!(sim.color(Coord::new(2, 2)), Some(Color::DarkGreen));

        let outline = sim.drawn_walls();
        assert_eq!(outline.len(), 16);
        assert!(outline.contains(&(Coord::new(0, 3), Direction::West)));
        assert!(outline.contains(&(Coord::new(0, 3), Direction::North)));
        assert!(outline.contains(&(Coord::new(3, 0), Direction::East)));
        assert!(!outline.contains(&(Coord::new(1, 1), Direction::North)));
    }

    #[test]
    fn explore_return_and_speed_run() {
        let mut ctx = context(MazeConfig::default());
        let report = ctx.explore().unwrap();
        assert_eq!(report.explored.len(), 16);
        assert!(ctx.goals().contains(*report.explored.last().unwrap()));

        let back = ctx.return_to_start().unwrap();
        assert_eq!(back.reached, Some(Coord::new(0, 0)));

        let run = ctx.speed_run().unwrap();
        assert!(ctx.goals().contains(run.goal));
        assert_eq!(run.goal, Coord::new(1, 1));
        assert!((run.cost - std::f64::consts::SQRT_2).abs() < 1e-9);
        assert_eq!(ctx.mouse().cell(), Coord::new(1, 1));
        assert_eq!(run.replans, 0);
    }

    #[test]
    fn goal_outside_the_maze_is_rejected() {
        let sim = SimulatedMaze::from_ascii(OPEN, Coord::new(0, 0), Direction::North).unwrap();
        let config = MazeConfig {
            goals: vec![Coord::new(4, 0)],
            ..MazeConfig::default()
        };
        assert!(matches!(
            MazeContext::new(sim, config),
            Err(crate::error::Error::OutOfBounds { x: 4, .. })
        ));
    }
}
