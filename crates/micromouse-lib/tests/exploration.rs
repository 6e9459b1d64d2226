mod common;

use std::collections::BTreeSet;

use micromouse_lib::{
    plan_route, speed_run, trace, Command, Coord, Direction, Error, Explorer, GoalSet, GridMap,
    MouseState, Pose, RouteRequest, Side, SimulatedMaze,
};

use common::{open_grid, simulator};

fn explore(
    sim: &mut SimulatedMaze,
    start: Coord,
    heading: Direction,
    explorer: &Explorer,
) -> (GridMap, MouseState, micromouse_lib::ExplorationReport) {
    let truth = sim.truth();
    let mut grid = GridMap::new(truth.width(), truth.height()).unwrap();
    let mut mouse = MouseState::new(start, heading);
    let report = explorer.explore(sim, &mut grid, &mut mouse).unwrap();
    (grid, mouse, report)
}

fn assert_walls_are_real(known: &GridMap, truth: &GridMap) {
    for coord in known.coords() {
        for direction in Direction::CARDINALS {
            if known.wall_exists(coord, direction).unwrap() {
                let neighbour = coord.step(direction);
                let real = !truth.is_valid(neighbour) || truth.wall_exists(coord, direction).unwrap();
                assert!(real, "phantom wall {direction} of {coord}");
            }
        }
    }
}

#[test]
fn classic_maze_is_fully_covered_before_the_centre() {
    let start = Coord::new(0, 0);
    let mut sim = simulator("classic_8x8.txt", start, Direction::North);
    let centre = GoalSet::centre(8, 8);
    let explorer = Explorer::new(false).deferring(centre.iter());

    let (grid, _, report) = explore(&mut sim, start, Direction::North, &explorer);

    assert_eq!(report.explored.len(), 64);
    let unique: BTreeSet<Coord> = report.explored.iter().copied().collect();
    assert_eq!(unique.len(), 64, "a cell was explored twice");
    assert_eq!(grid.explored_count(), 64);
    assert!(report.unreachable.is_empty());
    assert!(report.explored[60..].iter().all(|cell| centre.contains(*cell)));
    assert_eq!(sim.stats().rejections, 0);
    assert_walls_are_real(&grid, sim.truth());
    assert!(sim.texts().all(|(_, text)| text != "*"));
}

#[test]
fn diagonal_exploration_covers_the_same_cells() {
    let start = Coord::new(0, 0);
    let mut sim = simulator("classic_8x8.txt", start, Direction::North);
    let explorer = Explorer::new(true).deferring(GoalSet::centre(8, 8).iter());

    let (grid, _, report) = explore(&mut sim, start, Direction::North, &explorer);
    assert_eq!(report.explored.len(), 64);
    assert_eq!(grid.explored_count(), 64);
    assert_eq!(sim.stats().rejections, 0);
}

#[test]
fn ringed_goal_terminates_with_everything_else_explored() {
    let start = Coord::new(0, 0);
    let goal = Coord::new(2, 2);
    let mut sim = simulator("blocked_goal_5x5.txt", start, Direction::North);
    let explorer = Explorer::new(false).deferring([goal]);

    let (mut grid, mouse, report) = explore(&mut sim, start, Direction::North, &explorer);

    assert_eq!(grid.explored_count(), 24);
    assert!(!grid.is_explored(goal));
    assert_eq!(report.unreachable, vec![goal]);

    let request = RouteRequest::a_star(mouse.cell(), GoalSet::single(goal));
    assert!(matches!(
        plan_route(&mut grid, &request),
        Err(Error::NoPathFound { .. })
    ));
}

#[test]
fn wall_behind_the_start_is_learned_from_a_rejection() {
    let maze = "\
+---+---+---+
|           |
+   +   +   +
|   |   |   |
+   +---+   +
|           |
+---+---+---+
";
    let start = Coord::new(1, 1);
    let mut sim = SimulatedMaze::from_ascii(maze, start, Direction::North).unwrap();

    let (grid, _, report) = explore(&mut sim, start, Direction::North, &Explorer::new(false));

    assert_eq!(grid.explored_count(), 9);
    assert_eq!(sim.stats().rejections, 1);
    assert!(report.replans >= 1);
    assert!(grid.wall_exists(start, Direction::South).unwrap());
}

#[test]
fn speed_run_after_exploration_reaches_the_centre_without_replanning() {
    let start = Coord::new(0, 0);
    let mut sim = simulator("classic_8x8.txt", start, Direction::North);
    let centre = GoalSet::centre(8, 8);
    let explorer = Explorer::new(false).deferring(centre.iter());
    let (mut grid, _, _) = explore(&mut sim, start, Direction::North, &explorer);

    let mut fresh = simulator("classic_8x8.txt", start, Direction::North);
    let mut mouse = MouseState::new(start, Direction::North);
    let run = speed_run(&mut fresh, &mut grid, &mut mouse, &centre, true).unwrap();

    assert!(centre.contains(run.goal));
    assert_eq!(mouse.cell(), run.goal);
    assert_eq!(run.replans, 0);
    assert_eq!(fresh.stats().rejections, 0);
    assert_eq!(fresh.pose().centre(), Some(run.goal));
}

#[test]
fn speed_run_replans_around_a_wall_missing_from_the_map() {
    let truth = "\
+---+---+---+
|           |
+   +   +   +
|           |
+---+   +   +
|           |
+---+---+---+
";
    let start = Coord::new(0, 0);
    let goal = Coord::new(0, 2);
    let mut sim = SimulatedMaze::from_ascii(truth, start, Direction::North).unwrap();
    let mut grid = open_grid(3, 3);
    let mut mouse = MouseState::new(start, Direction::North);

    let run = speed_run(&mut sim, &mut grid, &mut mouse, &GoalSet::single(goal), false).unwrap();

    assert_eq!(run.replans, 1);
    assert_eq!(sim.stats().rejections, 1);
    assert_eq!(run.goal, goal);
    assert_eq!(mouse.cell(), goal);
    assert_eq!(sim.pose().centre(), Some(goal));
    assert!((run.cost - 4.0).abs() < 1e-9);
    assert!(grid.wall_exists(start, Direction::North).unwrap());
    assert!(grid.wall_exists(Coord::new(0, 1), Direction::South).unwrap());
}

#[test]
fn speed_run_recovers_from_a_rejection_mid_diagonal() {
    // Walls north and east of (1, 1); the known map is wall-free.
    let truth = "\
+---+---+---+---+
|               |
+   +   +   +   +
|               |
+   +---+   +   +
|       |       |
+   +   +   +   +
|               |
+---+---+---+---+
";
    let start = Coord::new(0, 0);
    let goal = Coord::new(3, 3);
    let mut sim = SimulatedMaze::from_ascii(truth, start, Direction::North).unwrap();
    let mut grid = open_grid(4, 4);
    let mut mouse = MouseState::new(start, Direction::North);

    let run = speed_run(&mut sim, &mut grid, &mut mouse, &GoalSet::single(goal), true).unwrap();

    // Into the diagonal, the rejected full step retried as a half step, then
    // back into (0, 1) facing west.
    assert_eq!(
        run.commands[..6],
        [
            Command::HalfForward,
            Command::Turn45(Side::Right),
            Command::HalfForward,
            Command::Turn90(Side::Left),
            Command::Turn45(Side::Left),
            Command::HalfForward,
        ]
    );
    assert!(run.replans >= 1);
    assert!(sim.stats().rejections >= run.replans);
    assert!(grid.wall_exists(Coord::new(1, 1), Direction::North).unwrap());
    assert!(grid.wall_exists(Coord::new(1, 2), Direction::South).unwrap());

    assert_eq!(run.goal, goal);
    assert_eq!(mouse.cell(), goal);
    assert!(mouse.pose().is_square());
    assert_eq!(sim.pose().centre(), Some(goal));
    assert_eq!(trace(Pose::at(start, Direction::North), &run.commands), sim.pose());
}
