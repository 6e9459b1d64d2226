mod common;

use micromouse_lib::peripheral::send;
use micromouse_lib::{
    diagonalize, format_commands, plan_commands, plan_route, trace, Command, Coord, Direction,
    GoalSet, GridMap, Pose, RouteRequest, SimulatedMaze,
};

use common::{known_maze, open_grid, simulator, XorShift};

/// Random self-avoiding-ish walk that never reverses and never leaves the grid.
fn random_walk(rng: &mut XorShift, size: i32, start: Coord, steps: usize) -> Vec<Coord> {
    let mut path = Vec::with_capacity(steps);
    let mut current = start;
    let mut last: Option<Direction> = None;
    while path.len() < steps {
        let direction = Direction::CARDINALS[rng.below(4)];
        if last == Some(direction.opposite()) {
            continue;
        }
        let next = current.step(direction);
        if next.x < 0 || next.y < 0 || next.x >= size || next.y >= size {
            continue;
        }
        path.push(next);
        current = next;
        last = Some(direction);
    }
    path
}

fn execute_all(sim: &mut SimulatedMaze, commands: &[Command]) {
    for (index, &command) in commands.iter().enumerate() {
        if let Err(err) = send(sim, command) {
            panic!(
                "command {index} ({command}) of `{}` failed: {err}",
                format_commands(commands)
            );
        }
    }
}

#[test]
fn random_walks_collapse_safely() {
    let size = 16;
    let grid = open_grid(size, size);
    let truth = GridMap::new(size, size).unwrap();
    let mut rng = XorShift::new(42);

    for round in 0..200 {
        let start = Coord::new(8, 8);
        let path = random_walk(&mut rng, size as i32, start, 6 + round % 25);
        let baseline = plan_commands(&grid, start, Direction::North, &path, false).unwrap();
        let collapsed = diagonalize(&baseline);

        assert_eq!(diagonalize(&collapsed), collapsed, "not a fixed point");

        let origin = Pose::at(start, Direction::North);
        let end = trace(origin, &baseline);
        assert_eq!(trace(origin, &collapsed), end);

        let mut sim = SimulatedMaze::new(truth.clone(), start, Direction::North).unwrap();
        execute_all(&mut sim, &collapsed);
        assert_eq!(sim.pose(), end);
    }
}

#[test]
fn staircases_shrink_the_command_count() {
    let grid = open_grid(16, 16);
    let path: Vec<Coord> = (0..6)
        .flat_map(|n| [Coord::new(n + 1, n), Coord::new(n + 1, n + 1)])
        .collect();
    let baseline = plan_commands(&grid, Coord::new(0, 0), Direction::East, &path, false).unwrap();
    let collapsed = diagonalize(&baseline);

    let forwards = collapsed.iter().filter(|c| **c == Command::Forward).count();
    assert!(collapsed.len() < baseline.len());
    assert!(forwards >= 4, "{}", format_commands(&collapsed));
}

#[test]
fn collapsed_centre_run_is_legal_in_the_classic_maze() {
    let start = Coord::new(0, 0);
    let mut grid = known_maze("classic_8x8.txt");
    let request = RouteRequest::a_star(start, GoalSet::centre(8, 8)).with_diagonals(true);
    let plan = plan_route(&mut grid, &request).unwrap();

    let baseline = plan_commands(&grid, start, Direction::North, &plan.steps, true).unwrap();
    let collapsed = diagonalize(&baseline);
    assert_eq!(diagonalize(&collapsed), collapsed);

    let mut sim = simulator("classic_8x8.txt", start, Direction::North);
    execute_all(&mut sim, &collapsed);
    assert_eq!(sim.pose().centre(), Some(plan.goal));
    assert_eq!(sim.stats().rejections, 0);
}
