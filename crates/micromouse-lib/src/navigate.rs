//! Route execution against a live peripheral.
//!
//! [`travel_to`] is the cautious mode used while the map is incomplete: one
//! cardinal step at a time, sensing on every arrival and replanning as soon
//! as the remaining route is contradicted. [`speed_run`] plans once over the
//! known map, collapses the stream into diagonal runs and sends it whole,
//! replanning only when a motion is rejected.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::compass::{Direction, Side};
use crate::error::{Error, Result};
use crate::goals::GoalSet;
use crate::grid::{Coord, GridMap};
use crate::motion::{
    diagonalize, expand_diagonals, plan_commands, turn_commands, Command, MouseState, Pose,
};
use crate::movement::resolve;
use crate::path::PathConstraints;
use crate::peripheral::{execute, sense_walls, Color, Peripheral};
use crate::routing::{plan_route, RouteRequest};

/// Result of a sensing trip.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Travel {
    /// Goal reached, or `None` if no route exists under current knowledge.
    pub reached: Option<Coord>,
    /// Cells explored for the first time along the way, in visit order.
    pub discovered: Vec<Coord>,
    /// Commands acknowledged by the peripheral.
    pub commands: usize,
    pub replans: usize,
}

/// Walk to the nearest goal, sensing walls on every arrival.
pub fn travel_to<P: Peripheral + ?Sized>(
    peripheral: &mut P,
    grid: &mut GridMap,
    mouse: &mut MouseState,
    goals: &GoalSet,
    constraints: &PathConstraints,
) -> Result<Travel> {
    let mut travel = Travel::default();

    'plan: loop {
        if goals.contains(mouse.cell()) {
            travel.reached = Some(mouse.cell());
            return Ok(travel);
        }

        let request = RouteRequest {
            constraints: constraints.clone(),
            ..RouteRequest::a_star(mouse.cell(), goals.clone())
        };
        let plan = match plan_route(grid, &request) {
            Ok(plan) => plan,
            Err(Error::NoPathFound { .. }) => return Ok(travel),
            Err(error) => return Err(error),
        };
        let steps = expand_diagonals(grid, mouse.cell(), &plan.steps, constraints.allow_diagonal)?;

        for (index, &next) in steps.iter().enumerate() {
            let (dx, dy) = mouse.cell().delta(next);
            let direction = Direction::from_offset(dx, dy)?;
            let mut commands = turn_commands(mouse.heading(), direction);
            commands.push(Command::Forward);

            match execute(peripheral, mouse, grid, &commands) {
                Ok(()) => travel.commands += commands.len(),
                Err(Error::MotionRejected { command }) => {
                    if learn_wall_ahead(grid, mouse, command)? {
                        travel.replans += 1;
                        continue 'plan;
                    }
                    return Err(Error::MotionRejected { command });
                }
                Err(error) => return Err(error),
            }

            let cell = mouse.cell();
            let learned = sense_walls(peripheral, grid, mouse)?;
            if grid.mark_explored(cell)? {
                travel.discovered.push(cell);
            }
            if learned && !route_is_open(grid, cell, &steps[index + 1..]) {
                debug!(%cell, "route contradicted by new walls");
                travel.replans += 1;
                continue 'plan;
            }
        }
    }
}

fn route_is_open(grid: &GridMap, from: Coord, steps: &[Coord]) -> bool {
    let mut current = from;
    for &next in steps {
        if !resolve(grid, current, next, false).can_move {
            return false;
        }
        current = next;
    }
    true
}

/// Record the wall that made a forward motion fail.
///
/// Returns `false` if the rejection taught nothing new, in which case the
/// wall model cannot explain the crash.
fn learn_wall_ahead(grid: &mut GridMap, mouse: &MouseState, command: Command) -> Result<bool> {
    let moving = matches!(command, Command::Forward | Command::HalfForward);
    if !moving || !mouse.pose().is_square() {
        return Ok(false);
    }
    let learned = grid.set_wall(mouse.cell(), mouse.heading())?;
    if learned {
        warn!(
            cell = %mouse.cell(),
            heading = %mouse.heading(),
            "motion rejected; recorded wall and replanning"
        );
    }
    Ok(learned)
}

/// Outcome of a speed run.
#[derive(Debug, Clone, Serialize)]
pub struct SpeedRun {
    pub goal: Coord,
    pub cost: f64,
    /// Every command acknowledged, across replans.
    pub commands: Vec<Command>,
    pub replans: usize,
}

/// Drive to the nearest goal over the known map without sensing.
///
/// With `allow_diagonal` the route may cut corners and the command stream is
/// collapsed into diagonal runs. A rejected motion records the wall it ran
/// into, brings the mouse back to a cell centre and replans from there.
pub fn speed_run<P: Peripheral + ?Sized>(
    peripheral: &mut P,
    grid: &mut GridMap,
    mouse: &mut MouseState,
    goals: &GoalSet,
    allow_diagonal: bool,
) -> Result<SpeedRun> {
    let mut sent = Vec::new();
    let mut replans = 0;

    loop {
        let request = RouteRequest::a_star(mouse.cell(), goals.clone()).with_diagonals(allow_diagonal);
        let plan = plan_route(grid, &request)?;
        let baseline = plan_commands(grid, mouse.cell(), mouse.heading(), &plan.steps, allow_diagonal)?;
        let commands = if allow_diagonal {
            diagonalize(&baseline)
        } else {
            baseline
        };
        info!(
            start = %mouse.cell(),
            goal = %plan.goal,
            cost = plan.cost,
            hops = plan.hop_count(),
            diagonals = plan.diagonal_count(),
            commands = commands.len(),
            "speed run planned"
        );
        for &cell in &plan.steps {
            peripheral.set_color(cell, Color::DarkGray);
        }

        let mut outcome = Ok(());
        for &command in &commands {
            if let Err(error) = execute(peripheral, mouse, grid, &[command]) {
                outcome = Err(error);
                break;
            }
            sent.push(command);
        }

        match outcome {
            Ok(()) => {
                return Ok(SpeedRun {
                    goal: plan.goal,
                    cost: plan.cost,
                    commands: sent,
                    replans,
                })
            }
            Err(Error::MotionRejected { command }) => {
                if recover(peripheral, grid, mouse, command, &mut sent)? {
                    replans += 1;
                    continue;
                }
                return Err(Error::MotionRejected { command });
            }
            Err(error) => return Err(error),
        }
    }
}

/// Learn from a motion rejected during a speed run and leave the mouse
/// square on a cell, ready to replan.
///
/// Off-centre, a rejected full step is retried as a half step to tell which
/// of the two edges it crosses is closed. Returns `false` if nothing new was
/// learned or the mouse could not be squared up.
fn recover<P: Peripheral + ?Sized>(
    peripheral: &mut P,
    grid: &mut GridMap,
    mouse: &mut MouseState,
    command: Command,
    sent: &mut Vec<Command>,
) -> Result<bool> {
    if mouse.pose().is_square() {
        return learn_wall_ahead(grid, mouse, command);
    }
    if !matches!(command, Command::Forward | Command::HalfForward) {
        return Ok(false);
    }

    let mut blocked = mouse.pose().advanced(1);
    if command == Command::Forward {
        match execute(peripheral, mouse, grid, &[Command::HalfForward]) {
            Ok(()) => {
                sent.push(Command::HalfForward);
                blocked = mouse.pose().advanced(1);
            }
            Err(Error::MotionRejected { .. }) => {}
            Err(error) => return Err(error),
        }
    }

    if !record_edge(grid, blocked)? {
        return Ok(false);
    }
    warn!(
        x2 = blocked.x2,
        y2 = blocked.y2,
        last = %mouse.cell(),
        "motion rejected mid-run; recorded wall and realigning"
    );
    realign(peripheral, grid, mouse, sent)
}

/// Record the wall at an edge midpoint.
fn record_edge(grid: &mut GridMap, point: Pose) -> Result<bool> {
    let Some((cell, direction)) = point.edge() else {
        return Ok(false);
    };
    if grid.is_valid(cell) {
        grid.set_wall(cell, direction)
    } else {
        grid.set_wall(cell.step(direction), direction.opposite())
    }
}

/// Step back off the edge midpoint the mouse stands on into the cell it came
/// from, facing along an axis.
///
/// The edge was just crossed, so the half step back is open.
fn realign<P: Peripheral + ?Sized>(
    peripheral: &mut P,
    grid: &GridMap,
    mouse: &mut MouseState,
    sent: &mut Vec<Command>,
) -> Result<bool> {
    let pose = mouse.pose();
    let commands = match (pose.edge(), pose.centre()) {
        (Some((_, across)), _) => {
            let (dx, dy) = pose.heading.offset();
            let along = if across == Direction::East { dx } else { dy };
            let back = if along > 0 { across.opposite() } else { across };
            let mut commands = turn_commands(pose.heading, back);
            commands.push(Command::HalfForward);
            commands
        }
        (None, Some(_)) if !pose.heading.is_cardinal() => vec![Command::Turn45(Side::Right)],
        _ => Vec::new(),
    };

    for command in commands {
        execute(peripheral, mouse, grid, &[command])?;
        sent.push(command);
    }
    Ok(mouse.pose().is_square())
}
