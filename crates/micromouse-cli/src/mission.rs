//! Phase orchestration: explore, return, speed run, return.
//!
//! Phases run strictly one after another. A phase that cannot reach its
//! target is recorded in the summary and the mission moves on; anything else
//! (timeouts, protocol violations, unexplained crashes) aborts the mission.

use micromouse_lib::{
    format_commands, Coord, Error, MazeContext, Peripheral, Result, SpeedRun, Travel,
};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Explore,
    ReturnToStart,
    SpeedRun,
    ReturnHome,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Explore => "explore",
            Phase::ReturnToStart => "return to start",
            Phase::SpeedRun => "speed run",
            Phase::ReturnHome => "return home",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Completed,
    NoPath,
    Rejected,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub status: PhaseStatus,
    pub commands: usize,
    pub replans: usize,
    /// Cell the mouse ended the phase on.
    pub end: Coord,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeedRunSummary {
    pub goal: Coord,
    pub cost: f64,
    pub commands: String,
}

/// Everything a mission produced, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct MissionSummary {
    pub width: usize,
    pub height: usize,
    pub start: Coord,
    pub goals: Vec<Coord>,
    pub explored: usize,
    pub unreachable: Vec<Coord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_run: Option<SpeedRunSummary>,
    pub phases: Vec<PhaseReport>,
    /// Known walls after the mission, in `+---+` form.
    pub map: String,
}

impl MissionSummary {
    /// `true` when the speed run reached a goal.
    pub fn reached_goal(&self) -> bool {
        self.speed_run.is_some()
    }
}

/// Run every phase against the context's peripheral.
pub fn run_mission<P: Peripheral>(ctx: &mut MazeContext<P>) -> Result<MissionSummary> {
    ctx.annotate_setup();
    let mut phases = Vec::new();

    let exploration = ctx.explore()?;
    phases.push(PhaseReport {
        phase: Phase::Explore,
        status: PhaseStatus::Completed,
        commands: exploration.commands,
        replans: exploration.replans,
        end: ctx.mouse().cell(),
    });

    let returning = ctx.config().return_to_start;
    if returning {
        let travel = ctx.return_to_start()?;
        phases.push(travel_report(Phase::ReturnToStart, &travel, ctx.mouse().cell()));
    }

    let speed_run = match ctx.speed_run() {
        Ok(run) => {
            phases.push(PhaseReport {
                phase: Phase::SpeedRun,
                status: PhaseStatus::Completed,
                commands: run.commands.len(),
                replans: run.replans,
                end: ctx.mouse().cell(),
            });
            Some(summarize(&run))
        }
        Err(err) if err.is_recoverable() => {
            warn!(error = %err, "speed run abandoned");
            phases.push(PhaseReport {
                phase: Phase::SpeedRun,
                status: status_for(&err),
                commands: 0,
                replans: 0,
                end: ctx.mouse().cell(),
            });
            None
        }
        Err(err) => return Err(err),
    };

    if returning && speed_run.is_some() && ctx.mouse().is_centred() {
        let travel = ctx.return_to_start()?;
        phases.push(travel_report(Phase::ReturnHome, &travel, ctx.mouse().cell()));
    }

    let grid = ctx.grid();
    let summary = MissionSummary {
        width: grid.width(),
        height: grid.height(),
        start: ctx.start(),
        goals: ctx.goals().as_slice().to_vec(),
        explored: exploration.explored.len(),
        unreachable: exploration.unreachable,
        speed_run,
        phases,
        map: grid.render_ascii(),
    };
    info!(
        explored = summary.explored,
        reached_goal = summary.reached_goal(),
        "mission finished"
    );
    Ok(summary)
}

fn travel_report(phase: Phase, travel: &Travel, end: Coord) -> PhaseReport {
    if travel.reached.is_none() {
        warn!(%phase, %end, "no known route back to the start");
    }
    PhaseReport {
        phase,
        status: if travel.reached.is_some() {
            PhaseStatus::Completed
        } else {
            PhaseStatus::NoPath
        },
        commands: travel.commands,
        replans: travel.replans,
        end,
    }
}

fn status_for(err: &Error) -> PhaseStatus {
    match err {
        Error::NoPathFound { .. } => PhaseStatus::NoPath,
        _ => PhaseStatus::Rejected,
    }
}

fn summarize(run: &SpeedRun) -> SpeedRunSummary {
    SpeedRunSummary {
        goal: run.goal,
        cost: run.cost,
        commands: format_commands(&run.commands),
    }
}

#[cfg(test)]
mod tests {
    use micromouse_lib::{Direction, MazeConfig, SimulatedMaze};

    use super::*;

    const BLOCKED: &str = "\
+---+---+---+
|           |
+   +---+   +
|   |   |   |
+   +---+   +
|           |
+---+---+---+
";

    #[test]
    fn unreachable_goal_is_reported_not_fatal() {
        let sim = SimulatedMaze::from_ascii(BLOCKED, Coord::new(0, 0), Direction::North).unwrap();
        let mut ctx = MazeContext::new(sim, MazeConfig::default()).unwrap();

        let summary = run_mission(&mut ctx).unwrap();
        assert_eq!(summary.explored, 8);
        assert_eq!(summary.unreachable, vec![Coord::new(1, 1)]);
        assert!(!summary.reached_goal());

        let statuses: Vec<(Phase, PhaseStatus)> =
            summary.phases.iter().map(|p| (p.phase, p.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (Phase::Explore, PhaseStatus::Completed),
                (Phase::ReturnToStart, PhaseStatus::Completed),
                (Phase::SpeedRun, PhaseStatus::NoPath),
            ]
        );
    }

    #[test]
    fn open_maze_mission_returns_home() {
        let open = "\
+---+---+---+
|           |
+           +
|           |
+           +
|           |
+---+---+---+
";
        let sim = SimulatedMaze::from_ascii(open, Coord::new(0, 0), Direction::North).unwrap();
        let mut ctx = MazeContext::new(sim, MazeConfig::default()).unwrap();

        let summary = run_mission(&mut ctx).unwrap();
        let run = summary.speed_run.as_ref().unwrap();
        assert_eq!(run.goal, Coord::new(1, 1));
        assert_eq!(summary.phases.len(), 4);
        assert_eq!(summary.phases[3].end, Coord::new(0, 0));
        assert_eq!(ctx.mouse().cell(), Coord::new(0, 0));
    }
}
