//! Micromouse maze solving library.
//!
//! This crate holds everything a mouse needs between its sensors and its
//! motors: the learned wall map, eight-way movement rules, A* routing toward
//! a goal set, frontier exploration and the translation of cell paths into
//! turn/move commands (including diagonal run collapsing). Transports that
//! talk to a real simulator or robot implement [`Peripheral`] and hand it to
//! a [`MazeContext`].

pub mod compass;
pub mod config;
pub mod context;
pub mod error;
pub mod explorer;
pub mod goals;
pub mod grid;
pub mod motion;
pub mod movement;
pub mod navigate;
pub mod path;
pub mod peripheral;
pub mod routing;
pub mod sim;

pub use compass::{turn_delta, Direction, Side, TurnDelta};
pub use config::MazeConfig;
pub use context::MazeContext;
pub use error::{Error, Result};
pub use explorer::{ExplorationReport, Explorer};
pub use goals::GoalSet;
pub use grid::{Cell, Coord, GridMap, Wall, Walls};
pub use motion::{diagonalize, format_commands, plan_commands, trace, Command, MouseState, Pose};
pub use movement::{resolve, DiagonalSide, Movement};
pub use navigate::{speed_run, travel_to, SpeedRun, Travel};
pub use path::{distances_from, find_route_a_star, octile_distance, PathConstraints};
pub use peripheral::{Color, Peripheral};
pub use routing::{plan_route, RouteAlgorithm, RoutePlan, RouteRequest};
pub use sim::{SimStats, SimulatedMaze};
