//! Sensor/actuator boundary.
//!
//! A [`Peripheral`] is whatever executes commands: the text-protocol
//! simulator adapter in the CLI, the in-process [`crate::sim::SimulatedMaze`],
//! or real hardware. The helpers here are the only code that talks to it.

use std::fmt;

use tracing::{debug, trace};

use crate::compass::{Direction, Side};
use crate::error::{Error, Result};
use crate::grid::{Coord, GridMap};
use crate::motion::{Command, MouseState};

/// Cell highlight colours understood by the maze display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Blue,
    Gray,
    Cyan,
    Green,
    Orange,
    Red,
    White,
    Yellow,
    DarkBlue,
    DarkCyan,
    DarkGray,
    DarkGreen,
    DarkRed,
    DarkYellow,
}

impl Color {
    /// Single-character wire code.
    pub fn code(self) -> char {
        match self {
            Color::Black => 'k',
            Color::Blue => 'b',
            Color::Gray => 'a',
            Color::Cyan => 'c',
            Color::Green => 'g',
            Color::Orange => 'o',
            Color::Red => 'r',
            Color::White => 'w',
            Color::Yellow => 'y',
            Color::DarkBlue => 'B',
            Color::DarkCyan => 'C',
            Color::DarkGray => 'A',
            Color::DarkGreen => 'G',
            Color::DarkRed => 'R',
            Color::DarkYellow => 'Y',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The mouse's sensors and actuators.
///
/// Motion methods fail with [`Error::MotionRejected`] when the mouse would
/// crash. Visualization methods are fire-and-forget and default to no-ops.
pub trait Peripheral {
    fn maze_width(&mut self) -> Result<usize>;
    fn maze_height(&mut self) -> Result<usize>;

    fn wall_front(&mut self) -> Result<bool>;
    fn wall_left(&mut self) -> Result<bool>;
    fn wall_right(&mut self) -> Result<bool>;

    fn move_forward(&mut self) -> Result<()>;
    fn move_forward_half(&mut self) -> Result<()>;
    fn turn_left(&mut self) -> Result<()>;
    fn turn_right(&mut self) -> Result<()>;
    fn turn_left_45(&mut self) -> Result<()>;
    fn turn_right_45(&mut self) -> Result<()>;

    fn set_color(&mut self, _cell: Coord, _color: Color) {}
    fn clear_color(&mut self, _cell: Coord) {}
    fn clear_all_color(&mut self) {}
    fn set_text(&mut self, _cell: Coord, _text: &str) {}
    fn clear_text(&mut self, _cell: Coord) {}
    fn clear_all_text(&mut self) {}
    /// Draw a wall on `direction` side of `cell`.
    fn set_wall(&mut self, _cell: Coord, _direction: Direction) {}
}

/// Forward one command to the peripheral.
pub fn send<P: Peripheral + ?Sized>(peripheral: &mut P, command: Command) -> Result<()> {
    trace!(%command, "send");
    match command {
        Command::Forward => peripheral.move_forward(),
        Command::HalfForward => peripheral.move_forward_half(),
        Command::Turn90(Side::Left) => peripheral.turn_left(),
        Command::Turn90(Side::Right) => peripheral.turn_right(),
        Command::Turn45(Side::Left) => peripheral.turn_left_45(),
        Command::Turn45(Side::Right) => peripheral.turn_right_45(),
    }
}

/// Send `commands` in order, applying each acknowledged one to `mouse`.
///
/// Stops at the first failure; `mouse` then reflects the last acknowledged
/// command.
pub fn execute<P: Peripheral + ?Sized>(
    peripheral: &mut P,
    mouse: &mut MouseState,
    grid: &GridMap,
    commands: &[Command],
) -> Result<()> {
    for &command in commands {
        send(peripheral, command)?;
        mouse.apply(command, grid)?;
    }
    Ok(())
}

/// Query front, left and right walls and record them in `grid`.
///
/// Issues exactly three queries. Returns `true` if any new wall was learned.
pub fn sense_walls<P: Peripheral + ?Sized>(
    peripheral: &mut P,
    grid: &mut GridMap,
    mouse: &MouseState,
) -> Result<bool> {
    if !mouse.pose().is_square() {
        return Err(Error::Peripheral {
            message: format!(
                "cannot sense walls off-centre or facing {}",
                mouse.heading()
            ),
        });
    }

    let cell = mouse.cell();
    let heading = mouse.heading();
    let readings = [
        (heading, peripheral.wall_front()?),
        (heading.left(), peripheral.wall_left()?),
        (heading.right(), peripheral.wall_right()?),
    ];

    let mut changed = false;
    for (direction, present) in readings {
        if present && grid.set_wall(cell, direction)? {
            peripheral.set_wall(cell, direction);
            changed = true;
        }
    }
    debug!(
        %cell,
        front = readings[0].1,
        left = readings[1].1,
        right = readings[2].1,
        changed,
        "sensed walls"
    );
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Scripted {
        walls: [bool; 3],
        reject_forward: bool,
        log: Vec<&'static str>,
        drawn: Vec<(Coord, Direction)>,
    }

    impl Peripheral for Scripted {
        fn maze_width(&mut self) -> Result<usize> {
            Ok(4)
        }
        fn maze_height(&mut self) -> Result<usize> {
            Ok(4)
        }
        fn wall_front(&mut self) -> Result<bool> {
            self.log.push("front");
            Ok(self.walls[0])
        }
        fn wall_left(&mut self) -> Result<bool> {
            self.log.push("left");
            Ok(self.walls[1])
        }
        fn wall_right(&mut self) -> Result<bool> {
            self.log.push("right");
            Ok(self.walls[2])
        }
        fn move_forward(&mut self) -> Result<()> {
            self.log.push("forward");
            if self.reject_forward {
                return Err(Error::MotionRejected {
                    command: Command::Forward,
                });
            }
            Ok(())
        }
        fn move_forward_half(&mut self) -> Result<()> {
            self.log.push("half");
            Ok(())
        }
        fn turn_left(&mut self) -> Result<()> {
            self.log.push("left90");
            Ok(())
        }
        fn turn_right(&mut self) -> Result<()> {
            self.log.push("right90");
            Ok(())
        }
        fn turn_left_45(&mut self) -> Result<()> {
            self.log.push("left45");
            Ok(())
        }
        fn turn_right_45(&mut self) -> Result<()> {
            self.log.push("right45");
            Ok(())
        }
        fn set_wall(&mut self, cell: Coord, direction: Direction) {
            self.drawn.push((cell, direction));
        }
    }

    #[test]
    fn sensing_maps_relative_readings_to_compass_walls() {
        let mut peripheral = Scripted {
            walls: [true, false, true],
            ..Scripted::default()
        };
        let mut grid = GridMap::new(4, 4).unwrap();
        let mouse = MouseState::new(Coord::new(1, 1), Direction::East);

        assert!(sense_walls(&mut peripheral, &mut grid, &mouse).unwrap());
        assert_eq!(peripheral.log, vec!["front", "left", "right"]);
        assert!(grid.wall_exists(Coord::new(1, 1), Direction::East).unwrap());
        assert!(!grid.wall_exists(Coord::new(1, 1), Direction::North).unwrap());
        assert!(grid.wall_exists(Coord::new(1, 1), Direction::South).unwrap());
        assert!(!sense_walls(&mut peripheral, &mut grid, &mouse).unwrap());
        assert_eq!(
            peripheral.drawn,
            vec![
                (Coord::new(1, 1), Direction::East),
                (Coord::new(1, 1), Direction::South),
            ]
        );
    }

    #[test]
    fn rejected_command_leaves_mouse_on_last_acknowledged_pose() {
        let mut peripheral = Scripted {
            reject_forward: true,
            ..Scripted::default()
        };
        let grid = GridMap::new(4, 4).unwrap();
        let mut mouse = MouseState::new(Coord::new(0, 0), Direction::North);
        let error = execute(
            &mut peripheral,
            &mut mouse,
            &grid,
            &[Command::Turn90(Side::Right), Command::Forward],
        )
        .unwrap_err();

        assert!(matches!(error, Error::MotionRejected { .. }));
        assert_eq!(mouse.heading(), Direction::East);
        assert_eq!(mouse.cell(), Coord::new(0, 0));
    }

    #[test]
    fn colour_codes_match_display_alphabet() {
        let codes: String = [
            Color::Black,
            Color::Blue,
            Color::Gray,
            Color::Cyan,
            Color::Green,
            Color::Orange,
            Color::Red,
            Color::White,
            Color::Yellow,
            Color::DarkBlue,
            Color::DarkCyan,
            Color::DarkGray,
            Color::DarkGreen,
            Color::DarkRed,
            Color::DarkYellow,
        ]
        .iter()
        .map(|color| color.code())
        .collect();
        assert_eq!(codes, "kbacgorwyBCAGRY");
    }
}
