//! Line-oriented text protocol spoken by maze simulators.
//!
//! Every request is one line on the writer. Queries and motions wait for one
//! reply line; visualization requests are fire-and-forget. Replies are read
//! on a background thread so a silent simulator surfaces as
//! [`Error::PeripheralTimeout`] instead of a hang.

use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use micromouse_lib::{Color, Command, Coord, Direction, Error, Peripheral, Result, Side};
use tracing::{debug, trace};

pub struct TextPeripheral<W> {
    writer: W,
    replies: Receiver<std::io::Result<String>>,
    timeout: Duration,
}

impl<W: Write> TextPeripheral<W> {
    /// Start the reply reader over `reader` and send requests to `writer`.
    pub fn new<R>(reader: R, writer: W, timeout: Duration) -> Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (sender, replies) = mpsc::channel();
        thread::Builder::new()
            .name("peripheral-replies".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    if sender.send(line).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            writer,
            replies,
            timeout,
        })
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn send_line(&mut self, line: &str) -> Result<()> {
        trace!(request = line, "peripheral request");
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }

    fn request(&mut self, line: &str) -> Result<String> {
        self.send_line(line)?;
        match self.replies.recv_timeout(self.timeout) {
            Ok(Ok(reply)) => {
                let reply = reply.trim().to_string();
                trace!(request = line, %reply, "peripheral reply");
                Ok(reply)
            }
            Ok(Err(err)) => Err(Error::Io(err)),
            Err(RecvTimeoutError::Timeout) => Err(Error::PeripheralTimeout {
                request: line.to_string(),
                millis: self.timeout.as_millis() as u64,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(Error::Peripheral {
                message: format!("input closed while waiting for `{line}`"),
            }),
        }
    }

    fn query_bool(&mut self, line: &str) -> Result<bool> {
        match self.request(line)?.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(unexpected(line, other)),
        }
    }

    fn query_size(&mut self, line: &str) -> Result<usize> {
        let reply = self.request(line)?;
        reply.parse().map_err(|_| unexpected(line, &reply))
    }

    fn motion(&mut self, line: &str, command: Command) -> Result<()> {
        match self.request(line)?.as_str() {
            "ack" => Ok(()),
            "crash" => Err(Error::MotionRejected { command }),
            other => Err(unexpected(line, other)),
        }
    }

    /// Visualization writes never fail the caller.
    fn notify(&mut self, line: String) {
        if let Err(err) = self.send_line(&line) {
            debug!(request = %line, error = %err, "display update dropped");
        }
    }
}

fn unexpected(request: &str, reply: &str) -> Error {
    Error::Peripheral {
        message: format!("unexpected reply `{reply}` to `{request}`"),
    }
}

impl<W: Write> Peripheral for TextPeripheral<W> {
    fn maze_width(&mut self) -> Result<usize> {
        self.query_size("mazeWidth")
    }

    fn maze_height(&mut self) -> Result<usize> {
        self.query_size("mazeHeight")
    }

    fn wall_front(&mut self) -> Result<bool> {
        self.query_bool("wallFront")
    }

    fn wall_left(&mut self) -> Result<bool> {
        self.query_bool("wallLeft")
    }

    fn wall_right(&mut self) -> Result<bool> {
        self.query_bool("wallRight")
    }

    fn move_forward(&mut self) -> Result<()> {
        self.motion("moveForward", Command::Forward)
    }

    fn move_forward_half(&mut self) -> Result<()> {
        self.motion("moveForwardHalf", Command::HalfForward)
    }

    fn turn_left(&mut self) -> Result<()> {
        self.motion("turnLeft", Command::Turn90(Side::Left))
    }

    fn turn_right(&mut self) -> Result<()> {
        self.motion("turnRight", Command::Turn90(Side::Right))
    }

    fn turn_left_45(&mut self) -> Result<()> {
        self.motion("turnLeft45", Command::Turn45(Side::Left))
    }

    fn turn_right_45(&mut self) -> Result<()> {
        self.motion("turnRight45", Command::Turn45(Side::Right))
    }

    fn set_color(&mut self, cell: Coord, color: Color) {
        self.notify(format!("setColor {} {} {color}", cell.x, cell.y));
    }

    fn clear_color(&mut self, cell: Coord) {
        self.notify(format!("clearColor {} {}", cell.x, cell.y));
    }

    fn clear_all_color(&mut self) {
        self.notify("clearAllColor".to_string());
    }

    fn set_text(&mut self, cell: Coord, text: &str) {
        self.notify(format!("setText {} {} {text}", cell.x, cell.y));
    }

    fn clear_text(&mut self, cell: Coord) {
        self.notify(format!("clearText {} {}", cell.x, cell.y));
    }

    fn clear_all_text(&mut self) {
        self.notify("clearAllText".to_string());
    }

    fn set_wall(&mut self, cell: Coord, direction: Direction) {
        self.notify(format!("setWall {} {} {direction}", cell.x, cell.y));
    }
}
