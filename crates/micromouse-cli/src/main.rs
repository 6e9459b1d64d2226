use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use micromouse_cli::logging::{init_logging, LoggingConfig};
use micromouse_cli::mission::run_mission;
use micromouse_cli::output::{render_summary, OutputFormat};
use micromouse_cli::protocol::TextPeripheral;
use micromouse_lib::{Coord, GridMap, MazeConfig, MazeContext, SimulatedMaze};

#[derive(Parser, Debug)]
#[command(author, version, about = "Micromouse maze solver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive a simulator over stdin/stdout using the text protocol.
    Run(MissionArgs),
    /// Run a full mission against a maze file in-process.
    Simulate {
        /// Maze layout in `+---+` text form.
        #[arg(long)]
        maze: PathBuf,
        #[command(flatten)]
        mission: MissionArgs,
    },
    /// Parse a maze file and print it back.
    Render {
        #[arg(long)]
        maze: PathBuf,
    },
}

#[derive(Args, Debug)]
struct MissionArgs {
    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Goal cell as `x,y`; repeat for several. Overrides the config.
    #[arg(long = "goal", value_name = "X,Y")]
    goals: Vec<Coord>,
    /// Disable diagonal moves in every phase.
    #[arg(long)]
    no_diagonals: bool,
    /// Per-request peripheral timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Summary format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    init_logging(&LoggingConfig::from_env());
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(&args),
        Command::Simulate { maze, mission } => handle_simulate(&maze, &mission),
        Command::Render { maze } => handle_render(&maze),
    }
}

fn load_config(args: &MissionArgs) -> Result<MazeConfig> {
    let mut config = match &args.config {
        Some(path) => MazeConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => MazeConfig::default(),
    };
    if !args.goals.is_empty() {
        config.goals = args.goals.clone();
    }
    if args.no_diagonals {
        config.explore_diagonals = false;
        config.speed_run_diagonals = false;
    }
    if let Some(millis) = args.timeout_ms {
        config.peripheral_timeout_ms = millis;
    }
    Ok(config)
}

fn load_maze(path: &Path) -> Result<GridMap> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read maze from {}", path.display()))?;
    GridMap::parse_ascii(&text).with_context(|| format!("failed to parse maze {}", path.display()))
}

fn handle_run(args: &MissionArgs) -> Result<()> {
    let config = load_config(args)?;
    let timeout = Duration::from_millis(config.peripheral_timeout_ms);
    let peripheral = TextPeripheral::new(BufReader::new(io::stdin()), io::stdout(), timeout)
        .context("failed to start the peripheral reader")?;
    let mut ctx = MazeContext::new(peripheral, config).context("failed to initialise the maze")?;
    let summary = run_mission(&mut ctx).context("mission aborted")?;

    // stdout belongs to the simulator
    render_summary(&mut io::stderr(), &summary, args.format)?;
    Ok(())
}

fn handle_simulate(maze: &Path, args: &MissionArgs) -> Result<()> {
    let config = load_config(args)?;
    let truth = load_maze(maze)?;
    config
        .validate(truth.width(), truth.height())
        .context("configuration does not fit the maze")?;

    let sim = SimulatedMaze::new(truth, config.start, config.heading)?;
    let mut ctx = MazeContext::new(sim, config)?;
    let summary = run_mission(&mut ctx).context("mission aborted")?;

    let stats = ctx.peripheral().stats();
    info!(
        wall_queries = stats.wall_queries,
        motions = stats.motions,
        half_steps = stats.half_steps,
        rejections = stats.rejections,
        "simulator statistics"
    );
    render_summary(&mut io::stdout().lock(), &summary, args.format)?;
    Ok(())
}

fn handle_render(maze: &Path) -> Result<()> {
    let grid = load_maze(maze)?;
    println!("{}x{}", grid.width(), grid.height());
    print!("{}", grid.render_ascii());
    Ok(())
}
