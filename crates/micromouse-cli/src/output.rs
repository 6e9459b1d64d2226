//! Rendering of mission summaries.

use std::io::{self, Write};

use clap::ValueEnum;

use crate::mission::{MissionSummary, PhaseStatus};

/// Output format for summaries written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn render_summary<W: Write>(
    out: &mut W,
    summary: &MissionSummary,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, summary)?;
            writeln!(out)
        }
        OutputFormat::Text => render_text(out, summary),
    }
}

fn render_text<W: Write>(out: &mut W, summary: &MissionSummary) -> io::Result<()> {
    writeln!(
        out,
        "Maze {}x{} from {} ({} goal cells)",
        summary.width,
        summary.height,
        summary.start,
        summary.goals.len()
    )?;
    writeln!(
        out,
        "Explored {} of {} cells",
        summary.explored,
        summary.width * summary.height
    )?;
    if !summary.unreachable.is_empty() {
        let cells: Vec<String> = summary.unreachable.iter().map(ToString::to_string).collect();
        writeln!(out, "Unreachable: {}", cells.join(" "))?;
    }

    for report in &summary.phases {
        let status = match report.status {
            PhaseStatus::Completed => "ok",
            PhaseStatus::NoPath => "no path",
            PhaseStatus::Rejected => "rejected",
        };
        writeln!(
            out,
            "- {}: {} ({} commands, {} replans, ended at {})",
            report.phase, status, report.commands, report.replans, report.end
        )?;
    }

    match &summary.speed_run {
        Some(run) => {
            writeln!(out, "Speed run reached {} at cost {:.3}", run.goal, run.cost)?;
            writeln!(out, "Commands: {}", run.commands)?;
        }
        None => writeln!(out, "Speed run did not reach a goal")?,
    }

    writeln!(out)?;
    write!(out, "{}", summary.map)
}
