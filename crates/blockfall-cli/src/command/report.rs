use std::path::PathBuf;

use blockfall_engine::{
    GameSession, LINES_PER_LEVEL, PieceKind, PieceSeed, PieceSource, SessionSnapshot,
};
use serde::Serialize;

use crate::util::Output;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum ReportFormat {
    /// Human-readable board and counters
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReportArg {
    /// Output format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ReportArg {
    /// Writes `value` as JSON, or as the text produced by `render_text`.
    pub(crate) fn write<T, F>(&self, value: &T, render_text: F) -> anyhow::Result<()>
    where
        T: Serialize,
        F: FnOnce(&T) -> String,
    {
        let mut output = Output::from_output_path(self.output.clone())?;
        match self.format {
            ReportFormat::Text => output.write_text(&render_text(value)),
            ReportFormat::Json => output.write_json(value),
        }
    }
}

/// Final state of a session, plus the seed needed to replay it.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SessionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<PieceSeed>,
    #[serde(flatten)]
    snapshot: SessionSnapshot,
}

impl SessionReport {
    pub(crate) fn new<S>(session: &GameSession<S>, seed: Option<PieceSeed>) -> Self
    where
        S: PieceSource,
    {
        Self {
            seed,
            snapshot: session.snapshot(),
        }
    }

    pub(crate) fn render_text(&self) -> String {
        let snapshot = &self.snapshot;
        let border = format!("+{}+", "-".repeat(snapshot.width));

        let mut lines = vec![border.clone()];
        lines.extend(snapshot.cells.iter().map(|row| {
            let cells: String = row.iter().map(|&id| cell_char(id)).collect();
            format!("|{cells}|")
        }));
        lines.push(border);

        lines.push(format!("state:  {}", snapshot.state));
        lines.push(format!("score:  {}", snapshot.score));
        lines.push(format!(
            "level:  {} ({}/{LINES_PER_LEVEL} lines)",
            snapshot.level, snapshot.lines_cleared_this_level
        ));
        lines.push(format!("lines:  {}", snapshot.total_cleared_lines));
        lines.push(format!("pieces: {}", snapshot.completed_pieces));
        lines.push(format!("next:   {}", snapshot.next.as_char()));
        lines.push(format!(
            "stash:  {}",
            snapshot.stashed.map_or('-', PieceKind::as_char)
        ));
        if let Some(seed) = self.seed {
            lines.push(format!("seed:   {seed}"));
        }

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

fn cell_char(id: u8) -> char {
    PieceKind::from_id(id).map_or('.', PieceKind::as_char)
}
