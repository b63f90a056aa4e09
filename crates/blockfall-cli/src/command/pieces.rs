use blockfall_engine::{PieceColor, PieceKind, PieceRotation};
use serde::Serialize;

use super::report::ReportArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PiecesArg {
    #[clap(flatten)]
    report: ReportArg,
}

pub(crate) fn run(arg: &PiecesArg) -> anyhow::Result<()> {
    arg.report.write(&catalog(), |entries| render_text(entries))
}

#[derive(Debug, Clone, Serialize)]
struct CatalogEntry {
    kind: PieceKind,
    id: u8,
    color: PieceColor,
    /// Four rotation states, each as four rows of `#` and `.`.
    rotations: Vec<Vec<String>>,
}

fn catalog() -> Vec<CatalogEntry> {
    PieceKind::ALL
        .into_iter()
        .map(|kind| CatalogEntry {
            kind,
            id: kind.id(),
            color: kind.color(),
            rotations: (0..4)
                .map(|r| {
                    kind.shape(PieceRotation::new(r))
                        .iter()
                        .map(|row| row.iter().map(|&c| if c { '#' } else { '.' }).collect())
                        .collect()
                })
                .collect(),
        })
        .collect()
}

fn render_text(entries: &[CatalogEntry]) -> String {
    let mut lines = vec![];
    for entry in entries {
        lines.push(format!(
            "{}  id {}  {}",
            entry.kind.as_char(),
            entry.id,
            entry.color
        ));
        for y in 0..4 {
            let row: Vec<&str> = entry
                .rotations
                .iter()
                .map(|rotation| rotation[y].as_str())
                .collect();
            lines.push(format!("  {}", row.join("  ")));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}
