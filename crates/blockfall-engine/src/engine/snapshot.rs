use serde::Serialize;

use crate::core::{PieceKind, PieceRotation};

use super::{
    game_session::{GameSession, SessionState},
    piece_source::PieceSource,
};

/// Read-only copy of everything a presentation layer needs to draw a session.
///
/// `cells` holds the locked grid with the falling piece drawn over it, as cell
/// identifiers (`0` empty, `1..=7` for `I, J, L, O, S, T, Z`), row by row from
/// the top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<u8>>,
    pub falling: FallingPieceSnapshot,
    pub next: PieceKind,
    pub stashed: Option<PieceKind>,
    pub score: usize,
    pub level: usize,
    pub lines_cleared_this_level: usize,
    pub total_cleared_lines: usize,
    pub completed_pieces: usize,
    pub state: SessionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallingPieceSnapshot {
    pub kind: PieceKind,
    pub rotation: PieceRotation,
    pub x: i32,
    pub y: i32,
    /// Grid coordinates `[x, y]` of the four occupied cells.
    pub cells: Vec<[i32; 2]>,
}

impl<S> GameSession<S>
where
    S: PieceSource,
{
    /// Captures the current state for rendering or serialization.
    ///
    /// # Example
    ///
    /// ```
    /// use blockfall_engine::{PieceKind, ScriptedPieces, SessionBuilder};
    ///
    /// let source = ScriptedPieces::cycle([PieceKind::O]).unwrap();
    /// let session = SessionBuilder::new().empty_stash().build(source);
    /// let snapshot = session.snapshot();
    ///
    /// assert_eq!(snapshot.cells[0][4], PieceKind::O.id());
    /// assert_eq!(snapshot.stashed, None);
    /// ```
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let piece = self.falling_piece();
        let grid = self.grid();
        let stats = self.stats();
        SessionSnapshot {
            width: grid.width(),
            height: grid.height(),
            cells: grid.merged(&piece).to_ids(),
            falling: FallingPieceSnapshot {
                kind: piece.kind(),
                rotation: piece.rotation(),
                x: piece.position().x(),
                y: piece.position().y(),
                cells: piece.occupied_positions().map(|(x, y)| [x, y]).collect(),
            },
            next: self.next_piece(),
            stashed: self.stashed_piece(),
            score: stats.score(),
            level: stats.level(),
            lines_cleared_this_level: stats.lines_cleared_this_level(),
            total_cleared_lines: stats.total_cleared_lines(),
            completed_pieces: stats.completed_pieces(),
            state: self.session_state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::Grid,
        engine::{game_session::SessionBuilder, piece_source::ScriptedPieces},
    };

    #[test]
    fn test_snapshot_overlays_falling_piece() {
        let grid = Grid::from_ascii(
            "
            ......
            ......
            ......
            ZZ...Z
            ",
        );
        let source = ScriptedPieces::cycle([PieceKind::T, PieceKind::L]).unwrap();
        let session = SessionBuilder::new().grid(grid).build(source);
        let snapshot = session.snapshot();

        // T spawns at column 2 on a six-column grid
        assert_eq!(
            snapshot.cells,
            [
                [0, 0, 0, 6, 0, 0],
                [0, 0, 6, 6, 6, 0],
                [0, 0, 0, 0, 0, 0],
                [7, 7, 0, 0, 0, 7],
            ]
        );
        assert_eq!(snapshot.falling.cells, [[3, 0], [2, 1], [3, 1], [4, 1]]);
        assert_eq!(snapshot.next, PieceKind::L);
        assert_eq!(snapshot.stashed, Some(PieceKind::T));
        // The locked grid itself is untouched
        assert_eq!(session.grid().occupied_count(), 3);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let source = ScriptedPieces::cycle([PieceKind::I]).unwrap();
        let mut session = SessionBuilder::new()
            .dimensions(6, 3)
            .empty_stash()
            .build(source);
        session.toggle_pause();

        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "width": 6,
                "height": 3,
                "cells": [[0, 0, 0, 0, 0, 0], [0, 0, 1, 1, 1, 1], [0, 0, 0, 0, 0, 0]],
                "falling": {
                    "kind": "I",
                    "rotation": 0,
                    "x": 2,
                    "y": 0,
                    "cells": [[2, 1], [3, 1], [4, 1], [5, 1]],
                },
                "next": "I",
                "stashed": null,
                "score": 0,
                "level": 0,
                "lines_cleared_this_level": 0,
                "total_cleared_lines": 0,
                "completed_pieces": 0,
                "state": "paused",
            })
        );
    }
}
