use crate::{
    CompletePieceDropError, PieceCollisionError,
    core::{Grid, Piece, PieceKind},
};

use super::piece_source::{PieceSource, RandomPieces};

/// Single-turn game state: the locked grid, the falling piece, the queued
/// next kind and the stash.
///
/// `GameField` applies placements without any notion of time, score or
/// pause; [`GameSession`](super::GameSession) layers those on top.
#[derive(Debug, Clone)]
pub struct GameField<S = RandomPieces> {
    grid: Grid,
    falling_piece: Piece,
    next: PieceKind,
    stashed: Option<PieceKind>,
    source: S,
}

impl<S> GameField<S>
where
    S: PieceSource,
{
    /// Assembles a field from explicit parts.
    #[must_use]
    pub fn from_parts(
        grid: Grid,
        falling_piece: Piece,
        next: PieceKind,
        stashed: Option<PieceKind>,
        source: S,
    ) -> Self {
        Self {
            grid,
            falling_piece,
            next,
            stashed,
            source,
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.falling_piece
    }

    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.next
    }

    #[must_use]
    pub fn stashed_piece(&self) -> Option<PieceKind> {
        self.stashed
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Replaces the falling piece if the new placement is legal.
    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if self.grid.is_colliding(&piece) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = piece;
        Ok(())
    }

    /// Replaces the falling piece without a collision check.
    ///
    /// Used for placements that were already validated, such as the result
    /// of [`rotate_with_kick`](super::rotate_with_kick).
    pub fn set_falling_piece_unchecked(&mut self, piece: Piece) {
        self.falling_piece = piece;
    }

    #[must_use]
    pub fn simulate_drop_position(&self) -> Piece {
        self.falling_piece.simulate_drop_position(&self.grid)
    }

    /// Checks whether a stash exchange is currently allowed.
    ///
    /// The exchange is gated on the falling piece being able to move one
    /// column to the left, not on the placement of the piece that would be
    /// spawned. A piece resting against the left wall or against a locked
    /// cell on its left therefore cannot be stashed.
    #[must_use]
    pub fn can_stash(&self) -> bool {
        !self.grid.is_colliding(&self.falling_piece.left())
    }

    /// Exchanges the falling piece with the stash.
    ///
    /// - Empty stash: the falling kind is stashed, the queued next kind spawns
    ///   and a new kind is drawn into the queue.
    /// - Occupied stash: the falling and stashed kinds swap; the queue is
    ///   untouched.
    ///
    /// Either way the newly falling piece starts at the spawn coordinate with
    /// rotation 0.
    pub fn try_stash(&mut self) -> Result<(), PieceCollisionError> {
        if !self.can_stash() {
            return Err(PieceCollisionError);
        }

        let current = self.falling_piece.kind();
        let incoming = match self.stashed.replace(current) {
            Some(stashed) => stashed,
            None => self.advance_queue(),
        };
        self.falling_piece = Piece::spawn(incoming, self.grid.width());

        Ok(())
    }

    /// Locks the falling piece, clears full rows and spawns the next piece.
    ///
    /// Returns the number of cleared rows, and an error if the piece locked in
    /// the spawn row. In that case no new piece is spawned and the field
    /// should no longer be played.
    pub fn complete_piece_drop(&mut self) -> (usize, Result<(), CompletePieceDropError>) {
        self.grid.fill_piece(&self.falling_piece);
        let cleared_lines = self.grid.clear_full_rows();

        if self.falling_piece.position().y() == 0 {
            return (cleared_lines, Err(CompletePieceDropError::LockedInSpawnRow));
        }

        let kind = self.advance_queue();
        self.falling_piece = Piece::spawn(kind, self.grid.width());

        (cleared_lines, Ok(()))
    }

    /// Takes the queued kind and refills the queue from the source.
    fn advance_queue(&mut self) -> PieceKind {
        std::mem::replace(&mut self.next, self.source.draw())
    }
}
