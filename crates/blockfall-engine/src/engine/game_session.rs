use serde::Serialize;

use crate::{
    ActionError, PieceCollisionError,
    core::{Grid, Piece, PieceKind},
};

use super::{
    GameStats,
    game_field::GameField,
    piece_source::{PieceSeed, PieceSource, RandomPieces, spawn_piece},
    rotation::rotate_with_kick,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[display("playing")]
    Playing,
    #[display("paused")]
    Paused,
    #[display("game over")]
    GameOver,
}

/// Result of one gravity step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TickOutcome {
    /// The falling piece moved down one row.
    Fell,
    /// The piece locked and the next piece spawned.
    Locked {
        cleared_lines: usize,
        score_delta: usize,
    },
    /// The piece locked in the spawn row; the session is over.
    GameOver {
        cleared_lines: usize,
        score_delta: usize,
    },
    /// The session is paused or already over; nothing changed.
    Ignored,
}

/// Initial content of the stash slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum InitialStash {
    #[default]
    Random,
    Empty,
    Kind(PieceKind),
}

/// Configures a new [`GameSession`].
///
/// Unset piece kinds are drawn from the source passed to [`Self::build`], in
/// the order falling piece, next piece, stash. The stash is pre-populated
/// unless [`Self::empty_stash`] is called.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceKind, ScriptedPieces, SessionBuilder};
///
/// let source = ScriptedPieces::cycle([PieceKind::T, PieceKind::I, PieceKind::O]).unwrap();
/// let session = SessionBuilder::new().dimensions(8, 16).build(source);
///
/// assert_eq!(session.falling_piece().kind(), PieceKind::T);
/// assert_eq!(session.next_piece(), PieceKind::I);
/// assert_eq!(session.stashed_piece(), Some(PieceKind::O));
/// assert_eq!(session.grid().width(), 8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    grid: Option<Grid>,
    active: Option<PieceKind>,
    next: Option<PieceKind>,
    stash: InitialStash,
}

impl SessionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing grid instead of an empty standard one.
    #[must_use]
    pub fn grid(mut self, grid: Grid) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Starts from an empty grid of the given size.
    #[must_use]
    pub fn dimensions(self, width: usize, height: usize) -> Self {
        self.grid(Grid::new(width, height))
    }

    #[must_use]
    pub fn active(mut self, kind: PieceKind) -> Self {
        self.active = Some(kind);
        self
    }

    #[must_use]
    pub fn next(mut self, kind: PieceKind) -> Self {
        self.next = Some(kind);
        self
    }

    #[must_use]
    pub fn stashed(mut self, kind: PieceKind) -> Self {
        self.stash = InitialStash::Kind(kind);
        self
    }

    #[must_use]
    pub fn empty_stash(mut self) -> Self {
        self.stash = InitialStash::Empty;
        self
    }

    #[must_use]
    pub fn build<S>(self, mut source: S) -> GameSession<S>
    where
        S: PieceSource,
    {
        let grid = self.grid.unwrap_or_default();
        let falling_piece = match self.active {
            Some(kind) => Piece::spawn(kind, grid.width()),
            None => spawn_piece(&mut source, &grid),
        };
        let next = self.next.unwrap_or_else(|| source.draw());
        let stashed = match self.stash {
            InitialStash::Random => Some(source.draw()),
            InitialStash::Empty => None,
            InitialStash::Kind(kind) => Some(kind),
        };
        GameSession {
            field: GameField::from_parts(grid, falling_piece, next, stashed, source),
            stats: GameStats::new(),
            session_state: SessionState::Playing,
        }
    }
}

/// A running game: field, statistics and the playing/paused/over state.
///
/// Every input operation is one atomic transition. Illegal inputs leave the
/// session unchanged and report why through [`ActionError`]; drivers are free
/// to ignore the result.
///
/// Gravity is driven externally: the owner calls [`Self::tick`] once per
/// interval (see [`SessionController`](super::SessionController)).
///
/// # Example
///
/// ```
/// use blockfall_engine::GameSession;
///
/// let mut session = GameSession::with_seed("0123456789abcdef0123456789abcdef".parse().unwrap());
///
/// _ = session.try_move_left();
/// _ = session.try_rotate();
/// let rows = session.hard_drop().unwrap();
/// assert!(rows > 0);
///
/// // Locking happens on the following tick
/// assert!(session.tick().is_locked());
/// assert_eq!(session.stats().completed_pieces(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession<S = RandomPieces> {
    field: GameField<S>,
    stats: GameStats,
    session_state: SessionState,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Creates a standard session with random pieces.
    #[must_use]
    pub fn new() -> Self {
        SessionBuilder::new().build(RandomPieces::new())
    }

    /// Creates a standard session with a deterministic piece sequence.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        SessionBuilder::new().build(RandomPieces::with_seed(seed))
    }
}

impl<S> GameSession<S>
where
    S: PieceSource,
{
    #[must_use]
    pub fn field(&self) -> &GameField<S> {
        &self.field
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        self.field.grid()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.field.falling_piece()
    }

    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.field.next_piece()
    }

    #[must_use]
    pub fn stashed_piece(&self) -> Option<PieceKind> {
        self.field.stashed_piece()
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.stats.score()
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.stats.level()
    }

    /// Returns where the falling piece would land after a hard drop.
    #[must_use]
    pub fn simulate_drop_position(&self) -> Piece {
        self.field.simulate_drop_position()
    }

    /// Switches between playing and paused. A finished game stays finished.
    pub fn toggle_pause(&mut self) {
        self.session_state = match self.session_state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            SessionState::GameOver => SessionState::GameOver,
        };
    }

    fn ensure_playing(&self) -> Result<(), ActionError> {
        match self.session_state {
            SessionState::Playing => Ok(()),
            SessionState::Paused => Err(ActionError::Paused),
            SessionState::GameOver => Err(ActionError::GameOver),
        }
    }

    /// Advances gravity by one step.
    ///
    /// If the row below is free the piece falls one row. Otherwise it locks:
    /// full rows are cleared, the score is awarded at the current level, the
    /// level-up rule is applied, and either the next piece spawns or, if the
    /// piece locked in row 0, the session ends.
    pub fn tick(&mut self) -> TickOutcome {
        if self.ensure_playing().is_err() {
            return TickOutcome::Ignored;
        }
        if self.try_soft_drop().is_ok() {
            return TickOutcome::Fell;
        }

        let (cleared_lines, result) = self.field.complete_piece_drop();
        let score_delta = self.stats.complete_piece_drop(cleared_lines);
        if result.is_err() {
            self.session_state = SessionState::GameOver;
            return TickOutcome::GameOver {
                cleared_lines,
                score_delta,
            };
        }
        TickOutcome::Locked {
            cleared_lines,
            score_delta,
        }
    }

    /// Moves the falling piece horizontally by `dx` columns.
    pub fn try_move(&mut self, dx: i32) -> Result<(), ActionError> {
        self.ensure_playing()?;
        let piece = self.field.falling_piece().shifted(dx, 0);
        self.field.set_falling_piece(piece)?;
        Ok(())
    }

    pub fn try_move_left(&mut self) -> Result<(), ActionError> {
        self.try_move(-1)
    }

    pub fn try_move_right(&mut self) -> Result<(), ActionError> {
        self.try_move(1)
    }

    /// Moves the falling piece down one row. Never locks.
    pub fn try_soft_drop(&mut self) -> Result<(), ActionError> {
        self.ensure_playing()?;
        let piece = self.field.falling_piece().down();
        self.field.set_falling_piece(piece)?;
        Ok(())
    }

    /// Moves the falling piece to the lowest legal row and returns how many
    /// rows it descended.
    ///
    /// The piece is not locked here; the next [`Self::tick`] locks it.
    pub fn hard_drop(&mut self) -> Result<usize, ActionError> {
        self.ensure_playing()?;
        let current = self.field.falling_piece();
        let dropped = self.field.simulate_drop_position();
        self.field.set_falling_piece_unchecked(dropped);
        Ok(dropped.position().y().abs_diff(current.position().y()) as usize)
    }

    /// Rotates the falling piece clockwise with wall-kick fallback.
    pub fn try_rotate(&mut self) -> Result<(), ActionError> {
        self.ensure_playing()?;
        let piece = self.field.falling_piece();
        if piece.kind().has_single_orientation() {
            return Err(ActionError::NotRotatable);
        }
        let rotated = rotate_with_kick(piece, self.field.grid()).ok_or(PieceCollisionError)?;
        self.field.set_falling_piece_unchecked(rotated);
        Ok(())
    }

    /// Exchanges the falling piece with the stash (see [`GameField::try_stash`]).
    pub fn try_stash(&mut self) -> Result<(), ActionError> {
        self.ensure_playing()?;
        self.field.try_stash()?;
        Ok(())
    }
}
