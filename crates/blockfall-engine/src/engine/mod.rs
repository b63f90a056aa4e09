//! Game rules and session management.
//!
//! This module builds the falling-block rules on top of the [`core`](crate::core)
//! data structures:
//!
//! - [`GameField`] - Grid, falling piece, next piece and stash, without timing
//! - [`GameSession`] - Gravity ticks, input operations, score and game-over latch
//! - [`GameStats`] - Score table, level-up rule and line counters
//! - [`rotate_with_kick`] - Clockwise rotation with horizontal wall kicks
//! - [`PieceSource`] - Where new piece kinds come from ([`RandomPieces`], [`ScriptedPieces`])
//! - [`SessionController`] - Single owner of a session and its gravity timer
//! - [`SessionSnapshot`] - Serializable view of a session for drivers
//!
//! # Game Flow
//!
//! 1. Build a [`GameSession`] (directly or through [`SessionBuilder`])
//! 2. The driver forwards input (move, rotate, soft/hard drop, stash, pause)
//! 3. Every tick interval the piece falls one row, or locks if it cannot
//! 4. Locking clears full rows, awards score and spawns the next piece
//! 5. A piece that locks in the spawn row ends the game
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{PieceKind, ScriptedPieces, SessionBuilder, TickOutcome};
//!
//! let source = ScriptedPieces::cycle([PieceKind::I, PieceKind::O]).unwrap();
//! let mut session = SessionBuilder::new().build(source);
//!
//! _ = session.try_rotate();
//! _ = session.try_move_right();
//! _ = session.hard_drop();
//!
//! match session.tick() {
//!     TickOutcome::Locked { cleared_lines, .. } => assert_eq!(cleared_lines, 0),
//!     outcome => panic!("unexpected {outcome:?}"),
//! }
//! assert_eq!(session.falling_piece().kind(), PieceKind::O);
//! ```

pub use self::{
    controller::*, game_field::*, game_session::*, game_stats::*, piece_source::*, rotation::*,
    snapshot::*,
};

mod controller;
mod game_field;
mod game_session;
mod game_stats;
mod piece_source;
mod rotation;
mod snapshot;
