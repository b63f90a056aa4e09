pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece colliding at the requested placement")]
pub struct PieceCollisionError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum ActionError {
    #[display("piece colliding at the requested placement")]
    Collision(PieceCollisionError),
    #[display("piece has a single orientation and cannot rotate")]
    NotRotatable,
    #[display("session is paused")]
    Paused,
    #[display("game is over")]
    GameOver,
}

impl From<PieceCollisionError> for ActionError {
    fn from(err: PieceCollisionError) -> Self {
        Self::Collision(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CompletePieceDropError {
    #[display("piece locked in the spawn row")]
    LockedInSpawnRow,
}
