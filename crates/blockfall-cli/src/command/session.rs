use std::{
    str::FromStr,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use blockfall_engine::{
    GRID_HEIGHT, GRID_WIDTH, PieceKind, PieceSeed, PieceSource, RandomPieces, ScriptedPieces,
    SessionBuilder, SessionController, TickSchedule,
};
use rand::Rng as _;

/// Shortest gravity interval reachable with `--level-step-ms`.
const MIN_TICK_MS: u64 = 100;

/// Narrowest grid where the horizontal I spawns inside the walls.
const MIN_WIDTH: usize = 5;

/// Lowest grid where a piece can fall at least once before locking.
const MIN_HEIGHT: usize = 2;

pub(crate) type BoxedPieceSource = Box<dyn PieceSource>;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SessionArg {
    /// Seed for the random piece sequence (32 hex digits)
    #[arg(long, conflicts_with = "pieces")]
    seed: Option<PieceSeed>,
    /// Cycle through these piece kinds instead of drawing randomly (e.g. `ITO`)
    #[arg(long)]
    pieces: Option<PieceList>,
    /// Start with an empty stash instead of a random piece
    #[arg(long, default_value_t = false)]
    empty_stash: bool,
    /// Number of grid columns
    #[arg(long, default_value_t = GRID_WIDTH)]
    width: usize,
    /// Number of grid rows
    #[arg(long, default_value_t = GRID_HEIGHT)]
    height: usize,
    /// Gravity interval in milliseconds
    #[arg(long, default_value_t = 500)]
    tick_ms: u64,
    /// Shorten the gravity interval by this many milliseconds per level
    #[arg(long)]
    level_step_ms: Option<u64>,
}

impl SessionArg {
    fn schedule(&self) -> TickSchedule {
        let base = Duration::from_millis(self.tick_ms);
        match self.level_step_ms {
            None => TickSchedule::Fixed(base),
            Some(step) => TickSchedule::Leveled {
                base,
                step: Duration::from_millis(step),
                min: Duration::from_millis(MIN_TICK_MS.min(self.tick_ms)),
            },
        }
    }

    /// Builds the session described by the arguments and hands it to a
    /// controller started at `now`.
    ///
    /// Returns the seed as well when pieces are random, so the run can be
    /// reproduced.
    pub(crate) fn build_controller(
        &self,
        now: Instant,
    ) -> anyhow::Result<(SessionController<BoxedPieceSource>, Option<PieceSeed>)> {
        anyhow::ensure!(
            self.width >= MIN_WIDTH,
            "grid width must be at least {MIN_WIDTH}, got {}",
            self.width
        );
        anyhow::ensure!(
            self.height >= MIN_HEIGHT,
            "grid height must be at least {MIN_HEIGHT}, got {}",
            self.height
        );

        let (source, seed) = match &self.pieces {
            Some(PieceList(kinds)) => {
                let source: BoxedPieceSource = Box::new(
                    ScriptedPieces::cycle(kinds.iter().copied())
                        .context("piece list must not be empty")?,
                );
                (source, None)
            }
            None => {
                let seed = self.seed.unwrap_or_else(|| rand::rng().random());
                let source: BoxedPieceSource = Box::new(RandomPieces::with_seed(seed));
                (source, Some(seed))
            }
        };

        let mut builder = SessionBuilder::new().dimensions(self.width, self.height);
        if self.empty_stash {
            builder = builder.empty_stash();
        }
        let session = builder.build(source);
        Ok((SessionController::new(session, self.schedule(), now), seed))
    }
}

/// Non-empty list of piece kinds written as letters, e.g. `IJLOSTZ`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PieceList(Vec<PieceKind>);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub(crate) enum PieceListParseError {
    #[display("piece list is empty")]
    Empty,
    #[display("unknown piece kind {character:?}")]
    UnknownKind { character: char },
}

impl FromStr for PieceList {
    type Err = PieceListParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kinds = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(|c| {
                PieceKind::from_char(c.to_ascii_uppercase())
                    .ok_or(PieceListParseError::UnknownKind { character: c })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if kinds.is_empty() {
            return Err(PieceListParseError::Empty);
        }
        Ok(Self(kinds))
    }
}
