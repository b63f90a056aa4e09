use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{Grid, Piece, PieceKind};

/// Supplies the kinds of upcoming pieces.
///
/// Sessions draw from a source whenever a new piece enters the queue. The
/// default source is [`RandomPieces`]; [`ScriptedPieces`] replays a fixed
/// sequence, which makes sessions deterministic in tests and scripted runs.
pub trait PieceSource: fmt::Debug {
    /// Draws the next piece kind.
    fn draw(&mut self) -> PieceKind;
}

impl<S> PieceSource for Box<S>
where
    S: PieceSource + ?Sized,
{
    fn draw(&mut self) -> PieceKind {
        (**self).draw()
    }
}

/// Draws a random kind and places it at the spawn coordinate of `grid`, rotation 0.
pub fn spawn_piece<S>(source: &mut S, grid: &Grid) -> Piece
where
    S: PieceSource + ?Sized,
{
    Piece::spawn(source.draw(), grid.width())
}

/// Uniformly random piece kinds.
///
/// Every draw is independent: no bag, no history.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceSeed, PieceSource, RandomPieces};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let mut a = RandomPieces::with_seed(seed);
/// let mut b = RandomPieces::with_seed(seed);
///
/// for _ in 0..20 {
///     assert_eq!(a.draw(), b.draw());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RandomPieces {
    rng: Pcg32,
}

impl Default for RandomPieces {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPieces {
    /// Creates a source with a fresh random seed.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
        }
    }
}

impl PieceSource for RandomPieces {
    fn draw(&mut self) -> PieceKind {
        self.rng.random()
    }
}

/// Replays a fixed sequence of kinds, starting over when it runs out.
#[derive(Debug, Clone)]
pub struct ScriptedPieces {
    sequence: Box<[PieceKind]>,
    queue: VecDeque<PieceKind>,
}

impl ScriptedPieces {
    /// Creates a source cycling through `kinds`.
    ///
    /// Returns `None` if `kinds` is empty.
    #[must_use]
    pub fn cycle<I>(kinds: I) -> Option<Self>
    where
        I: IntoIterator<Item = PieceKind>,
    {
        let sequence: Box<[PieceKind]> = kinds.into_iter().collect();
        if sequence.is_empty() {
            return None;
        }
        Some(Self {
            queue: sequence.iter().copied().collect(),
            sequence,
        })
    }

    /// Returns an iterator over the kinds left before the sequence restarts.
    pub fn remaining(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied()
    }
}

impl PieceSource for ScriptedPieces {
    fn draw(&mut self) -> PieceKind {
        if self.queue.is_empty() {
            self.queue.extend(self.sequence.iter().copied());
        }
        // `cycle` rejects empty sequences, so the refill above is never empty
        self.queue.pop_front().unwrap_or(self.sequence[0])
    }
}

/// Seed for deterministic piece generation.
///
/// This is a 128-bit (16-byte) seed used to initialize the random number
/// generator of [`RandomPieces`]. The same seed produces the same sequence of
/// pieces. Its text form is a 32-character hex string, used both by `serde`
/// and by [`FromStr`]/[`Display`](fmt::Display).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed: {reason}")]
pub struct PieceSeedParseError {
    reason: String,
}

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num = u128::from_be_bytes(self.0);
        write!(f, "{num:032x}")
    }
}

impl FromStr for PieceSeed {
    type Err = PieceSeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(PieceSeedParseError {
                reason: format!("expected 32 characters, got {}", s.len()),
            });
        }
        let num = u128::from_str_radix(s, 16).map_err(|e| PieceSeedParseError {
            reason: format!("{s} ({e})"),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values using the standard random distribution.
///
/// This implementation enables idiomatic seed generation with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}
