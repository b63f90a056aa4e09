use std::fmt;

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::Serialize;

use super::GRID_WIDTH;

/// A falling piece (tetromino) with position, rotation, and kind.
///
/// Pieces are immutable values: movement and rotation return new `Piece`s and
/// leave legality to the caller (see [`Grid::is_colliding`](super::Grid::is_colliding)).
///
/// # Coordinate System
///
/// - Position is the grid coordinate of the top-left corner of the piece's
///   4×4 bounding box, so it may be negative when an empty box column
///   overhangs a wall
/// - X increases rightward (columns), Y increases downward (rows)
/// - Rotation is one of four clockwise states, spawn state is `0`
///
/// # Example
///
/// ```
/// use blockfall_engine::{Piece, PieceKind};
///
/// let piece = Piece::new(PieceKind::T);
/// assert_eq!((piece.position().x(), piece.position().y()), (4, 0));
///
/// let moved = piece.right().down().rotated_right();
/// assert_eq!(moved.to_string(), "T#1@5,1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "kind#rotation@x,y" (e.g., "S#1@4,18")
        write!(
            f,
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.0,
            self.position.x,
            self.position.y
        )
    }
}

impl Piece {
    /// Creates a piece at the spawn position of the standard grid.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self::spawn(kind, GRID_WIDTH)
    }

    /// Creates a piece at the spawn position of a grid with `grid_width` columns.
    #[must_use]
    pub fn spawn(kind: PieceKind, grid_width: usize) -> Self {
        Self {
            position: PiecePosition::spawn(grid_width),
            rotation: PieceRotation::default(),
            kind,
        }
    }

    #[must_use]
    pub const fn with_placement(
        kind: PieceKind,
        rotation: PieceRotation,
        position: PiecePosition,
    ) -> Self {
        Self {
            position,
            rotation,
            kind,
        }
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Returns the grid coordinates of the four occupied cells.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.kind
            .occupied_cells(self.rotation)
            .map(move |(dx, dy)| (self.position.x + dx, self.position.y + dy))
    }

    #[must_use]
    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            position: self.position.shifted(dx, dy),
            ..*self
        }
    }

    #[must_use]
    pub fn left(&self) -> Self {
        self.shifted(-1, 0)
    }

    #[must_use]
    pub fn right(&self) -> Self {
        self.shifted(1, 0)
    }

    #[must_use]
    pub fn down(&self) -> Self {
        self.shifted(0, 1)
    }

    #[must_use]
    pub fn rotated_right(&self) -> Self {
        Self {
            rotation: self.rotation.rotated_right(),
            ..*self
        }
    }

    /// Returns the lowest position this piece can fall to without colliding.
    #[must_use]
    pub fn simulate_drop_position(&self, grid: &super::Grid) -> Self {
        let mut dropped = *self;
        loop {
            let piece = dropped.down();
            if grid.is_colliding(&piece) {
                return dropped;
            }
            dropped = piece;
        }
    }
}

/// Position of a piece's bounding-box origin on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PiecePosition {
    x: i32,
    y: i32,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Spawn coordinate: column `floor(width / 2) - 1`, row 0.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn spawn(grid_width: usize) -> Self {
        Self::new((grid_width / 2) as i32 - 1, 0)
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn shifted(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
///
/// Any index is accepted and normalized modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(index: usize) -> Self {
        Self((index % 4) as u8)
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Display color of a piece kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum PieceColor {
    #[display("cyan")]
    Cyan,
    #[display("blue")]
    Blue,
    #[display("orange")]
    Orange,
    #[display("yellow")]
    Yellow,
    #[display("green")]
    Green,
    #[display("purple")]
    Purple,
    #[display("red")]
    Red,
}

/// Enum representing the type of piece.
///
/// The discriminant order fixes the cell identifiers stored in the grid:
/// `I = 1` through `Z = 7`, with `0` reserved for empty cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// J-piece.
    J = 1,
    /// L-piece.
    L = 2,
    /// O-piece.
    O = 3,
    /// S-piece.
    S = 4,
    /// T-piece.
    T = 5,
    /// Z-piece.
    Z = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Cell identifier of this kind (1-7).
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8 + 1
    }

    /// Looks up a kind by its cell identifier.
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_id(1), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_id(7), Some(PieceKind::Z));
    /// assert_eq!(PieceKind::from_id(0), None);
    /// ```
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1..=7 => Some(Self::ALL[id as usize - 1]),
            _ => None,
        }
    }

    #[must_use]
    pub const fn color(self) -> PieceColor {
        match self {
            PieceKind::I => PieceColor::Cyan,
            PieceKind::J => PieceColor::Blue,
            PieceKind::L => PieceColor::Orange,
            PieceKind::O => PieceColor::Yellow,
            PieceKind::S => PieceColor::Green,
            PieceKind::T => PieceColor::Purple,
            PieceKind::Z => PieceColor::Red,
        }
    }

    /// Returns the 4×4 occupancy matrix of this kind in the given rotation.
    #[must_use]
    pub const fn shape(self, rotation: PieceRotation) -> PieceShape {
        PIECE_SHAPES[self as usize][rotation.as_usize()]
    }

    /// Returns an iterator of occupied cells relative to the bounding-box origin.
    pub fn occupied_cells(self, rotation: PieceRotation) -> impl Iterator<Item = (i32, i32)> {
        PIECE_CELLS[self as usize][rotation.as_usize()]
            .into_iter()
            .map(|(dx, dy)| (i32::from(dx), i32::from(dy)))
    }

    /// Returns `true` if all four rotation states have identical occupancy.
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert!(PieceKind::O.has_single_orientation());
    /// assert!(!PieceKind::I.has_single_orientation());
    /// ```
    #[must_use]
    pub fn has_single_orientation(self) -> bool {
        let shapes = &PIECE_SHAPES[self as usize];
        shapes.iter().all(|shape| shape == &shapes[0])
    }

    /// Returns the single character representation of this piece kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('T'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'T' => Some(PieceKind::T),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }
}

/// Occupancy of a piece within its 4×4 bounding box, indexed `[y][x]`.
pub type PieceShape = [[bool; 4]; 4];

/// Generates all 4 rotation states of a piece shape by rotating 90° clockwise.
///
/// # Arguments
///
/// * `size` - Effective size of the piece (3 for most pieces, 4 for I, 2 for O)
/// * `shape` - Initial piece shape at 0° rotation
const fn shape_rotations(size: usize, shape: &PieceShape) -> [PieceShape; 4] {
    let mut rotates = [*shape; 4];
    let mut i = 1;
    while i < 4 {
        let mut new_shape = [[false; 4]; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                new_shape[y][x] = rotates[i - 1][size - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        rotates[i] = new_shape;
        i += 1;
    }
    rotates
}

const PIECE_SHAPES: [[PieceShape; 4]; PieceKind::LEN] = {
    const C: bool = true;
    const E: bool = false;
    const EEEE: [bool; 4] = [E; 4];
    [
        // I-piece
        shape_rotations(4, &[EEEE, [C, C, C, C], EEEE, EEEE]),
        // J-piece
        shape_rotations(3, &[[C, E, E, E], [C, C, C, E], EEEE, EEEE]),
        // L-piece
        shape_rotations(3, &[[E, E, C, E], [C, C, C, E], EEEE, EEEE]),
        // O-piece
        shape_rotations(2, &[[C, C, E, E], [C, C, E, E], EEEE, EEEE]),
        // S-piece
        shape_rotations(3, &[[E, C, C, E], [C, C, E, E], EEEE, EEEE]),
        // T-piece
        shape_rotations(3, &[[E, C, E, E], [C, C, C, E], EEEE, EEEE]),
        // Z-piece
        shape_rotations(3, &[[C, C, E, E], [E, C, C, E], EEEE, EEEE]),
    ]
};

/// Lists the occupied `(x, y)` cells of a shape in row-major order.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn shape_cells(shape: &PieceShape) -> [(i8, i8); 4] {
    let mut cells = [(0, 0); 4];
    let mut n = 0;
    let mut y = 0;
    while y < 4 {
        let mut x = 0;
        while x < 4 {
            if shape[y][x] {
                cells[n] = (x as i8, y as i8);
                n += 1;
            }
            x += 1;
        }
        y += 1;
    }
    assert!(n == 4, "every piece occupies exactly four cells");
    cells
}

const PIECE_CELLS: [[[(i8, i8); 4]; 4]; PieceKind::LEN] = {
    let mut table = [[[(0, 0); 4]; 4]; PieceKind::LEN];
    let mut k = 0;
    while k < PieceKind::LEN {
        let mut r = 0;
        while r < 4 {
            table[k][r] = shape_cells(&PIECE_SHAPES[k][r]);
            r += 1;
        }
        k += 1;
    }
    table
};
