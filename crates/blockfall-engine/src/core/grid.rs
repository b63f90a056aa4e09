use std::fmt;

use serde::Serialize;

use super::{
    GRID_HEIGHT, GRID_WIDTH, collision,
    piece::{Piece, PieceKind},
};

/// A single cell of the grid.
///
/// Locked cells remember which kind of piece filled them so the presentation
/// layer can pick a color; see [`Block::id`] for the numeric form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Block {
    /// Empty cell (no piece).
    #[default]
    Empty,
    /// Locked piece of a specific type.
    Piece(PieceKind),
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    /// Numeric cell identifier: `0` for empty, `1..=7` for piece kinds.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Block::Empty => 0,
            Block::Piece(kind) => kind.id(),
        }
    }

    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Block::Empty),
            _ => match PieceKind::from_id(id) {
                Some(kind) => Some(Block::Piece(kind)),
                None => None,
            },
        }
    }

    fn as_char(self) -> char {
        match self {
            Block::Empty => '.',
            Block::Piece(kind) => kind.as_char(),
        }
    }
}

/// A single row of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GridRow {
    cells: Box<[Block]>,
}

impl GridRow {
    fn empty(width: usize) -> Self {
        Self {
            cells: vec![Block::Empty; width].into_boxed_slice(),
        }
    }

    fn is_filled(&self) -> bool {
        self.cells.iter().all(|b| !b.is_empty())
    }
}

/// The cell matrix the pieces fall into.
///
/// Dimensions are fixed at construction; only cell values change afterwards.
/// Row `0` is the top of the grid.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Grid, Piece, PieceKind};
///
/// let grid = Grid::standard();
/// let piece = Piece::new(PieceKind::O);
///
/// assert!(!grid.is_colliding(&piece));
/// let merged = grid.merged(&piece);
/// assert_eq!(merged.occupied_count(), 4);
/// assert_eq!(grid.occupied_count(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    rows: Vec<GridRow>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: String = row.cells.iter().map(|b| b.as_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

impl Grid {
    /// Creates an empty grid with the given dimensions.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            rows: vec![GridRow::empty(width); height],
        }
    }

    /// Creates an empty 10×20 grid.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Block]> {
        self.rows.iter().map(|row| &*row.cells)
    }

    /// Returns the cell at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<Block> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.rows.get(y)?.cells.get(x).copied()
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Block> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.rows.get_mut(y)?.cells.get_mut(x)
    }

    /// Fills a single cell. Coordinates outside the grid are ignored.
    pub fn fill_block_at(&mut self, x: i32, y: i32, block: Block) {
        if let Some(cell) = self.cell_mut(x, y) {
            *cell = block;
        }
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .filter(|b| !b.is_empty())
            .count()
    }

    /// Checks if the piece leaves the grid or overlaps a locked cell.
    #[must_use]
    pub fn is_colliding(&self, piece: &Piece) -> bool {
        collision::check_collision(piece.position(), piece.rotation(), piece.kind(), self)
    }

    /// Writes the piece's occupied cells into the grid.
    ///
    /// Called when a piece locks. Cells outside the grid are skipped; lock
    /// placements are validated by the collision check beforehand.
    pub fn fill_piece(&mut self, piece: &Piece) {
        let block = Block::Piece(piece.kind());
        for (x, y) in piece.occupied_positions() {
            self.fill_block_at(x, y, block);
        }
    }

    /// Like [`Self::fill_piece`], but returns a new grid and leaves `self` untouched.
    ///
    /// Also serves as the render overlay of the falling piece.
    #[must_use]
    pub fn merged(&self, piece: &Piece) -> Self {
        let mut grid = self.clone();
        grid.fill_piece(piece);
        grid
    }

    /// Removes every full row and returns how many were removed.
    ///
    /// Full rows are identified all at once, before anything moves. The same
    /// number of empty rows is inserted at the top, so the height never
    /// changes and the remaining rows keep their order.
    pub fn clear_full_rows(&mut self) -> usize {
        let height = self.rows.len();
        self.rows.retain(|row| !row.is_filled());
        let count = height - self.rows.len();
        let mut rows = vec![GridRow::empty(self.width); count];
        rows.append(&mut self.rows);
        self.rows = rows;
        count
    }

    /// Like [`Self::clear_full_rows`], but returns a new grid.
    #[must_use]
    pub fn cleared(&self) -> (Self, usize) {
        let mut grid = self.clone();
        let count = grid.clear_full_rows();
        (grid, count)
    }

    /// Returns the grid as numeric cell identifiers, row by row.
    #[must_use]
    pub fn to_ids(&self) -> Vec<Vec<u8>> {
        self.rows
            .iter()
            .map(|row| row.cells.iter().map(|b| b.id()).collect())
            .collect()
    }

    /// Creates a `Grid` from ASCII art, mostly for tests.
    ///
    /// `.` is an empty cell, a piece letter (`I`, `J`, `L`, `O`, `S`, `T`, `Z`)
    /// is a cell locked by that kind and `#` is an occupied cell of
    /// unspecified kind (stored as `I`). Blank lines and other characters
    /// are ignored. Rows are listed top to bottom; every row must have the
    /// same width.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let rows: Vec<GridRow> = art
            .lines()
            .map(|line| {
                line.chars()
                    .filter_map(|c| match c {
                        '.' => Some(Block::Empty),
                        '#' => Some(Block::Piece(PieceKind::I)),
                        c => PieceKind::from_char(c).map(Block::Piece),
                    })
                    .collect::<Box<[Block]>>()
            })
            .filter(|cells| !cells.is_empty())
            .map(|cells| GridRow { cells })
            .collect();

        let width = rows.first().map_or(0, |row| row.cells.len());
        for (y, row) in rows.iter().enumerate() {
            assert_eq!(
                row.cells.len(),
                width,
                "Each row must have exactly {} cells, got {} at row {}",
                width,
                row.cells.len(),
                y
            );
        }
        Self { width, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::{PiecePosition, PieceRotation};

    #[test]
    fn test_initial_grid() {
        let grid = Grid::standard();
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 20);
        assert!(grid.rows().all(|row| row.iter().all(|b| b.is_empty())));
    }

    #[test]
    fn test_cell_out_of_bounds() {
        let grid = Grid::new(3, 2);
        assert_eq!(grid.cell(0, 0), Some(Block::Empty));
        assert_eq!(grid.cell(2, 1), Some(Block::Empty));
        assert_eq!(grid.cell(-1, 0), None);
        assert_eq!(grid.cell(3, 0), None);
        assert_eq!(grid.cell(0, 2), None);
        assert_eq!(grid.cell(0, -1), None);
    }

    #[test]
    fn test_block_ids() {
        assert_eq!(Block::Empty.id(), 0);
        assert_eq!(Block::Piece(PieceKind::T).id(), 6);
        for id in 0..=7 {
            assert_eq!(Block::from_id(id).map(Block::id), Some(id));
        }
        assert_eq!(Block::from_id(8), None);
    }

    #[test]
    fn test_merged_does_not_mutate_input() {
        let grid = Grid::standard();
        let piece = Piece::with_placement(
            PieceKind::T,
            PieceRotation::default(),
            PiecePosition::new(0, 18),
        );
        let merged = grid.merged(&piece);

        assert_eq!(grid, Grid::standard());
        assert_eq!(merged.cell(1, 18), Some(Block::Piece(PieceKind::T)));
        assert_eq!(merged.cell(0, 19), Some(Block::Piece(PieceKind::T)));
        assert_eq!(merged.cell(1, 19), Some(Block::Piece(PieceKind::T)));
        assert_eq!(merged.cell(2, 19), Some(Block::Piece(PieceKind::T)));
        assert_eq!(merged.cell(0, 18), Some(Block::Empty));
        assert_eq!(merged.occupied_count(), 4);
    }

    #[test]
    fn test_fill_piece_skips_cells_outside() {
        let mut grid = Grid::new(4, 4);
        // Vertical I hanging below the bottom edge
        let piece = Piece::with_placement(
            PieceKind::I,
            PieceRotation::new(1),
            PiecePosition::new(0, 2),
        );
        grid.fill_piece(&piece);
        assert_eq!(grid.occupied_count(), 2);
    }

    #[test]
    fn test_clear_full_rows_single_line() {
        let mut grid = Grid::from_ascii(
            "
            ....
            .T..
            TTTT
            ",
        );
        assert_eq!(grid.clear_full_rows(), 1);
        assert_eq!(
            grid,
            Grid::from_ascii(
                "
                ....
                ....
                .T..
                "
            )
        );
    }

    #[test]
    fn test_clear_full_rows_non_adjacent() {
        let mut grid = Grid::from_ascii(
            "
            J...
            IIII
            .OO.
            SSZZ
            L..L
            ",
        );
        assert_eq!(grid.clear_full_rows(), 2);
        assert_eq!(
            grid.to_string(),
            "....\n....\nJ...\n.OO.\nL..L\n"
        );
    }

    #[test]
    fn test_clear_full_rows_all_filled() {
        let mut grid = Grid::from_ascii(
            "
            ###
            ###
            ###
            ",
        );
        assert_eq!(grid.clear_full_rows(), 3);
        assert_eq!(grid, Grid::new(3, 3));
    }

    #[test]
    fn test_clear_full_rows_is_idempotent_without_full_rows() {
        let grid = Grid::from_ascii(
            "
            #..#
            .##.
            ###.
            ",
        );
        let (once, count) = grid.cleared();
        assert_eq!(count, 0);
        assert_eq!(once, grid);
        let (twice, count) = once.cleared();
        assert_eq!(count, 0);
        assert_eq!(twice, grid);
    }

    #[test]
    fn test_cleared_always_keeps_height() {
        for filled in 0..=6 {
            let mut grid = Grid::new(5, 6);
            for y in 0..filled {
                for x in 0..5 {
                    grid.fill_block_at(x, y, Block::Piece(PieceKind::Z));
                }
            }
            let (cleared, count) = grid.cleared();
            assert_eq!(usize::try_from(filled).unwrap(), count);
            assert_eq!(cleared.height(), 6);
            assert_eq!(cleared.width(), 5);
            assert!(cleared.rows().all(|row| row.len() == 5));
        }
    }

    #[test]
    fn test_to_ids_and_display() {
        let grid = Grid::from_ascii(
            "
            I.Z
            .O.
            ",
        );
        assert_eq!(grid.to_ids(), [vec![1, 0, 7], vec![0, 4, 0]]);
        assert_eq!(grid.to_string(), "I.Z\n.O.\n");
    }
}
