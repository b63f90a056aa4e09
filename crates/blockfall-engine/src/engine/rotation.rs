use arrayvec::ArrayVec;

use crate::core::{Grid, Piece};

/// Horizontal offsets tried, in order, when an in-place rotation collides.
pub const WALL_KICK_OFFSETS: [i32; 4] = [-1, 1, -2, 2];

/// Returns the placements tried for a clockwise rotation, in priority order.
///
/// The first candidate is the rotation in place, followed by one candidate
/// per [`WALL_KICK_OFFSETS`] entry (same row, shifted column).
#[must_use]
pub fn rotation_candidates(piece: Piece) -> ArrayVec<Piece, 5> {
    let rotated = piece.rotated_right();
    let mut candidates = ArrayVec::new();
    candidates.push(rotated);
    candidates.extend(WALL_KICK_OFFSETS.iter().map(|&dx| rotated.shifted(dx, 0)));
    candidates
}

/// Rotates a piece clockwise, falling back to a simple wall kick.
///
/// This is **not** a Super Rotation System. The in-place rotation is tried
/// first; if it collides, the piece is shifted horizontally by each of
/// [`WALL_KICK_OFFSETS`] and the first legal placement wins.
///
/// Kinds with a single orientation (O) never rotate, whatever the grid holds.
///
/// # Returns
///
/// The rotated piece, or `None` if the kind cannot rotate or every candidate
/// collides.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Grid, Piece, PieceKind, PiecePosition, PieceRotation, rotate_with_kick};
///
/// let grid = Grid::standard();
/// // T pointing right, flush against the left wall
/// let piece = Piece::with_placement(PieceKind::T, PieceRotation::new(1), PiecePosition::new(-1, 5));
///
/// let rotated = rotate_with_kick(piece, &grid).unwrap();
/// assert_eq!(rotated.to_string(), "T#2@0,5");
/// ```
#[must_use]
pub fn rotate_with_kick(piece: Piece, grid: &Grid) -> Option<Piece> {
    if piece.kind().has_single_orientation() {
        return None;
    }
    rotation_candidates(piece)
        .into_iter()
        .find(|candidate| !grid.is_colliding(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Block, PieceKind, PiecePosition, PieceRotation};

    fn piece(kind: PieceKind, rotation: usize, x: i32, y: i32) -> Piece {
        Piece::with_placement(kind, PieceRotation::new(rotation), PiecePosition::new(x, y))
    }

    #[test]
    fn test_rotation_in_place_when_legal() {
        let grid = Grid::standard();
        let rotated = rotate_with_kick(piece(PieceKind::J, 0, 3, 5), &grid).unwrap();
        assert_eq!(rotated, piece(PieceKind::J, 1, 3, 5));
    }

    #[test]
    fn test_rotation_wraps_to_spawn_state() {
        let grid = Grid::standard();
        let rotated = rotate_with_kick(piece(PieceKind::S, 3, 3, 5), &grid).unwrap();
        assert_eq!(rotated.rotation(), PieceRotation::new(0));
    }

    #[test]
    fn test_o_piece_never_rotates() {
        let empty = Grid::standard();
        let mut full = Grid::standard();
        for y in 10..20 {
            for x in 0..10 {
                full.fill_block_at(x, y, Block::Piece(PieceKind::Z));
            }
        }
        for grid in [&empty, &full] {
            for rotation in 0..4 {
                assert_eq!(rotate_with_kick(piece(PieceKind::O, rotation, 4, 0), grid), None);
            }
        }
    }

    #[test]
    fn test_left_wall_kick_selects_plus_one() {
        let grid = Grid::standard();
        // T pointing right occupies box columns 1-2; at x = -1 it is flush
        // with the left wall. Pointing down needs box columns 0-2, so the
        // in-place rotation and the -1 kick leave the grid; +1 is legal.
        let start = piece(PieceKind::T, 1, -1, 5);
        assert!(!grid.is_colliding(&start));
        assert!(grid.is_colliding(&start.rotated_right()));
        assert!(grid.is_colliding(&start.rotated_right().shifted(-1, 0)));

        let rotated = rotate_with_kick(start, &grid).unwrap();
        assert_eq!(rotated, piece(PieceKind::T, 2, 0, 5));
    }

    #[test]
    fn test_right_wall_kick_selects_minus_one() {
        let grid = Grid::standard();
        // T pointing left occupies box columns 0-1; at x = 8 it touches
        // column 9. Pointing up needs columns 8-10, so -1 fixes it.
        let start = piece(PieceKind::T, 3, 8, 5);
        assert!(!grid.is_colliding(&start));
        let rotated = rotate_with_kick(start, &grid).unwrap();
        assert_eq!(rotated, piece(PieceKind::T, 0, 7, 5));
    }

    #[test]
    fn test_i_piece_needs_two_column_kick() {
        let grid = Grid::standard();
        // Vertical I in column 0; horizontal needs four columns starting at 0
        let start = piece(PieceKind::I, 1, -2, 5);
        let rotated = rotate_with_kick(start, &grid).unwrap();
        assert_eq!(rotated, piece(PieceKind::I, 2, 0, 5));
    }

    #[test]
    fn test_kick_order_prefers_minus_one_over_plus_one() {
        // Both -1 and +1 are legal; -1 must win.
        let grid = Grid::from_ascii(
            "
            ..........
            ..........
            ..........
            .....#....
            ..........
            ",
        );
        // J at rotation 1 -> 2 in place would cover (3..=5, 2) + (5, 3)
        let start = piece(PieceKind::J, 1, 3, 1);
        assert!(!grid.is_colliding(&start));
        assert!(grid.is_colliding(&start.rotated_right()));
        let rotated = rotate_with_kick(start, &grid).unwrap();
        assert_eq!(rotated.position(), PiecePosition::new(2, 1));
    }

    #[test]
    fn test_rotation_rejected_when_all_candidates_collide() {
        let grid = Grid::from_ascii(
            "
            ####.#####
            ####.#####
            ####.#####
            ####.#####
            ",
        );
        // Vertical I in the single open column cannot turn horizontal
        let start = piece(PieceKind::I, 1, 2, 0);
        assert!(!grid.is_colliding(&start));
        assert_eq!(rotate_with_kick(start, &grid), None);
    }

    #[test]
    fn test_candidates_order() {
        let start = piece(PieceKind::L, 0, 4, 4);
        let xs: Vec<i32> = rotation_candidates(start)
            .iter()
            .map(|p| p.position().x())
            .collect();
        assert_eq!(xs, [4, 3, 5, 2, 6]);
        assert!(
            rotation_candidates(start)
                .iter()
                .all(|p| p.rotation() == PieceRotation::new(1) && p.position().y() == 4)
        );
    }
}
