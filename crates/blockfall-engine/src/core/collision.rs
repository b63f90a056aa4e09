use super::{
    grid::Grid,
    piece::{PieceKind, PiecePosition, PieceRotation},
};

/// Checks whether a piece placement is illegal on the grid.
///
/// Every occupied cell of `kind` at `rotation`, translated by `position`, is
/// tested: the placement collides when a cell lands outside the grid's
/// columns or rows, or on a cell that is already occupied. Empty cells of the
/// piece's bounding box never collide.
///
/// This is a pure predicate, so it is also used speculatively (wall-kick
/// search, drop simulation).
///
/// # Example
///
/// ```
/// use blockfall_engine::{Grid, PieceKind, PiecePosition, PieceRotation, check_collision};
///
/// let grid = Grid::standard();
/// let rotation = PieceRotation::default();
///
/// assert!(!check_collision(PiecePosition::new(4, 0), rotation, PieceKind::T, &grid));
/// // T spawn state spans two rows, so row 19 pushes it through the floor.
/// assert!(check_collision(PiecePosition::new(4, 19), rotation, PieceKind::T, &grid));
/// ```
#[must_use]
pub fn check_collision(
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
    grid: &Grid,
) -> bool {
    kind.occupied_cells(rotation).any(|(dx, dy)| {
        grid.cell(position.x() + dx, position.y() + dy)
            .is_none_or(|block| !block.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Block;

    /// Reference predicate written directly against the shape matrix.
    fn naive_collision(
        position: PiecePosition,
        rotation: PieceRotation,
        kind: PieceKind,
        grid: &Grid,
    ) -> bool {
        let width = i32::try_from(grid.width()).unwrap();
        let height = i32::try_from(grid.height()).unwrap();
        let shape = kind.shape(rotation);
        for (dy, row) in (0..).zip(shape) {
            for (dx, occupied) in (0..).zip(row) {
                if !occupied {
                    continue;
                }
                let x = position.x() + dx;
                let y = position.y() + dy;
                if !(0..width).contains(&x) || !(0..height).contains(&y) {
                    return true;
                }
                if grid.cell(x, y) != Some(Block::Empty) {
                    return true;
                }
            }
        }
        false
    }

    fn grid_from_bits(width: usize, height: usize, bits: u32) -> Grid {
        let mut grid = Grid::new(width, height);
        for i in 0..width * height {
            if bits & (1 << i) != 0 {
                let x = i32::try_from(i % width).unwrap();
                let y = i32::try_from(i / width).unwrap();
                grid.fill_block_at(x, y, Block::Piece(PieceKind::S));
            }
        }
        grid
    }

    #[test]
    fn test_exhaustive_small_grids() {
        // Every occupancy pattern of a 3×3 grid, every kind, rotation and a
        // range of positions that covers all ways of leaving the grid.
        let (width, height) = (3, 3);
        for bits in 0..(1 << (width * height)) {
            let grid = grid_from_bits(width, height, bits);
            for kind in PieceKind::ALL {
                for r in 0..4 {
                    let rotation = PieceRotation::new(r);
                    for y in -4..=4 {
                        for x in -4..=4 {
                            let position = PiecePosition::new(x, y);
                            assert_eq!(
                                check_collision(position, rotation, kind, &grid),
                                naive_collision(position, rotation, kind, &grid),
                                "{kind:?} r{r} at ({x}, {y}) on grid {bits:09b}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_empty_box_cells_do_not_collide() {
        let grid = Grid::standard();
        // Vertical I occupies column 2 of its box only, so the box may
        // overhang the left wall by two columns.
        let rotation = PieceRotation::new(1);
        assert!(!check_collision(PiecePosition::new(-2, 0), rotation, PieceKind::I, &grid));
        assert!(check_collision(PiecePosition::new(-3, 0), rotation, PieceKind::I, &grid));
        assert!(!check_collision(PiecePosition::new(7, 16), rotation, PieceKind::I, &grid));
        assert!(check_collision(PiecePosition::new(8, 16), rotation, PieceKind::I, &grid));
        assert!(check_collision(PiecePosition::new(7, 17), rotation, PieceKind::I, &grid));
    }

    #[test]
    fn test_occupied_cell_collides() {
        let grid = Grid::from_ascii(
            "
            ....
            ....
            ..Z.
            ",
        );
        let rotation = PieceRotation::default();
        // O at (1, 1) covers (1..=2, 1..=2), including the Z cell
        assert!(check_collision(PiecePosition::new(1, 1), rotation, PieceKind::O, &grid));
        assert!(!check_collision(PiecePosition::new(0, 1), rotation, PieceKind::O, &grid));
        assert!(!check_collision(PiecePosition::new(1, 0), rotation, PieceKind::O, &grid));
    }

    #[test]
    fn test_rotation_is_taken_modulo_four() {
        let grid = Grid::standard();
        let position = PiecePosition::new(-1, 5);
        for r in 0..8 {
            assert_eq!(
                check_collision(position, PieceRotation::new(r), PieceKind::L, &grid),
                check_collision(position, PieceRotation::new(r % 4), PieceKind::L, &grid),
            );
        }
    }
}
