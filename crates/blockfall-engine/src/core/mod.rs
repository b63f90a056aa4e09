pub use self::{collision::*, grid::*, piece::*};

pub(crate) mod collision;
pub(crate) mod grid;
pub(crate) mod piece;

/// Number of columns of the standard grid.
pub const GRID_WIDTH: usize = 10;
/// Number of rows of the standard grid.
pub const GRID_HEIGHT: usize = 20;
