/// Base points for clearing 1, 2, 3 or 4 rows with a single lock.
///
/// The awarded score is the base multiplied by `level + 1`.
pub const LINE_CLEAR_POINTS: [usize; 4] = [40, 100, 300, 1200];

/// Rows that must be cleared within a level before the level increases.
pub const LINES_PER_LEVEL: usize = 10;

/// Computes the points awarded for clearing `lines` rows at `level`.
///
/// Clearing no rows scores nothing. More than four rows at once cannot happen
/// with four-cell pieces on the standard grid and is scored as four.
///
/// # Example
///
/// ```
/// use blockfall_engine::compute_score;
///
/// assert_eq!(compute_score(0, 0), 0);
/// assert_eq!(compute_score(0, 1), 40);
/// assert_eq!(compute_score(0, 4), 1200);
/// assert_eq!(compute_score(2, 2), 300);
/// ```
#[must_use]
pub const fn compute_score(level: usize, lines: usize) -> usize {
    if lines == 0 {
        return 0;
    }
    let index = if lines > LINE_CLEAR_POINTS.len() {
        LINE_CLEAR_POINTS.len() - 1
    } else {
        lines - 1
    };
    (level + 1).saturating_mul(LINE_CLEAR_POINTS[index])
}

/// Game statistics tracking score, level and lines cleared.
///
/// - **Score**: points from [`compute_score`], at the level in effect when
///   the piece locked
/// - **Level**: increases by one whenever [`LINES_PER_LEVEL`] rows have been
///   cleared since the last level-up; the per-level counter then restarts
///   from zero (surplus rows are not carried over)
/// - **Completed pieces**: total number of pieces locked
/// - **Line clear distribution**: count of locks by rows cleared
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// assert_eq!(stats.complete_piece_drop(4), 1200);
/// assert_eq!(stats.complete_piece_drop(4), 1200);
/// assert_eq!(stats.complete_piece_drop(3), 900);
///
/// assert_eq!(stats.level(), 1);
/// assert_eq!(stats.lines_cleared_this_level(), 0);
/// assert_eq!(stats.score(), 3300);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStats {
    score: usize,
    level: usize,
    lines_cleared_this_level: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            level: 0,
            lines_cleared_this_level: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Returns the rows cleared since the last level-up.
    #[must_use]
    pub const fn lines_cleared_this_level(&self) -> usize {
        self.lines_cleared_this_level
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    /// Returns the total number of lines cleared across all line clears.
    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of locks by rows cleared.
    ///
    /// Array indices represent:
    /// - `[0]`: Number of locks with 0 lines cleared
    /// - `[1]`: Number of singles (1 line)
    /// - `[2]`: Number of doubles (2 lines)
    /// - `[3]`: Number of triples (3 lines)
    /// - `[4]`: Number of tetrises (4 lines or more)
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Updates statistics after a piece locks and returns the points awarded.
    ///
    /// The score uses the level before this lock; the level-up check runs
    /// right after the line counter changes.
    pub const fn complete_piece_drop(&mut self, cleared_lines: usize) -> usize {
        let points = compute_score(self.level, cleared_lines);
        self.score = self.score.saturating_add(points);
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        let bucket = if cleared_lines < self.line_cleared_counter.len() {
            cleared_lines
        } else {
            self.line_cleared_counter.len() - 1
        };
        self.line_cleared_counter[bucket] += 1;
        self.add_cleared_lines(cleared_lines);
        points
    }

    const fn add_cleared_lines(&mut self, lines: usize) {
        self.lines_cleared_this_level += lines;
        if self.lines_cleared_this_level >= LINES_PER_LEVEL {
            self.level += 1;
            self.lines_cleared_this_level = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_lines_score_nothing_at_any_level() {
        for level in 0..50 {
            assert_eq!(compute_score(level, 0), 0);
        }
    }

    #[test]
    fn test_score_table() {
        assert_eq!(compute_score(0, 1), 40);
        assert_eq!(compute_score(0, 2), 100);
        assert_eq!(compute_score(0, 3), 300);
        assert_eq!(compute_score(0, 4), 1200);
        assert_eq!(compute_score(2, 2), 300);
        assert_eq!(compute_score(9, 1), 400);
    }

    #[test]
    fn test_more_than_four_lines_scores_as_four() {
        assert_eq!(compute_score(1, 5), 2400);
        assert_eq!(compute_score(0, 20), 1200);
    }

    #[test]
    fn test_score_uses_level_before_level_up() {
        let mut stats = GameStats::new();
        for _ in 0..9 {
            stats.complete_piece_drop(1);
        }
        assert_eq!(stats.level(), 0);
        assert_eq!(stats.score(), 9 * 40);

        // Tenth line: scored at level 0, then the level increases
        assert_eq!(stats.complete_piece_drop(1), 40);
        assert_eq!(stats.level(), 1);
        assert_eq!(stats.lines_cleared_this_level(), 0);

        assert_eq!(stats.complete_piece_drop(1), 80);
    }

    #[test]
    fn test_level_up_resets_counter_without_carry() {
        let mut stats = GameStats::new();
        stats.complete_piece_drop(4);
        stats.complete_piece_drop(4);
        stats.complete_piece_drop(4);
        // 12 lines: one level-up, surplus dropped
        assert_eq!(stats.level(), 1);
        assert_eq!(stats.lines_cleared_this_level(), 0);
        assert_eq!(stats.total_cleared_lines(), 12);
    }

    #[test]
    fn test_counters() {
        let mut stats = GameStats::new();
        stats.complete_piece_drop(0);
        stats.complete_piece_drop(0);
        stats.complete_piece_drop(2);
        stats.complete_piece_drop(4);

        assert_eq!(stats.completed_pieces(), 4);
        assert_eq!(stats.total_cleared_lines(), 6);
        assert_eq!(stats.line_cleared_counter(), &[2, 0, 1, 0, 1]);
        assert_eq!(stats.score(), 100 + 1200);
    }
}
