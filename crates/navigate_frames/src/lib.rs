// crates/navigate_frames/src/lib.rs

use frame_marker::LineKind;

/// Direction of a frame jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" | "n" => Ok(Direction::Next),
            "previous" | "prev" | "p" => Ok(Direction::Previous),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// Finds the row to jump to from `cursor_row` (0-indexed): the line just
/// below the nearest frame-open marker in `direction`.
///
/// A frame-open directly above the cursor is skipped, so repeated jumps
/// keep moving instead of landing on the same frame.
pub fn adjacent_frame_row(
    kinds: &[LineKind],
    cursor_row: usize,
    direction: Direction,
) -> Option<usize> {
    if kinds.is_empty() {
        return None;
    }
    let start = cursor_row.min(kinds.len() - 1);
    let is_target = |row: usize| kinds[row] == LineKind::FrameOpen && row + 1 != cursor_row;

    let found = match direction {
        Direction::Next => (start..kinds.len()).find(|&row| is_target(row)),
        Direction::Previous => (0..=start).rev().find(|&row| is_target(row)),
    };
    found.map(|row| row + 1)
}
