//! Beat cursor: which subdivision box is currently lit

/// Cursor value meaning "no box highlighted"
pub const INACTIVE: i32 = -1;

/// Index of the highlighted subdivision box, or [`INACTIVE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatCursor {
    active_index: i32,
}

impl Default for BeatCursor {
    fn default() -> Self {
        Self {
            active_index: INACTIVE,
        }
    }
}

impl BeatCursor {
    /// Create an inactive cursor
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently highlighted index
    pub fn active_index(&self) -> i32 {
        self.active_index
    }

    /// Whether any box is highlighted
    pub fn is_active(&self) -> bool {
        self.active_index != INACTIVE
    }

    /// Move to the next box, wrapping after `subdivisions` boxes.
    ///
    /// A count of zero is treated as one.
    pub fn advance(&mut self, subdivisions: u32) -> i32 {
        let count = i32::try_from(subdivisions.max(1)).unwrap_or(i32::MAX);
        self.active_index = (self.active_index + 1).rem_euclid(count);
        self.active_index
    }

    /// Clear the highlight
    pub fn reset(&mut self) -> i32 {
        self.active_index = INACTIVE;
        self.active_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_advance_lights_first_box() {
        let mut cursor = BeatCursor::new();
        assert!(!cursor.is_active());
        assert_eq!(cursor.advance(4), 0);
        assert!(cursor.is_active());
    }

    #[test]
    fn test_wraps_after_count() {
        let mut cursor = BeatCursor::new();
        let seen: Vec<i32> = (0..7).map(|_| cursor.advance(3)).collect();
        assert_eq!(seen, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_single_subdivision_stays_on_zero() {
        let mut cursor = BeatCursor::new();
        for _ in 0..5 {
            assert_eq!(cursor.advance(1), 0);
        }
    }

    #[test]
    fn test_reset() {
        let mut cursor = BeatCursor::new();
        cursor.advance(2);
        assert_eq!(cursor.reset(), INACTIVE);
        assert_eq!(cursor.advance(2), 0);
    }

    #[test]
    fn test_shrinking_count_stays_in_range() {
        let mut cursor = BeatCursor::new();
        for _ in 0..4 {
            cursor.advance(4);
        }
        assert_eq!(cursor.active_index(), 3);
        // Count dropped without a reset: the next index still lands in range.
        assert_eq!(cursor.advance(2), 0);
        assert_eq!(cursor.advance(0), 0);
    }
}
