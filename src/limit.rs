//! Resource limits (§5, §D).
//!
//! Ported from the teacher's `LimitTracker`: a counter that records a
//! high-water mark so callers can see how close a parse came to a limit,
//! even when it never crossed it.

use std::fmt;

/// Tracks utilization against a single ceiling (recursion depth, token
/// count, ...), reporting a high-water mark over the tracker's lifetime.
///
/// ```
/// use cypher_parser::Parser;
///
/// let parser = Parser::new("RETURN 1").recursion_limit(4);
/// let result = parser.parse();
/// let usage = result.recursion_limit();
/// println!("{:?}", usage);
/// ```
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct LimitTracker {
    current: usize,
    /// High water mark for this limit.
    pub high: usize,
    /// The configured ceiling.
    pub limit: usize,
}

impl LimitTracker {
    pub fn new(limit: usize) -> Self {
        Self {
            current: 0,
            high: 0,
            limit,
        }
    }

    pub fn limited(&self) -> bool {
        self.current > self.limit
    }

    pub fn consume(&mut self) {
        self.current += 1;
        if self.current > self.high {
            self.high = self.current;
        }
    }

    pub fn release(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}

impl Default for LimitTracker {
    /// Default recursion ceiling, matching the teacher's measured default
    /// scaled down to this grammar's shallower clause nesting (§D).
    fn default() -> Self {
        Self::new(500)
    }
}

impl fmt::Debug for LimitTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "limit: {}, high: {}", self.limit, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_high_water_mark() {
        let mut tracker = LimitTracker::new(3);
        tracker.consume();
        tracker.consume();
        assert!(!tracker.limited());
        tracker.consume();
        tracker.consume();
        assert!(tracker.limited());
        tracker.release();
        tracker.release();
        assert!(!tracker.limited());
        assert_eq!(tracker.high, 4);
    }
}
