//! Half-open `[start, end)` spans over the byte indices of a release name.
//!
//! Every successful pattern match records the span it consumed; the spans
//! are then merged into a minimal sorted set and stripped from the string
//! before title extraction.

/// A span in the form `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether two intervals overlap or touch.
    fn joinable(&self, other: &Interval) -> bool {
        self.end >= other.start && self.start <= other.end
    }
}

/// Joins all intervals into a sorted array with no overlap.
///
/// Overlapping or touching intervals merge into one big enough to contain
/// both. A freshly merged interval is re-tested against the next input, so
/// chains of three or more overlapping spans collapse correctly.
pub fn join_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by_key(|i| i.start);

    let mut result: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        if let Some(last) = result.last_mut() {
            if last.joinable(&interval) {
                last.start = last.start.min(interval.start);
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        result.push(interval);
    }

    result
}

/// Removes the characters covered by the intervals, concatenating the
/// untouched gaps in order.
///
/// The intervals must be sorted by start and non-overlapping (the output
/// of [`join_intervals`]), expressed in byte coordinates of `s`. Regex
/// match bounds always fall on character boundaries, so slicing is safe.
pub fn strip_string(s: &str, intervals: &[Interval]) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last = 0;

    for interval in intervals {
        result.push_str(&s[last..interval.start]);
        last = interval.end;
    }
    result.push_str(&s[last..]);

    result
}
