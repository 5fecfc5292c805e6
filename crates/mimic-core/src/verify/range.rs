// Call count ranges
//
// Accepts every std range form over `usize` and describes it in words for
// failure messages.

use std::fmt;
use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive};

/// Allowed number of calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallCountRange {
    /// `start..end`
    HalfOpen { start: usize, end: usize },
    /// `start..=end`
    Closed { start: usize, end: usize },
    /// `..end`
    FewerThan(usize),
    /// `..=end`
    UpTo(usize),
    /// `start..`
    AtLeast(usize),
    /// `..`
    Any,
}

impl CallCountRange {
    pub fn contains(&self, count: usize) -> bool {
        match *self {
            CallCountRange::HalfOpen { start, end } => (start..end).contains(&count),
            CallCountRange::Closed { start, end } => (start..=end).contains(&count),
            CallCountRange::FewerThan(end) => count < end,
            CallCountRange::UpTo(end) => count <= end,
            CallCountRange::AtLeast(start) => count >= start,
            CallCountRange::Any => true,
        }
    }

    /// Natural-language form, e.g. "fewer than 4" or "at least 2"
    pub fn describe(&self) -> String {
        match self {
            CallCountRange::FewerThan(end) => format!("fewer than {}", end),
            CallCountRange::UpTo(end) => format!("up to {}", end),
            CallCountRange::AtLeast(start) => format!("at least {}", start),
            other => format!("within {}", other),
        }
    }
}

impl fmt::Display for CallCountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallCountRange::HalfOpen { start, end } => write!(f, "{}..{}", start, end),
            CallCountRange::Closed { start, end } => write!(f, "{}..={}", start, end),
            CallCountRange::FewerThan(end) => write!(f, "..{}", end),
            CallCountRange::UpTo(end) => write!(f, "..={}", end),
            CallCountRange::AtLeast(start) => write!(f, "{}..", start),
            CallCountRange::Any => write!(f, ".."),
        }
    }
}

impl From<Range<usize>> for CallCountRange {
    fn from(range: Range<usize>) -> Self {
        CallCountRange::HalfOpen {
            start: range.start,
            end: range.end,
        }
    }
}

impl From<RangeInclusive<usize>> for CallCountRange {
    fn from(range: RangeInclusive<usize>) -> Self {
        CallCountRange::Closed {
            start: *range.start(),
            end: *range.end(),
        }
    }
}

impl From<RangeTo<usize>> for CallCountRange {
    fn from(range: RangeTo<usize>) -> Self {
        CallCountRange::FewerThan(range.end)
    }
}

impl From<RangeToInclusive<usize>> for CallCountRange {
    fn from(range: RangeToInclusive<usize>) -> Self {
        CallCountRange::UpTo(range.end)
    }
}

impl From<RangeFrom<usize>> for CallCountRange {
    fn from(range: RangeFrom<usize>) -> Self {
        CallCountRange::AtLeast(range.start)
    }
}

impl From<RangeFull> for CallCountRange {
    fn from(_: RangeFull) -> Self {
        CallCountRange::Any
    }
}
