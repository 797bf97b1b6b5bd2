#![forbid(unsafe_code)]

//! Viewport breakpoints.
//!
//! A [`MediaQuery`] is a predicate over terminal size. A [`ViewportWatcher`]
//! evaluates it on every resize and reports only when the answer flips.

/// Width/height predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaQuery {
    /// Matches when the width is at most `n` columns.
    MaxWidth(u16),
    /// Matches when the width is at least `n` columns.
    MinWidth(u16),
}

impl MediaQuery {
    /// `max-width: cols`.
    #[must_use]
    pub const fn max_width(cols: u16) -> Self {
        Self::MaxWidth(cols)
    }

    /// `min-width: cols`.
    #[must_use]
    pub const fn min_width(cols: u16) -> Self {
        Self::MinWidth(cols)
    }

    /// Evaluate against a terminal size.
    #[must_use]
    pub const fn matches(&self, width: u16, _height: u16) -> bool {
        match *self {
            Self::MaxWidth(n) => width <= n,
            Self::MinWidth(n) => width >= n,
        }
    }
}

/// Watches a [`MediaQuery`] across resizes.
#[derive(Debug, Clone, Copy)]
pub struct ViewportWatcher {
    query: MediaQuery,
    matches: bool,
}

impl ViewportWatcher {
    /// Evaluate `query` once against the initial size.
    #[must_use]
    pub const fn new(query: MediaQuery, width: u16, height: u16) -> Self {
        Self {
            query,
            matches: query.matches(width, height),
        }
    }

    /// Current answer.
    #[must_use]
    pub const fn matches(&self) -> bool {
        self.matches
    }

    /// Re-evaluate after a resize. Returns `Some(new)` only on change.
    pub fn resize(&mut self, width: u16, height: u16) -> Option<bool> {
        let now = self.query.matches(width, height);
        if now == self.matches {
            return None;
        }
        self.matches = now;
        Some(now)
    }

    /// Swap the query, re-evaluating against the given size.
    ///
    /// Returns `Some(new)` when the answer changed.
    pub fn set_query(&mut self, query: MediaQuery, width: u16, height: u16) -> Option<bool> {
        self.query = query;
        self.resize(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_only_flips() {
        let mut w = ViewportWatcher::new(MediaQuery::max_width(99), 120, 40);
        assert!(!w.matches());
        assert_eq!(w.resize(110, 40), None);
        assert_eq!(w.resize(80, 40), Some(true));
        assert_eq!(w.resize(70, 30), None);
        assert_eq!(w.resize(100, 30), Some(false));
    }

    #[test]
    fn boundary_is_inclusive() {
        assert!(MediaQuery::max_width(99).matches(99, 1));
        assert!(!MediaQuery::max_width(99).matches(100, 1));
        assert!(MediaQuery::min_width(100).matches(100, 1));
    }

    #[test]
    fn set_query_reevaluates() {
        let mut w = ViewportWatcher::new(MediaQuery::max_width(99), 90, 30);
        assert_eq!(w.set_query(MediaQuery::max_width(80), 90, 30), Some(false));
    }
}
