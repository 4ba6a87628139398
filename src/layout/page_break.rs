//! # Page Break Decisions
//!
//! The rules that decide, for one content unit, whether it goes on the
//! current page, forces a new page, or is placed as overflow.

/// Slack for budget comparisons so that content filling a page exactly
/// is not pushed over by float noise.
pub const FIT_EPSILON: f64 = 1e-6;

/// Where the pagination loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    /// A page is open with some vertical budget left.
    AccumulatingPage,
    /// The open page must be emitted and a fresh one started.
    PageFull,
    /// No content remains.
    Done,
}

/// What to do with the next unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// It fits in the remaining budget.
    Place,
    /// It does not fit but the page already has content: start a new page
    /// and retry there.
    NextPage,
    /// It does not fit even on an otherwise empty page: place it anyway.
    Overflow,
}

/// Decide for a unit of `required` height against the `remaining` budget.
pub fn decide(remaining: f64, required: f64, page_has_content: bool) -> BreakDecision {
    if required <= remaining + FIT_EPSILON {
        BreakDecision::Place
    } else if page_has_content {
        BreakDecision::NextPage
    } else {
        BreakDecision::Overflow
    }
}
