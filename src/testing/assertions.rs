//! Custom assertions for remediation results.

use crate::remediation::{RemediationResult, StopReason};

/// Assert that a run stopped for the expected reason.
///
/// # Panics
///
/// Panics with the run's score trail and errors if the reason differs.
///
/// # Example
///
/// ```rust,ignore
/// let result = controller.run("site", &config).await?;
/// assert_stopped(&result, StopReason::TargetReached);
/// ```
pub fn assert_stopped(result: &RemediationResult, expected: StopReason) {
    assert_eq!(
        result.stopped_reason,
        expected,
        "Expected run to stop with {}, but it stopped with {}.\nScores: {:?}\nErrors: {:?}",
        expected,
        result.stopped_reason,
        score_trail(result),
        result.errors
    );
}

/// Assert the bookkeeping invariants of a result.
///
/// # Panics
///
/// Panics if the iteration count exceeds `max_iterations`, disagrees with
/// the recorded iterations, or the final score does not match the last
/// iteration (or the initial score when nothing ran).
pub fn assert_consistent(result: &RemediationResult, max_iterations: u32) {
    assert!(
        result.is_consistent(max_iterations),
        "Inconsistent result (max {} iterations): completed={}, recorded={}, initial={}, final={}, scores={:?}",
        max_iterations,
        result.iterations_completed,
        result.iterations.len(),
        result.initial_score,
        result.final_score,
        score_trail(result)
    );
}

/// Assert the exact number of completed iterations.
///
/// # Panics
///
/// Panics if the count differs.
pub fn assert_iterations(result: &RemediationResult, expected: u32) {
    assert_eq!(
        result.iterations_completed, expected,
        "Expected {} iterations, but got {}.\nScores: {:?}",
        expected,
        result.iterations_completed,
        score_trail(result)
    );
}

/// Initial score followed by every iteration's score after.
#[must_use]
pub fn score_trail(result: &RemediationResult) -> Vec<f64> {
    std::iter::once(result.initial_score)
        .chain(result.iterations.iter().map(|r| r.score_after()))
        .collect()
}
