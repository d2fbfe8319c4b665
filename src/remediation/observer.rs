//! Progress callbacks for remediation runs.

use super::types::{IterationRecord, RemediationResult};

/// Receives progress from a running controller.
///
/// All methods default to no-ops so implementors pick what they need.
pub trait RemediationObserver: Send + Sync {
    /// Called once the initial score is known.
    fn on_start(&self, _site_id: &str, _initial_score: f64, _target_score: f64) {}

    /// Called after each iteration is recorded.
    fn on_iteration(&self, _record: &IterationRecord) {}

    /// Called with the finished result, including runs stopped by an error.
    fn on_finish(&self, _result: &RemediationResult) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RemediationObserver for NoopObserver {}
