//! Core types for remediation runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest score an analyzer can report.
pub const MIN_SCORE: f64 = 0.0;
/// Highest score an analyzer can report.
pub const MAX_SCORE: f64 = 100.0;

/// Clamps a raw analyzer score into `[0, 100]`.
///
/// NaN reads as 0.
///
/// # Example
///
/// ```
/// use seomend::remediation::clamp_score;
///
/// assert_eq!(clamp_score(130.0), 100.0);
/// assert_eq!(clamp_score(-4.0), 0.0);
/// assert_eq!(clamp_score(f64::NAN), 0.0);
/// ```
#[must_use]
pub fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        MIN_SCORE
    } else {
        raw.clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// A remediable SEO issue reported by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoIssue {
    /// Fix-type tag, e.g. `missing_alt_text`.
    #[serde(rename = "type")]
    pub fix_type: String,
    /// Free-form detail (page URL, element, etc.).
    #[serde(default)]
    pub detail: String,
}

impl SeoIssue {
    #[must_use]
    pub fn new(fix_type: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            fix_type: fix_type.into(),
            detail: detail.into(),
        }
    }
}

/// Result of one analyzer pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAnalysis {
    pub score: f64,
    #[serde(default)]
    pub issues: Vec<SeoIssue>,
}

impl SiteAnalysis {
    #[must_use]
    pub fn new(score: f64, issues: Vec<SeoIssue>) -> Self {
        Self { score, issues }
    }

    /// The score clamped into `[0, 100]`.
    #[must_use]
    pub fn clamped_score(&self) -> f64 {
        clamp_score(self.score)
    }
}

/// Outcome of a single fix attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixOutcome {
    #[serde(rename = "type")]
    pub fix_type: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FixOutcome {
    /// A successful fix.
    #[must_use]
    pub fn succeeded(fix_type: impl Into<String>) -> Self {
        Self {
            fix_type: fix_type.into(),
            success: true,
            error: None,
        }
    }

    /// A failed fix with its reason.
    #[must_use]
    pub fn failed(fix_type: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            fix_type: fix_type.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The score reached the target.
    TargetReached,
    /// The iteration cap was hit below target.
    MaxIterations,
    /// An iteration improved less than the threshold.
    NoImprovement,
    /// An analysis or fix call failed.
    Error,
}

impl StopReason {
    /// True only for [`StopReason::TargetReached`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::TargetReached)
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TargetReached => write!(f, "target_reached"),
            Self::MaxIterations => write!(f, "max_iterations"),
            Self::NoImprovement => write!(f, "no_improvement"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One analyze/fix/re-analyze pass.
///
/// Fields are private so a record cannot change once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    iteration_number: u32,
    score_before: f64,
    score_after: f64,
    improvement: f64,
    fixes_attempted: usize,
    fixes_successful: usize,
    analysis_time_seconds: f64,
    fix_time_seconds: f64,
    timestamp: DateTime<Utc>,
}

impl IterationRecord {
    /// Build a record; scores are clamped and `improvement` derived.
    #[must_use]
    pub fn new(
        iteration_number: u32,
        score_before: f64,
        score_after: f64,
        outcomes: &[FixOutcome],
        analysis_time_seconds: f64,
        fix_time_seconds: f64,
    ) -> Self {
        let score_before = clamp_score(score_before);
        let score_after = clamp_score(score_after);
        Self {
            iteration_number,
            score_before,
            score_after,
            improvement: score_after - score_before,
            fixes_attempted: outcomes.len(),
            fixes_successful: outcomes.iter().filter(|o| o.success).count(),
            analysis_time_seconds,
            fix_time_seconds,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn iteration_number(&self) -> u32 {
        self.iteration_number
    }

    #[must_use]
    pub fn score_before(&self) -> f64 {
        self.score_before
    }

    #[must_use]
    pub fn score_after(&self) -> f64 {
        self.score_after
    }

    #[must_use]
    pub fn improvement(&self) -> f64 {
        self.improvement
    }

    #[must_use]
    pub fn fixes_attempted(&self) -> usize {
        self.fixes_attempted
    }

    #[must_use]
    pub fn fixes_successful(&self) -> usize {
        self.fixes_successful
    }

    #[must_use]
    pub fn analysis_time_seconds(&self) -> f64 {
        self.analysis_time_seconds
    }

    #[must_use]
    pub fn fix_time_seconds(&self) -> f64 {
        self.fix_time_seconds
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Outcome of one remediation run.
///
/// Built by the controller through [`RemediationResult::start`],
/// [`RemediationResult::push_iteration`] and [`RemediationResult::finish`],
/// which keep `final_score`, `score_improvement` and `iterations_completed`
/// in step with `iterations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationResult {
    pub run_id: String,
    pub site_id: String,
    pub initial_score: f64,
    pub final_score: f64,
    pub score_improvement: f64,
    pub target_score: f64,
    pub iterations_completed: u32,
    pub stopped_reason: StopReason,
    pub iterations: Vec<IterationRecord>,
    pub fixes_applied: Vec<FixOutcome>,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RemediationResult {
    /// Start a result from the initial analysis.
    ///
    /// The reason starts as `target_reached`, which is what a run with zero
    /// iterations reports.
    #[must_use]
    pub fn start(site_id: impl Into<String>, initial_score: f64, target_score: f64) -> Self {
        let initial_score = clamp_score(initial_score);
        let now = Utc::now();
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            site_id: site_id.into(),
            initial_score,
            final_score: initial_score,
            score_improvement: 0.0,
            target_score,
            iterations_completed: 0,
            stopped_reason: StopReason::TargetReached,
            iterations: Vec::new(),
            fixes_applied: Vec::new(),
            errors: Vec::new(),
            backup_id: None,
            started_at: now,
            finished_at: now,
        }
    }

    /// Append a completed iteration.
    pub fn push_iteration(&mut self, record: IterationRecord) {
        self.final_score = record.score_after();
        self.score_improvement = self.final_score - self.initial_score;
        self.iterations.push(record);
        self.iterations_completed = self.iterations.len() as u32;
    }

    /// Record the stop reason and finish time.
    pub fn finish(&mut self, reason: StopReason) {
        self.stopped_reason = reason;
        self.finished_at = Utc::now();
    }

    /// Successful fixes across the run.
    #[must_use]
    pub fn successful_fixes(&self) -> usize {
        self.fixes_applied.iter().filter(|f| f.success).count()
    }

    /// Failed fixes across the run.
    #[must_use]
    pub fn failed_fixes(&self) -> usize {
        self.fixes_applied.len() - self.successful_fixes()
    }

    /// Wall-clock duration of the run in seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Checks the bookkeeping invariants against an iteration cap.
    #[must_use]
    pub fn is_consistent(&self, max_iterations: u32) -> bool {
        let count_ok = self.iterations_completed as usize == self.iterations.len()
            && self.iterations_completed <= max_iterations;
        let final_ok = match self.iterations.last() {
            Some(last) => self.final_score == last.score_after(),
            None => self.final_score == self.initial_score,
        };
        let numbering_ok = self
            .iterations
            .iter()
            .enumerate()
            .all(|(i, r)| r.iteration_number() as usize == i + 1);
        count_ok && final_ok && numbering_ok
    }
}
