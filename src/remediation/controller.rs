//! The iterative remediation controller.
//!
//! Drives analyze → fix → re-analyze cycles for one site until the score
//! reaches the target, the iteration cap is hit, an iteration improves less
//! than the threshold, or a collaborator fails.
//!
//! The controller never mutates the site itself; it orchestrates the
//! collaborators and records what happened. Runs for the same site must be
//! serialized by the caller (see [`crate::lock::SiteLock`]).

use super::observer::{NoopObserver, RemediationObserver};
use super::outcome::StepOutcome;
use super::types::{IterationRecord, RemediationResult, SiteAnalysis, StopReason};
use crate::config::RemediationConfig;
use crate::error::{Result, SeoError};
use crate::testing::{AnalysisStore, FixApplier, SeoAnalyzer, SiteBackup};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// External collaborators used by the controller.
#[derive(Clone)]
pub struct RemediationDependencies {
    /// Scores the site.
    pub analyzer: Arc<dyn SeoAnalyzer>,
    /// Applies fixes.
    pub applier: Arc<dyn FixApplier>,
    /// Answers the prior-analysis precondition.
    pub store: Arc<dyn AnalysisStore>,
    /// Snapshots the site before the first fix.
    pub backup: Arc<dyn SiteBackup>,
}

impl std::fmt::Debug for RemediationDependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemediationDependencies")
            .field("analyzer", &"<dyn SeoAnalyzer>")
            .field("applier", &"<dyn FixApplier>")
            .field("store", &"<dyn AnalysisStore>")
            .field("backup", &"<dyn SiteBackup>")
            .finish()
    }
}

/// Runs remediation loops against a set of collaborators.
///
/// # Example
///
/// ```rust,ignore
/// let controller = RemediationController::new(deps);
/// let result = controller.run("example.com", &RemediationConfig::default()).await?;
/// println!("{} -> {} ({})", result.initial_score, result.final_score, result.stopped_reason);
/// ```
pub struct RemediationController {
    deps: RemediationDependencies,
    observer: Arc<dyn RemediationObserver>,
}

impl RemediationController {
    /// Create a controller with no observer.
    #[must_use]
    pub fn new(deps: RemediationDependencies) -> Self {
        Self {
            deps,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attach a progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RemediationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run one remediation loop for `site_id`.
    ///
    /// # Errors
    ///
    /// Returns an error without doing any work when the config is invalid
    /// ([`SeoError::InvalidConfig`]) or the site has no prior analysis
    /// ([`SeoError::NoAnalysis`]). Returns [`SeoError::SiteUnreachable`] when
    /// the initial analysis fails and [`SeoError::Backup`] when the
    /// pre-fix backup fails, since neither leaves progress to report.
    ///
    /// Failures after the first fix do not error: the partial result is
    /// returned with `stopped_reason == Error` and the failure in `errors`.
    pub async fn run(
        &self,
        site_id: &str,
        config: &RemediationConfig,
    ) -> Result<RemediationResult> {
        config.validate()?;

        if !self.deps.store.has_analysis(site_id).await? {
            return Err(SeoError::NoAnalysis {
                site_id: site_id.to_string(),
            });
        }

        let (initial, _) =
            StepOutcome::from_analysis(site_id, self.deps.analyzer.analyze(site_id).await)
                .into_parts()?;
        let initial_score = initial.clamped_score();
        let mut result = RemediationResult::start(site_id, initial_score, config.target_score);

        info!(
            site_id,
            run_id = %result.run_id,
            initial_score,
            target_score = config.target_score,
            max_iterations = config.max_iterations,
            "Starting remediation"
        );
        self.observer.on_start(site_id, initial_score, config.target_score);

        if initial_score < config.target_score && !config.skip_backup {
            let backup_id = self.deps.backup.snapshot(site_id).await?;
            debug!(site_id, backup_id = %backup_id, "Site backed up");
            result.backup_id = Some(backup_id);
        }

        let reason = self.iterate(site_id, config, initial, &mut result).await;
        result.finish(reason);

        info!(
            site_id,
            run_id = %result.run_id,
            iterations = result.iterations_completed,
            initial_score = result.initial_score,
            final_score = result.final_score,
            stopped_reason = %result.stopped_reason,
            errors = result.errors.len(),
            "Remediation finished"
        );
        self.observer.on_finish(&result);

        Ok(result)
    }

    /// The loop body. Returns why it stopped.
    async fn iterate(
        &self,
        site_id: &str,
        config: &RemediationConfig,
        mut analysis: SiteAnalysis,
        result: &mut RemediationResult,
    ) -> StopReason {
        let mut current_score = result.initial_score;

        while result.iterations_completed < config.max_iterations
            && current_score < config.target_score
        {
            let iteration = result.iterations_completed + 1;
            let score_before = current_score;

            let fix_started = Instant::now();
            let fixes = StepOutcome::from_fixes(
                site_id,
                self.deps
                    .applier
                    .apply(
                        site_id,
                        &analysis.issues,
                        config.fix_types.as_ref(),
                        config.max_changes_per_iteration,
                    )
                    .await,
            );
            let fix_time = fix_started.elapsed().as_secs_f64();

            let outcomes = match fixes.into_parts() {
                Ok((outcomes, failures)) => {
                    for failure in failures {
                        warn!(site_id, iteration, "{failure}");
                        result.errors.push(failure.to_string());
                    }
                    outcomes
                }
                Err(err) => {
                    warn!(site_id, iteration, "Aborting remediation: {err}");
                    result.errors.push(err.to_string());
                    return StopReason::Error;
                }
            };
            result.fixes_applied.extend(outcomes.iter().cloned());

            let analysis_started = Instant::now();
            let reanalysis =
                StepOutcome::from_analysis(site_id, self.deps.analyzer.analyze(site_id).await);
            let analysis_time = analysis_started.elapsed().as_secs_f64();

            analysis = match reanalysis.into_parts() {
                Ok((analysis, _)) => analysis,
                Err(err) => {
                    // Fixes from this pass stay applied but cannot be scored.
                    warn!(site_id, iteration, "Re-analysis failed: {err}");
                    result.errors.push(err.to_string());
                    return StopReason::Error;
                }
            };

            let record = IterationRecord::new(
                iteration,
                score_before,
                analysis.clamped_score(),
                &outcomes,
                analysis_time,
                fix_time,
            );
            debug!(
                site_id,
                iteration,
                score_before = record.score_before(),
                score_after = record.score_after(),
                fixes_attempted = record.fixes_attempted(),
                fixes_successful = record.fixes_successful(),
                "Iteration complete"
            );
            self.observer.on_iteration(&record);

            let improvement = record.improvement();
            current_score = record.score_after();
            result.push_iteration(record);

            if current_score >= config.target_score {
                return StopReason::TargetReached;
            }
            if improvement < config.min_improvement_threshold {
                info!(
                    site_id,
                    iteration,
                    improvement,
                    threshold = config.min_improvement_threshold,
                    "Improvement below threshold, stopping"
                );
                return StopReason::NoImprovement;
            }
        }

        if current_score >= config.target_score {
            StopReason::TargetReached
        } else {
            StopReason::MaxIterations
        }
    }
}
