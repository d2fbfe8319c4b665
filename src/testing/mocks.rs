//! Mock implementations of the collaborator traits.
//!
//! These mocks provide controllable test doubles for the analyzer, fix
//! applier, analysis store and backup service. They are also what the CLI
//! drives when running a simulated [`crate::scenario::Scenario`].

use super::traits::{AnalysisStore, FixApplier, SeoAnalyzer, SiteBackup};
use crate::error::{Result, SeoError};
use crate::remediation::{FixOutcome, SeoIssue, SiteAnalysis};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Analyzer returning a scripted sequence of analyses.
///
/// Each call returns the next analysis; once the script runs out the last
/// one repeats.
///
/// # Example
///
/// ```rust,ignore
/// let analyzer = ScriptedAnalyzer::from_scores(&[60.0, 70.0, 80.0]);
/// assert_eq!(analyzer.analyze("site").await?.score, 60.0);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedAnalyzer {
    script: Vec<SiteAnalysis>,
    fail_on_call: Option<u32>,
    error_message: String,
    call_count: AtomicU32,
}

impl ScriptedAnalyzer {
    /// Create an analyzer from explicit analyses.
    #[must_use]
    pub fn new(script: Vec<SiteAnalysis>) -> Self {
        Self {
            script,
            fail_on_call: None,
            error_message: "connection refused".to_string(),
            call_count: AtomicU32::new(0),
        }
    }

    /// Create an analyzer from scores, each with no issues.
    #[must_use]
    pub fn from_scores(scores: &[f64]) -> Self {
        Self::new(
            scores
                .iter()
                .map(|&score| SiteAnalysis::new(score, Vec::new()))
                .collect(),
        )
    }

    /// Attach the same issue list to every scripted analysis.
    #[must_use]
    pub fn with_issues(mut self, issues: Vec<SeoIssue>) -> Self {
        for analysis in &mut self.script {
            analysis.issues = issues.clone();
        }
        self
    }

    /// Fail with `SiteUnreachable` on the given 1-based call.
    #[must_use]
    pub fn with_failure_on_call(mut self, call: u32, message: &str) -> Self {
        self.fail_on_call = Some(call);
        self.error_message = message.to_string();
        self
    }

    /// Number of times `analyze` was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SeoAnalyzer for ScriptedAnalyzer {
    async fn analyze(&self, site_id: &str) -> Result<SiteAnalysis> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;

        if self.fail_on_call == Some(call) {
            return Err(SeoError::unreachable(site_id, self.error_message.clone()));
        }

        let index = (call as usize - 1).min(self.script.len().saturating_sub(1));
        self.script
            .get(index)
            .cloned()
            .ok_or_else(|| SeoError::unreachable(site_id, "no scripted analysis"))
    }
}

/// Arguments captured from one `apply` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyCall {
    pub issues: Vec<SeoIssue>,
    pub allowed_types: Option<BTreeSet<String>>,
    pub max_changes: usize,
}

/// Fix applier that honours the allowlist and change cap.
///
/// Issues whose type is in the failing set produce failed outcomes; every
/// other eligible issue succeeds.
#[derive(Debug, Default)]
pub struct MockFixApplier {
    failing_types: BTreeSet<String>,
    fail_on_call: Option<u32>,
    error_message: String,
    calls: Mutex<Vec<ApplyCall>>,
}

impl MockFixApplier {
    /// Create an applier where every fix succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            error_message: "fix applier crashed".to_string(),
            ..Self::default()
        }
    }

    /// Make fixes of this type fail.
    #[must_use]
    pub fn with_failing_type(mut self, fix_type: &str) -> Self {
        self.failing_types.insert(fix_type.to_string());
        self
    }

    /// Fail the whole call on the given 1-based call.
    #[must_use]
    pub fn with_failure_on_call(mut self, call: u32, message: &str) -> Self {
        self.fail_on_call = Some(call);
        self.error_message = message.to_string();
        self
    }

    /// Number of times `apply` was called.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// Captured call arguments.
    pub fn calls(&self) -> Vec<ApplyCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl FixApplier for MockFixApplier {
    async fn apply(
        &self,
        site_id: &str,
        issues: &[SeoIssue],
        allowed_types: Option<&BTreeSet<String>>,
        max_changes: usize,
    ) -> Result<Vec<FixOutcome>> {
        let call = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| SeoError::config("mock applier lock poisoned"))?;
            calls.push(ApplyCall {
                issues: issues.to_vec(),
                allowed_types: allowed_types.cloned(),
                max_changes,
            });
            calls.len() as u32
        };

        if self.fail_on_call == Some(call) {
            return Err(SeoError::FixApplier {
                site_id: site_id.to_string(),
                message: self.error_message.clone(),
            });
        }

        Ok(issues
            .iter()
            .filter(|issue| allowed_types.map_or(true, |allowed| allowed.contains(&issue.fix_type)))
            .take(max_changes)
            .map(|issue| {
                if self.failing_types.contains(&issue.fix_type) {
                    FixOutcome::failed(&issue.fix_type, format!("cannot fix {}", issue.detail))
                } else {
                    FixOutcome::succeeded(&issue.fix_type)
                }
            })
            .collect())
    }
}

/// Analysis store with a fixed answer.
#[derive(Debug, Clone)]
pub struct MockAnalysisStore {
    has_analysis: bool,
    error: Option<String>,
}

impl Default for MockAnalysisStore {
    fn default() -> Self {
        Self {
            has_analysis: true,
            error: None,
        }
    }
}

impl MockAnalysisStore {
    /// A store that has an analysis for every site.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with no analyses.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            has_analysis: false,
            error: None,
        }
    }

    /// Make queries fail.
    #[must_use]
    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

#[async_trait]
impl AnalysisStore for MockAnalysisStore {
    async fn has_analysis(&self, _site_id: &str) -> Result<bool> {
        match self.error {
            Some(ref error) => Err(SeoError::config(error.clone())),
            None => Ok(self.has_analysis),
        }
    }
}

/// Backup service counting snapshots.
#[derive(Debug, Default)]
pub struct MockSiteBackup {
    error: Option<String>,
    call_count: AtomicU32,
}

impl MockSiteBackup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make snapshots fail.
    #[must_use]
    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    /// Number of snapshots taken (including failed ones).
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SiteBackup for MockSiteBackup {
    async fn snapshot(&self, site_id: &str) -> Result<String> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        match self.error {
            Some(ref error) => Err(SeoError::Backup {
                site_id: site_id.to_string(),
                message: error.clone(),
            }),
            None => Ok(format!("backup-{site_id}-{call}")),
        }
    }
}
