//! Trait definitions for the remediation collaborators.
//!
//! The controller only talks to the outside world through these traits:
//! the SEO analyzer, the fix applier, the store that records prior
//! analyses and the backup service. Production implementations wrap HTTP
//! clients; the mocks in [`super::mocks`] make the loop testable.

use crate::error::Result;
use crate::remediation::{FixOutcome, SeoIssue, SiteAnalysis};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Scores a site and lists its remediable issues.
///
/// # Example
///
/// ```rust,ignore
/// use seomend::testing::SeoAnalyzer;
///
/// async fn score(analyzer: &impl SeoAnalyzer, site: &str) -> Result<f64> {
///     Ok(analyzer.analyze(site).await?.clamped_score())
/// }
/// ```
#[async_trait]
pub trait SeoAnalyzer: Send + Sync {
    /// Analyze the site.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SeoError::SiteUnreachable`] if the site cannot be
    /// fetched or scored.
    async fn analyze(&self, site_id: &str) -> Result<SiteAnalysis>;
}

/// Applies automated fixes for analyzer issues.
#[async_trait]
pub trait FixApplier: Send + Sync {
    /// Attempt to remediate `issues`.
    ///
    /// Implementations must only touch issues whose fix type is in
    /// `allowed_types` (when given) and make at most `max_changes` changes.
    /// Returns one outcome per attempted issue, in attempt order.
    ///
    /// # Errors
    ///
    /// Returns an error only when the applier fails as a whole; a single
    /// issue failing is reported as an unsuccessful [`FixOutcome`].
    async fn apply(
        &self,
        site_id: &str,
        issues: &[SeoIssue],
        allowed_types: Option<&BTreeSet<String>>,
        max_changes: usize,
    ) -> Result<Vec<FixOutcome>>;
}

/// Records which sites have a prior SEO analysis.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Whether an analysis has been stored for the site.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    async fn has_analysis(&self, site_id: &str) -> Result<bool>;
}

/// Snapshots site content before fixes mutate it.
#[async_trait]
pub trait SiteBackup: Send + Sync {
    /// Take a backup and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SeoError::Backup`] if the snapshot fails.
    async fn snapshot(&self, site_id: &str) -> Result<String>;
}
