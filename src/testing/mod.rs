//! Testing infrastructure for seomend.
//!
//! This module provides the collaborator traits, mocks and assertions used
//! to exercise the remediation loop without real sites.
//!
//! # Architecture
//!
//! - **Traits**: The analyzer, fix applier, analysis store and backup seams
//! - **Mocks**: Scriptable implementations of those traits
//! - **Assertions**: Checks on [`crate::remediation::RemediationResult`]
//!
//! # Example
//!
//! ```rust,ignore
//! use seomend::testing::{MockFixApplier, ScriptedAnalyzer};
//!
//! let analyzer = ScriptedAnalyzer::from_scores(&[60.0, 70.0, 80.0, 90.0]);
//! let applier = MockFixApplier::new().with_failing_type("missing_h1");
//! ```

pub mod assertions;
pub mod mocks;
pub mod traits;

// Re-export commonly used types
pub use assertions::*;
pub use mocks::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remediation::SeoIssue;
    use crate::SeoError;
    use std::collections::BTreeSet;

    fn issues() -> Vec<SeoIssue> {
        vec![
            SeoIssue::new("missing_alt_text", "/about hero.jpg"),
            SeoIssue::new("missing_meta_description", "/pricing"),
            SeoIssue::new("missing_alt_text", "/blog logo.png"),
        ]
    }

    // =========================================================================
    // Scripted Analyzer Tests
    // =========================================================================

    #[tokio::test]
    async fn test_scripted_analyzer_walks_script() {
        let analyzer = ScriptedAnalyzer::from_scores(&[60.0, 70.0]);
        assert_eq!(analyzer.analyze("s").await.unwrap().score, 60.0);
        assert_eq!(analyzer.analyze("s").await.unwrap().score, 70.0);
        // Last entry repeats
        assert_eq!(analyzer.analyze("s").await.unwrap().score, 70.0);
        assert_eq!(analyzer.call_count(), 3);
    }

    #[tokio::test]
    async fn test_scripted_analyzer_failure_on_call() {
        let analyzer = ScriptedAnalyzer::from_scores(&[60.0, 70.0]).with_failure_on_call(2, "dns");
        assert!(analyzer.analyze("s").await.is_ok());
        let err = analyzer.analyze("s").await.unwrap_err();
        assert!(matches!(err, SeoError::SiteUnreachable { .. }));
        assert!(err.to_string().contains("dns"));
    }

    #[tokio::test]
    async fn test_scripted_analyzer_empty_script_errors() {
        let analyzer = ScriptedAnalyzer::new(Vec::new());
        assert!(analyzer.analyze("s").await.is_err());
    }

    #[tokio::test]
    async fn test_scripted_analyzer_with_issues() {
        let analyzer = ScriptedAnalyzer::from_scores(&[60.0]).with_issues(issues());
        assert_eq!(analyzer.analyze("s").await.unwrap().issues.len(), 3);
    }

    // =========================================================================
    // Mock Fix Applier Tests
    // =========================================================================

    #[tokio::test]
    async fn test_fix_applier_all_succeed() {
        let applier = MockFixApplier::new();
        let outcomes = applier.apply("s", &issues(), None, 20).await.unwrap();
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| o.success));
    }

    #[tokio::test]
    async fn test_fix_applier_honours_allowlist_and_cap() {
        let applier = MockFixApplier::new();
        let allowed: BTreeSet<String> = ["missing_alt_text".to_string()].into_iter().collect();

        let outcomes = applier.apply("s", &issues(), Some(&allowed), 1).await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].fix_type, "missing_alt_text");

        let calls = applier.calls();
        assert_eq!(calls[0].max_changes, 1);
        assert_eq!(calls[0].allowed_types.as_ref(), Some(&allowed));
    }

    #[tokio::test]
    async fn test_fix_applier_failing_type() {
        let applier = MockFixApplier::new().with_failing_type("missing_meta_description");
        let outcomes = applier.apply("s", &issues(), None, 20).await.unwrap();
        assert_eq!(outcomes.iter().filter(|o| !o.success).count(), 1);
    }

    #[tokio::test]
    async fn test_fix_applier_failure_on_call() {
        let applier = MockFixApplier::new().with_failure_on_call(1, "wordpress 503");
        let err = applier.apply("s", &issues(), None, 20).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(applier.call_count(), 1);
    }

    // =========================================================================
    // Store and Backup Tests
    // =========================================================================

    #[tokio::test]
    async fn test_analysis_store() {
        assert!(MockAnalysisStore::new().has_analysis("s").await.unwrap());
        assert!(!MockAnalysisStore::empty().has_analysis("s").await.unwrap());
        assert!(MockAnalysisStore::new()
            .with_error("db down")
            .has_analysis("s")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_site_backup() {
        let backup = MockSiteBackup::new();
        assert_eq!(backup.snapshot("s").await.unwrap(), "backup-s-1");
        assert_eq!(backup.call_count(), 1);

        let failing = MockSiteBackup::new().with_error("disk full");
        assert!(matches!(
            failing.snapshot("s").await,
            Err(SeoError::Backup { .. })
        ));
    }
}
