//! Iterative SEO remediation.
//!
//! - [`controller`] - The analyze/fix/re-analyze loop and its stop rules
//! - [`types`] - Iteration records, fix outcomes and run results
//! - [`outcome`] - Tagged success/partial/fatal outcomes for collaborator calls
//! - [`observer`] - Progress callbacks
//!
//! ```text
//! ┌──────────────┐  analyze   ┌──────────────┐
//! │  Controller  │───────────>│ SeoAnalyzer  │
//! │              │   apply    ├──────────────┤
//! │              │───────────>│ FixApplier   │
//! └──────────────┘            └──────────────┘
//!        │ records
//!        v
//! ┌──────────────────┐
//! │RemediationResult │
//! └──────────────────┘
//! ```

pub mod controller;
pub mod observer;
pub mod outcome;
pub mod types;

pub use controller::{RemediationController, RemediationDependencies};
pub use observer::{NoopObserver, RemediationObserver};
pub use outcome::StepOutcome;
pub use types::{
    clamp_score, FixOutcome, IterationRecord, RemediationResult, SeoIssue, SiteAnalysis,
    StopReason, MAX_SCORE, MIN_SCORE,
};
