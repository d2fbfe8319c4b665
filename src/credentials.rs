//! Owned credential store for third-party OAuth tokens.
//!
//! Analyzer and fix-applier implementations talk to Google Search Console
//! and WordPress with OAuth tokens. Those tokens live in a
//! [`CredentialStore`] that the caller creates and passes to the components
//! that need it; there is no process-wide token cache.

use crate::error::{Result, SeoError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, info};

/// Tokens expiring within this window are refreshed before use.
pub const REFRESH_SKEW_SECONDS: i64 = 60;

/// Services the store holds tokens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Google,
    WordPress,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::WordPress => write!(f, "wordpress"),
        }
    }
}

/// An access token with optional refresh token and expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// A credential that never expires (e.g. a WordPress application password).
    #[must_use]
    pub fn non_expiring(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// An OAuth credential.
    #[must_use]
    pub fn oauth(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: Some(refresh_token.into()),
            expires_at: Some(expires_at),
        }
    }

    /// Whether the token expires within the refresh skew of `now`.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|exp| exp <= now + Duration::seconds(REFRESH_SKEW_SECONDS))
    }

    /// Short SHA-256 prefix of the access token, safe for logs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.access_token.as_bytes());
        hex::encode(&digest[..6])
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &format!("<redacted {}>", self.fingerprint()))
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Exchanges a refresh token for a new credential.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Refresh `credential` for `provider`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the refresh token.
    async fn refresh(&self, provider: Provider, credential: &Credential) -> Result<Credential>;
}

/// Credentials keyed by provider and site.
#[derive(Debug, Default)]
pub struct CredentialStore {
    entries: HashMap<(Provider, String), Credential>,
}

impl CredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace a credential.
    pub fn insert(&mut self, provider: Provider, site_id: &str, credential: Credential) {
        debug!(%provider, site_id, token = %credential.fingerprint(), "Credential stored");
        self.entries.insert((provider, site_id.to_string()), credential);
    }

    /// Look up a credential without checking expiry.
    #[must_use]
    pub fn get(&self, provider: Provider, site_id: &str) -> Option<&Credential> {
        self.entries.get(&(provider, site_id.to_string()))
    }

    /// Remove a credential (e.g. on disconnect).
    pub fn revoke(&mut self, provider: Provider, site_id: &str) -> Option<Credential> {
        self.entries.remove(&(provider, site_id.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return a usable credential, refreshing it first if it is about to
    /// expire. The refreshed credential replaces the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`SeoError::Credential`] if nothing is stored, the credential
    /// is expiring without a refresh token, or the refresh fails.
    pub async fn get_fresh(
        &mut self,
        provider: Provider,
        site_id: &str,
        refresher: &dyn TokenRefresher,
        now: DateTime<Utc>,
    ) -> Result<Credential> {
        let key = (provider, site_id.to_string());
        let current = self.entries.get(&key).cloned().ok_or_else(|| {
            SeoError::credential(provider.to_string(), format!("no credential for {site_id}"))
        })?;

        if !current.needs_refresh(now) {
            return Ok(current);
        }

        if current.refresh_token.is_none() {
            return Err(SeoError::credential(
                provider.to_string(),
                format!("credential for {site_id} expired and has no refresh token"),
            ));
        }

        let refreshed = refresher
            .refresh(provider, &current)
            .await
            .map_err(|e| SeoError::credential(provider.to_string(), e.to_string()))?;

        // Providers may omit the refresh token on refresh; keep the old one.
        let refreshed = Credential {
            refresh_token: refreshed.refresh_token.or(current.refresh_token),
            ..refreshed
        };

        info!(
            %provider,
            site_id,
            token = %refreshed.fingerprint(),
            "Credential refreshed"
        );
        self.entries.insert(key, refreshed.clone());
        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingRefresher {
        calls: AtomicU32,
        fail: bool,
    }

    impl CountingRefresher {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl TokenRefresher for CountingRefresher {
        async fn refresh(
            &self,
            _provider: Provider,
            _credential: &Credential,
        ) -> Result<Credential> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(SeoError::config("invalid_grant"));
            }
            Ok(Credential {
                access_token: format!("access-{n}"),
                refresh_token: None,
                expires_at: Some(Utc::now() + Duration::hours(1)),
            })
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_needs_refresh_window() {
        let t = now();
        let fresh = Credential::oauth("a", "r", t + Duration::minutes(10));
        let expiring = Credential::oauth("a", "r", t + Duration::seconds(30));
        let expired = Credential::oauth("a", "r", t - Duration::seconds(1));
        assert!(!fresh.needs_refresh(t));
        assert!(expiring.needs_refresh(t));
        assert!(expired.needs_refresh(t));
        assert!(!Credential::non_expiring("a").needs_refresh(t));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let cred = Credential::oauth("super-secret", "also-secret", now());
        let debug = format!("{cred:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("also-secret"));
        assert!(debug.contains(&cred.fingerprint()));
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = Credential::non_expiring("token");
        let b = Credential::non_expiring("token");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 12);
        assert_ne!(a.fingerprint(), Credential::non_expiring("other").fingerprint());
    }

    #[test]
    fn test_insert_get_revoke() {
        let mut store = CredentialStore::new();
        assert!(store.is_empty());
        store.insert(Provider::Google, "site-1", Credential::non_expiring("g"));
        store.insert(Provider::WordPress, "site-1", Credential::non_expiring("w"));
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get(Provider::Google, "site-1").unwrap().access_token,
            "g"
        );
        assert!(store.get(Provider::Google, "site-2").is_none());
        assert!(store.revoke(Provider::Google, "site-1").is_some());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_get_fresh_returns_valid_token_without_refresh() {
        let mut store = CredentialStore::new();
        store.insert(
            Provider::Google,
            "site-1",
            Credential::oauth("a", "r", now() + Duration::hours(1)),
        );
        let refresher = CountingRefresher::new(false);

        let cred = store
            .get_fresh(Provider::Google, "site-1", &refresher, now())
            .await
            .unwrap();
        assert_eq!(cred.access_token, "a");
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_fresh_refreshes_and_keeps_refresh_token() {
        let mut store = CredentialStore::new();
        store.insert(
            Provider::Google,
            "site-1",
            Credential::oauth("old", "refresh-1", now() - Duration::minutes(5)),
        );
        let refresher = CountingRefresher::new(false);

        let cred = store
            .get_fresh(Provider::Google, "site-1", &refresher, now())
            .await
            .unwrap();
        assert_eq!(cred.access_token, "access-1");
        assert_eq!(cred.refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(
            store.get(Provider::Google, "site-1").unwrap().access_token,
            "access-1"
        );
    }

    #[tokio::test]
    async fn test_get_fresh_missing_credential() {
        let mut store = CredentialStore::new();
        let refresher = CountingRefresher::new(false);
        let err = store
            .get_fresh(Provider::WordPress, "site-1", &refresher, now())
            .await
            .unwrap_err();
        assert!(matches!(err, SeoError::Credential { .. }));
    }

    #[tokio::test]
    async fn test_get_fresh_expired_without_refresh_token() {
        let mut store = CredentialStore::new();
        store.insert(
            Provider::Google,
            "site-1",
            Credential {
                access_token: "a".into(),
                refresh_token: None,
                expires_at: Some(now() - Duration::minutes(1)),
            },
        );
        let refresher = CountingRefresher::new(false);
        let err = store
            .get_fresh(Provider::Google, "site-1", &refresher, now())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no refresh token"));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_fresh_refresh_failure() {
        let mut store = CredentialStore::new();
        store.insert(
            Provider::Google,
            "site-1",
            Credential::oauth("a", "r", now()),
        );
        let refresher = CountingRefresher::new(true);
        let err = store
            .get_fresh(Provider::Google, "site-1", &refresher, now())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid_grant"));
        // The stale credential stays so a later refresh can retry.
        assert_eq!(store.get(Provider::Google, "site-1").unwrap().access_token, "a");
    }
}
