//! Process-wide single-slot cache for the WeChat app access token.
//!
//! The cache is the only value shared between the refresh task (sole writer)
//! and request handlers (readers). Reads never block on I/O and never
//! trigger a refresh: absence is a valid state callers must handle.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};

/// Safety margin subtracted from the upstream TTL, so the cached token is
/// treated as expired before the provider actually invalidates it.
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Floor for the effective TTL when the upstream TTL is shorter than the
/// margin.
const MIN_TTL_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Single-slot, refresh-ahead token cache.
///
/// Cheaply cloneable; clones share the same slot.
#[derive(Clone, Default)]
pub struct CredentialCache {
    slot: Arc<RwLock<Option<CachedToken>>>,
}

impl CredentialCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current token, or `None` if absent or past its effective
    /// expiry. Non-blocking, no I/O.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.get_at(Utc::now())
    }

    /// Store a token with the provider-reported `expires_in` (seconds).
    ///
    /// Unconditionally overwrites the slot. The effective TTL is
    /// `max(expires_in - 300, 60)` seconds.
    pub fn set(&self, token: String, expires_in_secs: i64) {
        self.set_at(token, expires_in_secs, Utc::now());
    }

    /// Clock-injected variant of [`get`](Self::get).
    #[must_use]
    pub fn get_at(&self, now: DateTime<Utc>) -> Option<String> {
        let slot = self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        slot.as_ref()
            .filter(|cached| now < cached.expires_at)
            .map(|cached| cached.token.clone())
    }

    /// Clock-injected variant of [`set`](Self::set).
    pub fn set_at(&self, token: String, expires_in_secs: i64, now: DateTime<Utc>) {
        let effective_ttl = (expires_in_secs - EXPIRY_MARGIN_SECS).max(MIN_TTL_SECS);
        let cached = CachedToken {
            token,
            expires_at: now + Duration::seconds(effective_ttl),
        };

        let mut slot = self
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(cached);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid timestamp")
    }

    #[test]
    fn test_empty_cache_returns_none() {
        let cache = CredentialCache::new();
        assert_eq!(cache.get_at(t0()), None);
    }

    #[test]
    fn test_set_then_get() {
        let cache = CredentialCache::new();
        cache.set_at("X".to_string(), 7200, t0());
        assert_eq!(cache.get_at(t0()), Some("X".to_string()));
    }

    #[test]
    fn test_effective_ttl_applies_safety_margin() {
        // expires_in=7200 gives an effective TTL of 6900s; expiry is enforced
        // by the cache itself, not by the refresh task.
        let cache = CredentialCache::new();
        cache.set_at("X".to_string(), 7200, t0());

        let just_before = t0() + Duration::seconds(6899);
        let at_expiry = t0() + Duration::seconds(6900);

        assert_eq!(cache.get_at(just_before), Some("X".to_string()));
        assert_eq!(cache.get_at(at_expiry), None);
    }

    #[test]
    fn test_short_upstream_ttl_clamps_to_minimum() {
        // expires_in < margin would otherwise go negative
        let cache = CredentialCache::new();
        cache.set_at("X".to_string(), 120, t0());

        assert_eq!(cache.get_at(t0() + Duration::seconds(59)), Some("X".to_string()));
        assert_eq!(cache.get_at(t0() + Duration::seconds(60)), None);
    }

    #[test]
    fn test_set_overwrites_unconditionally() {
        let cache = CredentialCache::new();
        cache.set_at("old".to_string(), 7200, t0());
        cache.set_at("new".to_string(), 7200, t0());
        assert_eq!(cache.get_at(t0()), Some("new".to_string()));
    }

    #[test]
    fn test_clones_share_the_slot() {
        let cache = CredentialCache::new();
        let reader = cache.clone();
        cache.set_at("X".to_string(), 7200, t0());
        assert_eq!(reader.get_at(t0()), Some("X".to_string()));
    }
}
