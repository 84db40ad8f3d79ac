//! Background token refresh task.
//!
//! The boot sequence awaits one [`refresh_once`] before serving (warm cache
//! at first use), then calls [`spawn_refresh_loop`] to keep refreshing on a
//! fixed interval for the life of the process. Every attempt is independent:
//! a failure is logged and the cache's current value is left untouched.

use std::time::Duration;

use tracing::{info, warn};

use super::client::{TokenGrant, WechatClient};
use super::token::CredentialCache;

/// Fixed interval between refresh attempts.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(3600);

/// Attempt one token refresh against the provider.
///
/// Never fails: a refused grant or transport error is logged and the cache
/// is left as-is (possibly absent or stale until the next attempt).
pub async fn refresh_once(client: &WechatClient, cache: &CredentialCache) {
    match client.client_credential_token().await {
        Ok(TokenGrant::Issued {
            access_token,
            expires_in,
        }) => {
            cache.set(access_token, expires_in);
            info!(expires_in, "WeChat access token refreshed");
        }
        Ok(TokenGrant::Refused(raw)) => {
            warn!(response = %raw, "WeChat token refresh refused by provider");
        }
        Err(e) => {
            warn!(error = %e, "WeChat token refresh failed");
        }
    }
}

/// Spawn the long-lived refresh task.
///
/// One instance per process, started at boot after the client and cache are
/// constructed. The task runs independently of request handling and is never
/// joined.
pub fn spawn_refresh_loop(client: WechatClient, cache: CredentialCache) {
    info!(interval_secs = REFRESH_INTERVAL.as_secs(), "Spawning token refresh task");
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(REFRESH_INTERVAL).await;
            refresh_once(&client, &cache).await;
        }
    });
}
