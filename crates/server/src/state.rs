//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::wechat::{CredentialCache, WechatClient, WechatError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool, the WeChat client, and the
/// credential cache.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    wechat: WechatClient,
    credentials: CredentialCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the WeChat HTTP client fails to build.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, WechatError> {
        let wechat = WechatClient::new(&config.wechat)?;
        let credentials = CredentialCache::new();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                wechat,
                credentials,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the WeChat Open API client.
    #[must_use]
    pub fn wechat(&self) -> &WechatClient {
        &self.inner.wechat
    }

    /// Get a reference to the credential cache.
    #[must_use]
    pub fn credentials(&self) -> &CredentialCache {
        &self.inner.credentials
    }
}
