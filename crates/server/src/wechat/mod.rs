//! WeChat Open API integration.
//!
//! # Architecture
//!
//! - [`client`] - HTTP client for the three endpoints this service uses:
//!   code-to-session exchange, client-credential token issuance, and phone
//!   number resolution
//! - [`token`] - process-wide single-slot cache for the app access token
//! - [`refresher`] - background task that keeps the cache warm
//!
//! Provider responses are decoded into tagged outcome enums (granted/denied,
//! issued/refused, resolved/refused) so call sites handle both shapes
//! exhaustively instead of probing JSON for key presence.

pub mod client;
pub mod refresher;
pub mod token;

pub use client::{CodeSession, PhoneLookup, TokenGrant, WechatClient};
pub use refresher::{refresh_once, spawn_refresh_loop};
pub use token::CredentialCache;

use thiserror::Error;

/// Errors that can occur when interacting with the WeChat Open API.
///
/// Only transport-level failures surface here; an error *body* from the
/// provider is a decoded outcome, not an error.
#[derive(Debug, Error)]
pub enum WechatError {
    /// HTTP request failed (connect, timeout, or body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
