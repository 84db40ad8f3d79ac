//! WeChat Open API client.
//!
//! Wraps the three endpoints the service depends on. All calls are bounded
//! by a 5 second timeout; a timeout is reported like any other transport
//! failure.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde_json::Value;

use crate::config::WechatConfig;

use super::WechatError;

/// Outbound request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a `jscode2session` exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSession {
    /// The provider issued an openid for this code.
    Granted { openid: String },
    /// Any other response shape; the raw body is kept for the caller's
    /// failure message.
    Denied(Value),
}

impl CodeSession {
    /// Decode a provider response body.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value.get("openid").and_then(Value::as_str) {
            Some(openid) => Self::Granted {
                openid: openid.to_owned(),
            },
            None => Self::Denied(value),
        }
    }
}

/// Outcome of a client-credential token request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenGrant {
    /// The provider issued an app access token.
    Issued {
        access_token: String,
        /// Upstream validity in seconds
        expires_in: i64,
    },
    /// Any other response shape.
    Refused(Value),
}

impl TokenGrant {
    /// Upstream default validity when `expires_in` is missing.
    const DEFAULT_EXPIRES_IN: i64 = 7200;

    /// Decode a provider response body.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value.get("access_token").and_then(Value::as_str) {
            Some(token) => Self::Issued {
                access_token: token.to_owned(),
                expires_in: value
                    .get("expires_in")
                    .and_then(Value::as_i64)
                    .unwrap_or(Self::DEFAULT_EXPIRES_IN),
            },
            None => Self::Refused(value),
        }
    }
}

/// Outcome of a phone number resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneLookup {
    /// The provider resolved the phone code to a number.
    Resolved { phone_number: String },
    /// Non-zero `errcode` or a response missing the phone number.
    Refused(Value),
}

impl PhoneLookup {
    /// Decode a provider response body.
    ///
    /// Success requires `errcode == 0` *and* a present
    /// `phone_info.purePhoneNumber`.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let errcode = value.get("errcode").and_then(Value::as_i64);
        if errcode == Some(0)
            && let Some(phone) = value
                .pointer("/phone_info/purePhoneNumber")
                .and_then(Value::as_str)
        {
            return Self::Resolved {
                phone_number: phone.to_owned(),
            };
        }
        Self::Refused(value)
    }
}

/// Client for the WeChat Open API.
///
/// Cheaply cloneable via `Arc`; one instance is shared by the refresh task
/// and all request handlers.
#[derive(Clone)]
pub struct WechatClient {
    inner: Arc<WechatClientInner>,
}

struct WechatClientInner {
    client: reqwest::Client,
    app_id: String,
    secret: String,
    api_base: String,
}

impl WechatClient {
    /// Create a new WeChat Open API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &WechatConfig) -> Result<Self, WechatError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(WechatClientInner {
                client,
                app_id: config.app_id.clone(),
                secret: config.secret.expose_secret().to_string(),
                api_base: config.api_base.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Exchange a mini-program login code for an openid.
    ///
    /// # Errors
    ///
    /// Returns `WechatError::Http` on transport failure; a provider error
    /// body is decoded to [`CodeSession::Denied`], not an error.
    pub async fn code_to_session(&self, js_code: &str) -> Result<CodeSession, WechatError> {
        let url = format!("{}/sns/jscode2session", self.inner.api_base);
        let body: Value = self
            .inner
            .client
            .get(&url)
            .query(&[
                ("appid", self.inner.app_id.as_str()),
                ("secret", self.inner.secret.as_str()),
                ("js_code", js_code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(CodeSession::from_value(body))
    }

    /// Request a fresh app access token (client-credential grant).
    ///
    /// # Errors
    ///
    /// Returns `WechatError::Http` on transport failure.
    pub async fn client_credential_token(&self) -> Result<TokenGrant, WechatError> {
        let url = format!("{}/cgi-bin/token", self.inner.api_base);
        let body: Value = self
            .inner
            .client
            .get(&url)
            .query(&[
                ("grant_type", "client_credential"),
                ("appid", self.inner.app_id.as_str()),
                ("secret", self.inner.secret.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(TokenGrant::from_value(body))
    }

    /// Resolve a phone code to a phone number using an app access token.
    ///
    /// # Errors
    ///
    /// Returns `WechatError::Http` on transport failure.
    pub async fn resolve_phone_number(
        &self,
        access_token: &str,
        phone_code: &str,
    ) -> Result<PhoneLookup, WechatError> {
        let url = format!(
            "{}/wxa/business/getuserphonenumber",
            self.inner.api_base
        );
        let body: Value = self
            .inner
            .client
            .post(&url)
            .query(&[("access_token", access_token)])
            .json(&serde_json::json!({ "code": phone_code }))
            .send()
            .await?
            .json()
            .await?;

        Ok(PhoneLookup::from_value(body))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_code_session_granted() {
        let body = json!({"openid": "oABC123", "session_key": "k", "unionid": "u"});
        assert_eq!(
            CodeSession::from_value(body),
            CodeSession::Granted {
                openid: "oABC123".to_string()
            }
        );
    }

    #[test]
    fn test_code_session_denied_keeps_raw_body() {
        let body = json!({"errcode": 40029, "errmsg": "invalid code"});
        let CodeSession::Denied(raw) = CodeSession::from_value(body.clone()) else {
            panic!("expected Denied");
        };
        assert_eq!(raw, body);
    }

    #[test]
    fn test_token_grant_issued() {
        let body = json!({"access_token": "tok", "expires_in": 7200});
        assert_eq!(
            TokenGrant::from_value(body),
            TokenGrant::Issued {
                access_token: "tok".to_string(),
                expires_in: 7200
            }
        );
    }

    #[test]
    fn test_token_grant_missing_expires_in_defaults() {
        let body = json!({"access_token": "tok"});
        assert_eq!(
            TokenGrant::from_value(body),
            TokenGrant::Issued {
                access_token: "tok".to_string(),
                expires_in: 7200
            }
        );
    }

    #[test]
    fn test_token_grant_refused() {
        let body = json!({"errcode": 40013, "errmsg": "invalid appid"});
        assert!(matches!(
            TokenGrant::from_value(body),
            TokenGrant::Refused(_)
        ));
    }

    #[test]
    fn test_phone_lookup_resolved() {
        let body = json!({
            "errcode": 0,
            "phone_info": {"purePhoneNumber": "13800138000", "countryCode": "86"}
        });
        assert_eq!(
            PhoneLookup::from_value(body),
            PhoneLookup::Resolved {
                phone_number: "13800138000".to_string()
            }
        );
    }

    #[test]
    fn test_phone_lookup_nonzero_errcode_refused() {
        let body = json!({"errcode": 40001, "errmsg": "invalid credential"});
        assert!(matches!(
            PhoneLookup::from_value(body),
            PhoneLookup::Refused(_)
        ));
    }

    #[test]
    fn test_phone_lookup_missing_errcode_refused() {
        // errcode must be exactly 0; an absent errcode is not success
        let body = json!({"phone_info": {"purePhoneNumber": "13800138000"}});
        assert!(matches!(
            PhoneLookup::from_value(body),
            PhoneLookup::Refused(_)
        ));
    }
}
