//! Login and registration against the WeChat identity provider.
//!
//! Both operations are stateless request/response. Provider failures -
//! refused exchanges, non-zero error codes, timeouts - never escape as
//! faults; they are converted into `{success: false, msg}` outcomes that the
//! HTTP layer returns as-is. Only store failures propagate as `AppError`.

use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use crate::db::{RepositoryError, WechatUserRepository};
use crate::error::AppError;
use crate::models::WechatUser;
use crate::wechat::{CodeSession, CredentialCache, PhoneLookup, WechatClient};

/// Username stored when registration omits one.
const DEFAULT_USERNAME: &str = "微信用户";

const MSG_LOGIN_OK: &str = "登录成功";
const MSG_NOT_REGISTERED: &str = "用户未注册";
const MSG_REGISTER_OK: &str = "注册成功";
const MSG_TOKEN_UNAVAILABLE: &str = "access_token 不存在，请检查刷新任务";
const MSG_OPENID_TAKEN: &str = "该 openid 已注册";
const MSG_PHONE_TAKEN: &str = "该手机号已注册";

/// Result of a login attempt.
///
/// On "not registered" the resolved openid is still returned so the caller
/// can proceed to registration without re-exchanging the code.
#[derive(Debug, Serialize)]
pub struct LoginOutcome {
    pub success: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl LoginOutcome {
    fn failure(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            msg: msg.into(),
            openid: None,
            phone_number: None,
        }
    }
}

/// Result of a registration attempt.
#[derive(Debug, Serialize)]
pub struct RegisterOutcome {
    pub success: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<WechatUser>,
}

impl RegisterOutcome {
    fn failure(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            msg: msg.into(),
            user: None,
        }
    }
}

/// Exchange a login code for an openid, folding transport failures and
/// refusals into a failure message.
async fn exchange_code(client: &WechatClient, code: &str) -> Result<String, String> {
    match client.code_to_session(code).await {
        Ok(CodeSession::Granted { openid }) => Ok(openid),
        Ok(CodeSession::Denied(raw)) => Err(raw.to_string()),
        Err(e) => Err(format!("微信接口请求失败: {e}")),
    }
}

/// Log a user in by their mini-program login code.
///
/// # Errors
///
/// Returns `AppError::Database` if a store query fails; provider failures
/// are reported inside the outcome.
#[instrument(skip(client, pool, code))]
pub async fn login(
    client: &WechatClient,
    pool: &PgPool,
    code: &str,
) -> Result<LoginOutcome, AppError> {
    let openid = match exchange_code(client, code).await {
        Ok(openid) => openid,
        Err(msg) => return Ok(LoginOutcome::failure(msg)),
    };

    match WechatUserRepository::new(pool).get_by_openid(&openid).await? {
        Some(user) => Ok(LoginOutcome {
            success: true,
            msg: MSG_LOGIN_OK.to_string(),
            openid: Some(user.openid),
            phone_number: Some(user.phone_number),
        }),
        None => Ok(LoginOutcome {
            success: false,
            msg: MSG_NOT_REGISTERED.to_string(),
            openid: Some(openid),
            phone_number: None,
        }),
    }
}

/// Register a new user from a login code and a phone code.
///
/// Steps: exchange the code for an openid, resolve the phone number with the
/// cached app token, check uniqueness of openid then phone number, then
/// insert exactly one record. No write happens on any failure path.
///
/// # Errors
///
/// Returns `AppError::Database` if a store query fails; provider failures
/// and conflicts are reported inside the outcome.
#[instrument(skip(client, cache, pool, code, phone_code))]
pub async fn register(
    client: &WechatClient,
    cache: &CredentialCache,
    pool: &PgPool,
    code: &str,
    phone_code: &str,
    username: Option<&str>,
) -> Result<RegisterOutcome, AppError> {
    let openid = match exchange_code(client, code).await {
        Ok(openid) => openid,
        Err(msg) => return Ok(RegisterOutcome::failure(msg)),
    };

    // Fail fast when the refresh task has not populated the cache; the
    // provider call would be rejected anyway.
    let Some(token) = cache.get() else {
        return Ok(RegisterOutcome::failure(MSG_TOKEN_UNAVAILABLE));
    };

    let phone_number = match client.resolve_phone_number(&token, phone_code).await {
        Ok(PhoneLookup::Resolved { phone_number }) => phone_number,
        Ok(PhoneLookup::Refused(raw)) => return Ok(RegisterOutcome::failure(raw.to_string())),
        Err(e) => return Ok(RegisterOutcome::failure(format!("微信接口请求失败: {e}"))),
    };

    let users = WechatUserRepository::new(pool);

    if users.openid_exists(&openid).await? {
        return Ok(RegisterOutcome::failure(MSG_OPENID_TAKEN));
    }
    if users.phone_exists(&phone_number).await? {
        return Ok(RegisterOutcome::failure(MSG_PHONE_TAKEN));
    }

    let username = username
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_USERNAME);

    // A concurrent registration can still win between the checks and the
    // insert; the unique constraints make that a conflict, not a duplicate.
    let user = match users.create(&openid, &phone_number, username).await {
        Ok(user) => user,
        Err(RepositoryError::Conflict(msg)) => return Ok(RegisterOutcome::failure(msg)),
        Err(e) => return Err(e.into()),
    };

    Ok(RegisterOutcome {
        success: true,
        msg: MSG_REGISTER_OK.to_string(),
        user: Some(user),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failure_carries_no_identity() {
        let outcome = LoginOutcome::failure("boom");
        assert!(!outcome.success);
        assert_eq!(outcome.msg, "boom");
        assert!(outcome.openid.is_none());
        assert!(outcome.phone_number.is_none());
    }

    #[test]
    fn test_register_failure_carries_no_user() {
        let outcome = RegisterOutcome::failure(MSG_TOKEN_UNAVAILABLE);
        assert!(!outcome.success);
        assert_eq!(outcome.msg, MSG_TOKEN_UNAVAILABLE);
        assert!(outcome.user.is_none());
    }

    #[test]
    fn test_outcome_serialization_omits_absent_fields() {
        let outcome = LoginOutcome::failure("x");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "msg": "x"}));
    }
}
