//! Login and registration route handlers.
//!
//! These endpoints return their `{success, msg, ...}` bodies with HTTP 200;
//! the mini-program client branches on the `success` flag. Only missing
//! parameters and store failures surface as HTTP errors.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::services::identity::{self, LoginOutcome, RegisterOutcome};
use crate::state::AppState;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub code: Option<String>,
}

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginOutcome>> {
    let code = require(body.code.as_deref(), "code")?;

    let outcome = identity::login(state.wechat(), state.pool(), code).await?;

    Ok(Json(outcome))
}

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub code: Option<String>,
    pub phone_code: Option<String>,
    pub username: Option<String>,
}

/// `POST /api/register`
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<RegisterOutcome>> {
    let code = require(body.code.as_deref(), "code")?;
    let phone_code = require(body.phone_code.as_deref(), "phone_code")?;

    let outcome = identity::register(
        state.wechat(),
        state.credentials(),
        state.pool(),
        code,
        phone_code,
        body.username.as_deref(),
    )
    .await?;

    Ok(Json(outcome))
}

/// Reject absent or blank required parameters.
fn require<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{name} 参数必填")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_missing_and_blank() {
        assert!(require(None, "code").is_err());
        assert!(require(Some("   "), "code").is_err());
        assert_eq!(require(Some(" abc "), "code").ok(), Some("abc"));
    }
}
