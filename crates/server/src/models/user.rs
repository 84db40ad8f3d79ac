//! Registered mini-program users.

use serde::Serialize;

use deco_select_core::WechatUserId;

/// A registered user, keyed by the WeChat-issued openid.
///
/// `openid` and `phone_number` are unique in the store; registration
/// correctness depends on those constraints.
#[derive(Debug, Clone, Serialize)]
pub struct WechatUser {
    pub id: WechatUserId,
    pub openid: String,
    pub phone_number: String,
    pub username: String,
}
