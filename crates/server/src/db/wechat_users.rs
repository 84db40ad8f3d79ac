//! Registered user repository.
//!
//! Uniqueness of `openid` and `phone_number` is enforced by the store;
//! registration correctness depends on those constraints.

use sqlx::PgPool;

use deco_select_core::WechatUserId;

use super::RepositoryError;
use crate::models::WechatUser;

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct WechatUserRow {
    id: i32,
    openid: String,
    phone_number: String,
    username: String,
}

impl From<WechatUserRow> for WechatUser {
    fn from(row: WechatUserRow) -> Self {
        Self {
            id: WechatUserId::new(row.id),
            openid: row.openid,
            phone_number: row.phone_number,
            username: row.username,
        }
    }
}

/// Repository for registered users.
pub struct WechatUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WechatUserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their openid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_openid(
        &self,
        openid: &str,
    ) -> Result<Option<WechatUser>, RepositoryError> {
        let row = sqlx::query_as::<_, WechatUserRow>(
            "SELECT id, openid, phone_number, username FROM wechat_user WHERE openid = $1",
        )
        .bind(openid)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Check whether an openid is already registered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn openid_exists(&self, openid: &str) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM wechat_user WHERE openid = $1)",
        )
        .bind(openid)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Check whether a phone number is already registered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn phone_exists(&self, phone_number: &str) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM wechat_user WHERE phone_number = $1)",
        )
        .bind(phone_number)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the openid or phone number is
    /// already registered (a race past the existence pre-checks).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        openid: &str,
        phone_number: &str,
        username: &str,
    ) -> Result<WechatUser, RepositoryError> {
        let row = sqlx::query_as::<_, WechatUserRow>(
            r"
            INSERT INTO wechat_user (openid, phone_number, username)
            VALUES ($1, $2, $3)
            RETURNING id, openid, phone_number, username
            ",
        )
        .bind(openid)
        .bind(phone_number)
        .bind(username)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("该 openid 或手机号已注册".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }
}
