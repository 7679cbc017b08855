//! Admin user domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Inactive,
    Locked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Plaintext password awaiting hashing on the next save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Role name evaluated against the ACL graph.
    pub acl_role: String,
    pub status: UserStatus,
    /// Set when the user's permissions changed and the cached ACL
    /// snapshot in their session must be rebuilt.
    #[serde(default)]
    pub reload_acl_flag: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminUser {
    /// A nil UUID marks an identity that was never persisted.
    pub fn has_id(&self) -> bool {
        !self.id.is_nil()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdminUser {
    pub username: String,
    pub email: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
    pub acl_role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAdminUser {
    pub email: Option<String>,
    pub status: Option<UserStatus>,
    /// Changing the role flags the user for an ACL reload.
    pub acl_role: Option<String>,
    /// New raw password.
    pub password: Option<String>,
}
