//! Collaborator traits the admin session guard is composed from.
//!
//! All operations that may touch storage are async so that
//! implementations are free to do I/O. Implementations are expected to
//! serialize access to a single session id themselves.

use uuid::Uuid;

use crate::error::BastionResult;
use crate::models::{acl::Acl, admin_user::AdminUser};

// ---------------------------------------------------------------------------
// Session storage
// ---------------------------------------------------------------------------

/// A request-scoped handle onto one session record.
///
/// Values are opaque JSON; typing them is the caller's concern.
pub trait SessionStore: Send + Sync {
    /// Identifier of the record this handle currently points at.
    fn session_id(&self) -> impl Future<Output = BastionResult<String>> + Send;
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = BastionResult<Option<serde_json::Value>>> + Send;
    fn set(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = BastionResult<()>> + Send;
    /// Read a value and remove it from the record.
    fn take(
        &self,
        key: &str,
    ) -> impl Future<Output = BastionResult<Option<serde_json::Value>>> + Send;
    /// Move the record under a freshly generated identifier.
    fn regenerate_id(&self) -> impl Future<Output = BastionResult<()>> + Send;
    /// Drop the whole record. The handle moves to a fresh identifier so
    /// the destroyed one is never reused.
    fn destroy(&self) -> impl Future<Output = BastionResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Identity & authorization sources
// ---------------------------------------------------------------------------

pub trait AdminUserRepository: Send + Sync {
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = BastionResult<AdminUser>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = BastionResult<AdminUser>> + Send;
    /// Persist the identity as given, hashing a pending plaintext
    /// `password` if one is set.
    fn save(&self, user: &AdminUser) -> impl Future<Output = BastionResult<AdminUser>> + Send;
}

/// Produces a fresh permission graph for the whole system.
///
/// Building is expensive; callers cache the result in the session.
pub trait AclBuilder: Send + Sync {
    fn build_acl(&self) -> impl Future<Output = BastionResult<Acl>> + Send;
}

// ---------------------------------------------------------------------------
// Admin URLs
// ---------------------------------------------------------------------------

pub trait UrlService: Send + Sync {
    /// Whether admin URLs embed a secret key.
    fn uses_secret_key(&self) -> bool;
    /// Rotate the secret keys, invalidating previously issued links.
    fn renew_secret_urls(&self) -> impl Future<Output = BastionResult<()>> + Send;
}
