//! Keys of the fields the admin guard keeps in a session record.

/// Authenticated [`AdminUser`](super::admin_user::AdminUser).
pub const USER_KEY: &str = "user";
/// Cached [`Acl`](super::acl::Acl) snapshot.
pub const ACL_KEY: &str = "acl";
/// Last-activity timestamp, seconds since the Unix epoch.
pub const UPDATED_AT_KEY: &str = "updated_at";
/// One-shot flag set on the request that follows a login.
pub const IS_FIRST_VISIT_KEY: &str = "is_first_visit";
