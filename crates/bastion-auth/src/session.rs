//! Admin session guard.
//!
//! [`AdminSession`] wraps a request-scoped [`SessionStore`] handle and
//! keeps four typed fields in it: the authenticated [`AdminUser`], the
//! cached [`Acl`] snapshot, the last-activity stamp used for the idle
//! timeout, and the one-shot "first page after login" flag.
//!
//! The guard decides on every request whether the caller is logged in
//! and answers permission checks from the cached snapshot. It performs
//! no locking of its own; the store serializes access to a session id.

use bastion_core::error::BastionResult;
use bastion_core::models::acl::{Acl, AclDecision};
use bastion_core::models::admin_user::AdminUser;
use bastion_core::models::session::{ACL_KEY, IS_FIRST_VISIT_KEY, UPDATED_AT_KEY, USER_KEY};
use bastion_core::repository::{AclBuilder, AdminUserRepository, SessionStore, UrlService};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{AuthConfig, ConfigProvider, MIN_SESSION_LIFETIME_SECS};

/// Seconds since the Unix epoch.
type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

/// Admin session guard.
///
/// Generic over its collaborators so the auth layer has no dependency
/// on any storage crate.
pub struct AdminSession<S, A, U, R, C = AuthConfig> {
    store: S,
    acl_builder: A,
    urls: U,
    users: R,
    config: C,
    clock: Clock,
    /// Cached for the lifetime of this guard once read.
    is_first_after_login: Option<bool>,
}

impl<S, A, U, R, C> AdminSession<S, A, U, R, C>
where
    S: SessionStore,
    A: AclBuilder,
    U: UrlService,
    R: AdminUserRepository,
    C: ConfigProvider,
{
    pub fn new(store: S, acl_builder: A, urls: U, users: R, config: C) -> Self {
        Self {
            store,
            acl_builder,
            urls,
            users,
            config,
            clock: Box::new(|| Utc::now().timestamp()),
            is_first_after_login: None,
        }
    }

    /// Replace the wall clock used for idle-timeout decisions.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    fn now(&self) -> i64 {
        (self.clock)()
    }

    // -----------------------------------------------------------------------
    // Typed session fields
    // -----------------------------------------------------------------------

    pub async fn session_id(&self) -> BastionResult<String> {
        self.store.session_id().await
    }

    pub async fn user(&self) -> BastionResult<Option<AdminUser>> {
        self.read(USER_KEY).await
    }

    pub async fn set_user(&self, user: &AdminUser) -> BastionResult<()> {
        self.write(USER_KEY, user).await
    }

    pub async fn acl(&self) -> BastionResult<Option<Acl>> {
        self.read(ACL_KEY).await
    }

    pub async fn set_acl(&self, acl: &Acl) -> BastionResult<()> {
        self.write(ACL_KEY, acl).await
    }

    pub async fn updated_at(&self) -> BastionResult<Option<i64>> {
        self.read(UPDATED_AT_KEY).await
    }

    pub async fn set_updated_at(&self, timestamp: i64) -> BastionResult<()> {
        self.write(UPDATED_AT_KEY, &timestamp).await
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> BastionResult<Option<T>> {
        match self.store.get(key).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> BastionResult<()> {
        self.store.set(key, serde_json::to_value(value)?).await
    }

    async fn has(&self, key: &str) -> BastionResult<bool> {
        Ok(!matches!(self.store.get(key).await?, None | Some(Value::Null)))
    }

    // -----------------------------------------------------------------------
    // Authorization
    // -----------------------------------------------------------------------

    /// Bring the cached ACL snapshot in line with `user` (or the session's
    /// user when `None`).
    ///
    /// The snapshot is rebuilt when none exists yet or when the identity
    /// carries the reload flag. A set flag is then cleared together with
    /// any pending plaintext password and the identity is persisted. The
    /// session is only written once the build and the save succeeded.
    pub async fn refresh_acl(&self, user: Option<AdminUser>) -> BastionResult<()> {
        let user = match user {
            Some(user) => Some(user),
            None => self.user().await?,
        };
        let Some(mut user) = user else {
            return Ok(());
        };

        let acl = if user.reload_acl_flag || !self.has(ACL_KEY).await? {
            Some(self.build_acl().await?)
        } else {
            None
        };

        if user.reload_acl_flag {
            user.password = None;
            user.reload_acl_flag = false;
            let saved = self.users.save(&user).await?;
            if self
                .user()
                .await?
                .is_some_and(|current| current.id == saved.id)
            {
                self.set_user(&saved).await?;
            }
            debug!(user_id = %saved.id, "Cleared ACL reload flag");
        }

        if let Some(acl) = acl {
            self.set_acl(&acl).await?;
        }
        Ok(())
    }

    /// Check the session user's permission for `privilege` on `resource`.
    ///
    /// A resource unknown to the graph is re-evaluated at the root. Any
    /// other evaluation failure denies.
    pub async fn is_allowed(&self, resource: &str, privilege: Option<&str>) -> BastionResult<bool> {
        let (Some(user), Some(acl)) = (self.user().await?, self.acl().await?) else {
            return Ok(false);
        };
        let role = user.acl_role.as_str();

        let decision = match acl.is_allowed(role, Some(resource), privilege) {
            AclDecision::ResourceNotFound => {
                debug!(resource, "Unknown ACL resource, evaluating at root");
                acl.is_allowed(role, None, privilege)
            }
            decision => decision,
        };

        match decision {
            AclDecision::Allowed | AclDecision::Denied => Ok(decision.is_allowed()),
            failure => {
                warn!(
                    role,
                    resource,
                    privilege = ?privilege,
                    ?failure,
                    "ACL evaluation failed, denying access"
                );
                Ok(false)
            }
        }
    }

    async fn build_acl(&self) -> BastionResult<Acl> {
        let acl = self.acl_builder.build_acl().await?;
        debug!(
            roles = acl.roles().count(),
            rules = acl.rules().len(),
            "Rebuilt ACL snapshot"
        );
        Ok(acl)
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    /// Whether the session holds a live admin identity.
    ///
    /// Fails once the idle lifetime has passed since the last recorded
    /// activity; lifetimes under [`MIN_SESSION_LIFETIME_SECS`] never time
    /// out. A successful check slides the activity stamp to now.
    pub async fn is_logged_in(&self) -> BastionResult<bool> {
        let lifetime = self.config.session_lifetime_secs();
        let now = self.now();
        let updated_at = self.updated_at().await?.unwrap_or(0);

        if lifetime >= MIN_SESSION_LIFETIME_SECS && updated_at < now - lifetime {
            debug!(
                updated_at,
                now,
                lifetime,
                "Admin session idle timeout exceeded"
            );
            return Ok(false);
        }

        match self.user().await? {
            Some(user) if user.has_id() => {
                self.set_updated_at(updated_at.max(now)).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Whether this is the first request after a login.
    ///
    /// The persisted flag is consumed on the first read and cached on the
    /// guard from then on.
    pub async fn is_first_page_after_login(&mut self) -> BastionResult<bool> {
        if let Some(flag) = self.is_first_after_login {
            return Ok(flag);
        }
        let flag = match self.store.take(IS_FIRST_VISIT_KEY).await? {
            Some(value) => serde_json::from_value::<Option<bool>>(value)?.unwrap_or(false),
            None => false,
        };
        self.is_first_after_login = Some(flag);
        Ok(flag)
    }

    pub async fn set_is_first_page_after_login(&mut self, value: bool) -> BastionResult<()> {
        self.is_first_after_login = Some(value);
        self.write(IS_FIRST_VISIT_KEY, &value).await
    }

    /// Prepare the session after the identity has been stored in it.
    ///
    /// Does nothing without a user. Otherwise regenerates the session id,
    /// renews URL secret keys when they are in use, flags the next page as
    /// the first after login, rebuilds the ACL unconditionally, and stamps
    /// the activity time.
    pub async fn process_login(&mut self) -> BastionResult<()> {
        let Some(user) = self.user().await? else {
            return Ok(());
        };

        self.store.regenerate_id().await?;

        if self.urls.uses_secret_key() {
            self.urls.renew_secret_urls().await?;
        }

        self.set_is_first_page_after_login(true).await?;
        let acl = self.build_acl().await?;
        self.set_acl(&acl).await?;
        let now = self.now();
        self.set_updated_at(now).await?;

        info!(user_id = %user.id, username = %user.username, "Admin login processed");
        Ok(())
    }

    /// Destroy the whole session record.
    pub async fn process_logout(&mut self) -> BastionResult<()> {
        let session_id = self.store.session_id().await?;
        self.store.destroy().await?;
        self.is_first_after_login = None;
        info!(%session_id, "Admin session destroyed");
        Ok(())
    }

    /// Admin sessions are exempt from path-based validation.
    pub fn is_valid_for_path(&self, _path: &str) -> bool {
        true
    }
}
