//! Admin authentication service: credential checks and the login/logout
//! transitions of the session guard.

use bastion_core::error::{BastionError, BastionResult};
use bastion_core::models::admin_user::{AdminUser, UserStatus};
use bastion_core::repository::{AclBuilder, AdminUserRepository, SessionStore, UrlService};
use tracing::warn;
use uuid::Uuid;

use crate::config::{AuthConfig, ConfigProvider};
use crate::error::AuthError;
use crate::password;
use crate::session::AdminSession;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on any storage crate.
pub struct AdminAuthService<R: AdminUserRepository> {
    users: R,
    config: AuthConfig,
}

impl<R: AdminUserRepository> AdminAuthService<R> {
    pub fn new(users: R, config: AuthConfig) -> Self {
        Self { users, config }
    }

    /// Verify username + password and the account status.
    pub async fn authenticate(&self, input: &LoginInput) -> BastionResult<AdminUser> {
        // 1. Look up user; an unknown name is indistinguishable from a bad password.
        let user = self
            .users
            .get_by_username(&input.username)
            .await
            .map_err(|e| match e {
                BastionError::NotFound { .. } => AuthError::InvalidCredentials.into(),
                other => other,
            })?;

        // 2. Verify password.
        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            warn!(username = %input.username, "Admin login rejected: bad password");
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Check account status.
        match user.status {
            UserStatus::Active => Ok(user),
            UserStatus::Locked => Err(AuthError::AccountLocked.into()),
            UserStatus::Inactive => Err(AuthError::AccountInactive.into()),
        }
    }

    /// Authenticate and bind the identity to `session`.
    ///
    /// On failure the session is left untouched.
    pub async fn login<S, A, U, UR, C>(
        &self,
        session: &mut AdminSession<S, A, U, UR, C>,
        input: LoginInput,
    ) -> BastionResult<AdminUser>
    where
        S: SessionStore,
        A: AclBuilder,
        U: UrlService,
        UR: AdminUserRepository,
        C: ConfigProvider,
    {
        let user = self.authenticate(&input).await?;
        session.set_user(&user).await?;
        session.process_login().await?;
        Ok(user)
    }

    /// End the admin session.
    pub async fn logout<S, A, U, UR, C>(
        &self,
        session: &mut AdminSession<S, A, U, UR, C>,
    ) -> BastionResult<()>
    where
        S: SessionStore,
        A: AclBuilder,
        U: UrlService,
        UR: AdminUserRepository,
        C: ConfigProvider,
    {
        session.process_logout().await
    }

    /// Set a new password; the repository hashes it on save.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        new_password: &str,
    ) -> BastionResult<AdminUser> {
        password::check_password_policy(new_password, self.config.min_password_length)?;
        let mut user = self.users.get_by_id(user_id).await?;
        user.password = Some(new_password.to_string());
        self.users.save(&user).await
    }
}
