//! In-memory implementation of [`AdminUserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher};
use bastion_core::error::{BastionError, BastionResult};
use bastion_core::models::admin_user::{AdminUser, CreateAdminUser, UpdateAdminUser, UserStatus};
use bastion_core::repository::AdminUserRepository;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing.
pub fn hash_password(password: &str, pepper: Option<&str>) -> BastionResult<String> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| BastionError::Crypto(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(input, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BastionError::Crypto(format!("argon2 hash error: {e}")))
}

/// In-memory admin user repository.
#[derive(Clone, Default)]
pub struct MemoryAdminUserRepository {
    users: Arc<RwLock<HashMap<Uuid, AdminUser>>>,
    pepper: Option<String>,
}

impl MemoryAdminUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pepper(pepper: impl Into<String>) -> Self {
        Self {
            users: Arc::default(),
            pepper: Some(pepper.into()),
        }
    }

    /// Create an active admin user. Usernames are unique.
    pub fn create(&self, input: CreateAdminUser) -> BastionResult<AdminUser> {
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;
        let now = Utc::now();
        let user = AdminUser {
            id: Uuid::new_v4(),
            username: input.username,
            email: input.email,
            password_hash,
            password: None,
            acl_role: input.acl_role,
            status: UserStatus::Active,
            reload_acl_flag: false,
            created_at: now,
            updated_at: now,
        };

        let mut users = self.users.write();
        if users.values().any(|u| u.username == user.username) {
            return Err(BastionError::AlreadyExists {
                entity: "admin_user".into(),
            });
        }
        users.insert(user.id, user.clone());
        info!(user_id = %user.id, username = %user.username, "Created admin user");
        Ok(user)
    }

    /// Apply a partial update. A role change flags the user for an ACL
    /// reload on their next request.
    pub fn update(&self, id: Uuid, input: UpdateAdminUser) -> BastionResult<AdminUser> {
        let password_hash = input
            .password
            .as_deref()
            .map(|p| hash_password(p, self.pepper.as_deref()))
            .transpose()?;

        let mut users = self.users.write();
        let user = users.get_mut(&id).ok_or_else(|| not_found(id))?;
        if let Some(email) = input.email {
            user.email = email;
        }
        if let Some(status) = input.status {
            user.status = status;
        }
        if let Some(role) = input.acl_role {
            if role != user.acl_role {
                user.acl_role = role;
                user.reload_acl_flag = true;
            }
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    pub fn delete(&self, id: Uuid) -> BastionResult<()> {
        self.users
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: impl ToString) -> BastionError {
    BastionError::NotFound {
        entity: "admin_user".into(),
        id: id.to_string(),
    }
}

impl AdminUserRepository for MemoryAdminUserRepository {
    async fn get_by_id(&self, id: Uuid) -> BastionResult<AdminUser> {
        self.users.read().get(&id).cloned().ok_or_else(|| not_found(id))
    }

    async fn get_by_username(&self, username: &str) -> BastionResult<AdminUser> {
        self.users
            .read()
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| not_found(format!("username={username}")))
    }

    async fn save(&self, user: &AdminUser) -> BastionResult<AdminUser> {
        let mut saved = user.clone();
        if let Some(password) = saved.password.take() {
            saved.password_hash = hash_password(&password, self.pepper.as_deref())?;
        }
        saved.updated_at = Utc::now();

        let mut users = self.users.write();
        if !users.contains_key(&saved.id) {
            return Err(not_found(saved.id));
        }
        users.insert(saved.id, saved.clone());
        Ok(saved)
    }
}
