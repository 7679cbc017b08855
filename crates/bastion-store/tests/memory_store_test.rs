//! Integration tests for the in-memory collaborators.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use bastion_core::error::BastionError;
use bastion_core::models::acl::Acl;
use bastion_core::models::admin_user::{CreateAdminUser, UpdateAdminUser, UserStatus};
use bastion_core::repository::{AclBuilder, AdminUserRepository, SessionStore};
use bastion_store::{MemoryAclBuilder, MemoryAdminUserRepository, MemorySessionBackend};
use serde_json::json;

fn alice() -> CreateAdminUser {
    CreateAdminUser {
        username: "alice".into(),
        email: "alice@example.com".into(),
        password: "correct-horse-battery".into(),
        acl_role: "editor".into(),
    }
}

fn matches_hash(password: &str, hash: &str) -> bool {
    let parsed = PasswordHash::new(hash).unwrap();
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn handles_share_a_record_by_id() {
    let backend = MemorySessionBackend::new();
    let first = backend.open(None);
    first.set("user", json!({"name": "alice"})).await.unwrap();

    let id = first.session_id().await.unwrap();
    let second = backend.open(Some(&id));
    assert_eq!(second.session_id().await.unwrap(), id);
    assert_eq!(
        second.get("user").await.unwrap(),
        Some(json!({"name": "alice"}))
    );
}

#[tokio::test]
async fn take_reads_once() {
    let backend = MemorySessionBackend::new();
    let store = backend.open(None);
    store.set("is_first_visit", json!(true)).await.unwrap();

    assert_eq!(store.take("is_first_visit").await.unwrap(), Some(json!(true)));
    assert_eq!(store.take("is_first_visit").await.unwrap(), None);
    assert_eq!(store.get("is_first_visit").await.unwrap(), None);
}

#[tokio::test]
async fn regenerate_id_moves_the_record() {
    let backend = MemorySessionBackend::new();
    let store = backend.open(None);
    store.set("updated_at", json!(42)).await.unwrap();
    let old_id = store.session_id().await.unwrap();

    store.regenerate_id().await.unwrap();

    let new_id = store.session_id().await.unwrap();
    assert_ne!(old_id, new_id);
    assert!(!backend.contains(&old_id));
    assert!(backend.contains(&new_id));
    assert_eq!(store.get("updated_at").await.unwrap(), Some(json!(42)));
}

#[tokio::test]
async fn destroy_removes_every_field() {
    let backend = MemorySessionBackend::new();
    let store = backend.open(None);
    store.set("user", json!("alice")).await.unwrap();
    store.set("acl", json!({})).await.unwrap();

    store.destroy().await.unwrap();

    assert!(backend.is_empty());
    assert_eq!(store.get("user").await.unwrap(), None);
    assert_eq!(store.get("acl").await.unwrap(), None);
}

#[tokio::test]
async fn destroy_retires_the_session_id() {
    let backend = MemorySessionBackend::new();
    let store = backend.open(None);
    store.set("user", json!("alice")).await.unwrap();
    let old_id = store.session_id().await.unwrap();

    store.destroy().await.unwrap();
    store.set("updated_at", json!(42)).await.unwrap();

    let new_id = store.session_id().await.unwrap();
    assert_ne!(new_id, old_id);
    assert!(!backend.contains(&old_id));
    assert!(backend.contains(&new_id));
    assert_eq!(store.get("user").await.unwrap(), None);
}

// ---------------------------------------------------------------------------
// Admin users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_hashes_password_and_activates() {
    let repo = MemoryAdminUserRepository::new();
    let user = repo.create(alice()).unwrap();

    assert_eq!(user.status, UserStatus::Active);
    assert!(user.has_id());
    assert!(user.password_hash.starts_with("$argon2id$"));
    assert!(matches_hash("correct-horse-battery", &user.password_hash));

    let fetched = repo.get_by_username("alice").await.unwrap();
    assert_eq!(fetched.id, user.id);
}

#[tokio::test]
async fn duplicate_username_rejected() {
    let repo = MemoryAdminUserRepository::new();
    repo.create(alice()).unwrap();
    let err = repo.create(alice()).unwrap_err();
    assert!(matches!(err, BastionError::AlreadyExists { .. }));
}

#[tokio::test]
async fn pepper_is_prepended_before_hashing() {
    let repo = MemoryAdminUserRepository::with_pepper("pepper!");
    let user = repo.create(alice()).unwrap();
    assert!(matches_hash("pepper!correct-horse-battery", &user.password_hash));
    assert!(!matches_hash("correct-horse-battery", &user.password_hash));
}

#[tokio::test]
async fn role_change_flags_acl_reload() {
    let repo = MemoryAdminUserRepository::new();
    let user = repo.create(alice()).unwrap();

    let same_role = repo
        .update(
            user.id,
            UpdateAdminUser {
                acl_role: Some("editor".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(!same_role.reload_acl_flag);

    let updated = repo
        .update(
            user.id,
            UpdateAdminUser {
                acl_role: Some("admin".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.acl_role, "admin");
    assert!(updated.reload_acl_flag);
}

#[tokio::test]
async fn save_hashes_pending_password() {
    let repo = MemoryAdminUserRepository::new();
    let mut user = repo.create(alice()).unwrap();
    user.password = Some("a-brand-new-secret".into());

    let saved = repo.save(&user).await.unwrap();

    assert!(saved.password.is_none());
    assert!(matches_hash("a-brand-new-secret", &saved.password_hash));
    let stored = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(stored.password_hash, saved.password_hash);
}

#[tokio::test]
async fn save_unknown_user_fails() {
    let repo = MemoryAdminUserRepository::new();
    let user = repo.create(alice()).unwrap();
    repo.delete(user.id).unwrap();

    let err = repo.save(&user).await.unwrap_err();
    assert!(matches!(err, BastionError::NotFound { .. }));
    assert!(repo.get_by_id(user.id).await.is_err());
}

// ---------------------------------------------------------------------------
// ACL builder
// ---------------------------------------------------------------------------

#[tokio::test]
async fn builder_snapshots_are_independent_of_later_updates() {
    let mut template = Acl::new();
    template.add_role("editor", &[]).unwrap();
    template.add_resource("catalog", None).unwrap();
    let builder = MemoryAclBuilder::new(template);

    let before = builder.build_acl().await.unwrap();
    builder
        .update(|acl| acl.allow("editor", Some("catalog"), None).map(|_| ()))
        .unwrap();
    let after = builder.build_acl().await.unwrap();

    assert!(before.rules().is_empty());
    assert_eq!(after.rules().len(), 1);
    assert_eq!(builder.build_count(), 2);
}
