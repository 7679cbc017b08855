//! Bastion Store — in-memory implementations of the session store,
//! admin user repository, and ACL builder.
//!
//! This crate provides:
//! - Shared session records ([`MemorySessionBackend`]) with
//!   request-scoped handles ([`MemorySessionStore`])
//! - Admin user storage with Argon2id hashing ([`MemoryAdminUserRepository`])
//! - A template-based ACL source ([`MemoryAclBuilder`])

mod acl;
mod session;
mod user;

pub use acl::MemoryAclBuilder;
pub use session::{MemorySessionBackend, MemorySessionStore};
pub use user::{MemoryAdminUserRepository, hash_password};
