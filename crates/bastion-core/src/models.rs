//! Domain models for Bastion.
//!
//! These are the core types shared across all crates.

pub mod acl;
pub mod admin_user;
pub mod session;
