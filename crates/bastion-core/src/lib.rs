//! Bastion Core — domain models, error types, and the collaborator
//! traits the admin session guard is composed from.

pub mod error;
pub mod models;
pub mod repository;
