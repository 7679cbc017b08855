//! Bastion Auth — the admin session guard, ACL refresh, and password
//! authentication for back-office users.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod session;

pub use config::{AuthConfig, ConfigProvider};
pub use error::AuthError;
pub use service::{AdminAuthService, LoginInput};
pub use session::AdminSession;
