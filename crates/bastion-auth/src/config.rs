//! Authentication configuration.

/// Lifetimes below this many seconds disable the idle timeout.
pub const MIN_SESSION_LIFETIME_SECS: i64 = 60;

/// Source of the settings the session guard reads on every request.
pub trait ConfigProvider: Send + Sync {
    /// Admin session idle lifetime in seconds.
    fn session_lifetime_secs(&self) -> i64;
}

/// Configuration for the authentication service and session guard.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Idle lifetime of an admin session in seconds (default: 900 = 15 minutes).
    /// Values under [`MIN_SESSION_LIFETIME_SECS`] disable the timeout.
    pub session_lifetime_secs: i64,
    /// Optional pepper prepended to passwords before Argon2id verification.
    pub pepper: Option<String>,
    /// Minimum password length for policy enforcement.
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_lifetime_secs: 900,
            pepper: None,
            min_password_length: 12,
        }
    }
}

impl ConfigProvider for AuthConfig {
    fn session_lifetime_secs(&self) -> i64 {
        self.session_lifetime_secs
    }
}
