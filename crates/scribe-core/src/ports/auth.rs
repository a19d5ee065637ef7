//! Authentication ports.

use uuid::Uuid;

/// What a token is good for. Session tokens authenticate API calls;
/// activation and password-reset tokens are single-purpose and emailed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    Session,
    Activation,
    PasswordReset,
}

impl TokenScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Session => "session",
            TokenScope::Activation => "activation",
            TokenScope::PasswordReset => "password_reset",
        }
    }
}

/// Claims carried by a validated token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub username: String,
    pub scope: TokenScope,
    pub exp: i64,
}

/// Token service trait for issuing and verifying signed tokens.
pub trait TokenService: Send + Sync {
    /// Issue a token for a user in the given scope.
    fn issue(
        &self,
        user_id: Uuid,
        username: &str,
        scope: TokenScope,
    ) -> Result<String, AuthError>;

    /// Verify a token and check it was issued for the expected scope.
    fn verify(&self, token: &str, scope: TokenScope) -> Result<TokenClaims, AuthError>;

    /// Lifetime of a session token, in seconds.
    fn session_lifetime_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
