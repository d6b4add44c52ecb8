use crate::jwt::Claims;
use crate::jwt::TokenError;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenSettings;
use crate::password::HashingParams;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Plaintext behind the decoy digest. Never matches a real account because
/// the decoy digest is not stored anywhere.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Credential coordinator combining password hashing and token issuing.
///
/// Services hold one of these for the lifetime of the process. It carries no
/// mutable state, so it can be shared behind an `Arc` across request tasks.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
    decoy_hash: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// Hashes the decoy password once with `hashing` so that
    /// [`Authenticator::burn_verification`] costs the same as a real check.
    ///
    /// # Arguments
    /// * `hashing` - Argon2 cost parameters for new digests
    /// * `tokens` - Signing secret and expiry policy
    ///
    /// # Errors
    /// * `InvalidParams` - Hashing parameters rejected by Argon2
    /// * `HashingFailed` - Decoy digest could not be produced
    pub fn new(hashing: HashingParams, tokens: TokenSettings) -> Result<Self, PasswordError> {
        let password_hasher = PasswordHasher::with_params(hashing)?;
        let decoy_hash = password_hasher.hash(DECOY_PASSWORD)?;

        Ok(Self {
            password_hasher,
            token_issuer: TokenIssuer::new(tokens),
            decoy_hash,
        })
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Spend one full verification on a decoy digest.
    ///
    /// Called when a login names an account that does not exist, so the
    /// response time does not reveal whether the email is registered.
    pub fn burn_verification(&self, password: &str) {
        let _ = self.password_hasher.verify(password, &self.decoy_hash);
    }

    /// Verify credentials and issue a token for `subject`.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password digest
    /// * `subject` - Identifier written to the token's `sub` claim
    ///
    /// # Returns
    /// Signed access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `Password` - Stored digest is unusable
    /// * `Token` - Token signing failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: impl ToString,
    ) -> Result<String, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.token_issuer.issue_for(subject)?)
    }

    /// Issue a token for `subject` without checking a password.
    ///
    /// Used right after registration, when the caller has just proven
    /// knowledge of the password by choosing it.
    pub fn issue_token(&self, subject: impl ToString) -> Result<String, TokenError> {
        self.token_issuer.issue_for(subject)
    }

    /// Verify and decode a token issued by this authenticator.
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.token_issuer.verify(token)
    }
}
