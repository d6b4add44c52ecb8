use async_trait::async_trait;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::PublicUser;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::AuthError;
use crate::user::errors::UserError;

/// Port for the registration and login flow.
///
/// Every value returned through this port is sanitized: no password digest
/// ever leaves it.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new account and sign a token for it.
    ///
    /// # Arguments
    /// * `command` - Validated name, email and password
    ///
    /// # Returns
    /// Sanitized user and access token
    ///
    /// # Errors
    /// * `InvalidRequest` - Email is already registered
    /// * `InternalFailure` - Hashing, storage or signing failed
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError>;

    /// Create an account without signing a token.
    ///
    /// # Errors
    /// * `InvalidRequest` - Email is already registered
    /// * `InternalFailure` - Hashing or storage failed
    async fn create_user(&self, command: RegisterCommand) -> Result<PublicUser, AuthError>;

    /// Check credentials and sign a token.
    ///
    /// # Arguments
    /// * `command` - Email and plaintext password
    ///
    /// # Returns
    /// Sanitized user and access token
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown email or wrong password (indistinguishable to the caller)
    /// * `InternalFailure` - Storage, hashing or signing failed
    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError>;

    /// Retrieve a sanitized user by identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `InternalFailure` - Storage failed
    async fn find_user_by_id(&self, id: &UserId) -> Result<PublicUser, AuthError>;

    /// Retrieve every user, sanitized.
    ///
    /// # Errors
    /// * `InternalFailure` - Storage failed
    async fn list_all(&self) -> Result<Vec<PublicUser>, AuthError>;

    /// Update a profile. Always fails with `NotImplemented`.
    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<PublicUser, AuthError>;

    /// Remove an account. Always fails with `NotImplemented`.
    async fn remove_user(&self, id: &UserId) -> Result<(), AuthError>;

    /// Look a user up by numeric position. Always fails with `NotImplemented`.
    async fn find_one(&self, ordinal: u64) -> Result<PublicUser, AuthError>;
}

/// Persistence operations for the user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// Either the whole record is stored or nothing is.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email (compared case-insensitively) is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address, ignoring case.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Retrieve all users, newest first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_all(&self) -> Result<Vec<User>, UserError>;
}
