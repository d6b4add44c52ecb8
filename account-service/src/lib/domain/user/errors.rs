use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for DisplayName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisplayNameError {
    #[error("Name must not be empty")]
    Empty,

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for registration password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// Storage-level error for user persistence.
///
/// Raised by `UserRepository` adapters. Never crosses the service boundary:
/// `AuthService` translates it into an [`AuthError`].
#[derive(Debug, Clone, Error)]
pub enum UserError {
    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Stored user record is invalid: {0}")]
    InvalidRecord(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<EmailError> for UserError {
    fn from(err: EmailError) -> Self {
        UserError::InvalidRecord(err.to_string())
    }
}

impl From<DisplayNameError> for UserError {
    fn from(err: DisplayNameError) -> Self {
        UserError::InvalidRecord(err.to_string())
    }
}

/// Why a login was refused.
///
/// Written to logs only. Callers always see the same `Unauthorized` message
/// whichever of these occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    UnknownEmail,
    WrongPassword,
}

impl LoginFailure {
    pub fn code(&self) -> &'static str {
        match self {
            LoginFailure::UnknownEmail => "unknown_email",
            LoginFailure::WrongPassword => "wrong_password",
        }
    }
}

/// Error taxonomy exposed by the account service.
///
/// Messages are safe to show to callers; storage and crypto details are
/// logged where they occur and replaced by `InternalFailure`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("invalid credentials")]
    Unauthorized(LoginFailure),

    #[error("user {0} not found")]
    NotFound(String),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("internal server error")]
    InternalFailure,
}
