//! Credential primitives for the account service
//!
//! - Password hashing (Argon2id, tunable cost)
//! - Access token issuing and verification (HS256 JWT)
//! - `Authenticator`, which combines the two for registration and login
//!
//! Services depend on this crate for the cryptography and keep their own
//! domain types, storage and error taxonomy.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! assert!(!hasher.verify("not_my_password", &hash).unwrap());
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{TokenIssuer, TokenSettings};
//!
//! let issuer = TokenIssuer::new(TokenSettings::new(b"secret_key_at_least_32_bytes_long!"));
//! let token = issuer.issue_for("user123").unwrap();
//! assert_eq!(issuer.verify(&token).unwrap().sub, "user123");
//! ```
//!
//! ## Login
//! ```
//! use auth::{Authenticator, HashingParams, TokenSettings};
//!
//! let auth = Authenticator::new(
//!     HashingParams::default(),
//!     TokenSettings::new(b"secret_key_at_least_32_bytes_long!"),
//! )
//! .unwrap();
//!
//! let hash = auth.hash_password("password123").unwrap();
//! let token = auth.authenticate("password123", &hash, "user123").unwrap();
//! assert_eq!(auth.validate_token(&token).unwrap().sub, "user123");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::TokenError;
pub use jwt::TokenIssuer;
pub use jwt::TokenSettings;
pub use password::HashingParams;
pub use password::PasswordError;
pub use password::PasswordHasher;
