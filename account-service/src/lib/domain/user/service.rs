use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::Password;
use crate::domain::user::models::PublicUser;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::AuthError;
use crate::user::errors::LoginFailure;
use crate::user::errors::UserError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::UserRepository;

/// Registration and login flow over a user store.
///
/// Argon2 work is moved onto tokio's blocking pool so request tasks keep
/// making progress while a password is being hashed or checked.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hasher and token issuer
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn run_blocking<F, T>(&self, job: F) -> Result<T, AuthError>
    where
        F: FnOnce(&Authenticator) -> T + Send + 'static,
        T: Send + 'static,
    {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || job(&authenticator))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Credential task did not complete");
                AuthError::InternalFailure
            })
    }

    async fn hash_password(&self, password: Password) -> Result<String, AuthError> {
        self.run_blocking(move |authenticator| authenticator.hash_password(password.expose()))
            .await?
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                AuthError::InternalFailure
            })
    }

    /// Hash the password and store the account.
    async fn persist(&self, command: RegisterCommand) -> Result<User, AuthError> {
        let RegisterCommand {
            name,
            email,
            password,
        } = command;

        let password_hash = self.hash_password(password).await?;
        let user = User::register(name, email, password_hash);

        self.repository.create(user).await.map_err(|e| match e {
            UserError::EmailAlreadyExists(email) => {
                tracing::warn!(email = %email, "Registration rejected: email already exists");
                AuthError::InvalidRequest(format!("{} already exists", email))
            }
            other => storage_failure(other),
        })
    }

    fn start_session(&self, user: &User) -> Result<AuthSession, AuthError> {
        let token = self.authenticator.issue_token(user.id).map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "Token signing failed");
            AuthError::InternalFailure
        })?;

        Ok(AuthSession {
            user: user.into(),
            token,
        })
    }
}

fn storage_failure(err: UserError) -> AuthError {
    tracing::error!(error = %err, "User store operation failed");
    AuthError::InternalFailure
}

fn reject_login(failure: LoginFailure) -> AuthError {
    tracing::warn!(reason = failure.code(), "Login rejected");
    AuthError::Unauthorized(failure)
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError> {
        let user = self.persist(command).await?;
        let session = self.start_session(&user)?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(session)
    }

    async fn create_user(&self, command: RegisterCommand) -> Result<PublicUser, AuthError> {
        let user = self.persist(command).await?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(PublicUser::from(user))
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError> {
        let LoginCommand { email, password } = command;

        let Some(user) = self
            .repository
            .find_by_email(&email)
            .await
            .map_err(storage_failure)?
        else {
            self.run_blocking(move |authenticator| authenticator.burn_verification(&password))
                .await?;
            return Err(reject_login(LoginFailure::UnknownEmail));
        };

        let stored_hash = user.password_hash.clone();
        let subject = user.id;
        let token = self
            .run_blocking(move |authenticator| {
                authenticator.authenticate(&password, &stored_hash, subject)
            })
            .await?
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    reject_login(LoginFailure::WrongPassword)
                }
                AuthenticationError::Password(e) => {
                    tracing::error!(
                        user_id = %subject,
                        error = %e,
                        "Stored password digest is unusable"
                    );
                    AuthError::InternalFailure
                }
                AuthenticationError::Token(e) => {
                    tracing::error!(user_id = %subject, error = %e, "Token signing failed");
                    AuthError::InternalFailure
                }
            })?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(AuthSession {
            user: PublicUser::from(&user),
            token,
        })
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<PublicUser, AuthError> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(storage_failure)?
            .map(PublicUser::from)
            .ok_or_else(|| AuthError::NotFound(id.to_string()))
    }

    async fn list_all(&self) -> Result<Vec<PublicUser>, AuthError> {
        let users = self.repository.list_all().await.map_err(storage_failure)?;
        Ok(users.iter().map(PublicUser::from).collect())
    }

    async fn update_user(
        &self,
        _id: &UserId,
        _command: UpdateUserCommand,
    ) -> Result<PublicUser, AuthError> {
        Err(AuthError::NotImplemented("update user"))
    }

    async fn remove_user(&self, _id: &UserId) -> Result<(), AuthError> {
        Err(AuthError::NotImplemented("remove user"))
    }

    async fn find_one(&self, _ordinal: u64) -> Result<PublicUser, AuthError> {
        Err(AuthError::NotImplemented("find user by ordinal"))
    }
}

#[cfg(test)]
mod tests {
    use auth::HashingParams;
    use auth::TokenSettings;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::DisplayName;
    use crate::domain::user::models::EmailAddress;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
        }
    }

    fn test_authenticator() -> Arc<Authenticator> {
        Arc::new(
            Authenticator::new(
                HashingParams {
                    memory_kib: 1024,
                    iterations: 1,
                    parallelism: 1,
                },
                TokenSettings::new(b"test-secret-key-for-jwt-signing-at-least-32-bytes"),
            )
            .expect("Failed to build authenticator"),
        )
    }

    fn register_command(email: &str, password: &str) -> RegisterCommand {
        RegisterCommand::new(
            DisplayName::new("A".to_string()).unwrap(),
            EmailAddress::new(email.to_string()).unwrap(),
            Password::new(password.to_string()).unwrap(),
        )
    }

    fn stored_user(authenticator: &Authenticator, email: &str, password: &str) -> User {
        User::register(
            DisplayName::new("A".to_string()).unwrap(),
            EmailAddress::new(email.to_string()).unwrap(),
            authenticator.hash_password(password).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .withf(|user| {
                user.email.as_str() == "a@x.com"
                    && user.name.as_str() == "A"
                    && user.password_hash.starts_with("$argon2id$")
                    && user.is_active
                    && user.roles.contains("user")
            })
            .times(1)
            .returning(|user| Ok(user));

        let authenticator = test_authenticator();
        let service = AuthService::new(Arc::new(repository), Arc::clone(&authenticator));

        let session = service
            .register(register_command("a@x.com", "secret1"))
            .await
            .expect("Registration failed");

        assert_eq!(session.user.email, "a@x.com");
        assert_eq!(session.user.roles, vec!["user".to_string()]);

        let claims = authenticator.validate_token(&session.token).unwrap();
        assert_eq!(claims.sub, session.user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_create().times(1).returning(|user| {
            Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()))
        });

        let service = AuthService::new(Arc::new(repository), test_authenticator());

        let result = service.register(register_command("a@x.com", "secret1")).await;
        assert_eq!(
            result.unwrap_err(),
            AuthError::InvalidRequest("a@x.com already exists".to_string())
        );
    }

    #[tokio::test]
    async fn test_register_storage_failure_is_opaque() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection reset".to_string())));

        let service = AuthService::new(Arc::new(repository), test_authenticator());

        let error = service
            .register(register_command("a@x.com", "secret1"))
            .await
            .unwrap_err();

        assert_eq!(error, AuthError::InternalFailure);
        assert!(!error.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_create_user_returns_sanitized_user() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_create().times(1).returning(|user| Ok(user));

        let service = AuthService::new(Arc::new(repository), test_authenticator());

        let user = service
            .create_user(register_command("a@x.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(user.name, "A");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut repository = MockTestUserRepository::new();
        let authenticator = test_authenticator();

        let user = stored_user(&authenticator, "a@x.com", "secret1");
        let user_id = user.id;
        repository
            .expect_find_by_email()
            .withf(|email| email.as_str() == "a@x.com")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = AuthService::new(Arc::new(repository), Arc::clone(&authenticator));

        let session = service
            .login(LoginCommand {
                email: EmailAddress::new("a@x.com".to_string()).unwrap(),
                password: "secret1".to_string(),
            })
            .await
            .expect("Login failed");

        assert_eq!(session.user.id, user_id.to_string());
        let claims = authenticator.validate_token(&session.token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_look_alike() {
        let authenticator = test_authenticator();

        let mut known = MockTestUserRepository::new();
        let user = stored_user(&authenticator, "a@x.com", "secret1");
        known
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let mut unknown = MockTestUserRepository::new();
        unknown.expect_find_by_email().returning(|_| Ok(None));

        let wrong_password = AuthService::new(Arc::new(known), Arc::clone(&authenticator))
            .login(LoginCommand {
                email: EmailAddress::new("a@x.com".to_string()).unwrap(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();

        let unknown_email = AuthService::new(Arc::new(unknown), Arc::clone(&authenticator))
            .login(LoginCommand {
                email: EmailAddress::new("b@x.com".to_string()).unwrap(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(
            wrong_password,
            AuthError::Unauthorized(LoginFailure::WrongPassword)
        );
        assert_eq!(
            unknown_email,
            AuthError::Unauthorized(LoginFailure::UnknownEmail)
        );
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_login_with_corrupt_digest_is_internal_failure() {
        let mut repository = MockTestUserRepository::new();
        let mut user = stored_user(&test_authenticator(), "a@x.com", "secret1");
        user.password_hash = "not-a-digest".to_string();

        repository
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let service = AuthService::new(Arc::new(repository), test_authenticator());

        let result = service
            .login(LoginCommand {
                email: EmailAddress::new("a@x.com".to_string()).unwrap(),
                password: "secret1".to_string(),
            })
            .await;

        assert_eq!(result.unwrap_err(), AuthError::InternalFailure);
    }

    #[tokio::test]
    async fn test_find_user_by_id_success() {
        let mut repository = MockTestUserRepository::new();

        let user = stored_user(&test_authenticator(), "a@x.com", "secret1");
        let user_id = user.id;
        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = AuthService::new(Arc::new(repository), test_authenticator());

        let found = service.find_user_by_id(&user_id).await.unwrap();
        assert_eq!(found.id, user_id.to_string());
        assert_eq!(found.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_find_user_by_id_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = AuthService::new(Arc::new(repository), test_authenticator());

        let missing = UserId::new();
        let result = service.find_user_by_id(&missing).await;

        assert_eq!(result.unwrap_err(), AuthError::NotFound(missing.to_string()));
    }

    #[tokio::test]
    async fn test_list_all_is_sanitized() {
        let mut repository = MockTestUserRepository::new();
        let authenticator = test_authenticator();

        let users = vec![
            stored_user(&authenticator, "a@x.com", "secret1"),
            stored_user(&authenticator, "b@x.com", "secret2"),
        ];
        repository
            .expect_list_all()
            .times(1)
            .returning(move || Ok(users.clone()));

        let service = AuthService::new(Arc::new(repository), authenticator);

        let listed = service.list_all().await.unwrap();
        assert_eq!(listed.len(), 2);

        let json = serde_json::to_string(&listed).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }

    #[tokio::test]
    async fn test_unsupported_operations_fail_explicitly() {
        let repository = MockTestUserRepository::new();
        let service = AuthService::new(Arc::new(repository), test_authenticator());
        let id = UserId::new();

        assert_eq!(
            service
                .update_user(&id, UpdateUserCommand::default())
                .await
                .unwrap_err(),
            AuthError::NotImplemented("update user")
        );
        assert_eq!(
            service.remove_user(&id).await.unwrap_err(),
            AuthError::NotImplemented("remove user")
        );
        assert_eq!(
            service.find_one(1).await.unwrap_err(),
            AuthError::NotImplemented("find user by ordinal")
        );
    }
}
