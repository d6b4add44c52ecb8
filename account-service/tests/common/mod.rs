use std::sync::Arc;

use account_service::domain::user::service::AuthService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::InMemoryUserRepository;
use auth::Authenticator;
use auth::HashingParams;
use auth::TokenIssuer;
use auth::TokenSettings;
use serde_json::json;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server over the in-memory store
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub token_issuer: TokenIssuer,
    pub repository: InMemoryUserRepository,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let token_settings = TokenSettings::new(TEST_SECRET)
            .with_ttl(chrono::Duration::hours(6))
            .with_issuer("account-service");

        // Cheap hashing keeps the suite fast
        let hashing = HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        let authenticator = Arc::new(
            Authenticator::new(hashing, token_settings.clone())
                .expect("Failed to create authenticator"),
        );

        let repository = InMemoryUserRepository::new();
        let auth_service = Arc::new(AuthService::new(
            Arc::new(repository.clone()),
            Arc::clone(&authenticator),
        ));

        let router = create_router(auth_service, authenticator);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            token_issuer: TokenIssuer::new(token_settings),
            repository,
        }
    }

    /// Register an account and return the response body
    pub async fn register(&self, email: &str, password: &str, name: &str) -> serde_json::Value {
        let response = self
            .post("/api/auth/register")
            .json(&json!({ "email": email, "password": password, "name": name }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }
}
