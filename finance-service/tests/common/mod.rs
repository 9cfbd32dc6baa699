use std::sync::Arc;

use auth::Authenticator;
use chrono::Duration;
use chrono::Utc;
use finance_service::domain::principal::models::EmailAddress;
use finance_service::domain::principal::models::Identifier;
use finance_service::domain::principal::models::Principal;
use finance_service::domain::principal::models::PrincipalId;
use finance_service::domain::principal::models::Role;
use finance_service::domain::principal::models::RoleSet;
use finance_service::domain::principal::ports::PrincipalRepository;
use finance_service::domain::principal::service::PrincipalService;
use finance_service::inbound::http::router::create_router;
use finance_service::outbound::repositories::InMemoryPrincipalRepository;
use serde_json::json;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server over the in-memory store
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub repository: Arc<InMemoryPrincipalRepository>,
    pub authenticator: Arc<Authenticator>,
}

impl TestApp {
    /// Spawn the application with the default 24 hour token lifetime
    pub async fn spawn() -> Self {
        Self::spawn_with_ttl(Duration::hours(24)).await
    }

    /// Spawn the application in a background task with the given token lifetime
    pub async fn spawn_with_ttl(token_ttl: Duration) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryPrincipalRepository::new());
        let authenticator = Arc::new(Authenticator::new(JWT_SECRET, token_ttl));
        let principal_service = Arc::new(PrincipalService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
        ));

        let router = create_router(principal_service, Arc::clone(&authenticator));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            repository,
            authenticator,
        }
    }

    /// Register a principal through the API and return its token
    pub async fn register(&self, username: &str, email: &str, password: &str) -> String {
        let response = self
            .post("/api/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Missing token")
            .to_string()
    }

    /// Store an administrator directly, bypassing registration
    pub async fn seed_admin(&self, username: &str, email: &str, password: &str) {
        let admin = Principal {
            id: PrincipalId::new(),
            identifier: Identifier::new(username.to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: self.authenticator.hash_password(password).unwrap(),
            roles: RoleSet::new([Role::Standard, Role::Administrator]).unwrap(),
            enabled: true,
            created_at: Utc::now(),
        };

        self.repository
            .save(admin)
            .await
            .expect("Failed to seed administrator");
    }

    /// Log in through the API and return the token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/api/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Missing token")
            .to_string()
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.put(path).bearer_auth(token)
    }
}
