use std::sync::Arc;
use test_context::AsyncTestContext;
use tokengate_backend::domain::auth::JwtManager;
use tokengate_backend::domain::tokens::EconomyPolicy;
use tokengate_backend::infrastructure::config::{Config, Environment, LogFormat, StoreBackend};
use tokengate_backend::infrastructure::http::build_app;
use tokengate_backend::infrastructure::repositories::{InMemoryStore, Repositories};
use tokio::net::TcpListener;
use uuid::Uuid;

pub mod assertions;
pub mod fixtures;

use api_client::TestClient;
use fixtures::TestFixtures;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-key-for-testing-only";

pub struct TestContext {
    pub client: TestClient,
    pub config: Config,
    pub store: Arc<InMemoryStore>,
    pub fixtures: TestFixtures,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let config = Config {
                database_url: None,
                host: "127.0.0.1".to_string(),
                port: 0, // Will be assigned by the OS
                jwt_secret: TEST_JWT_SECRET.to_string(),
                environment: Environment::Development,
                log_format: LogFormat::Pretty,
                store_backend: StoreBackend::Memory,
                economy: EconomyPolicy::default(),
            };

            let store = Arc::new(InMemoryStore::new());
            let app = build_app(
                Arc::new(config.clone()),
                Repositories::in_memory(store.clone()),
            );

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let client = TestClient::new(&base_url);
            let fixtures = TestFixtures::new(store.clone());

            Self {
                client,
                config,
                store,
                fixtures,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // The in-memory store is dropped with the context
        }
    }
}

impl TestContext {
    /// Bearer token for `user_id`, signed with the server's secret
    pub fn token_for(&self, user_id: Uuid) -> String {
        generate_test_jwt_with_email(&user_id, "learner@example.com", &self.config.jwt_secret)
    }
}

// Helper to generate valid JWT tokens for testing with specific email
pub fn generate_test_jwt_with_email(user_id: &Uuid, email: &str, secret: &str) -> String {
    JwtManager::new(secret.to_string())
        .issue_token(*user_id, email, chrono::Duration::hours(1))
        .unwrap()
}
