//! Common test utilities and fixtures.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tower::ServiceExt;

use wd_core::{Config, HasherConfig};
use wd_crypto::{Argon2Hasher, SecretHasher};
use wd_model::{AccessRequest, Client};
use wd_oauth2::{HmacShaStrategy, OAuth2State, ProviderBuilder, RefreshTokenStrategy, oauth2_router};
use wd_storage::MemoryStore;

/// Token signing secret shared by all tests.
const SECRET: &[u8] = b"integration-test-secret-of-enough-length";

/// Client allowed to migrate tokens.
pub const MIGRATOR_ID: &str = "migrator";
/// Secret of [`MIGRATOR_ID`].
pub const MIGRATOR_SECRET: &str = "migrator-secret";

/// Decoded HTTP response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Test environment wiring a provider over an in-memory store.
pub struct TestEnv {
    /// Backing store.
    pub store: Arc<MemoryStore>,
    /// Token strategy used by the provider.
    pub strategy: Arc<HmacShaStrategy>,
    hasher: Arc<Argon2Hasher>,
    router: Router,
}

impl TestEnv {
    /// Creates an environment with default configuration.
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(Config::default()).await
    }

    /// Creates an environment with the given configuration.
    pub async fn with_config(config: Config) -> anyhow::Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("wd_oauth2=debug")
            .with_test_writer()
            .try_init();

        let hasher = Arc::new(Argon2Hasher::new(&HasherConfig {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }));
        let store = Arc::new(MemoryStore::new());
        let strategy = Arc::new(HmacShaStrategy::new(SECRET, &config.tokens)?);

        let migration_scope = config.migration.required_scope.clone();
        let provider = ProviderBuilder::new(store.clone(), hasher.clone())
            .config(config)
            .with_hmac_handlers(Arc::clone(&store), Arc::clone(&strategy))
            .build();
        let router = oauth2_router().with_state(OAuth2State::new(provider));

        let env = Self {
            store,
            strategy,
            hasher,
            router,
        };
        env.create_client(
            Client::new(MIGRATOR_ID).with_scopes([migration_scope.as_str()]),
            Some(MIGRATOR_SECRET),
        )
        .await?;

        Ok(env)
    }

    /// Stores a client, hashing `secret` when given.
    pub async fn create_client(&self, client: Client, secret: Option<&str>) -> anyhow::Result<()> {
        let client = match secret {
            Some(secret) => client.with_hashed_secret(self.hasher.hash(secret.as_bytes())?),
            None => client,
        };
        self.store.insert_client(client).await;
        Ok(())
    }

    /// Mints a refresh token this environment will accept.
    pub async fn mint_refresh_token(&self) -> anyhow::Result<String> {
        Ok(self
            .strategy
            .generate_refresh_token(&AccessRequest::new())
            .await?
            .token)
    }

    /// Posts a form to `path`, optionally with HTTP Basic credentials.
    pub async fn post_form(
        &self,
        path: &str,
        pairs: &[(&str, &str)],
        basic: Option<(&str, &str)>,
    ) -> anyhow::Result<TestResponse> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();

        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some((id, secret)) = basic {
            let encoded = STANDARD.encode(format!("{id}:{secret}"));
            builder = builder.header(header::AUTHORIZATION, format!("Basic {encoded}"));
        }

        self.send(builder.body(Body::from(body))?).await
    }

    /// Posts a JSON body to `path`.
    pub async fn post_json(&self, path: &str, body: &Value) -> anyhow::Result<TestResponse> {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body)?))?;

        self.send(request).await
    }

    /// Migrates a token pair as [`MIGRATOR_ID`].
    pub async fn migrate(
        &self,
        client: &str,
        pairs: &[(&str, &str)],
    ) -> anyhow::Result<TestResponse> {
        let client = STANDARD.encode(client);
        let mut form = vec![("client", client.as_str())];
        form.extend_from_slice(pairs);

        self.post_form(
            "/oauth2/token/migrate",
            &form,
            Some((MIGRATOR_ID, MIGRATOR_SECRET)),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> anyhow::Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }
}
