//! Token migration endpoint integration tests.

use axum::http::StatusCode;
use serde_json::Value;

use wd_core::Config;
use wd_model::{Client, TokenKind};
use wd_storage::{AccessTokenStorage, RefreshTokenStorage};

use crate::common::{MIGRATOR_ID, MIGRATOR_SECRET, TestEnv};

const MIGRATE_PATH: &str = "/oauth2/token/migrate";

async fn env_with_app() -> anyhow::Result<TestEnv> {
    let env = TestEnv::new().await?;
    env.create_client(
        Client::new("app").with_scopes(["openid", "offline"]),
        Some("app-secret"),
    )
    .await?;
    env.create_client(Client::new("spa").public(), None).await?;
    Ok(env)
}

/// Tests migrating an access and refresh token pair.
#[tokio::test]
async fn test_migrate_token_pair() -> anyhow::Result<()> {
    let env = env_with_app().await?;

    let response = env
        .migrate(
            "app:app-secret",
            &[
                ("token", "legacy-access"),
                ("refresh_token", "legacy-refresh"),
                ("username", "alice"),
                ("scope", "openid offline"),
            ],
        )
        .await?;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, Value::Null);

    let access = env.store.get_access_token_session("legacy-access").await?;
    assert_eq!(access.client.id, "app");
    assert_eq!(access.session.subject, "app");
    assert_eq!(access.session.username, "alice");
    assert_eq!(access.session.extra["migrated"], Value::Bool(true));
    assert!(access.granted_scopes.has(&["openid", "offline"]));
    assert!(access.session.expires_at(TokenKind::AccessToken).is_some());

    let refresh = env.store.get_refresh_token_session("legacy-refresh").await?;
    assert!(refresh.session.expires_at(TokenKind::RefreshToken).is_some());

    Ok(())
}

/// Tests that a public original client needs no secret.
#[tokio::test]
async fn test_migrate_for_public_client() -> anyhow::Result<()> {
    let env = env_with_app().await?;

    let response = env.migrate("spa:", &[("token", "t")]).await?;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(env.store.access_token_count().await, 1);
    assert_eq!(env.store.refresh_token_count().await, 0);

    Ok(())
}

/// Tests that the original client's secret is checked when supplied.
#[tokio::test]
async fn test_migrate_with_wrong_original_secret() -> anyhow::Result<()> {
    let env = env_with_app().await?;

    let response = env.migrate("app:nope", &[("token", "t")]).await?;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "invalid_client");
    assert_eq!(env.store.access_token_count().await, 0);

    Ok(())
}

/// Tests that an unknown original client is rejected.
#[tokio::test]
async fn test_migrate_for_unknown_client() -> anyhow::Result<()> {
    let env = env_with_app().await?;

    let response = env.migrate("ghost:", &[("token", "t")]).await?;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "invalid_client");

    Ok(())
}

/// Tests that the migration endpoint requires HTTP Basic authentication.
#[tokio::test]
async fn test_migrate_without_basic_auth() -> anyhow::Result<()> {
    let env = env_with_app().await?;

    let response = env
        .post_form(
            MIGRATE_PATH,
            &[
                ("token", "t"),
                ("client_id", MIGRATOR_ID),
                ("client_secret", MIGRATOR_SECRET),
            ],
            None,
        )
        .await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "invalid_request");

    Ok(())
}

/// Tests that a wrong migrator secret is rejected.
#[tokio::test]
async fn test_migrate_with_wrong_migrator_secret() -> anyhow::Result<()> {
    let env = env_with_app().await?;

    let response = env
        .post_form(
            MIGRATE_PATH,
            &[("token", "t"), ("client", "c3BhOg==")],
            Some((MIGRATOR_ID, "wrong")),
        )
        .await?;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "invalid_client");

    Ok(())
}

/// Tests that a client without the migration scope cannot migrate.
#[tokio::test]
async fn test_migrate_without_migration_scope() -> anyhow::Result<()> {
    let env = env_with_app().await?;

    // "spa:" base64 encoded
    let response = env
        .post_form(
            MIGRATE_PATH,
            &[("token", "t"), ("client", "c3BhOg==")],
            Some(("app", "app-secret")),
        )
        .await?;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "invalid_client");
    assert_eq!(env.store.access_token_count().await, 0);

    Ok(())
}

/// Tests that the migration scope is configurable.
#[tokio::test]
async fn test_custom_migration_scope() -> anyhow::Result<()> {
    let mut config = Config::default();
    config.migration.required_scope = "legacy.import".to_string();
    let env = TestEnv::with_config(config).await?;
    env.create_client(Client::new("spa").public(), None).await?;

    let response = env.migrate("spa:", &[("token", "t")]).await?;

    assert_eq!(response.status, StatusCode::OK);

    Ok(())
}

/// Tests that a missing token is an invalid token error.
#[tokio::test]
async fn test_migrate_without_token() -> anyhow::Result<()> {
    let env = env_with_app().await?;

    let response = env.migrate("spa:", &[]).await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "invalid_token");

    Ok(())
}

/// Tests that a malformed original client field is rejected.
#[tokio::test]
async fn test_migrate_with_malformed_client_field() -> anyhow::Result<()> {
    let env = env_with_app().await?;

    let response = env
        .post_form(
            MIGRATE_PATH,
            &[("token", "t"), ("client", "not base64!")],
            Some((MIGRATOR_ID, MIGRATOR_SECRET)),
        )
        .await?;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "invalid_client");

    Ok(())
}

/// Tests that a refresh token without a signature leaves nothing behind.
#[tokio::test]
async fn test_migrate_with_malformed_refresh_token() -> anyhow::Result<()> {
    let env = env_with_app().await?;

    let response = env
        .migrate("spa:", &[("token", "t"), ("refresh_token", "a.b.c")])
        .await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "invalid_request");
    assert_eq!(env.store.access_token_count().await, 0);

    Ok(())
}
