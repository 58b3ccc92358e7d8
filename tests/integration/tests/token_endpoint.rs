//! Token endpoint integration tests.

use axum::http::{StatusCode, header};
use serde_json::json;

use wd_core::Config;
use wd_model::Client;

use crate::common::TestEnv;

const TOKEN_PATH: &str = "/oauth2/token";

fn service_client() -> Client {
    Client::new("service")
        .with_grant_types(["client_credentials"])
        .with_scopes(["read", "write"])
}

fn app_client() -> Client {
    Client::new("app")
        .with_grant_types(["refresh_token"])
        .with_scopes(["openid", "offline"])
}

/// Seeds a refresh token for `app` through the migration endpoint.
async fn seed_refresh_token(env: &TestEnv, scope: &str) -> anyhow::Result<String> {
    let refresh_token = env.mint_refresh_token().await?;
    let response = env
        .migrate(
            "app:app-secret",
            &[
                ("token", "legacy-access"),
                ("refresh_token", refresh_token.as_str()),
                ("scope", scope),
            ],
        )
        .await?;
    assert_eq!(response.status, StatusCode::OK);
    Ok(refresh_token)
}

/// Tests the client credentials grant with HTTP Basic authentication.
#[tokio::test]
async fn test_client_credentials_grant() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.create_client(service_client(), Some("service-secret"))
        .await?;

    let response = env
        .post_form(
            TOKEN_PATH,
            &[("grant_type", "client_credentials"), ("scope", "read")],
            Some(("service", "service-secret")),
        )
        .await?;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CACHE_CONTROL], "no-store");
    assert_eq!(response.headers[header::PRAGMA], "no-cache");
    assert_eq!(response.body["token_type"], "bearer");
    assert_eq!(response.body["scope"], "read");
    assert!(response.body["access_token"].as_str().is_some_and(|t| t.contains('.')));
    assert!(response.body["expires_in"].as_i64().is_some_and(|s| s > 3500 && s <= 3600));
    assert!(response.body.get("refresh_token").is_none());
    assert_eq!(env.store.access_token_count().await, 1);

    Ok(())
}

/// Tests client credentials sent in a JSON body.
#[tokio::test]
async fn test_client_credentials_json_body() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.create_client(service_client(), Some("service-secret"))
        .await?;

    let response = env
        .post_json(
            TOKEN_PATH,
            &json!({
                "grant_type": "client_credentials",
                "client_id": "service",
                "client_secret": "service-secret",
                "scope": ["read", "write"],
            }),
        )
        .await?;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["scope"], "read write");

    Ok(())
}

/// Tests that an unrecognised grant type is an invalid request.
#[tokio::test]
async fn test_unsupported_grant_type() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.create_client(service_client(), Some("service-secret"))
        .await?;

    let response = env
        .post_form(
            TOKEN_PATH,
            &[("grant_type", "password")],
            Some(("service", "service-secret")),
        )
        .await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "invalid_request");

    Ok(())
}

/// Tests that a missing grant type is an invalid request.
#[tokio::test]
async fn test_missing_grant_type() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let response = env
        .post_form(TOKEN_PATH, &[("client_id", "service")], None)
        .await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "invalid_request");

    Ok(())
}

/// Tests that missing client credentials are an invalid request.
#[tokio::test]
async fn test_missing_client_credentials() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let response = env
        .post_form(TOKEN_PATH, &[("grant_type", "client_credentials")], None)
        .await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "invalid_request");

    Ok(())
}

/// Tests that a wrong client secret is rejected.
#[tokio::test]
async fn test_wrong_client_secret() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.create_client(service_client(), Some("service-secret"))
        .await?;

    let response = env
        .post_form(
            TOKEN_PATH,
            &[("grant_type", "client_credentials")],
            Some(("service", "wrong")),
        )
        .await?;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "invalid_client");
    assert_eq!(env.store.access_token_count().await, 0);

    Ok(())
}

/// Tests refresh token rotation and single use of the presented token.
#[tokio::test]
async fn test_refresh_token_rotation() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.create_client(app_client(), Some("app-secret")).await?;
    let refresh_token = seed_refresh_token(&env, "openid offline").await?;

    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token.as_str()),
    ];
    let response = env
        .post_form(TOKEN_PATH, &form, Some(("app", "app-secret")))
        .await?;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["scope"], "openid offline");
    let rotated = response.body["refresh_token"].as_str().unwrap_or_default();
    assert!(!rotated.is_empty());
    assert_ne!(rotated, refresh_token);

    let replay = env
        .post_form(TOKEN_PATH, &form, Some(("app", "app-secret")))
        .await?;
    assert_eq!(replay.status, StatusCode::BAD_REQUEST);
    assert_eq!(replay.body["error"], "invalid_request");

    Ok(())
}

/// Tests that a negative refresh lifespan reissues the presented token.
#[tokio::test]
async fn test_permanent_refresh_token() -> anyhow::Result<()> {
    let mut config = Config::default();
    config.tokens.refresh_token_lifespan = -1;
    let env = TestEnv::with_config(config).await?;
    env.create_client(app_client(), Some("app-secret")).await?;
    let refresh_token = seed_refresh_token(&env, "offline").await?;

    let response = env
        .post_form(
            TOKEN_PATH,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ],
            Some(("app", "app-secret")),
        )
        .await?;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["refresh_token"], refresh_token.as_str());
    assert_eq!(env.store.refresh_token_count().await, 1);

    Ok(())
}

/// Tests that a refresh token without the offline scope is rejected.
#[tokio::test]
async fn test_refresh_without_offline_scope() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.create_client(app_client(), Some("app-secret")).await?;
    let refresh_token = seed_refresh_token(&env, "openid").await?;

    let response = env
        .post_form(
            TOKEN_PATH,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ],
            Some(("app", "app-secret")),
        )
        .await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "invalid_scope");

    Ok(())
}

/// Tests that a refresh token issued to another client is rejected.
#[tokio::test]
async fn test_refresh_token_of_other_client() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.create_client(app_client(), Some("app-secret")).await?;
    env.create_client(
        Client::new("other").with_grant_types(["refresh_token"]),
        Some("other-secret"),
    )
    .await?;
    let refresh_token = seed_refresh_token(&env, "offline").await?;

    let response = env
        .post_form(
            TOKEN_PATH,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ],
            Some(("other", "other-secret")),
        )
        .await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "invalid_request");
    assert_eq!(env.store.refresh_token_count().await, 1);

    Ok(())
}

/// Tests that an unknown client and a wrong secret get the same response.
#[tokio::test]
async fn test_unknown_client_matches_wrong_secret() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.create_client(service_client(), Some("service-secret"))
        .await?;

    let form = [("grant_type", "client_credentials")];
    let unknown = env
        .post_form(TOKEN_PATH, &form, Some(("ghost", "service-secret")))
        .await?;
    let mismatch = env
        .post_form(TOKEN_PATH, &form, Some(("service", "wrong")))
        .await?;

    assert_eq!(unknown.status, mismatch.status);
    assert_eq!(unknown.body, mismatch.body);

    Ok(())
}
