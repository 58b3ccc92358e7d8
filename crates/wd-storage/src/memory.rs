//! In-memory store.
//!
//! Suitable for single-instance deployments and tests. Access and refresh
//! sessions share one lock so a refresh rotation is applied atomically.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use wd_model::{AccessRequest, Client};

use crate::client::ClientStore;
use crate::error::{StorageError, StorageResult};
use crate::token::{AccessTokenStorage, RefreshTokenGrantStorage, RefreshTokenStorage};

const ACCESS_SESSION: &str = "access token session";
const REFRESH_SESSION: &str = "refresh token session";

#[derive(Default)]
struct TokenSessions {
    access: HashMap<String, AccessRequest>,
    refresh: HashMap<String, AccessRequest>,
}

/// In-memory client and token session store.
#[derive(Default)]
pub struct MemoryStore {
    clients: RwLock<HashMap<String, Client>>,
    sessions: RwLock<TokenSessions>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with clients.
    #[must_use]
    pub fn with_clients(clients: impl IntoIterator<Item = Client>) -> Self {
        let clients = clients
            .into_iter()
            .map(|client| (client.id.clone(), client))
            .collect();

        Self {
            clients: RwLock::new(clients),
            sessions: RwLock::default(),
        }
    }

    /// Registers or replaces a client.
    pub async fn insert_client(&self, client: Client) {
        self.clients.write().await.insert(client.id.clone(), client);
    }

    /// Number of stored access token sessions.
    pub async fn access_token_count(&self) -> usize {
        self.sessions.read().await.access.len()
    }

    /// Number of stored refresh token sessions.
    pub async fn refresh_token_count(&self) -> usize {
        self.sessions.read().await.refresh.len()
    }
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn get_client(&self, id: &str) -> StorageResult<Client> {
        self.clients
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("client", id))
    }
}

#[async_trait]
impl AccessTokenStorage for MemoryStore {
    async fn create_access_token_session(
        &self,
        signature: &str,
        request: &AccessRequest,
    ) -> StorageResult<()> {
        self.sessions
            .write()
            .await
            .access
            .insert(signature.to_string(), request.clone());
        Ok(())
    }

    async fn get_access_token_session(&self, signature: &str) -> StorageResult<AccessRequest> {
        self.sessions
            .read()
            .await
            .access
            .get(signature)
            .cloned()
            .ok_or_else(|| StorageError::not_found(ACCESS_SESSION, signature))
    }

    async fn delete_access_token_session(&self, signature: &str) -> StorageResult<()> {
        self.sessions
            .write()
            .await
            .access
            .remove(signature)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(ACCESS_SESSION, signature))
    }
}

#[async_trait]
impl RefreshTokenStorage for MemoryStore {
    async fn create_refresh_token_session(
        &self,
        signature: &str,
        request: &AccessRequest,
    ) -> StorageResult<()> {
        self.sessions
            .write()
            .await
            .refresh
            .insert(signature.to_string(), request.clone());
        Ok(())
    }

    async fn get_refresh_token_session(&self, signature: &str) -> StorageResult<AccessRequest> {
        self.sessions
            .read()
            .await
            .refresh
            .get(signature)
            .cloned()
            .ok_or_else(|| StorageError::not_found(REFRESH_SESSION, signature))
    }

    async fn delete_refresh_token_session(&self, signature: &str) -> StorageResult<()> {
        self.sessions
            .write()
            .await
            .refresh
            .remove(signature)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(REFRESH_SESSION, signature))
    }
}

#[async_trait]
impl RefreshTokenGrantStorage for MemoryStore {
    async fn persist_refresh_token_grant_session(
        &self,
        original_refresh_signature: &str,
        access_signature: &str,
        refresh_signature: &str,
        request: &AccessRequest,
    ) -> StorageResult<()> {
        let mut sessions = self.sessions.write().await;

        if sessions.refresh.remove(original_refresh_signature).is_none() {
            tracing::debug!("refresh token session already consumed");
            return Err(StorageError::not_found(
                REFRESH_SESSION,
                original_refresh_signature,
            ));
        }

        sessions
            .access
            .insert(access_signature.to_string(), request.clone());
        sessions
            .refresh
            .insert(refresh_signature.to_string(), request.clone());
        Ok(())
    }
}
