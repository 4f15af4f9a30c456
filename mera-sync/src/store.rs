//! The remote storage collaborator.
//!
//! Progress lives in the learner's pod. This crate never talks to the pod
//! directly; it goes through [`RemoteStore`], which the host application
//! implements on top of its authenticated storage client.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::SyncResult;

/// An established pod session. Authentication happens elsewhere; sync only
/// reads these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Root of the learner's pod, with a trailing slash.
    pub pod_url: String,
    pub access_token: String,
}

impl Session {
    pub fn new(pod_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let mut pod_url = pod_url.into();
        if !pod_url.ends_with('/') {
            pod_url.push('/');
        }
        Self {
            pod_url,
            access_token: access_token.into(),
        }
    }
}

/// Key-value access to the learner's pod.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Reads the resource at `key`. `None` when it does not exist.
    async fn fetch(&self, key: &str) -> SyncResult<Option<Vec<u8>>>;

    /// Writes the resource at `key`, replacing any previous content.
    async fn store(&self, key: &str, bytes: &[u8]) -> SyncResult<()>;
}

/// In-memory [`RemoteStore`] for tests and offline use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    resources: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently held, in order.
    pub async fn keys(&self) -> Vec<String> {
        self.resources.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn fetch(&self, key: &str) -> SyncResult<Option<Vec<u8>>> {
        Ok(self.resources.read().await.get(key).cloned())
    }

    async fn store(&self, key: &str, bytes: &[u8]) -> SyncResult<()> {
        self.resources
            .write()
            .await
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
