//! In-Memory Archive Store
//!
//! Thread-safe, in-memory implementation of `ArchiveStore`, with a
//! configurable page size and an injectable failure. Ideal for unit tests
//! and for exercising the loader without touching the filesystem.

use crate::domain::errors::SourceError;
use crate::domain::ports::{ArchiveStore, ObjectPage};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Failure to return from every call once armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    Unreachable,
    AccessDenied,
}

pub struct InMemoryArchiveStore {
    objects: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
    failure: Arc<RwLock<Option<InjectedFailure>>>,
    page_size: usize,
    list_calls: AtomicUsize,
}

impl InMemoryArchiveStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            failure: Arc::new(RwLock::new(None)),
            page_size: page_size.max(1),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub async fn put(&self, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.objects.write().await.insert(key.into(), body.into());
    }

    pub async fn fail_with(&self, failure: Option<InjectedFailure>) {
        *self.failure.write().await = failure;
    }

    /// Number of listing pages served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn check_failure(&self, location: &str) -> Result<(), SourceError> {
        match *self.failure.read().await {
            Some(InjectedFailure::Unreachable) => Err(SourceError::Unreachable {
                reason: "injected outage".to_string(),
            }),
            Some(InjectedFailure::AccessDenied) => Err(SourceError::AccessDenied {
                location: location.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryArchiveStore {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[async_trait]
impl ArchiveStore for InMemoryArchiveStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<&str>,
    ) -> Result<ObjectPage, SourceError> {
        self.check_failure(prefix).await?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let objects = self.objects.read().await;
        let mut matching = objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .filter(|k| continuation.is_none_or(|after| k.as_str() > after));

        let keys: Vec<String> = matching.by_ref().take(self.page_size).cloned().collect();
        let continuation = if matching.next().is_some() {
            keys.last().cloned()
        } else {
            None
        };

        Ok(ObjectPage {
            keys,
            continuation,
            ..ObjectPage::default()
        })
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, SourceError> {
        self.check_failure(key).await?;
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_until_exhausted() {
        let store = InMemoryArchiveStore::new(2);
        for i in 0..5 {
            store.put(format!("aws-{i}.json"), "{}").await;
        }
        store.put("ibm-0.json", "{}").await;

        let mut token: Option<String> = None;
        let mut seen = Vec::new();
        loop {
            let page = store.list_page("aws-", token.as_deref()).await.unwrap();
            seen.extend(page.keys);
            match page.continuation {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        assert_eq!(seen.len(), 5);
        assert_eq!(store.list_calls(), 3);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = InMemoryArchiveStore::default();
        store.put("aws-0.json", "{}").await;
        store.fail_with(Some(InjectedFailure::AccessDenied)).await;

        assert!(matches!(
            store.list_page("aws-", None).await,
            Err(SourceError::AccessDenied { .. })
        ));
        assert!(store.get_object("aws-0.json").await.is_err());
    }
}
