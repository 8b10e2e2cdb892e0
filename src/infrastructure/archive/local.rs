//! Archive store backed by a local directory mirror of the archive bucket.
//!
//! Object keys are `/`-separated paths relative to the root. Listings are
//! lexicographic and paged; the continuation token is the last key returned.
//! The tree is walked once per listing: the first page takes a snapshot and
//! continuation pages read from it.

use crate::domain::errors::SourceError;
use crate::domain::ports::{ArchiveStore, ObjectPage};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Result of one walk over the archive tree.
#[derive(Debug, Default)]
struct Listing {
    /// Sorted `/`-separated keys
    keys: Vec<String>,
    /// Files whose relative path is not valid UTF-8
    unaddressable: Vec<PathBuf>,
}

pub struct LocalArchiveStore {
    root: PathBuf,
    page_size: usize,
    snapshot: Mutex<Option<Arc<Listing>>>,
}

impl LocalArchiveStore {
    pub fn new(root: impl Into<PathBuf>, page_size: usize) -> Self {
        Self {
            root: root.into(),
            page_size: page_size.max(1),
            snapshot: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(SourceError::AccessDenied {
                location: key.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }

    /// Walks the tree and replaces the snapshot.
    async fn refresh(&self) -> Result<Arc<Listing>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::Unreachable {
                reason: format!("{} is not a directory", self.root.display()),
            });
        }

        let root = self.root.clone();
        let listing = tokio::task::spawn_blocking(move || collect_keys(&root))
            .await
            .map_err(|e| SourceError::Unreachable {
                reason: format!("listing task failed: {}", e),
            })??;

        let listing = Arc::new(listing);
        *self.snapshot.lock().await = Some(listing.clone());
        Ok(listing)
    }
}

/// Relative path bytes joined with `/`, for prefix matching of names that
/// are not valid UTF-8.
fn encoded_key(relative: &Path) -> Vec<u8> {
    relative
        .components()
        .map(|c| c.as_os_str().as_encoded_bytes())
        .collect::<Vec<_>>()
        .join(&b'/')
}

/// Collects every file below `root`; keys come out sorted.
fn collect_keys(root: &Path) -> Result<Listing, SourceError> {
    let mut listing = Listing::default();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries =
            std::fs::read_dir(&dir).map_err(|e| SourceError::from_io(dir.display().to_string(), e))?;
        for entry in entries {
            let entry = entry.map_err(|e| SourceError::from_io(dir.display().to_string(), e))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|e| SourceError::from_io(path.display().to_string(), e))?;

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let Ok(relative) = path.strip_prefix(root) else {
                    continue;
                };
                let parts: Option<Vec<&str>> = relative
                    .components()
                    .map(|c| c.as_os_str().to_str())
                    .collect();
                match parts {
                    Some(parts) => listing.keys.push(parts.join("/")),
                    None => listing.unaddressable.push(relative.to_path_buf()),
                }
            }
        }
    }

    listing.keys.sort();
    Ok(listing)
}

#[async_trait]
impl ArchiveStore for LocalArchiveStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<&str>,
    ) -> Result<ObjectPage, SourceError> {
        let cached = match continuation {
            Some(_) => self.snapshot.lock().await.clone(),
            None => None,
        };
        let listing = match cached {
            Some(listing) => listing,
            None => self.refresh().await?,
        };

        let mut start = listing.keys.partition_point(|k| k.as_str() < prefix);
        if let Some(after) = continuation {
            start = start.max(listing.keys.partition_point(|k| k.as_str() <= after));
        }
        let mut matching = listing.keys[start..]
            .iter()
            .take_while(|k| k.starts_with(prefix));

        let page: Vec<String> = matching.by_ref().take(self.page_size).cloned().collect();
        let has_more = matching.next().is_some();
        let next = if has_more { page.last().cloned() } else { None };

        let mut unaddressable = 0;
        if continuation.is_none() {
            for relative in &listing.unaddressable {
                if encoded_key(relative).starts_with(prefix.as_bytes()) {
                    warn!(
                        "LocalArchiveStore: skipping {} (name is not valid UTF-8)",
                        relative.display()
                    );
                    unaddressable += 1;
                }
            }
        }

        debug!(
            "LocalArchiveStore: listed {} keys under '{}' (more: {})",
            page.len(),
            prefix,
            has_more
        );

        Ok(ObjectPage {
            keys: page,
            continuation: next,
            unaddressable,
        })
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, SourceError> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| SourceError::from_io(key, e))
    }
}
