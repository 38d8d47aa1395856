//! Local filesystem object storage
//!
//! Objects are written under a root directory and served by the API under
//! a public base URL.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use urlencoding::encode;

use crate::domain::ports::ObjectStorage;
use crate::error::DomainError;

pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: String) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve an object path under the root, rejecting anything that escapes it
    fn resolve(&self, path: &str) -> Result<PathBuf, DomainError> {
        let relative = Path::new(path);
        let clean = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !clean {
            return Err(DomainError::Validation(format!(
                "Invalid object path: {}",
                path
            )));
        }
        Ok(self.root.join(relative))
    }

    fn public_url(&self, path: &str) -> String {
        let encoded: Vec<_> = path.split('/').map(|segment| encode(segment)).collect();
        format!("{}/{}", self.public_base_url, encoded.join("/"))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, DomainError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Internal(format!("create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| DomainError::Internal(format!("write {}: {}", target.display(), e)))?;

        tracing::debug!(path = %path, content_type = %content_type, size = bytes.len(), "Stored object");
        Ok(self.public_url(path))
    }
}
