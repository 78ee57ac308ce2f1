use std::path::{Component, Path, PathBuf};

use aasrah_shared::{ObjectStore, ServiceError};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::{debug, info};

/// Resolve a `/`-separated object key below `base`, rejecting traversal.
fn resolve_key(base: &Path, key: &str) -> Result<PathBuf, ServiceError> {
    if key.is_empty() || key.contains('\\') {
        return Err(ServiceError::Storage(format!("Invalid object key '{key}'")));
    }
    let mut resolved = base.to_path_buf();
    for component in Path::new(key).components() {
        match component {
            Component::Normal(c) => resolved.push(c),
            Component::CurDir => {}
            _ => {
                return Err(ServiceError::Storage(
                    "Path traversal detected".to_string(),
                ));
            }
        }
    }
    Ok(resolved)
}

/// Image directory used as object storage by the demo backend.
/// Objects are addressed by `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    base_path: PathBuf,
    max_size: usize,
}

impl LocalObjectStore {
    pub async fn new(base_path: PathBuf, max_size: usize) -> Result<Self, ServiceError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServiceError::Storage(format!(
                "Failed to create object directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        let base_path = base_path.canonicalize().unwrap_or(base_path);
        info!(path = %base_path.display(), "Local object store initialized");

        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, ServiceError> {
        if data.is_empty() {
            return Err(ServiceError::Storage("Empty object".to_string()));
        }
        if data.len() > self.max_size {
            return Err(ServiceError::Storage(format!(
                "Object too large: {} bytes (max {})",
                data.len(),
                self.max_size
            )));
        }

        let path = resolve_key(&self.base_path, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Storage(format!("Failed to create directory: {e}")))?;
        }
        fs::write(&path, &data)
            .await
            .map_err(|e| ServiceError::Storage(format!("Failed to write object {key}: {e}")))?;

        debug!(key, size = data.len(), content_type, "Stored object");
        Ok(format!("file://{}", path.display()))
    }
}
