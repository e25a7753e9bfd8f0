use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use models::Document;
use tokio::fs;
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::storage::DocumentStore;

/// JSON file-backed document store.
///
/// Holds no state besides the path: every `load` reads the file and every
/// `save` replaces it. The file and its directory are created on first use.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Create the containing directory and an empty document if the file is absent.
    ///
    /// The empty document is written to a temp file and hard-linked into place,
    /// so the target either does not exist or holds a complete document, and a
    /// file created concurrently is never replaced.
    pub async fn ensure_initialized(&self) -> Result<(), ServiceError> {
        match fs::metadata(&self.file_path).await {
            Ok(_) => return Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(ServiceError::io(e)),
        }
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(ServiceError::io)?;
            }
        }

        let tmp = self.temp_path();
        let linked = match fs::write(&tmp, encode(&Document::default())?).await {
            Ok(()) => fs::hard_link(&tmp, &self.file_path).await,
            Err(e) => Err(e),
        };
        let _ = fs::remove_file(&tmp).await;
        match linked {
            Ok(()) => {
                info!(path = %self.file_path.display(), "created empty listing document");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(ServiceError::io(e)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".into());
        self.file_path
            .with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()))
    }
}

fn encode(document: &Document) -> Result<Vec<u8>, ServiceError> {
    serde_json::to_vec_pretty(document).map_err(|e| ServiceError::Parse(e.to_string()))
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self) -> Result<Document, ServiceError> {
        self.ensure_initialized().await?;
        let bytes = fs::read(&self.file_path).await.map_err(ServiceError::io)?;
        let document: Document =
            serde_json::from_slice(&bytes).map_err(|e| ServiceError::Parse(e.to_string()))?;
        debug!(path = %self.file_path.display(), count = document.properties.len(), "loaded document");
        Ok(document)
    }

    async fn save(&self, document: &Document) -> Result<(), ServiceError> {
        self.ensure_initialized().await?;
        let data = encode(document)?;

        // write-then-rename so readers never see a truncated file
        let tmp = self.temp_path();
        if let Err(e) = fs::write(&tmp, data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::io(e));
        }
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::io(e));
        }
        debug!(path = %self.file_path.display(), count = document.properties.len(), "saved document");
        Ok(())
    }
}
