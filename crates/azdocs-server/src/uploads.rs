use std::path::PathBuf;

use azdocs_shared::constants::PDF_MAGIC;
use azdocs_shared::types::AccessLevel;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ServerError;

/// Metadata of one uploaded document.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    /// Name the client supplied.
    pub file_name: String,
    /// Name on disk, `<uuid>.pdf`.
    pub stored_name: String,
    pub access_level: AccessLevel,
    pub size: usize,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    /// Uploaders always see their own documents; everyone else needs a
    /// clearance at or above the document's level.
    pub fn visible_to(&self, user: &AuthUser) -> bool {
        self.uploaded_by == user.user_id || self.access_level <= user.clearance
    }
}

#[derive(Debug)]
pub struct UploadStore {
    base_path: PathBuf,
    max_size: usize,
    documents: Mutex<Vec<Document>>,
}

impl UploadStore {
    pub async fn new(base_path: PathBuf, max_size: usize) -> Result<Self, ServerError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServerError::Storage(format!(
                "Failed to create upload directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Upload store initialized");

        Ok(Self {
            base_path,
            max_size,
            documents: Mutex::new(Vec::new()),
        })
    }

    pub async fn store_pdf(
        &self,
        uploaded_by: &str,
        file_name: &str,
        access_level: AccessLevel,
        data: &[u8],
    ) -> Result<Document, ServerError> {
        if data.is_empty() {
            return Err(ServerError::BadRequest("Empty file".to_string()));
        }
        if data.len() > self.max_size {
            return Err(ServerError::PayloadTooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }
        if !data.starts_with(PDF_MAGIC) {
            return Err(ServerError::BadRequest(
                "Only PDF files are accepted".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let stored_name = format!("{id}.pdf");
        let path = self.base_path.join(&stored_name);

        fs::write(&path, data).await.map_err(|e| {
            ServerError::Storage(format!("Failed to write upload {}: {}", id, e))
        })?;

        let document = Document {
            id,
            file_name: file_name.to_string(),
            stored_name,
            access_level,
            size: data.len(),
            uploaded_by: uploaded_by.to_string(),
            uploaded_at: Utc::now(),
        };
        self.documents.lock().await.push(document.clone());

        debug!(id = %id, file = %file_name, size = data.len(), level = access_level.value(), "Stored upload");
        Ok(document)
    }

    /// Read a stored file back. Only names this store produced are accepted,
    /// which rules out path traversal.
    async fn read(&self, stored_name: &str) -> Result<Vec<u8>, ServerError> {
        let id = stored_name
            .strip_suffix(".pdf")
            .and_then(|stem| Uuid::parse_str(stem).ok())
            .ok_or_else(|| ServerError::NotFound("File not found".to_string()))?;

        let path = self.base_path.join(format!("{id}.pdf"));
        if !path.exists() {
            return Err(ServerError::NotFound("File not found".to_string()));
        }

        fs::read(&path)
            .await
            .map_err(|e| ServerError::Storage(format!("Failed to read upload {}: {}", id, e)))
    }

    /// Documents `user` may read, oldest first.
    pub async fn list_visible(&self, user: &AuthUser) -> Vec<Document> {
        self.documents
            .lock()
            .await
            .iter()
            .filter(|doc| doc.visible_to(user))
            .cloned()
            .collect()
    }

    /// Read a stored file on behalf of `user`. Documents above the caller's
    /// clearance are reported as missing.
    pub async fn read_for(&self, user: &AuthUser, stored_name: &str) -> Result<Vec<u8>, ServerError> {
        let visible = self
            .documents
            .lock()
            .await
            .iter()
            .any(|doc| doc.stored_name == stored_name && doc.visible_to(user));
        if !visible {
            return Err(ServerError::NotFound("File not found".to_string()));
        }
        self.read(stored_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (UploadStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path().to_path_buf(), 1024).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_store_and_read() {
        let (store, _dir) = test_store().await;
        let data = b"%PDF-1.7 body";

        let doc = store
            .store_pdf("u1", "guide.pdf", AccessLevel::INTERNAL, data)
            .await
            .unwrap();
        assert_eq!(doc.file_name, "guide.pdf");
        assert_eq!(store.read(&doc.stored_name).await.unwrap(), data);
        assert_eq!(store.list_visible(&user("u2", AccessLevel::INTERNAL)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_non_pdf_and_empty() {
        let (store, _dir) = test_store().await;
        assert!(matches!(
            store.store_pdf("u1", "x.pdf", AccessLevel::PUBLIC, b"hello").await,
            Err(ServerError::BadRequest(_))
        ));
        assert!(store.store_pdf("u1", "x.pdf", AccessLevel::PUBLIC, b"").await.is_err());
        assert!(store.list_visible(&user("u1", AccessLevel::TOP_SECRET)).await.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_oversized() {
        let (store, _dir) = test_store().await;
        let mut data = PDF_MAGIC.to_vec();
        data.resize(2048, b'x');
        assert!(matches!(
            store.store_pdf("u1", "big.pdf", AccessLevel::PUBLIC, &data).await,
            Err(ServerError::PayloadTooLarge { size: 2048, max: 1024 })
        ));
    }

    fn user(id: &str, clearance: AccessLevel) -> AuthUser {
        AuthUser {
            user_id: id.to_string(),
            clearance,
        }
    }

    #[tokio::test]
    async fn test_clearance_limits_visibility() {
        let (store, _dir) = test_store().await;
        let public = store
            .store_pdf("u1", "handbook.pdf", AccessLevel::PUBLIC, b"%PDF-1.4 a")
            .await
            .unwrap();
        let secret = store
            .store_pdf("u1", "plans.pdf", AccessLevel::RESTRICTED, b"%PDF-1.4 b")
            .await
            .unwrap();

        let reader = user("u2", AccessLevel::INTERNAL);
        let visible = store.list_visible(&reader).await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, public.id);

        assert!(store.read_for(&reader, &public.stored_name).await.is_ok());
        assert!(matches!(
            store.read_for(&reader, &secret.stored_name).await,
            Err(ServerError::NotFound(_))
        ));

        // The uploader keeps access regardless of clearance.
        let owner = user("u1", AccessLevel::PUBLIC);
        assert!(store.read_for(&owner, &secret.stored_name).await.is_ok());
        assert_eq!(store.list_visible(&owner).await.len(), 2);
    }

    #[tokio::test]
    async fn test_read_rejects_foreign_names() {
        let (store, _dir) = test_store().await;
        assert!(store.read("../secret.pdf").await.is_err());
        assert!(store.read(&format!("{}.pdf", Uuid::new_v4())).await.is_err());
    }
}
