//! Document upload session.
//!
//! Files are collected with an access level each, then uploaded one at a
//! time. Every attempt produces an [`UploadResult`]. The selection is only
//! cleared when the whole batch succeeded, so failed files can be retried.

use std::path::{Path, PathBuf};

use azdocs_shared::protocol::UploadResponse;
use azdocs_shared::types::AccessLevel;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    pub id: u64,
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
    pub access_level: AccessLevel,
    pub status: UploadStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub file_name: String,
    pub status: UploadStatus,
    pub message: String,
    pub blob_url: Option<String>,
}

/// A file refused at selection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct UploadView {
    items: Vec<UploadItem>,
    results: Vec<UploadResult>,
    default_level: AccessLevel,
    next_id: u64,
}

impl UploadView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level given to files added from now on.
    pub fn with_default_level(mut self, level: AccessLevel) -> Self {
        self.default_level = level;
        self
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn results(&self) -> &[UploadResult] {
        &self.results
    }

    /// Add files to the selection. Only readable `.pdf` files are taken;
    /// everything else is returned with the reason.
    pub fn add_files<I, P>(&mut self, paths: I) -> Vec<RejectedFile>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut rejected = Vec::new();

        for path in paths {
            let path = path.as_ref();
            if !is_pdf(path) {
                rejected.push(RejectedFile {
                    path: path.to_path_buf(),
                    reason: "Only PDF files are allowed".to_string(),
                });
                continue;
            }

            let size_bytes = match std::fs::metadata(path) {
                Ok(meta) if meta.is_file() => meta.len(),
                Ok(_) => {
                    rejected.push(RejectedFile {
                        path: path.to_path_buf(),
                        reason: "Not a regular file".to_string(),
                    });
                    continue;
                }
                Err(e) => {
                    rejected.push(RejectedFile {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            self.next_id += 1;
            self.items.push(UploadItem {
                id: self.next_id,
                path: path.to_path_buf(),
                name: file_name(path),
                size_bytes,
                access_level: self.default_level,
                status: UploadStatus::Pending,
            });
        }

        rejected
    }

    pub fn set_access_level(&mut self, id: u64, level: AccessLevel) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.access_level = level;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: u64) -> Option<UploadItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Drop the selection and any previous results.
    pub fn clear_all(&mut self) {
        self.items.clear();
        self.results.clear();
    }

    /// Start a batch. Refused (returns `false`) when nothing is selected.
    pub fn begin_batch(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.results.clear();
        for item in &mut self.items {
            item.status = UploadStatus::Pending;
        }
        true
    }

    /// Record the outcome for the item at `index`.
    pub fn record(&mut self, index: usize, outcome: Result<UploadResponse, ApiError>) {
        let Some(item) = self.items.get_mut(index) else {
            return;
        };

        let result = match outcome {
            Ok(uploaded) => {
                item.status = UploadStatus::Success;
                UploadResult {
                    file_name: item.name.clone(),
                    status: UploadStatus::Success,
                    message: "Uploaded successfully".to_string(),
                    blob_url: Some(uploaded.blob_url),
                }
            }
            Err(e) => {
                warn!(file = %item.name, error = %e, "upload failed");
                item.status = UploadStatus::Error;
                UploadResult {
                    file_name: item.name.clone(),
                    status: UploadStatus::Error,
                    message: failure_message(&e),
                    blob_url: None,
                }
            }
        };
        self.results.push(result);
    }

    /// Close a batch: the selection is cleared only if every file made it.
    /// Returns whether it was cleared.
    pub fn finish_batch(&mut self) -> bool {
        let all_succeeded = !self.results.is_empty()
            && self.results.len() == self.items.len()
            && self.results.iter().all(|r| r.status == UploadStatus::Success);
        if all_succeeded {
            self.items.clear();
        }
        all_succeeded
    }

    /// Upload every selected file, one request at a time. Returns `None`
    /// when nothing was selected.
    pub async fn upload_all(&mut self, api: &ApiClient) -> Option<&[UploadResult]> {
        if !self.begin_batch() {
            return None;
        }

        for index in 0..self.items.len() {
            let item = &self.items[index];
            let outcome = api
                .upload_document(&item.path, &item.name, item.access_level)
                .await;
            self.record(index, outcome);
        }

        let succeeded = self
            .results
            .iter()
            .filter(|r| r.status == UploadStatus::Success)
            .count();
        info!(total = self.results.len(), succeeded, "upload batch finished");

        self.finish_batch();
        Some(self.results.as_slice())
    }
}

fn failure_message(error: &ApiError) -> String {
    match error {
        ApiError::RequestFailed { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Case-insensitive `.pdf` extension check.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// `0 Bytes`, `512 Bytes`, `1.5 KB`, `2.25 MB`, ... capped at GB, with at
/// most two decimals and no trailing zeros.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
