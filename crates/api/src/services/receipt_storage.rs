//! Receipt file storage on the local filesystem.
//!
//! Files land in `storage.receipts_dir` as `<uuid>-<sha256 prefix>.<ext>`.
//! The metadata row is written by the caller; if that insert fails the file
//! is removed again with [`ReceiptStorage::discard`].

use std::path::{Path, PathBuf};

use domain::models::{NewReceipt, RequestKind};
use shared::crypto::stored_receipt_filename;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("Receipt file is empty")]
    Empty,

    #[error("Receipt is {size} bytes, the limit is {max}")]
    TooLarge { size: usize, max: usize },

    #[error("File type '{0}' is not accepted for receipts")]
    UnsupportedType(String),

    #[error("Failed to write receipt: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ReceiptError> for ApiError {
    fn from(err: ReceiptError) -> Self {
        match err {
            ReceiptError::Io(_) => ApiError::Internal(err.to_string()),
            other => ApiError::Validation(other.to_string()),
        }
    }
}

/// An uploaded file as read from the multipart body.
#[derive(Debug, Clone)]
pub struct ReceiptUpload {
    pub expense_item_id: Uuid,
    pub kind: RequestKind,
    pub original_filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

pub struct ReceiptStorage<'a> {
    config: &'a StorageConfig,
}

impl<'a> ReceiptStorage<'a> {
    pub fn new(config: &'a StorageConfig) -> Self {
        Self { config }
    }

    /// Rejects empty, oversized and disallowed files before anything is written.
    pub fn check(&self, content_type: &str, size: usize) -> Result<(), ReceiptError> {
        if size == 0 {
            return Err(ReceiptError::Empty);
        }
        if size > self.config.max_receipt_bytes {
            return Err(ReceiptError::TooLarge {
                size,
                max: self.config.max_receipt_bytes,
            });
        }
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !self
            .config
            .allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&essence))
        {
            return Err(ReceiptError::UnsupportedType(essence));
        }
        Ok(())
    }

    /// Writes the file and returns the metadata to record for it.
    pub async fn store(&self, upload: &ReceiptUpload) -> Result<NewReceipt, ReceiptError> {
        self.check(&upload.content_type, upload.content.len())?;

        let dir = Path::new(&self.config.receipts_dir);
        tokio::fs::create_dir_all(dir).await?;

        let stored_filename = stored_receipt_filename(&upload.original_filename, &upload.content);
        let path = dir.join(&stored_filename);
        tokio::fs::write(&path, &upload.content).await?;

        debug!(
            expense_item_id = %upload.expense_item_id,
            path = %path.display(),
            bytes = upload.content.len(),
            "Receipt file written"
        );

        Ok(NewReceipt {
            expense_item_id: upload.expense_item_id,
            request_kind: upload.kind,
            original_filename: upload.original_filename.clone(),
            public_url: public_url(&self.config.public_base_url, &stored_filename),
            stored_filename,
            file_type: upload.content_type.clone(),
            storage_path: path.to_string_lossy().into_owned(),
        })
    }

    /// Removes a stored file whose metadata could not be recorded.
    pub async fn discard(&self, receipt: &NewReceipt) {
        let path = PathBuf::from(&receipt.storage_path);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove orphaned receipt file"
            );
        }
    }
}

fn public_url(base: &str, stored_filename: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), stored_filename)
}
