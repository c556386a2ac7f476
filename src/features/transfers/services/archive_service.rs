use bytes::Bytes;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::error::{AppError, Result};
use crate::features::transfers::models::{ArchiveReport, SkippedFile};
use crate::features::transfers::services::RetrievalService;
use crate::shared::constants::ARCHIVE_COMPRESSION_LEVEL;
use crate::shared::paths;

/// Archive Builder: fetches a batch one file at a time and zips whatever
/// arrived.
pub struct ArchiveService {
    retrieval: Arc<RetrievalService>,
}

impl ArchiveService {
    pub fn new(retrieval: Arc<RetrievalService>) -> Self {
        Self { retrieval }
    }

    pub async fn build(
        &self,
        user_id: &str,
        keys: &[String],
        preferred: &HashMap<String, String>,
    ) -> Result<ArchiveReport> {
        // Flat namespace: a later file with the same base name replaces the earlier one
        let mut entries: Vec<(String, Bytes)> = Vec::new();
        let mut skipped = Vec::new();

        for key in keys {
            let entry = match self.retrieval.entry(user_id, key).await {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping {} in archive: {}", key, e);
                    skipped.push(SkippedFile {
                        key: key.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            if entry.is_directory {
                skipped.push(SkippedFile {
                    key: entry.key,
                    reason: "Directory".to_string(),
                });
                continue;
            }

            let preferred_provider = preferred
                .get(key)
                .or_else(|| preferred.get(&entry.key))
                .map(String::as_str);

            match self
                .retrieval
                .fetch_entry(user_id, &entry, preferred_provider)
                .await
            {
                Ok(object) => {
                    let name = paths::base_name(&entry.key).to_string();
                    match entries.iter_mut().find(|(existing, _)| *existing == name) {
                        Some(slot) => slot.1 = object.data,
                        None => entries.push((name, object.data)),
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping {} in archive: {}", entry.key, e);
                    skipped.push(SkippedFile {
                        key: entry.key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if entries.is_empty() {
            return Err(AppError::ArchiveEmpty(
                "No files could be added to archive".to_string(),
            ));
        }

        let count = entries.len();
        let bytes = tokio::task::spawn_blocking(move || compress(entries))
            .await
            .map_err(|e| AppError::Internal(format!("Archive task failed: {}", e)))??;

        tracing::info!(
            "Built archive with {} entries ({} skipped, {} bytes)",
            count,
            skipped.len(),
            bytes.len()
        );

        Ok(ArchiveReport {
            bytes,
            entries: count,
            skipped,
        })
    }
}

fn compress(entries: Vec<(String, Bytes)>) -> Result<Vec<u8>> {
    let zip_error = |e: zip::result::ZipError| AppError::Internal(format!("Failed to build archive: {}", e));

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ARCHIVE_COMPRESSION_LEVEL));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer.start_file(name, options).map_err(zip_error)?;
        writer
            .write_all(&data)
            .map_err(|e| AppError::Internal(format!("Failed to write archive entry: {}", e)))?;
    }

    Ok(writer.finish().map_err(zip_error)?.into_inner())
}
