//! Firmware upload command

use crate::api::Client;
use crate::progress::UploadProgress;
use anyhow::{Context, Result};
use colored::Colorize;
use futures::future::try_join_all;
use signage_core::checksum::checksum_file;
use signage_core::utils::format_size;
use signage_core::{ProgressReporter, SignageError, UploadFile};
use std::path::{Path, PathBuf};

pub async fn upload(application_type: &str, version: &str, files: Vec<PathBuf>) -> Result<()> {
    if files.is_empty() {
        anyhow::bail!("No firmware files given");
    }

    println!(
        "{} {} {}",
        "📦 Uploading firmware".cyan().bold(),
        application_type.cyan(),
        version.dimmed()
    );

    let uploads = try_join_all(files.iter().map(|path| prepare(path))).await?;
    let total: u64 = uploads.iter().map(|f| f.size).sum();

    let client = Client::authenticated()?;
    client
        .create_firmware_version(application_type, version)
        .await
        .with_context(|| format!("Failed to create firmware version {}", version))?;

    let progress = UploadProgress::new();
    progress.init(total, "firmware");
    let result = try_join_all(uploads.iter().map(|file| {
        client.upload_firmware_file(application_type, version, file, &progress)
    }))
    .await;
    progress.end();
    result.context("Failed to upload firmware")?;

    for file in &uploads {
        println!("  {} {} {}", "+".green(), file.relative_path, format_size(file.size).dimmed());
    }
    println!(
        "{}",
        format!("✅ {} firmware files uploaded ({})", uploads.len(), format_size(total))
            .green()
            .bold()
    );

    Ok(())
}

/// Checksum one firmware file, keyed by its file name
async fn prepare(path: &Path) -> Result<UploadFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid firmware file path {}", path.display()))?
        .to_string();
    let checksum = checksum_file(path).await?;
    if checksum.size == 0 {
        return Err(SignageError::EmptyFile {
            path: path.display().to_string(),
        }
        .into());
    }

    Ok(UploadFile {
        absolute_path: path.to_path_buf(),
        relative_path: name,
        content_hash: checksum.content_hash,
        size: checksum.size,
        mime_type: checksum.mime_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_prepare_uses_file_name() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("fw-1.2.0.bin");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"firmware").unwrap();

        let file = prepare(&path).await.unwrap();
        assert_eq!(file.relative_path, "fw-1.2.0.bin");
        assert_eq!(file.size, 8);
        assert_eq!(file.content_hash.len(), 32);
    }

    #[tokio::test]
    async fn test_prepare_rejects_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.bin");
        std::fs::write(&path, b"").unwrap();

        let err = prepare(&path).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SignageError>(),
            Some(SignageError::EmptyFile { .. })
        ));
    }
}
