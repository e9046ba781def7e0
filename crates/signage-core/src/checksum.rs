//! Content fingerprints for change detection
//!
//! MD5 is used only to compare local and remote content, never for security.

use crate::error::{Result, SignageError};
use crate::types::{LocalFile, DEFAULT_MIME_TYPE};
use crate::utils::normalize_relative_path;
use std::path::Path;
use tokio::io::AsyncReadExt;

const READ_BUFFER_SIZE: usize = 64 * 1024;
const SNIFF_LEN: usize = 16;

/// Fingerprint of a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChecksum {
    pub content_hash: String,
    pub mime_type: String,
    pub size: u64,
}

/// Hash and classify a file. Both reads run concurrently.
pub async fn checksum_file(path: &Path) -> Result<FileChecksum> {
    let (hashed, mime_type) = tokio::join!(hash_file(path), detect_mime_type(path));
    let (content_hash, size) = hashed?;

    Ok(FileChecksum {
        content_hash,
        mime_type,
        size,
    })
}

/// Build a `LocalFile` for `absolute_path` located under `root`
pub async fn index_file(root: &Path, absolute_path: &Path) -> Result<LocalFile> {
    let relative = absolute_path.strip_prefix(root).map_err(|_| {
        SignageError::Other(format!(
            "{} is not inside {}",
            absolute_path.display(),
            root.display()
        ))
    })?;
    let relative_path = normalize_relative_path(&relative.to_string_lossy());
    let checksum = checksum_file(absolute_path).await?;

    Ok(LocalFile {
        absolute_path: absolute_path.to_path_buf(),
        relative_path,
        size: checksum.size,
        content_hash: checksum.content_hash,
        mime_type: checksum.mime_type,
    })
}

/// Stream the file through MD5; returns the hex digest and the byte count
pub async fn hash_file(path: &Path) -> Result<(String, u64)> {
    let read_error = |source| SignageError::FileRead {
        path: path.display().to_string(),
        source,
    };

    let mut file = tokio::fs::File::open(path).await.map_err(read_error)?;
    let mut context = md5::Context::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    let mut size = 0u64;

    loop {
        let read = file.read(&mut buffer).await.map_err(read_error)?;
        if read == 0 {
            break;
        }
        context.consume(&buffer[..read]);
        size += read as u64;
    }

    Ok((format!("{:x}", context.compute()), size))
}

/// Best-effort content type: extension first, then magic bytes, then the
/// opaque binary default
pub async fn detect_mime_type(path: &Path) -> String {
    if let Some(mime) = mime_guess::from_path(path).first() {
        return mime.essence_str().to_string();
    }

    let mut head = [0u8; SNIFF_LEN];
    let sniffed = match tokio::fs::File::open(path).await {
        Ok(mut file) => match file.read(&mut head).await {
            Ok(read) => sniff(&head[..read]),
            Err(_) => None,
        },
        Err(_) => None,
    };

    sniffed.unwrap_or(DEFAULT_MIME_TYPE).to_string()
}

fn sniff(head: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"%PDF-", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b", "application/gzip"),
        (b"wOFF", "font/woff"),
        (b"wOF2", "font/woff2"),
        (b"<!DOCTYPE html", "text/html"),
        (b"<html", "text/html"),
    ];

    if head.len() >= 12 && &head[..4] == b"RIFF" && &head[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    SIGNATURES
        .iter()
        .find(|(magic, _)| head.starts_with(magic))
        .map(|(_, mime)| *mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_checksum_known_content() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello world")?;

        let checksum = checksum_file(&path).await?;
        assert_eq!(checksum.content_hash, "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(checksum.size, 11);
        assert_eq!(checksum.mime_type, "text/plain");
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_extension_is_sniffed() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let png = dir.path().join("logo.bin-asset");
        std::fs::write(&png, b"\x89PNG\r\n\x1a\nrest-of-image")?;
        let opaque = dir.path().join("blob.unknownext");
        std::fs::write(&opaque, b"\x00\x01\x02\x03")?;

        assert_eq!(detect_mime_type(&png).await, "image/png");
        assert_eq!(detect_mime_type(&opaque).await, DEFAULT_MIME_TYPE);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_fails_with_path() {
        let err = checksum_file(Path::new("/definitely/not/here.js"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.js"));
    }

    #[tokio::test]
    async fn test_index_file_uses_forward_slashes() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("js").join("lib");
        std::fs::create_dir_all(&nested)?;
        let path = nested.join("app.js");
        std::fs::write(&path, "console.log(1)")?;

        let file = index_file(dir.path(), &path).await?;
        assert_eq!(file.relative_path, "js/lib/app.js");
        assert_eq!(file.size, 14);
        Ok(())
    }
}
