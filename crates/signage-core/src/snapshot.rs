//! Remote file set of an applet version, indexed by relative path

use crate::error::Result;
use crate::ports::AppletFileStore;
use crate::types::{AppletVersionRef, RemoteFile};
use crate::utils::normalize_relative_path;
use std::collections::HashMap;
use tracing::debug;

/// Mutable working set of remote files. Entries are taken out as local
/// files match them; whatever is left was never matched.
#[derive(Debug, Clone, Default)]
pub struct RemoteFileSnapshot {
    files: HashMap<String, RemoteFile>,
}

impl RemoteFileSnapshot {
    /// One full listing per sync run. A failed listing aborts before any
    /// mutation happens.
    pub async fn fetch(store: &dyn AppletFileStore, version: &AppletVersionRef) -> Result<Self> {
        let files = store.list(version).await?;
        debug!("Fetched {} remote files for {}", files.len(), version);
        Ok(Self::from_files(files))
    }

    /// Keys are normalized; each entry keeps the server's own path so a
    /// removal targets the key the server knows.
    pub fn from_files(files: impl IntoIterator<Item = RemoteFile>) -> Self {
        Self {
            files: files
                .into_iter()
                .map(|file| (normalize_relative_path(&file.relative_path), file))
                .collect(),
        }
    }

    pub fn get(&self, relative_path: &str) -> Option<&RemoteFile> {
        self.files.get(relative_path)
    }

    /// Remove and return the entry for `relative_path`, marking it as seen
    pub fn take(&mut self, relative_path: &str) -> Option<RemoteFile> {
        self.files.remove(relative_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Unmatched entries, sorted by path
    pub fn into_remaining(self) -> Vec<RemoteFile> {
        let mut remaining: Vec<RemoteFile> = self.files.into_values().collect();
        remaining.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(path: &str) -> RemoteFile {
        RemoteFile {
            relative_path: path.to_string(),
            content_hash: "h".to_string(),
            mime_type: "text/plain".to_string(),
        }
    }

    #[test]
    fn test_take_consumes_entry() {
        let mut snapshot = RemoteFileSnapshot::from_files(vec![remote("b.txt"), remote("a.txt")]);
        assert_eq!(snapshot.len(), 2);

        assert!(snapshot.take("a.txt").is_some());
        assert!(snapshot.take("a.txt").is_none());
        assert!(snapshot.get("b.txt").is_some());

        let remaining = snapshot.into_remaining();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].relative_path, "b.txt");
    }

    #[test]
    fn test_remote_keys_are_normalized() {
        let mut snapshot = RemoteFileSnapshot::from_files(vec![
            remote("./index.html"),
            remote("img\\logo.png"),
        ]);

        let entry = snapshot.take("index.html").expect("matched by normalized path");
        assert_eq!(entry.relative_path, "./index.html");
        assert!(snapshot.take("img/logo.png").is_some());
        assert!(snapshot.is_empty());
    }
}
