//! Remote store and progress traits consumed by the sync engine
//!
//! The REST client in the CLI implements the store traits; tests use
//! in-memory fakes.

use crate::error::Result;
use crate::types::{AppletVersion, AppletVersionRef, RemoteFile, UploadFile};
use async_trait::async_trait;

/// Remote file set of an applet version
#[async_trait]
pub trait AppletFileStore: Send + Sync {
    /// Full listing of the files of a version
    async fn list(&self, version: &AppletVersionRef) -> Result<Vec<RemoteFile>>;

    /// Idempotent upload keyed by relative path
    async fn put(
        &self,
        version: &AppletVersionRef,
        file: &UploadFile,
        progress: &dyn ProgressReporter,
        build: bool,
    ) -> Result<()>;

    /// Remove a file; fails with `SignageError::NotFound` when already absent
    async fn remove(&self, version: &AppletVersionRef, relative_path: &str, build: bool)
        -> Result<()>;
}

/// Applet version metadata
#[async_trait]
pub trait AppletVersionStore: Send + Sync {
    async fn get(&self, version: &AppletVersionRef) -> Result<AppletVersion>;

    /// Setting the entry file triggers the remote build
    async fn update_entry_file(&self, version: &AppletVersionRef, entry_file: &str) -> Result<()>;
}

/// Byte-level progress sink; purely observational
pub trait ProgressReporter: Send + Sync {
    fn init(&self, size: u64, name: &str);
    fn update(&self, add: u64, name: Option<&str>);
    fn end(&self);
}

/// Reporter that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn init(&self, _size: u64, _name: &str) {}
    fn update(&self, _add: u64, _name: Option<&str>) {}
    fn end(&self) {}
}
