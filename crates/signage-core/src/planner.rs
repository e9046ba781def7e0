//! Classification of local files against the remote snapshot

use crate::error::{Result, SignageError};
use crate::snapshot::RemoteFileSnapshot;
use crate::types::{LocalFile, RemoteFile};
use crate::utils::normalize_relative_path;
use std::collections::HashSet;

/// What happens to one relative path during a sync
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileAction {
    Create,
    Update,
    Unchanged,
    Delete,
}

impl FileAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileAction::Create => "create",
            FileAction::Update => "update",
            FileAction::Unchanged => "unchanged",
            FileAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for FileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of diffing local files against the remote snapshot.
///
/// Local files carry normalized relative paths. Every local path lands in
/// exactly one of `creates`, `updates`, `unchanged`; `deletes` holds the
/// remote entries no local path matched.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    pub creates: Vec<LocalFile>,
    pub updates: Vec<LocalFile>,
    pub unchanged: Vec<LocalFile>,
    pub deletes: Vec<RemoteFile>,
}

impl SyncPlan {
    /// Files whose content has to be uploaded
    pub fn uploads(&self) -> impl Iterator<Item = &LocalFile> {
        self.creates.iter().chain(self.updates.iter())
    }

    pub fn upload_bytes(&self) -> u64 {
        self.uploads().map(|file| file.size).sum()
    }

    /// Number of mutations the plan will issue
    pub fn changed_count(&self) -> usize {
        self.creates.len() + self.updates.len() + self.deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changed_count() == 0
    }

    /// Action assigned to a relative path, if the path is part of the plan
    pub fn action_for(&self, relative_path: &str) -> Option<FileAction> {
        let has = |files: &[LocalFile]| files.iter().any(|f| f.relative_path == relative_path);
        if has(&self.creates) {
            Some(FileAction::Create)
        } else if has(&self.updates) {
            Some(FileAction::Update)
        } else if has(&self.unchanged) {
            Some(FileAction::Unchanged)
        } else if self.deletes.iter().any(|f| f.relative_path == relative_path) {
            Some(FileAction::Delete)
        } else {
            None
        }
    }
}

/// Diff `local` against `remote` in a single pass.
///
/// Fails if two local files normalize to the same relative path or if a
/// file that needs uploading is empty.
pub fn plan(local: &[LocalFile], mut remote: RemoteFileSnapshot) -> Result<SyncPlan> {
    let mut plan = SyncPlan::default();
    let mut seen = HashSet::with_capacity(local.len());

    for file in local {
        let mut file = file.clone();
        file.relative_path = normalize_relative_path(&file.relative_path);

        if !seen.insert(file.relative_path.clone()) {
            return Err(SignageError::Validation(format!(
                "Duplicate local file path: {}",
                file.relative_path
            )));
        }

        match remote.take(&file.relative_path) {
            None => plan.creates.push(file),
            Some(existing)
                if existing.content_hash != file.content_hash
                    || existing.mime_type != file.mime_type =>
            {
                plan.updates.push(file)
            }
            Some(_) => plan.unchanged.push(file),
        }
    }

    plan.deletes = remote.into_remaining();

    if let Some(empty) = plan.uploads().find(|file| file.size == 0) {
        return Err(SignageError::EmptyFile {
            path: empty.relative_path.clone(),
        });
    }

    Ok(plan)
}
