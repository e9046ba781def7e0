//! Applet upload synchronization
//!
//! Applies a [`SyncPlan`] to the remote store: content uploads first, then
//! removals, then at most one entry-file update which is what makes the
//! platform rebuild the applet. Nothing is rolled back when a step fails;
//! re-running the sync converges because uploads are idempotent and
//! removing an absent file counts as success.

use crate::error::Result;
use crate::planner::{self, SyncPlan};
use crate::ports::{AppletFileStore, AppletVersionStore, ProgressReporter};
use crate::snapshot::RemoteFileSnapshot;
use crate::types::{AppletVersionRef, LocalFile, RemoteFile, UploadFile};
use crate::utils::normalize_relative_path;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Phases of a single sync run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPhase {
    Planning,
    Uploading,
    Deleting,
    UpdatingMetadata,
    Done,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyncPhase::Planning => "planning",
            SyncPhase::Uploading => "uploading",
            SyncPhase::Deleting => "deleting",
            SyncPhase::UpdatingMetadata => "updating metadata",
            SyncPhase::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a successful sync
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
    pub unchanged: usize,
    pub uploaded_bytes: u64,
    /// Whether the entry-file update (and so a remote build) was issued
    pub build_triggered: bool,
    pub duration_ms: u64,
}

impl SyncReport {
    /// Creates + updates + deletes
    pub fn changed_count(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted.len()
    }
}

/// Applies local applet files to a remote applet version
pub struct SyncExecutor {
    files: Arc<dyn AppletFileStore>,
    versions: Arc<dyn AppletVersionStore>,
    progress: Arc<dyn ProgressReporter>,
}

impl SyncExecutor {
    pub fn new(
        files: Arc<dyn AppletFileStore>,
        versions: Arc<dyn AppletVersionStore>,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            files,
            versions,
            progress,
        }
    }

    /// Compute the plan without mutating anything
    pub async fn plan(&self, local_files: &[LocalFile], version: &AppletVersionRef) -> Result<SyncPlan> {
        let snapshot = RemoteFileSnapshot::fetch(self.files.as_ref(), version).await?;
        planner::plan(local_files, snapshot)
    }

    /// Synchronize `local_files` into `version` and point its entry file at
    /// `entry_file`.
    pub async fn sync(
        &self,
        local_files: &[LocalFile],
        version: &AppletVersionRef,
        entry_file: &str,
    ) -> Result<SyncReport> {
        let start = Instant::now();
        let entry_file = normalize_relative_path(entry_file);

        let mut phase = SyncPhase::Planning;
        debug!("Sync {}: {}", version, phase);

        let (snapshot, current) = tokio::try_join!(
            RemoteFileSnapshot::fetch(self.files.as_ref(), version),
            self.versions.get(version),
        )?;
        let plan = planner::plan(local_files, snapshot)?;
        info!(
            "Sync plan for {}: {} to create, {} to update, {} to delete, {} unchanged",
            version,
            plan.creates.len(),
            plan.updates.len(),
            plan.deletes.len(),
            plan.unchanged.len()
        );

        phase = SyncPhase::Uploading;
        debug!("Sync {}: {}", version, phase);
        let uploaded_bytes = self.upload_all(&plan, version).await.map_err(|e| {
            error!("Sync {} failed while {}: {}", version, phase, e);
            e
        })?;

        phase = SyncPhase::Deleting;
        debug!("Sync {}: {}", version, phase);
        self.remove_all(&plan.deletes, version).await.map_err(|e| {
            error!("Sync {} failed while {}: {}", version, phase, e);
            e
        })?;

        let entry_changed = current.entry_file.as_deref() != Some(entry_file.as_str());
        let build_triggered = !plan.is_empty() || entry_changed;
        if build_triggered {
            phase = SyncPhase::UpdatingMetadata;
            debug!("Sync {}: {}", version, phase);
            self.versions
                .update_entry_file(version, &entry_file)
                .await
                .map_err(|e| {
                    error!("Sync {} failed while {}: {}", version, phase, e);
                    e
                })?;
        } else {
            debug!("Sync {}: nothing changed, skipping entry file update", version);
        }

        phase = SyncPhase::Done;
        debug!("Sync {}: {}", version, phase);

        Ok(SyncReport {
            created: plan.creates.iter().map(|f| f.relative_path.clone()).collect(),
            updated: plan.updates.iter().map(|f| f.relative_path.clone()).collect(),
            deleted: plan.deletes.iter().map(|f| f.relative_path.clone()).collect(),
            unchanged: plan.unchanged.len(),
            uploaded_bytes,
            build_triggered,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn upload_all(&self, plan: &SyncPlan, version: &AppletVersionRef) -> Result<u64> {
        let total = plan.upload_bytes();
        if total == 0 {
            return Ok(0);
        }

        self.progress.init(total, &version.to_string());
        let uploads = plan.uploads().map(|file| {
            let upload = UploadFile::from(file);
            async move {
                debug!("Uploading {} ({} bytes)", upload.relative_path, upload.size);
                self.files
                    .put(version, &upload, self.progress.as_ref(), false)
                    .await
            }
        });
        let result = try_join_all(uploads).await;
        self.progress.end();

        result.map(|_| total)
    }

    async fn remove_all(&self, deletes: &[RemoteFile], version: &AppletVersionRef) -> Result<()> {
        let removals = deletes.iter().map(|file| async move {
            match self.files.remove(version, &file.relative_path, false).await {
                Ok(()) => Ok(()),
                Err(e) if e.is_not_found() => {
                    debug!("{} was already absent from {}", file.relative_path, version);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        });
        try_join_all(removals).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SignageError;
    use crate::ports::NoProgress;
    use crate::types::AppletVersion;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashSet};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// In-memory applet version recording every call it receives
    #[derive(Default)]
    struct FakeRemote {
        files: Mutex<BTreeMap<String, RemoteFile>>,
        entry_file: Mutex<Option<String>>,
        calls: Mutex<Vec<String>>,
        remove_not_found: bool,
        fail_put: Option<String>,
        fail_remove: Option<String>,
    }

    impl FakeRemote {
        fn with_files(files: Vec<RemoteFile>, entry_file: Option<&str>) -> Self {
            let remote = Self::default();
            *remote.files.lock().unwrap() = files
                .into_iter()
                .map(|f| (f.relative_path.clone(), f))
                .collect();
            *remote.entry_file.lock().unwrap() = entry_file.map(str::to_string);
            remote
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn mutations(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter(|c| !c.starts_with("list") && !c.starts_with("get"))
                .collect()
        }
    }

    #[async_trait]
    impl AppletFileStore for FakeRemote {
        async fn list(&self, _version: &AppletVersionRef) -> Result<Vec<RemoteFile>> {
            self.calls.lock().unwrap().push("list".to_string());
            Ok(self.files.lock().unwrap().values().cloned().collect())
        }

        async fn put(
            &self,
            _version: &AppletVersionRef,
            file: &UploadFile,
            progress: &dyn ProgressReporter,
            _build: bool,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("put {}", file.relative_path));
            if self.fail_put.as_deref() == Some(file.relative_path.as_str()) {
                return Err(SignageError::Api {
                    status: 500,
                    message: "storage unavailable".to_string(),
                });
            }
            progress.update(file.size, Some(&file.relative_path));
            self.files.lock().unwrap().insert(
                file.relative_path.clone(),
                RemoteFile {
                    relative_path: file.relative_path.clone(),
                    content_hash: file.content_hash.clone(),
                    mime_type: file.mime_type.clone(),
                },
            );
            Ok(())
        }

        async fn remove(
            &self,
            _version: &AppletVersionRef,
            relative_path: &str,
            _build: bool,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("remove {}", relative_path));
            if self.remove_not_found {
                return Err(SignageError::NotFound(relative_path.to_string()));
            }
            if self.fail_remove.as_deref() == Some(relative_path) {
                return Err(SignageError::Api {
                    status: 500,
                    message: "storage unavailable".to_string(),
                });
            }
            self.files.lock().unwrap().remove(relative_path);
            Ok(())
        }
    }

    #[async_trait]
    impl AppletVersionStore for FakeRemote {
        async fn get(&self, version: &AppletVersionRef) -> Result<AppletVersion> {
            self.calls.lock().unwrap().push("get".to_string());
            Ok(AppletVersion {
                applet_uid: version.applet_uid.clone(),
                version: version.version.clone(),
                entry_file: self.entry_file.lock().unwrap().clone(),
                created_at: None,
                updated_at: None,
            })
        }

        async fn update_entry_file(&self, _version: &AppletVersionRef, entry_file: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("update {}", entry_file));
            *self.entry_file.lock().unwrap() = Some(entry_file.to_string());
            Ok(())
        }
    }

    fn executor(remote: &Arc<FakeRemote>) -> SyncExecutor {
        SyncExecutor::new(remote.clone(), remote.clone(), Arc::new(NoProgress))
    }

    fn version() -> AppletVersionRef {
        AppletVersionRef::new("applet-1", "1.0.0")
    }

    fn local(path: &str, hash: &str) -> LocalFile {
        LocalFile {
            absolute_path: PathBuf::from("/applet").join(path),
            relative_path: path.to_string(),
            size: 4,
            content_hash: hash.to_string(),
            mime_type: "text/plain".to_string(),
        }
    }

    fn remote(path: &str, hash: &str) -> RemoteFile {
        RemoteFile {
            relative_path: path.to_string(),
            content_hash: hash.to_string(),
            mime_type: "text/plain".to_string(),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_create_delete_and_single_update() -> Result<()> {
        let fake = Arc::new(FakeRemote::with_files(
            vec![remote("a.txt", "X"), remote("c.txt", "Z")],
            Some("a.txt"),
        ));
        let locals = vec![local("a.txt", "X"), local("b.txt", "Y")];

        let report = executor(&fake).sync(&locals, &version(), "a.txt").await?;

        assert_eq!(report.created, vec!["b.txt".to_string()]);
        assert!(report.updated.is_empty());
        assert_eq!(report.deleted, vec!["c.txt".to_string()]);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.changed_count(), 2);
        assert!(report.build_triggered);

        let mutations = fake.mutations();
        assert_eq!(mutations, vec!["put b.txt", "remove c.txt", "update a.txt"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() -> Result<()> {
        let fake = Arc::new(FakeRemote::default());
        let locals = vec![local("index.html", "A"), local("js/app.js", "B")];

        let first = executor(&fake).sync(&locals, &version(), "index.html").await?;
        assert_eq!(first.changed_count(), 2);
        let after_first = fake.mutations().len();

        let second = executor(&fake).sync(&locals, &version(), "index.html").await?;
        assert_eq!(second.changed_count(), 0);
        assert!(!second.build_triggered);
        assert_eq!(fake.mutations().len(), after_first);
        Ok(())
    }

    #[tokio::test]
    async fn test_identical_state_skips_metadata_update() -> Result<()> {
        let fake = Arc::new(FakeRemote::with_files(
            vec![remote("index.html", "A")],
            Some("index.html"),
        ));

        let report = executor(&fake)
            .sync(&[local("index.html", "A")], &version(), "index.html")
            .await?;

        assert_eq!(report.changed_count(), 0);
        assert!(!report.build_triggered);
        assert!(fake.mutations().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_entry_file_change_alone_triggers_update() -> Result<()> {
        let fake = Arc::new(FakeRemote::with_files(
            vec![remote("index.html", "A"), remote("start.html", "B")],
            Some("index.html"),
        ));
        let locals = vec![local("index.html", "A"), local("start.html", "B")];

        let report = executor(&fake).sync(&locals, &version(), "start.html").await?;

        assert_eq!(report.changed_count(), 0);
        assert!(report.build_triggered);
        assert_eq!(fake.mutations(), vec!["update start.html"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_uploads_precede_deletes_and_metadata() -> Result<()> {
        let fake = Arc::new(FakeRemote::with_files(
            vec![remote("old/a.js", "1"), remote("old/b.js", "2")],
            None,
        ));
        let locals = vec![
            local("new/a.js", "1"),
            local("new/b.js", "2"),
            local("index.html", "3"),
        ];

        executor(&fake).sync(&locals, &version(), "index.html").await?;

        let mutations = fake.mutations();
        let last_put = mutations.iter().rposition(|c| c.starts_with("put")).unwrap();
        let first_remove = mutations.iter().position(|c| c.starts_with("remove")).unwrap();
        let update = mutations.iter().position(|c| c.starts_with("update")).unwrap();
        assert!(last_put < first_remove);
        assert!(first_remove < update);
        assert_eq!(update, mutations.len() - 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_not_found_remove_is_tolerated() -> Result<()> {
        let mut fake = FakeRemote::with_files(vec![remote("gone.txt", "G")], Some("index.html"));
        fake.remove_not_found = true;
        let fake = Arc::new(fake);

        let report = executor(&fake)
            .sync(&[local("index.html", "A")], &version(), "index.html")
            .await?;

        assert_eq!(report.deleted, vec!["gone.txt".to_string()]);
        assert!(report.build_triggered);
        assert_eq!(fake.mutations().last().unwrap(), "update index.html");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_file_fails_sync_before_mutations() {
        let fake = Arc::new(FakeRemote::default());
        let mut empty = local("a.txt", "d41d8cd98f00b204e9800998ecf8427e");
        empty.size = 0;

        let err = executor(&fake)
            .sync(&[empty], &version(), "a.txt")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("a.txt"));
        assert!(fake.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_backslash_paths_do_not_recreate_files() -> Result<()> {
        let fake = Arc::new(FakeRemote::with_files(
            vec![remote("dir/sub/file.txt", "H1")],
            Some("dir/sub/file.txt"),
        ));

        let report = executor(&fake)
            .sync(
                &[local("dir\\sub\\file.txt", "H1")],
                &version(),
                "dir\\sub\\file.txt",
            )
            .await?;

        assert_eq!(report.changed_count(), 0);
        assert!(fake.mutations().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_upload_aborts_without_rollback() {
        let mut fake = FakeRemote::with_files(vec![remote("stale.txt", "S")], None);
        fake.fail_put = Some("broken.txt".to_string());
        let fake = Arc::new(fake);
        let locals = vec![local("ok.txt", "1"), local("broken.txt", "2")];

        let err = executor(&fake)
            .sync(&locals, &version(), "ok.txt")
            .await
            .unwrap_err();

        assert!(matches!(err, SignageError::Api { status: 500, .. }));
        let mutations: HashSet<String> = fake.mutations().into_iter().collect();
        assert!(!mutations.iter().any(|c| c.starts_with("remove")));
        assert!(!mutations.iter().any(|c| c.starts_with("update")));
        assert!(fake.files.lock().unwrap().contains_key("stale.txt"));
    }

    #[tokio::test]
    async fn test_failed_remove_aborts_before_metadata_update() {
        let mut fake = FakeRemote::with_files(
            vec![remote("stale.txt", "S"), remote("index.html", "old")],
            Some("index.html"),
        );
        fake.fail_remove = Some("stale.txt".to_string());
        let fake = Arc::new(fake);
        let locals = vec![local("index.html", "new"), local("app.js", "J")];

        let err = executor(&fake)
            .sync(&locals, &version(), "index.html")
            .await
            .unwrap_err();

        assert!(matches!(err, SignageError::Api { status: 500, .. }));
        assert!(fake.mutations().contains(&"remove stale.txt".to_string()));
        assert!(!fake.mutations().iter().any(|c| c.starts_with("update")));

        let files = fake.files.lock().unwrap();
        assert_eq!(files["index.html"].content_hash, "new");
        assert_eq!(files["app.js"].content_hash, "J");
        assert!(files.contains_key("stale.txt"));
    }

    #[tokio::test]
    async fn test_plan_does_not_mutate() -> Result<()> {
        let fake = Arc::new(FakeRemote::with_files(vec![remote("c.txt", "Z")], None));

        let plan = executor(&fake).plan(&[local("b.txt", "Y")], &version()).await?;

        assert_eq!(plan.creates.len(), 1);
        assert_eq!(plan.deletes.len(), 1);
        assert!(fake.mutations().is_empty());
        Ok(())
    }
}
