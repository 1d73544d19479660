//! Insights orchestration over files, snapshots, tasks and the pipeline.

use super::{
    background::{BackgroundHandle, BackgroundRunner},
    cleanup::CleanupJob,
    completion::PipelineCompletionService,
    error::{InsightsError, InsightsResult},
    locks::SnapshotLocks,
    sync::{SnapshotSync, TaskSync},
};
use crate::cache::{
    ports::CacheBackend,
    services::{FileCache, ReadThroughCache},
};
use crate::file::{
    domain::{File, FileId, Permission, UserId},
    ports::{FileGuard, FileRepository},
};
use crate::insights::domain::{
    EntityList, EntityListQuery, EntityTotals, InsightsEntity, InsightsInfo, InsightsLanguage,
    LANGUAGES, find_language, pipeline_input,
};
use crate::pipeline::{domain::PipelineRunOptions, ports::PipelineClient};
use crate::search::ports::SearchIndex;
use crate::snapshot::{
    domain::{Snapshot, SnapshotDomainError, SnapshotId, SnapshotStatus},
    ports::SnapshotRepository,
};
use crate::storage::{
    domain::{MediaIdentifier, ObjectLocation},
    ports::ObjectStorage,
};
use crate::task::{
    domain::{NewTask, TASK_PAYLOAD_OBJECT_KEY, Task, TaskStatus},
    ports::TaskRepository,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Name of the task tracking a requested pipeline run.
pub const WAITING_TASK_NAME: &str = "Waiting.";

/// Name of the task tracking an insights deletion.
pub const DELETING_TASK_NAME: &str = "Deleting insights.";

/// Ports the orchestrator is wired to.
#[derive(Clone)]
pub struct InsightsDependencies {
    /// File records.
    pub files: Arc<dyn FileRepository>,
    /// Snapshot records.
    pub snapshots: Arc<dyn SnapshotRepository>,
    /// Task records.
    pub tasks: Arc<dyn TaskRepository>,
    /// Shared cache backend.
    pub cache: Arc<dyn CacheBackend>,
    /// Search index mirror.
    pub search: Arc<dyn SearchIndex>,
    /// Object storage holding originals and derived artifacts.
    pub storage: Arc<dyn ObjectStorage>,
    /// Conversion worker client.
    pub pipeline: Arc<dyn PipelineClient>,
    /// Authorization guard.
    pub guard: Arc<dyn FileGuard>,
}

/// Result of requesting an insights deletion.
#[derive(Debug)]
pub struct InsightsDeletion {
    /// Running task tracking the deletion.
    pub task: Task,
    /// Handle to the background cleanup.
    pub cleanup: BackgroundHandle,
}

/// Raw bytes of a downloaded artifact with the records it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightsDownload {
    /// File the artifact belongs to.
    pub file: File,
    /// Snapshot carrying the artifact.
    pub snapshot: Snapshot,
    /// Artifact content.
    pub bytes: Vec<u8>,
}

/// Coordinates insights creation, deletion and retrieval.
pub struct InsightsService<C> {
    files: FileCache,
    snapshots: SnapshotSync,
    tasks: TaskSync,
    storage: Arc<dyn ObjectStorage>,
    pipeline: Arc<dyn PipelineClient>,
    guard: Arc<dyn FileGuard>,
    runner: BackgroundRunner,
    locks: SnapshotLocks,
    media: MediaIdentifier,
    clock: Arc<C>,
}

impl<C: Clock + Send + Sync + 'static> InsightsService<C> {
    /// Wires the orchestrator to its ports.
    #[must_use]
    pub fn new(dependencies: InsightsDependencies, runner: BackgroundRunner, clock: Arc<C>) -> Self {
        let InsightsDependencies {
            files,
            snapshots,
            tasks,
            cache,
            search,
            storage,
            pipeline,
            guard,
        } = dependencies;
        Self {
            files: ReadThroughCache::new(Arc::clone(&cache), files),
            snapshots: SnapshotSync::new(snapshots, Arc::clone(&cache), Arc::clone(&search)),
            tasks: TaskSync::new(tasks, cache, search),
            storage,
            pipeline,
            guard,
            runner,
            locks: SnapshotLocks::new(),
            media: MediaIdentifier::new(),
            clock,
        }
    }

    /// Returns the synchronised task access used by the orchestrator.
    #[must_use]
    pub const fn tasks(&self) -> &TaskSync {
        &self.tasks
    }

    /// Returns the synchronised snapshot access used by the orchestrator.
    #[must_use]
    pub const fn snapshots(&self) -> &SnapshotSync {
        &self.snapshots
    }

    /// Returns the background runner executing cleanups.
    #[must_use]
    pub const fn runner(&self) -> &BackgroundRunner {
        &self.runner
    }

    /// Builds the service applying pipeline reports, sharing this
    /// orchestrator's stores and snapshot locks.
    #[must_use]
    pub fn completion(&self) -> PipelineCompletionService<C> {
        PipelineCompletionService::new(
            self.snapshots.clone(),
            self.tasks.clone(),
            self.locks.clone(),
            Arc::clone(&self.clock),
        )
    }

    /// Returns the catalog of languages insights can be extracted in.
    #[must_use]
    pub const fn languages() -> &'static [InsightsLanguage] {
        &LANGUAGES
    }

    /// Requests insights for the current snapshot of `file_id` in
    /// `language_id`.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::UnsupportedLanguage`],
    /// [`InsightsError::FileNotFound`], [`InsightsError::Forbidden`],
    /// [`InsightsError::FileIsNotAFile`],
    /// [`InsightsError::SnapshotHasPendingTask`] and the failures of the
    /// stores and of the pipeline submission.
    #[instrument(skip_all, fields(%file_id, %user_id, language = language_id))]
    pub async fn create(
        &self,
        file_id: FileId,
        language_id: &str,
        user_id: UserId,
    ) -> InsightsResult<Task> {
        let language = find_language(language_id)
            .ok_or_else(|| InsightsError::UnsupportedLanguage(language_id.to_owned()))?;
        let (file, snapshot_id) = self
            .authorized_file(file_id, user_id, Permission::Editor)
            .await?;
        let _guard = self.locks.acquire(snapshot_id).await?;
        let snapshot = self.snapshots.find(snapshot_id).await?;
        self.ensure_no_pending_task(&snapshot).await?;
        self.start_pipeline(&file, snapshot, language.id, user_id)
            .await
    }

    /// Re-runs insights for the current snapshot of `file_id` in the
    /// language of the nearest previous snapshot that has one.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::SnapshotCannotBePatched`] when no previous
    /// snapshot has a language, plus the errors of [`Self::create`].
    #[instrument(skip_all, fields(%file_id, %user_id))]
    pub async fn patch(&self, file_id: FileId, user_id: UserId) -> InsightsResult<Task> {
        let (file, snapshot_id) = self
            .authorized_file(file_id, user_id, Permission::Editor)
            .await?;
        let _guard = self.locks.acquire(snapshot_id).await?;
        let snapshot = self.snapshots.find(snapshot_id).await?;
        self.ensure_no_pending_task(&snapshot).await?;
        let language = self
            .previous_language(&snapshot)
            .await?
            .ok_or(InsightsError::SnapshotCannotBePatched(snapshot_id))?;
        self.start_pipeline(&file, snapshot, &language, user_id)
            .await
    }

    /// Deletes the insights of the current snapshot of `file_id`.
    ///
    /// Returns the running deletion task immediately; object removal happens
    /// on the background runner.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::InsightsNotFound`] when the snapshot has no
    /// entities, [`InsightsError::SnapshotHasPendingTask`], permission
    /// errors and store failures.
    #[instrument(skip_all, fields(%file_id, %user_id))]
    pub async fn delete(&self, file_id: FileId, user_id: UserId) -> InsightsResult<InsightsDeletion> {
        let (file, snapshot_id) = self
            .authorized_file(file_id, user_id, Permission::Owner)
            .await?;
        let _guard = self.locks.acquire(snapshot_id).await?;
        let mut snapshot = self.snapshots.find(snapshot_id).await?;
        if !snapshot.has_entities() {
            return Err(InsightsError::InsightsNotFound(file_id));
        }
        self.ensure_no_pending_task(&snapshot).await?;

        let clock = &*self.clock;
        let task = Task::new(
            NewTask::indeterminate(DELETING_TASK_NAME, user_id, TaskStatus::Running)
                .with_payload(TASK_PAYLOAD_OBJECT_KEY, file.name()),
            clock,
        )?;
        enter_status(&mut snapshot, SnapshotStatus::Processing, clock)?;
        snapshot.attach_task(task.id(), clock);
        self.tasks.insert_and_sync(&task).await?;
        self.snapshots.save_and_sync(&snapshot).await?;

        let cleanup = self
            .runner
            .spawn("insights_cleanup", self.cleanup_job().run(task.clone(), snapshot))?;
        info!(task_id = %task.id(), "insights deletion scheduled");
        Ok(InsightsDeletion { task, cleanup })
    }

    /// Lists the entities of the newest snapshot of `file_id` that has them.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::InvalidListOptions`],
    /// [`InsightsError::InsightsNotFound`], permission errors and storage
    /// failures.
    #[instrument(skip_all, fields(%file_id, %user_id))]
    pub async fn list_entities(
        &self,
        file_id: FileId,
        query: &EntityListQuery,
        user_id: UserId,
    ) -> InsightsResult<EntityList> {
        let options = query.validate()?;
        let entities = self.load_entities(file_id, user_id).await?;
        Ok(options.apply(entities))
    }

    /// Returns only the totals [`Self::list_entities`] would report.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::list_entities`].
    #[instrument(skip_all, fields(%file_id, %user_id))]
    pub async fn count_entities(
        &self,
        file_id: FileId,
        query: &EntityListQuery,
        user_id: UserId,
    ) -> InsightsResult<EntityTotals> {
        let options = query.validate()?;
        let entities = self.load_entities(file_id, user_id).await?;
        Ok(options.totals(entities))
    }

    /// Reports whether insights exist for `file_id` and whether they are
    /// outdated.
    ///
    /// # Errors
    ///
    /// Returns permission errors and store failures.
    #[instrument(skip_all, fields(%file_id, %user_id))]
    pub async fn read_info(&self, file_id: FileId, user_id: UserId) -> InsightsResult<InsightsInfo> {
        let (_, snapshot_id) = self
            .authorized_file(file_id, user_id, Permission::Viewer)
            .await?;
        let snapshot = self.snapshots.find(snapshot_id).await?;
        Ok(self
            .insights_source(snapshot)
            .await?
            .map_or_else(InsightsInfo::unavailable, |(source, is_outdated)| {
                InsightsInfo::available(&source, is_outdated)
            }))
    }

    /// Downloads the extracted text of the newest snapshot with insights.
    ///
    /// # Errors
    ///
    /// Returns [`InsightsError::InsightsNotFound`],
    /// [`InsightsError::ArtifactMissing`] or
    /// [`InsightsError::ObjectNotFound`] when the text is absent, plus
    /// permission errors and storage failures.
    #[instrument(skip_all, fields(%file_id, %user_id))]
    pub async fn download_text(
        &self,
        file_id: FileId,
        user_id: UserId,
    ) -> InsightsResult<InsightsDownload> {
        self.download(file_id, user_id, "text", Snapshot::text).await
    }

    /// Downloads the searchable OCR document of the newest snapshot with
    /// insights.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::download_text`] for the OCR object.
    #[instrument(skip_all, fields(%file_id, %user_id))]
    pub async fn download_ocr(
        &self,
        file_id: FileId,
        user_id: UserId,
    ) -> InsightsResult<InsightsDownload> {
        self.download(file_id, user_id, "ocr", Snapshot::ocr).await
    }

    async fn download(
        &self,
        file_id: FileId,
        user_id: UserId,
        artifact: &'static str,
        select: fn(&Snapshot) -> Option<&ObjectLocation>,
    ) -> InsightsResult<InsightsDownload> {
        let (file, snapshot_id) = self
            .authorized_file(file_id, user_id, Permission::Viewer)
            .await?;
        let current = self.snapshots.find(snapshot_id).await?;
        let (snapshot, _) = self
            .insights_source(current)
            .await?
            .ok_or(InsightsError::InsightsNotFound(file_id))?;
        let location = select(&snapshot).ok_or(InsightsError::ArtifactMissing {
            snapshot_id: snapshot.id(),
            artifact,
        })?;
        let bytes = self.storage.get_object(location).await?;
        Ok(InsightsDownload {
            file,
            snapshot,
            bytes,
        })
    }

    async fn authorized_file(
        &self,
        file_id: FileId,
        user_id: UserId,
        permission: Permission,
    ) -> InsightsResult<(File, SnapshotId)> {
        let file = self
            .files
            .get(file_id)
            .await
            .map_err(|err| InsightsError::from_cache(err, InsightsError::FileNotFound(file_id)))?;
        self.guard.authorize(user_id, &file, permission).await?;
        let snapshot_id = file
            .current_snapshot()
            .ok_or(InsightsError::FileIsNotAFile(file_id))?;
        Ok((file, snapshot_id))
    }

    async fn ensure_no_pending_task(&self, snapshot: &Snapshot) -> InsightsResult<()> {
        let Some(task_id) = snapshot.task_id() else {
            return Ok(());
        };
        match self.tasks.find_optional(task_id).await? {
            Some(task) if task.is_pending() => {
                Err(InsightsError::SnapshotHasPendingTask(snapshot.id()))
            }
            Some(_) | None => Ok(()),
        }
    }

    async fn previous_language(&self, snapshot: &Snapshot) -> InsightsResult<Option<String>> {
        let previous = self
            .snapshots
            .find_all_previous(snapshot.file_id(), snapshot.version())
            .await?;
        Ok(previous
            .into_iter()
            .find_map(|older| older.language().map(str::to_owned)))
    }

    /// Returns `current` when it has entities, else the newest previous
    /// snapshot with entities flagged as outdated.
    async fn insights_source(&self, current: Snapshot) -> InsightsResult<Option<(Snapshot, bool)>> {
        if current.has_entities() {
            return Ok(Some((current, false)));
        }
        let previous = self
            .snapshots
            .find_all_previous(current.file_id(), current.version())
            .await?;
        Ok(previous
            .into_iter()
            .find(Snapshot::has_entities)
            .map(|older| (older, true)))
    }

    async fn load_entities(
        &self,
        file_id: FileId,
        user_id: UserId,
    ) -> InsightsResult<Vec<InsightsEntity>> {
        let (_, snapshot_id) = self
            .authorized_file(file_id, user_id, Permission::Viewer)
            .await?;
        let current = self.snapshots.find(snapshot_id).await?;
        let (snapshot, _) = self
            .insights_source(current)
            .await?
            .ok_or(InsightsError::InsightsNotFound(file_id))?;
        let location = snapshot
            .entities()
            .ok_or(InsightsError::InsightsNotFound(file_id))?;
        let raw = self.storage.get_text(location).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn start_pipeline(
        &self,
        file: &File,
        mut snapshot: Snapshot,
        language: &str,
        user_id: UserId,
    ) -> InsightsResult<Task> {
        let clock = &*self.clock;
        let input = pipeline_input(&snapshot, self.media)
            .cloned()
            .ok_or(InsightsError::RenditionMissing(snapshot.id()))?;
        let mut task = Task::new(
            NewTask::indeterminate(WAITING_TASK_NAME, user_id, TaskStatus::Waiting)
                .with_payload(TASK_PAYLOAD_OBJECT_KEY, file.name()),
            clock,
        )?;
        snapshot.set_language(language, clock);
        enter_status(&mut snapshot, SnapshotStatus::Waiting, clock)?;
        snapshot.attach_task(task.id(), clock);
        self.tasks.insert_and_sync(&task).await?;
        self.snapshots.save_and_sync(&snapshot).await?;

        let run = PipelineRunOptions::insights(task.id(), snapshot.id(), &input, language);
        if let Err(err) = self.pipeline.run(&run).await {
            warn!(task_id = %task.id(), error = %err, "pipeline submission failed");
            self.record_submission_failure(&mut task, &mut snapshot, &err.to_string())
                .await;
            return Err(err.into());
        }
        info!(task_id = %task.id(), snapshot_id = %snapshot.id(), "insights pipeline submitted");
        Ok(task)
    }

    async fn record_submission_failure(
        &self,
        task: &mut Task,
        snapshot: &mut Snapshot,
        message: &str,
    ) {
        let clock = &*self.clock;
        let task_saved = match task.fail(message, clock) {
            Ok(()) => self.tasks.save_and_sync(task).await,
            Err(err) => Err(err.into()),
        };
        if let Err(err) = task_saved {
            error!(task_id = %task.id(), error = %err, "failed to record submission failure");
        }
        let snapshot_saved = match snapshot.transition_to(SnapshotStatus::Error, clock) {
            Ok(()) => self.snapshots.save_and_sync(snapshot).await,
            Err(err) => Err(err.into()),
        };
        if let Err(err) = snapshot_saved {
            error!(snapshot_id = %snapshot.id(), error = %err, "failed to record submission failure");
        }
    }

    fn cleanup_job(&self) -> CleanupJob<C> {
        CleanupJob {
            snapshots: self.snapshots.clone(),
            tasks: self.tasks.clone(),
            storage: Arc::clone(&self.storage),
            media: self.media,
            clock: Arc::clone(&self.clock),
        }
    }
}

/// Moves `snapshot` to `target` unless it is already there.
///
/// A snapshot left in `waiting` or `processing` by a task that no longer
/// exists may be re-entered.
fn enter_status(
    snapshot: &mut Snapshot,
    target: SnapshotStatus,
    clock: &impl Clock,
) -> Result<(), SnapshotDomainError> {
    if snapshot.status() == target {
        return Ok(());
    }
    snapshot.transition_to(target, clock)
}
