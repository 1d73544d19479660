//! Shared fixtures for in-memory insights integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use strata::{
    cache::{adapters::MokaCacheBackend, domain::Cacheable, ports::CacheBackend},
    file::{
        adapters::memory::{InMemoryFileGuard, InMemoryFileRepository},
        domain::{File, FileId, Permission, UserId},
        ports::FileRepository,
    },
    insights::{
        domain::{EntityListQuery, InsightsEntity},
        services::{BackgroundRunner, InsightsDependencies, InsightsService},
    },
    pipeline::{
        adapters::RecordingPipelineClient,
        domain::{PipelineOutcome, PipelineReport, PipelineRunOptions},
    },
    search::adapters::InMemorySearchIndex,
    snapshot::{
        adapters::memory::InMemorySnapshotRepository,
        domain::{InsightsArtifacts, Snapshot, SnapshotVersion},
        ports::SnapshotRepository,
    },
    storage::{adapters::InMemoryObjectStorage, domain::ObjectLocation, ports::ObjectStorage},
    task::adapters::memory::InMemoryTaskRepository,
};

/// Bucket holding every object written by the tests.
pub const BUCKET: &str = "workspace";

/// Insights service wired to in-memory adapters.
pub struct Workspace {
    pub service: InsightsService<DefaultClock>,
    pub cache: Arc<MokaCacheBackend>,
    pub files: Arc<InMemoryFileRepository>,
    pub snapshots: Arc<InMemorySnapshotRepository>,
    pub storage: Arc<InMemoryObjectStorage>,
    pub pipeline: Arc<RecordingPipelineClient>,
    pub guard: Arc<InMemoryFileGuard>,
    pub owner: UserId,
}

#[fixture]
pub fn workspace() -> Workspace {
    let cache = Arc::new(MokaCacheBackend::new(1_024, None));
    let files = Arc::new(InMemoryFileRepository::new());
    let snapshots = Arc::new(InMemorySnapshotRepository::new());
    let storage = Arc::new(InMemoryObjectStorage::new());
    let pipeline = Arc::new(RecordingPipelineClient::new());
    let guard = Arc::new(InMemoryFileGuard::new());
    let service = InsightsService::new(
        InsightsDependencies {
            files: Arc::clone(&files) as _,
            snapshots: Arc::clone(&snapshots) as _,
            tasks: Arc::new(InMemoryTaskRepository::new()),
            cache: Arc::clone(&cache) as _,
            search: Arc::new(InMemorySearchIndex::new()),
            storage: Arc::clone(&storage) as _,
            pipeline: Arc::clone(&pipeline) as _,
            guard: Arc::clone(&guard) as _,
        },
        BackgroundRunner::new(4),
        Arc::new(DefaultClock),
    );
    Workspace {
        service,
        cache,
        files,
        snapshots,
        storage,
        pipeline,
        guard,
        owner: UserId::new(),
    }
}

impl Workspace {
    /// Stores an owned file whose first snapshot holds `original_key`.
    ///
    /// # Errors
    ///
    /// Returns an error when a store rejects the records.
    pub async fn upload(&self, name: &str, original_key: &str) -> eyre::Result<(File, Snapshot)> {
        let mut file = File::new_file(name, &DefaultClock)?;
        let snapshot = Snapshot::new(
            file.id(),
            SnapshotVersion::new(1)?,
            ObjectLocation::new(BUCKET, original_key),
            &DefaultClock,
        );
        file.set_snapshot(snapshot.id(), &DefaultClock);
        self.snapshots.store(&snapshot).await?;
        self.files.store(&file).await?;
        self.guard.grant(self.owner, file.id(), Permission::Owner)?;
        Ok((file, snapshot))
    }

    /// Adds a newer snapshot holding `original_key` and makes it current.
    ///
    /// # Errors
    ///
    /// Returns an error when a store or the cache rejects the change.
    pub async fn upload_version(
        &self,
        file: &mut File,
        previous: &Snapshot,
        original_key: &str,
    ) -> eyre::Result<Snapshot> {
        let snapshot = Snapshot::new(
            file.id(),
            SnapshotVersion::new(previous.version().value() + 1)?,
            ObjectLocation::new(BUCKET, original_key),
            &DefaultClock,
        );
        file.set_snapshot(snapshot.id(), &DefaultClock);
        self.snapshots.store(&snapshot).await?;
        self.files.update(file).await?;
        self.cache.delete(&File::cache_key(file.id())).await?;
        Ok(snapshot)
    }

    /// Returns the only submission recorded so far.
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly one run was submitted.
    pub fn single_submission(&self) -> eyre::Result<PipelineRunOptions> {
        let mut submissions = self.pipeline.submissions()?;
        eyre::ensure!(
            submissions.len() == 1,
            "expected one submission, found {}",
            submissions.len()
        );
        submissions
            .pop()
            .ok_or_else(|| eyre::eyre!("missing submission"))
    }

    /// Plays the worker side of `run`: writes its artifacts and reports
    /// success.
    ///
    /// # Errors
    ///
    /// Returns an error when storage or the completion service fails.
    pub async fn complete(
        &self,
        run: &PipelineRunOptions,
        entities: &[InsightsEntity],
    ) -> eyre::Result<InsightsArtifacts> {
        let prefix = run.snapshot_id.to_string();
        let entities_location = ObjectLocation::new(BUCKET, format!("{prefix}/entities.json"));
        let text_location = ObjectLocation::new(BUCKET, format!("{prefix}/text.txt"));
        self.storage
            .put_object(&entities_location, serde_json::to_vec(entities)?)
            .await?;
        self.storage
            .put_object(&text_location, b"ACME Corporation invoice".to_vec())
            .await?;
        let artifacts = InsightsArtifacts {
            entities: Some(entities_location),
            text: Some(text_location),
            ocr: None,
        };
        self.service
            .completion()
            .apply(PipelineReport {
                task_id: run.task_id,
                snapshot_id: run.snapshot_id,
                outcome: PipelineOutcome::Succeeded(artifacts.clone()),
            })
            .await?;
        Ok(artifacts)
    }

    /// Reads the stored snapshot, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot is missing.
    pub async fn stored_snapshot(&self, snapshot: &Snapshot) -> eyre::Result<Snapshot> {
        self.snapshots
            .find_by_id(snapshot.id())
            .await?
            .ok_or_else(|| eyre::eyre!("snapshot {} missing", snapshot.id()))
    }

    /// Lists the first page of entities of `file_id`.
    ///
    /// # Errors
    ///
    /// Returns the service error unchanged.
    pub async fn first_page(
        &self,
        file_id: FileId,
    ) -> Result<Vec<InsightsEntity>, strata::insights::services::InsightsError> {
        let query = EntityListQuery {
            query: String::new(),
            page: 1,
            size: 50,
            sort_by: "frequency".to_owned(),
            sort_order: String::new(),
        };
        self.service
            .list_entities(file_id, &query, self.owner)
            .await
            .map(|list| list.data)
    }
}

/// Builds an entity with a fixed label.
#[must_use]
pub fn entity(text: &str, frequency: u64) -> InsightsEntity {
    InsightsEntity {
        text: text.to_owned(),
        label: "ORG".to_owned(),
        frequency,
    }
}
