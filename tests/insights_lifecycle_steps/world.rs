//! Shared world state for insights lifecycle BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use strata::{
    cache::adapters::MokaCacheBackend,
    file::{
        adapters::memory::{InMemoryFileGuard, InMemoryFileRepository},
        domain::{File, UserId},
    },
    insights::services::{
        BackgroundRunner, InsightsDeletion, InsightsDependencies, InsightsError, InsightsService,
    },
    pipeline::adapters::RecordingPipelineClient,
    search::adapters::InMemorySearchIndex,
    snapshot::{adapters::memory::InMemorySnapshotRepository, domain::Snapshot},
    storage::adapters::InMemoryObjectStorage,
    task::{adapters::memory::InMemoryTaskRepository, domain::Task},
};

/// Scenario world for insights lifecycle behaviour tests.
pub struct InsightsWorld {
    pub service: InsightsService<DefaultClock>,
    pub files: Arc<InMemoryFileRepository>,
    pub snapshots: Arc<InMemorySnapshotRepository>,
    pub tasks: Arc<InMemoryTaskRepository>,
    pub storage: Arc<InMemoryObjectStorage>,
    pub pipeline: Arc<RecordingPipelineClient>,
    pub guard: Arc<InMemoryFileGuard>,
    pub owner: UserId,
    pub viewer: Option<UserId>,
    pub file: Option<File>,
    pub snapshot: Option<Snapshot>,
    pub last_task: Option<Task>,
    pub deletion: Option<InsightsDeletion>,
    pub last_error: Option<InsightsError>,
}

impl InsightsWorld {
    /// Creates a world wired to in-memory adapters.
    #[must_use]
    pub fn new() -> Self {
        let files = Arc::new(InMemoryFileRepository::new());
        let snapshots = Arc::new(InMemorySnapshotRepository::new());
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let storage = Arc::new(InMemoryObjectStorage::new());
        let pipeline = Arc::new(RecordingPipelineClient::new());
        let guard = Arc::new(InMemoryFileGuard::new());
        let service = InsightsService::new(
            InsightsDependencies {
                files: Arc::clone(&files) as _,
                snapshots: Arc::clone(&snapshots) as _,
                tasks: Arc::clone(&tasks) as _,
                cache: Arc::new(MokaCacheBackend::new(128, None)),
                search: Arc::new(InMemorySearchIndex::new()),
                storage: Arc::clone(&storage) as _,
                pipeline: Arc::clone(&pipeline) as _,
                guard: Arc::clone(&guard) as _,
            },
            BackgroundRunner::new(1),
            Arc::new(DefaultClock),
        );

        Self {
            service,
            files,
            snapshots,
            tasks,
            storage,
            pipeline,
            guard,
            owner: UserId::new(),
            viewer: None,
            file: None,
            snapshot: None,
            last_task: None,
            deletion: None,
            last_error: None,
        }
    }

    /// Returns the file created by the scenario.
    pub fn file(&self) -> eyre::Result<&File> {
        self.file
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing file in scenario world"))
    }

    /// Returns the current snapshot created by the scenario.
    pub fn snapshot(&self) -> eyre::Result<&Snapshot> {
        self.snapshot
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing snapshot in scenario world"))
    }
}

impl Default for InsightsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> InsightsWorld {
    InsightsWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
