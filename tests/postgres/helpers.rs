//! Fixtures wiring the `PostgreSQL` adapters to a migrated test database.

pub use super::cluster::{PostgresCluster, TemporaryDatabase, postgres_cluster};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest::fixture;
use strata::file::domain::{FileId, UserId};
use strata::insights::services::WAITING_TASK_NAME;
use strata::snapshot::{
    adapters::postgres::PostgresSnapshotRepository,
    domain::{Snapshot, SnapshotVersion},
};
use strata::storage::domain::ObjectLocation;
use strata::task::{
    adapters::postgres::PostgresTaskRepository,
    domain::{NewTask, TASK_PAYLOAD_OBJECT_KEY, Task, TaskStatus},
};
use tokio::runtime::Runtime;

/// Schema for tasks and snapshots.
pub const CREATE_INSIGHTS_TABLES_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_insights_tables/up.sql");

/// Template database holding the migrated schema.
pub const TEMPLATE_DB: &str = "strata_test_template";

/// Builds the runtime tests use to drive the async repositories.
pub fn test_runtime() -> eyre::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build test runtime")
}

/// Repositories bound to a database of their own.
pub struct PgContext {
    pub rt: Runtime,
    pub snapshots: PostgresSnapshotRepository,
    pub tasks: PostgresTaskRepository,
    _db: TemporaryDatabase,
}

/// Provides repositories over a fresh database cloned from the template.
#[fixture]
pub fn pg_context(postgres_cluster: PostgresCluster) -> eyre::Result<PgContext> {
    postgres_cluster.ensure_template(TEMPLATE_DB, apply_migrations)?;
    let db = postgres_cluster.temporary_database(TEMPLATE_DB)?;
    let pool = Pool::builder()
        .max_size(2)
        .build(ConnectionManager::<PgConnection>::new(db.url()))?;
    Ok(PgContext {
        rt: test_runtime()?,
        snapshots: PostgresSnapshotRepository::new(pool.clone()),
        tasks: PostgresTaskRepository::new(pool),
        _db: db,
    })
}

fn apply_migrations(url: &str) -> eyre::Result<()> {
    let mut conn = PgConnection::establish(url)?;
    conn.batch_execute(CREATE_INSIGHTS_TABLES_SQL)?;
    Ok(())
}

/// Builds a waiting insights task for `user_id`.
pub fn waiting_task(user_id: UserId) -> eyre::Result<Task> {
    Ok(Task::new(
        NewTask::indeterminate(WAITING_TASK_NAME, user_id, TaskStatus::Waiting)
            .with_payload(TASK_PAYLOAD_OBJECT_KEY, "scan.png"),
        &DefaultClock,
    )?)
}

/// Builds the `version` snapshot of `file_id` over `original_key`.
pub fn snapshot_of(file_id: FileId, version: u64, original_key: &str) -> eyre::Result<Snapshot> {
    Ok(Snapshot::new(
        file_id,
        SnapshotVersion::new(version)?,
        ObjectLocation::new("workspace", original_key),
        &DefaultClock,
    ))
}
