//! `PostgreSQL` repository implementation for snapshot storage.

use super::{
    models::{NewSnapshotRow, SnapshotChangeset, SnapshotRow},
    schema::snapshots,
};
use crate::file::domain::FileId;
use crate::snapshot::{
    domain::{PersistedSnapshotData, Snapshot, SnapshotId, SnapshotStatus, SnapshotVersion},
    ports::{SnapshotRepository, SnapshotRepositoryError, SnapshotRepositoryResult},
};
use crate::storage::domain::ObjectLocation;
use crate::task::domain::TaskId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use serde_json::Value;

/// `PostgreSQL` connection pool type used by snapshot adapters.
pub type SnapshotPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed snapshot repository.
#[derive(Debug, Clone)]
pub struct PostgresSnapshotRepository {
    pool: SnapshotPgPool,
}

impl PostgresSnapshotRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: SnapshotPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> SnapshotRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> SnapshotRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(SnapshotRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(SnapshotRepositoryError::persistence)?
    }
}

#[async_trait]
impl SnapshotRepository for PostgresSnapshotRepository {
    async fn store(&self, snapshot: &Snapshot) -> SnapshotRepositoryResult<()> {
        let snapshot_id = snapshot.id();
        let file_id = snapshot.file_id();
        let version = snapshot.version();
        let new_row = to_new_row(snapshot)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(snapshots::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_version_unique_violation(info.as_ref()) =>
                    {
                        SnapshotRepositoryError::DuplicateVersion { file_id, version }
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        SnapshotRepositoryError::DuplicateSnapshot(snapshot_id)
                    }
                    _ => SnapshotRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, snapshot: &Snapshot) -> SnapshotRepositoryResult<()> {
        let snapshot_id = snapshot.id();
        let changeset = to_changeset(snapshot)?;

        self.run_blocking(move |connection| {
            let affected = diesel::update(snapshots::table.find(snapshot_id.into_inner()))
                .set(&changeset)
                .execute(connection)
                .map_err(SnapshotRepositoryError::persistence)?;
            if affected == 0 {
                return Err(SnapshotRepositoryError::NotFound(snapshot_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: SnapshotId) -> SnapshotRepositoryResult<Option<Snapshot>> {
        self.run_blocking(move |connection| {
            let row = snapshots::table
                .filter(snapshots::id.eq(id.into_inner()))
                .select(SnapshotRow::as_select())
                .first::<SnapshotRow>(connection)
                .optional()
                .map_err(SnapshotRepositoryError::persistence)?;
            row.map(row_to_snapshot).transpose()
        })
        .await
    }

    async fn find_all_previous(
        &self,
        file_id: FileId,
        before: SnapshotVersion,
    ) -> SnapshotRepositoryResult<Vec<Snapshot>> {
        let before_version =
            i64::try_from(before.value()).map_err(SnapshotRepositoryError::persistence)?;
        self.run_blocking(move |connection| {
            let rows = snapshots::table
                .filter(snapshots::file_id.eq(file_id.into_inner()))
                .filter(snapshots::version.lt(before_version))
                .order(snapshots::version.desc())
                .select(SnapshotRow::as_select())
                .load::<SnapshotRow>(connection)
                .map_err(SnapshotRepositoryError::persistence)?;
            rows.into_iter().map(row_to_snapshot).collect()
        })
        .await
    }
}

fn location_to_value(
    location: Option<&ObjectLocation>,
) -> SnapshotRepositoryResult<Option<Value>> {
    location
        .map(|value| serde_json::to_value(value).map_err(SnapshotRepositoryError::persistence))
        .transpose()
}

fn value_to_location(value: Option<Value>) -> SnapshotRepositoryResult<Option<ObjectLocation>> {
    value
        .map(|raw| serde_json::from_value(raw).map_err(SnapshotRepositoryError::persistence))
        .transpose()
}

fn to_new_row(snapshot: &Snapshot) -> SnapshotRepositoryResult<NewSnapshotRow> {
    let version =
        i64::try_from(snapshot.version().value()).map_err(SnapshotRepositoryError::persistence)?;
    Ok(NewSnapshotRow {
        id: snapshot.id().into_inner(),
        file_id: snapshot.file_id().into_inner(),
        version,
        original: location_to_value(snapshot.original())?,
        preview: location_to_value(snapshot.preview())?,
        text: location_to_value(snapshot.text())?,
        ocr: location_to_value(snapshot.ocr())?,
        entities: location_to_value(snapshot.entities())?,
        status: snapshot.status().as_str().to_owned(),
        language: snapshot.language().map(str::to_owned),
        task_id: snapshot.task_id().map(TaskId::into_inner),
        create_time: snapshot.create_time(),
        update_time: snapshot.update_time(),
    })
}

fn to_changeset(snapshot: &Snapshot) -> SnapshotRepositoryResult<SnapshotChangeset> {
    Ok(SnapshotChangeset {
        preview: location_to_value(snapshot.preview())?,
        text: location_to_value(snapshot.text())?,
        ocr: location_to_value(snapshot.ocr())?,
        entities: location_to_value(snapshot.entities())?,
        status: snapshot.status().as_str().to_owned(),
        language: snapshot.language().map(str::to_owned),
        task_id: snapshot.task_id().map(TaskId::into_inner),
        update_time: snapshot.update_time(),
    })
}

fn row_to_snapshot(row: SnapshotRow) -> SnapshotRepositoryResult<Snapshot> {
    let SnapshotRow {
        id,
        file_id,
        version: persisted_version,
        original,
        preview,
        text,
        ocr,
        entities,
        status: persisted_status,
        language,
        task_id,
        create_time,
        update_time,
    } = row;

    let raw_version =
        u64::try_from(persisted_version).map_err(SnapshotRepositoryError::persistence)?;
    let version = SnapshotVersion::new(raw_version).map_err(SnapshotRepositoryError::persistence)?;
    let status = SnapshotStatus::try_from(persisted_status.as_str())
        .map_err(SnapshotRepositoryError::persistence)?;

    Ok(Snapshot::from_persisted(PersistedSnapshotData {
        id: SnapshotId::from_uuid(id),
        file_id: FileId::from_uuid(file_id),
        version,
        original: value_to_location(original)?,
        preview: value_to_location(preview)?,
        text: value_to_location(text)?,
        ocr: value_to_location(ocr)?,
        entities: value_to_location(entities)?,
        status,
        language,
        task_id: task_id.map(TaskId::from_uuid),
        create_time,
        update_time,
    }))
}

fn is_version_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_snapshots_file_version_unique")
}
