//! Then steps for insights lifecycle BDD scenarios.

use super::world::{InsightsWorld, run_async};
use rstest_bdd_macros::then;
use strata::{
    insights::services::{ErrorKind, InsightsError},
    snapshot::{
        domain::{Snapshot, SnapshotStatus},
        ports::SnapshotRepository,
    },
    task::{domain::TaskStatus, ports::TaskRepository},
};

fn stored_snapshot(world: &InsightsWorld) -> Result<Snapshot, eyre::Report> {
    let id = world.snapshot()?.id();
    run_async(world.snapshots.find_by_id(id))?
        .ok_or_else(|| eyre::eyre!("snapshot {id} missing from the store"))
}

#[then(r#"the returned task is "{status}""#)]
fn returned_task_is(world: &InsightsWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())?;
    let task = world
        .last_task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?;
    if task.status() != expected {
        return Err(eyre::eyre!("expected task {expected}, found {}", task.status()));
    }
    Ok(())
}

#[then(r#"the current snapshot is "{status}""#)]
fn current_snapshot_is(world: &InsightsWorld, status: String) -> Result<(), eyre::Report> {
    let expected = SnapshotStatus::try_from(status.as_str())?;
    let snapshot = stored_snapshot(world)?;
    if snapshot.status() != expected {
        return Err(eyre::eyre!(
            "expected snapshot {expected}, found {}",
            snapshot.status()
        ));
    }
    Ok(())
}

#[then("the current snapshot has no entities")]
fn current_snapshot_has_no_entities(world: &InsightsWorld) -> Result<(), eyre::Report> {
    let snapshot = stored_snapshot(world)?;
    if snapshot.has_entities() || snapshot.task_id().is_some() {
        return Err(eyre::eyre!("snapshot still references insights: {snapshot:?}"));
    }
    Ok(())
}

#[then("the deletion task no longer exists")]
fn deletion_task_no_longer_exists(world: &InsightsWorld) -> Result<(), eyre::Report> {
    let task_id = world
        .last_task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?
        .id();
    if run_async(world.tasks.find_by_id(task_id))?.is_some() {
        return Err(eyre::eyre!("deletion task {task_id} still stored"));
    }
    Ok(())
}

#[then("one insights pipeline run was submitted")]
fn one_pipeline_run_submitted(world: &InsightsWorld) -> Result<(), eyre::Report> {
    let count = world.pipeline.submissions()?.len();
    if count != 1 {
        return Err(eyre::eyre!("expected one submission, found {count}"));
    }
    Ok(())
}

#[then("the request fails because the snapshot has a pending task")]
fn request_fails_pending(world: &InsightsWorld) -> Result<(), eyre::Report> {
    match world.last_error.as_ref() {
        Some(InsightsError::SnapshotHasPendingTask(_)) => Ok(()),
        other => Err(eyre::eyre!("expected pending task error, got {other:?}")),
    }
}

#[then("the request fails as forbidden")]
fn request_fails_forbidden(world: &InsightsWorld) -> Result<(), eyre::Report> {
    match world.last_error.as_ref().map(InsightsError::kind) {
        Some(ErrorKind::Forbidden) => Ok(()),
        other => Err(eyre::eyre!("expected forbidden error, got {other:?}")),
    }
}
